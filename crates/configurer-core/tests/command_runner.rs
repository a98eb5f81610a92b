use configurer_core::console::{CommandRunner, ConsoleEncoding};

fn shell(script: &str) -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".into(), "/C".into(), script.into()]
    } else {
        vec!["sh".into(), "-c".into(), script.into()]
    }
}

#[test]
fn captures_output_and_exit_code_without_failing() {
    let runner = CommandRunner::new(ConsoleEncoding::Utf8, true);
    let result = runner.run(&shell("echo hello&& echo oops 1>&2&& exit 3")).unwrap();

    assert_eq!(result.exit_code, 3);
    assert!(!result.success());
    assert_eq!(result.stdout_trimmed(), "hello");
    assert_eq!(result.stderr.trim(), "oops");
    assert_eq!(result.command, shell("echo hello&& echo oops 1>&2&& exit 3"));

    let err = result.check().unwrap_err();
    assert!(err.is_non_zero_exit());
    assert!(err.to_string().contains("STDERR:\noops"));
}

#[test]
fn run_checked_passes_successful_output_through() {
    let runner = CommandRunner::default();
    let result = runner.run_checked(&shell("echo ok")).unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_trimmed(), "ok");
}
