use std::process::Command;

fn configurer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_configurer"))
}

#[test]
fn version_flag_prints_name_and_version() {
    let out = configurer().arg("--version").output().expect("run configurer");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("configurer 0.1.1"), "{stdout}");
}

#[test]
fn unknown_flag_is_rejected() {
    let out = configurer().arg("--no-such-flag").output().expect("run configurer");
    assert!(!out.status.success());
}

#[cfg(not(windows))]
#[test]
fn run_config_without_admin_exits_with_code_1() {
    let out = configurer()
        .arg("--run-config")
        .arg("--yes")
        .output()
        .expect("run configurer");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("administrateur"), "{stderr}");
}

#[cfg(not(windows))]
#[test]
fn window_mode_failure_is_reported_to_the_user() {
    let out = configurer().output().expect("run configurer");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Configurer : Il faut exécuter en tant qu'administrateur"),
        "{stderr}"
    );
}
