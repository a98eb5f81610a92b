//! 外部命令执行（`reg`、`powershell.exe`、`manage-bde`、安装程序等）。
//!
//! 约定：
//! - 继承当前进程的工作目录与环境变量
//! - 同时捕获 stdout/stderr，按配置的控制台编码解码为文本
//! - [`CommandRunner::run`] 不因退出码非 0 报错，由调用方决定如何解释（见 [`ProcessResult::check`]）
//!
//! 限制：
//! - 不设超时；外部命令挂起会阻塞整个配置流程
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;
use std::process::Command;

use codepage_437::{FromCp437, CP437_CONTROL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurerError, Result};

/// PowerShell 解释器名称。
pub const POWERSHELL: &str = "powershell.exe";

/// 每次调用 PowerShell 都带上的参数（执行策略只对该子进程生效）。
pub const POWERSHELL_ARGS: [&str; 3] = ["-NoProfile", "-ExecutionPolicy", "Bypass"];

/// `CREATE_NO_WINDOW`：避免 GUI 模式下为每条命令弹出控制台窗口。
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// 控制台输出编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleEncoding {
    /// OEM 代码页 437（Windows 控制台工具的传统输出编码）。
    #[default]
    Cp437,
    /// UTF-8（无效字节按替换字符处理）。
    Utf8,
}

impl ConsoleEncoding {
    /// 将原始输出字节解码为文本。
    pub fn decode(self, bytes: Vec<u8>) -> String {
        match self {
            ConsoleEncoding::Cp437 => String::from_cp437(bytes, &CP437_CONTROL),
            ConsoleEncoding::Utf8 => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// 一次外部命令执行的结果（只读）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// 退出码；被信号终止等无退出码的情况记为 -1。
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// 实际执行的命令（程序名 + 参数）。
    pub command: Vec<String>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// 将非 0 退出码转换为 [`ConfigurerError::NonZeroExit`]。
    ///
    /// 返回值：
    /// - 退出码为 0：原样返回结果，便于继续读取 stdout
    pub fn check(self) -> Result<ProcessResult> {
        if self.success() {
            Ok(self)
        } else {
            Err(ConfigurerError::NonZeroExit(Box::new(self)))
        }
    }

    /// 去除首尾空白后的 stdout。
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ARGS: {:?}\nCODE: {}\nSTDOUT:\n{}\nSTDERR:\n{}",
            self.command, self.exit_code, self.stdout, self.stderr
        )
    }
}

/// 外部命令执行器（无内部状态，配置在构造时显式传入）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRunner {
    pub encoding: ConsoleEncoding,
    /// 仅在 Windows 上生效：不为子进程创建控制台窗口。
    pub hide_window: bool,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            encoding: ConsoleEncoding::Cp437,
            hide_window: true,
        }
    }
}

impl CommandRunner {
    pub fn new(encoding: ConsoleEncoding, hide_window: bool) -> Self {
        Self {
            encoding,
            hide_window,
        }
    }

    /// 执行命令并捕获输出。
    ///
    /// 参数：
    /// - `tokens`：程序名 + 参数
    ///
    /// 返回值：
    /// - 任意退出码都返回 `Ok(ProcessResult)`
    ///
    /// 异常处理：
    /// - `tokens` 为空：[`ConfigurerError::Spawn`]（InvalidInput）
    /// - 进程无法启动（程序不存在/权限）：[`ConfigurerError::Spawn`]
    pub fn run<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ProcessResult> {
        self.run_with_env(tokens, &[])
    }

    /// 与 [`CommandRunner::run`] 相同，额外为子进程设置环境变量。
    ///
    /// 说明：
    /// - 用于传递密码等不应出现在命令行与日志中的数据
    pub fn run_with_env<S: AsRef<str>>(&self, tokens: &[S], env: &[(&str, &str)]) -> Result<ProcessResult> {
        let command: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let Some((program, args)) = command.split_first() else {
            return Err(ConfigurerError::Spawn {
                command: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "commande vide"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.envs(env.iter().copied());
        self.apply_platform_flags(&mut cmd);

        debug!("exécution : {:?}", command);
        let out = cmd.output().map_err(|source| ConfigurerError::Spawn {
            command: command.join(" "),
            source,
        })?;
        let result = ProcessResult {
            exit_code: out.status.code().unwrap_or(-1),
            stdout: self.encoding.decode(out.stdout),
            stderr: self.encoding.decode(out.stderr),
            command,
        };
        debug!("code de sortie {} : {:?}", result.exit_code, result.command);
        Ok(result)
    }

    /// 与 [`CommandRunner::run`] 相同，但在首个参数不是 `powershell.exe` 时自动补上（见 [`with_powershell`]）。
    pub fn run_powershell<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ProcessResult> {
        self.run(&with_powershell(tokens))
    }

    /// 执行命令，退出码非 0 视为错误。
    pub fn run_checked<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ProcessResult> {
        self.run(tokens)?.check()
    }

    /// 执行 PowerShell 命令，退出码非 0 视为错误。
    pub fn run_powershell_checked<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ProcessResult> {
        self.run_powershell(tokens)?.check()
    }

    #[cfg(windows)]
    fn apply_platform_flags(&self, cmd: &mut Command) {
        use std::os::windows::process::CommandExt;
        if self.hide_window {
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
    }

    #[cfg(not(windows))]
    fn apply_platform_flags(&self, _cmd: &mut Command) {}
}

/// 在命令前补上 PowerShell 解释器名与 [`POWERSHELL_ARGS`]。
///
/// 说明：
/// - 首个参数已是 `powershell.exe` 时原样返回，由调用方自行决定参数
pub fn with_powershell<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let tokens = tokens.iter().map(|t| t.as_ref().to_string());
    if tokens.clone().next().as_deref() == Some(POWERSHELL) {
        return tokens.collect();
    }
    std::iter::once(POWERSHELL)
        .chain(POWERSHELL_ARGS)
        .map(str::to_string)
        .chain(tokens)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powershell_prefix_is_added_once() {
        assert_eq!(
            with_powershell(&["Get-TimeZone"]),
            vec!["powershell.exe", "-NoProfile", "-ExecutionPolicy", "Bypass", "Get-TimeZone"]
        );
        assert_eq!(
            with_powershell(&["powershell.exe", "Get-TimeZone"]),
            vec!["powershell.exe", "Get-TimeZone"]
        );
        assert_eq!(
            with_powershell::<&str>(&[]),
            vec!["powershell.exe", "-NoProfile", "-ExecutionPolicy", "Bypass"]
        );
    }

    #[test]
    fn cp437_decodes_box_drawing_and_accents() {
        // 0x82 = é, 0xC4 = ─
        let text = ConsoleEncoding::Cp437.decode(vec![b'C', b'l', 0x82, b' ', 0xC4]);
        assert_eq!(text, "Clé ─");
        let text = ConsoleEncoding::Utf8.decode("Clé".as_bytes().to_vec());
        assert_eq!(text, "Clé");
    }

    #[test]
    fn check_maps_non_zero_exit() {
        let ok = ProcessResult {
            exit_code: 0,
            stdout: "out".into(),
            stderr: String::new(),
            command: vec!["x".into()],
        };
        assert!(ok.clone().check().is_ok());

        let failed = ProcessResult { exit_code: 2, ..ok };
        let err = failed.check().unwrap_err();
        assert!(err.is_non_zero_exit());
        let text = err.to_string();
        assert!(text.contains("ARGS: [\"x\"]"), "{text}");
        assert!(text.contains("STDOUT:\nout"), "{text}");
    }

    #[test]
    fn empty_command_is_a_spawn_error() {
        let err = CommandRunner::default().run::<&str>(&[]).unwrap_err();
        assert!(matches!(err, ConfigurerError::Spawn { .. }));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = CommandRunner::default()
            .run(&["configurer-test-no-such-program"])
            .unwrap_err();
        assert!(matches!(err, ConfigurerError::Spawn { .. }));
    }
}
