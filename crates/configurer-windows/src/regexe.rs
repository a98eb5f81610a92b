//! 基于 `reg.exe` 的 [`RegistryStore`] 实现（兼容/排障用后端）。
//!
//! 命令：
//! - 判断键：`reg query <path>`
//! - 读取值：`reg query <path> /v <name>`
//! - 建键：`reg add <path> /f`
//! - 写值：`reg add <path> /f /v <name> /t <type> /d <value>`
//!
//! 限制：
//! - `reg query` 对“不存在”与其他失败都返回退出码 1，本后端统一视为“不存在”
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use configurer_core::console::{CommandRunner, ProcessResult};
use configurer_core::regpath::{RegistryPath, RegistryValue};
use configurer_core::store::RegistryStore;
use configurer_core::{ConfigurerError, Result};

/// `reg.exe` 程序名。
pub const REG_EXE: &str = "reg";

/// `reg.exe` 后端。
#[derive(Debug, Clone, Copy)]
pub struct RegExeStore {
    runner: CommandRunner,
}

impl RegExeStore {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn run(&self, path: &RegistryPath, tokens: &[String], on_error: fn(String, String) -> ConfigurerError) -> Result<ProcessResult> {
        self.runner
            .run(tokens)
            .map_err(|e| on_error(path.to_string(), e.to_string()))
    }
}

fn access(path: String, message: String) -> ConfigurerError {
    ConfigurerError::RegistryAccess { path, message }
}

fn operation(path: String, message: String) -> ConfigurerError {
    ConfigurerError::RegistryOperationFailed { path, message }
}

/// `reg.exe` 使用的完整路径（统一为规范根键名）。
fn reg_path(path: &RegistryPath) -> String {
    if path.is_root() {
        path.root().canonical_name().to_string()
    } else {
        format!("{}\\{}", path.root().canonical_name(), path.relative_path())
    }
}

/// 生成写值命令（也是兼容旧流程的 `reg add` 调用形式）。
pub fn reg_add_command(path: &RegistryPath, name: &str, value: &RegistryValue) -> Vec<String> {
    vec![
        REG_EXE.to_string(),
        "add".to_string(),
        reg_path(path),
        "/f".to_string(),
        "/v".to_string(),
        name.to_string(),
        "/t".to_string(),
        value.value_type().reg_name().to_string(),
        "/d".to_string(),
        value.to_reg_data(),
    ]
}

impl RegistryStore for RegExeStore {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool> {
        let tokens = vec![REG_EXE.to_string(), "query".to_string(), reg_path(path)];
        Ok(self.run(path, &tokens, access)?.success())
    }

    fn get_value(&self, path: &RegistryPath, name: &str) -> Result<Option<RegistryValue>> {
        let tokens = vec![
            REG_EXE.to_string(),
            "query".to_string(),
            reg_path(path),
            "/v".to_string(),
            name.to_string(),
        ];
        let out = self.run(path, &tokens, access)?;
        if !out.success() {
            return Ok(None);
        }
        Ok(parse_query_value(&out.stdout, name))
    }

    fn create_key(&self, path: &RegistryPath) -> Result<()> {
        let tokens = vec![REG_EXE.to_string(), "add".to_string(), reg_path(path), "/f".to_string()];
        let out = self.run(path, &tokens, operation)?;
        out.check()
            .map(|_| ())
            .map_err(|e| operation(path.to_string(), e.to_string()))
    }

    fn set_value(&self, path: &RegistryPath, name: &str, value: &RegistryValue) -> Result<()> {
        let out = self.run(path, &reg_add_command(path, name, value), operation)?;
        out.check()
            .map(|_| ())
            .map_err(|e| operation(path.to_string(), e.to_string()))
    }
}

/// 从 `reg query /v` 的输出中提取值。
///
/// 输出格式（值行以 4 个空格分隔字段）：
/// ```text
/// HKEY_LOCAL_MACHINE\Software\Acme
///     Enabled    REG_DWORD    0x1
/// ```
///
/// 返回值：
/// - 值名不匹配（不区分大小写）或类型不受支持（包括 REG_EXPAND_SZ）：`None`
pub fn parse_query_value(stdout: &str, name: &str) -> Option<RegistryValue> {
    for line in stdout.lines() {
        let Some(line) = line.strip_prefix("    ") else {
            continue;
        };
        let mut fields = line.splitn(3, "    ");
        let (Some(value_name), Some(type_name)) = (fields.next(), fields.next()) else {
            continue;
        };
        if !value_name.eq_ignore_ascii_case(name) {
            continue;
        }
        let data = fields.next().unwrap_or("");
        return match type_name {
            "REG_SZ" => Some(RegistryValue::Sz(data.to_string())),
            "REG_DWORD" => {
                let hex = data.trim().trim_start_matches("0x");
                u32::from_str_radix(hex, 16).ok().map(RegistryValue::Dword)
            }
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\r\nHKEY_LOCAL_MACHINE\\Software\\Acme\\App\r\n    Enabled    REG_DWORD    0x1\r\n    Display Name    REG_SZ    Acme  App\r\n    Empty    REG_SZ    \r\n    Blob    REG_BINARY    00FF\r\n    Path    REG_EXPAND_SZ    %USERPROFILE%\\bin\r\n\r\n";

    #[test]
    fn parses_dword_as_hex() {
        assert_eq!(parse_query_value(OUTPUT, "Enabled"), Some(RegistryValue::Dword(1)));
        assert_eq!(parse_query_value(OUTPUT, "enabled"), Some(RegistryValue::Dword(1)));
    }

    #[test]
    fn parses_strings_with_spaces_in_name_and_data() {
        assert_eq!(
            parse_query_value(OUTPUT, "Display Name"),
            Some(RegistryValue::Sz("Acme  App".into()))
        );
        assert_eq!(parse_query_value(OUTPUT, "Empty"), Some(RegistryValue::Sz(String::new())));
    }

    #[test]
    fn unsupported_or_missing_values_are_none() {
        assert_eq!(parse_query_value(OUTPUT, "Blob"), None);
        assert_eq!(parse_query_value(OUTPUT, "Nope"), None);
    }

    #[test]
    fn expand_sz_never_reads_as_plain_string() {
        assert_eq!(parse_query_value(OUTPUT, "Path"), None);
    }

    #[test]
    fn reg_add_uses_canonical_root_and_type_names() {
        let path = RegistryPath::parse("HKLM\\Software\\Acme").unwrap();
        assert_eq!(
            reg_add_command(&path, "Enabled", &RegistryValue::Dword(1)),
            vec![
                "reg",
                "add",
                "HKEY_LOCAL_MACHINE\\Software\\Acme",
                "/f",
                "/v",
                "Enabled",
                "/t",
                "REG_DWORD",
                "/d",
                "1"
            ]
        );
    }
}
