//! 运行参数（`data/settings.json`，可选）。
//!
//! 约定：
//! - 所有字段通过 `#[serde(default)]` 提供默认值；文件不存在时使用全部默认值
//! - 默认值即该工具面向的部署环境（法语区域、WAT 时区）
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::console::ConsoleEncoding;
use crate::error::{ConfigurerError, Result};

/// 设置文件名。
pub const SETTINGS_FILE: &str = "settings.json";

/// 全部运行参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 需要确保存在的本地管理员账户。
    pub admin_account: AdminAccountSettings,
    /// 系统区域（`Set-WinSystemLocale -SystemLocale`）。
    pub system_locale: String,
    /// 地理位置 ID（`Set-WinHomeLocation -GeoId`，55 = 中非共和国）。
    pub geo_id: u32,
    /// 时区 ID（`Set-TimeZone -Id`）。
    pub timezone_id: String,
    /// 需要关闭 BitLocker 的驱动器。
    pub bitlocker_drives: Vec<String>,
    /// 下载目录下存放安装包的子目录名。
    pub apps_subdir: String,
    /// 视为安装包的文件后缀。
    pub installer_suffixes: Vec<String>,
    /// 文件名包含该标记的安装包会追加 `PATCH=` 参数。
    pub patch_marker: String,
    /// 注册表后端。
    pub registry_backend: RegistryBackend,
    /// 外部命令输出编码。
    pub console_encoding: ConsoleEncoding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_account: AdminAccountSettings::default(),
            system_locale: "fr-FR".to_string(),
            geo_id: 55,
            timezone_id: "W. Central Africa Standard Time".to_string(),
            bitlocker_drives: vec!["C:".to_string(), "D:".to_string()],
            apps_subdir: "apps".to_string(),
            installer_suffixes: vec![".exe".to_string(), ".msi".to_string(), ".zip".to_string()],
            patch_marker: "Paratext".to_string(),
            registry_backend: RegistryBackend::default(),
            console_encoding: ConsoleEncoding::default(),
        }
    }
}

/// 本地管理员账户参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminAccountSettings {
    pub name: String,
    /// 仅在创建账户时使用；账户已存在时不会修改密码。
    pub password: String,
    pub comment: String,
}

impl Default for AdminAccountSettings {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            password: "administrator".to_string(),
            comment: "Compte Administrateur".to_string(),
        }
    }
}

/// 注册表读写方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryBackend {
    /// Win32 注册表 API（仅 Windows）。
    #[default]
    Winreg,
    /// 通过 `reg.exe query/add` 读写。
    RegExe,
}

impl Settings {
    /// 读取设置文件；文件不存在时返回默认值。
    ///
    /// 异常处理：
    /// - 读取失败：IO 错误
    /// - JSON 解析失败：[`ConfigurerError::Settings`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigurerError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let s: Settings = serde_json::from_str(
            r#"{ "timezone_id": "UTC", "admin_account": { "name": "Tech" }, "registry_backend": "reg_exe" }"#,
        )
        .unwrap();
        assert_eq!(s.timezone_id, "UTC");
        assert_eq!(s.admin_account.name, "Tech");
        assert_eq!(s.admin_account.comment, "Compte Administrateur");
        assert_eq!(s.registry_backend, RegistryBackend::RegExe);
        assert_eq!(s.geo_id, 55);
        assert_eq!(s.bitlocker_drives, vec!["C:", "D:"]);
        assert_eq!(s.console_encoding, ConsoleEncoding::Cp437);
    }

    #[test]
    fn missing_file_means_defaults() {
        let s = Settings::load(Path::new("/configurer/does/not/exist/settings.json")).unwrap();
        assert_eq!(s, Settings::default());
    }
}
