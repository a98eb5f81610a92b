//! 基于 Win32 注册表 API（`winreg` crate）的 [`RegistryStore`] 实现。
//!
//! 约定：
//! - 读操作以 `KEY_READ` 打开，写值以 `KEY_WRITE` 打开
//! - `ERROR_FILE_NOT_FOUND`（`io::ErrorKind::NotFound`）视为“不存在”
//! - REG_SZ 读为字符串，REG_DWORD 读为 u32；其他类型（包括 REG_EXPAND_SZ）视为“未找到”，会按目标类型覆盖写入
//!
//! 权限要求：
//! - 写入 HKLM 需要管理员权限
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io;

use configurer_core::regpath::{RegistryPath, RegistryValue, RootKey};
use configurer_core::store::RegistryStore;
use configurer_core::{ConfigurerError, Result};
use tracing::debug;
use winreg::enums::{RegType, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, KEY_WRITE};
use winreg::types::FromRegValue;
use winreg::RegKey;

/// Win32 注册表后端（无状态）。
#[derive(Debug, Default, Clone, Copy)]
pub struct WinRegistry;

impl WinRegistry {
    pub fn new() -> Self {
        Self
    }
}

/// 将根键映射为 winreg 的预定义句柄。
fn predef(root: RootKey) -> RegKey {
    match root {
        RootKey::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        RootKey::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        RootKey::Users => RegKey::predef(HKEY_USERS),
    }
}

fn access_error(path: &RegistryPath, e: io::Error) -> ConfigurerError {
    ConfigurerError::RegistryAccess {
        path: path.to_string(),
        message: e.to_string(),
    }
}

fn operation_error(path: &RegistryPath, e: io::Error) -> ConfigurerError {
    ConfigurerError::RegistryOperationFailed {
        path: path.to_string(),
        message: e.to_string(),
    }
}

/// 以只读方式打开键；不存在时返回 `Ok(None)`。
fn open_for_read(path: &RegistryPath) -> Result<Option<RegKey>> {
    match predef(path.root()).open_subkey_with_flags(path.relative_path(), KEY_READ) {
        Ok(key) => Ok(Some(key)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(access_error(path, e)),
    }
}

impl RegistryStore for WinRegistry {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool> {
        Ok(open_for_read(path)?.is_some())
    }

    fn get_value(&self, path: &RegistryPath, name: &str) -> Result<Option<RegistryValue>> {
        let Some(key) = open_for_read(path)? else {
            return Ok(None);
        };
        let raw = match key.get_raw_value(name) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(access_error(path, e)),
        };
        let value = match raw.vtype {
            RegType::REG_SZ => {
                RegistryValue::Sz(String::from_reg_value(&raw).map_err(|e| access_error(path, e))?)
            }
            RegType::REG_DWORD => {
                RegistryValue::Dword(u32::from_reg_value(&raw).map_err(|e| access_error(path, e))?)
            }
            ref other => {
                debug!("{path} -> {name} : type {other:?} non pris en charge");
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    fn create_key(&self, path: &RegistryPath) -> Result<()> {
        predef(path.root())
            .create_subkey(path.relative_path())
            .map_err(|e| operation_error(path, e))?;
        Ok(())
    }

    fn set_value(&self, path: &RegistryPath, name: &str, value: &RegistryValue) -> Result<()> {
        let key = predef(path.root())
            .open_subkey_with_flags(path.relative_path(), KEY_WRITE)
            .map_err(|e| operation_error(path, e))?;
        let written = match value {
            RegistryValue::Sz(s) => key.set_value(name, s),
            RegistryValue::Dword(v) => key.set_value(name, v),
        };
        written.map_err(|e| operation_error(path, e))
    }
}
