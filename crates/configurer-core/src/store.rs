//! 幂等注册表写入原语（基于 [`RegistryStore`] 抽象）。
//!
//! 分层：
//! - [`RegistryStore`]：平台后端（winreg / reg.exe），只负责单个键/值的读写
//! - 本模块的函数：路径解析、类型校验、逐级建键、“不同才写”判定
//!
//! 幂等性：
//! - 创建已存在的键不做任何事
//! - [`set_value_if_different`] 对已经是目标值的项不写入
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use tracing::debug;

use crate::error::{ConfigurerError, Result};
use crate::regpath::{RegistryPath, RegistryValue, ValueType};

/// 注册表后端。
///
/// 约定：
/// - “不存在”必须转换为 `Ok(false)` / `Ok(None)`，不能作为错误返回
/// - 其他读失败返回 `RegistryAccess`，建键/写值失败返回 `RegistryOperationFailed`
pub trait RegistryStore {
    /// 以只读方式打开键，判断是否存在。
    fn key_exists(&self, path: &RegistryPath) -> Result<bool>;

    /// 读取值；键或值不存在时返回 `Ok(None)`。
    fn get_value(&self, path: &RegistryPath, name: &str) -> Result<Option<RegistryValue>>;

    /// 创建单个键（父键已存在）；键已存在时不做任何事。
    fn create_key(&self, path: &RegistryPath) -> Result<()>;

    /// 写入值（键已存在）。
    fn set_value(&self, path: &RegistryPath, name: &str, value: &RegistryValue) -> Result<()>;
}

/// [`set_value_if_different`] 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 发生了写入。
    Written,
    /// 当前值已是目标值，未写入。
    AlreadySet,
}

/// 判断键是否存在。
///
/// 异常处理：
/// - 路径解析失败：`UnknownRootKey` / `MalformedPath`
/// - 后端报告的非“不存在”错误原样返回
pub fn key_exists(store: &dyn RegistryStore, path: &str) -> Result<bool> {
    let path = RegistryPath::parse(path)?;
    store.key_exists(&path)
}

/// 读取值。
///
/// 返回值：
/// - `Ok(Some(v))`：找到
/// - `Ok(None)`：键或值不存在
pub fn get_value(store: &dyn RegistryStore, path: &str, name: &str) -> Result<Option<RegistryValue>> {
    let path = RegistryPath::parse(path)?;
    store.get_value(&path, name)
}

/// 确保整条键链存在并强制写入值（不比较当前值）。
///
/// 参数：
/// - `path`：完整路径（必须包含根键以下的子路径）
/// - `name`：值名
/// - `value_type`：类型名（`REG_SZ` / `REG_DWORD` / `DWORD`）
/// - `value`：文本形式的值；DWORD 会转换为 u32
///
/// 异常处理：
/// - 路径、类型、值的校验都在任何写入之前完成；校验失败时注册表不会被修改
/// - 建键/写值失败返回后端错误（`RegistryOperationFailed`）
pub fn ensure_value(
    store: &dyn RegistryStore,
    path: &str,
    name: &str,
    value_type: &str,
    value: &str,
) -> Result<()> {
    let (path, value) = prepare(path, value_type, value)?;
    write_value(store, &path, name, &value)
}

/// 仅当当前值缺失或不同于目标值时写入。
///
/// 返回值：
/// - [`ApplyOutcome::Written`]：发生了写入
/// - [`ApplyOutcome::AlreadySet`]：已是目标值（状态，不是错误）
///
/// 说明：
/// - DWORD 按数值比较（`"01"` 与已存的 `1` 视为相同）
/// - 类型不同（例如已存 REG_SZ `"1"`，目标 REG_DWORD `1`）视为不同
pub fn set_value_if_different(
    store: &dyn RegistryStore,
    path: &str,
    name: &str,
    value_type: &str,
    value: &str,
) -> Result<ApplyOutcome> {
    let (path, value) = prepare(path, value_type, value)?;
    let current = store.get_value(&path, name)?;
    if current.as_ref() == Some(&value) {
        debug!("{path} -> {name} déjà à {value}");
        return Ok(ApplyOutcome::AlreadySet);
    }
    write_value(store, &path, name, &value)?;
    Ok(ApplyOutcome::Written)
}

/// 校验路径与值（不触碰后端）。
fn prepare(path: &str, value_type: &str, value: &str) -> Result<(RegistryPath, RegistryValue)> {
    let path = RegistryPath::parse(path)?;
    path.require_relative()?;
    let value_type = ValueType::from_name(value_type)?;
    let value = RegistryValue::from_text(value_type, value)?;
    Ok((path, value))
}

/// 由浅到深逐级补建缺失的键，然后写入值。
///
/// 异常处理：
/// - 建键链中的任何失败（包括存在性检查）都返回 `RegistryOperationFailed`
fn write_value(
    store: &dyn RegistryStore,
    path: &RegistryPath,
    name: &str,
    value: &RegistryValue,
) -> Result<()> {
    for key in path.key_chain() {
        let exists = store
            .key_exists(&key)
            .map_err(ConfigurerError::into_operation_failed)?;
        if !exists {
            debug!("création de la clé {key}");
            store.create_key(&key)?;
        }
    }
    store.set_value(path, name, value)
}
