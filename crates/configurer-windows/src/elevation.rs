//! 管理员权限检测。
//!
//! 说明：
//! - 配置流程会写 HKLM、创建账户、关闭 BitLocker，必须以管理员运行
//! - 非 Windows 平台始终视为“非管理员”
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::{anyhow, Result};

/// 判断当前进程是否以管理员权限运行。
///
/// 返回值：
/// - `Ok(true)`：当前为管理员
/// - `Ok(false)`：当前非管理员（或非 Windows 平台）
///
/// 异常处理：
/// - 该 Win32 API 本身不返回错误码；此处保留 `Result` 以统一上层调用风格。
#[cfg(windows)]
pub fn is_running_as_admin() -> Result<bool> {
    use windows::Win32::UI::Shell::IsUserAnAdmin;
    unsafe { Ok(IsUserAnAdmin().as_bool()) }
}

#[cfg(not(windows))]
pub fn is_running_as_admin() -> Result<bool> {
    Ok(false)
}

/// 启动前置条件：必须为管理员，否则返回错误（由调用方终止进程）。
pub fn require_admin() -> Result<()> {
    if is_running_as_admin()? {
        Ok(())
    } else {
        Err(anyhow!("Il faut exécuter en tant qu'administrateur"))
    }
}
