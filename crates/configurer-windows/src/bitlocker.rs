//! BitLocker 关闭（基于 `manage-bde`）。
//!
//! 说明：
//! - `manage-bde -status <盘符> -ProtectionAsErrorLevel`：保护开启时退出码为 0
//! - 退出码非 0 时无法区分“驱动器不存在”与“未加密”，两者都按“未激活”处理
//!
//! 权限要求：
//! - 需要管理员权限
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::{Context, Result};
use configurer_core::console::CommandRunner;

/// 单个驱动器的处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitlockerOutcome {
    /// 已发起关闭（解密在后台继续进行）。
    Disabled,
    /// 未激活（或驱动器不存在）。
    NotActive,
}

/// 判断驱动器上的 BitLocker 保护是否开启。
///
/// 异常处理：
/// - `manage-bde` 无法启动时返回错误；退出码非 0 不视为错误
pub fn is_active(runner: &CommandRunner, drive: &str) -> Result<bool> {
    let out = runner
        .run(&["manage-bde", "-status", drive, "-ProtectionAsErrorLevel"])
        .context("Échec d'exécution de manage-bde")?;
    Ok(out.success())
}

/// 关闭驱动器上的 BitLocker。
///
/// 异常处理：
/// - 退出码非 0 返回错误并附带 stdout/stderr
pub fn deactivate(runner: &CommandRunner, drive: &str) -> Result<()> {
    runner
        .run_checked(&["manage-bde", "-off", drive])
        .with_context(|| format!("Échec de désactivation de BitLocker sur {drive}"))?;
    Ok(())
}

/// 保护开启时关闭，否则不做任何事（可重复执行）。
pub fn disable(runner: &CommandRunner, drive: &str) -> Result<BitlockerOutcome> {
    if !is_active(runner, drive)? {
        return Ok(BitlockerOutcome::NotActive);
    }
    deactivate(runner, drive)?;
    Ok(BitlockerOutcome::Disabled)
}
