//! 区域、地理位置与时区（基于 `powershell.exe`）。
//!
//! 说明：
//! - `powershell.exe` 会把参数拼接成一条命令；含空格的参数需用单引号包裹（见 [`ps_quote`]）
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::{Context, Result};
use configurer_core::console::CommandRunner;

/// 时区处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezoneOutcome {
    Changed,
    AlreadySet,
}

/// 为 PowerShell 构造单引号字符串字面量（内部单引号成对转义）。
pub fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// 设置系统区域（需重启生效）。
pub fn set_system_locale(runner: &CommandRunner, locale: &str) -> Result<()> {
    runner
        .run_powershell_checked(&["Set-WinSystemLocale", "-SystemLocale", locale])
        .context("Échec d'exécution de commande powershell")?;
    Ok(())
}

/// 设置地理位置（GeoId）。
pub fn set_home_location(runner: &CommandRunner, geo_id: u32) -> Result<()> {
    runner
        .run_powershell_checked(&["Set-WinHomeLocation", "-GeoId", &geo_id.to_string()])
        .context("Échec d'exécution de commande powershell")?;
    Ok(())
}

/// 读取当前时区 ID。
pub fn current_timezone(runner: &CommandRunner) -> Result<String> {
    let out = runner
        .run_powershell_checked(&["(Get-TimeZone).Id"])
        .context("Échec de lecture du fuseau horaire")?;
    Ok(out.stdout_trimmed().to_string())
}

/// 时区不同时才修改。
pub fn ensure_timezone(runner: &CommandRunner, timezone_id: &str) -> Result<TimezoneOutcome> {
    if current_timezone(runner)? == timezone_id {
        return Ok(TimezoneOutcome::AlreadySet);
    }
    runner
        .run_powershell_checked(&["Set-TimeZone", "-Id", &ps_quote(timezone_id)])
        .context("Échec d'exécution de commande powershell")?;
    Ok(TimezoneOutcome::Changed)
}
