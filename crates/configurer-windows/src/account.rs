//! 本地管理员账户（基于 PowerShell `LocalAccounts` 模块）。
//!
//! 说明：
//! - 管理员组以内置 SID `S-1-5-32-544` 定位，与系统语言无关（法语系统上组名为 “Administrateurs”）
//! - 密码经环境变量传给子进程，不出现在命令行与日志中
//!
//! 权限要求：
//! - 需要管理员权限
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::{Context, Result};
use configurer_core::console::{with_powershell, CommandRunner};
use tracing::debug;

use crate::locale::ps_quote;

/// 内置 Administrators 组的 SID。
pub const ADMINISTRATORS_SID: &str = "S-1-5-32-544";

/// 传递密码的环境变量名。
const PASSWORD_ENV: &str = "CONFIGURER_ADMIN_PASSWORD";

/// 账户创建结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    Created,
    AlreadyExists,
}

/// 组成员处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    Added,
    AlreadyMember,
}

fn script(body: &str) -> Vec<String> {
    with_powershell(&["-Command", body])
}

/// 判断本地用户是否存在。
pub fn user_exists(runner: &CommandRunner, name: &str) -> Result<bool> {
    let body = format!(
        "if (Get-LocalUser -Name {} -ErrorAction SilentlyContinue) {{ 'yes' }} else {{ 'no' }}",
        ps_quote(name)
    );
    let out = runner
        .run_checked(&script(&body))
        .context("Échec de lecture des comptes locaux")?;
    Ok(out.stdout_trimmed() == "yes")
}

/// 创建本地用户（密码永不过期）。
///
/// 参数：
/// - `password`：明文密码，仅经环境变量传递
pub fn create_user(runner: &CommandRunner, name: &str, password: &str, comment: &str) -> Result<()> {
    let body = format!(
        "New-LocalUser -Name {} -Password (ConvertTo-SecureString $env:{PASSWORD_ENV} -AsPlainText -Force) \
         -Description {} -PasswordNeverExpires | Out-Null",
        ps_quote(name),
        ps_quote(comment)
    );
    runner
        .run_with_env(&script(&body), &[(PASSWORD_ENV, password)])
        .and_then(|out| out.check())
        .with_context(|| format!("Échec de création du compte {name}"))?;
    Ok(())
}

/// 用户不存在时创建。
pub fn ensure_user(runner: &CommandRunner, name: &str, password: &str, comment: &str) -> Result<AccountOutcome> {
    if user_exists(runner, name)? {
        return Ok(AccountOutcome::AlreadyExists);
    }
    create_user(runner, name, password, comment)?;
    Ok(AccountOutcome::Created)
}

/// 判断用户是否已在管理员组中。
pub fn is_admin_member(runner: &CommandRunner, name: &str) -> Result<bool> {
    let body = format!("Get-LocalGroupMember -SID {ADMINISTRATORS_SID} | ForEach-Object {{ $_.Name }}");
    let out = runner
        .run_checked(&script(&body))
        .context("Échec de lecture du groupe Administrateurs")?;
    Ok(members_contain(&out.stdout, name))
}

/// 将用户加入管理员组。
pub fn add_to_admins(runner: &CommandRunner, name: &str) -> Result<()> {
    let body = format!(
        "Add-LocalGroupMember -SID {ADMINISTRATORS_SID} -Member {}",
        ps_quote(name)
    );
    runner
        .run_checked(&script(&body))
        .with_context(|| format!("Échec d'ajout de {name} au groupe Administrateurs"))?;
    Ok(())
}

/// 用户不在管理员组时加入。
pub fn ensure_admin_member(runner: &CommandRunner, name: &str) -> Result<MembershipOutcome> {
    if is_admin_member(runner, name)? {
        return Ok(MembershipOutcome::AlreadyMember);
    }
    add_to_admins(runner, name)?;
    Ok(MembershipOutcome::Added)
}

/// 在 `Get-LocalGroupMember` 的输出（每行 `DOMAINE\nom`）中查找用户名（不区分大小写）。
pub fn members_contain(stdout: &str, name: &str) -> bool {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.rsplit('\\').next().unwrap_or(line))
        .inspect(|member| debug!("membre Administrateurs : {member}"))
        .any(|member| member.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_members_by_account_name() {
        let out = "PC-01\\Administrateur\r\nPC-01\\Admin\r\nAzureAD\\jdupont\r\n";
        assert!(members_contain(out, "admin"));
        assert!(members_contain(out, "JDUPONT"));
        assert!(!members_contain(out, "PC-01"));
        assert!(!members_contain("", "Admin"));
    }

    #[test]
    fn scripts_run_through_powershell_without_profile() {
        let tokens = script("Get-LocalUser");
        assert_eq!(
            tokens,
            ["powershell.exe", "-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", "Get-LocalUser"]
        );
    }
}
