//! 安装程序发现与命令行计算（`Downloads\apps` 目录）。
//!
//! 规则：
//! - 只处理直接位于目录下、后缀在配置列表中的文件（默认 `.exe`/`.msi`/`.zip`，不区分大小写）
//! - 参数来自 `installer-args.csv` 中第一条匹配文件名的规则（glob，不区分大小写）
//! - 文件名包含补丁标记（默认 `Paratext`）的安装包会追加 `PATCH=<最新 .msp>`
//! - `.msi` 通过 `msiexec.exe /i` 执行；`.zip` 只识别不执行
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::data::InstallerArgRule;
use crate::error::Result;

/// 安装包类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// 可直接执行的 `.exe`。
    Exe,
    /// Windows Installer 包（`.msi`）。
    Msi,
    /// 压缩包（`.zip`），暂不支持自动安装。
    Archive,
}

impl InstallerKind {
    /// 按文件后缀判断类型（不区分大小写）。
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "exe" => Some(InstallerKind::Exe),
            "msi" => Some(InstallerKind::Msi),
            "zip" => Some(InstallerKind::Archive),
            _ => None,
        }
    }
}

/// 一次安装的完整命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub installer: PathBuf,
    pub kind: InstallerKind,
    /// 来自 CSV 规则与补丁处理的参数（不含程序名）。
    pub args: Vec<String>,
}

impl InstallPlan {
    /// 生成交给命令执行器的完整命令；`.zip` 返回 `None`。
    pub fn command(&self) -> Option<Vec<String>> {
        let installer = self.installer.to_string_lossy().into_owned();
        match self.kind {
            InstallerKind::Exe => Some(std::iter::once(installer).chain(self.args.iter().cloned()).collect()),
            InstallerKind::Msi => Some(
                ["msiexec.exe".to_string(), "/i".to_string(), installer]
                    .into_iter()
                    .chain(self.args.iter().cloned())
                    .collect(),
            ),
            InstallerKind::Archive => None,
        }
    }
}

/// 列出目录下的安装包（按文件名自然排序）。
///
/// 参数：
/// - `apps_dir`：安装包目录
/// - `suffixes`：接受的后缀（带点，如 `.exe`）
///
/// 异常处理：
/// - 读取目录失败返回 IO 错误
pub fn find_installers(apps_dir: &Path, suffixes: &[String]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(apps_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if has_suffix(&path, suffixes) {
            found.push(path);
        }
    }
    found.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(found)
}

/// 计算某个安装包的附加参数：第一条匹配文件名的规则生效。
///
/// 返回值：
/// - 无匹配规则：空列表
///
/// 说明：
/// - 无法解析的模式会被跳过并记录警告
pub fn installer_args(rules: &[InstallerArgRule], file_name: &str) -> Vec<String> {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    for rule in rules {
        let pattern = match Pattern::new(&rule.pattern) {
            Ok(p) => p,
            Err(e) => {
                warn!("motif invalide « {} » : {e}", rule.pattern);
                continue;
            }
        };
        debug!("motif={:?}; args={:?}", rule.pattern, rule.args);
        if pattern.matches_with(file_name, options) {
            return rule.split_args();
        }
    }
    Vec::new()
}

/// 选出目录下“最新”的 `.msp` 补丁（文件名自然排序后的最后一个）。
pub fn latest_patch(apps_dir: &Path) -> Result<Option<PathBuf>> {
    let patches = find_installers(apps_dir, &[".msp".to_string()])?;
    Ok(patches.into_iter().last())
}

/// 生成安装计划。
///
/// 参数：
/// - `installer`：安装包路径
/// - `rules`：`installer-args.csv` 规则
/// - `patch_marker`：文件名包含该标记时追加 `PATCH=` 参数（空字符串表示禁用）
///
/// 返回值：
/// - 后缀不是已知安装包类型：`Ok(None)`
pub fn plan_install(installer: &Path, rules: &[InstallerArgRule], patch_marker: &str) -> Result<Option<InstallPlan>> {
    let Some(kind) = InstallerKind::from_path(installer) else {
        return Ok(None);
    };
    let name = file_name(installer);
    let mut args = installer_args(rules, &name);

    if kind != InstallerKind::Archive && !patch_marker.is_empty() && name.contains(patch_marker) {
        if let Some(dir) = installer.parent() {
            if let Some(patch) = latest_patch(dir)? {
                args.push(format!("PATCH={}", patch.display()));
            }
        }
    }
    debug!("installer={}; args={:?}", installer.display(), args);
    Ok(Some(InstallPlan {
        installer: installer.to_path_buf(),
        kind,
        args,
    }))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    suffixes
        .iter()
        .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// 自然排序：连续数字按数值比较（`9.4.101` 排在 `9.4.99` 之后），其余按字符比较（不区分大小写）。
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.chars().peekable(), b.chars().peekable());
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut a);
                let nb = take_number(&mut b);
                // 去掉前导零后先比位数，再逐位比较
                let (ta, tb) = (na.trim_start_matches('0'), nb.trim_start_matches('0'));
                let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        s.push(c);
        it.next();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, args: &str) -> InstallerArgRule {
        InstallerArgRule {
            pattern: pattern.into(),
            args: args.into(),
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![rule("Paratext*.exe", "/quiet"), rule("*.exe", "/S")];
        assert_eq!(installer_args(&rules, "Paratext9.exe"), vec!["/quiet"]);
        assert_eq!(installer_args(&rules, "Other.exe"), vec!["/S"]);
        assert!(installer_args(&rules, "Other.msi").is_empty());
    }

    #[test]
    fn matching_ignores_case_and_skips_bad_patterns() {
        let rules = vec![rule("[", "/never"), rule("paratext*.EXE", "/quiet")];
        assert_eq!(installer_args(&rules, "Paratext9.exe"), vec!["/quiet"]);
    }

    #[test]
    fn natural_order_for_versions() {
        assert_eq!(natural_cmp("Paratext_9.4.99.msp", "Paratext_9.4.101.msp"), Ordering::Less);
        assert_eq!(natural_cmp("a10", "a9"), Ordering::Greater);
        assert_eq!(natural_cmp("A1", "a01"), Ordering::Equal);
        assert_eq!(natural_cmp("abc", "abcd"), Ordering::Less);
    }

    #[test]
    fn command_line_by_kind() {
        let exe = InstallPlan {
            installer: PathBuf::from("Setup.exe"),
            kind: InstallerKind::Exe,
            args: vec!["/S".into()],
        };
        assert_eq!(exe.command().unwrap(), vec!["Setup.exe", "/S"]);

        let msi = InstallPlan {
            installer: PathBuf::from("Tool.msi"),
            kind: InstallerKind::Msi,
            args: vec!["/qn".into()],
        };
        assert_eq!(msi.command().unwrap(), vec!["msiexec.exe", "/i", "Tool.msi", "/qn"]);

        let zip = InstallPlan {
            installer: PathBuf::from("Fonts.zip"),
            kind: InstallerKind::Archive,
            args: vec![],
        };
        assert!(zip.command().is_none());
    }
}
