//! 配置流程编排。
//!
//! 顺序：
//! 1) 管理员账户
//! 2) 系统区域与地理位置
//! 3) 时区
//! 4) 注册表（`registry-values.csv`）
//! 5) 关闭 BitLocker
//! 6) 安装 `Downloads\apps` 下的安装包（逐个询问）
//!
//! 异常处理：
//! - 每一步独立执行：失败只记录并提示，随后继续下一步；不回滚、不重试
//! - 注册表行、BitLocker 驱动器、安装包也逐项隔离
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::Result;
use configurer_core::console::CommandRunner;
use configurer_core::data::{self, InstallerArgRule, INSTALLER_ARGS_FILE, REGISTRY_VALUES_FILE};
use configurer_core::installer;
use configurer_core::paths;
use configurer_core::settings::{RegistryBackend, Settings};
use configurer_core::store::{self, ApplyOutcome, RegistryStore};
use configurer_windows::account::{self, AccountOutcome, MembershipOutcome};
use configurer_windows::bitlocker::{self, BitlockerOutcome};
use configurer_windows::locale::{self, TimezoneOutcome};
use configurer_windows::regexe::RegExeStore;
use tracing::{debug, error, info};

use crate::ui::Reporter;

/// 一次配置所需的全部上下文。
pub struct App {
    settings: Settings,
    runner: CommandRunner,
    store: Box<dyn RegistryStore>,
    data_dir: PathBuf,
    apps_dir: PathBuf,
}

impl App {
    pub fn new(
        settings: Settings,
        runner: CommandRunner,
        store: Box<dyn RegistryStore>,
        data_dir: PathBuf,
        apps_dir: PathBuf,
    ) -> Self {
        Self {
            settings,
            runner,
            store,
            data_dir,
            apps_dir,
        }
    }

    /// 按设置构造命令执行器、注册表后端与安装包目录。
    ///
    /// 异常处理：
    /// - 无法确定用户主目录时返回错误
    pub fn from_settings(settings: Settings, data_dir: PathBuf) -> Result<Self> {
        let runner = CommandRunner::new(settings.console_encoding, true);
        let store = registry_store(settings.registry_backend, runner);
        let apps_dir = paths::apps_dir(&settings.apps_subdir)?;
        debug!("data_dir={}; apps_dir={}", data_dir.display(), apps_dir.display());
        Ok(Self::new(settings, runner, store, data_dir, apps_dir))
    }

    /// 执行完整配置流程。
    pub fn set_config(&self, r: &dyn Reporter) {
        self.run_step(r, "compte administrateur", || self.ensure_admin_account(r));
        self.run_step(r, "langue", || self.set_locale(r));
        self.run_step(r, "fuseau horaire", || self.set_timezone(r));
        self.run_step(r, "registre", || self.update_registry(r));
        self.run_step(r, "BitLocker", || self.disable_bitlocker(r));
        self.run_step(r, "applications", || self.install_apps(r));
        info!("configuration terminée");
    }

    fn run_step(&self, r: &dyn Reporter, name: &str, step: impl FnOnce() -> Result<()>) {
        debug!("étape : {name}");
        if let Err(e) = step() {
            report_error(
                r,
                "Un problème est arrivé lors de la configuration.",
                Some(&format!("{e:#}")),
            );
        }
    }

    /// 确保本地管理员账户存在且属于 Administrators 组。
    pub fn ensure_admin_account(&self, r: &dyn Reporter) -> Result<()> {
        let acct = &self.settings.admin_account;
        match account::ensure_user(&self.runner, &acct.name, &acct.password, &acct.comment)? {
            AccountOutcome::AlreadyExists => status(r, &format!("Compte \"{}\" existe déjà.", acct.name)),
            AccountOutcome::Created => status(r, &format!("Compte \"{}\" a été créé.", acct.name)),
        }
        match account::ensure_admin_member(&self.runner, &acct.name)? {
            MembershipOutcome::AlreadyMember => status(
                r,
                &format!("Compte \"{}\" déjà configuré comme Administrateur.", acct.name),
            ),
            MembershipOutcome::Added => status(
                r,
                &format!("Compte \"{}\" a été configuré comme Administrateur.", acct.name),
            ),
        }
        Ok(())
    }

    /// 系统区域与地理位置；两条命令互不影响。
    pub fn set_locale(&self, r: &dyn Reporter) -> Result<()> {
        let locale_id = &self.settings.system_locale;
        match locale::set_system_locale(&self.runner, locale_id) {
            Ok(()) => status(r, &format!("Langue vérifiée : {locale_id}")),
            Err(e) => report_error(r, "Échec d'exécution de commande powershell", Some(&format!("{e:#}"))),
        }
        let geo_id = self.settings.geo_id;
        match locale::set_home_location(&self.runner, geo_id) {
            Ok(()) => status(r, &format!("Emplacement vérifié : GeoId {geo_id}")),
            Err(e) => report_error(r, "Échec d'exécution de commande powershell", Some(&format!("{e:#}"))),
        }
        Ok(())
    }

    pub fn set_timezone(&self, r: &dyn Reporter) -> Result<()> {
        let tz = &self.settings.timezone_id;
        match locale::ensure_timezone(&self.runner, tz)? {
            TimezoneOutcome::Changed => status(r, &format!("Fuseau horaire configuré à \"{tz}\".")),
            TimezoneOutcome::AlreadySet => status(r, &format!("Fuseau horaire est déjà configuré à \"{tz}\".")),
        }
        Ok(())
    }

    /// 逐行应用 `registry-values.csv`；值已相同的行不写入。
    ///
    /// 异常处理：
    /// - CSV 不存在：提示后跳过本步
    /// - CSV 无法打开或表头无法读取：返回错误（整步失败）
    /// - 单行无法解码、校验或写入失败：提示后继续下一行
    pub fn update_registry(&self, r: &dyn Reporter) -> Result<()> {
        let csv_path = self.data_dir.join(REGISTRY_VALUES_FILE);
        let Some(rows) = data::load_registry_values(&csv_path)? else {
            status(r, &format!("\"{}\" n'existe pas.", csv_path.display()));
            return Ok(());
        };
        for record in rows {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    report_error(r, "Valeur invalide", Some(&e.to_string()));
                    continue;
                }
            };
            let spec = match row.validate() {
                Ok(spec) => spec,
                Err(e) => {
                    report_error(r, "Valeur invalide", Some(&e.to_string()));
                    continue;
                }
            };
            status(
                r,
                &format!("{} -> {} [{}] = {}", spec.path, spec.name, spec.value_type, spec.value),
            );
            let outcome = store::set_value_if_different(
                self.store.as_ref(),
                &spec.path,
                &spec.name,
                &spec.value_type,
                &spec.value,
            );
            match outcome {
                Ok(ApplyOutcome::Written) => {}
                Ok(ApplyOutcome::AlreadySet) => status(r, "Valeur déjà configurée"),
                Err(e) => report_error(
                    r,
                    "Erreur lors de la modification du registre",
                    Some(&format!("{spec:?}\n{e}")),
                ),
            }
        }
        Ok(())
    }

    pub fn disable_bitlocker(&self, r: &dyn Reporter) -> Result<()> {
        for drive in &self.settings.bitlocker_drives {
            match bitlocker::disable(&self.runner, drive) {
                Ok(BitlockerOutcome::Disabled) => status(r, &format!("BitLocker désactivé sur {drive}")),
                Ok(BitlockerOutcome::NotActive) => status(r, &format!("BitLocker n'est pas activé sur {drive}")),
                Err(e) => report_error(r, "Échec de désactivation de BitLocker", Some(&format!("{e:#}"))),
            }
        }
        Ok(())
    }

    /// 逐个询问并安装安装包目录中的文件。
    pub fn install_apps(&self, r: &dyn Reporter) -> Result<()> {
        if !self.apps_dir.is_dir() {
            status(r, &format!("\"{}\" n'existe pas.", self.apps_dir.display()));
            return Ok(());
        }
        let args_path = self.data_dir.join(INSTALLER_ARGS_FILE);
        let rules = data::load_installer_args(&args_path)?.unwrap_or_else(|| {
            debug!("\"{}\" n'existe pas", args_path.display());
            Vec::new()
        });
        for path in installer::find_installers(&self.apps_dir, &self.settings.installer_suffixes)? {
            let name = display_name(&path);
            if !r.ask(&format!("Installer {name} ?")) {
                debug!("installation refusée : {name}");
                continue;
            }
            self.install_app(r, &path, &name, &rules);
        }
        Ok(())
    }

    fn install_app(&self, r: &dyn Reporter, path: &Path, name: &str, rules: &[InstallerArgRule]) {
        let plan = match installer::plan_install(path, rules, &self.settings.patch_marker) {
            Ok(Some(plan)) => plan,
            Ok(None) => return,
            Err(e) => {
                report_error(r, "Échec d'installation d'appli", Some(&format!("{}\n{e}", path.display())));
                return;
            }
        };
        let Some(command) = plan.command() else {
            status(r, &format!("\"{name}\" est une archive, rien à exécuter."));
            return;
        };
        status(r, &format!("Installation de \"{}\"", command.join(" ")));
        match self.runner.run_checked(&command) {
            Ok(_) => status(r, &format!("\"{name}\" installé.")),
            Err(e) => report_error(r, "Échec d'installation d'appli", Some(&format!("{}\n{e}", path.display()))),
        }
    }
}

/// 按设置选择注册表后端；非 Windows 平台只有 `reg.exe` 后端。
fn registry_store(backend: RegistryBackend, runner: CommandRunner) -> Box<dyn RegistryStore> {
    match backend {
        #[cfg(windows)]
        RegistryBackend::Winreg => Box::new(configurer_windows::registry::WinRegistry::new()),
        #[cfg(not(windows))]
        RegistryBackend::Winreg => {
            tracing::warn!("winreg indisponible sur cette plateforme, utilisation de reg.exe");
            Box::new(RegExeStore::new(runner))
        }
        RegistryBackend::RegExe => Box::new(RegExeStore::new(runner)),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn status(r: &dyn Reporter, text: &str) {
    info!("{text}");
    r.status(text);
}

pub(crate) fn report_error(r: &dyn Reporter, text: &str, detail: Option<&str>) {
    match detail {
        Some(detail) => error!("{text}\n{detail}"),
        None => error!("{text}"),
    }
    r.error(text, detail);
}
