#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Configurer：Windows 新机配置工具。
//!
//! 职责：
//! - 确保本地管理员账户、区域/地理位置、时区
//! - 按 `data/registry-values.csv` 写入注册表（值已相同则跳过）
//! - 关闭 BitLocker
//! - 逐个询问并安装 `Downloads\apps` 下的安装包（`data/installer-args.csv` 提供参数）
//!
//! 运行方式：
//! - 默认打开窗口；`--run-config` 在控制台中直接执行
//! - 发布版为窗口子系统：启动时附加到父进程控制台，`--run-config` 无控制台时新建一个
//! - 窗口模式下的致命错误（含非管理员）以消息框提示
//!
//! 权限要求：
//! - 必须以管理员权限运行，否则退出码为 1
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

mod app;
mod gui;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use configurer_core::paths::{self, APP_NAME};
use configurer_core::settings::{Settings, SETTINGS_FILE};
use configurer_windows::{desktop, elevation};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::ui::ConsoleReporter;

/// 命令行参数。
///
/// 说明：
/// - `data_dir` 默认为 exe 所在目录下的 `data`
/// - `settings` 默认为 `<data_dir>\settings.json`（不存在时使用内置默认值）
#[derive(Debug, Parser)]
#[command(name = "configurer", version)]
struct Cli {
    /// 在控制台中执行配置，不打开窗口。
    #[arg(long, default_value_t = false)]
    run_config: bool,

    /// 控制台模式下对所有安装提问回答“是”。
    #[arg(long, default_value_t = false)]
    yes: bool,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    settings: Option<PathBuf>,
}

/// 程序入口：解析参数、初始化日志、检查权限并启动配置。
///
/// 异常处理：
/// - 非管理员、设置文件无效、窗口无法启动：记录日志并返回 `Err`（退出码 1）
/// - 窗口模式下同时弹出错误消息框
fn main() -> Result<()> {
    let attached = desktop::attach_parent_console();
    let cli = Cli::parse();
    if cli.run_config && !attached {
        desktop::alloc_console();
    }
    let gui = !cli.run_config;

    init_logging().inspect_err(|e| {
        if gui {
            desktop::show_error(APP_NAME, &format!("{e:#}"));
        }
    })?;
    info!("{APP_NAME} {}", env!("CARGO_PKG_VERSION"));

    run(cli).inspect_err(|e| {
        error!("{e:#}");
        if gui {
            desktop::show_error(APP_NAME, &format!("{e:#}"));
        }
    })
}

/// 日志写入 `<exe 所在目录>\Configurer.log`，每次运行覆盖。
///
/// 说明：
/// - 级别由 `RUST_LOG` 控制，默认 `debug`
fn init_logging() -> Result<()> {
    let path = paths::log_file()?;
    let file = File::create(&path).with_context(|| format!("Échec de création du journal : {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    elevation::require_admin()?;

    let cwd = std::env::current_dir().context("Échec de lecture du répertoire courant")?;
    let data_dir = match cli.data_dir.as_deref() {
        Some(dir) => paths::resolve_path(&cwd, dir),
        None => paths::default_data_dir()?,
    };
    let settings_path = match cli.settings.as_deref() {
        Some(file) => paths::resolve_path(&cwd, file),
        None => data_dir.join(SETTINGS_FILE),
    };
    let settings = Settings::load(&settings_path)?;
    info!("données : {}; paramètres : {}", data_dir.display(), settings_path.display());

    if cli.run_config {
        let app = App::from_settings(settings, data_dir)?;
        app.set_config(&ConsoleReporter::new(cli.yes));
        Ok(())
    } else {
        gui::run(settings, data_dir)
    }
}
