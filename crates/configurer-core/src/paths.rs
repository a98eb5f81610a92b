//! 统一路径约定（数据目录、日志文件、下载目录）。
//!
//! 布局：
//! - `<exe 所在目录>\data\`：CSV 数据与 `settings.json`
//! - `<exe 所在目录>\Configurer.log`：日志（每次运行覆盖）
//! - `%USERPROFILE%\Downloads\apps\`：待安装的安装包
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use crate::error::{ConfigurerError, Result};

/// 应用名称（窗口标题、日志文件名）。
pub const APP_NAME: &str = "Configurer";

/// 数据目录名。
pub const DATA_DIR: &str = "data";

/// 下载目录名。
pub const DOWNLOADS_DIR: &str = "Downloads";

/// 获取当前可执行文件所在目录。
///
/// 异常处理：
/// - 无法获取当前 exe 路径时返回 IO 错误
pub fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.parent().unwrap_or_else(|| Path::new(".")).to_path_buf())
}

/// 默认数据目录：`<exe 所在目录>\data`。
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(exe_dir()?.join(DATA_DIR))
}

/// 日志文件路径：`<exe 所在目录>\Configurer.log`。
pub fn log_file() -> Result<PathBuf> {
    Ok(exe_dir()?.join(format!("{APP_NAME}.log")))
}

/// 当前用户主目录：优先 `USERPROFILE`，其次 `HOME`。
///
/// 异常处理：
/// - 两个环境变量都不存在时返回错误
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
        .ok_or_else(|| {
            ConfigurerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "USERPROFILE/HOME introuvable",
            ))
        })
}

/// 安装包目录：`<主目录>\Downloads\<apps_subdir>`。
pub fn apps_dir(apps_subdir: &str) -> Result<PathBuf> {
    Ok(home_dir()?.join(DOWNLOADS_DIR).join(apps_subdir))
}

/// 将命令行中的路径参数解析为实际路径。
///
/// 规则：
/// - 绝对路径：直接返回
/// - 相对路径：返回 `base.join(raw)`
pub fn resolve_path(base: &Path, raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base.join(raw)
    }
}
