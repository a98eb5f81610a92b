//! 核心错误类型。
//!
//! 说明：
//! - 注册表路径、值类型、外部命令、CSV 数据的错误统一收敛到 [`ConfigurerError`]
//! - 上层（windows 封装与主程序）通过 `anyhow` 附加上下文后继续向上返回
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use thiserror::Error;

use crate::console::ProcessResult;

/// 核心库统一结果类型。
pub type Result<T> = std::result::Result<T, ConfigurerError>;

/// 核心错误分类。
#[derive(Debug, Error)]
pub enum ConfigurerError {
    /// 路径首段不是已知的根键别名。
    #[error("Clé racine inconnue : {0}")]
    UnknownRootKey(String),

    /// 路径无法拆分为“根键 + 子路径”。
    #[error("Chemin de registre invalide : {0}")]
    MalformedPath(String),

    /// 值类型字符串不在支持列表中。
    #[error("Registry Value Type inconnu : {0}")]
    UndefinedValueType(String),

    /// 文本值无法转换为声明类型的原生表示。
    #[error("Valeur « {value} » invalide pour le type {value_type}")]
    InvalidValueEncoding { value_type: String, value: String },

    /// 打开/读取键失败（非“不存在”）。
    #[error("Accès au registre refusé : {path}\n{message}")]
    RegistryAccess { path: String, message: String },

    /// 创建键或写入值失败。
    #[error("Échec de modification du registre : {path}\n{message}")]
    RegistryOperationFailed { path: String, message: String },

    /// 外部命令退出码非 0（附带完整输出）。
    #[error("{0}")]
    NonZeroExit(Box<ProcessResult>),

    /// 外部命令无法启动。
    #[error("Impossible de lancer « {command} » : {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV 行缺少必填列。
    #[error("Valeur invalide dans : {row}")]
    MissingField { field: &'static str, row: String },

    /// CSV 文件解析失败。
    #[error("Échec de lecture de « {path} » : {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// 设置文件解析失败。
    #[error("Paramètres invalides dans « {path} » : {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 其他 IO 错误。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigurerError {
    /// 是否为“外部命令退出码非 0”。
    ///
    /// 用途：
    /// - 部分调用点（如 BitLocker 状态检测）需要把非 0 退出码当作普通结果处理
    pub fn is_non_zero_exit(&self) -> bool {
        matches!(self, ConfigurerError::NonZeroExit(_))
    }

    /// 将读访问失败归为“修改失败”（建键链过程中的检查属于修改操作）。
    pub fn into_operation_failed(self) -> Self {
        match self {
            ConfigurerError::RegistryAccess { path, message } => {
                ConfigurerError::RegistryOperationFailed { path, message }
            }
            other => other,
        }
    }
}
