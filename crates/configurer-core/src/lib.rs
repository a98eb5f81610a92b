//! Configurer 核心库（跨平台，不直接依赖 Win32）。
//!
//! 功能：
//! - 注册表路径模型与幂等写入原语（后端通过 [`store::RegistryStore`] 注入）
//! - 外部命令执行器（捕获输出、按控制台编码解码）
//! - CSV 数据、安装包发现与参数计算、运行参数与路径约定
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod console;
pub mod data;
pub mod error;
pub mod installer;
pub mod paths;
pub mod regpath;
pub mod settings;
pub mod store;

pub use error::{ConfigurerError, Result};
