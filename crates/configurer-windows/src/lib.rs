//! Windows 平台能力封装（注册表、账户、区域/时区、BitLocker、权限检测、控制台与消息框）。
//!
//! 目标：
//! - 将 Windows 专有 API 与系统命令集中封装，避免上层流程代码直接依赖 Win32 细节
//! - 统一错误处理风格（以 `anyhow::Result` 形式向上返回；注册表后端实现核心库的 `RegistryStore`）
//!
//! 安全注意：
//! - 这里的操作几乎都需要管理员权限
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod account;
pub mod bitlocker;
pub mod desktop;
pub mod elevation;
pub mod locale;
pub mod regexe;
#[cfg(windows)]
pub mod registry;
