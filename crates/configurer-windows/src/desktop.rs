//! 桌面交互：控制台挂接与错误消息框。
//!
//! 说明：
//! - 发布版以 `windows` 子系统构建，进程启动时没有控制台
//! - `--run-config` 需要控制台输出与输入；窗口模式的致命错误需要消息框
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

/// 挂接到父进程（如 cmd / PowerShell）的控制台。
///
/// 返回值：
/// - `true`：已挂接，或非 Windows 平台
/// - `false`：没有父控制台，或进程已拥有控制台
#[cfg(windows)]
pub fn attach_parent_console() -> bool {
    use windows::Win32::System::Console::{AttachConsole, ATTACH_PARENT_PROCESS};
    unsafe { AttachConsole(ATTACH_PARENT_PROCESS).is_ok() }
}

#[cfg(not(windows))]
pub fn attach_parent_console() -> bool {
    true
}

/// 为进程新建控制台（从资源管理器启动 `--run-config` 时使用）。
///
/// 返回值：
/// - `false`：进程已拥有控制台或创建失败
#[cfg(windows)]
pub fn alloc_console() -> bool {
    use windows::Win32::System::Console::AllocConsole;
    unsafe { AllocConsole().is_ok() }
}

#[cfg(not(windows))]
pub fn alloc_console() -> bool {
    false
}

/// 以模态消息框显示错误（阻塞直到用户关闭）。
#[cfg(windows)]
pub fn show_error(title: &str, text: &str) {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let text = HSTRING::from(text);
    let title = HSTRING::from(title);
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(text.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(windows))]
pub fn show_error(title: &str, text: &str) {
    eprintln!("{title} : {text}");
}
