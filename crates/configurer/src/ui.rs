//! 消息输出与交互（状态、错误、是/否提问）。
//!
//! 说明：
//! - 配置流程只依赖 [`Reporter`]，控制台模式与窗口模式各自实现
//! - 写日志由流程层统一完成，实现方只负责展示
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io::{self, BufRead, Write};

use tracing::warn;

/// 配置流程的消息出口。
pub trait Reporter {
    /// 普通状态消息。
    fn status(&self, text: &str);
    /// 错误消息，`detail` 为诊断信息（命令输出、CSV 行等）。
    fn error(&self, text: &str, detail: Option<&str>);
    /// 是/否提问；返回 `true` 表示“是”。
    fn ask(&self, question: &str) -> bool;
}

/// 控制台模式（`--run-config`）。
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter {
    /// `--yes`：所有提问直接回答“是”。
    pub assume_yes: bool,
}

impl ConsoleReporter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Reporter for ConsoleReporter {
    fn status(&self, text: &str) {
        println!("{text}");
    }

    fn error(&self, text: &str, detail: Option<&str>) {
        eprintln!("{text}");
        if let Some(detail) = detail {
            eprintln!("{detail}");
        }
    }

    fn ask(&self, question: &str) -> bool {
        self.ask_with(question, &mut io::stdin().lock(), &mut io::stdout())
    }
}

impl ConsoleReporter {
    /// 在给定的输入/输出上提问。
    ///
    /// 返回值：
    /// - 输入已结束或读取失败：`false`，并提示安装被跳过
    pub fn ask_with(&self, question: &str, input: &mut impl BufRead, out: &mut impl Write) -> bool {
        if self.assume_yes {
            let _ = writeln!(out, "{question} [o/n] o");
            return true;
        }
        let _ = write!(out, "{question} [o/n] ");
        let _ = out.flush();
        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(n) if n > 0 => is_yes(&answer),
            Ok(_) | Err(_) => {
                let _ = writeln!(out);
                warn!("aucune réponse à « {question} », réponse « non » retenue (utiliser --yes)");
                eprintln!("Aucune réponse : « non » retenu (utiliser --yes pour tout accepter).");
                false
            }
        }
    }
}

/// 解析控制台回答：`o`/`oui`/`y`/`yes`（不区分大小写）为“是”，其余为“否”。
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    )
}
