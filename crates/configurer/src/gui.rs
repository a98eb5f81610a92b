//! 配置窗口（eframe）。
//!
//! 实现要点：
//! - 点击“Lancer”后在单个后台线程中执行整个配置流程，按钮在流程结束前保持禁用
//! - 后台线程通过 channel 发送状态/错误/提问；提问以模态窗口展示，回答经回复 channel 返回
//! - 后台线程退出（包括 panic）时总会发送 `Done`，按钮随之恢复
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use configurer_core::paths::APP_NAME;
use configurer_core::settings::Settings;
use eframe::egui;
use tracing::warn;

use crate::app::{self, App};
use crate::ui::Reporter;

/// 后台线程发往窗口的消息。
enum Event {
    Status(String),
    Error { text: String, detail: Option<String> },
    Ask { question: String, reply: Sender<bool> },
    Done,
}

/// 后台线程使用的 [`Reporter`]：转发到窗口并触发重绘。
struct ChannelReporter {
    events: Sender<Event>,
    ctx: egui::Context,
}

impl ChannelReporter {
    fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            warn!("fenêtre fermée, message ignoré");
        }
        self.ctx.request_repaint();
    }
}

impl Reporter for ChannelReporter {
    fn status(&self, text: &str) {
        self.send(Event::Status(text.to_string()));
    }

    fn error(&self, text: &str, detail: Option<&str>) {
        self.send(Event::Error {
            text: text.to_string(),
            detail: detail.map(str::to_string),
        });
    }

    /// 阻塞等待用户回答；窗口关闭时视为“否”。
    fn ask(&self, question: &str) -> bool {
        let (reply, answer) = mpsc::channel();
        self.send(Event::Ask {
            question: question.to_string(),
            reply,
        });
        answer.recv().unwrap_or(false)
    }
}

/// 线程结束时发送 [`Event::Done`]；panic 展开时同样触发。
struct DoneGuard {
    events: Sender<Event>,
    ctx: egui::Context,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let _ = self.events.send(Event::Error {
                text: "Un problème est arrivé : ".to_string(),
                detail: Some("la configuration s'est arrêtée de façon inattendue".to_string()),
            });
        }
        let _ = self.events.send(Event::Done);
        self.ctx.request_repaint();
    }
}

/// 状态区中的一行。
struct Line {
    text: String,
    is_error: bool,
}

/// 窗口状态。
struct ConfigWindow {
    settings: Settings,
    data_dir: PathBuf,
    lines: Vec<Line>,
    events: Option<Receiver<Event>>,
    question: Option<(String, Sender<bool>)>,
}

impl ConfigWindow {
    fn new(settings: Settings, data_dir: PathBuf) -> Self {
        Self {
            settings,
            data_dir,
            lines: Vec::new(),
            events: None,
            question: None,
        }
    }

    fn running(&self) -> bool {
        self.events.is_some()
    }

    /// 启动后台配置线程（同一时间只有一个）。
    fn start(&mut self, ctx: &egui::Context) {
        if self.running() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.events = Some(rx);

        let settings = self.settings.clone();
        let data_dir = self.data_dir.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _done = DoneGuard {
                events: tx.clone(),
                ctx: ctx.clone(),
            };
            let reporter = ChannelReporter {
                events: tx,
                ctx,
            };
            match App::from_settings(settings, data_dir) {
                Ok(app) => app.set_config(&reporter),
                Err(e) => app::report_error(
                    &reporter,
                    "Un problème est arrivé : ",
                    Some(&format!("{e:#}")),
                ),
            }
        });
    }

    fn drain_events(&mut self) {
        let drained: Vec<Event> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for event in drained {
            match event {
                Event::Status(text) => self.lines.push(Line { text, is_error: false }),
                Event::Error { text, detail } => {
                    let text = match detail {
                        Some(detail) => format!("{text}\n{detail}"),
                        None => text,
                    };
                    self.lines.push(Line { text, is_error: true });
                }
                Event::Ask { question, reply } => self.question = Some((question, reply)),
                Event::Done => self.events = None,
            }
        }
    }

    fn show_question(&mut self, ctx: &egui::Context) {
        let Some((question, _)) = &self.question else {
            return;
        };
        let mut answer = None;
        egui::Window::new("Question")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(question.as_str());
                ui.horizontal(|ui| {
                    if ui.button("Oui").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Non").clicked() {
                        answer = Some(false);
                    }
                });
            });
        if let Some(answer) = answer {
            if let Some((_, reply)) = self.question.take() {
                let _ = reply.send(answer);
            }
        }
    }
}

impl eframe::App for ConfigWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Configurer l'ordinateur : ");
                let enabled = !self.running();
                if ui.add_enabled(enabled, egui::Button::new("Lancer")).clicked() {
                    self.start(ctx);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.lines {
                        if line.is_error {
                            ui.colored_label(egui::Color32::RED, &line.text);
                        } else {
                            ui.label(&line.text);
                        }
                    }
                });
        });

        self.show_question(ctx);
    }
}

/// 打开配置窗口，直到窗口关闭才返回。
pub fn run(settings: Settings, data_dir: PathBuf) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 320.0])
            .with_min_inner_size([320.0, 180.0]),
        ..Default::default()
    };
    let window = ConfigWindow::new(settings, data_dir);
    eframe::run_native(
        &format!("ACATBA - {APP_NAME}"),
        options,
        Box::new(|_cc| Box::new(window)),
    )
    .map_err(|e| anyhow!("Échec de démarrage de la fenêtre : {e}"))?;
    Ok(())
}
