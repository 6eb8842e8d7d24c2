use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use client_core::{
    human_readable_bytes, ControllerView, DirectorySink, FileCandidate, InputEvent,
    InteractionController, OperationDispatcher, OperationResult,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{OperationKind, ToastKind, ToolSlot};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{describe_health, UiEvent},
        orchestration::{request_health, submit_job},
    },
};

const DROP_ZONE_HEIGHT: f32 = 150.0;
const TILE_SIZE: egui::Vec2 = egui::vec2(170.0, 72.0);

/// Work collected while drawing a frame, applied once drawing is done.
enum UiAction {
    Input(InputEvent),
    PickFiles,
    RefreshHealth,
}

pub struct PdfMasterApp {
    controller: InteractionController,
    sink: DirectorySink,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    watermark_text: String,
    service_status: String,
    last_saved: Option<PathBuf>,
}

impl PdfMasterApp {
    pub fn new(
        dispatcher: OperationDispatcher,
        sink: DirectorySink,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let mut app = Self {
            controller: InteractionController::new(dispatcher),
            sink,
            cmd_tx,
            ui_rx,
            watermark_text: String::new(),
            service_status: "Checking service...".to_string(),
            last_saved: None,
        };
        app.refresh_health();
        app
    }

    fn refresh_health(&mut self) {
        if let Err(reason) = request_health(&self.cmd_tx) {
            self.service_status = reason;
        }
    }

    fn apply(&mut self, event: InputEvent) {
        let opens_text_dialog = matches!(event, InputEvent::Trigger(OperationKind::Watermark));
        if let Some(job) = self.controller.handle(event) {
            if let Err(result) = submit_job(&self.cmd_tx, job) {
                self.finish(result);
            }
        }
        if opens_text_dialog && self.controller.view(Instant::now()).awaiting_text() {
            self.watermark_text.clear();
        }
    }

    fn finish(&mut self, result: OperationResult) {
        if let Some(path) = self.controller.complete(result, &mut self.sink) {
            self.last_saved = Some(path);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Finished(result) => self.finish(result),
                UiEvent::Health(result) => {
                    self.service_status = describe_health(&result);
                }
                UiEvent::BackendUnavailable(reason) => {
                    tracing::error!("{reason}");
                    self.service_status = reason;
                }
            }
        }
    }

    /// Translates OS drag-and-drop state into controller events.
    fn collect_file_input(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });

        if !dropped.is_empty() {
            let candidates = dropped.into_iter().filter_map(candidate_from_drop).collect();
            self.apply(InputEvent::Dropped(candidates));
            return;
        }

        let drag_active = self.controller.view(Instant::now()).drag_active;
        if hovering && !drag_active {
            self.apply(InputEvent::DragEnter);
        } else if !hovering && drag_active {
            self.apply(InputEvent::DragLeave);
        }
    }

    fn pick_files(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("PDF documents", &["pdf"]);
        if let Some(dir) = dirs::document_dir() {
            dialog = dialog.set_directory(dir);
        }
        let Some(paths) = dialog.pick_files() else {
            return;
        };
        let candidates = paths
            .iter()
            .filter_map(|path| read_candidate(path))
            .collect();
        self.apply(InputEvent::Picked(candidates));
    }
}

fn read_candidate(path: &Path) -> Option<FileCandidate> {
    match std::fs::read(path) {
        Ok(bytes) => Some(FileCandidate::from_path_bytes(path, bytes)),
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to read selected file: {err}");
            None
        }
    }
}

fn candidate_from_drop(file: egui::DroppedFile) -> Option<FileCandidate> {
    if let Some(bytes) = file.bytes {
        let mime = (!file.mime.is_empty()).then_some(file.mime);
        return Some(FileCandidate::new(file.name, mime, bytes));
    }
    file.path.as_deref().and_then(read_candidate)
}

fn show_drop_zone(ui: &mut egui::Ui, view: &ControllerView<'_>, actions: &mut Vec<UiAction>) {
    let size = egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let response = response.on_hover_cursor(egui::CursorIcon::PointingHand);

    let (fill, stroke) = if view.drag_active {
        (
            egui::Color32::from_rgb(38, 62, 96),
            egui::Stroke::new(2.0, egui::Color32::from_rgb(110, 160, 230)),
        )
    } else if response.hovered() {
        (
            egui::Color32::from_rgb(40, 44, 52),
            egui::Stroke::new(1.5, egui::Color32::from_rgb(120, 128, 140)),
        )
    } else {
        (
            egui::Color32::from_rgb(32, 35, 41),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(88, 94, 104)),
        )
    };
    let painter = ui.painter();
    painter.rect_filled(rect, 12.0, fill);
    painter.rect_stroke(rect, 12.0, stroke, egui::StrokeKind::Inside);

    let headline = if view.drag_active {
        "Release to select these files"
    } else {
        "Drop PDF files here"
    };
    painter.text(
        rect.center() - egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        headline,
        egui::FontId::proportional(20.0),
        egui::Color32::WHITE,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 16.0),
        egui::Align2::CENTER_CENTER,
        "or click to browse",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(170),
    );

    if response.clicked() {
        actions.push(UiAction::PickFiles);
    }
}

fn show_file_list(ui: &mut egui::Ui, view: &ControllerView<'_>, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        ui.heading(format!("Selected files ({})", view.files.len()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!view.files.is_empty(), egui::Button::new("Clear all"))
                .clicked()
            {
                actions.push(UiAction::Input(InputEvent::Clear));
            }
        });
    });

    if view.files.is_empty() {
        ui.label(egui::RichText::new("No files selected yet").weak());
        return;
    }

    egui::ScrollArea::vertical()
        .max_height(180.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for (index, file) in view.files.iter().enumerate() {
                egui::Frame::NONE
                    .fill(egui::Color32::from_rgb(36, 39, 46))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(10, 6))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(format!("{}.", index + 1));
                            ui.label(egui::RichText::new(file.name()).strong());
                            ui.label(
                                egui::RichText::new(human_readable_bytes(file.size())).weak(),
                            );
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("Remove").clicked() {
                                        actions.push(UiAction::Input(InputEvent::Remove(index)));
                                    }
                                },
                            );
                        });
                    });
                ui.add_space(4.0);
            }
        });
}

fn tile_caption(slot: ToolSlot) -> &'static str {
    match slot {
        ToolSlot::Merge => "Combine 2 or more PDFs",
        ToolSlot::Watermark => "Stamp text on 1 PDF",
        ToolSlot::Split => "Coming soon",
        ToolSlot::MoreTools => "Coming soon",
    }
}

fn show_tool_tiles(ui: &mut egui::Ui, view: &ControllerView<'_>, actions: &mut Vec<UiAction>) {
    ui.horizontal_wrapped(|ui| {
        for (slot, enabled) in view.slots {
            let label = format!("{}\n{}", slot.label(), tile_caption(slot));
            let clicked = ui
                .add_enabled(enabled, egui::Button::new(label).min_size(TILE_SIZE))
                .clicked();
            if clicked {
                if let Some(kind) = slot.operation() {
                    actions.push(UiAction::Input(InputEvent::Trigger(kind)));
                }
            }
        }
    });

    if let Some(kind) = view.running {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("{} in progress...", kind.label()));
            if ui.button("Cancel").clicked() {
                actions.push(UiAction::Input(InputEvent::Cancel));
            }
        });
    }
}

fn show_watermark_dialog(ctx: &egui::Context, text: &mut String, actions: &mut Vec<UiAction>) {
    egui::Window::new("Add watermark")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Enter watermark text:");
            let response = ui.text_edit_singleline(text);
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if text.is_empty() && !response.has_focus() {
                response.request_focus();
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() || submitted {
                    actions.push(UiAction::Input(InputEvent::WatermarkText(Some(
                        text.clone(),
                    ))));
                }
                if ui.button("Cancel").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape))
                {
                    actions.push(UiAction::Input(InputEvent::WatermarkText(None)));
                }
            });
        });
}

fn show_toast(ctx: &egui::Context, view: &ControllerView<'_>) {
    let Some(toast) = view.toast else {
        return;
    };
    let (fill, stroke) = match toast.kind {
        ToastKind::Success => (
            egui::Color32::from_rgb(44, 96, 62),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 168, 118)),
        ),
        ToastKind::Error => (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
        ),
    };
    egui::Area::new(egui::Id::new("toast"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -40.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&toast.message).color(egui::Color32::WHITE));
                });
        });
}

impl eframe::App for PdfMasterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_ui_events();
        self.collect_file_input(ctx);
        self.controller.tick(now);

        let mut actions = Vec::new();
        let view = self.controller.view(now);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.service_status).small());
                if ui.small_button("Refresh").clicked() {
                    actions.push(UiAction::RefreshHealth);
                }
                if let Some(path) = &self.last_saved {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("Last saved: {}", path.display())).small(),
                    );
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("PDF Master");
            ui.label(
                egui::RichText::new(format!("Saving to {}", self.sink.dir().display())).weak(),
            );
            ui.add_space(12.0);
            show_drop_zone(ui, &view, &mut actions);
            ui.add_space(16.0);
            show_file_list(ui, &view, &mut actions);
            ui.add_space(16.0);
            ui.heading("Tools");
            show_tool_tiles(ui, &view, &mut actions);
        });

        if view.awaiting_text() {
            show_watermark_dialog(ctx, &mut self.watermark_text, &mut actions);
        }
        show_toast(ctx, &view);

        let busy = view.busy;
        drop(view);

        for action in actions {
            match action {
                UiAction::Input(event) => self.apply(event),
                UiAction::PickFiles => self.pick_files(),
                UiAction::RefreshHealth => self.refresh_health(),
            }
        }

        let repaint_after = if busy {
            Some(Duration::from_millis(100))
        } else {
            self.controller.notifier().remaining(now)
        };
        if let Some(delay) = repaint_after {
            ctx.request_repaint_after(delay);
        }
    }
}
