//! Owner of all workflow state: selection, toast, busy flag and dispatch phase.
//!
//! Hosts feed [`InputEvent`]s in and render from [`ControllerView`]. Triggers
//! that pass validation come back as an [`OperationJob`]; the host executes it
//! wherever it runs network work and hands the result to
//! [`InteractionController::complete`].

use std::{path::PathBuf, time::Instant};

use shared::domain::{OperationKind, ToastMessage, ToolSlot};

use crate::{
    busy::CancelHandle,
    dispatcher::{
        DispatchPhase, OperationDispatcher, OperationJob, OperationRequest, OperationResult,
        PendingWatermark,
    },
    download::DownloadSink,
    error::WorkflowError,
    file_set::{FileCandidate, FileSet, SelectedFile},
    notifier::Notifier,
};

#[derive(Debug, Clone)]
pub enum InputEvent {
    DragEnter,
    DragLeave,
    Dropped(Vec<FileCandidate>),
    Picked(Vec<FileCandidate>),
    Remove(usize),
    Clear,
    Trigger(OperationKind),
    /// Answer to the watermark text request. `None` means the dialog was dismissed.
    WatermarkText(Option<String>),
    Cancel,
}

pub fn selection_message(count: usize) -> String {
    format!("{count} PDF file(s) selected")
}

pub const CLEARED_MESSAGE: &str = "Selection cleared (0 files)";

pub fn success_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Merge => "PDFs merged successfully",
        OperationKind::Watermark => "Watermark added successfully",
    }
}

struct ActiveOperation {
    kind: OperationKind,
    cancel: CancelHandle,
}

pub struct InteractionController {
    files: FileSet,
    notifier: Notifier,
    dispatcher: OperationDispatcher,
    drag_active: bool,
    phase: DispatchPhase,
    active: Option<ActiveOperation>,
}

/// Read-only projection for presentation.
#[derive(Debug, Clone)]
pub struct ControllerView<'a> {
    pub files: &'a [SelectedFile],
    pub drag_active: bool,
    pub busy: bool,
    pub phase: DispatchPhase,
    pub running: Option<OperationKind>,
    pub toast: Option<&'a ToastMessage>,
    pub slots: [(ToolSlot, bool); 4],
}

impl ControllerView<'_> {
    pub fn awaiting_text(&self) -> bool {
        self.phase == DispatchPhase::AwaitingText
    }

    pub fn slot_enabled(&self, slot: ToolSlot) -> bool {
        self.slots
            .iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, enabled)| *enabled)
            .unwrap_or(false)
    }
}

impl InteractionController {
    pub fn new(dispatcher: OperationDispatcher) -> Self {
        Self::with_notifier(dispatcher, Notifier::new())
    }

    pub fn with_notifier(dispatcher: OperationDispatcher, notifier: Notifier) -> Self {
        Self {
            files: FileSet::new(),
            notifier,
            dispatcher,
            drag_active: false,
            phase: DispatchPhase::Idle,
            active: None,
        }
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn dispatcher(&self) -> &OperationDispatcher {
        &self.dispatcher
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// True from launch until the result has been routed through
    /// [`complete`](Self::complete), even once the dispatcher has let go of
    /// its busy flag.
    pub fn is_busy(&self) -> bool {
        self.active.is_some() || self.dispatcher.busy_flag().is_set()
    }

    /// UI-side gate mirroring the dispatcher's own validation.
    pub fn can_trigger(&self, kind: OperationKind) -> bool {
        !self.is_busy()
            && self.phase != DispatchPhase::AwaitingText
            && kind.cardinality().admits(self.files.len())
    }

    pub fn view(&self, now: Instant) -> ControllerView<'_> {
        let slots = ToolSlot::ALL.map(|slot| {
            let enabled = slot
                .operation()
                .map(|kind| self.can_trigger(kind))
                .unwrap_or(false);
            (slot, enabled)
        });
        ControllerView {
            files: self.files.as_slice(),
            drag_active: self.drag_active,
            busy: self.is_busy(),
            phase: self.phase,
            running: self.active.as_ref().map(|active| active.kind),
            toast: self.notifier.visible(now),
            slots,
        }
    }

    /// Drops an elapsed toast.
    pub fn tick(&mut self, now: Instant) {
        self.notifier.prune(now);
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<OperationJob> {
        match event {
            InputEvent::DragEnter => {
                self.drag_active = true;
                None
            }
            InputEvent::DragLeave => {
                self.drag_active = false;
                None
            }
            InputEvent::Dropped(candidates) | InputEvent::Picked(candidates) => {
                self.drag_active = false;
                self.replace_selection(candidates);
                None
            }
            InputEvent::Remove(index) => {
                match self.files.remove_at(index) {
                    Ok(removed) => {
                        tracing::debug!(index, remaining = self.files.len(), "removed {}", removed.name());
                    }
                    Err(err) => tracing::warn!("ignoring remove: {err}"),
                }
                None
            }
            InputEvent::Clear => {
                self.files.clear();
                self.notifier.success(CLEARED_MESSAGE);
                None
            }
            InputEvent::Trigger(kind) => self.trigger(kind),
            InputEvent::WatermarkText(text) => self.submit_watermark_text(text),
            InputEvent::Cancel => {
                self.cancel();
                None
            }
        }
    }

    fn replace_selection(&mut self, candidates: Vec<FileCandidate>) {
        match self.files.replace(candidates) {
            Ok(count) => {
                self.notifier.success(selection_message(count));
            }
            Err(err) => self.report(&err),
        }
    }

    fn trigger(&mut self, kind: OperationKind) -> Option<OperationJob> {
        if self.is_busy() {
            self.report(&WorkflowError::Busy);
            return None;
        }
        if self.phase == DispatchPhase::AwaitingText {
            tracing::debug!(operation = %kind, "ignoring trigger while watermark text is pending");
            return None;
        }

        self.transition(DispatchPhase::Validating);
        match kind {
            OperationKind::Merge => match OperationRequest::merge(&self.files) {
                Ok(request) => self.launch(request),
                Err(err) => self.reject(err),
            },
            OperationKind::Watermark => match PendingWatermark::begin(&self.files) {
                Ok(_) => {
                    self.transition(DispatchPhase::AwaitingText);
                    None
                }
                Err(err) => self.reject(err),
            },
        }
    }

    fn submit_watermark_text(&mut self, text: Option<String>) -> Option<OperationJob> {
        if self.phase != DispatchPhase::AwaitingText {
            tracing::debug!(phase = ?self.phase, "watermark text arrived outside of a watermark request");
            return None;
        }

        // The selection may have changed while the dialog was open.
        let request = PendingWatermark::begin(&self.files).and_then(|pending| pending.provide_text(text));
        match request {
            Ok(request) => self.launch(request),
            Err(err) => self.reject(err),
        }
    }

    fn launch(&mut self, request: OperationRequest) -> Option<OperationJob> {
        let kind = request.kind();
        self.transition(DispatchPhase::Packaging);
        match self.dispatcher.start(request) {
            Ok((job, cancel)) => {
                self.active = Some(ActiveOperation { kind, cancel });
                self.transition(DispatchPhase::Submitting);
                Some(job)
            }
            Err(err) => self.reject(err),
        }
    }

    fn reject(&mut self, err: WorkflowError) -> Option<OperationJob> {
        match err {
            WorkflowError::UserAbort => self.transition(DispatchPhase::Idle),
            WorkflowError::Busy => {}
            _ => self.transition(DispatchPhase::Rejected),
        }
        self.report(&err);
        None
    }

    fn report(&mut self, err: &WorkflowError) {
        let kind = err.kind();
        tracing::debug!(?kind, "{err}");
        if kind.is_silent() {
            return;
        }
        if let Some(message) = err.user_message() {
            self.notifier.error(message);
        }
    }

    fn cancel(&mut self) {
        if self.phase == DispatchPhase::AwaitingText {
            self.transition(DispatchPhase::Idle);
        } else if let Some(active) = &self.active {
            tracing::info!(operation = %active.kind, "cancellation requested");
            active.cancel.cancel();
        }
    }

    /// Routes a finished operation to the download sink and the notifier.
    /// Returns where the download landed, if it was saved.
    pub fn complete(
        &mut self,
        result: OperationResult,
        sink: &mut dyn DownloadSink,
    ) -> Option<PathBuf> {
        self.active = None;
        match result {
            OperationResult::Succeeded {
                operation,
                payload,
                filename,
            } => match sink.save(&payload, &filename) {
                Ok(path) => {
                    self.transition(DispatchPhase::Succeeded);
                    self.notifier.success(success_message(operation));
                    Some(path)
                }
                Err(err) => {
                    tracing::error!(%operation, "failed to save download: {err}");
                    self.transition(DispatchPhase::Failed);
                    self.notifier.error(format!("Could not save {filename}"));
                    None
                }
            },
            OperationResult::Failed { error, .. } => {
                self.transition(DispatchPhase::Failed);
                self.report(&error);
                None
            }
        }
    }

    /// Handles `event` and, when it starts an operation, runs it to completion
    /// on the current task.
    pub async fn run(
        &mut self,
        event: InputEvent,
        sink: &mut dyn DownloadSink,
    ) -> Option<PathBuf> {
        let job = self.handle(event)?;
        let dispatcher = self.dispatcher.clone();
        let result = dispatcher.execute(job).await;
        self.complete(result, sink)
    }

    fn transition(&mut self, next: DispatchPhase) {
        if self.phase != next {
            tracing::debug!(from = ?self.phase, to = ?next, "dispatch phase");
            self.phase = next;
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
