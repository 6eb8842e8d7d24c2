//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::OperationDispatcher;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(
    dispatcher: OperationDispatcher,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "backend worker startup failure: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            tracing::info!("backend worker ready");
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::Execute(job) => {
                        let dispatcher = dispatcher.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let result = dispatcher.execute(job).await;
                            if ui_tx.send(UiEvent::Finished(result)).is_err() {
                                tracing::warn!("ui closed before operation result was delivered");
                            }
                        });
                    }
                    BackendCommand::CheckHealth => {
                        let service = dispatcher.service().clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match service.health().await {
                                Ok(health) => UiEvent::Health(Ok(health)),
                                Err(err) => UiEvent::Health(Err(err.to_string())),
                            };
                            let _ = ui_tx.try_send(event);
                        });
                    }
                }
            }
            tracing::info!("backend command queue closed");
        });
    });
}
