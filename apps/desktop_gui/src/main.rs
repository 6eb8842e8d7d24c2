use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, DirectorySink, HttpPdfService, OperationDispatcher};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent, ui::PdfMasterApp,
};

#[derive(Parser, Debug)]
#[command(about = "Desktop front end for merging and watermarking PDFs")]
struct Args {
    /// Base URL of the PDF processing service.
    #[arg(long)]
    api_url: Option<String>,
    /// Directory that finished documents are saved into.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(api_url) = args.api_url {
        client_core::config::validate_api_url(&api_url)?;
        settings.api_url = api_url;
    }
    let download_dir = args
        .out_dir
        .or_else(|| {
            (settings.download_dir == PathBuf::from("."))
                .then(dirs::download_dir)
                .flatten()
        })
        .unwrap_or_else(|| settings.download_dir.clone());
    tracing::info!(api_url = %settings.api_url, download_dir = %download_dir.display(), "starting desktop gui");

    let service = HttpPdfService::new(&settings).context("failed to build http client")?;
    let dispatcher = OperationDispatcher::new(Arc::new(service));

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    backend_bridge::runtime::launch(dispatcher.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PDF Master")
            .with_inner_size([920.0, 680.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "PDF Master",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PdfMasterApp::new(
                dispatcher,
                DirectorySink::new(download_dir),
                cmd_tx,
                ui_rx,
            )))
        }),
    )
    .map_err(|err| anyhow!("desktop gui exited with an error: {err}"))
}
