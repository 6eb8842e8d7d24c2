use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::validate_api_url, ClientSettings, DirectorySink, DispatchPhase, FileCandidate,
    HttpPdfService, InputEvent, InteractionController, OperationDispatcher, PdfService,
};
use shared::domain::{OperationKind, ToastKind};

#[derive(Parser, Debug)]
#[command(name = "pdfmaster", about = "Merge and watermark PDFs through a PDF processing service")]
struct Cli {
    /// Base URL of the PDF processing service.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Whole-request timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Directory that finished documents are saved into.
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge two or more PDFs, in the order given.
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Stamp text onto a single PDF. Prompts for the text when --text is absent.
    Watermark {
        file: PathBuf,
        #[arg(long)]
        text: Option<String>,
    },
    /// Check that the service is reachable.
    Status,
}

fn resolve_settings(cli: &Cli) -> Result<ClientSettings> {
    let mut settings = client_core::load_settings().context("failed to load settings")?;
    if let Some(api_url) = &cli.api_url {
        validate_api_url(api_url)?;
        settings.api_url = api_url.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            bail!("--timeout-secs must be greater than zero");
        }
        settings.request_timeout_secs = secs;
    }
    if let Some(dir) = &cli.out_dir {
        settings.download_dir = dir.clone();
    }
    Ok(settings)
}

async fn read_candidates(paths: &[PathBuf]) -> Result<Vec<FileCandidate>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let candidate = FileCandidate::read_from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        candidates.push(candidate);
    }
    Ok(candidates)
}

/// `None` when stdin is closed or the line is empty.
fn prompt_watermark_text() -> Result<Option<String>> {
    eprint!("Enter watermark text: ");
    io::stderr().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    let text = line.trim_end_matches(['\r', '\n']).to_string();
    Ok((!text.is_empty()).then_some(text))
}

/// Feeds `event` to the controller and, if it starts an operation, runs it
/// while listening for Ctrl-C.
async fn drive(
    controller: &mut InteractionController,
    event: InputEvent,
    sink: &mut DirectorySink,
) -> Option<PathBuf> {
    let job = controller.handle(event)?;
    let dispatcher = controller.dispatcher().clone();
    let execution = dispatcher.execute(job);
    tokio::pin!(execution);

    let result = tokio::select! {
        result = &mut execution => result,
        _ = tokio::signal::ctrl_c() => {
            controller.handle(InputEvent::Cancel);
            execution.await
        }
    };
    controller.complete(result, sink)
}

fn print_toast(controller: &InteractionController) {
    if let Some(toast) = controller.notifier().current() {
        match toast.kind {
            ToastKind::Success => println!("{}", toast.message),
            ToastKind::Error => eprintln!("error: {}", toast.message),
        }
    }
}

/// Prints the outcome of a finished dispatch and maps it to an exit code.
/// A silently aborted dispatch prints nothing.
fn report(controller: &InteractionController, saved: Option<PathBuf>) -> ExitCode {
    if controller.phase().is_terminal() {
        print_toast(controller);
    }
    if let Some(path) = saved {
        println!("Saved {}", path.display());
    }
    match controller.phase() {
        DispatchPhase::Rejected | DispatchPhase::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

async fn run_operation(
    settings: &ClientSettings,
    service: Arc<dyn PdfService>,
    kind: OperationKind,
    files: &[PathBuf],
    text: Option<String>,
) -> Result<ExitCode> {
    let mut controller = InteractionController::new(OperationDispatcher::new(service));
    let mut sink = DirectorySink::new(settings.download_dir.clone());

    controller.handle(InputEvent::Picked(read_candidates(files).await?));
    if controller.files().len() < files.len() {
        tracing::warn!(
            given = files.len(),
            selected = controller.files().len(),
            "non-PDF inputs were skipped"
        );
    }
    if controller.files().is_empty() {
        print_toast(&controller);
        return Ok(ExitCode::FAILURE);
    }

    let saved = drive(&mut controller, InputEvent::Trigger(kind), &mut sink).await;
    if controller.phase() != DispatchPhase::AwaitingText {
        return Ok(report(&controller, saved));
    }

    let text = match text {
        Some(text) => Some(text),
        None => prompt_watermark_text()?,
    };
    let saved = drive(&mut controller, InputEvent::WatermarkText(text), &mut sink).await;
    Ok(report(&controller, saved))
}

async fn run_status(service: &dyn PdfService, base_url: &str) -> ExitCode {
    match service.health().await {
        Ok(health) => {
            println!("{base_url}: {} ({} file(s) in temp)", health.status, health.files_in_temp);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {base_url} is unreachable: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let http = HttpPdfService::new(&settings).context("failed to build http client")?;
    let base_url = http.base_url().to_string();
    let service: Arc<dyn PdfService> = Arc::new(http);

    match cli.command {
        Command::Merge { files } => {
            run_operation(&settings, service, OperationKind::Merge, &files, None).await
        }
        Command::Watermark { file, text } => {
            run_operation(&settings, service, OperationKind::Watermark, &[file], text).await
        }
        Command::Status => Ok(run_status(service.as_ref(), &base_url).await),
    }
}
