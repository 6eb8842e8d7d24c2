use super::*;

use std::time::Duration;

use tokio::sync::Notify;

use crate::test_support::{pdf_set, RecordingService};

fn part_summary(upload: &UploadRequest) -> Vec<(&'static str, String)> {
    upload
        .parts
        .iter()
        .map(|part| match part {
            FormPart::File {
                field, filename, ..
            } => (*field, filename.clone()),
            FormPart::Text { field, value } => (*field, value.clone()),
        })
        .collect()
}

#[test]
fn merge_requires_two_files() {
    for names in [&[][..], &["only.pdf"][..]] {
        let err = OperationRequest::merge(&pdf_set(names)).expect_err("rejected");
        assert!(matches!(
            err,
            WorkflowError::PreconditionViolation {
                operation: OperationKind::Merge,
                ..
            }
        ));
        assert_eq!(
            err.user_message().as_deref(),
            Some("Select at least 2 PDFs to merge")
        );
    }
}

#[test]
fn watermark_requires_exactly_one_file() {
    for names in [&[][..], &["a.pdf", "b.pdf"][..]] {
        let err = PendingWatermark::begin(&pdf_set(names)).expect_err("rejected");
        assert_eq!(
            err.user_message().as_deref(),
            Some("Select exactly 1 PDF for watermarking")
        );
    }
}

#[test]
fn merge_packages_every_file_in_selection_order() {
    let request = OperationRequest::merge(&pdf_set(&["A.pdf", "B.pdf", "C.pdf"])).expect("merge");
    let upload = request.package();

    assert_eq!(upload.endpoint, Endpoint::Merge);
    assert_eq!(
        part_summary(&upload),
        vec![
            ("files", "A.pdf".to_string()),
            ("files", "B.pdf".to_string()),
            ("files", "C.pdf".to_string()),
        ]
    );
    assert_eq!(request.output_filename(), "merged.pdf");
}

#[test]
fn watermark_packages_file_then_text() {
    let pending = PendingWatermark::begin(&pdf_set(&["C.pdf"])).expect("pending");
    assert_eq!(pending.file().name(), "C.pdf");
    let request = pending
        .provide_text(Some("DRAFT".to_string()))
        .expect("request");
    let upload = request.package();

    assert_eq!(upload.endpoint, Endpoint::Watermark);
    assert_eq!(
        part_summary(&upload),
        vec![("file", "C.pdf".to_string()), ("text", "DRAFT".to_string())]
    );
    assert_eq!(request.output_filename(), "watermarked_DRAFT.pdf");
}

#[test]
fn missing_or_blank_text_is_a_silent_abort() {
    for text in [None, Some(String::new()), Some("   ".to_string())] {
        let pending = PendingWatermark::begin(&pdf_set(&["C.pdf"])).expect("pending");
        let err = pending.provide_text(text).expect_err("abort");
        assert!(matches!(err, WorkflowError::UserAbort));
        assert_eq!(err.user_message(), None);
    }
}

#[test]
fn watermark_filenames_are_sanitized() {
    assert_eq!(watermarked_filename("DRAFT"), "watermarked_DRAFT.pdf");
    assert_eq!(
        watermarked_filename("Q3 / final: v2?"),
        "watermarked_Q3 _ final_ v2_.pdf"
    );
    assert_eq!(watermarked_filename("../../etc"), "watermarked__.._etc.pdf");
    assert_eq!(watermarked_filename("line\nbreak"), "watermarked_linebreak.pdf");
    assert_eq!(watermarked_filename(" ... "), "watermarked.pdf");

    let long = "x".repeat(500);
    let name = watermarked_filename(&long);
    assert_eq!(name.len(), "watermarked_.pdf".len() + 120);
}

#[tokio::test]
async fn successful_merge_posts_once_and_names_download() {
    let service = Arc::new(RecordingService::ok(b"%PDF merged"));
    let dispatcher = OperationDispatcher::new(service.clone());

    let request = OperationRequest::merge(&pdf_set(&["A.pdf", "B.pdf"])).expect("merge");
    let result = dispatcher.dispatch(request).await.expect("started");

    match result {
        OperationResult::Succeeded {
            operation,
            payload,
            filename,
        } => {
            assert_eq!(operation, OperationKind::Merge);
            assert_eq!(payload, b"%PDF merged".to_vec());
            assert_eq!(filename, "merged.pdf");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let uploads = service.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        part_summary(&uploads[0]),
        vec![("files", "A.pdf".to_string()), ("files", "B.pdf".to_string())]
    );
    assert!(!dispatcher.busy_flag().is_set());
}

#[tokio::test]
async fn failed_status_becomes_generic_failure_and_clears_busy() {
    let service = Arc::new(RecordingService::status(500));
    let dispatcher = OperationDispatcher::new(service.clone());

    let request = OperationRequest::merge(&pdf_set(&["A.pdf", "B.pdf"])).expect("merge");
    let result = dispatcher.dispatch(request).await.expect("started");

    match result {
        OperationResult::Failed { operation, error } => {
            assert_eq!(operation, OperationKind::Merge);
            assert!(matches!(
                error,
                WorkflowError::Transport {
                    source: TransportError::Status(500),
                    ..
                }
            ));
            assert_eq!(error.user_message().as_deref(), Some("Merge failed"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dispatcher.busy_flag().is_set());
}

#[tokio::test]
async fn start_revalidates_requests_built_elsewhere() {
    let service = Arc::new(RecordingService::ok(b"unused"));
    let dispatcher = OperationDispatcher::new(service.clone());

    let forged = OperationRequest::Merge {
        files: pdf_set(&["lonely.pdf"]).as_slice().to_vec(),
    };
    let err = dispatcher.start(forged).expect_err("rejected");
    assert!(matches!(err, WorkflowError::PreconditionViolation { .. }));

    let file = pdf_set(&["C.pdf"]).as_slice()[0].clone();
    let blank = OperationRequest::Watermark {
        file,
        text: " ".to_string(),
    };
    assert!(matches!(
        dispatcher.start(blank),
        Err(WorkflowError::UserAbort)
    ));

    assert!(service.uploads.lock().await.is_empty());
    assert!(!dispatcher.busy_flag().is_set());
}

#[tokio::test]
async fn second_start_while_in_flight_is_rejected_as_busy() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(RecordingService::gated(b"%PDF", Arc::clone(&gate)));
    let dispatcher = OperationDispatcher::new(service.clone());
    let files = pdf_set(&["A.pdf", "B.pdf"]);

    let (job, _handle) = dispatcher
        .start(OperationRequest::merge(&files).expect("merge"))
        .expect("first start");
    assert!(dispatcher.busy_flag().is_set());

    let err = dispatcher
        .start(OperationRequest::merge(&files).expect("merge"))
        .expect_err("busy");
    assert!(matches!(err, WorkflowError::Busy));
    assert_eq!(
        err.user_message().as_deref(),
        Some("An operation is already in progress")
    );

    let running = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.execute(job).await })
    };
    gate.notify_one();
    let result = running.await.expect("join");
    assert_eq!(result.phase(), DispatchPhase::Succeeded);
    assert!(!dispatcher.busy_flag().is_set());
    assert_eq!(service.uploads.lock().await.len(), 1);
}

#[tokio::test]
async fn cancelling_an_in_flight_job_fails_it_and_clears_busy() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(RecordingService::gated(b"%PDF", gate));
    let dispatcher = OperationDispatcher::new(service.clone());

    let request = PendingWatermark::begin(&pdf_set(&["C.pdf"]))
        .and_then(|pending| pending.provide_text(Some("DRAFT".into())))
        .expect("request");
    let (job, handle) = dispatcher.start(request).expect("start");

    let running = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.execute(job).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.cancel();

    let result = tokio::time::timeout(Duration::from_secs(1), running)
        .await
        .expect("finished")
        .expect("join");
    match result {
        OperationResult::Failed { error, .. } => {
            assert_eq!(error.user_message().as_deref(), Some("Watermark cancelled"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dispatcher.busy_flag().is_set());
}

#[test]
fn terminal_phases_are_flagged() {
    assert!(DispatchPhase::Rejected.is_terminal());
    assert!(DispatchPhase::Succeeded.is_terminal());
    assert!(DispatchPhase::Failed.is_terminal());
    assert!(!DispatchPhase::AwaitingText.is_terminal());
    assert!(!DispatchPhase::Submitting.is_terminal());
}
