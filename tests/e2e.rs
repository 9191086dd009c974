//! End-to-end integration tests for orderdesk.
//!
//! A tiny in-process HTTP responder plays the print desk's collection
//! endpoint: it accepts connections, parses one request per connection,
//! records the body, and answers with a fixed status. Every test runs
//! fully offline.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use orderdesk::{
    IntakeWarning, NoopStatusSink, OrderError, OrderForm, OrderSession, SelectedFile, StatusSink,
    SubmitConfig, SubmissionPhase,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

// ── Test fixtures ────────────────────────────────────────────────────────────

/// Build a minimal but well-formed PDF with `n` pages, in memory.
fn pdf_with_pages(n: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(n);
    for i in 0..n {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => n as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("in-memory PDF save");
    buf
}

fn valid_form() -> OrderForm {
    OrderForm {
        student_name: "A".into(),
        year: "2".into(),
        branch: "CS".into(),
        roll_number: "101".into(),
        copies: "1".into(),
        print_type: "Black & White".into(),
        binding: "None".into(),
        payment_method: "Cash".into(),
        ..OrderForm::default()
    }
}

// ── Tiny in-process collection endpoint ──────────────────────────────────────

struct PrintDesk {
    endpoint: String,
    /// Fully parsed requests, in arrival order.
    requests: Arc<AtomicUsize>,
    bodies: mpsc::UnboundedReceiver<String>,
}

impl PrintDesk {
    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Start a responder answering every request with `status`.
async fn spawn_print_desk(status: u16) -> PrintDesk {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::unbounded_channel();

    let counter = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let counter = Arc::clone(&counter);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(body) = read_one_request(&mut socket).await {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let reason = match status {
                        200 => "OK",
                        500 => "Internal Server Error",
                        _ => "Status",
                    };
                    let reply = "order received";
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                        reply.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                    let _ = tx.send(body);
                }
            });
        }
    });

    PrintDesk {
        endpoint: format!("http://{addr}/orders"),
        requests,
        bodies: rx,
    }
}

/// Read one HTTP request off the socket and return its body.
async fn read_one_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    // headers
    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    // body
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = (header_end + content_length).min(buf.len());
    Some(String::from_utf8_lossy(&buf[header_end..end]).to_string())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn session_for(desk: &PrintDesk) -> OrderSession {
    let config = SubmitConfig::builder(&desk.endpoint)
        .request_timeout_secs(10)
        .build()
        .unwrap();
    OrderSession::new(config).unwrap()
}

// ── Intake + submission scenarios ────────────────────────────────────────────

/// One image, one 3-page PDF, a filled form: the estimate settles at 4 and
/// the payload carries both files with the roll number intact.
#[tokio::test]
async fn scenario_image_then_pdf_then_submit() {
    let mut desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("photo.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]),
        &sink,
    );
    assert_eq!(session.intake().page_estimate(), 1);

    session.intake_mut().add_file(
        SelectedFile::from_bytes("doc.pdf", "application/pdf", pdf_with_pages(3)),
        &sink,
    );
    let warnings = session.intake_mut().settle(&sink).await;
    assert!(warnings.is_empty());
    assert_eq!(session.intake().page_estimate(), 4);

    let receipt = session.submit(&valid_form(), &sink).await.unwrap();
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, "order received");
    assert_eq!(receipt.stats.files_submitted, 2);

    let body = desk.bodies.recv().await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["files"].as_array().unwrap().len(), 2);
    assert_eq!(v["files"][0]["filename"], "photo.png");
    assert_eq!(v["files"][1]["filename"], "doc.pdf");
    assert_eq!(v["rollNumber"], "101");

    assert_eq!(desk.request_count(), 1, "exactly one outbound request");
}

/// File bytes survive the round trip: what the desk receives decodes back
/// to exactly what was selected, in selection order.
#[tokio::test]
async fn payload_carries_files_verbatim_in_order() {
    let mut desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    let blobs: Vec<Vec<u8>> = (0u8..4).map(|i| vec![i; 16 + i as usize]).collect();
    for (i, blob) in blobs.iter().enumerate() {
        session.intake_mut().add_file(
            SelectedFile::from_bytes(format!("f{i}.png"), "image/png", blob.clone()),
            &sink,
        );
    }

    session.submit(&valid_form(), &sink).await.unwrap();

    let body = desk.bodies.recv().await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    let files = v["files"].as_array().unwrap();
    assert_eq!(files.len(), 4);
    for (i, f) in files.iter().enumerate() {
        assert_eq!(f["filename"], format!("f{i}.png"));
        assert_eq!(f["mimeType"], "image/png");
        let decoded = STANDARD.decode(f["data"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, blobs[i]);
    }
}

/// The wire format uses the camelCase names the desk documents.
#[tokio::test]
async fn wire_field_names_are_camel_case() {
    let mut desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![1]),
        &sink,
    );
    session.submit(&valid_form(), &sink).await.unwrap();

    let body = desk.bodies.recv().await.unwrap();
    for key in [
        "\"studentName\"",
        "\"rollNumber\"",
        "\"totalCost\"",
        "\"printType\"",
        "\"paymentMethod\"",
        "\"mimeType\"",
        "\"binding\"",
        "\"copies\"",
    ] {
        assert!(body.contains(key), "body missing {key}: {body}");
    }
    assert!(!body.contains("student_name"));
}

/// An empty selection aborts during validation: nothing reaches the desk.
#[tokio::test]
async fn zero_files_sends_no_request() {
    let desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);

    let err = session
        .submit(&valid_form(), &NoopStatusSink)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NoFilesSelected));

    // give a stray request time to land if one was (wrongly) issued
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(desk.request_count(), 0);
}

/// Missing required fields abort before any file is read or sent.
#[tokio::test]
async fn missing_required_field_sends_no_request() {
    let desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![1]),
        &sink,
    );
    let mut form = valid_form();
    form.year.clear();

    let err = session.submit(&form, &sink).await.unwrap_err();
    assert!(matches!(err, OrderError::MissingField { field: "year" }));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(desk.request_count(), 0);
    assert_eq!(session.intake().len(), 1, "selection untouched");
}

/// Success clears the selection and the estimate; the next order starts
/// from scratch.
#[tokio::test]
async fn success_resets_intake() {
    let desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![1, 2]),
        &sink,
    );
    session.intake_mut().add_file(
        SelectedFile::from_bytes("doc.pdf", "application/pdf", pdf_with_pages(2)),
        &sink,
    );
    session.intake_mut().settle(&sink).await;
    assert_eq!(session.intake().page_estimate(), 3);

    session.submit(&valid_form(), &sink).await.unwrap();

    assert!(session.intake().is_empty());
    assert_eq!(session.intake().page_estimate(), 0);
    assert_eq!(session.intake().effective_page_estimate(), 0);
}

/// A non-2xx answer is a rejection: the error carries the status, the
/// selection survives, and a retry reaches the desk again.
#[tokio::test]
async fn rejection_keeps_intake_and_allows_retry() {
    let desk = spawn_print_desk(500).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![7]),
        &sink,
    );
    session.intake_mut().override_page_estimate(5, &sink);

    let err = session.submit(&valid_form(), &sink).await.unwrap_err();
    match err {
        OrderError::Rejected { status, .. } => assert_eq!(status, 500),
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(session.intake().len(), 1);
    assert_eq!(session.intake().effective_page_estimate(), 5);

    // second trigger, same selection
    let err = session.submit(&valid_form(), &sink).await.unwrap_err();
    assert!(matches!(err, OrderError::Rejected { status: 500, .. }));
    assert_eq!(desk.request_count(), 2);
}

/// Phases are announced in order on the happy path, and the failure path
/// ends in Failed before the session settles back to idle.
#[tokio::test]
async fn phases_are_announced_in_order() {
    #[derive(Default)]
    struct PhaseLog(Mutex<Vec<SubmissionPhase>>);
    impl StatusSink for PhaseLog {
        fn on_phase(&self, phase: SubmissionPhase) {
            self.0.lock().unwrap().push(phase);
        }
    }

    let desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = PhaseLog::default();

    session.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![1]),
        &sink,
    );
    session.submit(&valid_form(), &sink).await.unwrap();

    assert_eq!(
        *sink.0.lock().unwrap(),
        vec![
            SubmissionPhase::Validating,
            SubmissionPhase::ReadingFiles,
            SubmissionPhase::Submitting,
            SubmissionPhase::Succeeded,
        ]
    );

    // failure path: unreachable endpoint
    let config = SubmitConfig::builder("http://127.0.0.1:1/orders")
        .request_timeout_secs(2)
        .build()
        .unwrap();
    let mut failing = OrderSession::new(config).unwrap();
    let sink = PhaseLog::default();
    failing.intake_mut().add_file(
        SelectedFile::from_bytes("a.png", "image/png", vec![1]),
        &sink,
    );
    failing.submit(&valid_form(), &sink).await.unwrap_err();
    assert_eq!(
        *sink.0.lock().unwrap(),
        vec![
            SubmissionPhase::Validating,
            SubmissionPhase::ReadingFiles,
            SubmissionPhase::Submitting,
            SubmissionPhase::Failed,
        ]
    );
}

/// A file that vanished between selection and submission fails the whole
/// attempt; nothing reaches the desk and the selection survives.
#[tokio::test]
async fn unreadable_file_fails_before_any_request() {
    let desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session.intake_mut().add_file(
        SelectedFile::from_bytes("ok.png", "image/png", vec![1]),
        &sink,
    );
    session.intake_mut().add_file(
        SelectedFile::from_path("/definitely/gone.pdf", "application/pdf"),
        &sink,
    );
    // the intake decode already warned about the unreadable path
    let warnings = session.intake_mut().settle(&sink).await;
    assert_eq!(warnings.len(), 1);

    let err = session.submit(&valid_form(), &sink).await.unwrap_err();
    assert!(matches!(err, OrderError::FileNotFound { .. }));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(desk.request_count(), 0);
    assert_eq!(session.intake().len(), 2);
}

/// Word-processor files keep the estimate untouched and ask for a manual
/// count, but still ship with the order.
#[tokio::test]
async fn manual_count_files_still_ship() {
    #[derive(Default)]
    struct WarningLog(Mutex<Vec<IntakeWarning>>);
    impl StatusSink for WarningLog {
        fn on_warning(&self, warning: &IntakeWarning) {
            self.0.lock().unwrap().push(warning.clone());
        }
    }

    let mut desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = WarningLog::default();

    session.intake_mut().add_file(
        SelectedFile::from_bytes("essay.docx", "application/msword", vec![0xd0, 0xcf]),
        &sink,
    );
    assert_eq!(session.intake().page_estimate(), 0);
    assert!(matches!(
        sink.0.lock().unwrap()[0],
        IntakeWarning::ManualCountNeeded { .. }
    ));

    session.intake_mut().override_page_estimate(12, &sink);
    let receipt = session.submit(&valid_form(), &sink).await.unwrap();
    assert_eq!(receipt.stats.files_submitted, 1);

    let body = desk.bodies.recv().await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["files"][0]["filename"], "essay.docx");
    assert_eq!(v["files"][0]["mimeType"], "application/msword");
}

/// Files straight off the filesystem: the CLI path end to end, minus clap.
#[tokio::test]
async fn path_backed_files_submit_end_to_end() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("doc.pdf");
    std::fs::write(&pdf_path, pdf_with_pages(2)).unwrap();
    let png_path = dir.path().join("photo.png");
    let mut png = std::fs::File::create(&png_path).unwrap();
    png.write_all(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]).unwrap();

    let mut desk = spawn_print_desk(200).await;
    let mut session = session_for(&desk);
    let sink = NoopStatusSink;

    session
        .intake_mut()
        .add_file(SelectedFile::from_path(&pdf_path, "application/pdf"), &sink);
    session
        .intake_mut()
        .add_file(SelectedFile::from_path(&png_path, "image/png"), &sink);
    session.intake_mut().settle(&sink).await;
    assert_eq!(session.intake().page_estimate(), 3);

    let receipt = session.submit(&valid_form(), &sink).await.unwrap();
    assert_eq!(receipt.stats.files_submitted, 2);
    assert_eq!(receipt.stats.bytes_read, {
        let pdf_len = std::fs::metadata(&pdf_path).unwrap().len();
        pdf_len + 6
    });

    let body = desk.bodies.recv().await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["files"][0]["filename"], "doc.pdf");
    assert_eq!(v["files"][1]["filename"], "photo.png");
}
