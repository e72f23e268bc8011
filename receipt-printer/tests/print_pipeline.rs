// receipt-printer/tests/print_pipeline.rs
// End-to-end: request -> payload -> service -> sink

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use receipt_printer::{
    Copies, EncodingName, FilePrinter, FormattingOptions, PrintRequest, PrintService, PrintSink,
    RequestError, SubmitError, SubmitResult, decode_text,
};

/// Records every submission; optionally fails from a given index on
#[derive(Default)]
struct MemorySink {
    jobs: Mutex<Vec<Vec<u8>>>,
    fail_at: Option<usize>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    hold: Duration,
}

impl MemorySink {
    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    /// Each submission takes `hold` to complete
    fn slow(hold: Duration) -> Self {
        Self {
            hold,
            ..Default::default()
        }
    }

    fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs.lock().unwrap().clone()
    }
}

impl PrintSink for MemorySink {
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.hold.max(Duration::from_millis(2)));

        let index = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(payload.to_vec());
            jobs.len() - 1
        };
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_at == Some(index) {
            return Err(SubmitError::Rejected("spooler queue full".to_string()));
        }
        Ok(())
    }
}

fn request(text: &str, copies: u32) -> PrintRequest {
    PrintRequest::new(
        text,
        EncodingName::Cp437,
        FormattingOptions::default(),
        Copies::new(copies).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_all_copies_identical() {
    let sink = Arc::new(MemorySink::default());
    let service = PrintService::new(sink.clone(), "memory").with_delay(Duration::from_millis(1));

    let report = service.print(request("Mesa 7\nTotal 12,50", 3)).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.outcome.succeeded_copies, 3);
    assert_eq!(report.status_line(), "Printed successfully to memory");

    let jobs = sink.jobs();
    assert_eq!(jobs.len(), 3);
    assert!(jobs.windows(2).all(|w| w[0] == w[1]));
    assert!(jobs[0].starts_with(&[0x1B, 0x40]));
    assert!(jobs[0].ends_with(&[0x0A, 0x1D, 0x56, 0x41, 0x00]));
}

#[tokio::test]
async fn test_failure_aborts_remaining_copies() {
    let sink = Arc::new(MemorySink::failing_at(1));
    let service = PrintService::new(sink.clone(), "memory").with_delay(Duration::from_millis(1));

    let report = service.print(request("ticket", 4)).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.outcome.succeeded_copies, 1);
    let failure = report.outcome.failure.as_ref().unwrap();
    assert_eq!(failure.copy_index, 1);
    assert!(matches!(failure.cause, SubmitError::Rejected(_)));
    assert_eq!(sink.jobs().len(), 2);
    assert_eq!(
        report.status_line(),
        "Error: Rejected: spooler queue full (1 of 4 copies printed)"
    );
}

#[tokio::test]
async fn test_encode_error_submits_nothing() {
    let sink = Arc::new(MemorySink::default());
    let service = PrintService::new(sink.clone(), "memory");

    let result = service.print(request("Total 5€", 2)).await;

    assert!(matches!(result, Err(RequestError::Encode(_))));
    assert!(sink.jobs().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_serialized() {
    let sink = Arc::new(MemorySink::default());
    let service = PrintService::new(sink.clone(), "memory").with_delay(Duration::from_millis(2));

    let a = tokio::spawn({
        let service = service.clone();
        async move { service.print(request("AAAA", 3)).await }
    });
    let b = tokio::spawn({
        let service = service.clone();
        async move { service.print(request("BBBB", 3)).await }
    });

    assert!(a.await.unwrap().unwrap().is_success());
    assert!(b.await.unwrap().unwrap().is_success());

    assert_eq!(sink.max_active.load(Ordering::SeqCst), 1);

    // Copies of one request are never interleaved with the other's
    let texts: Vec<String> = sink
        .jobs()
        .iter()
        .map(|job| decode_text(&job[14..18], EncodingName::Cp437))
        .collect();
    assert_eq!(texts.len(), 6);
    assert!(texts[..3].iter().all(|t| t == &texts[0]));
    assert!(texts[3..].iter().all(|t| t == &texts[3]));
    assert_ne!(texts[0], texts[3]);
}

#[tokio::test]
async fn test_file_printer_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.bin");
    let service =
        PrintService::new(FilePrinter::new(&path), "capture").with_delay(Duration::from_millis(1));

    let options = FormattingOptions {
        bold: true,
        cut_paper: true,
        ..Default::default()
    };
    let request = PrintRequest::new("HI", EncodingName::Utf8, options, Copies::new(2).unwrap()).unwrap();
    let report = service.print(request).await.unwrap();
    assert!(report.is_success());

    let one: &[u8] = &[
        0x1B, 0x40, 0x1B, 0x45, 0x01, 0x1B, 0x61, 0x00, 0x1B, 0x21, 0x00, 0x1B, 0x2D, 0x00, 0x48,
        0x49, 0x0A, 0x1D, 0x56, 0x41, 0x00,
    ];
    assert_eq!(std::fs::read(&path).unwrap(), [one, one].concat());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abandoned_request_keeps_printer_busy() {
    let sink = Arc::new(MemorySink::slow(Duration::from_millis(100)));
    let service = PrintService::new(sink.clone(), "memory").with_delay(Duration::from_millis(1));

    // Caller gives up while the first request is still printing
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), service.print(request("AAAA", 5))).await;
    assert!(abandoned.is_err());

    let report = service.print(request("BBBB", 5)).await.unwrap();
    assert!(report.is_success());

    assert_eq!(sink.max_active.load(Ordering::SeqCst), 1);

    // All copies of the abandoned request went out before the next one started
    let texts: Vec<String> = sink
        .jobs()
        .iter()
        .map(|job| decode_text(&job[14..18], EncodingName::Cp437))
        .collect();
    assert_eq!(texts.len(), 10);
    assert!(texts[..5].iter().all(|t| t == "AAAA"));
    assert!(texts[5..].iter().all(|t| t == "BBBB"));
}
