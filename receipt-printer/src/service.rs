//! Background print service
//!
//! Runs each request off the caller's task: the payload is encoded first
//! (so an encoding error never submits anything), then the blocking
//! sequencer runs on tokio's blocking pool. Requests to the same service are
//! serialized by a single-flight gate, one in-flight request per printer.
//! The gate stays held until the last copy is submitted, even when the
//! caller stops waiting for the report.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::error::RequestError;
use crate::printer::PrintSink;
use crate::request::PrintRequest;
use crate::sequencer::{DEFAULT_INTER_COPY_DELAY, JobSequencer, PrintOutcome};

/// Final result of one request, delivered exactly once
#[derive(Debug)]
pub struct PrintReport {
    pub printer: String,
    pub requested_copies: u32,
    pub outcome: PrintOutcome,
}

impl PrintReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Human-readable status for the UI
    pub fn status_line(&self) -> String {
        match &self.outcome.failure {
            None => format!("Printed successfully to {}", self.printer),
            Some(failure) if self.outcome.succeeded_copies == 0 => {
                format!("Error: {}", failure.cause)
            }
            Some(failure) => format!(
                "Error: {} ({} of {} copies printed)",
                failure.cause, self.outcome.succeeded_copies, self.requested_copies
            ),
        }
    }
}

/// Print service bound to one printer
pub struct PrintService<S> {
    sink: Arc<S>,
    printer: String,
    delay: Duration,
    in_flight: Arc<Mutex<()>>,
}

impl<S> Clone for PrintService<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            printer: self.printer.clone(),
            delay: self.delay,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<S> PrintService<S>
where
    S: PrintSink + Send + Sync + 'static,
{
    /// Create a service; `printer` is the display name used in status lines
    pub fn new(sink: S, printer: impl Into<String>) -> Self {
        Self {
            sink: Arc::new(sink),
            printer: printer.into(),
            delay: DEFAULT_INTER_COPY_DELAY,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Set the delay between copies
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    /// Encode and print a request
    ///
    /// Waits for any earlier request on this service to finish first.
    #[instrument(skip(self, request), fields(printer = %self.printer, copies = request.copies().get()))]
    pub async fn print(&self, request: PrintRequest) -> Result<PrintReport, RequestError> {
        let payload = request.encode()?;
        let copies = request.copies();

        // Owned guard travels with the blocking task: dropping this future
        // must not release the printer while copies are still being sent
        let guard = self.in_flight.clone().lock_owned().await;
        info!(bytes = payload.len(), encoding = %request.encoding(), "Printing");

        let sink = self.sink.clone();
        let sequencer = JobSequencer::new(self.delay);
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            sequencer.print_copies(&payload, sink.as_ref(), copies)
        })
        .await
        .map_err(|e| RequestError::WorkerFailed(e.to_string()))?;

        if let Some(failure) = &outcome.failure {
            warn!(
                succeeded = outcome.succeeded_copies,
                failed_copy = failure.copy_index,
                "Print request failed"
            );
        } else {
            info!(copies = outcome.succeeded_copies, "Print request complete");
        }

        Ok(PrintReport {
            printer: self.printer.clone(),
            requested_copies: copies.get(),
            outcome,
        })
    }
}
