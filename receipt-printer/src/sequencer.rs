//! Print job sequencer
//!
//! Submits the same payload once per copy, strictly one after another:
//!
//! ```text
//! Idle -> Submitting(0) -> Waiting(0) -> Submitting(1) -> ... -> Succeeded
//!              \                              \
//!               +-> Failed(0)                  +-> Failed(1)
//! ```
//!
//! A failed copy ends the request; later copies are never attempted and
//! nothing is retried. There is no wait after the last copy.

use std::time::Duration;

use tracing::{error, info, instrument};

use crate::error::SubmitError;
use crate::escpos::CommandPayload;
use crate::printer::PrintSink;
use crate::request::Copies;

/// Delay between consecutive copies
pub const DEFAULT_INTER_COPY_DELAY: Duration = Duration::from_millis(500);

/// Blocking wait between copies
pub trait Pause {
    fn pause(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The copy that failed and why
#[derive(Debug)]
pub struct CopyFailure {
    /// 0-based
    pub copy_index: u32,
    pub cause: SubmitError,
}

/// Result of one request
#[derive(Debug)]
pub struct PrintOutcome {
    pub succeeded_copies: u32,
    pub failure: Option<CopyFailure>,
}

impl PrintOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Submits copies of a payload to a sink
#[derive(Debug, Clone)]
pub struct JobSequencer<P = ThreadSleep> {
    delay: Duration,
    pause: P,
}

impl JobSequencer<ThreadSleep> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pause: ThreadSleep,
        }
    }
}

impl Default for JobSequencer<ThreadSleep> {
    fn default() -> Self {
        Self::new(DEFAULT_INTER_COPY_DELAY)
    }
}

impl<P: Pause> JobSequencer<P> {
    /// Use a custom wait between copies
    pub fn with_pause(delay: Duration, pause: P) -> Self {
        Self { delay, pause }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Submit `copies` copies of `payload`, stopping at the first failure
    #[instrument(skip(self, payload, sink), fields(bytes = payload.len(), copies = copies.get()))]
    pub fn print_copies<S: PrintSink + ?Sized>(
        &self,
        payload: &CommandPayload,
        sink: &S,
        copies: Copies,
    ) -> PrintOutcome {
        let total = copies.get();

        for i in 0..total {
            if let Err(cause) = sink.submit(payload.as_bytes()) {
                error!(copy = i + 1, total, error = %cause, "Copy failed, aborting remaining copies");
                return PrintOutcome {
                    succeeded_copies: i,
                    failure: Some(CopyFailure {
                        copy_index: i,
                        cause,
                    }),
                };
            }
            info!(copy = i + 1, total, "Copy submitted");

            if i + 1 < total {
                self.pause.pause(self.delay);
            }
        }

        PrintOutcome {
            succeeded_copies: total,
            failure: None,
        }
    }
}

/// Submit copies with the default thread sleep between them
pub fn print_copies<S: PrintSink + ?Sized>(
    payload: &CommandPayload,
    sink: &S,
    copies: Copies,
    inter_copy_delay: Duration,
) -> PrintOutcome {
    JobSequencer::new(inter_copy_delay).print_copies(payload, sink, copies)
}
