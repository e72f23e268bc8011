//! # receipt-printer
//!
//! ESC/POS receipt printing: command encoding and print job sequencing.
//!
//! ## Scope
//!
//! This crate handles HOW a text is printed:
//! - ESC/POS payload encoding (init, formatting toggles, text, cut)
//! - Code page conversion (CP437, UTF-8, ISO-8859-1, Windows-1252)
//! - Multi-copy sequencing with an inter-copy delay
//! - Print sinks: network (TCP port 9100), device files, Windows spooler
//! - A tokio-backed service that keeps printing off the caller's task
//!
//! Printer discovery and UI state stay in application code.
//!
//! ## Example
//!
//! ```ignore
//! use receipt_printer::{Copies, EncodingName, FormattingOptions, NetworkPrinter, PrintRequest, PrintService};
//!
//! let options = FormattingOptions { bold: true, ..Default::default() };
//! let request = PrintRequest::new("Table 12\nThank you!", EncodingName::Cp437, options, Copies::new(2)?)?;
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! let service = PrintService::new(printer, "Front counter");
//! let report = service.print(request).await?;
//! println!("{}", report.status_line());
//! ```

mod config;
mod encoding;
mod error;
mod escpos;
mod logger;
mod printer;
mod request;
mod sequencer;
mod service;

// Re-exports
pub use config::{PrinterConfig, PrinterTarget};
pub use encoding::{EncodingName, REPLACEMENT_BYTE, Unmappable, decode_text, encode_text};
pub use error::{ConfigError, EncodeError, EncodeResult, RequestError, SubmitError, SubmitResult};
pub use escpos::{
    CUT, CommandPayload, EscPosBuilder, FormattingOptions, INIT, PROLOGUE_LEN, encode, encode_with,
};
pub use logger::init_logger;
pub use printer::{FilePrinter, NetworkPrinter, PrintSink, RAW_PORT};
pub use request::{Copies, PrintRequest};
pub use sequencer::{
    CopyFailure, DEFAULT_INTER_COPY_DELAY, JobSequencer, Pause, PrintOutcome, ThreadSleep,
    print_copies,
};
pub use service::{PrintReport, PrintService};

#[cfg(windows)]
pub use printer::WindowsPrinter;
