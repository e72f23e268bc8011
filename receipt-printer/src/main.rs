//! receipt-print: print stdin on a receipt printer
//!
//! Printer and formatting come from the environment (see `PrinterConfig`);
//! a `.env` file in the working directory is loaded first.
//!
//! ```text
//! echo "Order 42" | PRINTER_ADDR=192.168.1.100 PRINT_COPIES=2 receipt-print
//! ```

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use receipt_printer::{
    FilePrinter, NetworkPrinter, PrintRequest, PrintService, PrintSink, PrinterConfig,
    PrinterTarget, init_logger,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenv::dotenv();

    let config = PrinterConfig::from_env()?;
    init_logger(&config.log_level, config.log_json)?;

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading text from stdin")?;
    let text = strip_final_newline(&text);

    let request = PrintRequest::new(text, config.encoding, config.options, config.copies)?
        .with_unmappable(config.unmappable);

    let target = config.require_target()?.clone();
    tracing::info!(printer = %target.display_name(), copies = config.copies.get(), "receipt-print starting");

    let report = match &target {
        PrinterTarget::Device(path) => run(FilePrinter::new(path), &target, &config, request).await?,
        PrinterTarget::Network(addr) => {
            let printer = NetworkPrinter::from_addr(addr)?.with_timeout(config.timeout);
            run(printer, &target, &config, request).await?
        }
        #[cfg(windows)]
        PrinterTarget::Spooler(name) => {
            run(receipt_printer::WindowsPrinter::new(name), &target, &config, request).await?
        }
        #[cfg(not(windows))]
        PrinterTarget::Spooler(name) => {
            anyhow::bail!("Spooler printing is only supported on Windows: {}", name)
        }
    };

    println!("{}", report.status_line());
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run<S>(
    sink: S,
    target: &PrinterTarget,
    config: &PrinterConfig,
    request: PrintRequest,
) -> anyhow::Result<receipt_printer::PrintReport>
where
    S: PrintSink + Send + Sync + 'static,
{
    let service = PrintService::new(sink, target.display_name()).with_delay(config.copy_delay);
    Ok(service.print(request).await?)
}

/// Drop the one line ending `echo` and editors append; the rest is sent verbatim
fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}
