//! Print sinks for sending ESC/POS payloads
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - Device nodes and capture files (e.g. `/dev/usb/lp0`)
//! - Windows spooler queues (RAW datatype)
//!
//! Sinks deliver bytes verbatim and in order. Submission is blocking; the
//! async boundary lives in [`crate::service`].

use crate::error::{SubmitError, SubmitResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Default raw printing port
pub const RAW_PORT: u16 = 9100;

/// Destination for print jobs
pub trait PrintSink {
    /// Submit one complete payload as a print job
    fn submit(&self, payload: &[u8]) -> SubmitResult<()>;
}

impl<T: PrintSink + ?Sized> PrintSink for &T {
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        (**self).submit(payload)
    }
}

impl<T: PrintSink + ?Sized> PrintSink for Box<T> {
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        (**self).submit(payload)
    }
}

impl<T: PrintSink + ?Sized> PrintSink for Arc<T> {
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        (**self).submit(payload)
    }
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
/// Each submission opens its own connection.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> SubmitResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from an address string (e.g., "192.168.1.100:9100")
    ///
    /// Host names are resolved once, here.
    pub fn from_addr(addr: &str) -> SubmitResult<Self> {
        let addr = addr
            .to_socket_addrs()
            .ok()
            .and_then(|mut iter| iter.next())
            .ok_or_else(|| SubmitError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set connect and write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl PrintSink for NetworkPrinter {
    #[instrument(skip(self, payload), fields(addr = %self.addr, data_len = payload.len()))]
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        info!("Connecting to printer");

        let mut stream = TcpStream::connect_timeout(&self.addr, self.timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                SubmitError::Timeout(format!("Connection timeout: {}", self.addr))
            } else {
                SubmitError::Connection(format!("{}: {}", self.addr, e))
            }
        })?;
        stream.set_write_timeout(Some(self.timeout))?;

        stream.write_all(payload).map_err(|e| {
            SubmitError::Io(std::io::Error::new(e.kind(), format!("Write failed: {}", e)))
        })?;
        stream.flush()?;

        info!("Print job sent successfully");
        Ok(())
    }
}

/// Raw device or capture file
///
/// Opens the path for appending on every submission, so a character device
/// like `/dev/usb/lp0` receives each job as written and a regular file
/// accumulates a capture of all jobs.
#[derive(Debug, Clone)]
pub struct FilePrinter {
    path: PathBuf,
}

impl FilePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrintSink for FilePrinter {
    #[instrument(skip(self, payload), fields(path = %self.path.display(), data_len = payload.len()))]
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    SubmitError::Offline(format!("{}: {}", self.path.display(), e))
                }
                _ => SubmitError::Io(e),
            })?;
        file.write_all(payload)?;
        file.flush()?;
        info!("Print job written");
        Ok(())
    }
}

/// Windows spooler printer
///
/// Submits each payload as a RAW document to the named queue, so the driver
/// passes ESC/POS bytes through untouched.
#[cfg(windows)]
#[derive(Debug, Clone)]
pub struct WindowsPrinter {
    name: String,
}

#[cfg(windows)]
impl WindowsPrinter {
    /// Create a printer for a spooler queue name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn write_raw(&self, data: &[u8]) -> SubmitResult<()> {
        use core::ffi::c_void;
        use windows::Win32::Graphics::Printing::{
            ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
            StartDocPrinterW, StartPagePrinter, WritePrinter,
        };
        use windows::core::{PCWSTR, PWSTR};

        fn to_wide(s: &str) -> Vec<u16> {
            s.encode_utf16().chain(std::iter::once(0)).collect()
        }

        unsafe {
            let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
            let name_w = to_wide(&self.name);

            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                .map_err(|_| SubmitError::Offline(self.name.clone()))?;

            let doc_name_w = to_wide("Receipt");
            let datatype_w = to_wide("RAW");
            let doc_info = DOC_INFO_1W {
                pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                pOutputFile: PWSTR::null(),
                pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
            };

            if StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                let _ = ClosePrinter(handle);
                return Err(SubmitError::Spooler("StartDocPrinter failed".to_string()));
            }

            if !StartPagePrinter(handle).as_bool() {
                let _ = EndDocPrinter(handle);
                let _ = ClosePrinter(handle);
                return Err(SubmitError::Spooler("StartPagePrinter failed".to_string()));
            }

            let mut written: u32 = 0;
            let ok = WritePrinter(
                handle,
                data.as_ptr() as *const c_void,
                data.len() as u32,
                &mut written,
            );

            let _ = EndPagePrinter(handle);
            let _ = EndDocPrinter(handle);
            let _ = ClosePrinter(handle);

            if !ok.as_bool() {
                return Err(SubmitError::Spooler("WritePrinter failed".to_string()));
            }

            if written != data.len() as u32 {
                return Err(SubmitError::Spooler("Incomplete write".to_string()));
            }

            Ok(())
        }
    }
}

#[cfg(windows)]
impl PrintSink for WindowsPrinter {
    #[instrument(skip(self, payload), fields(printer = %self.name, data_len = payload.len()))]
    fn submit(&self, payload: &[u8]) -> SubmitResult<()> {
        self.write_raw(payload)?;
        info!("Print job spooled");
        Ok(())
    }
}
