//! Printer configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | PRINTER_DEVICE | - | Device node or capture file (takes precedence) |
//! | PRINTER_ADDR | - | Network printer, `host:port` or `host` (port 9100) |
//! | PRINTER_NAME | - | Windows spooler queue |
//! | PRINTER_TIMEOUT_MS | 5000 | Network connect/write timeout |
//! | PRINT_COPY_DELAY_MS | 500 | Wait between copies |
//! | PRINT_ENCODING | CP437 | CP437, UTF-8, ISO-8859-1, Windows-1252 |
//! | PRINT_UNMAPPABLE | strict | `strict` fails, `replace` writes `?` |
//! | PRINT_COPIES | 1 | 1..=10 |
//! | PRINT_BOLD | false | |
//! | PRINT_CENTER | false | |
//! | PRINT_DOUBLE_HEIGHT | false | |
//! | PRINT_UNDERLINE | false | |
//! | PRINT_CUT | true | Feed and cut after each copy |
//! | LOG_LEVEL | info | Overridden by RUST_LOG |
//! | LOG_JSON | false | JSON log lines |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::encoding::{EncodingName, Unmappable};
use crate::error::ConfigError;
use crate::escpos::FormattingOptions;
use crate::printer::RAW_PORT;
use crate::request::Copies;
use crate::sequencer::DEFAULT_INTER_COPY_DELAY;

/// Where print jobs go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterTarget {
    Device(PathBuf),
    Network(String),
    Spooler(String),
}

impl PrinterTarget {
    /// Label used in status lines
    pub fn display_name(&self) -> String {
        match self {
            PrinterTarget::Device(path) => path.display().to_string(),
            PrinterTarget::Network(addr) => addr.clone(),
            PrinterTarget::Spooler(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// None when no printer is configured
    pub target: Option<PrinterTarget>,
    pub timeout: Duration,
    pub copy_delay: Duration,
    pub encoding: EncodingName,
    pub unmappable: Unmappable,
    pub copies: Copies,
    pub options: FormattingOptions,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            target: None,
            timeout: Duration::from_secs(5),
            copy_delay: DEFAULT_INTER_COPY_DELAY,
            encoding: EncodingName::Cp437,
            unmappable: Unmappable::Strict,
            copies: Copies::ONE,
            options: FormattingOptions::default(),
            log_level: "info".into(),
            log_json: false,
        }
    }
}

impl PrinterConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let target = if let Some(device) = get("PRINTER_DEVICE") {
            Some(PrinterTarget::Device(PathBuf::from(device)))
        } else if let Some(addr) = get("PRINTER_ADDR") {
            let addr = if addr.contains(':') {
                addr
            } else {
                format!("{}:{}", addr, RAW_PORT)
            };
            Some(PrinterTarget::Network(addr))
        } else {
            get("PRINTER_NAME").map(PrinterTarget::Spooler)
        };

        let encoding = match get("PRINT_ENCODING") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "PRINT_ENCODING",
                value: v,
            })?,
            None => defaults.encoding,
        };

        let unmappable = match get("PRINT_UNMAPPABLE").map(|v| v.to_ascii_lowercase()) {
            None => defaults.unmappable,
            Some(v) if v == "strict" => Unmappable::Strict,
            Some(v) if v == "replace" => Unmappable::Replace,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "PRINT_UNMAPPABLE",
                    value: v,
                });
            }
        };

        let copies = match parse::<u32>(&get, "PRINT_COPIES")? {
            Some(n) => Copies::new(n).map_err(|_| ConfigError::Invalid {
                key: "PRINT_COPIES",
                value: n.to_string(),
            })?,
            None => defaults.copies,
        };

        let flag = |key: &'static str, default: bool| -> Result<bool, ConfigError> {
            Ok(parse_bool(&get, key)?.unwrap_or(default))
        };
        let options = FormattingOptions {
            bold: flag("PRINT_BOLD", defaults.options.bold)?,
            centered: flag("PRINT_CENTER", defaults.options.centered)?,
            double_height: flag("PRINT_DOUBLE_HEIGHT", defaults.options.double_height)?,
            underline: flag("PRINT_UNDERLINE", defaults.options.underline)?,
            cut_paper: flag("PRINT_CUT", defaults.options.cut_paper)?,
        };

        Ok(Self {
            target,
            timeout: parse::<u64>(&get, "PRINTER_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            copy_delay: parse::<u64>(&get, "PRINT_COPY_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.copy_delay),
            encoding,
            unmappable,
            copies,
            options,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_bool(&get, "LOG_JSON")?.unwrap_or(defaults.log_json),
        })
    }

    /// The configured target, or an error if none is set
    pub fn require_target(&self) -> Result<&PrinterTarget, ConfigError> {
        self.target
            .as_ref()
            .ok_or(ConfigError::Missing("PRINTER_DEVICE, PRINTER_ADDR or PRINTER_NAME"))
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value: v.clone() })
        })
        .transpose()
}

fn parse_bool(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    get(key)
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: v }),
        })
        .transpose()
}
