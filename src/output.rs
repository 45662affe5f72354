//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize (text)
//!
//! ```text
//! 001 photo.png
//!     PNG 100x100 → 50x200 (1843 bytes)
//! 002 liar.png
//!     PNG 30x30 → 10x12 (412 bytes)
//!     Detected: JPEG
//! 003 ../etc/passwd
//!     Error [InvalidFilename]: Invalid filename "../etc/passwd": path separators are not allowed
//!
//! Resized 2 of 3 files, 1 failed
//! ```
//!
//! ## Resize (JSON)
//!
//! ```text
//! {"status":"File resized successfully","filename":"photo.png",...}
//! {"kind":"NotFound","error":"File not found: uploads/images/ghost.png"}
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or a JSON
//! value) for testability and a `print_*` wrapper that writes to stdout.
//! Format functions do no I/O.

use crate::imaging::formats;
use crate::pipeline::{ErrorKind, ResizeError, ResizeOutcome};
use serde::Serialize;

/// Status string returned for every successful resize.
pub const SUCCESS_STATUS: &str = "File resized successfully";

#[derive(Serialize)]
struct SuccessBody<'a> {
    status: &'static str,
    #[serde(flatten)]
    outcome: &'a ResizeOutcome,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    error: String,
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format one resize result as display lines.
///
/// `filename` is the name as requested, so rejected names still show up.
pub fn format_result(
    index: usize,
    filename: &str,
    result: &Result<ResizeOutcome, ResizeError>,
) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), filename)];
    match result {
        Ok(outcome) => {
            lines.push(format!(
                "    {} {} → {} ({} bytes)",
                outcome.written, outcome.source, outcome.target, outcome.bytes_written
            ));
            if outcome.detected != outcome.written {
                lines.push(format!("    Detected: {}", outcome.detected));
            }
        }
        Err(e) => lines.push(format!("    Error [{}]: {}", e.kind(), e)),
    }
    lines
}

/// Summary line for a run of several requests.
pub fn format_summary(succeeded: usize, total: usize) -> String {
    let failed = total - succeeded;
    if failed == 0 {
        format!("Resized {} of {} files", succeeded, total)
    } else {
        format!("Resized {} of {} files, {} failed", succeeded, total, failed)
    }
}

/// The response body for one resize: a status acknowledgment or an error kind
/// with a message.
pub fn response_json(result: &Result<ResizeOutcome, ResizeError>) -> serde_json::Value {
    let value = match result {
        Ok(outcome) => serde_json::to_value(SuccessBody {
            status: SUCCESS_STATUS,
            outcome,
        }),
        Err(e) => serde_json::to_value(ErrorBody {
            kind: e.kind(),
            error: e.to_string(),
        }),
    };
    value.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
}

/// Print one result, as text lines or a single JSON line.
pub fn print_result(
    index: usize,
    filename: &str,
    result: &Result<ResizeOutcome, ResizeError>,
    json: bool,
) {
    if json {
        println!("{}", response_json(result));
    } else {
        for line in format_result(index, filename, result) {
            println!("{}", line);
        }
    }
}

/// The registry as a table: extension, kind, encode parameters.
pub fn format_formats() -> Vec<String> {
    formats::all()
        .iter()
        .map(|d| {
            let params = match d.quality {
                Some(q) => format!("quality {}", q.value()),
                None => "lossless".to_string(),
            };
            format!("{:<6}{:<6}{}", d.extension, d.kind.to_string(), params)
        })
        .collect()
}

pub fn print_formats() {
    for line in format_formats() {
        println!("{}", line);
    }
}
