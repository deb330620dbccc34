//! Raw log line handling: JSON extraction, timestamps and event classification.

mod classifier;
mod json;
mod timestamp;

pub use classifier::{LogEvent, LogEventKind, classify_line};
pub use json::extract_json;
pub use timestamp::{now, parse_timestamp};
