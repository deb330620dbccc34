//! Startup replay of an existing log.

use chrono::Duration;
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::draft::payload::{ParsedEvent, parse_event};
use crate::error::OverlayError;
use crate::log::{LogEvent, LogEventKind, classify_line};

/// Classified events from one pass over the log, in file order.
#[derive(Debug, Default)]
pub struct ResumeScan {
    pub events: Vec<LogEvent>,
    /// Offset just past the last complete line. Live tailing starts here.
    pub end_offset: u64,
    pub lines: usize,
    /// Events dropped for being older than the lookback window.
    pub skipped: usize,
}

/// Classify every complete line of `path` in parallel.
///
/// With a non-zero `lookback_hours`, sessions with no event in the last
/// `lookback_hours` before the newest timestamp are dropped.
pub fn scan_log(path: &Path, lookback_hours: u32) -> Result<ResumeScan, OverlayError> {
    let file = fs::File::open(path).map_err(|source| OverlayError::OpenLog {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| OverlayError::SeekLog {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if len == 0 {
        return Ok(ResumeScan::default());
    }

    // SAFETY: the game only appends to the log while it is mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| OverlayError::OpenLog {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = mmap.as_ref();

    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    // Anything after the last newline is still being written.
    let end_offset = start as u64;

    let mut events: Vec<LogEvent> = line_ranges
        .par_iter()
        .filter_map(|&(start, end)| {
            let line = String::from_utf8_lossy(&bytes[start..end]);
            classify_line(line.trim_end_matches('\r'))
        })
        .collect();

    let skipped = apply_lookback(&mut events, lookback_hours);

    tracing::debug!(
        path = %path.display(),
        lines = line_ranges.len(),
        events = events.len(),
        skipped,
        "[RESUME] Scanned log"
    );

    Ok(ResumeScan {
        events,
        end_offset,
        lines: line_ranges.len(),
        skipped,
    })
}

/// Drop the prefix of events that fall outside the window ending at the
/// newest timestamp. Order is preserved.
///
/// Only lines that carried their own timestamp place the window. The kept
/// range is then widened back to the opening pack or pool of the session it
/// starts in, along with the event info announced just before that, so a
/// draft is never split.
fn apply_lookback(events: &mut Vec<LogEvent>, lookback_hours: u32) -> usize {
    if lookback_hours == 0 {
        return 0;
    }
    let Some(newest) = events.iter().filter(|e| e.stamped).map(|e| e.timestamp).max() else {
        return 0;
    };
    let cutoff = newest - Duration::hours(i64::from(lookback_hours));
    let first = events
        .iter()
        .position(|e| e.stamped && e.timestamp >= cutoff)
        .unwrap_or(events.len());
    let first = session_start(events, first);
    events.drain(..first);
    first
}

/// Index of the event that opened the session `index` belongs to, or 0 when
/// nothing before it opens one.
fn session_start(events: &[LogEvent], index: usize) -> usize {
    if index >= events.len() || announces_next_session(events, index) {
        return index;
    }
    let Some(opener) = events[..=index].iter().rposition(opens_session) else {
        return 0;
    };
    let mut start = opener;
    while start > 0 && events[start - 1].kind == LogEventKind::SessionInfo {
        start -= 1;
    }
    start
}

/// Event info folded ahead of a session's first pack names its type and set.
fn announces_next_session(events: &[LogEvent], index: usize) -> bool {
    events[index].kind == LogEventKind::SessionInfo
        && events[index..]
            .iter()
            .find(|e| e.kind != LogEventKind::SessionInfo)
            .is_some_and(opens_session)
}

fn opens_session(event: &LogEvent) -> bool {
    match parse_event(event) {
        Ok(ParsedEvent::Pool { .. }) => true,
        Ok(ParsedEvent::Pack(update)) => update.pack.coordinate() == (1, 1),
        _ => false,
    }
}
