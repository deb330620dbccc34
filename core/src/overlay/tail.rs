use memchr::{memchr_iter, memrchr};
use std::io::{Result, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Incremental reader over an append-only log.
///
/// Each call returns only complete lines written since the previous call. A
/// trailing line without its newline is held back until the newline arrives.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
}

impl LogTail {
    pub fn new(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            partial: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far, including any buffered partial line.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub async fn read_lines(&mut self) -> Result<Vec<String>> {
        let mut file = File::open(&self.path).await?;
        let len = file.metadata().await?.len();

        if len < self.offset {
            tracing::info!(
                path = %self.path.display(),
                old_offset = self.offset,
                new_len = len,
                "[TAIL] Log shrank, reading from start"
            );
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut chunk = Vec::with_capacity((len - self.offset) as usize);
        let read = file.take(len - self.offset).read_to_end(&mut chunk).await?;
        self.offset += read as u64;
        self.partial.extend_from_slice(&chunk);

        let Some(last_newline) = memrchr(b'\n', &self.partial) else {
            return Ok(Vec::new());
        };
        let rest = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, rest);

        let mut lines = Vec::new();
        let mut start = 0;
        for end in memchr_iter(b'\n', &complete) {
            let line = String::from_utf8_lossy(&complete[start..end]);
            let line = line.trim_end_matches('\r');
            if !line.trim().is_empty() {
                lines.push(line.to_string());
            }
            start = end + 1;
        }
        Ok(lines)
    }
}
