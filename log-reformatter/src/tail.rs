//! Polling file tail.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::time::sleep;

use crate::{ReformatError, ReformatResult};

/// Follows a file from its end, yielding complete lines as they are appended.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    reader: BufReader<File>,
    poll_interval: Duration,
    pending: Vec<u8>,
}

impl LogTail {
    /// Opens `path` positioned at its current end; earlier content is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReformatError::MissingFile`] when the file does not exist and
    /// [`ReformatError::Io`] for other open or seek failures.
    pub async fn open(path: impl Into<PathBuf>, poll_interval: Duration) -> ReformatResult<Self> {
        let path = path.into();
        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ReformatError::MissingFile { path });
            }
            Err(err) => return Err(err.into()),
        };
        file.seek(SeekFrom::End(0)).await?;

        Ok(Self {
            path,
            reader: BufReader::new(file),
            poll_interval,
            pending: Vec::new(),
        })
    }

    /// Path being followed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for the next complete line and returns it without its line ending.
    ///
    /// A trailing fragment with no newline yet is kept until the rest of the
    /// line arrives. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ReformatError::Io`] when reading fails.
    pub async fn next_line(&mut self) -> ReformatResult<String> {
        loop {
            self.reader.read_until(b'\n', &mut self.pending).await?;
            if self.pending.last() == Some(&b'\n') {
                let raw = std::mem::take(&mut self.pending);
                let line = String::from_utf8_lossy(&raw);
                return Ok(line.trim_end_matches(['\n', '\r']).to_owned());
            }
            sleep(self.poll_interval).await;
        }
    }
}
