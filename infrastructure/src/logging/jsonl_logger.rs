//! JSONL transcript writer.
//!
//! Each [`ConversationEvent`] becomes one line: the event's own fields
//! (tagged with `type`) plus a millisecond RFC 3339 `timestamp`.

use clinichat_application::{ConversationEvent, ConversationLogger};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a ConversationEvent,
}

/// Appends conversation events to a file, one JSON object per line.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, event: &ConversationEvent) -> io::Result<()> {
        let record = Record {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            event,
        };
        let line = serde_json::to_string(&record)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("conversation log writer poisoned"))?;
        writeln!(writer, "{}", line)?;
        // A crash must not lose turns that were already shown
        writer.flush()
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        if let Err(e) = self.write_record(&event) {
            warn!(
                "Dropped {} event for {}: {}",
                event.kind(),
                self.path.display(),
                e
            );
        }
    }
}
