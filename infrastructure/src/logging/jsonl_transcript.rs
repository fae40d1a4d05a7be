//! JSONL transcript of conversation events.
//!
//! One object per line: `{"seq": n, "type": "...", "timestamp": "...", ...payload}`.
//! The sequence number lets a reader spot lines lost to a crash even though
//! the file is flushed after every event.

use roundtable_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct TranscriptWriter {
    out: BufWriter<File>,
    seq: u64,
    /// Set after the first write error so the warning is logged once.
    broken: bool,
}

/// Appends conversation events to a JSONL file.
pub struct JsonlTranscriptLogger {
    writer: Mutex<TranscriptWriter>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Create the transcript file, truncating any previous one.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(path.as_ref(), false)
    }

    /// Open the transcript file for appending.
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(path.as_ref(), true)
    }

    fn open(path: &Path, append: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            writer: Mutex::new(TranscriptWriter {
                out: BufWriter::new(file),
                seq: 0,
                broken: false,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Flatten an event into one record. Object payloads are merged; anything
/// else lands under `data`. Payload keys never shadow the envelope.
fn build_record(seq: u64, timestamp: String, event: ConversationEvent) -> Value {
    let mut record = Map::new();
    record.insert("seq".to_string(), Value::from(seq));
    record.insert("type".to_string(), Value::from(event.event_type));
    record.insert("timestamp".to_string(), Value::from(timestamp));

    match event.payload {
        Value::Object(fields) => {
            for (key, value) in fields {
                record.entry(key).or_insert(value);
            }
        }
        Value::Null => {}
        other => {
            record.insert("data".to_string(), other);
        }
    }
    Value::Object(record)
}

impl ConversationLogger for JsonlTranscriptLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        writer.seq += 1;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = build_record(writer.seq, timestamp, event);

        let result = serde_json::to_writer(&mut writer.out, &record)
            .map_err(io::Error::from)
            .and_then(|_| writer.out.write_all(b"\n"))
            .and_then(|_| writer.out.flush());

        if let Err(e) = result
            && !writer.broken
        {
            writer.broken = true;
            warn!(path = %self.path.display(), error = %e, "Transcript write failed");
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.out.flush();
        }
    }
}
