use crate::core::message::TurnRole;
use crate::core::transcript::format_entry;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Per-persona transcript files living under one data directory.
///
/// Files are only ever appended to; nothing here truncates or rewrites a
/// transcript.
#[derive(Debug, Clone)]
pub struct LogStore {
    data_dir: PathBuf,
}

impl LogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self, persona_name: &str) -> PathBuf {
        self.data_dir.join(format!("chat_{persona_name}.md"))
    }

    pub fn append(
        &self,
        persona_name: &str,
        role: TurnRole,
        text: &str,
        timestamp: &str,
    ) -> io::Result<()> {
        if !self.data_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.data_dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(persona_name))?;

        // One buffered write per record keeps a crash to at most one torn
        // trailing entry.
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(format_entry(role, text, timestamp).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Whole transcript for `persona_name`, or an empty string when the
    /// persona has never been written to.
    pub fn read_raw(&self, persona_name: &str) -> io::Result<String> {
        match fs::read_to_string(self.path(persona_name)) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    pub fn exists(&self, persona_name: &str) -> bool {
        self.path(persona_name).exists()
    }
}
