use crate::core::persona::PersonaRegistry;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const SELECTION_FILE: &str = ".last_prompt";

/// Name of the last active persona, kept in a one-line file.
#[derive(Debug, Clone)]
pub struct PersistedSelection {
    path: PathBuf,
}

impl PersistedSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SELECTION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored persona name, or the registry default when the file is
    /// missing, unreadable, or names a persona that no longer exists.
    pub fn load(&self, registry: &PersonaRegistry) -> String {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let name = contents.trim();
                if registry.contains(name) {
                    return name.to_string();
                }
                debug!(stored = name, "ignoring unknown persona in last selection");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "could not read last selection");
            }
        }
        registry.default_name().to_string()
    }

    /// Replace the stored name. The write goes through a temp file in the
    /// same directory so a crash never leaves a half-written selection.
    pub fn save(&self, name: &str) -> io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        temp_file.write_all(name.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
