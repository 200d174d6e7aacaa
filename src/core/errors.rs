use crate::core::config::data::path_display;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// A failed read or write of on-disk state. Never fatal: the session keeps
/// working from memory and the operator is told the file may lag.
#[derive(Debug)]
pub enum PersistenceWarning {
    LogAppend {
        path: PathBuf,
        source: std::io::Error,
    },
    LogRead {
        path: PathBuf,
        source: std::io::Error,
    },
    SelectionSave {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceWarning::LogAppend { path, source } => write!(
                f,
                "Failed to save conversation to {}: {}",
                path_display(path),
                source
            ),
            PersistenceWarning::LogRead { path, source } => write!(
                f,
                "Failed to load conversation history from {}: {}",
                path_display(path),
                source
            ),
            PersistenceWarning::SelectionSave { path, source } => write!(
                f,
                "Failed to save persona selection to {}: {}",
                path_display(path),
                source
            ),
        }
    }
}

impl StdError for PersistenceWarning {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceWarning::LogAppend { source, .. }
            | PersistenceWarning::LogRead { source, .. }
            | PersistenceWarning::SelectionSave { source, .. } => Some(source),
        }
    }
}

/// A persona switch naming a persona that is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRejection {
    pub requested: String,
    pub available: Vec<String>,
}

impl fmt::Display for PersonaRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Persona '{}' not found. Available personas: {}",
            self.requested,
            self.available.join(", ")
        )
    }
}

impl StdError for PersonaRejection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_lists_every_available_persona() {
        let rejection = PersonaRejection {
            requested: "nonexistent".to_string(),
            available: vec!["default".to_string(), "coder".to_string()],
        };
        assert_eq!(
            rejection.to_string(),
            "Persona 'nonexistent' not found. Available personas: default, coder"
        );
    }

    #[test]
    fn warnings_expose_their_io_source() {
        let warning = PersistenceWarning::LogAppend {
            path: PathBuf::from("/nowhere/chat_default.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(warning.to_string().contains("chat_default.md"));
        assert!(warning.source().is_some());
    }
}
