use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_THINKING_BUDGET: u32 = 2000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Persona {
    pub name: String,
    pub system_instruction: String,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Gemini model id (e.g., "gemini-2.5-pro")
    pub model: Option<String>,
    /// API root; `GEMINI_BASE_URL` takes precedence when set
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    /// Token budget the model may spend on reasoning before answering
    pub thinking_budget: Option<u32>,
    /// Ask the service to stream reasoning fragments alongside the answer
    pub include_thoughts: Option<bool>,
    /// Persona used when no valid last selection is stored
    pub default_persona: Option<String>,
    /// Directory holding `chat_<persona>.md` transcripts and `.last_prompt`
    pub data_dir: Option<PathBuf>,
    /// User-defined personas; a name matching a built-in replaces its instruction
    #[serde(default)]
    pub personas: Vec<Persona>,
}

/// Generation parameters that do not depend on the active persona.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub thinking_budget: u32,
    pub include_thoughts: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            thinking_budget: DEFAULT_THINKING_BUDGET,
            include_thoughts: true,
        }
    }
}

impl Config {
    pub fn generation_settings(&self) -> GenerationSettings {
        let defaults = GenerationSettings::default();
        GenerationSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            thinking_budget: self.thinking_budget.unwrap_or(defaults.thinking_budget),
            include_thoughts: self.include_thoughts.unwrap_or(defaults.include_thoughts),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Transcripts default to the working directory, next to the user.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
