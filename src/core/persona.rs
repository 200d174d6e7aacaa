use crate::core::builtin_personas::{load_builtin_personas, DEFAULT_PERSONA};
use crate::core::config::{Config, Persona};

/// Read-only catalogue of personas, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    /// Personas in declaration order
    personas: Vec<Persona>,
    /// Name handed out when nothing else selects a persona
    default_name: String,
}

impl PersonaRegistry {
    /// Build the registry from the built-in personas plus any defined in config.
    ///
    /// A config persona whose name matches a built-in replaces that
    /// built-in's instruction in place; new names are appended.
    pub fn load(config: &Config) -> Self {
        let mut personas = load_builtin_personas();
        for custom in &config.personas {
            match personas.iter_mut().find(|p| p.name == custom.name) {
                Some(existing) => existing.system_instruction = custom.system_instruction.clone(),
                None => personas.push(custom.clone()),
            }
        }

        Self::with_default(personas, config.default_persona.as_deref())
    }

    /// Registry over an explicit persona list.
    ///
    /// `preferred_default` is honoured only when it names a listed persona;
    /// otherwise the built-in default is used if present, else the first entry.
    pub fn with_default(personas: Vec<Persona>, preferred_default: Option<&str>) -> Self {
        let contains = |name: &str| personas.iter().any(|p| p.name == name);
        let default_name = preferred_default
            .filter(|name| contains(name))
            .or_else(|| contains(DEFAULT_PERSONA).then_some(DEFAULT_PERSONA))
            .or_else(|| personas.first().map(|p| p.name.as_str()))
            .unwrap_or(DEFAULT_PERSONA)
            .to_string();

        Self {
            personas,
            default_name,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn all(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn default_persona(&self) -> Option<&Persona> {
        self.lookup(&self.default_name)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

/// Short single-line preview of an instruction for persona listings.
pub fn instruction_preview(instruction: &str) -> String {
    let head: String = instruction.chars().take(30).collect();
    format!("{}...", head.replace('\n', " "))
}
