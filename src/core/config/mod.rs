pub mod data;
pub mod io;

pub use data::{Config, GenerationSettings, Persona};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
