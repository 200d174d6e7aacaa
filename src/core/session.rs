//! Active persona, in-memory history, and the transitions between personas.
//!
//! The session owns the only copy of the conversation that is sent to the
//! model. It is hydrated from the active persona's transcript on startup and
//! on every switch, and from then on every appended turn goes to memory first
//! and to the transcript second. `clear` touches memory only, so switching
//! away and back brings cleared turns back from disk.

use chrono::Local;
use tracing::{debug, warn};

use crate::core::chat_stream::GenerationConfig;
use crate::core::config::{GenerationSettings, Persona};
use crate::core::errors::{PersistenceWarning, PersonaRejection};
use crate::core::message::{Turn, TurnRole};
use crate::core::persona::PersonaRegistry;
use crate::core::selection::PersistedSelection;
use crate::core::transcript::{reconcile, TIMESTAMP_FORMAT};
use crate::utils::logging::LogStore;

pub struct SessionState {
    registry: PersonaRegistry,
    log_store: LogStore,
    selection: PersistedSelection,
    settings: GenerationSettings,
    active: Persona,
    turns: Vec<Turn>,
    generation: GenerationConfig,
    warnings: Vec<PersistenceWarning>,
}

impl SessionState {
    /// Start on the persisted persona and hydrate its history.
    pub fn initialize(
        registry: PersonaRegistry,
        log_store: LogStore,
        selection: PersistedSelection,
        settings: GenerationSettings,
    ) -> Self {
        let name = selection.load(&registry);
        let active = registry
            .lookup(&name)
            .or_else(|| registry.default_persona())
            .cloned()
            .unwrap_or_else(|| Persona {
                name,
                system_instruction: String::new(),
            });
        let generation = GenerationConfig::for_persona(&settings, &active.system_instruction);

        let mut session = Self {
            registry,
            log_store,
            selection,
            settings,
            active,
            turns: Vec::new(),
            generation,
            warnings: Vec::new(),
        };
        session.turns = session.hydrate();
        debug!(
            persona = %session.active.name,
            turns = session.turns.len(),
            "session initialized"
        );
        session
    }

    /// Make `name` the active persona, reloading its history from disk.
    ///
    /// Unknown names leave the session untouched. Switching to the persona
    /// that is already active is allowed and re-reads its transcript.
    pub fn switch_to(&mut self, name: &str) -> Result<(), PersonaRejection> {
        let Some(persona) = self.registry.lookup(name).cloned() else {
            return Err(PersonaRejection {
                requested: name.to_string(),
                available: self.registry.names().into_iter().map(str::to_string).collect(),
            });
        };

        self.active = persona;
        self.persist_selection();
        self.generation =
            GenerationConfig::for_persona(&self.settings, &self.active.system_instruction);
        self.turns = self.hydrate();
        debug!(persona = %self.active.name, turns = self.turns.len(), "switched persona");
        Ok(())
    }

    /// Forget in-memory history. The transcript on disk is left as it is.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Record a turn in memory and append it to the active transcript.
    ///
    /// A failed write is kept as a warning; the turn stays in memory.
    pub fn append_turn(&mut self, role: TurnRole, text: &str) {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.turns
            .push(Turn::new(role, text).with_timestamp(timestamp.clone()));

        if let Err(source) = self
            .log_store
            .append(&self.active.name, role, text, &timestamp)
        {
            self.record(PersistenceWarning::LogAppend {
                path: self.log_store.path(&self.active.name),
                source,
            });
        }
    }

    /// Write the active persona name to the selection store.
    pub fn persist_selection(&mut self) {
        if let Err(source) = self.selection.save(&self.active.name) {
            self.record(PersistenceWarning::SelectionSave {
                path: self.selection.path().to_path_buf(),
                source,
            });
        }
    }

    /// Warnings raised since the last call, oldest first.
    pub fn drain_warnings(&mut self) -> Vec<PersistenceWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn active_persona(&self) -> &Persona {
        &self.active
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn history_len(&self) -> usize {
        self.turns.len()
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn log_path(&self) -> std::path::PathBuf {
        self.log_store.path(&self.active.name)
    }

    pub fn has_log(&self) -> bool {
        self.log_store.exists(&self.active.name)
    }

    fn hydrate(&mut self) -> Vec<Turn> {
        match self.log_store.read_raw(&self.active.name) {
            Ok(raw) => reconcile(&raw),
            Err(source) => {
                self.record(PersistenceWarning::LogRead {
                    path: self.log_store.path(&self.active.name),
                    source,
                });
                Vec::new()
            }
        }
    }

    fn record(&mut self, warning: PersistenceWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}
