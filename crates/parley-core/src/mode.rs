//! Mode resolution: maps a mode name to the system instruction it stands for.

use std::collections::{BTreeMap, HashMap};

use parley_types::error::ModeError;
use parley_types::mode::{ActiveMode, ModeDefinition};

/// Names that clear the active mode instead of selecting one.
pub const RESET_NAMES: [&str; 2] = ["reset", "none"];

fn is_reset(name: &str) -> bool {
    RESET_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name.trim()))
}

/// Immutable name -> instruction table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ModeResolver {
    modes: BTreeMap<String, String>,
}

impl ModeResolver {
    /// Build from definitions. Later duplicates replace earlier ones;
    /// definitions using a reserved name are dropped.
    pub fn new(definitions: Vec<ModeDefinition>) -> Self {
        let mut modes = BTreeMap::new();
        for def in definitions {
            if is_reset(&def.name) {
                tracing::warn!(name = %def.name, "mode name is reserved, ignoring definition");
                continue;
            }
            modes.insert(def.name, def.instruction);
        }
        Self { modes }
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self::new(
            map.into_iter()
                .map(|(name, instruction)| ModeDefinition { name, instruction })
                .collect(),
        )
    }

    /// Resolve a mode name.
    ///
    /// Reserved reset names return [`ActiveMode::Cleared`]; other names must
    /// match a definition exactly.
    pub fn resolve(&self, name: &str) -> Result<ActiveMode, ModeError> {
        if is_reset(name) {
            return Ok(ActiveMode::Cleared);
        }
        self.modes
            .get(name)
            .map(|instruction| ActiveMode::Instruction(instruction.clone()))
            .ok_or_else(|| ModeError::UnknownMode {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Mode names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.modes.keys().cloned().collect()
    }

    pub fn definitions(&self) -> impl Iterator<Item = ModeDefinition> + '_ {
        self.modes
            .iter()
            .map(|(name, instruction)| ModeDefinition::new(name, instruction))
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
