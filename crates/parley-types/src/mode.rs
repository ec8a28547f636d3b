//! Chat mode definitions.

use serde::{Deserialize, Serialize};

/// A named system instruction that biases a provider's response style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDefinition {
    pub name: String,
    pub instruction: String,
}

impl ModeDefinition {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
        }
    }
}

/// Result of resolving a mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveMode {
    /// Prepend this system instruction to subsequent requests.
    Instruction(String),
    /// No active instruction (the reserved reset name was given).
    Cleared,
}

impl ActiveMode {
    pub fn instruction(&self) -> Option<&str> {
        match self {
            ActiveMode::Instruction(text) => Some(text),
            ActiveMode::Cleared => None,
        }
    }
}
