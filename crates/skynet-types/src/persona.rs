//! Persona types.
//!
//! A persona is a named system-prompt configuration presented to the user as a
//! distinct agent. Behaviour per persona is pure data (the instruction text),
//! so personas are plain structs rather than trait objects.

use serde::{Deserialize, Serialize};

/// A themed assistant personality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Catalog key, e.g. `"hacker"`. Unique within a catalog.
    pub key: String,
    /// Name shown next to assistant replies, e.g. `"Neo"`.
    pub display_name: String,
    /// Instruction sent to the model as the system message.
    pub system_instruction: String,
    /// Hex accent color used by the UI, e.g. `"#00ff41"`.
    pub accent_color: String,
}

/// Public view of a persona. The system instruction is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub key: String,
    pub name: String,
    pub color: String,
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            key: persona.key.clone(),
            name: persona.display_name.clone(),
            color: persona.accent_color.clone(),
        }
    }
}
