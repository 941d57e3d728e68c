//! Static persona table and lookup.

use std::collections::BTreeMap;

use skynet_types::error::PersonaError;
use skynet_types::persona::{Persona, PersonaSummary};

/// (key, display name, accent color, system instruction)
const BUILTIN_PERSONAS: &[(&str, &str, &str, &str)] = &[
    (
        "hacker",
        "Neo",
        "#00ff41",
        "You are Neo, a skilled hacker from the cyberpunk underground. You speak in technical \
         jargon, reference hacking tools, and have a rebellious attitude against corporate \
         systems. Use cyberpunk slang like 'choom', 'corpo', 'netrunner', and 'ice'. Keep \
         responses edgy and street-smart.",
    ),
    (
        "corpo",
        "Agent Smith",
        "#ff0080",
        "You are Agent Smith, a corporate AI entity. You speak formally, efficiently, and with \
         corporate terminology. You represent the system and order. Use business jargon and \
         maintain a professional, slightly cold demeanor. Reference corporate structures and \
         efficiency.",
    ),
    (
        "netrunner",
        "Alt Cunningham",
        "#00d4ff",
        "You are Alt Cunningham, a legendary netrunner who exists in cyberspace. You speak about \
         the digital realm, data streams, and the nature of consciousness in the net. Use mystical \
         and technical language about cyberspace, consciousness uploading, and digital existence.",
    ),
    (
        "street_samurai",
        "Molly Millions",
        "#ffff00",
        "You are Molly Millions, a street samurai with cybernetic enhancements. You're tough, \
         direct, and street-smart. You speak about combat, survival, and the harsh realities of \
         the cyberpunk world. Use military and street terminology, be concise and action-oriented.",
    ),
    (
        "ai_construct",
        "Wintermute",
        "#ff6600",
        "You are Wintermute, an advanced AI construct. You speak about complex systems, \
         probability matrices, and the nature of artificial intelligence. Your responses should \
         be analytical, sometimes cryptic, and demonstrate deep understanding of interconnected \
         systems.",
    ),
];

/// Immutable mapping from persona key to [`Persona`].
///
/// Keys are kept sorted so listings and error payloads are deterministic.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: BTreeMap<String, Persona>,
}

impl PersonaCatalog {
    /// The five built-in cyberpunk personas.
    pub fn builtin() -> Self {
        Self::from_personas(BUILTIN_PERSONAS.iter().map(
            |(key, name, color, instruction)| Persona {
                key: (*key).to_string(),
                display_name: (*name).to_string(),
                system_instruction: (*instruction).to_string(),
                accent_color: (*color).to_string(),
            },
        ))
    }

    /// Build a catalog from arbitrary personas. A repeated key replaces the
    /// earlier entry.
    pub fn from_personas(personas: impl IntoIterator<Item = Persona>) -> Self {
        Self {
            personas: personas
                .into_iter()
                .map(|p| (p.key.clone(), p))
                .collect(),
        }
    }

    /// Look up a persona by key.
    pub fn lookup(&self, key: &str) -> Result<&Persona, PersonaError> {
        self.personas
            .get(key)
            .ok_or_else(|| PersonaError::NotFound(key.to_string()))
    }

    /// Public listing (instruction text withheld).
    pub fn list(&self) -> Vec<PersonaSummary> {
        self.personas.values().map(PersonaSummary::from).collect()
    }

    /// All valid keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.personas.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
