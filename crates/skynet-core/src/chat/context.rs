//! Context assembly: the exact message list sent to the model.
//!
//! One system message holding the persona instruction, followed by a fixed
//! trailing window of the transcript. The window is a turn count, not a token
//! budget; long turns are passed through untrimmed.

use skynet_types::chat::Turn;
use skynet_types::llm::Message;
use skynet_types::persona::Persona;

/// Number of most recent turns included after the system message.
pub const CONTEXT_WINDOW_TURNS: usize = 10;

/// Build the prompt for `persona` from a full transcript.
///
/// Role and content are passed through verbatim; persona metadata and
/// timestamps are dropped.
pub fn build_prompt<I>(persona: &Persona, turns: &[Turn<I>]) -> Vec<Message> {
    let start = turns.len().saturating_sub(CONTEXT_WINDOW_TURNS);
    let window = &turns[start..];

    let mut messages = Vec::with_capacity(window.len() + 1);
    messages.push(Message::system(persona.system_instruction.clone()));
    messages.extend(window.iter().map(|turn| Message {
        role: turn.role.into(),
        content: turn.content.clone(),
    }));
    messages
}
