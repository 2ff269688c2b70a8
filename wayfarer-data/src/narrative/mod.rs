//! HTTP narrative providers used when the structured pipeline fails.
//!
//! [`ChatNarrativeProvider`] asks an OpenAI-compatible chat-completions
//! endpoint for a plan in the `Day N` / `HH:MM-HH:MM Spot` line format and
//! hands the reply to [`wayfarer_core::NarrativeItinerary::from_text`].

mod chat;

pub use chat::{
    ChatNarrativeConfig, ChatNarrativeProvider, DEFAULT_MODEL, DEFAULT_NARRATIVE_TIMEOUT,
};
