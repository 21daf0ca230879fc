// The interview flow: setup validation, question generation, the session
// state machine, feedback scoring, and persistence.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod feedback;
pub mod handlers;
pub mod persona;
pub mod prompts;
pub mod questions;
pub mod session;
pub mod store;
