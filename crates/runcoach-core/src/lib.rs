//! runcoach-core: running-coach conversation library (slot extraction,
//! response policy, plan synthesis, session history, Gemini bridge,
//! calendar export).
//!
//! The gateway binary only talks to the re-exports below; the module split
//! mirrors the pipeline: extract slots → decide/render or call the LLM →
//! synthesize a plan → export.

pub mod calendar;
mod config;
mod error;
mod gemini;
mod history;
mod orchestrator;
pub mod plan;
pub mod policy;
pub mod prompts;
pub mod slots;

pub use config::CoachConfig;
pub use error::CoachError;
pub use gemini::{CompletionBridge, GeminiBridge};
pub use history::{ConversationTurn, InMemorySessionStore, Role, SessionStore};
pub use orchestrator::{ChatReply, CoachOrchestrator};
pub use plan::RunPlan;
pub use policy::ResponseCategory;
pub use slots::{Slot, SlotSet};
