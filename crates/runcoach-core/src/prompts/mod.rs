//! Prompt templates for the coach orchestrator.

pub mod coach;

pub use coach::RUNNING_COACH_SYSTEM;
