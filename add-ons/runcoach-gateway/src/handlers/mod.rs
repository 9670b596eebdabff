//! HTTP handlers: chat exchange and calendar export.

pub mod calendar;
pub mod chat;
