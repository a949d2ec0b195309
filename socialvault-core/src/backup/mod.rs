//! The backup workflow: configuration, the fixed step list and the
//! orchestrator that walks it.

pub mod config;
pub mod step;
pub mod observer;
pub mod workflow;
