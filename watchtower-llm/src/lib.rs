pub mod config;
pub mod dialogue;
pub mod error;
pub mod generator;
pub mod manager;
pub mod providers;

#[cfg(test)]
mod dialogue_tests;

pub use config::*;
pub use dialogue::{DialogueComposer, DialogueRequest, DEFAULT_USER_MESSAGE};
pub use error::*;
pub use generator::TextGenerator;
pub use manager::LLMManager;
pub use providers::Provider;
