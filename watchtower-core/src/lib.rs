//! watchtower-core: weather-driven persona selection
//!
//! Holds the domain types shared by every other crate:
//! - Weather snapshots and forecast rows
//! - Conversation turns supplied by the dashboard
//! - The immutable persona catalog and the ordered persona selector

pub mod error;
pub mod weather;
pub mod conversation;
pub mod persona;
pub mod selector;

pub use error::{Error, Result};
pub use weather::{
    Coordinates, CurrentConditions, Daypart, ForecastDay, ResolvedLocation, WeatherReport,
    WeatherSnapshot,
};
pub use conversation::{ConversationTurn, TurnRole, MAX_CONTEXT_TURNS};
pub use persona::{Character, Persona, PersonaCatalog, PersonaId, SpeechShaping, TriggerSet, VoiceProfile};
pub use selector::{PersonaSelector, SelectionRule, SELECTION_ORDER};
