//! Ordered persona selection
//!
//! Triggers overlap across personas ("thunderstorm" with 40 km/h wind
//! matches both water and wind), so the order of [`SELECTION_ORDER`] is the
//! tie-break: rules are evaluated top to bottom and the first match wins.

use crate::persona::{Persona, PersonaCatalog, PersonaId};
use crate::weather::{Daypart, WeatherSnapshot};

/// One step of the selection chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// Condition names rain, drizzle, showers or storms
    Water,
    /// Condition mentions wind, or measured wind exceeds the threshold
    Wind,
    /// Clear sky during the day
    ClearDay,
    /// Cloud or fog during the day with no precipitation
    CloudyDay,
    /// Anything at night
    Night,
    /// Catch-all
    Default,
}

/// Evaluation order. First match wins.
pub const SELECTION_ORDER: [SelectionRule; 6] = [
    SelectionRule::Water,
    SelectionRule::Wind,
    SelectionRule::ClearDay,
    SelectionRule::CloudyDay,
    SelectionRule::Night,
    SelectionRule::Default,
];

impl SelectionRule {
    /// Persona whose triggers this rule reads
    pub fn persona(&self) -> PersonaId {
        match self {
            SelectionRule::Water => PersonaId::Aquaman,
            SelectionRule::Wind => PersonaId::TheFlash,
            SelectionRule::ClearDay => PersonaId::Superman,
            SelectionRule::CloudyDay => PersonaId::WonderWoman,
            SelectionRule::Night | SelectionRule::Default => PersonaId::Batman,
        }
    }

    fn matches(&self, catalog: &PersonaCatalog, snapshot: &WeatherSnapshot, daypart: Daypart) -> bool {
        let triggers = &catalog.get(self.persona()).triggers;
        match self {
            SelectionRule::Water => snapshot.condition_contains_any(triggers.condition_keywords),
            SelectionRule::Wind => {
                snapshot.condition_contains_any(triggers.condition_keywords)
                    || triggers
                        .wind_threshold_kmh
                        .map_or(false, |threshold| snapshot.wind_kmh() > threshold)
            }
            SelectionRule::ClearDay => {
                daypart_allows(triggers.daypart, daypart)
                    && snapshot.condition_contains_any(triggers.condition_keywords)
            }
            SelectionRule::CloudyDay => {
                let water = &catalog.get(SelectionRule::Water.persona()).triggers;
                daypart_allows(triggers.daypart, daypart)
                    && snapshot.condition_contains_any(triggers.condition_keywords)
                    && !snapshot.condition_contains_any(water.condition_keywords)
            }
            SelectionRule::Night => {
                daypart == Daypart::Night && triggers.default_for_daypart == Some(Daypart::Night)
            }
            SelectionRule::Default => true,
        }
    }
}

fn daypart_allows(required: Option<Daypart>, actual: Daypart) -> bool {
    required.map_or(true, |d| d == actual)
}

/// Maps a weather snapshot to exactly one persona.
#[derive(Debug, Clone, Copy)]
pub struct PersonaSelector {
    catalog: &'static PersonaCatalog,
}

impl PersonaSelector {
    pub fn new(catalog: &'static PersonaCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static PersonaCatalog {
        self.catalog
    }

    /// Pick a persona for the snapshot. Total and side-effect free.
    pub fn select(&self, snapshot: &WeatherSnapshot) -> &'static Persona {
        let (persona, _) = self.select_with_rule(snapshot);
        persona
    }

    /// Like [`select`](Self::select), also reporting which rule fired.
    pub fn select_with_rule(&self, snapshot: &WeatherSnapshot) -> (&'static Persona, SelectionRule) {
        let daypart = snapshot.daypart();
        for rule in SELECTION_ORDER {
            if rule.matches(self.catalog, snapshot, daypart) {
                return (self.catalog.get(rule.persona()), rule);
            }
        }
        (self.catalog.fallback(), SelectionRule::Default)
    }
}

impl Default for PersonaSelector {
    fn default() -> Self {
        Self::new(PersonaCatalog::builtin())
    }
}
