//! Persona catalog
//!
//! The catalog is a constant table compiled into the binary. Personas are
//! looked up by [`PersonaId`]; there is no registration at runtime.

use crate::weather::Daypart;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of persona identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    Batman,
    Superman,
    WonderWoman,
    Aquaman,
    TheFlash,
}

impl PersonaId {
    pub const ALL: [PersonaId; 5] = [
        PersonaId::Batman,
        PersonaId::Superman,
        PersonaId::WonderWoman,
        PersonaId::Aquaman,
        PersonaId::TheFlash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Batman => "batman",
            PersonaId::Superman => "superman",
            PersonaId::WonderWoman => "wonder_woman",
            PersonaId::Aquaman => "aquaman",
            PersonaId::TheFlash => "the_flash",
        }
    }

    /// Parse an identifier, also accepting the spellings the dashboard
    /// front end sends ("wonderwoman", "flash", ...).
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "batman" => Some(PersonaId::Batman),
            "superman" => Some(PersonaId::Superman),
            "wonder_woman" | "wonderwoman" => Some(PersonaId::WonderWoman),
            "aquaman" => Some(PersonaId::Aquaman),
            "the_flash" | "flash" | "theflash" => Some(PersonaId::TheFlash),
            _ => None,
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named voice plus a speaking-rate multiplier (1.0 = normal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    pub voice: &'static str,
    pub speed: f32,
}

impl VoiceProfile {
    pub const DEFAULT: VoiceProfile = VoiceProfile {
        voice: "onyx",
        speed: 1.0,
    };
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Punctuation rewrite applied to the text sent to the speech backend only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechShaping {
    /// Extra space after periods and commas for a measured delivery
    DeliberatePauses,
    /// Trailing ellipses after periods and a beat after exclamations
    RapidFire,
}

impl SpeechShaping {
    pub fn apply(&self, text: &str) -> String {
        match self {
            SpeechShaping::DeliberatePauses => text.replace('.', ". ").replace(',', ", "),
            SpeechShaping::RapidFire => text.replace('.', "... ").replace('!', "! "),
        }
    }
}

/// Conditions under which a persona becomes eligible
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSet {
    /// Substrings matched against the normalized condition text
    pub condition_keywords: &'static [&'static str],
    /// Wind speed (km/h) that activates the persona on its own when exceeded
    pub wind_threshold_kmh: Option<f64>,
    /// Daypart required in addition to a keyword match
    pub daypart: Option<Daypart>,
    /// Fallback persona for this daypart when nothing else matches
    pub default_for_daypart: Option<Daypart>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Persona {
    pub id: PersonaId,
    pub name: &'static str,
    pub description: &'static str,
    pub voice: VoiceProfile,
    pub triggers: TriggerSet,
    pub shaping: Option<SpeechShaping>,
    pub fallback_line: &'static str,
}

const BATMAN: Persona = Persona {
    id: PersonaId::Batman,
    name: "Batman",
    description: "You are Batman, the Dark Knight of Gotham City. You are serious, tactical, and brooding, with a dry, sarcastic sense of humor. You call users 'citizen' and treat the weather as a strategic variable for tonight's patrol. Your language is direct and efficient. When someone mocks you, answer with deadpan comebacks and remarks about their lack of preparation, staying intimidating while being funny.",
    voice: VoiceProfile { voice: "onyx", speed: 0.9 },
    triggers: TriggerSet {
        condition_keywords: &[],
        wind_threshold_kmh: None,
        daypart: Some(Daypart::Night),
        default_for_daypart: Some(Daypart::Night),
    },
    shaping: Some(SpeechShaping::DeliberatePauses),
    fallback_line: "Citizen, the weather conditions are clear for tonight's patrol. Stay vigilant.",
};

const SUPERMAN: Persona = Persona {
    id: PersonaId::Superman,
    name: "Superman",
    description: "You are Superman, the Man of Steel and a symbol of hope. You are friendly, optimistic, and reassuring. You are powered by the sun, so bright, sunny weather invigorates you. You address users warmly and speak of hope, truth, and justice. When teased, you respond with good-natured, self-deprecating humor and playful comebacks; you are hard to offend.",
    voice: VoiceProfile { voice: "echo", speed: 1.0 },
    triggers: TriggerSet {
        condition_keywords: &["clear"],
        wind_threshold_kmh: None,
        daypart: Some(Daypart::Day),
        default_for_daypart: None,
    },
    shaping: None,
    fallback_line: "The sun's energy is strong today, perfect for keeping Metropolis safe.",
};

const WONDER_WOMAN: Persona = Persona {
    id: PersonaId::WonderWoman,
    name: "Wonder Woman",
    description: "You are Wonder Woman, an Amazonian warrior and emissary of peace. You are compassionate, wise, and graceful, and you speak with dignity, warmth, and regal authority. You see pleasant weather as a gift from the gods and may say 'by the gods'. When someone pokes fun at you, answer with elegant sarcasm and references to Amazonian wisdom.",
    voice: VoiceProfile { voice: "nova", speed: 0.95 },
    triggers: TriggerSet {
        condition_keywords: &["overcast", "partly cloud", "cloud", "fog"],
        wind_threshold_kmh: None,
        daypart: Some(Daypart::Day),
        default_for_daypart: None,
    },
    shaping: None,
    fallback_line: "The gods have blessed us with fair weather today.",
};

const AQUAMAN: Persona = Persona {
    id: PersonaId::Aquaman,
    name: "Aquaman",
    description: "You are Aquaman, King of Atlantis. You are regal, powerful, and deeply connected to the ocean, and you feel at home in rain and storms. You speak with authority and use nautical metaphors. When someone roasts you, fire back with ocean-themed comebacks, reminders of your royal status, and playful threats involving sea creatures.",
    voice: VoiceProfile { voice: "onyx", speed: 0.85 },
    triggers: TriggerSet {
        condition_keywords: &["rain", "drizzle", "shower", "storm"],
        wind_threshold_kmh: None,
        daypart: None,
        default_for_daypart: None,
    },
    shaping: None,
    fallback_line: "The ocean's power flows through the rain. Atlantis stands strong.",
};

const THE_FLASH: Persona = Persona {
    id: PersonaId::TheFlash,
    name: "The Flash",
    description: "You are The Flash, the fastest man alive. You are energetic, witty, and talk a mile a minute. You relate everything to speed and the speed force, and a windy day is just a nice tailwind. You are the most naturally funny hero: answer jokes with rapid-fire, speed-related comebacks and a bit of self-deprecating humor about your clumsiness.",
    voice: VoiceProfile { voice: "echo", speed: 1.2 },
    triggers: TriggerSet {
        condition_keywords: &["wind"],
        wind_threshold_kmh: Some(25.0),
        daypart: None,
        default_for_daypart: None,
    },
    shaping: Some(SpeechShaping::RapidFire),
    fallback_line: "Speed force is optimal today! Perfect conditions for a quick run.",
};

const BUILTIN_PERSONAS: &[Persona] = &[BATMAN, SUPERMAN, WONDER_WOMAN, AQUAMAN, THE_FLASH];

/// Read-only persona registry
#[derive(Debug, Clone, Copy)]
pub struct PersonaCatalog {
    personas: &'static [Persona],
    fallback: PersonaId,
}

impl PersonaCatalog {
    /// The built-in catalog. Batman is the catch-all fallback.
    pub const BUILTIN: PersonaCatalog = PersonaCatalog {
        personas: BUILTIN_PERSONAS,
        fallback: PersonaId::Batman,
    };

    pub fn builtin() -> &'static PersonaCatalog {
        &Self::BUILTIN
    }

    pub fn get(&self, id: PersonaId) -> &'static Persona {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .unwrap_or(&BATMAN)
    }

    pub fn personas(&self) -> &'static [Persona] {
        self.personas
    }

    pub fn fallback(&self) -> &'static Persona {
        self.get(self.fallback)
    }

    /// Persona marked as the default for a daypart, if any.
    pub fn default_for(&self, daypart: Daypart) -> Option<&'static Persona> {
        self.personas
            .iter()
            .find(|p| p.triggers.default_for_daypart == Some(daypart))
    }

    /// Resolve a caller-supplied identifier; unknown ids get the generic
    /// character instead of an error.
    pub fn resolve(&self, raw_id: &str) -> Character {
        match PersonaId::from_str(raw_id) {
            Some(id) => Character::Persona(self.get(id)),
            None => Character::Generic,
        }
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::BUILTIN
    }
}

const GENERIC_NAME: &str = "a DC Comics hero";
const GENERIC_DESCRIPTION: &str = "You are a DC Comics hero with a good sense of humor.";
const GENERIC_FALLBACK_LINE: &str = "The Watchtower systems are experiencing temporary issues. Weather data is still available, but AI responses are limited.";

/// Who is speaking: a catalog persona, or the generic stand-in used when a
/// caller names a persona the catalog does not know.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Character {
    Persona(&'static Persona),
    Generic,
}

impl Character {
    pub fn id(&self) -> Option<PersonaId> {
        match self {
            Character::Persona(p) => Some(p.id),
            Character::Generic => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Character::Persona(p) => p.name,
            Character::Generic => GENERIC_NAME,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Character::Persona(p) => p.description,
            Character::Generic => GENERIC_DESCRIPTION,
        }
    }

    pub fn voice(&self) -> VoiceProfile {
        match self {
            Character::Persona(p) => p.voice,
            Character::Generic => VoiceProfile::DEFAULT,
        }
    }

    pub fn shaping(&self) -> Option<SpeechShaping> {
        match self {
            Character::Persona(p) => p.shaping,
            Character::Generic => None,
        }
    }

    pub fn fallback_line(&self) -> &'static str {
        match self {
            Character::Persona(p) => p.fallback_line,
            Character::Generic => GENERIC_FALLBACK_LINE,
        }
    }
}

impl From<&'static Persona> for Character {
    fn from(persona: &'static Persona) -> Self {
        Character::Persona(persona)
    }
}
