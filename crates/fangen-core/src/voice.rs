//! Character voice: a tone bucket chosen from personality keywords, each with
//! one fixed phrasing.

/// The tone a character answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Playful, quirky or eccentric.
    Playful,
    /// Stoic, cold or methodical.
    Stoic,
    /// Arrogant or cunning.
    Arrogant,
    /// Fierce, protective or loyal.
    Fierce,
    /// Anything else.
    Neutral,
}

impl Tone {
    /// Classify a personality description. Buckets are checked in order and
    /// the first with a matching keyword wins.
    pub fn classify(personality: &str) -> Self {
        let lower = personality.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |keys: &[&str]| keys.iter().any(|k| words.contains(k));

        if has(&["playful", "quirky", "eccentric"]) {
            Tone::Playful
        } else if has(&["stoic", "cold", "methodical"]) {
            Tone::Stoic
        } else if has(&["arrogant", "cunning"]) {
            Tone::Arrogant
        } else if has(&["fierce", "protective", "loyal"]) {
            Tone::Fierce
        } else {
            Tone::Neutral
        }
    }

    /// Phrase a reply about `topic` in this tone.
    pub fn respond(self, topic: &str) -> String {
        match self {
            Tone::Playful => format!(
                "*with a mischievous grin* Ah, curious about {topic}, are you? Well, let me tell you something interesting..."
            ),
            Tone::Stoic => {
                format!("*stares intently* {topic}? I will speak of it, though few deserve such knowledge.")
            }
            Tone::Arrogant => format!(
                "*smirks confidently* You wish to know of {topic}? Most wouldn't even comprehend it, but perhaps you might..."
            ),
            Tone::Fierce => format!(
                "*stands tall* {topic} is a matter of honor and duty. Listen carefully to what I tell you."
            ),
            Tone::Neutral => format!("You ask about {topic}? Very well, I shall share what I know."),
        }
    }
}
