//! Labelled sections: the flat intermediate form between lines and records.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexer::Line;

static QUEST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Quest\s*:\s*(.+)$").unwrap());
static SCENE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Scene\s*(\d+)\s*:\s*(.*)$").unwrap());
static OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Option\s*(\d+[A-Z]?)\s*:\s*(.*)$").unwrap());
static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Your\s*Choice\s*:\s*(.*)$").unwrap());
static EPILOGUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Epilogue\s*:\s*(.*)$").unwrap());
static OUTCOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Outcome\s*:\s*(.*)$").unwrap());
static PLAYER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^Player\s*:\s*["“]([^"”]+)["”]"#).unwrap());
static SETTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Setting\s*:\s*(.*)$").unwrap());
static DIALOGUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z][A-Za-z, ]*?)\s*(?:\([^)]*\))?\s*:\s*["“]([^"”]+)["”]"#).unwrap()
});
static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][^:]{0,80}?)\s*:\s*(.*)$").unwrap());
static NUMBERING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

/// What a section is.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// `Quest: <title>`. Body holds the quest description.
    Quest {
        /// Quest title.
        title: String,
    },
    /// `Scene <n>: <title>`. Body holds any untagged scene text.
    Scene {
        /// Scene number.
        number: String,
        /// Scene title.
        title: String,
    },
    /// `Option <id>: <description>`.
    Option {
        /// Option id, e.g. `1A`.
        id: String,
        /// Option description.
        description: String,
    },
    /// `Your Choice:` prompt.
    ChoicePrompt,
    /// `Epilogue:`. Body holds the epilogue text.
    Epilogue,
    /// `Outcome:`. Body holds the outcome text.
    Outcome,
    /// `Player: "..."`.
    Player {
        /// The quoted line.
        line: String,
    },
    /// `Setting:`. Body holds the setting text.
    Setting,
    /// `Speaker: "line"`, optionally with a parenthesized aside.
    Dialogue {
        /// Speaker name.
        speaker: String,
        /// The quoted line.
        line: String,
    },
    /// A plain line directly followed by a bullet field.
    Heading(String),
    /// `• Key: value`. Body holds the value.
    Field {
        /// Field key as written.
        key: String,
    },
    /// A long underscore rule.
    Rule,
    /// Anything else. Body holds the text.
    Text,
}

impl Label {
    fn takes_continuation(&self) -> bool {
        matches!(
            self,
            Label::Quest { .. }
                | Label::Scene { .. }
                | Label::Option { .. }
                | Label::Epilogue
                | Label::Outcome
                | Label::Setting
                | Label::Field { .. }
        )
    }
}

/// A labelled section of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// What the section is.
    pub label: Label,
    /// Section content with continuation lines folded in. Paragraph breaks
    /// are kept as blank lines.
    pub body: String,
    /// The section as written, header line included.
    pub raw: String,
    /// Byte range in the source.
    pub span: Range<usize>,
}

impl Section {
    /// First paragraph of the body.
    pub fn first_paragraph(&self) -> &str {
        self.body.split("\n\n").next().unwrap_or_default().trim()
    }
}

/// Normalize a field key or heading for comparison: lowercase, `&` dropped,
/// whitespace collapsed.
pub fn normalize_key(key: &str) -> String {
    key.replace('&', " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip list numbering and a trailing colon from a heading.
pub fn clean_heading(text: &str) -> String {
    let stripped = NUMBERING.replace(text, "");
    stripped.trim().trim_end_matches(':').trim().to_string()
}

/// `continuing` is set when the line sits directly under a section that takes
/// a body, with no blank line or rule in between.
fn classify(line: &Line, next: Option<&Line>, continuing: bool) -> (Label, String) {
    let text = line.text.as_str();

    if line.rule {
        return (Label::Rule, String::new());
    }
    if let Some(c) = QUEST.captures(text) {
        return (
            Label::Quest {
                title: c[1].trim().to_string(),
            },
            String::new(),
        );
    }
    if let Some(c) = SCENE.captures(text) {
        return (
            Label::Scene {
                number: c[1].to_string(),
                title: c[2].trim().to_string(),
            },
            String::new(),
        );
    }
    if let Some(c) = OPTION.captures(text) {
        return (
            Label::Option {
                id: c[1].to_string(),
                description: c[2].trim().to_string(),
            },
            String::new(),
        );
    }
    if let Some(c) = PROMPT.captures(text) {
        return (Label::ChoicePrompt, c[1].trim().to_string());
    }
    if let Some(c) = EPILOGUE.captures(text) {
        return (Label::Epilogue, c[1].trim().to_string());
    }
    if let Some(c) = OUTCOME.captures(text) {
        return (Label::Outcome, c[1].trim().to_string());
    }
    if let Some(c) = PLAYER.captures(text) {
        return (
            Label::Player {
                line: c[1].trim().to_string(),
            },
            String::new(),
        );
    }
    if let Some(c) = SETTING.captures(text) {
        return (Label::Setting, c[1].trim().to_string());
    }
    if let Some(c) = DIALOGUE.captures(text) {
        return (
            Label::Dialogue {
                speaker: c[1].trim().to_string(),
                line: c[2].trim().to_string(),
            },
            String::new(),
        );
    }
    if line.bullet {
        if let Some(c) = FIELD.captures(text) {
            return (
                Label::Field {
                    key: c[1].trim().to_string(),
                },
                c[2].trim().to_string(),
            );
        }
        return (Label::Text, text.to_string());
    }
    // Under an open field only a title-like line starts a new group; anything
    // else is the previous value wrapping onto the next line.
    if next.is_some_and(is_field_line)
        && !text.is_empty()
        && (!continuing || looks_like_title(text))
    {
        return (Label::Heading(clean_heading(text)), String::new());
    }
    (Label::Text, text.to_string())
}

/// Capitalized (or numbered) and not ending like a sentence or clause.
fn looks_like_title(text: &str) -> bool {
    let starts_upper = text
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
    starts_upper && !text.ends_with(['.', ',', ';', '!', '?', '"', '”'])
}

fn is_field_line(line: &Line) -> bool {
    line.bullet && FIELD.is_match(&line.text) && !is_marker(&line.text)
}

fn is_marker(text: &str) -> bool {
    [
        &QUEST, &SCENE, &OPTION, &PROMPT, &EPILOGUE, &OUTCOME, &PLAYER, &SETTING, &DIALOGUE,
    ]
    .iter()
    .any(|re| re.is_match(text))
}

/// Label every line and fold continuation lines into their sections.
///
/// A plain line continues the open section if that section takes a body
/// (quests, scenes, options, epilogues, outcomes, settings and fields).
/// Blank lines never end a section on their own; they become paragraph
/// breaks if more continuation text follows. A plain line only starts a
/// heading after a blank line, a rule or a section without a body.
pub fn sectionize(lines: &[Line]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut open = false;
    let mut pending_break = false;

    for (i, line) in lines.iter().enumerate() {
        if line.is_blank() {
            pending_break = open;
            continue;
        }

        let (label, body) = classify(line, lines.get(i + 1), open && !pending_break);

        if label == Label::Text && !line.bullet && open {
            if let Some(last) = sections.last_mut() {
                let separator = if pending_break { "\n\n" } else { "\n" };
                if !last.body.is_empty() {
                    last.body.push_str(separator);
                }
                last.body.push_str(&line.text);
                last.raw.push_str(separator);
                last.raw.push_str(&line.text);
                last.span.end = line.span.end;
                pending_break = false;
                continue;
            }
        }

        open = label.takes_continuation();
        pending_break = false;
        sections.push(Section {
            label,
            body,
            raw: line.text.clone(),
            span: line.span.clone(),
        });
    }

    sections
}
