//! Structured quest output. Nothing here formats for a particular display;
//! callers decide how to show it.

use fangen_core::Scene;
use serde::Serialize;

/// Id of the choice offered by a scene that has none of its own.
pub const CONTINUE: &str = "continue";

/// A choice as offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// Choice id to pass back to `make_choice`.
    pub id: String,
    /// What the choice does.
    pub text: String,
}

/// A scene ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneRendering {
    /// Quest title.
    pub quest: String,
    /// Scene number as written in the lore.
    pub number: u32,
    /// Scene title.
    pub title: String,
    /// Setting followed by the scene's dialogue lines.
    pub narrative: String,
    /// Choices in lore order.
    pub choices: Vec<ChoiceView>,
}

impl SceneRendering {
    /// Render a scene. A scene without choices offers [`CONTINUE`].
    pub fn new(quest: &str, scene: &Scene) -> Self {
        let mut choices: Vec<ChoiceView> = scene
            .choices
            .iter()
            .map(|c| ChoiceView {
                id: c.id.clone(),
                text: c.description.clone(),
            })
            .collect();
        if choices.is_empty() {
            choices.push(ChoiceView {
                id: CONTINUE.to_string(),
                text: "Continue".to_string(),
            });
        }

        Self {
            quest: quest.to_string(),
            number: scene.number,
            title: scene.title.clone(),
            narrative: narrative(scene),
            choices,
        }
    }
}

/// Setting and dialogue of a scene as one block of text.
pub fn narrative(scene: &Scene) -> String {
    let dialogue = scene
        .dialogues
        .iter()
        .map(|(speaker, line)| format!("{speaker}: \"{line}\""))
        .collect::<Vec<_>>()
        .join("\n");
    [scene.setting.trim(), dialogue.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The end of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestEnd {
    /// Quest title.
    pub title: String,
    /// Closing text: the last outcome, the final scene and the epilogue.
    pub text: String,
    /// Inventory directives collected during the run.
    pub rewards: Vec<String>,
}

/// What the player sees after a quest operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestView {
    /// The quest goes on.
    Scene(SceneRendering),
    /// The quest is over.
    End(QuestEnd),
}

impl QuestView {
    /// Whether the quest ended.
    pub fn is_end(&self) -> bool {
        matches!(self, QuestView::End(_))
    }
}

/// A message plus the view that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestReply {
    /// Greeting, outcome or status text.
    pub message: String,
    /// The scene or the ending.
    pub view: QuestView,
}

/// A quest with the user's completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableQuest {
    /// Quest title.
    pub name: String,
    /// Whether the user has finished it before.
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangen_core::Choice;
    use indexmap::IndexMap;

    fn scene() -> Scene {
        let mut dialogues = IndexMap::new();
        dialogues.insert("Kagitada".to_string(), "Show me.".to_string());
        Scene {
            number: 1,
            title: "The Spark".into(),
            setting: "A dim forge.".into(),
            dialogues,
            choices: vec![Choice {
                id: "1A".into(),
                description: "Strike".into(),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn narrative_joins_setting_and_dialogue() {
        assert_eq!(narrative(&scene()), "A dim forge.\n\nKagitada: \"Show me.\"");
    }

    #[test]
    fn choices_keep_order() {
        let rendering = SceneRendering::new("Ember Trial", &scene());
        assert_eq!(rendering.choices.len(), 1);
        assert_eq!(rendering.choices[0].id, "1A");
    }

    #[test]
    fn choiceless_scene_offers_continue() {
        let mut quiet = scene();
        quiet.choices.clear();
        let rendering = SceneRendering::new("Q", &quiet);
        assert_eq!(rendering.choices.len(), 1);
        assert_eq!(rendering.choices[0].id, CONTINUE);
    }
}
