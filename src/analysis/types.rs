//! Shapes returned by the text analysis capability

use crate::item::Category;
use serde::{Deserialize, Serialize};

fn scene_category() -> Category {
    Category::Scene
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedScene {
    #[serde(default)]
    pub id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default, alias = "prompt")]
    pub visual_description_prompt: String,

    /// Always Scene; kept so round-tripped responses stay faithful
    #[serde(default = "scene_category")]
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntity {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(alias = "title")]
    pub name: String,

    pub category: Category,

    #[serde(default, alias = "prompt")]
    pub visual_description_prompt: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub scenes: Vec<ExtractedScene>,

    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
}

/// Either source shape, before normalization
#[derive(Debug, Clone)]
pub enum Extracted {
    Scene(ExtractedScene),
    Entity(ExtractedEntity),
}

impl AnalysisResponse {
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty() && self.entities.is_empty()
    }

    /// Scenes first, then entities, each in their own order
    pub fn into_appearance_order(self) -> Vec<Extracted> {
        self.scenes
            .into_iter()
            .map(Extracted::Scene)
            .chain(self.entities.into_iter().map(Extracted::Entity))
            .collect()
    }
}
