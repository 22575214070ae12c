use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reserved image reference meaning "illustration unavailable"
pub const PLACEHOLDER_IMAGE_IDENTIFIER: &str = "placeholder_image_identifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Category {
    #[serde(alias = "Escena", alias = "scene")]
    Scene,
    #[serde(alias = "Personaje", alias = "character")]
    Character,
    #[serde(alias = "Entorno", alias = "setting")]
    Setting,
    #[serde(alias = "ObjetoImportante", alias = "important_object")]
    ImportantObject,
    #[serde(alias = "Tecnología", alias = "Tecnologia", alias = "technology")]
    Technology,
    #[serde(alias = "Evento", alias = "event")]
    Event,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Scene,
        Category::Character,
        Category::Setting,
        Category::ImportantObject,
        Category::Technology,
        Category::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scene => "Scene",
            Category::Character => "Character",
            Category::Setting => "Setting",
            Category::ImportantObject => "ImportantObject",
            Category::Technology => "Technology",
            Category::Event => "Event",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "scene" | "escena" => Ok(Category::Scene),
            "character" | "personaje" => Ok(Category::Character),
            "setting" | "entorno" => Ok(Category::Setting),
            "importantobject" | "objetoimportante" | "object" => Ok(Category::ImportantObject),
            "technology" | "tecnología" | "tecnologia" => Ok(Category::Technology),
            "event" | "evento" => Ok(Category::Event),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Where an item's illustration lives, or the degraded placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    Placeholder,
}

impl ImageRef {
    /// Interpret a raw reference, mapping the sentinel back to `Placeholder`
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.is_empty() || raw == PLACEHOLDER_IMAGE_IDENTIFIER {
            ImageRef::Placeholder
        } else {
            ImageRef::Url(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Url(url) => url,
            ImageRef::Placeholder => PLACEHOLDER_IMAGE_IDENTIFIER,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageRef::Placeholder)
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImageRef::from_raw(raw))
    }
}

/// One scene or entity tracked through illustration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,

    pub title: String,

    pub description: String,

    pub category: Category,

    /// Model-provided visual description, used as the sweep prompt
    pub original_prompt: String,

    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageRef>,

    #[serde(default)]
    pub is_generating: bool,
}

impl WorkItem {
    /// Fresh item waiting for its first illustration
    pub fn pending(
        id: String,
        title: String,
        description: String,
        category: Category,
        original_prompt: String,
    ) -> Self {
        Self {
            id,
            title,
            description,
            category,
            original_prompt,
            tags: vec![category.to_string()],
            image_url: None,
            is_generating: true,
        }
    }

    pub fn apply(&mut self, update: &FieldUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
    }
}

/// User edits to an item, applied directly without going through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FieldUpdate {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(text.into()),
        }
    }
}
