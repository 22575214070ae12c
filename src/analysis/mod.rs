//! Analysis intake: one text-analysis call, normalized into work items
//!
//! Scenes and entities arrive as two differently shaped lists. They are put in
//! appearance order (scenes, then entities) and flattened into `WorkItem`s that
//! are all waiting for their first illustration.

mod parser;
mod types;

pub use parser::{build_analysis_prompt, parse_analysis};
pub use types::{AnalysisResponse, Extracted};
#[cfg(test)]
pub use types::{ExtractedEntity, ExtractedScene};

use crate::error::AnalysisError;
use crate::item::{Category, WorkItem};
use crate::provider::TextAnalyzer;
use std::collections::HashMap;
use tracing::{info, warn};

/// Analyze `text` once and build the full item collection for a run
pub async fn intake(
    analyzer: &dyn TextAnalyzer,
    text: &str,
    run_stamp: i64,
) -> Result<Vec<WorkItem>, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyText);
    }

    let response = analyzer
        .analyze(text)
        .await?
        .ok_or(AnalysisError::NoPayload)?;

    if response.is_empty() {
        return Err(AnalysisError::NoItems);
    }

    info!(
        "Analysis found {} scenes and {} entities",
        response.scenes.len(),
        response.entities.len()
    );

    Ok(normalize(response, run_stamp))
}

/// Flatten an analysis response into pending work items.
///
/// Items without an id get `item-{run_stamp}-{index}`. A later item reusing an
/// earlier id replaces that record in place.
pub fn normalize(response: AnalysisResponse, run_stamp: i64) -> Vec<WorkItem> {
    let mut items: Vec<WorkItem> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, extracted) in response.into_appearance_order().into_iter().enumerate() {
        let item = to_work_item(extracted, run_stamp, index);

        match positions.get(&item.id) {
            Some(&pos) => {
                warn!(
                    "Duplicate item id '{}' in analysis; replacing earlier '{}'",
                    item.id, items[pos].title
                );
                items[pos] = item;
            }
            None => {
                positions.insert(item.id.clone(), items.len());
                items.push(item);
            }
        }
    }

    items
}

fn to_work_item(extracted: Extracted, run_stamp: i64, index: usize) -> WorkItem {
    let (source_id, title, description, category, prompt) = match extracted {
        Extracted::Scene(scene) => {
            let description = if scene.summary.trim().is_empty() {
                format!("Visual for {}", scene.title)
            } else {
                scene.summary
            };
            (
                scene.id,
                scene.title,
                description,
                Category::Scene,
                scene.visual_description_prompt,
            )
        }
        Extracted::Entity(entity) => (
            entity.id,
            entity.name.clone(),
            format!("Visual for {}", entity.name),
            entity.category,
            entity.visual_description_prompt,
        ),
    };

    let id = source_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("item-{}-{}", run_stamp, index));

    WorkItem::pending(id, title, description, category, prompt)
}
