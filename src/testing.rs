//! In-process fakes for the external model capabilities

use crate::analysis::{AnalysisResponse, ExtractedEntity, ExtractedScene};
use crate::error::ProviderError;
use crate::item::{Category, ImageRef};
use crate::provider::{ImageSynthesizer, TextAnalyzer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Instant;

pub const SUFFIX: &str = "Cinematic lighting.";

pub fn scene(id: &str, title: &str, summary: &str) -> ExtractedScene {
    ExtractedScene {
        id: Some(id.to_string()),
        title: title.to_string(),
        summary: summary.to_string(),
        visual_description_prompt: format!("{} prompt", title),
        category: Category::Scene,
    }
}

pub fn entity(id: &str, name: &str, category: Category) -> ExtractedEntity {
    ExtractedEntity {
        id: Some(id.to_string()),
        name: name.to_string(),
        category,
        visual_description_prompt: format!("{} prompt", name),
    }
}

/// One scene and two entities
pub fn chapter() -> AnalysisResponse {
    AnalysisResponse {
        scenes: vec![scene("s1", "Ruins", "Kaelen watches the horizon")],
        entities: vec![
            entity("e1", "Kaelen", Category::Character),
            entity("e2", "Nulifier", Category::Technology),
        ],
    }
}

pub struct FixedAnalyzer {
    response: Result<Option<AnalysisResponse>, String>,
    pub calls: AtomicU32,
}

impl FixedAnalyzer {
    pub fn returning(response: AnalysisResponse) -> Self {
        Self {
            response: Ok(Some(response)),
            calls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            response: Ok(None),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            response: Err(stderr.to_string()),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TextAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Option<AnalysisResponse>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(stderr) => Err(ProviderError::NonZeroExit {
                code: 1,
                stderr: stderr.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Image,
    Placeholder,
    Fail,
}

/// Holds the first request whose prompt contains `needle` until released
pub struct Hold {
    needle: &'static str,
    held: AtomicBool,
    pub started: Notify,
    pub release: Notify,
}

/// Image fake driven by prompt substrings; records every prompt it sees
#[derive(Default)]
pub struct ScriptedSynth {
    calls: Mutex<Vec<String>>,
    started_at: Mutex<Vec<Instant>>,
    rules: Vec<(&'static str, Behavior)>,
    hold: Option<Arc<Hold>>,
}

impl ScriptedSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, needle: &'static str, behavior: Behavior) -> Self {
        self.rules.push((needle, behavior));
        self
    }

    pub fn hold(mut self, needle: &'static str) -> (Self, Arc<Hold>) {
        let hold = Arc::new(Hold {
            needle,
            held: AtomicBool::new(false),
            started: Notify::new(),
            release: Notify::new(),
        });
        self.hold = Some(hold.clone());
        (self, hold)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// When each request arrived, on tokio's clock
    pub fn started_at(&self) -> Vec<Instant> {
        self.started_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSynthesizer for ScriptedSynth {
    async fn generate(&self, prompt: &str) -> Result<ImageRef, ProviderError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(prompt.to_string());
            self.started_at.lock().unwrap().push(Instant::now());
            calls.len()
        };

        if let Some(hold) = &self.hold {
            if prompt.contains(hold.needle) && !hold.held.swap(true, Ordering::SeqCst) {
                hold.started.notify_one();
                hold.release.notified().await;
            }
        }

        let behavior = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, b)| *b)
            .unwrap_or(Behavior::Image);

        match behavior {
            Behavior::Image => Ok(ImageRef::Url(format!("data:image/png;base64,{}", n))),
            Behavior::Placeholder => Ok(ImageRef::Placeholder),
            Behavior::Fail => Err(ProviderError::Output("model overloaded".to_string())),
        }
    }
}
