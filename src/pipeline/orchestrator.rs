use crate::analysis::intake;
use crate::config::Config;
use crate::error::{AnalysisError, GenerationIssue, ProviderError};
use crate::item::{Category, FieldUpdate, ImageRef};
use crate::provider::{ImageSynthesizer, TextAnalyzer};
use crate::view::{SortMode, ViewParams};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::prompt::image_prompt;
use super::store::{ItemStore, Rejection, RunId, Snapshot};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub style_suffix: String,
    pub regenerate_min_description_len: usize,
    pub request_delay: Duration,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            style_suffix: config.style_suffix.clone(),
            regenerate_min_description_len: config.regenerate_min_description_len,
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run: RunId,
    pub items: usize,
    pub images: usize,
    pub placeholders: usize,
    pub warnings: usize,
    /// The run was reset or replaced before the sweep finished
    pub discarded: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegenerateOutcome {
    Completed(ImageRef),
    Failed(GenerationIssue),
    NotFound,
    AlreadyGenerating,
    /// Settled after its run was discarded; nothing was applied
    Discarded,
}

impl std::fmt::Display for RegenerateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegenerateOutcome::Completed(_) => write!(f, "completed"),
            RegenerateOutcome::Failed(issue) => write!(f, "failed: {}", issue),
            RegenerateOutcome::NotFound => write!(f, "not found"),
            RegenerateOutcome::AlreadyGenerating => write!(f, "already generating"),
            RegenerateOutcome::Discarded => write!(f, "discarded"),
        }
    }
}

/// Drives analysis and illustration against one shared item store.
///
/// Cheap to clone; clones share the store, so a regeneration can run on one
/// clone while another is in the middle of the sweep.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<ItemStore>,
    analyzer: Arc<dyn TextAnalyzer>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        analyzer: Arc<dyn TextAnalyzer>,
        synthesizer: Arc<dyn ImageSynthesizer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store: Arc::new(ItemStore::new()),
            analyzer,
            synthesizer,
            options,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Analyze `text`, publish the collection, then illustrate every item in
    /// appearance order, one request at a time.
    pub async fn start_run(&self, text: &str) -> Result<RunSummary, AnalysisError> {
        let start = std::time::Instant::now();

        if text.trim().is_empty() {
            let err = AnalysisError::EmptyText;
            self.store.set_error(None, err.to_string());
            return Err(err);
        }

        let run = self.store.begin_run();
        info!("Starting {} ({} bytes of text)", run, text.len());

        let items = match intake(self.analyzer.as_ref(), text, Utc::now().timestamp_millis()).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Analysis failed for {}: {}", run, e);
                self.store.fail_run(run, e.to_string());
                return Err(e);
            }
        };

        let mut summary = RunSummary {
            run,
            items: items.len(),
            images: 0,
            placeholders: 0,
            warnings: 0,
            discarded: false,
            duration: Duration::ZERO,
        };

        if !self.store.publish(run, items.clone()) {
            info!("{} was discarded during analysis", run);
            summary.discarded = true;
            summary.duration = start.elapsed();
            return Ok(summary);
        }

        info!("Illustrating {} items for {}", items.len(), run);

        for (idx, item) in items.iter().enumerate() {
            if !self.store.is_current(run) {
                summary.discarded = true;
                break;
            }

            // Optional spacing between requests to stay under rate limits
            if idx > 0 && self.options.request_delay > Duration::ZERO {
                sleep(self.options.request_delay).await;
                if !self.store.is_current(run) {
                    summary.discarded = true;
                    break;
                }
            }

            debug!(
                "Requesting image {}/{} for '{}'",
                idx + 1,
                items.len(),
                item.title
            );
            let prompt = image_prompt(&item.original_prompt, &self.options.style_suffix);
            let (image, issue) = settle_outcome(&item.title, self.synthesizer.generate(&prompt).await);

            let placeholder = image.is_placeholder();
            if !self.store.settle(run, &item.id, image) {
                debug!("Dropping result for '{}': {} is no longer current", item.id, run);
                summary.discarded = true;
                break;
            }

            if placeholder {
                summary.placeholders += 1;
            } else {
                summary.images += 1;
            }

            if let Some(issue) = issue {
                warn!("{}", issue);
                self.store.record_warning(run, &issue.to_string());
                summary.warnings += 1;
            }
        }

        if summary.discarded {
            info!("{} discarded; sweep stopped", run);
        } else {
            self.store.finish_sweep(run);
        }

        summary.duration = start.elapsed();
        info!(
            "{} finished in {:.1}s: {} images, {} placeholders",
            run,
            summary.duration.as_secs_f64(),
            summary.images,
            summary.placeholders
        );
        Ok(summary)
    }

    /// Re-request the illustration for one item, independent of any sweep
    pub async fn regenerate(&self, id: &str) -> RegenerateOutcome {
        let ticket = match self
            .store
            .begin_regeneration(id, self.options.regenerate_min_description_len)
        {
            Ok(ticket) => ticket,
            Err(Rejection::NotFound) => {
                debug!("Regenerate ignored: no item '{}'", id);
                return RegenerateOutcome::NotFound;
            }
            Err(Rejection::AlreadyGenerating) => {
                debug!("Regenerate ignored: '{}' already has a request in flight", id);
                return RegenerateOutcome::AlreadyGenerating;
            }
        };

        info!("Regenerating '{}'", ticket.title);
        let prompt = image_prompt(&ticket.prompt_source, &self.options.style_suffix);
        let (image, issue) = settle_outcome(&ticket.title, self.synthesizer.generate(&prompt).await);

        if !self.store.settle(ticket.run, &ticket.id, image.clone()) {
            return RegenerateOutcome::Discarded;
        }

        match issue {
            Some(issue) => {
                warn!("{}", issue.regeneration_message());
                self.store
                    .set_error(Some(ticket.run), issue.regeneration_message());
                RegenerateOutcome::Failed(issue)
            }
            None => RegenerateOutcome::Completed(image),
        }
    }

    /// Edit title/description directly; false if no such item
    pub fn update_fields(&self, id: &str, update: &FieldUpdate) -> bool {
        self.store.update_fields(id, update)
    }

    /// Drop the collection, errors and view settings
    #[allow(dead_code)]
    pub fn reset(&self) {
        info!("Resetting collection");
        self.store.reset();
    }

    pub fn set_view(&self, view: ViewParams) {
        self.store.set_view(view);
    }

    #[allow(dead_code)]
    pub fn set_filters(&self, filters: BTreeSet<Category>) {
        self.store.set_filters(filters);
    }

    #[allow(dead_code)]
    pub fn toggle_filter(&self, category: Category) {
        self.store.toggle_filter(category);
    }

    #[allow(dead_code)]
    pub fn set_search(&self, search: impl Into<String>) {
        self.store.set_search(search.into());
    }

    #[allow(dead_code)]
    pub fn set_sort(&self, sort: SortMode) {
        self.store.set_sort(sort);
    }
}

/// Map a synthesizer result to the image to store and the issue to report
fn settle_outcome(
    title: &str,
    result: Result<ImageRef, ProviderError>,
) -> (ImageRef, Option<GenerationIssue>) {
    match result {
        Ok(ImageRef::Placeholder) => (
            ImageRef::Placeholder,
            Some(GenerationIssue::Degraded {
                title: title.to_string(),
            }),
        ),
        Ok(image) => (image, None),
        Err(e) => (
            ImageRef::Placeholder,
            Some(GenerationIssue::UnexpectedFailure {
                title: title.to_string(),
                reason: e.to_string(),
            }),
        ),
    }
}
