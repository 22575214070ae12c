//! Shared item collection, versioned by run.
//!
//! All state lives in a `watch` channel: every mutation goes through
//! `send_if_modified`, so subscribers see each change and the store needs no
//! lock of its own. Writes tagged with a `RunId` are dropped once that run has
//! been superseded by `reset` or a newer run.

use crate::item::{Category, FieldUpdate, ImageRef, WorkItem};
use crate::view::{project, SortMode, ViewParams};
use serde::Serialize;
use std::collections::BTreeSet;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RunId(u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Analyzing,
    Illustrating,
    Complete,
    Failed,
}

/// Everything a consumer needs to render the current state
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub run: RunId,
    pub phase: Phase,
    pub items: Vec<WorkItem>,
    pub error: Option<String>,
    pub view: ViewParams,
}

impl Snapshot {
    /// The filtered, searched and sorted items
    pub fn visible(&self) -> Vec<&WorkItem> {
        project(&self.items, &self.view)
    }

    /// Items that already have an image or placeholder, in appearance order
    pub fn illustrated(&self) -> Vec<&WorkItem> {
        self.items.iter().filter(|i| i.image_url.is_some()).collect()
    }

    pub fn item(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// What `begin_regeneration` hands back for dispatch
#[derive(Debug, Clone)]
pub struct RegenerationTicket {
    pub run: RunId,
    pub id: String,
    pub title: String,
    pub prompt_source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotFound,
    AlreadyGenerating,
}

pub struct ItemStore {
    tx: watch::Sender<Snapshot>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn is_current(&self, run: RunId) -> bool {
        self.tx.borrow().run == run
    }

    /// Start a new run: drop the previous collection and error
    pub fn begin_run(&self) -> RunId {
        let mut run = RunId::default();
        self.tx.send_modify(|s| {
            s.run = RunId(s.run.0 + 1);
            s.items.clear();
            s.error = None;
            s.phase = Phase::Analyzing;
            run = s.run;
        });
        run
    }

    /// Replace the collection in one step
    pub fn publish(&self, run: RunId, items: Vec<WorkItem>) -> bool {
        self.tx.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            s.items = items;
            s.phase = Phase::Illustrating;
            true
        })
    }

    pub fn fail_run(&self, run: RunId, message: String) -> bool {
        self.tx.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            s.items.clear();
            s.phase = Phase::Failed;
            s.error = Some(message);
            true
        })
    }

    pub fn finish_sweep(&self, run: RunId) -> bool {
        self.tx.send_if_modified(|s| {
            if s.run != run || s.phase != Phase::Illustrating {
                return false;
            }
            s.phase = Phase::Complete;
            true
        })
    }

    /// Apply a settled image request to its own item
    pub fn settle(&self, run: RunId, id: &str, image: ImageRef) -> bool {
        self.tx.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            match s.items.iter_mut().find(|i| i.id == id) {
                Some(item) => {
                    item.image_url = Some(image);
                    item.is_generating = false;
                    true
                }
                None => false,
            }
        })
    }

    /// Append to the error message, keeping earlier warnings
    pub fn record_warning(&self, run: RunId, message: &str) -> bool {
        self.tx.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            s.error = Some(match s.error.take() {
                Some(prev) if !prev.is_empty() => format!("{}; {}", prev, message),
                _ => message.to_string(),
            });
            true
        })
    }

    /// Replace the error message outright
    pub fn set_error(&self, run: Option<RunId>, message: String) -> bool {
        self.tx.send_if_modified(|s| {
            if run.is_some_and(|r| r != s.run) {
                return false;
            }
            s.error = Some(message);
            true
        })
    }

    /// Mark an item as generating and clear its image, unless a request is
    /// already outstanding for it.
    ///
    /// The prompt source is the description once it is longer than
    /// `min_description_len` characters, otherwise the original prompt.
    pub fn begin_regeneration(
        &self,
        id: &str,
        min_description_len: usize,
    ) -> Result<RegenerationTicket, Rejection> {
        let mut outcome = Err(Rejection::NotFound);
        self.tx.send_if_modified(|s| {
            let run = s.run;
            let Some(item) = s.items.iter_mut().find(|i| i.id == id) else {
                return false;
            };
            if item.is_generating {
                outcome = Err(Rejection::AlreadyGenerating);
                return false;
            }

            item.is_generating = true;
            item.image_url = None;

            let prompt_source = if item.description.chars().count() > min_description_len {
                item.description.clone()
            } else {
                item.original_prompt.clone()
            };
            outcome = Ok(RegenerationTicket {
                run,
                id: item.id.clone(),
                title: item.title.clone(),
                prompt_source,
            });

            s.error = None;
            true
        });
        outcome
    }

    pub fn update_fields(&self, id: &str, update: &FieldUpdate) -> bool {
        self.tx.send_if_modified(|s| match s.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.apply(update);
                true
            }
            None => false,
        })
    }

    /// Clear the collection, error and view; in-flight results for the old run
    /// are ignored when they arrive
    #[allow(dead_code)]
    pub fn reset(&self) {
        self.tx.send_modify(|s| {
            s.run = RunId(s.run.0 + 1);
            s.items.clear();
            s.error = None;
            s.view = ViewParams::default();
            s.phase = Phase::Idle;
        });
    }

    pub fn set_view(&self, view: ViewParams) {
        self.tx.send_if_modified(|s| {
            if s.view == view {
                return false;
            }
            s.view = view;
            true
        });
    }

    #[allow(dead_code)]
    pub fn set_filters(&self, filters: BTreeSet<Category>) {
        self.tx.send_modify(|s| s.view.filters = filters);
    }

    /// Add or remove one category from the filter set
    #[allow(dead_code)]
    pub fn toggle_filter(&self, category: Category) {
        self.tx.send_modify(|s| {
            if !s.view.filters.remove(&category) {
                s.view.filters.insert(category);
            }
        });
    }

    #[allow(dead_code)]
    pub fn set_search(&self, search: String) {
        self.tx.send_modify(|s| s.view.search = search);
    }

    #[allow(dead_code)]
    pub fn set_sort(&self, sort: SortMode) {
        self.tx.send_modify(|s| s.view.sort = sort);
    }
}
