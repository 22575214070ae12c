use crate::cli::RunArgs;
use crate::config::Config;
use crate::item::{Category, FieldUpdate, WorkItem};
use crate::output::write_gallery;
use crate::pipeline::{Phase, Pipeline, PipelineOptions, RegenerateOutcome, Snapshot};
use crate::provider::{create_analyzer, create_synthesizer};
use crate::view::ViewParams;
use anyhow::Context;
use chrono::Local;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(delay) = args.request_delay_ms {
        config.request_delay_ms = delay;
    }
    config.validate()?;

    let text = read_input(args.input.as_deref())?;

    let pipeline = Pipeline::new(
        create_analyzer(&config),
        create_synthesizer(&config),
        PipelineOptions::from_config(&config),
    );

    let progress = spawn_progress(pipeline.subscribe());
    let summary = match pipeline.start_run(&text).await {
        Ok(summary) => summary,
        Err(e) => {
            progress.abort();
            return Err(e.into());
        }
    };

    // The watcher stops on its own once it sees the finished sweep
    if summary.discarded {
        progress.abort();
    } else if let Err(e) = progress.await {
        warn!("Progress watcher stopped: {}", e);
    }

    info!(
        "{} finished in {:.1}s: {} images, {} placeholders, {} warnings across {} items",
        summary.run,
        summary.duration.as_secs_f64(),
        summary.images,
        summary.placeholders,
        summary.warnings,
        summary.items
    );

    for (id, description) in &args.describe {
        if !pipeline.update_fields(id, &FieldUpdate::description(description.as_str())) {
            warn!("No item with id '{}' to describe", id);
        }
    }

    for id in &args.regenerate {
        let title = pipeline
            .snapshot()
            .item(id)
            .map(|item| item.title.clone())
            .unwrap_or_else(|| id.clone());
        match pipeline.regenerate(id).await {
            RegenerateOutcome::Failed(issue) => {
                println!("Regenerated {} ({}): {}", title, id, issue.regeneration_message())
            }
            outcome => println!("Regenerated {} ({}): {}", title, id, outcome),
        }
    }

    pipeline.set_view(ViewParams {
        filters: args.filter.iter().copied().collect(),
        search: args.search.clone().unwrap_or_default(),
        sort: args.sort,
    });

    let snapshot = pipeline.snapshot();
    print_gallery(&snapshot);

    if !args.no_export {
        let out_dir = args.out.clone().unwrap_or_else(|| default_out_dir(&config));
        write_gallery(&out_dir, &snapshot)?;
        println!("\nGallery written to {}", out_dir.display());
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chapter text from {:?}", path)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read chapter text from stdin")?;
            Ok(text)
        }
    }
}

fn default_out_dir(config: &Config) -> PathBuf {
    let stamp = Local::now().format("%Y-%m-%d_%H%M%S").to_string();
    config.report_dir.join(stamp)
}

/// Print each item once its illustration settles
fn spawn_progress(mut rx: watch::Receiver<Snapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut printed: HashSet<String> = HashSet::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let total = snapshot.items.len();
            for item in &snapshot.items {
                if item.is_generating {
                    printed.remove(&item.id);
                    continue;
                }
                if item.image_url.is_none() || !printed.insert(item.id.clone()) {
                    continue;
                }
                println!(
                    "[{}/{}] {} {} ({})",
                    snapshot.illustrated().len(),
                    total,
                    status_mark(item),
                    item.title,
                    item.category
                );
            }
            if matches!(snapshot.phase, Phase::Complete | Phase::Failed) {
                break;
            }
        }
    })
}

fn status_mark(item: &WorkItem) -> &'static str {
    match &item.image_url {
        Some(image) if image.is_placeholder() => "placeholder",
        Some(_) => "ok",
        None => "pending",
    }
}

fn print_gallery(snapshot: &Snapshot) {
    let visible = snapshot.visible();
    println!(
        "\n=== Gallery ({} of {} shown) ===\n",
        visible.len(),
        snapshot.items.len()
    );

    let counts: Vec<String> = Category::ALL
        .iter()
        .filter_map(|category| {
            let n = snapshot
                .items
                .iter()
                .filter(|item| item.category == *category)
                .count();
            (n > 0).then(|| format!("{}: {}", category, n))
        })
        .collect();
    if !counts.is_empty() {
        println!("{}\n", counts.join(", "));
    }

    for item in visible {
        println!(
            "  [{}] {} ({}) - {}",
            item.category,
            item.title,
            item.id,
            status_mark(item)
        );
    }

    if let Some(ref message) = snapshot.error {
        println!("\nWarnings: {}", message);
    }
}
