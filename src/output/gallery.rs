use crate::error::OutputError;
use crate::item::{ImageRef, WorkItem};
use crate::pipeline::{Phase, RunId, Snapshot};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct GalleryExport<'a> {
    timestamp: String,
    run: RunId,
    phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    items: &'a [WorkItem],
}

/// Write `gallery.json` and `gallery.md` for the snapshot's items
pub fn write_gallery(out_dir: &Path, snapshot: &Snapshot) -> Result<(), OutputError> {
    fs::create_dir_all(out_dir).map_err(OutputError::CreateDir)?;

    let export = GalleryExport {
        timestamp: Utc::now().to_rfc3339(),
        run: snapshot.run,
        phase: snapshot.phase,
        error: snapshot.error.as_deref(),
        items: &snapshot.items,
    };

    let json = serde_json::to_string_pretty(&export)?;
    fs::write(out_dir.join("gallery.json"), json).map_err(OutputError::Write)?;

    let md = build_gallery_markdown(&export);
    fs::write(out_dir.join("gallery.md"), md).map_err(OutputError::Write)?;

    Ok(())
}

fn status(item: &WorkItem) -> &'static str {
    match &item.image_url {
        Some(ImageRef::Url(_)) => "illustrated",
        Some(ImageRef::Placeholder) => "placeholder",
        None if item.is_generating => "generating",
        None => "pending",
    }
}

fn build_gallery_markdown(export: &GalleryExport<'_>) -> String {
    let mut md = String::new();

    md.push_str("# Chapter Gallery\n\n");
    md.push_str(&format!("**Generated:** {}\n", export.timestamp));

    let illustrated = export
        .items
        .iter()
        .filter(|i| matches!(i.image_url, Some(ImageRef::Url(_))))
        .count();
    md.push_str(&format!(
        "**Illustrated:** {} of {}\n\n",
        illustrated,
        export.items.len()
    ));

    if let Some(error) = export.error {
        md.push_str(&format!("> **Warnings:** {}\n\n", error));
    }

    md.push_str("| # | Title | Category | Status |\n");
    md.push_str("|---|-------|----------|--------|\n");
    for (idx, item) in export.items.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            idx + 1,
            item.title.replace('|', "\\|"),
            item.category,
            status(item)
        ));
    }
    md.push('\n');

    for item in export.items {
        md.push_str(&format!("## {}\n\n", item.title));
        md.push_str(&format!("*{}*\n\n", item.category));
        if let Some(ImageRef::Url(url)) = &item.image_url {
            md.push_str(&format!("![{}]({})\n\n", item.title, url));
        }
        md.push_str(&format!("{}\n\n", item.description));
    }

    md
}
