//! Notebook image extraction.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NotebookError;
use crate::describe::ChartDescription;
use crate::detail::DescriptionSection;

static AXES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"with ([0-9]+) Axes?").unwrap_or_else(|_| unreachable!()));

/// Markdown cells this far back are searched for a title.
const TITLE_LOOKBACK: usize = 3;

/// Region bar charts dropped from the start of the notebook.
const REGION_BARS_DROPPED: usize = 2;

/// A chart extracted from the notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Base64 PNG payload.
    pub image_base64: String,
    /// First line of the figure's plain-text repr, or `"Gráfico N"` when
    /// the output has none.
    pub title: String,
    /// First line of the figure's plain-text repr
    /// (e.g. `<Figure size 1000x600 with 2 Axes>`).
    pub figure_label: Option<String>,
    /// Nearby markdown heading, used for the caption of unclassified charts.
    pub section_title: Option<String>,
    /// Caption describing what the chart shows.
    pub description: String,
    /// Caption followed by interpretation, impact and implication notes.
    pub detailed_description: Vec<DescriptionSection>,
    /// Classification the caption was derived from.
    pub chart: ChartDescription,
    /// Number of axes in the figure.
    pub axes: u32,
    /// Index of the code cell in the notebook.
    pub cell_index: usize,
    /// Index of the output within the cell.
    pub output_index: usize,
}

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: Value,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Output {
    output_type: String,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

/// Joins notebook multiline text, which is either a string or a list of
/// strings.
fn joined(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

/// First line of notebook multiline text.
fn first_line(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => s.lines().next().map(str::to_string),
        Value::Array(lines) => lines.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn clean_markdown(text: &str) -> String {
    text.trim()
        .replace("**", "")
        .replace("##", "")
        .replace('#', "")
        .trim()
        .to_string()
}

/// Title from the first markdown cell, among the few before `index`, whose
/// cleaned text is between 10 and 100 characters (exclusive).
fn markdown_title(cells: &[Cell], index: usize) -> Option<String> {
    cells[index.saturating_sub(TITLE_LOOKBACK)..index]
        .iter()
        .filter(|c| c.cell_type == "markdown")
        .map(|c| clean_markdown(&joined(&c.source)))
        .find(|t| (11..100).contains(&t.chars().count()))
}

fn payload_digest(payload: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(payload.as_bytes());
    format!("{:x}", context.finalize())
}

fn axes_count(label: Option<&str>) -> u32 {
    label
        .and_then(|l| AXES_RE.captures(l))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Extracts the gallery from notebook JSON.
///
/// # Errors
///
/// Returns [`NotebookError::Json`] if `json` is not a notebook.
pub fn gallery_from_str(json: &str) -> Result<Vec<GalleryImage>, NotebookError> {
    let notebook: Notebook = serde_json::from_str(json)?;
    let cells = &notebook.cells;

    let mut seen = HashSet::new();
    let mut region_bars = 0;
    let mut images = Vec::new();

    for (cell_index, cell) in cells.iter().enumerate() {
        if cell.cell_type != "code" {
            continue;
        }

        let code = joined(&cell.source).to_lowercase();
        let section_title = markdown_title(cells, cell_index);

        for (output_index, output) in cell.outputs.iter().enumerate() {
            if output.output_type != "display_data" {
                continue;
            }
            let Some(png) = output.data.get("image/png") else {
                continue;
            };
            let image_base64 = joined(png);
            if !seen.insert(payload_digest(&image_base64)) {
                log::debug!("Skipping duplicate image in cell {cell_index}");
                continue;
            }

            let figure_label = output.data.get("text/plain").and_then(first_line);
            let axes = axes_count(figure_label.as_deref());
            let chart = ChartDescription::classify(&code, axes);

            let mut excluded = chart.duplicates_dashboard(axes);
            if chart.is_region_bar() {
                region_bars += 1;
                excluded |= region_bars <= REGION_BARS_DROPPED;
            }
            if excluded {
                log::debug!(
                    "Excluding {} chart in cell {cell_index} ({axes} axes)",
                    chart.kind
                );
                continue;
            }

            let description = chart.caption(section_title.as_deref());
            images.push(GalleryImage {
                title: figure_label
                    .clone()
                    .filter(|label| !label.trim().is_empty())
                    .unwrap_or_else(|| format!("Gráfico {}", images.len() + 1)),
                detailed_description: chart.detailed_description(&code, &description),
                description,
                image_base64,
                figure_label,
                section_title: section_title.clone(),
                chart,
                axes,
                cell_index,
                output_index,
            });
        }
    }

    Ok(images)
}

/// Reads the notebook at `path` and extracts its gallery.
///
/// # Errors
///
/// Returns [`NotebookError`] if the file cannot be read or parsed.
pub fn try_extract_gallery(path: &Path) -> Result<Vec<GalleryImage>, NotebookError> {
    let json = std::fs::read_to_string(path)?;
    let images = gallery_from_str(&json)?;
    log::info!("Extracted {} gallery images from {}", images.len(), path.display());
    Ok(images)
}

/// Like [`try_extract_gallery`], but a missing or malformed notebook yields
/// an empty gallery.
#[must_use]
pub fn extract_gallery(path: &Path) -> Vec<GalleryImage> {
    try_extract_gallery(path).unwrap_or_else(|e| {
        log::warn!("Notebook gallery unavailable ({}): {e}", path.display());
        Vec::new()
    })
}
