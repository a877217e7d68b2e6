//! # Grid Tracks
//!
//! Track sizing and cell placement for [`Grid`](crate::model::Grid)
//! elements:
//! - `Fixed` tracks take exactly their size
//! - `Auto` tracks take the largest single-span child in the track
//! - `Star` tracks share what is left, weighted
//!
//! Cells name their row and column explicitly. Out-of-range placements are
//! clamped into the grid rather than dropped.

use crate::model::{GridCell, TrackSize};

/// Where a cell ended up after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    /// Index into the grid's `cells`.
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
}

/// Resolve track sizes to concrete widths/heights in points.
///
/// 1. Fixed tracks → exact size
/// 2. Auto tracks → `content_sizes[i]`
/// 3. Star tracks → remaining space, proportional to weight
pub fn resolve_tracks(
    template: &[TrackSize],
    available_space: f64,
    gap: f64,
    content_sizes: &[f64],
) -> Vec<f64> {
    if template.is_empty() {
        return vec![];
    }

    let total_gap = gap * (template.len() - 1) as f64;
    let mut remaining = (available_space - total_gap).max(0.0);
    let mut sizes = vec![0.0_f64; template.len()];
    let mut total_weight = 0.0_f64;

    for (i, track) in template.iter().enumerate() {
        match track {
            TrackSize::Fixed(pts) => {
                sizes[i] = pts.max(0.0);
                remaining -= sizes[i];
            }
            TrackSize::Auto => {
                sizes[i] = content_sizes.get(i).copied().unwrap_or(0.0);
                remaining -= sizes[i];
            }
            TrackSize::Star(weight) => total_weight += weight.max(0.0),
        }
    }

    remaining = remaining.max(0.0);
    if total_weight > 0.0 {
        let unit = remaining / total_weight;
        for (i, track) in template.iter().enumerate() {
            if let TrackSize::Star(weight) = track {
                sizes[i] = weight.max(0.0) * unit;
            }
        }
    }

    sizes
}

/// Star tracks sized as Auto. Used for rows when the grid's height comes
/// from its content, so there is no leftover space to share.
pub fn stars_as_auto(template: &[TrackSize]) -> Vec<TrackSize> {
    template
        .iter()
        .map(|t| match t {
            TrackSize::Star(_) => TrackSize::Auto,
            other => *other,
        })
        .collect()
}

/// Column template, defaulting to a single star column.
pub fn column_template(columns: &[TrackSize]) -> Vec<TrackSize> {
    if columns.is_empty() {
        vec![TrackSize::Star(1.0)]
    } else {
        columns.to_vec()
    }
}

/// Most rows a grid gets from cell placement alone. Cells past it are
/// clamped onto the last row.
pub const MAX_IMPLICIT_ROWS: usize = 10_000;

/// Row template, padded with Auto rows so every cell has a row.
pub fn row_template(rows: &[TrackSize], cells: &[GridCell]) -> Vec<TrackSize> {
    let needed = cells
        .iter()
        .map(|c| c.row.saturating_add(c.row_span.max(1)))
        .max()
        .unwrap_or(0)
        .min(rows.len().max(MAX_IMPLICIT_ROWS));
    let mut template = rows.to_vec();
    while template.len() < needed.max(1) {
        template.push(TrackSize::Auto);
    }
    template
}

/// Clamp every cell into a `rows` x `columns` grid.
pub fn place_cells(cells: &[GridCell], rows: usize, columns: usize) -> Vec<CellPlacement> {
    let rows = rows.max(1);
    let columns = columns.max(1);
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let row = cell.row.min(rows - 1);
            let column = cell.column.min(columns - 1);
            CellPlacement {
                index,
                row,
                column,
                row_span: cell.row_span.clamp(1, rows - row),
                column_span: cell.column_span.clamp(1, columns - column),
            }
        })
        .collect()
}

/// Start offset of each track.
pub fn track_offsets(sizes: &[f64], gap: f64) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut pos = 0.0;
    for size in sizes {
        offsets.push(pos);
        pos += size + gap;
    }
    offsets
}

/// Extent of `span` tracks starting at `start`, gaps between them included.
pub fn span_size(sizes: &[f64], start: usize, span: usize, gap: f64) -> f64 {
    let end = (start + span).min(sizes.len());
    let tracks: f64 = sizes[start..end].iter().sum();
    tracks + gap * (end - start).saturating_sub(1) as f64
}

/// Total extent of all tracks plus gaps.
pub fn total_size(sizes: &[f64], gap: f64) -> f64 {
    span_size(sizes, 0, sizes.len(), gap)
}
