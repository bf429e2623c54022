//! Table detection from positioned text runs.
//!
//! Walks each page's content stream, tracks the text position through the
//! text-showing operators, groups runs into rows by baseline and rows into
//! regions of consecutive multi-cell lines. Columns are anchored on the
//! x positions of the region's first row.

use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{Result, TableProvider, TableRegion};
use crate::error::TableError;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments (thousandths of an em) at or beyond this read as a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A string shown at a position on the page.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f32,
    y: f32,
    width: f32,
    size: f32,
    text: String,
}

#[derive(Debug, Clone)]
struct Cell {
    x: f32,
    end: f32,
    text: String,
}

#[derive(Debug, Clone)]
struct Row {
    y: f32,
    size: f32,
    cells: Vec<Cell>,
}

/// Table detector over page content streams.
#[derive(Debug, Clone)]
pub struct LayoutTableDetector {
    row_tolerance: f32,
    min_rows: usize,
    min_cols: usize,
}

impl LayoutTableDetector {
    /// Create a detector with default tolerances.
    pub fn new() -> Self {
        Self {
            row_tolerance: 3.0,
            min_rows: 2,
            min_cols: 2,
        }
    }

    /// Set the vertical distance within which runs share a row.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance.max(0.0);
        self
    }

    /// Set the minimum number of rows (header included) per region.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows.max(1);
        self
    }

    /// Set the minimum number of cells a line needs to belong to a region.
    pub fn with_min_cols(mut self, min_cols: usize) -> Self {
        self.min_cols = min_cols.max(2);
        self
    }

    fn regions_from_runs(&self, page: u32, runs: Vec<TextRun>) -> Vec<TableRegion> {
        let rows = self.group_rows(runs);
        let mut regions = Vec::new();
        let mut block: Vec<Row> = Vec::new();

        for row in rows {
            let breaks_block = row.cells.len() < self.min_cols
                || block
                    .last()
                    .is_some_and(|prev| prev.y - row.y > prev.size.max(row.size) * 3.0);

            if breaks_block {
                self.flush_block(page, &mut block, &mut regions);
            }
            if row.cells.len() >= self.min_cols {
                block.push(row);
            }
        }
        self.flush_block(page, &mut block, &mut regions);

        regions
    }

    fn flush_block(&self, page: u32, block: &mut Vec<Row>, regions: &mut Vec<TableRegion>) {
        let rows = std::mem::take(block);
        if rows.len() < self.min_rows {
            return;
        }

        let anchors: Vec<f32> = rows[0].cells.iter().map(|c| c.x).collect();
        let grid: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                let mut cells = vec![String::new(); anchors.len()];
                for cell in &row.cells {
                    let col = nearest_anchor(&anchors, cell.x);
                    if !cells[col].is_empty() {
                        cells[col].push(' ');
                    }
                    cells[col].push_str(&cell.text);
                }
                cells
            })
            .collect();

        trace!("Table region on page {}: {} rows x {} cols", page, grid.len(), anchors.len());
        regions.push(TableRegion { page, rows: grid });
    }

    /// Group runs into rows (top to bottom), merging adjacent runs into cells.
    fn group_rows(&self, mut runs: Vec<TextRun>) -> Vec<Row> {
        runs.retain(|r| !r.text.trim().is_empty());
        runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<Vec<TextRun>> = Vec::new();
        for run in runs {
            match rows.last_mut() {
                Some(row) if (row[0].y - run.y).abs() <= self.row_tolerance => row.push(run),
                _ => rows.push(vec![run]),
            }
        }

        rows.into_iter()
            .map(|mut runs| {
                runs.sort_by(|a, b| a.x.total_cmp(&b.x));
                let y = runs[0].y;
                let size = runs.iter().map(|r| r.size).fold(0.0_f32, f32::max);

                let mut cells: Vec<Cell> = Vec::new();
                for run in runs {
                    let text = run.text.trim();
                    match cells.last_mut() {
                        // Runs closer than about one glyph belong to the same cell.
                        Some(cell) if run.x - cell.end < run.size * 0.9 => {
                            if run.x - cell.end > run.size * 0.1 && !cell.text.ends_with(' ') {
                                cell.text.push(' ');
                            }
                            cell.text.push_str(text);
                            cell.end = cell.end.max(run.x + run.width);
                        }
                        _ => cells.push(Cell {
                            x: run.x,
                            end: run.x + run.width,
                            text: text.to_string(),
                        }),
                    }
                }

                Row { y, size, cells }
            })
            .collect()
    }
}

impl Default for LayoutTableDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TableProvider for LayoutTableDetector {
    fn detect(&self, data: &[u8]) -> Result<Vec<TableRegion>> {
        let mut doc = Document::load_mem(data).map_err(|e| TableError::Load(e.to_string()))?;
        if doc.is_encrypted() && doc.decrypt("").is_err() {
            return Err(TableError::Load("document is encrypted".to_string()));
        }

        let mut regions = Vec::new();
        for (page_num, page_id) in doc.get_pages() {
            let runs = doc
                .get_page_content(page_id)
                .map_err(|e| TableError::Content {
                    page: page_num,
                    reason: e.to_string(),
                })
                .and_then(|content| text_runs(page_num, &content));

            match runs {
                Ok(runs) => regions.extend(self.regions_from_runs(page_num, runs)),
                Err(e) => warn!("Skipping page {} for table detection: {}", page_num, e),
            }
        }

        debug!("Layout detector found {} table regions", regions.len());
        Ok(regions)
    }
}

fn nearest_anchor(anchors: &[f32], x: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - x).abs().total_cmp(&(*b - x).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Text position state while walking a content stream.
struct TextState {
    line: (f32, f32),
    cursor: (f32, f32),
    scale: (f32, f32),
    font_size: f32,
    leading: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            line: (0.0, 0.0),
            cursor: (0.0, 0.0),
            scale: (1.0, 1.0),
            font_size: 10.0,
            leading: 0.0,
        }
    }

    fn begin_text(&mut self) {
        self.line = (0.0, 0.0);
        self.cursor = (0.0, 0.0);
        self.scale = (1.0, 1.0);
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = (self.line.0 + tx * self.scale.0, self.line.1 + ty * self.scale.1);
        self.cursor = self.line;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn effective_size(&self) -> f32 {
        (self.font_size * self.scale.1.abs()).max(1.0)
    }

    fn show(&mut self, text: String, runs: &mut Vec<TextRun>) {
        let size = self.effective_size();
        let width = text.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
        runs.push(TextRun {
            x: self.cursor.0,
            y: self.cursor.1,
            width,
            size,
            text,
        });
        self.cursor.0 += width;
    }
}

/// Collect the text runs of one page content stream.
fn text_runs(page: u32, content: &[u8]) -> Result<Vec<TextRun>> {
    let content = Content::decode(content).map_err(|e| TableError::Content {
        page,
        reason: e.to_string(),
    })?;

    let mut state = TextState::new();
    let mut runs = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => state.begin_text(),
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                let m: Vec<f32> = operands.iter().filter_map(number).collect();
                if m.len() == 6 {
                    state.scale = (m[0], m[3]);
                    state.line = (m[4], m[5]);
                    state.cursor = state.line;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(decode_string) {
                    state.show(text, &mut runs);
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = operands.first().and_then(decode_string) {
                    state.show(text, &mut runs);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(text) = operands.get(2).and_then(decode_string) {
                    state.show(text, &mut runs);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = String::new();
                    for item in items {
                        if let Some(part) = decode_string(item) {
                            text.push_str(&part);
                        } else if let Some(adjust) = number(item) {
                            if -adjust >= TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                                text.push(' ');
                            }
                        }
                    }
                    state.show(text, &mut runs);
                }
            }
            _ => {}
        }
    }

    trace!("Page {}: {} text runs", page, runs.len());
    Ok(runs)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Decode a PDF string operand: UTF-16BE with BOM, otherwise one byte per
/// character.
fn decode_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}
