// src/table/extract.rs

use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::normalize::normalize_text;

use super::TableCandidate;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector"));

// the limits browsers apply to span attributes
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// A parsed HTML page. Read-only; the pipeline only ever asks it for tables.
pub struct RawDocument {
    html: Html,
}

impl RawDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Every `<table>` in document order, flattened to a [`TableCandidate`].
    /// Nested tables show up as their own candidates.
    pub fn candidates(&self) -> Vec<TableCandidate> {
        let out: Vec<TableCandidate> = self.html.select(&TABLE).map(flatten_table).collect();
        debug!(tables = out.len(), "extracted candidate tables");
        out
    }
}

struct RawRow {
    in_head: bool,
    all_th: bool,
    cells: Vec<String>,
}

fn flatten_table(table: ElementRef<'_>) -> TableCandidate {
    let mut carry = RowSpans::default();
    let rows: Vec<RawRow> = table
        .select(&ROW)
        .filter(|tr| owning_table(*tr).map(|t| t.id()) == Some(table.id()))
        .filter_map(|tr| read_row(tr, &mut carry))
        .collect();

    let head_len = if rows.iter().any(|r| r.in_head) {
        rows.iter().take_while(|r| r.in_head).count()
    } else {
        rows.iter().take_while(|r| r.all_th).count()
    };
    let (head, body) = rows.split_at(head_len);

    let width = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let headers = header_names(head, width);
    let body = body.iter().map(|r| r.cells.clone()).collect();

    let candidate = TableCandidate::new(headers, body);
    trace!(headers = ?candidate.headers, rows = candidate.row_count(), "flattened table");
    candidate
}

fn owning_table(tr: ElementRef<'_>) -> Option<ElementRef<'_>> {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

/// Cells still owed to later rows by a `rowspan`, indexed by column.
#[derive(Default)]
struct RowSpans {
    in_head: bool,
    pending: Vec<Option<(String, usize)>>,
}

impl RowSpans {
    /// Take the carried text for `col`, if a cell above still spans into it.
    fn take(&mut self, col: usize) -> Option<String> {
        let slot = self.pending.get_mut(col)?;
        let (text, left) = slot.as_mut()?;
        let text = text.clone();
        *left -= 1;
        if *left == 0 {
            *slot = None;
        }
        Some(text)
    }

    fn owes_from(&self, col: usize) -> bool {
        self.pending.iter().skip(col).any(Option::is_some)
    }

    fn hold(&mut self, col: usize, text: &str, rows: usize) {
        if self.pending.len() <= col {
            self.pending.resize(col + 1, None);
        }
        self.pending[col] = Some((text.to_string(), rows));
    }
}

fn span_attr(cell: &ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}

/// Cells of one `<tr>`. `colspan` cells are repeated across their columns
/// and `rowspan` cells are carried into the rows below. `None` for rows
/// without cells of their own.
fn read_row(tr: ElementRef<'_>, carry: &mut RowSpans) -> Option<RawRow> {
    let in_head = tr
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|e| e.value().name() != "table")
        .any(|e| e.value().name() == "thead");
    // row spans stop at the thead / tbody boundary
    if in_head != carry.in_head {
        *carry = RowSpans {
            in_head,
            pending: Vec::new(),
        };
    }

    let mut cells = Vec::new();
    let mut own = 0usize;
    let mut all_th = true;
    for cell in tr.children().filter_map(ElementRef::wrap) {
        let name = cell.value().name();
        if name != "td" && name != "th" {
            continue;
        }
        while let Some(text) = carry.take(cells.len()) {
            cells.push(text);
        }
        own += 1;
        all_th &= name == "th";
        let colspan = span_attr(&cell, "colspan", MAX_COLSPAN);
        let rowspan = span_attr(&cell, "rowspan", MAX_ROWSPAN);
        let text = normalize_text(&cell.text().collect::<String>());
        for _ in 0..colspan {
            if rowspan > 1 {
                carry.hold(cells.len(), &text, rowspan - 1);
            }
            cells.push(text.clone());
        }
    }
    while carry.owes_from(cells.len()) {
        let text = carry.take(cells.len()).unwrap_or_default();
        cells.push(text);
    }

    if own == 0 {
        return None;
    }
    Some(RawRow {
        in_head,
        all_th,
        cells,
    })
}

/// Flatten the header rows into one unique name per column.
fn header_names(head: &[RawRow], width: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(width);
    for idx in 0..width {
        if head.is_empty() {
            names.push(idx.to_string());
            continue;
        }
        let mut parts: Vec<&str> = Vec::new();
        for row in head {
            if let Some(part) = row.cells.get(idx).map(String::as_str) {
                if !part.is_empty() && parts.last() != Some(&part) {
                    parts.push(part);
                }
            }
        }
        if parts.is_empty() {
            names.push(format!("Unnamed: {}", idx));
        } else {
            names.push(parts.join(" "));
        }
    }
    dedupe(names)
}

/// Suffix repeated names with `.1`, `.2`, ... skipping suffixed names that
/// are already taken, so `[A, A, A.1]` becomes `[A, A.1, A.1.1]`.
fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|mut name| {
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{}.{}", name, seen);
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), seen + 1);
            name
        })
        .collect()
}
