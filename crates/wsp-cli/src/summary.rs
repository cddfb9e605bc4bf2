//! Outline of a thawed policy, printed as a table or as JSON.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use wsp_core::{Assertion, UnknownAssertion};

/// One assertion in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub depth: usize,
    pub assertion: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    pub source: String,
    pub assertions: usize,
    pub disabled: usize,
    /// Elements no mapping could read, kept as placeholders.
    pub quarantined: usize,
    pub outline: Vec<OutlineEntry>,
}

impl PolicySummary {
    /// Walks `policy` depth first. `None` yields an empty outline.
    pub fn from_policy(source: impl Into<String>, policy: Option<&dyn Assertion>) -> Self {
        let mut summary = Self {
            source: source.into(),
            assertions: 0,
            disabled: 0,
            quarantined: 0,
            outline: Vec::new(),
        };
        if let Some(policy) = policy {
            summary.visit(policy, 0, true);
        }
        summary
    }

    fn visit(&mut self, assertion: &dyn Assertion, depth: usize, parent_enabled: bool) {
        let enabled = parent_enabled && assertion.is_enabled();
        self.assertions += 1;
        if !enabled {
            self.disabled += 1;
        }
        let quarantined = assertion.as_any().downcast_ref::<UnknownAssertion>();
        let detail = match (quarantined, assertion.children()) {
            (Some(unknown), _) => {
                self.quarantined += 1;
                Some(format!(
                    "unrecognized {}",
                    unknown.element_name.as_deref().unwrap_or("element")
                ))
            }
            (None, Some(children)) => Some(match children.len() {
                1 => "1 child".to_string(),
                count => format!("{count} children"),
            }),
            (None, None) => None,
        };
        self.outline.push(OutlineEntry {
            depth,
            assertion: assertion.type_ref().name().to_string(),
            enabled,
            detail,
        });
        for child in assertion.children().unwrap_or_default() {
            self.visit(child.as_ref(), depth + 1, enabled);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn print_summary(summary: &PolicySummary) {
    println!("Policy: {}", summary.source);
    if summary.outline.is_empty() {
        println!("(empty policy)");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Assertion"),
        header_cell("Enabled"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for entry in &summary.outline {
        table.add_row(vec![
            assertion_cell(entry),
            enabled_cell(entry.enabled),
            entry
                .detail
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");
    println!(
        "{} assertions, {} disabled, {} quarantined",
        summary.assertions, summary.disabled, summary.quarantined
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn assertion_cell(entry: &OutlineEntry) -> Cell {
    let label = format!("{}{}", "  ".repeat(entry.depth), entry.assertion);
    if entry.detail.as_deref().is_some_and(|detail| detail.starts_with("unrecognized")) {
        Cell::new(label).fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else if entry.enabled {
        Cell::new(label)
    } else {
        dim_cell(label)
    }
}

fn enabled_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
