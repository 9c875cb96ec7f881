//! Counter state → display text

use super::counter::CounterState;
use super::tables::PositionTables;
use crate::types::Grouping;

/// Render the counter through the position tables, most significant digit first
pub fn render(state: &CounterState, tables: &PositionTables) -> String {
    state
        .digits()
        .iter()
        .enumerate()
        .rev()
        .map(|(digit, &value)| tables.glyph(digit, value))
        .collect()
}

/// Split `raw` into chunks of `grouping.size` from the left, joined by the spacer
pub fn format_grouping(raw: &str, grouping: Option<&Grouping>) -> String {
    let grouping = match grouping {
        Some(g) if g.size > 0 => g,
        _ => return raw.to_string(),
    };

    let count = raw.chars().count();
    let mut out = String::with_capacity(count + count / grouping.size);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && i % grouping.size == 0 {
            out.push(grouping.spacer);
        }
        out.push(ch);
    }
    out
}
