//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::ObjectiveRecord;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Render objectives as a table, in remote display order.
pub fn objectives_table(objectives: &[ObjectiveRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Order").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Completed").add_attribute(Attribute::Bold),
        ]);

    for objective in objectives {
        let (label, color) = if objective.progress {
            ("yes", Color::Green)
        } else {
            ("no", Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(objective.order),
            Cell::new(objective.id),
            Cell::new(objective.name.as_deref().unwrap_or("<unnamed>")),
            Cell::new(label).fg(color),
        ]);
    }

    table.to_string()
}
