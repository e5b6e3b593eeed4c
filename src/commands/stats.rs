//! Stats command - Cost and model breakdown for the matching rows

use anyhow::Result;
use bigdecimal::BigDecimal;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use serde_json::{json, Value};
use std::path::PathBuf;

use super::utils::{self, ViewOptions};
use cursor_usage::recent::RecentFiles;
use cursor_usage::table::{CostStats, ModelStats, Projection};

/// Output format for stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatsFormat {
    #[default]
    Text,
    Json,
}

pub fn execute(
    path: Option<PathBuf>,
    options: &ViewOptions,
    format: StatsFormat,
    recent: &RecentFiles,
) -> Result<String> {
    let path = utils::resolve_input(path, recent)?;
    let mut loaded = utils::load_table(&path, recent)?;
    options.apply(&mut loaded.session)?;
    let projection = loaded.session.project(&options.resolvers())?;

    match format {
        StatsFormat::Text => Ok(format_stats(&projection)),
        StatsFormat::Json => Ok(serde_json::to_string_pretty(&to_json(&projection))?),
    }
}

/// Format stats for display
pub fn format_stats(projection: &Projection<'_>) -> String {
    let mut lines = vec![format!(
        "Rows: {} of {}",
        projection.rows.len(),
        projection.total_records
    )];

    lines.push(String::new());
    match (&projection.cost_column, &projection.cost) {
        (Some(column), Some(cost)) => {
            lines.push(format!("Cost ({}):", column));
            lines.extend(cost_lines(cost));
        }
        (Some(column), None) => lines.push(format!("Cost ({}): no parseable values", column)),
        (None, _) => lines.push("Cost: no cost column".to_string()),
    }

    lines.push(String::new());
    match (&projection.model_column, &projection.models) {
        (Some(column), Some(models)) => {
            lines.push(format!("Models ({}):", column));
            lines.push(model_table(models));
        }
        (Some(column), None) => lines.push(format!("Models ({}): no rows", column)),
        (None, _) => lines.push("Models: no model column".to_string()),
    }

    lines.join("\n")
}

fn cost_lines(cost: &CostStats) -> Vec<String> {
    vec![
        format!("  Total:   {}", utils::format_currency(&cost.total)),
        format!("  Average: {}", utils::format_currency(&cost.avg)),
        format!("  Max:     {}", utils::format_currency(&cost.max)),
        format!("  Min:     {}", utils::format_currency(&cost.min)),
        format!("  Priced rows: {}", cost.count),
    ]
}

fn model_table(models: &ModelStats) -> String {
    let with_cost = models.models.iter().any(|m| m.cost.is_some());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Model"), Cell::new("Rows"), Cell::new("Share")];
    if with_cost {
        header.push(Cell::new("Cost"));
    }
    table.set_header(header);

    for share in &models.models {
        let mut row = vec![
            Cell::new(&share.name),
            Cell::new(share.count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share.percentage)).set_alignment(CellAlignment::Right),
        ];
        if with_cost {
            let cost = share
                .cost
                .as_ref()
                .map(utils::format_currency)
                .unwrap_or_else(|| "-".to_string());
            row.push(Cell::new(cost).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }

    table.to_string()
}

fn decimal(value: &BigDecimal) -> String {
    value.to_string()
}

/// Stats as a JSON document; money values are decimal strings
pub fn to_json(projection: &Projection<'_>) -> Value {
    let cost = projection.cost.as_ref().map(|c| {
        json!({
            "column": projection.cost_column,
            "total": decimal(&c.total),
            "average": decimal(&c.avg.round(6)),
            "max": decimal(&c.max),
            "min": decimal(&c.min),
            "count": c.count,
        })
    });

    let models = projection.models.as_ref().map(|m| {
        let shares: Vec<Value> = m
            .models
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "count": s.count,
                    "percentage": s.percentage,
                    "cost": s.cost.as_ref().map(decimal),
                })
            })
            .collect();
        json!({
            "column": projection.model_column,
            "total": m.total,
            "models": shares,
        })
    });

    json!({
        "rows": projection.rows.len(),
        "total_records": projection.total_records,
        "cost": cost,
        "models": models,
    })
}
