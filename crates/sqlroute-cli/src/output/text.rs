//! Human-readable text output formatting.

use owo_colors::OwoColorize;
use sqlroute_core::catalog::Definition;
use sqlroute_core::{AnalysisResult, ProcedureAnalysis, TableDefinition};

use super::RouteReport;

fn heading(text: &str, colored: bool) -> String {
    if colored {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Per-result summary printed after a scan.
pub fn format_scan(results: &[AnalysisResult], colored: bool) -> String {
    let mut lines = Vec::new();
    let mut tables = 0;
    let mut procedures = 0;
    for result in results {
        match result {
            AnalysisResult::Table(table) => {
                tables += 1;
                write_table(&mut lines, table, colored);
            }
            AnalysisResult::Procedure(procedure) => {
                procedures += 1;
                write_procedure(&mut lines, procedure, colored);
            }
        }
    }

    let summary = format!("Summary: {tables} tables | {procedures} procedures");
    if colored {
        lines.push(summary.cyan().to_string());
    } else {
        lines.push(summary);
    }
    finish(lines)
}

fn write_table(lines: &mut Vec<String>, table: &TableDefinition, colored: bool) {
    lines.push(heading(&format!("Table {}", table.table_name), colored));
    let fields: Vec<_> = table.field_names.iter().map(String::as_str).collect();
    lines.push(format!("  Fields: {}", fields.join(", ")));
}

fn write_procedure(lines: &mut Vec<String>, procedure: &ProcedureAnalysis, colored: bool) {
    let title = match &procedure.location {
        Some(location) => format!("Procedure {} ({location})", procedure.procedure_name),
        None => format!("Procedure {}", procedure.procedure_name),
    };
    lines.push(heading(&title, colored));

    let mut section = |label: &str, items: Vec<String>| {
        if !items.is_empty() {
            lines.push(format!("  {label}: {}", items.join(", ")));
        }
    };
    section("Tables", procedure.tables.iter().cloned().collect());
    section(
        "Joins",
        procedure.join_fields.iter().map(ToString::to_string).collect(),
    );
    section(
        "Filters",
        procedure
            .where_conditions
            .iter()
            .map(ToString::to_string)
            .collect(),
    );
    section("Calls", procedure.called_procedures.iter().cloned().collect());
    section(
        "Outputs",
        procedure
            .output_fields
            .values()
            .map(|field| field.display_name())
            .collect(),
    );
}

/// One item per line.
pub fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    finish(items.to_vec())
}

/// Direct routes under `StoredProcs:`, join paths under `Tables:`.
pub fn format_routes(report: &RouteReport, colored: bool) -> String {
    let mut blocks = Vec::new();
    if let Some(direct) = &report.direct {
        let mut block = vec![heading("StoredProcs:", colored)];
        block.extend(direct.iter().map(ToString::to_string));
        blocks.push(block.join("\n"));
    }
    if let Some(paths) = &report.paths {
        let rendered: Vec<_> = paths.iter().map(ToString::to_string).collect();
        blocks.push(format!(
            "{}\n{}",
            heading("Tables:", colored),
            rendered.join("\n\n")
        ));
    }
    finish(blocks)
}

/// `label: file:line` per definition.
pub fn format_definitions(definitions: &[Definition]) -> String {
    if definitions.is_empty() {
        return String::new();
    }
    finish(
        definitions
            .iter()
            .map(|definition| format!("{}: {}", definition.label, definition.location))
            .collect(),
    )
}
