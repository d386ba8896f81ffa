use crate::log;
use crate::models::{ParseStats, SkipReason};
use crate::output::{MetricTable, Unit};
use crate::utils::stats::SeriesStats;

fn parse_stats_lines(stats: &ParseStats) -> Vec<String> {
    let mut lines = vec![
        format!("Lines seen: {}", stats.lines_seen),
        format!("Parsed events: {}", stats.parsed),
        format!("Blank/comment lines: {}", stats.blank_or_comment),
    ];
    for reason in [SkipReason::ShortLine, SkipReason::BadInt, SkipReason::BadFloat] {
        lines.push(format!("Skipped ({}): {}", reason, stats.skipped_for(reason)));
    }
    if stats.cap_reached {
        lines.push("Entry cap reached; trace was truncated".to_string());
    }
    lines
}

pub fn print_parse_stats(stats: &ParseStats) {
    for line in parse_stats_lines(stats) {
        log!("{}", line);
    }
}

fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Count => format!("{value:.0}"),
        Unit::Fraction => format!("{value:.4}"),
        Unit::Milliseconds | Unit::Seconds | Unit::Percent => format!("{value:.3}"),
        _ => format!("{value}"),
    }
}

fn metric_table_lines(table: &MetricTable) -> Vec<String> {
    let mut lines = vec![format!("\n[{}]", table.title())];
    for note in table.notes() {
        lines.push(format!("  note: {note}"));
    }

    let header: Vec<String> = table.columns().iter().map(|c| c.header()).collect();
    lines.push(header.join("\t"));

    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(table.columns())
            .map(|(cell, column)| match cell.as_f64() {
                Some(v) => format_value(v, column.unit),
                None => cell.to_string(),
            })
            .collect();
        lines.push(cells.join("\t"));
    }

    for column in table.columns().iter().filter(|c| c.unit == Unit::Milliseconds) {
        let Some(values) = table.values(&column.name) else {
            continue;
        };
        let stats: SeriesStats = values.into_iter().collect();
        if let (Some(avg), Some(min), Some(max)) = (stats.avg(), stats.min(), stats.max()) {
            lines.push(format!(
                "{}: avg {:.1} ms, max {:.1} ms, min {:.1} ms",
                column.name, avg, max, min
            ));
        }
    }
    lines
}

/// Logs the table as tab-separated rows, followed by avg/min/max of every
/// millisecond column.
pub fn print_metric_table(table: &MetricTable) {
    for line in metric_table_lines(table) {
        log!("{}", line);
    }
}
