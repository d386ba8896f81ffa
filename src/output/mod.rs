mod csv;
mod metric_table;
mod statistics;

pub use self::csv::{save_to_csv, write_csv};
pub use metric_table::{Cell, Column, MetricTable, MetricTableBuilder, Unit};
pub use statistics::{print_metric_table, print_parse_stats};
