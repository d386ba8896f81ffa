use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::log;
use crate::output::MetricTable;

/// Writes the table with unit-suffixed headers, e.g. `peak_dt (ms)`.
pub fn write_csv<W: Write>(table: &MetricTable, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    writer.write_record(table.columns().iter().map(|c| c.header()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Saves to `<output_prefix>_<slug>.csv`, where the slug comes from the title.
pub fn save_to_csv(table: &MetricTable, output_prefix: &str) -> Result<PathBuf> {
    let slug: String = table
        .title()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let filename = PathBuf::from(format!("{}_{}.csv", output_prefix, slug.trim_matches('_')));

    if let Some(dir) = Path::new(&filename).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    write_csv(table, File::create(&filename)?)?;
    log!("Saved '{}' to {}", table.title(), filename.display());
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Unit;
    use rand::random;

    fn sample_table() -> MetricTable {
        MetricTable::builder("Peak DT, by scheme")
            .column("scheme", Unit::Label)
            .column("peak_dt", Unit::Milliseconds)
            .row(vec!["E0".into(), 145.0.into()])
            .row(vec!["E1".into(), 98.5.into()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&sample_table(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "scheme,peak_dt (ms)\nE0,145\nE1,98.5\n");
    }

    #[test]
    fn test_save_to_csv_names_file_from_title() {
        let prefix = std::env::temp_dir().join(format!("trace_metrics_{}", random::<u64>()));
        let path = save_to_csv(&sample_table(), &prefix.to_string_lossy()).unwrap();

        assert!(path.to_string_lossy().ends_with("_peak_dt__by_scheme.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("scheme,peak_dt (ms)\n"));
        std::fs::remove_file(path).ok();
    }
}
