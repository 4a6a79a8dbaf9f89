use crate::types::FilterOutcome;
use crate::Result;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const BANNER: &str = "============================================================";

/// Writes the curation report: a generated-at header, then one section
/// per group with its name, match count, and one item id per line.
///
/// The file is written once per run and replaces any previous report at
/// the same path.
pub fn write_report(path: &Path, outcomes: &[FilterOutcome]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "CURATION RESULTS")?;
    writeln!(
        writer,
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(writer, "{BANNER}")?;

    for outcome in outcomes {
        writeln!(writer)?;
        writeln!(writer, "{BANNER}")?;
        writeln!(writer, "CURATION: {}", outcome.name)?;
        writeln!(writer, "Total items: {}", outcome.matched.len())?;
        writeln!(writer, "{BANNER}")?;
        writeln!(writer)?;

        for id in &outcome.matched {
            writeln!(writer, "{id}")?;
        }
    }

    writer.flush()?;
    info!("saved {} curations to {}", outcomes.len(), path.display());

    Ok(())
}
