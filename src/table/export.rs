//! Write a projected view back out as CSV

use anyhow::{Context, Result};
use std::io::Write;

use super::view::Projection;

/// Write the displayed columns of the projected rows as CSV
pub fn write_csv<W: Write>(projection: &Projection<'_>, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(&projection.columns)
        .context("Failed to write CSV header")?;

    for record in &projection.rows {
        writer
            .write_record(projection.columns.iter().map(|c| record.get(c)))
            .context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Render the projection as CSV text
pub fn to_csv_string(projection: &Projection<'_>) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(projection, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}
