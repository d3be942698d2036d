use std::io;

use crate::data::CommodityRow;
use crate::grid::{text_for, ColumnDef};
use crate::types::App;

/// Export the commodity table to a CSV file in the working directory
pub fn export_table_to_csv(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    use std::env;
    use std::fs::File;
    use std::time::Instant;

    // Create filename with timestamp
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("commodity_prices_{}.csv", timestamp);

    // Get current directory for display
    let current_dir = env::current_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| "current directory".to_string());

    let mut file = File::create(&filename)?;
    let row_count = write_rows(&mut file, &app.rows, &app.grid.columns)?;

    let export_msg = format!(
        "✓ Successfully exported {} commodities to file '{}' in {}",
        row_count, filename, current_dir
    );
    app.export_notification = Some(export_msg);
    app.export_notification_time = Some(Instant::now());

    Ok(())
}

/// Writes the table rows. Chart columns stay out of the file; the remaining
/// cells use the same formatting as the grid display.
fn write_rows<W: io::Write>(
    out: &mut W,
    rows: &[CommodityRow],
    columns: &[ColumnDef],
) -> io::Result<usize> {
    let header = columns
        .iter()
        .filter(|column| column.cell_renderer.is_none())
        .map(|column| csv_field(&column.header))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{}", header)?;

    for row in rows {
        let grid_row = row.to_grid_row();
        let line = columns
            .iter()
            .zip(&grid_row.cells)
            .filter(|(column, _)| column.cell_renderer.is_none())
            .map(|(column, value)| csv_field(&text_for(column, value)))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{}", line)?;
    }

    Ok(rows.len())
}

fn csv_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
