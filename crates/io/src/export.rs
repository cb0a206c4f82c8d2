// XLSX and CSV export of output tables

use std::io::Write;
use std::path::Path;

use entrymatch_recon::model::OutputTable;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::IoError;

/// Sheet name used for exported tables.
pub const SHEET_NAME: &str = "Processed Data";

/// Write `table` as a single-sheet workbook with a bold, frozen header row.
/// Every value is written as a string cell.
pub fn write_xlsx(table: &OutputTable, path: &Path) -> Result<(), IoError> {
    let failed = |e: rust_xlsxwriter::XlsxError| {
        IoError::write(path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME).map_err(failed)?;

    let header = Format::new().set_bold();
    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(failed)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row32, col as u16, value).map_err(failed)?;
        }
    }

    worksheet.set_freeze_panes(1, 0).map_err(failed)?;
    worksheet.autofit();

    workbook.save(path).map_err(failed)?;
    debug!(path = %path.display(), rows = table.rows.len(), "wrote xlsx");
    Ok(())
}

/// Write `table` as CSV (header row first) to any writer.
pub fn write_csv<W: Write>(table: &OutputTable, writer: W) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()
}

pub fn save_csv(table: &OutputTable, path: &Path) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::write(path, e))?;
    write_csv(table, file).map_err(|e| IoError::write(path, e))?;
    debug!(path = %path.display(), rows = table.rows.len(), "wrote csv");
    Ok(())
}
