// Spreadsheet import (xls, xlsx, xlsm, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use stocksync_recon::Table;

use crate::error::TableError;

/// Import the first worksheet. The first row is the header.
pub fn import(path: &Path) -> Result<Table, TableError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(io) => TableError::io(path, io),
        other => TableError::parse(path, other),
    })?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TableError::parse(path, format!("sheet '{sheet_name}': {e}")))?;

    // Data may not begin at A1; leading blank columns are kept so header
    // positions match what the user sees.
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    };
    let headers: Vec<String> = std::iter::repeat(String::new())
        .take(pad)
        .chain(header_row.iter().map(|c| cell_to_string(c).trim().to_string()))
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::new(headers);
    for row in rows {
        let cells: Vec<String> = std::iter::repeat(String::new())
            .take(pad)
            .chain(row.iter().map(cell_to_string))
            .collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        table.push_row(cells);
    }

    log::debug!(
        "{}: sheet '{}' with {} rows",
        path.display(),
        sheet_name,
        table.len()
    );
    Ok(table)
}

/// Render a cell the way it reads in the sheet.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Codes like 12345 are stored as floats; integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}
