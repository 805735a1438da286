use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, open_workbook_from_rs, Data, Reader, Xls, Xlsx};

use super::row::{HeaderMap, SheetRow};

pub const SUPPORTED_EXTENSIONS: &str = ".xlsx, .xls, .csv";

type WorkbookBuffer = Cursor<Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Xls => "xls",
            SpreadsheetFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Sheet '{name}' could not be read: {reason}")]
    SheetUnreadable { name: String, reason: String },

    #[error("Unable to read workbook ({primary}); fallback decode also failed ({fallback})")]
    Unreadable { primary: String, fallback: String },

    #[error("Unable to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Picks the format from the file extension. The declared MIME type is only
/// consulted when the file name has no extension at all.
pub fn detect_format(file_name: &str, content_type: Option<&str>) -> Option<SpreadsheetFormat> {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = by_extension {
        return match ext.as_str() {
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        };
    }

    let mime = content_type?
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
            Some(SpreadsheetFormat::Xlsx)
        }
        "application/vnd.ms-excel" => Some(SpreadsheetFormat::Xls),
        "text/csv" | "application/csv" => Some(SpreadsheetFormat::Csv),
        _ => None,
    }
}

pub fn parse_spreadsheet(format: SpreadsheetFormat, data: &[u8]) -> Result<Vec<SheetRow>, ParseError> {
    match format {
        SpreadsheetFormat::Csv => parse_csv(data),
        SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => parse_workbook(format, data),
    }
}

fn parse_csv(data: &[u8]) -> Result<Vec<SheetRow>, ParseError> {
    let text = String::from_utf8_lossy(data);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let header_map = HeaderMap::new(&headers.iter().collect::<Vec<_>>());

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row_number = idx + 2;
        match record {
            Ok(record) => {
                let cells: Vec<&str> = record.iter().collect();
                rows.push(header_map.row(row_number, &cells));
            }
            Err(e) => {
                tracing::warn!(row = row_number, error = %e, "Skipping malformed CSV record");
            }
        }
    }
    Ok(rows)
}

fn parse_workbook(format: SpreadsheetFormat, data: &[u8]) -> Result<Vec<SheetRow>, ParseError> {
    let cursor = Cursor::new(data.to_vec());

    let primary = match format {
        SpreadsheetFormat::Xls => open_workbook_from_rs::<Xls<_>, _>(cursor.clone())
            .map_err(|e| e.to_string())
            .and_then(|mut wb| {
                read_first_sheet::<WorkbookBuffer, _>(&mut wb).map_err(|e| e.to_string())
            }),
        _ => open_workbook_from_rs::<Xlsx<_>, _>(cursor.clone())
            .map_err(|e| e.to_string())
            .and_then(|mut wb| {
                read_first_sheet::<WorkbookBuffer, _>(&mut wb).map_err(|e| e.to_string())
            }),
    };

    let table = match primary {
        Ok(table) => table,
        Err(primary) => {
            tracing::warn!(
                format = format.as_str(),
                error = %primary,
                "Primary workbook decode failed, retrying with format detection"
            );
            let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| ParseError::Unreadable {
                primary: primary.clone(),
                fallback: e.to_string(),
            })?;
            read_first_sheet::<WorkbookBuffer, _>(&mut workbook)?
        }
    };

    Ok(table_to_rows(table))
}

struct SheetTable {
    /// 1-based row number of the header row.
    header_row: usize,
    rows: Vec<Vec<String>>,
}

fn read_first_sheet<RS, R>(workbook: &mut R) -> Result<SheetTable, ParseError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let name = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or(ParseError::NoSheets)?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ParseError::SheetUnreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .collect();

    Ok(SheetTable { header_row, rows })
}

fn table_to_rows(table: SheetTable) -> Vec<SheetRow> {
    let mut rows = table.rows.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    let header_map = HeaderMap::new(&headers);
    rows.enumerate()
        .map(|(idx, cells)| header_map.row(table.header_row + idx + 1, &cells))
        .collect()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}
