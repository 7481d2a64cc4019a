use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::Datelike;
use tracing::debug;
use umya_spreadsheet::structs::{HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::Worksheet;

use crate::error::{Result, ToolError};
use crate::runlog::RunLog;

/// Columns copied from every staged report.
const SOURCE_COLUMNS: u32 = 10;

/// Row the fixed header lands on: the template reserves rows 1-7 for
/// front-matter.
const HEADER_ROW: u32 = 8;

/// Height assigned to the header row.
const HEADER_HEIGHT: f64 = 21.6;

/// Workbook-reserved defined name that scopes printing.
const PRINT_AREA_NAME: &str = "_xlnm.Print_Area";

/// Column titles written into the header row, in column order.
const HEADER_TITLES: [&str; 9] = [
    "Hull #",
    "Primary",
    "Boat Model",
    "Order Details",
    "Flooring",
    "Invoice Amount",
    "Est Start/Finish",
    "Actual Start",
    "Actual Finish",
];

/// Converts every staged workbook in `staging_dir`, in sorted filename order.
///
/// A file that fails to convert is logged against its name and never stops
/// the files after it.
pub fn convert_all(
    staging_dir: &Path,
    template: &Path,
    target_dir: &Path,
    log: &mut RunLog,
) -> Result<()> {
    log.log("\nPROCESS SHEETS ===============================");
    for path in staged_files(staging_dir)? {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        log.log(format!("  converting {name}"));
        match convert_file(&path, template, target_dir) {
            Ok(output) => debug!(output = %output.display(), "workbook written"),
            Err(err) => log.error(format!("    FAILED TO CREATE XLSX: {err}")),
        }
    }
    Ok(())
}

/// Spreadsheet files currently staged, sorted by filename so every run
/// processes (and logs) them in the same order.
fn staged_files(staging_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(staging_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Converts one staged workbook into an output workbook derived from the
/// template, written to `target_dir` under the staged filename.
pub fn convert_file(staged: &Path, template: &Path, target_dir: &Path) -> Result<PathBuf> {
    let mut source: Xlsx<_> = open_workbook(staged)?;
    let range = source
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ToolError::InvalidWorkbook(format!("{} contains no sheets", staged.display()))
        })??;
    let last_row = range.end().map(|(row, _)| row + 1).unwrap_or(0).max(1);

    let mut book = umya_spreadsheet::reader::xlsx::read(template)?;
    let sheet = book.get_sheet_mut(&0).ok_or_else(|| {
        ToolError::InvalidWorkbook(format!("{} contains no sheets", template.display()))
    })?;
    let sheet_name = sheet.get_name().to_string();

    // Row 1 of the source is its own header and is never copied; the
    // template provides all presentation.
    for row in 2..=last_row {
        for col in 1..=SOURCE_COLUMNS {
            let value = normalized_value(range.get_value((row - 1, col - 1)));
            sheet.get_cell_mut((col, row)).set_value(value);
        }
    }

    write_header(sheet);

    sheet
        .add_defined_name(PRINT_AREA_NAME.to_string(), print_area_ref(&sheet_name, last_row))
        .map_err(|err| ToolError::InvalidWorkbook(format!("print area rejected: {err}")))?;

    let file_name = staged.file_name().ok_or_else(|| {
        ToolError::InvalidWorkbook(format!("{} has no file name", staged.display()))
    })?;
    let output = target_dir.join(file_name);
    umya_spreadsheet::writer::xlsx::write(&book, &output)?;
    Ok(output)
}

/// Writes the fixed column titles, centered both ways, at the header row.
fn write_header(sheet: &mut Worksheet) {
    sheet.get_row_dimension_mut(&HEADER_ROW).set_height(HEADER_HEIGHT);
    for (index, title) in HEADER_TITLES.iter().enumerate() {
        let col = index as u32 + 1;
        sheet.get_cell_mut((col, HEADER_ROW)).set_value(*title);
        let alignment = sheet
            .get_style_mut((col, HEADER_ROW))
            .get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);
    }
}

/// Builds the defined-name reference covering columns A-J through
/// `last_row`, quoting the sheet name whenever a bare reference would be
/// invalid.
fn print_area_ref(sheet_name: &str, last_row: u32) -> String {
    let plain = !sheet_name.is_empty()
        && sheet_name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if plain {
        format!("{sheet_name}!$A$1:$J${last_row}")
    } else {
        format!("'{}'!$A$1:$J${last_row}", sheet_name.replace('\'', "''"))
    }
}

/// Renders one source cell as the string stored in the output workbook.
///
/// Precedence: text verbatim, then dates as `MM/DD/YY`, then empty, then
/// everything else as a truncated integer.
fn normalized_value(cell: Option<&Data>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    match cell {
        Data::String(value) => value.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|datetime| short_date(&datetime.date()))
            .unwrap_or_default(),
        Data::Empty | Data::Error(_) | Data::DurationIso(_) => String::new(),
        Data::Float(value) => format!("{}", value.trunc() as i64),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => if *value { "1" } else { "0" }.to_string(),
    }
}

/// Zero-padded `MM/DD/YY` with a two-digit year.
fn short_date(date: &chrono::NaiveDate) -> String {
    format!(
        "{:02}/{:02}/{:02}",
        date.month(),
        date.day(),
        date.year().rem_euclid(100)
    )
}
