//! Spreadsheet reader producing a typed [`Grid`].
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read with calamine,
//! first worksheet only. Delimited text (`.csv`, `.tsv`, `.txt`) goes through
//! encoding and delimiter auto-detection. No header inference happens here:
//! every row is data.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;

use crate::error::{GridError, GridResult};
use crate::models::{Cell, Grid};

/// Kind of input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Spreadsheet workbook read through calamine.
    Workbook,
    /// Delimited text such as CSV.
    Delimited,
}

impl InputFormat {
    /// Pick the format from a file name's extension.
    pub fn from_file_name(name: &str) -> GridResult<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Ok(Self::Workbook),
            "csv" | "tsv" | "txt" => Ok(Self::Delimited),
            _ => Err(GridError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Guess the format from magic bytes (zip or OLE container means workbook).
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP: &[u8] = b"PK\x03\x04";
        const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

        if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
            Self::Workbook
        } else {
            Self::Delimited
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed grid
    pub grid: Grid,
    /// Format the input was read as
    pub format: InputFormat,
    /// Worksheet that was read (workbooks only)
    pub sheet_name: Option<String>,
    /// Detected encoding (delimited text only)
    pub encoding: Option<String>,
    /// Detected delimiter (delimited text only)
    pub delimiter: Option<char>,
}

/// Read a spreadsheet file into a grid.
///
/// # Example
/// ```ignore
/// let result = parse_file("roster.xlsx")?;
/// println!("{} rows x {} columns", result.grid.height(), result.grid.width());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> GridResult<ParseResult> {
    let path = path.as_ref();
    let format = InputFormat::from_file_name(&path.to_string_lossy())?;
    let bytes = std::fs::read(path)?;
    parse_bytes_as(bytes, format)
}

/// Read an in-memory upload into a grid.
///
/// The format comes from `file_name` when it has a known extension, otherwise
/// it is sniffed from the content.
pub fn parse_bytes(bytes: Vec<u8>, file_name: Option<&str>) -> GridResult<ParseResult> {
    let format = match file_name.map(InputFormat::from_file_name) {
        Some(Ok(format)) => format,
        _ => InputFormat::sniff(&bytes),
    };
    parse_bytes_as(bytes, format)
}

fn parse_bytes_as(bytes: Vec<u8>, format: InputFormat) -> GridResult<ParseResult> {
    match format {
        InputFormat::Workbook => {
            let (grid, sheet_name) = read_workbook(bytes)?;
            Ok(ParseResult {
                grid,
                format,
                sheet_name: Some(sheet_name),
                encoding: None,
                delimiter: None,
            })
        }
        InputFormat::Delimited => {
            let encoding = detect_encoding(&bytes);
            let content = decode_content(&bytes, &encoding)?;
            let delimiter = detect_delimiter(&content);
            let grid = read_delimited(&content, delimiter)?;
            Ok(ParseResult {
                grid,
                format,
                sheet_name: None,
                encoding: Some(encoding),
                delimiter: Some(delimiter),
            })
        }
    }
}

// =============================================================================
// Workbooks
// =============================================================================

/// Read the first worksheet of a workbook held in memory.
pub fn read_workbook(bytes: Vec<u8>) -> GridResult<(Grid, String)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(GridError::NoWorksheet)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    Ok((range_to_grid(&range), sheet_name))
}

/// Convert a calamine range to a grid anchored at A1.
///
/// calamine ranges start at the first used cell; absolute addressing keeps
/// leading empty rows and columns so the fixed layout offsets stay valid.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((end_row, end_col)) = range.end() else {
        return Grid::default();
    };

    let rows: Vec<Vec<Cell>> = (0..=end_row)
        .map(|r| {
            (0..=end_col)
                .map(|c| range.get_value((r, c)).map(data_to_cell).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect();

    Grid::new(rows)
}

/// Convert a calamine cell to a grid cell.
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Other(b.to_string()),
        Data::DateTime(dt) => Cell::Other(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Other(s.clone()),
    }
}

// =============================================================================
// Delimited text
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> GridResult<String> {
    let label = encoding.to_lowercase();

    if matches!(label.as_str(), "utf-8" | "utf8" | "ascii") {
        let text = String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());
        return Ok(text);
    }

    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
        None => String::from_utf8(bytes.to_vec())
            .map_err(|e| GridError::Encoding(format!("{}: {}", encoding, e))),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a grid, typing numeric fields as numbers.
pub fn read_delimited(content: &str, delimiter: char) -> GridResult<Grid> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(text_to_cell).collect());
    }

    Ok(Grid::new(rows))
}

/// Type a raw text field: blank stays empty, numbers become numbers.
fn text_to_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if raw.is_empty() { Cell::Empty } else { Cell::Text(raw.to_string()) };
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(raw.to_string()),
    }
}
