use crate::domain::model::RowRecord;
use crate::utils::error::{AdminError, Result};
use crate::utils::text::{convert_to_json, to_camel_case};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Number, Value};
use std::io::Cursor;
use std::path::Path;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Csv,
    Json,
}

impl SourceFormat {
    pub const SPREADSHEET_EXTENSIONS: [&'static str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            ext if Self::SPREADSHEET_EXTENSIONS.contains(&ext) => Ok(SourceFormat::Spreadsheet),
            _ => Err(AdminError::UnsupportedFormat { extension }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// 讀取唯一的上傳檔案，依原始順序回傳每一列
pub fn read_rows(files: &[UploadedFile]) -> Result<Vec<RowRecord>> {
    let file = match files {
        [] => {
            return Err(AdminError::InputError {
                message: "No file selected!".to_string(),
            })
        }
        [file] => file,
        _ => {
            return Err(AdminError::InputError {
                message: "Only one file can be uploaded at a time".to_string(),
            })
        }
    };

    let format = SourceFormat::from_file_name(&file.name)?;
    tracing::debug!("Reading '{}' as {:?} ({} bytes)", file.name, format, file.bytes.len());

    match format {
        SourceFormat::Spreadsheet => read_spreadsheet(&file.bytes),
        SourceFormat::Csv => read_csv(&file.bytes),
        SourceFormat::Json => read_json(&file.bytes),
    }
}

/// 只讀取第一個工作表
pub fn read_spreadsheet(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AdminError::InputError {
            message: "The spreadsheet does not contain any sheet".to_string(),
        })??;

    let grid: Vec<Vec<Data>> = range.rows().map(|cells| cells.to_vec()).collect();
    Ok(rows_from_grid(&grid))
}

/// 第一列為標題列；空白列直接略過
pub fn rows_from_grid(grid: &[Vec<Data>]) -> Vec<RowRecord> {
    let Some((header, body)) = grid.split_first() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header.iter().map(header_name).collect();

    body.iter()
        .filter_map(|cells| {
            let record: RowRecord = headers
                .iter()
                .zip(cells)
                .filter_map(|(name, cell)| Some((name.clone()?, cell_value(cell)?)))
                .collect();
            (!record.is_empty()).then_some(record)
        })
        .collect()
}

pub fn read_csv(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<Option<String>> = reader
        .headers()?
        .iter()
        .map(|header| {
            let header = header.trim();
            (!header.is_empty()).then(|| to_camel_case(header))
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RowRecord = headers
            .iter()
            .zip(record.iter())
            .filter_map(|(name, field)| Some((name.clone()?, csv_value(field)?)))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// JSON 陣列直接使用，不做標題轉換
pub fn read_json(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = value else {
        return Err(AdminError::InputError {
            message: "Expected a JSON array of documents".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(AdminError::InputError {
                message: format!("Document at index {} is not a JSON object", index),
            }),
        })
        .collect()
}

fn header_name(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| to_camel_case(text))
        }
        other => Some(other.to_string()),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(text) => text_value(text),
        Data::Int(value) => Some(Value::from(*value)),
        Data::Float(value) => number_value(*value),
        Data::Bool(value) => Some(Value::Bool(*value)),
        other => Some(Value::String(other.to_string())),
    }
}

fn number_value(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        Some(Value::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number)
    }
}

fn csv_value(field: &str) -> Option<Value> {
    let trimmed = field.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        text_value(field)
    }
}

/// 以 `[` 或 `{` 開頭的儲存格視為 JSON（陣列、物件、座標）
fn text_value(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let decoded = serde_json::from_str::<Value>(trimmed)
            .or_else(|_| serde_json::from_str::<Value>(&convert_to_json(trimmed)));
        if let Ok(value) = decoded {
            return Some(value);
        }
    }

    Some(Value::String(text.to_string()))
}
