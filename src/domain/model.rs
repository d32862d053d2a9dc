use crate::utils::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Field types understood by the search service.
///
/// Names the service may add later deserialize into `Other` so a schema
/// fetched from a newer server can still be read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    StringArray,
    Int32,
    Int32Array,
    Int64,
    Int64Array,
    Float,
    FloatArray,
    Bool,
    BoolArray,
    GeoPoint,
    GeoPointArray,
    Object,
    ObjectArray,
    AutoString,
    Image,
    Auto,
    Other(String),
}

impl FieldType {
    pub const KNOWN: [FieldType; 17] = [
        FieldType::String,
        FieldType::StringArray,
        FieldType::Int32,
        FieldType::Int32Array,
        FieldType::Int64,
        FieldType::Int64Array,
        FieldType::Float,
        FieldType::FloatArray,
        FieldType::Bool,
        FieldType::BoolArray,
        FieldType::GeoPoint,
        FieldType::GeoPointArray,
        FieldType::Object,
        FieldType::ObjectArray,
        FieldType::AutoString,
        FieldType::Image,
        FieldType::Auto,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::StringArray => "string[]",
            FieldType::Int32 => "int32",
            FieldType::Int32Array => "int32[]",
            FieldType::Int64 => "int64",
            FieldType::Int64Array => "int64[]",
            FieldType::Float => "float",
            FieldType::FloatArray => "float[]",
            FieldType::Bool => "bool",
            FieldType::BoolArray => "bool[]",
            FieldType::GeoPoint => "geopoint",
            FieldType::GeoPointArray => "geopoint[]",
            FieldType::Object => "object",
            FieldType::ObjectArray => "object[]",
            FieldType::AutoString => "string*",
            FieldType::Image => "image",
            FieldType::Auto => "auto",
            FieldType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        FieldType::KNOWN
            .iter()
            .find(|known| known.as_str() == value)
            .cloned()
            .unwrap_or_else(|| FieldType::Other(value.to_string()))
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::from(value.as_str())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop: Option<bool>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.into(),
            optional: false,
            facet: None,
            index: None,
            stem: None,
            locale: None,
            drop: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// 上傳檔案中的一列原始資料（欄位名稱 -> 儲存格值）
pub type RowRecord = Map<String, Value>;

/// 依列索引（從 0 開始）收集的錯誤訊息
pub type RowErrorMap = BTreeMap<usize, Vec<String>>;

/// A row that passed every field rule, with values coerced to their schema types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    pub row: usize,
    pub document: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub message: String,
    pub errors: RowErrorMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(Vec<ValidatedRecord>),
    Invalid(ValidationFailure),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

/// One line of the service's bulk import response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub row: usize,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub collection: String,
    pub imported: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    /// 依位置將服務回應對應回送出的紀錄
    pub fn from_results(
        collection: &str,
        records: &[ValidatedRecord],
        results: Vec<ImportResult>,
    ) -> Self {
        let mut imported = 0;
        let mut failures = Vec::new();
        let mut results = results.into_iter();

        for record in records {
            match results.next() {
                Some(result) if result.success => imported += 1,
                Some(result) => failures.push(ImportFailure {
                    row: record.row,
                    error: result
                        .error
                        .unwrap_or_else(|| "Rejected by the search service".to_string()),
                    document: result.document,
                }),
                None => failures.push(ImportFailure {
                    row: record.row,
                    error: "No import result returned for this document".to_string(),
                    document: None,
                }),
            }
        }

        Self {
            collection: collection.to_string(),
            imported,
            failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportReport {
    /// The file did not pass validation; nothing was sent.
    Rejected(ValidationFailure),
    /// Validation passed and submission was skipped (dry run).
    Validated { collection: String, count: usize },
    PartiallyFailed {
        collection: String,
        imported: usize,
        failures: Vec<ImportFailure>,
    },
    Imported { collection: String, count: usize },
}

impl ImportReport {
    pub fn from_summary(summary: ImportSummary) -> Self {
        if summary.failures.is_empty() {
            ImportReport::Imported {
                collection: summary.collection,
                count: summary.imported,
            }
        } else {
            ImportReport::PartiallyFailed {
                collection: summary.collection,
                imported: summary.imported,
                failures: summary.failures,
            }
        }
    }

    pub fn to_message(&self) -> Message {
        match self {
            ImportReport::Rejected(failure) => Message::error(failure.message.clone()),
            ImportReport::Validated { .. } => Message::success("Data has been successfully validated"),
            ImportReport::PartiallyFailed { failures, .. } => Message::error(
                serde_json::to_string(failures)
                    .unwrap_or_else(|_| format!("{} documents failed to import", failures.len())),
            ),
            ImportReport::Imported { collection, .. } => {
                Message::redirect(format!("/collections/{}/documents", collection))
            }
        }
    }
}
