use crate::adapters::typesense::TypesenseClient;
use crate::core::reader::{read_rows, UploadedFile};
use crate::core::validator::{build_strict_validator, build_validator, Validator};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    ImportSummary, RowErrorMap, RowRecord, ValidatedRecord, Validation, ValidationFailure,
};
use crate::utils::error::{AdminError, Result};
use std::path::Path;

pub const EMPTY_UPLOAD_MESSAGE: &str = "At least one document is required.";
pub const INVALID_ROWS_MESSAGE: &str = "Data validation failed";

/// 每一列獨立驗證；只要有一列失敗，整批都不送出
pub fn validate_rows(rows: &[RowRecord], validator: &Validator) -> Validation {
    if rows.is_empty() {
        return Validation::Invalid(ValidationFailure {
            message: EMPTY_UPLOAD_MESSAGE.to_string(),
            errors: RowErrorMap::new(),
        });
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut errors = RowErrorMap::new();

    for (row, record) in rows.iter().enumerate() {
        match validator.validate_row(record) {
            Ok(document) => records.push(ValidatedRecord { row, document }),
            Err(messages) => {
                tracing::debug!("Row {} failed validation: {:?}", row, messages);
                errors.insert(row, messages);
            }
        }
    }

    if errors.is_empty() {
        Validation::Valid(records)
    } else {
        Validation::Invalid(ValidationFailure {
            message: INVALID_ROWS_MESSAGE.to_string(),
            errors,
        })
    }
}

/// Reads one uploaded file, validates it against a collection's schema and
/// bulk-upserts the result.
pub struct BulkImportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: TypesenseClient,
    collection: String,
    file_path: String,
}

impl<S: Storage, C: ConfigProvider> BulkImportPipeline<S, C> {
    pub fn new(storage: S, config: C, collection: &str, file_path: &str) -> Result<Self> {
        let client = TypesenseClient::from_config(&config)?;
        Ok(Self {
            storage,
            config,
            client,
            collection: collection.to_string(),
            file_path: file_path.to_string(),
        })
    }

    fn file_name(&self) -> String {
        Path::new(&self.file_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file_path)
            .to_string()
    }

    async fn validator(&self) -> Result<Validator> {
        let collection = self.client.get_collection(&self.collection).await?;
        tracing::debug!(
            "Collection '{}' defines {} fields",
            collection.name,
            collection.fields.len()
        );

        if self.config.strict_types() {
            build_strict_validator(&collection.fields)
        } else {
            Ok(build_validator(&collection.fields))
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BulkImportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RowRecord>> {
        tracing::debug!("Reading upload from: {}", self.file_path);
        let bytes = self.storage.read_file(&self.file_path).await?;

        let limit = self.config.max_file_size_bytes();
        if bytes.len() > limit {
            return Err(AdminError::FileTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        read_rows(&[UploadedFile::new(self.file_name(), bytes)])
    }

    async fn transform(&self, rows: Vec<RowRecord>) -> Result<Validation> {
        // 空檔案不必查詢 schema
        if rows.is_empty() {
            return Ok(validate_rows(&rows, &Validator::default()));
        }

        let validator = self.validator().await?;
        Ok(validate_rows(&rows, &validator))
    }

    async fn load(&self, records: Vec<ValidatedRecord>) -> Result<ImportSummary> {
        let results = self
            .client
            .import_documents(&self.collection, &records)
            .await?;

        if results.len() != records.len() {
            tracing::warn!(
                "Search service returned {} results for {} documents",
                results.len(),
                records.len()
            );
        }

        Ok(ImportSummary::from_results(
            &self.collection,
            &records,
            results,
        ))
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FieldDefinition;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn add_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AdminError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path),
                ))
            })
        }
    }

    struct MockConfig {
        service_url: String,
        max_file_size_bytes: usize,
        strict_types: bool,
    }

    impl MockConfig {
        fn new(service_url: String) -> Self {
            Self {
                service_url,
                max_file_size_bytes: 1024 * 1024,
                strict_types: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn service_url(&self) -> &str {
            &self.service_url
        }

        fn api_key(&self) -> &str {
            "secret"
        }

        fn timeout_seconds(&self) -> u64 {
            5
        }

        fn max_file_size_bytes(&self) -> usize {
            self.max_file_size_bytes
        }

        fn strict_types(&self) -> bool {
            self.strict_types
        }
    }

    fn row(value: Value) -> RowRecord {
        value.as_object().cloned().unwrap()
    }

    fn product_fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", "string"),
            FieldDefinition::new("price", "float"),
        ]
    }

    fn schema_response() -> Value {
        json!({
            "name": "products",
            "fields": [
                {"name": "name", "type": "string"},
                {"name": "price", "type": "float"}
            ]
        })
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        let validator = build_validator(&product_fields());
        match validate_rows(&[], &validator) {
            Validation::Invalid(failure) => {
                assert_eq!(failure.message, "At least one document is required.");
                assert!(failure.errors.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let validator = build_validator(&product_fields());
        let rows = vec![row(json!({"name": "Widget", "price": "12.5"}))];

        match validate_rows(&rows, &validator) {
            Validation::Valid(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].document["price"], json!(12.5));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_price_fails_row_zero() {
        let validator = build_validator(&product_fields());
        let rows = vec![row(json!({"name": "Widget", "price": "abc"}))];

        match validate_rows(&rows, &validator) {
            Validation::Invalid(failure) => {
                assert_eq!(failure.errors.len(), 1);
                assert_eq!(
                    failure.errors[&0],
                    vec!["price: Expected number, received nan".to_string()]
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_single_bad_row_rejects_whole_batch() {
        let validator = build_validator(&product_fields());
        let rows = vec![
            row(json!({"name": "Widget", "price": 1})),
            row(json!({"price": 2})),
            row(json!({"name": "Gadget", "price": 3})),
        ];

        match validate_rows(&rows, &validator) {
            Validation::Invalid(failure) => {
                assert_eq!(failure.message, INVALID_ROWS_MESSAGE);
                assert_eq!(failure.errors.keys().copied().collect::<Vec<_>>(), vec![1]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_every_row_is_accounted_for() {
        let validator = build_validator(&product_fields());
        let rows: Vec<RowRecord> = (0..10)
            .map(|i| {
                if i % 3 == 0 {
                    row(json!({"name": "Broken"}))
                } else {
                    row(json!({"name": "Item", "price": i}))
                }
            })
            .collect();

        let Validation::Invalid(failure) = validate_rows(&rows, &validator) else {
            panic!("expected failures");
        };
        let passing = rows
            .iter()
            .filter(|r| validator.validate_row(r).is_ok())
            .count();
        assert_eq!(failure.errors.len() + passing, rows.len());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = build_validator(&product_fields());
        let rows = vec![
            row(json!({"name": "Widget", "price": "12.5"})),
            row(json!({"name": "Gadget", "price": 3})),
        ];

        let Validation::Valid(first) = validate_rows(&rows, &validator) else {
            panic!("expected success");
        };
        let again: Vec<RowRecord> = first.iter().map(|r| r.document.clone()).collect();
        let Validation::Valid(second) = validate_rows(&again, &validator) else {
            panic!("expected success");
        };
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_extract_reads_csv_upload() {
        let storage = MockStorage::new();
        storage
            .add_file("uploads/products.csv", b"Name,Price\nWidget,12.5\n")
            .await;
        let config = MockConfig::new("http://localhost:8108".to_string());
        let pipeline =
            BulkImportPipeline::new(storage, config, "products", "uploads/products.csv").unwrap();

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Widget"));
        assert_eq!(pipeline.collection(), "products");
    }

    #[tokio::test]
    async fn test_extract_rejects_oversized_upload() {
        let storage = MockStorage::new();
        storage.add_file("big.json", &[b' '; 64]).await;
        let mut config = MockConfig::new("http://localhost:8108".to_string());
        config.max_file_size_bytes = 16;
        let pipeline = BulkImportPipeline::new(storage, config, "products", "big.json").unwrap();

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AdminError::FileTooLarge { size: 64, limit: 16 }));
    }

    #[tokio::test]
    async fn test_transform_uses_collection_schema() {
        let server = MockServer::start_async().await;
        let schema_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/products");
                then.status(200).json_body(schema_response());
            })
            .await;

        let config = MockConfig::new(server.base_url());
        let pipeline =
            BulkImportPipeline::new(MockStorage::new(), config, "products", "p.json").unwrap();

        let validation = pipeline
            .transform(vec![row(json!({"id": 7, "name": "Widget", "price": "2"}))])
            .await
            .unwrap();

        schema_mock.assert_async().await;
        let Validation::Valid(records) = validation else {
            panic!("expected success");
        };
        assert_eq!(
            Value::Object(records[0].document.clone()),
            json!({"id": "7", "name": "Widget", "price": 2.0})
        );
    }

    #[tokio::test]
    async fn test_transform_strict_mode_rejects_unknown_types() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/products");
                then.status(200).json_body(json!({
                    "name": "products",
                    "fields": [{"name": "embedding", "type": "float64[]"}]
                }));
            })
            .await;

        let mut config = MockConfig::new(server.base_url());
        config.strict_types = true;
        let pipeline =
            BulkImportPipeline::new(MockStorage::new(), config, "products", "p.json").unwrap();

        let err = pipeline
            .transform(vec![row(json!({"embedding": [1.0]}))])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownFieldType { .. }));
    }

    #[tokio::test]
    async fn test_load_reports_rejected_documents() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/products/documents/import")
                    .query_param("action", "upsert");
                then.status(200).body(
                    "{\"success\":true}\n{\"success\":false,\"error\":\"Field `price` must be a float.\"}",
                );
            })
            .await;

        let config = MockConfig::new(server.base_url());
        let pipeline =
            BulkImportPipeline::new(MockStorage::new(), config, "products", "p.json").unwrap();
        let records = vec![
            ValidatedRecord {
                row: 0,
                document: row(json!({"name": "Widget"})),
            },
            ValidatedRecord {
                row: 1,
                document: row(json!({"name": "Gadget"})),
            },
        ];

        let summary = pipeline.load(records).await.unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].row, 1);
    }
}
