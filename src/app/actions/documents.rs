use crate::adapters::typesense::TypesenseClient;
use crate::app::actions::{failure, respond, INVALID_DATA_MESSAGE};
use crate::core::engine::ImportEngine;
use crate::core::validator::{build_strict_validator, build_validator, DOCUMENT_ID};
use crate::core::Pipeline;
use crate::domain::model::{ImportReport, RowRecord};
use crate::domain::schema::SearchQuery;
use crate::utils::error::Result;
use crate::utils::message::Message;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn documents_path(collection: &str) -> String {
    format!("/collections/{}/documents", collection)
}

/// 轉址時附帶要顯示的訊息
fn documents_path_with(collection: &str, message: &Message) -> Result<String> {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("message", &serde_json::to_string(message)?)
        .finish();
    Ok(format!("{}?{}", documents_path(collection), query))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpload {
    pub message: Message,
    /// `None` when the upload failed before a report could be produced
    pub report: Option<ImportReport>,
}

pub async fn upload_bulk_documents<P: Pipeline>(engine: &ImportEngine<P>) -> BulkUpload {
    match engine.run().await {
        Ok(report) => BulkUpload {
            message: report.to_message(),
            report: Some(report),
        },
        Err(err) => BulkUpload {
            message: failure(err),
            report: None,
        },
    }
}

/// 單筆新增或更新，先以集合的 schema 驗證
pub async fn create_document(
    client: &TypesenseClient,
    collection: &str,
    values: &RowRecord,
    strict_types: bool,
) -> Message {
    respond(submit_document(client, collection, values, strict_types).await)
}

async fn submit_document(
    client: &TypesenseClient,
    collection: &str,
    values: &RowRecord,
    strict_types: bool,
) -> Result<Message> {
    let schema = client.get_collection(collection).await?;
    let validator = if strict_types {
        build_strict_validator(&schema.fields)?
    } else {
        build_validator(&schema.fields)
    };

    let document = match validator.validate_row(values) {
        Ok(document) => document,
        Err(errors) => {
            tracing::debug!("Document rejected: {:?}", errors);
            return Ok(Message::error(INVALID_DATA_MESSAGE));
        }
    };

    let saved = client.upsert_document(collection, &document).await?;
    let saved_id = saved.get(DOCUMENT_ID).cloned().unwrap_or_default();
    tracing::info!("Saved document {} in '{}'", saved_id, collection);

    let saved_message = Message::success("Documents successfully saved");
    Ok(Message::redirect(documents_path_with(
        collection,
        &saved_message,
    )?))
}

pub async fn delete_document(client: &TypesenseClient, collection: &str, id: &str) -> Message {
    respond(
        client
            .delete_document(collection, id)
            .await
            .map(|_| Message::success("Documents successfully deleted")),
    )
}

/// Picker entry for pinning or hiding documents in a curation rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentOption {
    pub value: String,
    pub label: String,
    pub document: Map<String, Value>,
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 前綴搜尋；任何失敗都回傳空清單
pub async fn search_documents(
    client: &TypesenseClient,
    collection: &str,
    q: &str,
    query_by: &str,
) -> Vec<DocumentOption> {
    let query = SearchQuery {
        q: format!("{}*", q),
        query_by: query_by.to_string(),
        page: None,
        per_page: None,
    };

    let response = match client.search_documents(collection, &query).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("Document search in '{}' failed: {}", collection, err);
            return Vec::new();
        }
    };

    if response.found == 0 {
        return Vec::new();
    }

    let label_field = query_by.split(',').next().unwrap_or_default().trim();
    response
        .hits
        .into_iter()
        .map(|hit| DocumentOption {
            value: display(hit.document.get(DOCUMENT_ID)),
            label: display(hit.document.get(label_field)),
            document: hit.document,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::message::MessageKind;
    use httpmock::prelude::*;
    use serde_json::json;

    async fn schema_server() -> MockServer {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/products");
                then.status(200).json_body(json!({
                    "name": "products",
                    "fields": [
                        {"name": "name", "type": "string"},
                        {"name": "price", "type": "float"}
                    ]
                }));
            })
            .await;
        server
    }

    fn values(value: Value) -> RowRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_document_coerces_and_redirects() {
        let server = schema_server().await;
        let upsert_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/products/documents")
                    .query_param("action", "upsert")
                    .json_body(json!({"id": "42", "name": "Widget", "price": 12.5}));
                then.status(201)
                    .json_body(json!({"id": "42", "name": "Widget", "price": 12.5}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = create_document(
            &client,
            "products",
            &values(json!({"id": 42, "name": "Widget", "price": "12.5"})),
            false,
        )
        .await;

        upsert_mock.assert_async().await;
        assert_eq!(message.kind, MessageKind::Redirect);
        assert!(message.message.starts_with("/collections/products/documents?message="));
        assert!(message.message.contains("Documents+successfully+saved"));
    }

    #[tokio::test]
    async fn test_invalid_document_is_not_sent() {
        let server = schema_server().await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = create_document(
            &client,
            "products",
            &values(json!({"name": "Widget", "price": "abc"})),
            false,
        )
        .await;

        assert_eq!(message, Message::error(INVALID_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/products/documents/42");
                then.status(200).json_body(json!({"id": "42"}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = delete_document(&client, "products", "42").await;
        assert_eq!(message, Message::success("Documents successfully deleted"));
    }

    #[tokio::test]
    async fn test_search_maps_hits_to_options() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/collections/products/documents/search")
                    .query_param("q", "wid*")
                    .query_param("query_by", "name,description");
                then.status(200).json_body(json!({
                    "found": 1,
                    "hits": [{"document": {"id": "1", "name": "Widget"}}]
                }));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let options = search_documents(&client, "products", "wid", "name,description").await;

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "1");
        assert_eq!(options[0].label, "Widget");
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/products/documents/search");
                then.status(500).body("boom");
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        assert!(search_documents(&client, "products", "wid", "name")
            .await
            .is_empty());
    }
}
