use crate::adapters::typesense::TypesenseClient;
use crate::app::actions::{respond, INVALID_DATA_MESSAGE};
use crate::domain::schema::Synonym;
use crate::utils::error::Result;
use crate::utils::message::Message;
use crate::utils::validation::FieldErrors;
use uuid::Uuid;

pub fn validate_synonym(synonym: &Synonym) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if synonym.synonyms.is_empty() {
        errors.add("synonyms", "At least one synonyms needs to be added");
    }
    if synonym.synonyms.iter().any(|word| word.is_empty()) {
        errors.add("synonyms", "Synonyms is required");
    }

    errors
}

/// 沒有 id 時產生新的 id，否則覆蓋既有的同義詞
pub async fn upsert_synonym(client: &TypesenseClient, collection: &str, synonym: &Synonym) -> Message {
    respond(submit_synonym(client, collection, synonym).await)
}

async fn submit_synonym(
    client: &TypesenseClient,
    collection: &str,
    synonym: &Synonym,
) -> Result<Message> {
    let errors = validate_synonym(synonym);
    if !errors.is_empty() {
        tracing::debug!("Synonym rejected: {}", errors.to_json());
        return Ok(Message::error(INVALID_DATA_MESSAGE));
    }

    let id = synonym
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let payload = Synonym {
        id: Some(id.clone()),
        ..synonym.clone()
    };

    client.upsert_synonym(collection, &id, &payload).await?;
    tracing::info!("Saved synonym '{}' in '{}'", id, collection);
    Ok(Message::success("Synonyms successfully saved"))
}

pub async fn delete_synonym(client: &TypesenseClient, collection: &str, id: &str) -> Message {
    respond(
        client
            .delete_synonym(collection, id)
            .await
            .map(|_| Message::success("Synonyms successfully deleted")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn synonym(id: Option<&str>, words: &[&str]) -> Synonym {
        Synonym {
            id: id.map(str::to_string),
            root: None,
            synonyms: words.iter().map(|w| w.to_string()).collect(),
            locale: None,
            symbols_to_index: None,
        }
    }

    #[test]
    fn test_synonym_rules() {
        assert!(validate_synonym(&synonym(None, &["coat", "jacket"])).is_empty());
        assert!(!validate_synonym(&synonym(None, &[])).is_empty());
        assert!(!validate_synonym(&synonym(None, &["coat", ""])).is_empty());
    }

    #[tokio::test]
    async fn test_upsert_uses_given_id() {
        let server = MockServer::start_async().await;
        let upsert_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/products/synonyms/coats")
                    .json_body(json!({"id": "coats", "synonyms": ["coat", "jacket"]}));
                then.status(200)
                    .json_body(json!({"id": "coats", "synonyms": ["coat", "jacket"]}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = upsert_synonym(&client, "products", &synonym(Some("coats"), &["coat", "jacket"])).await;

        upsert_mock.assert_async().await;
        assert_eq!(message, Message::success("Synonyms successfully saved"));
    }

    #[tokio::test]
    async fn test_upsert_generates_missing_id() {
        let server = MockServer::start_async().await;
        let upsert_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path_matches(regex::Regex::new(r"^/collections/products/synonyms/[0-9a-f-]{36}$").unwrap());
                then.status(200)
                    .json_body(json!({"id": "generated", "synonyms": ["coat"]}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = upsert_synonym(&client, "products", &synonym(None, &["coat"])).await;

        upsert_mock.assert_async().await;
        assert!(!message.is_error());
    }

    #[tokio::test]
    async fn test_invalid_synonym_is_not_sent() {
        let server = MockServer::start_async().await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = upsert_synonym(&client, "products", &synonym(None, &[])).await;
        assert_eq!(message, Message::error(INVALID_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn test_delete_synonym() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/products/synonyms/coats");
                then.status(200).json_body(json!({"id": "coats"}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = delete_synonym(&client, "products", "coats").await;
        assert_eq!(message, Message::success("Synonyms successfully deleted"));
    }
}
