use crate::adapters::typesense::TypesenseClient;
use crate::app::actions::{respond, INVALID_DATA_MESSAGE};
use crate::domain::schema::{HiddenDocument, MatchMode, Override, OverrideRule, PinnedDocument};
use crate::utils::error::{AdminError, Result};
use crate::utils::message::Message;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinEntry {
    pub id: String,
    /// 表單上輸入的位置（文字）
    pub position: String,
}

/// Curation form as filled in by the operator.
///
/// The boolean switches only control which parts end up in the payload;
/// values behind a switch that is off are discarded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverrideForm {
    pub id: Option<String>,

    pub curate_by_query: bool,
    pub query: String,
    #[serde(rename = "match")]
    pub match_mode: Option<MatchMode>,
    pub curate_by_filter: bool,
    pub rule_filter_by: String,
    pub curate_by_tags: bool,
    pub tags: Vec<String>,

    pub pin_documents: bool,
    pub includes: Vec<PinEntry>,
    pub hide_documents: bool,
    pub excludes: Vec<String>,
    pub filter_documents: bool,
    pub filter_by: String,
    pub sort_documents: bool,
    pub sort_by: String,
    pub replace_documents: bool,
    pub replace_query: String,
    pub custom_metadata: bool,
    pub metadata: String,

    pub remove_matched_tokens: bool,
    pub filter_curated_hits: bool,
    pub stop_processing: bool,

    pub effective_from: bool,
    pub effective_from_ts: String,
    pub effective_to: bool,
    pub effective_to_ts: String,
}

fn invalid(field: &str, reason: impl Into<String>) -> AdminError {
    AdminError::ValidationError {
        message: format!("{}: {}", field, reason.into()),
    }
}

fn parse_timestamp(field: &str, text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| invalid(field, "Expected a unix timestamp"))
}

impl OverrideForm {
    /// 依開關組出送給服務的內容
    pub fn into_override(self) -> Result<Override> {
        let rule = OverrideRule {
            query: self.curate_by_query.then(|| self.query.clone()),
            match_mode: if self.curate_by_query {
                Some(self.match_mode.unwrap_or(MatchMode::Exact))
            } else {
                None
            },
            filter_by: self.curate_by_filter.then(|| self.rule_filter_by.clone()),
            tags: self.curate_by_tags.then(|| self.tags.clone()),
        };

        let includes = if self.pin_documents {
            let pinned = self
                .includes
                .iter()
                .map(|entry| -> Result<PinnedDocument> {
                    let position = entry
                        .position
                        .trim()
                        .parse()
                        .map_err(|_| invalid("includes", "Position must be a number"))?;
                    Ok(PinnedDocument {
                        id: entry.id.clone(),
                        position,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Some(pinned)
        } else {
            None
        };

        let excludes = self.hide_documents.then(|| {
            self.excludes
                .iter()
                .map(|id| HiddenDocument { id: id.clone() })
                .collect()
        });

        let metadata = if self.custom_metadata {
            match serde_json::from_str::<Value>(&self.metadata) {
                Ok(Value::Object(map)) => Some(map),
                _ => return Err(invalid("metadata", "Expected a JSON object")),
            }
        } else {
            None::<Map<String, Value>>
        };

        let effective_from_ts = if self.effective_from {
            Some(parse_timestamp("effective_from_ts", &self.effective_from_ts)?)
        } else {
            None
        };
        let effective_to_ts = if self.effective_to {
            Some(parse_timestamp("effective_to_ts", &self.effective_to_ts)?)
        } else {
            None
        };

        Ok(Override {
            id: self.id.filter(|id| !id.is_empty()),
            rule,
            includes,
            excludes,
            filter_by: self.filter_documents.then_some(self.filter_by),
            sort_by: self.sort_documents.then_some(self.sort_by),
            replace_query: self.replace_documents.then_some(self.replace_query),
            metadata,
            remove_matched_tokens: Some(self.remove_matched_tokens),
            filter_curated_hits: Some(self.filter_curated_hits),
            stop_processing: Some(self.stop_processing),
            effective_from_ts,
            effective_to_ts,
        })
    }
}

pub async fn upsert_override(
    client: &TypesenseClient,
    collection: &str,
    form: OverrideForm,
) -> Message {
    respond(submit_override(client, collection, form).await)
}

async fn submit_override(
    client: &TypesenseClient,
    collection: &str,
    form: OverrideForm,
) -> Result<Message> {
    let curation = match form.into_override() {
        Ok(curation) => curation,
        Err(err) => {
            tracing::debug!("Override rejected: {}", err);
            return Ok(Message::error(INVALID_DATA_MESSAGE));
        }
    };

    let id = curation
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    client.upsert_override(collection, &id, &curation).await?;
    tracing::info!("Saved override '{}' in '{}'", id, collection);
    Ok(Message::success("Overrides successfully saved"))
}

pub async fn delete_override(client: &TypesenseClient, collection: &str, id: &str) -> Message {
    respond(
        client
            .delete_override(collection, id)
            .await
            .map(|_| Message::success("Overrides successfully deleted")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn form() -> OverrideForm {
        OverrideForm {
            id: Some("apple-promo".to_string()),
            curate_by_query: true,
            query: "apple".to_string(),
            match_mode: Some(MatchMode::Contains),
            curate_by_tags: false,
            tags: vec!["ignored".to_string()],
            pin_documents: true,
            includes: vec![PinEntry {
                id: "422".to_string(),
                position: "1".to_string(),
            }],
            hide_documents: false,
            excludes: vec!["287".to_string()],
            sort_documents: true,
            sort_by: "price:asc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_switched_off_parts_are_stripped() {
        let curation = form().into_override().unwrap();

        assert_eq!(curation.rule.query.as_deref(), Some("apple"));
        assert_eq!(curation.rule.match_mode, Some(MatchMode::Contains));
        assert!(curation.rule.tags.is_none());
        assert!(curation.rule.filter_by.is_none());
        assert_eq!(
            curation.includes,
            Some(vec![PinnedDocument {
                id: "422".to_string(),
                position: 1
            }])
        );
        assert!(curation.excludes.is_none());
        assert_eq!(curation.sort_by.as_deref(), Some("price:asc"));
        assert!(curation.metadata.is_none());
        assert!(curation.effective_from_ts.is_none());
    }

    #[test]
    fn test_text_inputs_are_parsed() {
        let mut with_extras = form();
        with_extras.custom_metadata = true;
        with_extras.metadata = r#"{"banner": "apple-sale"}"#.to_string();
        with_extras.effective_from = true;
        with_extras.effective_from_ts = "1700000000".to_string();

        let curation = with_extras.into_override().unwrap();

        assert_eq!(
            curation.metadata.map(Value::Object),
            Some(json!({"banner": "apple-sale"}))
        );
        assert_eq!(curation.effective_from_ts, Some(1_700_000_000));
    }

    #[test]
    fn test_bad_text_inputs_are_rejected() {
        let mut bad_position = form();
        bad_position.includes[0].position = "first".to_string();
        assert!(bad_position.into_override().is_err());

        let mut bad_metadata = form();
        bad_metadata.custom_metadata = true;
        bad_metadata.metadata = "[1, 2]".to_string();
        assert!(bad_metadata.into_override().is_err());
    }

    #[tokio::test]
    async fn test_upsert_override() {
        let server = MockServer::start_async().await;
        let upsert_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/products/overrides/apple-promo")
                    .json_body_partial(r#"{"rule": {"query": "apple", "match": "contains"}}"#);
                then.status(200).json_body(json!({
                    "id": "apple-promo",
                    "rule": {"query": "apple", "match": "contains"}
                }));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = upsert_override(&client, "products", form()).await;

        upsert_mock.assert_async().await;
        assert_eq!(message, Message::success("Overrides successfully saved"));
    }

    #[tokio::test]
    async fn test_delete_override() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/products/overrides/apple-promo");
                then.status(200).json_body(json!({"id": "apple-promo"}));
            })
            .await;
        let client = TypesenseClient::new(&server.base_url(), "secret", 5).unwrap();

        let message = delete_override(&client, "products", "apple-promo").await;
        assert_eq!(message, Message::success("Overrides successfully deleted"));
    }
}
