use crate::domain::model::{FieldDefinition, ImportResult, ValidatedRecord};
use crate::domain::ports::ConfigProvider;
use crate::domain::schema::{
    ApiKey, Collection, DeletedResource, Health, Override, SearchQuery, SearchResponse, Synonym,
};
use crate::utils::error::{AdminError, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// 批次匯入時遇到相同 id 的文件直接覆蓋
const IMPORT_ACTION: &str = "upsert";

#[derive(Serialize, Deserialize)]
struct FieldsPayload {
    fields: Vec<FieldDefinition>,
}

#[derive(Deserialize)]
struct SynonymList {
    synonyms: Vec<Synonym>,
}

#[derive(Deserialize)]
struct OverrideList {
    overrides: Vec<Override>,
}

#[derive(Deserialize)]
struct KeyList {
    keys: Vec<ApiKey>,
}

#[derive(Deserialize)]
struct DeletedKey {
    id: u64,
}

/// HTTP client for the search service's REST API.
#[derive(Debug, Clone)]
pub struct TypesenseClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl TypesenseClient {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| AdminError::InvalidConfigValueError {
            field: "service.url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AdminError::InvalidConfigValueError {
                field: "service.url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.service_url(), config.api_key(), config.timeout_seconds())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// 非 2xx 回應轉成 ServiceError，盡量保留服務回傳的 message
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("Search service response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unexpected response").to_string()
                } else {
                    body.trim().to_string()
                }
            });

        Err(AdminError::ServiceError {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn health(&self) -> Result<Health> {
        self.send(self.request(Method::GET, &["health"])).await
    }

    pub async fn metrics(&self) -> Result<Map<String, Value>> {
        self.send(self.request(Method::GET, &["metrics.json"])).await
    }

    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.send(self.request(Method::GET, &["collections"])).await
    }

    pub async fn get_collection(&self, name: &str) -> Result<Collection> {
        self.send(self.request(Method::GET, &["collections", name]))
            .await
    }

    pub async fn create_collection(&self, collection: &Collection) -> Result<Collection> {
        self.send(self.request(Method::POST, &["collections"]).json(collection))
            .await
    }

    pub async fn update_collection(
        &self,
        name: &str,
        fields: &[FieldDefinition],
    ) -> Result<Vec<FieldDefinition>> {
        let payload = FieldsPayload {
            fields: fields.to_vec(),
        };
        let updated: FieldsPayload = self
            .send(
                self.request(Method::PATCH, &["collections", name])
                    .json(&payload),
            )
            .await?;
        Ok(updated.fields)
    }

    pub async fn delete_collection(&self, name: &str) -> Result<Collection> {
        self.send(self.request(Method::DELETE, &["collections", name]))
            .await
    }

    pub async fn upsert_document(
        &self,
        collection: &str,
        document: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        self.send(
            self.request(Method::POST, &["collections", collection, "documents"])
                .query(&[("action", IMPORT_ACTION)])
                .json(document),
        )
        .await
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<Map<String, Value>> {
        self.send(self.request(
            Method::DELETE,
            &["collections", collection, "documents", id],
        ))
        .await
    }

    pub async fn search_documents(
        &self,
        collection: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse> {
        self.send(
            self.request(
                Method::GET,
                &["collections", collection, "documents", "search"],
            )
            .query(query),
        )
        .await
    }

    /// 以 JSON Lines 送出整批文件；回應的每一行依位置對應送出的文件
    pub async fn import_documents(
        &self,
        collection: &str,
        records: &[ValidatedRecord],
    ) -> Result<Vec<ImportResult>> {
        let body = records
            .iter()
            .map(|record| serde_json::to_string(&record.document))
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join("\n");

        tracing::debug!(
            "Importing {} documents into '{}' ({} bytes)",
            records.len(),
            collection,
            body.len()
        );

        let request = self
            .request(
                Method::POST,
                &["collections", collection, "documents", "import"],
            )
            .query(&[("action", IMPORT_ACTION)])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body);

        let response = Self::check(request.send().await?).await?;
        let text = response.text().await?;

        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<ImportResult>(line).map_err(AdminError::from))
            .collect()
    }

    pub async fn list_synonyms(&self, collection: &str) -> Result<Vec<Synonym>> {
        let list: SynonymList = self
            .send(self.request(Method::GET, &["collections", collection, "synonyms"]))
            .await?;
        Ok(list.synonyms)
    }

    pub async fn get_synonym(&self, collection: &str, id: &str) -> Result<Synonym> {
        self.send(self.request(
            Method::GET,
            &["collections", collection, "synonyms", id],
        ))
        .await
    }

    pub async fn upsert_synonym(
        &self,
        collection: &str,
        id: &str,
        synonym: &Synonym,
    ) -> Result<Synonym> {
        self.send(
            self.request(Method::PUT, &["collections", collection, "synonyms", id])
                .json(synonym),
        )
        .await
    }

    pub async fn delete_synonym(&self, collection: &str, id: &str) -> Result<DeletedResource> {
        self.send(self.request(
            Method::DELETE,
            &["collections", collection, "synonyms", id],
        ))
        .await
    }

    pub async fn list_overrides(&self, collection: &str) -> Result<Vec<Override>> {
        let list: OverrideList = self
            .send(self.request(Method::GET, &["collections", collection, "overrides"]))
            .await?;
        Ok(list.overrides)
    }

    pub async fn get_override(&self, collection: &str, id: &str) -> Result<Override> {
        self.send(self.request(
            Method::GET,
            &["collections", collection, "overrides", id],
        ))
        .await
    }

    pub async fn upsert_override(
        &self,
        collection: &str,
        id: &str,
        curation: &Override,
    ) -> Result<Override> {
        self.send(
            self.request(Method::PUT, &["collections", collection, "overrides", id])
                .json(curation),
        )
        .await
    }

    pub async fn delete_override(&self, collection: &str, id: &str) -> Result<DeletedResource> {
        self.send(self.request(
            Method::DELETE,
            &["collections", collection, "overrides", id],
        ))
        .await
    }

    pub async fn list_keys(&self) -> Result<Vec<ApiKey>> {
        let list: KeyList = self.send(self.request(Method::GET, &["keys"])).await?;
        Ok(list.keys)
    }

    pub async fn get_key(&self, id: u64) -> Result<ApiKey> {
        self.send(self.request(Method::GET, &["keys", &id.to_string()]))
            .await
    }

    pub async fn create_key(&self, key: &ApiKey) -> Result<ApiKey> {
        self.send(self.request(Method::POST, &["keys"]).json(key))
            .await
    }

    pub async fn delete_key(&self, id: u64) -> Result<u64> {
        let deleted: DeletedKey = self
            .send(self.request(Method::DELETE, &["keys", &id.to_string()]))
            .await?;
        Ok(deleted.id)
    }
}
