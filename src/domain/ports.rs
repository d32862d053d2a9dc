use crate::domain::model::{ImportSummary, RowRecord, ValidatedRecord, Validation};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn service_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn max_file_size_bytes(&self) -> usize;
    fn strict_types(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RowRecord>>;
    async fn transform(&self, rows: Vec<RowRecord>) -> Result<Validation>;
    async fn load(&self, records: Vec<ValidatedRecord>) -> Result<ImportSummary>;
    fn collection(&self) -> &str;
}
