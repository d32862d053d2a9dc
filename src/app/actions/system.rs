use crate::adapters::typesense::TypesenseClient;
use crate::utils::error::Result;
use crate::utils::message::Message;
use crate::utils::text::from_snake_to_sentence_case;
use serde_json::Value;

/// Words kept upper-case in metric labels.
const METRIC_ACRONYMS: [&str; 2] = ["CPU", "IO"];

/// 連線失敗也視為不穩定
pub async fn check_health(client: &TypesenseClient) -> Message {
    match client.health().await {
        Ok(health) if health.ok => Message::success("System is steady"),
        Ok(_) => Message::error("System isn't steady"),
        Err(err) => {
            tracing::warn!("Health check failed: {}", err);
            Message::error("System isn't steady")
        }
    }
}

pub fn metric_label(key: &str) -> String {
    let upper_acronyms = key
        .split('_')
        .map(|word| {
            let upper = word.to_uppercase();
            if METRIC_ACRONYMS.contains(&upper.as_str()) {
                upper
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("_");
    from_snake_to_sentence_case(&upper_acronyms, &METRIC_ACRONYMS)
}

/// Metrics as `(label, value)` pairs, sorted by key.
pub async fn metrics(client: &TypesenseClient) -> Result<Vec<(String, String)>> {
    let metrics = client.metrics().await?;
    Ok(metrics
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (metric_label(&key), value)
        })
        .collect())
}
