use crate::adapters::typesense::TypesenseClient;
use crate::app::actions::{failure, respond};
use crate::app::constants::is_api_action;
use crate::domain::schema::ApiKey;
use crate::utils::message::Message;
use crate::utils::validation::FieldErrors;
use chrono::Utc;
use serde::Deserialize;

pub const ALL_COLLECTIONS: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiKeyForm {
    pub description: String,
    pub actions: Vec<String>,
    pub collections: Vec<String>,
    /// Unix seconds
    pub expires_at: i64,
    pub autodelete: bool,
}

pub fn validate_api_key(form: &ApiKeyForm, now: i64) -> FieldErrors {
    let mut errors = FieldErrors::new();

    errors.check_length(
        "description",
        &form.description,
        (5, "Provide minimum 5 characters description."),
        (155, "Description should not be more than 155 characters."),
    );

    if form.actions.is_empty() {
        errors.add("actions", "Select at least one action.");
    }
    for action in form.actions.iter().filter(|action| !is_api_action(action)) {
        errors.add("actions", format!("Unknown action '{}'", action));
    }

    if form.expires_at <= now {
        errors.add("expires_at", "Expiration date must be in the future.");
    }

    errors
}

impl ApiKeyForm {
    /// 未指定集合時允許存取所有集合
    pub fn into_api_key(self) -> ApiKey {
        let collections = if self.collections.is_empty() {
            vec![ALL_COLLECTIONS.to_string()]
        } else {
            self.collections
        };

        ApiKey {
            id: None,
            value: None,
            value_prefix: None,
            description: self.description,
            actions: self.actions,
            collections,
            expires_at: Some(self.expires_at),
            autodelete: Some(self.autodelete),
        }
    }
}

/// The created key carries its full value, which the service only returns once.
pub async fn create_api_key(
    client: &TypesenseClient,
    form: ApiKeyForm,
) -> std::result::Result<ApiKey, Message> {
    let errors = validate_api_key(&form, Utc::now().timestamp());
    if !errors.is_empty() {
        return Err(Message::error(errors.to_json()));
    }

    let created = client
        .create_key(&form.into_api_key())
        .await
        .map_err(failure)?;
    tracing::info!("Created API key {:?}", created.id);
    Ok(created)
}

pub async fn delete_api_key(client: &TypesenseClient, id: Option<u64>) -> Message {
    let Some(id) = id else {
        return Message::error("API Key ID is required");
    };

    respond(
        client
            .delete_key(id)
            .await
            .map(|deleted| Message::success(format!("API key {} successfully deleted", deleted))),
    )
}
