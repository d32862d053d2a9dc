use crate::adapters::typesense::TypesenseClient;
use crate::app::actions::respond;
use crate::app::constants::is_supported_locale;
use crate::domain::model::FieldDefinition;
use crate::domain::schema::Collection;
use crate::utils::error::Result;
use crate::utils::message::Message;
use crate::utils::validation::FieldErrors;

pub const COLLECTIONS_PATH: &str = "/collections";

pub fn validate_fields(fields: &[FieldDefinition], errors: &mut FieldErrors) {
    if fields.is_empty() {
        errors.add("fields", "Add at least 1 field");
    }

    for (index, field) in fields.iter().enumerate() {
        errors.check_length(
            &format!("fields.{}.name", index),
            &field.name,
            (1, "Name must be minimum 1 characters long."),
            (36, "Name cannot be longer than 36 characters"),
        );

        if !field.field_type.is_known() {
            errors.add(&format!("fields.{}.type", index), "Select an option");
        }

        if let Some(locale) = &field.locale {
            if !is_supported_locale(locale) {
                errors.add(&format!("fields.{}.locale", index), "Select valid option");
            }
        }
    }
}

pub fn validate_collection(collection: &Collection) -> FieldErrors {
    let mut errors = FieldErrors::new();

    errors.check_length(
        "name",
        &collection.name,
        (2, "Name must be minimum 2 characters long."),
        (25, "Name cannot be longer than 25 characters"),
    );
    validate_fields(&collection.fields, &mut errors);

    if let Some(sorting_field) = collection
        .default_sorting_field
        .as_deref()
        .filter(|name| !name.is_empty())
    {
        if !collection.fields.iter().any(|field| field.name == sorting_field) {
            errors.add(
                "default_sorting_field",
                "Default sorting field must be one of the field names",
            );
        }
    }

    errors
}

pub async fn create_collection(client: &TypesenseClient, collection: &Collection) -> Message {
    respond(submit_collection(client, collection).await)
}

async fn submit_collection(client: &TypesenseClient, collection: &Collection) -> Result<Message> {
    validate_collection(collection).into_result()?;
    let created = client.create_collection(collection).await?;
    tracing::info!(
        "Created collection '{}' with {} fields",
        created.name,
        created.fields.len()
    );
    Ok(Message::redirect(COLLECTIONS_PATH))
}

/// 只更新欄位定義（新增或 `drop`）
pub async fn update_collection(
    client: &TypesenseClient,
    name: &str,
    fields: &[FieldDefinition],
) -> Message {
    respond(submit_fields(client, name, fields).await)
}

async fn submit_fields(
    client: &TypesenseClient,
    name: &str,
    fields: &[FieldDefinition],
) -> Result<Message> {
    let mut errors = FieldErrors::new();
    validate_fields(fields, &mut errors);
    errors.into_result()?;

    let updated = client.update_collection(name, fields).await?;
    tracing::info!("Updated {} fields on collection '{}'", updated.len(), name);
    Ok(Message::redirect(COLLECTIONS_PATH))
}

pub async fn delete_collection(client: &TypesenseClient, name: &str) -> Message {
    respond(
        client
            .delete_collection(name)
            .await
            .map(|deleted| Message::success(format!("Collection '{}' successfully deleted", deleted.name))),
    )
}
