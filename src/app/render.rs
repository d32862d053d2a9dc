//! Plain-text tables for the terminal.

use crate::app::constants::{API_ACTIONS, DATA_TYPES};
use crate::domain::model::{ImportFailure, ValidationFailure};
use crate::domain::schema::{ApiKey, Collection, Override, Synonym};
use crate::utils::text::{formatted_timestamp, from_camel_to_space_separated};

/// 第一列是標題列，所以行號為索引加 2
pub fn line_number(row_index: usize) -> usize {
    row_index + 2
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers
        .iter()
        .map(|header| from_camel_to_space_separated(header).to_uppercase())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.as_slice())];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

/// Validation errors keyed by the line the operator sees in the spreadsheet.
pub fn validation_errors(failure: &ValidationFailure) -> String {
    let rows: Vec<Vec<String>> = failure
        .errors
        .iter()
        .flat_map(|(index, messages)| {
            messages
                .iter()
                .map(move |message| vec![line_number(*index).to_string(), message.clone()])
        })
        .collect();
    table(&["line", "error"], &rows)
}

pub fn import_failures(failures: &[ImportFailure]) -> String {
    let rows: Vec<Vec<String>> = failures
        .iter()
        .map(|failure| {
            vec![
                line_number(failure.row).to_string(),
                failure.error.clone(),
                failure.document.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["line", "error", "document"], &rows)
}

pub fn collections(collections: &[Collection]) -> String {
    let rows: Vec<Vec<String>> = collections
        .iter()
        .map(|collection| {
            vec![
                collection.name.clone(),
                collection.fields.len().to_string(),
                collection
                    .num_documents
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
                collection.default_sorting_field.clone().unwrap_or_default(),
                collection
                    .created_at
                    .map(formatted_timestamp)
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["name", "fields", "numDocuments", "defaultSortingField", "createdAt"],
        &rows,
    )
}

fn flag(value: Option<bool>) -> String {
    let text = if value.unwrap_or(false) { "yes" } else { "" };
    text.to_string()
}

pub fn collection_fields(collection: &Collection) -> String {
    let rows: Vec<Vec<String>> = collection
        .fields
        .iter()
        .map(|field| {
            vec![
                field.name.clone(),
                field.field_type.to_string(),
                flag(Some(field.optional)),
                flag(field.facet),
                field.locale.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["name", "type", "optional", "facet", "locale"], &rows)
}

pub fn field_types() -> String {
    let rows: Vec<Vec<String>> = DATA_TYPES
        .iter()
        .map(|choice| vec![choice.value.to_string(), choice.label.to_string()])
        .collect();
    table(&["type", "description"], &rows)
}

pub fn api_actions() -> String {
    API_ACTIONS
        .iter()
        .map(|(group, actions)| {
            let rows: Vec<Vec<String>> = actions
                .iter()
                .map(|choice| vec![choice.value.to_string(), choice.label.to_string()])
                .collect();
            format!("{}\n{}", group, table(&["action", "description"], &rows))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn synonyms(synonyms: &[Synonym]) -> String {
    let rows: Vec<Vec<String>> = synonyms
        .iter()
        .map(|synonym| {
            vec![
                synonym.id.clone().unwrap_or_default(),
                synonym.root.clone().unwrap_or_default(),
                synonym.synonyms.join(", "),
            ]
        })
        .collect();
    table(&["id", "root", "synonyms"], &rows)
}

pub fn overrides(overrides: &[Override]) -> String {
    let rows: Vec<Vec<String>> = overrides
        .iter()
        .map(|curation| {
            vec![
                curation.id.clone().unwrap_or_default(),
                curation.rule.query.clone().unwrap_or_default(),
                curation.rule.filter_by.clone().unwrap_or_default(),
                curation
                    .includes
                    .as_ref()
                    .map(|pinned| pinned.len().to_string())
                    .unwrap_or_default(),
                curation
                    .excludes
                    .as_ref()
                    .map(|hidden| hidden.len().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table(&["id", "query", "filterBy", "pinned", "hidden"], &rows)
}

pub fn api_keys(keys: &[ApiKey]) -> String {
    let rows: Vec<Vec<String>> = keys
        .iter()
        .map(|key| {
            vec![
                key.id.map(|id| id.to_string()).unwrap_or_default(),
                key.value_prefix.clone().unwrap_or_default(),
                key.description.clone(),
                key.actions.join(", "),
                key.collections.join(", "),
                key.expires_at.map(formatted_timestamp).unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["id", "valuePrefix", "description", "actions", "collections", "expiresAt"],
        &rows,
    )
}

pub fn metrics(metrics: &[(String, String)]) -> String {
    let rows: Vec<Vec<String>> = metrics
        .iter()
        .map(|(label, value)| vec![label.clone(), value.clone()])
        .collect();
    table(&["metric", "value"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RowErrorMap;

    #[test]
    fn test_validation_errors_use_spreadsheet_lines() {
        let mut errors = RowErrorMap::new();
        errors.insert(0, vec!["price: Expected number, received nan".to_string()]);
        errors.insert(3, vec!["name: Required".to_string(), "price: Required".to_string()]);
        let failure = ValidationFailure {
            message: "Data validation failed".to_string(),
            errors,
        };

        let rendered = validation_errors(&failure);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("LINE"));
        assert!(lines[1].starts_with("2 "));
        assert!(lines[1].ends_with("price: Expected number, received nan"));
        assert!(lines[2].starts_with("5 "));
        assert!(lines[3].starts_with("5 "));
    }

    #[test]
    fn test_headers_are_space_separated() {
        let rendered = collections(&[]);
        assert_eq!(
            rendered,
            "NAME  FIELDS  NUM DOCUMENTS  DEFAULT SORTING FIELD  CREATED AT"
        );
    }

    #[test]
    fn test_api_actions_lists_every_group() {
        let rendered = api_actions();
        for (group, _) in API_ACTIONS.iter() {
            assert!(rendered.contains(group));
        }
        assert!(rendered.contains("documents:import"));
    }
}
