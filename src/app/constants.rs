//! Catalogues offered by the collection and API-key forms.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

const fn choice(value: &'static str, label: &'static str) -> Choice {
    Choice { value, label }
}

pub const DATA_TYPES: [Choice; 17] = [
    choice("string", "String values"),
    choice("string[]", "Array of strings"),
    choice("int32", "Integer values up to 2,147,483,647"),
    choice("int32[]", "Array of int32"),
    choice("int64", "Integer values larger than 2,147,483,647"),
    choice("int64[]", "Array of int64"),
    choice("float", "Floating point / decimal numbers"),
    choice("float[]", "Array of floating point / decimal numbers"),
    choice("bool", "true or false"),
    choice("bool[]", "Array of booleans"),
    choice("geopoint", "Latitude and longitude specified as [lat, lng]"),
    choice(
        "geopoint[]",
        "Arrays of latitude and longitude specified as [[lat1, lng1], [lat2, lng2]]",
    ),
    choice("object", "Nested objects"),
    choice("object[]", "Arrays of nested objects"),
    choice(
        "string*",
        "Special type that automatically converts values to a string or string[]",
    ),
    choice(
        "image",
        "Special type that is used to indicate a base64 encoded string of an image used for image search",
    ),
    choice(
        "auto",
        "Special type that automatically attempts to infer the data type based on the documents added to the collection",
    ),
];

pub const LOCALES: [Choice; 9] = [
    choice("ja", "Japanese"),
    choice("zh", "Chinese"),
    choice("ko", "Korean"),
    choice("th", "Thai"),
    choice("el", "Greek"),
    choice("ru", "Russian"),
    choice("sr", "Serbian / Cyrillic"),
    choice("uk", "Ukrainian"),
    choice("be", "Belarusian"),
];

pub const API_ACTIONS: [(&str, &[Choice]); 8] = [
    (
        "Collection actions",
        &[
            choice("collections:create", "Allows a collection to be created."),
            choice("collections:delete", "Allows a collection to be deleted."),
            choice("collections:get", "Allows a collection schema to be retrieved."),
            choice("collections:list", "Allows retrieving all collection schema."),
            choice("collections:*", "Allow all kinds of collection related operations."),
        ],
    ),
    (
        "Document actions",
        &[
            choice("documents:search", "Allows only search requests."),
            choice("documents:get", "Allows fetching a single document."),
            choice("documents:create", "Allows creating documents."),
            choice("documents:upsert", "Allows upserting documents."),
            choice("documents:update", "Allows updating documents."),
            choice("documents:delete", "Allows deletion of documents."),
            choice("documents:import", "Allows import of documents in bulk."),
            choice("documents:export", "Allows export of documents in bulk."),
            choice("documents:*", "Allows all document operations."),
        ],
    ),
    (
        "Alias actions",
        &[
            choice("aliases:list", "Allows all aliases to be fetched."),
            choice("aliases:get", "Allows a single alias to be retrieved"),
            choice("aliases:create", "Allows the creation of aliases."),
            choice("aliases:delete", "Allows the deletion of aliases."),
            choice("aliases:*", "Allows all alias operations."),
        ],
    ),
    (
        "Synonym actions",
        &[
            choice("synonyms:list", "Allows all synonyms to be fetched."),
            choice("synonyms:get", "Allows a single synonym to be retrieved"),
            choice("synonyms:create", "Allows the creation of synonyms."),
            choice("synonyms:delete", "Allows the deletion of synonyms."),
            choice("synonyms:*", "Allows all synonym operations."),
        ],
    ),
    (
        "Override actions",
        &[
            choice("overrides:list", "Allows all overrides to be fetched."),
            choice("overrides:get", "Allows a single override to be retrieved"),
            choice("overrides:create", "Allows the creation of overrides."),
            choice("overrides:delete", "Allows the deletion of overrides."),
            choice("overrides:*", "Allows all override operations."),
        ],
    ),
    (
        "Stopwords actions",
        &[
            choice("stopwords:list", "Allows all stopword sets to be fetched."),
            choice("stopwords:get", "Allows a single stopword set to be retrieved"),
            choice("stopwords:create", "Allows the creation of a stopword set."),
            choice("stopwords:delete", "Allows the deletion of a stopword set."),
            choice("stopwords:*", "Allows all stopwords operations."),
        ],
    ),
    (
        "Keys actions",
        &[
            choice("keys:list", "Allows fetching of metadata for all keys"),
            choice("keys:get", "Allows metadata for a single key to be fetched"),
            choice("keys:create", "Allows the creation of API keys."),
            choice("keys:delete", "Allows the deletion of API keys."),
            choice("keys:*", "Allows all API Key related operations."),
        ],
    ),
    (
        "Misc actions",
        &[
            choice("metrics.json:list", "Allows access to the metrics endpoint."),
            choice("stats.json:list", "Allows access to the stats endpoint."),
            choice("debug:list", "Allows access to the /debug endpoint."),
            choice("*", "Allows all operations."),
        ],
    ),
];

/// 空字串代表不指定語系
pub fn is_supported_locale(locale: &str) -> bool {
    locale.is_empty() || LOCALES.iter().any(|choice| choice.value == locale)
}

pub fn is_api_action(action: &str) -> bool {
    API_ACTIONS
        .iter()
        .flat_map(|(_, actions)| actions.iter())
        .any(|choice| choice.value == action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FieldType;

    #[test]
    fn test_catalogue_matches_known_field_types() {
        for field_type in FieldType::KNOWN.iter() {
            assert!(
                DATA_TYPES.iter().any(|choice| choice.value == field_type.as_str()),
                "{field_type}"
            );
        }
    }

    #[test]
    fn test_locales() {
        assert!(is_supported_locale("ja"));
        assert!(is_supported_locale(""));
        assert!(!is_supported_locale("fr"));
    }

    #[test]
    fn test_api_actions() {
        assert!(is_api_action("documents:search"));
        assert!(is_api_action("*"));
        assert!(!is_api_action("documents:everything"));
    }
}
