use crate::domain::model::{FieldDefinition, FieldType, RowRecord};
use crate::utils::error::{AdminError, Result};
use serde_json::{Map, Number, Value};

/// The service's reserved document key; carried through even when the schema omits it.
pub const DOCUMENT_ID: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Int32,
    Int64,
}

impl IntWidth {
    fn bounds(self) -> (i64, i64) {
        match self {
            IntWidth::Int32 => (i32::MIN as i64, i32::MAX as i64),
            IntWidth::Int64 => (i64::MIN, i64::MAX),
        }
    }

    fn range_message(self) -> String {
        let (min, max) = self.bounds();
        format!("Number must be between {} and {}", min, max)
    }

    fn bounded(self, value: i64) -> std::result::Result<Value, String> {
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(self.range_message());
        }
        Ok(Value::from(value))
    }
}

/// Coercion rule for a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Boolean,
    Text,
    Integer(IntWidth),
    Float,
    /// Shallow map whose values are strings or numbers
    Object,
    /// `[lat, lng]`
    GeoPoint,
    Array(Box<Rule>),
    Any,
}

impl Rule {
    /// `None` for types the validator does not recognise.
    pub fn for_type(field_type: &FieldType) -> Option<Rule> {
        let array = |rule: Rule| Rule::Array(Box::new(rule));
        let rule = match field_type {
            FieldType::Bool => Rule::Boolean,
            FieldType::BoolArray => array(Rule::Boolean),
            FieldType::String | FieldType::AutoString | FieldType::Image | FieldType::Auto => {
                Rule::Text
            }
            FieldType::StringArray => array(Rule::Text),
            FieldType::Int32 => Rule::Integer(IntWidth::Int32),
            FieldType::Int32Array => array(Rule::Integer(IntWidth::Int32)),
            FieldType::Int64 => Rule::Integer(IntWidth::Int64),
            FieldType::Int64Array => array(Rule::Integer(IntWidth::Int64)),
            FieldType::Float => Rule::Float,
            FieldType::FloatArray => array(Rule::Float),
            FieldType::Object => Rule::Object,
            FieldType::ObjectArray => array(Rule::Object),
            FieldType::GeoPoint => Rule::GeoPoint,
            FieldType::GeoPointArray => array(Rule::GeoPoint),
            FieldType::Other(_) => return None,
        };
        Some(rule)
    }

    pub fn check(&self, value: &Value) -> std::result::Result<Value, String> {
        match self {
            Rule::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(expected("boolean", other)),
            },
            Rule::Text => match value {
                Value::String(_) => Ok(value.clone()),
                other => Err(expected("string", other)),
            },
            Rule::Integer(width) => coerce_integer(value, *width),
            Rule::Float => coerce_float(value),
            Rule::Object => check_object(value),
            Rule::GeoPoint => coerce_geopoint(value),
            Rule::Array(inner) => match value {
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        inner
                            .check(item)
                            .map_err(|message| format!("[{}] {}", index, message))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Value::Array),
                other => Err(expected("array", other)),
            },
            Rule::Any => Ok(value.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub rule: Rule,
    pub optional: bool,
}

/// Composite validator built once per schema and applied to every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validator {
    rules: Vec<FieldRule>,
}

/// 未知的欄位型別一律接受任何值
pub fn build_validator(fields: &[FieldDefinition]) -> Validator {
    let rules = fields
        .iter()
        .map(|field| {
            let rule = Rule::for_type(&field.field_type).unwrap_or_else(|| {
                tracing::warn!(
                    "Field '{}' has unrecognised type '{}', accepting any value",
                    field.name,
                    field.field_type
                );
                Rule::Any
            });
            FieldRule {
                name: field.name.clone(),
                rule,
                optional: field.optional,
            }
        })
        .collect();

    Validator { rules }
}

/// 遇到未知的欄位型別時直接拒絕
pub fn build_strict_validator(fields: &[FieldDefinition]) -> Result<Validator> {
    let rules = fields
        .iter()
        .map(|field| {
            let rule =
                Rule::for_type(&field.field_type).ok_or_else(|| AdminError::UnknownFieldType {
                    field: field.name.clone(),
                    field_type: field.field_type.to_string(),
                })?;
            Ok(FieldRule {
                name: field.name.clone(),
                rule,
                optional: field.optional,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Validator { rules })
}

impl Validator {
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// 回傳轉型後的文件，或該列所有欄位的錯誤
    pub fn validate_row(&self, row: &RowRecord) -> std::result::Result<Map<String, Value>, Vec<String>> {
        let mut document = Map::new();
        let mut errors = Vec::new();

        if !self.rules.iter().any(|field| field.name == DOCUMENT_ID) {
            match row.get(DOCUMENT_ID) {
                None | Some(Value::Null) => {}
                Some(Value::String(id)) => {
                    document.insert(DOCUMENT_ID.to_string(), Value::String(id.clone()));
                }
                Some(Value::Number(id)) => {
                    document.insert(DOCUMENT_ID.to_string(), Value::String(id.to_string()));
                }
                Some(other) => errors.push(format!("{}: {}", DOCUMENT_ID, expected("string", other))),
            }
        }

        for field in &self.rules {
            match row.get(&field.name).filter(|value| !value.is_null()) {
                None if field.optional => {}
                None => errors.push(format!("{}: Required", field.name)),
                Some(value) => match field.rule.check(value) {
                    Ok(coerced) => {
                        document.insert(field.name.clone(), coerced);
                    }
                    Err(message) => errors.push(format!("{}: {}", field.name, message)),
                },
            }
        }

        if errors.is_empty() {
            Ok(document)
        } else {
            Err(errors)
        }
    }
}

fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, value: &Value) -> String {
    format!("Expected {}, received {}", kind, received(value))
}

fn not_a_number() -> String {
    "Expected number, received nan".to_string()
}

fn parse_finite(text: &str) -> std::result::Result<f64, String> {
    match text.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(not_a_number()),
    }
}

fn coerce_integer(value: &Value, width: IntWidth) -> std::result::Result<Value, String> {
    let number = match value {
        Value::Number(n) => match n.as_i64() {
            Some(integer) => return width.bounded(integer),
            None => n.as_f64().ok_or_else(not_a_number)?,
        },
        Value::String(text) => {
            if let Ok(integer) = text.trim().parse::<i64>() {
                return width.bounded(integer);
            }
            parse_finite(text)?
        }
        other => return Err(expected("number", other)),
    };

    if number.fract() != 0.0 {
        return Err("Expected integer, received float".to_string());
    }
    if number < i64::MIN as f64 || number >= i64::MAX as f64 {
        return Err(width.range_message());
    }
    width.bounded(number as i64)
}

fn coerce_float(value: &Value) -> std::result::Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(text) => {
            let number = parse_finite(text)?;
            Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(not_a_number)
        }
        other => Err(expected("number", other)),
    }
}

fn check_object(value: &Value) -> std::result::Result<Value, String> {
    let Value::Object(map) = value else {
        return Err(expected("object", value));
    };
    for (key, entry) in map {
        if !matches!(entry, Value::String(_) | Value::Number(_)) {
            return Err(format!(
                "Expected string or number at '{}', received {}",
                key,
                received(entry)
            ));
        }
    }
    Ok(value.clone())
}

fn coerce_geopoint(value: &Value) -> std::result::Result<Value, String> {
    let Value::Array(items) = value else {
        return Err(expected("array", value));
    };
    if items.len() != 2 {
        return Err("Array must contain exactly 2 element(s)".to_string());
    }

    let coordinates = items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n.as_f64().ok_or_else(not_a_number),
            Value::String(text) => parse_finite(text),
            other => Err(expected("number", other)),
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    Ok(Value::Array(
        coordinates
            .into_iter()
            .filter_map(Number::from_f64)
            .map(Value::Number)
            .collect(),
    ))
}
