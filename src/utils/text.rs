//! Naming-convention conversions used by the readers and the terminal output.

use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

/// "Product Name" -> "productName"
pub fn to_camel_case(text: &str) -> String {
    text.split(' ')
        .enumerate()
        .map(|(index, word)| {
            if index == 0 {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

/// "system_cpu_active" -> "System Cpu Active"; words listed in `preserve` are kept as-is.
pub fn from_snake_to_sentence_case(text: &str, preserve: &[&str]) -> String {
    text.split('_')
        .map(|word| {
            if preserve.contains(&word) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "numDocuments" -> "num documents"
pub fn from_camel_to_space_separated(text: &str) -> String {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    regex(&BOUNDARY, r"([a-z])([A-Z])")
        .replace_all(text, "$1 $2")
        .to_lowercase()
}

/// 將 `{lat: 1, 'lng': 2}` 這類寬鬆的物件字面值轉成 JSON 文字
pub fn convert_to_json(text: &str) -> String {
    static BARE_KEY: OnceLock<Regex> = OnceLock::new();
    regex(&BARE_KEY, r"([{,])\s*([a-zA-Z0-9_]+)\s*:")
        .replace_all(text, "$1\"$2\":")
        .replace('\'', "\"")
}

/// Unix 秒數 -> "19 October 2026, 3:04:05 pm" (UTC)
pub fn formatted_timestamp(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%-d %B %Y, %-I:%M:%S %P").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
