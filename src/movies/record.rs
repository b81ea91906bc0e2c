//! Movie record.
//!
//! Records come from an untrusted upstream. Decoding a single record never
//! fails: absent or wrongly typed fields become `None` and the renderer
//! shows them as empty text. Only the surrounding array is structural.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One movie as delivered by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MovieId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<f64>,
}

/// Upstream identifier, kept in the JSON type it arrived as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MovieId {
    Number(serde_json::Number),
    Text(String),
}

impl MovieId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(MovieId::Number(n.clone())),
            Value::String(s) => Some(MovieId::Text(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieId::Number(n) => write!(f, "{}", n),
            MovieId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MovieId {
    fn from(n: i64) -> Self {
        MovieId::Number(n.into())
    }
}

impl From<&str> for MovieId {
    fn from(s: &str) -> Self {
        MovieId::Text(s.to_string())
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Record::default();
        };
        let field = |name: &str| map.get(name);

        Record {
            id: field("id").and_then(MovieId::from_value),
            title: field("title").and_then(text),
            description: field("description").and_then(text),
            year: field("year").and_then(integer),
            image_url: field("image_url").and_then(text),
            genre: field("genre").and_then(text),
            stars: field("stars").and_then(number),
        }
    }
}

/// Strings pass through; numbers and booleans are shown as written.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Finite numbers only; `"NaN"` and `"inf"` parse as floats but are not ratings.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}
