use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

/// How a request addresses a single song.
#[derive(Debug, Clone, PartialEq)]
pub enum SongKey {
    /// Application-level `id` field.
    Id(Bson),
    /// Store-assigned `_id`.
    ObjectId(ObjectId),
}

/// Why a flexible path id could not be turned into a [`SongKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Digits only, but too large for any stored id.
    OutOfRange,
    /// Neither digits nor a valid ObjectId.
    Malformed,
}

impl SongKey {
    /// Resolves a strict numeric path segment (`/song/{id}`).
    /// Returns `None` when the segment is not made of ASCII digits.
    pub fn from_numeric(raw: &str) -> Option<Self> {
        if !is_all_digits(raw) {
            return None;
        }
        raw.parse::<i64>().ok().map(|id| SongKey::Id(Bson::Int64(id)))
    }

    /// Resolves a flexible path segment (`/songs/{id}`): all-digit strings
    /// address the application id, everything else is tried as an ObjectId.
    pub fn from_flexible(raw: &str) -> Result<Self, KeyError> {
        if is_all_digits(raw) {
            return raw
                .parse::<i64>()
                .map(|id| SongKey::Id(Bson::Int64(id)))
                .map_err(|_| KeyError::OutOfRange);
        }
        ObjectId::parse_str(raw)
            .map(SongKey::ObjectId)
            .map_err(|_| KeyError::Malformed)
    }

    /// The store filter selecting this song.
    pub fn filter(&self) -> Document {
        match self {
            SongKey::Id(id) => doc! { "id": id.clone() },
            SongKey::ObjectId(oid) => doc! { "_id": *oid },
        }
    }

    /// Whether `song` is the one this key addresses.
    pub fn matches(&self, song: &Document) -> bool {
        match self {
            SongKey::Id(id) => song.get("id").is_some_and(|value| same_id(value, id)),
            SongKey::ObjectId(oid) => song.get_object_id("_id").is_ok_and(|found| found == *oid),
        }
    }
}

fn is_all_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric ids compare by value across BSON number types, the way the
/// store's equality query does (`7`, `7i64` and `7.0` are the same id).
/// Integers compare exactly; only a `Double` side goes through `f64`.
pub fn same_id(a: &Bson, b: &Bson) -> bool {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a, b) {
            (Bson::Double(x), other) | (other, Bson::Double(x)) => match other {
                Bson::Double(y) => x == y,
                _ => as_integer(other).is_some_and(|n| integer_equals_double(n, *x)),
            },
            _ => a == b,
        },
    }
}

fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        _ => None,
    }
}

/// Exact comparison: the double must be integral and round-trip to `n`.
fn integer_equals_double(n: i64, x: f64) -> bool {
    x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 && x as i64 == n
}

fn is_number(value: &Bson) -> bool {
    matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

/// The application id carried by a song, when it is one the store keeps unique.
pub fn numeric_id(song: &Document) -> Option<&Bson> {
    song.get("id").filter(|id| is_number(id))
}

/// Errors raised while reading a request body into a song document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("No input data provided")]
    Empty,
    #[error("Request body is not valid JSON")]
    InvalidJson,
    #[error("Song payload must be a JSON object")]
    NotAnObject,
    #[error("The _id field is assigned by the server")]
    NativeKeySupplied,
    #[error("Invalid field name {0:?}: names cannot contain '.' or start with '$'")]
    InvalidFieldName(String),
    #[error("Song payload could not be stored: {0}")]
    Unrepresentable(String),
}

/// Parses a raw request body into a song document.
///
/// Empty bodies and JSON values that are "empty" (`{}`, `[]`, `null`, `""`,
/// `0`, `false`) all count as missing input.
pub fn parse_payload(body: &[u8]) -> Result<Document, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::Empty);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| PayloadError::InvalidJson)?;
    let fields = match value {
        Value::Object(fields) if fields.is_empty() => return Err(PayloadError::Empty),
        Value::Object(fields) => fields,
        other if is_falsy(&other) => return Err(PayloadError::Empty),
        _ => return Err(PayloadError::NotAnObject),
    };
    if fields.contains_key("_id") {
        return Err(PayloadError::NativeKeySupplied);
    }
    if let Some(name) = fields.keys().find(|name| !is_plain_field_name(name)) {
        return Err(PayloadError::InvalidFieldName(name.clone()));
    }
    bson::to_document(&fields).map_err(|e| PayloadError::Unrepresentable(e.to_string()))
}

/// Top-level names must be literal fields: a `$set` would read dots as a
/// path into nested documents and `$` as an operator.
fn is_plain_field_name(name: &str) -> bool {
    !name.contains('.') && !name.starts_with('$')
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Renders a stored song as client JSON, with every ObjectId as a plain hex string.
pub fn to_json(song: Document) -> Value {
    Value::Object(document_to_map(song))
}

fn document_to_map(song: Document) -> Map<String, Value> {
    song.into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(nested) => Value::Object(document_to_map(nested)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
