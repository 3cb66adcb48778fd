use std::path::Path;

use anyhow::{bail, Context};
use mongodb::bson::{self, Document};
use serde_json::Value;

/// Reads the startup dataset: a JSON array of song objects.
pub fn load_songs(path: impl AsRef<Path>) -> anyhow::Result<Vec<Document>> {
    let path = path.as_ref();
    let raw = std::fs::read(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    parse_songs(&raw).with_context(|| format!("invalid seed file {}", path.display()))
}

fn parse_songs(raw: &[u8]) -> anyhow::Result<Vec<Document>> {
    let Value::Array(entries) = serde_json::from_slice::<Value>(raw)? else {
        bail!("expected a JSON array of songs");
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => bson::to_document(&fields)
                .with_context(|| format!("song #{index} cannot be stored")),
            _ => bail!("song #{index} is not a JSON object"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_array_of_songs() {
        // given
        let raw = br#"[{"id": 1, "title": "A"}, {"title": "B", "lyrics": "la"}]"#;

        // when
        let songs = parse_songs(raw).unwrap();

        // then
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[1].get_str("title").unwrap(), "B");
    }

    #[test]
    fn should_reject_non_array_seed() {
        assert!(parse_songs(br#"{"id": 1}"#).is_err());
    }

    #[test]
    fn should_reject_non_object_entries() {
        let err = parse_songs(br#"[{"id": 1}, 2]"#).unwrap_err();
        assert!(err.to_string().contains("song #1"));
    }

    #[test]
    fn should_report_missing_file() {
        let err = load_songs("/nonexistent/songs.json").unwrap_err();
        assert!(err.to_string().contains("failed to read seed file"));
    }

    #[test]
    fn should_load_bundled_dataset() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/songs.json");
        let songs = load_songs(path).unwrap();
        assert!(!songs.is_empty());
    }
}
