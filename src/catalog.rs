//! Video catalog loading and validation.
//!
//! Records are deserialized into [`RawEntry`] (every field optional) and
//! validated into [`VideoEntry`]. Invalid records are collected as
//! [`Rejected`] and skipped, so one bad row never takes down the gallery.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::gallery::ALL_FILTER;
use crate::youtube::parse_video_id;

/// A validated gallery entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
  pub id: String,
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub year: Option<String>,
}

/// An unvalidated record as found in a catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub artist: Option<String>,
  #[serde(default)]
  pub genre: Option<String>,
  #[serde(default)]
  pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
  #[error("missing or empty `{0}`")]
  MissingField(&'static str),
  #[error("`{0}` is not a YouTube video id or URL")]
  InvalidId(String),
  #[error("duplicate video id `{0}`")]
  DuplicateId(String),
  #[error("genre `{0}` is reserved for the show-everything filter")]
  ReservedGenre(String),
}

/// A record that failed validation, with its position in the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
  pub index: usize,
  pub error: EntryError,
}

/// TOML has no top-level arrays, so TOML catalogs use `[[video]]` tables.
#[derive(Debug, Deserialize)]
struct TomlCatalog {
  #[serde(default)]
  video: Vec<RawEntry>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
  pub entries: Vec<VideoEntry>,
  pub rejected: Vec<Rejected>,
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, EntryError> {
  value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).ok_or(EntryError::MissingField(field))
}

impl RawEntry {
  /// Validate a single record. Duplicate detection happens in [`Catalog::from_raw`].
  pub fn validate(&self) -> Result<VideoEntry, EntryError> {
    let raw_id = required(self.id.as_deref(), "id")?;
    let id = parse_video_id(&raw_id).ok_or(EntryError::InvalidId(raw_id))?;
    let title = required(self.title.as_deref(), "title")?;
    let artist = required(self.artist.as_deref(), "artist")?;
    let genre = required(self.genre.as_deref(), "genre")?;
    if genre == ALL_FILTER {
      return Err(EntryError::ReservedGenre(genre));
    }
    let year = self.year.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    Ok(VideoEntry { id, title, artist, genre, year })
  }
}

impl Catalog {
  /// Validate records in order. The first occurrence of an id wins.
  pub fn from_raw(raw: Vec<RawEntry>) -> Self {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (index, record) in raw.iter().enumerate() {
      match record.validate() {
        Ok(entry) if !seen.insert(entry.id.clone()) => {
          rejected.push(Rejected { index, error: EntryError::DuplicateId(entry.id) });
        }
        Ok(entry) => entries.push(entry),
        Err(error) => rejected.push(Rejected { index, error }),
      }
    }

    for r in &rejected {
      warn!(index = r.index, error = %r.error, "catalog: skipping invalid entry");
    }
    Self { entries, rejected }
  }

  /// The gallery compiled into the binary from `catalog.ron`.
  pub fn builtin() -> Result<Self> {
    Self::parse_ron(include_str!("../catalog.ron")).context("Built-in catalog is malformed")
  }

  /// Load a catalog file; the format is chosen by extension (`ron`, `toml`, `json`).
  pub fn load(path: &Path) -> Result<Self> {
    let content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).unwrap_or_default();
    let catalog = match ext.as_str() {
      "ron" => Self::parse_ron(&content),
      "toml" => Self::parse_toml(&content),
      "json" => Self::parse_json(&content),
      other => Err(anyhow!("Unsupported catalog format '{}' (expected .ron, .toml or .json)", other)),
    }
    .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    info!(path = %path.display(), entries = catalog.entries.len(), rejected = catalog.rejected.len(), "catalog loaded");
    Ok(catalog)
  }

  pub fn parse_ron(content: &str) -> Result<Self> {
    let raw: Vec<RawEntry> = ron::from_str(content).context("Invalid RON")?;
    Self::non_empty(Self::from_raw(raw))
  }

  pub fn parse_toml(content: &str) -> Result<Self> {
    let file: TomlCatalog = toml::from_str(content).context("Invalid TOML")?;
    Self::non_empty(Self::from_raw(file.video))
  }

  pub fn parse_json(content: &str) -> Result<Self> {
    let raw: Vec<RawEntry> = serde_json::from_str(content).context("Invalid JSON")?;
    Self::non_empty(Self::from_raw(raw))
  }

  fn non_empty(catalog: Self) -> Result<Self> {
    if catalog.entries.is_empty() {
      bail!("Catalog has no valid entries ({} rejected)", catalog.rejected.len());
    }
    Ok(catalog)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_raw(id: &str, title: &str, artist: &str, genre: &str, year: Option<&str>) -> RawEntry {
    RawEntry {
      id: Some(id.to_string()),
      title: Some(title.to_string()),
      artist: Some(artist.to_string()),
      genre: Some(genre.to_string()),
      year: year.map(|s| s.to_string()),
    }
  }

  // --- builtin ---

  #[test]
  fn builtin_catalog_is_clean() {
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(catalog.entries.len(), 7);
    assert!(catalog.rejected.is_empty());
    assert_eq!(catalog.entries[0].id, "JGwWNGJdvx8");
    let genres: Vec<&str> = catalog.entries.iter().map(|e| e.genre.as_str()).collect();
    assert_eq!(genres, ["pop", "pop", "rock", "electrónica", "urbano", "pop", "pop"]);
  }

  // --- validate ---

  #[test]
  fn validate_trims_and_keeps_year() {
    let entry = make_raw(" fJ9rUzIMcZQ ", " Bohemian Rhapsody", "Queen ", "rock", Some("1975")).validate().unwrap();
    assert_eq!(entry.id, "fJ9rUzIMcZQ");
    assert_eq!(entry.title, "Bohemian Rhapsody");
    assert_eq!(entry.artist, "Queen");
    assert_eq!(entry.year.as_deref(), Some("1975"));
  }

  #[test]
  fn validate_blank_year_is_none() {
    let entry = make_raw("fJ9rUzIMcZQ", "t", "a", "rock", Some("  ")).validate().unwrap();
    assert_eq!(entry.year, None);
  }

  #[test]
  fn validate_missing_fields() {
    assert_eq!(RawEntry::default().validate(), Err(EntryError::MissingField("id")));
    assert_eq!(make_raw("fJ9rUzIMcZQ", "", "a", "g", None).validate(), Err(EntryError::MissingField("title")));
    assert_eq!(make_raw("fJ9rUzIMcZQ", "t", " ", "g", None).validate(), Err(EntryError::MissingField("artist")));
    assert_eq!(make_raw("fJ9rUzIMcZQ", "t", "a", "", None).validate(), Err(EntryError::MissingField("genre")));
  }

  #[test]
  fn validate_normalizes_url_ids() {
    let entry = make_raw("https://youtu.be/AzT7HIrKMZU?si=6j7KIXj47_gTaE_J", "t", "a", "pop", None).validate().unwrap();
    assert_eq!(entry.id, "AzT7HIrKMZU");
  }

  #[test]
  fn validate_rejects_bad_id() {
    assert_eq!(
      make_raw("not-an-id", "t", "a", "pop", None).validate(),
      Err(EntryError::InvalidId("not-an-id".to_string()))
    );
  }

  #[test]
  fn validate_rejects_reserved_genre() {
    assert_eq!(
      make_raw("fJ9rUzIMcZQ", "t", "a", " all ", None).validate(),
      Err(EntryError::ReservedGenre("all".to_string()))
    );
    assert!(make_raw("fJ9rUzIMcZQ", "t", "a", "All", None).validate().is_ok());
  }

  // --- from_raw ---

  #[test]
  fn from_raw_skips_invalid_and_duplicates() {
    let catalog = Catalog::from_raw(vec![
      make_raw("fJ9rUzIMcZQ", "Bohemian Rhapsody", "Queen", "rock", Some("1975")),
      RawEntry::default(),
      make_raw("https://www.youtube.com/watch?v=fJ9rUzIMcZQ", "Again", "Queen", "rock", None),
      make_raw("kJQP7kiw5Fk", "Despacito", "Luis Fonsi", "urbano", Some("2017")),
      make_raw("5NV6Rdv1a3I", "Get Lucky", "Daft Punk", "all", Some("2013")),
    ]);
    let ids: Vec<&str> = catalog.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["fJ9rUzIMcZQ", "kJQP7kiw5Fk"]);
    assert_eq!(
      catalog.rejected,
      vec![
        Rejected { index: 1, error: EntryError::MissingField("id") },
        Rejected { index: 2, error: EntryError::DuplicateId("fJ9rUzIMcZQ".to_string()) },
        Rejected { index: 4, error: EntryError::ReservedGenre("all".to_string()) },
      ]
    );
  }

  // --- parsers ---

  #[test]
  fn parse_toml_video_tables() {
    let content = r#"
      [[video]]
      id = "fJ9rUzIMcZQ"
      title = "Bohemian Rhapsody"
      artist = "Queen"
      genre = "rock"
      year = "1975"

      [[video]]
      title = "No id here"
      artist = "Nobody"
      genre = "pop"
    "#;
    let catalog = Catalog::parse_toml(content).unwrap();
    assert_eq!(catalog.entries.len(), 1);
    assert_eq!(catalog.rejected.len(), 1);
  }

  #[test]
  fn parse_json_array() {
    let content = r#"[{"id":"kJQP7kiw5Fk","title":"Despacito","artist":"Luis Fonsi","genre":"urbano"}]"#;
    let catalog = Catalog::parse_json(content).unwrap();
    assert_eq!(catalog.entries[0].year, None);
  }

  #[test]
  fn parse_rejects_catalog_without_valid_entries() {
    assert!(Catalog::parse_json(r#"[{"title":"orphan"}]"#).is_err());
    assert!(Catalog::parse_toml("").is_err());
  }

  #[test]
  fn load_rejects_unknown_extension() {
    let path = std::env::temp_dir().join(format!("ypg-catalog-{}.yaml", std::process::id()));
    std::fs::write(&path, "- id: x").unwrap();
    let result = Catalog::load(&path);
    let _ = std::fs::remove_file(&path);
    assert!(result.is_err());
  }
}
