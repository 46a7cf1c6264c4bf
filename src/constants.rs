//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so there is no runtime
//! file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // YouTube URL templates
  pub thumbnail_url_template: String,
  pub embed_url_template: String,
  pub watch_url_template: String,

  // Grid layout
  pub card_width: u16,
  pub card_height: u16,
  pub quick_list_width: u16,
  pub compact_width: u16,

  // Status line / networking
  pub error_dismiss_secs: u64,
  pub http_timeout_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the tests below.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
