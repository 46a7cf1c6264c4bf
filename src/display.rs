use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
  Off,
}

/// How thumbnails are drawn in the player panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  /// Grayscale character ramp.
  Ascii,
  /// True-color half blocks.
  Direct,
  /// No thumbnail; nothing is fetched.
  Off,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
      DisplayMode::Off => "Off",
    }
  }

  pub fn shows_thumbnails(self) -> bool {
    self != DisplayMode::Off
  }
}

/// Pick half-blocks when `COLORTERM` advertises true color, else ASCII.
pub fn detect_display_mode(colorterm: Option<&str>) -> DisplayMode {
  let colorterm = colorterm.unwrap_or_default().to_lowercase();
  if colorterm == "truecolor" || colorterm == "24bit" { DisplayMode::Direct } else { DisplayMode::Ascii }
}

pub fn resolve_display_mode(cli: CliDisplayMode) -> DisplayMode {
  match cli {
    CliDisplayMode::Auto => detect_display_mode(std::env::var("COLORTERM").ok().as_deref()),
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
    CliDisplayMode::Off => DisplayMode::Off,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detect_truecolor() {
    assert_eq!(detect_display_mode(Some("truecolor")), DisplayMode::Direct);
    assert_eq!(detect_display_mode(Some("24BIT")), DisplayMode::Direct);
  }

  #[test]
  fn detect_fallback_ascii() {
    assert_eq!(detect_display_mode(None), DisplayMode::Ascii);
    assert_eq!(detect_display_mode(Some("256color")), DisplayMode::Ascii);
  }

  #[test]
  fn explicit_modes_pass_through() {
    assert_eq!(resolve_display_mode(CliDisplayMode::Off), DisplayMode::Off);
    assert!(!DisplayMode::Off.shows_thumbnails());
    assert!(DisplayMode::Ascii.shows_thumbnails());
  }
}
