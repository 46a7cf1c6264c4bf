use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// User preferences stored in `prefs.toml`. Filter and selection are never saved.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Start playback in mpv as soon as a video is selected (default: on).
  pub autoplay: Option<bool>,
  /// Pass `--no-video` to mpv.
  pub audio_only: Option<bool>,
  /// Catalog file used instead of the built-in gallery.
  pub catalog_path: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "ypg")
}

/// Directory for rolling log files.
pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_local_dir().join("logs")).unwrap_or_else(|| std::env::temp_dir().join("ypg-logs"))
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match Self::parse(&content) {
          Some(config) => return config,
          None => warn!(path = %config_file.display(), "ignoring malformed prefs.toml"),
        }
      }
    }
    Self::default()
  }

  fn parse(content: &str) -> Option<Self> {
    toml::from_str(content).ok()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  pub fn autoplay(&self) -> bool {
    self.autoplay.unwrap_or(true)
  }

  pub fn audio_only(&self) -> bool {
    self.audio_only.unwrap_or(false)
  }
}
