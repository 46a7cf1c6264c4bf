//! Gallery controller: the entry list plus explicit presentation state.
//!
//! Rendering is pure given `active_filter` and `active_id`; the UI layer
//! only reads [`Card`]/[`QuickItem`]/[`FilterButton`] views and calls
//! [`Gallery::select`], [`Gallery::highlight`] and [`Gallery::apply_filter`].

use tracing::{debug, info};

use crate::catalog::VideoEntry;
use crate::youtube::{embed_url, thumbnail_url, watch_url};

/// Filter value that shows every card.
pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenreFilter {
  #[default]
  All,
  Genre(String),
}

impl GenreFilter {
  pub fn parse(value: &str) -> Self {
    if value == ALL_FILTER { GenreFilter::All } else { GenreFilter::Genre(value.to_string()) }
  }

  pub fn label(&self) -> &str {
    match self {
      GenreFilter::All => ALL_FILTER,
      GenreFilter::Genre(g) => g,
    }
  }

  /// Exact, case-sensitive genre comparison.
  pub fn matches(&self, genre: &str) -> bool {
    match self {
      GenreFilter::All => true,
      GenreFilter::Genre(g) => g == genre,
    }
  }
}

/// One grid card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card<'a> {
  pub id: &'a str,
  pub genre: &'a str,
  pub title: &'a str,
  /// `"{artist} · {year}"`
  pub subtitle: String,
  pub thumbnail_url: String,
  /// `"{title} — {artist}"`
  pub alt: String,
  pub visible: bool,
  pub active: bool,
}

/// One quick-list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickItem<'a> {
  pub id: &'a str,
  pub label: String,
  pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterButton {
  pub filter: GenreFilter,
  pub active: bool,
}

/// What the player panel shows once a video is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
  pub id: String,
  pub embed_url: String,
  pub watch_url: String,
  /// `"{artist} — {title}"`
  pub title: String,
  /// `"{genre} · {year}"`
  pub meta: String,
}

impl NowPlaying {
  fn from_entry(entry: &VideoEntry) -> Self {
    Self {
      id: entry.id.clone(),
      embed_url: embed_url(&entry.id),
      watch_url: watch_url(&entry.id),
      title: format!("{} — {}", entry.artist, entry.title),
      meta: format!("{} · {}", entry.genre, entry.year.as_deref().unwrap_or("")),
    }
  }
}

pub struct Gallery {
  entries: Vec<VideoEntry>,
  active_filter: GenreFilter,
  active_id: Option<String>,
  now_playing: Option<NowPlaying>,
}

impl Gallery {
  /// Build the controller. The first entry starts highlighted; nothing is loaded.
  pub fn new(entries: Vec<VideoEntry>) -> Self {
    let active_id = entries.first().map(|e| e.id.clone());
    Self { entries, active_filter: GenreFilter::All, active_id, now_playing: None }
  }

  pub fn entries(&self) -> &[VideoEntry] {
    &self.entries
  }

  pub fn entry(&self, id: &str) -> Option<&VideoEntry> {
    self.entries.iter().find(|e| e.id == id)
  }

  pub fn active_filter(&self) -> &GenreFilter {
    &self.active_filter
  }

  pub fn active_id(&self) -> Option<&str> {
    self.active_id.as_deref()
  }

  pub fn now_playing(&self) -> Option<&NowPlaying> {
    self.now_playing.as_ref()
  }

  pub fn render_grid(&self) -> Vec<Card<'_>> {
    self
      .entries
      .iter()
      .map(|e| Card {
        id: &e.id,
        genre: &e.genre,
        title: &e.title,
        subtitle: format!("{} · {}", e.artist, e.year.as_deref().unwrap_or("")),
        thumbnail_url: thumbnail_url(&e.id),
        alt: format!("{} — {}", e.title, e.artist),
        visible: self.active_filter.matches(&e.genre),
        active: self.active_id.as_deref() == Some(e.id.as_str()),
      })
      .collect()
  }

  pub fn render_quick_list(&self) -> Vec<QuickItem<'_>> {
    self
      .entries
      .iter()
      .map(|e| QuickItem {
        id: &e.id,
        label: format!("{} — {}", e.title, e.artist),
        active: self.active_id.as_deref() == Some(e.id.as_str()),
      })
      .collect()
  }

  /// `All` followed by each distinct genre in order of first appearance.
  /// A genre spelled like the `all` filter never gets a button of its own.
  pub fn filter_buttons(&self) -> Vec<FilterButton> {
    let mut filters = vec![GenreFilter::All];
    for entry in &self.entries {
      if entry.genre == ALL_FILTER {
        continue;
      }
      if !filters.iter().any(|f| matches!(f, GenreFilter::Genre(g) if *g == entry.genre)) {
        filters.push(GenreFilter::Genre(entry.genre.clone()));
      }
    }
    filters.into_iter().map(|filter| FilterButton { active: filter == self.active_filter, filter }).collect()
  }

  /// Ids of cards that pass the active filter, in list order.
  pub fn visible_ids(&self) -> Vec<&str> {
    self.entries.iter().filter(|e| self.active_filter.matches(&e.genre)).map(|e| e.id.as_str()).collect()
  }

  /// Load `id` into the player panel and highlight its card.
  /// Unknown ids leave all state untouched.
  pub fn select(&mut self, id: &str) -> Option<&NowPlaying> {
    let entry = self.entry(id)?;
    let now_playing = NowPlaying::from_entry(entry);
    info!(id = %id, title = %now_playing.title, "video selected");
    self.now_playing = Some(now_playing);
    self.highlight(id);
    self.now_playing.as_ref()
  }

  /// Mark the card with `id` as the only active one. Returns `false` for unknown ids.
  pub fn highlight(&mut self, id: &str) -> bool {
    if self.entry(id).is_none() {
      debug!(id = %id, "highlight ignored: unknown id");
      return false;
    }
    self.active_id = Some(id.to_string());
    true
  }

  /// Show cards matching `filter`; hidden cards keep their state.
  pub fn apply_filter(&mut self, filter: GenreFilter) {
    debug!(filter = %filter.label(), "filter applied");
    self.active_filter = filter;
  }

  /// Drop the loaded video; the highlight stays where it was.
  pub fn clear_now_playing(&mut self) {
    self.now_playing = None;
  }
}
