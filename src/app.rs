use anyhow::Result;
use image::DynamicImage;
use ratatui::{layout::Rect, widgets::ListState};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::gallery::{Gallery, GenreFilter};
use crate::player::VideoPlayer;
use crate::theme::{THEMES, Theme, theme_index};
use crate::youtube::fetch_thumbnail;

/// Which widget receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Grid,
  QuickList,
  Filters,
}

impl Focus {
  pub fn next(self) -> Self {
    match self {
      Focus::Grid => Focus::QuickList,
      Focus::QuickList => Focus::Filters,
      Focus::Filters => Focus::Grid,
    }
  }
}

/// Pane shown in the compact (narrow terminal) layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  Gallery,
  Player,
}

type ThumbResult = Result<DynamicImage>;

/// Thumbnail images, fetched lazily for the highlighted card.
#[derive(Default)]
pub struct ThumbnailCache {
  pub images: HashMap<String, DynamicImage>,
  failed: HashSet<String>,
  pending: Vec<(String, oneshot::Receiver<ThumbResult>)>,
  /// Last resized image: (video id, area it was fitted to, image).
  pub resized: Option<(String, Rect, DynamicImage)>,
}

impl ThumbnailCache {
  fn is_known(&self, id: &str) -> bool {
    self.images.contains_key(id) || self.failed.contains(id) || self.pending.iter().any(|(p, _)| p == id)
  }

  /// Move finished fetches into the cache. Results are kept even if the card is no longer active.
  fn poll(&mut self) {
    let mut still_pending = Vec::with_capacity(self.pending.len());
    for (id, mut rx) in self.pending.drain(..) {
      match rx.try_recv() {
        Ok(Ok(image)) => {
          debug!(id = %id, "thumbnail ready");
          self.images.insert(id, image);
        }
        Ok(Err(e)) => {
          warn!(id = %id, error = %format!("{:#}", e), "thumbnail fetch failed");
          self.failed.insert(id);
        }
        Err(oneshot::error::TryRecvError::Empty) => still_pending.push((id, rx)),
        Err(oneshot::error::TryRecvError::Closed) => {
          self.failed.insert(id);
        }
      }
    }
    self.pending = still_pending;
  }
}

pub struct App {
  pub gallery: Gallery,
  pub focus: Focus,
  pub pane: Pane,
  /// Cursor within the visible cards (not an entry index).
  pub grid_cursor: usize,
  /// Columns in the last drawn grid, for up/down moves.
  pub grid_columns: usize,
  /// First grid row drawn.
  pub grid_scroll: usize,
  /// Cursor over all entries in the quick list.
  pub quick_state: ListState,
  /// Cursor over the filter buttons.
  pub filter_cursor: usize,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub autoplay: bool,
  pub player: VideoPlayer,
  pub thumbs: ThumbnailCache,
  pub last_error: Option<String>,
  /// Informational message, lower priority than errors and mpv status.
  pub info_message: Option<String>,
  pub should_quit: bool,
  http_client: Client,
  config: Config,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(gallery: Gallery, config: Config, display_mode: DisplayMode) -> Self {
    let http_client = Client::builder()
      .timeout(Duration::from_secs(constants().http_timeout_secs))
      .build()
      .unwrap_or_else(|_| Client::new());
    let mut quick_state = ListState::default();
    if !gallery.entries().is_empty() {
      quick_state.select(Some(0));
    }

    let mut app = Self {
      gallery,
      focus: Focus::Grid,
      pane: Pane::Gallery,
      grid_cursor: 0,
      grid_columns: 1,
      grid_scroll: 0,
      quick_state,
      filter_cursor: 0,
      theme_index: theme_index(config.theme_name.as_deref()),
      display_mode,
      autoplay: config.autoplay(),
      player: VideoPlayer::new(config.audio_only()),
      thumbs: ThumbnailCache::default(),
      last_error: None,
      info_message: None,
      should_quit: false,
      http_client,
      config,
      error_time: None,
    };
    if let Some(id) = app.gallery.active_id().map(str::to_string) {
      app.trigger_thumbnail(&id);
    }
    app
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index comes from theme_index() or modular arithmetic in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    warn!(error = %msg, "ui error");
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.clear_error();
    }
  }

  // --- Selection ---

  /// Load `id` into the player panel, highlight it and sync both cursors.
  ///
  /// `reveal` brings the player pane forward in the compact layout.
  pub async fn activate(&mut self, id: &str, reveal: bool) {
    let Some(now) = self.gallery.select(id) else { return };
    let (watch_url, title) = (now.watch_url.clone(), now.title.clone());
    self.clear_error();
    self.info_message = Some(title);
    self.sync_cursors(id);
    if reveal {
      self.pane = Pane::Player;
    }
    self.trigger_thumbnail(id);

    if self.autoplay
      && let Err(e) = self.player.play(id, &watch_url).await
    {
      self.set_error(format!("Playback error: {:#}", e));
    }
  }

  pub fn focused_card_id(&self) -> Option<String> {
    self.gallery.visible_ids().get(self.grid_cursor).map(|s| s.to_string())
  }

  pub async fn activate_focused_card(&mut self) {
    if let Some(id) = self.focused_card_id() {
      self.activate(&id, false).await;
    }
  }

  pub async fn activate_quick_item(&mut self) {
    let Some(idx) = self.quick_state.selected() else { return };
    let Some(id) = self.gallery.entries().get(idx).map(|e| e.id.clone()) else { return };
    self.activate(&id, true).await;
  }

  fn sync_cursors(&mut self, id: &str) {
    if let Some(pos) = self.gallery.visible_ids().iter().position(|v| *v == id) {
      self.grid_cursor = pos;
    }
    if let Some(idx) = self.gallery.entries().iter().position(|e| e.id == id) {
      self.quick_state.select(Some(idx));
    }
  }

  pub async fn stop_playback(&mut self) -> Result<()> {
    self.player.stop().await?;
    self.gallery.clear_now_playing();
    self.info_message = None;
    Ok(())
  }

  // --- Filtering ---

  pub fn apply_filter(&mut self, filter: GenreFilter) {
    info!(filter = %filter.label(), "filter selected");
    let focused = self.focused_card_id();
    self.gallery.apply_filter(filter);
    if let Some(pos) = self.gallery.filter_buttons().iter().position(|b| b.active) {
      self.filter_cursor = pos;
    }

    // Keep the cursor on the same card when it stays visible, else clamp.
    let visible = self.gallery.visible_ids();
    self.grid_cursor = match focused.and_then(|id| visible.iter().position(|v| *v == id)) {
      Some(pos) => pos,
      None => self.grid_cursor.min(visible.len().saturating_sub(1)),
    };
    self.grid_scroll = 0;
  }

  /// Apply the filter button at `idx` (0 is always `All`).
  pub fn apply_filter_at(&mut self, idx: usize) {
    if let Some(button) = self.gallery.filter_buttons().into_iter().nth(idx) {
      self.apply_filter(button.filter);
    }
  }

  pub fn cycle_filter(&mut self, forward: bool) {
    let count = self.gallery.filter_buttons().len();
    if count == 0 {
      return;
    }
    let current = self.gallery.filter_buttons().iter().position(|b| b.active).unwrap_or(0);
    let next = if forward { (current + 1) % count } else { (current + count - 1) % count };
    self.apply_filter_at(next);
  }

  pub fn move_filter_cursor(&mut self, forward: bool) {
    let count = self.gallery.filter_buttons().len();
    if count == 0 {
      return;
    }
    self.filter_cursor =
      if forward { (self.filter_cursor + 1) % count } else { (self.filter_cursor + count - 1) % count };
  }

  // --- Grid navigation ---

  fn visible_count(&self) -> usize {
    self.gallery.visible_ids().len()
  }

  pub fn move_left(&mut self) {
    self.grid_cursor = self.grid_cursor.saturating_sub(1);
  }

  pub fn move_right(&mut self) {
    if self.grid_cursor + 1 < self.visible_count() {
      self.grid_cursor += 1;
    }
  }

  pub fn move_up(&mut self) {
    if self.grid_cursor >= self.grid_columns {
      self.grid_cursor -= self.grid_columns;
    }
  }

  pub fn move_down(&mut self) {
    let next = self.grid_cursor + self.grid_columns.max(1);
    if next < self.visible_count() {
      self.grid_cursor = next;
    }
  }

  pub fn move_home(&mut self) {
    self.grid_cursor = 0;
  }

  pub fn move_end(&mut self) {
    self.grid_cursor = self.visible_count().saturating_sub(1);
  }

  /// Keep the cursor row inside the `visible_rows` window starting at `grid_scroll`.
  pub fn ensure_cursor_visible(&mut self, visible_rows: usize) {
    let row = self.grid_cursor / self.grid_columns.max(1);
    if row < self.grid_scroll {
      self.grid_scroll = row;
    } else if visible_rows > 0 && row >= self.grid_scroll + visible_rows {
      self.grid_scroll = row + 1 - visible_rows;
    }
  }

  // --- Quick list navigation ---

  pub fn quick_next(&mut self) {
    let count = self.gallery.entries().len();
    if count > 0 {
      let i = self.quick_state.selected().map_or(0, |i| (i + 1) % count);
      self.quick_state.select(Some(i));
    }
  }

  pub fn quick_prev(&mut self) {
    let count = self.gallery.entries().len();
    if count > 0 {
      let i = self.quick_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.quick_state.select(Some(i));
    }
  }

  // --- Background work ---

  /// Start fetching the thumbnail for `id` unless it is cached, failed, or in flight.
  fn trigger_thumbnail(&mut self, id: &str) {
    if !self.display_mode.shows_thumbnails() || self.thumbs.is_known(id) {
      return;
    }
    debug!(id = %id, "fetching thumbnail");
    let client = self.http_client.clone();
    let video_id = id.to_string();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_thumbnail(&client, &video_id).await);
    });
    self.thumbs.pending.push((id.to_string(), rx));
  }

  /// Fetch the thumbnail for whatever card the cursor is on.
  pub fn prefetch_focused(&mut self) {
    if let Some(id) = self.focused_card_id() {
      self.trigger_thumbnail(&id);
    }
  }

  pub fn check_pending(&mut self) {
    self.thumbs.poll();
    self.player.check_status();
    self.expire_error();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;

  fn make_app() -> App {
    let catalog = Catalog::builtin().unwrap();
    let config = Config { autoplay: Some(false), ..Config::default() };
    App::new(Gallery::new(catalog.entries), config, DisplayMode::Off)
  }

  #[test]
  fn focus_cycles() {
    assert_eq!(Focus::Grid.next(), Focus::QuickList);
    assert_eq!(Focus::QuickList.next(), Focus::Filters);
    assert_eq!(Focus::Filters.next(), Focus::Grid);
  }

  #[tokio::test]
  async fn initial_state() {
    let app = make_app();
    assert_eq!(app.gallery.active_id(), Some("JGwWNGJdvx8"));
    assert_eq!(app.quick_state.selected(), Some(0));
    assert_eq!(app.focused_card_id().as_deref(), Some("JGwWNGJdvx8"));
  }

  #[tokio::test]
  async fn enter_on_card_selects_and_highlights() {
    let mut app = make_app();
    app.grid_cursor = 2;
    app.activate_focused_card().await;
    let now = app.gallery.now_playing().unwrap();
    assert_eq!(now.title, "Queen — Bohemian Rhapsody");
    assert_eq!(now.meta, "rock · 1975");
    assert_eq!(app.gallery.active_id(), Some("fJ9rUzIMcZQ"));
    assert_eq!(app.quick_state.selected(), Some(2));
    assert_eq!(app.pane, Pane::Gallery);
  }

  #[tokio::test]
  async fn quick_list_selects_and_reveals_player() {
    let mut app = make_app();
    app.quick_state.select(Some(4));
    app.activate_quick_item().await;
    assert_eq!(app.gallery.now_playing().unwrap().title, "Luis Fonsi — Despacito");
    assert_eq!(app.pane, Pane::Player);
    assert_eq!(app.grid_cursor, 4);
  }

  #[tokio::test]
  async fn filter_keeps_cursor_on_visible_card() {
    let mut app = make_app();
    app.grid_cursor = 5; // RgKAFK5djSk, pop
    app.apply_filter(GenreFilter::parse("pop"));
    assert_eq!(app.focused_card_id().as_deref(), Some("RgKAFK5djSk"));
    assert_eq!(app.grid_cursor, 2);
  }

  #[tokio::test]
  async fn filter_clamps_cursor_when_card_hidden() {
    let mut app = make_app();
    app.grid_cursor = 6;
    app.apply_filter(GenreFilter::parse("rock"));
    assert_eq!(app.grid_cursor, 0);
    assert_eq!(app.focused_card_id().as_deref(), Some("fJ9rUzIMcZQ"));
  }

  #[tokio::test]
  async fn filter_buttons_by_index_and_cycle() {
    let mut app = make_app();
    app.apply_filter_at(2);
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("rock"));
    assert_eq!(app.filter_cursor, 2);
    app.cycle_filter(true);
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("electrónica"));
    app.apply_filter_at(0);
    app.cycle_filter(false);
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("urbano"));
    app.apply_filter_at(99);
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("urbano"));
  }

  #[tokio::test]
  async fn grid_moves_stay_in_visible_range() {
    let mut app = make_app();
    app.grid_columns = 3;
    app.move_down();
    assert_eq!(app.grid_cursor, 3);
    app.move_down();
    assert_eq!(app.grid_cursor, 6);
    app.move_down();
    assert_eq!(app.grid_cursor, 6);
    app.move_right();
    assert_eq!(app.grid_cursor, 6);
    app.move_up();
    app.move_left();
    assert_eq!(app.grid_cursor, 2);
    app.move_end();
    assert_eq!(app.grid_cursor, 6);
    app.move_home();
    assert_eq!(app.grid_cursor, 0);
  }

  #[tokio::test]
  async fn ensure_cursor_visible_scrolls() {
    let mut app = make_app();
    app.grid_columns = 2;
    app.grid_cursor = 6; // row 3
    app.ensure_cursor_visible(2);
    assert_eq!(app.grid_scroll, 2);
    app.grid_cursor = 0;
    app.ensure_cursor_visible(2);
    assert_eq!(app.grid_scroll, 0);
  }

  #[tokio::test]
  async fn quick_list_wraps() {
    let mut app = make_app();
    app.quick_prev();
    assert_eq!(app.quick_state.selected(), Some(6));
    app.quick_next();
    assert_eq!(app.quick_state.selected(), Some(0));
  }

  #[tokio::test]
  async fn stop_clears_now_playing() {
    let mut app = make_app();
    app.activate("kJQP7kiw5Fk", false).await;
    app.stop_playback().await.unwrap();
    assert!(app.gallery.now_playing().is_none());
    assert_eq!(app.gallery.active_id(), Some("kJQP7kiw5Fk"));
  }

  #[test]
  fn error_set_and_clear() {
    let mut app = make_app();
    app.set_error("boom".to_string());
    app.expire_error();
    assert_eq!(app.last_error.as_deref(), Some("boom"));
    app.clear_error();
    assert!(app.last_error.is_none());
  }
}
