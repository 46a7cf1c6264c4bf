use anyhow::{Context, Result};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus, Pane};

/// Filter button index for a digit key: `0` is `All`, `1`..`9` the genres.
fn digit_filter_index(c: char) -> Option<usize> {
  c.to_digit(10).map(|d| d as usize)
}

fn open_in_browser(app: &mut App) {
  let Some(url) = app.gallery.now_playing().map(|n| n.watch_url.clone()) else { return };
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  match std::process::Command::new(cmd)
    .arg(&url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
  {
    Ok(mut child) => {
      // Reap in the background so no zombie is left behind.
      std::thread::spawn(move || {
        let _ = child.wait();
      });
    }
    Err(e) => app.set_error(format!("Failed to open browser: {}", e)),
  }
}

pub async fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => app.should_quit = true,
      KeyCode::Char('t') => app.next_theme(),
      KeyCode::Char('s') => app.stop_playback().await.context("Failed to stop playback")?,
      KeyCode::Char('o') => open_in_browser(app),
      _ => {}
    }
    return Ok(());
  }

  match key.code {
    KeyCode::Char('q') => {
      app.should_quit = true;
      return Ok(());
    }
    KeyCode::Tab => {
      app.focus = app.focus.next();
      return Ok(());
    }
    KeyCode::Char('p') => {
      app.pane = if app.pane == Pane::Gallery { Pane::Player } else { Pane::Gallery };
      return Ok(());
    }
    KeyCode::Char('f') => {
      app.cycle_filter(true);
      return Ok(());
    }
    KeyCode::Char('F') => {
      app.cycle_filter(false);
      return Ok(());
    }
    KeyCode::Char(c) if c.is_ascii_digit() => {
      if let Some(idx) = digit_filter_index(c) {
        app.apply_filter_at(idx);
      }
      return Ok(());
    }
    KeyCode::Char(' ') => {
      if app.player.is_playing()
        && let Err(e) = app.player.toggle_pause().await
      {
        app.set_error(format!("Pause error: {:#}", e));
      }
      return Ok(());
    }
    KeyCode::Esc => {
      if app.pane == Pane::Player {
        app.pane = Pane::Gallery;
      } else if app.focus != Focus::Grid {
        app.focus = Focus::Grid;
      } else {
        app.should_quit = true;
      }
      return Ok(());
    }
    _ => {}
  }

  match app.focus {
    Focus::Grid => handle_grid_key(app, key).await,
    Focus::QuickList => handle_quick_list_key(app, key).await,
    Focus::Filters => handle_filter_key(app, key),
  }
  Ok(())
}

async fn handle_grid_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.activate_focused_card().await,
    KeyCode::Left | KeyCode::Char('h') => app.move_left(),
    KeyCode::Right | KeyCode::Char('l') => app.move_right(),
    KeyCode::Up | KeyCode::Char('k') => app.move_up(),
    KeyCode::Down | KeyCode::Char('j') => app.move_down(),
    KeyCode::Home | KeyCode::Char('g') => app.move_home(),
    KeyCode::End | KeyCode::Char('G') => app.move_end(),
    _ => {}
  }
  app.prefetch_focused();
}

async fn handle_quick_list_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.activate_quick_item().await,
    KeyCode::Down | KeyCode::Char('j') => app.quick_next(),
    KeyCode::Up | KeyCode::Char('k') => app.quick_prev(),
    _ => {}
  }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.apply_filter_at(app.filter_cursor),
    KeyCode::Left | KeyCode::Char('h') => app.move_filter_cursor(false),
    KeyCode::Right | KeyCode::Char('l') => app.move_filter_cursor(true),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::config::Config;
  use crate::display::DisplayMode;
  use crate::gallery::{Gallery, GenreFilter};

  fn make_app() -> App {
    let catalog = Catalog::builtin().unwrap();
    let config = Config { autoplay: Some(false), ..Config::default() };
    App::new(Gallery::new(catalog.entries), config, DisplayMode::Off)
  }

  fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn digit_keys_map_to_buttons() {
    assert_eq!(digit_filter_index('0'), Some(0));
    assert_eq!(digit_filter_index('3'), Some(3));
    assert_eq!(digit_filter_index('x'), None);
  }

  #[tokio::test]
  async fn enter_on_focused_card_loads_it() {
    let mut app = make_app();
    handle_key_event(&mut app, press(KeyCode::Right)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Right)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.gallery.now_playing().unwrap().title, "Queen — Bohemian Rhapsody");
    let active: Vec<_> = app.gallery.render_grid().into_iter().filter(|c| c.active).map(|c| c.id).collect();
    assert_eq!(active, ["fJ9rUzIMcZQ"]);
  }

  #[tokio::test]
  async fn digit_applies_filter() {
    let mut app = make_app();
    handle_key_event(&mut app, press(KeyCode::Char('1'))).await.unwrap();
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("pop"));
    assert_eq!(app.gallery.visible_ids().len(), 4);
    handle_key_event(&mut app, press(KeyCode::Char('0'))).await.unwrap();
    assert_eq!(app.gallery.visible_ids().len(), 7);
  }

  #[tokio::test]
  async fn filter_bar_enter_applies_cursor() {
    let mut app = make_app();
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.focus, Focus::Filters);
    handle_key_event(&mut app, press(KeyCode::Right)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Right)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.gallery.active_filter(), &GenreFilter::parse("rock"));
  }

  #[tokio::test]
  async fn quick_list_enter_reveals_player_and_esc_returns() {
    let mut app = make_app();
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Down)).await.unwrap();
    handle_key_event(&mut app, press(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.gallery.now_playing().unwrap().title, "Billie Eilish — bad guy");
    assert_eq!(app.pane, Pane::Player);
    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.pane, Pane::Gallery);
    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.focus, Focus::Grid);
    assert!(!app.should_quit);
    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn ctrl_c_quits() {
    let mut app = make_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();
    assert!(app.should_quit);
  }
}
