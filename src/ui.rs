use chrono::Datelike;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Focus, Pane};
use crate::constants::constants;
use crate::gallery::Card;
use crate::graphics::{ThumbnailWidget, fit_thumbnail};
use crate::theme::Theme;

// --- Helpers ---

/// Truncate to `max_width` display columns, appending "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
  if s.width() <= max_width {
    return s.to_string();
  }
  let budget = max_width.saturating_sub(1);
  let mut used = 0;
  let mut out = String::new();
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w > budget {
      break;
    }
    used += w;
    out.push(c);
  }
  if max_width > 0 {
    out.push('…');
  }
  out
}

fn rounded_block<'a>(theme: &Theme, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(if focused { theme.accent } else { theme.muted }).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

/// Grid columns that fit in `width`.
pub fn grid_columns(width: u16) -> usize {
  (width / constants().card_width.max(1)).max(1) as usize
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, filter_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_filter_bar(frame, app, filter_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ ypg ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let bar_focused = app.focus == Focus::Filters;
  let mut spans = vec![Span::raw(" ")];
  for (i, button) in app.gallery.filter_buttons().iter().enumerate() {
    let style = if button.active {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.fg).bg(theme.stripe_bg)
    };
    let style = if bar_focused && i == app.filter_cursor { style.add_modifier(Modifier::UNDERLINED) } else { style };
    if i <= 9 {
      spans.push(Span::styled(format!("{}", i), Style::default().fg(theme.muted)));
    }
    spans.push(Span::styled(format!(" {} ", button.filter.label()), style));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  let c = constants();
  if area.width >= c.compact_width {
    let [grid_area, side_area] =
      Layout::horizontal([Constraint::Min(c.card_width), Constraint::Length(c.quick_list_width)]).areas(area);
    let [player_area, list_area] =
      Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(side_area);
    render_grid(frame, app, grid_area);
    render_player(frame, app, player_area);
    render_quick_list(frame, app, list_area);
    return;
  }

  match app.pane {
    Pane::Gallery => {
      let list_h = (app.gallery.entries().len() as u16 + 2).min(area.height / 3).max(3);
      let [grid_area, list_area] = Layout::vertical([Constraint::Min(3), Constraint::Length(list_h)]).areas(area);
      render_grid(frame, app, grid_area);
      render_quick_list(frame, app, list_area);
    }
    Pane::Player => render_player(frame, app, area),
  }
}

fn render_grid(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let title = format!(" Videos · {} ", app.gallery.active_filter().label());
  let block = rounded_block(theme, title, app.focus == Focus::Grid);
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let card_h = constants().card_height.max(1);
  let columns = grid_columns(inner.width);
  let visible_rows = (inner.height / card_h).max(1) as usize;
  app.grid_columns = columns;
  app.ensure_cursor_visible(visible_rows);

  let cards: Vec<Card> = app.gallery.render_grid().into_iter().filter(|c| c.visible).collect();
  if cards.is_empty() {
    let empty =
      Paragraph::new("No videos in this genre.").style(Style::default().fg(theme.muted)).alignment(Alignment::Center);
    frame.render_widget(empty, inner);
    return;
  }

  let card_w = inner.width / columns as u16;
  for (i, card) in cards.iter().enumerate() {
    let row = i / columns;
    if row < app.grid_scroll || row >= app.grid_scroll + visible_rows {
      continue;
    }
    let col = (i % columns) as u16;
    let cell = Rect {
      x: inner.x + col * card_w,
      y: inner.y + (row - app.grid_scroll) as u16 * card_h,
      width: card_w,
      height: card_h.min(inner.height),
    };
    let focused = app.focus == Focus::Grid && i == app.grid_cursor;
    render_card(frame, theme, card, focused, cell);
  }
}

fn render_card(frame: &mut Frame, theme: &Theme, card: &Card, focused: bool, area: Rect) {
  let border = if card.active { theme.active_border } else { theme.border };
  let block = Block::bordered()
    .border_type(if card.active { BorderType::Thick } else { BorderType::Rounded })
    .border_style(Style::default().fg(border))
    .padding(Padding::horizontal(1));
  let inner_w = area.width.saturating_sub(4) as usize;

  let title_style = if focused {
    Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)
  };
  let lines = vec![
    Line::from(Span::styled(truncate_str(card.title, inner_w), title_style)),
    Line::from(Span::styled(truncate_str(&card.subtitle, inner_w), Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_player(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let mode_label =
    Span::styled(format!("[{}] ", app.display_mode.label().to_lowercase()), Style::default().fg(theme.muted));
  let title = Line::from(vec![Span::raw(" Player "), mode_label]);
  let block = rounded_block(theme, title, app.pane == Pane::Player).padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let inner_w = inner.width as usize;
  let now_playing = app.gallery.now_playing().cloned();
  let mut lines = Vec::new();
  let thumb_id = match &now_playing {
    Some(now) => {
      lines.push(Line::from(Span::styled(
        truncate_str(&now.title, inner_w),
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
      )));
      lines.push(Line::from(Span::styled(truncate_str(&now.meta, inner_w), Style::default().fg(theme.muted))));
      lines.push(Line::from(Span::styled(
        truncate_str(&now.embed_url, inner_w),
        Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
      )));
      let in_mpv = app.player.is_playing() && app.player.video_id.as_deref() == Some(now.id.as_str());
      let state = match (in_mpv, app.player.paused) {
        (true, true) => "⏸ paused",
        (true, false) => "♪ playing in mpv",
        (false, _) => "■ stopped",
      };
      lines.push(Line::from(Span::styled(state, Style::default().fg(theme.status))));
      Some(now.id.clone())
    }
    None => {
      let preview = app.gallery.render_grid().into_iter().find(|c| c.active).map(|c| (c.alt, c.thumbnail_url));
      if let Some((alt, thumbnail_url)) = &preview {
        lines.push(Line::from(Span::styled(truncate_str(alt, inner_w), Style::default().fg(theme.fg))));
        lines.push(Line::from(Span::styled(truncate_str(thumbnail_url, inner_w), Style::default().fg(theme.muted))));
      }
      lines.push(Line::from(Span::styled("Press Enter to play.", Style::default().fg(theme.muted))));
      app.gallery.active_id().map(str::to_string)
    }
  };

  let text_h = (lines.len() as u16).min(inner.height);
  let [thumb_area, text_area] =
    Layout::vertical([Constraint::Min(0), Constraint::Length(text_h)]).areas(inner);
  frame.render_widget(Paragraph::new(lines), text_area);

  if let Some(id) = thumb_id {
    render_thumbnail(frame, app, &id, thumb_area);
  }
}

fn render_thumbnail(frame: &mut Frame, app: &mut App, id: &str, area: Rect) {
  if area.is_empty() || !app.display_mode.shows_thumbnails() {
    return;
  }
  let Some(image) = app.thumbs.images.get(id) else {
    let loading =
      Paragraph::new("loading thumbnail…").style(Style::default().fg(app.theme().muted)).alignment(Alignment::Center);
    frame.render_widget(loading, area);
    return;
  };

  let needs_resize = match &app.thumbs.resized {
    Some((cached_id, cached_area, _)) => cached_id != id || *cached_area != area,
    None => true,
  };
  if needs_resize {
    let fitted = fit_thumbnail(image, area, app.display_mode);
    app.thumbs.resized = Some((id.to_string(), area, fitted));
  }
  if let Some((_, _, ref resized)) = app.thumbs.resized {
    frame.render_widget(ThumbnailWidget { image: resized, display_mode: app.display_mode }, area);
  }
}

fn render_quick_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(6) as usize;
  let items: Vec<ListItem> = app
    .gallery
    .render_quick_list()
    .into_iter()
    .enumerate()
    .map(|(i, item)| {
      let playing = app.player.is_playing() && app.player.video_id.as_deref() == Some(item.id);
      let marker = match (playing, item.active) {
        (true, _) => "♪ ",
        (false, true) => "● ",
        (false, false) => "  ",
      };
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      let fg = if item.active { theme.accent } else { theme.fg };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.accent)),
        Span::styled(truncate_str(&item.label, inner_w), Style::default().fg(fg)),
      ]))
      .bg(bg)
    })
    .collect();

  let focused = app.focus == Focus::QuickList;
  let mut list = List::new(items).block(rounded_block(theme, " Quick list ", focused));
  if focused {
    list = list
      .highlight_symbol("▶ ")
      .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  } else {
    list = list.highlight_symbol("  ");
  }
  frame.render_stateful_widget(list, area, &mut app.quick_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(status) = app.player.last_status() {
    (format!(" ♪ {}", status), Style::default().fg(theme.status))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ {}", info), Style::default().fg(theme.muted))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut keys: Vec<(&str, &str)> = match app.focus {
    Focus::Grid => vec![("Enter", "Play"), ("←↑↓→", "Move")],
    Focus::QuickList => vec![("Enter", "Play"), ("j/k", "Move")],
    Focus::Filters => vec![("Enter", "Apply"), ("←/→", "Move")],
  };
  keys.push(("0-9", "Genre"));
  keys.push(("Tab", "Focus"));
  if app.player.is_playing() {
    keys.push(("Space", if app.player.paused { "Resume" } else { "Pause" }));
    keys.push(("^s", "Stop"));
  }
  if app.gallery.now_playing().is_some() {
    keys.push(("^o", "Browser"));
  }
  keys.push(("^t", "Theme"));
  keys.push(("q", "Quit"));

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();
  frame.render_widget(Line::from(spans), area);

  let right_label = format!("{} · {} ", theme.name, chrono::Local::now().year());
  let right = Line::from(Span::styled(&right_label, Style::default().fg(theme.muted)));
  let label_w = right_label.width() as u16;
  let right_area = Rect { x: area.x + area.width.saturating_sub(label_w), width: label_w.min(area.width), ..area };
  frame.render_widget(right, right_area);
}
