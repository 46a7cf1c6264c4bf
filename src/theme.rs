use ratatui::style::Color;

/// Color palette for every part of the UI.
#[derive(Debug)]
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  /// Border of the highlighted card.
  pub active_border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "violet",
    bg: Color::Rgb(15, 14, 23),
    fg: Color::Rgb(230, 228, 240),
    accent: Color::Rgb(167, 139, 250),
    muted: Color::Rgb(124, 120, 145),
    border: Color::Rgb(48, 45, 66),
    active_border: Color::Rgb(124, 58, 237),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(76, 29, 149),
    stripe_bg: Color::Rgb(21, 20, 31),
    status: Color::Rgb(134, 239, 172),
    error: Color::Rgb(248, 113, 113),
    key_fg: Color::Rgb(15, 14, 23),
    key_bg: Color::Rgb(167, 139, 250),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(250, 248, 243),
    fg: Color::Rgb(40, 40, 40),
    accent: Color::Rgb(190, 70, 40),
    muted: Color::Rgb(130, 125, 115),
    border: Color::Rgb(210, 205, 195),
    active_border: Color::Rgb(190, 70, 40),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(190, 70, 40),
    stripe_bg: Color::Rgb(242, 239, 232),
    status: Color::Rgb(40, 120, 70),
    error: Color::Rgb(180, 30, 30),
    key_fg: Color::Rgb(250, 248, 243),
    key_bg: Color::Rgb(90, 85, 80),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Magenta,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    active_border: Color::Magenta,
    highlight_fg: Color::Black,
    highlight_bg: Color::Magenta,
    stripe_bg: Color::Reset,
    status: Color::Green,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name`, falling back to the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}
