use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

const ASCII_RAMP: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

/// Pixel size a thumbnail must be resized to before it fills `area`.
///
/// Half-blocks pack two pixel rows per cell; ASCII uses one char per pixel
/// and cells are roughly twice as tall as wide, so both keep ~16:9.
pub fn target_size(area: Rect, mode: DisplayMode) -> (u32, u32) {
  let w = area.width as u32;
  let h = match mode {
    DisplayMode::Direct => (area.height as u32 * 2).min(w * 9 / 16),
    DisplayMode::Ascii | DisplayMode::Off => (area.height as u32).min(w * 9 / 32),
  };
  (w.max(1), h.max(1))
}

/// Resize once per (video, area); the caller caches the result.
pub fn fit_thumbnail(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let (w, h) = target_size(area, mode);
  image.resize_to_fill(w, h, FilterType::Triangle)
}

// --- Thumbnail Widget ---

/// Draws an already-resized thumbnail centered in its area.
pub struct ThumbnailWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

impl Widget for ThumbnailWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_direct(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
      DisplayMode::Off => {}
    }
  }
}

fn cell_pos(area: Rect, offset: u32, i: u32) -> u16 {
  area.x.saturating_add(offset.min(u16::MAX as u32) as u16).saturating_add(i.min(u16::MAX as u32) as u16)
}

fn row_pos(area: Rect, offset: u32, i: u32) -> u16 {
  area.y.saturating_add(offset.min(u16::MAX as u32) as u16).saturating_add(i.min(u16::MAX as u32) as u16)
}

fn render_direct(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(area.width as u32);
  let img_h = rgb.height();
  let cell_h = img_h.div_ceil(2).min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

  for y in 0..cell_h {
    for x in 0..img_w {
      let upper = rgb.get_pixel(x, y * 2);
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if y * 2 + 1 < img_h {
        let lower = rgb.get_pixel(x, y * 2 + 1);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      buf.set_string(cell_pos(area, offset_x, x), row_pos(area, offset_y, y), "▀", Style::default().fg(fg).bg(bg));
    }
  }
}

fn ascii_char(luma: u8) -> &'static str {
  let idx = ((luma as f32 / 255.0) * (ASCII_RAMP.len() - 1) as f32).round() as usize;
  ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let gray = image.to_luma8();
  let img_w = gray.width().min(area.width as u32);
  let img_h = gray.height().min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;

  for y in 0..img_h {
    for x in 0..img_w {
      let luma = gray.get_pixel(x, y)[0];
      buf.set_string(cell_pos(area, offset_x, x), row_pos(area, offset_y, y), ascii_char(luma), Style::default());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn ascii_ramp_ends() {
    assert_eq!(ascii_char(0), " ");
    assert_eq!(ascii_char(255), "@");
  }

  #[test]
  fn target_size_keeps_aspect() {
    let area = Rect::new(0, 0, 32, 40);
    assert_eq!(target_size(area, DisplayMode::Direct), (32, 18));
    assert_eq!(target_size(area, DisplayMode::Ascii), (32, 9));
  }

  #[test]
  fn target_size_never_zero() {
    assert_eq!(target_size(Rect::new(0, 0, 0, 0), DisplayMode::Direct), (1, 1));
  }

  #[test]
  fn direct_render_paints_half_blocks() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
    let area = Rect::new(0, 0, 4, 2);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &image, display_mode: DisplayMode::Direct }.render(area, &mut buf);
    let cell = &buf[(0, 0)];
    assert_eq!(cell.symbol(), "▀");
    assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
  }

  #[test]
  fn off_mode_draws_nothing() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
    let area = Rect::new(0, 0, 4, 4);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &image, display_mode: DisplayMode::Off }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), " ");
  }
}
