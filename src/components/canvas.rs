use ratatui::{
    buffer::Buffer,
    layout::{Rect, Size},
    style::Style,
    widgets::Widget,
};

use super::Surface;

/// Off-screen buffer that keeps everything painted so far between frames.
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: Buffer,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self { buffer: Buffer::empty(Rect::new(0, 0, size.width, size.height)) }
    }

    /// Changes the canvas size, keeping the region both sizes have in common.
    pub fn resize(&mut self, size: Size) {
        let mut resized = Buffer::empty(Rect::new(0, 0, size.width, size.height));
        let area = resized.area.intersection(self.buffer.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), resized.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
        self.buffer = resized;
    }

    pub fn symbol(&self, x: u16, y: u16) -> Option<&str> {
        self.buffer.cell((x, y)).map(|cell| cell.symbol())
    }

    pub fn style(&self, x: u16, y: u16) -> Option<Style> {
        self.buffer.cell((x, y)).map(|cell| cell.style())
    }

    /// Every row as text, trailing blanks removed.
    pub fn lines(&self) -> Vec<String> {
        let area = self.buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let line: String = (area.left()..area.right()).filter_map(|x| self.symbol(x, y)).collect();
                line.trim_end().to_string()
            })
            .collect()
    }
}

impl Surface for Canvas {
    fn size(&self) -> Size {
        self.buffer.area.as_size()
    }

    fn clear(&mut self) {
        self.buffer.reset();
    }

    fn put(&mut self, x: u16, y: u16, symbol: char, style: Style) {
        if let Some(cell) = self.buffer.cell_mut((x, y)) {
            cell.set_char(symbol).set_style(style);
        }
    }
}

impl Widget for &Canvas {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let area = area.intersection(buf.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x - area.x, y - area.y)), buf.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
    }
}
