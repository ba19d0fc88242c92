use ratatui::{layout::Size, style::Style};

pub mod canvas;
pub mod snow;
pub mod tree;

/// Character-cell drawing target the tree and the snow paint onto.
///
/// Coordinates are screen columns and rows with the origin in the top-left corner.
/// Writes that fall outside [`Surface::size`] are ignored.
pub trait Surface {
    fn size(&self) -> Size;

    fn clear(&mut self);

    fn put(&mut self, x: u16, y: u16, symbol: char, style: Style);

    fn contains(&self, x: u16, y: u16) -> bool {
        let size = self.size();
        x < size.width && y < size.height
    }
}
