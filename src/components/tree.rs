use color_eyre::eyre::{ensure, Result};
use derive_deref::Deref;
use rand::{seq::SliceRandom, Rng};
use ratatui::{
    layout::{Position, Size},
    style::Style,
};

use super::{snow::Silhouette, Surface};
use crate::{
    config::{TreeConfig, TreePalette},
    constants::{tree::*, BLANK},
};

/// A single character of the tree together with its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub symbol: char,
    pub style: Style,
}

impl Pixel {
    pub fn new(symbol: char, style: Style) -> Self {
        Self { symbol, style }
    }

    pub fn blank() -> Self {
        Self::new(BLANK, Style::default())
    }

    pub fn is_blank(&self) -> bool {
        self.symbol == BLANK
    }

    pub fn is_ornament(&self) -> bool {
        ORNAMENTS.contains(&self.symbol)
    }
}

/// Rows of pixels, top to bottom. Rows are left-padded with blanks and differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Grid(Vec<Vec<Pixel>>);

impl Grid {
    pub fn height(&self) -> usize {
        self.0.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.0.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&Pixel> {
        self.0.get(y).and_then(|row| row.get(x))
    }
}

/// Grid coordinate of an ornament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GarlandPoint {
    pub x: usize,
    pub y: usize,
}

/// Procedurally decorated tree: a star, `tiers - 1` branch rows and a stump.
///
/// The grid is generated once in [`TreeGenerator::new`]. The screen origin keeps it
/// horizontally centered with its last row one line above the bottom of the screen.
#[derive(Debug)]
pub struct TreeGenerator<R> {
    tiers: usize,
    ornament_chance: f64,
    palette: TreePalette,
    grid: Grid,
    garland: Vec<GarlandPoint>,
    origin: Position,
    rng: R,
}

impl<R: Rng> TreeGenerator<R> {
    pub fn new(tiers: usize, config: &TreeConfig, area: Size, rng: R) -> Result<Self> {
        ensure!(
            (MIN_TIERS..=MAX_TIERS).contains(&tiers),
            "tier count must be between {MIN_TIERS} and {MAX_TIERS}, got {tiers}"
        );

        let mut tree = Self {
            tiers,
            ornament_chance: config.ornament_chance,
            palette: config.palette.clone(),
            grid: Grid::default(),
            garland: Vec::new(),
            origin: Position::default(),
            rng,
        };
        tree.build();
        tree.compute_placement(area);

        Ok(tree)
    }

    /// Regenerates the grid and the garland from the random source.
    pub fn build(&mut self) {
        let mut rows = self.star();
        for index in 2..=self.tiers {
            let branch = self.branch(index);
            rows.push(branch);
        }
        rows.extend(self.stump());

        self.grid = Grid(rows);
        self.garland = scan_garland(&self.grid);

        tracing::debug!(tiers = self.tiers, rows = self.grid.height(), ornaments = self.garland.len(), "built tree");
    }

    pub fn compute_placement(&mut self, area: Size) {
        let width = u16::try_from(self.grid.width()).unwrap_or(u16::MAX);
        let height = u16::try_from(self.grid.height()).unwrap_or(u16::MAX);

        self.origin =
            Position::new(area.width.saturating_sub(width) / 2, area.height.saturating_sub(height.saturating_add(1)));
    }

    /// Clears the surface and paints the whole tree with its stored colors.
    pub fn render(&self, surface: &mut impl Surface) {
        surface.clear();
        for (y, row) in self.grid.iter().enumerate() {
            for (x, pixel) in row.iter().enumerate() {
                if let Some(pos) = self.to_screen(x, y) {
                    surface.put(pos.x, pos.y, pixel.symbol, pixel.style);
                }
            }
        }
    }

    /// Repaints every on-screen ornament in a random palette color and returns how many
    /// were painted. The stored grid keeps its colors.
    pub fn animate_ornaments(&mut self, surface: &mut impl Surface) -> usize {
        let mut painted = 0;
        for point in &self.garland {
            let Some(pixel) = self.grid.pixel(point.x, point.y) else {
                continue;
            };
            let Some(pos) = self.to_screen(point.x, point.y) else {
                continue;
            };
            if !surface.contains(pos.x, pos.y) {
                continue;
            }

            let style = pick_style(&self.palette.ornaments, self.palette.foliage, &mut self.rng);
            surface.put(pos.x, pos.y, pixel.symbol, style);
            painted += 1;
        }
        painted
    }

    fn center(&self) -> usize {
        self.tiers - 1
    }

    fn star(&self) -> Vec<Vec<Pixel>> {
        let indent = self.center() - STAR_WIDTH / 2;
        let star = self.palette.star;
        let row = |text: &str| -> Vec<Pixel> { blanks(indent).chain(pixels(text, star)).collect() };

        let mut base: Vec<Pixel> = blanks(indent).chain(pixels(STAR_BASE_LEFT, star)).collect();
        base.push(Pixel::new(FOLIAGE, self.palette.foliage));
        base.extend(pixels(STAR_BASE_RIGHT, star));

        vec![row(STAR_TOP), row(STAR_MIDDLE), base]
    }

    fn branch(&mut self, index: usize) -> Vec<Pixel> {
        let mut row: Vec<Pixel> = blanks(self.tiers - index).collect();
        let mut last_was_ornament = false;

        for _ in 0..(index * 2 - 1) {
            if !last_was_ornament && self.rng.gen::<f64>() < self.ornament_chance {
                let ornament = self.ornament();
                row.push(ornament);
                last_was_ornament = true;
            } else {
                row.push(Pixel::new(FOLIAGE, self.palette.foliage));
                last_was_ornament = false;
            }
        }
        row
    }

    fn ornament(&mut self) -> Pixel {
        let symbol = ORNAMENTS[self.rng.gen_range(0..ORNAMENTS.len())];
        let style = pick_style(&self.palette.ornaments, self.palette.foliage, &mut self.rng);
        Pixel::new(symbol, style)
    }

    fn stump(&self) -> Vec<Vec<Pixel>> {
        let height = self.tiers / 3;
        let width = self.tiers / 4;
        let indent = self.center() - width / 2;
        let stump = Pixel::new(STUMP, self.palette.stump);

        (0..height).map(|_| blanks(indent).chain(std::iter::repeat_n(stump, width)).collect()).collect()
    }
}

impl<R> TreeGenerator<R> {
    pub fn tiers(&self) -> usize {
        self.tiers
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn garland(&self) -> &[GarlandPoint] {
        &self.garland
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    fn to_screen(&self, x: usize, y: usize) -> Option<Position> {
        let x = u16::try_from(x).ok()?.checked_add(self.origin.x)?;
        let y = u16::try_from(y).ok()?.checked_add(self.origin.y)?;
        Some(Position::new(x, y))
    }
}

impl<R> Silhouette for TreeGenerator<R> {
    fn is_occupied(&self, x: u16, y: u16) -> bool {
        let (Some(x), Some(y)) = (x.checked_sub(self.origin.x), y.checked_sub(self.origin.y)) else {
            return false;
        };
        self.grid.pixel(x as usize, y as usize).is_some_and(|pixel| !pixel.is_blank())
    }
}

fn blanks(count: usize) -> impl Iterator<Item = Pixel> {
    std::iter::repeat_n(Pixel::blank(), count)
}

fn pixels(text: &str, style: Style) -> impl Iterator<Item = Pixel> + '_ {
    text.chars().map(move |symbol| Pixel::new(symbol, style))
}

fn pick_style<R: Rng>(styles: &[Style], fallback: Style, rng: &mut R) -> Style {
    styles.choose(rng).copied().unwrap_or(fallback)
}

fn scan_garland(grid: &Grid) -> Vec<GarlandPoint> {
    grid.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter().enumerate().filter(|(_, pixel)| pixel.is_ornament()).map(move |(x, _)| GarlandPoint { x, y })
        })
        .collect()
}
