use rand::Rng;
use ratatui::{layout::Size, style::Style};

use super::Surface;
use crate::{
    config::{SnowConfig, SnowPalette},
    constants::{
        snow::{SNOWDRIFT, SNOWFLAKE},
        BLANK,
    },
};

/// Screen cells that falling snow cannot pass through.
pub trait Silhouette {
    fn is_occupied(&self, x: u16, y: u16) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snowflake {
    pub x: u16,
    pub y: u16,
}

impl Snowflake {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Cells where snow has settled. A settled cell stays settled for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnowMap {
    width: u16,
    height: u16,
    cells: Vec<bool>,
}

impl SnowMap {
    pub fn new(size: Size) -> Self {
        Self { width: size.width, height: size.height, cells: vec![false; size.width as usize * size.height as usize] }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn is_settled(&self, x: u16, y: u16) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index])
    }

    pub fn settle(&mut self, x: u16, y: u16) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] = true;
        }
    }

    pub fn settled(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }
}

/// What happened to the snowflakes during one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub settled: usize,
    pub melted: usize,
    pub absorbed: usize,
    pub spawned: usize,
}

/// Snow falling one row per tick from the top edge of the screen.
///
/// A flake is absorbed when the cell below it belongs to the tree. When the cell below is
/// settled snow or the bottom edge it either settles in place or melts. The screen size
/// is fixed at construction.
#[derive(Debug)]
pub struct SnowSimulation<R> {
    size: Size,
    spawn_chance: f64,
    settle_chance: f64,
    palette: SnowPalette,
    snow_map: SnowMap,
    snowflakes: Vec<Snowflake>,
    rng: R,
}

impl<R: Rng> SnowSimulation<R> {
    pub fn new(size: Size, config: &SnowConfig, rng: R) -> Self {
        Self {
            size,
            spawn_chance: config.spawn_chance,
            settle_chance: config.settle_chance,
            palette: config.palette.clone(),
            snow_map: SnowMap::new(size),
            snowflakes: Vec::new(),
            rng,
        }
    }

    pub fn tick(&mut self, tree: &impl Silhouette, surface: &mut impl Surface) -> TickSummary {
        let mut summary = TickSummary::default();
        let mut next = Vec::with_capacity(self.snowflakes.len() + 1);

        for flake in std::mem::take(&mut self.snowflakes) {
            let below = flake.y.saturating_add(1);

            if tree.is_occupied(flake.x, below) {
                erase(tree, surface, flake);
                summary.absorbed += 1;
                continue;
            }

            if below >= self.size.height || self.snow_map.is_settled(flake.x, below) {
                if self.rng.gen::<f64>() < self.settle_chance {
                    self.snow_map.settle(flake.x, flake.y);
                    surface.put(flake.x, flake.y, SNOWDRIFT, self.palette.snowdrift);
                    summary.settled += 1;
                } else {
                    erase(tree, surface, flake);
                    summary.melted += 1;
                }
                continue;
            }

            erase(tree, surface, flake);
            next.push(Snowflake::new(flake.x, below));
        }

        if let Some(flake) = self.spawn() {
            next.push(flake);
            summary.spawned += 1;
        }

        for flake in &next {
            if !tree.is_occupied(flake.x, flake.y) {
                surface.put(flake.x, flake.y, SNOWFLAKE, self.palette.snowflake);
            }
        }
        self.snowflakes = next;

        summary
    }

    fn spawn(&mut self) -> Option<Snowflake> {
        if self.size.width == 0 || self.size.height == 0 || self.rng.gen::<f64>() >= self.spawn_chance {
            return None;
        }
        let x = self.rng.gen_range(0..self.size.width);
        (!self.snow_map.is_settled(x, 0)).then(|| Snowflake::new(x, 0))
    }
}

impl<R> SnowSimulation<R> {
    pub fn snowflakes(&self) -> &[Snowflake] {
        &self.snowflakes
    }

    pub fn snow_map(&self) -> &SnowMap {
        &self.snow_map
    }
}

fn erase(tree: &impl Silhouette, surface: &mut impl Surface, flake: Snowflake) {
    if !tree.is_occupied(flake.x, flake.y) {
        surface.put(flake.x, flake.y, BLANK, Style::default());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::components::canvas::Canvas;

    struct OpenSky;

    impl Silhouette for OpenSky {
        fn is_occupied(&self, _x: u16, _y: u16) -> bool {
            false
        }
    }

    struct Cells(Vec<(u16, u16)>);

    impl Silhouette for Cells {
        fn is_occupied(&self, x: u16, y: u16) -> bool {
            self.0.contains(&(x, y))
        }
    }

    fn simulation(size: Size, spawn_chance: f64, settle_chance: f64) -> SnowSimulation<StdRng> {
        let config = SnowConfig { spawn_chance, settle_chance, ..SnowConfig::default() };
        SnowSimulation::new(size, &config, StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_spawn_on_top_row() {
        let size = Size::new(10, 5);
        let mut snow = simulation(size, 1.0, 0.5);
        let mut canvas = Canvas::new(size);

        let summary = snow.tick(&OpenSky, &mut canvas);

        assert_eq!(summary, TickSummary { spawned: 1, ..TickSummary::default() });
        let flake = snow.snowflakes()[0];
        assert_eq!(flake.y, 0);
        assert_eq!(canvas.symbol(flake.x, 0), Some("❆"));
    }

    #[test]
    fn test_spawn_disabled() {
        let mut snow = simulation(Size::new(10, 5), 0.0, 0.5);
        let mut canvas = Canvas::new(Size::new(10, 5));

        for _ in 0..10 {
            snow.tick(&OpenSky, &mut canvas);
        }
        assert!(snow.snowflakes().is_empty());
    }

    #[test]
    fn test_spawn_skips_settled_top_cell() {
        let mut snow = simulation(Size::new(1, 3), 1.0, 0.5);
        snow.snow_map.settle(0, 0);

        let summary = snow.tick(&OpenSky, &mut Canvas::new(Size::new(1, 3)));

        assert_eq!(summary.spawned, 0);
        assert!(snow.snowflakes().is_empty());
    }

    #[test]
    fn test_flake_falls_one_row() {
        let size = Size::new(10, 5);
        let mut snow = simulation(size, 0.0, 0.5);
        let mut canvas = Canvas::new(size);
        snow.snowflakes = vec![Snowflake::new(3, 1)];
        canvas.put(3, 1, SNOWFLAKE, Style::default());

        snow.tick(&OpenSky, &mut canvas);

        assert_eq!(snow.snowflakes(), &[Snowflake::new(3, 2)]);
        assert_eq!(canvas.symbol(3, 1), Some(" "));
        assert_eq!(canvas.symbol(3, 2), Some("❆"));
    }

    #[test]
    fn test_flake_absorbed_by_tree() {
        let size = Size::new(10, 5);
        let mut snow = simulation(size, 0.0, 1.0);
        let mut canvas = Canvas::new(size);
        snow.snowflakes = vec![Snowflake::new(3, 2)];

        let summary = snow.tick(&Cells(vec![(3, 3)]), &mut canvas);

        assert_eq!(summary.absorbed, 1);
        assert!(snow.snowflakes().is_empty());
        assert!(!snow.snow_map().is_settled(3, 2));
    }

    #[test]
    fn test_absorbed_snow_never_settles() {
        let size = Size::new(6, 6);
        let ground: Vec<(u16, u16)> = (0..6).map(|x| (x, 4)).collect();
        let tree = Cells(ground);
        let mut snow = simulation(size, 1.0, 1.0);
        let mut canvas = Canvas::new(size);

        let mut absorbed = 0;
        for _ in 0..200 {
            absorbed += snow.tick(&tree, &mut canvas).absorbed;
        }

        assert!(absorbed > 0);
        assert_eq!(snow.snow_map().settled(), 0);
    }

    #[test]
    fn test_flake_settles_on_snow() {
        let size = Size::new(10, 6);
        let mut snow = simulation(size, 0.0, 1.0);
        let mut canvas = Canvas::new(size);
        snow.snow_map.settle(4, 3);
        snow.snowflakes = vec![Snowflake::new(4, 2)];

        let summary = snow.tick(&OpenSky, &mut canvas);

        assert_eq!(summary.settled, 1);
        assert!(snow.snowflakes().is_empty());
        assert!(snow.snow_map().is_settled(4, 2));
        assert_eq!(canvas.symbol(4, 2), Some("█"));
    }

    #[test]
    fn test_flake_melts_on_snow() {
        let size = Size::new(10, 6);
        let mut snow = simulation(size, 0.0, 0.0);
        let mut canvas = Canvas::new(size);
        snow.snow_map.settle(4, 3);
        snow.snowflakes = vec![Snowflake::new(4, 2)];
        canvas.put(4, 2, SNOWFLAKE, Style::default());

        let summary = snow.tick(&OpenSky, &mut canvas);

        assert_eq!(summary.melted, 1);
        assert!(snow.snowflakes().is_empty());
        assert!(!snow.snow_map().is_settled(4, 2));
        assert_eq!(canvas.symbol(4, 2), Some(" "));
    }

    #[test]
    fn test_flake_settles_on_bottom_row() {
        let size = Size::new(5, 5);
        let mut snow = simulation(size, 0.0, 1.0);
        snow.snowflakes = vec![Snowflake::new(2, 4)];

        snow.tick(&OpenSky, &mut Canvas::new(size));

        assert!(snow.snow_map().is_settled(2, 4));
        assert!(snow.snowflakes().is_empty());
    }

    #[test]
    fn test_flake_never_drawn_over_tree() {
        let size = Size::new(1, 5);
        let tree = Cells(vec![(0, 0)]);
        let mut snow = simulation(size, 1.0, 0.5);
        let mut canvas = Canvas::new(size);
        canvas.put(0, 0, '*', Style::default());

        snow.tick(&tree, &mut canvas);
        assert_eq!(snow.snowflakes(), &[Snowflake::new(0, 0)]);
        assert_eq!(canvas.symbol(0, 0), Some("*"));

        snow.spawn_chance = 0.0;
        snow.tick(&tree, &mut canvas);
        assert_eq!(snow.snowflakes(), &[Snowflake::new(0, 1)]);
        assert_eq!(canvas.symbol(0, 0), Some("*"));
        assert_eq!(canvas.symbol(0, 1), Some("❆"));
    }

    #[test]
    fn test_snow_map_only_grows() {
        let size = Size::new(12, 8);
        let tree = Cells(vec![(5, 5), (6, 5), (6, 4)]);
        let mut snow = simulation(size, 1.0, 0.5);
        let mut canvas = Canvas::new(size);

        let mut previous = snow.snow_map().clone();
        for _ in 0..400 {
            snow.tick(&tree, &mut canvas);
            let current = snow.snow_map();
            for y in 0..size.height {
                for x in 0..size.width {
                    assert!(!previous.is_settled(x, y) || current.is_settled(x, y));
                }
            }
            assert!(current.settled() >= previous.settled());
            previous = current.clone();
        }
        assert!(previous.settled() > 0);
    }

    #[test]
    fn test_empty_screen() {
        let size = Size::new(0, 0);
        let mut snow = simulation(size, 1.0, 1.0);

        assert_eq!(snow.tick(&OpenSky, &mut Canvas::new(size)), TickSummary::default());
        assert!(snow.snowflakes().is_empty());
    }

    #[test]
    fn test_snow_map_bounds() {
        let mut map = SnowMap::new(Size::new(3, 2));
        map.settle(3, 0);
        map.settle(0, 2);
        map.settle(2, 1);

        assert_eq!(map.settled(), 1);
        assert!(map.is_settled(2, 1));
        assert!(!map.is_settled(u16::MAX, 0));
    }
}
