pub const MIN_TIERS: usize = 3;
/// Upper bound on the tier count; the grid grows with the square of it.
pub const MAX_TIERS: usize = 500;

pub const STAR_TOP: &str = "  *  ";
pub const STAR_MIDDLE: &str = "*****";
pub const STAR_BASE_LEFT: &str = " *";
pub const STAR_BASE_RIGHT: &str = "* ";
pub const STAR_WIDTH: usize = 5;

pub const FOLIAGE: char = '*';
pub const STUMP: char = '|';

pub const ORNAMENTS: [char; 4] = ['o', 'O', '0', '&'];
