pub mod snow;
pub mod tree;

pub const BLANK: char = ' ';
