pub const SNOWFLAKE: char = '❆';
pub const SNOWDRIFT: char = '█';
