use std::path::PathBuf;

use color_eyre::eyre::Result;
use ratatui::style::{Color, Modifier, Style};
use serde::{
    de::{self, Deserializer},
    Deserialize,
};

const CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Simulation steps per second
    pub tick_rate: f64,
    /// Screen refreshes per second
    pub frame_rate: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { tick_rate: 5.0, frame_rate: 30.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub ornament_chance: f64,
    pub palette: TreePalette,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { ornament_chance: 0.2, palette: TreePalette::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    pub spawn_chance: f64,
    pub settle_chance: f64,
    pub palette: SnowPalette,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self { spawn_chance: 1.0, settle_chance: 0.5, palette: SnowPalette::default() }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub snow: SnowConfig,
}

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        let data_dir = crate::utils::get_data_dir();
        let config_dir = crate::utils::get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Yaml));

        let config_files = [("config.yaml", config::FileFormat::Yaml)];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!("No user configuration file found in {}, using defaults", config_dir.display());
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let AnimationConfig { tick_rate, frame_rate } = self.animation;
        if !(tick_rate.is_finite() && tick_rate > 0.0) {
            return Err(config::ConfigError::Message(format!("animation.tick_rate must be positive, got {tick_rate}")));
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(config::ConfigError::Message(format!(
                "animation.frame_rate must be positive, got {frame_rate}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct _RawTreePalette {
    pub star: String,
    pub foliage: String,
    pub stump: String,
    pub ornaments: Vec<String>,
}

impl Default for _RawTreePalette {
    fn default() -> Self {
        Self {
            star: "yellow".to_string(),
            foliage: "green".to_string(),
            stump: "rgb210".to_string(),
            ornaments: ["yellow", "red", "blue", "cyan"].map(String::from).to_vec(),
        }
    }
}

/// Styles for every part of the tree. Ornament colors are picked from `ornaments`.
#[derive(Clone, Debug, PartialEq)]
pub struct TreePalette {
    pub star: Style,
    pub foliage: Style,
    pub stump: Style,
    pub ornaments: Vec<Style>,
}

impl From<_RawTreePalette> for TreePalette {
    fn from(raw: _RawTreePalette) -> Self {
        Self {
            star: parse_style(&raw.star),
            foliage: parse_style(&raw.foliage),
            stump: parse_style(&raw.stump),
            ornaments: raw.ornaments.iter().map(|s| parse_style(s)).collect(),
        }
    }
}

impl Default for TreePalette {
    fn default() -> Self {
        _RawTreePalette::default().into()
    }
}

impl<'de> Deserialize<'de> for TreePalette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = _RawTreePalette::deserialize(deserializer)?;
        if raw.ornaments.is_empty() {
            return Err(de::Error::custom("tree palette needs at least one ornament color"));
        }
        Ok(raw.into())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct _RawSnowPalette {
    pub snowflake: String,
    pub snowdrift: String,
}

impl Default for _RawSnowPalette {
    fn default() -> Self {
        Self { snowflake: "white".to_string(), snowdrift: "white".to_string() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnowPalette {
    pub snowflake: Style,
    pub snowdrift: Style,
}

impl From<_RawSnowPalette> for SnowPalette {
    fn from(raw: _RawSnowPalette) -> Self {
        Self { snowflake: parse_style(&raw.snowflake), snowdrift: parse_style(&raw.snowdrift) }
    }
}

impl Default for SnowPalette {
    fn default() -> Self {
        _RawSnowPalette::default().into()
    }
}

impl<'de> Deserialize<'de> for SnowPalette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(_RawSnowPalette::deserialize(deserializer)?.into())
    }
}

/// Parses styles such as `"bold red on blue"`, `"rgb210"` or `"color94"`.
pub fn parse_style(line: &str) -> Style {
    let line = line.to_lowercase();
    let (foreground, background) = line.split_at(line.find("on ").unwrap_or(line.len()));
    let foreground = process_color_string(foreground);
    let background = process_color_string(&background.replacen("on ", "", 1));

    let mut style = Style::default();
    if let Some(fg) = parse_color(&foreground.0) {
        style = style.fg(fg);
    }
    if let Some(bg) = parse_color(&background.0) {
        style = style.bg(bg);
    }
    style.add_modifier(foreground.1 | background.1)
}

fn process_color_string(color_str: &str) -> (String, Modifier) {
    let color = color_str
        .to_lowercase()
        .replace("grey", "gray")
        .replace("bright ", "")
        .replace("bold ", "")
        .replace("underline ", "")
        .replace("inverse ", "");

    let mut modifiers = Modifier::empty();
    if color_str.contains("underline") {
        modifiers |= Modifier::UNDERLINED;
    }
    if color_str.contains("bold") {
        modifiers |= Modifier::BOLD;
    }
    if color_str.contains("inverse") {
        modifiers |= Modifier::REVERSED;
    }

    (color, modifiers)
}

fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(index) = s.strip_prefix("color") {
        Some(Color::Indexed(index.parse::<u8>().unwrap_or_default()))
    } else if let Some(level) = s.strip_prefix("gray") {
        Some(Color::Indexed(232u8.saturating_add(level.parse::<u8>().unwrap_or_default())))
    } else if let Some(digits) = s.strip_prefix("rgb") {
        let mut channels = digits.chars().map(|c| c.to_digit(6).unwrap_or_default() as u8);
        let red = channels.next().unwrap_or_default();
        let green = channels.next().unwrap_or_default();
        let blue = channels.next().unwrap_or_default();
        Some(Color::Indexed(16 + red * 36 + green * 6 + blue))
    } else {
        let index = match s {
            "black" => 0,
            "red" => 1,
            "green" => 2,
            "yellow" => 3,
            "blue" => 4,
            "magenta" => 5,
            "cyan" => 6,
            "white" => 7,
            _ => return None,
        };
        Some(Color::Indexed(index))
    }
}
