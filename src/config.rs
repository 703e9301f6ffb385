/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    /// Custom level file; `None` plays the built-in levels.
    pub levels_file: Option<PathBuf>,
    /// Fixed RNG seed for the zero-health jitter; `None` = OS entropy.
    pub seed: Option<u64>,
    pub world: WorldSize,
    pub sprites: SpriteSet,
    pub rules: RulesConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSize {
    pub width: f64,
    pub height: f64,
}

impl SpriteSize {
    pub const fn new(width: f64, height: f64) -> Self {
        SpriteSize { width, height }
    }
}

/// Natural pixel size of every sprite. Hitboxes and the "height"
/// placeholder in level data are derived from these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSet {
    pub player: SpriteSize,
    pub spike: SpriteSize,
    pub drop_spike: SpriteSize,
    pub ladder: SpriteSize,
    pub floor: SpriteSize,
    pub goal: SpriteSize,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub spike_damage: f64,
    pub dash_bonus: f64,
    pub dash_cost: f64,
    pub drop_delay: Duration,
    pub spawn: (f64, f64),
}

impl Default for WorldSize {
    fn default() -> Self {
        WorldSize { width: default_world_width(), height: default_world_height() }
    }
}

impl Default for SpriteSet {
    fn default() -> Self {
        let s = TomlSprites::default();
        s.into()
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlRules::default().into()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    sprites: TomlSprites,
    #[serde(default)]
    rules: TomlRules,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    levels_file: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_world_width")]
    width: f64,
    #[serde(default = "default_world_height")]
    height: f64,
}

/// Each sprite is `[width, height]` in pixels.
#[derive(Deserialize, Debug)]
struct TomlSprites {
    #[serde(default = "default_player")]
    player: (f64, f64),
    #[serde(default = "default_spike")]
    spike: (f64, f64),
    #[serde(default = "default_drop_spike")]
    drop_spike: (f64, f64),
    #[serde(default = "default_ladder")]
    ladder: (f64, f64),
    #[serde(default = "default_floor")]
    floor: (f64, f64),
    #[serde(default = "default_goal")]
    goal: (f64, f64),
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_spike_damage")]
    spike_damage: f64,
    #[serde(default = "default_dash_bonus")]
    dash_bonus: f64,
    #[serde(default = "default_dash_cost")]
    dash_cost: f64,
    #[serde(default = "default_drop_delay")]
    drop_delay_ms: u64,
    #[serde(default = "default_spawn_x")]
    spawn_x: f64,
    #[serde(default = "default_spawn_y")]
    spawn_y: f64,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_world_width() -> f64 { 1000.0 }
fn default_world_height() -> f64 { 1000.0 }
fn default_player() -> (f64, f64) { (100.0, 150.0) }  // spawn y 850 = floor line
fn default_spike() -> (f64, f64) { (60.0, 50.0) }
fn default_drop_spike() -> (f64, f64) { (60.0, 80.0) }
fn default_ladder() -> (f64, f64) { (80.0, 150.0) }
fn default_floor() -> (f64, f64) { (120.0, 30.0) }
fn default_goal() -> (f64, f64) { (100.0, 150.0) }
fn default_spike_damage() -> f64 { 0.5 }
fn default_dash_bonus() -> f64 { crate::domain::rules::DASH_BONUS }
fn default_dash_cost() -> f64 { crate::domain::rules::DASH_COST }
fn default_drop_delay() -> u64 { 485 }
fn default_spawn_x() -> f64 { 0.0 }
fn default_spawn_y() -> f64 { 850.0 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tick_rate_ms: default_tick_rate(), levels_file: None, seed: None }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld { width: default_world_width(), height: default_world_height() }
    }
}

impl Default for TomlSprites {
    fn default() -> Self {
        TomlSprites {
            player: default_player(),
            spike: default_spike(),
            drop_spike: default_drop_spike(),
            ladder: default_ladder(),
            floor: default_floor(),
            goal: default_goal(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            spike_damage: default_spike_damage(),
            dash_bonus: default_dash_bonus(),
            dash_cost: default_dash_cost(),
            drop_delay_ms: default_drop_delay(),
            spawn_x: default_spawn_x(),
            spawn_y: default_spawn_y(),
        }
    }
}

impl From<TomlSprites> for SpriteSet {
    fn from(s: TomlSprites) -> Self {
        let size = |(w, h): (f64, f64)| SpriteSize::new(w, h);
        SpriteSet {
            player: size(s.player),
            spike: size(s.spike),
            drop_spike: size(s.drop_spike),
            ladder: size(s.ladder),
            floor: size(s.floor),
            goal: size(s.goal),
        }
    }
}

impl From<TomlRules> for RulesConfig {
    fn from(r: TomlRules) -> Self {
        RulesConfig {
            spike_damage: r.spike_damage,
            dash_bonus: r.dash_bonus,
            dash_cost: r.dash_cost,
            drop_delay: Duration::from_millis(r.drop_delay_ms),
            spawn: (r.spawn_x, r.spawn_y),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Relative level files are looked up next to config.toml first
        let levels_file = toml_cfg.general.levels_file.as_deref().map(|name| {
            let path = PathBuf::from(name);
            if path.is_absolute() {
                return path;
            }
            search_dirs.iter()
                .map(|d| d.join(name))
                .find(|p| p.is_file())
                .unwrap_or(path)
        });

        Self::from_toml(toml_cfg, levels_file)
    }

    /// Parse a config document directly (no file lookup).
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg: TomlConfig = toml::from_str(text)?;
        let levels_file = cfg.general.levels_file.as_ref().map(PathBuf::from);
        Ok(Self::from_toml(cfg, levels_file))
    }

    fn from_toml(cfg: TomlConfig, levels_file: Option<PathBuf>) -> Self {
        GameConfig {
            tick_rate_ms: cfg.general.tick_rate_ms,
            levels_file,
            seed: cfg.general.seed,
            world: WorldSize { width: cfg.world.width, height: cfg.world.height },
            sprites: cfg.sprites.into(),
            rules: cfg.rules.into(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), None)
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    tracing::debug!("no config.toml found, using defaults");
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.tick_rate_ms, 50);
        assert_eq!(cfg.world, WorldSize { width: 1000.0, height: 1000.0 });
        assert_eq!(cfg.sprites.player, SpriteSize::new(100.0, 150.0));
        assert_eq!(cfg.rules.drop_delay, Duration::from_millis(485));
        assert_eq!(cfg.rules.spawn, (0.0, 850.0));
        assert!(cfg.levels_file.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [general]
            seed = 42
            levels_file = "my_levels.toml"

            [sprites]
            spike = [40, 20]

            [rules]
            drop_delay_ms = 1000
            "#,
        ).unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.levels_file, Some(PathBuf::from("my_levels.toml")));
        assert_eq!(cfg.sprites.spike, SpriteSize::new(40.0, 20.0));
        assert_eq!(cfg.sprites.ladder, SpriteSize::new(80.0, 150.0));
        assert_eq!(cfg.rules.drop_delay, Duration::from_millis(1000));
        assert_eq!(cfg.rules.spike_damage, 0.5);
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(GameConfig::from_toml_str("[world]\nwidth = \"wide\"").is_err());
    }
}
