/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels_file` from config.toml (TOML, `[[level]]` tables)
///   2. Built-in embedded levels
///
/// ## Level file format:
///   ```toml
///   [[level]]
///   dialogue = ["first hint", "second hint"]
///   spikes = ["450::height-60::25"]
///   ladders = ["300::height"]
///   drop_spikes = ["400::100-60::40"]
///   ```
///
/// ## Hazard encoding: `"x::y-width::height"`
///   - `x`, `y`: numbers, or the literal `height` which resolves to
///     `world_height - sprite_height` (anchors the hazard to the floor
///     without knowing the world size up front).
///   - `-width::height`: optional; defaults to the sprite's own size.
///
/// Entries are parsed when the level set is loaded. A malformed entry
/// rejects the whole set with an error naming the level and entry, so a
/// broken level is never simulated.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::config::SpriteSize;
use crate::domain::physics::Rect;
use crate::error::LevelError;

/// Placeholder token for "floor line of this sprite".
const SURFACE_TOKEN: &str = "height";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardKind {
    Spike,
    Ladder,
    DropSpike,
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HazardKind::Spike => "spike",
            HazardKind::Ladder => "ladder",
            HazardKind::DropSpike => "drop-spike",
        })
    }
}

/// One coordinate of a hazard position.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Coord {
    Value(f64),
    /// Substituted with `world_height - sprite_height` at resolve time.
    Surface,
}

impl Coord {
    fn resolve(self, surface: f64) -> f64 {
        match self {
            Coord::Value(v) => v,
            Coord::Surface => surface,
        }
    }
}

/// A parsed `"x::y-width::height"` entry, not yet placed in a world.
#[derive(Clone, PartialEq, Debug)]
pub struct HazardSpec {
    pub x: Coord,
    pub y: Coord,
    pub size: Option<(f64, f64)>,
}

impl HazardSpec {
    /// Parse one entry. The error string is the reason only; the caller
    /// wraps it with level and entry context.
    pub fn parse(entry: &str) -> Result<Self, String> {
        let (position, size) = match entry.split_once('-') {
            Some((p, s)) => (p, Some(s)),
            None => (entry, None),
        };

        let (x, y) = split_pair(position)
            .ok_or_else(|| format!("position {position:?} is not of the form x::y"))?;
        let x = parse_coord(x).map_err(|e| format!("x: {e}"))?;
        let y = parse_coord(y).map_err(|e| format!("y: {e}"))?;

        let size = match size {
            None => None,
            Some(s) => {
                let (w, h) = split_pair(s)
                    .ok_or_else(|| format!("size {s:?} is not of the form width::height"))?;
                let w = parse_length(w).map_err(|e| format!("width: {e}"))?;
                let h = parse_length(h).map_err(|e| format!("height: {e}"))?;
                Some((w, h))
            }
        };

        Ok(HazardSpec { x, y, size })
    }

    pub fn size_or(&self, sprite: SpriteSize) -> (f64, f64) {
        self.size.unwrap_or((sprite.width, sprite.height))
    }

    /// Place the hazard in a world of the given height, using `sprite`
    /// for the surface substitution and the default size.
    pub fn resolve(&self, world_height: f64, sprite: SpriteSize) -> Rect {
        let surface = world_height - sprite.height;
        let (w, h) = self.size_or(sprite);
        Rect::new(self.x.resolve(surface), self.y.resolve(surface), w, h)
    }
}

fn split_pair(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.split("::");
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a.trim(), b.trim())),
        _ => None,
    }
}

fn parse_number(token: &str) -> Result<f64, String> {
    let v: f64 = token.parse().map_err(|_| format!("{token:?} is not a number"))?;
    if !v.is_finite() {
        return Err(format!("{token:?} is not finite"));
    }
    Ok(v)
}

fn parse_coord(token: &str) -> Result<Coord, String> {
    if token == SURFACE_TOKEN {
        return Ok(Coord::Surface);
    }
    parse_number(token).map(Coord::Value)
}

fn parse_length(token: &str) -> Result<f64, String> {
    let v = parse_number(token)?;
    if v < 0.0 {
        return Err(format!("{token:?} is negative"));
    }
    Ok(v)
}

/// A fully parsed level.
#[derive(Clone, Debug, Default)]
pub struct Level {
    pub dialogue: Vec<String>,
    pub spikes: Vec<HazardSpec>,
    pub ladders: Vec<HazardSpec>,
    pub drop_spikes: Vec<HazardSpec>,
}

// ══════════════════════════════════════════════════════════════
// Raw records (file / embedded)
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug, Default)]
pub struct LevelRecord {
    #[serde(default)]
    pub dialogue: Vec<String>,
    #[serde(default)]
    pub spikes: Vec<String>,
    #[serde(default)]
    pub ladders: Vec<String>,
    #[serde(default)]
    pub drop_spikes: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct LevelFile {
    #[serde(rename = "level", default)]
    levels: Vec<LevelRecord>,
}

/// Turn a raw record into a level. `number` is 1-based, for messages.
pub fn build_level(number: usize, record: LevelRecord) -> Result<Level, LevelError> {
    let parse_all = |kind: HazardKind, entries: &[String]| -> Result<Vec<HazardSpec>, LevelError> {
        entries.iter()
            .map(|entry| {
                HazardSpec::parse(entry).map_err(|reason| LevelError::MalformedEntry {
                    level: number,
                    kind,
                    entry: entry.clone(),
                    reason,
                })
            })
            .collect()
    };

    Ok(Level {
        spikes: parse_all(HazardKind::Spike, &record.spikes)?,
        ladders: parse_all(HazardKind::Ladder, &record.ladders)?,
        drop_spikes: parse_all(HazardKind::DropSpike, &record.drop_spikes)?,
        dialogue: record.dialogue,
    })
}

pub fn build_levels(records: Vec<LevelRecord>) -> Result<Vec<Level>, LevelError> {
    records.into_iter()
        .enumerate()
        .map(|(i, r)| build_level(i + 1, r))
        .collect()
}

/// Parse a TOML level file body.
pub fn parse_levels(text: &str) -> Result<Vec<Level>, LevelError> {
    let file: LevelFile = toml::from_str(text).map_err(|e| LevelError::Toml(e.to_string()))?;
    build_levels(file.levels)
}

/// Load the level set: custom file when given, embedded levels otherwise.
pub fn load_levels(path: Option<&Path>) -> Result<Vec<Level>, LevelError> {
    let Some(path) = path else {
        tracing::info!("using built-in levels");
        return embedded_levels();
    };
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let levels = parse_levels(&text)?;
    tracing::info!(path = %path.display(), count = levels.len(), "loaded level file");
    Ok(levels)
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Result<Vec<Level>, LevelError> {
    build_levels(vec![
        make_embedded(
            &[
                "Click (or press Enter) to begin.",
                "Move with A / D or the arrow keys.",
                "Hold Shift while moving to dash. Dashing costs stamina.",
                "Reach the flag on the right. Press R to continue.",
            ],
            &[], &[], &[],
        ),
        make_embedded(
            &[
                "Spikes hurt on every frame you touch them.",
                "Walk up to the ladder.",
                "Press W / Up next to a ladder to climb onto its platform.",
                "Walk off the far edge of the platform to come back down.",
            ],
            &["330::height-60::25", "390::height-60::25"],
            &["250::height"],
            &[],
        ),
        make_embedded(
            &[
                "Some spikes fall when you pass beneath them.",
                "Once fallen, they stay where they land.",
            ],
            &["760::height-60::25"],
            &[],
            &["400::100-60::40", "600::100-60::40"],
        ),
    ])
}

fn make_embedded(dialogue: &[&str], spikes: &[&str], ladders: &[&str], drop_spikes: &[&str]) -> LevelRecord {
    let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
    LevelRecord {
        dialogue: owned(dialogue),
        spikes: owned(spikes),
        ladders: owned(ladders),
        drop_spikes: owned(drop_spikes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIKE: SpriteSize = SpriteSize::new(60.0, 50.0);

    #[test]
    fn parse_full_entry() {
        let h = HazardSpec::parse("450::300-60::25").unwrap();
        assert_eq!(h.x, Coord::Value(450.0));
        assert_eq!(h.y, Coord::Value(300.0));
        assert_eq!(h.size, Some((60.0, 25.0)));
    }

    #[test]
    fn surface_placeholder_resolves_to_floor_line() {
        let h = HazardSpec::parse("300::height").unwrap();
        assert_eq!(h.y, Coord::Surface);
        assert_eq!(h.size, None);
        // Default size comes from the sprite
        assert_eq!(h.resolve(1000.0, SPIKE), Rect::new(300.0, 950.0, 60.0, 50.0));
    }

    #[test]
    fn placeholder_allowed_in_x() {
        let h = HazardSpec::parse("height::10").unwrap();
        assert_eq!(h.resolve(500.0, SPIKE).x, 450.0);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for bad in [
            "", "12", "a::3", "1::2::3", "1::2-3", "1::2-x::4",
            "NaN::3", "1::inf", "1::2-5::-1", "1::2-3-4::5",
        ] {
            assert!(HazardSpec::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn file_error_names_level_and_entry() {
        let text = r#"
            [[level]]
            dialogue = ["ok"]

            [[level]]
            ladders = ["100::height", "oops::height"]
        "#;
        match parse_levels(text) {
            Err(LevelError::MalformedEntry { level, kind, entry, .. }) => {
                assert_eq!(level, 2);
                assert_eq!(kind, HazardKind::Ladder);
                assert_eq!(entry, "oops::height");
            }
            other => panic!("expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn level_file_with_optional_sections() {
        let text = r#"
            [[level]]
            dialogue = ["one", "two"]
            spikes = ["450::height-60::25"]

            [[level]]
            drop_spikes = ["400::100"]
        "#;
        let levels = parse_levels(text).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].dialogue.len(), 2);
        assert_eq!(levels[0].spikes.len(), 1);
        assert!(levels[0].ladders.is_empty());
        assert!(levels[1].dialogue.is_empty());
        assert_eq!(levels[1].drop_spikes.len(), 1);
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(matches!(parse_levels("[[level]\n"), Err(LevelError::Toml(_))));
    }

    #[test]
    fn embedded_levels_are_valid() {
        let levels = embedded_levels().unwrap();
        assert_eq!(levels.len(), 3);
        // Level 1 needs its click step plus three movement hints
        assert!(levels[0].dialogue.len() >= 4);
        assert_eq!(levels[1].ladders.len(), 1);
        assert_eq!(levels[2].drop_spikes.len(), 2);
    }
}
