/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or
/// incomplete. Validation that can make the program refuse to start
/// (zero dimensions) happens downstream, when the field is built.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub delay_us: u64,
    pub display: DisplayConfig,
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    /// Live probability for random seeding, clamped to [0, 1].
    pub density: f64,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub alive: char,
    pub dead: char,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    display: TomlDisplay,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
    #[serde(default = "default_density")]
    density: f64,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_delay_us")]
    delay_us: u64,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_alive")]
    alive: String,
    #[serde(default = "default_dead")]
    dead: String,
}

// ── Defaults ──

fn default_width() -> usize { 50 }
fn default_height() -> usize { 20 }
fn default_density() -> f64 { 0.5 }
fn default_delay_us() -> u64 { 100_000 }
fn default_alive() -> String { "*".into() }
fn default_dead() -> String { " ".into() }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            width: default_width(),
            height: default_height(),
            density: default_density(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { delay_us: default_delay_us() }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            alive: default_alive(),
            dead: default_dead(),
        }
    }
}

// ── Loading ──

impl SimConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        let density = if toml_cfg.grid.density.is_finite() {
            toml_cfg.grid.density.clamp(0.0, 1.0)
        } else {
            default_density()
        };

        SimConfig {
            grid: GridConfig {
                width: toml_cfg.grid.width,
                height: toml_cfg.grid.height,
                density,
            },
            delay_us: toml_cfg.speed.delay_us,
            display: DisplayConfig {
                alive: first_char(&toml_cfg.display.alive, '*'),
                dead: first_char(&toml_cfg.display.dead, ' '),
            },
        }
    }
}

fn first_char(s: &str, fallback: char) -> char {
    s.chars().next().unwrap_or(fallback)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
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
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: TomlConfig = toml::from_str("[grid]\nwidth = 30\n").unwrap();
        assert_eq!(cfg.grid.width, 30);
        assert_eq!(cfg.grid.height, 20);
        assert_eq!(cfg.speed.delay_us, 100_000);
        assert_eq!(cfg.display.alive, "*");
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.grid.width, 50);
        assert_eq!(cfg.grid.height, 20);
        assert_eq!(cfg.grid.density, 0.5);
        assert_eq!(cfg.display.dead, " ");
    }
}
