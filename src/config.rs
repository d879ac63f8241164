//! Configuration loading
//!
//! `config.toml` lives in the data directory (`~/.robograph`, or
//! `$ROBOGRAPH_DIR`). The embedded defaults are written there on first run
//! and never overwritten afterwards.

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::generator::GraphSettings;
use crate::core::layout::LayoutSettings;
use crate::core::simulation::{RobotSettings, SettingChange, SimulationSettings};

/// Edge probability moves in steps of this size
const EDGE_PROBABILITY_STEP: f64 = 0.05;

const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

pub const DATA_DIR_ENV: &str = "ROBOGRAPH_DIR";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "robograph.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fixed RNG seed; `None` seeds from the OS
    #[serde(default)]
    pub seed: Option<u64>,
    pub graph: GraphSettings,
    pub robots: RobotSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub ui: UiConfig,
    /// Key string (e.g. "ctrl+c") to action name (e.g. "quit")
    #[serde(default)]
    pub keybinds: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

fn default_tick_ms() -> u64 {
    250
}

fn default_max_steps() -> u64 {
    10_000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            autoplay: false,
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Step,
    TogglePlay,
    Reset,
    Regenerate,
    CycleLayout,
    Quit,
    NextGraphType,
    MoreNodes,
    FewerNodes,
    RaiseEdgeProbability,
    LowerEdgeProbability,
    MoreAttempts,
    FewerAttempts,
    ToggleDirected,
    ToggleSelfLoops,
    ToggleRequireConnected,
    NextAlgorithm,
    MoreRobots,
    FewerRobots,
    NextStartNode,
    PrevStartNode,
}

impl KeyAction {
    pub fn from_str(action: &str) -> Option<Self> {
        match action {
            "step" => Some(Self::Step),
            "toggle_play" | "play" => Some(Self::TogglePlay),
            "reset" => Some(Self::Reset),
            "regenerate" => Some(Self::Regenerate),
            "cycle_layout" => Some(Self::CycleLayout),
            "quit" => Some(Self::Quit),
            "next_graph_type" => Some(Self::NextGraphType),
            "more_nodes" => Some(Self::MoreNodes),
            "fewer_nodes" => Some(Self::FewerNodes),
            "raise_edge_probability" => Some(Self::RaiseEdgeProbability),
            "lower_edge_probability" => Some(Self::LowerEdgeProbability),
            "more_attempts" => Some(Self::MoreAttempts),
            "fewer_attempts" => Some(Self::FewerAttempts),
            "toggle_directed" => Some(Self::ToggleDirected),
            "toggle_self_loops" => Some(Self::ToggleSelfLoops),
            "toggle_require_connected" => Some(Self::ToggleRequireConnected),
            "next_algorithm" => Some(Self::NextAlgorithm),
            "more_robots" => Some(Self::MoreRobots),
            "fewer_robots" => Some(Self::FewerRobots),
            "next_start_node" => Some(Self::NextStartNode),
            "prev_start_node" => Some(Self::PrevStartNode),
            _ => None,
        }
    }

    /// The settings edit behind a settings key, `None` for control keys
    pub fn setting_change(&self) -> Option<SettingChange> {
        let change = match self {
            Self::NextGraphType => SettingChange::NextGraphType,
            Self::MoreNodes => SettingChange::AdjustNodeCount(1),
            Self::FewerNodes => SettingChange::AdjustNodeCount(-1),
            Self::RaiseEdgeProbability => {
                SettingChange::AdjustEdgeProbability(EDGE_PROBABILITY_STEP)
            }
            Self::LowerEdgeProbability => {
                SettingChange::AdjustEdgeProbability(-EDGE_PROBABILITY_STEP)
            }
            Self::MoreAttempts => SettingChange::AdjustMaxGenerationAttempts(1),
            Self::FewerAttempts => SettingChange::AdjustMaxGenerationAttempts(-1),
            Self::ToggleDirected => SettingChange::ToggleDirected,
            Self::ToggleSelfLoops => SettingChange::ToggleSelfLoops,
            Self::ToggleRequireConnected => SettingChange::ToggleRequireConnected,
            Self::NextAlgorithm => SettingChange::NextAlgorithm,
            Self::MoreRobots => SettingChange::AdjustRobotCount(1),
            Self::FewerRobots => SettingChange::AdjustRobotCount(-1),
            Self::NextStartNode => SettingChange::AdjustStartNode(1),
            Self::PrevStartNode => SettingChange::AdjustStartNode(-1),
            Self::Step
            | Self::TogglePlay
            | Self::Reset
            | Self::Regenerate
            | Self::CycleLayout
            | Self::Quit => return None,
        };
        Some(change)
    }
}

pub type KeybindMap = HashMap<(KeyCode, KeyModifiers), KeyAction>;

/// Problems found by `Config::validate`
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Config {
    /// Load `config.toml` from the data directory, extracting defaults first
    pub fn load() -> Result<Self> {
        Self::extract_defaults()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a custom file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {:?}", path))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// The embedded defaults
    pub fn defaults() -> Result<Self> {
        toml::from_str(DEFAULT_CONFIG).context("Failed to parse embedded default config")
    }

    /// Write the embedded config.toml into the data directory if missing
    fn extract_defaults() -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context(format!("Failed to create data directory {:?}", dir))?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG).context("Failed to write config.toml")?;
            tracing::info!("Extracted config.toml to {:?}", config_path);
        }
        Ok(())
    }

    /// Get the data directory (~/.robograph/)
    /// Can be overridden with ROBOGRAPH_DIR environment variable
    fn config_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".robograph"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(LOG_FILE))
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            graph: self.graph.clone(),
            robots: self.robots.clone(),
            layout: self.layout.clone(),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Err(e) = self.simulation_settings().validate() {
            report.errors.push(e.to_string());
        }
        if self.robots.count > 0 && self.robots.start_node >= self.graph.node_count {
            report.errors.push(format!(
                "robots.start_node {} is out of range for {} nodes",
                self.robots.start_node, self.graph.node_count
            ));
        }
        if self.ui.tick_ms == 0 {
            report.errors.push("ui.tick_ms must be positive".to_string());
        }

        if self.graph.node_count == 0 {
            report.warnings.push("graph.node_count is 0".to_string());
        }
        if self.robots.count > self.graph.node_count {
            report.warnings.push(format!(
                "{} robots cannot all settle on {} nodes",
                self.robots.count, self.graph.node_count
            ));
        }
        for (key, action) in &self.keybinds {
            if parse_key_string(key).is_none() {
                report.warnings.push(format!("Unknown key '{}'", key));
            }
            if KeyAction::from_str(action).is_none() {
                report
                    .warnings
                    .push(format!("Unknown action '{}' for key '{}'", action, key));
            }
        }

        report
    }

    /// Resolve `[keybinds]` into a lookup table. Invalid entries are logged and skipped.
    pub fn keybind_map(&self) -> KeybindMap {
        let mut map = KeybindMap::new();
        for (key_str, action_str) in &self.keybinds {
            let Some(key) = parse_key_string(key_str) else {
                tracing::warn!("Skipping keybind with unknown key '{}'", key_str);
                continue;
            };
            let Some(action) = KeyAction::from_str(action_str) else {
                tracing::warn!(
                    "Skipping keybind '{}' with unknown action '{}'",
                    key_str,
                    action_str
                );
                continue;
            };
            map.insert(key, action);
        }
        tracing::debug!("Loaded {} keybinds", map.len());
        map
    }
}

/// Parse a key string like "ctrl+c" or "space" into KeyCode and KeyModifiers
pub fn parse_key_string(key_str: &str) -> Option<(KeyCode, KeyModifiers)> {
    let parts: Vec<&str> = key_str.split('+').collect();
    let mut modifiers = KeyModifiers::empty();
    let mut key_part = key_str;

    // "+" on its own is a key, not a separator
    if parts.len() > 1 && key_str != "+" {
        for part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }
        key_part = parts[parts.len() - 1];
    }

    let key_code = match key_part {
        "enter" => KeyCode::Enter,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "page_up" | "pageup" => KeyCode::PageUp,
        "page_down" | "pagedown" => KeyCode::PageDown,
        s if s.starts_with('f') && s.len() > 1 => {
            let n: u8 = s[1..].parse().ok()?;
            if (1..=12).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some((key_code, modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::GraphType;
    use crate::core::robot::CoordinatorKind;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.graph.graph_type, GraphType::ErdosRenyiRandom);
        assert_eq!(config.graph.node_count, 12);
        assert!(config.graph.require_connected);
        assert_eq!(config.robots.algorithm, CoordinatorKind::Dispersion);
        assert_eq!(config.robots.count, 6);
        assert_eq!(config.ui.tick_ms, 250);
        assert_eq!(config.seed, None);

        let report = config.validate();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_default_keybinds() {
        let map = Config::defaults().unwrap().keybind_map();
        assert_eq!(
            map.get(&(KeyCode::Char(' '), KeyModifiers::empty())),
            Some(&KeyAction::Step)
        );
        assert_eq!(
            map.get(&(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(&KeyAction::Quit)
        );
        assert_eq!(
            map.get(&(KeyCode::Esc, KeyModifiers::empty())),
            Some(&KeyAction::Quit)
        );
        assert_eq!(
            map.get(&(KeyCode::Char(']'), KeyModifiers::empty())),
            Some(&KeyAction::MoreNodes)
        );
        assert_eq!(map.len(), 23);
    }

    #[test]
    fn test_setting_actions_map_to_changes() {
        assert_eq!(KeyAction::Step.setting_change(), None);
        assert_eq!(KeyAction::Quit.setting_change(), None);
        assert_eq!(
            KeyAction::FewerNodes.setting_change(),
            Some(SettingChange::AdjustNodeCount(-1))
        );
        assert_eq!(
            KeyAction::from_str("lower_edge_probability").and_then(|a| a.setting_change()),
            Some(SettingChange::AdjustEdgeProbability(-0.05))
        );
        assert_eq!(
            KeyAction::from_str("toggle_directed"),
            Some(KeyAction::ToggleDirected)
        );
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(
            parse_key_string("ctrl+shift+x"),
            Some((
                KeyCode::Char('x'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            ))
        );
        assert_eq!(
            parse_key_string("page_down"),
            Some((KeyCode::PageDown, KeyModifiers::empty()))
        );
        assert_eq!(
            parse_key_string("f5"),
            Some((KeyCode::F(5), KeyModifiers::empty()))
        );
        assert_eq!(
            parse_key_string("f"),
            Some((KeyCode::Char('f'), KeyModifiers::empty()))
        );
        assert_eq!(
            parse_key_string("+"),
            Some((KeyCode::Char('+'), KeyModifiers::empty()))
        );
        assert_eq!(parse_key_string("hyper+a"), None);
        assert_eq!(parse_key_string("f13"), None);
        assert_eq!(parse_key_string("word"), None);
    }

    #[test]
    fn test_invalid_keybinds_are_skipped() {
        let mut config = Config::defaults().unwrap();
        config.keybinds.clear();
        config.keybinds.insert("x".into(), "explode".into());
        config.keybinds.insert("nope".into(), "quit".into());
        config.keybinds.insert("s".into(), "step".into());

        let map = config.keybind_map();
        assert_eq!(map.len(), 1);
        assert_eq!(config.validate().warnings.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = Config::defaults().unwrap();
        config.graph.edge_probability = 2.0;
        config.robots.start_node = 40;
        config.ui.tick_ms = 0;

        let report = config.validate();
        assert!(report.has_errors());
        assert_eq!(report.errors.len(), 3);

        let mut config = Config::defaults().unwrap();
        config.layout.height = -1.0;
        let report = config.validate();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("layout extent"), "{:?}", report.errors);
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            seed = 7

            [graph]
            type = "path"
            node_count = 4

            [robots]
            algorithm = "exploration"
            count = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ui, UiConfig::default());
        assert!(config.keybinds.is_empty());
        assert_eq!(config.simulation_settings().layout, LayoutSettings::default());
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!(
            "robograph-config-test-{}.toml",
            std::process::id()
        ));
        fs::write(&path, DEFAULT_CONFIG).unwrap();
        let config = Config::load_from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.layout.width, 1000.0);

        let missing = std::env::temp_dir().join("robograph-does-not-exist.toml");
        let err = Config::load_from_path(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
