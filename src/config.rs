use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::state::Rgb;

/// Maximum number of worms in one game
pub const MAX_CHARACTERS: usize = 8;

/// Whether tools consume gas, battery and dynamite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolsMode {
    #[default]
    Standard,
    /// Nothing is consumed and nothing is required
    Unlimited,
}

/// One worm in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub name: String,
    pub color: Rgb,
    pub is_human: bool,
    /// Input slot that drives this worm
    pub player_slot: u8,
}

impl CharacterConfig {
    pub fn new(name: impl Into<String>, color: Rgb, is_human: bool, player_slot: u8) -> Self {
        Self {
            name: name.into(),
            color,
            is_human,
            player_slot,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub characters: Vec<CharacterConfig>,
    pub tools_mode: ToolsMode,
    /// Match ends after this many seconds; `None` plays forever
    pub battle_time_limit: Option<f32>,
    /// RNG seed for terrain and spawns; `None` picks one at startup
    pub seed: Option<u64>,
}

/// Default roster colours, in slot order
pub const DEFAULT_COLORS: [Rgb; 4] = [
    Rgb(255, 100, 100),
    Rgb(100, 255, 100),
    Rgb(100, 150, 255),
    Rgb(255, 255, 100),
];

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            characters: vec![
                CharacterConfig::new("Player 1", DEFAULT_COLORS[0], true, 0),
                CharacterConfig::new("Player 2", DEFAULT_COLORS[1], true, 1),
            ],
            tools_mode: ToolsMode::Standard,
            battle_time_limit: None,
            seed: None,
        }
    }
}

/// Rejected configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one character is required")]
    NoCharacters,
    #[error("{count} characters configured, at most {max} supported")]
    TooManyCharacters { count: usize, max: usize },
    #[error("character {index} has an empty name")]
    EmptyName { index: usize },
    #[error("player slot {slot} is used by more than one character")]
    DuplicateSlot { slot: u8 },
    #[error("battle time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(f32),
}

impl GameConfig {
    /// Default roster with `humans` human players followed by AI worms, up to `total`
    pub fn with_roster(humans: usize, total: usize) -> Self {
        let characters = (0..total)
            .map(|i| {
                let is_human = i < humans;
                let name = if is_human {
                    format!("Player {}", i + 1)
                } else {
                    format!("Bot {}", i + 1 - humans)
                };
                CharacterConfig::new(name, DEFAULT_COLORS[i % DEFAULT_COLORS.len()], is_human, i as u8)
            })
            .collect();
        Self {
            characters,
            ..Self::default()
        }
    }

    /// Load config from environment or use defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(players) = std::env::var("WORMS_PLAYERS") {
            match parse_roster(&players) {
                Some((humans, total)) => config.characters = Self::with_roster(humans, total).characters,
                None => tracing::warn!("Invalid WORMS_PLAYERS '{}', expected HUMANS or HUMANS:TOTAL", players),
            }
        }

        if let Ok(mode) = std::env::var("WORMS_TOOLS_MODE") {
            match mode.to_ascii_lowercase().as_str() {
                "standard" => config.tools_mode = ToolsMode::Standard,
                "unlimited" => config.tools_mode = ToolsMode::Unlimited,
                _ => tracing::warn!("Invalid WORMS_TOOLS_MODE '{}', using default", mode),
            }
        }

        if let Ok(limit) = std::env::var("WORMS_BATTLE_TIME_LIMIT") {
            if let Ok(parsed) = limit.parse::<f32>() {
                if parsed.is_finite() && parsed > 0.0 {
                    config.battle_time_limit = Some(parsed);
                } else {
                    tracing::warn!("WORMS_BATTLE_TIME_LIMIT must be > 0, ignoring");
                }
            } else {
                tracing::warn!("Invalid WORMS_BATTLE_TIME_LIMIT '{}', ignoring", limit);
            }
        }

        if let Ok(seed) = std::env::var("WORMS_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid WORMS_SEED '{}', using random seed", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.characters.is_empty() {
            return Err(ConfigError::NoCharacters);
        }
        if self.characters.len() > MAX_CHARACTERS {
            return Err(ConfigError::TooManyCharacters {
                count: self.characters.len(),
                max: MAX_CHARACTERS,
            });
        }
        for (index, c) in self.characters.iter().enumerate() {
            if c.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { index });
            }
        }
        // Input is routed by slot, so every character needs its own
        let mut slots: Vec<u8> = self.characters.iter().map(|c| c.player_slot).collect();
        slots.sort_unstable();
        if let Some(pair) = slots.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateSlot { slot: pair[0] });
        }
        if let Some(limit) = self.battle_time_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::InvalidTimeLimit(limit));
            }
        }
        Ok(())
    }
}

/// "2" or "1:4" -> (humans, total)
fn parse_roster(s: &str) -> Option<(usize, usize)> {
    let (humans, total) = match s.split_once(':') {
        Some((h, t)) => (h.trim().parse().ok()?, t.trim().parse().ok()?),
        None => {
            let h: usize = s.trim().parse().ok()?;
            (h, h)
        }
    };
    (total > 0 && humans <= total && total <= MAX_CHARACTERS).then_some((humans, total))
}
