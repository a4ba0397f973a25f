//! Match statistics and ranking
//!
//! Computes per-worm statistics and final rankings.

#![allow(dead_code)] // Result fields for UI/API consumption

use serde::{Deserialize, Serialize};

use crate::game::state::{GameState, MatchPhase, Rgb, WormId};

/// Running statistics for one worm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub worm: WormId,
    pub name: String,
    pub color: Rgb,
    pub is_human: bool,
    pub kills: u32,
    pub deaths: u32,
    pub fall_deaths: u32,
    pub self_deaths: u32,
}

/// Statistics for the whole game so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub level: u32,
    pub match_time: f32,
    pub characters: Vec<CharacterStats>,
}

/// Match result information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: Option<WormId>,
    pub winner_name: Option<String>,
    pub rankings: Vec<WormRanking>,
    pub match_duration: f32,
    pub levels_completed: u32,
    pub total_kills: u32,
}

/// Worm ranking in match results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WormRanking {
    pub worm: WormId,
    pub name: String,
    pub rank: u32,
    pub kills: u32,
    pub deaths: u32,
    pub is_human: bool,
}

/// Snapshot the statistics of every worm, in roster order
pub fn collect_stats(state: &GameState) -> GameStats {
    GameStats {
        level: state.level,
        match_time: state.match_state.match_time,
        characters: state
            .worms
            .iter()
            .map(|w| CharacterStats {
                worm: w.id,
                name: w.name.clone(),
                color: w.color,
                is_human: w.is_human,
                kills: w.kills,
                deaths: w.deaths,
                fall_deaths: w.fall_deaths,
                self_deaths: w.self_deaths,
            })
            .collect(),
    }
}

/// Determine match result from game state
pub fn determine_result(state: &GameState) -> MatchResult {
    let mut rankings: Vec<WormRanking> = state
        .worms
        .iter()
        .map(|w| WormRanking {
            worm: w.id,
            name: w.name.clone(),
            rank: 0,
            kills: w.kills,
            deaths: w.deaths,
            is_human: w.is_human,
        })
        .collect();

    // Sort by: kills (desc), deaths (asc); ties keep roster order
    rankings.sort_by(|a, b| b.kills.cmp(&a.kills).then_with(|| a.deaths.cmp(&b.deaths)));

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = (i + 1) as u32;
    }

    let total_kills: u32 = rankings.iter().map(|r| r.kills).sum();

    // A shared first place has no winner
    let (winner_id, winner_name) = match rankings.as_slice() {
        [first, second, ..] if first.kills == second.kills && first.deaths == second.deaths => (None, None),
        [first, ..] => (Some(first.worm), Some(first.name.clone())),
        [] => (None, None),
    };

    MatchResult {
        winner_id,
        winner_name,
        rankings,
        match_duration: state.match_state.match_time,
        levels_completed: state.level.saturating_sub(1),
        total_kills,
    }
}

/// Check if match should end
pub fn check_match_end(state: &GameState) -> Option<MatchEndReason> {
    if state.match_state.phase != MatchPhase::Playing {
        return None;
    }

    match state.match_state.time_limit {
        Some(limit) if state.match_state.match_time >= limit => Some(MatchEndReason::TimeLimit),
        _ => None,
    }
}

/// Reason why match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEndReason {
    /// Battle time limit reached
    TimeLimit,
}
