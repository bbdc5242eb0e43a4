// src/models/tournament.rs
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::enums::PvpType;
use crate::tibia::urls::get_tibia_url;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tournament {
    pub title: String,
    /// Archive cycle number; 0 for the current tournament when it is not listed.
    pub cycle: u32,
    pub phase: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub worlds: Vec<String>,
    pub rule_set: RuleSet,
    pub score_set: ScoreSet,
    /// Sorted by rank; ranges never overlap.
    pub reward_set: Vec<RewardEntry>,
    pub archived_tournaments: Vec<ListedTournament>,
}

impl Tournament {
    pub fn get_url(cycle: u32) -> String {
        let params: Vec<(&str, String)> = if cycle > 0 {
            vec![("tournamentcycle", cycle.to_string())]
        } else {
            Vec::new()
        };
        get_tibia_url("community", Some("tournament"), &params)
    }

    pub fn url(&self) -> String {
        Self::get_url(self.cycle)
    }

    /// First and last rank that receive rewards, `(0, 0)` when there are none.
    pub fn rewards_range(&self) -> (u32, u32) {
        match (self.reward_set.first(), self.reward_set.last()) {
            (Some(first), Some(last)) => (first.initial_rank, last.last_rank),
            _ => (0, 0),
        }
    }

    pub fn rewards_for_rank(&self, rank: u32) -> Option<&RewardEntry> {
        self.reward_set.iter().find(|r| r.contains(rank))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedTournament {
    pub title: String,
    pub cycle: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ListedTournament {
    pub fn url(&self) -> String {
        Tournament::get_url(self.cycle)
    }
}

/// Rewards for the inclusive rank range `initial_rank..=last_rank`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewardEntry {
    pub initial_rank: u32,
    pub last_rank: u32,
    pub tibia_coins: u32,
    pub tournament_coins: u32,
    pub tournament_ticket_vouchers: u32,
    pub cup: Option<String>,
    pub deed: Option<String>,
    pub other_rewards: Option<String>,
}

impl RewardEntry {
    pub fn contains(&self, rank: u32) -> bool {
        (self.initial_rank..=self.last_rank).contains(&rank)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleSet {
    pub pvp_type: Option<PvpType>,
    pub daily_tournament_playtime: Option<Duration>,
    pub total_tournament_playtime: Option<Duration>,
    pub playtime_reduced_only_in_combat: bool,
    pub death_penalty_modifier: Option<f64>,
    pub xp_multiplier: Option<f64>,
    pub skill_multiplier: Option<f64>,
    pub spawn_rate_multiplier: Option<f64>,
    pub loot_probability: Option<f64>,
    pub rent_percentage: Option<u32>,
    pub house_auction_durations: Option<u32>,
}

/// Points gained or lost per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSet {
    pub level_gain_loss: i64,
    pub charm_point_multiplier: i64,
    pub character_death: i64,
}
