// src/models/kill_statistics.rs
use std::collections::BTreeMap;

use serde::Serialize;

use crate::tibia::urls::get_tibia_url;

/// Kills per race on a world over the last day and week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillStatistics {
    pub world: String,
    /// Keyed by race name as shown on the page.
    pub entries: BTreeMap<String, RaceEntry>,
    pub total: RaceEntry,
}

impl KillStatistics {
    pub fn get_url(world: &str) -> String {
        get_tibia_url("community", Some("killstatistics"), &[("world", world.to_string())])
    }

    pub fn url(&self) -> String {
        Self::get_url(&self.world)
    }

    /// The row counting players killed by other players.
    pub fn players(&self) -> Option<&RaceEntry> {
        self.entries.get("players")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RaceEntry {
    /// Players killed by this race in the last day.
    pub last_day_killed: u32,
    /// Creatures of this race killed by players in the last day.
    pub last_day_players_killed: u32,
    pub last_week_killed: u32,
    pub last_week_players_killed: u32,
}
