// src/models/world.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::character::OnlineCharacter;
use crate::models::enums::{PvpType, TournamentWorldType, TransferType, WorldLocation};
use crate::tibia::urls::get_tibia_url;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct World {
    pub name: String,
    pub status: String,
    pub online_count: u32,
    pub record_count: u32,
    pub record_date: Option<DateTime<Utc>>,
    /// `YYYY-MM`.
    pub creation_date: Option<String>,
    pub location: WorldLocation,
    pub pvp_type: PvpType,
    pub transfer_type: TransferType,
    pub world_quest_titles: Vec<String>,
    pub battleye_protected: bool,
    /// `None` on a protected world means it was protected since release.
    pub battleye_date: Option<NaiveDate>,
    pub experimental: bool,
    pub premium_only: bool,
    pub tournament_world_type: Option<TournamentWorldType>,
    pub online_players: Vec<OnlineCharacter>,
}

impl World {
    pub fn get_url(name: &str) -> String {
        get_tibia_url("community", Some("worlds"), &[("world", name.to_string())])
    }

    pub fn url(&self) -> String {
        Self::get_url(&self.name)
    }

    pub fn creation_year(&self) -> Option<i32> {
        self.creation_date.as_deref()?.split('-').next()?.parse().ok()
    }

    pub fn creation_month(&self) -> Option<u32> {
        self.creation_date.as_deref()?.split('-').nth(1)?.parse().ok()
    }
}

/// A world row of the world overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedWorld {
    pub name: String,
    pub status: String,
    pub online_count: u32,
    pub location: WorldLocation,
    pub pvp_type: PvpType,
    pub transfer_type: TransferType,
    pub battleye_protected: bool,
    pub battleye_date: Option<NaiveDate>,
    pub experimental: bool,
    pub premium_only: bool,
    pub tournament_world_type: Option<TournamentWorldType>,
}

impl ListedWorld {
    pub fn url(&self) -> String {
        World::get_url(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldOverview {
    /// Overall maximum of players online across all worlds.
    pub record_count: u32,
    pub record_date: Option<DateTime<Utc>>,
    pub worlds: Vec<ListedWorld>,
}

impl WorldOverview {
    pub fn get_url() -> String {
        get_tibia_url("community", Some("worlds"), &[])
    }

    pub fn total_online(&self) -> u32 {
        self.worlds.iter().map(|w| w.online_count).sum()
    }

    pub fn tournament_worlds(&self) -> Vec<&ListedWorld> {
        self.worlds.iter().filter(|w| w.tournament_world_type.is_some()).collect()
    }

    pub fn regular_worlds(&self) -> Vec<&ListedWorld> {
        self.worlds.iter().filter(|w| w.tournament_world_type.is_none()).collect()
    }
}
