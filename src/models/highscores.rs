// src/models/highscores.rs
use std::time::Duration;

use serde::Serialize;

use crate::models::character::Character;
use crate::models::enums::{HighscoresCategory, Vocation, VocationFilter};
use crate::tibia::urls::get_tibia_url;

/// One page of a highscores category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highscores {
    /// `None` when showing all worlds.
    pub world: Option<String>,
    pub category: HighscoresCategory,
    pub vocation: VocationFilter,
    pub page: u32,
    pub total_pages: u32,
    pub results_count: u32,
    /// How long ago the highscores were last updated.
    pub last_updated: Option<Duration>,
    pub entries: Vec<HighscoresEntry>,
}

impl Highscores {
    pub fn get_url(world: Option<&str>, category: &HighscoresCategory, vocation: &VocationFilter, page: u32) -> String {
        get_tibia_url(
            "community",
            Some("highscores"),
            &[
                ("world", world.unwrap_or_default().to_string()),
                ("category", category.id().unwrap_or(6).to_string()),
                ("profession", vocation.id().unwrap_or(0).to_string()),
                ("currentpage", page.to_string()),
            ],
        )
    }

    pub fn url(&self) -> String {
        Self::get_url(self.world.as_deref(), &self.category, &self.vocation, self.page)
    }

    pub fn from_rank(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.rank)
    }

    pub fn to_rank(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighscoresEntry {
    pub rank: u32,
    pub name: String,
    pub vocation: Vocation,
    pub world: String,
    pub level: u32,
    pub value: i64,
    /// Only present in the loyalty category.
    pub loyalty_title: Option<String>,
}

impl HighscoresEntry {
    pub fn url(&self) -> String {
        Character::get_url(&self.name)
    }
}
