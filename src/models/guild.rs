// src/models/guild.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::character::Character;
use crate::models::enums::Vocation;
use crate::tibia::urls::get_tibia_url;

/// A guild's information page.
///
/// `disband_condition`/`disband_date` are only set while the guild is under a
/// disband warning, which is always the case for guilds in formation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guild {
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub world: String,
    pub founded: Option<NaiveDate>,
    /// `false` while the guild is still in formation.
    pub active: bool,
    pub guildhall: Option<GuildHouse>,
    pub open_applications: bool,
    pub disband_condition: Option<String>,
    pub disband_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub members: Vec<GuildMember>,
    pub invites: Vec<GuildInvite>,
}

impl Guild {
    pub fn get_url(name: &str) -> String {
        get_tibia_url("community", Some("guilds"), &[("page", "view".into()), ("GuildName", name.to_string())])
    }

    /// URL of the list of guilds of a world.
    pub fn get_world_list_url(world: &str) -> String {
        get_tibia_url("community", Some("guilds"), &[("world", world.to_string())])
    }

    pub fn url(&self) -> String {
        Self::get_url(&self.name)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn online_members(&self) -> Vec<&GuildMember> {
        self.members.iter().filter(|m| m.online).collect()
    }

    /// Rank names in the order they first appear in the member list.
    pub fn ranks(&self) -> Vec<&str> {
        let mut ranks: Vec<&str> = Vec::new();
        for member in &self.members {
            if !ranks.contains(&member.rank.as_str()) {
                ranks.push(&member.rank);
            }
        }
        ranks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildHouse {
    pub name: String,
    pub world: String,
    pub paid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildMember {
    pub rank: String,
    pub name: String,
    /// The member's nick title, shown in parentheses after the name.
    pub title: Option<String>,
    pub vocation: Vocation,
    pub level: u32,
    pub joined: Option<NaiveDate>,
    pub online: bool,
}

impl GuildMember {
    pub fn url(&self) -> String {
        Character::get_url(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildInvite {
    pub name: String,
    pub date: Option<NaiveDate>,
}

/// A guild as shown in a world's guild list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedGuild {
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub world: String,
    pub active: bool,
}

impl ListedGuild {
    pub fn url(&self) -> String {
        Guild::get_url(&self.name)
    }
}
