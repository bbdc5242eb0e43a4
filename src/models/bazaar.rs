// src/models/bazaar.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::character::Character;
use crate::models::enums::{
    AuctionOrder, AuctionOrderBy, BattlEyeTypeFilter, BazaarType, BidType, PvpTypeFilter, Sex, SkillFilter,
    Vocation, VocationAuctionFilter,
};
use crate::models::pagination::PaginatedSummary;
use crate::tibia::urls::{get_auction_page_items_url, get_tibia_url};

pub type ItemSummary = PaginatedSummary<DisplayItem>;
pub type Mounts = PaginatedSummary<DisplayMount>;
pub type Outfits = PaginatedSummary<DisplayOutfit>;

/// A page of the character bazaar, either current auctions or the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterBazaar {
    pub bazaar_type: BazaarType,
    /// Only the current auctions page has a filter form.
    pub filters: Option<AuctionFilters>,
    pub page: u32,
    pub total_pages: u32,
    pub results_count: u32,
    pub entries: Vec<ListedAuction>,
}

impl CharacterBazaar {
    pub fn get_current_auctions_url(page: u32, filters: Option<&AuctionFilters>) -> String {
        let mut params = vec![("currentpage", page.to_string())];
        if let Some(filters) = filters {
            params.extend(filters.query_params());
        }
        get_tibia_url("charactertrade", Some("currentcharactertrades"), &params)
    }

    pub fn get_auctions_history_url(page: u32) -> String {
        get_tibia_url("charactertrade", Some("pastcharactertrades"), &[("currentpage", page.to_string())])
    }

    pub fn url(&self) -> String {
        match self.bazaar_type {
            BazaarType::History => Self::get_auctions_history_url(self.page),
            _ => Self::get_current_auctions_url(self.page, self.filters.as_ref()),
        }
    }
}

/// Filters of the current auctions page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuctionFilters {
    pub world: Option<String>,
    pub pvp_type: Option<PvpTypeFilter>,
    pub battleye: Option<BattlEyeTypeFilter>,
    pub vocation: Option<VocationAuctionFilter>,
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
    pub skill: Option<SkillFilter>,
    pub min_skill_level: Option<u32>,
    pub max_skill_level: Option<u32>,
    pub order_by: Option<AuctionOrderBy>,
    pub order: Option<AuctionOrder>,
    pub item: Option<String>,
}

impl AuctionFilters {
    /// Query parameters for the set filters, in the site's order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let id = |id: Option<u32>| id.map(|v| v.to_string());
        let number = |n: Option<u32>| n.map(|v| v.to_string());
        [
            ("filter_profession", self.vocation.as_ref().and_then(|v| id(v.id()))),
            ("filter_levelrangefrom", number(self.min_level)),
            ("filter_levelrangeto", number(self.max_level)),
            ("filter_world", self.world.clone()),
            ("filter_worldpvptype", self.pvp_type.as_ref().and_then(|v| id(v.id()))),
            ("filter_worldbattleyestate", self.battleye.as_ref().and_then(|v| id(v.id()))),
            ("filter_skillid", self.skill.as_ref().and_then(|v| id(v.id()))),
            ("filter_skillrangefrom", number(self.min_skill_level)),
            ("filter_skillrangeto", number(self.max_skill_level)),
            ("order_column", self.order_by.as_ref().and_then(|v| id(v.id()))),
            ("order_direction", self.order.as_ref().and_then(|v| id(v.id()))),
            ("itemname", self.item.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }
}

/// An auction as shown in the bazaar listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedAuction {
    pub auction_id: u32,
    pub name: String,
    pub level: u32,
    pub world: String,
    pub vocation: Vocation,
    pub sex: Sex,
    pub outfit: Option<OutfitImage>,
    pub displayed_items: Vec<DisplayItem>,
    pub sales_arguments: Vec<SalesArgument>,
    pub auction_start: DateTime<Utc>,
    pub auction_end: DateTime<Utc>,
    /// In Tibia Coins.
    pub bid: i64,
    pub bid_type: BidType,
    pub status: String,
}

impl ListedAuction {
    pub fn get_url(auction_id: u32) -> String {
        get_tibia_url(
            "charactertrade",
            Some("currentcharactertrades"),
            &[("page", "details".into()), ("auctionid", auction_id.to_string())],
        )
    }

    pub fn url(&self) -> String {
        Self::get_url(self.auction_id)
    }

    pub fn character_url(&self) -> String {
        Character::get_url(&self.name)
    }
}

/// Which paginated collection of an auction a page-items request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageItemType {
    Items,
    StoreItems,
    Mounts,
    StoreMounts,
    Outfits,
    StoreOutfits,
}

impl PageItemType {
    pub fn id(self) -> u8 {
        match self {
            PageItemType::Items => 0,
            PageItemType::StoreItems => 1,
            PageItemType::Mounts => 2,
            PageItemType::StoreMounts => 3,
            PageItemType::Outfits => 4,
            PageItemType::StoreOutfits => 5,
        }
    }

    pub fn url(self, auction_id: u32, page: u32) -> String {
        get_auction_page_items_url(auction_id, self.id(), page)
    }
}

/// The detail page of an auction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuctionDetails {
    #[serde(flatten)]
    pub auction: ListedAuction,
    pub hit_points: u32,
    pub mana: u32,
    pub capacity: u32,
    pub speed: u32,
    pub blessings_count: u32,
    pub mounts_count: u32,
    pub outfits_count: u32,
    pub titles_count: u32,
    pub skills: Vec<SkillEntry>,
    pub creation_date: Option<DateTime<Utc>>,
    pub experience: i64,
    pub gold: i64,
    pub achievement_points: u32,
    pub regular_world_transfer_available: bool,
    pub charm_expansion: bool,
    pub available_charm_points: u32,
    pub spent_charm_points: u32,
    pub daily_reward_streak: u32,
    pub hunting_task_points: u32,
    pub permanent_hunting_task_slots: u32,
    pub permanent_prey_slots: u32,
    pub hirelings: u32,
    pub hireling_jobs: u32,
    pub hireling_outfits: u32,
    pub items: Option<ItemSummary>,
    pub store_items: Option<ItemSummary>,
    pub mounts: Option<Mounts>,
    pub store_mounts: Option<Mounts>,
    pub outfits: Option<Outfits>,
    pub store_outfits: Option<Outfits>,
    pub blessings: Vec<BlessingEntry>,
    pub imbuements: Vec<String>,
    pub charms: Vec<CharmEntry>,
    pub completed_cyclopedia_map_areas: Vec<String>,
    pub completed_quest_lines: Vec<String>,
    pub titles: Vec<String>,
    pub achievements: Vec<AchievementEntry>,
    pub bestiary_progress: Vec<BestiaryEntry>,
}

impl AuctionDetails {
    pub fn url(&self) -> String {
        self.auction.url()
    }

    pub fn skill(&self, name: &str) -> Option<&SkillEntry> {
        self.skills.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub image_url: String,
    pub name: Option<String>,
    pub count: i64,
    pub item_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayMount {
    pub image_url: String,
    pub name: String,
    pub mount_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayOutfit {
    pub image_url: String,
    pub name: String,
    pub outfit_id: u32,
    pub addons: u8,
}

/// The outfit a character wears in the auction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutfitImage {
    pub image_url: String,
    pub outfit_id: u32,
    pub addons: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesArgument {
    pub category_id: u32,
    pub category_image: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: u32,
    /// Percent towards the next level.
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlessingEntry {
    pub name: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharmEntry {
    pub name: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementEntry {
    pub name: String,
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestiaryEntry {
    pub name: String,
    pub kills: u32,
    /// 4 means fully unlocked.
    pub step: u8,
}

impl BestiaryEntry {
    pub fn completed(&self) -> bool {
        self.step == 4
    }
}
