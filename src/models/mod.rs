// src/models/mod.rs
//! Domain records. Parsing lives in [`crate::extractors`].

pub mod bazaar;
pub mod character;
pub mod enums;
pub mod guild;
pub mod highscores;
pub mod house;
pub mod kill_statistics;
pub mod news;
pub mod pagination;
pub mod tournament;
pub mod world;

pub use bazaar::{
    AchievementEntry, AuctionDetails, AuctionFilters, BestiaryEntry, BlessingEntry, CharacterBazaar, CharmEntry,
    DisplayItem, DisplayMount, DisplayOutfit, ItemSummary, ListedAuction, Mounts, OutfitImage, Outfits,
    PageItemType, SalesArgument, SkillEntry,
};
pub use character::{
    AccountBadge, AccountInformation, Achievement, Character, CharacterHouse, Death, GuildMembership, Killer,
    OnlineCharacter, OtherCharacter,
};
pub use enums::*;
pub use guild::{Guild, GuildHouse, GuildInvite, GuildMember, ListedGuild};
pub use highscores::{Highscores, HighscoresEntry};
pub use house::{House, ListedHouse};
pub use kill_statistics::{KillStatistics, RaceEntry};
pub use news::{ListedNews, News};
pub use pagination::PaginatedSummary;
pub use tournament::{ListedTournament, RewardEntry, RuleSet, ScoreSet, Tournament};
pub use world::{ListedWorld, World, WorldOverview};
