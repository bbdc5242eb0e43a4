// src/extractors/tibiadata.rs
//! `from_alternate_json` entry points reading the TibiaData v2 API.
//!
//! Each response wraps the entity in a top-level member (`characters`,
//! `guild`, `world`, `house`); an `error` member inside it means the entity
//! does not exist.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::extractors::deaths::parse_death_reason;
use crate::extractors::house::parse_status;
use crate::models::character::{
    AccountInformation, Achievement, Character, CharacterHouse, GuildMembership, OnlineCharacter, OtherCharacter,
};
use crate::models::enums::{
    AccountStatus, HouseStatus, HouseType, PvpType, Sex, TournamentWorldType, TransferType, Vocation, WorldLocation,
};
use crate::models::guild::{Guild, GuildHouse, GuildInvite, GuildMember};
use crate::models::house::House;
use crate::models::world::World;
use crate::utils::convert::{parse_date, parse_datetime, zone_offset_hours};
use crate::utils::error::InvalidContent;

static BATTLEYE_SINCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"since ([^.]+)\.?").expect("Failed to compile BATTLEYE_SINCE_RE"));

/// Datetimes come either as `{date, timezone_type, timezone}` objects or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDateTime {
    Zoned {
        date: String,
        #[serde(default)]
        timezone: Option<String>,
    },
    Text(String),
}

impl JsonDateTime {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            JsonDateTime::Text(text) => parse_datetime(text),
            JsonDateTime::Zoned { date, timezone } => {
                // "2018-08-16 09:36:00.000000"
                let stamp = date.split('.').next().unwrap_or_default();
                let naive = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").ok()?;
                let hours = zone_offset_hours(timezone.as_deref().unwrap_or("UTC"))?;
                FixedOffset::east_opt(hours * 3600)?
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }
}

fn json_error(entity: &'static str) -> impl Fn(serde_json::Error) -> InvalidContent {
    move |source| InvalidContent::Json { entity, source }
}

/// Decodes `content`, returning `Ok(None)` when `content[key].error` is set.
fn decode<T: DeserializeOwned>(entity: &'static str, content: &str, key: &str) -> Result<Option<T>, InvalidContent> {
    let value: Value = serde_json::from_str(content).map_err(json_error(entity))?;
    if let Some(error) = value.get(key).and_then(|section| section.get("error")) {
        debug!("TibiaData {} not found: {}", entity, error);
        return Ok(None);
    }
    serde_json::from_value(value).map(Some).map_err(json_error(entity))
}

/// Members the API sends as an empty array or `false` when unset.
fn object<T: DeserializeOwned>(value: &Value) -> Option<T> {
    value.is_object().then(|| serde_json::from_value(value.clone()).ok()).flatten()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

// Character

#[derive(Deserialize)]
struct CharacterEnvelope {
    characters: CharacterSection,
}

#[derive(Deserialize)]
struct CharacterSection {
    data: CharacterData,
    #[serde(default)]
    achievements: Vec<AchievementJson>,
    #[serde(default)]
    deaths: Vec<DeathJson>,
    #[serde(default)]
    account_information: Value,
    #[serde(default)]
    other_characters: Vec<OtherCharacterJson>,
}

#[derive(Deserialize)]
struct CharacterData {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    unlocked_titles: u32,
    sex: String,
    vocation: String,
    level: u32,
    achievement_points: u32,
    world: String,
    #[serde(default)]
    former_world: Option<String>,
    residence: String,
    #[serde(default)]
    married_to: Option<String>,
    #[serde(default)]
    house: Value,
    #[serde(default)]
    guild: Value,
    #[serde(default)]
    last_login: Vec<JsonDateTime>,
    #[serde(default)]
    comment: Option<String>,
    account_status: String,
    #[serde(default)]
    former_names: Vec<String>,
    #[serde(default)]
    deleted: Option<JsonDateTime>,
    #[serde(default, alias = "Position:")]
    position: Option<String>,
}

#[derive(Deserialize)]
struct CharacterHouseJson {
    houseid: u32,
    name: String,
    town: String,
    #[serde(default)]
    paid: String,
}

#[derive(Deserialize)]
struct MembershipJson {
    name: String,
    rank: String,
}

#[derive(Deserialize)]
struct AchievementJson {
    name: String,
    #[serde(default)]
    stars: u8,
}

#[derive(Deserialize)]
struct DeathJson {
    date: JsonDateTime,
    level: u32,
    reason: String,
    #[serde(default)]
    involved: Vec<NamedEntry>,
}

#[derive(Deserialize)]
struct AccountInformationJson {
    #[serde(default)]
    created: Option<JsonDateTime>,
    #[serde(default)]
    loyalty_title: Option<String>,
    #[serde(default)]
    position: Option<String>,
}

#[derive(Deserialize)]
struct OtherCharacterJson {
    name: String,
    world: String,
    #[serde(default)]
    status: String,
}

impl Character {
    /// Builds a character from a TibiaData character response.
    pub fn from_alternate_json(content: &str) -> Result<Option<Character>, InvalidContent> {
        let Some(envelope) = decode::<CharacterEnvelope>("character", content, "characters")? else {
            return Ok(None);
        };
        let section = envelope.characters;
        let data = section.data;

        let house = object::<CharacterHouseJson>(&data.house).map(|house| CharacterHouse {
            id: house.houseid,
            name: house.name,
            world: data.world.clone(),
            town: house.town,
            owner: data.name.clone(),
            paid_until: parse_date(&house.paid),
        });
        let guild_membership =
            object::<MembershipJson>(&data.guild).map(|guild| GuildMembership { name: guild.name, rank: guild.rank });
        let deaths = section
            .deaths
            .iter()
            .filter(|death| death.level > 0)
            .map(|death| {
                let involved: Vec<String> = death.involved.iter().map(|i| i.name.clone()).collect();
                parse_death_reason(&data.name, death.level, &death.reason, &involved, death.date.to_utc())
            })
            .collect();
        let account_information = object::<AccountInformationJson>(&section.account_information).map(|info| {
            AccountInformation {
                created: info.created.as_ref().and_then(JsonDateTime::to_utc),
                loyalty_title: info.loyalty_title.filter(|t| t != "(no title)"),
                position: non_empty(info.position),
            }
        });

        let character = Character {
            deletion_date: data.deleted.as_ref().and_then(JsonDateTime::to_utc),
            former_names: data.former_names,
            title: non_empty(data.title),
            unlocked_titles: data.unlocked_titles,
            sex: Sex::from_label(&data.sex),
            vocation: Vocation::from_label(&data.vocation),
            level: data.level,
            achievement_points: data.achievement_points,
            former_world: non_empty(data.former_world),
            residence: data.residence,
            married_to: non_empty(data.married_to),
            house,
            guild_membership,
            last_login: data.last_login.first().and_then(JsonDateTime::to_utc),
            position: non_empty(data.position),
            comment: non_empty(data.comment),
            account_status: AccountStatus::from_label(&data.account_status),
            account_badges: Vec::new(),
            achievements: section
                .achievements
                .into_iter()
                .map(|a| Achievement { name: a.name, grade: a.stars, secret: false })
                .collect(),
            deaths,
            account_information,
            other_characters: section
                .other_characters
                .into_iter()
                .map(|other| OtherCharacter {
                    online: other.status == "online",
                    deleted: other.status == "deleted",
                    main: false,
                    name: other.name,
                    world: other.world,
                })
                .collect(),
            name: data.name,
            world: data.world,
        };
        debug!("TibiaData character {}: {} deaths", character.name, character.deaths.len());
        Ok(Some(character))
    }
}

// Guild

#[derive(Deserialize)]
struct GuildEnvelope {
    guild: GuildSection,
}

#[derive(Deserialize)]
struct GuildSection {
    data: GuildData,
    #[serde(default)]
    members: Vec<RankJson>,
    #[serde(default)]
    invited: Vec<InviteJson>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct GuildData {
    name: String,
    world: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    guildhall: Value,
    #[serde(default)]
    application: bool,
    #[serde(default)]
    disbanded: Value,
    #[serde(default)]
    founded: Option<String>,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    guildlogo: Option<String>,
}

#[derive(Deserialize)]
struct GuildhallJson {
    name: String,
    #[serde(default)]
    world: Option<String>,
    #[serde(default)]
    paid: String,
}

#[derive(Deserialize)]
struct DisbandJson {
    notification: String,
    #[serde(default)]
    date: String,
}

#[derive(Deserialize)]
struct RankJson {
    rank_title: String,
    #[serde(default)]
    characters: Vec<MemberJson>,
}

#[derive(Deserialize)]
struct MemberJson {
    name: String,
    #[serde(default)]
    nick: Option<String>,
    level: u32,
    vocation: String,
    #[serde(default)]
    joined: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct InviteJson {
    name: String,
    #[serde(default)]
    invited: String,
}

impl Guild {
    /// Builds a guild from a TibiaData guild response.
    pub fn from_alternate_json(content: &str) -> Result<Option<Guild>, InvalidContent> {
        let Some(envelope) = decode::<GuildEnvelope>("guild", content, "guild")? else {
            return Ok(None);
        };
        let section = envelope.guild;
        let data = section.data;
        let disband = object::<DisbandJson>(&data.disbanded);

        let members = section
            .members
            .into_iter()
            .flat_map(|rank| {
                let title = rank.rank_title;
                rank.characters.into_iter().map(move |member| GuildMember {
                    rank: title.clone(),
                    name: member.name,
                    title: non_empty(member.nick),
                    vocation: Vocation::from_label(&member.vocation),
                    level: member.level,
                    joined: parse_date(&member.joined),
                    online: member.status.eq_ignore_ascii_case("online"),
                })
            })
            .collect();

        let guild = Guild {
            guildhall: object::<GuildhallJson>(&data.guildhall).map(|hall| GuildHouse {
                name: hall.name,
                world: hall.world.unwrap_or_else(|| data.world.clone()),
                paid_until: parse_date(&hall.paid),
            }),
            logo_url: non_empty(data.guildlogo),
            description: non_empty(data.description),
            founded: data.founded.as_deref().and_then(parse_date),
            active: data.active,
            open_applications: data.application,
            disband_date: disband.as_ref().and_then(|d| parse_date(&d.date)),
            disband_condition: disband.map(|d| d.notification),
            homepage: non_empty(data.homepage),
            members,
            invites: section
                .invited
                .into_iter()
                .map(|invite| GuildInvite { date: parse_date(&invite.invited), name: invite.name })
                .collect(),
            name: data.name,
            world: data.world,
        };
        debug!("TibiaData guild {}: {} members", guild.name, guild.member_count());
        Ok(Some(guild))
    }
}

// World

#[derive(Deserialize)]
struct WorldEnvelope {
    world: WorldSection,
}

#[derive(Deserialize)]
struct WorldSection {
    world_information: WorldInformation,
    #[serde(default)]
    players_online: Vec<PlayerJson>,
}

#[derive(Deserialize)]
struct WorldInformation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    players_online: u32,
    #[serde(default)]
    online_record: Value,
    #[serde(default)]
    creation_date: Option<String>,
    #[serde(default)]
    location: String,
    #[serde(default)]
    pvp_type: String,
    #[serde(default)]
    premium_type: Option<String>,
    #[serde(default)]
    transfer_type: Option<String>,
    #[serde(default)]
    world_quest_titles: Vec<String>,
    #[serde(default)]
    battleye_status: String,
    #[serde(default, rename = "Game World Type")]
    game_world_type: Option<String>,
    #[serde(default, rename = "Tournament World Type")]
    tournament_world_type: Option<String>,
}

#[derive(Deserialize)]
struct RecordJson {
    players: u32,
    date: JsonDateTime,
}

#[derive(Deserialize)]
struct PlayerJson {
    name: String,
    level: u32,
    vocation: String,
}

/// `"Protected since 2017-08-29."`, `"Protected since release."` or `"Unprotected"`.
fn parse_battleye(status: &str) -> (bool, Option<chrono::NaiveDate>) {
    let lower = status.to_lowercase();
    let protected = lower.contains("protected") && !lower.contains("unprotected") && !lower.contains("not protected");
    let date = BATTLEYE_SINCE_RE.captures(status).and_then(|caps| parse_date(caps[1].trim()));
    (protected, date.filter(|_| protected))
}

impl World {
    /// Builds a world from a TibiaData world response. The API answers an
    /// unknown world with an empty, nameless record, which becomes `None`.
    pub fn from_alternate_json(content: &str) -> Result<Option<World>, InvalidContent> {
        let Some(envelope) = decode::<WorldEnvelope>("world", content, "world")? else {
            return Ok(None);
        };
        let info = envelope.world.world_information;
        if info.name.is_empty() {
            debug!("TibiaData world without a name");
            return Ok(None);
        }
        let record = object::<RecordJson>(&info.online_record);
        let (battleye_protected, battleye_date) = parse_battleye(&info.battleye_status);
        let world_type = info.game_world_type.unwrap_or_default().to_lowercase();
        let tournament_world_type = world_type.contains("tournament").then(|| {
            TournamentWorldType::from_label(info.tournament_world_type.as_deref().unwrap_or("Regular"))
        });
        let status = info
            .status
            .unwrap_or_else(|| if info.players_online > 0 { "Online" } else { "Offline" }.to_string());

        let world = World {
            online_players: envelope
                .world
                .players_online
                .into_iter()
                .map(|player| OnlineCharacter {
                    name: player.name,
                    world: info.name.clone(),
                    level: player.level,
                    vocation: Vocation::from_label(&player.vocation),
                })
                .collect(),
            name: info.name,
            status,
            online_count: info.players_online,
            record_count: record.as_ref().map_or(0, |r| r.players),
            record_date: record.as_ref().and_then(|r| r.date.to_utc()),
            creation_date: non_empty(info.creation_date),
            location: WorldLocation::from_label(&info.location),
            pvp_type: PvpType::from_label(&info.pvp_type),
            transfer_type: info.transfer_type.as_deref().map_or(TransferType::Regular, TransferType::from_label),
            world_quest_titles: info
                .world_quest_titles
                .into_iter()
                .filter(|title| !title.contains("currently has no title"))
                .collect(),
            battleye_protected,
            battleye_date,
            experimental: world_type.contains("experimental"),
            premium_only: info.premium_type.is_some_and(|p| p.to_lowercase().contains("premium")),
            tournament_world_type,
        };
        debug!("TibiaData world {}: {} online", world.name, world.online_players.len());
        Ok(Some(world))
    }
}

// House

#[derive(Deserialize)]
struct HouseEnvelope {
    house: HouseJson,
}

#[derive(Deserialize)]
struct HouseJson {
    houseid: u32,
    name: String,
    world: String,
    #[serde(default)]
    town: Option<String>,
    #[serde(rename = "type")]
    house_type: String,
    #[serde(default)]
    beds: u32,
    size: u32,
    rent: i64,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    status: Value,
}

impl House {
    /// Builds a house from a TibiaData house response. The status sentence is
    /// the same free text the site shows and is parsed the same way.
    pub fn from_alternate_json(content: &str) -> Result<Option<House>, InvalidContent> {
        let Some(envelope) = decode::<HouseEnvelope>("house", content, "house")? else {
            return Ok(None);
        };
        let data = envelope.house;
        let mut house = House {
            id: data.houseid,
            name: data.name,
            world: data.world,
            town: non_empty(data.town),
            image_url: non_empty(data.img),
            house_type: HouseType::from_label(&data.house_type),
            beds: data.beds,
            size: data.size,
            rent: data.rent,
            status: HouseStatus::Auctioned,
            owner: None,
            owner_sex: None,
            paid_until: None,
            transfer_date: None,
            transferee: None,
            transfer_price: None,
            transfer_accepted: false,
            highest_bid: None,
            highest_bidder: None,
            auction_end: None,
        };
        let text = match &data.status {
            Value::String(text) => Some(text.as_str()),
            Value::Object(map) => map.get("original").and_then(Value::as_str),
            _ => None,
        };
        if let Some(text) = text {
            parse_status(&mut house, text);
        }
        debug!("TibiaData house {} ({}) is {}", house.name, house.id, house.status);
        Ok(Some(house))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::character::Killer;
    use chrono::Timelike;

    const CHARACTER: &str = r#"{"characters":{"data":{"name":"Tschas","title":"","sex":"female",
"vocation":"Elder Druid","level":522,"achievement_points":361,"world":"Gladera","residence":"Ankrahmun",
"married_to":"Xzilla","house":{"name":"Darashia 8, Flat 03","town":"Darashia","paid":"2019-06-06","world":"Gladera","houseid":35019},
"guild":{"name":"Bald Dwarfs","rank":"Emperor"},"last_login":[{"date":"2019-05-21 00:04:32.000000","timezone_type":2,"timezone":"CEST"}],
"comment":"","account_status":"Premium Account","status":"offline","former_names":["Galarzaa"]},
"achievements":[{"stars":1,"name":"Allow Cookies?"}],
"deaths":[{"date":{"date":"2019-05-20 23:10:07.000000","timezone_type":2,"timezone":"CEST"},"level":521,
"reason":"Died at Level 521 by Xzilla and a dragon of Bubble. Assisted by Eternal Oblivion.",
"involved":[{"name":"Xzilla"},{"name":"Bubble"},{"name":"Eternal Oblivion"}]}],
"account_information":{"loyalty_title":"(no title)","created":{"date":"2010-06-05 17:43:00.000000","timezone_type":2,"timezone":"CEST"}},
"other_characters":[{"name":"Tschas","world":"Gladera","status":"offline"},{"name":"Old","world":"Gladera","status":"deleted"}]}}"#;

    #[test]
    fn test_character() {
        let character = Character::from_alternate_json(CHARACTER).unwrap().unwrap();
        assert_eq!(character.name, "Tschas");
        assert_eq!(character.sex, Sex::Female);
        assert_eq!(character.vocation, Vocation::ElderDruid);
        assert_eq!(character.level, 522);
        assert!(character.title.is_none());
        assert!(character.comment.is_none());
        assert_eq!(character.guild_name(), Some("Bald Dwarfs"));
        let house = character.house.as_ref().unwrap();
        assert_eq!((house.id, house.town.as_str(), house.owner.as_str()), (35019, "Darashia", "Tschas"));
        assert_eq!(character.last_login.map(|t| t.hour()), Some(22));
        assert_eq!(character.achievements[0].grade, 1);
        let info = character.account_information.as_ref().unwrap();
        assert!(info.loyalty_title.is_none());
        assert!(info.created.is_some());
        assert!(character.other_characters[1].deleted);
        assert!(!character.hidden());
    }

    #[test]
    fn test_character_deaths_use_involved_names() {
        let character = Character::from_alternate_json(CHARACTER).unwrap().unwrap();
        let death = &character.deaths[0];
        assert_eq!(death.level, 521);
        assert_eq!(death.killers, vec![Killer::player("Xzilla"), Killer::summon("Bubble", "a dragon")]);
        assert_eq!(death.assists, vec![Killer::player("Eternal Oblivion")]);
        assert!(death.time.is_some());
    }

    #[test]
    fn test_deaths_without_level_are_skipped() {
        let content = CHARACTER.replace(r#""level":521,"#, r#""level":0,"#);
        let character = Character::from_alternate_json(&content).unwrap().unwrap();
        assert!(character.deaths.is_empty());
        assert_eq!(character.level, 522);
    }

    #[test]
    fn test_not_found_and_invalid() {
        let missing = r#"{"characters":{"error":"Character does not exist."}}"#;
        assert!(Character::from_alternate_json(missing).unwrap().is_none());
        assert!(matches!(Character::from_alternate_json("<html>"), Err(InvalidContent::Json { .. })));
        let incomplete = r#"{"characters":{"data":{"name":"Tschas"}}}"#;
        assert!(matches!(
            Character::from_alternate_json(incomplete),
            Err(InvalidContent::Json { entity: "character", .. })
        ));
        assert!(Guild::from_alternate_json(r#"{"guild":{"error":"Guild does not exist."}}"#).unwrap().is_none());
        assert!(House::from_alternate_json(r#"{"house":{"error":"House does not exist."}}"#).unwrap().is_none());
    }

    #[test]
    fn test_guild() {
        let json = r#"{"guild":{"data":{"name":"Bald Dwarfs","description":"A guild.","guildhall":{"name":"Bald Hall","town":"Thais","paid":"2020-01-01","world":"Gladera","houseid":1},
"application":true,"war":false,"disbanded":false,"world":"Gladera","founded":"2004-06-21","active":true,"homepage":"","guildlogo":"https://static.tibia.com/images/guildlogos/Bald_Dwarfs.gif"},
"members":[{"rank_title":"Emperor","characters":[{"name":"Tschas","nick":"Boss","level":522,"vocation":"Elder Druid","joined":"2004-06-21","status":"online"}]},
{"rank_title":"Member","characters":[{"name":"Xzilla","nick":"","level":300,"vocation":"Knight","joined":"2010-01-02","status":"offline"}]}],
"invited":[{"name":"Bubble","invited":"2020-03-04"}]}}"#;
        let guild = Guild::from_alternate_json(json).unwrap().unwrap();
        assert_eq!(guild.name, "Bald Dwarfs");
        assert!(guild.open_applications);
        assert!(guild.homepage.is_none());
        assert!(guild.disband_condition.is_none());
        assert_eq!(guild.guildhall.as_ref().map(|h| h.name.as_str()), Some("Bald Hall"));
        assert_eq!(guild.member_count(), 2);
        assert_eq!(guild.members[0].title.as_deref(), Some("Boss"));
        assert!(guild.members[1].title.is_none());
        assert_eq!(guild.ranks(), vec!["Emperor", "Member"]);
        assert_eq!(guild.online_members().len(), 1);
        assert!(guild.invites[0].date.is_some());
    }

    #[test]
    fn test_world() {
        let json = r#"{"world":{"world_information":{"name":"Gladera","players_online":2,
"online_record":{"players":1063,"date":{"date":"2018-04-14 20:12:11.000000","timezone_type":2,"timezone":"CEST"}},
"creation_date":"2017-08","location":"Europe","pvp_type":"Open PvP","premium_type":"premium",
"world_quest_titles":["This game world currently has no title."],"battleye_status":"Protected since 2017-08-29.","Game World Type":"Regular"},
"players_online":[{"name":"Tschas","level":522,"vocation":"Elder Druid"},{"name":"Xzilla","level":300,"vocation":"Knight"}]}}"#;
        let world = World::from_alternate_json(json).unwrap().unwrap();
        assert_eq!(world.name, "Gladera");
        assert_eq!(world.record_count, 1063);
        assert!(world.record_date.is_some());
        assert_eq!(world.creation_year(), Some(2017));
        assert_eq!(world.pvp_type, PvpType::OpenPvp);
        assert!(world.world_quest_titles.is_empty());
        assert!(world.battleye_protected);
        assert_eq!(world.battleye_date, chrono::NaiveDate::from_ymd_opt(2017, 8, 29));
        assert!(world.premium_only);
        assert!(!world.experimental);
        assert!(world.tournament_world_type.is_none());
        assert_eq!(world.online_players.len(), 2);
        assert_eq!(world.online_players[0].world, "Gladera");

        let nameless = r#"{"world":{"world_information":{"players_online":0},"players_online":[]}}"#;
        assert!(World::from_alternate_json(nameless).unwrap().is_none());
    }

    #[test]
    fn test_battleye_states() {
        assert_eq!(parse_battleye("Protected since release."), (true, None));
        assert_eq!(parse_battleye("Unprotected"), (false, None));
        assert!(parse_battleye("Protected since 2017-08-29.").1.is_some());
    }

    #[test]
    fn test_house() {
        let json = r#"{"house":{"houseid":35019,"world":"Gladera","town":"Darashia","name":"Darashia 8, Flat 03",
"type":"house","beds":3,"size":80,"rent":1000,"img":"https://static.tibia.com/images/houses/house_35019.png",
"status":{"original":"The house has been rented by Tschas. She has paid the rent until Jun 21 2020, 10:00 CEST."}}}"#;
        let house = House::from_alternate_json(json).unwrap().unwrap();
        assert_eq!(house.id, 35019);
        assert_eq!(house.town.as_deref(), Some("Darashia"));
        assert_eq!(house.house_type, HouseType::House);
        assert_eq!(house.status, HouseStatus::Rented);
        assert_eq!(house.owner.as_deref(), Some("Tschas"));
        assert_eq!(house.owner_sex, Some(Sex::Female));
        assert!(house.paid_until.is_some());
    }

    #[test]
    fn test_zoned_datetime() {
        let zoned = JsonDateTime::Zoned { date: "2019-05-21 00:04:32.000000".into(), timezone: Some("CEST".into()) };
        let utc = zoned.to_utc().unwrap();
        assert_eq!((utc.hour(), utc.minute()), (22, 4));
        let text = JsonDateTime::Text("2019-05-21T00:04:32Z".into());
        assert_eq!(text.to_utc().map(|t| t.hour()), Some(0));
    }
}
