// src/models/character.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::enums::{AccountStatus, Sex, Vocation};
use crate::models::guild::Guild;
use crate::models::house::House;
use crate::tibia::urls::get_tibia_url;

/// A character's information page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    pub name: String,
    /// Set when the character is scheduled for deletion.
    pub deletion_date: Option<DateTime<Utc>>,
    pub former_names: Vec<String>,
    pub title: Option<String>,
    pub unlocked_titles: u32,
    pub sex: Sex,
    pub vocation: Vocation,
    pub level: u32,
    pub achievement_points: u32,
    pub world: String,
    pub former_world: Option<String>,
    pub residence: String,
    pub married_to: Option<String>,
    pub house: Option<CharacterHouse>,
    pub guild_membership: Option<GuildMembership>,
    /// `None` when the character never logged in.
    pub last_login: Option<DateTime<Utc>>,
    pub position: Option<String>,
    pub comment: Option<String>,
    pub account_status: AccountStatus,
    pub account_badges: Vec<AccountBadge>,
    pub achievements: Vec<Achievement>,
    /// Newest first.
    pub deaths: Vec<Death>,
    pub account_information: Option<AccountInformation>,
    /// Empty for hidden characters; otherwise includes the character itself.
    pub other_characters: Vec<OtherCharacter>,
}

impl Character {
    pub fn get_url(name: &str) -> String {
        get_tibia_url("community", Some("characters"), &[("name", name.to_string())])
    }

    pub fn url(&self) -> String {
        Self::get_url(&self.name)
    }

    pub fn deleted(&self) -> bool {
        self.deletion_date.is_some()
    }

    pub fn hidden(&self) -> bool {
        self.other_characters.is_empty()
    }

    pub fn guild_name(&self) -> Option<&str> {
        self.guild_membership.as_ref().map(|g| g.name.as_str())
    }

    pub fn guild_rank(&self) -> Option<&str> {
        self.guild_membership.as_ref().map(|g| g.rank.as_str())
    }

    pub fn guild_url(&self) -> Option<String> {
        self.guild_membership.as_ref().map(GuildMembership::url)
    }

    pub fn married_to_url(&self) -> Option<String> {
        self.married_to.as_deref().map(Self::get_url)
    }
}

/// One recent death of a character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Death {
    /// The character who died.
    pub name: String,
    pub level: u32,
    /// First entry dealt the killing blow.
    pub killers: Vec<Killer>,
    /// Characters involved without dealing damage.
    pub assists: Vec<Killer>,
    pub time: Option<DateTime<Utc>>,
}

impl Death {
    /// The killer that dealt the killing blow.
    pub fn killer(&self) -> Option<&Killer> {
        self.killers.first()
    }

    /// Whether another character took part in the kill.
    pub fn by_player(&self) -> bool {
        self.killers.iter().any(|k| k.player && k.name != self.name)
    }
}

/// A killer is either a creature, a player, or a creature summoned by a player.
///
/// `summon` is only ever set together with `player`, in which case `name` is
/// the summoner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Killer {
    pub name: String,
    pub player: bool,
    pub summon: Option<String>,
}

impl Killer {
    pub fn creature(name: impl Into<String>) -> Self {
        Killer { name: name.into(), player: false, summon: None }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Killer { name: name.into(), player: true, summon: None }
    }

    pub fn summon(owner: impl Into<String>, summon: impl Into<String>) -> Self {
        Killer { name: owner.into(), player: true, summon: Some(summon.into()) }
    }

    pub fn url(&self) -> Option<String> {
        self.player.then(|| Character::get_url(&self.name))
    }
}

/// Guild and rank shown on a character page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildMembership {
    pub name: String,
    pub rank: String,
}

impl GuildMembership {
    pub fn url(&self) -> String {
        Guild::get_url(&self.name)
    }
}

/// The house owned by a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterHouse {
    pub id: u32,
    pub name: String,
    pub world: String,
    pub town: String,
    pub owner: String,
    pub paid_until: Option<NaiveDate>,
}

impl CharacterHouse {
    pub fn url(&self) -> String {
        House::get_url(self.id, &self.world)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInformation {
    pub created: Option<DateTime<Utc>>,
    pub loyalty_title: Option<String>,
    pub position: Option<String>,
}

/// A displayed achievement. `grade` is the number of stars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub name: String,
    pub grade: u8,
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBadge {
    pub name: String,
    pub icon_url: String,
    pub description: String,
}

/// Another character on the same account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherCharacter {
    pub name: String,
    pub world: String,
    pub online: bool,
    pub deleted: bool,
    pub main: bool,
}

impl OtherCharacter {
    pub fn url(&self) -> String {
        Character::get_url(&self.name)
    }
}

/// A character listed as online on a world page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineCharacter {
    pub name: String,
    pub world: String,
    pub level: u32,
    pub vocation: Vocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death(killers: Vec<Killer>) -> Death {
        Death { name: "Tschas".into(), level: 100, killers, assists: vec![], time: None }
    }

    #[test]
    fn test_death_derived_fields() {
        let pvp = death(vec![Killer::player("Xzilla"), Killer::creature("a dragon")]);
        assert!(pvp.by_player());
        assert_eq!(pvp.killer().map(|k| k.name.as_str()), Some("Xzilla"));

        let suicide = death(vec![Killer::player("Tschas")]);
        assert!(!suicide.by_player());
        assert!(death(vec![]).killer().is_none());
    }

    #[test]
    fn test_killer_shapes() {
        let summon = Killer::summon("Xzilla", "a fire elemental");
        assert!(summon.player);
        assert_eq!(summon.summon.as_deref(), Some("a fire elemental"));
        assert_eq!(Killer::creature("a rat").url(), None);
        assert_eq!(
            Killer::player("Xzilla").url().as_deref(),
            Some("https://www.tibia.com/community/?subtopic=characters&name=Xzilla")
        );
    }
}
