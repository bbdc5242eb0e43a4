// src/extractors/character.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::extractors::deaths::parse_death_html;
use crate::extractors::guard::ContentGuard;
use crate::extractors::{find_section, titled_tables};
use crate::models::character::{
    AccountBadge, AccountInformation, Achievement, Character, CharacterHouse, Death, GuildMembership, OtherCharacter,
};
use crate::models::enums::{AccountStatus, Sex, Vocation};
use crate::utils::convert::{normalize_label, parse_date, parse_datetime, parse_integer, parse_integer_strict};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{
    direct_cells, element_text, first_image_src, first_link, parse_popup, query_param, selector,
    text_with_line_breaks,
};

const ENTITY: &str = "character";

const INFORMATION: &str = "Character Information";
const NOT_FOUND: &str = "Could not find character";

static DELETED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^,]+), will be deleted at (.*)$").expect("Failed to compile DELETED_RE"));
static GUILD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\s\w()]+?)\s+of the\s+(.+)$").expect("Failed to compile GUILD_RE"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)\((\d+) titles? unlocked\)$").expect("Failed to compile TITLE_RE"));
static PAID_UNTIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"paid until (.*)$").expect("Failed to compile PAID_UNTIL_RE"));
static HOUSE_TOWN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\) is paid").expect("Failed to compile HOUSE_TOWN_RE"));
static NUMBERED_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*(.+)$").expect("Failed to compile NUMBERED_NAME_RE"));

static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static HELPER: Lazy<Selector> = Lazy::new(|| selector("span.HelperDivIndicator"));

fn has_table(document: &Html, title: &str) -> bool {
    find_section(&titled_tables(document), title).is_some()
}

fn is_not_found(document: &Html) -> bool {
    has_table(document, NOT_FOUND)
}

fn is_character_page(document: &Html) -> bool {
    has_table(document, INFORMATION)
}

pub const CHARACTER_GUARD: ContentGuard =
    ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_character_page };

fn section<'a, 'd>(tables: &'a [(String, Vec<ElementRef<'d>>)], title: &str) -> &'a [ElementRef<'d>] {
    find_section(tables, title).map(Vec::as_slice).unwrap_or_default()
}

impl Character {
    /// Parses a character's page.
    ///
    /// Returns `Ok(None)` when the site reports that the character does not
    /// exist, and an error when the document is not a character page.
    pub fn from_content(content: &str) -> Result<Option<Character>, InvalidContent> {
        let document = Html::parse_document(content);
        if !CHARACTER_GUARD.admit(&document)? {
            return Ok(None);
        }
        let tables = titled_tables(&document);
        debug!("Character page sections: {:?}", tables.iter().map(|(t, _)| t).collect::<Vec<_>>());

        let mut character = parse_information(section(&tables, INFORMATION))?;
        character.achievements = parse_achievements(section(&tables, "Account Achievements"));
        character.account_badges = parse_badges(section(&tables, "Account Badges"));
        character.deaths = parse_deaths(&character.name, section(&tables, "Character Deaths"));
        character.account_information = parse_account_information(section(&tables, "Account Information"));
        character.other_characters = parse_other_characters(section(&tables, "Characters"));
        Ok(Some(character))
    }
}

fn label_value(row: ElementRef<'_>) -> Option<(String, ElementRef<'_>)> {
    match direct_cells(row).as_slice() {
        [label, value] => Some((normalize_label(&element_text(*label)), *value)),
        _ => None,
    }
}

fn parse_information(rows: &[ElementRef]) -> Result<Character, InvalidContent> {
    let mut name = None;
    let mut character = Character {
        name: String::new(),
        deletion_date: None,
        former_names: Vec::new(),
        title: None,
        unlocked_titles: 0,
        sex: Sex::Unknown(String::new()),
        vocation: Vocation::NoVocation,
        level: 0,
        achievement_points: 0,
        world: String::new(),
        former_world: None,
        residence: String::new(),
        married_to: None,
        house: None,
        guild_membership: None,
        last_login: None,
        position: None,
        comment: None,
        account_status: AccountStatus::FreeAccount,
        account_badges: Vec::new(),
        achievements: Vec::new(),
        deaths: Vec::new(),
        account_information: None,
        other_characters: Vec::new(),
    };
    let mut house_cell = None;

    for &row in rows {
        let Some((label, cell)) = label_value(row) else { continue };
        let value = element_text(cell);
        match label.as_str() {
            "name" => name = Some(value),
            "former_names" => {
                character.former_names =
                    value.split(',').map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect()
            }
            "title" => {
                let (title, unlocked) = match TITLE_RE.captures(&value) {
                    Some(caps) => (caps[1].trim().to_string(), caps[2].parse().unwrap_or(0)),
                    None => (value.clone(), 0),
                };
                character.title = (title != "None" && !title.is_empty()).then_some(title);
                character.unlocked_titles = unlocked;
            }
            "sex" => character.sex = Sex::from_label(&value),
            "vocation" => character.vocation = Vocation::from_label(&value),
            "level" => {
                character.level =
                    parse_integer_strict(&value, "level").map_err(|e| InvalidContent::field(ENTITY, e))? as u32
            }
            "achievement_points" => character.achievement_points = parse_integer(&value).unwrap_or(0) as u32,
            "world" => character.world = value,
            "former_world" => character.former_world = Some(value),
            "residence" => character.residence = value,
            "married_to" => character.married_to = Some(value),
            "house" => house_cell = Some(cell),
            "guild_membership" => {
                character.guild_membership = GUILD_RE.captures(&value).map(|caps| GuildMembership {
                    name: caps[2].trim().to_string(),
                    rank: caps[1].trim().to_string(),
                })
            }
            "last_login" => {
                character.last_login = if value.contains("never") { None } else { parse_datetime(&value) }
            }
            "position" => character.position = Some(value),
            "comment" => character.comment = Some(text_with_line_breaks(cell)),
            "account_status" => character.account_status = AccountStatus::from_label(&value),
            other => trace!("Ignoring character field '{}'", other),
        }
    }

    let name = name.ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("name")))?;
    if let Some(caps) = DELETED_RE.captures(&name) {
        character.name = caps[1].trim().to_string();
        character.deletion_date = parse_datetime(&caps[2]);
    } else {
        character.name = name.clone();
    }
    character.house = house_cell.and_then(|cell| parse_house(cell, &character));
    Ok(character)
}

fn parse_house(cell: ElementRef, character: &Character) -> Option<CharacterHouse> {
    let text = element_text(cell);
    let (house_name, href) = first_link(cell)?;
    let id = query_param(&href, "houseid").and_then(|id| id.parse().ok())?;
    let town = query_param(&href, "town")
        .or_else(|| HOUSE_TOWN_RE.captures(&text).map(|c| c[1].to_string()))
        .unwrap_or_default();
    let paid_until = PAID_UNTIL_RE.captures(&text).and_then(|c| parse_date(&c[1]));
    Some(CharacterHouse {
        id,
        name: house_name,
        world: character.world.clone(),
        town,
        owner: character.name.clone(),
        paid_until,
    })
}

fn parse_achievements(rows: &[ElementRef]) -> Vec<Achievement> {
    rows.iter()
        .filter_map(|&row| {
            let cells = direct_cells(row);
            let [grade_cell, name_cell] = cells.as_slice() else { return None };
            let name = element_text(*name_cell);
            if name.is_empty() {
                return None;
            }
            Some(Achievement {
                name,
                grade: grade_cell.html().matches("achievement-grade-symbol").count() as u8,
                secret: name_cell.select(&IMG).next().is_some(),
            })
        })
        .collect()
}

fn parse_badges(rows: &[ElementRef]) -> Vec<AccountBadge> {
    let Some(row) = rows.first() else { return Vec::new() };
    let mut badges = Vec::new();
    for cell in direct_cells(*row) {
        // Badges shown but none selected.
        let Some(popup) = cell.select(&HELPER).next() else { break };
        let Some((name, body)) = popup.value().attr("onmouseover").and_then(parse_popup) else {
            continue;
        };
        badges.push(AccountBadge {
            name,
            icon_url: first_image_src(cell).unwrap_or_default(),
            description: element_text(body.root_element()),
        });
    }
    badges
}

fn parse_deaths(name: &str, rows: &[ElementRef]) -> Vec<Death> {
    rows.iter()
        .filter_map(|&row| {
            let cells = direct_cells(row);
            let [time_cell, description] = cells.as_slice() else { return None };
            parse_death_html(name, &description.inner_html(), parse_datetime(&element_text(*time_cell)))
        })
        .collect()
}

fn parse_account_information(rows: &[ElementRef]) -> Option<AccountInformation> {
    if rows.is_empty() {
        return None;
    }
    let mut info = AccountInformation { created: None, loyalty_title: None, position: None };
    for &row in rows {
        let Some((label, cell)) = label_value(row) else { continue };
        let value = element_text(cell);
        match label.as_str() {
            "created" => info.created = parse_datetime(&value),
            "loyalty_title" => info.loyalty_title = (value != "(no title)").then_some(value),
            "position" => info.position = Some(value),
            other => trace!("Ignoring account information field '{}'", other),
        }
    }
    Some(info)
}

fn parse_other_characters(rows: &[ElementRef]) -> Vec<OtherCharacter> {
    rows.iter()
        .filter_map(|&row| {
            let cells = direct_cells(row);
            if cells.len() < 3 {
                return None;
            }
            let raw_name = element_text(cells[0]);
            let name = NUMBERED_NAME_RE.captures(&raw_name)?[1].trim().to_string();
            let status = element_text(cells[2]).to_lowercase();
            let main = cells[0]
                .select(&IMG)
                .any(|img| img.value().attr("title") == Some("Main Character"));
            Some(OtherCharacter {
                name,
                world: element_text(cells[1]),
                online: status.contains("online"),
                deleted: status.contains("deleted"),
                main,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::character::Killer;
    use chrono::{Datelike, NaiveDate, Timelike};

    const CHARACTER_PAGE: &str = r#"<html><body><div class="BoxContent">
<table width="100%"><tr><td colspan="2">Character Information</td></tr>
<tr><td>Name:</td><td>Tschas, will be deleted at Sep 30 2022, 10:00:00 CEST</td></tr>
<tr><td>Former Names:</td><td>Tschaas, Tsxhas</td></tr>
<tr><td>Title:</td><td>Gold Hoarder (12 titles unlocked)</td></tr>
<tr><td>Sex:</td><td>female</td></tr>
<tr><td>Vocation:</td><td>Elder Druid</td></tr>
<tr><td>Level:</td><td>346</td></tr>
<tr><td>Achievement&#160;Points:</td><td>1,103</td></tr>
<tr><td>World:</td><td>Gladera</td></tr>
<tr><td>Former World:</td><td>Fidera</td></tr>
<tr><td>Residence:</td><td>Thais</td></tr>
<tr><td>Married To:</td><td><a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Xzilla">Xzilla</a></td></tr>
<tr><td>House:</td><td><a href="https://www.tibia.com/community/?subtopic=houses&amp;page=view&amp;houseid=55302&amp;world=Gladera&amp;town=Thais">Sorcerer's Avenue 1</a> (Thais) is paid until Jan 10 2022</td></tr>
<tr><td>Guild&#160;Membership:</td><td>Leader of the <a href="https://www.tibia.com/community/?subtopic=guilds&amp;page=view&amp;GuildName=Dragon+Slayers">Dragon Slayers</a></td></tr>
<tr><td>Last Login:</td><td>Jul 20 2022, 03:46:41 CEST</td></tr>
<tr><td>Comment:</td><td>First line<br>Second line</td></tr>
<tr><td>Account&#160;Status:</td><td>Premium Account</td></tr>
<tr><td>Unknown Field:</td><td>ignored</td></tr>
</table>
<table width="100%"><tr><td colspan="2">Account Badges</td></tr>
<tr><td><span class="HelperDivIndicator" onmouseover="ActivateHelperDiv($(this), 'Ancient Hero', 'The account is older than 15 years.', '');"><img src="https://static.tibia.com/images/badges/badge_ancienthero.png"></span></td></tr>
</table>
<table width="100%"><tr><td colspan="2">Account Achievements</td></tr>
<tr><td><img class="achievement-grade-symbol" src="a.gif"><img class="achievement-grade-symbol" src="a.gif"></td><td>Allow Cookies?</td></tr>
<tr><td><img class="achievement-grade-symbol" src="a.gif"></td><td>Secret Agent <img src="secret.gif"></td></tr>
</table>
<table width="100%"><tr><td colspan="2">Character Deaths</td></tr>
<tr><td>Jul 19 2022, 22:31:18 CEST</td><td>Level 345 by <a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Xzilla">Xzilla</a> and a dragon.<br>Assisted by <a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Bubble">Bubble</a>.</td></tr>
<tr><td>Jul 01 2022, 12:00:00 CEST</td><td>Died at Level by something.</td></tr>
</table>
<table width="100%"><tr><td colspan="2">Account Information</td></tr>
<tr><td>Loyalty Title:</td><td>(no title)</td></tr>
<tr><td>Created:</td><td>Jul 01 2008, 18:00:00 CEST</td></tr>
</table>
<table width="100%"><tr><td colspan="4">Characters</td></tr>
<tr><td>Name</td><td>World</td><td>Status</td><td></td></tr>
<tr><td><img title="Main Character" src="main.gif">1.&#160;Tschas</td><td>Gladera</td><td>online</td><td>View</td></tr>
<tr><td>2.&#160;Old Alt</td><td>Fidera</td><td>deleted</td><td>View</td></tr>
</table>
</div></body></html>"#;

    const NOT_FOUND_PAGE: &str = r#"<html><body>
<table width="100%"><tr><td>Could not find character</td></tr>
<tr><td>Character <b>Nobody</b> does not exist.</td></tr></table>
<table width="100%"><tr><td>Search Character</td></tr></table>
</body></html>"#;

    const OTHER_PAGE: &str = r#"<html><body>
<table width="100%"><tr><td>World Information</td></tr></table>
<p>Maintenance</p></body></html>"#;

    #[test]
    fn test_character_information() {
        let character = Character::from_content(CHARACTER_PAGE).unwrap().unwrap();
        assert_eq!(character.name, "Tschas");
        assert!(character.deleted());
        assert_eq!(character.deletion_date.unwrap().hour(), 8);
        assert_eq!(character.former_names, vec!["Tschaas", "Tsxhas"]);
        assert_eq!(character.title.as_deref(), Some("Gold Hoarder"));
        assert_eq!(character.unlocked_titles, 12);
        assert_eq!(character.sex, Sex::Female);
        assert_eq!(character.vocation, Vocation::ElderDruid);
        assert_eq!(character.level, 346);
        assert_eq!(character.achievement_points, 1103);
        assert_eq!(character.former_world.as_deref(), Some("Fidera"));
        assert_eq!(character.married_to.as_deref(), Some("Xzilla"));
        assert_eq!(character.guild_name(), Some("Dragon Slayers"));
        assert_eq!(character.guild_rank(), Some("Leader"));
        assert_eq!(character.comment.as_deref(), Some("First line\nSecond line"));
        assert_eq!(character.account_status, AccountStatus::PremiumAccount);
        assert_eq!(character.last_login.map(|d| d.day()), Some(20));

        let house = character.house.as_ref().unwrap();
        assert_eq!(house.id, 55302);
        assert_eq!(house.name, "Sorcerer's Avenue 1");
        assert_eq!(house.town, "Thais");
        assert_eq!(house.world, "Gladera");
        assert_eq!(house.owner, "Tschas");
        assert_eq!(house.paid_until, NaiveDate::from_ymd_opt(2022, 1, 10));
    }

    #[test]
    fn test_character_sections() {
        let character = Character::from_content(CHARACTER_PAGE).unwrap().unwrap();

        assert_eq!(character.account_badges.len(), 1);
        assert_eq!(character.account_badges[0].name, "Ancient Hero");
        assert_eq!(character.account_badges[0].description, "The account is older than 15 years.");

        assert_eq!(character.achievements.len(), 2);
        assert_eq!((character.achievements[0].grade, character.achievements[0].secret), (2, false));
        assert_eq!((character.achievements[1].grade, character.achievements[1].secret), (1, true));

        assert_eq!(character.deaths.len(), 1, "deaths without level are dropped");
        let death = &character.deaths[0];
        assert_eq!(death.level, 345);
        assert_eq!(death.killers, vec![Killer::player("Xzilla"), Killer::creature("a dragon")]);
        assert_eq!(death.assists, vec![Killer::player("Bubble")]);

        let info = character.account_information.as_ref().unwrap();
        assert_eq!(info.loyalty_title, None);
        assert!(info.created.is_some());

        assert!(!character.hidden());
        assert_eq!(character.other_characters.len(), 2);
        assert!(character.other_characters[0].main && character.other_characters[0].online);
        assert!(character.other_characters[1].deleted);
        assert_eq!(character.other_characters[1].name, "Old Alt");
    }

    #[test]
    fn test_title_without_selection() {
        let page = CHARACTER_PAGE.replace("Gold Hoarder (12 titles unlocked)", "None (3 titles unlocked)");
        let character = Character::from_content(&page).unwrap().unwrap();
        assert_eq!(character.title, None);
        assert_eq!(character.unlocked_titles, 3);
    }

    #[test]
    fn test_unreadable_level_is_an_error() {
        let page = CHARACTER_PAGE.replace("<td>346</td>", "<td>unknown</td>");
        assert!(matches!(
            Character::from_content(&page),
            Err(InvalidContent::Field { entity: "character", source: FieldError::Format { field: "level", .. } })
        ));
    }

    #[test]
    fn test_guard_states() {
        assert!(Character::from_content(NOT_FOUND_PAGE).unwrap().is_none());
        assert!(matches!(
            Character::from_content(OTHER_PAGE),
            Err(InvalidContent::WrongSection("character"))
        ));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        assert_eq!(Character::from_content(CHARACTER_PAGE).unwrap(), Character::from_content(CHARACTER_PAGE).unwrap());
    }

    #[test]
    fn test_guild_membership_split() {
        let caps = GUILD_RE.captures("Leader of the Dragon Slayers").unwrap();
        assert_eq!((&caps[1], &caps[2]), ("Leader", "Dragon Slayers"));
    }
}
