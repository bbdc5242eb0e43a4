// src/extractors/world.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::extractors::guard::{never, ContentGuard};
use crate::extractors::{document_rows, find_section, leaf_rows, table_containers};
use crate::models::character::OnlineCharacter;
use crate::models::enums::{PvpType, TournamentWorldType, TransferType, Vocation, WorldLocation};
use crate::models::world::{ListedWorld, World, WorldOverview};
use crate::utils::convert::{normalize_label, parse_date, parse_datetime, parse_integer};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{direct_cells, element_text, selected_option, selector};

const ENTITY: &str = "world";

static RECORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<count>[\d.,]+) players \(on (?P<date>[^)]+)\)").expect("Failed to compile RECORD_RE")
});
static BATTLEYE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"since ([^.]+)\.").expect("Failed to compile BATTLEYE_RE"));
static CREATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{2})$").expect("Failed to compile CREATION_RE"));

static SELECTED_OPTION: Lazy<Selector> = Lazy::new(|| selector("option[selected]"));
static HELPER: Lazy<Selector> = Lazy::new(|| selector("span.HelperDivIndicator"));

fn is_not_found(document: &Html) -> bool {
    let containers = table_containers(document);
    find_section(&containers, "Error").is_some_and(|error| element_text(*error).contains("doesn't exist"))
}

fn is_world_page(document: &Html) -> bool {
    find_section(&table_containers(document), "World Information").is_some()
}

pub const WORLD_GUARD: ContentGuard = ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_world_page };

fn is_world_overview(document: &Html) -> bool {
    !is_world_page(document) && find_record_row(document).is_some()
}

pub const WORLD_OVERVIEW_GUARD: ContentGuard =
    ContentGuard { entity: "world overview", not_found: never, valid: is_world_overview };

impl World {
    /// Parses a world's page. `Ok(None)` when the world does not exist.
    pub fn from_content(content: &str) -> Result<Option<World>, InvalidContent> {
        let document = Html::parse_document(content);
        if !WORLD_GUARD.admit(&document)? {
            return Ok(None);
        }
        let name = selected_option(&document, "world")
            .map(|(text, _)| text)
            .or_else(|| document.select(&SELECTED_OPTION).next().map(element_text))
            .filter(|n| !n.is_empty())
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("name")))?;

        let containers = table_containers(&document);
        let mut world = World {
            name,
            status: String::new(),
            online_count: 0,
            record_count: 0,
            record_date: None,
            creation_date: None,
            location: WorldLocation::Unknown(String::new()),
            pvp_type: PvpType::Unknown(String::new()),
            transfer_type: TransferType::Regular,
            world_quest_titles: Vec::new(),
            battleye_protected: false,
            battleye_date: None,
            experimental: false,
            premium_only: false,
            tournament_world_type: None,
            online_players: Vec::new(),
        };
        if let Some(info) = find_section(&containers, "World Information") {
            parse_information(&mut world, *info);
        }
        if let Some(online) = find_section(&containers, "Players Online") {
            world.online_players = parse_online_players(*online, &world.name);
        }
        debug!("World {}: {} players listed online", world.name, world.online_players.len());
        Ok(Some(world))
    }
}

fn parse_information(world: &mut World, container: ElementRef) {
    for row in leaf_rows(container) {
        let cells = direct_cells(row);
        let [label, value] = cells.as_slice() else { continue };
        let value = element_text(*value);
        match normalize_label(&element_text(*label)).as_str() {
            "status" => world.status = value,
            "players_online" => world.online_count = parse_integer(&value).unwrap_or(0) as u32,
            "online_record" => {
                if let Some(caps) = RECORD_RE.captures(&value) {
                    world.record_count = parse_integer(&caps["count"]).unwrap_or(0) as u32;
                    world.record_date = parse_datetime(&caps["date"]);
                }
            }
            "creation_date" => world.creation_date = parse_creation_date(&value),
            "location" => world.location = WorldLocation::from_label(&value),
            "pvp_type" => world.pvp_type = PvpType::from_label(&value),
            "premium_type" => world.premium_only = true,
            "transfer_type" => world.transfer_type = TransferType::from_label(&value),
            "world_quest_titles" => world.world_quest_titles = parse_quest_titles(&value),
            "battleye_status" => {
                let (protected, date) = parse_battleye(&value);
                world.battleye_protected = protected;
                world.battleye_date = date;
            }
            "game_world_type" => world.experimental = value == "Experimental",
            "tournament_world_type" => world.tournament_world_type = Some(TournamentWorldType::from_label(&value)),
            other => trace!("Ignoring world field '{}'", other),
        }
    }
}

/// `MM/YY` to `YYYY-MM`, with years above 90 taken as 19xx.
fn parse_creation_date(raw: &str) -> Option<String> {
    let caps = CREATION_RE.captures(raw.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let year: u32 = caps[2].parse().ok()?;
    let year = if year > 90 { 1900 + year } else { 2000 + year };
    Some(format!("{year}-{month:02}"))
}

fn parse_quest_titles(raw: &str) -> Vec<String> {
    if raw.contains("currently has no title") {
        return Vec::new();
    }
    raw.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect()
}

fn parse_battleye(raw: &str) -> (bool, Option<chrono::NaiveDate>) {
    match BATTLEYE_RE.captures(raw) {
        Some(caps) => (true, parse_date(&caps[1])),
        None => (false, None),
    }
}

fn parse_online_players(container: ElementRef, world: &str) -> Vec<OnlineCharacter> {
    leaf_rows(container)
        .into_iter()
        .filter_map(|row| {
            let cells = direct_cells(row);
            let [name, level, vocation] = cells.as_slice() else { return None };
            let level = parse_integer(&element_text(*level))?;
            Some(OnlineCharacter {
                name: element_text(*name),
                world: world.to_string(),
                level: level as u32,
                vocation: Vocation::from_label(&element_text(*vocation)),
            })
        })
        .collect()
}

fn find_record_row(document: &Html) -> Option<usize> {
    document_rows(document).iter().position(|row| RECORD_RE.is_match(&element_text(*row)))
}

impl WorldOverview {
    /// Parses the world overview page.
    pub fn from_content(content: &str) -> Result<WorldOverview, InvalidContent> {
        let document = Html::parse_document(content);
        WORLD_OVERVIEW_GUARD.admit(&document)?;

        let rows = document_rows(&document);
        let start =
            find_record_row(&document).ok_or_else(|| InvalidContent::malformed("world overview", "no record row"))?;
        let record_text = element_text(rows[start]);
        let caps = RECORD_RE
            .captures(&record_text)
            .ok_or_else(|| InvalidContent::malformed("world overview", "no record row"))?;
        let mut overview = WorldOverview {
            record_count: parse_integer(&caps["count"]).unwrap_or(0) as u32,
            record_date: parse_datetime(&caps["date"]),
            worlds: Vec::new(),
        };

        let mut tournament = false;
        for row in &rows[start + 1..] {
            let cells = direct_cells(*row);
            let first = cells.first().map(|c| element_text(*c)).unwrap_or_default();
            match cells.len() {
                1 if first == "Tournament Worlds" => tournament = true,
                1 if first == "Regular Worlds" => tournament = false,
                n if n >= 6 && first != "World" => overview.worlds.push(parse_listed_world(&cells, tournament)),
                _ => {}
            }
        }
        debug!("World overview: {} worlds", overview.worlds.len());
        Ok(overview)
    }
}

fn parse_listed_world(cells: &[ElementRef], tournament: bool) -> ListedWorld {
    let (status, online_count) = match parse_integer(&element_text(cells[1])) {
        Some(count) => ("Online".to_string(), count as u32),
        None => ("Offline".to_string(), 0),
    };
    let battleye_icon = cells[4].select(&HELPER).next();
    let battleye_date = battleye_icon
        .and_then(|icon| icon.value().attr("onmouseover"))
        .and_then(|text| BATTLEYE_RE.captures(text).and_then(|caps| parse_date(&caps[1])));
    let info = element_text(cells[5]);
    let transfer_type = if info.contains("blocked") {
        TransferType::Blocked
    } else if info.contains("locked") {
        TransferType::Locked
    } else {
        TransferType::Regular
    };
    let tournament_world_type = tournament.then(|| {
        if info.contains("restricted Store products") {
            TournamentWorldType::RestrictedStore
        } else {
            TournamentWorldType::Regular
        }
    });
    ListedWorld {
        name: element_text(cells[0]),
        status,
        online_count,
        location: WorldLocation::from_label(&element_text(cells[2])),
        pvp_type: PvpType::from_label(&element_text(cells[3])),
        transfer_type,
        battleye_protected: battleye_icon.is_some(),
        battleye_date,
        experimental: info.contains("experimental"),
        premium_only: info.contains("premium"),
        tournament_world_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const WORLD_PAGE: &str = r#"<html><body>
<select name="world"><option value="Antica">Antica</option><option value="Gladera" selected="selected">Gladera</option></select>
<div class="TableContainer"><div class="Text">World Information</div><div class="InnerTableContainer"><table>
<tr><td>Status:</td><td>Online</td></tr>
<tr><td>Players Online:</td><td>1,024</td></tr>
<tr><td>Online Record:</td><td>2,501 players (on Jan 21 2018, 19:45:38 CET)</td></tr>
<tr><td>Creation Date:</td><td>09/97</td></tr>
<tr><td>Location:</td><td>North America</td></tr>
<tr><td>PvP Type:</td><td>Optional PvP</td></tr>
<tr><td>Premium Type:</td><td>premium</td></tr>
<tr><td>Transfer Type:</td><td>locked</td></tr>
<tr><td>World Quest Titles:</td><td>Rise of Devovorga, Bewitched</td></tr>
<tr><td>BattlEye Status:</td><td>Protected by BattlEye since August 29, 2017.</td></tr>
<tr><td>Game World Type:</td><td>Experimental</td></tr>
</table></div></div>
<div class="TableContainer"><div class="Text">Players Online [ Sort by ]</div><div class="InnerTableContainer"><table>
<tr><td>Name</td><td>Level</td><td>Vocation</td></tr>
<tr><td>Tschas</td><td>346</td><td>Elder&#160;Druid</td></tr>
<tr><td>Xzilla</td><td>300</td><td>Exalted Monk</td></tr>
</table></div></div></body></html>"#;

    const NOT_FOUND_PAGE: &str = r#"<html><body>
<div class="TableContainer"><div class="Text">Error</div><table><tr><td>World with this name doesn't exist!</td></tr></table></div>
</body></html>"#;

    const OVERVIEW_PAGE: &str = r#"<html><body><div class="TableContentAndRightShadow"><table>
<tr><td>Overall Maximum: 64,028 players (on Nov 28 2007, 16:10:00 CET)</td></tr>
<tr><td>Regular Worlds</td></tr>
<tr><td>World</td><td>Online</td><td>Location</td><td>PvP Type</td><td>BattlEye</td><td>Additional Information</td></tr>
<tr><td>Antica</td><td>512</td><td>Europe</td><td>Open PvP</td><td><span class="HelperDivIndicator" onmouseover="ActivateHelperDiv($(this), '', 'Protected by BattlEye since August 29, 2017.', '');"></span></td><td>blocked</td></tr>
<tr><td>Zuna</td><td>off</td><td>Europe</td><td>Hardcore PvP</td><td></td><td>experimental</td></tr>
<tr><td>Tournament Worlds</td></tr>
<tr><td>Endebra</td><td>120</td><td>North America</td><td>Retro Open PvP</td><td></td><td>restricted Store products</td></tr>
</table></div></body></html>"#;

    #[test]
    fn test_world_page() {
        let world = World::from_content(WORLD_PAGE).unwrap().unwrap();
        assert_eq!(world.name, "Gladera");
        assert_eq!(world.status, "Online");
        assert_eq!(world.online_count, 1024);
        assert_eq!(world.record_count, 2501);
        assert!(world.record_date.is_some());
        assert_eq!(world.creation_date.as_deref(), Some("1997-09"));
        assert_eq!((world.creation_year(), world.creation_month()), (Some(1997), Some(9)));
        assert_eq!(world.location, WorldLocation::NorthAmerica);
        assert_eq!(world.pvp_type, PvpType::OptionalPvp);
        assert_eq!(world.transfer_type, TransferType::Locked);
        assert!(world.premium_only && world.experimental);
        assert_eq!(world.world_quest_titles, vec!["Rise of Devovorga", "Bewitched"]);
        assert!(world.battleye_protected);
        assert_eq!(world.battleye_date, NaiveDate::from_ymd_opt(2017, 8, 29));
        assert_eq!(world.online_players.len(), 2);
        assert_eq!(world.online_players[0].vocation, Vocation::ElderDruid);
        assert!(world.online_players[1].vocation.is_unknown());
    }

    #[test]
    fn test_creation_date_century() {
        assert_eq!(parse_creation_date("04/17").as_deref(), Some("2017-04"));
        assert_eq!(parse_creation_date("1/91").as_deref(), Some("1991-01"));
        assert_eq!(parse_creation_date("soon"), None);
        assert!(parse_quest_titles("This game world currently has no title.").is_empty());
    }

    #[test]
    fn test_guard_states() {
        assert!(World::from_content(NOT_FOUND_PAGE).unwrap().is_none());
        assert!(matches!(World::from_content(OVERVIEW_PAGE), Err(InvalidContent::WrongSection("world"))));
        assert!(WorldOverview::from_content(WORLD_PAGE.replace("players (on", "players on").as_str()).is_err());
    }

    #[test]
    fn test_world_overview() {
        let overview = WorldOverview::from_content(OVERVIEW_PAGE).unwrap();
        assert_eq!(overview.record_count, 64028);
        assert_eq!(overview.worlds.len(), 3);

        let antica = &overview.worlds[0];
        assert!(antica.battleye_protected);
        assert_eq!(antica.battleye_date, NaiveDate::from_ymd_opt(2017, 8, 29));
        assert_eq!(antica.transfer_type, TransferType::Blocked);
        assert!(antica.tournament_world_type.is_none());

        let zuna = &overview.worlds[1];
        assert_eq!((zuna.status.as_str(), zuna.online_count), ("Offline", 0));
        assert!(zuna.experimental);

        assert_eq!(overview.worlds[2].tournament_world_type, Some(TournamentWorldType::RestrictedStore));
        assert_eq!(overview.total_online(), 632);
        assert_eq!(overview.tournament_worlds().len(), 1);
    }
}
