// src/extractors/guild.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::extractors::guard::{never, ContentGuard};
use crate::extractors::{contains_text, document_rows, has_element, leaf_rows, table_containers};
use crate::models::enums::Vocation;
use crate::models::guild::{Guild, GuildHouse, GuildInvite, GuildMember, ListedGuild};
use crate::utils::convert::{clean_text, parse_date, parse_integer};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{
    direct_cells, element_text, first_image_src, first_link, has_select, selector, text_with_line_breaks,
};

const ENTITY: &str = "guild";

static INFO_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div#GuildInformationContainer"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1"));
static LOGO: Lazy<Selector> = Lazy::new(|| selector(r#"img[src*="guildlogos"]"#));
static BOLD: Lazy<Selector> = Lazy::new(|| selector("b"));

static FOUNDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"The guild was founded on (\w+) on ([^.]+)\.").expect("Failed to compile FOUNDED_RE")
});
static ACTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"It is (currently active|currently in formation)").expect("Failed to compile ACTIVE_RE"));
static APPLICATIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Guild is (\w+) for applications").expect("Failed to compile APPLICATIONS_RE"));
static HOMEPAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"The official homepage is at ([^\s]+)\.").expect("Failed to compile HOMEPAGE_RE"));
static GUILDHALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Their home on (\w+) is ([^.]+)\. The rent is paid until ([^.]+)").expect("Failed to compile GUILDHALL_RE")
});
static DISBAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"It will be disbanded on (\w+\s\d+\s\d+)\s([^.]+)\.").expect("Failed to compile DISBAND_RE")
});
static MEMBER_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^(]+)\(([^)]+)\)").expect("Failed to compile MEMBER_TITLE_RE"));
static LIST_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Active Guilds|Guilds in Course of Formation) on (\w+)").expect("Failed to compile LIST_TITLE_RE")
});

fn is_not_found(document: &Html) -> bool {
    !has_element(document, &INFO_CONTAINER)
        && (contains_text(document, "An internal error has occurred")
            || contains_text(document, "was not found")
            || contains_text(document, "does not exist"))
}

fn is_guild_page(document: &Html) -> bool {
    has_element(document, &INFO_CONTAINER)
}

pub const GUILD_GUARD: ContentGuard = ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_guild_page };

fn is_guild_list(document: &Html) -> bool {
    table_containers(document).iter().any(|(title, _)| LIST_TITLE_RE.is_match(title))
        || (has_select(document, "world") && contains_text(document, "Guilds"))
}

pub const GUILD_LIST_GUARD: ContentGuard =
    ContentGuard { entity: "guild list", not_found: never, valid: is_guild_list };

impl Guild {
    /// Parses a guild's page. `Ok(None)` when the guild does not exist.
    pub fn from_content(content: &str) -> Result<Option<Guild>, InvalidContent> {
        let document = Html::parse_document(content);
        if !GUILD_GUARD.admit(&document)? {
            return Ok(None);
        }
        let name = document
            .select(&HEADING)
            .next()
            .map(element_text)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("name")))?;
        let logo_url = document.select(&LOGO).next().and_then(|img| img.value().attr("src")).map(str::to_string);

        let mut guild = Guild {
            name,
            logo_url,
            description: None,
            world: String::new(),
            founded: None,
            active: true,
            guildhall: None,
            open_applications: false,
            disband_condition: None,
            disband_date: None,
            homepage: None,
            members: Vec::new(),
            invites: Vec::new(),
        };
        if let Some(container) = document.select(&INFO_CONTAINER).next() {
            parse_information(&mut guild, &text_with_line_breaks(container));
        }
        parse_members_and_invites(&mut guild, &document);
        debug!("Guild {}: {} members, {} invites", guild.name, guild.members.len(), guild.invites.len());
        Ok(Some(guild))
    }
}

fn parse_information(guild: &mut Guild, lines: &str) {
    let text = clean_text(lines);

    let description = match lines.find("The guild was founded") {
        Some(end) => &lines[..end],
        None => "",
    };
    let description = description.trim();
    guild.description = (!description.is_empty()).then(|| description.to_string());

    if let Some(caps) = FOUNDED_RE.captures(&text) {
        guild.world = caps[1].to_string();
        guild.founded = parse_date(&caps[2]);
    }
    guild.active = ACTIVE_RE.captures(&text).map_or(true, |caps| &caps[1] == "currently active");
    guild.open_applications = APPLICATIONS_RE.captures(&text).is_some_and(|caps| &caps[1] == "opened");
    guild.homepage = HOMEPAGE_RE.captures(&text).map(|caps| caps[1].to_string());
    guild.guildhall = GUILDHALL_RE.captures(&text).map(|caps| GuildHouse {
        name: caps[2].trim().to_string(),
        world: caps[1].to_string(),
        paid_until: parse_date(&caps[3]),
    });
    if let Some(caps) = DISBAND_RE.captures(&text) {
        guild.disband_date = parse_date(&caps[1]);
        guild.disband_condition = Some(caps[2].trim().to_string());
    }
}

fn parse_members_and_invites(guild: &mut Guild, document: &Html) {
    let mut rank = String::new();
    for row in document_rows(document) {
        let cells = direct_cells(row);
        match cells.as_slice() {
            [rank_cell, name_cell, vocation, level, joined, status] => {
                let Some((name, _)) = first_link(*name_cell) else { continue };
                let rank_text = element_text(*rank_cell);
                if !rank_text.is_empty() {
                    rank = rank_text;
                }
                let title = MEMBER_TITLE_RE
                    .captures(&element_text(*name_cell))
                    .map(|caps| caps[2].trim().to_string());
                guild.members.push(GuildMember {
                    rank: rank.clone(),
                    name,
                    title,
                    vocation: Vocation::from_label(&element_text(*vocation)),
                    level: parse_integer(&element_text(*level)).unwrap_or(0) as u32,
                    joined: parse_date(&element_text(*joined)),
                    online: element_text(*status).eq_ignore_ascii_case("online"),
                });
            }
            [name_cell, date_cell] => {
                let Some((name, _)) = first_link(*name_cell) else { continue };
                // The header row "Name / Invitation Date" has no date.
                let Some(date) = parse_date(&element_text(*date_cell)) else { continue };
                guild.invites.push(GuildInvite { name, date: Some(date) });
            }
            _ => {}
        }
    }
}

impl ListedGuild {
    /// Parses the guild list of a world. `Ok(None)` when the page lists no
    /// guild sections, i.e. the world does not exist.
    pub fn list_from_content(content: &str) -> Result<Option<Vec<ListedGuild>>, InvalidContent> {
        let document = Html::parse_document(content);
        GUILD_LIST_GUARD.admit(&document)?;

        let mut found_section = false;
        let mut guilds = Vec::new();
        for (title, container) in table_containers(&document) {
            let Some(caps) = LIST_TITLE_RE.captures(&title) else { continue };
            found_section = true;
            let active = &caps[1] == "Active Guilds";
            let world = caps[2].to_string();
            for row in leaf_rows(container) {
                let cells = direct_cells(row);
                let [logo, info, ..] = cells.as_slice() else { continue };
                let Some(name) = info.select(&BOLD).next().map(element_text).filter(|n| !n.is_empty()) else {
                    continue;
                };
                let text = element_text(*info);
                let description = text.strip_prefix(name.as_str()).unwrap_or_default().trim().to_string();
                guilds.push(ListedGuild {
                    logo_url: first_image_src(*logo),
                    description: (!description.is_empty()).then_some(description),
                    name,
                    world: world.clone(),
                    active,
                });
            }
        }
        Ok(found_section.then_some(guilds))
    }
}
