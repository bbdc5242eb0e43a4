// src/extractors/tournament.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

use crate::extractors::guard::ContentGuard;
use crate::extractors::has_element;
use crate::models::enums::PvpType;
use crate::models::tournament::{ListedTournament, RewardEntry, RuleSet, ScoreSet, Tournament};
use crate::utils::convert::{
    normalize_label, parse_date, parse_datetime, parse_duration, parse_float, parse_integer, parse_rank_range,
};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{direct_cells, direct_rows, element_text, label_value_rows, parse_popup, selector};

const ENTITY: &str = "tournament";

static ARCHIVE_OPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\w\s]+)\s\(([^-]+)-\s([^)]+)\)").expect("Failed to compile ARCHIVE_OPTION_RE")
});
static CUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\w+ cup)").expect("Failed to compile CUP_RE"));
static DEED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\w+ deed)").expect("Failed to compile DEED_RE"));

static DETAILS: Lazy<Selector> = Lazy::new(|| selector("table.Table5"));
static CONTENT_TABLE: Lazy<Selector> = Lazy::new(|| selector("table.TableContent"));
static ARCHIVE: Lazy<Selector> = Lazy::new(|| selector("table.Table4"));
static OPTION: Lazy<Selector> = Lazy::new(|| selector("option"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static HELPER: Lazy<Selector> = Lazy::new(|| selector("span.HelperDivIndicator"));
static ITEM_LABEL: Lazy<Selector> = Lazy::new(|| selector("div.ItemOverLabel"));

/// The details box holds four content tables: information, rules, scores and rewards.
fn detail_tables(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    let details = document.select(&DETAILS).last()?;
    let tables: Vec<ElementRef> = details.select(&CONTENT_TABLE).collect();
    (tables.len() >= 4).then_some(tables)
}

fn is_tournament_page(document: &Html) -> bool {
    detail_tables(document).is_some()
}

fn is_not_found(document: &Html) -> bool {
    has_element(document, &ARCHIVE) && !is_tournament_page(document)
}

pub const TOURNAMENT_GUARD: ContentGuard =
    ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_tournament_page };

impl Tournament {
    /// Parses a tournament page. `Ok(None)` when the requested cycle has no
    /// details but the archive selector is still shown.
    pub fn from_content(content: &str) -> Result<Option<Tournament>, InvalidContent> {
        let document = Html::parse_document(content);
        if !TOURNAMENT_GUARD.admit(&document)? {
            return Ok(None);
        }
        let tables = detail_tables(&document)
            .ok_or_else(|| InvalidContent::malformed(ENTITY, "missing detail tables"))?;

        let mut tournament = parse_information(tables[0])?;
        tournament.rule_set = parse_rules(tables[1]);
        tournament.score_set = parse_scores(tables[2]);
        tournament.reward_set = parse_rewards(tables[3]);
        tournament.archived_tournaments = document
            .select(&ARCHIVE)
            .next()
            .map(parse_archive)
            .unwrap_or_default();
        if let Some(listed) = tournament.archived_tournaments.iter().find(|t| t.title == tournament.title) {
            tournament.cycle = listed.cycle;
        }

        debug!(
            "Tournament {} (cycle {}): {} reward tiers",
            tournament.title,
            tournament.cycle,
            tournament.reward_set.len()
        );
        Ok(Some(tournament))
    }
}

fn parse_information(table: ElementRef) -> Result<Tournament, InvalidContent> {
    let mut tournament = Tournament {
        title: String::new(),
        cycle: 0,
        phase: None,
        start_date: None,
        end_date: None,
        worlds: Vec::new(),
        rule_set: RuleSet::default(),
        score_set: ScoreSet::default(),
        reward_set: Vec::new(),
        archived_tournaments: Vec::new(),
    };
    for (label, cell) in label_value_rows(table) {
        let value = element_text(cell);
        match label.as_str() {
            "title" => tournament.title = value,
            "phase" => tournament.phase = Some(value),
            "start_date" => tournament.start_date = parse_datetime(&value),
            "end_date" => tournament.end_date = parse_datetime(&value),
            "worlds" => {
                tournament.worlds = value
                    .split(',')
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            }
            other => trace!("Ignoring tournament field {}", other),
        }
    }
    if tournament.title.is_empty() {
        return Err(InvalidContent::field(ENTITY, FieldError::Missing("title")));
    }
    Ok(tournament)
}

fn parse_rules(table: ElementRef) -> RuleSet {
    let mut rules = RuleSet::default();
    for (label, cell) in label_value_rows(table) {
        let value = element_text(cell);
        let multiplier = || parse_float(&value);
        let percentage = || parse_integer(value.trim_end_matches('%')).map(|v| v as u32);
        match label.as_str() {
            "pvp_type" => rules.pvp_type = Some(PvpType::from_label(&value)),
            "daily_tournament_playtime" => rules.daily_tournament_playtime = parse_duration(&value),
            "total_tournament_playtime" => rules.total_tournament_playtime = parse_duration(&value),
            "playtime_reduced_only_in_combat" => {
                rules.playtime_reduced_only_in_combat = value.eq_ignore_ascii_case("yes")
            }
            "death_penalty_modifier" => rules.death_penalty_modifier = multiplier(),
            "xp_multiplier" => rules.xp_multiplier = multiplier(),
            "skill_multiplier" => rules.skill_multiplier = multiplier(),
            "spawn_rate_multiplier" => rules.spawn_rate_multiplier = multiplier(),
            "loot_probability" => rules.loot_probability = multiplier(),
            "rent_percentage" => rules.rent_percentage = percentage(),
            "house_auction_durations" => rules.house_auction_durations = percentage(),
            other => trace!("Ignoring tournament rule {}", other),
        }
    }
    rules
}

/// `"+/- 10"` -> `10`, `"-5"` -> `-5`.
fn parse_score(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .replace("+/-", "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().ok()
}

fn parse_scores(table: ElementRef) -> ScoreSet {
    let mut scores = ScoreSet::default();
    for row in direct_rows(table).into_iter().skip(1) {
        let cells = direct_cells(row);
        let [field, value, ..] = cells.as_slice() else { continue };
        let Some(points) = parse_score(&element_text(*value)) else { continue };
        match normalize_label(&element_text(*field)).as_str() {
            "level_gain_loss" => scores.level_gain_loss = points,
            "charm_point_multiplier" => scores.charm_point_multiplier = points,
            "character_death" => scores.character_death = points,
            other => trace!("Ignoring tournament score {}", other),
        }
    }
    scores
}

fn parse_rewards(table: ElementRef) -> Vec<RewardEntry> {
    let mut rewards = Vec::new();
    for row in direct_rows(table).into_iter().skip(1) {
        let cells = direct_cells(row);
        let Some((rank_cell, reward_cells)) = cells.split_first() else { continue };
        let rank_text = element_text(*rank_cell);
        if rank_text.is_empty() {
            break;
        }
        let Some((initial_rank, last_rank)) = parse_rank_range(&rank_text) else { continue };
        let mut entry = RewardEntry { initial_rank, last_rank, ..RewardEntry::default() };
        for cell in reward_cells {
            parse_reward_cell(*cell, &mut entry);
        }
        rewards.push(entry);
    }
    rewards.sort_by_key(|r| r.initial_rank);
    let mut ordered: Vec<RewardEntry> = Vec::with_capacity(rewards.len());
    for entry in rewards {
        if let Some(previous) = ordered.last() {
            if entry.initial_rank <= previous.last_rank {
                warn!(
                    "Skipping reward range {}-{} overlapping {}-{}",
                    entry.initial_rank, entry.last_rank, previous.initial_rank, previous.last_rank
                );
                continue;
            }
        }
        ordered.push(entry);
    }
    ordered
}

fn parse_reward_cell(cell: ElementRef, entry: &mut RewardEntry) {
    let Some(src) = cell.select(&IMG).next().and_then(|img| img.value().attr("src")) else { return };
    let amount = || parse_integer(&element_text(cell)).unwrap_or(0) as u32;
    if src.contains("tibiacoin") {
        entry.tibia_coins = amount();
    } else if src.contains("tournamentcoin") {
        entry.tournament_coins = amount();
    } else if src.contains("tournamentvoucher") {
        entry.tournament_ticket_vouchers = amount();
    } else if src.contains("trophy") {
        let html = cell.html();
        entry.cup = CUP_RE.captures(&html).map(|caps| caps[1].to_string());
        entry.deed = DEED_RE.captures(&html).map(|caps| caps[1].to_string());
    } else if src.contains("reward") {
        let popup = cell
            .select(&HELPER)
            .next()
            .and_then(|span| span.value().attr("onmouseover"))
            .and_then(parse_popup);
        if let Some((_, body)) = popup {
            let items: Vec<String> = body.select(&ITEM_LABEL).map(element_text).collect();
            if !items.is_empty() {
                entry.other_rewards = Some(items.join(", "));
            }
        }
    }
}

fn parse_archive(table: ElementRef) -> Vec<ListedTournament> {
    table
        .select(&OPTION)
        .skip(1)
        .filter_map(|option| {
            let cycle = option.value().attr("value")?.trim().parse().ok()?;
            let text = element_text(option);
            let caps = ARCHIVE_OPTION_RE.captures(&text)?;
            Some(ListedTournament {
                title: caps[1].trim().to_string(),
                cycle,
                start_date: parse_date(caps[2].trim()),
                end_date: parse_date(caps[3].trim()),
            })
        })
        .collect()
}
