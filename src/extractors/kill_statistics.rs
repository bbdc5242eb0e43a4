// src/extractors/kill_statistics.rs
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::extractors::guard::ContentGuard;
use crate::extractors::{has_element, leaf_rows};
use crate::models::kill_statistics::{KillStatistics, RaceEntry};
use crate::utils::convert::parse_integer;
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{direct_cells, element_text, has_select, selected_option, selector};

const ENTITY: &str = "kill statistics";

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table#KillStatisticsTable"));

fn is_not_found(document: &Html) -> bool {
    has_select(document, "world") && !has_element(document, &TABLE)
}

fn is_kill_statistics_page(document: &Html) -> bool {
    has_element(document, &TABLE)
}

pub const KILL_STATISTICS_GUARD: ContentGuard =
    ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_kill_statistics_page };

impl KillStatistics {
    /// Parses a world's kill statistics. `Ok(None)` when the world has none.
    pub fn from_content(content: &str) -> Result<Option<KillStatistics>, InvalidContent> {
        let document = Html::parse_document(content);
        if !KILL_STATISTICS_GUARD.admit(&document)? {
            return Ok(None);
        }
        let world = selected_option(&document, "world")
            .map(|(text, _)| text)
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("world")))?;
        let table = document
            .select(&TABLE)
            .next()
            .ok_or_else(|| InvalidContent::malformed(ENTITY, "no statistics table"))?;

        let mut entries = BTreeMap::new();
        let mut total = RaceEntry::default();
        for row in leaf_rows(table) {
            let cells: Vec<String> = direct_cells(row).into_iter().map(element_text).collect();
            let [race, values @ ..] = cells.as_slice() else { continue };
            if values.len() != 4 {
                continue;
            }
            let numbers: Vec<Option<i64>> = values.iter().map(|v| parse_integer(v)).collect();
            // Header rows carry labels instead of numbers.
            let [Some(a), Some(b), Some(c), Some(d)] = numbers.as_slice() else { continue };
            let entry = RaceEntry {
                last_day_players_killed: *a as u32,
                last_day_killed: *b as u32,
                last_week_players_killed: *c as u32,
                last_week_killed: *d as u32,
            };
            if race.eq_ignore_ascii_case("total") {
                total = entry;
            } else {
                entries.insert(race.clone(), entry);
            }
        }
        debug!("Kill statistics of {}: {} races", world, entries.len());
        Ok(Some(KillStatistics { world, entries, total }))
    }
}
