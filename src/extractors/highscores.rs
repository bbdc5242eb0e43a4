// src/extractors/highscores.rs
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::extractors::guard::ContentGuard;
use crate::extractors::pagination::parse_pagination;
use crate::extractors::{contains_text, document_rows, document_text};
use crate::models::enums::{HighscoresCategory, Vocation, VocationFilter};
use crate::models::highscores::{Highscores, HighscoresEntry};
use crate::utils::convert::parse_integer;
use crate::utils::error::InvalidContent;
use crate::utils::html::{direct_cells, element_text, has_select, selected_option, selector};

static LAST_UPDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Last Update: (\d+) minutes? ago").expect("Failed to compile LAST_UPDATE_RE"));
static PAGE_NAVIGATION: Lazy<Selector> = Lazy::new(|| selector(".PageNavigation"));

fn is_not_found(document: &Html) -> bool {
    has_select(document, "category")
        && (contains_text(document, "does not exist") || contains_text(document, "could not be found"))
}

fn is_highscores_page(document: &Html) -> bool {
    has_select(document, "category")
}

pub const HIGHSCORES_GUARD: ContentGuard =
    ContentGuard { entity: "highscores", not_found: is_not_found, valid: is_highscores_page };

impl Highscores {
    /// Parses one page of a highscores category. `Ok(None)` when the
    /// requested world does not exist.
    pub fn from_content(content: &str) -> Result<Option<Highscores>, InvalidContent> {
        let document = Html::parse_document(content);
        if !HIGHSCORES_GUARD.admit(&document)? {
            return Ok(None);
        }

        let world = selected_option(&document, "world")
            .filter(|(_, value)| !value.is_empty())
            .map(|(text, _)| text);
        let category = selected_option(&document, "category")
            .map(|(text, value)| match value.parse() {
                Ok(id) => HighscoresCategory::from_id(id),
                Err(_) => HighscoresCategory::from_label(&text),
            })
            .unwrap_or(HighscoresCategory::Experience);
        let vocation = selected_option(&document, "profession")
            .map(|(text, value)| match value.parse() {
                Ok(id) => VocationFilter::from_id(id),
                Err(_) => VocationFilter::from_label(&text),
            })
            .unwrap_or(VocationFilter::All);

        let entries: Vec<HighscoresEntry> =
            document_rows(&document).into_iter().filter_map(|row| parse_entry(row, world.as_deref())).collect();
        let (page, total_pages, results_count) =
            parse_pagination(document.select(&PAGE_NAVIGATION).next(), entries.len() as u32);
        let last_updated = LAST_UPDATE_RE
            .captures(&document_text(&document))
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .map(|minutes| Duration::from_secs(minutes * 60));

        debug!("Highscores {} page {}/{}: {} entries", category, page, total_pages, entries.len());
        Ok(Some(Highscores {
            world,
            category,
            vocation,
            page,
            total_pages,
            results_count,
            last_updated,
            entries,
        }))
    }
}

fn parse_entry(row: ElementRef, selected_world: Option<&str>) -> Option<HighscoresEntry> {
    let cells: Vec<String> = direct_cells(row).into_iter().map(element_text).collect();
    let rank = cells.first().and_then(|rank| rank.parse::<u32>().ok())?;
    let (name, loyalty_title, rest) = match cells.len() {
        6 => (&cells[1], None, &cells[2..]),
        7 => (&cells[1], Some(cells[2].clone()), &cells[3..]),
        _ => return None,
    };
    let [vocation, world, level, value] = rest else { return None };
    Some(HighscoresEntry {
        rank,
        name: name.clone(),
        vocation: Vocation::from_label(vocation),
        world: if world.is_empty() { selected_world.unwrap_or_default().to_string() } else { world.clone() },
        level: parse_integer(level).unwrap_or(0) as u32,
        value: parse_integer(value).unwrap_or(0),
        loyalty_title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str, world: &str, category: &str) -> String {
        format!(
            r#"<html><body><form>
<select name="world"><option value="">All Worlds</option><option value="{world}" selected>{world}</option></select>
<select name="category"><option value="6">Experience Points</option><option value="{category}" selected>Category</option></select>
<select name="profession"><option value="0">All</option><option value="1" selected>Knights</option></select>
</form>
<div>Last Update: 2 minutes ago</div>
<table><tr><td>Rank</td><td>Name</td><td>Vocation</td><td>World</td><td>Level</td><td>Points</td></tr>{rows}</table>
<div class="PageNavigation"><span class="PageLink"><a href="?subtopic=highscores&amp;currentpage=3">3</a></span>
<span class="PageLink"><span class="CurrentPageLink">4</span></span>
<span class="PageLink FirstOrLastElement"><a href="?subtopic=highscores&amp;currentpage=39">Last Page</a></span>
<div>Results: 1,932</div></div>
</body></html>"#
        )
    }

    #[test]
    fn test_highscores_page() {
        let rows = r#"<tr><td>31</td><td><a href="x">Tschas</a></td><td>Elite Knight</td><td>Estela</td><td>500</td><td>11</td></tr>
<tr><td>32</td><td>Xzilla</td><td>Knight</td><td>Estela</td><td>480</td><td>10</td></tr>"#;
        let highscores = Highscores::from_content(&page(rows, "Estela", "11")).unwrap().unwrap();
        assert_eq!(highscores.world.as_deref(), Some("Estela"));
        assert_eq!(highscores.category, HighscoresCategory::MagicLevel);
        assert_eq!(highscores.vocation, VocationFilter::Knights);
        assert_eq!((highscores.page, highscores.total_pages, highscores.results_count), (4, 39, 1932));
        assert_eq!(highscores.last_updated, Some(Duration::from_secs(120)));
        assert_eq!((highscores.from_rank(), highscores.to_rank()), (31, 32));
        assert_eq!(highscores.entries[0].vocation, Vocation::EliteKnight);
        assert_eq!(highscores.entries[0].value, 11);
        assert!(highscores.entries.iter().all(|e| e.world == "Estela"));
    }

    #[test]
    fn test_loyalty_entries_have_titles() {
        let rows = r#"<tr><td>1</td><td>Tschas</td><td>Sage of Tibia</td><td>Royal Paladin</td><td>Calmera</td><td>400</td><td>3,650</td></tr>"#;
        let highscores = Highscores::from_content(&page(rows, "Calmera", "10")).unwrap().unwrap();
        assert_eq!(highscores.category, HighscoresCategory::Loyalty);
        let entry = &highscores.entries[0];
        assert_eq!(entry.loyalty_title.as_deref(), Some("Sage of Tibia"));
        assert_eq!(entry.vocation, Vocation::RoyalPaladin);
        assert_eq!(entry.value, 3650);
    }

    #[test]
    fn test_guard_states() {
        let missing = page("", "Nowhere", "6").replace("Last Update", "This world does not exist. Last Update");
        assert!(Highscores::from_content(&missing).unwrap().is_none());
        assert!(matches!(
            Highscores::from_content("<html><body><p>Maintenance</p></body></html>"),
            Err(InvalidContent::WrongSection("highscores"))
        ));
    }
}
