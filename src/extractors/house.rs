// src/extractors/house.rs
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::extractors::guard::{never, ContentGuard};
use crate::extractors::{contains_text, leaf_rows, table_containers};
use crate::models::enums::{HouseStatus, HouseType, Sex};
use crate::models::house::{House, ListedHouse};
use crate::utils::convert::{parse_datetime, parse_integer, parse_money};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{direct_cells, element_text, query_param, selector, text_with_line_breaks};

const ENTITY: &str = "house";

static BEDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"This (\w+) can have up to ([\d-]+) bed").expect("Failed to compile BEDS_RE"));
static SIZE_RENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"The \w+ has a size of (\d+) square meters?\. The monthly rent is (\d+k?) gold and will be debited to the bank account on (\w+)\.",
    )
    .expect("Failed to compile SIZE_RENT_RE")
});
static RENTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"The \w+ has been rented by ([^.]+)\. (\w+) has paid the rent until ([^.]+)\.")
        .expect("Failed to compile RENTED_RE")
});
static TRANSFER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\w+ will move out on (?P<transfer_date>[^(]+)\([^)]+\)(?: and (?P<verb>wants to|will) pass the \w+ to (?P<transferee>[\w\s]+) for (?P<transfer_price>\d+) gold coin)?",
    )
    .expect("Failed to compile TRANSFER_RE")
});
static BID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"The highest bid so far is (\d+) gold and has been submitted by ([^.]+)\.")
        .expect("Failed to compile BID_RE")
});
static AUCTION_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"The \w+ is being auctioned\. Auction will end at ([^.]+)\.").expect("Failed to compile AUCTION_END_RE")
});
static LIST_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Houses|Guildhalls) in ([\w\s']+) on (\w+)").expect("Failed to compile LIST_TITLE_RE"));
static LIST_STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"auctioned \((\d+) gold; (\d+) (\w+) left\)").expect("Failed to compile LIST_STATUS_RE")
});

static TD: Lazy<Selector> = Lazy::new(|| selector("td"));
static BOLD: Lazy<Selector> = Lazy::new(|| selector("b"));
static HOUSE_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"img[src*="houses"]"#));
static HOUSE_ID_INPUT: Lazy<Selector> = Lazy::new(|| selector(r#"input[name="houseid"]"#));
static TOWN_INPUT: Lazy<Selector> = Lazy::new(|| selector(r#"input[name="town"]"#));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

fn is_not_found(document: &Html) -> bool {
    contains_text(document, "No house with this ID")
        || table_containers(document).iter().any(|(title, _)| title == "Error")
}

fn description_cell(document: &Html) -> Option<ElementRef<'_>> {
    // Innermost cell holding the description text.
    document
        .select(&TD)
        .filter(|td| {
            let text = element_text(*td);
            text.contains("can have up to") && text.contains("square meter")
        })
        .last()
}

fn is_house_page(document: &Html) -> bool {
    description_cell(document).is_some()
}

pub const HOUSE_GUARD: ContentGuard = ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_house_page };

fn is_house_list(document: &Html) -> bool {
    table_containers(document).iter().any(|(title, _)| LIST_TITLE_RE.is_match(title))
}

pub const HOUSE_LIST_GUARD: ContentGuard =
    ContentGuard { entity: "house list", not_found: never, valid: is_house_list };

/// First `houseid`/`town` found in the document's form inputs or links.
fn document_param(document: &Html, input: &Selector, key: &str) -> Option<String> {
    document
        .select(input)
        .find_map(|el| el.value().attr("value").map(str::to_string))
        .or_else(|| {
            document
                .select(&LINKS)
                .find_map(|a| a.value().attr("href").and_then(|href| query_param(href, key)))
        })
}

impl House {
    /// Parses a house's page. `Ok(None)` when no house has the requested id.
    pub fn from_content(content: &str) -> Result<Option<House>, InvalidContent> {
        let document = Html::parse_document(content);
        if !HOUSE_GUARD.admit(&document)? {
            return Ok(None);
        }
        let cell = description_cell(&document).ok_or_else(|| InvalidContent::malformed(ENTITY, "no description"))?;
        let name = cell
            .select(&BOLD)
            .next()
            .map(element_text)
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("name")))?;

        let text = text_with_line_breaks(cell).replace('\n', " ");
        let beds = BEDS_RE.captures(&text).ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("beds")))?;
        let size_rent = SIZE_RENT_RE
            .captures(&text)
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("size")))?;

        let mut house = House {
            id: document_param(&document, &HOUSE_ID_INPUT, "houseid")
                .and_then(|id| id.parse().ok())
                .unwrap_or_default(),
            name,
            world: size_rent[3].to_string(),
            town: document_param(&document, &TOWN_INPUT, "town"),
            image_url: document
                .select(&HOUSE_IMAGE)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(str::to_string),
            house_type: HouseType::from_label(&beds[1]),
            beds: parse_integer(&beds[2]).unwrap_or(0) as u32,
            size: size_rent[1].parse().unwrap_or(0),
            rent: parse_money(&size_rent[2]).unwrap_or(0),
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
        parse_status(&mut house, &text);
        debug!("House {} ({}) is {}", house.name, house.id, house.status);
        Ok(Some(house))
    }
}

pub(crate) fn parse_status(house: &mut House, text: &str) {
    if let Some(caps) = RENTED_RE.captures(text) {
        house.status = HouseStatus::Rented;
        house.owner = Some(caps[1].trim().to_string());
        house.owner_sex = match &caps[2] {
            "He" => Some(Sex::Male),
            "She" => Some(Sex::Female),
            _ => None,
        };
        house.paid_until = parse_datetime(&caps[3]);
    }
    if let Some(caps) = TRANSFER_RE.captures(text) {
        house.transfer_date = parse_datetime(&caps["transfer_date"]);
        house.transferee = caps.name("transferee").map(|m| m.as_str().trim().to_string());
        house.transfer_price = caps.name("transfer_price").and_then(|m| m.as_str().parse().ok());
        house.transfer_accepted = caps.name("verb").is_some_and(|m| m.as_str() == "will");
    }
    if let Some(caps) = AUCTION_END_RE.captures(text) {
        house.status = HouseStatus::Auctioned;
        house.auction_end = parse_datetime(&caps[1]);
    }
    if let Some(caps) = BID_RE.captures(text) {
        house.highest_bid = caps[1].parse().ok();
        house.highest_bidder = Some(caps[2].trim().to_string());
    }
}

impl ListedHouse {
    /// Parses a town's house or guildhall list.
    pub fn list_from_content(content: &str) -> Result<Vec<ListedHouse>, InvalidContent> {
        let document = Html::parse_document(content);
        HOUSE_LIST_GUARD.admit(&document)?;

        let mut houses = Vec::new();
        for (title, container) in table_containers(&document) {
            let Some(caps) = LIST_TITLE_RE.captures(&title) else { continue };
            let house_type = if &caps[1] == "Guildhalls" { HouseType::Guildhall } else { HouseType::House };
            let town = caps[2].trim().to_string();
            let world = caps[3].to_string();
            for row in leaf_rows(container) {
                let cells = direct_cells(row);
                if cells.len() < 5 {
                    continue;
                }
                let Some(id) = row
                    .select(&HOUSE_ID_INPUT)
                    .next()
                    .and_then(|input| input.value().attr("value"))
                    .and_then(|id| id.parse().ok())
                else {
                    continue;
                };
                let status_text = element_text(cells[3]);
                let (highest_bid, time_left) = match LIST_STATUS_RE.captures(&status_text) {
                    Some(caps) => (caps[1].parse().ok(), parse_time_left(&caps[2], &caps[3])),
                    None => (None, None),
                };
                let rent_text = element_text(cells[2]);
                houses.push(ListedHouse {
                    id,
                    name: element_text(cells[0]),
                    world: world.clone(),
                    town: town.clone(),
                    house_type: house_type.clone(),
                    size: parse_integer(&element_text(cells[1])).unwrap_or(0) as u32,
                    rent: parse_money(rent_text.trim_end_matches("gold").trim()).unwrap_or(0),
                    status: if status_text.contains("rented") { HouseStatus::Rented } else { HouseStatus::Auctioned },
                    highest_bid,
                    time_left,
                });
            }
        }
        debug!("House list: {} entries", houses.len());
        Ok(houses)
    }
}

fn parse_time_left(amount: &str, unit: &str) -> Option<Duration> {
    let amount: u64 = amount.parse().ok()?;
    match unit {
        "day" | "days" => Some(Duration::from_secs(amount * 86_400)),
        "hour" | "hours" => Some(Duration::from_secs(amount * 3_600)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENTED_PAGE: &str = r#"<html><body><div class="BoxContent"><table><tr>
<td><img src="https://static.tibia.com/images/houses/house_55302.png"></td>
<td><b>Sorcerer's Avenue 1</b><br>This house can have up to 2 beds.<br>The house has a size of 30 square meters. The monthly rent is 5k gold and will be debited to the bank account on Gladera.<br><br>The house has been rented by Tschas. She has paid the rent until Aug 02 2018, 03:50:40 CEST.<br>She will move out on Aug 10 2018, 10:00:00 CEST (time of daily server save) and wants to pass the house to Xzilla for 5000 gold coins.</td>
</tr></table>
<form><input type="hidden" name="houseid" value="55302"><input type="hidden" name="town" value="Thais"></form>
</div></body></html>"#;

    const AUCTIONED_PAGE: &str = r#"<html><body><table><tr>
<td><b>Blessed Shield Guildhall</b><br>This guildhall can have up to 14 beds.<br>The guildhall has a size of 300 square meters. The monthly rent is 25000 gold and will be debited to the bank account on Antica.<br><br>The guildhall is being auctioned. Auction will end at Aug 05 2018, 10:00:00 CEST. The highest bid so far is 100000 gold and has been submitted by Bubble.</td>
</tr></table>
<a href="https://www.tibia.com/community/?subtopic=houses&amp;houseid=123&amp;world=Antica&amp;town=Edron">Back</a>
</body></html>"#;

    const LIST_PAGE: &str = r#"<html><body>
<div class="TableContainer"><div class="Text">Available Houses in Ab'Dendriel on Gladera</div><table>
<tr><td>Name</td><td>Size</td><td>Rent</td><td>Status</td><td></td></tr>
<tr><td>Elm Street 1</td><td>30 sqm</td><td>5k gold</td><td>rented</td><td><form><input type="hidden" name="houseid" value="20001"></form></td></tr>
<tr><td>Elm Street 2</td><td>40 sqm</td><td>8k gold</td><td>auctioned (1200 gold; 2 days left)</td><td><form><input type="hidden" name="houseid" value="20002"></form></td></tr>
</table></div></body></html>"#;

    #[test]
    fn test_rented_house() {
        let house = House::from_content(RENTED_PAGE).unwrap().unwrap();
        assert_eq!(house.id, 55302);
        assert_eq!(house.name, "Sorcerer's Avenue 1");
        assert_eq!(house.world, "Gladera");
        assert_eq!(house.town.as_deref(), Some("Thais"));
        assert_eq!(house.house_type, HouseType::House);
        assert_eq!((house.beds, house.size, house.rent), (2, 30, 5000));
        assert_eq!(house.status, HouseStatus::Rented);
        assert_eq!(house.owner.as_deref(), Some("Tschas"));
        assert_eq!(house.owner_sex, Some(Sex::Female));
        assert!(house.paid_until.is_some() && house.transfer_date.is_some());
        assert_eq!(house.transferee.as_deref(), Some("Xzilla"));
        assert_eq!(house.transfer_price, Some(5000));
        assert!(!house.transfer_accepted);
        assert!(house.image_url.is_some());
    }

    #[test]
    fn test_auctioned_guildhall() {
        let house = House::from_content(AUCTIONED_PAGE).unwrap().unwrap();
        assert_eq!(house.id, 123);
        assert_eq!(house.town.as_deref(), Some("Edron"));
        assert_eq!(house.house_type, HouseType::Guildhall);
        assert_eq!(house.status, HouseStatus::Auctioned);
        assert_eq!(house.highest_bid, Some(100_000));
        assert_eq!(house.highest_bidder.as_deref(), Some("Bubble"));
        assert!(house.auction_end.is_some());
        assert!(house.owner.is_none());
    }

    #[test]
    fn test_guard_states() {
        let missing = "<html><body><p>No house with this ID exists.</p></body></html>";
        assert!(House::from_content(missing).unwrap().is_none());
        assert!(matches!(House::from_content(LIST_PAGE), Err(InvalidContent::WrongSection("house"))));
        assert!(ListedHouse::list_from_content(RENTED_PAGE).is_err());
    }

    #[test]
    fn test_house_list() {
        let houses = ListedHouse::list_from_content(LIST_PAGE).unwrap();
        assert_eq!(houses.len(), 2);
        assert_eq!(houses[0].town, "Ab'Dendriel");
        assert_eq!((houses[0].id, houses[0].size, houses[0].rent), (20001, 30, 5000));
        assert_eq!(houses[0].status, HouseStatus::Rented);
        assert_eq!(houses[1].highest_bid, Some(1200));
        assert_eq!(houses[1].time_left, Some(Duration::from_secs(2 * 86_400)));
    }
}
