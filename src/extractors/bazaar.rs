// src/extractors/bazaar.rs
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::extractors::guard::{never, ContentGuard};
use crate::extractors::pagination::parse_pagination;
use crate::extractors::{contains_text, has_element, leaf_rows};
use crate::models::bazaar::{
    AchievementEntry, AuctionDetails, AuctionFilters, BestiaryEntry, BlessingEntry, CharacterBazaar, CharmEntry,
    DisplayItem, DisplayMount, DisplayOutfit, ListedAuction, OutfitImage, SalesArgument, SkillEntry,
};
use crate::models::enums::{
    AuctionOrder, AuctionOrderBy, BattlEyeTypeFilter, BazaarType, BidType, PvpTypeFilter, Sex, SkillFilter,
    Vocation, VocationAuctionFilter,
};
use crate::models::pagination::PaginatedSummary;
use crate::utils::convert::{
    normalize_label, parse_datetime, parse_datetime_strict, parse_float, parse_integer, parse_money,
};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{
    direct_cells, element_text, has_select, query_param, selected_option, selector, text_with_line_breaks,
};

const ENTITY: &str = "auction";

static CHAR_INFO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Level: (\d+) \| Vocation: ([\w\s]+)\| (\w+) \| World: (\w+)").expect("Failed to compile CHAR_INFO_RE")
});
static ID_ADDON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)_(\d)\.gif").expect("Failed to compile ID_ADDON_RE"));
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.(?:gif|png)").expect("Failed to compile ID_RE"));
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:an?\s)?([^"]+)""#).expect("Failed to compile DESCRIPTION_RE"));
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("Failed to compile QUOTED_RE"));

static AUCTION: Lazy<Selector> = Lazy::new(|| selector("div.Auction"));
static HEADER: Lazy<Selector> = Lazy::new(|| selector("div.AuctionHeader"));
static CHARACTER_NAME: Lazy<Selector> = Lazy::new(|| selector("div.AuctionCharacterName"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static OUTFIT_IMAGE: Lazy<Selector> = Lazy::new(|| selector("img.AuctionOutfitImage"));
static ITEM_BOX: Lazy<Selector> = Lazy::new(|| selector("div.CVIcon"));
static OBJECT_AMOUNT: Lazy<Selector> = Lazy::new(|| selector("div.ObjectAmount"));
static SHORT_DATA: Lazy<Selector> = Lazy::new(|| selector("div.ShortAuctionData"));
static SHORT_VALUE: Lazy<Selector> = Lazy::new(|| selector("div.ShortAuctionDataValue"));
static SHORT_LABEL: Lazy<Selector> = Lazy::new(|| selector("div.ShortAuctionDataLabel"));
static BID_ROW: Lazy<Selector> = Lazy::new(|| selector("div.ShortAuctionDataBidRow"));
static AUCTION_INFO: Lazy<Selector> = Lazy::new(|| selector("div.CurrentBid div.AuctionInfo"));
static ARGUMENT: Lazy<Selector> = Lazy::new(|| selector("div.Entry"));
static PAGE_NAVIGATION: Lazy<Selector> = Lazy::new(|| selector("td.PageNavigation"));
static BLOCK_NAVIGATION: Lazy<Selector> = Lazy::new(|| selector("div.BlockPageNavigationRow"));
static DETAILS_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.CharacterDetailsBlock"));
static CONTENT_TABLE: Lazy<Selector> = Lazy::new(|| selector("table.TableContent"));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));
static DIV: Lazy<Selector> = Lazy::new(|| selector("div"));
static AUCTION_CONTAINER_TITLE: Lazy<Selector> = Lazy::new(|| selector("div.TableContainer div.Text"));

fn is_bazaar_page(document: &Html) -> bool {
    has_element(document, &AUCTION)
        || has_select(document, "filter_world")
        || document
            .select(&AUCTION_CONTAINER_TITLE)
            .any(|caption| element_text(caption).contains("Auction"))
}

pub const BAZAAR_GUARD: ContentGuard = ContentGuard { entity: "bazaar", not_found: never, valid: is_bazaar_page };

fn is_auction_missing(document: &Html) -> bool {
    !has_element(document, &AUCTION)
        && ["internal error", "could not be found", "does not exist"]
            .iter()
            .any(|needle| contains_text(document, needle))
}

fn is_auction_page(document: &Html) -> bool {
    has_element(document, &AUCTION)
}

pub const AUCTION_GUARD: ContentGuard =
    ContentGuard { entity: ENTITY, not_found: is_auction_missing, valid: is_auction_page };

/// An element of an auction rendered as an icon box (`div.CVIcon`) whose
/// `title` attribute describes it.
pub trait ImageBox: Sized {
    fn from_image_box(item_box: ElementRef) -> Option<Self>;
}

fn box_image(item_box: ElementRef) -> Option<(String, String)> {
    let src = item_box.select(&IMG).next()?.value().attr("src")?.to_string();
    let title = item_box.value().attr("title").unwrap_or_default().to_string();
    Some((src, title))
}

fn image_id(src: &str) -> u32 {
    ID_RE.captures(src).and_then(|caps| caps[1].parse().ok()).unwrap_or(0)
}

fn id_and_addons(src: &str) -> Option<(u32, u8)> {
    let caps = ID_ADDON_RE.captures(src)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn quoted_name(title: &str) -> String {
    QUOTED_RE
        .captures(title)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| title.to_string())
}

impl ImageBox for DisplayItem {
    fn from_image_box(item_box: ElementRef) -> Option<Self> {
        let (image_url, title) = box_image(item_box)?;
        let count = item_box
            .select(&OBJECT_AMOUNT)
            .next()
            .and_then(|amount| parse_money(&element_text(amount)))
            .unwrap_or(1);
        let name = DESCRIPTION_RE.captures(&title).map(|caps| caps[1].to_string());
        Some(DisplayItem { item_id: image_id(&image_url), image_url, name, count })
    }
}

impl ImageBox for DisplayMount {
    fn from_image_box(item_box: ElementRef) -> Option<Self> {
        let (image_url, title) = box_image(item_box)?;
        Some(DisplayMount { mount_id: image_id(&image_url), name: quoted_name(&title), image_url })
    }
}

impl ImageBox for DisplayOutfit {
    fn from_image_box(item_box: ElementRef) -> Option<Self> {
        let (image_url, title) = box_image(item_box)?;
        let (outfit_id, addons) = id_and_addons(&image_url).unwrap_or((0, 0));
        Some(DisplayOutfit { name: quoted_name(&title), outfit_id, addons, image_url })
    }
}

fn image_boxes<T: ImageBox>(element: ElementRef) -> Vec<T> {
    element.select(&ITEM_BOX).filter_map(T::from_image_box).collect()
}

/// A paginated collection block of the details page.
fn parse_summary<T: ImageBox>(block: ElementRef) -> PaginatedSummary<T> {
    let entries: Vec<T> = image_boxes(block);
    let (page, total_pages, results) =
        parse_pagination(block.select(&BLOCK_NAVIGATION).next(), entries.len() as u32);
    PaginatedSummary::new(page, total_pages, results, entries)
}

#[derive(Deserialize)]
struct PageItemsResponse {
    #[serde(rename = "AjaxObjects")]
    ajax_objects: Vec<AjaxObject>,
}

#[derive(Deserialize)]
struct AjaxObject {
    #[serde(rename = "Data")]
    data: String,
}

/// Parses the JSON served by the page-items endpoint for pages after the
/// first of an item, mount or outfit collection.
pub fn parse_page_items<T: ImageBox>(content: &str) -> Result<Vec<T>, InvalidContent> {
    let response: PageItemsResponse =
        serde_json::from_str(content).map_err(|source| InvalidContent::Json { entity: ENTITY, source })?;
    let mut entries = Vec::new();
    for object in response.ajax_objects {
        let fragment = Html::parse_fragment(&object.data);
        entries.extend(image_boxes::<T>(fragment.root_element()));
    }
    Ok(entries)
}

impl CharacterBazaar {
    /// Parses a page of current auctions or of the auction history.
    pub fn from_content(content: &str) -> Result<CharacterBazaar, InvalidContent> {
        let document = Html::parse_document(content);
        BAZAAR_GUARD.admit(&document)?;

        let filters = has_select(&document, "filter_world").then(|| parse_filters(&document));
        let bazaar_type = if filters.is_some() { BazaarType::Current } else { BazaarType::History };
        let mut entries: Vec<ListedAuction> = Vec::new();
        for row in document.select(&AUCTION) {
            entries.extend(parse_auction(row)?);
        }
        let (page, total_pages, results_count) =
            parse_pagination(document.select(&PAGE_NAVIGATION).next(), entries.len() as u32);

        debug!("Bazaar ({}) page {}/{}: {} auctions", bazaar_type, page, total_pages, entries.len());
        Ok(CharacterBazaar { bazaar_type, filters, page, total_pages, results_count, entries })
    }
}

fn selected_id(document: &Html, name: &str) -> Option<u32> {
    selected_option(document, name).and_then(|(_, value)| value.parse().ok())
}

fn input_value(document: &Html, name: &str) -> Option<String> {
    let input = selector(&format!(r#"input[name="{name}"]"#));
    document
        .select(&input)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_filters(document: &Html) -> AuctionFilters {
    let integer = |name: &str| input_value(document, name).and_then(|v| parse_integer(&v)).map(|v| v as u32);
    AuctionFilters {
        world: selected_option(document, "filter_world")
            .map(|(_, value)| value)
            .filter(|v| !v.is_empty()),
        pvp_type: selected_id(document, "filter_worldpvptype").map(PvpTypeFilter::from_id),
        battleye: selected_id(document, "filter_worldbattleyestate").map(BattlEyeTypeFilter::from_id),
        vocation: selected_id(document, "filter_profession").map(VocationAuctionFilter::from_id),
        min_level: integer("filter_levelrangefrom"),
        max_level: integer("filter_levelrangeto"),
        skill: selected_id(document, "filter_skillid").map(SkillFilter::from_id),
        min_skill_level: integer("filter_skillrangefrom"),
        max_skill_level: integer("filter_skillrangeto"),
        order_by: selected_id(document, "order_column").map(AuctionOrderBy::from_id),
        order: selected_id(document, "order_direction").map(AuctionOrder::from_id),
        item: input_value(document, "itemname"),
    }
}

/// `Ok(None)` for blocks without a character header; a garbled bid window is an error.
fn parse_auction(row: ElementRef) -> Result<Option<ListedAuction>, InvalidContent> {
    let Some(header) = row.select(&HEADER).next() else { return Ok(None) };
    let Some(name_container) = header.select(&CHARACTER_NAME).next() else { return Ok(None) };
    let (auction_start, auction_end) = parse_bid_window(row)?;
    let (name, auction_id) = match name_container.select(&LINK).next() {
        Some(link) => {
            let id = link
                .value()
                .attr("href")
                .and_then(|href| query_param(href, "auctionid"))
                .and_then(|id| id.parse().ok())
                .unwrap_or(0);
            (element_text(link), id)
        }
        None => (element_text(name_container), 0),
    };

    let mut auction = ListedAuction {
        auction_id,
        name,
        level: 0,
        world: String::new(),
        vocation: Vocation::NoVocation,
        sex: Sex::Male,
        outfit: None,
        displayed_items: Vec::new(),
        sales_arguments: Vec::new(),
        auction_start,
        auction_end,
        bid: 0,
        bid_type: BidType::Minimum,
        status: "in progress".to_string(),
    };

    if let Some(caps) = CHAR_INFO_RE.captures(&element_text(header)) {
        auction.level = caps[1].parse().unwrap_or(0);
        auction.vocation = Vocation::from_label(caps[2].trim());
        auction.sex = Sex::from_label(caps[3].trim());
        auction.world = caps[4].to_string();
    }
    auction.outfit = row
        .select(&OUTFIT_IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| {
            let (outfit_id, addons) = id_and_addons(src)?;
            Some(OutfitImage { image_url: src.to_string(), outfit_id, addons })
        });
    auction.displayed_items = image_boxes(row);

    if let Some(bid_row) = row.select(&BID_ROW).next() {
        auction.bid = bid_row
            .select(&SHORT_VALUE)
            .next()
            .and_then(|value| parse_integer(&element_text(value)))
            .unwrap_or(0);
        if let Some(label) = bid_row.select(&SHORT_LABEL).last() {
            auction.bid_type = BidType::from_label(element_text(label).replace(':', "").trim());
        }
    }
    if let Some(info) = row.select(&AUCTION_INFO).next() {
        auction.status = text_with_line_breaks(info).replace('\n', " ");
    }
    auction.sales_arguments = row
        .select(&ARGUMENT)
        .filter_map(|entry| {
            let img = entry.select(&IMG).next()?.value().attr("src")?.to_string();
            Some(SalesArgument { category_id: image_id(&img), category_image: img, content: element_text(entry) })
        })
        .collect();
    Ok(Some(auction))
}

fn parse_bid_window(row: ElementRef) -> Result<(DateTime<Utc>, DateTime<Utc>), InvalidContent> {
    let values: Vec<String> = row
        .select(&SHORT_DATA)
        .next()
        .map(|dates| dates.select(&SHORT_VALUE).map(element_text).collect())
        .unwrap_or_default();
    let date = |index: usize, field: &'static str| -> Result<DateTime<Utc>, FieldError> {
        let raw = values.get(index).ok_or(FieldError::Missing(field))?;
        parse_datetime_strict(raw)
    };
    let start = date(0, "auction_start").map_err(|e| InvalidContent::field(ENTITY, e))?;
    let end = date(1, "auction_end").map_err(|e| InvalidContent::field(ENTITY, e))?;
    Ok((start, end))
}

impl AuctionDetails {
    /// Parses an auction's detail page. Only the first page of each item,
    /// mount and outfit collection is present; see [`parse_page_items`].
    pub fn from_content(content: &str, auction_id: u32) -> Result<Option<AuctionDetails>, InvalidContent> {
        let document = Html::parse_document(content);
        if !AUCTION_GUARD.admit(&document)? {
            return Ok(None);
        }
        let mut auction = document
            .select(&AUCTION)
            .next()
            .map(parse_auction)
            .transpose()?
            .flatten()
            .ok_or_else(|| InvalidContent::malformed(ENTITY, "no auction header"))?;
        if auction_id > 0 {
            auction.auction_id = auction_id;
        }

        let mut details = AuctionDetails {
            auction,
            hit_points: 0,
            mana: 0,
            capacity: 0,
            speed: 0,
            blessings_count: 0,
            mounts_count: 0,
            outfits_count: 0,
            titles_count: 0,
            skills: Vec::new(),
            creation_date: None,
            experience: 0,
            gold: 0,
            achievement_points: 0,
            regular_world_transfer_available: false,
            charm_expansion: false,
            available_charm_points: 0,
            spent_charm_points: 0,
            daily_reward_streak: 0,
            hunting_task_points: 0,
            permanent_hunting_task_slots: 0,
            permanent_prey_slots: 0,
            hirelings: 0,
            hireling_jobs: 0,
            hireling_outfits: 0,
            items: None,
            store_items: None,
            mounts: None,
            store_mounts: None,
            outfits: None,
            store_outfits: None,
            blessings: Vec::new(),
            imbuements: Vec::new(),
            charms: Vec::new(),
            completed_cyclopedia_map_areas: Vec::new(),
            completed_quest_lines: Vec::new(),
            titles: Vec::new(),
            achievements: Vec::new(),
            bestiary_progress: Vec::new(),
        };

        for block in document.select(&DETAILS_BLOCK) {
            let Some(id) = block.value().attr("id") else { continue };
            match id {
                "General" => parse_general(block, &mut details),
                "ItemSummary" => details.items = Some(parse_summary(block)),
                "StoreItemSummary" => details.store_items = Some(parse_summary(block)),
                "Mounts" => details.mounts = Some(parse_summary(block)),
                "StoreMounts" => details.store_mounts = Some(parse_summary(block)),
                "Outfits" => details.outfits = Some(parse_summary(block)),
                "StoreOutfits" => details.store_outfits = Some(parse_summary(block)),
                "Blessings" => details.blessings = parse_blessings(block),
                "Imbuements" => details.imbuements = single_column(block),
                "Charms" => details.charms = parse_charms(block),
                "CompletedCyclopediaMapAreas" => details.completed_cyclopedia_map_areas = single_column(block),
                "CompletedQuestLines" => details.completed_quest_lines = single_column(block),
                "Titles" => details.titles = single_column(block),
                "Achievements" => details.achievements = parse_achievements(block),
                "BestiaryProgress" => details.bestiary_progress = parse_bestiary(block),
                other => trace!("Ignoring auction block {}", other),
            }
        }

        debug!("Auction {} ({})", details.auction.auction_id, details.auction.name);
        Ok(Some(details))
    }
}

/// Rows of `<span>label</span><div>value</div>` pairs, in document order.
fn data_table(table: ElementRef) -> Vec<(String, String)> {
    leaf_rows(table)
        .into_iter()
        .filter_map(|row| {
            let label = row.select(&SPAN).next()?;
            let value = row.select(&DIV).next()?;
            Some((normalize_label(&element_text(label)), element_text(value)))
        })
        .collect()
}

fn lookup<'a>(data: &'a [(String, String)], key: &str) -> &'a str {
    data.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap_or_default()
}

fn number(data: &[(String, String)], key: &str) -> u32 {
    parse_integer(lookup(data, key)).unwrap_or(0) as u32
}

fn parse_general(block: ElementRef, details: &mut AuctionDetails) {
    let tables: Vec<ElementRef> = block.select(&CONTENT_TABLE).collect();
    let table = |index: usize| tables.get(index).map(|t| data_table(*t)).unwrap_or_default();

    let stats = table(0);
    details.hit_points = number(&stats, "hit_points");
    details.mana = number(&stats, "mana");
    details.capacity = number(&stats, "capacity");
    details.speed = number(&stats, "speed");
    details.mounts_count = number(&stats, "mounts");
    details.outfits_count = number(&stats, "outfits");
    details.titles_count = number(&stats, "titles");
    // "5/7": blessings owned out of the total.
    let blessings = lookup(&stats, "blessings");
    details.blessings_count = parse_integer(blessings.split('/').next().unwrap_or_default()).unwrap_or(0) as u32;

    if let Some(skills) = tables.get(1) {
        details.skills = parse_skills(*skills);
    }

    let additional = table(2);
    details.creation_date = parse_datetime(lookup(&additional, "creation_date"));
    details.experience = parse_integer(lookup(&additional, "experience")).unwrap_or(0);
    details.gold = parse_integer(lookup(&additional, "gold")).unwrap_or(0);
    details.achievement_points = number(&additional, "achievement_points");

    let transfer = table(3);
    details.regular_world_transfer_available =
        lookup(&transfer, "regular_world_transfer").to_lowercase().contains("available");

    let charms = table(4);
    details.charm_expansion = lookup(&charms, "charm_expansion").to_lowercase().contains("yes");
    details.available_charm_points = number(&charms, "available_charm_points");
    details.spent_charm_points = number(&charms, "spent_charm_points");

    let daily = table(5);
    details.daily_reward_streak =
        daily.last().and_then(|(_, v)| parse_integer(v)).unwrap_or(0) as u32;

    let hunting = table(6);
    details.hunting_task_points = number(&hunting, "hunting_task_points");
    details.permanent_hunting_task_slots = number(&hunting, "permanent_hunting_task_slots");
    details.permanent_prey_slots = number(&hunting, "permanent_prey_slots");

    let hirelings = table(7);
    details.hirelings = number(&hirelings, "hirelings");
    details.hireling_jobs = number(&hirelings, "hireling_jobs");
    details.hireling_outfits = number(&hirelings, "hireling_outfits");
}

fn parse_skills(table: ElementRef) -> Vec<SkillEntry> {
    leaf_rows(table)
        .into_iter()
        .filter_map(|row| {
            let cells: Vec<String> = direct_cells(row).into_iter().map(element_text).collect();
            let [name, level, progress] = cells.as_slice() else { return None };
            Some(SkillEntry {
                name: name.clone(),
                level: level.parse().ok()?,
                progress: parse_float(progress).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Text rows of a block's content table, header dropped.
fn content_rows(block: ElementRef, last: bool) -> Vec<Vec<ElementRef>> {
    let tables: Vec<ElementRef> = block.select(&CONTENT_TABLE).collect();
    let table = if last { tables.last() } else { tables.first() };
    let Some(table) = table else { return Vec::new() };
    leaf_rows(*table)
        .into_iter()
        .skip(1)
        .filter(|row| !element_text(*row).contains("more entries"))
        .map(direct_cells)
        .collect()
}

fn single_column(block: ElementRef) -> Vec<String> {
    content_rows(block, true)
        .into_iter()
        .filter_map(|cells| cells.first().map(|cell| element_text(*cell)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn parse_blessings(block: ElementRef) -> Vec<BlessingEntry> {
    content_rows(block, false)
        .into_iter()
        .filter_map(|cells| {
            let [amount, name] = cells.as_slice() else { return None };
            Some(BlessingEntry {
                name: element_text(*name),
                amount: parse_integer(&element_text(*amount))? as u32,
            })
        })
        .collect()
}

fn parse_charms(block: ElementRef) -> Vec<CharmEntry> {
    content_rows(block, false)
        .into_iter()
        .filter_map(|cells| {
            let [cost, name] = cells.as_slice() else { return None };
            Some(CharmEntry { name: element_text(*name), cost: parse_integer(&element_text(*cost))? as u32 })
        })
        .collect()
}

fn parse_achievements(block: ElementRef) -> Vec<AchievementEntry> {
    content_rows(block, false)
        .into_iter()
        .filter_map(|cells| {
            let cell = cells.first()?;
            let name = element_text(*cell);
            (!name.is_empty()).then(|| AchievementEntry { name, secret: cell.select(&IMG).next().is_some() })
        })
        .collect()
}

fn parse_bestiary(block: ElementRef) -> Vec<BestiaryEntry> {
    content_rows(block, false)
        .into_iter()
        .filter_map(|cells| {
            let [step, kills, name] = cells.as_slice() else { return None };
            Some(BestiaryEntry {
                name: element_text(*name),
                kills: parse_integer(&element_text(*kills))? as u32,
                step: element_text(*step).parse().ok()?,
            })
        })
        .collect()
}
