// src/tibia/client.rs
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::extractors::bazaar::{parse_page_items, ImageBox};
use crate::models::{
    AuctionDetails, AuctionFilters, BazaarType, Character, CharacterBazaar, Guild, Highscores, HighscoresCategory,
    House, HouseStatus, HouseType, KillStatistics, ListedAuction, ListedGuild, ListedHouse, ListedNews, News,
    NewsCategory, NewsType, PageItemType, PaginatedSummary, Tournament, VocationFilter, World, WorldOverview,
};
use crate::tibia::config::ClientConfig;
use crate::tibia::transport::{RawResponse, ReqwestTransport, Transport};
use crate::utils::error::{InvalidContent, TibiaError};

/// A parsed record plus what is known about the fetch that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TibiaResponse<D> {
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
    pub age: u64,
    pub fetching_time: Duration,
    pub parsing_time: Duration,
    pub cache_ttl: Duration,
    pub data: D,
}

impl<D> TibiaResponse<D> {
    fn from_raw(raw: &RawResponse, cache_ttl: Duration, parsing_time: Duration, data: D) -> Self {
        TibiaResponse {
            timestamp: raw.timestamp,
            cached: raw.cached,
            age: raw.age,
            fetching_time: raw.fetching_time,
            parsing_time,
            cache_ttl,
            data,
        }
    }

    /// Time until the site's cached copy expires, as of `now`.
    pub fn time_left_at(&self, now: DateTime<Utc>) -> Duration {
        if self.age == 0 {
            return Duration::ZERO;
        }
        let elapsed = (now - self.timestamp).to_std().unwrap_or(Duration::ZERO);
        self.cache_ttl
            .saturating_sub(Duration::from_secs(self.age))
            .saturating_sub(elapsed)
    }

    pub fn time_left(&self) -> Duration {
        self.time_left_at(Utc::now())
    }

    pub fn seconds_left(&self) -> u64 {
        self.time_left().as_secs()
    }

    pub fn map<E>(self, f: impl FnOnce(D) -> E) -> TibiaResponse<E> {
        TibiaResponse {
            timestamp: self.timestamp,
            cached: self.cached,
            age: self.age,
            fetching_time: self.fetching_time,
            parsing_time: self.parsing_time,
            cache_ttl: self.cache_ttl,
            data: f(self.data),
        }
    }
}

/// Fetches pages through a [`Transport`] and parses them into records.
pub struct Client<T: Transport = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
}

impl Client<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, TibiaError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Client { transport, config })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Client { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn fetch<D>(
        &self,
        url: &str,
        parse: impl FnOnce(&str) -> Result<D, InvalidContent>,
    ) -> Result<TibiaResponse<D>, TibiaError> {
        info!("Fetching {}", url);
        let raw = self.transport.get(url).await?;
        self.parse_raw(raw, parse)
    }

    async fn submit<D>(
        &self,
        url: &str,
        form: &[(String, String)],
        parse: impl FnOnce(&str) -> Result<D, InvalidContent>,
    ) -> Result<TibiaResponse<D>, TibiaError> {
        info!("Posting {} fields to {}", form.len(), url);
        let raw = self.transport.post(url, form).await?;
        self.parse_raw(raw, parse)
    }

    fn parse_raw<D>(
        &self,
        raw: RawResponse,
        parse: impl FnOnce(&str) -> Result<D, InvalidContent>,
    ) -> Result<TibiaResponse<D>, TibiaError> {
        let start = Instant::now();
        let data = parse(&raw.content)?;
        let parsing_time = start.elapsed();
        debug!("Parsed response in {:?}", parsing_time);
        Ok(TibiaResponse::from_raw(&raw, self.config.cache_ttl, parsing_time, data))
    }

    pub async fn fetch_character(&self, name: &str) -> Result<TibiaResponse<Option<Character>>, TibiaError> {
        self.fetch(&Character::get_url(name), Character::from_content).await
    }

    pub async fn fetch_guild(&self, name: &str) -> Result<TibiaResponse<Option<Guild>>, TibiaError> {
        self.fetch(&Guild::get_url(name), Guild::from_content).await
    }

    pub async fn fetch_world_guilds(&self, world: &str) -> Result<TibiaResponse<Option<Vec<ListedGuild>>>, TibiaError> {
        self.fetch(&Guild::get_world_list_url(world), ListedGuild::list_from_content).await
    }

    pub async fn fetch_world(&self, name: &str) -> Result<TibiaResponse<Option<World>>, TibiaError> {
        self.fetch(&World::get_url(name), World::from_content).await
    }

    pub async fn fetch_world_overview(&self) -> Result<TibiaResponse<WorldOverview>, TibiaError> {
        self.fetch(&WorldOverview::get_url(), WorldOverview::from_content).await
    }

    pub async fn fetch_house(&self, house_id: u32, world: &str) -> Result<TibiaResponse<Option<House>>, TibiaError> {
        self.fetch(&House::get_url(house_id, world), |content| {
            Ok(House::from_content(content)?.map(|mut house| {
                if house.id == 0 {
                    house.id = house_id;
                }
                house
            }))
        })
        .await
    }

    pub async fn fetch_world_houses(
        &self,
        world: &str,
        town: &str,
        house_type: &HouseType,
        status: Option<&HouseStatus>,
    ) -> Result<TibiaResponse<Vec<ListedHouse>>, TibiaError> {
        let url = House::get_list_url(world, town, house_type, status);
        self.fetch(&url, ListedHouse::list_from_content).await
    }

    pub async fn fetch_highscores_page(
        &self,
        world: Option<&str>,
        category: &HighscoresCategory,
        vocation: &VocationFilter,
        page: u32,
    ) -> Result<TibiaResponse<Option<Highscores>>, TibiaError> {
        if page == 0 {
            return Err(TibiaError::InvalidArgument("page must be 1 or greater".to_string()));
        }
        let url = Highscores::get_url(world, category, vocation, page);
        self.fetch(&url, Highscores::from_content).await
    }

    pub async fn fetch_kill_statistics(&self, world: &str) -> Result<TibiaResponse<Option<KillStatistics>>, TibiaError> {
        self.fetch(&KillStatistics::get_url(world), KillStatistics::from_content).await
    }

    pub async fn fetch_news(&self, news_id: u32) -> Result<TibiaResponse<Option<News>>, TibiaError> {
        self.fetch(&News::get_url(news_id), |content| News::from_content(content, news_id)).await
    }

    /// Searches the news archive between two dates, inclusive.
    ///
    /// Empty `categories` or `types` select all of them.
    pub async fn fetch_news_archive(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
        categories: &[NewsCategory],
        types: &[NewsType],
    ) -> Result<TibiaResponse<Vec<ListedNews>>, TibiaError> {
        if begin > end {
            return Err(TibiaError::InvalidArgument(format!("begin date {} is after end date {}", begin, end)));
        }
        let form = news_archive_form(begin, end, categories, types);
        self.submit(&News::get_list_url(), &form, ListedNews::list_from_content).await
    }

    /// The news archive for the last `days` days, today included.
    pub async fn fetch_recent_news(&self, days: u32) -> Result<TibiaResponse<Vec<ListedNews>>, TibiaError> {
        let end = Utc::now().date_naive();
        let begin = end - chrono::Duration::days(i64::from(days));
        self.fetch_news_archive(begin, end, &[], &[]).await
    }

    pub async fn fetch_tournament(&self, cycle: u32) -> Result<TibiaResponse<Option<Tournament>>, TibiaError> {
        self.fetch(&Tournament::get_url(cycle), Tournament::from_content).await
    }

    pub async fn fetch_bazaar(
        &self,
        bazaar_type: &BazaarType,
        page: u32,
        filters: Option<&AuctionFilters>,
    ) -> Result<TibiaResponse<CharacterBazaar>, TibiaError> {
        let page = page.max(1);
        let url = match bazaar_type {
            BazaarType::History => CharacterBazaar::get_auctions_history_url(page),
            _ => CharacterBazaar::get_current_auctions_url(page, filters),
        };
        self.fetch(&url, CharacterBazaar::from_content).await
    }

    /// Fetches an auction's detail page. With `fetch_all`, every remaining page of
    /// each item, mount and outfit summary is requested and merged in.
    pub async fn fetch_auction(
        &self,
        auction_id: u32,
        fetch_all: bool,
    ) -> Result<TibiaResponse<Option<AuctionDetails>>, TibiaError> {
        let mut response = self
            .fetch(&ListedAuction::get_url(auction_id), |content| {
                AuctionDetails::from_content(content, auction_id)
            })
            .await?;
        if !fetch_all {
            return Ok(response);
        }
        if let Some(details) = response.data.as_mut() {
            self.complete_summary(&mut details.items, PageItemType::Items, auction_id).await?;
            self.complete_summary(&mut details.store_items, PageItemType::StoreItems, auction_id).await?;
            self.complete_summary(&mut details.mounts, PageItemType::Mounts, auction_id).await?;
            self.complete_summary(&mut details.store_mounts, PageItemType::StoreMounts, auction_id).await?;
            self.complete_summary(&mut details.outfits, PageItemType::Outfits, auction_id).await?;
            self.complete_summary(&mut details.store_outfits, PageItemType::StoreOutfits, auction_id).await?;
        }
        Ok(response)
    }

    async fn complete_summary<I: ImageBox>(
        &self,
        summary: &mut Option<PaginatedSummary<I>>,
        item_type: PageItemType,
        auction_id: u32,
    ) -> Result<(), TibiaError> {
        let Some(summary) = summary.as_mut() else { return Ok(()) };
        if summary.fully_fetched {
            return Ok(());
        }
        for page in 2..=summary.total_pages {
            let url = item_type.url(auction_id, page);
            info!("Fetching page {} of {:?} for auction {}", page, item_type, auction_id);
            let raw = self.transport.get(&url).await?;
            summary.extend(parse_page_items::<I>(&raw.content)?);
        }
        summary.mark_fully_fetched();
        Ok(())
    }
}

fn news_archive_form(
    begin: NaiveDate,
    end: NaiveDate,
    categories: &[NewsCategory],
    types: &[NewsType],
) -> Vec<(String, String)> {
    let mut form = vec![
        ("filter_begin_day".to_string(), begin.day().to_string()),
        ("filter_begin_month".to_string(), begin.month().to_string()),
        ("filter_begin_year".to_string(), begin.year().to_string()),
        ("filter_end_day".to_string(), end.day().to_string()),
        ("filter_end_month".to_string(), end.month().to_string()),
        ("filter_end_year".to_string(), end.year().to_string()),
    ];
    let all_categories = [
        NewsCategory::Cipsoft,
        NewsCategory::Community,
        NewsCategory::Development,
        NewsCategory::Support,
        NewsCategory::TechnicalIssues,
    ];
    let categories = if categories.is_empty() { &all_categories[..] } else { categories };
    for category in categories.iter().filter(|c| !c.is_unknown()) {
        form.push((format!("filter_{}", category.as_str()), category.as_str().to_string()));
    }

    let all_types = [NewsType::News, NewsType::FeaturedArticle, NewsType::NewsTicker];
    let types = if types.is_empty() { &all_types[..] } else { types };
    for news_type in types {
        let value = match news_type {
            NewsType::News => "news",
            NewsType::FeaturedArticle => "article",
            NewsType::NewsTicker => "ticker",
            NewsType::Unknown(_) => continue,
        };
        form.push((format!("filter_{}", value), value.to_string()));
    }
    form
}
