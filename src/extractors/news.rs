// src/extractors/news.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::extractors::guard::{never, ContentGuard};
use crate::extractors::{contains_text, document_rows, has_element};
use crate::models::enums::{NewsCategory, NewsType};
use crate::models::news::{ListedNews, News};
use crate::utils::convert::{parse_date, parse_date_strict};
use crate::utils::error::{FieldError, InvalidContent};
use crate::utils::html::{
    direct_cells, element_text, first_image_src, first_link, query_param, selector, text_with_line_breaks,
};

const ENTITY: &str = "news";

static ICON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"newsicon_([^_]+)_(?:small|big)").expect("Failed to compile ICON_RE"));

static HEADLINE: Lazy<Selector> = Lazy::new(|| selector("div.NewsHeadline"));
static HEADLINE_DATE: Lazy<Selector> = Lazy::new(|| selector("div.NewsHeadlineDate"));
static HEADLINE_TEXT: Lazy<Selector> = Lazy::new(|| selector("div.NewsHeadlineText"));
static HEADLINE_ICON: Lazy<Selector> = Lazy::new(|| selector("img.NewsHeadlineIcon, img"));
static CONTENT: Lazy<Selector> = Lazy::new(|| selector("td.NewsTableContainer"));
static THREAD_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*="threadid"]"#));
static ARCHIVE_FORM: Lazy<Selector> =
    Lazy::new(|| selector(r#"input[name="filter_begin_day"], select[name="filter_begin_day"]"#));

fn is_not_found(document: &Html) -> bool {
    !has_element(document, &HEADLINE)
        && (has_element(document, &ARCHIVE_FORM) || contains_text(document, "not found"))
}

fn is_article(document: &Html) -> bool {
    has_element(document, &HEADLINE)
}

pub const NEWS_GUARD: ContentGuard = ContentGuard { entity: ENTITY, not_found: is_not_found, valid: is_article };

fn is_archive(document: &Html) -> bool {
    has_element(document, &ARCHIVE_FORM)
}

pub const NEWS_ARCHIVE_GUARD: ContentGuard =
    ContentGuard { entity: "news archive", not_found: never, valid: is_archive };

fn category_from_icon(src: &str) -> NewsCategory {
    ICON_RE
        .captures(src)
        .map(|caps| NewsCategory::from_label(&caps[1]))
        .unwrap_or_else(|| NewsCategory::Unknown(src.to_string()))
}

impl News {
    /// Parses a news article. The page does not state its own id, so the
    /// requested `news_id` is carried into the record.
    pub fn from_content(content: &str, news_id: u32) -> Result<Option<News>, InvalidContent> {
        let document = Html::parse_document(content);
        if !NEWS_GUARD.admit(&document)? {
            return Ok(None);
        }
        let headline = document
            .select(&HEADLINE)
            .next()
            .ok_or_else(|| InvalidContent::malformed(ENTITY, "no headline"))?;
        let title = headline
            .select(&HEADLINE_TEXT)
            .next()
            .map(element_text)
            .ok_or_else(|| InvalidContent::field(ENTITY, FieldError::Missing("title")))?;
        let date_text = headline.select(&HEADLINE_DATE).next().map(element_text).unwrap_or_default();
        let date = parse_date_strict(date_text.trim_end_matches('-').trim())
            .map_err(|e| InvalidContent::field(ENTITY, e))?;
        let category = headline
            .select(&HEADLINE_ICON)
            .find_map(|img| img.value().attr("src").filter(|src| ICON_RE.is_match(src)))
            .map(category_from_icon)
            .unwrap_or_else(|| NewsCategory::Unknown(String::new()));
        let content = document
            .select(&CONTENT)
            .next()
            .map(|td| td.inner_html().trim().to_string())
            .unwrap_or_default();
        let thread_id = document
            .select(&THREAD_LINK)
            .find_map(|a| a.value().attr("href").and_then(|href| query_param(href, "threadid")))
            .and_then(|id| id.parse().ok());

        debug!("News {}: {}", news_id, title);
        Ok(Some(News { id: news_id, title, category, date, content, thread_id }))
    }
}

impl ListedNews {
    /// Parses the entries of a news archive search result.
    pub fn list_from_content(content: &str) -> Result<Vec<ListedNews>, InvalidContent> {
        let document = Html::parse_document(content);
        NEWS_ARCHIVE_GUARD.admit(&document)?;
        let entries: Vec<ListedNews> = document_rows(&document).into_iter().filter_map(parse_archive_row).collect();
        debug!("News archive: {} entries", entries.len());
        Ok(entries)
    }
}

fn parse_archive_row(row: ElementRef) -> Option<ListedNews> {
    let cells = direct_cells(row);
    let [icon, details, headline] = cells.as_slice() else { return None };
    let category = category_from_icon(&first_image_src(*icon)?);
    let details = text_with_line_breaks(*details);
    let mut lines = details.lines();
    let date = parse_date(lines.next()?)?;
    let news_type = NewsType::from_label(lines.next().unwrap_or_default());
    let (title, href) = first_link(*headline)?;
    let id = query_param(&href, "id")?.parse().ok()?;
    Some(ListedNews { id, title, category, news_type, date })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ARTICLE: &str = r#"<html><body><div class="BoxContent">
<div class="NewsHeadline"><div class="NewsHeadlineBackground">
<img src="https://static.tibia.com/images/global/content/newsicon_development_big.gif" class="NewsHeadlineIcon">
<div class="NewsHeadlineDate">Aug 15 2019 - </div><div class="NewsHeadlineText">Summer Update 2019</div></div></div>
<table><tr><td class="NewsTableContainer"><p>New areas!</p></td></tr></table>
<a href="https://www.tibia.com/forum/?action=thread&amp;threadid=4779522">Discuss</a>
</div></body></html>"#;

    const ARCHIVE: &str = r#"<html><body><form>
<select name="filter_begin_day"><option value="1">1</option></select></form>
<table><tr><td>Category</td><td>Date</td><td>Title</td></tr>
<tr><td><img src="https://static.tibia.com/images/global/content/newsicon_community_small.gif"></td><td>Mar 21 2019<br>News&#160;Ticker</td><td><a href="https://www.tibia.com/news/?subtopic=newsarchive&amp;id=4738">The Tibian Times</a></td></tr>
<tr><td><img src="https://static.tibia.com/images/global/content/newsicon_technical_small.gif"></td><td>Mar 20 2019<br>News</td><td><a href="https://www.tibia.com/news/?subtopic=newsarchive&amp;id=4737">Server Maintenance</a></td></tr>
</table></body></html>"#;

    #[test]
    fn test_article() {
        let news = News::from_content(ARTICLE, 4800).unwrap().unwrap();
        assert_eq!(news.id, 4800);
        assert_eq!(news.title, "Summer Update 2019");
        assert_eq!(news.category, NewsCategory::Development);
        assert_eq!(news.date, NaiveDate::from_ymd_opt(2019, 8, 15).unwrap());
        assert_eq!(news.content, "<p>New areas!</p>");
        assert_eq!(news.thread_id, Some(4779522));
    }

    #[test]
    fn test_article_without_date_is_an_error() {
        let page = ARTICLE.replace("Aug 15 2019 - ", "Coming soon");
        assert!(matches!(
            News::from_content(&page, 4800),
            Err(InvalidContent::Field { entity: "news", source: FieldError::Date(ref raw) }) if raw == "Coming soon"
        ));
    }

    #[test]
    fn test_article_guard_states() {
        assert!(News::from_content(ARCHIVE, 1).unwrap().is_none());
        assert!(matches!(
            News::from_content("<html><body><p>Maintenance</p></body></html>", 1),
            Err(InvalidContent::WrongSection("news"))
        ));
    }

    #[test]
    fn test_archive() {
        let entries = ListedNews::list_from_content(ARCHIVE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 4738);
        assert_eq!(entries[0].news_type, NewsType::NewsTicker);
        assert_eq!(entries[0].category, NewsCategory::Community);
        assert_eq!(entries[1].category, NewsCategory::TechnicalIssues);
        assert_eq!(entries[1].title, "Server Maintenance");
        assert!(ListedNews::list_from_content(ARTICLE).is_err());
    }
}
