// src/extractors/pagination.rs
//! Reads the "page x of y / Results: n" navigation blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::utils::convert::parse_integer;
use crate::utils::html::{element_text, selector};

static CURRENT_PAGE: Lazy<Selector> = Lazy::new(|| selector("span.CurrentPageLink"));
static PAGE_LINKS: Lazy<Selector> = Lazy::new(|| selector("span.PageLink, span.FirstOrLastElement"));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

static RESULTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Results:\s*([\d,.]+)").expect("Failed to compile RESULTS_RE"));
static PAGE_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Page\s+(\d+)\s+of\s+(\d+)").expect("Failed to compile PAGE_OF_RE"));
static PAGE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[?&;](?:current)?page=(\d+)").expect("Failed to compile PAGE_PARAM_RE"));

/// Returns `(page, total_pages, results)`.
///
/// A missing block means everything fits on one page: `(1, 1, fallback_results)`.
/// The same applies to any count the block does not state.
pub fn parse_pagination(block: Option<ElementRef>, fallback_results: u32) -> (u32, u32, u32) {
    let Some(block) = block else {
        return (1, 1, fallback_results);
    };
    let text = element_text(block);
    let results = RESULTS_RE
        .captures(&text)
        .and_then(|c| parse_integer(&c[1]))
        .map_or(fallback_results, |n| n as u32);

    if let Some(caps) = PAGE_OF_RE.captures(&text) {
        let page = caps[1].parse().unwrap_or(1);
        let total = caps[2].parse().unwrap_or(page);
        return normalize(page, total, results);
    }

    let mut total = 0u32;
    for span in block.select(&PAGE_LINKS) {
        if let Some(n) = parse_integer(&element_text(span)) {
            total = total.max(n as u32);
        }
    }
    for link in block.select(&LINKS) {
        let href = link.value().attr("href").unwrap_or_default().replace("&amp;", "&");
        if let Some(caps) = PAGE_PARAM_RE.captures(&href) {
            total = total.max(caps[1].parse().unwrap_or(0));
        }
    }

    let page = match block.select(&CURRENT_PAGE).next().map(element_text) {
        Some(current) => match parse_integer(&current) {
            Some(n) => n as u32,
            None if current.contains("First") => 1,
            None if current.contains("Last") => total,
            None => 1,
        },
        None => 1,
    };
    normalize(page, total.max(page), results)
}

fn normalize(page: u32, total: u32, results: u32) -> (u32, u32, u32) {
    let total = total.max(1);
    (page.clamp(1, total), total, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn block(html: &Html) -> Option<ElementRef<'_>> {
        html.select(&selector("div.PageNavigation")).next()
    }

    #[test]
    fn test_absent_block_is_single_page() {
        assert_eq!(parse_pagination(None, 7), (1, 1, 7));
    }

    #[test]
    fn test_span_navigation() {
        let html = Html::parse_fragment(
            r#"<div class="PageNavigation"><div>
                <span class="PageLink FirstOrLastElement"><a href="?subtopic=highscores&amp;currentpage=1">First Page</a></span>
                <span class="PageLink"><a href="?subtopic=highscores&amp;currentpage=3">3</a></span>
                <span class="PageLink"><span class="CurrentPageLink">4</span></span>
                <span class="PageLink"><a href="?subtopic=highscores&amp;currentpage=5">5</a></span>
                <span class="PageLink FirstOrLastElement"><a href="?subtopic=highscores&amp;currentpage=39">Last Page</a></span>
            </div><div>Results: 1,932</div></div>"#,
        );
        assert_eq!(parse_pagination(block(&html), 50), (4, 39, 1932));
    }

    #[test]
    fn test_text_navigation() {
        let html = Html::parse_fragment(r#"<div class="PageNavigation">Page 2 of 3 Results: 120</div>"#);
        assert_eq!(parse_pagination(block(&html), 0), (2, 3, 120));
    }

    #[test]
    fn test_invariant_holds_for_odd_blocks() {
        let html = Html::parse_fragment(
            r#"<div class="PageNavigation"><span class="CurrentPageLink">Last Page</span></div>"#,
        );
        let (page, total, results) = parse_pagination(block(&html), 3);
        assert!(1 <= page && page <= total);
        assert_eq!(results, 3);
    }
}
