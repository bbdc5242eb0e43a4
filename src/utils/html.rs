// src/utils/html.rs
//! Small DOM helpers shared by the entity extractors.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};

use crate::utils::convert::{clean_text, normalize_label};

static POPUP_ARGS_RE: Lazy<Regex> = Lazy::new(|| {
    // $(this), 'Title', '<html>', ...
    Regex::new(r#"(?s)\(\s*[^,]+,\s*'((?:[^'\\]|\\.)*)'\s*,\s*'((?:[^'\\]|\\.)*)'"#)
        .expect("Failed to compile POPUP_ARGS_RE")
});

/// Compiles a selector known at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{css}': {e:?}"))
}

/// Collected, whitespace-normalized text of an element.
pub fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Text of an element with `<br>` tags turned into `\n`, each line normalized.
pub fn text_with_line_breaks(element: ElementRef) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }
    raw.lines()
        .map(clean_text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Rows belonging to this table only, skipping rows of nested tables.
pub fn direct_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "tbody" | "thead" | "tfoot" => {
                rows.extend(child_elements(child).filter(|el| el.value().name() == "tr"))
            }
            _ => {}
        }
    }
    rows
}

/// `td`/`th` cells directly under a row.
pub fn direct_cells<'a>(row: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    child_elements(row)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

/// Two-cell rows of a table as `(normalized_label, value_cell)` pairs.
pub fn label_value_rows<'a>(table: ElementRef<'a>) -> Vec<(String, ElementRef<'a>)> {
    direct_rows(table)
        .into_iter()
        .filter_map(|row| match direct_cells(row).as_slice() {
            [label, value] => Some((normalize_label(&element_text(*label)), *value)),
            _ => None,
        })
        .collect()
}

/// The element's `src` of its first `img` descendant.
pub fn first_image_src(element: ElementRef) -> Option<String> {
    static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
    element
        .select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// Href of the first link inside an element.
pub fn first_link(element: ElementRef) -> Option<(String, String)> {
    static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
    let link = element.select(&LINK).next()?;
    let href = link.value().attr("href")?.to_string();
    Some((element_text(link), href))
}

/// Text of the selected `<option>` of a named `<select>`, with its value.
pub fn selected_option(document: &Html, name: &str) -> Option<(String, String)> {
    let css = format!("select[name=\"{name}\"] option[selected]");
    let sel = Selector::parse(&css).ok()?;
    let option = document.select(&sel).next()?;
    let value = option.value().attr("value").unwrap_or_default().to_string();
    Some((element_text(option), value))
}

pub fn has_select(document: &Html, name: &str) -> bool {
    Selector::parse(&format!("select[name=\"{name}\"]"))
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}

/// Reads one query parameter out of a (possibly relative) link.
pub fn query_param(href: &str, key: &str) -> Option<String> {
    let base = reqwest::Url::parse("https://www.tibia.com/").ok()?;
    let url = base.join(&href.replace("&amp;", "&")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.into_owned())
}

/// Splits the javascript call behind the site's hover popups into its title
/// and parsed HTML body.
pub fn parse_popup(call: &str) -> Option<(String, Html)> {
    let caps = POPUP_ARGS_RE.captures(call)?;
    let title = caps[1].replace("\\'", "'");
    let body = caps[2].replace("\\'", "\"").replace("\\\"", "\"");
    Some((title, Html::parse_fragment(&body)))
}
