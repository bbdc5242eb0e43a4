// src/tibia/urls.rs
//! Canonical Tibia.com URL builders.

use reqwest::Url;

pub const TIBIA_BASE_URL: &str = "https://www.tibia.com";

/// Builds `https://www.tibia.com/<section>/?subtopic=<subtopic>&k=v...` with
/// form-encoded values, keeping parameter order.
pub fn get_tibia_url(section: &str, subtopic: Option<&str>, params: &[(&str, String)]) -> String {
    let base = format!("{TIBIA_BASE_URL}/{section}/");
    let pairs = subtopic
        .map(|s| ("subtopic", s.to_string()))
        .into_iter()
        .chain(params.iter().map(|(k, v)| (*k, v.clone())));
    match Url::parse_with_params(&base, pairs) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::warn!("Could not build URL for section {}: {}", section, e);
            base
        }
    }
}

/// Endpoint serving the item, mount and outfit pages of an auction after the first.
pub fn get_auction_page_items_url(auction_id: u32, item_type: u8, page: u32) -> String {
    format!(
        "{TIBIA_BASE_URL}/websiteservices/handle_charactertrades.php?auctionid={auction_id}&type={item_type}&currentpage={page}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tibia_url() {
        let url = get_tibia_url(
            "community",
            Some("houses"),
            &[("page", "view".into()), ("houseid", 55302.to_string()), ("world", "Gladera".into())],
        );
        assert_eq!(
            url,
            "https://www.tibia.com/community/?subtopic=houses&page=view&houseid=55302&world=Gladera"
        );
    }

    #[test]
    fn test_values_are_form_encoded() {
        let url = get_tibia_url("community", Some("characters"), &[("name", "Galarzaa Fidera".into())]);
        assert_eq!(url, "https://www.tibia.com/community/?subtopic=characters&name=Galarzaa+Fidera");
    }

    #[test]
    fn test_page_items_url() {
        assert_eq!(
            get_auction_page_items_url(325058, 2, 3),
            "https://www.tibia.com/websiteservices/handle_charactertrades.php?auctionid=325058&type=2&currentpage=3"
        );
    }
}
