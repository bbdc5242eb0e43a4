// src/models/news.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::enums::{NewsCategory, NewsType};
use crate::tibia::urls::get_tibia_url;

/// A news article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct News {
    pub id: u32,
    pub title: String,
    pub category: NewsCategory,
    pub date: NaiveDate,
    /// Raw HTML body of the article.
    pub content: String,
    pub thread_id: Option<u32>,
}

impl News {
    pub fn get_url(news_id: u32) -> String {
        get_tibia_url("news", Some("newsarchive"), &[("id", news_id.to_string())])
    }

    /// URL of the news archive search form.
    pub fn get_list_url() -> String {
        get_tibia_url("news", Some("newsarchive"), &[])
    }

    pub fn url(&self) -> String {
        Self::get_url(self.id)
    }

    pub fn thread_url(&self) -> Option<String> {
        self.thread_id
            .map(|id| get_tibia_url("forum", None, &[("action", "thread".into()), ("threadid", id.to_string())]))
    }
}

/// A news entry in the archive search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedNews {
    pub id: u32,
    pub title: String,
    pub category: NewsCategory,
    pub news_type: NewsType,
    pub date: NaiveDate,
}

impl ListedNews {
    pub fn url(&self) -> String {
        News::get_url(self.id)
    }
}
