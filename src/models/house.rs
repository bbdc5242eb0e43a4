// src/models/house.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::character::Character;
use crate::models::enums::{HouseStatus, HouseType, Sex};
use crate::tibia::urls::get_tibia_url;

/// A house or guildhall's information page.
///
/// Rental fields (`owner`, `paid_until`, transfer) are only set for rented
/// houses; bid fields only for auctioned ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct House {
    pub id: u32,
    pub name: String,
    pub world: String,
    pub town: Option<String>,
    pub image_url: Option<String>,
    pub house_type: HouseType,
    pub beds: u32,
    /// Square meters.
    pub size: u32,
    /// Monthly rent in gold.
    pub rent: i64,
    pub status: HouseStatus,
    pub owner: Option<String>,
    pub owner_sex: Option<Sex>,
    pub paid_until: Option<DateTime<Utc>>,
    pub transfer_date: Option<DateTime<Utc>>,
    pub transferee: Option<String>,
    pub transfer_price: Option<i64>,
    pub transfer_accepted: bool,
    pub highest_bid: Option<i64>,
    pub highest_bidder: Option<String>,
    pub auction_end: Option<DateTime<Utc>>,
}

impl House {
    pub fn get_url(house_id: u32, world: &str) -> String {
        get_tibia_url(
            "community",
            Some("houses"),
            &[("page", "view".into()), ("houseid", house_id.to_string()), ("world", world.to_string())],
        )
    }

    /// URL of a world's house list for one town.
    pub fn get_list_url(world: &str, town: &str, house_type: &HouseType, status: Option<&HouseStatus>) -> String {
        let kind = match house_type {
            HouseType::Guildhall => "guildhalls",
            _ => "houses",
        };
        let mut params = vec![("world", world.to_string()), ("town", town.to_string()), ("type", kind.to_string())];
        if let Some(status) = status {
            params.push(("state", status.as_str().to_string()));
        }
        get_tibia_url("community", Some("houses"), &params)
    }

    pub fn url(&self) -> String {
        Self::get_url(self.id, &self.world)
    }

    pub fn owner_url(&self) -> Option<String> {
        self.owner.as_deref().map(Character::get_url)
    }

    pub fn transferee_url(&self) -> Option<String> {
        self.transferee.as_deref().map(Character::get_url)
    }

    pub fn highest_bidder_url(&self) -> Option<String> {
        self.highest_bidder.as_deref().map(Character::get_url)
    }
}

/// A house row of a town's house list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedHouse {
    pub id: u32,
    pub name: String,
    pub world: String,
    pub town: String,
    pub house_type: HouseType,
    pub size: u32,
    pub rent: i64,
    pub status: HouseStatus,
    /// Only for auctioned houses with a bid.
    pub highest_bid: Option<i64>,
    pub time_left: Option<Duration>,
}

impl ListedHouse {
    pub fn url(&self) -> String {
        House::get_url(self.id, &self.world)
    }
}
