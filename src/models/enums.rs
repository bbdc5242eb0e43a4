// src/models/enums.rs
//! Enumerations of the site's fixed vocabularies.
//!
//! Every enumeration keeps an `Unknown(raw)` case so a label the site adds
//! later is carried through instead of failing the whole document.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::utils::convert::{clean_text, normalize_key};

fn lookup_key(raw: &str) -> String {
    normalize_key(&raw.replace('_', " "))
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A label this crate does not know, kept verbatim.
            Unknown(String),
        }

        impl $name {
            /// Case and whitespace insensitive lookup; unmatched labels become `Unknown`.
            pub fn from_label(raw: &str) -> Self {
                let key = lookup_key(raw);
                $(
                    if key == lookup_key($label) {
                        return $name::$variant;
                    }
                )+
                $name::Unknown(clean_text(raw))
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                $name::from_label(raw)
            }
        }
    };
}

/// Like `labelled_enum!`, for vocabularies the site also addresses by a numeric id
/// in query strings and form values.
macro_rules! coded_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $id:literal => $label:literal),+ $(,)? }) => {
        labelled_enum!($(#[$meta])* $name { $($variant => $label),+ });

        impl $name {
            pub fn id(&self) -> Option<u32> {
                match self {
                    $($name::$variant => Some($id),)+
                    $name::Unknown(_) => None,
                }
            }

            pub fn from_id(id: u32) -> Self {
                match id {
                    $($id => $name::$variant,)+
                    other => $name::Unknown(other.to_string()),
                }
            }
        }
    };
}

labelled_enum!(Vocation {
    NoVocation => "None",
    Druid => "Druid",
    Knight => "Knight",
    Paladin => "Paladin",
    Sorcerer => "Sorcerer",
    ElderDruid => "Elder Druid",
    EliteKnight => "Elite Knight",
    RoyalPaladin => "Royal Paladin",
    MasterSorcerer => "Master Sorcerer",
});

labelled_enum!(Sex {
    Male => "male",
    Female => "female",
});

labelled_enum!(AccountStatus {
    FreeAccount => "Free Account",
    PremiumAccount => "Premium Account",
});

labelled_enum!(PvpType {
    OpenPvp => "Open PvP",
    OptionalPvp => "Optional PvP",
    HardcorePvp => "Hardcore PvP",
    RetroOpenPvp => "Retro Open PvP",
    RetroHardcorePvp => "Retro Hardcore PvP",
});

labelled_enum!(WorldLocation {
    Europe => "Europe",
    NorthAmerica => "North America",
    SouthAmerica => "South America",
});

labelled_enum!(TransferType {
    Regular => "regular",
    Locked => "locked",
    Blocked => "blocked",
});

labelled_enum!(TournamentWorldType {
    Regular => "Regular",
    RestrictedStore => "Restricted Store",
});

labelled_enum!(
    /// Whether the displayed bid is the seller's minimum or an actual bid.
    BidType {
        Minimum => "Minimum Bid",
        Current => "Current Bid",
        Winning => "Winning Bid",
    }
);

labelled_enum!(BazaarType {
    Current => "current",
    History => "history",
});

labelled_enum!(HouseType {
    House => "house",
    Guildhall => "guildhall",
});

labelled_enum!(HouseStatus {
    Rented => "rented",
    Auctioned => "auctioned",
});

labelled_enum!(
    /// Taken from the news icon file name, e.g. `newsicon_development_big.gif`.
    NewsCategory {
        Cipsoft => "cipsoft",
        Community => "community",
        Development => "development",
        Support => "support",
        TechnicalIssues => "technical",
    }
);

labelled_enum!(NewsType {
    NewsTicker => "News Ticker",
    FeaturedArticle => "Featured Article",
    News => "News",
});

coded_enum!(HighscoresCategory {
    Achievements = 1 => "Achievements",
    Axe = 2 => "Axe Fighting",
    CharmPoints = 3 => "Charm Points",
    Club = 4 => "Club Fighting",
    Distance = 5 => "Distance Fighting",
    Experience = 6 => "Experience Points",
    Fishing = 7 => "Fishing",
    Fist = 8 => "Fist Fighting",
    GoshnarsTaint = 9 => "Goshnar's Taint",
    Loyalty = 10 => "Loyalty Points",
    MagicLevel = 11 => "Magic Level",
    Shielding = 12 => "Shielding",
    Sword = 13 => "Sword Fighting",
    Drome = 14 => "Drome Score",
});

coded_enum!(VocationFilter {
    All = 0 => "All",
    Knights = 1 => "Knights",
    Paladins = 2 => "Paladins",
    Sorcerers = 3 => "Sorcerers",
    Druids = 4 => "Druids",
});

coded_enum!(PvpTypeFilter {
    OpenPvp = 0 => "Open PvP",
    OptionalPvp = 1 => "Optional PvP",
    HardcorePvp = 2 => "Hardcore PvP",
    RetroOpenPvp = 3 => "Retro Open PvP",
    RetroHardcorePvp = 4 => "Retro Hardcore PvP",
});

coded_enum!(BattlEyeTypeFilter {
    InitiallyProtected = 1 => "Initially Protected",
    Protected = 2 => "Protected",
    Unprotected = 3 => "Unprotected",
});

coded_enum!(VocationAuctionFilter {
    NoVocation = 1 => "None",
    Druid = 2 => "Druid",
    Knight = 3 => "Knight",
    Paladin = 4 => "Paladin",
    Sorcerer = 5 => "Sorcerer",
});

coded_enum!(SkillFilter {
    MagicLevel = 1 => "Magic Level",
    Shielding = 6 => "Shielding",
    Distance = 7 => "Distance Fighting",
    Sword = 8 => "Sword Fighting",
    Club = 9 => "Club Fighting",
    Axe = 10 => "Axe Fighting",
    Fist = 11 => "Fist Fighting",
    Fishing = 13 => "Fishing",
});

coded_enum!(AuctionOrderBy {
    Bid = 100 => "Bid",
    EndDate = 101 => "End Date",
    Level = 102 => "Level",
    StartDate = 103 => "Start Date",
});

coded_enum!(AuctionOrder {
    HighestLatest = 0 => "Highest / Latest",
    LowestEarliest = 1 => "Lowest / Earliest",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_case_and_space_insensitive() {
        assert_eq!(Vocation::from_label("royal  paladin"), Vocation::RoyalPaladin);
        assert_eq!(Sex::from_label("Female"), Sex::Female);
        assert_eq!(PvpType::from_label("retro open pvp"), PvpType::RetroOpenPvp);
        assert_eq!(Vocation::from_label("None"), Vocation::NoVocation);
    }

    #[test]
    fn test_unknown_label_is_preserved() {
        let vocation = Vocation::from_label("Exalted  Monk");
        assert!(vocation.is_unknown());
        assert_eq!(vocation.as_str(), "Exalted Monk");
        assert_eq!(serde_json::to_string(&vocation).unwrap(), "\"Exalted Monk\"");
    }

    #[test]
    fn test_coded_enum_ids() {
        assert_eq!(HighscoresCategory::MagicLevel.id(), Some(11));
        assert_eq!(HighscoresCategory::from_id(6), HighscoresCategory::Experience);
        assert_eq!(HighscoresCategory::from_label("Loyalty Points"), HighscoresCategory::Loyalty);
        assert_eq!(VocationFilter::from_id(2), VocationFilter::Paladins);
        assert!(VocationFilter::from_id(42).is_unknown());
        assert_eq!(VocationFilter::from_id(42).id(), None);
    }

    #[test]
    fn test_underscored_labels() {
        assert_eq!(NewsCategory::from_label("technical"), NewsCategory::TechnicalIssues);
        assert_eq!(NewsType::from_label("news_ticker"), NewsType::NewsTicker);
    }
}
