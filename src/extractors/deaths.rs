// src/extractors/deaths.rs
//! Grammar of death lines such as
//! `"Level 120 by a dragon, a fire elemental of Xzilla and Bubble. Assisted by Tschas."`
//!
//! Three sources share it: the markup of a character page (players are links),
//! plain text (players are told apart by the lack of an article) and the
//! `reason` string of the alternate JSON (players are listed as involved).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::models::character::{Death, Killer};
use crate::utils::convert::{clean_text, split_names};

static DEATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Level (\d+) by (.*)\.$").expect("Failed to compile DEATH_RE"));
static ASSISTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.\s*(?:<br\s*/?>)?\s*Assisted by ").expect("Failed to compile ASSISTED_RE")
});
static LINKED_SUMMON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?) of <a[^>]*>([^<]+)</a>$").expect("Failed to compile LINKED_SUMMON_RE"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a[^>]*>([^<]+)</a>").expect("Failed to compile LINK_RE"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Failed to compile TAG_RE"));
static TEXT_SUMMON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(an? .+?) of (.+)$").expect("Failed to compile TEXT_SUMMON_RE"));
static REASON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"by (?P<killers>[^.]+)(?:\.\s+Assisted by (?P<assists>.+))?")
        .expect("Failed to compile REASON_RE")
});

#[derive(Clone, Copy)]
enum Notation {
    Markup,
    Text,
}

/// Parses the inner HTML of a death cell from a character page.
pub fn parse_death_html(name: &str, fragment: &str, time: Option<DateTime<Utc>>) -> Option<Death> {
    parse_line(name, fragment, time, Notation::Markup)
}

/// Parses a death line without markup.
///
/// Names starting with "a"/"an" are creatures and everything else is taken as
/// a player, so unique creatures without an article are misread as players.
pub fn parse_death_text(name: &str, line: &str, time: Option<DateTime<Utc>>) -> Option<Death> {
    parse_line(name, line, time, Notation::Text)
}

fn parse_line(name: &str, raw: &str, time: Option<DateTime<Utc>>, notation: Notation) -> Option<Death> {
    let line = clean_text(raw);
    let Some(caps) = DEATH_RE.captures(&line) else {
        warn!("Skipping death of {} without a level: {}", name, line);
        return None;
    };
    let level: u32 = caps[1].parse().ok().filter(|level| *level > 0)?;
    let clause = caps[2].trim();

    let (killers_clause, assists_clause) = match ASSISTED_RE.find(clause) {
        Some(m) => (&clause[..m.start()], Some(&clause[m.end()..])),
        None => (clause, None),
    };

    let killers = split_names(Some(killers_clause))
        .unwrap_or_default()
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| parse_killer(k, notation))
        .collect();
    let assists = split_names(assists_clause)
        .unwrap_or_default()
        .iter()
        .map(|a| strip_tags(a))
        .filter(|a| !a.is_empty())
        .map(Killer::player)
        .collect();

    Some(Death { name: name.to_string(), level, killers, assists, time })
}

fn strip_tags(raw: &str) -> String {
    clean_text(&TAG_RE.replace_all(raw, ""))
}

fn parse_killer(raw: &str, notation: Notation) -> Killer {
    match notation {
        Notation::Markup => {
            if let Some(caps) = LINKED_SUMMON_RE.captures(raw) {
                return Killer::summon(clean_text(&caps[2]), strip_tags(&caps[1]));
            }
            match LINK_RE.captures(raw) {
                Some(caps) => Killer::player(clean_text(&caps[1])),
                None => Killer::creature(strip_tags(raw)),
            }
        }
        Notation::Text => {
            if let Some(caps) = TEXT_SUMMON_RE.captures(raw) {
                let owner = &caps[2];
                if !has_article(owner) {
                    return Killer::summon(owner, &caps[1]);
                }
            }
            if has_article(raw) {
                Killer::creature(raw)
            } else {
                Killer::player(raw)
            }
        }
    }
}

fn has_article(name: &str) -> bool {
    ["a ", "an ", "the "].iter().any(|article| name.starts_with(article))
}

/// Parses the `reason` of a death from the alternate JSON, where `involved`
/// lists every character taking part.
pub fn parse_death_reason(
    name: &str,
    level: u32,
    reason: &str,
    involved: &[String],
    time: Option<DateTime<Utc>>,
) -> Death {
    let caps = REASON_RE.captures(reason);
    let group = |key: &str| caps.as_ref().and_then(|c| c.name(key)).map(|m| m.as_str().trim());

    let killers = split_names(group("killers"))
        .unwrap_or_default()
        .into_iter()
        .map(|killer| {
            let summoner = involved.iter().find(|i| killer.contains(&format!("of {i}")));
            match summoner {
                Some(owner) => Killer::summon(owner.clone(), killer.replace(&format!(" of {owner}"), "")),
                None if involved.contains(&killer) => Killer::player(killer),
                None => Killer::creature(killer),
            }
        })
        .collect();
    let assists = split_names(group("assists").map(|a| a.trim_end_matches('.')))
        .unwrap_or_default()
        .into_iter()
        .map(|assist| Killer { player: involved.contains(&assist), name: assist, summon: None })
        .collect();

    Death { name: name.to_string(), level, killers, assists, time }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creatures_only() {
        let death = parse_death_text("Tschas", "Level 250 by a dragon and a fire elemental.", None).unwrap();
        assert_eq!(death.level, 250);
        assert_eq!(death.killers, vec![Killer::creature("a dragon"), Killer::creature("a fire elemental")]);
        assert!(death.assists.is_empty());
        assert!(!death.by_player());
    }

    #[test]
    fn test_player_with_assist() {
        let death = parse_death_text("Tschas", "Level 100 by Player1. Assisted by Player2.", None).unwrap();
        assert_eq!(death.killers, vec![Killer::player("Player1")]);
        assert_eq!(death.assists, vec![Killer::player("Player2")]);
        assert!(death.by_player());
    }

    #[test]
    fn test_markup_line() {
        let html = r#"Level 316 by <a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Xzilla">Xzilla</a>, a fire elemental of <a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Bubble">Bubble</a> and Ferumbras.<br>Assisted by <a href="https://www.tibia.com/community/?subtopic=characters&amp;name=Eternal&#160;Oblivion">Eternal&#160;Oblivion</a>."#;
        let death = parse_death_html("Tschas", html, None).unwrap();
        assert_eq!(death.level, 316);
        assert_eq!(
            death.killers,
            vec![
                Killer::player("Xzilla"),
                Killer::summon("Bubble", "a fire elemental"),
                Killer::creature("Ferumbras"),
            ]
        );
        assert_eq!(death.assists, vec![Killer::player("Eternal Oblivion")]);
    }

    #[test]
    fn test_text_summon() {
        let death = parse_death_text("Tschas", "Level 80 by a paladin familiar of Galarzaa.", None).unwrap();
        assert_eq!(death.killers, vec![Killer::summon("Galarzaa", "a paladin familiar")]);
    }

    #[test]
    fn test_missing_level_is_skipped() {
        assert!(parse_death_text("Tschas", "Died by a dragon.", None).is_none());
        assert!(parse_death_html("Tschas", "Level  by <a href='x'>Xzilla</a>.", None).is_none());
    }

    #[test]
    fn test_reason_with_involved() {
        let involved = vec!["Xzilla".to_string(), "Bubble".to_string(), "Tschas".to_string()];
        let death = parse_death_reason(
            "Galarzaa",
            200,
            "Killed at Level 200 by Xzilla, a fire elemental of Bubble and a dragon. Assisted by Tschas.",
            &involved,
            None,
        );
        assert_eq!(
            death.killers,
            vec![
                Killer::player("Xzilla"),
                Killer::summon("Bubble", "a fire elemental"),
                Killer::creature("a dragon"),
            ]
        );
        assert_eq!(death.assists, vec![Killer::player("Tschas")]);
    }
}
