// src/extractors/guard.rs
//! Classifies a document before any field is extracted.

use scraper::Html;

use crate::utils::error::InvalidContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    /// The document says the requested resource does not exist.
    NotFound,
    /// The document is something other than the expected section.
    WrongSection,
    Valid,
}

/// Markers telling one entity's page apart from a "not found" notice and from
/// any other page of the site.
pub struct ContentGuard {
    pub entity: &'static str,
    pub not_found: fn(&Html) -> bool,
    pub valid: fn(&Html) -> bool,
}

impl ContentGuard {
    pub fn classify(&self, document: &Html) -> ContentState {
        if (self.not_found)(document) {
            ContentState::NotFound
        } else if (self.valid)(document) {
            ContentState::Valid
        } else {
            ContentState::WrongSection
        }
    }

    /// `Ok(true)` to proceed, `Ok(false)` for a not found document.
    pub fn admit(&self, document: &Html) -> Result<bool, InvalidContent> {
        match self.classify(document) {
            ContentState::Valid => Ok(true),
            ContentState::NotFound => {
                tracing::debug!("{} not found", self.entity);
                Ok(false)
            }
            ContentState::WrongSection => {
                tracing::debug!("Document is not a {} page", self.entity);
                Err(InvalidContent::WrongSection(self.entity))
            }
        }
    }
}

/// For listing pages, which are never "not found": they are just empty.
pub fn never(_: &Html) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn says_missing(doc: &Html) -> bool {
        doc.root_element().text().any(|t| t.contains("does not exist"))
    }

    fn has_marker(doc: &Html) -> bool {
        doc.root_element().text().any(|t| t.contains("Marker"))
    }

    const GUARD: ContentGuard = ContentGuard { entity: "thing", not_found: says_missing, valid: has_marker };

    #[test]
    fn test_three_states() {
        let missing = Html::parse_document("<p>This thing does not exist.</p>");
        let valid = Html::parse_document("<p>Marker</p>");
        let other = Html::parse_document("<p>Maintenance</p>");

        assert_eq!(GUARD.classify(&missing), ContentState::NotFound);
        assert_eq!(GUARD.classify(&valid), ContentState::Valid);
        assert_eq!(GUARD.classify(&other), ContentState::WrongSection);

        assert!(!GUARD.admit(&missing).unwrap());
        assert!(GUARD.admit(&valid).unwrap());
        assert!(matches!(GUARD.admit(&other), Err(InvalidContent::WrongSection("thing"))));
    }
}
