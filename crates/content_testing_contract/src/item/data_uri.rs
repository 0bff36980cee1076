//! Data URIs addressing a specific item, language, and version.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{ItemId, Language, ResourceRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Parsed `[scheme://database/]{id}[?lang=xx&ver=N]` reference.
pub struct DataUri {
    /// Database named in the authority segment, if any.
    pub database: Option<String>,
    /// Referenced item.
    pub id: ItemId,
    /// Referenced language, if any.
    pub language: Option<Language>,
    /// Referenced version number, if any.
    pub version: Option<u32>,
}

impl DataUri {
    /// Parses a data URI, returning `None` for blank or malformed input.
    ///
    /// Unknown query keys are ignored; a `ver` value that is not a number makes the whole URI
    /// malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (database, rest) = match trimmed.split_once("://") {
            Some((_scheme, authority_and_path)) => {
                let (database, path) = authority_and_path.split_once('/')?;
                let database = (!database.is_empty()).then(|| database.to_string());
                (database, path)
            }
            None => (None, trimmed),
        };

        let (id_part, query) = match rest.split_once('?') {
            Some((id_part, query)) => (id_part, Some(query)),
            None => (rest, None),
        };
        if id_part.trim().is_empty() {
            return None;
        }

        let mut language = None;
        let mut version = None;
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key.trim() {
                "lang" | "la" if !value.trim().is_empty() => language = Some(Language::new(value)),
                "ver" | "vs" => version = Some(value.trim().parse::<u32>().ok()?),
                _ => {}
            }
        }

        Some(Self {
            database,
            id: ItemId::new(id_part),
            language,
            version,
        })
    }

    /// Returns `true` when this URI names the same item and language as `reference`.
    ///
    /// A URI without a language never matches.
    pub fn is_same_item_and_language(&self, reference: &ResourceRef) -> bool {
        self.id == reference.id
            && self
                .language
                .as_ref()
                .is_some_and(|language| language.matches(&reference.language))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "sitecore://{database}/")?;
        }
        write!(f, "{}", self.id)?;
        let mut sep = '?';
        if let Some(language) = &self.language {
            write!(f, "{sep}lang={language}")?;
            sep = '&';
        }
        if let Some(version) = self.version {
            write!(f, "{sep}ver={version}")?;
        }
        Ok(())
    }
}
