//! Canonical records produced by the normalizer and returned by the client.

use crate::verse_index::VerseAddress;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a chapter was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevelationType {
    /// Revealed in Mecca.
    Meccan,
    /// Revealed in Medina.
    Medinan,
}

impl fmt::Display for RevelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meccan => f.write_str("Meccan"),
            Self::Medinan => f.write_str("Medinan"),
        }
    }
}

/// Reference data describing one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMeta {
    /// Chapter number, `1..=114`.
    pub number: u16,
    /// Name in the primary script.
    pub name: String,
    /// Transliterated name.
    pub english_name: String,
    /// Translated meaning of the name.
    pub english_name_translation: String,
    /// Place of revelation.
    pub revelation_type: RevelationType,
    /// Verse count.
    pub number_of_ayahs: u16,
}

/// Short chapter reference carried by each verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRef {
    /// Chapter number.
    pub number: u16,
    /// Name in the primary script.
    pub name: String,
    /// Transliterated name.
    pub english_name: String,
}

/// A verse in canonical shape, with its translations keyed by edition id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// Global verse number, `1..=6236`.
    pub number: u16,
    /// Position inside the chapter.
    pub number_in_surah: u16,
    /// Text of the primary edition.
    pub text: String,
    /// Translation text per requested edition; empty when the upstream did
    /// not return that edition.
    pub translations: BTreeMap<String, String>,
    /// Chapter this verse belongs to.
    pub surah: ChapterRef,
}

impl Verse {
    /// Chapter/verse address of this verse.
    #[must_use]
    pub const fn address(&self) -> VerseAddress {
        VerseAddress::new(self.surah.number, self.number_in_surah)
    }

    /// Translation text for an edition, empty when absent.
    #[must_use]
    pub fn translation(&self, edition: &str) -> &str {
        self.translations.get(edition).map_or("", String::as_str)
    }
}

/// A chapter with its verses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter reference data.
    pub meta: ChapterMeta,
    /// Verses in order.
    pub verses: Vec<Verse>,
}

/// One of the thirty parts of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Juz {
    /// Juz number, `1..=30`.
    pub number: u16,
    /// Verses in order, across chapter boundaries.
    pub verses: Vec<Verse>,
}

/// A named rendering of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    /// Stable identifier such as `en.asad`.
    pub identifier: String,
    /// Language code.
    pub language: String,
    /// Native name.
    pub name: String,
    /// Name in Latin script.
    pub english_name: String,
    /// `text` or `audio`.
    pub format: String,
    /// `quran`, `translation`, `tafsir`, `versebyverse`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// `ltr` or `rtl` when known.
    #[serde(default)]
    pub direction: Option<String>,
}

/// Search outcome: total match count reported upstream plus the matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total matches reported upstream.
    pub count: usize,
    /// Matching verses.
    pub matches: Vec<Verse>,
}

/// Per-item outcome of a batch verse retrieval.
#[derive(Debug)]
pub struct BatchItem {
    /// Requested address.
    pub address: VerseAddress,
    /// The verse, or why it could not be retrieved.
    pub result: Result<Verse>,
}

impl BatchItem {
    /// Whether this item was retrieved.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_verse() -> Verse {
        let mut translations = BTreeMap::new();
        translations.insert("en.asad".to_string(), "In the name of God".to_string());
        Verse {
            number: 1,
            number_in_surah: 1,
            text: "بسم الله الرحمن الرحيم".to_string(),
            translations,
            surah: ChapterRef {
                number: 1,
                name: "الفاتحة".to_string(),
                english_name: "Al-Faatiha".to_string(),
            },
        }
    }

    #[test]
    fn test_translation_lookup_defaults_to_empty() {
        let verse = sample_verse();
        assert_eq!(verse.translation("en.asad"), "In the name of God");
        assert_eq!(verse.translation("fa.fooladvand"), "");
        assert_eq!(verse.address(), VerseAddress::new(1, 1));
    }

    #[test]
    fn test_verse_serializes_with_upstream_field_names() {
        let json = serde_json::to_value(sample_verse()).unwrap_or_default();
        assert_eq!(json["numberInSurah"], 1);
        assert_eq!(json["surah"]["englishName"], "Al-Faatiha");
    }

    #[test]
    fn test_edition_kind_maps_type_field() {
        let raw = r#"{"identifier":"en.asad","language":"en","name":"Asad",
            "englishName":"Muhammad Asad","format":"text","type":"translation",
            "direction":"ltr"}"#;
        let edition: Edition = serde_json::from_str(raw).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(edition.kind, "translation");
        assert_eq!(edition.direction.as_deref(), Some("ltr"));
    }
}
