//! Reshape upstream payloads into the canonical [`Verse`]/[`ChapterMeta`] shape.
//!
//! The content API answers the same logical request in two shapes: a single
//! edition object when one edition is requested, or an array of per-edition
//! objects when several are. [`EditionPayload`] decides which one it is from
//! the JSON structure, once, at this boundary. Nothing downstream inspects
//! the raw shape again.
//!
//! Multi-edition arrays are aligned by position only: verse `i` of every
//! translation edition is paired with verse `i` of the primary edition. A
//! differing `numberInSurah` is logged, not corrected.

use crate::types::{
    Chapter, ChapterMeta, ChapterRef, Edition, Juz, RevelationType, SearchResults, Verse,
};
use crate::verse_index::{TOTAL_CHAPTERS, verse_count};
use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Upstream data decoded as either one edition or several in parallel.
#[derive(Debug, Clone, PartialEq)]
pub enum EditionPayload<T> {
    /// A keyed object describing one edition.
    Single(T),
    /// An ordered list of per-edition objects.
    Multi(Vec<T>),
}

impl<T: DeserializeOwned> EditionPayload<T> {
    /// Decode from the `data` field of an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] when `data` is neither an array nor
    /// an object, or an element does not have the expected fields.
    pub fn decode(data: &Value) -> Result<Self> {
        match data {
            Value::Array(items) => items
                .iter()
                .map(T::deserialize)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Self::Multi)
                .map_err(|e| Error::InvalidResponse(format!("malformed edition entry: {e}"))),
            Value::Object(_) => T::deserialize(data)
                .map(Self::Single)
                .map_err(|e| Error::InvalidResponse(format!("malformed edition object: {e}"))),
            other => Err(Error::InvalidResponse(format!(
                "expected edition object or list, got {}",
                json_kind(other)
            ))),
        }
    }
}

impl<T> EditionPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Single(item) => vec![item],
            Self::Multi(items) => items,
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawEditionRef {
    #[serde(default)]
    identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSurah {
    number: u16,
    #[serde(default)]
    name: String,
    #[serde(default)]
    english_name: String,
    #[serde(default)]
    english_name_translation: String,
    #[serde(default)]
    revelation_type: Option<String>,
    #[serde(default)]
    number_of_ayahs: Option<u16>,
}

impl RawSurah {
    fn chapter_ref(&self) -> ChapterRef {
        ChapterRef {
            number: self.number,
            name: self.name.clone(),
            english_name: self.english_name.clone(),
        }
    }

    fn meta(&self, fallback_count: usize) -> Result<ChapterMeta> {
        let revelation_type = parse_revelation(self.revelation_type.as_deref())?;
        let number_of_ayahs = match self.number_of_ayahs {
            Some(count) => count,
            None => u16::try_from(fallback_count).map_err(|_| {
                Error::InvalidResponse(format!("chapter {} has too many verses", self.number))
            })?,
        };
        Ok(ChapterMeta {
            number: self.number,
            name: self.name.clone(),
            english_name: self.english_name.clone(),
            english_name_translation: self.english_name_translation.clone(),
            revelation_type,
            number_of_ayahs,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAyah {
    number: u16,
    #[serde(default)]
    text: String,
    number_in_surah: u16,
    #[serde(default)]
    surah: Option<RawSurah>,
    #[serde(default)]
    edition: Option<RawEditionRef>,
}

impl RawAyah {
    fn identifier(&self) -> &str {
        self.edition.as_ref().map_or("", |e| e.identifier.as_str())
    }

    fn chapter_ref(&self) -> Result<ChapterRef> {
        self.surah
            .as_ref()
            .map(RawSurah::chapter_ref)
            .ok_or_else(|| {
                Error::InvalidResponse(format!("verse {} has no chapter reference", self.number))
            })
    }

    fn into_verse(self, surah: ChapterRef, translations: BTreeMap<String, String>) -> Verse {
        Verse {
            number: self.number,
            number_in_surah: self.number_in_surah,
            text: self.text,
            translations,
            surah,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawChapterEdition {
    #[serde(flatten)]
    surah: RawSurah,
    #[serde(default)]
    ayahs: Vec<RawAyah>,
    #[serde(default)]
    edition: RawEditionRef,
}

#[derive(Debug, Clone, Deserialize)]
struct RawJuz {
    number: u16,
    #[serde(default)]
    ayahs: Vec<RawAyah>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSearch {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    matches: Vec<RawAyah>,
}

fn parse_revelation(raw: Option<&str>) -> Result<RevelationType> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("meccan") => Ok(RevelationType::Meccan),
        Some("medinan") => Ok(RevelationType::Medinan),
        Some(other) => Err(Error::InvalidResponse(format!(
            "unknown revelation type {other:?}"
        ))),
        None => Err(Error::InvalidResponse("missing revelation type".into())),
    }
}

fn decode<T: DeserializeOwned>(data: &Value, what: &str) -> Result<T> {
    T::deserialize(data).map_err(|e| Error::InvalidResponse(format!("malformed {what}: {e}")))
}

/// Index of the primary edition, or the first edition when it is absent.
fn primary_position<T>(editions: &[T], primary: &str, id: impl Fn(&T) -> &str) -> usize {
    editions
        .iter()
        .position(|edition| id(edition) == primary)
        .unwrap_or(0)
}

/// Normalize a chapter response into a [`Chapter`].
///
/// `primary` identifies the edition whose text becomes [`Verse::text`];
/// every id in `translations` gets an entry in [`Verse::translations`],
/// empty when the response lacks that edition or is shorter than the primary.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the payload has no editions or
/// cannot be decoded.
pub fn normalize_chapter(data: &Value, primary: &str, translations: &[String]) -> Result<Chapter> {
    let editions = EditionPayload::<RawChapterEdition>::decode(data)?.into_vec();
    if editions.is_empty() {
        return Err(Error::InvalidResponse("chapter response has no editions".into()));
    }

    let primary_idx = primary_position(&editions, primary, |e| e.edition.identifier.as_str());
    let primary_edition = &editions[primary_idx];
    let meta = primary_edition.surah.meta(primary_edition.ayahs.len())?;
    let chapter_ref = primary_edition.surah.chapter_ref();

    let lookup: Vec<(&String, Option<&RawChapterEdition>)> = translations
        .iter()
        .filter(|id| id.as_str() != primary)
        .map(|id| {
            (
                id,
                editions.iter().find(|e| &e.edition.identifier == id),
            )
        })
        .collect();

    let verses = primary_edition
        .ayahs
        .iter()
        .enumerate()
        .map(|(idx, ayah)| {
            let texts = lookup
                .iter()
                .map(|(id, edition)| {
                    let entry = edition.and_then(|e| e.ayahs.get(idx));
                    if let Some(entry) = entry {
                        check_alignment(ayah, entry, id);
                    }
                    ((*id).clone(), entry.map(|e| e.text.clone()).unwrap_or_default())
                })
                .collect();
            ayah.clone().into_verse(chapter_ref.clone(), texts)
        })
        .collect();

    Ok(Chapter { meta, verses })
}

/// Normalize a single-verse response into a [`Verse`].
///
/// Same edition rules as [`normalize_chapter`].
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the payload has no editions, or the
/// primary verse has no chapter reference.
pub fn normalize_verse(data: &Value, primary: &str, translations: &[String]) -> Result<Verse> {
    let editions = EditionPayload::<RawAyah>::decode(data)?.into_vec();
    if editions.is_empty() {
        return Err(Error::InvalidResponse("verse response has no editions".into()));
    }

    let primary_idx = primary_position(&editions, primary, RawAyah::identifier);
    let primary_ayah = &editions[primary_idx];
    let chapter_ref = primary_ayah.chapter_ref()?;

    let texts = translations
        .iter()
        .filter(|id| id.as_str() != primary)
        .map(|id| {
            let entry = editions.iter().find(|e| e.identifier() == id.as_str());
            if let Some(entry) = entry {
                check_alignment(primary_ayah, entry, id);
            }
            (id.clone(), entry.map(|e| e.text.clone()).unwrap_or_default())
        })
        .collect();

    Ok(primary_ayah.clone().into_verse(chapter_ref, texts))
}

fn check_alignment(primary: &RawAyah, other: &RawAyah, edition: &str) {
    if primary.number_in_surah != other.number_in_surah {
        warn!(
            "edition {edition} verse {} paired with primary verse {}",
            other.number_in_surah, primary.number_in_surah
        );
    }
}

/// Normalize the chapter listing.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] unless the listing holds exactly the 114
/// chapters in order.
pub fn normalize_chapter_list(data: &Value) -> Result<Vec<ChapterMeta>> {
    let raw: Vec<RawSurah> = decode(data, "chapter list")?;
    if raw.len() != usize::from(TOTAL_CHAPTERS) {
        return Err(Error::InvalidResponse(format!(
            "expected {TOTAL_CHAPTERS} chapters, got {}",
            raw.len()
        )));
    }

    raw.iter()
        .zip(1u16..)
        .map(|(surah, expected)| {
            if surah.number != expected {
                return Err(Error::InvalidResponse(format!(
                    "chapter {} listed at position {expected}",
                    surah.number
                )));
            }
            surah.meta(usize::from(verse_count(surah.number).unwrap_or(0)))
        })
        .collect()
}

/// Normalize a search response.
///
/// Each match keeps its own text as [`Verse::text`]; translations are empty.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the payload or a match is malformed.
pub fn normalize_search(data: &Value) -> Result<SearchResults> {
    let raw: RawSearch = decode(data, "search result")?;
    let matches = raw
        .matches
        .into_iter()
        .map(|ayah| {
            let chapter_ref = ayah.chapter_ref()?;
            Ok(ayah.into_verse(chapter_ref, BTreeMap::new()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResults {
        count: raw.count.max(matches.len()),
        matches,
    })
}

/// Normalize a juz response.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the payload or a verse is malformed.
pub fn normalize_juz(data: &Value) -> Result<Juz> {
    let raw: RawJuz = decode(data, "juz")?;
    let verses = raw
        .ayahs
        .into_iter()
        .map(|ayah| {
            let chapter_ref = ayah.chapter_ref()?;
            Ok(ayah.into_verse(chapter_ref, BTreeMap::new()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Juz {
        number: raw.number,
        verses,
    })
}

/// Decode the editions listing.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the payload is malformed.
pub fn normalize_editions(data: &Value) -> Result<Vec<Edition>> {
    decode(data, "edition list")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chapter_edition(identifier: &str, prefix: &str, verses: u16) -> Value {
        let ayahs: Vec<Value> = (1..=verses)
            .map(|n| {
                json!({
                    "number": n,
                    "text": format!("{prefix} {n}"),
                    "numberInSurah": n,
                })
            })
            .collect();
        json!({
            "number": 1,
            "name": "سُورَةُ ٱلْفَاتِحَةِ",
            "englishName": "Al-Faatiha",
            "englishNameTranslation": "The Opening",
            "revelationType": "Meccan",
            "numberOfAyahs": verses,
            "ayahs": ayahs,
            "edition": { "identifier": identifier },
        })
    }

    fn tr(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_two_edition_chapter_pairs_every_verse() {
        let data = json!([
            chapter_edition("quran-uthmani", "ar", 7),
            chapter_edition("en.asad", "en", 7),
        ]);

        let chapter = normalize_chapter(&data, "quran-uthmani", &tr(&["en.asad"])).unwrap();

        assert_eq!(chapter.meta.number_of_ayahs, 7);
        assert_eq!(chapter.verses.len(), 7);
        for (idx, verse) in chapter.verses.iter().enumerate() {
            let n = idx + 1;
            assert_eq!(verse.text, format!("ar {n}"));
            assert_eq!(verse.translation("en.asad"), format!("en {n}"));
            assert!(!verse.translation("en.asad").is_empty());
            assert_eq!(verse.surah.english_name, "Al-Faatiha");
        }
    }

    #[test]
    fn test_absent_translation_edition_yields_empty_text() {
        let data = json!([chapter_edition("quran-uthmani", "ar", 7)]);

        let chapter = normalize_chapter(&data, "quran-uthmani", &tr(&["en.asad"])).unwrap();

        assert_eq!(chapter.verses.len(), 7);
        for verse in &chapter.verses {
            assert_eq!(verse.translations.get("en.asad").map(String::as_str), Some(""));
        }
    }

    #[test]
    fn test_single_edition_object_is_accepted() {
        let data = chapter_edition("quran-uthmani", "ar", 7);

        let chapter = normalize_chapter(&data, "quran-uthmani", &[]).unwrap();

        assert_eq!(chapter.verses.len(), 7);
        assert!(chapter.verses.iter().all(|v| v.translations.is_empty()));
        assert_eq!(chapter.meta.revelation_type, RevelationType::Meccan);
    }

    #[test]
    fn test_primary_located_by_identifier_not_position() {
        let data = json!([
            chapter_edition("en.asad", "en", 7),
            chapter_edition("quran-uthmani", "ar", 7),
        ]);

        let chapter = normalize_chapter(&data, "quran-uthmani", &tr(&["en.asad"])).unwrap();

        assert_eq!(chapter.verses[0].text, "ar 1");
        assert_eq!(chapter.verses[0].translation("en.asad"), "en 1");
    }

    #[test]
    fn test_shorter_translation_edition_pads_with_empty() {
        let data = json!([
            chapter_edition("quran-uthmani", "ar", 7),
            chapter_edition("en.asad", "en", 5),
        ]);

        let chapter = normalize_chapter(&data, "quran-uthmani", &tr(&["en.asad"])).unwrap();

        assert_eq!(chapter.verses[4].translation("en.asad"), "en 5");
        assert_eq!(chapter.verses[5].translation("en.asad"), "");
        assert_eq!(chapter.verses[6].translation("en.asad"), "");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let data = json!([
            chapter_edition("quran-uthmani", "ar", 3),
            chapter_edition("en.asad", "en", 3),
        ]);
        let before = data.clone();

        let _ = normalize_chapter(&data, "quran-uthmani", &tr(&["en.asad"])).unwrap();

        assert_eq!(data, before);
    }

    #[test]
    fn test_scalar_payload_is_invalid_response() {
        for data in [json!("Nothing found"), json!(42), Value::Null] {
            match normalize_chapter(&data, "quran-uthmani", &[]) {
                Err(Error::InvalidResponse(_)) => {},
                other => panic!("expected InvalidResponse, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_edition_list_is_invalid_response() {
        assert!(matches!(
            normalize_chapter(&json!([]), "quran-uthmani", &[]),
            Err(Error::InvalidResponse(_))
        ));
        assert!(matches!(
            normalize_verse(&json!([]), "quran-uthmani", &[]),
            Err(Error::InvalidResponse(_))
        ));
    }

    fn verse_edition(identifier: &str, text: &str) -> Value {
        json!({
            "number": 262,
            "text": text,
            "numberInSurah": 255,
            "surah": {
                "number": 2,
                "name": "سُورَةُ البَقَرَةِ",
                "englishName": "Al-Baqara",
                "englishNameTranslation": "The Cow",
                "revelationType": "Medinan",
                "numberOfAyahs": 286,
            },
            "edition": { "identifier": identifier },
        })
    }

    #[test]
    fn test_verse_multi_edition() {
        let data = json!([
            verse_edition("quran-uthmani", "ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ"),
            verse_edition("fa.fooladvand", "خداست"),
        ]);

        let verse = normalize_verse(
            &data,
            "quran-uthmani",
            &tr(&["fa.fooladvand", "en.asad"]),
        )
        .unwrap();

        assert_eq!(verse.number, 262);
        assert_eq!(verse.number_in_surah, 255);
        assert_eq!(verse.surah.number, 2);
        assert_eq!(verse.translation("fa.fooladvand"), "خداست");
        assert_eq!(verse.translations.get("en.asad").map(String::as_str), Some(""));
    }

    #[test]
    fn test_verse_single_edition() {
        let data = verse_edition("quran-uthmani", "text");
        let verse = normalize_verse(&data, "quran-uthmani", &[]).unwrap();
        assert_eq!(verse.text, "text");
        assert!(verse.translations.is_empty());
    }

    fn listing(count: u16) -> Value {
        let items: Vec<Value> = (1..=count)
            .map(|n| {
                let revelation = if n == 2 { "Medinan" } else { "Meccan" };
                json!({
                    "number": n,
                    "name": format!("name {n}"),
                    "englishName": format!("english {n}"),
                    "englishNameTranslation": format!("meaning {n}"),
                    "revelationType": revelation,
                    "numberOfAyahs": crate::verse_index::verse_count(n).unwrap_or(1),
                })
            })
            .collect();
        Value::Array(items)
    }

    #[test]
    fn test_chapter_list() {
        let chapters = normalize_chapter_list(&listing(114)).unwrap();
        assert_eq!(chapters.len(), 114);
        assert_eq!(chapters[1].revelation_type, RevelationType::Medinan);
        assert_eq!(chapters[1].number_of_ayahs, 286);
    }

    #[test]
    fn test_truncated_chapter_list_is_rejected() {
        assert!(matches!(
            normalize_chapter_list(&listing(30)),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_search_matches() {
        let data = json!({
            "count": 2,
            "matches": [
                verse_edition("en.asad", "God - there is no deity save Him"),
                {
                    "number": 1,
                    "text": "In the name of God",
                    "numberInSurah": 1,
                    "surah": { "number": 1, "name": "الفاتحة", "englishName": "Al-Faatiha" },
                },
            ],
        });

        let results = normalize_search(&data).unwrap();
        assert_eq!(results.count, 2);
        assert_eq!(results.matches[0].address().to_string(), "2:255");
        assert_eq!(results.matches[1].surah.name, "الفاتحة");
    }

    #[test]
    fn test_juz() {
        let data = json!({
            "number": 30,
            "ayahs": [
                {
                    "number": 5673,
                    "text": "عَمَّ يَتَسَآءَلُونَ",
                    "numberInSurah": 1,
                    "surah": { "number": 78, "name": "النبأ", "englishName": "An-Naba" },
                },
            ],
        });

        let juz = normalize_juz(&data).unwrap();
        assert_eq!(juz.number, 30);
        assert_eq!(juz.verses[0].surah.number, 78);
    }
}
