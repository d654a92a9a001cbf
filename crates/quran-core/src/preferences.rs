//! Typed per-user state on top of a [`KeyValueStore`].
//!
//! Every value is stored as JSON under one of the [`keys`]. Reads never fail:
//! a missing, unreadable or corrupt value is logged and replaced by its
//! default. Writes go through immediately and report storage failures.

use crate::audio::DEFAULT_RECITER;
use crate::storage::KeyValueStore;
use crate::verse_index::{self, VerseAddress};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Storage keys.
pub mod keys {
    /// Color theme.
    pub const THEME: &str = "quran_theme";
    /// Interface language.
    pub const LANGUAGE: &str = "quran_language";
    /// Favorite verses as global numbers.
    pub const FAVORITES: &str = "quran_favorites";
    /// Last reading position.
    pub const LAST_READ: &str = "quran_last_read";
    /// Translation display settings.
    pub const SETTINGS: &str = "quran_settings";
    /// Playback settings.
    pub const AUDIO_SETTINGS: &str = "quran_audio_settings";
    /// Recent search queries.
    pub const SEARCH_HISTORY: &str = "quran_search_history";
    /// Furthest verse read per chapter.
    pub const READING_PROGRESS: &str = "quran_reading_progress";
    /// Bookmarked verses.
    pub const BOOKMARKS: &str = "quran_bookmarks";
    /// Notes per global verse number.
    pub const NOTES: &str = "quran_notes";
}

/// Number of queries kept in the search history.
pub const SEARCH_HISTORY_LIMIT: usize = 10;

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
    /// Follow the system.
    Auto,
}

impl Theme {
    /// Light becomes dark; anything else becomes light.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark | Self::Auto => Self::Light,
        }
    }
}

/// Reader preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPreferences {
    /// Color theme.
    pub theme: Theme,
    /// Interface language code.
    pub language: String,
    /// Translation shown under every verse.
    pub primary_translation: String,
    /// Optional second translation.
    pub secondary_translation: String,
    /// Whether the second translation is shown.
    pub show_secondary: bool,
    /// Reciter identifier, see [`crate::audio::RECITERS`].
    pub reciter: String,
    /// Playback rate, `0.5..=2.0`.
    pub playback_speed: f32,
    /// Playback volume, `0.0..=1.0`.
    pub volume: f32,
    /// Continue to the next verse when one finishes.
    pub autoplay: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "fa".to_string(),
            primary_translation: "fa.fooladvand".to_string(),
            secondary_translation: "en.asad".to_string(),
            show_secondary: false,
            reciter: DEFAULT_RECITER.to_string(),
            playback_speed: 1.0,
            volume: 0.7,
            autoplay: true,
        }
    }
}

impl UserPreferences {
    /// Bring numeric settings back into range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            defaults.volume
        };
        self.playback_speed = if self.playback_speed.is_finite() {
            self.playback_speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            defaults.playback_speed
        };
        if crate::audio::reciter(&self.reciter).is_none() {
            warn!("unknown reciter {}; using {DEFAULT_RECITER}", self.reciter);
            self.reciter = defaults.reciter;
        }
        self
    }

    fn split(&self) -> (ReadingSettings, AudioSettings) {
        (
            ReadingSettings {
                primary_translation: self.primary_translation.clone(),
                secondary_translation: self.secondary_translation.clone(),
                show_secondary: self.show_secondary,
            },
            AudioSettings {
                reciter: self.reciter.clone(),
                playback_speed: self.playback_speed,
                volume: self.volume,
                autoplay: self.autoplay,
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReadingSettings {
    #[serde(alias = "persianTranslation")]
    primary_translation: String,
    #[serde(alias = "englishTranslation")]
    secondary_translation: String,
    #[serde(alias = "showEnglish")]
    show_secondary: bool,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        UserPreferences::default().split().0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AudioSettings {
    reciter: String,
    #[serde(alias = "audioSpeed")]
    playback_speed: f32,
    volume: f32,
    autoplay: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        UserPreferences::default().split().1
    }
}

/// Where the reader stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastRead {
    /// Chapter and verse.
    pub address: VerseAddress,
    /// When the position was saved.
    pub timestamp: DateTime<Utc>,
}

/// A bookmarked verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Chapter and verse.
    pub address: VerseAddress,
    /// Optional user label.
    #[serde(default)]
    pub label: Option<String>,
    /// When the bookmark was created.
    pub created_at: DateTime<Utc>,
}

/// Typed access to the persisted state.
#[derive(Debug)]
pub struct LocalState<S> {
    store: S,
}

impl<S: KeyValueStore> LocalState<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("cannot read {key}: {e}");
                return None;
            },
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring corrupt {key}: {e}");
                None
            },
        }
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key).unwrap_or_default()
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json)
    }

    /// Current preferences, defaults for anything missing or corrupt.
    pub fn preferences(&self) -> UserPreferences {
        let defaults = UserPreferences::default();
        let reading: ReadingSettings = self.read_or_default(keys::SETTINGS);
        let audio: AudioSettings = self.read_or_default(keys::AUDIO_SETTINGS);

        UserPreferences {
            theme: self.read(keys::THEME).unwrap_or(defaults.theme),
            language: self.read(keys::LANGUAGE).unwrap_or(defaults.language),
            primary_translation: reading.primary_translation,
            secondary_translation: reading.secondary_translation,
            show_secondary: reading.show_secondary,
            reciter: audio.reciter,
            playback_speed: audio.playback_speed,
            volume: audio.volume,
            autoplay: audio.autoplay,
        }
        .sanitized()
    }

    /// Persist preferences, clamped into range.
    pub fn set_preferences(&mut self, preferences: UserPreferences) -> Result<UserPreferences> {
        let preferences = preferences.sanitized();
        let (reading, audio) = preferences.split();
        self.write(keys::THEME, &preferences.theme)?;
        self.write(keys::LANGUAGE, &preferences.language)?;
        self.write(keys::SETTINGS, &reading)?;
        self.write(keys::AUDIO_SETTINGS, &audio)?;
        Ok(preferences)
    }

    /// Read, modify and persist preferences in one step.
    pub fn update_preferences(
        &mut self,
        change: impl FnOnce(&mut UserPreferences),
    ) -> Result<UserPreferences> {
        let mut preferences = self.preferences();
        change(&mut preferences);
        self.set_preferences(preferences)
    }

    /// Favorite verses as global numbers, in the order they were added.
    pub fn favorites(&self) -> Vec<u16> {
        let mut favorites: Vec<u16> = self.read_or_default(keys::FAVORITES);
        favorites.retain(|&global| verse_index::from_global_number(global).is_ok());
        favorites
    }

    /// Whether a verse is a favorite.
    pub fn is_favorite(&self, global: u16) -> bool {
        self.favorites().contains(&global)
    }

    /// Add or remove a favorite. Returns whether it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddress`] for an out-of-range verse number, or
    /// a storage error if the write fails.
    pub fn toggle_favorite(&mut self, global: u16) -> Result<bool> {
        verse_index::from_global_number(global)?;
        let mut favorites = self.favorites();
        let added = if let Some(idx) = favorites.iter().position(|&g| g == global) {
            favorites.remove(idx);
            false
        } else {
            favorites.push(global);
            true
        };
        self.write(keys::FAVORITES, &favorites)?;
        Ok(added)
    }

    /// Remove every favorite.
    pub fn clear_favorites(&mut self) -> Result<()> {
        self.store.remove(keys::FAVORITES)
    }

    /// Recent queries, most recent first.
    pub fn search_history(&self) -> Vec<String> {
        let mut history: Vec<String> = self.read_or_default(keys::SEARCH_HISTORY);
        history.truncate(SEARCH_HISTORY_LIMIT);
        history
    }

    /// Put a query at the front of the history.
    ///
    /// A repeated query moves to the front instead of appearing twice. Blank
    /// queries are ignored.
    pub fn record_search(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let mut history = self.search_history();
        history.retain(|q| q != query);
        history.insert(0, query.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);
        self.write(keys::SEARCH_HISTORY, &history)
    }

    /// Forget every query.
    pub fn clear_search_history(&mut self) -> Result<()> {
        self.store.remove(keys::SEARCH_HISTORY)
    }

    /// Last saved reading position.
    pub fn last_read(&self) -> Option<LastRead> {
        self.read::<LastRead>(keys::LAST_READ)
            .filter(|last| verse_index::is_valid_verse(last.address.chapter, last.address.verse))
    }

    /// Save the reading position stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddress`] for an out-of-range address, or a
    /// storage error if the write fails.
    pub fn set_last_read(&mut self, address: VerseAddress) -> Result<LastRead> {
        address.global_number()?;
        let last = LastRead {
            address,
            timestamp: Utc::now(),
        };
        self.write(keys::LAST_READ, &last)?;
        Ok(last)
    }

    /// Furthest verse reached per chapter.
    pub fn reading_progress(&self) -> BTreeMap<u16, u16> {
        let mut progress: BTreeMap<u16, u16> = self.read_or_default(keys::READING_PROGRESS);
        progress.retain(|&chapter, &mut verse| verse_index::is_valid_verse(chapter, verse));
        progress
    }

    /// Record that `address` was read; progress only moves forward.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddress`] for an out-of-range address, or a
    /// storage error if the write fails.
    pub fn record_progress(&mut self, address: VerseAddress) -> Result<()> {
        address.global_number()?;
        let mut progress = self.reading_progress();
        let furthest = progress.entry(address.chapter).or_insert(address.verse);
        *furthest = (*furthest).max(address.verse);
        self.write(keys::READING_PROGRESS, &progress)
    }

    /// Fraction of a chapter read, `0.0..=1.0`.
    pub fn chapter_progress(&self, chapter: u16) -> Option<f64> {
        let total = verse_index::verse_count(chapter)?;
        let read = self.reading_progress().get(&chapter).copied().unwrap_or(0);
        Some(f64::from(read) / f64::from(total))
    }

    /// Bookmarks, oldest first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.read_or_default(keys::BOOKMARKS)
    }

    /// Bookmark a verse, replacing an existing bookmark on the same verse.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddress`] for an out-of-range address, or a
    /// storage error if the write fails.
    pub fn add_bookmark(&mut self, address: VerseAddress, label: Option<&str>) -> Result<()> {
        address.global_number()?;
        let mut bookmarks = self.bookmarks();
        bookmarks.retain(|b| b.address != address);
        bookmarks.push(Bookmark {
            address,
            label: label.map(str::to_string),
            created_at: Utc::now(),
        });
        self.write(keys::BOOKMARKS, &bookmarks)
    }

    /// Remove a bookmark. Returns whether one existed.
    pub fn remove_bookmark(&mut self, address: VerseAddress) -> Result<bool> {
        let mut bookmarks = self.bookmarks();
        let before = bookmarks.len();
        bookmarks.retain(|b| b.address != address);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.write(keys::BOOKMARKS, &bookmarks)?;
        Ok(true)
    }

    /// Every note keyed by global verse number.
    pub fn notes(&self) -> BTreeMap<u16, String> {
        self.read_or_default(keys::NOTES)
    }

    /// Note attached to a verse.
    pub fn note(&self, global: u16) -> Option<String> {
        self.notes().remove(&global)
    }

    /// Attach a note to a verse; blank text deletes the note.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddress`] for an out-of-range verse number, or
    /// a storage error if the write fails.
    pub fn set_note(&mut self, global: u16, text: &str) -> Result<()> {
        verse_index::from_global_number(global)?;
        let mut notes = self.notes();
        if text.trim().is_empty() {
            if notes.remove(&global).is_none() {
                return Ok(());
            }
        } else {
            notes.insert(global, text.to_string());
        }
        self.write(keys::NOTES, &notes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn state() -> LocalState<MemoryStore> {
        LocalState::new(MemoryStore::new())
    }

    #[test]
    fn test_defaults_when_empty() {
        let prefs = state().preferences();
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.primary_translation, "fa.fooladvand");
        assert_eq!(prefs.secondary_translation, "en.asad");
        assert_eq!(prefs.reciter, "ar.alafasy");
        assert_eq!(prefs.volume, 0.7);
        assert!(!prefs.show_secondary);
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, "{broken".into()).unwrap();
        store.set(keys::THEME, "\"purple\"".into()).unwrap();
        store.set(keys::FAVORITES, "\"nope\"".into()).unwrap();
        let state = LocalState::new(store);

        assert_eq!(state.preferences(), UserPreferences::default());
        assert!(state.favorites().is_empty());
    }

    #[test]
    fn test_legacy_field_names_are_read() {
        let mut store = MemoryStore::new();
        store
            .set(
                keys::SETTINGS,
                r#"{"persianTranslation":"fa.makarem","showEnglish":true}"#.into(),
            )
            .unwrap();
        store.set(keys::AUDIO_SETTINGS, r#"{"audioSpeed":1.5}"#.into()).unwrap();
        let prefs = LocalState::new(store).preferences();

        assert_eq!(prefs.primary_translation, "fa.makarem");
        assert!(prefs.show_secondary);
        assert_eq!(prefs.playback_speed, 1.5);
        assert_eq!(prefs.secondary_translation, "en.asad");
    }

    #[test]
    fn test_preferences_are_clamped() {
        let mut state = state();
        let saved = state
            .update_preferences(|p| {
                p.volume = 3.0;
                p.playback_speed = 0.1;
                p.reciter = "ar.nobody".into();
                p.theme = p.theme.toggled();
            })
            .unwrap();

        assert_eq!(saved.volume, 1.0);
        assert_eq!(saved.playback_speed, 0.5);
        assert_eq!(saved.reciter, DEFAULT_RECITER);
        assert_eq!(state.preferences(), saved);
        assert_eq!(state.preferences().theme, Theme::Dark);
    }

    #[test]
    fn test_favorites_toggle() {
        let mut state = state();
        assert!(state.toggle_favorite(262).unwrap());
        assert!(state.toggle_favorite(1).unwrap());
        assert!(state.is_favorite(262));
        assert!(!state.toggle_favorite(262).unwrap());
        assert_eq!(state.favorites(), vec![1]);
        assert!(matches!(state.toggle_favorite(0), Err(Error::InvalidAddress(_))));

        state.clear_favorites().unwrap();
        assert!(state.favorites().is_empty());
    }

    #[test]
    fn test_search_history_is_bounded_and_distinct() {
        let mut state = state();
        for i in 0..12 {
            state.record_search(&format!("query {i}")).unwrap();
        }
        state.record_search("query 5").unwrap();
        state.record_search("   ").unwrap();

        let history = state.search_history();
        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(history[0], "query 5");
        assert_eq!(history[1], "query 11");
        assert_eq!(history.iter().filter(|q| *q == "query 5").count(), 1);
        assert!(!history.contains(&"query 0".to_string()));
    }

    #[test]
    fn test_last_read_and_progress() {
        let mut state = state();
        assert!(state.last_read().is_none());
        let saved = state.set_last_read(VerseAddress::new(18, 10)).unwrap();
        assert_eq!(state.last_read(), Some(saved));
        assert!(state.set_last_read(VerseAddress::new(1, 8)).is_err());

        state.record_progress(VerseAddress::new(1, 5)).unwrap();
        state.record_progress(VerseAddress::new(1, 3)).unwrap();
        assert_eq!(state.reading_progress().get(&1), Some(&5));
        assert_eq!(state.chapter_progress(1), Some(5.0 / 7.0));
        assert_eq!(state.chapter_progress(2), Some(0.0));
        assert_eq!(state.chapter_progress(115), None);
    }

    #[test]
    fn test_bookmarks_and_notes() {
        let mut state = state();
        let ayat_al_kursi = VerseAddress::new(2, 255);
        state.add_bookmark(ayat_al_kursi, Some("kursi")).unwrap();
        state.add_bookmark(ayat_al_kursi, None).unwrap();
        assert_eq!(state.bookmarks().len(), 1);
        assert_eq!(state.bookmarks()[0].label, None);
        assert!(state.remove_bookmark(ayat_al_kursi).unwrap());
        assert!(!state.remove_bookmark(ayat_al_kursi).unwrap());

        state.set_note(262, "memorize").unwrap();
        assert_eq!(state.note(262).as_deref(), Some("memorize"));
        state.set_note(262, "  ").unwrap();
        assert_eq!(state.note(262), None);
        assert!(state.set_note(7000, "x").is_err());
    }

    #[test]
    fn test_state_persists_in_file_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut state = LocalState::new(FileStore::open(&path));
        state.toggle_favorite(8).unwrap();
        state.record_search("mercy").unwrap();
        state
            .update_preferences(|p| p.language = "en".into())
            .unwrap();

        let reopened = LocalState::new(FileStore::open(&path));
        assert_eq!(reopened.favorites(), vec![8]);
        assert_eq!(reopened.search_history(), vec!["mercy".to_string()]);
        assert_eq!(reopened.preferences().language, "en");
    }
}
