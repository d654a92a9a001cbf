//! Reciter table and CDN URL derivation.
//!
//! Everything here is pure formatting: no I/O and no errors. An unknown
//! reciter or an out-of-range target yields `None`.

use crate::config::AudioConfig;
use crate::verse_index::{self, VerseAddress};

/// An audio narration identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reciter {
    /// Stable identifier used in preferences.
    pub id: &'static str,
    /// Display name in Persian script.
    pub name: &'static str,
    /// Display name in Latin script.
    pub english_name: &'static str,
    /// Edition path segment on the CDN.
    pub edition: &'static str,
    /// Bitrate path segment on the CDN, in kbps.
    pub bitrate: u16,
}

/// Reciter used when a preference names none.
pub const DEFAULT_RECITER: &str = "ar.alafasy";

/// Built-in reciters.
pub static RECITERS: [Reciter; 6] = [
    Reciter {
        id: "ar.alafasy",
        name: "مشاری راشد العفاسی",
        english_name: "Mishary Rashid Alafasy",
        edition: "ar.alafasy",
        bitrate: 128,
    },
    Reciter {
        id: "ar.abdulsamad",
        name: "عبدالباسط عبدالصمد",
        english_name: "Abdul Basit Abdul Samad",
        edition: "ar.abdulsamad",
        bitrate: 128,
    },
    Reciter {
        id: "ar.husary",
        name: "محمود خلیل الحصری",
        english_name: "Mahmoud Khalil Al-Hussary",
        edition: "ar.husary",
        bitrate: 128,
    },
    Reciter {
        id: "ar.minshawi",
        name: "محمد صدیق المنشاوی",
        english_name: "Mohammad Siddiq Al-Minshawi",
        edition: "ar.minshawi",
        bitrate: 128,
    },
    Reciter {
        id: "ar.sudais",
        name: "عبدالرحمن السدیس",
        english_name: "Abdul Rahman Al-Sudais",
        edition: "ar.sudais",
        bitrate: 128,
    },
    Reciter {
        id: "ar.shuraim",
        name: "سعود الشریم",
        english_name: "Saud Al-Shuraim",
        edition: "ar.shuraim",
        bitrate: 128,
    },
];

/// Look up a reciter by identifier.
#[must_use]
pub fn reciter(id: &str) -> Option<&'static Reciter> {
    RECITERS.iter().find(|r| r.id == id)
}

/// What to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioTarget {
    /// A single verse by global number.
    Verse(u16),
    /// A whole chapter by number.
    Chapter(u16),
}

impl AudioTarget {
    /// Target a verse by chapter/verse address.
    ///
    /// Returns `None` when the address is out of range.
    #[must_use]
    pub fn verse_at(address: VerseAddress) -> Option<Self> {
        address.global_number().ok().map(Self::Verse)
    }

    fn in_range(self) -> bool {
        match self {
            Self::Verse(global) => verse_index::from_global_number(global).is_ok(),
            Self::Chapter(chapter) => verse_index::is_valid_chapter(chapter),
        }
    }
}

/// Derive the CDN URL for `target` read by `reciter_id`.
///
/// ```rust
/// use quran_core::audio::{audio_url, AudioTarget};
/// use quran_core::config::AudioConfig;
///
/// let cdn = AudioConfig::default();
/// assert_eq!(
///     audio_url(&cdn, AudioTarget::Verse(262), "ar.alafasy").as_deref(),
///     Some("https://cdn.islamic.network/quran/audio/128/ar.alafasy/262.mp3"),
/// );
/// assert_eq!(audio_url(&cdn, AudioTarget::Verse(1), "nobody"), None);
/// ```
#[must_use]
pub fn audio_url(cdn: &AudioConfig, target: AudioTarget, reciter_id: &str) -> Option<String> {
    let Some(reciter) = reciter(reciter_id) else {
        tracing::debug!("unknown reciter {reciter_id}");
        return None;
    };
    if !target.in_range() {
        return None;
    }

    let (base, number) = match target {
        AudioTarget::Verse(global) => (cdn.cdn.as_str(), global),
        AudioTarget::Chapter(chapter) => (cdn.chapter_cdn.as_str(), chapter),
    };
    Some(format!(
        "{}/{}/{}/{number}.mp3",
        base.trim_end_matches('/'),
        reciter.bitrate,
        reciter.edition
    ))
}
