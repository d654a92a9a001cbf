//! Bidirectional mapping between `(chapter, verse)` and global verse numbers.
//!
//! Global verse numbers run from 1 to [`TOTAL_VERSES`] across all chapters in
//! order. For every chapter `c`, the verse counts of chapters `1..c` plus the
//! verse number inside `c` equal the global number; the two conversions in
//! this module are exact inverses over every valid input.

use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of chapters in the corpus.
pub const TOTAL_CHAPTERS: u16 = 114;

/// Number of verses in the corpus.
pub const TOTAL_VERSES: u16 = 6236;

/// Number of juz (thirtieth parts) in the corpus.
pub const TOTAL_JUZ: u16 = 30;

/// Verse count per chapter, chapter 1 first.
pub const VERSE_COUNTS: [u16; TOTAL_CHAPTERS as usize] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

/// A verse addressed by chapter and position inside the chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseAddress {
    /// Chapter number, 1-based.
    pub chapter: u16,
    /// Verse number inside the chapter, 1-based.
    pub verse: u16,
}

impl VerseAddress {
    /// Build an address without validating it.
    #[must_use]
    pub const fn new(chapter: u16, verse: u16) -> Self {
        Self { chapter, verse }
    }

    /// Convert to a global verse number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] when the address is out of range.
    pub fn global_number(self) -> Result<u16> {
        to_global_number(self.chapter, self.verse)
    }
}

impl fmt::Display for VerseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// Verse count of a chapter, or `None` when the chapter does not exist.
#[must_use]
pub fn verse_count(chapter: u16) -> Option<u16> {
    if is_valid_chapter(chapter) {
        Some(VERSE_COUNTS[usize::from(chapter - 1)])
    } else {
        None
    }
}

/// Whether `chapter` is in `1..=114`.
#[must_use]
pub const fn is_valid_chapter(chapter: u16) -> bool {
    chapter >= 1 && chapter <= TOTAL_CHAPTERS
}

/// Whether `verse` exists inside `chapter`.
#[must_use]
pub fn is_valid_verse(chapter: u16, verse: u16) -> bool {
    verse_count(chapter).is_some_and(|count| verse >= 1 && verse <= count)
}

/// Validate a chapter number.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] when `chapter` is outside `1..=114`.
pub fn check_chapter(chapter: u16) -> Result<u16> {
    verse_count(chapter).ok_or_else(|| {
        Error::InvalidAddress(format!(
            "chapter {chapter} is outside 1..={TOTAL_CHAPTERS}"
        ))
    })
}

/// Convert a `(chapter, verse)` pair to its global verse number.
///
/// ```rust
/// use quran_core::verse_index::to_global_number;
///
/// assert_eq!(to_global_number(1, 1)?, 1);
/// assert_eq!(to_global_number(2, 1)?, 8);
/// assert_eq!(to_global_number(114, 6)?, 6236);
/// # Ok::<(), quran_core::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] when the chapter is outside `1..=114` or
/// the verse is outside `1..=verse_count(chapter)`.
pub fn to_global_number(chapter: u16, verse: u16) -> Result<u16> {
    let count = check_chapter(chapter)?;
    if verse < 1 || verse > count {
        return Err(Error::InvalidAddress(format!(
            "verse {verse} is outside 1..={count} for chapter {chapter}"
        )));
    }

    let preceding: u16 = VERSE_COUNTS[..usize::from(chapter - 1)].iter().sum();
    Ok(preceding + verse)
}

/// Convert a global verse number back to its `(chapter, verse)` address.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] when `global` is outside `1..=6236`.
pub fn from_global_number(global: u16) -> Result<VerseAddress> {
    if global < 1 || global > TOTAL_VERSES {
        return Err(Error::InvalidAddress(format!(
            "global verse {global} is outside 1..={TOTAL_VERSES}"
        )));
    }

    let mut running = 0u16;
    for (idx, &count) in VERSE_COUNTS.iter().enumerate() {
        running += count;
        if running >= global {
            // idx < 114 so the cast cannot truncate
            #[allow(clippy::cast_possible_truncation)]
            let chapter = idx as u16 + 1;
            return Ok(VerseAddress::new(chapter, global - (running - count)));
        }
    }

    // The table sums to TOTAL_VERSES, so the loop always returns.
    Err(Error::InvalidAddress(format!(
        "global verse {global} not covered by the verse table"
    )))
}

/// Pick a uniformly random chapter, then a uniformly random verse inside it.
pub fn random_address<R: Rng + ?Sized>(rng: &mut R) -> VerseAddress {
    let chapter = rng.gen_range(1..=TOTAL_CHAPTERS);
    let count = VERSE_COUNTS[usize::from(chapter - 1)];
    VerseAddress::new(chapter, rng.gen_range(1..=count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_table_totals() {
        let total: u32 = VERSE_COUNTS.iter().map(|&c| u32::from(c)).sum();
        assert_eq!(total, u32::from(TOTAL_VERSES));
        assert_eq!(VERSE_COUNTS.len(), usize::from(TOTAL_CHAPTERS));
    }

    #[test]
    fn test_known_anchors() {
        assert_eq!(to_global_number(1, 1).unwrap(), 1);
        assert_eq!(to_global_number(1, 7).unwrap(), 7);
        assert_eq!(to_global_number(2, 1).unwrap(), 8);
        assert_eq!(to_global_number(2, 255).unwrap(), 262);
        assert_eq!(to_global_number(114, 6).unwrap(), 6236);

        assert_eq!(from_global_number(1).unwrap(), VerseAddress::new(1, 1));
        assert_eq!(from_global_number(8).unwrap(), VerseAddress::new(2, 1));
        assert_eq!(from_global_number(6236).unwrap(), VerseAddress::new(114, 6));
    }

    #[test]
    fn test_out_of_range_addresses() {
        assert!(matches!(to_global_number(0, 1), Err(Error::InvalidAddress(_))));
        assert!(matches!(
            to_global_number(115, 1),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(to_global_number(1, 0), Err(Error::InvalidAddress(_))));
        assert!(matches!(to_global_number(1, 8), Err(Error::InvalidAddress(_))));
        assert!(matches!(from_global_number(0), Err(Error::InvalidAddress(_))));
        assert!(matches!(
            from_global_number(6237),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_exhaustive_round_trip() {
        let mut expected = 1u16;
        for chapter in 1..=TOTAL_CHAPTERS {
            for verse in 1..=verse_count(chapter).unwrap() {
                let global = to_global_number(chapter, verse).unwrap();
                assert_eq!(global, expected, "{chapter}:{verse}");
                assert_eq!(
                    from_global_number(global).unwrap(),
                    VerseAddress::new(chapter, verse)
                );
                expected += 1;
            }
        }
    }

    #[test]
    fn test_validity_helpers() {
        assert!(is_valid_chapter(1));
        assert!(is_valid_chapter(114));
        assert!(!is_valid_chapter(0));
        assert!(!is_valid_chapter(115));
        assert!(is_valid_verse(2, 286));
        assert!(!is_valid_verse(2, 287));
        assert!(!is_valid_verse(115, 1));
        assert_eq!(verse_count(0), None);
        assert_eq!(VerseAddress::new(3, 7).to_string(), "3:7");
    }

    #[test]
    fn test_random_address_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let address = random_address(&mut rng);
            assert!(is_valid_verse(address.chapter, address.verse), "{address}");
        }
    }

    proptest! {
        #[test]
        fn prop_global_round_trip(global in 1u16..=TOTAL_VERSES) {
            let address = from_global_number(global).unwrap();
            prop_assert_eq!(address.global_number().unwrap(), global);
        }
    }
}
