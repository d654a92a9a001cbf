//! Built-in reference tables.
//!
//! Used when the upstream chapter or edition listing cannot be fetched. Verse
//! counts come from [`crate::verse_index::VERSE_COUNTS`] so the two tables
//! cannot drift.

use crate::types::{ChapterMeta, Edition, RevelationType};
use crate::verse_index::{TOTAL_CHAPTERS, VERSE_COUNTS};
use once_cell::sync::Lazy;

use crate::types::RevelationType::{Meccan, Medinan};

/// `(name, transliteration, meaning, revelation)` for chapters 1..=114.
const CHAPTER_NAMES: [(&str, &str, &str, RevelationType); TOTAL_CHAPTERS as usize] = [
    ("الفاتحة", "Al-Faatiha", "The Opening", Meccan),
    ("البقرة", "Al-Baqara", "The Cow", Medinan),
    ("آل عمران", "Aal-i-Imraan", "The Family of Imraan", Medinan),
    ("النساء", "An-Nisaa", "The Women", Medinan),
    ("المائدة", "Al-Maaida", "The Table", Medinan),
    ("الأنعام", "Al-An'aam", "The Cattle", Meccan),
    ("الأعراف", "Al-A'raaf", "The Heights", Meccan),
    ("الأنفال", "Al-Anfaal", "The Spoils of War", Medinan),
    ("التوبة", "At-Tawba", "The Repentance", Medinan),
    ("يونس", "Yunus", "Jonas", Meccan),
    ("هود", "Hud", "Hud", Meccan),
    ("يوسف", "Yusuf", "Joseph", Meccan),
    ("الرعد", "Ar-Ra'd", "The Thunder", Medinan),
    ("إبراهيم", "Ibrahim", "Abraham", Meccan),
    ("الحجر", "Al-Hijr", "The Rock", Meccan),
    ("النحل", "An-Nahl", "The Bee", Meccan),
    ("الإسراء", "Al-Israa", "The Night Journey", Meccan),
    ("الكهف", "Al-Kahf", "The Cave", Meccan),
    ("مريم", "Maryam", "Mary", Meccan),
    ("طه", "Taa-Haa", "Taa-Haa", Meccan),
    ("الأنبياء", "Al-Anbiyaa", "The Prophets", Meccan),
    ("الحج", "Al-Hajj", "The Pilgrimage", Medinan),
    ("المؤمنون", "Al-Muminoon", "The Believers", Meccan),
    ("النور", "An-Noor", "The Light", Medinan),
    ("الفرقان", "Al-Furqaan", "The Criterion", Meccan),
    ("الشعراء", "Ash-Shu'araa", "The Poets", Meccan),
    ("النمل", "An-Naml", "The Ant", Meccan),
    ("القصص", "Al-Qasas", "The Stories", Meccan),
    ("العنكبوت", "Al-Ankaboot", "The Spider", Meccan),
    ("الروم", "Ar-Room", "The Romans", Meccan),
    ("لقمان", "Luqman", "Luqman", Meccan),
    ("السجدة", "As-Sajda", "The Prostration", Meccan),
    ("الأحزاب", "Al-Ahzaab", "The Clans", Medinan),
    ("سبأ", "Saba", "Sheba", Meccan),
    ("فاطر", "Faatir", "The Originator", Meccan),
    ("يس", "Yaseen", "Yaseen", Meccan),
    ("الصافات", "As-Saaffaat", "Those drawn up in Ranks", Meccan),
    ("ص", "Saad", "The letter Saad", Meccan),
    ("الزمر", "Az-Zumar", "The Groups", Meccan),
    ("غافر", "Ghafir", "The Forgiver", Meccan),
    ("فصلت", "Fussilat", "Explained in detail", Meccan),
    ("الشورى", "Ash-Shura", "Consultation", Meccan),
    ("الزخرف", "Az-Zukhruf", "Ornaments of gold", Meccan),
    ("الدخان", "Ad-Dukhaan", "The Smoke", Meccan),
    ("الجاثية", "Al-Jaathiya", "Crouching", Meccan),
    ("الأحقاف", "Al-Ahqaf", "The Dunes", Meccan),
    ("محمد", "Muhammad", "Muhammad", Medinan),
    ("الفتح", "Al-Fath", "The Victory", Medinan),
    ("الحجرات", "Al-Hujuraat", "The Inner Apartments", Medinan),
    ("ق", "Qaaf", "The letter Qaaf", Meccan),
    ("الذاريات", "Adh-Dhaariyat", "The Winnowing Winds", Meccan),
    ("الطور", "At-Tur", "The Mount", Meccan),
    ("النجم", "An-Najm", "The Star", Meccan),
    ("القمر", "Al-Qamar", "The Moon", Meccan),
    ("الرحمن", "Ar-Rahmaan", "The Beneficent", Medinan),
    ("الواقعة", "Al-Waaqia", "The Inevitable", Meccan),
    ("الحديد", "Al-Hadid", "The Iron", Medinan),
    ("المجادلة", "Al-Mujaadila", "The Pleading Woman", Medinan),
    ("الحشر", "Al-Hashr", "The Exile", Medinan),
    ("الممتحنة", "Al-Mumtahana", "She that is to be examined", Medinan),
    ("الصف", "As-Saff", "The Ranks", Medinan),
    ("الجمعة", "Al-Jumu'a", "Friday", Medinan),
    ("المنافقون", "Al-Munaafiqoon", "The Hypocrites", Medinan),
    ("التغابن", "At-Taghaabun", "Mutual Disillusion", Medinan),
    ("الطلاق", "At-Talaaq", "Divorce", Medinan),
    ("التحريم", "At-Tahrim", "The Prohibition", Medinan),
    ("الملك", "Al-Mulk", "The Sovereignty", Meccan),
    ("القلم", "Al-Qalam", "The Pen", Meccan),
    ("الحاقة", "Al-Haaqqa", "The Reality", Meccan),
    ("المعارج", "Al-Ma'aarij", "The Ascending Stairways", Meccan),
    ("نوح", "Nooh", "Noah", Meccan),
    ("الجن", "Al-Jinn", "The Jinn", Meccan),
    ("المزمل", "Al-Muzzammil", "The Enshrouded One", Meccan),
    ("المدثر", "Al-Muddaththir", "The Cloaked One", Meccan),
    ("القيامة", "Al-Qiyaama", "The Resurrection", Meccan),
    ("الإنسان", "Al-Insaan", "Man", Medinan),
    ("المرسلات", "Al-Mursalaat", "The Emissaries", Meccan),
    ("النبأ", "An-Naba", "The Announcement", Meccan),
    ("النازعات", "An-Naazi'aat", "Those who drag forth", Meccan),
    ("عبس", "Abasa", "He frowned", Meccan),
    ("التكوير", "At-Takwir", "The Overthrowing", Meccan),
    ("الانفطار", "Al-Infitaar", "The Cleaving", Meccan),
    ("المطففين", "Al-Mutaffifin", "Defrauding", Meccan),
    ("الانشقاق", "Al-Inshiqaaq", "The Splitting Open", Meccan),
    ("البروج", "Al-Burooj", "The Constellations", Meccan),
    ("الطارق", "At-Taariq", "The Morning Star", Meccan),
    ("الأعلى", "Al-A'laa", "The Most High", Meccan),
    ("الغاشية", "Al-Ghaashiya", "The Overwhelming", Meccan),
    ("الفجر", "Al-Fajr", "The Dawn", Meccan),
    ("البلد", "Al-Balad", "The City", Meccan),
    ("الشمس", "Ash-Shams", "The Sun", Meccan),
    ("الليل", "Al-Lail", "The Night", Meccan),
    ("الضحى", "Ad-Dhuhaa", "The Morning Hours", Meccan),
    ("الشرح", "Ash-Sharh", "The Consolation", Meccan),
    ("التين", "At-Tin", "The Fig", Meccan),
    ("العلق", "Al-Alaq", "The Clot", Meccan),
    ("القدر", "Al-Qadr", "The Power, Fate", Meccan),
    ("البينة", "Al-Bayyina", "The Evidence", Medinan),
    ("الزلزلة", "Az-Zalzala", "The Earthquake", Medinan),
    ("العاديات", "Al-Aadiyaat", "The Chargers", Meccan),
    ("القارعة", "Al-Qaari'a", "The Calamity", Meccan),
    ("التكاثر", "At-Takaathur", "Competition", Meccan),
    ("العصر", "Al-Asr", "The Declining Day, Epoch", Meccan),
    ("الهمزة", "Al-Humaza", "The Traducer", Meccan),
    ("الفيل", "Al-Fil", "The Elephant", Meccan),
    ("قريش", "Quraish", "Quraysh", Meccan),
    ("الماعون", "Al-Maa'un", "Almsgiving", Meccan),
    ("الكوثر", "Al-Kawthar", "Abundance", Meccan),
    ("الكافرون", "Al-Kaafiroon", "The Disbelievers", Meccan),
    ("النصر", "An-Nasr", "Divine Support", Medinan),
    ("المسد", "Al-Masad", "The Palm Fibre", Meccan),
    ("الإخلاص", "Al-Ikhlaas", "Sincerity", Meccan),
    ("الفلق", "Al-Falaq", "The Dawn", Meccan),
    ("الناس", "An-Naas", "Mankind", Meccan),
];

static STATIC_CHAPTERS: Lazy<Vec<ChapterMeta>> = Lazy::new(|| {
    CHAPTER_NAMES
        .iter()
        .zip(VERSE_COUNTS)
        .zip(1u16..)
        .map(
            |(((name, english_name, meaning, revelation_type), number_of_ayahs), number)| {
                ChapterMeta {
                    number,
                    name: (*name).to_string(),
                    english_name: (*english_name).to_string(),
                    english_name_translation: (*meaning).to_string(),
                    revelation_type: *revelation_type,
                    number_of_ayahs,
                }
            },
        )
        .collect()
});

/// All 114 chapters from the built-in table.
#[must_use]
pub fn static_chapters() -> &'static [ChapterMeta] {
    &STATIC_CHAPTERS
}

/// One chapter from the built-in table.
#[must_use]
pub fn static_chapter(number: u16) -> Option<&'static ChapterMeta> {
    number
        .checked_sub(1)
        .and_then(|idx| STATIC_CHAPTERS.get(usize::from(idx)))
}

/// `(identifier, language, name, english name)` of the bundled translations.
const TRANSLATIONS: [(&str, &str, &str, &str); 8] = [
    ("fa.fooladvand", "fa", "فولادوند", "Fooladvand"),
    ("fa.makarem", "fa", "مکارم شیرازی", "Makarem Shirazi"),
    ("fa.ansarian", "fa", "انصاریان", "Ansarian"),
    ("fa.ghomshei", "fa", "قمشه‌ای", "Ghomshei"),
    ("en.asad", "en", "محمد اسد", "Muhammad Asad"),
    ("en.pickthall", "en", "پیکتال", "Pickthall"),
    ("en.yusufali", "en", "یوسف علی", "Yusuf Ali"),
    ("en.sahih", "en", "صحیح انترنشنال", "Saheeh International"),
];

/// Translation editions known without asking the upstream.
#[must_use]
pub fn static_translations() -> Vec<Edition> {
    TRANSLATIONS
        .iter()
        .map(|&(identifier, language, name, english_name)| Edition {
            identifier: identifier.to_string(),
            language: language.to_string(),
            name: name.to_string(),
            english_name: english_name.to_string(),
            format: "text".to_string(),
            kind: "translation".to_string(),
            direction: Some(if language == "fa" { "rtl" } else { "ltr" }.to_string()),
        })
        .collect()
}
