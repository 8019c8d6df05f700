//! Fixed keyword tables used by the query interpreter.
//!
//! The tables are process-wide constant data. A lower-cased index of each
//! table is built once on first use and shared read-only afterwards.
//!
//! When several entries of one table occur in the same text, the
//! [`MatchPolicy`] decides which one wins. Table order alone used to decide,
//! which silently preferred earlier entries (for example `강남` over
//! `강남역`); [`MatchPolicy::FirstListed`] keeps that behaviour available
//! for compatibility checks.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Generic search phrase used when no food keyword matches ("restaurants").
pub const DEFAULT_FOOD_PHRASE: &str = "맛집";

/// Phrases that signal "search around my current position".
pub const PROXIMITY_PHRASES: &[&str] = &[
    "near me",
    "nearby",
    "around here",
    "around me",
    "close to me",
    "current location",
    "my location",
    "주변",
    "근처",
    "내 위치",
    "현재 위치",
    "여기",
];

/// Known place names, administrative regions first, then neighbourhoods.
pub const LOCATION_NAMES: &[&str] = &[
    "서울",
    "부산",
    "대구",
    "인천",
    "광주",
    "대전",
    "울산",
    "세종",
    "제주",
    "수원",
    "성남",
    "Seoul",
    "Busan",
    "Daegu",
    "Incheon",
    "Gwangju",
    "Daejeon",
    "Ulsan",
    "Sejong",
    "Jeju",
    "Suwon",
    "Seongnam",
    "강남",
    "강남역",
    "홍대",
    "신촌",
    "이태원",
    "명동",
    "종로",
    "잠실",
    "여의도",
    "성수",
    "건대",
    "압구정",
    "가로수길",
    "판교",
    "해운대",
    "서면",
    "Gangnam",
    "Gangnam Station",
    "Hongdae",
    "Sinchon",
    "Itaewon",
    "Myeongdong",
    "Jongno",
    "Jamsil",
    "Yeouido",
    "Seongsu",
    "Apgujeong",
    "Pangyo",
    "Haeundae",
    "Seomyeon",
];

/// Food keyword to canonical search phrase.
pub const FOOD_KEYWORDS: &[(&str, &str)] = &[
    ("korean food", "Korean food restaurant"),
    ("korean", "Korean food restaurant"),
    ("한식", "한식 맛집"),
    ("japanese food", "Japanese restaurant"),
    ("sushi", "sushi restaurant"),
    ("일식", "일식 맛집"),
    ("초밥", "초밥 맛집"),
    ("chinese food", "Chinese restaurant"),
    ("중식", "중식 맛집"),
    ("짜장면", "중식 맛집"),
    ("italian", "Italian restaurant"),
    ("pasta", "pasta restaurant"),
    ("파스타", "파스타 맛집"),
    ("pizza", "pizza restaurant"),
    ("피자", "피자 맛집"),
    ("burger", "burger restaurant"),
    ("햄버거", "햄버거 맛집"),
    ("chicken", "chicken restaurant"),
    ("치킨", "치킨 맛집"),
    ("bbq", "Korean BBQ restaurant"),
    ("고기", "고기 맛집"),
    ("삼겹살", "삼겹살 맛집"),
    ("ramen", "ramen restaurant"),
    ("라멘", "라멘 맛집"),
    ("noodle", "noodle restaurant"),
    ("국수", "국수 맛집"),
    ("seafood", "seafood restaurant"),
    ("해산물", "해산물 맛집"),
    ("횟집", "횟집"),
    ("vegan", "vegan restaurant"),
    ("vegetarian", "vegetarian restaurant"),
    ("brunch", "brunch restaurant"),
    ("브런치", "브런치 맛집"),
    ("dessert", "dessert cafe"),
    ("디저트", "디저트 카페"),
    ("coffee", "cafe"),
    ("cafe", "cafe"),
    ("카페", "카페"),
];

/// How overlapping keyword matches are arbitrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Longest matching keyword wins; ties go to the earlier table entry.
    #[default]
    LongestMatch,
    /// First matching entry in table order wins.
    FirstListed,
}

impl MatchPolicy {
    /// Parse a policy name.
    ///
    /// Accepts "first" / "first_listed"; anything else yields `LongestMatch`.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_listed" | "first-listed" => MatchPolicy::FirstListed,
            _ => MatchPolicy::LongestMatch,
        }
    }
}

/// One entry of a lower-cased keyword index.
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    /// Lower-cased keyword matched against lower-cased text.
    pub needle: String,
    /// Value reported on a match.
    pub value: &'static str,
}

pub(crate) static LOCATION_INDEX: Lazy<Vec<KeywordEntry>> = Lazy::new(|| {
    LOCATION_NAMES
        .iter()
        .map(|name| KeywordEntry {
            needle: name.to_lowercase(),
            value: name,
        })
        .collect()
});

pub(crate) static FOOD_INDEX: Lazy<Vec<KeywordEntry>> = Lazy::new(|| {
    FOOD_KEYWORDS
        .iter()
        .map(|(keyword, phrase)| KeywordEntry {
            needle: keyword.to_lowercase(),
            value: phrase,
        })
        .collect()
});

pub(crate) static PROXIMITY_INDEX: Lazy<Vec<String>> =
    Lazy::new(|| PROXIMITY_PHRASES.iter().map(|p| p.to_lowercase()).collect());

/// Find the winning entry of `index` inside already lower-cased `text`.
pub fn find_keyword<'a>(
    text: &str,
    index: &'a [KeywordEntry],
    policy: MatchPolicy,
) -> Option<&'a KeywordEntry> {
    let mut matches = index.iter().filter(|entry| text.contains(&entry.needle));
    match policy {
        MatchPolicy::FirstListed => matches.next(),
        MatchPolicy::LongestMatch => matches.fold(None, |best: Option<&KeywordEntry>, entry| {
            match best {
                Some(current) if current.needle.chars().count() >= entry.needle.chars().count() => {
                    Some(current)
                }
                _ => Some(entry),
            }
        }),
    }
}
