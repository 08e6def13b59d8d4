//! Pseudo-word classification for rare and unknown tokens.
//!
//! Numbers, links and truncated words get dedicated buckets regardless of
//! how often they were seen. Rare words are bucketed by orthographic shape:
//! a length tier crossed with capitalization and sentence position.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

/// Prefix marking the first token of a sentence.
pub const BOUNDARY_MARKER: char = '^';

/// Tags assigned to number, truncation and link buckets when denoising.
pub const DENOISED_NUMBER_TAG: &str = "CARD";
pub const DENOISED_TRUNC_TAG: &str = "TRUNC";
pub const DENOISED_LINK_TAG: &str = "XY";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(?:[,.]\d)?$").unwrap());
static TRUNC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\wäöüß]+-$").unwrap());
static LINK_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]|[a-zA-Z0-9]+)\.\S{2,}$").unwrap()
});

/// Shape patterns per tier, in the order capital, low, start, any.
const SHAPE_PATTERNS: [[&str; 4]; 4] = [
    [
        r"^[A-ZÄÖÜ][a-zßäöü]{1,2}$",
        r"^[a-zßäöü]{1,3}$",
        r"^\^.{1,3}$",
        r"^.{1,3}$",
    ],
    [
        r"^[A-ZÄÖÜ](?:[a-zßäöü]|-[A-ZÄÖÜ]){3,5}$",
        r"^[a-zßäöü]{4,6}$",
        r"^\^.{4,6}$",
        r"^.{4,6}$",
    ],
    [
        r"^[A-ZÄÖÜ](?:[a-zßäöü]|-[A-ZÄÖÜ]){6,8}$",
        r"^[a-zßäöü]{7,9}$",
        r"^\^.{7,9}$",
        r"^.{7,9}$",
    ],
    [
        r"^[A-ZÄÖÜ](?:[a-zßäöü]|-[A-ZÄÖÜ]){8,}$",
        r"^[a-zßäöü]{9,}$",
        r"^\^.{9,}$",
        r"^.{8,}$",
    ],
];

static SHAPES: LazyLock<Vec<(PseudoWord, Regex)>> = LazyLock::new(|| {
    PseudoWord::shape_buckets()
        .map(|bucket| match bucket {
            PseudoWord::Shape(tier, shape) => {
                let pattern = SHAPE_PATTERNS[tier as usize][shape as usize];
                (bucket, Regex::new(pattern).unwrap())
            }
            _ => unreachable!("shape_buckets yields shape buckets only"),
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LengthTier {
    /// 1 to 3 characters.
    Short = 0,
    /// 4 to 6 characters.
    Medium = 1,
    /// 7 to 9 characters.
    Long = 2,
    /// Anything longer.
    Huge = 3,
}

impl LengthTier {
    pub const ALL: [LengthTier; 4] = [Self::Short, Self::Medium, Self::Long, Self::Huge];

    fn prefix(self) -> &'static str {
        match self {
            Self::Short => "OVV3",
            Self::Medium => "OVV6",
            Self::Long => "OVV9",
            Self::Huge => "OVV-HUGE",
        }
    }
}

/// Orthographic shape within a tier, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    Capital = 0,
    Lower = 1,
    Start = 2,
    Any = 3,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Self::Capital, Self::Lower, Self::Start, Self::Any];

    fn suffix(self) -> &'static str {
        match self {
            Self::Capital => "-CAPITAL",
            Self::Lower => "-LOW",
            Self::Start => "-START",
            Self::Any => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PseudoWord {
    Number,
    Link,
    Trunc,
    Shape(LengthTier, Shape),
}

impl PseudoWord {
    /// The 16 shape buckets, tier by tier, each tier in matching order.
    pub fn shape_buckets() -> impl Iterator<Item = PseudoWord> {
        LengthTier::ALL
            .into_iter()
            .flat_map(|tier| Shape::ALL.into_iter().map(move |shape| Self::Shape(tier, shape)))
    }

    pub fn tier(&self) -> Option<LengthTier> {
        match self {
            Self::Shape(tier, _) => Some(*tier),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Number => "NUMBER".to_string(),
            Self::Link => "LINK".to_string(),
            Self::Trunc => "TRUNC".to_string(),
            Self::Shape(tier, shape) => format!("{}{}", tier.prefix(), shape.suffix()),
        }
    }
}

impl fmt::Display for PseudoWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for PseudoWord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NUMBER" => Ok(Self::Number),
            "LINK" => Ok(Self::Link),
            "TRUNC" => Ok(Self::Trunc),
            _ => Self::shape_buckets()
                .find(|bucket| bucket.name() == s)
                .ok_or_else(|| format!("unknown pseudo-word: {s}")),
        }
    }
}

fn is_link(word: &str) -> bool {
    let after_scheme = word
        .strip_prefix("https://")
        .or_else(|| word.strip_prefix("http://"));
    match after_scheme {
        Some(rest) => match rest.strip_prefix("www.") {
            Some(host) => LINK_HOST.is_match(host),
            None => !rest.starts_with("www") && LINK_HOST.is_match(rest),
        },
        None => word
            .strip_prefix("www.")
            .map_or(false, |host| LINK_HOST.is_match(host)),
    }
}

/// Maps `word` onto a pseudo-word bucket, ignoring tags.
///
/// `count` is the number of times the word was seen; shape buckets are only
/// considered for words seen at most once.
pub fn pseudo_word(word: &str, count: usize) -> Option<PseudoWord> {
    if NUMBER.is_match(word) {
        return Some(PseudoWord::Number);
    }
    if TRUNC.is_match(word) {
        return Some(PseudoWord::Trunc);
    }
    if is_link(word) {
        return Some(PseudoWord::Link);
    }
    if count > 1 {
        return None;
    }
    SHAPES
        .iter()
        .find(|(_, pattern)| pattern.is_match(word))
        .map(|(bucket, _)| *bucket)
}

/// Classifies `word` and decides the tag its count is filed under.
///
/// With `denoising`, numbers, truncations and links are forced onto their
/// canonical tags; otherwise the gold tag is kept.
pub fn classify<'a>(
    word: &str,
    count: usize,
    gold_tag: Option<&'a str>,
    denoising: bool,
) -> Option<(PseudoWord, Option<&'a str>)> {
    let bucket = pseudo_word(word, count)?;
    let tag = match bucket {
        PseudoWord::Number if denoising => Some(DENOISED_NUMBER_TAG),
        PseudoWord::Trunc if denoising => Some(DENOISED_TRUNC_TAG),
        PseudoWord::Link if denoising => Some(DENOISED_LINK_TAG),
        _ => gold_tag,
    };
    Some((bucket, tag))
}
