//! Self letters: short time-locked notes to one's future self.
//!
//! Unlike a capsule, a self letter has no draft phase and no teaser phase —
//! it is sealed the moment it is created and can never be edited or
//! deleted. Its content stays hidden (even from its author) until the
//! scheduled open instant, and after opening the author may record a
//! one-time reflection on whether the note came true.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{SelfLetterId, Timestamp, UserId};

// ── LifeArea ─────────────────────────────────────────────────────────────────

/// Which part of life the letter is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeArea {
    #[serde(rename = "self")]
    Myself,
    Work,
    Family,
    Money,
    Health,
}

impl LifeArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeArea::Myself => "self",
            LifeArea::Work => "work",
            LifeArea::Family => "family",
            LifeArea::Money => "money",
            LifeArea::Health => "health",
        }
    }
}

impl fmt::Display for LifeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(LifeArea::Myself),
            "work" => Ok(LifeArea::Work),
            "family" => Ok(LifeArea::Family),
            "money" => Ok(LifeArea::Money),
            "health" => Ok(LifeArea::Health),
            other => Err(format!(
                "life_area must be one of self, work, family, money, health (got {other})"
            )),
        }
    }
}

// ── ReflectionAnswer ─────────────────────────────────────────────────────────

/// The one-time post-open reflection: did it come true?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionAnswer {
    Yes,
    No,
    Skipped,
}

impl ReflectionAnswer {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReflectionAnswer::Yes => "yes",
            ReflectionAnswer::No => "no",
            ReflectionAnswer::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ReflectionAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReflectionAnswer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(ReflectionAnswer::Yes),
            "no" => Ok(ReflectionAnswer::No),
            "skipped" => Ok(ReflectionAnswer::Skipped),
            other => Err(format!(
                "answer must be one of yes, no, skipped (got {other})"
            )),
        }
    }
}

// ── SelfLetter ───────────────────────────────────────────────────────────────

/// A self letter as stored in the state DB. Immutable after creation except
/// for the open/reflection timestamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfLetter {
    pub id: SelfLetterId,
    pub owner_id: UserId,

    pub title: Option<String>,
    /// 20..=500 characters after sanitation.
    pub content: String,
    pub char_count: usize,

    pub mood: Option<String>,
    pub life_area: Option<LifeArea>,
    pub city: Option<String>,

    /// The instant the content becomes readable again.
    pub scheduled_open_at: Timestamp,
    /// Set exactly once, at first open.
    pub opened_at: Option<Timestamp>,

    /// One-time; `reflected_at` is set alongside it.
    pub reflection_answer: Option<ReflectionAnswer>,
    pub reflected_at: Option<Timestamp>,

    pub created_at: Timestamp,
}

impl SelfLetter {
    /// True once the scheduled open instant has passed.
    pub fn is_openable(&self, now: Timestamp) -> bool {
        now >= self.scheduled_open_at
    }
}
