//! Composite identifiers and time units (spec.md §3, glossary).

use std::fmt;

/// Component identifier: names a record within a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cmper(pub u16);

impl Cmper {
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Cmper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Cmper {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Incidence: disambiguates multiple records sharing a `Cmper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Inci(pub i16);

impl Inci {
    pub fn value(&self) -> i16 {
        self.0
    }
}

impl fmt::Display for Inci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i16> for Inci {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

/// Key for notes/chords; forms a doubly linked chain via `prev`/`next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntryNumber(pub u32);

impl fmt::Display for EntryNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntryNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Identifies the score, or a linked part extracted from it.
///
/// `SCORE_PARTID` (0) denotes the score itself; any other value names a
/// linked part's own overriding record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PartId(pub u16);

pub const SCORE_PARTID: PartId = PartId(0);

/// The default scroll-view system, used where no explicit system cmper applies.
pub const BASE_SYSTEM_ID: Cmper = Cmper(0);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == SCORE_PARTID {
            write!(f, "score")
        } else {
            write!(f, "part {}", self.0)
        }
    }
}

impl From<u16> for PartId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Elementary duration unit: 1024 per quarter note.
pub type Edu = i32;

pub const EDU_PER_QUARTER: Edu = 1024;

/// Elementary vertical page unit: 288 per inch (geometry only).
pub type Evpu = i32;

pub const EVPU_PER_INCH: Evpu = 288;
