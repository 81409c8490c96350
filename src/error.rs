//! Error kinds for loading and querying an EnigmaXML document (spec.md §7).

use thiserror::Error;

/// A typed conversion on an XML attribute or text node failed.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("expected an integer, found {value:?}")]
    NotAnInteger { value: String },
    #[error("expected a floating-point number, found {value:?}")]
    NotAFloat { value: String },
    #[error("expected a boolean (true/false), found {value:?}")]
    NotABool { value: String },
    #[error("expected a single Unicode code point, found {value:?}")]
    NotACodepoint { value: String },
}

/// An unrecognized XML child tag or enum token was encountered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} {token:?} in {context}")]
pub struct UnknownXml {
    pub kind: UnknownXmlKind,
    pub token: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownXmlKind {
    Tag,
    EnumToken,
}

impl std::fmt::Display for UnknownXmlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownXmlKind::Tag => write!(f, "tag"),
            UnknownXmlKind::EnumToken => write!(f, "enum token"),
        }
    }
}

/// A record's invariant was violated after population.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("GFrameHold ({cmper1},{cmper2}) has both a clef id and a clef list id set")]
    GFrameHoldDualClef { cmper1: i32, cmper2: i32 },
    #[error("Frame {cmper} has both a start/end entry range and a start-time placeholder")]
    FrameDualShape { cmper: i32 },
    #[error("layer pool for staff {staff}, measure {measure} has {found} layers, expected 4")]
    LayerCountMismatch { staff: i32, measure: i32, found: usize },
    #[error("multi-measure rest at measure {measure} spans zero bars")]
    ZeroSpanMultimeasureRest { measure: i32 },
    #[error("GFrameHold ({cmper1},{cmper2}) is missing a clef mode")]
    GFrameHoldMissingClefMode { cmper1: i32, cmper2: i32 },
    #[error("{0}")]
    Other(String),
}

/// A query precondition failed at read time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    #[error("staff {staff} is not present in part {part}")]
    StaffNotInPart { part: i32, staff: i32 },
    #[error("transposition parent staff is missing for staff {staff}")]
    TranspositionParentMissing { staff: i32 },
    #[error("iteration requested on a malformed frame (cmper {cmper})")]
    MalformedFrame { cmper: i32 },
    #[error("key signature mode is neither linear nor non-linear")]
    InvalidKeyMode,
}

/// A numeric conversion exceeded its valid range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutOfRange {
    #[error("Roman numeral {0} is out of range 1..3999")]
    RomanNumeral(i64),
    #[error("alphabetic suffix index {0} must be positive")]
    AlphabeticSuffix(i64),
}

/// Top-level load failure: XML not well-formed, wrong root tag, or a
/// required section malformed. Always names the failing node (spec.md §4.6).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("XML is not well-formed: {0}")]
    Malformed(String),
    #[error("root element is {found:?}, expected \"finale\"")]
    WrongRootTag { found: String },
    #[error("failed to load section <{node}>: {source}")]
    Section {
        node: String,
        #[source]
        source: Box<MusxError>,
    },
}

/// Unified error type threaded through the public API.
#[derive(Error, Debug)]
pub enum MusxError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Unknown(#[from] UnknownXml),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Logic(#[from] LogicError),
    #[error(transparent)]
    Range(#[from] OutOfRange),
}

pub type Result<T> = std::result::Result<T, MusxError>;
