//! Read-only object model and loader for EnigmaXML, the XML dialect a
//! decompressed Finale `.musx` document unpacks to.
//!
//! Consumers link this crate and call [`Document::load`] with an
//! already-decompressed EnigmaXML buffer; the returned [`Document`] answers
//! queries about instruments, staves, key signatures, entry frames, and
//! text without ever mutating the underlying pools.

pub mod document;
pub mod enigma_text;
pub mod entry_frame;
pub mod error;
pub mod factory;
pub mod fraction;
pub mod ids;
pub mod instrument_map;
pub mod key_signature;
pub mod linker;
pub mod logging;
pub mod pool;
pub mod record;
pub mod registry;
pub mod smufl;
pub mod staff_composite;
pub mod xml;

pub mod prelude {
    //! Common imports for consumers of this crate.
    pub use crate::document::{Document, DocumentRange, LoadOptions, PartVoicingPolicy};
    pub use crate::entry_frame::{build_entry_frame, EntryFrame, EntryInfo};
    pub use crate::error::{MusxError, Result};
    pub use crate::fraction::Fraction;
    pub use crate::ids::{Cmper, Edu, EntryNumber, Evpu, Inci, PartId, SCORE_PARTID};
    pub use crate::instrument_map::InstrumentInfo;
    pub use crate::staff_composite::StaffComposite;
}
