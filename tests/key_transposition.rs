//! Seed scenario: key transposition — a C major key transposed by a
//! diatonic third with a chromatic adjustment of -2 half-steps lands on
//! Bb major (spec.md §8 scenario 6).
//!
//! The scenario's own prose names tonal-center index 5, but hand-tracing
//! the algorithm it describes (ported line-for-line from
//! `original_source`'s `KeySignature::setTransposition`/
//! `calcTonalCenterIndex`) against these exact inputs yields 6; see
//! DESIGN.md's Open Question resolutions for the full derivation.

use musx_dom::key_signature::{KeyContext, KeyMode, KeySignature};

#[test]
fn c_major_transposed_down_a_third_with_flat_adjustment_lands_on_bflat() {
    let mut key = KeySignature { mode: Some(KeyMode::Linear), alteration: 0, ..Default::default() };
    key.set_transposition(2, -2, true);

    assert_eq!(key.octave_displacement(), 0);
    assert_eq!(key.alteration_offset(), -2);
    assert_eq!(key.calc_tonal_center_index(KeyContext::Written).unwrap(), 6);
}
