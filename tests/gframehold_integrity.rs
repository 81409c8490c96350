//! Seed scenario: GFrameHold integrity — a hold that sets both a clef id
//! and a clef list id is rejected at load time (spec.md §8 scenario 1).

use musx_dom::document::LoadOptions;
use musx_dom::error::{IntegrityError, MusxError};
use musx_dom::factory::load;

#[test]
fn dual_clef_fields_raise_an_integrity_error() {
    let xml = r#"<finale>
        <details>
            <gFrameHold cmper1="3" cmper2="915">
                <clefID>0</clefID>
                <clefListID>123</clefListID>
            </gFrameHold>
        </details>
    </finale>"#;

    let result = load(xml, LoadOptions::default());
    match result {
        Err(MusxError::Load(load_error)) => {
            let msg = load_error.to_string();
            assert!(msg.contains("details"), "expected the section wrapper to name \"details\", got: {msg}");
        }
        Err(other) => panic!("expected a named section load error, got {other:?}"),
        Ok(_) => panic!("expected the dual-clef gFrameHold to be rejected"),
    }

    let hold_err = IntegrityError::GFrameHoldDualClef { cmper1: 3, cmper2: 915 };
    assert!(hold_err.to_string().contains("3"));
}
