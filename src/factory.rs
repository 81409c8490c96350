//! Factory / Orchestrator (C6): the load-time sequence that turns an
//! EnigmaXML buffer into a populated `Document` (spec.md §4.6).
//!
//! EnigmaXML's typed records are flat grandchildren of `<finale>`'s six
//! top-level sections (`header`, `options`, `others`, `details`, `entries`,
//! `texts`); there is no per-part wrapper element. Each record instead
//! carries its own `part` attribute, defaulting to the score when absent
//! (spec.md §6 "Input format").

use std::collections::{HashMap, HashSet};

use crate::document::{Document, LoadOptions};
use crate::error::{LoadError, MusxError};
use crate::ids::{Cmper, EntryNumber, Inci, PartId, SCORE_PARTID};
use crate::linker::Linker;
use crate::logging;
use crate::pool::PoolKey;
use crate::record::details::{GFrameHold, LyricAssign, MultimeasureRest, NoteShapes, PartVoicing, SecondaryBeamBreak, StaffGroup, TupletDef};
use crate::record::entries::Entry;
use crate::record::header::Header;
use crate::record::options::{BeamOptions, ChordOptions, FontOptions, LyricOptions, MusicSpacingOptions, TieOptions};
use crate::record::others::{
    DrumStaff, Frame, FontDefinition, Measure, MultiStaffInstrumentGroup, NamePositionAbbreviated, NamePositionFull, NotationStyle,
    PartDef, Staff, StaffStyle, StaffStyleAssign, TonalCenterArray,
};
use crate::record::texts::{FileInfoText, LyricKind, LyricText, TextBlock};
use crate::xml::quick_xml_backend::QuickXmlDocument;
use crate::xml::{XmlDocument, XmlElement};

/// `part` attribute on a record element, defaulting to the score when
/// absent (spec.md §6 "`part` defaults to score when absent").
fn record_part<'a, El: XmlElement<'a>>(node: &El) -> PartId {
    match node.attribute("part").and_then(|a| a.as_i64().ok()) {
        Some(value) => PartId(value as u16),
        None => SCORE_PARTID,
    }
}

fn attr_cmper<'a, El: XmlElement<'a>>(node: &El, name: &str) -> Cmper {
    Cmper(node.attribute(name).and_then(|a| a.as_i64().ok()).unwrap_or_default() as u16)
}

/// Loads an EnigmaXML buffer into a `Document` (spec.md §4.6 steps 1-7).
pub fn load(xml: &str, options: LoadOptions) -> Result<Document, MusxError> {
    let parsed = QuickXmlDocument::parse(xml).map_err(MusxError::from)?;
    let root = parsed.root().ok_or_else(|| LoadError::Malformed("document has no root element".into()))?;
    if root.tag_name() != "finale" {
        return Err(LoadError::WrongRootTag { found: root.tag_name().to_string() }.into());
    }

    let mut document = Document::empty();
    document.part_voicing_policy = options.part_voicing_policy;

    document.header = section("header", || match root.first_child(Some("header")) {
        Some(header_node) => Header::populate(&header_node),
        None => {
            logging::empty_section("header");
            Ok(Header::default())
        }
    })?;

    let mut linker = Linker::new();
    let strict = options.strict;

    load_options(&root, &mut document).map_err(|e| wrap_section("options", e))?;
    load_others(&root, &mut document, &mut linker, strict).map_err(|e| wrap_section("others", e))?;
    load_details(&root, &mut document).map_err(|e| wrap_section("details", e))?;
    load_entries(&root, &mut document).map_err(|e| wrap_section("entries", e))?;
    load_texts(&root, &mut document).map_err(|e| wrap_section("texts", e))?;

    linker.run(&document)?;

    assign_auto_number_values(&mut document);
    forward_staff_ids(&mut document);

    let instrument_map = crate::instrument_map::build_instrument_map(&document, SCORE_PARTID);
    document.set_instrument_map(instrument_map);

    let max_blank_pages = document
        .part_defs
        .iter()
        .map(|(_, def)| def.number_of_leading_blank_pages)
        .max()
        .unwrap_or(0);
    document.set_max_blank_pages(max_blank_pages);

    Ok(document)
}

fn wrap_section(node: &str, source: MusxError) -> MusxError {
    LoadError::Section { node: node.to_string(), source: Box::new(source) }.into()
}

fn section<T>(node: &str, f: impl FnOnce() -> Result<T, MusxError>) -> Result<T, MusxError> {
    f().map_err(|e| wrap_section(node, e))
}

fn load_options<'a, El: XmlElement<'a>>(root: &El, document: &mut Document) -> Result<(), MusxError> {
    let Some(options_node) = root.first_child(Some("options")) else {
        logging::empty_section("options");
        return Ok(());
    };
    if let Some(n) = options_node.first_child(Some("fontOptions")) {
        let part = record_part(&n);
        document.font_options.add(PoolKey::new(part, Cmper(0)), FontOptions::populate(&n, part)?);
    }
    if let Some(n) = options_node.first_child(Some("beamOptions")) {
        let part = record_part(&n);
        document.beam_options.add(PoolKey::new(part, Cmper(0)), BeamOptions::populate(&n, part)?);
    }
    if let Some(n) = options_node.first_child(Some("tieOptions")) {
        let part = record_part(&n);
        document.tie_options.add(PoolKey::new(part, Cmper(0)), TieOptions::populate(&n, part)?);
    }
    if let Some(n) = options_node.first_child(Some("musicSpacingOptions")) {
        let part = record_part(&n);
        document.music_spacing_options.add(PoolKey::new(part, Cmper(0)), MusicSpacingOptions::populate(&n, part)?);
    }
    if let Some(n) = options_node.first_child(Some("chordOptions")) {
        let part = record_part(&n);
        document.chord_options.add(PoolKey::new(part, Cmper(0)), ChordOptions::populate(&n, part)?);
    }
    if let Some(n) = options_node.first_child(Some("lyricOptions")) {
        let part = record_part(&n);
        document.lyric_options.add(PoolKey::new(part, Cmper(0)), LyricOptions::populate(&n, part)?);
    }
    Ok(())
}

fn load_others<'a, El: XmlElement<'a>>(root: &El, document: &mut Document, linker: &mut Linker, strict: bool) -> Result<(), MusxError> {
    let Some(others_node) = root.first_child(Some("others")) else {
        logging::empty_section("others");
        return Ok(());
    };

    for n in others_node.children(Some("measure")) {
        let part = record_part(&n);
        let measure = Measure::populate(&n, part)?;
        document.measures.add(PoolKey::new(part, measure.cmper), measure);
    }
    for n in others_node.children(Some("staff")) {
        let part = record_part(&n);
        let staff = Staff::populate(&n, part, strict)?;
        document.staves.add(PoolKey::new(part, staff.cmper), staff);
    }
    for n in others_node.children(Some("staffStyle")) {
        let part = record_part(&n);
        let style = StaffStyle::populate(&n, part, strict)?;
        document.staff_styles.add(PoolKey::new(part, style.cmper), style);
    }
    for n in others_node.children(Some("drumStaff")) {
        let part = record_part(&n);
        let drum_staff = DrumStaff::populate(&n, part)?;
        document.drum_staves.add(PoolKey::new(part, drum_staff.cmper), drum_staff);
    }
    for n in others_node.children(Some("namePositionFull")) {
        let part = record_part(&n);
        let name_pos = NamePositionFull::populate(&n, part)?;
        document.name_position_fulls.add(PoolKey::new(part, name_pos.cmper), name_pos);
    }
    for n in others_node.children(Some("namePositionAbbreviated")) {
        let part = record_part(&n);
        let name_pos = NamePositionAbbreviated::populate(&n, part)?;
        document.name_position_abbreviateds.add(PoolKey::new(part, name_pos.cmper), name_pos);
    }
    for n in others_node.children(Some("staffStyleAssign")) {
        let part = record_part(&n);
        let staff_cmper = attr_cmper(&n, "cmper1");
        let inci = Inci(n.attribute("inci").and_then(|a| a.as_i64().ok()).unwrap_or_default() as i16);
        let assign = StaffStyleAssign::populate(&n, part, staff_cmper, inci)?;
        document.staff_style_assigns.add(PoolKey::new(part, staff_cmper).with_inci(inci), assign);
    }
    for n in others_node.children(Some("frame")) {
        let part = record_part(&n);
        let frame = Frame::populate(&n, part)?;
        document.frames.add(PoolKey::new(part, frame.cmper), frame);
    }
    for n in others_node.children(Some("multiStaffInstrumentGroup")) {
        let part = record_part(&n);
        let group = MultiStaffInstrumentGroup::populate(&n, part)?;
        document.multi_staff_instrument_groups.add(PoolKey::new(part, group.cmper), group);
    }
    for n in others_node.children(Some("partDef")) {
        let part = record_part(&n);
        let def = PartDef::populate(&n)?;
        document.part_defs.add(PoolKey::new(part, def.cmper), def);
    }
    for n in others_node.children(Some("tonalCenterArray")) {
        let part = record_part(&n);
        let array = TonalCenterArray::populate(&n, part)?;
        document.tonal_center_arrays.add(PoolKey::new(part, array.cmper), array);
    }
    for n in others_node.children(Some("fontDefinition")) {
        let part = record_part(&n);
        let font = FontDefinition::populate(&n, part)?;
        document.font_definitions.add(PoolKey::new(part, font.cmper), font);
    }

    for n in others_node.children(Some("staffGroup")) {
        let part = record_part(&n);
        let cmper = attr_cmper(&n, "cmper1");
        let group = StaffGroup::populate(&n, part)?;
        document.staff_groups.add(PoolKey::new(part, cmper), group);
        let key = format!("others/staffGroup/{part}/{cmper}");
        linker.register(key, move |doc| {
            let Some(group) = doc.staff_groups.get(PoolKey::new(part, cmper)) else { return Ok(()) };
            let mut staves: Vec<Cmper> = doc
                .staves
                .get_array(part)
                .into_iter()
                .map(|s| s.cmper)
                .filter(|c| *c >= group.start_inst && *c <= group.end_inst)
                .collect();
            staves.sort_unstable();
            doc.set_staff_group_staves(part, cmper, staves);
            Ok(())
        });
    }

    Ok(())
}

fn load_details<'a, El: XmlElement<'a>>(root: &El, document: &mut Document) -> Result<(), MusxError> {
    let Some(details_node) = root.first_child(Some("details")) else {
        logging::empty_section("details");
        return Ok(());
    };

    for n in details_node.children(Some("gFrameHold")) {
        let part = record_part(&n);
        let hold = GFrameHold::populate(&n, part)?;
        hold.check_integrity()?;
        document.gframe_holds.add(PoolKey::new(part, hold.staff_cmper).with_cmper2(hold.measure_cmper), hold);
    }
    for n in details_node.children(Some("tupletDef")) {
        let part = record_part(&n);
        let entry = EntryNumber(n.attribute("entnum").and_then(|a| a.as_i64().ok()).unwrap_or_default() as u32);
        document.tuplet_defs.add(part, entry, TupletDef::populate(&n, part, entry)?);
    }
    for n in details_node.children(Some("secondaryBeamBreak")) {
        let part = record_part(&n);
        let entry = EntryNumber(n.attribute("entnum").and_then(|a| a.as_i64().ok()).unwrap_or_default() as u32);
        document.secondary_beam_breaks.add(part, entry, SecondaryBeamBreak::populate(&n, part, entry)?);
    }
    for n in details_node.children(Some("lyricAssign")) {
        let part = record_part(&n);
        let entry = EntryNumber(n.attribute("entnum").and_then(|a| a.as_i64().ok()).unwrap_or_default() as u32);
        document.lyric_assigns.add(part, entry, LyricAssign::populate(&n, part, entry)?);
    }
    for n in details_node.children(Some("partVoicing")) {
        let part = record_part(&n);
        let staff_cmper = attr_cmper(&n, "cmper1");
        document.part_voicings.add(PoolKey::new(part, staff_cmper), PartVoicing::populate(&n, part, staff_cmper)?);
    }
    for n in details_node.children(Some("noteShapes")) {
        let part = record_part(&n);
        let staff_cmper = attr_cmper(&n, "cmper1");
        let shapes = NoteShapes::populate(&n, part, staff_cmper)?;
        document.note_shapes.add(PoolKey::new(part, staff_cmper), shapes);
    }
    for n in details_node.children(Some("multimeasureRest")) {
        let part = record_part(&n);
        let staff_cmper = attr_cmper(&n, "cmper1");
        let start_measure = attr_cmper(&n, "cmper2");
        let rest = MultimeasureRest::populate(&n, part, staff_cmper, start_measure)?;
        document.multimeasure_rests.add(PoolKey::new(part, staff_cmper).with_cmper2(start_measure), rest);
    }

    Ok(())
}

fn load_entries<'a, El: XmlElement<'a>>(root: &El, document: &mut Document) -> Result<(), MusxError> {
    let Some(entries_node) = root.first_child(Some("entries")) else {
        logging::empty_section("entries");
        return Ok(());
    };
    for n in entries_node.children(Some("entry")) {
        document.entries.add(Entry::populate(&n)?);
    }
    Ok(())
}

fn load_texts<'a, El: XmlElement<'a>>(root: &El, document: &mut Document) -> Result<(), MusxError> {
    let Some(texts_node) = root.first_child(Some("texts")) else {
        logging::empty_section("texts");
        return Ok(());
    };
    for n in texts_node.children(Some("textBlock")) {
        let block = TextBlock::populate(&n)?;
        document.text_blocks.add(PoolKey::new(SCORE_PARTID, block.cmper), block);
    }

    let punctuation = document
        .lyric_options
        .get(PoolKey::new(SCORE_PARTID, Cmper(0)))
        .map(|o| o.lyric_punctuation_to_ignore.as_str())
        .unwrap_or("");
    for (tag, kind) in [("lyricVerse", LyricKind::Verse), ("lyricChorus", LyricKind::Chorus), ("lyricSection", LyricKind::Section)] {
        for n in texts_node.children(Some(tag)) {
            document.lyric_texts.push(LyricText::populate(&n, kind, punctuation)?);
        }
    }

    if let Some(n) = texts_node.first_child(Some("fileInfo")) {
        let cmper = Cmper(n.attribute("number").and_then(|a| a.as_i64().ok()).unwrap_or_default() as u16);
        let value = n.first_child(Some("text")).map(|t| crate::xml::text_as_string(&t)).unwrap_or_default();
        document.file_info = Some(FileInfoText { cmper, value });
    }

    Ok(())
}

/// The score's staves in cmper order — the "scroll view" the auto-numbering
/// and forwarding passes walk (spec.md §4.6 step 6). No per-system
/// visibility model exists yet (spec.md §4.12
/// "calc_has_varying_system_staves"), so this is every score staff.
fn scroll_view_staves(document: &Document) -> Vec<Cmper> {
    let mut staves = document.staves.get_array(SCORE_PARTID);
    staves.sort_by_key(|s| s.cmper.value());
    staves.iter().map(|s| s.cmper).collect()
}

/// Auto-numbering, three passes over the scroll view (spec.md §4.7
/// "Auto-numbering"), ported from
/// `examples/original_source/src/musx/dom/Staff.cpp::calcAllAutoNumberValues`:
/// (1) collect instUuids with auto-numbering disabled, (2) count each
/// remaining instUuid's occurrences, treating a multi-staff instrument as
/// one instance and dropping singletons, (3) assign 1-based numbers in
/// scroll-view order, giving every staff in a multi-staff group the same
/// number.
fn assign_auto_number_values(document: &mut Document) {
    let scroll_view = scroll_view_staves(document);

    let group_of: HashMap<Cmper, Cmper> = document
        .multi_staff_instrument_groups
        .get_array(SCORE_PARTID)
        .iter()
        .flat_map(|group| group.staves.iter().map(move |staff| (*staff, group.cmper)))
        .collect();

    let mut disabled_uuids: HashSet<String> = HashSet::new();
    for cmper in &scroll_view {
        if let Some(staff) = document.staves.get(PoolKey::new(SCORE_PARTID, *cmper)) {
            if !staff.auto_numbering_style.enabled {
                disabled_uuids.insert(staff.inst_uuid.clone());
            }
        }
    }

    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut counted_groups: HashSet<Cmper> = HashSet::new();
    for cmper in &scroll_view {
        let Some(staff) = document.staves.get(PoolKey::new(SCORE_PARTID, *cmper)) else { continue };
        if staff.inst_uuid.is_empty() || disabled_uuids.contains(&staff.inst_uuid) {
            continue;
        }
        if let Some(group) = group_of.get(cmper) {
            if !counted_groups.insert(*group) {
                continue;
            }
        }
        *counts.entry(staff.inst_uuid.clone()).or_insert(0) += 1;
    }
    for (uuid, count) in &counts {
        if *count <= 1 {
            disabled_uuids.insert(uuid.clone());
        }
    }

    let mut numbers: HashMap<String, u32> = HashMap::new();
    let mut numbered_groups: HashMap<Cmper, u32> = HashMap::new();
    for cmper in &scroll_view {
        let inst_uuid = document.staves.get(PoolKey::new(SCORE_PARTID, *cmper)).map(|s| s.inst_uuid.clone()).unwrap_or_default();

        let value = if inst_uuid.is_empty() || disabled_uuids.contains(&inst_uuid) {
            None
        } else if let Some(group) = group_of.get(cmper) {
            if let Some(existing) = numbered_groups.get(group) {
                Some(*existing)
            } else {
                let n = *numbers.entry(inst_uuid.clone()).and_modify(|v| *v += 1).or_insert(1);
                numbered_groups.insert(*group, n);
                Some(n)
            }
        } else {
            Some(*numbers.entry(inst_uuid.clone()).and_modify(|v| *v += 1).or_insert(1))
        };

        if let Some(staff) = document.staves.get_mut(PoolKey::new(SCORE_PARTID, *cmper)) {
            staff.auto_number_value = value;
        }
    }
}

/// Forwards `percussionMapId`/`noteShapesId`/`fullNamePosId`/`abrvNamePosId`
/// from the document's drum-library, note-shape and name-position records
/// onto each raw staff (spec.md §3 "Lifecycle"), ported from
/// `examples/original_source/src/musx/dom/Staff.cpp::calcAllRuntimeValues`.
fn forward_staff_ids(document: &mut Document) {
    for cmper in scroll_view_staves(document) {
        let notation_style = document.staves.get(PoolKey::new(SCORE_PARTID, cmper)).map(|s| s.notation_style);

        let percussion_map_id = match notation_style {
            Some(NotationStyle::Percussion) => match document.drum_staves.get(PoolKey::new(SCORE_PARTID, cmper)) {
                Some(drum) => Some(drum.which_drum_lib),
                None => {
                    log::warn!("staff {cmper} is percussion style but has no drum staff record");
                    None
                }
            },
            _ => None,
        };
        let note_shapes_id = document.note_shapes.get(PoolKey::new(SCORE_PARTID, cmper)).map(|_| cmper);
        let full_name_pos_id = document.name_position_fulls.get(PoolKey::new(SCORE_PARTID, cmper)).map(|_| cmper);
        let abrv_name_pos_id = document.name_position_abbreviateds.get(PoolKey::new(SCORE_PARTID, cmper)).map(|_| cmper);

        if let Some(staff) = document.staves.get_mut(PoolKey::new(SCORE_PARTID, cmper)) {
            staff.percussion_map_id = percussion_map_id;
            staff.note_shapes_id = note_shapes_id;
            staff.full_name_pos_id = full_name_pos_id;
            staff.abrv_name_pos_id = abrv_name_pos_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_root_tag_is_rejected() {
        let result = load("<notfinale/>", LoadOptions::default());
        assert!(matches!(result, Err(MusxError::Load(LoadError::WrongRootTag { .. }))));
    }

    #[test]
    fn minimal_document_loads_with_empty_pools() {
        let document = load("<finale></finale>", LoadOptions::default()).unwrap();
        assert!(document.measures.is_empty());
        assert!(document.instrument_map().is_some());
        assert_eq!(document.max_blank_pages(), 0);
    }

    #[test]
    fn loads_a_staff_and_a_measure_for_the_score_part() {
        let xml = r#"<finale>
            <others>
                <staff cmper="1"><fullName>Violin</fullName></staff>
                <measure cmper="1"><timeSig><beats>4</beats><beatDuration>1024</beatDuration></timeSig></measure>
            </others>
        </finale>"#;
        let document = load(xml, LoadOptions::default()).unwrap();
        assert_eq!(document.staves.get_array(SCORE_PARTID).len(), 1);
        let measure = document.measures.get(PoolKey::new(SCORE_PARTID, Cmper(1))).unwrap();
        assert_eq!(measure.time_signature.beats, 4);
    }

    #[test]
    fn a_part_scoped_record_overrides_the_score_without_hiding_it() {
        let xml = r#"<finale>
            <others>
                <staff cmper="1"><fullName>Violin</fullName></staff>
                <staff cmper="1" part="1" shared="false"><fullName>Violin I</fullName></staff>
            </others>
        </finale>"#;
        let document = load(xml, LoadOptions::default()).unwrap();
        assert_eq!(document.staves.get(PoolKey::new(SCORE_PARTID, Cmper(1))).unwrap().full_name, "Violin");
        assert_eq!(document.staves.get(PoolKey::new(PartId(1), Cmper(1))).unwrap().full_name, "Violin I");
    }

    #[test]
    fn malformed_section_is_wrapped_in_a_named_load_error() {
        let xml = r#"<finale>
            <others>
                <frame cmper="1"><startEntry>1</startEntry><startTime>10</startTime></frame>
            </others>
        </finale>"#;
        let result = load(xml, LoadOptions::default());
        match result {
            Err(MusxError::Load(LoadError::Section { node, .. })) => assert_eq!(node, "others"),
            Err(other) => panic!("expected a named section error, got {other:?}"),
            Ok(_) => panic!("expected a named section error, got Ok"),
        }
    }
}
