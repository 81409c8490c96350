//! Seed property: loading the same byte buffer twice yields pools whose
//! `getArray` results are bit-equal in order and content (spec.md §8
//! "Pool determinism").

use musx_dom::document::LoadOptions;
use musx_dom::factory::load;
use musx_dom::ids::SCORE_PARTID;

const XML: &str = r#"<finale>
    <others>
        <staff cmper="3"><fullName>Viola</fullName></staff>
        <staff cmper="1"><fullName>Violin I</fullName></staff>
        <staff cmper="2"><fullName>Violin II</fullName></staff>
        <measure cmper="2"><timeSig><beats>3</beats><beatDuration>1024</beatDuration></timeSig></measure>
        <measure cmper="1"><timeSig><beats>4</beats><beatDuration>1024</beatDuration></timeSig></measure>
    </others>
    <entries>
        <entry entnum="2" prev="1" next="0"><dura>1024</dura></entry>
        <entry entnum="1" prev="0" next="2"><dura>512</dura></entry>
    </entries>
</finale>"#;

#[test]
fn two_loads_of_the_same_buffer_produce_bit_equal_pool_order() {
    let first = load(XML, LoadOptions::default()).unwrap();
    let second = load(XML, LoadOptions::default()).unwrap();

    let first_staff_names: Vec<String> = first.staves.get_array(SCORE_PARTID).iter().map(|s| s.full_name.clone()).collect();
    let second_staff_names: Vec<String> = second.staves.get_array(SCORE_PARTID).iter().map(|s| s.full_name.clone()).collect();
    assert_eq!(first_staff_names, second_staff_names);
    assert_eq!(first_staff_names, vec!["Violin I", "Violin II", "Viola"]);

    let first_measure_beats: Vec<i32> = first.measures.get_array(SCORE_PARTID).iter().map(|m| m.time_signature.beats).collect();
    let second_measure_beats: Vec<i32> = second.measures.get_array(SCORE_PARTID).iter().map(|m| m.time_signature.beats).collect();
    assert_eq!(first_measure_beats, second_measure_beats);
    assert_eq!(first_measure_beats, vec![4, 3]);

    let first_entry_numbers: Vec<u32> = first.entries.get_array().iter().map(|e| e.number.0).collect();
    let second_entry_numbers: Vec<u32> = second.entries.get_array().iter().map(|e| e.number.0).collect();
    assert_eq!(first_entry_numbers, second_entry_numbers);
    assert_eq!(first_entry_numbers, vec![2, 1]);
}
