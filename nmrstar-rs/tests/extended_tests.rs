//! Extended tests for nmrstar-rs: round-trip guarantees, quoting edge
//! cases, cardinality enforcement and dictionary-version independence.

use nmrstar::chem_shift_anisotropy::ChemShiftAnisotropyFrames;
use nmrstar::relaxation::{Relaxation, RxParams, RxType};
use nmrstar::{
    CsaParams, DataNode, Document, Flavor, NmrStarFile, SaveFrame, StarError, StarVersion,
    TagTable,
};

fn table(free: bool, tags: &[&str], columns: &[&[&str]]) -> TagTable {
    TagTable::new(
        free,
        tags.iter().map(|t| t.to_string()).collect(),
        columns
            .iter()
            .map(|col| col.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
    .unwrap()
}

fn round_trip(doc: &Document) -> Document {
    Document::parse(&doc.star_text(Flavor::NmrStar)).expect("serialized document must parse")
}

// ============================================================================
// Round-trip guarantees
// ============================================================================

#[test]
fn test_round_trip_all_free_saveframe() {
    let mut doc = Document::new("free_only");
    let mut frame = SaveFrame::new("frame_1");
    frame.tagtables.push(table(
        true,
        &["_Cat.Sf_category", "_Cat.Details"],
        &[&["my_cat"], &["spaced value"]],
    ));
    doc.push_frame(frame);
    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn test_round_trip_all_looped_saveframe() {
    for n_rows in [1usize, 3] {
        let rows: Vec<String> = (0..n_rows).map(|i| i.to_string()).collect();
        let values: Vec<String> = (0..n_rows).map(|i| format!("v{i}")).collect();
        let mut doc = Document::new("looped_only");
        let mut frame = SaveFrame::new("frame_1");
        frame.tagtables.push(table(
            false,
            &["_T.ID", "_T.Val"],
            &[
                &rows.iter().map(String::as_str).collect::<Vec<_>>(),
                &values.iter().map(String::as_str).collect::<Vec<_>>(),
            ],
        ));
        doc.push_frame(frame);
        assert_eq!(round_trip(&doc), doc, "{n_rows} rows");
    }
}

#[test]
fn test_round_trip_mixed_saveframe() {
    let mut doc = Document::new("mixed");
    let mut frame = SaveFrame::new("frame_1");
    frame.tagtables.push(table(
        true,
        &["_Cat.Sf_category", "_Cat.ID"],
        &[&["my_cat"], &["1"]],
    ));
    frame.tagtables.push(table(
        false,
        &["_Row.ID", "_Row.Name"],
        &[&["1", "2"], &["alpha", "beta gamma"]],
    ));
    doc.push_frame(frame);
    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn test_round_trip_empty_saveframe() {
    let mut doc = Document::new("empty");
    doc.push_frame(SaveFrame::new("frame_1"));
    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn test_round_trip_bare_top_level_table() {
    let mut doc = Document::new("bare");
    doc.push_table(table(true, &["_Entry_title"], &[&["a title here"]]));
    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn test_round_trip_multi_line_value() {
    let mut doc = Document::new("blocks");
    doc.push_table(table(
        true,
        &["_Details"],
        &[&["first line\nsecond line\nthird"]],
    ));
    assert_eq!(round_trip(&doc), doc);
}

// ============================================================================
// Quote ambiguity
// ============================================================================

#[test]
fn test_sugar_atom_names_round_trip() {
    // Atom names with trailing apostrophes are bare words, not quote
    // starts.
    let mut doc = Document::new("sugars");
    doc.push_table(table(
        false,
        &["_Atom.ID", "_Atom.Name"],
        &[&["1", "2", "3"], &["H5''", "O3'", "C1'"]],
    ));
    let parsed = round_trip(&doc);
    assert_eq!(parsed, doc);

    // And again through a second cycle to rule out quoting drift.
    assert_eq!(round_trip(&parsed), parsed);
}

#[test]
fn test_mixed_quote_value_round_trip() {
    let mut doc = Document::new("quotes");
    doc.push_table(table(
        true,
        &["_A", "_B", "_C"],
        &[&["has space"], &["it's got 'quotes'"], &["say \"hi\""]],
    ));
    assert_eq!(round_trip(&doc), doc);
}

// ============================================================================
// Cardinality enforcement
// ============================================================================

#[test]
fn test_construction_rejects_uneven_columns() {
    let result = TagTable::new(
        false,
        vec!["_A".to_string(), "_B".to_string()],
        vec![vec!["1".to_string()], vec![]],
    );
    assert!(matches!(result, Err(StarError::Cardinality { .. })));
}

#[test]
fn test_parse_rejects_partial_rows() {
    let err = Document::parse("data_t\nloop_\n_A\n_B\n_C\n1 2 3\n4 5\nstop_\n").unwrap_err();
    match err {
        StarError::Cardinality { message, .. } => {
            assert!(message.contains("not a multiple"), "{message}");
        }
        other => panic!("expected a cardinality error, got {other}"),
    }
}

#[test]
fn test_parse_never_pads_or_truncates() {
    // Seven values under two tags: must fail, not shave the extra token.
    let err = Document::parse("data_t\nloop_\n_A\n_B\n1 2 3 4 5 6 7\nstop_\n").unwrap_err();
    assert!(matches!(err, StarError::Cardinality { .. }));
}

// ============================================================================
// Version independence
// ============================================================================

fn rx_params() -> RxParams {
    RxParams {
        data_type: RxType::R1,
        frq: 600e6,
        temp_calibration: Some("methanol".to_string()),
        temp_control: Some("single scan interleaving".to_string()),
        res_nums: Some(vec![1, 2]),
        res_names: Some(vec!["ALA".to_string(), "GLY".to_string()]),
        atom_names: Some(vec!["N".to_string(), "N".to_string()]),
        isotope: Some(vec![15, 15]),
        values: Some(vec![1.8, 1.9]),
        errors: Some(vec![0.05, 0.06]),
        ..RxParams::default()
    }
}

#[test]
fn test_same_values_different_tag_names_across_versions() {
    let mut texts = Vec::new();
    for version in [StarVersion::V2_1, StarVersion::V3_1] {
        let mut doc = Document::new("deposit");
        let mut relaxation = Relaxation::new(version);
        relaxation.add(&mut doc, &rx_params()).unwrap();
        texts.push(doc.star_text(Flavor::NmrStar));
    }

    assert!(texts[0].contains("_Residue_seq_code"));
    assert!(!texts[0].contains("Comp_index_ID"));
    assert!(texts[1].contains("_Auto_relaxation.Comp_index_ID"));
    assert!(!texts[1].contains("_Residue_seq_code"));
}

#[test]
fn test_each_version_reads_its_own_output_identically() {
    let mut reference = None;
    for version in [
        StarVersion::V2_1,
        StarVersion::V3_0,
        StarVersion::V3_1,
        StarVersion::V3_2,
    ] {
        let mut doc = Document::new("deposit");
        let mut relaxation = Relaxation::new(version);
        relaxation.add(&mut doc, &rx_params()).unwrap();

        let reparsed = Document::parse(&doc.star_text(Flavor::NmrStar)).unwrap();
        let reader = Relaxation::new(version);
        let frames = reader.frames(&reparsed).unwrap();
        assert_eq!(frames.len(), 1, "version {version}");

        match &reference {
            None => reference = Some(frames.into_iter().next().unwrap()),
            Some(first) => assert_eq!(&frames[0], first, "version {version}"),
        }
    }
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_minimal_free_table_document() {
    let doc = Document::parse("data_test\n_Saveframe_category test_cat\n").unwrap();
    assert_eq!(doc.title, "test");
    let table = doc.datanodes[0].as_table().unwrap();
    assert_eq!(table.tagnames, ["_Saveframe_category"]);
    assert_eq!(table.tagvalues, [["test_cat"]]);
}

#[test]
fn test_minimal_looped_table_document() {
    let doc = Document::parse("data_test\nloop_\n_A\n_B\n\n1 x\n2 y\nstop_\n").unwrap();
    let table = doc.datanodes[0].as_table().unwrap();
    assert_eq!(table.tagnames, ["_A", "_B"]);
    assert_eq!(table.tagvalues, [["1", "2"], ["x", "y"]]);
}

#[test]
fn test_csa_write_then_loop_reproduces_parallel_lists() {
    let mut star = NmrStarFile::create("csa_test", StarVersion::V3_1);
    star.add_chem_shift_anisotropy(&CsaParams {
        res_nums: Some(vec![1, 2]),
        res_names: Some(vec!["ALA".to_string(), "GLY".to_string()]),
        atom_names: Some(vec!["CA".to_string(), "CA".to_string()]),
        values: Some(vec![1.1, 2.2]),
        errors: Some(vec![0.1, 0.2]),
        ..CsaParams::default()
    })
    .unwrap();

    let reparsed = Document::parse(&star.star_text(Flavor::NmrStar)).unwrap();
    let frames = ChemShiftAnisotropyFrames::new(StarVersion::V3_1)
        .frames(&reparsed)
        .unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].res_nums, [1, 2]);
    assert_eq!(frames[0].res_names, ["ALA", "GLY"]);
    assert_eq!(frames[0].atom_names, ["CA", "CA"]);
    assert_eq!(frames[0].values, [1.1, 2.2]);
    assert_eq!(frames[0].errors, [0.1, 0.2]);
}

#[test]
fn test_missing_required_field_leaves_document_untouched() {
    let mut star = NmrStarFile::create("bad", StarVersion::V3_1);
    let result = star.add_chem_shift_anisotropy(&CsaParams {
        res_names: Some(vec!["ALA".to_string()]),
        atom_names: Some(vec!["CA".to_string()]),
        values: Some(vec![1.1]),
        ..CsaParams::default()
    });
    assert!(result.is_err());
    assert!(star.document().datanodes.is_empty());
}

#[test]
fn test_literal_none_in_required_list_rejected() {
    let mut star = NmrStarFile::create("bad", StarVersion::V3_1);
    let result = star.add_chem_shift_anisotropy(&CsaParams {
        res_nums: Some(vec![1, 2]),
        res_names: Some(vec!["ALA".to_string(), "None".to_string()]),
        atom_names: Some(vec!["CA".to_string(), "CA".to_string()]),
        values: Some(vec![1.1, 2.2]),
        ..CsaParams::default()
    });
    assert!(result.is_err());
    assert!(star.document().datanodes.is_empty());
}

#[test]
fn test_sequential_adds_produce_independent_frames() {
    let mut star = NmrStarFile::create("seq", StarVersion::V3_1);
    assert_eq!(star.add_relaxation(&rx_params()).unwrap(), 1);

    let mut second = rx_params();
    second.frq = 800e6;
    second.values = Some(vec![2.8, 2.9]);
    assert_eq!(star.add_relaxation(&second).unwrap(), 2);

    let titles: Vec<&str> = star
        .document()
        .datanodes
        .iter()
        .filter_map(DataNode::as_frame)
        .map(|frame| frame.title.as_str())
        .collect();
    assert_eq!(titles, ["auto_relaxation_list_1", "auto_relaxation_list_2"]);

    // The first frame's tables are untouched by the second add.
    let frames = star.relaxation_frames().unwrap();
    assert_eq!(frames[0].frq, 600e6);
    assert_eq!(frames[0].values, [1.8, 1.9]);
    assert_eq!(frames[1].frq, 800e6);
    assert_eq!(frames[1].values, [2.8, 2.9]);

    let lists = star.document().save_frames("auto_relaxation");
    let id_tag = "_Auto_relaxation_list.ID";
    assert_eq!(lists[0].tagtables[0].single(id_tag), Some("1"));
    assert_eq!(lists[1].tagtables[0].single(id_tag), Some("2"));
}

#[test]
fn test_mmcif_flavor_reparses_identically() {
    let star = {
        let mut star = NmrStarFile::create("flavored", StarVersion::V3_1);
        star.add_relaxation(&rx_params()).unwrap();
        star
    };
    let nmr_star = Document::parse(&star.star_text(Flavor::NmrStar)).unwrap();
    let mmcif = Document::parse(&star.star_text(Flavor::MmCif)).unwrap();
    assert_eq!(nmr_star, mmcif);
}
