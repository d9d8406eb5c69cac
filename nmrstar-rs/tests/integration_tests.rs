//! Integration tests for nmrstar-rs
//!
//! These tests run against the checked-in fixture at
//! `./nmrstar-rs/data/deposition.str`.

use std::path::PathBuf;

use fallible_iterator::FallibleIterator;
use nmrstar::iterator::{RelaxationIterator, for_each_relaxation_frame};
use nmrstar::relaxation::RxType;
use nmrstar::{Document, Flavor, NmrStarFile, StarVersion};

/// Get path to test fixture
fn test_file_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("deposition.str");
    path
}

fn open_test_file() -> NmrStarFile {
    NmrStarFile::open(test_file_path()).expect("Failed to open test deposition")
}

#[test]
fn test_open_deposition() {
    let star = open_test_file();
    assert_eq!(star.document().title, "relax_deposition");
}

#[test]
fn test_version_detected() {
    let star = open_test_file();
    assert_eq!(star.version(), StarVersion::V3_1);
}

#[test]
fn test_top_level_node_count() {
    let star = open_test_file();
    // entry information, entity, sample conditions, two relaxation lists,
    // model-free results
    assert_eq!(star.document().datanodes.len(), 6);
}

#[test]
fn test_save_frames_by_category() {
    let star = open_test_file();
    let frames = star.document().save_frames("auto_relaxation");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].title, "auto_relaxation_list_1");
    assert_eq!(frames[1].title, "auto_relaxation_list_2");
}

#[test]
fn test_entry_details_multi_line_value() {
    let star = open_test_file();
    let entry = &star.document().save_frames("entry_information")[0];
    let details = entry.tagtables[0].single("_Entry.Details").unwrap();
    assert!(details.starts_with("Relaxation data recorded at two fields."));
    assert!(details.contains('\n'));
}

#[test]
fn test_relaxation_frames() {
    let star = open_test_file();
    let frames = star.relaxation_frames().unwrap();
    assert_eq!(frames.len(), 2);

    let r1 = &frames[0];
    assert_eq!(r1.data_type, RxType::R1);
    assert_eq!(r1.frq, 600e6);
    assert_eq!(r1.res_nums, [1, 2, 3]);
    assert_eq!(r1.res_names, ["MET", "GLN", "ILE"]);
    assert_eq!(r1.atom_names, ["N", "N", "N"]);
    assert_eq!(r1.values, [1.81, 1.92, 1.88]);
    assert_eq!(r1.errors, [0.05, 0.06, 0.05]);

    let r2 = &frames[1];
    assert_eq!(r2.data_type, RxType::R2);
    assert_eq!(r2.values, [11.2, 12.1, 11.8]);
}

#[test]
fn test_relaxation_iterator_matches_eager_read() {
    let star = open_test_file();
    let eager = star.relaxation_frames().unwrap();

    let mut iter = RelaxationIterator::new(star.document(), star.relaxation());
    let mut lazy = Vec::new();
    while let Some(frame) = iter.next().unwrap() {
        lazy.push(frame);
    }
    assert_eq!(lazy, eager);
}

#[test]
fn test_for_each_relaxation_frame() {
    let star = open_test_file();
    let mut count = 0;
    for_each_relaxation_frame(star.document(), star.relaxation(), |_frame| {
        count += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_entity_frames() {
    let star = open_test_file();
    let entities = star.entity_frames().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].mol_name.as_deref(), Some("ubiquitin"));
    assert_eq!(entities[0].res_nums, [1, 2, 3]);
    assert_eq!(entities[0].res_names, ["MET", "GLN", "ILE"]);
}

#[test]
fn test_model_free_frames() {
    let star = open_test_file();
    let frames = star.model_free_frames().unwrap();
    assert_eq!(frames.len(), 1);
    let mf = &frames[0];
    assert_eq!(mf.res_nums, [1, 2, 3]);
    assert_eq!(
        mf.s2.as_ref().unwrap(),
        &[Some(0.82), Some(0.91), Some(0.89)]
    );
    assert_eq!(mf.te.as_ref().unwrap(), &[Some(21e-12), None, None]);
    assert_eq!(mf.rex.as_ref().unwrap(), &[None, Some(1.4), None]);
}

#[test]
fn test_fixture_reserializes_and_reparses() {
    let star = open_test_file();
    let text = star.star_text(Flavor::NmrStar);
    let reparsed = Document::parse(&text).expect("re-serialized fixture must parse");
    assert_eq!(reparsed, *star.document());
}

#[test]
fn test_write_to_disk_and_reopen() {
    let star = open_test_file();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.str");
    star.write(&path).unwrap();

    let copy = NmrStarFile::open(&path).unwrap();
    assert_eq!(copy.document(), star.document());
    assert_eq!(copy.version(), StarVersion::V3_1);
}

#[test]
fn test_open_missing_file_fails() {
    let result = NmrStarFile::open("/nonexistent/missing.str");
    assert!(result.is_err());
}
