//! Relaxation data saveframe categories.
//!
//! This module covers the kinetics supergroups of the NMR-STAR dictionary:
//!
//! - **Heteronucl_T1 / Heteronucl_T2**: longitudinal and transverse
//!   relaxation rates (2.1 and 3.x dialects)
//! - **Heteronucl_NOE**: heteronuclear NOE values, with the second-atom
//!   field set of the 3.2 dictionary
//! - **Auto_relaxation**: the generic R1/R2 container of the 3.1 dictionary
//! - **General_Relaxation**: the generic R1/R2 container of the 3.2
//!   dictionary
//!
//! The [`Relaxation`] record dispatches by data type and dictionary
//! version, mirroring how depositions are actually laid out: 2.1/3.0 files
//! carry R1/R2 in the T1/T2 supergroups, 3.1 files in Auto_relaxation and
//! 3.2 files in General_Relaxation.
//!
//! Note that units of 1/s are actually rad/s in NMR; the hidden radian is
//! conventional for the `s-1` unit strings written here.

use serde::{Deserialize, Serialize};

use crate::error::StarError;
use crate::model::{Document, SaveFrame};
use crate::schema::{FieldValue, StarVersion, TagMap, build_tag_table};
use crate::tag_utils::{
    check_parallel, column_f64, column_i64, column_required, get_required_f64, reject_missing_entries,
    require_list,
};

// ============================================================================
// Shared types
// ============================================================================

/// The relaxation data type.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
pub enum RxType {
    R1,
    R2,
    #[strum(serialize = "NOE")]
    Noe,
}

impl RxType {
    /// The operator of the relaxation superoperator, as written to the
    /// coherence-type tag.
    fn coherence(self) -> &'static str {
        match self {
            RxType::R1 => "Iz",
            RxType::R2 => "I+",
            RxType::Noe => "NOE",
        }
    }

    fn from_coherence(value: &str) -> Result<RxType, StarError> {
        match value {
            "Iz" => Ok(RxType::R1),
            "I+" => Ok(RxType::R2),
            other => Err(StarError::Coerce {
                tag: "coherence type".to_string(),
                value: other.to_string(),
                wanted: "one of Iz, I+",
            }),
        }
    }
}

/// Arguments for one relaxation data set. The residue number, residue name
/// and atom name lists identify the spins and are required; everything else
/// is written as the `?` placeholder when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RxParams {
    pub data_type: RxType,
    /// Spectrometer proton frequency, in Hz.
    pub frq: f64,
    pub sample_cond_list_id: Option<i64>,
    pub sample_cond_list_label: String,
    pub temp_calibration: Option<String>,
    pub temp_control: Option<String>,
    pub peak_intensity_type: Option<String>,
    pub details: Option<String>,
    pub assembly_atom_ids: Option<Vec<i64>>,
    pub entity_assembly_ids: Option<Vec<i64>>,
    pub entity_ids: Option<Vec<i64>>,
    pub res_nums: Option<Vec<i64>>,
    pub res_names: Option<Vec<String>>,
    pub atom_names: Option<Vec<String>>,
    pub atom_types: Option<Vec<String>>,
    pub isotope: Option<Vec<i64>>,
    /// Second-atom identifiers, used by the heteronuclear NOE.
    pub assembly_atom_ids_2: Option<Vec<i64>>,
    pub entity_assembly_ids_2: Option<Vec<i64>>,
    pub entity_ids_2: Option<Vec<i64>>,
    pub res_nums_2: Option<Vec<i64>>,
    /// Sequence IDs of the second atom (3.2 dictionary). A distinct
    /// quantity from the residue numbers; never aliased onto them.
    pub seq_ids_2: Option<Vec<i64>>,
    pub res_names_2: Option<Vec<String>>,
    pub atom_names_2: Option<Vec<String>>,
    pub atom_types_2: Option<Vec<String>>,
    pub isotope_2: Option<Vec<i64>>,
    pub values: Option<Vec<f64>>,
    pub errors: Option<Vec<f64>>,
}

impl Default for RxParams {
    fn default() -> Self {
        RxParams {
            data_type: RxType::R1,
            frq: 0.0,
            sample_cond_list_id: None,
            sample_cond_list_label: "$conditions_1".to_string(),
            temp_calibration: None,
            temp_control: None,
            peak_intensity_type: None,
            details: None,
            assembly_atom_ids: None,
            entity_assembly_ids: None,
            entity_ids: None,
            res_nums: None,
            res_names: None,
            atom_names: None,
            atom_types: None,
            isotope: None,
            assembly_atom_ids_2: None,
            entity_assembly_ids_2: None,
            entity_ids_2: None,
            res_nums_2: None,
            seq_ids_2: None,
            res_names_2: None,
            atom_names_2: None,
            atom_types_2: None,
            isotope_2: None,
            values: None,
            errors: None,
        }
    }
}

/// One relaxation data set read back from a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RxFrame {
    pub data_type: RxType,
    /// Spectrometer proton frequency, in Hz.
    pub frq: f64,
    pub res_nums: Vec<i64>,
    pub res_names: Vec<String>,
    pub atom_names: Vec<String>,
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
}

/// Validate the identifying lists and parallel lengths, returning the spin
/// count.
fn validate(params: &RxParams, desc: &str) -> Result<usize, StarError> {
    let res_nums = require_list(&format!("residue numbers of the {desc}"), &params.res_nums)?;
    let res_names = require_list(&format!("residue names of the {desc}"), &params.res_names)?;
    reject_missing_entries(&format!("residue names of the {desc}"), res_names)?;
    let atom_names = require_list(&format!("atom names of the {desc}"), &params.atom_names)?;
    reject_missing_entries(&format!("atom names of the {desc}"), atom_names)?;

    let n = res_nums.len();
    if res_names.len() != n || atom_names.len() != n {
        return Err(StarError::cardinality(
            desc,
            "the residue number, residue name and atom name lists differ in length",
        ));
    }
    check_parallel("assembly atom IDs", &params.assembly_atom_ids, n)?;
    check_parallel("entity assembly IDs", &params.entity_assembly_ids, n)?;
    check_parallel("entity IDs", &params.entity_ids, n)?;
    check_parallel("atom types", &params.atom_types, n)?;
    check_parallel("isotope numbers", &params.isotope, n)?;
    check_parallel("values", &params.values, n)?;
    check_parallel("errors", &params.errors, n)?;
    check_parallel("second-atom residue numbers", &params.res_nums_2, n)?;
    check_parallel("second-atom sequence IDs", &params.seq_ids_2, n)?;
    check_parallel("second-atom residue names", &params.res_names_2, n)?;
    check_parallel("second-atom atom names", &params.atom_names_2, n)?;
    Ok(n)
}

fn describe(params: &RxParams) -> String {
    format!(
        "{} MHz {} relaxation data",
        (params.frq * 1e-6).round() as i64,
        params.data_type
    )
}

/// The 1-based per-row ID column.
fn data_ids(n: usize) -> FieldValue {
    FieldValue::Column((1..=n).map(|i| i.to_string()).collect())
}

fn frq_mhz(frq: f64) -> String {
    (frq / 1e6).to_string()
}

/// Locate the tag table of a frame carrying the given tag.
fn table_with_tag<'a>(frame: &'a SaveFrame, tag: &str) -> Result<&'a crate::model::TagTable, StarError> {
    frame
        .tagtables
        .iter()
        .find(|table| table.has_tag(tag))
        .ok_or_else(|| StarError::missing(format!("tag '{tag}' in save frame '{}'", frame.title)))
}

// ============================================================================
// Heteronucl_T1 / Heteronucl_T2
// ============================================================================

/// The per-supergroup tag spellings that distinguish T1 from T2.
struct RxDialect {
    data_type: RxType,
    sf_category_v2: &'static str,
    sf_category_v3: &'static str,
    frame_label: &'static str,
    list_label: &'static str,
    experiment_label: &'static str,
    data_label: &'static str,
    coherence_suffix: &'static str,
    units_suffix: &'static str,
    val_suffix_v2: &'static str,
    val_err_suffix_v2: &'static str,
    list_id_suffix: &'static str,
}

static T1_DIALECT: RxDialect = RxDialect {
    data_type: RxType::R1,
    sf_category_v2: "T1_relaxation",
    sf_category_v3: "heteronucl_T1_relaxation",
    frame_label: "T1_list",
    list_label: "Heteronucl_T1_list",
    experiment_label: "Heteronucl_T1_experiment",
    data_label: "T1",
    coherence_suffix: "T1_coherence_type",
    units_suffix: "T1_val_units",
    val_suffix_v2: "T1_value",
    val_err_suffix_v2: "T1_value_error",
    list_id_suffix: "Heteronucl_T1_list_ID",
};

static T2_DIALECT: RxDialect = RxDialect {
    data_type: RxType::R2,
    sf_category_v2: "T2_relaxation",
    sf_category_v3: "heteronucl_T2_relaxation",
    frame_label: "T2_list",
    list_label: "Heteronucl_T2_list",
    experiment_label: "Heteronucl_T2_experiment",
    data_label: "T2",
    coherence_suffix: "T2_coherence_type",
    units_suffix: "T2_val_units",
    val_suffix_v2: "T2_value",
    val_err_suffix_v2: "T2_value_error",
    list_id_suffix: "Heteronucl_T2_list_ID",
};

/// The heteronuclear T1 or T2 relaxation supergroup. Owns the occurrence
/// counter used for frame titles and list IDs.
pub struct HeteronuclRxFrames {
    version: StarVersion,
    count: u32,
    dialect: &'static RxDialect,
}

impl HeteronuclRxFrames {
    pub fn t1(version: StarVersion) -> Self {
        HeteronuclRxFrames {
            version,
            count: 0,
            dialect: &T1_DIALECT,
        }
    }

    pub fn t2(version: StarVersion) -> Self {
        HeteronuclRxFrames {
            version,
            count: 0,
            dialect: &T2_DIALECT,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// The saveframe category value under the current version.
    pub fn sf_category(&self) -> &'static str {
        if self.version.dotted_tags() {
            self.dialect.sf_category_v3
        } else {
            self.dialect.sf_category_v2
        }
    }

    fn list_map(&self) -> TagMap {
        let d = self.dialect;
        if self.version.dotted_tags() {
            TagMap::new(Some(d.list_label))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
                .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
                .tag("TempCalibrationMethod", Some("Temp_calibration_method"))
                .tag("TempControlMethod", Some("Temp_control_method"))
                .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
                .tag("CoherenceType", Some(d.coherence_suffix))
                .tag("ValUnits", Some(d.units_suffix))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("SampleConditionListID", None)
                .tag("SampleConditionListLabel", Some("Sample_conditions_label"))
                .tag("TempCalibrationMethod", None)
                .tag("TempControlMethod", None)
                .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
                .tag("CoherenceType", None)
                .tag("ValUnits", None)
                .tag("Details", Some("Details"))
        }
    }

    fn experiment_map(&self) -> Option<TagMap> {
        if self.version.dotted_tags() {
            Some(
                TagMap::new(Some(self.dialect.experiment_label))
                    .tag("SampleLabel", Some("Sample_label")),
            )
        } else {
            None
        }
    }

    fn data_map(&self) -> TagMap {
        let d = self.dialect;
        if self.version.dotted_tags() {
            TagMap::new(Some(d.data_label))
                .tag("RxID", Some("ID"))
                .tag("AssemblyAtomID", Some("Assembly_atom_ID"))
                .tag("EntityAssemblyID", Some("Entity_assembly_ID"))
                .tag("EntityID", Some("Entity_ID"))
                .tag("CompIndexID", Some("Comp_index_ID"))
                .tag("SeqID", Some("Seq_ID"))
                .tag("CompID", Some("Comp_ID"))
                .tag("AtomID", Some("Atom_ID"))
                .tag("AtomType", Some("Atom_type"))
                .tag("AtomIsotopeNumber", Some("Atom_isotope_number"))
                .tag("Val", Some("Val"))
                .tag("ValErr", Some("Val_err"))
                .tag("ListID", Some(d.list_id_suffix))
        } else {
            TagMap::new(None)
                .tag("RxID", None)
                .tag("AssemblyAtomID", None)
                .tag("EntityAssemblyID", None)
                .tag("EntityID", None)
                .tag("CompIndexID", Some("Residue_seq_code"))
                .tag("SeqID", None)
                .tag("CompID", Some("Residue_label"))
                .tag("AtomID", Some("Atom_name"))
                .tag("AtomType", None)
                .tag("AtomIsotopeNumber", None)
                .tag("Val", Some(d.val_suffix_v2))
                .tag("ValErr", Some(d.val_err_suffix_v2))
                .tag("ListID", None)
        }
    }

    /// Build one saveframe for a data set and append it to the document,
    /// returning the occurrence count.
    pub fn add(&mut self, document: &mut Document, params: &RxParams) -> Result<u32, StarError> {
        let n = validate(params, &describe(params))?;
        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("{}_{}", self.dialect.frame_label, self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("SampleConditionListID", FieldValue::single(params.sample_cond_list_id)),
                (
                    "SampleConditionListLabel",
                    FieldValue::Single(params.sample_cond_list_label.clone()),
                ),
                ("TempCalibrationMethod", FieldValue::single(params.temp_calibration.as_deref())),
                ("TempControlMethod", FieldValue::single(params.temp_control.as_deref())),
                ("SpectrometerFrequency1H", FieldValue::Single(frq_mhz(params.frq))),
                (
                    "CoherenceType",
                    FieldValue::Single(self.dialect.data_type.coherence().to_string()),
                ),
                ("ValUnits", FieldValue::Single("s-1".to_string())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        if let Some(experiment) = self.experiment_map() {
            frame.tagtables.push(build_tag_table(
                &experiment,
                true,
                vec![("SampleLabel", FieldValue::Single("$sample_1".to_string()))],
            )?);
        }

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                ("RxID", data_ids(n)),
                ("AssemblyAtomID", FieldValue::column(params.assembly_atom_ids.as_deref(), n)),
                ("EntityAssemblyID", FieldValue::column(params.entity_assembly_ids.as_deref(), n)),
                ("EntityID", FieldValue::column(params.entity_ids.as_deref(), n)),
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("SeqID", FieldValue::column(None::<&[i64]>, n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID", FieldValue::column(params.atom_names.as_deref(), n)),
                ("AtomType", FieldValue::column(params.atom_types.as_deref(), n)),
                ("AtomIsotopeNumber", FieldValue::column(params.isotope.as_deref(), n)),
                ("Val", FieldValue::column(params.values.as_deref(), n)),
                ("ValErr", FieldValue::column(params.errors.as_deref(), n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    /// Read one saveframe of this supergroup back into parallel lists.
    pub fn read_frame(&self, frame: &SaveFrame) -> Result<RxFrame, StarError> {
        let list_map = self.list_map();
        let data_map = self.data_map();

        let frq_tag = list_map.required_tag("SpectrometerFrequency1H")?;
        let list_table = table_with_tag(frame, &frq_tag)?;
        let frq = get_required_f64(list_table, &frq_tag)? * 1e6;

        let val_tag = data_map.required_tag("Val")?;
        let data_table = table_with_tag(frame, &val_tag)?;
        Ok(RxFrame {
            data_type: self.dialect.data_type,
            frq,
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID")?)?.to_vec(),
            values: column_f64(data_table, &val_tag)?,
            errors: column_f64(data_table, &data_map.required_tag("ValErr")?)?,
        })
    }

    /// All data sets of this supergroup present in the document.
    pub fn frames(&self, document: &Document) -> Result<Vec<RxFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

// ============================================================================
// Heteronucl_NOE
// ============================================================================

/// The heteronuclear NOE supergroup. The 3.x dialects carry a full set of
/// second-atom identifier columns; the 3.2 dictionary adds the
/// `Seq_ID_1`/`Seq_ID_2` pair.
pub struct HeteronuclNoeFrames {
    version: StarVersion,
    count: u32,
}

impl HeteronuclNoeFrames {
    pub fn new(version: StarVersion) -> Self {
        HeteronuclNoeFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        if self.version.dotted_tags() {
            "heteronucl_NOEs"
        } else {
            "heteronuclear_NOE"
        }
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Heteronucl_NOE_list"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
                .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
                .tag("TempCalibrationMethod", Some("Temp_calibration_method"))
                .tag("TempControlMethod", Some("Temp_control_method"))
                .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
                .tag("ValType", Some("Heteronuclear_NOE_val_type"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("SampleConditionListID", None)
                .tag("SampleConditionListLabel", Some("Sample_conditions_label"))
                .tag("TempCalibrationMethod", None)
                .tag("TempControlMethod", None)
                .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
                .tag("ValType", None)
                .tag("Details", Some("Details"))
        }
    }

    fn data_map(&self) -> TagMap {
        match self.version {
            StarVersion::V2_1 | StarVersion::V3_0 => TagMap::new(None)
                .tag("RxID", None)
                .tag("AssemblyAtomID1", None)
                .tag("EntityAssemblyID1", None)
                .tag("EntityID1", None)
                .tag("CompIndexID1", Some("Residue_seq_code"))
                .tag("SeqID1", None)
                .tag("CompID1", Some("Residue_label"))
                .tag("AtomID1", Some("Atom_name"))
                .tag("AtomType1", None)
                .tag("AtomIsotopeNumber1", None)
                .tag("AssemblyAtomID2", None)
                .tag("EntityAssemblyID2", None)
                .tag("EntityID2", None)
                .tag("CompIndexID2", None)
                .tag("SeqID2", None)
                .tag("CompID2", None)
                .tag("AtomID2", None)
                .tag("AtomType2", None)
                .tag("AtomIsotopeNumber2", None)
                .tag("Val", Some("Heteronuclear_NOE_value"))
                .tag("ValErr", Some("Heteronuclear_NOE_value_error"))
                .tag("ListID", None),
            StarVersion::V3_1 | StarVersion::V3_2 => {
                let seq_1 = (self.version == StarVersion::V3_2).then_some("Seq_ID_1");
                let seq_2 = (self.version == StarVersion::V3_2).then_some("Seq_ID_2");
                TagMap::new(Some("Heteronucl_NOE"))
                    .tag("RxID", Some("ID"))
                    .tag("AssemblyAtomID1", Some("Assembly_atom_ID_1"))
                    .tag("EntityAssemblyID1", Some("Entity_assembly_ID_1"))
                    .tag("EntityID1", Some("Entity_ID_1"))
                    .tag("CompIndexID1", Some("Comp_index_ID_1"))
                    .tag("SeqID1", seq_1)
                    .tag("CompID1", Some("Comp_ID_1"))
                    .tag("AtomID1", Some("Atom_ID_1"))
                    .tag("AtomType1", Some("Atom_type_1"))
                    .tag("AtomIsotopeNumber1", Some("Atom_isotope_number_1"))
                    .tag("AssemblyAtomID2", Some("Assembly_atom_ID_2"))
                    .tag("EntityAssemblyID2", Some("Entity_assembly_ID_2"))
                    .tag("EntityID2", Some("Entity_ID_2"))
                    .tag("CompIndexID2", Some("Comp_index_ID_2"))
                    .tag("SeqID2", seq_2)
                    .tag("CompID2", Some("Comp_ID_2"))
                    .tag("AtomID2", Some("Atom_ID_2"))
                    .tag("AtomType2", Some("Atom_type_2"))
                    .tag("AtomIsotopeNumber2", Some("Atom_isotope_number_2"))
                    .tag("Val", Some("Val"))
                    .tag("ValErr", Some("Val_err"))
                    .tag("ListID", Some("Heteronucl_NOE_list_ID"))
            }
        }
    }

    pub fn add(&mut self, document: &mut Document, params: &RxParams) -> Result<u32, StarError> {
        let n = validate(params, &describe(params))?;
        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("NOE_list_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("SampleConditionListID", FieldValue::single(params.sample_cond_list_id)),
                (
                    "SampleConditionListLabel",
                    FieldValue::Single(params.sample_cond_list_label.clone()),
                ),
                ("TempCalibrationMethod", FieldValue::single(params.temp_calibration.as_deref())),
                ("TempControlMethod", FieldValue::single(params.temp_control.as_deref())),
                ("SpectrometerFrequency1H", FieldValue::Single(frq_mhz(params.frq))),
                ("ValType", FieldValue::single(params.peak_intensity_type.as_deref())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                ("RxID", data_ids(n)),
                ("AssemblyAtomID1", FieldValue::column(params.assembly_atom_ids.as_deref(), n)),
                ("EntityAssemblyID1", FieldValue::column(params.entity_assembly_ids.as_deref(), n)),
                ("EntityID1", FieldValue::column(params.entity_ids.as_deref(), n)),
                ("CompIndexID1", FieldValue::column(params.res_nums.as_deref(), n)),
                ("SeqID1", FieldValue::column(None::<&[i64]>, n)),
                ("CompID1", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID1", FieldValue::column(params.atom_names.as_deref(), n)),
                ("AtomType1", FieldValue::column(params.atom_types.as_deref(), n)),
                ("AtomIsotopeNumber1", FieldValue::column(params.isotope.as_deref(), n)),
                ("AssemblyAtomID2", FieldValue::column(params.assembly_atom_ids_2.as_deref(), n)),
                ("EntityAssemblyID2", FieldValue::column(params.entity_assembly_ids_2.as_deref(), n)),
                ("EntityID2", FieldValue::column(params.entity_ids_2.as_deref(), n)),
                ("CompIndexID2", FieldValue::column(params.res_nums_2.as_deref(), n)),
                ("SeqID2", FieldValue::column(params.seq_ids_2.as_deref(), n)),
                ("CompID2", FieldValue::column(params.res_names_2.as_deref(), n)),
                ("AtomID2", FieldValue::column(params.atom_names_2.as_deref(), n)),
                ("AtomType2", FieldValue::column(params.atom_types_2.as_deref(), n)),
                ("AtomIsotopeNumber2", FieldValue::column(params.isotope_2.as_deref(), n)),
                ("Val", FieldValue::column(params.values.as_deref(), n)),
                ("ValErr", FieldValue::column(params.errors.as_deref(), n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    pub fn read_frame(&self, frame: &SaveFrame) -> Result<RxFrame, StarError> {
        let list_map = self.list_map();
        let data_map = self.data_map();

        let frq_tag = list_map.required_tag("SpectrometerFrequency1H")?;
        let list_table = table_with_tag(frame, &frq_tag)?;
        let frq = get_required_f64(list_table, &frq_tag)? * 1e6;

        let val_tag = data_map.required_tag("Val")?;
        let data_table = table_with_tag(frame, &val_tag)?;
        Ok(RxFrame {
            data_type: RxType::Noe,
            frq,
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID1")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID1")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID1")?)?.to_vec(),
            values: column_f64(data_table, &val_tag)?,
            errors: column_f64(data_table, &data_map.required_tag("ValErr")?)?,
        })
    }

    pub fn frames(&self, document: &Document) -> Result<Vec<RxFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

// ============================================================================
// Auto_relaxation (3.1 dictionary)
// ============================================================================

/// The generic auto-relaxation supergroup of the 3.1 dictionary. R1 and R2
/// share one tag layout; the data type is carried by the
/// `Relaxation_coherence_type` tag (`Iz` or `I+`).
pub struct AutoRelaxationFrames {
    count: u32,
}

impl AutoRelaxationFrames {
    pub fn new() -> Self {
        AutoRelaxationFrames { count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "auto_relaxation"
    }

    fn list_map(&self) -> TagMap {
        TagMap::new(Some("Auto_relaxation_list"))
            .tag("SfCategory", Some("Sf_category"))
            .tag("ListID", Some("ID"))
            .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
            .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
            .tag("TempCalibrationMethod", Some("Temp_calibration_method"))
            .tag("TempControlMethod", Some("Temp_control_method"))
            .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
            .tag("CoherenceType", Some("Relaxation_coherence_type"))
            .tag("CommonTypeName", Some("Common_relaxation_type_name"))
            .tag("ValUnits", Some("Relaxation_val_units"))
            .tag("RexUnits", Some("Rex_units"))
            .tag("Details", Some("Details"))
    }

    fn data_map(&self) -> TagMap {
        TagMap::new(Some("Auto_relaxation"))
            .tag("RxID", Some("ID"))
            .tag("AssemblyAtomID", Some("Assembly_atom_ID"))
            .tag("EntityAssemblyID", Some("Entity_assembly_ID"))
            .tag("EntityID", Some("Entity_ID"))
            .tag("CompIndexID", Some("Comp_index_ID"))
            .tag("SeqID", Some("Seq_ID"))
            .tag("CompID", Some("Comp_ID"))
            .tag("AtomID", Some("Atom_ID"))
            .tag("AtomType", Some("Atom_type"))
            .tag("AtomIsotopeNumber", Some("Atom_isotope_number"))
            .tag("Val", Some("Auto_relaxation_val"))
            .tag("ValErr", Some("Auto_relaxation_val_err"))
            .tag("RexVal", Some("Rex_val"))
            .tag("RexErr", Some("Rex_err"))
            .tag("ListID", Some("Auto_relaxation_list_ID"))
    }

    pub fn add(&mut self, document: &mut Document, params: &RxParams) -> Result<u32, StarError> {
        let desc = describe(params);
        let n = validate(params, &desc)?;
        if params.temp_calibration.is_none() {
            return Err(StarError::missing(format!(
                "temperature calibration method of the {desc}"
            )));
        }
        if params.temp_control.is_none() {
            return Err(StarError::missing(format!(
                "temperature control method of the {desc}"
            )));
        }
        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("auto_relaxation_list_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("SampleConditionListID", FieldValue::single(params.sample_cond_list_id)),
                (
                    "SampleConditionListLabel",
                    FieldValue::Single(params.sample_cond_list_label.clone()),
                ),
                ("TempCalibrationMethod", FieldValue::single(params.temp_calibration.as_deref())),
                ("TempControlMethod", FieldValue::single(params.temp_control.as_deref())),
                ("SpectrometerFrequency1H", FieldValue::Single(frq_mhz(params.frq))),
                (
                    "CoherenceType",
                    FieldValue::Single(params.data_type.coherence().to_string()),
                ),
                (
                    "CommonTypeName",
                    FieldValue::Single(params.data_type.to_string()),
                ),
                ("ValUnits", FieldValue::Single("s-1".to_string())),
                ("RexUnits", FieldValue::Single("s-1".to_string())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                ("RxID", data_ids(n)),
                ("AssemblyAtomID", FieldValue::column(params.assembly_atom_ids.as_deref(), n)),
                ("EntityAssemblyID", FieldValue::column(params.entity_assembly_ids.as_deref(), n)),
                ("EntityID", FieldValue::column(params.entity_ids.as_deref(), n)),
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("SeqID", FieldValue::column(None::<&[i64]>, n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID", FieldValue::column(params.atom_names.as_deref(), n)),
                ("AtomType", FieldValue::column(params.atom_types.as_deref(), n)),
                ("AtomIsotopeNumber", FieldValue::column(params.isotope.as_deref(), n)),
                ("Val", FieldValue::column(params.values.as_deref(), n)),
                ("ValErr", FieldValue::column(params.errors.as_deref(), n)),
                ("RexVal", FieldValue::column(None::<&[f64]>, n)),
                ("RexErr", FieldValue::column(None::<&[f64]>, n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    pub fn read_frame(&self, frame: &SaveFrame) -> Result<RxFrame, StarError> {
        let list_map = self.list_map();
        let data_map = self.data_map();

        let coherence_tag = list_map.required_tag("CoherenceType")?;
        let list_table = table_with_tag(frame, &coherence_tag)?;
        let coherence = crate::tag_utils::get_required_str(list_table, &coherence_tag)?;
        let data_type = RxType::from_coherence(coherence)?;
        let frq_tag = list_map.required_tag("SpectrometerFrequency1H")?;
        let frq = get_required_f64(list_table, &frq_tag)? * 1e6;

        let val_tag = data_map.required_tag("Val")?;
        let data_table = table_with_tag(frame, &val_tag)?;
        Ok(RxFrame {
            data_type,
            frq,
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID")?)?.to_vec(),
            values: column_f64(data_table, &val_tag)?,
            errors: column_f64(data_table, &data_map.required_tag("ValErr")?)?,
        })
    }

    pub fn frames(&self, document: &Document) -> Result<Vec<RxFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

impl Default for AutoRelaxationFrames {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// General_Relaxation (3.2 dictionary)
// ============================================================================

/// The generic relaxation supergroup of the 3.2 dictionary.
pub struct GeneralRelaxationFrames {
    count: u32,
}

impl GeneralRelaxationFrames {
    pub fn new() -> Self {
        GeneralRelaxationFrames { count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "general_relaxation"
    }

    fn list_map(&self) -> TagMap {
        TagMap::new(Some("General_Relaxation_list"))
            .tag("SfCategory", Some("Sf_category"))
            .tag("ListID", Some("ID"))
            .tag("TempCalibrationMethod", Some("Temp_calibration_method"))
            .tag("TempControlMethod", Some("Temp_control_method"))
            .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
            .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
            .tag("SpectrometerFrequency1H", Some("Spectrometer_frequency_1H"))
            .tag("CoherenceType", Some("Relaxation_coherence_type"))
            .tag("CommonTypeName", Some("Relaxation_type_common_name"))
            .tag("ValUnits", Some("Relaxation_val_units"))
            .tag("Details", Some("Details"))
    }

    fn experiment_map(&self) -> TagMap {
        TagMap::new(Some("General_Relaxation_experiment")).tag("SampleLabel", Some("Sample_label"))
    }

    fn data_map(&self) -> TagMap {
        TagMap::new(Some("General_Relaxation"))
            .tag("RxID", Some("ID"))
            .tag("AssemblyAtomID", Some("Assembly_atom_ID"))
            .tag("EntityAssemblyID", Some("Entity_assembly_ID"))
            .tag("EntityID", Some("Entity_ID"))
            .tag("CompIndexID", Some("Comp_index_ID"))
            .tag("SeqID", Some("Seq_ID"))
            .tag("CompID", Some("Comp_ID"))
            .tag("AtomID", Some("Atom_ID"))
            .tag("AtomType", Some("Atom_type"))
            .tag("AtomIsotopeNumber", Some("Atom_isotope_number"))
            .tag("Val", Some("General_relaxation_val"))
            .tag("ValErr", Some("General_relaxation_val_err"))
            .tag("RexVal", Some("Rex_val"))
            .tag("RexErr", Some("Rex_err"))
            .tag("ListID", Some("General_relaxation_list_ID"))
    }

    pub fn add(&mut self, document: &mut Document, params: &RxParams) -> Result<u32, StarError> {
        let desc = describe(params);
        let n = validate(params, &desc)?;
        if params.temp_calibration.is_none() {
            return Err(StarError::missing(format!(
                "temperature calibration method of the {desc}"
            )));
        }
        if params.temp_control.is_none() {
            return Err(StarError::missing(format!(
                "temperature control method of the {desc}"
            )));
        }
        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("general_relaxation_list_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("TempCalibrationMethod", FieldValue::single(params.temp_calibration.as_deref())),
                ("TempControlMethod", FieldValue::single(params.temp_control.as_deref())),
                ("SampleConditionListID", FieldValue::single(params.sample_cond_list_id)),
                (
                    "SampleConditionListLabel",
                    FieldValue::Single(params.sample_cond_list_label.clone()),
                ),
                ("SpectrometerFrequency1H", FieldValue::Single(frq_mhz(params.frq))),
                (
                    "CoherenceType",
                    FieldValue::Single(params.data_type.coherence().to_string()),
                ),
                (
                    "CommonTypeName",
                    FieldValue::Single(params.data_type.to_string()),
                ),
                ("ValUnits", FieldValue::Single("s-1".to_string())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.experiment_map(),
            true,
            vec![("SampleLabel", FieldValue::Single("$sample_1".to_string()))],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                ("RxID", data_ids(n)),
                ("AssemblyAtomID", FieldValue::column(params.assembly_atom_ids.as_deref(), n)),
                ("EntityAssemblyID", FieldValue::column(params.entity_assembly_ids.as_deref(), n)),
                ("EntityID", FieldValue::column(params.entity_ids.as_deref(), n)),
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("SeqID", FieldValue::column(None::<&[i64]>, n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID", FieldValue::column(params.atom_names.as_deref(), n)),
                ("AtomType", FieldValue::column(params.atom_types.as_deref(), n)),
                ("AtomIsotopeNumber", FieldValue::column(params.isotope.as_deref(), n)),
                ("Val", FieldValue::column(params.values.as_deref(), n)),
                ("ValErr", FieldValue::column(params.errors.as_deref(), n)),
                ("RexVal", FieldValue::column(None::<&[f64]>, n)),
                ("RexErr", FieldValue::column(None::<&[f64]>, n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    pub fn read_frame(&self, frame: &SaveFrame) -> Result<RxFrame, StarError> {
        let list_map = self.list_map();
        let data_map = self.data_map();

        let coherence_tag = list_map.required_tag("CoherenceType")?;
        let list_table = table_with_tag(frame, &coherence_tag)?;
        let coherence = crate::tag_utils::get_required_str(list_table, &coherence_tag)?;
        let data_type = RxType::from_coherence(coherence)?;
        let frq_tag = list_map.required_tag("SpectrometerFrequency1H")?;
        let frq = get_required_f64(list_table, &frq_tag)? * 1e6;

        let val_tag = data_map.required_tag("Val")?;
        let data_table = table_with_tag(frame, &val_tag)?;
        Ok(RxFrame {
            data_type,
            frq,
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID")?)?.to_vec(),
            values: column_f64(data_table, &val_tag)?,
            errors: column_f64(data_table, &data_map.required_tag("ValErr")?)?,
        })
    }

    pub fn frames(&self, document: &Document) -> Result<Vec<RxFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

impl Default for GeneralRelaxationFrames {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// The relaxation part of the deposition API: routes each data set to the
/// supergroup its dictionary version stores it in, and reads them all back
/// uniformly.
pub struct Relaxation {
    version: StarVersion,
    pub heteronucl_t1: HeteronuclRxFrames,
    pub heteronucl_t2: HeteronuclRxFrames,
    pub heteronucl_noe: HeteronuclNoeFrames,
    pub auto_relaxation: AutoRelaxationFrames,
    pub general_relaxation: GeneralRelaxationFrames,
}

impl Relaxation {
    pub fn new(version: StarVersion) -> Self {
        Relaxation {
            version,
            heteronucl_t1: HeteronuclRxFrames::t1(version),
            heteronucl_t2: HeteronuclRxFrames::t2(version),
            heteronucl_noe: HeteronuclNoeFrames::new(version),
            auto_relaxation: AutoRelaxationFrames::new(),
            general_relaxation: GeneralRelaxationFrames::new(),
        }
    }

    /// Append one relaxation data set to the document, returning the
    /// occurrence count within its supergroup.
    pub fn add(&mut self, document: &mut Document, params: &RxParams) -> Result<u32, StarError> {
        match (params.data_type, self.version) {
            (RxType::Noe, _) => self.heteronucl_noe.add(document, params),
            (RxType::R1, StarVersion::V2_1 | StarVersion::V3_0) => {
                self.heteronucl_t1.add(document, params)
            }
            (RxType::R2, StarVersion::V2_1 | StarVersion::V3_0) => {
                self.heteronucl_t2.add(document, params)
            }
            (_, StarVersion::V3_1) => self.auto_relaxation.add(document, params),
            (_, StarVersion::V3_2) => self.general_relaxation.add(document, params),
        }
    }

    /// Read one saveframe if it belongs to any relaxation supergroup of the
    /// current version; `Ok(None)` for unrelated frames.
    pub fn read_frame(&self, frame: &SaveFrame) -> Result<Option<RxFrame>, StarError> {
        let Some(category) = frame.category() else {
            return Ok(None);
        };
        if category == self.heteronucl_noe.sf_category() {
            return self.heteronucl_noe.read_frame(frame).map(Some);
        }
        if category == self.heteronucl_t1.sf_category() {
            return self.heteronucl_t1.read_frame(frame).map(Some);
        }
        if category == self.heteronucl_t2.sf_category() {
            return self.heteronucl_t2.read_frame(frame).map(Some);
        }
        if category == self.auto_relaxation.sf_category() {
            return self.auto_relaxation.read_frame(frame).map(Some);
        }
        if category == self.general_relaxation.sf_category() {
            return self.general_relaxation.read_frame(frame).map(Some);
        }
        Ok(None)
    }

    /// All relaxation data sets in the document, in document order.
    pub fn frames(&self, document: &Document) -> Result<Vec<RxFrame>, StarError> {
        let mut out = Vec::new();
        for frame in document.frames() {
            if let Some(data) = self.read_frame(frame)? {
                out.push(data);
            }
        }
        Ok(out)
    }
}
