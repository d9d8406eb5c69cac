//! The chemical shift anisotropy saveframe category.
//!
//! One saveframe per CSA data set: a list-level free table followed by the
//! per-atom `CS_anisotropy` loop (bare `_CSA_value`-style tags in 2.1
//! files).

use serde::{Deserialize, Serialize};

use crate::error::StarError;
use crate::model::{Document, SaveFrame};
use crate::schema::{FieldValue, StarVersion, TagMap, build_tag_table};
use crate::tag_utils::{
    check_parallel, column_f64, column_i64, column_required, reject_missing_entries, require_list,
};

/// Arguments for one CSA data set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsaParams {
    pub sample_cond_list_id: Option<i64>,
    pub sample_cond_list_label: String,
    /// Value units, `ppm` unless stated otherwise.
    pub units: String,
    pub details: Option<String>,
    pub entity_ids: Option<Vec<i64>>,
    pub res_nums: Option<Vec<i64>>,
    pub res_names: Option<Vec<String>>,
    pub atom_names: Option<Vec<String>>,
    pub atom_types: Option<Vec<String>>,
    pub isotope: Option<Vec<i64>>,
    pub values: Option<Vec<f64>>,
    pub errors: Option<Vec<f64>>,
}

impl Default for CsaParams {
    fn default() -> Self {
        CsaParams {
            sample_cond_list_id: None,
            sample_cond_list_label: "$conditions_1".to_string(),
            units: "ppm".to_string(),
            details: None,
            entity_ids: None,
            res_nums: None,
            res_names: None,
            atom_names: None,
            atom_types: None,
            isotope: None,
            values: None,
            errors: None,
        }
    }
}

/// One CSA data set read back from a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsaFrame {
    pub res_nums: Vec<i64>,
    pub res_names: Vec<String>,
    pub atom_names: Vec<String>,
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
}

/// The chemical shift anisotropy record object; owns the occurrence
/// counter.
pub struct ChemShiftAnisotropyFrames {
    version: StarVersion,
    count: u32,
}

impl ChemShiftAnisotropyFrames {
    pub fn new(version: StarVersion) -> Self {
        ChemShiftAnisotropyFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "chem_shift_anisotropy"
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Chem_shift_anisotropy"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
                .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
                .tag("ValUnits", Some("Val_units"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("SampleConditionListID", None)
                .tag("SampleConditionListLabel", Some("Sample_conditions_label"))
                .tag("ValUnits", Some("CSA_value_units"))
                .tag("Details", Some("Details"))
        }
    }

    fn data_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("CS_anisotropy"))
                .tag("CsaID", Some("ID"))
                .tag("EntityID", Some("Entity_ID"))
                .tag("CompIndexID", Some("Comp_index_ID"))
                .tag("SeqID", Some("Seq_ID"))
                .tag("CompID", Some("Comp_ID"))
                .tag("AtomID", Some("Atom_ID"))
                .tag("AtomType", Some("Atom_type"))
                .tag("AtomIsotopeNumber", Some("Atom_isotope_number"))
                .tag("Val", Some("Val"))
                .tag("ValErr", Some("Val_err"))
                .tag("ListID", Some("Chem_shift_anisotropy_list_ID"))
        } else {
            TagMap::new(None)
                .tag("CsaID", None)
                .tag("EntityID", None)
                .tag("CompIndexID", Some("Residue_seq_code"))
                .tag("SeqID", None)
                .tag("CompID", Some("Residue_label"))
                .tag("AtomID", Some("Atom_name"))
                .tag("AtomType", None)
                .tag("AtomIsotopeNumber", None)
                .tag("Val", Some("CSA_value"))
                .tag("ValErr", Some("CSA_value_error"))
                .tag("ListID", None)
        }
    }

    /// Build one CSA saveframe and append it to the document, returning
    /// the occurrence count.
    pub fn add(&mut self, document: &mut Document, params: &CsaParams) -> Result<u32, StarError> {
        let res_nums = require_list("residue numbers of the CSA data", &params.res_nums)?;
        let res_names = require_list("residue names of the CSA data", &params.res_names)?;
        reject_missing_entries("residue names of the CSA data", res_names)?;
        let atom_names = require_list("atom names of the CSA data", &params.atom_names)?;
        reject_missing_entries("atom names of the CSA data", atom_names)?;
        let n = res_nums.len();
        if res_names.len() != n || atom_names.len() != n {
            return Err(StarError::cardinality(
                "CSA data",
                "the residue number, residue name and atom name lists differ in length",
            ));
        }
        check_parallel("entity IDs", &params.entity_ids, n)?;
        check_parallel("atom types", &params.atom_types, n)?;
        check_parallel("isotope numbers", &params.isotope, n)?;
        check_parallel("CSA values", &params.values, n)?;
        check_parallel("CSA errors", &params.errors, n)?;

        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("chem_shift_anisotropy_{}", self.count));

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
                ("ValUnits", FieldValue::Single(params.units.clone())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                (
                    "CsaID",
                    FieldValue::Column((1..=n).map(|i| i.to_string()).collect()),
                ),
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

    /// Read one CSA saveframe back into parallel lists, coercing residue
    /// numbers to integers and values/errors to floats.
    pub fn read_frame(&self, frame: &SaveFrame) -> Result<CsaFrame, StarError> {
        let data_map = self.data_map();
        let val_tag = data_map.required_tag("Val")?;
        let data_table = frame
            .tagtables
            .iter()
            .find(|table| table.has_tag(&val_tag))
            .ok_or_else(|| {
                StarError::missing(format!("tag '{val_tag}' in save frame '{}'", frame.title))
            })?;
        Ok(CsaFrame {
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID")?)?.to_vec(),
            values: column_f64(data_table, &val_tag)?,
            errors: column_f64(data_table, &data_map.required_tag("ValErr")?)?,
        })
    }

    /// All CSA data sets in the document.
    pub fn frames(&self, document: &Document) -> Result<Vec<CsaFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CsaParams {
        CsaParams {
            res_nums: Some(vec![1, 2]),
            res_names: Some(vec!["ALA".to_string(), "GLY".to_string()]),
            atom_names: Some(vec!["CA".to_string(), "CA".to_string()]),
            values: Some(vec![1.1, 2.2]),
            errors: Some(vec![0.1, 0.2]),
            ..CsaParams::default()
        }
    }

    #[test]
    fn csa_round_trips_through_star_text() {
        let mut doc = Document::new("csa");
        let mut csa = ChemShiftAnisotropyFrames::new(StarVersion::V3_1);
        csa.add(&mut doc, &params()).unwrap();

        let reparsed = Document::parse(&doc.star_text(crate::write::Flavor::NmrStar)).unwrap();
        let reader = ChemShiftAnisotropyFrames::new(StarVersion::V3_1);
        let frames = reader.frames(&reparsed).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].res_nums, [1, 2]);
        assert_eq!(frames[0].res_names, ["ALA", "GLY"]);
        assert_eq!(frames[0].atom_names, ["CA", "CA"]);
        assert_eq!(frames[0].values, [1.1, 2.2]);
        assert_eq!(frames[0].errors, [0.1, 0.2]);
    }

    #[test]
    fn missing_atom_names_rejected() {
        let mut doc = Document::new("csa");
        let mut csa = ChemShiftAnisotropyFrames::new(StarVersion::V3_1);
        let mut bad = params();
        bad.atom_names = None;
        assert!(matches!(
            csa.add(&mut doc, &bad),
            Err(StarError::MissingValue { .. })
        ));
        assert!(doc.datanodes.is_empty());
    }

    #[test]
    fn v2_dialect_uses_bare_tags() {
        let mut doc = Document::new("csa");
        let mut csa = ChemShiftAnisotropyFrames::new(StarVersion::V2_1);
        csa.add(&mut doc, &params()).unwrap();
        let text = doc.star_text(crate::write::Flavor::NmrStar);
        assert!(text.contains("_Saveframe_category chem_shift_anisotropy"));
        assert!(text.contains("_CSA_value"));
        assert!(!text.contains("_CS_anisotropy.Val"));
    }
}
