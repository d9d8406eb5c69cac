//! The model-free and tensor saveframe categories.
//!
//! Model-free order parameters and correlation times are stored one row
//! per spin; most columns are optional per row (not every spin carries an
//! Rex contribution, for instance), so the `?` placeholder appears inside
//! the loop and reads back as `None`. The 3.2 dictionary adds the local
//! correlation-time and model-fit columns absent from 3.1.
//!
//! Tensor saveframes exist only in the 3.x dictionaries; under 2.1 the
//! record object warns and skips, returning `None`.

use serde::{Deserialize, Serialize};

use crate::error::StarError;
use crate::model::{Document, SaveFrame};
use crate::schema::{FieldValue, StarVersion, TagMap, build_tag_table};
use crate::tag_utils::{
    check_parallel, column_i64, column_opt_f64, column_required, reject_missing_entries,
    require_list,
};

// ============================================================================
// Model-free
// ============================================================================

/// Arguments for one model-free analysis data set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFreeParams {
    pub sample_cond_list_id: Option<i64>,
    pub sample_cond_list_label: Option<String>,
    pub details: Option<String>,
    pub res_nums: Option<Vec<i64>>,
    pub res_names: Option<Vec<String>>,
    pub atom_names: Option<Vec<String>>,
    pub atom_types: Option<Vec<String>>,
    pub isotope: Option<Vec<i64>>,
    pub s2: Option<Vec<Option<f64>>>,
    pub s2_err: Option<Vec<Option<f64>>>,
    pub s2f: Option<Vec<Option<f64>>>,
    pub s2f_err: Option<Vec<Option<f64>>>,
    pub s2s: Option<Vec<Option<f64>>>,
    pub s2s_err: Option<Vec<Option<f64>>>,
    pub te: Option<Vec<Option<f64>>>,
    pub te_err: Option<Vec<Option<f64>>>,
    pub tf: Option<Vec<Option<f64>>>,
    pub tf_err: Option<Vec<Option<f64>>>,
    pub ts: Option<Vec<Option<f64>>>,
    pub ts_err: Option<Vec<Option<f64>>>,
    pub rex: Option<Vec<Option<f64>>>,
    pub rex_err: Option<Vec<Option<f64>>>,
    pub chi2: Option<Vec<Option<f64>>>,
    /// Local correlation times (3.2 dictionary only).
    pub local_tm: Option<Vec<Option<f64>>>,
    pub local_tm_err: Option<Vec<Option<f64>>>,
    /// Per-spin model names (3.2 dictionary only).
    pub model_fit: Option<Vec<String>>,
}

/// One model-free data set read back from a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelFreeFrame {
    pub res_nums: Vec<i64>,
    pub res_names: Vec<String>,
    pub atom_names: Vec<String>,
    pub s2: Option<Vec<Option<f64>>>,
    pub s2f: Option<Vec<Option<f64>>>,
    pub s2s: Option<Vec<Option<f64>>>,
    pub te: Option<Vec<Option<f64>>>,
    pub tf: Option<Vec<Option<f64>>>,
    pub ts: Option<Vec<Option<f64>>>,
    pub rex: Option<Vec<Option<f64>>>,
    pub chi2: Option<Vec<Option<f64>>>,
    pub local_tm: Option<Vec<Option<f64>>>,
}

/// The model-free record object; owns the occurrence counter.
pub struct ModelFreeFrames {
    version: StarVersion,
    count: u32,
}

impl ModelFreeFrames {
    pub fn new(version: StarVersion) -> Self {
        ModelFreeFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        if self.version.dotted_tags() {
            "model_free"
        } else {
            "S2_parameters"
        }
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Model_free_list"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("SampleConditionListID", Some("Sample_condition_list_ID"))
                .tag("SampleConditionListLabel", Some("Sample_condition_list_label"))
                .tag("TaueValUnits", Some("Tau_e_val_units"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("SampleConditionListID", None)
                .tag("SampleConditionListLabel", Some("Sample_conditions_label"))
                .tag("TaueValUnits", Some("Tau_e_value_units"))
                .tag("Details", Some("Details"))
        }
    }

    fn data_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            let local_tm = (self.version == StarVersion::V3_2).then_some("Local_tau_c_val");
            let local_tm_err =
                (self.version == StarVersion::V3_2).then_some("Local_tau_c_val_err");
            let model_fit = (self.version == StarVersion::V3_2).then_some("Model_fit");
            TagMap::new(Some("Model_free"))
                .tag("ModelFreeID", Some("ID"))
                .tag("EntityID", Some("Entity_ID"))
                .tag("CompIndexID", Some("Comp_index_ID"))
                .tag("CompID", Some("Comp_ID"))
                .tag("AtomID", Some("Atom_ID"))
                .tag("AtomType", Some("Atom_type"))
                .tag("AtomIsotopeNumber", Some("Atom_isotope_number"))
                .tag("S2Val", Some("S2_val"))
                .tag("S2ValErr", Some("S2_val_err"))
                .tag("S2fVal", Some("S2f_val"))
                .tag("S2fValErr", Some("S2f_val_err"))
                .tag("S2sVal", Some("S2s_val"))
                .tag("S2sValErr", Some("S2s_val_err"))
                .tag("TauEVal", Some("Tau_e_val"))
                .tag("TauEValErr", Some("Tau_e_val_err"))
                .tag("TauFVal", Some("Tau_f_val"))
                .tag("TauFValErr", Some("Tau_f_val_err"))
                .tag("TauSVal", Some("Tau_s_val"))
                .tag("TauSValErr", Some("Tau_s_val_err"))
                .tag("RexVal", Some("Rex_val"))
                .tag("RexValErr", Some("Rex_val_err"))
                .tag("ChiSquaredVal", Some("Chi_squared_val"))
                .tag("LocalTauCVal", local_tm)
                .tag("LocalTauCValErr", local_tm_err)
                .tag("ModelFit", model_fit)
                .tag("ListID", Some("Model_free_list_ID"))
        } else {
            TagMap::new(None)
                .tag("ModelFreeID", None)
                .tag("EntityID", None)
                .tag("CompIndexID", Some("Residue_seq_code"))
                .tag("CompID", Some("Residue_label"))
                .tag("AtomID", Some("Atom_name"))
                .tag("AtomType", None)
                .tag("AtomIsotopeNumber", None)
                .tag("S2Val", Some("S2_value"))
                .tag("S2ValErr", Some("S2_value_fit_error"))
                .tag("S2fVal", Some("S2f_value"))
                .tag("S2fValErr", Some("S2f_value_fit_error"))
                .tag("S2sVal", Some("S2s_value"))
                .tag("S2sValErr", Some("S2s_value_fit_error"))
                .tag("TauEVal", Some("Tau_e_value"))
                .tag("TauEValErr", Some("Tau_e_value_fit_error"))
                .tag("TauFVal", Some("Tau_f_value"))
                .tag("TauFValErr", Some("Tau_f_value_fit_error"))
                .tag("TauSVal", Some("Tau_s_value"))
                .tag("TauSValErr", Some("Tau_s_value_fit_error"))
                .tag("RexVal", Some("Rex_value"))
                .tag("RexValErr", Some("Rex_error"))
                .tag("ChiSquaredVal", None)
                .tag("LocalTauCVal", None)
                .tag("LocalTauCValErr", None)
                .tag("ModelFit", None)
                .tag("ListID", None)
        }
    }

    /// Build one model-free saveframe and append it to the document,
    /// returning the occurrence count.
    pub fn add(
        &mut self,
        document: &mut Document,
        params: &ModelFreeParams,
    ) -> Result<u32, StarError> {
        let res_nums = require_list("residue numbers of the model-free data", &params.res_nums)?;
        let res_names = require_list("residue names of the model-free data", &params.res_names)?;
        reject_missing_entries("residue names of the model-free data", res_names)?;
        let atom_names = require_list("atom names of the model-free data", &params.atom_names)?;
        reject_missing_entries("atom names of the model-free data", atom_names)?;
        let n = res_nums.len();
        if res_names.len() != n || atom_names.len() != n {
            return Err(StarError::cardinality(
                "model-free data",
                "the residue number, residue name and atom name lists differ in length",
            ));
        }
        for (field, column) in [
            ("S2 values", &params.s2),
            ("S2 errors", &params.s2_err),
            ("te values", &params.te),
            ("Rex values", &params.rex),
            ("chi-squared values", &params.chi2),
            ("local correlation times", &params.local_tm),
        ] {
            check_parallel(field, column, n)?;
        }
        check_parallel("model names", &params.model_fit, n)?;

        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("model_free_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("SampleConditionListID", FieldValue::single(params.sample_cond_list_id)),
                (
                    "SampleConditionListLabel",
                    FieldValue::Single(
                        params
                            .sample_cond_list_label
                            .clone()
                            .unwrap_or_else(|| "$conditions_1".to_string()),
                    ),
                ),
                ("TaueValUnits", FieldValue::Single("s".to_string())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                (
                    "ModelFreeID",
                    FieldValue::Column((1..=n).map(|i| i.to_string()).collect()),
                ),
                ("EntityID", FieldValue::column(None::<&[i64]>, n)),
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID", FieldValue::column(params.atom_names.as_deref(), n)),
                ("AtomType", FieldValue::column(params.atom_types.as_deref(), n)),
                ("AtomIsotopeNumber", FieldValue::column(params.isotope.as_deref(), n)),
                ("S2Val", FieldValue::opt_column(params.s2.as_deref(), n)),
                ("S2ValErr", FieldValue::opt_column(params.s2_err.as_deref(), n)),
                ("S2fVal", FieldValue::opt_column(params.s2f.as_deref(), n)),
                ("S2fValErr", FieldValue::opt_column(params.s2f_err.as_deref(), n)),
                ("S2sVal", FieldValue::opt_column(params.s2s.as_deref(), n)),
                ("S2sValErr", FieldValue::opt_column(params.s2s_err.as_deref(), n)),
                ("TauEVal", FieldValue::opt_column(params.te.as_deref(), n)),
                ("TauEValErr", FieldValue::opt_column(params.te_err.as_deref(), n)),
                ("TauFVal", FieldValue::opt_column(params.tf.as_deref(), n)),
                ("TauFValErr", FieldValue::opt_column(params.tf_err.as_deref(), n)),
                ("TauSVal", FieldValue::opt_column(params.ts.as_deref(), n)),
                ("TauSValErr", FieldValue::opt_column(params.ts_err.as_deref(), n)),
                ("RexVal", FieldValue::opt_column(params.rex.as_deref(), n)),
                ("RexValErr", FieldValue::opt_column(params.rex_err.as_deref(), n)),
                ("ChiSquaredVal", FieldValue::opt_column(params.chi2.as_deref(), n)),
                ("LocalTauCVal", FieldValue::opt_column(params.local_tm.as_deref(), n)),
                ("LocalTauCValErr", FieldValue::opt_column(params.local_tm_err.as_deref(), n)),
                ("ModelFit", FieldValue::column(params.model_fit.as_deref(), n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    /// Read one model-free saveframe back into parallel lists.
    pub fn read_frame(&self, frame: &SaveFrame) -> Result<ModelFreeFrame, StarError> {
        let data_map = self.data_map();
        let s2_tag = data_map.required_tag("S2Val")?;
        let data_table = frame
            .tagtables
            .iter()
            .find(|table| table.has_tag(&s2_tag))
            .ok_or_else(|| {
                StarError::missing(format!("tag '{s2_tag}' in save frame '{}'", frame.title))
            })?;

        let opt_column = |key: &str| -> Result<Option<Vec<Option<f64>>>, StarError> {
            match data_map.full_tag(key)? {
                Some(tag) => column_opt_f64(data_table, &tag),
                None => Ok(None),
            }
        };

        Ok(ModelFreeFrame {
            res_nums: column_i64(data_table, &data_map.required_tag("CompIndexID")?)?,
            res_names: column_required(data_table, &data_map.required_tag("CompID")?)?.to_vec(),
            atom_names: column_required(data_table, &data_map.required_tag("AtomID")?)?.to_vec(),
            s2: opt_column("S2Val")?,
            s2f: opt_column("S2fVal")?,
            s2s: opt_column("S2sVal")?,
            te: opt_column("TauEVal")?,
            tf: opt_column("TauFVal")?,
            ts: opt_column("TauSVal")?,
            rex: opt_column("RexVal")?,
            chi2: opt_column("ChiSquaredVal")?,
            local_tm: opt_column("LocalTauCVal")?,
        })
    }

    /// All model-free data sets in the document.
    pub fn frames(&self, document: &Document) -> Result<Vec<ModelFreeFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

// ============================================================================
// Tensor
// ============================================================================

/// Arguments for one tensor saveframe (e.g. a diffusion tensor).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorParams {
    pub tensor_type: Option<String>,
    pub geometric_shape: Option<String>,
    pub tensor_symmetry: Option<String>,
    pub matrix_val_units: Option<String>,
    pub angle_units: Option<String>,
    pub euler_angle_type: Option<String>,
    pub details: Option<String>,
    pub res_nums: Option<Vec<i64>>,
    pub res_names: Option<Vec<String>>,
    pub atom_names: Option<Vec<String>>,
    pub iso_val: Option<Vec<Option<f64>>>,
    pub aniso_val: Option<Vec<Option<f64>>>,
    pub rhombic_val: Option<Vec<Option<f64>>>,
    pub euler_alpha: Option<Vec<Option<f64>>>,
    pub euler_beta: Option<Vec<Option<f64>>>,
    pub euler_gamma: Option<Vec<Option<f64>>>,
    /// Row-major 3x3 reduceable matrix components.
    pub matrix: Option<[Vec<Option<f64>>; 9]>,
}

/// The tensor record object. Tensor saveframes only exist in the 3.x
/// dictionaries.
pub struct TensorFrames {
    version: StarVersion,
    count: u32,
}

impl TensorFrames {
    pub fn new(version: StarVersion) -> Self {
        TensorFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "tensor"
    }

    fn list_map(&self) -> TagMap {
        TagMap::new(Some("Tensor_list"))
            .tag("SfCategory", Some("Sf_category"))
            .tag("ListID", Some("ID"))
            .tag("TensorType", Some("Tensor_type"))
            .tag("GeometricShape", Some("Geometric_shape"))
            .tag("TensorSymmetry", Some("Tensor_symmetry"))
            .tag("MatrixValUnits", Some("Matrix_val_units"))
            .tag("AngleUnits", Some("Angle_units"))
            .tag("EulerAngleType", Some("Euler_angle_type"))
            .tag("Details", Some("Details"))
    }

    fn data_map(&self) -> TagMap {
        TagMap::new(Some("Tensor"))
            .tag("TensorID", Some("ID"))
            .tag("CompIndexID", Some("Comp_index_ID"))
            .tag("CompID", Some("Residue_label"))
            .tag("AtomID", Some("Atom_name"))
            .tag("IsotropicVal", Some("Isotropic_val"))
            .tag("AnisotropicVal", Some("Anisotropic_val"))
            .tag("RhombicVal", Some("Rhombic_val"))
            .tag("EulerAngleAlpha", Some("Euler_angle_alpha"))
            .tag("EulerAngleBeta", Some("Euler_angle_beta"))
            .tag("EulerAngleGamma", Some("Euler_angle_gamma"))
            .tag("ReduceableMatrix11Val", Some("Reduceable_matrix_1_1_val"))
            .tag("ReduceableMatrix12Val", Some("Reduceable_matrix_1_2_val"))
            .tag("ReduceableMatrix13Val", Some("Reduceable_matrix_1_3_val"))
            .tag("ReduceableMatrix21Val", Some("Reduceable_matrix_2_1_val"))
            .tag("ReduceableMatrix22Val", Some("Reduceable_matrix_2_2_val"))
            .tag("ReduceableMatrix23Val", Some("Reduceable_matrix_2_3_val"))
            .tag("ReduceableMatrix31Val", Some("Reduceable_matrix_3_1_val"))
            .tag("ReduceableMatrix32Val", Some("Reduceable_matrix_3_2_val"))
            .tag("ReduceableMatrix33Val", Some("Reduceable_matrix_3_3_val"))
            .tag("ListID", Some("Tensor_list_ID"))
    }

    /// Build one tensor saveframe and append it to the document. Under a
    /// pre-3.1 dictionary the category does not exist: a warning is logged
    /// and `None` is returned without touching the document.
    pub fn add(
        &mut self,
        document: &mut Document,
        params: &TensorParams,
    ) -> Result<Option<u32>, StarError> {
        if !self.version.dotted_tags() {
            log::warn!(
                "the tensor saveframe does not exist in NMR-STAR version {}",
                self.version
            );
            return Ok(None);
        }
        let res_nums = require_list("residue numbers of the tensor data", &params.res_nums)?;
        let res_names = require_list("residue names of the tensor data", &params.res_names)?;
        reject_missing_entries("residue names of the tensor data", res_names)?;
        let atom_names = require_list("atom names of the tensor data", &params.atom_names)?;
        reject_missing_entries("atom names of the tensor data", atom_names)?;
        let n = res_nums.len();
        if res_names.len() != n || atom_names.len() != n {
            return Err(StarError::cardinality(
                "tensor data",
                "the residue number, residue name and atom name lists differ in length",
            ));
        }

        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("tensor_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("TensorType", FieldValue::single(params.tensor_type.as_deref())),
                ("GeometricShape", FieldValue::single(params.geometric_shape.as_deref())),
                ("TensorSymmetry", FieldValue::single(params.tensor_symmetry.as_deref())),
                ("MatrixValUnits", FieldValue::single(params.matrix_val_units.as_deref())),
                ("AngleUnits", FieldValue::single(params.angle_units.as_deref())),
                ("EulerAngleType", FieldValue::single(params.euler_angle_type.as_deref())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        let matrix_column = |i: usize| match &params.matrix {
            Some(columns) => FieldValue::opt_column(Some(columns[i].as_slice()), n),
            None => FieldValue::opt_column(None::<&[Option<f64>]>, n),
        };
        frame.tagtables.push(build_tag_table(
            &self.data_map(),
            false,
            vec![
                (
                    "TensorID",
                    FieldValue::Column((1..=n).map(|i| i.to_string()).collect()),
                ),
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("AtomID", FieldValue::column(params.atom_names.as_deref(), n)),
                ("IsotropicVal", FieldValue::opt_column(params.iso_val.as_deref(), n)),
                ("AnisotropicVal", FieldValue::opt_column(params.aniso_val.as_deref(), n)),
                ("RhombicVal", FieldValue::opt_column(params.rhombic_val.as_deref(), n)),
                ("EulerAngleAlpha", FieldValue::opt_column(params.euler_alpha.as_deref(), n)),
                ("EulerAngleBeta", FieldValue::opt_column(params.euler_beta.as_deref(), n)),
                ("EulerAngleGamma", FieldValue::opt_column(params.euler_gamma.as_deref(), n)),
                ("ReduceableMatrix11Val", matrix_column(0)),
                ("ReduceableMatrix12Val", matrix_column(1)),
                ("ReduceableMatrix13Val", matrix_column(2)),
                ("ReduceableMatrix21Val", matrix_column(3)),
                ("ReduceableMatrix22Val", matrix_column(4)),
                ("ReduceableMatrix23Val", matrix_column(5)),
                ("ReduceableMatrix31Val", matrix_column(6)),
                ("ReduceableMatrix32Val", matrix_column(7)),
                ("ReduceableMatrix33Val", matrix_column(8)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(Some(self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ModelFreeParams {
        ModelFreeParams {
            res_nums: Some(vec![1, 2]),
            res_names: Some(vec!["ALA".to_string(), "GLY".to_string()]),
            atom_names: Some(vec!["N".to_string(), "N".to_string()]),
            s2: Some(vec![Some(0.82), Some(0.91)]),
            s2_err: Some(vec![Some(0.01), Some(0.02)]),
            te: Some(vec![Some(21e-12), None]),
            rex: Some(vec![None, Some(1.4)]),
            chi2: Some(vec![Some(3.2), Some(1.1)]),
            local_tm: Some(vec![Some(8.2e-9), Some(8.3e-9)]),
            model_fit: Some(vec!["m2".to_string(), "m4".to_string()]),
            ..ModelFreeParams::default()
        }
    }

    #[test]
    fn optional_values_round_trip_as_placeholders() {
        let mut doc = Document::new("mf");
        let mut mf = ModelFreeFrames::new(StarVersion::V3_1);
        mf.add(&mut doc, &params()).unwrap();
        let reparsed = Document::parse(&doc.star_text(crate::write::Flavor::NmrStar)).unwrap();
        let frames = ModelFreeFrames::new(StarVersion::V3_1).frames(&reparsed).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].res_nums, [1, 2]);
        assert_eq!(frames[0].s2.as_ref().unwrap(), &[Some(0.82), Some(0.91)]);
        assert_eq!(frames[0].te.as_ref().unwrap(), &[Some(21e-12), None]);
        assert_eq!(frames[0].rex.as_ref().unwrap(), &[None, Some(1.4)]);
    }

    #[test]
    fn v3_2_gains_local_tm_and_model_fit_columns() {
        let mut doc_31 = Document::new("a");
        ModelFreeFrames::new(StarVersion::V3_1)
            .add(&mut doc_31, &params())
            .unwrap();
        let text_31 = doc_31.star_text(crate::write::Flavor::NmrStar);
        assert!(!text_31.contains("Local_tau_c_val"));
        assert!(!text_31.contains("Model_fit"));

        let mut doc_32 = Document::new("b");
        ModelFreeFrames::new(StarVersion::V3_2)
            .add(&mut doc_32, &params())
            .unwrap();
        let text_32 = doc_32.star_text(crate::write::Flavor::NmrStar);
        assert!(text_32.contains("_Model_free.Local_tau_c_val"));
        assert!(text_32.contains("_Model_free.Model_fit"));

        let frames = ModelFreeFrames::new(StarVersion::V3_2)
            .frames(&Document::parse(&text_32).unwrap())
            .unwrap();
        assert_eq!(
            frames[0].local_tm.as_ref().unwrap(),
            &[Some(8.2e-9), Some(8.3e-9)]
        );
    }

    #[test]
    fn tensor_is_skipped_under_v2_1() {
        let mut doc = Document::new("t");
        let mut tensor = TensorFrames::new(StarVersion::V2_1);
        let result = tensor
            .add(
                &mut doc,
                &TensorParams {
                    res_nums: Some(vec![1]),
                    res_names: Some(vec!["ALA".to_string()]),
                    atom_names: Some(vec!["N".to_string()]),
                    ..TensorParams::default()
                },
            )
            .unwrap();
        assert_eq!(result, None);
        assert!(doc.datanodes.is_empty());
    }

    #[test]
    fn tensor_frame_written_under_v3_1() {
        let mut doc = Document::new("t");
        let mut tensor = TensorFrames::new(StarVersion::V3_1);
        let count = tensor
            .add(
                &mut doc,
                &TensorParams {
                    tensor_type: Some("diffusion".to_string()),
                    geometric_shape: Some("sphere".to_string()),
                    res_nums: Some(vec![1]),
                    res_names: Some(vec!["ALA".to_string()]),
                    atom_names: Some(vec!["N".to_string()]),
                    iso_val: Some(vec![Some(4.2e7)]),
                    ..TensorParams::default()
                },
            )
            .unwrap();
        assert_eq!(count, Some(1));
        let text = doc.star_text(crate::write::Flavor::NmrStar);
        assert!(text.contains("_Tensor_list.Sf_category tensor"));
        assert!(text.contains("_Tensor.Isotropic_val"));
    }
}
