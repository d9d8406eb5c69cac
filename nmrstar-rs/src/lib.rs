//! nmrstar-rs: a Rust library for reading and writing BMRB NMR-STAR files
//!
//! This library implements the STAR-syntax tag-table engine used by the
//! BMRB NMR-STAR format — parsing whole documents into an in-memory tree of
//! save frames and tag tables, serializing that tree back to text — plus
//! the versioned tag dictionaries (2.1 / 3.0 / 3.1 / 3.2) that let the same
//! scientific values be written in different NMR-STAR dialects.
//!
//! # Features
//!
//! - **STAR parsing**: free and looped tag tables, save frames, quoted and
//!   semicolon-delimited multi-line values, comment stripping
//! - **STAR writing**: minimal quoting, NMR-STAR or mmCIF layout
//! - **Versioned dictionaries**: one data-driven tag map per (category,
//!   version) pair; write under 2.1 or 3.x and read either back
//! - **Deposition categories**: entities, citations, software, sample
//!   conditions, relaxation data, chemical shift anisotropy, model-free
//!   parameters, tensors
//!
//! # Quick Start
//!
//! ```no_run
//! use nmrstar::{NmrStarFile, StarVersion};
//! use nmrstar::relaxation::{RxParams, RxType};
//!
//! let mut star = NmrStarFile::create("deposition", StarVersion::V3_1);
//!
//! star.add_relaxation(&RxParams {
//!     data_type: RxType::R1,
//!     frq: 600e6,
//!     temp_calibration: Some("methanol".into()),
//!     temp_control: Some("single scan interleaving".into()),
//!     res_nums: Some(vec![1, 2]),
//!     res_names: Some(vec!["ALA".into(), "GLY".into()]),
//!     atom_names: Some(vec!["N".into(), "N".into()]),
//!     values: Some(vec![1.8, 1.9]),
//!     errors: Some(vec![0.05, 0.06]),
//!     ..RxParams::default()
//! }).unwrap();
//!
//! star.write("deposition.str").unwrap();
//!
//! // Read it back.
//! let star = NmrStarFile::open("deposition.str").unwrap();
//! for frame in star.relaxation_frames().unwrap() {
//!     println!("{} at {} MHz", frame.data_type, frame.frq / 1e6);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: the document tree (Document, SaveFrame, TagTable)
//! - [`parse`]: the STAR text parser
//! - [`write`]: the STAR serializer
//! - [`schema`]: dictionary versions and tag maps
//! - [`tag_utils`]: typed tag value helpers
//! - [`metadata`]: entry-level saveframe categories
//! - [`relaxation`]: relaxation data supergroups
//! - [`chem_shift_anisotropy`]: CSA saveframes
//! - [`model_free`]: model-free and tensor saveframes
//! - [`iterator`]: streaming iteration over relaxation data

pub mod chem_shift_anisotropy;
pub mod error;
pub mod iterator;
pub mod metadata;
pub mod model;
pub mod model_free;
pub mod parse;
pub mod relaxation;
pub mod schema;
pub mod tag_utils;
mod text;
pub mod write;

// Re-export the core types for convenience.
pub use error::StarError;
pub use model::{DataNode, Document, SaveFrame, TagTable};
pub use schema::{FieldValue, StarVersion, TagMap};
pub use write::Flavor;

// Re-export the category parameter and frame types.
pub use chem_shift_anisotropy::{ChemShiftAnisotropyFrames, CsaFrame, CsaParams};
pub use metadata::{
    CitationFrames, CitationParams, EntityFrame, EntityFrames, EntityParams,
    EntryInformationFrames, EntryParams, ExperimentFrames, ExperimentParams, MethodFrames,
    MethodParams, NmrSpectrometerFrames, NmrSpectrometerParams, SampleConditionsFrames,
    SampleConditionsParams, SoftwareFrames, SoftwareParams,
};
pub use model_free::{ModelFreeFrame, ModelFreeFrames, ModelFreeParams, TensorFrames, TensorParams};
pub use relaxation::{Relaxation, RxFrame, RxParams, RxType};

use std::path::Path;

use anyhow_ext::{Context, Result};

/// Main entry point for reading and writing NMR-STAR files.
///
/// An `NmrStarFile` owns the parsed [`Document`], the dictionary
/// [`StarVersion`] everything is written and read under, and one record
/// object per saveframe category. The record objects carry the occurrence
/// counters, so two sequential `add_*` calls produce two distinct
/// saveframes with incrementing titles and list IDs.
///
/// # Example
///
/// ```no_run
/// use nmrstar::NmrStarFile;
///
/// let star = NmrStarFile::open("deposition.str").unwrap();
/// println!("version: {}", star.version());
/// println!("data nodes: {}", star.document().datanodes.len());
/// ```
pub struct NmrStarFile {
    version: StarVersion,
    document: Document,
    entry_information: EntryInformationFrames,
    entity: EntityFrames,
    citations: CitationFrames,
    method: MethodFrames,
    software: SoftwareFrames,
    sample_conditions: SampleConditionsFrames,
    experiments: ExperimentFrames,
    spectrometer: NmrSpectrometerFrames,
    relaxation: Relaxation,
    chem_shift_anisotropy: ChemShiftAnisotropyFrames,
    model_free: ModelFreeFrames,
    tensor: TensorFrames,
}

impl NmrStarFile {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an empty document to be written under the given dictionary
    /// version.
    pub fn create(title: &str, version: StarVersion) -> Self {
        Self::from_document(Document::new(title), version)
    }

    /// Wrap an already-parsed document.
    pub fn from_document(document: Document, version: StarVersion) -> Self {
        NmrStarFile {
            version,
            document,
            entry_information: EntryInformationFrames::new(version),
            entity: EntityFrames::new(version),
            citations: CitationFrames::new(version),
            method: MethodFrames::new(version),
            software: SoftwareFrames::new(version),
            sample_conditions: SampleConditionsFrames::new(version),
            experiments: ExperimentFrames::new(version),
            spectrometer: NmrSpectrometerFrames::new(version),
            relaxation: Relaxation::new(version),
            chem_shift_anisotropy: ChemShiftAnisotropyFrames::new(version),
            model_free: ModelFreeFrames::new(version),
            tensor: TensorFrames::new(version),
        }
    }

    /// Read and parse an NMR-STAR file, sniffing the dictionary version
    /// from the entry-information frame (3.1 when absent).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::read(path)
            .with_context(|| format!("cannot read NMR-STAR file {}", path.display()))
            .dot()?;
        let version = StarVersion::detect(&document).unwrap_or(StarVersion::V3_1);
        Ok(Self::from_document(document, version))
    }

    /// Read and parse an NMR-STAR file under an explicit dictionary
    /// version.
    pub fn open_with_version(path: impl AsRef<Path>, version: StarVersion) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::read(path)
            .with_context(|| format!("cannot read NMR-STAR file {}", path.display()))
            .dot()?;
        Ok(Self::from_document(document, version))
    }

    // ========================================================================
    // Document access
    // ========================================================================

    pub fn version(&self) -> StarVersion {
        self.version
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The STAR text of the whole document.
    pub fn star_text(&self, flavor: Flavor) -> String {
        self.document.star_text(flavor)
    }

    /// Serialize and write the document wholesale.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.document
            .write(path)
            .with_context(|| format!("cannot write NMR-STAR file {}", path.display()))
            .dot()
    }

    // ========================================================================
    // Entry-level metadata
    // ========================================================================

    /// Add the entry-information saveframe (title and dictionary version).
    pub fn add_entry_information(&mut self, params: &EntryParams) -> Result<u32> {
        Ok(self.entry_information.add(&mut self.document, params).dot()?)
    }

    /// Add one entity (molecule) saveframe.
    pub fn add_entity(&mut self, params: &EntityParams) -> Result<u32> {
        Ok(self.entity.add(&mut self.document, params).dot()?)
    }

    /// All entities in the document.
    pub fn entity_frames(&self) -> Result<Vec<EntityFrame>> {
        Ok(self.entity.frames(&self.document).dot()?)
    }

    /// Add one citation saveframe.
    pub fn add_citation(&mut self, params: &CitationParams) -> Result<u32> {
        Ok(self.citations.add(&mut self.document, params).dot()?)
    }

    /// Add one method saveframe.
    pub fn add_method(&mut self, params: &MethodParams) -> Result<u32> {
        Ok(self.method.add(&mut self.document, params).dot()?)
    }

    /// Add one software saveframe.
    pub fn add_software(&mut self, params: &SoftwareParams) -> Result<u32> {
        Ok(self.software.add(&mut self.document, params).dot()?)
    }

    /// Add one sample-condition-list saveframe.
    pub fn add_sample_conditions(&mut self, params: &SampleConditionsParams) -> Result<u32> {
        Ok(self.sample_conditions.add(&mut self.document, params).dot()?)
    }

    /// Add the experiment-list saveframe.
    pub fn add_experiments(&mut self, params: &ExperimentParams) -> Result<u32> {
        Ok(self.experiments.add(&mut self.document, params).dot()?)
    }

    /// Add one NMR spectrometer saveframe.
    pub fn add_spectrometer(&mut self, params: &NmrSpectrometerParams) -> Result<u32> {
        Ok(self.spectrometer.add(&mut self.document, params).dot()?)
    }

    // ========================================================================
    // Scientific data
    // ========================================================================

    /// Add one relaxation data set, routed to the supergroup its
    /// dictionary version stores it in.
    pub fn add_relaxation(&mut self, params: &RxParams) -> Result<u32> {
        Ok(self.relaxation.add(&mut self.document, params).dot()?)
    }

    /// All relaxation data sets in the document, in document order.
    pub fn relaxation_frames(&self) -> Result<Vec<RxFrame>> {
        Ok(self.relaxation.frames(&self.document).dot()?)
    }

    /// Add one chemical shift anisotropy data set.
    pub fn add_chem_shift_anisotropy(&mut self, params: &CsaParams) -> Result<u32> {
        Ok(self
            .chem_shift_anisotropy
            .add(&mut self.document, params)
            .dot()?)
    }

    /// All CSA data sets in the document.
    pub fn chem_shift_anisotropy_frames(&self) -> Result<Vec<CsaFrame>> {
        Ok(self.chem_shift_anisotropy.frames(&self.document).dot()?)
    }

    /// Add one model-free analysis data set.
    pub fn add_model_free(&mut self, params: &ModelFreeParams) -> Result<u32> {
        Ok(self.model_free.add(&mut self.document, params).dot()?)
    }

    /// All model-free data sets in the document.
    pub fn model_free_frames(&self) -> Result<Vec<ModelFreeFrame>> {
        Ok(self.model_free.frames(&self.document).dot()?)
    }

    /// Add one tensor saveframe; `None` under dictionary versions that
    /// have no tensor category.
    pub fn add_tensor(&mut self, params: &TensorParams) -> Result<Option<u32>> {
        Ok(self.tensor.add(&mut self.document, params).dot()?)
    }

    // ========================================================================
    // Advanced access
    // ========================================================================

    /// The relaxation dispatch record, for use with
    /// [`iterator::RelaxationIterator`].
    pub fn relaxation(&self) -> &Relaxation {
        &self.relaxation
    }

    /// The entity record object.
    pub fn entities(&self) -> &EntityFrames {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Basic compile-time tests to ensure the API is consistent.
    #[test]
    fn test_exports() {
        let _: Option<Document> = None;
        let _: Option<SaveFrame> = None;
        let _: Option<TagTable> = None;
        let _: Option<RxFrame> = None;
        let _: Option<CsaFrame> = None;
        let _: Option<EntityFrame> = None;
        let _: Option<ModelFreeFrame> = None;
        let _: Option<StarVersion> = None;
        let _: Option<Flavor> = None;
    }

    #[test]
    fn create_and_serialize_round_trip() {
        let mut star = NmrStarFile::create("demo", StarVersion::V3_1);
        star.add_entry_information(&EntryParams {
            title: Some("demo entry".to_string()),
            ..EntryParams::default()
        })
        .unwrap();
        let text = star.star_text(Flavor::NmrStar);
        assert!(text.starts_with("data_demo\n"));

        let reparsed = Document::parse(&text).unwrap();
        assert_eq!(StarVersion::detect(&reparsed), Some(StarVersion::V3_1));
    }
}
