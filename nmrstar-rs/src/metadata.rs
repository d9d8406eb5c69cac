//! Entry-level saveframe categories.
//!
//! This module provides the deposition-metadata saveframes surrounding the
//! scientific data:
//! - Entry information (title and dictionary version)
//! - Entities (molecules and their residue sequences)
//! - Citations
//! - Methods
//! - Software
//! - Sample conditions
//! - Experiments
//! - NMR spectrometers
//!
//! Every record object owns its occurrence counter; each `add()` builds one
//! saveframe with the category tag table first and appends it to the
//! document.

use serde::{Deserialize, Serialize};

use crate::error::StarError;
use crate::model::{Document, SaveFrame};
use crate::schema::{FieldValue, StarVersion, TagMap, build_tag_table};
use crate::tag_utils::{
    check_parallel, column_i64, column_required, reject_missing_entries, require_list,
};

// ============================================================================
// Entry information
// ============================================================================

/// Arguments for the entry-information saveframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryParams {
    pub title: Option<String>,
    pub experimental_method: Option<String>,
    pub details: Option<String>,
}

/// The entry-information record object. Writes the version tag that
/// [`StarVersion::detect`] reads back.
pub struct EntryInformationFrames {
    version: StarVersion,
    count: u32,
}

impl EntryInformationFrames {
    pub fn new(version: StarVersion) -> Self {
        EntryInformationFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "entry_information"
    }

    fn map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Entry"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("Title", Some("Title"))
                .tag("NMRStarVersion", Some("NMR_STAR_version"))
                .tag("OriginalNMRStarVersion", Some("Original_NMR_STAR_version"))
                .tag("ExperimentalMethod", Some("Experimental_method"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("Title", Some("Entry_title"))
                .tag("NMRStarVersion", Some("NMR_STAR_version"))
                .tag("OriginalNMRStarVersion", None)
                .tag("ExperimentalMethod", None)
                .tag("Details", Some("Details"))
        }
    }

    pub fn add(&mut self, document: &mut Document, params: &EntryParams) -> Result<u32, StarError> {
        self.count += 1;
        let mut frame = SaveFrame::new(format!("entry_information_{}", self.count));
        frame.tagtables.push(build_tag_table(
            &self.map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("Title", FieldValue::single(params.title.as_deref())),
                ("NMRStarVersion", FieldValue::Single(self.version.to_string())),
                (
                    "OriginalNMRStarVersion",
                    FieldValue::Single(self.version.to_string()),
                ),
                (
                    "ExperimentalMethod",
                    FieldValue::single(params.experimental_method.as_deref()),
                ),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);
        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// Entity
// ============================================================================

/// Arguments for one entity (molecule) saveframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityParams {
    pub mol_name: String,
    /// `polymer` for the usual protein case.
    pub mol_type: String,
    pub polymer_type: Option<String>,
    pub seq_one_letter: Option<String>,
    pub thiol_state: Option<String>,
    pub res_nums: Option<Vec<i64>>,
    pub res_names: Option<Vec<String>>,
}

impl Default for EntityParams {
    fn default() -> Self {
        EntityParams {
            mol_name: String::new(),
            mol_type: "polymer".to_string(),
            polymer_type: None,
            seq_one_letter: None,
            thiol_state: None,
            res_nums: None,
            res_names: None,
        }
    }
}

/// One entity read back from a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityFrame {
    pub mol_name: Option<String>,
    pub res_nums: Vec<i64>,
    pub res_names: Vec<String>,
}

/// The entity record object; owns the occurrence counter.
pub struct EntityFrames {
    version: StarVersion,
    count: u32,
}

impl EntityFrames {
    pub fn new(version: StarVersion) -> Self {
        EntityFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        if self.version.dotted_tags() {
            "entity"
        } else {
            "monomeric_polymer"
        }
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Entity"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("EntityID", Some("ID"))
                .tag("Name", Some("Name"))
                .tag("Type", Some("Type"))
                .tag("PolymerType", Some("Polymer_type"))
                .tag("SeqOneLetterCode", Some("Polymer_seq_one_letter_code"))
                .tag("ThiolState", Some("Thiol_state"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("EntityID", None)
                .tag("Name", Some("Molecule_name"))
                .tag("Type", Some("Mol_type"))
                .tag("PolymerType", Some("Mol_polymer_class"))
                .tag("SeqOneLetterCode", Some("Mol_residue_sequence"))
                .tag("ThiolState", Some("Mol_thiol_state"))
        }
    }

    fn seq_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Entity_comp_index"))
                .tag("CompIndexID", Some("ID"))
                .tag("AuthSeqID", Some("Auth_seq_ID"))
                .tag("CompID", Some("Comp_ID"))
                .tag("EntityID", Some("Entity_ID"))
        } else {
            TagMap::new(None)
                .tag("CompIndexID", Some("Residue_seq_code"))
                .tag("AuthSeqID", None)
                .tag("CompID", Some("Residue_label"))
                .tag("EntityID", None)
        }
    }

    pub fn add(&mut self, document: &mut Document, params: &EntityParams) -> Result<u32, StarError> {
        let res_nums = require_list("residue numbers of the entity", &params.res_nums)?;
        let res_names = require_list("residue names of the entity", &params.res_names)?;
        reject_missing_entries("residue names of the entity", res_names)?;
        let n = res_nums.len();
        if res_names.len() != n {
            return Err(StarError::cardinality(
                "entity",
                "the residue number and residue name lists differ in length",
            ));
        }

        self.count += 1;
        let entity_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("entity_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("EntityID", FieldValue::Single(entity_id.clone())),
                ("Name", FieldValue::Single(params.mol_name.clone())),
                ("Type", FieldValue::Single(params.mol_type.clone())),
                ("PolymerType", FieldValue::single(params.polymer_type.as_deref())),
                ("SeqOneLetterCode", FieldValue::single(params.seq_one_letter.as_deref())),
                ("ThiolState", FieldValue::single(params.thiol_state.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.seq_map(),
            false,
            vec![
                ("CompIndexID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("AuthSeqID", FieldValue::column(params.res_nums.as_deref(), n)),
                ("CompID", FieldValue::column(params.res_names.as_deref(), n)),
                ("EntityID", FieldValue::Single(entity_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }

    pub fn read_frame(&self, frame: &SaveFrame) -> Result<EntityFrame, StarError> {
        let list_map = self.list_map();
        let seq_map = self.seq_map();
        let name_tag = list_map.required_tag("Name")?;
        let mol_name = frame
            .tagtables
            .iter()
            .find_map(|table| table.single(&name_tag))
            .map(str::to_string);

        let comp_tag = seq_map.required_tag("CompID")?;
        let seq_table = frame
            .tagtables
            .iter()
            .find(|table| !table.free && table.has_tag(&comp_tag))
            .ok_or_else(|| {
                StarError::missing(format!("tag '{comp_tag}' in save frame '{}'", frame.title))
            })?;
        Ok(EntityFrame {
            mol_name,
            res_nums: column_i64(seq_table, &seq_map.required_tag("CompIndexID")?)?,
            res_names: column_required(seq_table, &comp_tag)?.to_vec(),
        })
    }

    pub fn frames(&self, document: &Document) -> Result<Vec<EntityFrame>, StarError> {
        document
            .save_frames(self.sf_category())
            .into_iter()
            .map(|frame| self.read_frame(frame))
            .collect()
    }
}

// ============================================================================
// Citations
// ============================================================================

/// Arguments for one citation saveframe. 2.1 files store the whole
/// citation as one text blob; 3.x files carry structured fields plus an
/// author loop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationParams {
    pub full_citation: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub citation_type: Option<String>,
    pub journal_abbrev: Option<String>,
    pub journal_volume: Option<i64>,
    pub page_first: Option<i64>,
    pub page_last: Option<i64>,
    pub year: Option<i64>,
    pub pubmed_id: Option<String>,
    pub doi: Option<String>,
    pub author_given_names: Option<Vec<String>>,
    pub author_family_names: Option<Vec<String>>,
    pub author_first_initials: Option<Vec<String>>,
}

/// The citation record object.
pub struct CitationFrames {
    version: StarVersion,
    count: u32,
}

impl CitationFrames {
    pub fn new(version: StarVersion) -> Self {
        CitationFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "citations"
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Citation"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("CitationID", Some("ID"))
                .tag("FullCitation", Some("Full_citation"))
                .tag("Title", Some("Title"))
                .tag("Status", Some("Status"))
                .tag("Type", Some("Type"))
                .tag("JournalAbbrev", Some("Journal_abbrev"))
                .tag("JournalVolume", Some("Journal_volume"))
                .tag("PageFirst", Some("Page_first"))
                .tag("PageLast", Some("Page_last"))
                .tag("Year", Some("Year"))
                .tag("PubMedID", Some("PubMed_ID"))
                .tag("DOI", Some("DOI"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("CitationID", None)
                .tag("FullCitation", Some("Citation_full"))
                .tag("Title", None)
                .tag("Status", None)
                .tag("Type", None)
                .tag("JournalAbbrev", None)
                .tag("JournalVolume", None)
                .tag("PageFirst", None)
                .tag("PageLast", None)
                .tag("Year", None)
                .tag("PubMedID", None)
                .tag("DOI", None)
        }
    }

    fn author_map(&self) -> Option<TagMap> {
        if self.version.dotted_tags() {
            Some(
                TagMap::new(Some("Citation_author"))
                    .tag("Ordinal", Some("Ordinal"))
                    .tag("GivenName", Some("Given_name"))
                    .tag("FamilyName", Some("Family_name"))
                    .tag("FirstInitial", Some("First_initial"))
                    .tag("CitationID", Some("Citation_ID")),
            )
        } else {
            None
        }
    }

    pub fn add(
        &mut self,
        document: &mut Document,
        params: &CitationParams,
    ) -> Result<u32, StarError> {
        let n_authors = params
            .author_family_names
            .as_ref()
            .map_or(0, Vec::len);
        check_parallel("author given names", &params.author_given_names, n_authors)?;
        check_parallel(
            "author first initials",
            &params.author_first_initials,
            n_authors,
        )?;

        self.count += 1;
        let citation_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("citations_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("CitationID", FieldValue::Single(citation_id.clone())),
                ("FullCitation", FieldValue::single(params.full_citation.as_deref())),
                ("Title", FieldValue::single(params.title.as_deref())),
                ("Status", FieldValue::single(params.status.as_deref())),
                ("Type", FieldValue::single(params.citation_type.as_deref())),
                ("JournalAbbrev", FieldValue::single(params.journal_abbrev.as_deref())),
                ("JournalVolume", FieldValue::single(params.journal_volume)),
                ("PageFirst", FieldValue::single(params.page_first)),
                ("PageLast", FieldValue::single(params.page_last)),
                ("Year", FieldValue::single(params.year)),
                ("PubMedID", FieldValue::single(params.pubmed_id.as_deref())),
                ("DOI", FieldValue::single(params.doi.as_deref())),
            ],
        )?);

        if n_authors > 0 {
            if let Some(author_map) = self.author_map() {
                frame.tagtables.push(build_tag_table(
                    &author_map,
                    false,
                    vec![
                        (
                            "Ordinal",
                            FieldValue::Column((1..=n_authors).map(|i| i.to_string()).collect()),
                        ),
                        (
                            "GivenName",
                            FieldValue::column(params.author_given_names.as_deref(), n_authors),
                        ),
                        (
                            "FamilyName",
                            FieldValue::column(params.author_family_names.as_deref(), n_authors),
                        ),
                        (
                            "FirstInitial",
                            FieldValue::column(params.author_first_initials.as_deref(), n_authors),
                        ),
                        ("CitationID", FieldValue::Single(citation_id)),
                    ],
                )?);
            }
        }

        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// Method
// ============================================================================

/// Arguments for one method saveframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodParams {
    pub details: Option<String>,
}

/// The method record object.
pub struct MethodFrames {
    version: StarVersion,
    count: u32,
}

impl MethodFrames {
    pub fn new(version: StarVersion) -> Self {
        MethodFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "method"
    }

    fn map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Method"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("MethodID", Some("ID"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("MethodID", None)
                .tag("Details", Some("Details"))
        }
    }

    pub fn add(&mut self, document: &mut Document, params: &MethodParams) -> Result<u32, StarError> {
        self.count += 1;
        let mut frame = SaveFrame::new(format!("method_{}", self.count));
        frame.tagtables.push(build_tag_table(
            &self.map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("MethodID", FieldValue::Single(self.count.to_string())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);
        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// Software
// ============================================================================

/// Arguments for one software saveframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareParams {
    pub name: String,
    pub version: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_eaddress: Option<String>,
    pub tasks: Option<Vec<String>>,
}

/// The software record object.
pub struct SoftwareFrames {
    version: StarVersion,
    count: u32,
}

impl SoftwareFrames {
    pub fn new(version: StarVersion) -> Self {
        SoftwareFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "software"
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Software"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("SoftwareID", Some("ID"))
                .tag("Name", Some("Name"))
                .tag("Version", Some("Version"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("SoftwareID", None)
                .tag("Name", Some("Name"))
                .tag("Version", Some("Version"))
        }
    }

    fn task_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Task"))
                .tag("Task", Some("Task"))
                .tag("SoftwareID", Some("Software_ID"))
        } else {
            TagMap::new(None)
                .tag("Task", Some("Task"))
                .tag("SoftwareID", None)
        }
    }

    fn vendor_map(&self) -> Option<TagMap> {
        if self.version.dotted_tags() {
            Some(
                TagMap::new(Some("Vendor"))
                    .tag("Name", Some("Name"))
                    .tag("ElectronicAddress", Some("Electronic_address"))
                    .tag("SoftwareID", Some("Software_ID")),
            )
        } else {
            None
        }
    }

    pub fn add(
        &mut self,
        document: &mut Document,
        params: &SoftwareParams,
    ) -> Result<u32, StarError> {
        if params.name.is_empty() {
            return Err(StarError::missing("software name"));
        }
        self.count += 1;
        let software_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("software_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("SoftwareID", FieldValue::Single(software_id.clone())),
                ("Name", FieldValue::Single(params.name.clone())),
                ("Version", FieldValue::single(params.version.as_deref())),
            ],
        )?);

        if let Some(tasks) = params.tasks.as_deref() {
            if !tasks.is_empty() {
                frame.tagtables.push(build_tag_table(
                    &self.task_map(),
                    false,
                    vec![
                        ("Task", FieldValue::column(Some(tasks), tasks.len())),
                        ("SoftwareID", FieldValue::Single(software_id.clone())),
                    ],
                )?);
            }
        }

        if let Some(vendor_map) = self.vendor_map() {
            if params.vendor_name.is_some() || params.vendor_eaddress.is_some() {
                frame.tagtables.push(build_tag_table(
                    &vendor_map,
                    false,
                    vec![
                        ("Name", FieldValue::single(params.vendor_name.as_deref())),
                        (
                            "ElectronicAddress",
                            FieldValue::single(params.vendor_eaddress.as_deref()),
                        ),
                        ("SoftwareID", FieldValue::Single(software_id)),
                    ],
                )?);
            }
        }

        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// Sample conditions
// ============================================================================

/// Arguments for one sample-condition-list saveframe: parallel lists of
/// condition variables (temperature, pH, ...), their values, errors and
/// units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleConditionsParams {
    pub details: Option<String>,
    pub types: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub errors: Option<Vec<String>>,
    pub units: Option<Vec<String>>,
}

/// The sample-conditions record object.
pub struct SampleConditionsFrames {
    version: StarVersion,
    count: u32,
}

impl SampleConditionsFrames {
    pub fn new(version: StarVersion) -> Self {
        SampleConditionsFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "sample_conditions"
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Sample_condition_list"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("Details", Some("Details"))
        }
    }

    fn variable_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Sample_condition_variable"))
                .tag("Type", Some("Type"))
                .tag("Val", Some("Val"))
                .tag("ValErr", Some("Val_err"))
                .tag("ValUnits", Some("Val_units"))
                .tag("ListID", Some("Sample_condition_list_ID"))
        } else {
            TagMap::new(None)
                .tag("Type", Some("Variable_type"))
                .tag("Val", Some("Variable_value"))
                .tag("ValErr", Some("Variable_value_error"))
                .tag("ValUnits", Some("Variable_value_units"))
                .tag("ListID", None)
        }
    }

    pub fn add(
        &mut self,
        document: &mut Document,
        params: &SampleConditionsParams,
    ) -> Result<u32, StarError> {
        let types = require_list("sample condition variable types", &params.types)?;
        let n = types.len();
        check_parallel("sample condition values", &params.values, n)?;
        check_parallel("sample condition errors", &params.errors, n)?;
        check_parallel("sample condition units", &params.units, n)?;

        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("sample_conditions_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.variable_map(),
            false,
            vec![
                ("Type", FieldValue::column(params.types.as_deref(), n)),
                ("Val", FieldValue::column(params.values.as_deref(), n)),
                ("ValErr", FieldValue::column(params.errors.as_deref(), n)),
                ("ValUnits", FieldValue::column(params.units.as_deref(), n)),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// Experiments
// ============================================================================

/// Arguments for the experiment-list saveframe: one row per experiment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    pub details: Option<String>,
    pub names: Option<Vec<String>>,
    pub sample_labels: Option<Vec<String>>,
    pub sample_states: Option<Vec<String>>,
    pub spectrometer_labels: Option<Vec<String>>,
}

/// The experiment-list record object.
pub struct ExperimentFrames {
    version: StarVersion,
    count: u32,
}

impl ExperimentFrames {
    pub fn new(version: StarVersion) -> Self {
        ExperimentFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        if self.version.dotted_tags() {
            "experiment_list"
        } else {
            "NMR_applied_experiment"
        }
    }

    fn list_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Experiment_list"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("ListID", Some("ID"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("ListID", None)
                .tag("Details", Some("Details"))
        }
    }

    fn experiment_map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("Experiment"))
                .tag("ExperimentID", Some("ID"))
                .tag("Name", Some("Name"))
                .tag("SampleLabel", Some("Sample_label"))
                .tag("SampleState", Some("Sample_state"))
                .tag("SpectrometerLabel", Some("NMR_spectrometer_label"))
                .tag("ListID", Some("Experiment_list_ID"))
        } else {
            TagMap::new(None)
                .tag("ExperimentID", None)
                .tag("Name", Some("Experiment_name"))
                .tag("SampleLabel", Some("Sample_label"))
                .tag("SampleState", None)
                .tag("SpectrometerLabel", None)
                .tag("ListID", None)
        }
    }

    pub fn add(
        &mut self,
        document: &mut Document,
        params: &ExperimentParams,
    ) -> Result<u32, StarError> {
        let names = require_list("experiment names", &params.names)?;
        let n = names.len();
        check_parallel("sample labels", &params.sample_labels, n)?;
        check_parallel("sample states", &params.sample_states, n)?;
        check_parallel("spectrometer labels", &params.spectrometer_labels, n)?;

        self.count += 1;
        let list_id = self.count.to_string();
        let mut frame = SaveFrame::new(format!("experiment_list_{}", self.count));

        frame.tagtables.push(build_tag_table(
            &self.list_map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("ListID", FieldValue::Single(list_id.clone())),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);

        frame.tagtables.push(build_tag_table(
            &self.experiment_map(),
            false,
            vec![
                (
                    "ExperimentID",
                    FieldValue::Column((1..=n).map(|i| i.to_string()).collect()),
                ),
                ("Name", FieldValue::column(params.names.as_deref(), n)),
                ("SampleLabel", FieldValue::column(params.sample_labels.as_deref(), n)),
                ("SampleState", FieldValue::column(params.sample_states.as_deref(), n)),
                (
                    "SpectrometerLabel",
                    FieldValue::column(params.spectrometer_labels.as_deref(), n),
                ),
                ("ListID", FieldValue::Single(list_id)),
            ],
        )?);

        document.push_frame(frame);
        Ok(self.count)
    }
}

// ============================================================================
// NMR spectrometers
// ============================================================================

/// Arguments for one spectrometer saveframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NmrSpectrometerParams {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Proton field strength, in MHz.
    pub field_strength: Option<f64>,
    pub details: Option<String>,
}

/// The spectrometer record object.
pub struct NmrSpectrometerFrames {
    version: StarVersion,
    count: u32,
}

impl NmrSpectrometerFrames {
    pub fn new(version: StarVersion) -> Self {
        NmrSpectrometerFrames { version, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sf_category(&self) -> &'static str {
        "NMR_spectrometer"
    }

    fn map(&self) -> TagMap {
        if self.version.dotted_tags() {
            TagMap::new(Some("NMR_spectrometer"))
                .tag("SfCategory", Some("Sf_category"))
                .tag("SpectrometerID", Some("ID"))
                .tag("Manufacturer", Some("Manufacturer"))
                .tag("Model", Some("Model"))
                .tag("FieldStrength", Some("Field_strength"))
                .tag("Details", Some("Details"))
        } else {
            TagMap::new(None)
                .tag("SfCategory", Some("Saveframe_category"))
                .tag("SpectrometerID", None)
                .tag("Manufacturer", Some("Manufacturer"))
                .tag("Model", Some("Model"))
                .tag("FieldStrength", Some("Field_strength"))
                .tag("Details", Some("Details"))
        }
    }

    pub fn add(
        &mut self,
        document: &mut Document,
        params: &NmrSpectrometerParams,
    ) -> Result<u32, StarError> {
        self.count += 1;
        let mut frame = SaveFrame::new(format!("NMR_spectrometer_{}", self.count));
        frame.tagtables.push(build_tag_table(
            &self.map(),
            true,
            vec![
                ("SfCategory", FieldValue::Single(self.sf_category().to_string())),
                ("SpectrometerID", FieldValue::Single(self.count.to_string())),
                ("Manufacturer", FieldValue::single(params.manufacturer.as_deref())),
                ("Model", FieldValue::single(params.model.as_deref())),
                ("FieldStrength", FieldValue::single(params.field_strength)),
                ("Details", FieldValue::single(params.details.as_deref())),
            ],
        )?);
        document.push_frame(frame);
        Ok(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::Flavor;

    #[test]
    fn entity_round_trips() {
        let mut doc = Document::new("entities");
        let mut entities = EntityFrames::new(StarVersion::V3_1);
        entities
            .add(
                &mut doc,
                &EntityParams {
                    mol_name: "ubiquitin".to_string(),
                    seq_one_letter: Some("MQIFVK".to_string()),
                    res_nums: Some(vec![1, 2, 3]),
                    res_names: Some(vec![
                        "MET".to_string(),
                        "GLN".to_string(),
                        "ILE".to_string(),
                    ]),
                    ..EntityParams::default()
                },
            )
            .unwrap();

        let reparsed = Document::parse(&doc.star_text(Flavor::NmrStar)).unwrap();
        let frames = EntityFrames::new(StarVersion::V3_1).frames(&reparsed).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].mol_name.as_deref(), Some("ubiquitin"));
        assert_eq!(frames[0].res_nums, [1, 2, 3]);
        assert_eq!(frames[0].res_names, ["MET", "GLN", "ILE"]);
    }

    #[test]
    fn citation_authors_only_in_v3_dialects() {
        let params = CitationParams {
            full_citation: Some("d'Auvergne & Gooley (2008) J Biomol NMR 40, 107-119.".to_string()),
            author_family_names: Some(vec!["d'Auvergne".to_string(), "Gooley".to_string()]),
            author_given_names: Some(vec!["Edward".to_string(), "Paul".to_string()]),
            ..CitationParams::default()
        };

        let mut doc_v3 = Document::new("c");
        CitationFrames::new(StarVersion::V3_1)
            .add(&mut doc_v3, &params)
            .unwrap();
        let text_v3 = doc_v3.star_text(Flavor::NmrStar);
        assert!(text_v3.contains("_Citation_author.Family_name"));

        let mut doc_v2 = Document::new("c");
        CitationFrames::new(StarVersion::V2_1)
            .add(&mut doc_v2, &params)
            .unwrap();
        let text_v2 = doc_v2.star_text(Flavor::NmrStar);
        assert!(text_v2.contains("_Citation_full"));
        assert!(!text_v2.contains("Family_name"));
    }

    #[test]
    fn software_tasks_loop() {
        let mut doc = Document::new("s");
        SoftwareFrames::new(StarVersion::V3_1)
            .add(
                &mut doc,
                &SoftwareParams {
                    name: "relax".to_string(),
                    version: Some("3.3.1".to_string()),
                    tasks: Some(vec!["data processing".to_string()]),
                    ..SoftwareParams::default()
                },
            )
            .unwrap();
        let text = doc.star_text(Flavor::NmrStar);
        assert!(text.contains("_Software.Name relax"));
        assert!(text.contains("_Task.Task"));
        assert!(text.contains("\"data processing\""));
    }

    #[test]
    fn empty_software_name_rejected() {
        let mut doc = Document::new("s");
        let result = SoftwareFrames::new(StarVersion::V3_1)
            .add(&mut doc, &SoftwareParams::default());
        assert!(matches!(result, Err(StarError::MissingValue { .. })));
    }

    #[test]
    fn sample_conditions_variable_loop() {
        let mut doc = Document::new("sc");
        SampleConditionsFrames::new(StarVersion::V3_1)
            .add(
                &mut doc,
                &SampleConditionsParams {
                    types: Some(vec!["temperature".to_string(), "pH".to_string()]),
                    values: Some(vec!["298".to_string(), "6.5".to_string()]),
                    errors: Some(vec!["0.1".to_string(), "0.05".to_string()]),
                    units: Some(vec!["K".to_string(), "pH".to_string()]),
                    ..SampleConditionsParams::default()
                },
            )
            .unwrap();
        let text = doc.star_text(Flavor::NmrStar);
        assert!(text.contains("_Sample_condition_variable.Type"));
        assert!(text.contains("temperature 298 0.1 K"));
    }

    #[test]
    fn entry_information_writes_the_version_tag() {
        let mut doc = Document::new("e");
        EntryInformationFrames::new(StarVersion::V3_1)
            .add(
                &mut doc,
                &EntryParams {
                    title: Some("Model-free deposition".to_string()),
                    ..EntryParams::default()
                },
            )
            .unwrap();
        let reparsed = Document::parse(&doc.star_text(Flavor::NmrStar)).unwrap();
        assert_eq!(StarVersion::detect(&reparsed), Some(StarVersion::V3_1));
    }
}
