//! Iteration utilities for streaming through relaxation data.
//!
//! Reading a whole deposition eagerly is fine for small files, but a
//! document can carry dozens of relaxation lists; the iterator here parses
//! one saveframe at a time, on demand, and surfaces per-frame failures
//! instead of aborting the whole pass up front.
//!
//! # Example
//! ```no_run
//! use fallible_iterator::FallibleIterator;
//! use nmrstar::iterator::RelaxationIterator;
//! use nmrstar::relaxation::Relaxation;
//! use nmrstar::{Document, StarVersion};
//!
//! let doc = Document::read("deposition.str").unwrap();
//! let relaxation = Relaxation::new(StarVersion::V3_1);
//! let mut iter = RelaxationIterator::new(&doc, &relaxation);
//! while let Some(frame) = iter.next().unwrap() {
//!     println!("{} at {} MHz: {} spins", frame.data_type, frame.frq / 1e6, frame.res_nums.len());
//! }
//! ```

use fallible_iterator::FallibleIterator;

use crate::error::StarError;
use crate::model::{DataNode, Document};
use crate::relaxation::{Relaxation, RxFrame};

/// Iterator yielding every relaxation data set of a document, in document
/// order, parsing each saveframe lazily.
pub struct RelaxationIterator<'a> {
    document: &'a Document,
    relaxation: &'a Relaxation,
    index: usize,
}

impl<'a> RelaxationIterator<'a> {
    pub fn new(document: &'a Document, relaxation: &'a Relaxation) -> Self {
        RelaxationIterator {
            document,
            relaxation,
            index: 0,
        }
    }
}

impl FallibleIterator for RelaxationIterator<'_> {
    type Item = RxFrame;
    type Error = StarError;

    fn next(&mut self) -> Result<Option<RxFrame>, StarError> {
        while self.index < self.document.datanodes.len() {
            let node = &self.document.datanodes[self.index];
            self.index += 1;
            if let DataNode::Frame(frame) = node {
                if let Some(data) = self.relaxation.read_frame(frame)? {
                    return Ok(Some(data));
                }
            }
        }
        Ok(None)
    }
}

/// Visit every relaxation data set of a document with a callback.
pub fn for_each_relaxation_frame<F>(
    document: &Document,
    relaxation: &Relaxation,
    mut on_frame: F,
) -> Result<(), StarError>
where
    F: FnMut(&RxFrame) -> Result<(), StarError>,
{
    let mut iter = RelaxationIterator::new(document, relaxation);
    while let Some(frame) = iter.next()? {
        on_frame(&frame)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relaxation::{RxParams, RxType};
    use crate::schema::StarVersion;

    #[test]
    fn iterates_frames_in_document_order() {
        let mut doc = Document::new("t");
        let mut relaxation = Relaxation::new(StarVersion::V3_1);
        for (data_type, frq) in [(RxType::R1, 500e6), (RxType::Noe, 500e6), (RxType::R2, 600e6)] {
            relaxation
                .add(
                    &mut doc,
                    &RxParams {
                        data_type,
                        frq,
                        temp_calibration: Some("methanol".to_string()),
                        temp_control: Some("single scan interleaving".to_string()),
                        res_nums: Some(vec![1]),
                        res_names: Some(vec!["ALA".to_string()]),
                        atom_names: Some(vec!["N".to_string()]),
                        values: Some(vec![1.0]),
                        errors: Some(vec![0.1]),
                        ..RxParams::default()
                    },
                )
                .unwrap();
        }

        let mut seen = Vec::new();
        for_each_relaxation_frame(&doc, &relaxation, |frame| {
            seen.push((frame.data_type, frame.frq));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            [
                (RxType::R1, 500e6),
                (RxType::Noe, 500e6),
                (RxType::R2, 600e6)
            ]
        );
    }
}
