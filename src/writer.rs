use std::io::{BufWriter, Write};
use std::iter;

use serde::{Deserialize, Serialize};
use serde_jsonlines::WriteExt;

use crate::TcxError;
use crate::tcx::{Activity, ActivityInfo, Sample};

/// One line of the decoded JSON Lines stream. Each activity is announced by
/// an `ActivityStart` line followed by its samples.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum DecodeOutput {
    ActivityStart(ActivityInfo),
    Sample(Sample),
}

pub fn write_activities<W: Write>(output: W, activities: &[Activity]) -> Result<(), TcxError> {
    let mut output_writer = BufWriter::new(output);
    let lines = activities.iter().flat_map(|activity| {
        iter::once(DecodeOutput::ActivityStart(activity.info()))
            .chain(activity.samples.iter().cloned().map(DecodeOutput::Sample))
    });
    output_writer
        .write_json_lines(lines)
        .map_err(|e| TcxError::WriterError { source: e })?;
    output_writer
        .flush()
        .map_err(|e| TcxError::WriterError { source: e })?;
    Ok(())
}
