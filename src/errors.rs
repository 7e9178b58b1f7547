// Error types for tcxride

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TcxError {
    // Errors while reading the activity file
    #[snafu(display("Invalid activity file: {path}"))]
    InvalidInputFile { path: String },
    #[snafu(display("Error reading activity file"))]
    InputIOError { source: io::Error },
    #[snafu(display("Malformed markup at byte {position}"))]
    MarkupError {
        position: u64,
        source: quick_xml::Error,
    },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Errors for the sample writer
    #[snafu(display("Error writing decoded samples"))]
    WriterError { source: io::Error },
}
