// Library interface for tcxride
// This allows integration tests and benches to access internal modules

pub mod config;
pub mod errors;
pub mod tcx;
pub mod writer;

// Re-export commonly used types
pub use config::{DecoderConfig, MalformedNumberPolicy};
pub use errors::TcxError;
pub use tcx::{
    Activity, ActivityInfo, ActivityIssue, Sample, Sport, TcxDecoder, decode_file, decode_reader,
    decode_str,
};
pub use writer::{DecodeOutput, write_activities};
