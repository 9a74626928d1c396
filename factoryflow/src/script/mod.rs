//! Dataflow script templating.
//!
//! The builder renders a join + projection dataflow script from a column
//! list and file locations. The parser reads the same values back out of a
//! stored script using literal anchors, which is the only place the source
//! folder, source file and sink pattern are kept remotely. Both sides use
//! the constants in [`anchors`], so a format change has to touch them
//! together.

pub mod anchors;
mod builder;
mod parser;

pub use builder::{build_script, strip_part_marker, ScriptDocument, ScriptTemplate};
pub use parser::{
    extract_columns, extract_sink_file_pattern, extract_source_location,
    storage_account_from_endpoint,
};
