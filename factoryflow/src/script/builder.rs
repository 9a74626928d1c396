//! Dataflow script rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::anchors::{
    COLUMN_BREAK, FILE_PATTERN_CLOSE, FILE_PATTERN_OPEN, PART_FILE_MARKER, WILDCARD_CLOSE,
    WILDCARD_OPEN,
};
use super::parser;

/// Inputs of the dataflow script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTemplate {
    /// Name of the source stage (the source dataset).
    pub source_name: String,
    /// Name of the join-side source stage (the join dataset).
    pub join_name: String,
    /// Name of the sink stage (the sink dataset).
    pub sink_name: String,
    /// Name of the join transformation.
    pub join_stage_name: String,
    /// Name of the select transformation.
    pub select_stage_name: String,
    /// Sink file pattern, before part-marker stripping.
    pub output_file_pattern: String,
    /// Selected columns; the first one is the join key.
    pub columns: Vec<String>,
    /// Folder read by the source stage.
    pub source_folder: String,
    /// File or wildcard read by the source stage.
    pub source_file: String,
}

impl ScriptTemplate {
    /// Renders the script.
    #[must_use]
    pub fn render(&self) -> ScriptDocument {
        build_script(self)
    }
}

/// A rendered dataflow script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptDocument(String);

impl ScriptDocument {
    /// Wraps script text read back from the service.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the script text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the document and returns its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Selected columns, empty if the projection cannot be located.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        parser::extract_columns(&self.0)
    }

    /// Source `(folder, file)`, empty if the wildcard path cannot be located.
    #[must_use]
    pub fn source_location(&self) -> (String, String) {
        parser::extract_source_location(&self.0)
    }

    /// Sink file pattern, empty if it cannot be located.
    #[must_use]
    pub fn sink_file_pattern(&self) -> String {
        parser::extract_sink_file_pattern(&self.0)
    }
}

impl fmt::Display for ScriptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScriptDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Removes the `-00001.` part-file marker from a sink pattern.
///
/// `output-00001.csv` becomes `output.csv`.
#[must_use]
pub fn strip_part_marker(pattern: &str) -> String {
    pattern.replace(PART_FILE_MARKER, ".")
}

/// Renders the join + projection dataflow script.
///
/// With an empty column list both column segments render empty.
#[must_use]
pub fn build_script(template: &ScriptTemplate) -> ScriptDocument {
    let ScriptTemplate {
        source_name: source,
        join_name: join,
        sink_name: sink,
        join_stage_name: join_stage,
        select_stage_name: select_stage,
        output_file_pattern,
        columns,
        source_folder,
        source_file,
    } = template;

    let key = columns.first().map_or("", String::as_str);
    let (typed_columns, column_list) = match columns.split_first() {
        Some((key, rest)) => {
            let mut typed = format!("{COLUMN_BREAK}{{{key}}} as string");
            let mut list = format!("{COLUMN_BREAK}{key}");
            for column in rest {
                typed.push_str(&format!(",{COLUMN_BREAK}{column} as string"));
                list.push_str(&format!(",{COLUMN_BREAK}{column}"));
            }
            (typed, list)
        }
        None => (String::new(), String::new()),
    };
    let file_pattern = strip_part_marker(output_file_pattern);

    let lines = [
        format!("source(output({typed_columns}),"),
        "        allowSchemaDrift: true,".to_string(),
        "        validateSchema: false,".to_string(),
        "        ignoreNoFilesFound: false,".to_string(),
        format!("        {WILDCARD_OPEN}{source_folder}/{source_file}{WILDCARD_CLOSE}{source}"),
        "    source(output(".to_string(),
        format!("                    {{{key}}} as string"),
        "        ),".to_string(),
        "        allowSchemaDrift: true,".to_string(),
        "        validateSchema: false,".to_string(),
        format!("        ignoreNoFilesFound: false) ~> {join}"),
        format!("    {source}, {join} join({source}@{{{key}}} == {join}@{{{key}}},"),
        "        joinType:'inner',".to_string(),
        format!("        broadcast: 'auto') ~> {join_stage}"),
        format!("    {join_stage} select(mapColumn("),
        format!("                {column_list}"),
        "        ),".to_string(),
        "        skipDuplicateMapInputs: true,".to_string(),
        format!("        skipDuplicateMapOutputs: true) ~> {select_stage}"),
        format!("    {select_stage} sink(allowSchemaDrift: true,"),
        "        validateSchema: false,".to_string(),
        format!("        {FILE_PATTERN_OPEN}{file_pattern}{FILE_PATTERN_CLOSE}{sink}"),
    ];

    ScriptDocument(lines.join("\n"))
}
