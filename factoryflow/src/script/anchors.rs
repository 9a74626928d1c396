//! Literal tokens shared by the script builder and parser.

/// Opens the source wildcard path.
pub const WILDCARD_OPEN: &str = "wildcardPaths:['";
/// Closes the source wildcard path.
pub const WILDCARD_CLOSE: &str = "']) ~> ";
/// Opens the projection column list.
pub const MAP_COLUMN_OPEN: &str = "select(mapColumn(\n                ";
/// Closes the projection column list.
pub const MAP_COLUMN_CLOSE: &str = "\n        ),\n        skipDuplicateMapInputs:";
/// Opens the sink file pattern.
pub const FILE_PATTERN_OPEN: &str = "filePattern:'";
/// Closes the sink file pattern.
pub const FILE_PATTERN_CLOSE: &str = "') ~> ";
/// Line continuation placed before every column.
pub const COLUMN_BREAK: &str = "\n\t\t";
/// Part-file marker the service appends on its own.
pub const PART_FILE_MARKER: &str = "-00001.";
