//! Delimited-text dataset location.

use serde::{Deserialize, Serialize};

/// A delimited-text file location plus its parsing options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dataset {
    /// Resource group holding the storage account.
    pub resource_group_name: String,
    /// Storage account name.
    pub storage_account_name: String,
    /// Blob container.
    pub container_name: String,
    /// Folder inside the container.
    pub folder_path: String,
    /// File name or wildcard pattern.
    pub file_pattern_or_name: String,
    /// Whether the first row holds column names.
    pub first_row_as_header: bool,
    /// Single-character column delimiter.
    pub column_delimiter: String,
    /// Single-character quote.
    pub quote_char: String,
    /// Single-character escape.
    pub escape_char: String,
}

impl Dataset {
    /// Creates a dataset with default parsing options
    /// (header row, `;` delimiter, `"` quote and escape).
    #[must_use]
    pub fn new(
        resource_group_name: impl Into<String>,
        storage_account_name: impl Into<String>,
        container_name: impl Into<String>,
        folder_path: impl Into<String>,
        file_pattern_or_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            storage_account_name: storage_account_name.into(),
            container_name: container_name.into(),
            folder_path: folder_path.into(),
            file_pattern_or_name: file_pattern_or_name.into(),
            first_row_as_header: true,
            column_delimiter: ColumnDelimiter::default().as_str().to_string(),
            quote_char: QuoteCharacter::default().as_str().to_string(),
            escape_char: EscapeCharacter::default().as_str().to_string(),
        }
    }

    /// An empty location in the given resource group.
    #[must_use]
    pub fn empty(resource_group_name: impl Into<String>) -> Self {
        Self::new(resource_group_name, "", "", "", "")
    }

    /// Sets the column delimiter.
    #[must_use]
    pub fn with_column_delimiter(mut self, delimiter: ColumnDelimiter) -> Self {
        self.column_delimiter = delimiter.as_str().to_string();
        self
    }

    /// Sets the header flag.
    #[must_use]
    pub fn with_header(mut self, first_row_as_header: bool) -> Self {
        self.first_row_as_header = first_row_as_header;
        self
    }

    /// The five location fields in identity order.
    #[must_use]
    pub fn location_fields(&self) -> [&str; 5] {
        [
            &self.resource_group_name,
            &self.storage_account_name,
            &self.container_name,
            &self.folder_path,
            &self.file_pattern_or_name,
        ]
    }
}

/// Known column delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnDelimiter {
    /// `,`
    Comma,
    /// `;`
    #[default]
    Semicolon,
    /// `|`
    Pipe,
    /// Tab character.
    Tab,
}

impl ColumnDelimiter {
    /// Returns the delimiter character as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Pipe => "|",
            Self::Tab => "\t",
        }
    }
}

/// Known quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteCharacter {
    /// `"`
    #[default]
    DoubleQuote,
    /// `'`
    SingleQuote,
}

impl QuoteCharacter {
    /// Returns the quote character as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoubleQuote => "\"",
            Self::SingleQuote => "'",
        }
    }
}

/// Known escape characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeCharacter {
    /// `"`
    #[default]
    DoubleQuote,
    /// `\`
    Backslash,
    /// `/`
    Slash,
}

impl EscapeCharacter {
    /// Returns the escape character as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoubleQuote => "\"",
            Self::Backslash => "\\",
            Self::Slash => "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_defaults() {
        let ds = Dataset::new("rg", "account", "container", "folder", "file.csv");
        assert!(ds.first_row_as_header);
        assert_eq!(ds.column_delimiter, ";");
        assert_eq!(ds.quote_char, "\"");
        assert_eq!(ds.escape_char, "\"");
    }

    #[test]
    fn test_dataset_location_fields_order() {
        let ds = Dataset::new("rg", "account", "container", "folder", "file.csv");
        assert_eq!(
            ds.location_fields(),
            ["rg", "account", "container", "folder", "file.csv"]
        );
    }

    #[test]
    fn test_dataset_json_field_names() {
        let ds = Dataset::empty("rg").with_column_delimiter(ColumnDelimiter::Tab);
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["resource_group_name"], "rg");
        assert_eq!(json["file_pattern_or_name"], "");
        assert_eq!(json["column_delimiter"], "\t");
        assert_eq!(json["first_row_as_header"], true);
    }

    #[test]
    fn test_character_helpers() {
        assert_eq!(ColumnDelimiter::Pipe.as_str(), "|");
        assert_eq!(QuoteCharacter::SingleQuote.as_str(), "'");
        assert_eq!(EscapeCharacter::Backslash.as_str(), "\\");
    }
}
