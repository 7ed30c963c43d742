/// Test utilities for building delimited text files
use std::fs;
use std::path::{Path, PathBuf};

/// Builder for creating delimited test files
pub struct CsvBuilder {
    delimiter: String,
    lines: Vec<String>,
}

impl CsvBuilder {
    /// Create a new comma-delimited builder with the given header fields
    pub fn new(header: &[&str]) -> Self {
        Self::with_delimiter(",", header)
    }

    /// Create a new builder with a specific delimiter
    pub fn with_delimiter(delimiter: &str, header: &[&str]) -> Self {
        Self {
            delimiter: delimiter.to_string(),
            lines: vec![header.join(delimiter)],
        }
    }

    /// Add a data row
    pub fn row(mut self, fields: &[&str]) -> Self {
        self.lines.push(fields.join(&self.delimiter));
        self
    }

    /// Add a raw line, written as-is
    pub fn raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Build the file contents, one `\n` after every line
    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Data lines only, without the header
    pub fn data_lines(&self) -> Vec<String> {
        self.lines[1..].to_vec()
    }

    /// Write the file into `dir` and return its path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Read a text file back as lines
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_joins_fields() {
        let csv = CsvBuilder::with_delimiter("\t", &["a", "b"]).row(&["1", "x"]);
        assert_eq!(csv.build(), "a\tb\n1\tx\n");
        assert_eq!(csv.data_lines(), vec!["1\tx"]);
    }
}
