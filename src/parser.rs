//! Streaming JSON5 parsing for blueprint definition files
//!
//! Supports both single-line JSONL and multi-line JSON5 formats.
//! JSON5 adds support for comments, trailing commas, and unquoted keys.
//!
//! The stream is assumed to have been repaired upstream (control
//! characters and embedded line breaks normalized); this parser only
//! deals with object boundaries and shape.

use crate::models::{RecordDescriptor, Warning};
use std::io::Read;
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

/// Result of parsing a definition stream.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub records: Vec<RecordDescriptor>,
    pub warnings: Vec<Warning>,
}

/// Parse a single JSON5 string into a record descriptor.
pub fn parse_line(line: &str, line_number: usize) -> Result<RecordDescriptor, ParseError> {
    json5::from_str(line).map_err(|e| ParseError {
        message: e.to_string(),
        line: line_number,
    })
}

/// Parse a stream of JSON5 objects into record descriptors.
///
/// Supports both formats:
/// - Single-line JSONL (one JSON5 object per line)
/// - Multi-line JSON5 (objects can span multiple lines, separated by whitespace)
///
/// Stream order is preserved: descriptors come back in definition order,
/// which the registry relies on for parent-before-child construction.
///
/// Collects a warning for the first malformed object and stops there;
/// object boundaries can't be reliably recovered after a parse failure.
pub fn parse_stream<R: Read>(reader: R) -> ParseResult {
    use std::io::BufRead;

    let mut result = ParseResult::default();
    let buf_reader = std::io::BufReader::new(reader);
    let mut lines = buf_reader.lines();

    let mut accumulator = String::new();
    let mut start_line = 1;
    let mut current_line = 1;
    let mut brace_depth = 0;
    let mut bracket_depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(Ok(line)) = lines.next() {
        // Skip empty lines when not accumulating
        if accumulator.is_empty() && line.trim().is_empty() {
            current_line += 1;
            continue;
        }

        if !accumulator.is_empty() {
            accumulator.push('\n');
        }
        accumulator.push_str(&line);

        // Track brace/bracket depth to detect complete objects
        for ch in line.chars() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape_next = true,
                '"' if !in_string => in_string = true,
                '"' if in_string => in_string = false,
                '{' if !in_string => brace_depth += 1,
                '}' if !in_string => brace_depth -= 1,
                '[' if !in_string => bracket_depth += 1,
                ']' if !in_string => bracket_depth -= 1,
                _ => {}
            }
        }

        // Try to parse when braces are balanced
        if brace_depth == 0 && bracket_depth == 0 && !accumulator.trim().is_empty() {
            match json5::from_str::<RecordDescriptor>(&accumulator) {
                Ok(record) => result.records.push(record),
                Err(e) => {
                    result.warnings.push(Warning {
                        message: e.to_string(),
                        line: start_line,
                    });
                    // Stop parsing after error - can't reliably find next object boundary
                    return result;
                }
            }

            accumulator.clear();
            start_line = current_line + 1;
            in_string = false;
            escape_next = false;
        }

        current_line += 1;
    }

    // Handle any remaining accumulated content
    if !accumulator.trim().is_empty() {
        match json5::from_str::<RecordDescriptor>(&accumulator) {
            Ok(record) => result.records.push(record),
            Err(e) => {
                result.warnings.push(Warning {
                    message: e.to_string(),
                    line: start_line,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_line_minimal() {
        let line = r#"{"name": "Object"}"#;
        let record = parse_line(line, 1).unwrap();
        assert_eq!(record.name, "Object");
        assert!(record.inherits.is_none());
    }

    #[test]
    fn test_parse_line_with_entries() {
        let line = r#"{"name": "Item", "inherits": "Object", "entries": [{"category": "part", "fields": {"Name": "Physics", "Takeable": "true"}}]}"#;
        let record = parse_line(line, 1).unwrap();
        assert_eq!(record.inherits.as_deref(), Some("Object"));
        assert_eq!(record.entries.len(), 1);
        assert_eq!(record.entries[0].category, "part");
        assert_eq!(
            record.entries[0].fields.get("Name"),
            Some(&"Physics".to_string())
        );
    }

    #[test]
    fn test_parse_line_invalid_json() {
        let result = parse_line("{not valid json}", 5);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().line, 5);
    }

    #[test]
    fn test_parse_line_missing_name() {
        let result = parse_line(r#"{"inherits": "Object"}"#, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_stream_jsonl() {
        let input = concat!(
            r#"{"name": "Object"}"#,
            "\n",
            r#"{"name": "Item", "inherits": "Object"}"#,
            "\n",
        );
        let result = parse_stream(Cursor::new(input));
        assert!(result.warnings.is_empty());
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].name, "Object");
        assert_eq!(result.records[1].name, "Item");
    }

    #[test]
    fn test_parse_stream_multiline_json5() {
        let input = r#"
{
    // the root record
    name: "Object",
}

{
    name: "Item",
    inherits: "Object",
    entries: [
        {category: "part", fields: {Name: "Physics"}},
    ],
}
"#;
        let result = parse_stream(Cursor::new(input));
        assert!(result.warnings.is_empty());
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].entries.len(), 1);
    }

    #[test]
    fn test_parse_stream_preserves_order() {
        let input = concat!(
            r#"{"name": "Object"}"#,
            "\n",
            r#"{"name": "PhysicalObject", "inherits": "Object"}"#,
            "\n",
            r#"{"name": "Item", "inherits": "PhysicalObject"}"#,
            "\n",
        );
        let result = parse_stream(Cursor::new(input));
        let names: Vec<_> = result.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Object", "PhysicalObject", "Item"]);
    }

    #[test]
    fn test_parse_stream_malformed_stops_with_warning() {
        let input = concat!(
            r#"{"name": "Object"}"#,
            "\n",
            r#"{"name": }"#,
            "\n",
            r#"{"name": "Item", "inherits": "Object"}"#,
            "\n",
        );
        let result = parse_stream(Cursor::new(input));
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].line, 2);
    }

    #[test]
    fn test_parse_stream_empty() {
        let result = parse_stream(Cursor::new(""));
        assert!(result.records.is_empty());
        assert!(result.warnings.is_empty());
    }
}
