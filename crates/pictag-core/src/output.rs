//! JSON and JSON Lines output for suggestions.
//!
//! In JSON mode a batch is streamed as one array: items are written as they
//! arrive and [`OutputWriter::finish`] closes the array. JSON Lines writes
//! one compact object per line and needs no closing.

use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A single JSON array
    #[default]
    Json,
    /// One JSON object per line
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(Self::JsonLines),
            other => Err(format!("unknown output format {other:?} (expected json or jsonl)")),
        }
    }
}

/// Serializes items to JSON or JSONL as they are produced.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON mode.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator = if self.items_written == 0 { "[" } else { "," };
                if self.pretty {
                    writeln!(self.writer, "{separator}")?;
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    write!(self.writer, "{separator}")?;
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Close the JSON array (an empty batch yields `[]`) and flush.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            match (self.items_written, self.pretty) {
                (0, _) => writeln!(self.writer, "[]")?,
                (_, true) => writeln!(self.writer, "\n]")?,
                (_, false) => writeln!(self.writer, "]")?,
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Item {
        name: String,
        tags: Vec<String>,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                name: "Seashore".to_string(),
                tags: vec!["seashore".to_string(), "beach".to_string()],
            },
            Item {
                name: "Cat and Dog Scene".to_string(),
                tags: vec!["cat".to_string(), "dog".to_string()],
            },
        ]
    }

    fn render(format: OutputFormat, pretty: bool, items: &[Item]) -> String {
        let mut writer = OutputWriter::new(Vec::new(), format, pretty);
        for item in items {
            writer.write(item).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_json_array_parses_back() {
        for pretty in [false, true] {
            let output = render(OutputFormat::Json, pretty, &items());
            let parsed: Vec<Item> = serde_json::from_str(&output).unwrap();
            assert_eq!(parsed, items());
        }
    }

    #[test]
    fn test_empty_json_batch() {
        let output = render(OutputFormat::Json, false, &[]);
        assert_eq!(output.trim(), "[]");
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let output = render(OutputFormat::JsonLines, true, &items());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Item = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.name, "Cat and Dog Scene");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("JSONL".parse::<OutputFormat>(), Ok(OutputFormat::JsonLines));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
