//! Shared string table from xl/sharedStrings.xml.

use crate::error::{Error, Result};

/// Shared strings table.
///
/// Rich-text entries are flattened: the text of every run in an `<si>` is
/// concatenated into a single string.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse shared strings from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_si = false;
        let mut in_text = false;
        let mut current = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_text = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(e)) => {
                    if in_text {
                        current.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(std::mem::take(&mut current));
                        in_si = false;
                    }
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
    <si><t>Name</t></si>
    <si><t>Age</t></si>
    <si><t>Alice</t></si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 3);
        assert_eq!(ss.get(0), Some("Name"));
        assert_eq!(ss.get(2), Some("Alice"));
        assert_eq!(ss.get(3), None);
    }

    #[test]
    fn test_rich_text_runs_concatenate() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <si>
        <r><t>Hello</t></r>
        <r><t>World</t></r>
    </si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 1);
        assert_eq!(ss.get(0), Some("HelloWorld"));
    }

    #[test]
    fn test_empty_table() {
        let ss = SharedStrings::default();
        assert!(ss.is_empty());
        assert_eq!(ss.get(0), None);
    }
}
