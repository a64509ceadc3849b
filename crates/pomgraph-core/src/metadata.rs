//! `maven-metadata.xml` release list parsing.

use crate::error::{PomGraphError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Reads `metadata/versioning/versions/version` entries in document order.
///
/// A document without a `<versioning>` section has no releases.
pub fn parse_release_list(data: &[u8], coordinates: &str) -> Result<Vec<String>> {
    let content = String::from_utf8_lossy(data);
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut versions = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| PomGraphError::malformed(coordinates, e))?
        {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(e) => {
                if path_is(&path, &["metadata", "versioning", "versions", "version"]) {
                    let version = String::from_utf8_lossy(&e).trim().to_string();
                    if !version.is_empty() {
                        versions.push(version);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(versions)
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_list() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <latest>2.1</latest>
    <release>2.1</release>
    <versions>
      <version>1.0</version>
      <version>1.5</version>
      <version>2.0</version>
      <version>2.1</version>
    </versions>
    <lastUpdated>20240101000000</lastUpdated>
  </versioning>
</metadata>"#;

        let versions = parse_release_list(xml.as_bytes(), "org.example:lib").unwrap();
        assert_eq!(versions, vec!["1.0", "1.5", "2.0", "2.1"]);
    }

    #[test]
    fn test_missing_versioning() {
        let xml = "<metadata><groupId>g</groupId><artifactId>a</artifactId></metadata>";
        let versions = parse_release_list(xml.as_bytes(), "g:a").unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_ignores_plugin_versions() {
        let xml = r"<metadata>
  <plugins><plugin><version>9.9</version></plugin></plugins>
  <versioning><versions><version>1.0</version></versions></versioning>
</metadata>";
        let versions = parse_release_list(xml.as_bytes(), "g:a").unwrap();
        assert_eq!(versions, vec!["1.0"]);
    }

    #[test]
    fn test_malformed_metadata() {
        let xml = "<metadata><versioning></metadata>";
        let err = parse_release_list(xml.as_bytes(), "g:a").unwrap_err();
        assert!(matches!(err, PomGraphError::MalformedDocument { .. }));
    }
}
