//! POM document parser.
//!
//! Uses the quick-xml SAX reader with a stack of element names, so every leaf
//! is handled by matching its full path from `<project>`. Profiles, build
//! configuration, and reporting are never matched and so are ignored.

use pomgraph_core::{ArtifactIdent, Dependency, License, PomGraphError, RawPomFeatures, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeSet;

/// Accumulator for a single `<dependency>` element.
#[derive(Default)]
struct DepAccum {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
    optional: bool,
    exclusions: BTreeSet<String>,
    exclusion_group: Option<String>,
    exclusion_artifact: Option<String>,
}

impl DepAccum {
    fn finish(self) -> Dependency {
        Dependency {
            group_id: self.group_id,
            artifact_id: self.artifact_id,
            version: self.version,
            scope: self.scope,
            exclusions: self.exclusions,
            optional: self.optional,
            resolved: false,
            version_range: false,
        }
        .classified()
    }

    fn finish_exclusion(&mut self) {
        let group = self.exclusion_group.take();
        let artifact = self.exclusion_artifact.take();
        if let (Some(g), Some(a)) = (group, artifact) {
            self.exclusions.insert(format!("{g}:{a}"));
        }
    }
}

#[derive(Default)]
struct Coordinates {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
}

#[derive(Default)]
struct PomCollector {
    features: RawPomFeatures,
    parent: Coordinates,
    relocation: Option<Coordinates>,
    dependency: DepAccum,
    license: License,
}

impl PomCollector {
    fn start(&mut self, path: &[&str]) {
        match path {
            ["project", "dependencies", "dependency"]
            | ["project", "dependencyManagement", "dependencies", "dependency"] => {
                self.dependency = DepAccum::default();
            }
            ["project", "licenses", "license"] => self.license = License::default(),
            ["project", "distributionManagement", "relocation"] => {
                self.relocation = Some(Coordinates::default());
            }
            _ => {}
        }
    }

    fn end(&mut self, path: &[&str], text: Option<String>) {
        match path {
            ["project", "groupId"] => self.features.group_id = text,
            ["project", "artifactId"] => self.features.artifact_id = text,
            ["project", "version"] => self.features.version = text,
            ["project", "name"] => self.features.name = text,
            ["project", "description"] => self.features.description = text,
            ["project", "url"] => self.features.url = text,
            ["project", "packaging"] => self.features.packaging = text,
            ["project", "inceptionYear"] => self.features.inception_year = text,

            ["project", "parent", "groupId"] => self.parent.group_id = text,
            ["project", "parent", "artifactId"] => self.parent.artifact_id = text,
            ["project", "parent", "version"] => self.parent.version = text,

            ["project", "properties", key] => {
                self.features
                    .properties
                    .insert((*key).to_string(), text.unwrap_or_default());
            }

            ["project", "repositories", "repository", "url"] => {
                if let Some(url) = text {
                    self.features.repositories.push(url);
                }
            }

            ["project", "licenses", "license", "name"] => self.license.name = text,
            ["project", "licenses", "license", "url"] => self.license.url = text,
            ["project", "licenses", "license"] => {
                let license = std::mem::take(&mut self.license);
                self.features.licenses.push(license);
            }

            ["project", "distributionManagement", "relocation", field] => {
                if let Some(relocation) = self.relocation.as_mut() {
                    match *field {
                        "groupId" => relocation.group_id = text,
                        "artifactId" => relocation.artifact_id = text,
                        "version" => relocation.version = text,
                        _ => {}
                    }
                }
            }

            ["project", "dependencies", "dependency"] => {
                let dep = std::mem::take(&mut self.dependency).finish();
                self.features.dependencies.push(dep);
            }
            ["project", "dependencyManagement", "dependencies", "dependency"] => {
                let dep = std::mem::take(&mut self.dependency).finish();
                self.features.dependency_management.push(dep);
            }
            ["project", "dependencies", "dependency", rest @ ..]
            | ["project", "dependencyManagement", "dependencies", "dependency", rest @ ..] => {
                self.dependency_field(rest, text);
            }

            _ => {}
        }
    }

    fn dependency_field(&mut self, path: &[&str], text: Option<String>) {
        let dep = &mut self.dependency;
        match path {
            ["groupId"] => dep.group_id = text,
            ["artifactId"] => dep.artifact_id = text,
            ["version"] => dep.version = text,
            ["scope"] => dep.scope = text,
            ["optional"] => {
                dep.optional = text.is_some_and(|t| t.eq_ignore_ascii_case("true"));
            }
            ["exclusions", "exclusion", "groupId"] => dep.exclusion_group = text,
            ["exclusions", "exclusion", "artifactId"] => dep.exclusion_artifact = text,
            ["exclusions", "exclusion"] => dep.finish_exclusion(),
            _ => {}
        }
    }

    fn finish(mut self, ident: &ArtifactIdent) -> RawPomFeatures {
        if let Some(relocation) = self.relocation.take() {
            let target = ArtifactIdent {
                group_id: relocation.group_id.unwrap_or_else(|| ident.group_id.clone()),
                artifact_id: relocation
                    .artifact_id
                    .unwrap_or_else(|| ident.artifact_id.clone()),
                version: relocation.version.unwrap_or_else(|| ident.version.clone()),
                repository: ident.repository.clone(),
            };
            if target != *ident {
                return RawPomFeatures::relocated(target);
            }
            tracing::debug!("{} relocates to itself, ignoring relocation", ident);
        }
        self.into_features()
    }

    fn into_features(self) -> RawPomFeatures {
        let mut features = self.features;
        if let Coordinates {
            group_id: Some(g),
            artifact_id: Some(a),
            version: Some(v),
        } = self.parent
        {
            features.parent = Some(ArtifactIdent::new(g, a, v));
        }
        features
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Parses a POM document fetched for `ident`.
///
/// When the document declares a relocation to another identity, the returned
/// features carry only that relocation; coordinates the relocation omits are
/// copied from `ident`.
pub fn parse_pom(data: &[u8], ident: &ArtifactIdent) -> Result<RawPomFeatures> {
    Ok(read_document(data, &ident.coordinates())?.finish(ident))
}

/// Parses a project's own POM file. Relocations are ignored.
///
/// `source` names the document in errors, typically its path.
pub fn parse_local_pom(data: &[u8], source: &str) -> Result<RawPomFeatures> {
    let mut collector = read_document(data, source)?;
    collector.relocation = None;
    Ok(collector.into_features())
}

fn read_document(data: &[u8], coordinates: &str) -> Result<PomCollector> {
    let content = String::from_utf8_lossy(data);
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));

    let malformed = |message: String| PomGraphError::malformed(coordinates, message);

    let mut collector = PomCollector::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| malformed(e.to_string()))?;

        match event {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if path.is_empty() {
                    if seen_root || tag != "project" {
                        return Err(malformed(format!("unexpected root element <{tag}>")));
                    }
                    seen_root = true;
                }
                path.push(tag);
                text.clear();
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                collector.start(&segments);
            }
            Event::Empty(ref e) => {
                // <tag/> behaves as an element with no text.
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if path.is_empty() {
                    if seen_root || tag != "project" {
                        return Err(malformed(format!("unexpected root element <{tag}>")));
                    }
                    seen_root = true;
                }
                path.push(tag);
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                collector.start(&segments);
                collector.end(&segments, None);
                path.pop();
                text.clear();
            }
            Event::Text(ref e) => text.push_str(&String::from_utf8_lossy(e)),
            Event::CData(ref e) => text.push_str(&String::from_utf8_lossy(e)),
            Event::GeneralRef(ref e) => {
                let name = String::from_utf8_lossy(e);
                match resolve_entity(&name) {
                    Some(c) => text.push(c),
                    None => return Err(malformed(format!("unknown entity &{name};"))),
                }
            }
            Event::End(_) => {
                let value = text.trim();
                let value = (!value.is_empty()).then(|| value.to_string());
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                collector.end(&segments, value);
                path.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(malformed(format!("unclosed element <{}>", path.join("/"))));
    }
    if !seen_root {
        return Err(malformed("missing <project> element".to_string()));
    }

    Ok(collector)
}
