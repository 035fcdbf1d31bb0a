//! Parser for Maven pom.xml files
//!
//! Streams the document with `quick-xml` and assembles each `<dependency>`
//! element from its immediate children. The document does not have to be
//! well-formed: mismatched end tags and bare `&` are accepted, and the scan
//! resumes after any other syntax error, giving up only when the reader
//! stops making progress.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

use super::{Dependency, Parser, Position, PositionedValue};
use crate::utils::LineIndex;

/// Parser for Maven pom.xml dependency files
#[derive(Debug, Default)]
pub struct PomParser;

impl PomParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for PomParser {
    fn parse(&self, content: &str) -> Vec<Dependency> {
        let lines = LineIndex::new(content);
        let mut reader = Reader::from_str(content);
        let config = reader.config_mut();
        config.allow_dangling_amp = true;
        config.check_end_names = false;

        let mut state = ScanState::default();
        let mut dependencies = Vec::new();
        let mut last_error_at = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let after_tag = lines.position(reader.buffer_position() as usize);
                    state.open(name, after_tag);
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let after_tag = lines.position(reader.buffer_position() as usize);
                    state.open(name.clone(), after_tag);
                    dependencies.extend(state.close(&name));
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    dependencies.extend(state.close(&name));
                }
                Ok(Event::Text(e)) => state.text(&String::from_utf8_lossy(&e)),
                Ok(Event::CData(e)) => state.text(&String::from_utf8_lossy(&e)),
                Ok(Event::GeneralRef(e)) => {
                    if let Some(resolved) = resolve_predefined_entity(&String::from_utf8_lossy(&e))
                    {
                        state.text(resolved);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    let resume_at = reader.buffer_position();
                    tracing::debug!(
                        "Skipping malformed pom.xml content at byte {}: {}",
                        reader.error_position(),
                        e
                    );
                    if last_error_at == Some(resume_at) {
                        break;
                    }
                    last_error_at = Some(resume_at);
                }
                _ => {}
            }
        }

        dependencies
    }
}

/// Immediate child elements of a `<dependency>`, by name
#[derive(Debug, Default)]
struct DependencyNode {
    children: HashMap<String, String>,
}

impl DependencyNode {
    /// Build an entry if the node is complete and not test-scoped.
    ///
    /// A blank `groupId` or `artifactId` counts as missing; a blank version
    /// is kept.
    fn into_dependency(mut self, version_position: Position) -> Option<Dependency> {
        if self.children.get("scope").is_some_and(|s| s.trim() == "test") {
            return None;
        }
        let group_id = self.coordinate("groupId")?;
        let artifact_id = self.coordinate("artifactId")?;
        let version = self.children.remove("version")?;

        let name = format!("{group_id}:{artifact_id}");
        Some(Dependency::new(
            // Name positions are not tracked for pom.xml
            PositionedValue::new(name, Position::UNTRACKED),
            PositionedValue::new(version.trim(), version_position),
        ))
    }

    fn coordinate(&mut self, name: &str) -> Option<String> {
        let value = self.children.remove(name)?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Mutable scan state threaded through the tokenizer events
#[derive(Debug, Default)]
struct ScanState {
    in_dependency: bool,
    /// Where the text of the last `<version>` inside a dependency starts
    pending_version: Position,
    node: Option<DependencyNode>,
    /// Element depth of the `<dependency>` being assembled
    node_depth: usize,
    depth: usize,
    current_child: Option<String>,
}

impl ScanState {
    fn open(&mut self, name: String, after_tag: Position) {
        self.depth += 1;

        if name == "dependency" {
            // A nested <dependency> simply starts over
            self.in_dependency = true;
            self.node = Some(DependencyNode::default());
            self.node_depth = self.depth;
            self.current_child = None;
            return;
        }

        if self.in_dependency && name == "version" {
            self.pending_version = after_tag;
        }

        if let Some(node) = self.node.as_mut()
            && self.depth == self.node_depth + 1
        {
            node.children.insert(name.clone(), String::new());
            self.current_child = Some(name);
        }
    }

    fn text(&mut self, text: &str) {
        if self.depth != self.node_depth + 1 {
            return;
        }
        if let (Some(node), Some(child)) = (self.node.as_mut(), self.current_child.as_ref())
            && let Some(value) = node.children.get_mut(child)
        {
            value.push_str(text);
        }
    }

    fn close(&mut self, name: &str) -> Option<Dependency> {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        if name != "dependency" {
            if self.node.is_some() && depth == self.node_depth + 1 {
                self.current_child = None;
            }
            return None;
        }

        self.in_dependency = false;
        self.current_child = None;
        self.node.take()?.into_dependency(self.pending_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<project>
  <dependencies>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>2.0.9</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#;

    #[test]
    fn test_simple_dependencies() {
        let parser = PomParser::new();
        let deps = parser.parse(POM);

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "org.slf4j:slf4j-api");
        assert_eq!(deps[0].version.value, "2.0.9");
    }

    #[test]
    fn test_version_position_points_at_text() {
        let parser = PomParser::new();
        let deps = parser.parse(POM);

        assert_eq!(deps[0].version.position, Position::new(6, 16));
        assert_eq!(deps[0].name.position, Position::UNTRACKED);
    }

    #[test]
    fn test_scope_filtering() {
        let content = r#"<dependencies>
  <dependency><groupId>a</groupId><artifactId>test-scoped</artifactId><version>1</version><scope>test</scope></dependency>
  <dependency><groupId>a</groupId><artifactId>unscoped</artifactId><version>1</version></dependency>
  <dependency><groupId>a</groupId><artifactId>compile-scoped</artifactId><version>1</version><scope>compile</scope></dependency>
</dependencies>"#;
        let deps = PomParser::new().parse(content);
        let names: Vec<_> = deps.iter().map(|d| d.name.value.as_str()).collect();
        assert_eq!(names, vec!["a:unscoped", "a:compile-scoped"]);
    }

    #[test]
    fn test_missing_coordinates_are_skipped() {
        let content = r#"<dependencies>
  <dependency>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-web</artifactId>
  </dependency>
  <dependency>
    <artifactId>no-group</artifactId>
    <version>1.0</version>
  </dependency>
</dependencies>"#;
        assert!(PomParser::new().parse(content).is_empty());
    }

    #[test]
    fn test_malformed_trailing_xml_keeps_earlier_entries() {
        let content = r#"<project>
  <dependencies>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <version>32.1.3-jre</version>
    </dependency>
    <dependency>
      <groupId>broken
  </dependencies>
</project>
"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "com.google.guava:guava");
    }

    #[test]
    fn test_malformed_content_before_dependencies_is_skipped() {
        let content = r#"<project>
  <name>A & B</name>
  <description>x</descriptio>
  <dependencies>
    <dependency>
      <groupId>g</groupId>
      <artifactId>a</artifactId>
      <version>1</version>
    </dependency>
  </dependencies>
</project>"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "g:a");
        assert_eq!(deps[0].version.position, Position::new(8, 16));
    }

    #[test]
    fn test_unclosed_tag_at_end_terminates() {
        let content = r#"<project>
  <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1</version></dependency>
  <dependency><groupId>h</groupId><artifactId>b</artifactId><version>2</version"#;
        let deps = PomParser::new().parse(content);
        let names: Vec<_> = deps.iter().map(|d| d.name.value.as_str()).collect();
        assert_eq!(names, vec!["g:a"]);
    }

    #[test]
    fn test_blank_coordinates_are_skipped() {
        let content = r#"<dependencies>
  <dependency><groupId/><artifactId/><version>1</version></dependency>
  <dependency><groupId>  </groupId><artifactId>a</artifactId><version>1</version></dependency>
  <dependency><groupId>g</groupId><artifactId>a</artifactId><version/></dependency>
</dependencies>"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "g:a");
        assert_eq!(deps[0].version.value, "");
    }

    #[test]
    fn test_nested_version_moves_reported_position() {
        // Known quirk: any <version> inside the dependency moves the position,
        // while the value still comes from the direct child
        let content = r#"<dependency>
  <groupId>org.apache.httpcomponents</groupId>
  <artifactId>httpclient</artifactId>
  <version>4.5.14</version>
  <exclusions>
    <exclusion>
      <version>9.9</version>
    </exclusion>
  </exclusions>
</dependency>"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].version.value, "4.5.14");
        assert_eq!(deps[0].version.position, Position::new(7, 16));
    }

    #[test]
    fn test_not_xml_at_all() {
        let deps = PomParser::new().parse("this is not xml </oops>");
        assert!(deps.is_empty());
    }

    #[test]
    fn test_grandchildren_are_not_coordinates() {
        let content = r#"<dependencies>
  <dependency>
    <groupId>org.apache.httpcomponents</groupId>
    <artifactId>httpclient</artifactId>
    <version>4.5.14</version>
    <exclusions>
      <exclusion>
        <groupId>commons-logging</groupId>
        <artifactId>commons-logging</artifactId>
      </exclusion>
    </exclusions>
  </dependency>
</dependencies>"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "org.apache.httpcomponents:httpclient");
    }

    #[test]
    fn test_whitespace_around_values_is_trimmed() {
        let content = "<dependency>\n<groupId>\n  g\n</groupId><artifactId> a </artifactId><version>\n1.0\n</version></dependency>";
        let deps = PomParser::new().parse(content);
        assert_eq!(deps[0].name.value, "g:a");
        assert_eq!(deps[0].version.value, "1.0");
    }

    #[test]
    fn test_nested_dependency_is_last_write_wins() {
        // Nesting is not supported: the inner element replaces the outer one
        let content = r#"<dependency>
  <groupId>outer</groupId>
  <dependency>
    <groupId>inner</groupId>
    <artifactId>inner</artifactId>
    <version>2</version>
  </dependency>
  <artifactId>outer</artifactId>
  <version>1</version>
</dependency>"#;
        let deps = PomParser::new().parse(content);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "inner:inner");
    }

    #[test]
    fn test_predefined_entities_are_resolved() {
        let content = "<dependency><groupId>a&amp;b</groupId><artifactId>c</artifactId><version>1</version></dependency>";
        let deps = PomParser::new().parse(content);
        assert_eq!(deps[0].name.value, "a&b:c");
    }

    #[test]
    fn test_empty_document() {
        assert!(PomParser::new().parse("").is_empty());
    }
}
