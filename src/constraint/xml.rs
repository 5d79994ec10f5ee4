//! Minimal XML element tree over quick-xml events
//!
//! MSBuild-style files are small, so the whole document is materialized into
//! a tree that supports the attribute-or-child-element lookups the ceiling
//! scan needs. Namespace prefixes are stripped (local names only).

use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local element name (namespace prefix stripped)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<Element>,
    /// Concatenated direct text content
    pub text: String,
}

impl Element {
    /// Parse a document into a synthetic root whose children are the
    /// top-level elements
    pub fn parse(content: &str) -> Result<Element, String> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<Element> = vec![Element::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let element = element_from_start(&start)?;
                    stack.push(element);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start)?;
                    stack
                        .last_mut()
                        .ok_or_else(|| "unbalanced document".to_string())?
                        .children
                        .push(element);
                }
                Ok(Event::End(_)) => {
                    let finished = stack.pop().ok_or_else(|| "unbalanced end tag".to_string())?;
                    stack
                        .last_mut()
                        .ok_or_else(|| "unbalanced end tag".to_string())?
                        .children
                        .push(finished);
                }
                Ok(Event::Text(text)) => {
                    // Entity escapes do not occur in package names or version
                    // numbers, so raw text content is sufficient here.
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(text.as_ref()));
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(data.as_ref()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(e.to_string()),
            }
        }

        if stack.len() != 1 {
            return Err("unclosed element at end of document".to_string());
        }
        Ok(stack.remove(0))
    }

    /// All elements in the subtree with the given name, depth first
    pub fn descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name.eq_ignore_ascii_case(name) {
                out.push(child);
            }
            child.descendants(name, out);
        }
    }

    /// Direct children with the given name, case-insensitive
    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Element> {
        let name = name.to_string();
        self.children
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(&name))
    }

    /// Attribute value by case-insensitive name, trimmed; empty treated as absent
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Attribute value, falling back to a child element's text content
    ///
    /// Both forms appear in the wild: `<PackageVersion Include=".."/>` and
    /// `<PackageVersion><Include>..</Include></PackageVersion>`.
    pub fn attribute_or_child(&self, name: &str) -> Option<String> {
        self.attribute(name).or_else(|| {
            self.children_named(name)
                .map(|child| child.text.trim().to_string())
                .find(|value| !value.is_empty())
        })
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.to_string();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <Project>
          <ItemGroup>
            <PackageVersion Include="Sentry" MaxVersion="4.0.0" />
            <PackageVersion Update="Serilog">
              <MaxVersion>3.0.0</MaxVersion>
            </PackageVersion>
          </ItemGroup>
        </Project>
    "#;

    #[test]
    fn test_parse_and_descendants() {
        let root = Element::parse(SAMPLE).unwrap();
        let mut groups = Vec::new();
        root.descendants("ItemGroup", &mut groups);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].children_named("PackageVersion").count(), 2);
    }

    #[test]
    fn test_attribute_case_insensitive() {
        let root = Element::parse(r#"<A include="X"/>"#).unwrap();
        let a = &root.children[0];
        assert_eq!(a.attribute("Include").as_deref(), Some("X"));
    }

    #[test]
    fn test_attribute_or_child_fallback() {
        let root = Element::parse(SAMPLE).unwrap();
        let mut groups = Vec::new();
        root.descendants("ItemGroup", &mut groups);
        let nodes: Vec<_> = groups[0].children_named("PackageVersion").collect();
        assert_eq!(nodes[0].attribute_or_child("MaxVersion").as_deref(), Some("4.0.0"));
        assert_eq!(nodes[1].attribute_or_child("MaxVersion").as_deref(), Some("3.0.0"));
        assert_eq!(nodes[1].attribute_or_child("Update").as_deref(), Some("Serilog"));
    }

    #[test]
    fn test_empty_attribute_treated_as_absent() {
        let root = Element::parse(r#"<A Include="  "/>"#).unwrap();
        assert!(root.children[0].attribute("Include").is_none());
    }

    #[test]
    fn test_namespace_prefix_stripped() {
        let root = Element::parse(r#"<msb:Project xmlns:msb="urn:x"><msb:ItemGroup/></msb:Project>"#)
            .unwrap();
        assert_eq!(root.children[0].name, "Project");
        assert_eq!(root.children[0].children[0].name, "ItemGroup");
    }

    #[test]
    fn test_malformed_document_errors() {
        assert!(Element::parse("<A><B></A>").is_err());
    }
}
