//! Element tree built from `quick-xml` events

use dezmap_core::error::{MappingError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// An element with its text content and child elements
///
/// Attributes are not kept: the grammar carries every value as element text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Tag name
    pub name: String,
    /// Concatenated text and CDATA content
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// First child with the given tag
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children with the given tag
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Descendant reached by following a path of tags (first match at each step)
    #[must_use]
    pub fn descend(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Elements reached by a path whose last step may repeat
    ///
    /// `node.all(&["ATTRIBUTES", "ATTR"])` yields every `ATTR` under the first
    /// `ATTRIBUTES` child.
    pub fn all<'a>(&'a self, path: &[&str]) -> impl Iterator<Item = &'a XmlNode> + use<'a> {
        let (last, parents) = match path.split_last() {
            Some((last, parents)) => (Some(*last), parents),
            None => (None, path),
        };
        let parent = self.descend(parents);
        let name = last.map(str::to_string);
        parent
            .into_iter()
            .flat_map(|p| p.children.iter())
            .filter(move |c| name.as_deref() == Some(c.name.as_str()))
    }

    /// Non-empty text of the element at `path`
    #[must_use]
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.descend(path)
            .map(|n| n.text.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Parse a document into its root element
///
/// # Errors
///
/// Returns `MappingError::Parse` for malformed XML, mismatched or unclosed tags
/// and documents without a root element.
pub fn parse_tree(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // The bottom of the stack is a synthetic document node collecting the root.
    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(XmlNode::from_start(&e)),
            Ok(Event::Empty(e)) => {
                let node = XmlNode::from_start(&e);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| MappingError::parse("unexpected closing tag"))?;
                let parent = stack.last_mut().ok_or_else(|| {
                    MappingError::parse_at("unexpected closing tag", node.name.clone())
                })?;
                parent.children.push(node);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    MappingError::parse_at(
                        format!("invalid text content: {err}"),
                        element_path(&stack),
                    )
                })?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let data = e.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MappingError::parse_at(
                    format!("malformed XML at byte {}: {e}", reader.buffer_position()),
                    element_path(&stack),
                ));
            }
            _ => {}
        }
    }

    if stack.len() > 1 {
        return Err(MappingError::parse_at(
            "document ends inside an open element",
            element_path(&stack),
        ));
    }

    let mut document = stack
        .pop()
        .ok_or_else(|| MappingError::parse("empty document"))?;
    match document.children.len() {
        0 => Err(MappingError::parse("document has no root element")),
        1 => Ok(document.children.remove(0)),
        n => Err(MappingError::parse(format!(
            "document has {n} root elements"
        ))),
    }
}

fn element_path(stack: &[XmlNode]) -> String {
    stack
        .iter()
        .skip(1)
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tree_structure() {
        let root = parse_tree(
            "<?xml version=\"1.0\"?><A><B>one</B><B>two &amp; three</B><C/><D><![CDATA[x<y]]></D></A>",
        )
        .unwrap();

        assert_eq!(root.name, "A");
        let texts: Vec<&str> = root.children_named("B").map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two & three"]);
        assert!(root.child("C").is_some());
        assert_eq!(root.text_at(&["D"]), Some("x<y"));
        assert_eq!(root.text_at(&["C"]), None);
    }

    #[test]
    fn test_all_follows_path() {
        let root = parse_tree("<R><L><I>1</I><I>2</I><J/></L></R>").unwrap();
        assert_eq!(root.all(&["L", "I"]).count(), 2);
        assert_eq!(root.all(&["M", "I"]).count(), 0);
    }

    #[test]
    fn test_malformed_documents() {
        let err = parse_tree("<A><B></A>").unwrap_err();
        assert!(matches!(err, MappingError::Parse { .. }));

        let err = parse_tree("<A><B>").unwrap_err();
        match err {
            MappingError::Parse { location, .. } => assert_eq!(location.as_deref(), Some("A/B")),
            other => panic!("unexpected error {other:?}"),
        }

        assert!(parse_tree("").is_err());
    }
}
