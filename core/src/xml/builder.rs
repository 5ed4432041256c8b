use super::node::{Node, NodeMap, CONTENT_KEY};
use crate::{Error, Result};

/// TreeBuilder turns a flat sequence of element events into a [`Node`] tree.
///
/// It keeps one frame per open element. When an element closes, its frame is
/// collapsed into a node and merged into the parent under the element name;
/// the second occurrence of a name turns the entry into a [`Node::List`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
    root: NodeMap,
    seen: bool,
}

#[derive(Debug, Clone)]
struct Frame {
    name: String,
    map: NodeMap,
    text: Option<String>,
}

impl Frame {
    fn into_node(self) -> Node {
        if self.map.is_empty() {
            return match self.text {
                Some(text) => Node::Text(text),
                None => Node::Map(self.map),
            };
        }

        let mut map = self.map;
        if let Some(text) = self.text.filter(|t| !t.trim().is_empty()) {
            map.insert(CONTENT_KEY, Node::Text(text));
        }
        Node::Map(map)
    }
}

/// Set if absent, append if already a list, otherwise fold into a two item list.
fn merge(map: &mut NodeMap, key: String, value: Node) {
    match map.get_mut(&key) {
        None => {
            map.insert(key, value);
        }
        Some(Node::List(items)) => items.push(value),
        Some(slot) => {
            let existing = std::mem::replace(slot, Node::List(Vec::with_capacity(2)));
            *slot = Node::List(vec![existing, value]);
        }
    }
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a root element has been opened and every element is closed.
    pub fn is_complete(&self) -> bool {
        self.seen && self.stack.is_empty()
    }

    /// Open an element. Attributes are stored right away as string entries.
    pub fn start<I, K, V>(&mut self, name: impl Into<String>, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = NodeMap::new();
        for (k, v) in attributes {
            map.insert(k, Node::Text(v.into()));
        }

        self.seen = true;
        self.stack.push(Frame {
            name: name.into(),
            map,
            text: None,
        });
    }

    /// Append character data to the innermost open element.
    ///
    /// Text outside of any element is dropped.
    pub fn text(&mut self, chunk: &str) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        frame.text.get_or_insert_with(String::new).push_str(chunk);
    }

    /// Close the innermost element, which must be named `name`.
    ///
    /// On a mismatch nothing is changed and `MalformedInput` is returned.
    pub fn end(&mut self, name: &str) -> Result<()> {
        let frame = match self.stack.pop() {
            Some(frame) if frame.name == name => frame,
            Some(frame) => {
                let err = Error::malformed_input(format!(
                    "closing tag </{name}> does not match open element <{}>",
                    frame.name
                ));
                self.stack.push(frame);
                return Err(err);
            }
            None => {
                return Err(Error::malformed_input(format!(
                    "closing tag </{name}> without open element"
                )))
            }
        };

        let name = frame.name.clone();
        let node = frame.into_node();
        match self.stack.last_mut() {
            Some(parent) => merge(&mut parent.map, name, node),
            None => merge(&mut self.root, name, node),
        }
        Ok(())
    }

    /// The tree decoded so far, with open elements closed as they stand.
    pub fn snapshot(&self) -> Node {
        let mut closing: Option<(String, Node)> = None;
        for frame in self.stack.iter().rev() {
            let mut frame = frame.clone();
            if let Some((name, node)) = closing.take() {
                merge(&mut frame.map, name, node);
            }
            closing = Some((frame.name.clone(), frame.into_node()));
        }

        let mut root = self.root.clone();
        if let Some((name, node)) = closing {
            merge(&mut root, name, node);
        }
        Node::Map(root)
    }

    /// Take the finished tree, a map from the root tag to its content.
    ///
    /// Fails without touching the builder if an element is still open or no
    /// element was ever seen.
    pub fn finish(&mut self) -> Result<Node> {
        if let Some(frame) = self.stack.last() {
            return Err(Error::malformed_input(format!(
                "unexpected end of document: <{}> is not closed",
                frame.name
            )));
        }
        if !self.seen {
            return Err(Error::malformed_input("document has no element"));
        }

        Ok(Node::Map(std::mem::take(&mut self.root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NO_ATTRS: [(&str, &str); 0] = [];

    fn to_json(node: &Node) -> serde_json::Value {
        serde_json::to_value(node).expect("must serialize")
    }

    #[test]
    fn test_leaf_text() -> Result<()> {
        let mut b = TreeBuilder::new();
        b.start("foo", NO_ATTRS);
        b.text("bar");
        b.end("foo")?;
        assert!(b.is_complete());

        assert_eq!(to_json(&b.finish()?), json!({"foo": "bar"}));
        Ok(())
    }

    #[test]
    fn test_attributes_with_content() -> Result<()> {
        let mut b = TreeBuilder::new();
        b.start("Creator", [("Role", "Translator")]);
        b.text("Robert ");
        b.text("Hurley");
        b.end("Creator")?;

        assert_eq!(
            to_json(&b.finish()?),
            json!({"Creator": {"Role": "Translator", "__content__": "Robert Hurley"}})
        );
        Ok(())
    }

    #[test]
    fn test_repeated_children_fold_into_list() -> Result<()> {
        let mut b = TreeBuilder::new();
        b.start("a", NO_ATTRS);
        for v in ["1", "2", "3"] {
            b.text("\n  ");
            b.start("b", NO_ATTRS);
            b.text(v);
            b.end("b")?;
        }
        b.start("c", NO_ATTRS);
        b.end("c")?;
        b.text("\n");
        b.end("a")?;

        assert_eq!(
            to_json(&b.finish()?),
            json!({"a": {"b": ["1", "2", "3"], "c": {}}})
        );
        Ok(())
    }

    #[test]
    fn test_mismatched_end_keeps_state() -> Result<()> {
        let mut b = TreeBuilder::new();
        b.start("a", NO_ATTRS);
        b.start("b", NO_ATTRS);

        let err = b.end("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert_eq!(b.depth(), 2);

        b.end("b")?;
        b.end("a")?;
        assert_eq!(to_json(&b.finish()?), json!({"a": {"b": {}}}));
        Ok(())
    }

    #[test]
    fn test_finish_requires_closed_document() {
        let mut b = TreeBuilder::new();
        assert_eq!(
            b.finish().unwrap_err().kind(),
            ErrorKind::MalformedInput
        );

        b.start("a", NO_ATTRS);
        assert_eq!(
            b.finish().unwrap_err().kind(),
            ErrorKind::MalformedInput
        );
        assert_eq!(b.depth(), 1);
    }

    #[test]
    fn test_snapshot_closes_open_elements() -> Result<()> {
        let mut b = TreeBuilder::new();
        b.text("ignored");
        b.start("a", NO_ATTRS);
        b.start("b", NO_ATTRS);
        b.text("1");
        b.end("b")?;
        b.start("b", NO_ATTRS);
        b.text("2");

        assert_eq!(to_json(&b.snapshot()), json!({"a": {"b": ["1", "2"]}}));
        assert_eq!(b.depth(), 2);
        Ok(())
    }
}
