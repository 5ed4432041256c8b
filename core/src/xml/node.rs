use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Key holding an element's own text when it also has attributes or children.
pub const CONTENT_KEY: &str = "__content__";

/// A decoded XML response.
///
/// - An element with only text becomes [`Node::Text`].
/// - An element with attributes or children becomes [`Node::Map`]; attributes
///   are string entries next to the children, and the element's own text sits
///   under [`CONTENT_KEY`].
/// - A tag repeated under the same parent is folded into [`Node::List`] in
///   document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text content of a leaf element, or an attribute value.
    Text(String),
    /// Children and attributes of an element, keyed by name.
    Map(NodeMap),
    /// Repeated sibling elements with the same tag.
    List(Vec<Node>),
}

impl Node {
    /// Returns the text if this is a [`Node::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the map if this is a [`Node::Map`].
    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the items if this is a [`Node::List`].
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a direct child of a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?.get(key)
    }

    /// Collect every value stored under `tag`, anywhere below this node.
    ///
    /// The result is always a list, in document order. A repeated tag
    /// contributes each of its items, so `<a><b>1</b><b>2</b></a>` gives
    /// `["1", "2"]` for `b`. Once a key matches, its value is returned whole
    /// and not searched further. Missing tags give an empty list.
    pub fn find(&self, tag: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Node>) {
        match self {
            Node::Text(_) => {}
            Node::List(items) => items.iter().for_each(|v| v.collect(tag, found)),
            Node::Map(map) => {
                for (key, value) in map.iter() {
                    if key != tag {
                        value.collect(tag, found);
                        continue;
                    }
                    match value {
                        Node::List(items) => found.extend(items.iter()),
                        _ => found.push(value),
                    }
                }
            }
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl From<NodeMap> for Node {
    fn from(value: NodeMap) -> Self {
        Node::Map(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Text(s) => serializer.serialize_str(s),
            Node::Map(m) => m.serialize(serializer),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Entries of a [`Node::Map`], kept in the order their names first appeared.
///
/// Elements rarely have more than a handful of distinct children, so lookups
/// scan the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    entries: Vec<(String, Node)>,
}

impl NodeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the value stored under `key` for update.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key` to `value`, keeping the position of an existing key.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume the map, yielding entries in insertion order.
    pub fn into_entries(self) -> Vec<(String, Node)> {
        self.entries
    }
}

impl FromIterator<(String, Node)> for NodeMap {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        let mut map = NodeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for NodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
