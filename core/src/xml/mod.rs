//! Decode XML responses into a generic [`Node`] tree.
//!
//! [`Decoder`] accepts the body chunk by chunk and drives a [`TreeBuilder`].
//! Repeated sibling tags fold into lists, attributes become string entries next
//! to the children, and an element carrying both attributes and text keeps its
//! text under [`CONTENT_KEY`].

mod builder;
pub use builder::TreeBuilder;

mod decoder;
pub use decoder::Decoder;

mod node;
pub use node::Node;
pub use node::NodeMap;
pub use node::CONTENT_KEY;

/// Decode a complete document held in memory.
pub fn decode(body: &[u8]) -> crate::Result<Node> {
    let mut decoder = Decoder::new();
    decoder.feed(body)?;
    decoder.finish()
}
