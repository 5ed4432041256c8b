use super::builder::TreeBuilder;
use super::node::Node;
use crate::{Error, Result};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";

/// Decoder builds a [`Node`] tree from an XML document delivered in chunks.
///
/// Chunks may split the document anywhere, including inside a tag or a
/// multibyte character: input is held back until a markup construct is
/// complete, so the resulting tree does not depend on how the bytes were cut.
///
/// A decoder serves exactly one document.
///
/// ```
/// use sigv2_core::xml::Decoder;
///
/// let mut decoder = Decoder::new();
/// decoder.feed(b"<foo><bar>1</bar><ba")?;
/// decoder.feed(b"r>2</bar></foo>")?;
///
/// let root = decoder.finish()?;
/// let bars: Vec<_> = root.find("bar").into_iter().filter_map(|v| v.as_str()).collect();
/// assert_eq!(bars, vec!["1", "2"]);
/// # Ok::<(), sigv2_core::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Decoder {
    builder: TreeBuilder,
    pending: Vec<u8>,
    started: bool,
    root: Option<Node>,
}

impl Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the next chunk of the document.
    ///
    /// Returns `MalformedInput` if a construct completed by this chunk can't be
    /// parsed or doesn't nest. Only that construct is dropped: the rest of the
    /// chunk is still decoded, and the state can be inspected with
    /// [`Decoder::partial`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.root.is_some() {
            return Err(Error::unexpected(
                "xml document is already complete, no more input accepted",
            ));
        }

        let mut chunk = chunk;
        if !self.started && !chunk.is_empty() {
            self.started = true;
            chunk = chunk
                .strip_prefix(b"\r\n")
                .or_else(|| chunk.strip_prefix(b"\n"))
                .unwrap_or(chunk);
        }
        self.pending.extend_from_slice(chunk);

        let mut first_err = None;
        while let Some(len) = next_unit(&self.pending) {
            let unit: Vec<u8> = self.pending.drain(..len).collect();
            if let Err(err) = self.apply(&unit) {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Push a chunk together with the transfer progress.
    ///
    /// `remaining` is the number of bytes still to come after this chunk and
    /// `total` the full body length. Once `remaining` reaches zero the document
    /// is completed and available from [`Decoder::root`].
    pub fn on_chunk(&mut self, chunk: &[u8], remaining: u64, total: u64) -> Result<()> {
        self.feed(chunk)?;
        if remaining == 0 {
            self.complete()?;
            debug!("xml document of {total} bytes decoded");
        }
        Ok(())
    }

    /// Complete the document and return its tree.
    pub fn finish(mut self) -> Result<Node> {
        if self.root.is_none() {
            self.complete()?;
        }
        self.root
            .ok_or_else(|| Error::unexpected("xml document completed without a root"))
    }

    /// Whether the document has been completed.
    pub fn is_finished(&self) -> bool {
        self.root.is_some()
    }

    /// The completed tree, `None` until the document is complete.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Consume the decoder and return the completed tree, if any.
    pub fn into_root(self) -> Option<Node> {
        self.root
    }

    /// Everything decoded so far, with open elements closed as they stand.
    pub fn partial(&self) -> Node {
        match &self.root {
            Some(root) => root.clone(),
            None => self.builder.snapshot(),
        }
    }

    /// Find all values stored under `tag` in the completed tree.
    ///
    /// See [`Node::find`]. Before completion this is always empty.
    pub fn find(&self, tag: &str) -> Vec<&Node> {
        match &self.root {
            Some(root) => root.find(tag),
            None => Vec::new(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            if self.pending.contains(&b'<') {
                return Err(Error::malformed_input(
                    "unexpected end of document inside markup",
                ));
            }
            let rest = std::mem::take(&mut self.pending);
            self.apply(&rest)?;
        }

        self.root = Some(self.builder.finish()?);
        Ok(())
    }

    /// Apply a single text run or markup construct.
    fn apply(&mut self, unit: &[u8]) -> Result<()> {
        let tokens = tokenize(unit).inspect_err(|err| {
            debug!("drop malformed xml of {} bytes: {err}", unit.len())
        })?;

        for token in tokens {
            match token {
                Token::Start(name, attributes) => self.builder.start(name, attributes),
                Token::Text(text) => self.builder.text(&text),
                Token::End(name) => self.builder.end(&name)?,
            }
        }
        Ok(())
    }
}

enum Token {
    Start(String, Vec<(String, String)>),
    Text(String),
    End(String),
}

fn malformed(err: impl Into<anyhow::Error>) -> Error {
    Error::malformed_input("xml is not well-formed").with_source(err)
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(malformed)
}

/// Parse a complete text run or markup construct into owned tokens.
fn tokenize(unit: &[u8]) -> Result<Vec<Token>> {
    let mut reader = Reader::from_reader(unit);
    let config = reader.config_mut();
    config.expand_empty_elements = true;
    // Units start anywhere in the document, the tree builder checks nesting.
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tokens = Vec::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                let name = decode_utf8(e.name().as_ref())?;
                let mut attributes = Vec::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(malformed)?;
                    let value = attr.unescape_value().map_err(malformed)?;
                    attributes.push((decode_utf8(attr.key.as_ref())?, value.into_owned()));
                }
                tokens.push(Token::Start(name, attributes));
            }
            Event::End(e) => tokens.push(Token::End(decode_utf8(e.name().as_ref())?)),
            Event::Text(e) => {
                let text = e.unescape().map_err(malformed)?;
                tokens.push(Token::Text(text.into_owned()));
            }
            Event::CData(e) => tokens.push(Token::Text(decode_utf8(&e)?)),
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry nothing for the tree.
            _ => {}
        }
    }
    Ok(tokens)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the construct at the start of `buf`: a run of text up to the
/// next `<`, or one markup construct. `None` if it is not complete yet.
fn next_unit(buf: &[u8]) -> Option<usize> {
    match buf.iter().position(|&b| b == b'<')? {
        0 => markup_len(buf),
        text => Some(text),
    }
}

/// Length of the markup construct at the start of `m`, which begins with `<`,
/// or `None` if it is not complete yet.
fn markup_len(m: &[u8]) -> Option<usize> {
    if m.starts_with(COMMENT_OPEN) {
        let body = &m[COMMENT_OPEN.len()..];
        return find_subslice(body, COMMENT_CLOSE)
            .map(|i| COMMENT_OPEN.len() + i + COMMENT_CLOSE.len());
    }
    if m.starts_with(CDATA_OPEN) {
        let body = &m[CDATA_OPEN.len()..];
        return find_subslice(body, CDATA_CLOSE).map(|i| CDATA_OPEN.len() + i + CDATA_CLOSE.len());
    }
    // Too short to tell a comment or CDATA section from a doctype yet.
    if COMMENT_OPEN.starts_with(m) || CDATA_OPEN.starts_with(m) {
        return None;
    }
    if m.starts_with(b"<?") {
        return find_subslice(&m[2..], b"?>").map(|i| 2 + i + 2);
    }

    let bang = m.starts_with(b"<!");
    let mut quote = None;
    let mut depth = 0usize;
    for (i, &b) in m.iter().enumerate().skip(1) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' if bang => depth += 1,
            b']' if bang => depth = depth.saturating_sub(1),
            b'>' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}
