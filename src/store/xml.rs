//! Minimal element tree used to read and write channel documents
//!
//! Channel documents are element-per-field: every value lives in the text of
//! a child element and lookups go by tag name, first match wins. [`Element`]
//! keeps its content as ordered [`Node`]s, so text is stored exactly as
//! written (surrounding whitespace included), mixed content keeps its order,
//! and comments and unknown fields survive a load/save cycle.

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};

/// One piece of element content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  Text(String),
  CData(String),
  Comment(String),
}

impl Node {
  /// Text consisting of nothing but whitespace (indentation between siblings)
  pub fn is_padding(&self) -> bool {
    matches!(self, Node::Text(text) if text.trim().is_empty())
  }
}

/// One XML element: attributes and ordered content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  pub name: String,
  pub attributes: Vec<(String, String)>,
  pub content: Vec<Node>,
}

impl Element {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      attributes: Vec::new(),
      content: Vec::new(),
    }
  }

  /// Element holding only a text value
  pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
    let mut element = Self::new(name);
    element.set_text(text);
    element
  }

  /// Empty copy: same name and attributes, no content
  pub fn shell(&self) -> Self {
    Self {
      name: self.name.clone(),
      attributes: self.attributes.clone(),
      content: Vec::new(),
    }
  }

  /// Child elements in document order
  pub fn elements(&self) -> impl Iterator<Item = &Element> {
    self.content.iter().filter_map(|node| match node {
      Node::Element(element) => Some(element),
      _ => None,
    })
  }

  /// First child with the given tag
  pub fn child(&self, name: &str) -> Option<&Element> {
    self.elements().find(|c| c.name == name)
  }

  /// First child with the given tag, mutably
  pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
    self.content.iter_mut().find_map(|node| match node {
      Node::Element(element) if element.name == name => Some(element),
      _ => None,
    })
  }

  pub fn has_elements(&self) -> bool {
    self.elements().next().is_some()
  }

  /// Direct text and CDATA content, concatenated as written
  pub fn text(&self) -> String {
    self
      .content
      .iter()
      .filter_map(|node| match node {
        Node::Text(text) | Node::CData(text) => Some(text.as_str()),
        _ => None,
      })
      .collect()
  }

  /// Replace the whole content with a single text value
  pub fn set_text(&mut self, text: impl Into<String>) {
    let text = text.into();
    self.content.clear();
    if !text.is_empty() {
      self.content.push(Node::Text(text));
    }
  }

  /// Append a child element
  pub fn push(&mut self, child: Element) {
    self.content.push(Node::Element(child));
  }

  /// Append text, joining it to directly preceding text
  fn push_text(&mut self, text: &str) {
    match self.content.last_mut() {
      Some(Node::Text(last)) => last.push_str(text),
      _ => self.content.push(Node::Text(text.to_string())),
    }
  }

  /// Text of the first child with the given tag
  pub fn field(&self, name: &str) -> Option<String> {
    self.child(name).map(Element::text)
  }

  /// Text of the first child with the given tag, or `default`
  pub fn field_or(&self, name: &str, default: &str) -> String {
    self.field(name).unwrap_or_else(|| default.to_string())
  }

  /// Create the field if absent. An existing field keeps its value.
  pub fn set_field(&mut self, name: &str, value: &str) {
    if self.child(name).is_none() {
      self.push(Element::with_text(name, value));
    }
  }

  /// Overwrite the first field with the given tag, creating it if absent
  pub fn put_field(&mut self, name: &str, value: &str) {
    match self.child_mut(name) {
      Some(child) => child.set_text(value),
      None => self.push(Element::with_text(name, value)),
    }
  }

  fn write_to(&self, out: &mut String) {
    out.push('<');
    out.push_str(&self.name);
    for (key, value) in &self.attributes {
      out.push(' ');
      out.push_str(key);
      out.push_str("=\"");
      out.push_str(&escape(value.as_str()));
      out.push('"');
    }
    if self.content.is_empty() {
      out.push_str("/>");
      return;
    }
    out.push('>');
    for node in &self.content {
      match node {
        Node::Element(child) => child.write_to(out),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(data) => {
          out.push_str("<![CDATA[");
          out.push_str(data);
          out.push_str("]]>");
        }
        Node::Comment(comment) => {
          out.push_str("<!--");
          out.push_str(comment);
          out.push_str("-->");
        }
      }
    }
    out.push_str("</");
    out.push_str(&self.name);
    out.push('>');
  }
}

/// Content of a root element that holds typed records, minus the records
///
/// Remembers where each record sat among the other nodes (comments, foreign
/// elements) so a rewrite puts everything back in place. Padding between
/// siblings is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLayout {
  shell: Element,
  slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
  Record,
  Other(Node),
}

impl RootLayout {
  /// Layout of a fresh document
  pub fn new(root: &str) -> Self {
    Self {
      shell: Element::new(root),
      slots: Vec::new(),
    }
  }

  /// Split `root` into its layout and its `record` children, in order
  pub fn split<'a>(root: &'a Element, record: &str) -> (Self, Vec<&'a Element>) {
    let mut slots = Vec::new();
    let mut records = Vec::new();
    for node in &root.content {
      match node {
        Node::Element(element) if element.name == record => {
          slots.push(Slot::Record);
          records.push(element);
        }
        node if node.is_padding() => {}
        node => slots.push(Slot::Other(node.clone())),
      }
    }
    let layout = Self {
      shell: root.shell(),
      slots,
    };
    (layout, records)
  }

  /// Rebuild the root element. Records beyond the remembered slots go last.
  pub fn render(&self, records: impl IntoIterator<Item = Element>) -> Element {
    let mut root = self.shell.clone();
    let mut records = records.into_iter();
    for slot in &self.slots {
      match slot {
        Slot::Record => {
          if let Some(record) = records.next() {
            root.push(record);
          }
        }
        Slot::Other(node) => root.content.push(node.clone()),
      }
    }
    for record in records {
      root.push(record);
    }
    root
  }
}

/// A parsed document: the declaration's encoding (if any) and the root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  pub encoding: Option<String>,
  pub root: Element,
}

impl Document {
  /// Parse a document. The error string describes the first syntax problem.
  ///
  /// Text is kept verbatim. Only whitespace outside the root element and
  /// comments outside it are discarded.
  pub fn parse(source: &str) -> Result<Self, String> {
    let mut reader = Reader::from_str(source);

    let mut encoding = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
      let event = reader
        .read_event()
        .map_err(|e| format!("{} at byte {}", e, reader.error_position()))?;
      match event {
        Event::Decl(decl) => {
          if let Some(enc) = decl.encoding() {
            let enc = enc.map_err(|e| e.to_string())?;
            encoding = Some(String::from_utf8_lossy(&enc).into_owned());
          }
        }
        Event::Start(start) => {
          if root.is_some() {
            return Err("content after the root element".to_string());
          }
          stack.push(open_element(&start)?);
        }
        Event::Empty(start) => {
          if root.is_some() {
            return Err("content after the root element".to_string());
          }
          let element = open_element(&start)?;
          attach(&mut stack, &mut root, element);
        }
        Event::End(_) => {
          let element = stack.pop().ok_or_else(|| "unexpected closing tag".to_string())?;
          attach(&mut stack, &mut root, element);
        }
        Event::Text(text) => {
          let value = text.unescape().map_err(|e| e.to_string())?;
          match stack.last_mut() {
            Some(current) => current.push_text(&value),
            None if value.trim().is_empty() => {}
            None => return Err(format!("text outside the root element: {:?}", value.trim())),
          }
        }
        Event::CData(data) => {
          let value = String::from_utf8(data.into_inner().into_owned()).map_err(|e| e.to_string())?;
          if let Some(current) = stack.last_mut() {
            current.content.push(Node::CData(value));
          }
        }
        Event::Comment(comment) => {
          let value = String::from_utf8(comment.into_inner().into_owned()).map_err(|e| e.to_string())?;
          if let Some(current) = stack.last_mut() {
            current.content.push(Node::Comment(value));
          }
        }
        Event::Eof => break,
        // Processing instructions and doctypes carry no channel data
        _ => {}
      }
    }

    if let Some(open) = stack.last() {
      return Err(format!("unclosed element <{}>", open.name));
    }
    let root = root.ok_or_else(|| "document has no root element".to_string())?;
    Ok(Self { encoding, root })
  }

  /// Render the document back to its on-disk form
  pub fn serialize(&self) -> String {
    let mut out = String::from("<?xml version=\"1.0\"");
    if let Some(encoding) = &self.encoding {
      out.push_str(" encoding=\"");
      out.push_str(encoding);
      out.push('"');
    }
    out.push_str("?>\n");
    self.root.write_to(&mut out);
    out.push('\n');
    out
  }
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, String> {
  let name = String::from_utf8(start.name().as_ref().to_vec()).map_err(|e| e.to_string())?;
  let mut element = Element::new(name);
  for attr in start.attributes() {
    let attr = attr.map_err(|e| e.to_string())?;
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
    element.attributes.push((key, value));
  }
  Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
  match stack.last_mut() {
    Some(parent) => parent.push(element),
    None => *root = Some(element),
  }
}
