//! A minimal owned element tree.
//!
//! Nodes live in a single arena and refer to their parent by [`NodeId`],
//! which is enough for subtree extraction, attribute inheritance and
//! serialization without a full DOM.

use crate::parser::xml::{self, XmlElement};
use quick_xml::events::Event;

pub(crate) type NodeId = usize;

/// Elements that never have content in HTML,
/// even when written without a self-closing slash.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Clone, Debug)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
}

impl Element {
    /// The lowercased qualified name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased name without its prefix.
    pub(crate) fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the whitespace-separated `class` attribute
    /// contains `class` (case-insensitive).
    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attribute("class").is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|value| value.eq_ignore_ascii_case(class))
        })
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.local_name())
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
pub(crate) struct Document {
    nodes: Vec<Node>,
}

impl Document {
    const ROOT: NodeId = 0;

    /// Parses markup leniently: void elements are closed implicitly,
    /// an end tag closes every element opened after its matching start tag,
    /// and end tags without a match are ignored.
    pub(crate) fn parse(text: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = xml::reader(text);
        let mut document = Self {
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Element(Element {
                    name: String::new(),
                    attributes: Vec::new(),
                    children: Vec::new(),
                }),
            }],
        };
        let mut open = vec![Self::ROOT];

        loop {
            let current = open.last().copied().unwrap_or(Self::ROOT);

            match reader.read_event()? {
                Event::Start(start) => {
                    let element = Element {
                        name: start.lowercase_name(),
                        attributes: start.owned_attributes(),
                        children: Vec::new(),
                    };
                    let is_void = element.is_void();
                    let id = document.append(current, NodeKind::Element(element));

                    if !is_void {
                        open.push(id);
                    }
                }
                Event::Empty(start) => {
                    let element = Element {
                        name: start.lowercase_name(),
                        attributes: start.owned_attributes(),
                        children: Vec::new(),
                    };
                    document.append(current, NodeKind::Element(element));
                }
                Event::End(end) => {
                    let name = xml::end_name(&end);
                    let matched = open.iter().rposition(|id| {
                        *id != Self::ROOT
                            && document.element(*id).is_some_and(|el| el.name() == name)
                    });
                    if let Some(position) = matched {
                        open.truncate(position);
                    }
                }
                Event::Text(text) => document.append_text(current, &String::from_utf8_lossy(&text)),
                Event::CData(cdata) => document.append_text(current, &String::from_utf8_lossy(&cdata)),
                Event::GeneralRef(reference) => {
                    document.append_text(current, &xml::resolve_reference(&reference));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(document)
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(parent),
            kind,
        });
        if let NodeKind::Element(element) = &mut self.nodes[parent].kind {
            element.children.push(id);
        }
        id
    }

    /// Appends text, merging with a directly preceding text node.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self.children(parent).last().copied();

        if let Some(Node {
            kind: NodeKind::Text(existing),
            ..
        }) = last.and_then(|id| self.nodes.get_mut(id))
        {
            existing.push_str(text);
        } else {
            self.append(parent, NodeKind::Text(text.to_owned()));
        }
    }

    /// The synthetic node holding every top-level node.
    pub(crate) fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map_or(&[], |element| &element.children)
    }

    /// Every node below `id` in document order, `id` excluded.
    pub(crate) fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Every element below `id` in document order, paired with its id.
    pub(crate) fn descendant_elements(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = (NodeId, &Element)> + '_ {
        self.descendants(id)
            .filter_map(|id| self.element(id).map(|element| (id, element)))
    }

    /// Elements below `id` whose local name is `local_name`.
    pub(crate) fn elements_named<'a>(
        &'a self,
        id: NodeId,
        local_name: &'a str,
    ) -> impl Iterator<Item = (NodeId, &'a Element)> + 'a {
        self.descendant_elements(id)
            .filter(move |(_, element)| element.local_name() == local_name)
    }

    /// The first element in document order whose `id` attribute is `fragment`.
    pub(crate) fn find_by_id(&self, fragment: &str) -> Option<NodeId> {
        self.descendant_elements(Self::ROOT)
            .find(|(_, element)| element.attribute("id") == Some(fragment))
            .map(|(id, _)| id)
    }

    /// The first of `names` found on `id` or its nearest ancestor carrying any of them.
    pub(crate) fn inherited_attribute(&self, id: NodeId, names: &[&str]) -> Option<&str> {
        let mut current = Some(id);

        while let Some(node) = current {
            let value = self
                .element(node)
                .and_then(|element| names.iter().find_map(|name| element.attribute(name)));

            if value.is_some() {
                return value;
            }
            current = self.parent(node);
        }
        None
    }

    /// Concatenated text of every text node below `id`.
    pub(crate) fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();

        if let Some(Node {
            kind: NodeKind::Text(value),
            ..
        }) = self.nodes.get(id)
        {
            text.push_str(value);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(value) = &self.nodes[node].kind {
                text.push_str(value);
            }
        }
        text
    }

    /// Removes `names` from `id` and every element below it.
    pub(crate) fn strip_attributes(&mut self, id: NodeId, names: &[&str]) {
        let targets = std::iter::once(id)
            .chain(self.descendants(id))
            .collect::<Vec<_>>();

        for target in targets {
            if let Some(element) = self.element_mut(target) {
                element.attributes.retain(|(key, _)| !names.contains(&key.as_str()));
            }
        }
    }

    /// Sets an existing attribute, or appends it.
    pub(crate) fn set_attribute(&mut self, id: NodeId, name: &str, value: String) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => element.attributes.push((name.to_owned(), value)),
        }
    }

    /// Serializes `id` and its subtree as markup.
    pub(crate) fn serialize(&self, id: NodeId) -> String {
        let mut markup = String::new();
        self.write_node(id, &mut markup);
        markup
    }

    fn write_node(&self, id: NodeId, markup: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => markup.push_str(&xml::escape_text(text)),
            // The synthetic root has no tag of its own
            NodeKind::Element(element) if id == Self::ROOT => {
                for child in &element.children {
                    self.write_node(*child, markup);
                }
            }
            NodeKind::Element(element) => {
                markup.push('<');
                markup.push_str(&element.name);

                for (key, value) in &element.attributes {
                    markup.push(' ');
                    markup.push_str(key);
                    markup.push_str("=\"");
                    markup.push_str(&xml::escape_attribute(value));
                    markup.push('"');
                }
                if element.is_void() {
                    markup.push_str(" />");
                    return;
                }
                markup.push('>');

                for child in &element.children {
                    self.write_node(*child, markup);
                }
                markup.push_str("</");
                markup.push_str(&element.name);
                markup.push('>');
            }
        }
    }
}

/// Pre-order traversal; see [`Document::descendants`].
pub(crate) struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
