//! Owned, mutable document model behind the auditor and the transformer.
//!
//! Parsing is delegated to `scraper` (html5ever underneath), so tag soup is
//! handled with browser-grade tolerance. The parsed tree is converted into an
//! arena of plain nodes that supports the small capability set the rest of
//! the crate needs: document-order queries, attribute read/write, text
//! extraction, ordered insertion (including prepend), element creation, and
//! re-serialization to markup. Styling and layout are out of scope; only the
//! static markup is modeled.

use scraper::Html;

/// Handle into a [`Document`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Doctype(String),
    Comment(String),
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone)]
struct DomNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Elements serialized without a closing tag and whose children are ignored.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are emitted verbatim (no entity escaping).
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<DomNode>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Parse an HTML string into a mutable document.
    ///
    /// Never fails: malformed markup degrades to whatever tree the parser
    /// recovers, which always includes `html`, `head` and `body` elements.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::default();
        let roots: Vec<NodeId> = parsed
            .tree
            .root()
            .children()
            .filter_map(|child| doc.convert(child, None))
            .collect();
        doc.roots = roots;
        doc
    }

    fn convert(
        &mut self,
        node: ego_tree::NodeRef<'_, scraper::Node>,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        let kind = match node.value() {
            scraper::Node::Doctype(doctype) => NodeKind::Doctype(doctype.name().to_string()),
            scraper::Node::Comment(comment) => NodeKind::Comment(comment.to_string()),
            scraper::Node::Text(text) => NodeKind::Text(text.to_string()),
            scraper::Node::Element(element) => NodeKind::Element {
                tag: element.name().to_string(),
                attrs: element
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            },
            _ => return None,
        };

        let id = self.push(DomNode {
            kind,
            parent,
            children: Vec::new(),
        });
        let children: Vec<NodeId> = node
            .children()
            .filter_map(|child| self.convert(child, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        Some(id)
    }

    fn push(&mut self, node: DomNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All element nodes in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_elements(root, &mut out);
        }
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[id.0].kind, NodeKind::Element { .. }) {
            out.push(id);
        }
        for &child in &self.nodes[id.0].children {
            self.collect_elements(child, out);
        }
    }

    /// All elements with the given (lowercase) tag name, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.tag(id) == Some(tag))
            .collect()
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.elements().into_iter().find(|&id| self.tag(id) == Some(tag))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_by_tag("head")
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn has_ancestor_tag(&self, id: NodeId, tag: &str) -> bool {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if self.tag(ancestor) == Some(tag) {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    /// Concatenated descendant text of a node, unnormalized.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// Descendant text with runs of whitespace collapsed to single spaces.
    pub fn normalized_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Create a detached element; attach it with [`Document::append_child`]
    /// or [`Document::prepend_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(DomNode {
            kind: NodeKind::Element {
                tag: tag.to_lowercase(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(DomNode {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    /// Set or replace an attribute. Names are stored lowercase.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            if let Some(existing) = attrs
                .iter_mut()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            {
                existing.1 = value.to_string();
            } else {
                attrs.push((name.to_lowercase(), value.to_string()));
            }
        }
    }

    /// Replace an element's children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let text_node = self.create_text(text);
        self.nodes[text_node.0].parent = Some(id);
        self.nodes[id.0].children = vec![text_node];
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize the whole document back to markup.
    pub fn html(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.serialize_node(root, &mut out);
        }
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            NodeKind::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.tag(parent))
                    .map(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    push_escaped_text(text, out);
                }
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    push_escaped_attr(value, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }

                for &child in &self.nodes[id.0].children {
                    self.serialize_node(child, out);
                }

                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn push_escaped_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_skeleton_for_fragments() {
        let doc = Document::parse("<p>Hello</p>");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.elements_by_tag("p").len(), 1);
    }

    #[test]
    fn test_doctype_survives_round_trip() {
        let doc = Document::parse("<!DOCTYPE html><html><body><p>x</p></body></html>");
        assert!(doc.html().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let doc = Document::parse(r#"<body><img src="a.png" alt="a"><br></body>"#);
        let html = doc.html();
        assert!(html.contains(r#"<img src="a.png" alt="a">"#));
        assert!(!html.contains("</img>"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn test_text_is_escaped_but_style_is_raw() {
        let doc = Document::parse("<body><style>a > b { color: red; }</style><p>1 < 2 & 3</p></body>");
        let html = doc.html();
        assert!(html.contains("a > b { color: red; }"));
        assert!(html.contains("1 &lt; 2 &amp; 3"));
    }

    #[test]
    fn test_set_attr_replaces_and_adds() {
        let mut doc = Document::parse(r#"<body><a href="/x">link</a></body>"#);
        let a = doc.first_by_tag("a").unwrap();
        doc.set_attr(a, "href", "/y");
        doc.set_attr(a, "rel", "noopener");
        assert_eq!(doc.attr(a, "href"), Some("/y"));
        assert_eq!(doc.attr(a, "rel"), Some("noopener"));
    }

    #[test]
    fn test_prepend_puts_child_first() {
        let mut doc = Document::parse("<body><p>old</p></body>");
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.prepend_child(body, div);
        assert_eq!(doc.children(body)[0], div);
        assert_eq!(doc.parent(div), Some(body));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = Document::parse("<body><a><span>click</span> here</a></body>");
        let a = doc.first_by_tag("a").unwrap();
        doc.set_text(a, "report");
        assert_eq!(doc.normalized_text(a), "report");
        assert_eq!(doc.children(a).len(), 1);
    }

    #[test]
    fn test_normalized_text_collapses_whitespace() {
        let doc = Document::parse("<body><p>  a\n\t b   c </p></body>");
        let p = doc.first_by_tag("p").unwrap();
        assert_eq!(doc.normalized_text(p), "a b c");
    }

    #[test]
    fn test_has_ancestor_tag() {
        let doc = Document::parse("<body><label><input type=\"text\"></label></body>");
        let input = doc.first_by_tag("input").unwrap();
        assert!(doc.has_ancestor_tag(input, "label"));
        assert!(!doc.has_ancestor_tag(input, "form"));
    }
}
