//! Minimal document tree for the simulated driver.

use std::collections::BTreeMap;

/// Index of a node inside its [`Document`]
pub type NodeId = usize;

/// One element of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Lower-case tag name
    pub tag: String,
    /// DOM attributes as authored
    pub attrs: BTreeMap<String, String>,
    /// Own text content (children's text is not included)
    pub text: String,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
    /// Parent node
    pub parent: Option<NodeId>,
    /// `display: none`
    pub hidden: bool,
    /// Live `value` property of form controls
    pub value: String,
    /// Live `checked` (inputs) or `selected` (options) state
    pub checked: bool,
}

impl Node {
    /// Attribute lookup
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the `class` attribute lists `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// The `type` attribute of an input, lower-cased, defaulting to "text"
    #[must_use]
    pub fn input_type(&self) -> String {
        self.attr("type").unwrap_or("text").to_ascii_lowercase()
    }

    /// Whether this is a text-like input or textarea
    #[must_use]
    pub fn is_text_control(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.input_type().as_str(),
                "radio" | "checkbox" | "submit" | "reset" | "button" | "hidden"
            ),
            _ => false,
        }
    }

    /// Whether this is a checkbox or radio input
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        self.tag == "input" && matches!(self.input_type().as_str(), "radio" | "checkbox")
    }
}

/// Builder for a single element
#[derive(Debug, Clone)]
pub struct El {
    node: Node,
}

impl El {
    /// Start an element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            node: Node {
                tag: tag.to_ascii_lowercase(),
                attrs: BTreeMap::new(),
                text: String::new(),
                children: Vec::new(),
                parent: None,
                hidden: false,
                value: String::new(),
                checked: false,
            },
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// Set an attribute; `value`, `checked` and `selected` also seed live state
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        match name {
            "value" => self.node.value = value.to_string(),
            "checked" | "selected" => self.node.checked = true,
            _ => {}
        }
        let _ = self.node.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_string();
        self
    }

    /// Start hidden (`display: none`)
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.node.hidden = true;
        self
    }
}

/// A loaded document
#[derive(Debug, Clone)]
pub struct Document {
    /// `<title>` text
    pub title: String,
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document with an empty `<html>` root
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            nodes: vec![El::new("html").node],
        }
    }

    /// The `<html>` root
    #[must_use]
    pub const fn root(&self) -> NodeId {
        0
    }

    /// Append `el` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let id = self.nodes.len();
        let mut node = el.node;
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Node lookup
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node lookup
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Node lookup for ids known to be in range
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// First node whose `id` attribute equals `id`
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.nodes[n].attr("id") == Some(id))
    }

    /// All descendants of `id` (excluding itself) in document order
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, nearest first
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(n) = current {
            out.push(n);
            current = self.nodes[n].parent;
        }
        out
    }

    /// Element children of `id` sharing `id`'s parent, including itself
    #[must_use]
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id]
            .parent
            .map_or(&[][..], |p| self.nodes[p].children.as_slice())
    }

    /// Document-order position of every node
    #[must_use]
    pub fn order(&self) -> Vec<usize> {
        let mut order = vec![0; self.nodes.len()];
        for (position, n) in std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .enumerate()
        {
            order[n] = position;
        }
        order
    }

    /// Whether the node and all its ancestors are displayed
    #[must_use]
    pub fn is_displayed(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.hidden || (node.tag == "input" && node.input_type() == "hidden") {
            return false;
        }
        self.ancestors(id).iter().all(|&a| !self.nodes[a].hidden)
    }

    /// Rendered text: own and descendant text of displayed nodes, whitespace-normalized
    #[must_use]
    pub fn rendered_text(&self, id: NodeId) -> String {
        if !self.is_displayed(id) {
            return String::new();
        }
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text<'a>(&'a self, id: NodeId, parts: &mut Vec<&'a str>) {
        let node = &self.nodes[id];
        if node.hidden {
            return;
        }
        if !node.text.is_empty() {
            parts.push(&node.text);
        }
        for &child in &node.children {
            self.collect_text(child, parts);
        }
    }

    /// Raw text content regardless of visibility
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = self.nodes[id].text.clone();
        for n in self.descendants(id) {
            if !self.nodes[n].text.is_empty() {
                text.push(' ');
                text.push_str(&self.nodes[n].text);
            }
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Nearest enclosing `<form>`
    #[must_use]
    pub fn enclosing_form(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|&a| self.nodes[a].tag == "form")
    }
}
