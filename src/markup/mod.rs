//! Parsed markup trees.
//!
//! The form model builder never parses markup itself. It walks any tree that
//! implements [`Element`], whose children are either elements or text
//! (see [`NodeRef`]).
//!
//! An owned implementation is provided by [`ElementNode`]. With the `html`
//! feature enabled, [`parse_html`] builds one from HTML text.

#[cfg(feature = "html")]
mod html;
#[cfg(feature = "html")]
pub use html::parse_html;

use alloc::{string::String, vec::Vec};
use core::{iter, slice};

/// The XHTML namespace name.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// A child of an [`Element`].
#[derive(Debug)]
pub enum NodeRef<'a, E: ?Sized> {
    /// A child element.
    Element(&'a E),
    /// A text node.
    Text(&'a str),
}

impl<E: ?Sized> Clone for NodeRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: ?Sized> Copy for NodeRef<'_, E> {}

/// An element of a parsed markup tree.
pub trait Element {
    /// An iterator over the children of an element, in document order.
    type Children<'a>: Iterator<Item = NodeRef<'a, Self>>
    where
        Self: 'a;

    /// Returns the local name of the element, e.g., `"input"`.
    fn local_name(&self) -> &str;

    /// Returns the namespace name of the element, if any.
    fn namespace(&self) -> Option<&str>;

    /// Looks up an attribute by name.
    ///
    /// Boolean attributes such as `checked` are present with any value.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Returns an iterator over the children of the element.
    fn children(&self) -> Self::Children<'_>;

    /// Returns the concatenated text of all descendant text nodes.
    fn text_content(&self) -> String {
        let mut buf = String::new();
        for child in self.children() {
            match child {
                NodeRef::Text(s) => buf.push_str(s),
                NodeRef::Element(e) => buf.push_str(&e.text_content()),
            }
        }
        buf
    }

    /// Checks whether this is the HTML element with the given local name.
    ///
    /// Elements in no namespace and in the XHTML namespace both count;
    /// the local name is compared ASCII case-insensitively.
    fn is_html(&self, local_name: &str) -> bool {
        self.namespace().map_or(true, |ns| ns == XHTML_NS)
            && self.local_name().eq_ignore_ascii_case(local_name)
    }
}

/// An owned markup node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An element.
    Element(ElementNode),
    /// A text node.
    Text(String),
}

/// An owned markup element.
///
/// # Examples
///
/// ```
/// use webform::markup::{Element, ElementNode};
///
/// let select = ElementNode::new("select")
///     .with_attr("name", "color")
///     .with_child(ElementNode::new("option").with_text("red"))
///     .with_child(ElementNode::new("option").with_attr("value", "g").with_text("green"));
///
/// assert_eq!(select.attr("name"), Some("color"));
/// assert_eq!(select.text_content(), "redgreen");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementNode {
    name: String,
    namespace: Option<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl ElementNode {
    /// Creates an element in no namespace with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the namespace name.
    #[must_use]
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    /// Adds an attribute, replacing any existing one of the same name.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text node.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends a child node in place.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }
}

type ChildrenIter<'a> = iter::Map<slice::Iter<'a, Node>, fn(&'a Node) -> NodeRef<'a, ElementNode>>;

impl Element for ElementNode {
    type Children<'a> = ChildrenIter<'a>;

    fn local_name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn children(&self) -> ChildrenIter<'_> {
        fn node_ref(node: &Node) -> NodeRef<'_, ElementNode> {
            match node {
                Node::Element(e) => NodeRef::Element(e),
                Node::Text(s) => NodeRef::Text(s),
            }
        }
        self.children.iter().map(node_ref as fn(&Node) -> NodeRef<'_, ElementNode>)
    }
}
