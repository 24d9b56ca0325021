use super::{ElementNode, Node};
use alloc::string::ToString;
use html5ever::{parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// The local name of the root element returned by [`parse_html`].
const DOCUMENT_NAME: &str = "#document";

/// Parses an HTML document into an owned tree.
///
/// The returned element is a synthetic `#document` root whose children are
/// the top-level nodes of the document. Comments, doctypes and processing
/// instructions are dropped.
///
/// # Examples
///
/// ```
/// use webform::{markup::parse_html, FormModel};
///
/// let doc = parse_html(r#"<form><input type="text" name="q"></form>"#);
/// let model = FormModel::build(&doc, None)?;
/// assert_eq!(model.controls().len(), 1);
/// # Ok::<_, webform::FormError>(())
/// ```
#[must_use]
pub fn parse_html(markup: &str) -> ElementNode {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    let mut root = ElementNode::new(DOCUMENT_NAME);
    copy_children(&dom.document, &mut root);
    tracing::debug!("Parsed HTML document of {} bytes", markup.len());
    root
}

fn copy_children(handle: &Handle, parent: &mut ElementNode) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, attrs, .. } => {
                let mut elem = ElementNode::new(&*name.local).with_namespace(&*name.ns);
                for attr in attrs.borrow().iter() {
                    elem = elem.with_attr(&*attr.name.local, &*attr.value);
                }
                copy_children(child, &mut elem);
                parent.push_child(Node::Element(elem));
            }
            NodeData::Text { contents } => {
                parent.push_child(Node::Text(contents.borrow().to_string()));
            }
            _ => {}
        }
    }
}
