// ABOUTME: Thin DOM helpers over html5ever's reference-counted tree
// ABOUTME: Parsing, attribute and child manipulation, and serialization back to markup

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

use super::error::{Result, TemplateError};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed HTML document. Markup fragments land inside `<body>`.
pub struct Document {
    dom: RcDom,
    body: Handle,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
        let body = find_first(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
        Self { dom, body }
    }

    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    pub fn body(&self) -> &Handle {
        &self.body
    }

    /// Markup of everything inside `<body>`
    pub fn body_html(&self) -> Result<String> {
        serialize_children(&self.body)
    }

    /// Markup of the whole document, doctype included
    pub fn to_html(&self) -> Result<String> {
        serialize_children(&self.dom.document)
    }
}

pub fn serialize_children(node: &Handle) -> Result<String> {
    let mut bytes = Vec::new();
    let handle: SerializableHandle = node.clone().into();
    serialize(
        &mut bytes,
        &handle,
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        },
    )?;
    String::from_utf8(bytes).map_err(|e| TemplateError::SerializeError(e.to_string()))
}

pub fn tag_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn find_first(root: &Handle, tag: &str) -> Option<Handle> {
    for child in root.children.borrow().iter() {
        if tag_name(child) == Some(tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Descendants of `root` carrying `attr`, in document order. The list is a
/// snapshot: later tree edits do not change it.
pub fn elements_with_attr(root: &Handle, attr: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_with_attr(root, attr, &mut found);
    found
}

fn collect_with_attr(node: &Handle, attr: &str, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if has_attr(child, attr) {
            found.push(child.clone());
        }
        collect_with_attr(child, attr, found);
    }
}

fn attrs_of(node: &Handle) -> Option<&RefCell<Vec<Attribute>>> {
    match node.data {
        NodeData::Element { ref attrs, .. } => Some(attrs),
        _ => None,
    }
}

fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

pub fn has_attr(node: &Handle, name: &str) -> bool {
    attrs_of(node).is_some_and(|attrs| attrs.borrow().iter().any(|a| &*a.name.local == name))
}

pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
    attrs_of(node).and_then(|attrs| {
        attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string())
    })
}

/// Overwrite an attribute in place, or append it when absent
pub fn set_attr(node: &Handle, name: &str, value: &str) {
    let Some(attrs) = attrs_of(node) else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|a| &*a.name.local == name) {
        Some(existing) => existing.value = StrTendril::from_slice(value),
        None => attrs.push(Attribute {
            name: attr_name(name),
            value: StrTendril::from_slice(value),
        }),
    }
}

pub fn remove_attr(node: &Handle, name: &str) {
    if let Some(attrs) = attrs_of(node) {
        attrs.borrow_mut().retain(|a| &*a.name.local != name);
    }
}

pub fn add_class(node: &Handle, class: &str) {
    let current = get_attr(node, "class").unwrap_or_default();
    if current.split_whitespace().any(|existing| existing == class) {
        return;
    }
    let updated = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim_end(), class)
    };
    set_attr(node, "class", &updated);
}

pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(
            attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: attr_name(name),
                    value: StrTendril::from_slice(value),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Remove a node from its parent, if it has one
pub fn detach(node: &Handle) {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

pub fn clear_children(node: &Handle) {
    let children = std::mem::take(&mut *node.children.borrow_mut());
    for child in children {
        child.parent.set(None);
    }
}

/// Replace all children with a single text node, like `textContent =`
pub fn set_text(node: &Handle, text: &str) {
    clear_children(node);
    if !text.is_empty() {
        append_child(node, create_text(text));
    }
}

/// Move the children of `from` to the end of `to`
pub fn move_children(from: &Handle, to: &Handle) {
    let children = std::mem::take(&mut *from.children.borrow_mut());
    for child in children {
        child.parent.set(None);
        append_child(to, child);
    }
}

/// Opening tag of an element, for log messages
pub fn describe(node: &Handle) -> String {
    let Some(tag) = tag_name(node) else {
        return "#node".to_string();
    };
    let attrs = attrs_of(node)
        .map(|attrs| {
            attrs
                .borrow()
                .iter()
                .map(|a| format!(" {}=\"{}\"", &*a.name.local, &*a.value))
                .collect::<String>()
        })
        .unwrap_or_default();
    format!("<{}{}>", tag, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_fragment() {
        let doc = Document::parse(r#"<div class="a">Hi <b>there</b></div><p>x</p>"#);
        assert_eq!(
            doc.body_html().unwrap(),
            r#"<div class="a">Hi <b>there</b></div><p>x</p>"#
        );
    }

    #[test]
    fn test_attribute_helpers() {
        let doc = Document::parse(r#"<span data-text="name" id="s">old</span>"#);
        let span = find_first(doc.body(), "span").unwrap();

        assert!(has_attr(&span, "data-text"));
        assert_eq!(get_attr(&span, "id"), Some("s".to_string()));

        set_attr(&span, "id", "t");
        remove_attr(&span, "data-text");
        add_class(&span, "shown");
        add_class(&span, "shown");
        set_text(&span, "new & improved");

        assert_eq!(
            doc.body_html().unwrap(),
            r#"<span id="t" class="shown">new &amp; improved</span>"#
        );
    }

    #[test]
    fn test_elements_with_attr_in_document_order() {
        let doc = Document::parse(
            r#"<div data-if="a" id="1"><p data-if="b" id="2"></p></div><p data-if="c" id="3"></p>"#,
        );
        let ids: Vec<_> = elements_with_attr(doc.body(), "data-if")
            .iter()
            .filter_map(|node| get_attr(node, "id"))
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_created_elements_serialize_as_html() {
        let doc = Document::parse("<div></div>");
        let div = find_first(doc.body(), "div").unwrap();
        append_child(&div, create_element("input", &[("type", "checkbox")]));
        append_child(&div, create_element("br", &[]));

        assert_eq!(
            doc.body_html().unwrap(),
            r#"<div><input type="checkbox"><br></div>"#
        );

        detach(&div);
        assert_eq!(doc.body_html().unwrap(), "");
    }

    #[test]
    fn test_describe() {
        let doc = Document::parse(r#"<li data-checklist-item="" data-label="Do A"></li>"#);
        let li = find_first(doc.body(), "li").unwrap();
        assert_eq!(
            describe(&li),
            r#"<li data-checklist-item="" data-label="Do A">"#
        );
    }
}
