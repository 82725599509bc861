//! A minimal, owned XML element tree.
//!
//! Just enough DOM to walk catalog documents: element names as written
//! (prefixes included), attributes in document order, and text. Comments,
//! processing instructions and the XML declaration are not kept.

use crate::reference::Reference;

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}
impl Document {
    pub(crate) fn new(root: Element) -> Self {
        Self { root }
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements named `tag`, the root included, in document order.
    ///
    /// Matches the qualified name exactly, like the DOM's
    /// `getElementsByTagName`.
    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        std::iter::once(&self.root).chain(self.root.descendants()).filter(move |el| el.name() == tag)
    }

    /// The first element (in document order) whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        std::iter::once(&self.root).chain(self.root.descendants()).find(|el| el.id() == Some(id))
    }
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}
impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), children: Vec::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Qualified name as written, e.g. `Author` or `dc:title`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Value of the attribute with exactly this qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// The cross-document reference carried by this element, if any.
    ///
    /// Looks for the first attribute whose local name is `href`, so both
    /// `xlink:href` and a bare `href` are recognised.
    pub fn reference(&self) -> Option<Reference> {
        self.attributes.iter().find(|(k, _)| local(k) == "href").and_then(|(_, v)| Reference::parse(v))
    }

    /// Direct element children, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Every element below this one, depth-first in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self.children.iter()] }
    }

    /// The first descendant named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|el| el.name() == name)
    }

    /// Concatenated text of all descendants (the DOM's `textContent`).
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}
impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                },
                Some(Node::Text(_)) => continue,
                None => {
                    self.stack.pop();
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Element {
        Element::new("Book")
            .with_attribute("id", "b1")
            .with_child(Element::new("Title").with_text("Dune"))
            .with_child(
                Element::new("Author").with_attribute("xlink:href", "authors.xml#a1").with_text("Frank Herbert"),
            )
            .with_child(Element::new("Notes").with_text("First ").with_child(Element::new("em").with_text("edition")))
    }

    #[test]
    fn test_text_concatenates_descendants() {
        assert_eq!(book().find("Notes").unwrap().text(), "First edition");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let names: Vec<_> = book().descendants().map(|el| el.name().to_string()).collect();
        assert_eq!(names, ["Title", "Author", "Notes", "em"]);
    }

    #[test]
    fn test_children_skips_text() {
        let book = book();
        let notes = book.find("Notes").unwrap();
        assert_eq!(notes.children().count(), 1);
    }

    #[test]
    fn test_reference_from_prefixed_href() {
        let book = book();
        let reference = book.find("Author").unwrap().reference().unwrap();
        assert_eq!(reference.document, "authors.xml");
        assert_eq!(reference.id, "a1");
        assert!(book.find("Title").unwrap().reference().is_none());
    }

    #[test]
    fn test_find_by_id_is_first_match() {
        let root = Element::new("Books")
            .with_child(Element::new("Book").with_attribute("id", "b1").with_text("first"))
            .with_child(Element::new("Book").with_attribute("id", "b1").with_text("second"));
        let document = Document::new(root);
        assert_eq!(document.find_by_id("b1").unwrap().text(), "first");
        assert!(document.find_by_id("b2").is_none());
        assert_eq!(document.elements_by_tag("Book").count(), 2);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(Element::new("dc:title").local_name(), "title");
        assert_eq!(Element::new("Title").local_name(), "Title");
    }
}
