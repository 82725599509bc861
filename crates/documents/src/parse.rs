//! XML parsing into a [`Document`] tree.

use exn::OptionExt;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::tree::{Document, Element, Node};

/// Parses raw XML bytes into a [`Document`].
///
/// The input must be UTF-8 and well-formed: end tags must match, exactly one
/// root element is allowed, and no text other than whitespace may appear
/// outside it. Entities in text and attribute values are unescaped; CDATA is
/// kept verbatim.
///
/// # Examples
///
/// ```
/// let document = shelfmark_documents::parse(r#"<Genres><Genre id="g1"><Name>Fantasy</Name></Genre></Genres>"#).unwrap();
/// assert_eq!(document.root().name(), "Genres");
/// assert_eq!(document.find_by_id("g1").unwrap().text(), "Fantasy");
///
/// assert!(shelfmark_documents::parse("<Genres><Genre></Genres>").is_err());
/// ```
#[instrument(skip(xml), fields(xml_size = xml.as_ref().len()))]
pub fn parse(xml: impl AsRef<[u8]>) -> Result<Document> {
    let mut reader = Reader::from_reader(xml.as_ref());
    reader.config_mut().trim_text(false);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();
    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => exn::bail!(ErrorKind::Malformed(format!("{e} (at byte {})", reader.buffer_position()))),
        };
        match event {
            Event::Start(start) => stack.push(element(&start)?),
            Event::Empty(start) => attach(&mut stack, &mut root, element(&start)?)?,
            Event::End(_) => {
                let closed = stack.pop().ok_or_raise(|| ErrorKind::Malformed("unexpected end tag".to_string()))?;
                attach(&mut stack, &mut root, closed)?;
            },
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| ErrorKind::Malformed(e.to_string()))?;
                push_text(&mut stack, text.into_owned())?;
            },
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                push_text(&mut stack, text)?;
            },
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {},
        }
        buf.clear();
    }
    if let Some(open) = stack.last() {
        exn::bail!(ErrorKind::Malformed(format!("unclosed element <{}>", open.name())));
    }
    let root = root.ok_or_raise(|| ErrorKind::NoRootElement)?;
    tracing::trace!(root = root.name(), "Parsed document");
    Ok(Document::new(root))
}

fn element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ErrorKind::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(|e| ErrorKind::Malformed(e.to_string()))?;
        element = element.with_attribute(key, value.into_owned());
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        exn::bail!(ErrorKind::Malformed(format!("second root element <{}>", element.name())));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(Node::Text(text)),
        None if text.trim().is_empty() => {},
        None => exn::bail!(ErrorKind::Malformed("text outside of the root element".to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const AUTHORS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- sample -->
<Authors xmlns:xlink="http://www.w3.org/1999/xlink">
    <Author id="a1">
        <Name>Ursula K. Le Guin</Name>
        <Born>1929</Born>
    </Author>
    <Author id="a2"><Name>Terry Pratchett &amp; friends</Name></Author>
    <Author id="a3"/>
</Authors>"#;

    #[test]
    fn test_parses_sample() {
        let document = parse(AUTHORS).unwrap();
        assert_eq!(document.root().name(), "Authors");
        assert_eq!(document.elements_by_tag("Author").count(), 3);
        let a2 = document.find_by_id("a2").unwrap();
        assert_eq!(a2.find("Name").unwrap().text(), "Terry Pratchett & friends");
        assert_eq!(document.root().attribute("xmlns:xlink"), Some("http://www.w3.org/1999/xlink"));
    }

    #[test]
    fn test_empty_element_kept() {
        let document = parse(AUTHORS).unwrap();
        let a3 = document.find_by_id("a3").unwrap();
        assert_eq!(a3.children().count(), 0);
        assert_eq!(a3.text(), "");
    }

    #[test]
    fn test_cdata_kept_verbatim() {
        let document = parse("<Book><Title><![CDATA[Fish & <Chips>]]></Title></Book>").unwrap();
        assert_eq!(document.root().find("Title").unwrap().text(), "Fish & <Chips>");
    }

    #[test]
    fn test_attribute_entities_unescaped() {
        let document = parse(r#"<Book id="b&amp;1"/>"#).unwrap();
        assert_eq!(document.root().id(), Some("b&1"));
    }

    #[rstest]
    #[case::mismatched_end("<Books><Book></Books>")]
    #[case::unclosed("<Books><Book>")]
    #[case::stray_end("<Books/></Books>")]
    #[case::two_roots("<Books/><Authors/>")]
    #[case::text_outside_root("<Books/>trailing")]
    #[case::bad_attribute("<Book id=b1/>")]
    fn test_malformed(#[case] xml: &str) {
        let err = parse(xml).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Malformed(_)), "unexpected error for {xml:?}: {err:?}");
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n ")]
    #[case::declaration_only(r#"<?xml version="1.0"?>"#)]
    fn test_no_root(#[case] xml: &str) {
        let err = parse(xml).unwrap_err();
        assert_eq!(*err, ErrorKind::NoRootElement);
    }
}
