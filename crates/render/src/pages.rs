//! HTML pages for the catalog and for each entity.
//!
//! Pages are rendered from [upon] templates embedded at compile time. Every
//! string is HTML-escaped on output by [`escape_html`], so names and field
//! text taken from the catalog documents can't inject markup.
//!
//! # Layout
//!
//! | Page                | Path                        |
//! |---------------------|-----------------------------|
//! | Catalog             | `index.html`                |
//! | Entity `a1` in `authors.xml` | `authors/a1.html`  |
//! | Entity `B 1` in `books.xml`  | `books/B%201.html` |
//!
//! The document stem is slugged, the id is percent-encoded so that ids
//! differing only in case or punctuation get their own page.
//! | Stylesheet          | `style.css`                 |

use crate::error::{ErrorKind, Result};
use crate::style::Templates;
use exn::{OptionExt, ResultExt};
use rslug::slugify;
use shelfmark_lending::{BorrowRecord, format_date};
use shelfmark_library::{BookState, Borrowing, Catalog, Cell, Choice, EntityView, Link};
use std::fmt::Write;
use std::path::Path;
use tracing::instrument;
use upon::{Engine, Value};

pub const INDEX_PAGE: &str = "index.html";
pub const STYLESHEET: &str = "style.css";

/// Path of an entity's page, relative to the site root.
///
/// ```
/// use shelfmark_library::Link;
/// assert_eq!(shelfmark_render::page_path(&Link::new("authors.xml", "a1")), "authors/a1.html");
/// assert_eq!(shelfmark_render::page_path(&Link::new("data/Genres.xml", "Sci Fi")), "genres/Sci%20Fi.html");
/// ```
pub fn page_path(link: &Link) -> String {
    let stem = Path::new(&link.document).file_stem().and_then(|s| s.to_str()).unwrap_or(&link.document);
    format!("{}/{}.html", slugify!(stem), urlencoding::encode(&link.id))
}

/// [`page_path`] as it has to appear in an `href`: the `%` of the encoded
/// file name is itself escaped.
pub fn page_href(link: &Link) -> String {
    page_path(link).replace('%', "%25")
}

/// Escapes `& < > " '` in strings; every other value is printed as upon
/// would by default.
pub fn escape_html(f: &mut upon::fmt::Formatter<'_>, value: &Value) -> upon::fmt::Result {
    let Value::String(s) = value else {
        return upon::fmt::default(f, value);
    };
    for c in s.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' => f.write_str("&quot;")?,
            '\'' => f.write_str("&#39;")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Compiled page templates.
pub struct Pages {
    engine: Engine<'static>,
}
impl Pages {
    /// Compiles every embedded template.
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        engine.set_default_formatter(&escape_html);
        for file in Templates::iter() {
            let Some(name) = file.strip_suffix(".html") else {
                continue;
            };
            let name = name.to_string();
            let source = Templates::get(&file).ok_or_raise(|| ErrorKind::AssetNotFound(file.to_string()))?;
            let source =
                String::from_utf8(source.data.into_owned()).or_raise(|| ErrorKind::Template(name.clone()))?;
            engine.add_template(name.clone(), source).or_raise(|| ErrorKind::Template(name))?;
        }
        Ok(Self { engine })
    }

    /// Renders the catalog table and both choice lists as `index.html`.
    #[instrument(level = "debug", skip_all, fields(rows = catalog.rows().len()))]
    pub fn catalog(&self, catalog: &Catalog) -> Result<String> {
        let rows: Vec<Value> = catalog
            .rows()
            .iter()
            .map(|row| {
                let loan = row.loan.as_ref();
                upon::value! {
                    id: row.id.as_str(),
                    title: cell(&row.title),
                    author: cell(&row.author),
                    publisher: cell(&row.publisher),
                    genre: cell(&row.genre),
                    borrowed: row.state() == BookState::Borrowed,
                    borrower: loan.map(|l| l.borrower_name.clone()).unwrap_or_default(),
                    borrow_date: loan.map(|l| format_date(l.borrow_date)).unwrap_or_default(),
                    return_date: loan.map(|l| format_date(l.return_date)).unwrap_or_default(),
                    status: row.state().to_string(),
                }
            })
            .collect();
        let context = upon::value! {
            stylesheet: STYLESHEET,
            rows: rows,
            available: choices(catalog.available()),
            borrowed: choices(catalog.borrowed()),
        };
        self.render("catalog", context)
    }

    /// Renders one entity's detail page. Links are relative to the page's
    /// own location from [`page_path`].
    #[instrument(level = "debug", skip_all, fields(document = %view.document, id = %view.id))]
    pub fn entity(&self, view: &EntityView) -> Result<String> {
        let fields: Vec<Value> = view
            .fields
            .iter()
            .map(|field| match &field.resolved {
                Some(resolved) => upon::value! {
                    name: field.name.as_str(),
                    value: resolved.name.as_str(),
                    href: format!("../{}", page_href(&resolved.link)),
                },
                None => upon::value! {
                    name: field.name.as_str(),
                    value: field.text.as_str(),
                    href: "",
                },
            })
            .collect();
        let loan = match &view.borrowing {
            Some(Borrowing::Borrowed(record)) => Some(loan(record)),
            _ => None,
        };
        let context = upon::value! {
            heading: view.heading(),
            stylesheet: format!("../{STYLESHEET}"),
            index: format!("../{INDEX_PAGE}"),
            fields: fields,
            book: view.borrowing.is_some(),
            loan: loan,
        };
        self.render("entity", context)
    }

    fn render(&self, name: &str, context: Value) -> Result<String> {
        let template = self.engine.get_template(name).ok_or_raise(|| ErrorKind::AssetNotFound(name.to_string()))?;
        template.render(context).to_string().or_raise(|| ErrorKind::Template(name.to_string()))
    }
}

fn cell(cell: &Cell) -> Value {
    upon::value! {
        name: cell.name.as_str(),
        href: cell.link.as_ref().map(page_href).unwrap_or_default(),
    }
}

fn choices(choices: &[Choice]) -> Vec<Value> {
    choices
        .iter()
        .map(|choice| {
            upon::value! {
                id: choice.id.as_str(),
                label: choice.label.as_str(),
            }
        })
        .collect()
}

fn loan(record: &BorrowRecord) -> Value {
    upon::value! {
        borrower: record.borrower_name.as_str(),
        borrow_date: format_date(record.borrow_date),
        return_date: format_date(record.return_date),
    }
}
