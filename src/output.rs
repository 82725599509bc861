//! Plain-text rendering of catalogs and entity views for the terminal.

use shelfmark_lending::format_date;
use shelfmark_library::{Borrowing, Catalog, Choice, EntityView};
use std::io::{self, Write};

const HEADERS: [&str; 9] =
    ["ID", "Title", "Author", "Publisher", "Genre", "Borrower", "Borrow Date", "Return Date", "Status"];

pub fn catalog(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    let rows: Vec<[String; 9]> = catalog
        .rows()
        .iter()
        .map(|row| {
            let loan = row.loan.as_ref();
            [
                row.id.clone(),
                row.title.name.clone(),
                row.author.name.clone(),
                row.publisher.name.clone(),
                row.genre.name.clone(),
                loan.map(|l| l.borrower_name.clone()).unwrap_or_default(),
                loan.map(|l| format_date(l.borrow_date)).unwrap_or_default(),
                loan.map(|l| format_date(l.return_date)).unwrap_or_default(),
                row.state().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }
    line(out, &HEADERS.map(String::from), &widths)?;
    line(out, &widths.map(|w| "-".repeat(w)), &widths)?;
    for row in &rows {
        line(out, row, &widths)?;
    }

    choices(out, "Available", catalog.available())?;
    choices(out, "Borrowed", catalog.borrowed())
}

pub fn entity(view: &EntityView, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", view.heading())?;
    for field in &view.fields {
        match &field.resolved {
            Some(resolved) => writeln!(out, "  {}: {} [{}#{}]", field.name, resolved.name, resolved.link.document, resolved.link.id)?,
            None => writeln!(out, "  {}: {}", field.name, field.text)?,
        }
    }
    match &view.borrowing {
        Some(Borrowing::Borrowed(record)) => {
            writeln!(out, "\nBorrowing Details")?;
            writeln!(out, "  Borrower: {}", record.borrower_name)?;
            writeln!(out, "  Borrow Date: {}", format_date(record.borrow_date))?;
            writeln!(out, "  Return Date: {}", format_date(record.return_date))?;
        },
        Some(Borrowing::Available) => writeln!(out, "\nThis book is currently available for borrowing.")?,
        None => {},
    }
    Ok(())
}

fn line(out: &mut impl Write, cells: &[String; 9], widths: &[usize; 9]) -> io::Result<()> {
    let padded: Vec<String> = cells.iter().zip(widths).map(|(cell, &width)| format!("{cell:<width$}")).collect();
    writeln!(out, "{}", padded.join("  ").trim_end())
}

fn choices(out: &mut impl Write, title: &str, choices: &[Choice]) -> io::Result<()> {
    writeln!(out, "\n{title} ({})", choices.len())?;
    for choice in choices {
        writeln!(out, "  {}", choice.label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shelfmark_documents::{EntityKind, parse};
    use shelfmark_lending::{BorrowRecord, Ledger, LoanPeriod, parse_date};
    use shelfmark_library::{FieldView, Indexes, Link, ResolvedReference, Sources};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_catalog_table() {
        let books = parse(
            r#"<Books>
                <Book id="b1"><Title>Kindred</Title><Author xlink:href="authors.xml#a1"/></Book>
                <Book id="b2"><Title>Dune</Title></Book>
            </Books>"#,
        )
        .unwrap();
        let indexes = Indexes::build(
            &parse(r#"<Authors><Author id="a1"><Name>Octavia E. Butler</Name></Author></Authors>"#).unwrap(),
            &parse("<Publishers/>").unwrap(),
            &parse("<Genres/>").unwrap(),
        );
        let mut ledger = Ledger::new();
        ledger.insert(
            "b2".to_string(),
            BorrowRecord::new("Sam", parse_date("2024-01-31").unwrap(), LoanPeriod::default()).unwrap(),
        );
        let catalog = Catalog::build(&books, &indexes, &ledger, &Sources::default());

        let text = render(|out| super::catalog(&catalog, out));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ID  Title    Author"));
        assert!(lines[1].starts_with("--  -------  -----------------"));
        assert!(lines[2].contains("Octavia E. Butler") && lines[2].ends_with("Present"));
        assert!(lines[3].contains("Sam") && lines[3].contains("2024-04-30") && lines[3].ends_with("Borrowed"));
        assert!(text.contains("\nAvailable (1)\n  b1 - Kindred\n"));
        assert!(text.ends_with("\nBorrowed (1)\n  b2 - Dune\n"));
    }

    #[rstest]
    #[case(Some(Borrowing::Available), "This book is currently available for borrowing.")]
    #[case(None, "Author: Frank Herbert [authors.xml#a1]")]
    fn test_entity(#[case] borrowing: Option<Borrowing>, #[case] expected: &str) {
        let view = EntityView {
            document: "books.xml".to_string(),
            tag: "Book".to_string(),
            id: "b1".to_string(),
            kind: Some(EntityKind::Book),
            fields: vec![
                FieldView { name: "Title".into(), text: "Dune".into(), resolved: None },
                FieldView {
                    name: "Author".into(),
                    text: String::new(),
                    resolved: Some(ResolvedReference {
                        kind: EntityKind::Author,
                        link: Link::new("authors.xml", "a1"),
                        name: "Frank Herbert".into(),
                    }),
                },
            ],
            borrowing,
        };
        let text = render(|out| entity(&view, out));
        assert!(text.starts_with("Book Details\n  Title: Dune\n"));
        assert!(text.contains(expected));
    }

    #[test]
    fn test_borrowed_entity() {
        let record = BorrowRecord::new("Kim", parse_date("2024-11-30").unwrap(), LoanPeriod::default()).unwrap();
        let view = EntityView {
            document: "books.xml".to_string(),
            tag: "Book".to_string(),
            id: "b1".to_string(),
            kind: Some(EntityKind::Book),
            fields: Vec::new(),
            borrowing: Some(Borrowing::Borrowed(record)),
        };
        let text = render(|out| entity(&view, out));
        assert!(text.contains("Borrower: Kim\n  Borrow Date: 2024-11-30\n  Return Date: 2025-02-28\n"));
    }
}
