use exn::ResultExt;
use shelfmark_lending::{BorrowRecord, LendingStore, LoanPeriod, parse_date};
use tracing::instrument;

use crate::catalog::{BookState, Catalog, Choice};
use crate::error::{ErrorKind, Result};

/// Asks the user to approve a change before it happens.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}
impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// How a confirmed-or-not operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user declined; nothing was changed.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct BorrowRequest<'a> {
    pub book_id: &'a str,
    pub borrower: &'a str,
    /// `YYYY-MM-DD`
    pub date: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ReturnRequest<'a> {
    pub book_id: &'a str,
    /// `YYYY-MM-DD`. Checked, but not kept: returning deletes the record.
    pub date: &'a str,
}

impl Catalog {
    /// Lends a book. Every row carrying the book's id is updated.
    ///
    /// Checks run in a fixed order, and any failure leaves the store and
    /// the catalog untouched: input validation, confirmation, row lookup,
    /// then the book's current state in the store. On success the record
    /// is persisted and the book moves to the end of the borrowed list.
    #[instrument(level = "debug", skip(self, store, confirm))]
    pub async fn borrow(
        &mut self,
        store: &dyn LendingStore,
        confirm: &dyn Confirm,
        loan: LoanPeriod,
        request: BorrowRequest<'_>,
    ) -> Result<Outcome> {
        let book_id = request.book_id.trim();
        if book_id.is_empty() {
            exn::bail!(ErrorKind::Validation("book id"));
        }
        let borrower = request.borrower.trim();
        if borrower.is_empty() {
            exn::bail!(ErrorKind::Validation("borrower name"));
        }
        let date = parse_date(request.date).or_raise(|| ErrorKind::Validation("borrow date"))?;
        let record = BorrowRecord::new(borrower, date, loan).or_raise(|| ErrorKind::Validation("borrow date"))?;

        if !confirm.confirm(&format!("Are you sure you want to borrow Book ID {book_id}?")) {
            tracing::debug!("Borrow cancelled");
            return Ok(Outcome::Cancelled);
        }

        let indices = self.positions(book_id)?;
        if store.get(book_id).await.or_raise(|| ErrorKind::Lending)?.is_some() {
            exn::bail!(ErrorKind::InvalidTransition { id: book_id.to_string(), state: BookState::Borrowed });
        }

        store.set(book_id, record.clone()).await.or_raise(|| ErrorKind::Lending)?;
        tracing::info!(book = book_id, borrower, due = %record.return_date, "Book borrowed");
        for &index in &indices {
            self.rows[index].loan = Some(record.clone());
        }
        let choices = indices.iter().map(|&index| self.rows[index].choice()).collect();
        move_choices(&mut self.available, &mut self.borrowed, book_id, choices);
        Ok(Outcome::Completed)
    }

    /// Takes a book back. The mirror image of [`Catalog::borrow`]: the
    /// record is deleted and the book moves to the end of the available
    /// list.
    #[instrument(level = "debug", skip(self, store, confirm))]
    pub async fn return_book(
        &mut self,
        store: &dyn LendingStore,
        confirm: &dyn Confirm,
        request: ReturnRequest<'_>,
    ) -> Result<Outcome> {
        let book_id = request.book_id.trim();
        if book_id.is_empty() {
            exn::bail!(ErrorKind::Validation("book id"));
        }
        parse_date(request.date).or_raise(|| ErrorKind::Validation("return date"))?;

        if !confirm.confirm(&format!("Are you sure you want to return Book ID {book_id}?")) {
            tracing::debug!("Return cancelled");
            return Ok(Outcome::Cancelled);
        }

        let indices = self.positions(book_id)?;
        if store.get(book_id).await.or_raise(|| ErrorKind::Lending)?.is_none() {
            exn::bail!(ErrorKind::InvalidTransition { id: book_id.to_string(), state: BookState::Present });
        }

        store.delete(book_id).await.or_raise(|| ErrorKind::Lending)?;
        tracing::info!(book = book_id, "Book returned");
        for &index in &indices {
            self.rows[index].loan = None;
        }
        let choices = indices.iter().map(|&index| self.rows[index].choice()).collect();
        move_choices(&mut self.borrowed, &mut self.available, book_id, choices);
        Ok(Outcome::Completed)
    }

    /// Every row for `book_id`. A repeated id in the books document gives
    /// several rows sharing one lending record.
    fn positions(&self, book_id: &str) -> Result<Vec<usize>> {
        let indices: Vec<usize> =
            self.rows.iter().enumerate().filter(|(_, row)| row.id == book_id).map(|(index, _)| index).collect();
        if indices.is_empty() {
            exn::bail!(ErrorKind::NotFound(book_id.to_string()));
        }
        Ok(indices)
    }
}

/// Forgets every loan after confirmation.
///
/// A catalog loaded afterwards shows every book as present.
#[instrument(level = "debug", skip_all)]
pub async fn clear_all(store: &dyn LendingStore, confirm: &dyn Confirm) -> Result<Outcome> {
    if !confirm.confirm("Are you sure you want to clear all borrowing data? This action cannot be undone.") {
        return Ok(Outcome::Cancelled);
    }
    store.clear().await.or_raise(|| ErrorKind::Lending)?;
    tracing::info!("Cleared all borrowing data");
    Ok(Outcome::Completed)
}

fn move_choices(from: &mut Vec<Choice>, to: &mut Vec<Choice>, book_id: &str, choices: Vec<Choice>) {
    from.retain(|existing| existing.id != book_id);
    to.extend(choices);
}
