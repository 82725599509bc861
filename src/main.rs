mod cli;
mod error;
mod output;

use clap::Parser;
use exn::ResultExt;
use shelfmark_config::Config;
use shelfmark_lending::{BackendStore, LendingStore, LoanPeriod, MemoryStore};
use shelfmark_library::{BorrowRequest, Catalog, Confirm, Outcome, ReturnRequest, Sources, clear_all, view_all, view_entity};
use shelfmark_render::{Pages, StyleConfig};
use shelfmark_storage::BackendHandle;
use shelfmark_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};

const BUILTIN_STYLESHEET: &str = "catalog.css";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

/// Interactive confirmation on the terminal. Anything other than an
/// explicit yes, including a closed stdin, declines.
struct Prompt;
impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        match dialoguer::Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read an answer, declining");
                false
            },
        }
    }
}

struct AssumeYes;
impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, "Confirmed by --yes");
        true
    }
}

/// Everything a command needs, built once from the configuration.
struct App {
    documents: BackendHandle,
    store: Box<dyn LendingStore>,
    sources: Sources,
    loan: LoanPeriod,
    confirm: Box<dyn Confirm>,
    stylesheet: Option<std::path::PathBuf>,
}
impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        tracing::debug!(?config, "Loaded configuration");

        let documents: BackendHandle = Arc::new(
            LocalBackend::existing("documents", &config.documents.root).or_raise(|| ErrorKind::Storage("documents"))?,
        );
        let store = open_store(&config, cli.dry_run)?;
        let confirm: Box<dyn Confirm> = if cli.yes { Box::new(AssumeYes) } else { Box::new(Prompt) };

        Ok(Self {
            documents,
            store,
            sources: Sources {
                books: config.documents.books,
                authors: config.documents.authors,
                publishers: config.documents.publishers,
                genres: config.documents.genres,
            },
            loan: LoanPeriod::months(config.lending.loan_months),
            confirm,
            stylesheet: config.export.stylesheet,
        })
    }

    async fn catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.documents, &self.sources, self.store.as_ref()).await.or_raise(|| ErrorKind::Library)
    }
}

/// The lending store. A dry run reads the real state but drops every
/// write, and never creates the state directory.
fn open_store(config: &Config, dry_run: bool) -> Result<Box<dyn LendingStore>> {
    let root = &config.lending.root;
    if dry_run && !root.is_dir() {
        tracing::info!(root = %root.display(), "No lending state yet, dry run starts empty");
        return Ok(Box::new(MemoryStore::new()));
    }
    let mut state: BackendHandle =
        Arc::new(LocalBackend::new("lending", root).or_raise(|| ErrorKind::Storage("lending"))?);
    if dry_run {
        state = Arc::new(ReadOnlyBackend::new(state));
    }
    let store = BackendStore::new(state, &config.lending.key).or_raise(|| ErrorKind::Lending)?;
    Ok(Box::new(store))
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::open(&cli)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Catalog => {
            let catalog = app.catalog().await?;
            output::catalog(&catalog, &mut stdout).or_raise(|| ErrorKind::Output)?;
        },
        Command::View { file, id } => {
            let view = view_entity(&app.documents, &app.sources, app.store.as_ref(), &file, &id)
                .await
                .or_raise(|| ErrorKind::Library)?;
            output::entity(&view, &mut stdout).or_raise(|| ErrorKind::Output)?;
        },
        Command::Borrow { book, borrower, date } => {
            let mut catalog = app.catalog().await?;
            let request = BorrowRequest { book_id: &book, borrower: &borrower, date: &date };
            let outcome = catalog
                .borrow(app.store.as_ref(), app.confirm.as_ref(), app.loan, request)
                .await
                .or_raise(|| ErrorKind::Library)?;
            report(&mut stdout, outcome, &format!("Book ID {} has been successfully borrowed.", book.trim()))?;
        },
        Command::Return { book, date } => {
            let mut catalog = app.catalog().await?;
            let request = ReturnRequest { book_id: &book, date: &date };
            let outcome = catalog
                .return_book(app.store.as_ref(), app.confirm.as_ref(), request)
                .await
                .or_raise(|| ErrorKind::Library)?;
            report(&mut stdout, outcome, &format!("Book ID {} has been successfully returned.", book.trim()))?;
        },
        Command::Clear => {
            let outcome =
                clear_all(app.store.as_ref(), app.confirm.as_ref()).await.or_raise(|| ErrorKind::Library)?;
            report(&mut stdout, outcome, "All borrowing data has been cleared.")?;
        },
        Command::Export { dir } => {
            let pages = export(&app, &dir).await?;
            writeln!(stdout, "Exported {pages} pages to {}", dir.display()).or_raise(|| ErrorKind::Output)?;
        },
    }
    Ok(())
}

async fn export(app: &App, dir: &Path) -> Result<usize> {
    let dir = std::path::absolute(dir).or_raise(|| ErrorKind::Storage("export"))?;
    let target: BackendHandle = Arc::new(LocalBackend::new("export", &dir).or_raise(|| ErrorKind::Storage("export"))?);

    let mut styles = StyleConfig::new().with_builtin(BUILTIN_STYLESHEET).or_raise(|| ErrorKind::Render)?;
    if let Some(path) = &app.stylesheet {
        styles = styles.with_file(path).or_raise(|| ErrorKind::Render)?;
    }
    let pages = Pages::new().or_raise(|| ErrorKind::Render)?;

    let catalog = app.catalog().await?;
    let views = view_all(&app.documents, &app.sources, app.store.as_ref()).await.or_raise(|| ErrorKind::Library)?;
    let exported =
        shelfmark_render::export(&target, &pages, &styles, &catalog, &views).await.or_raise(|| ErrorKind::Render)?;
    Ok(exported.pages)
}

fn report(out: &mut impl Write, outcome: Outcome, done: &str) -> Result<()> {
    let message = match outcome {
        Outcome::Completed => done,
        Outcome::Cancelled => "Cancelled, nothing was changed.",
    };
    writeln!(out, "{message}").or_raise(|| ErrorKind::Output)
}
