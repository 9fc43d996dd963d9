use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use diesel::SqliteConnection;
use serde::Serialize;

use library_core::catalog::{CatalogRepo, SearchField};
use library_core::circulation::CirculationRepo;
use library_core::config::{self, LibraryConfig};
use library_core::forms::{BookForm, IssueForm, MemberForm, parse_id};
use library_core::membership::MembershipRepo;
use library_core::models::{Book, LoanTransaction, Member};
use library_core::repo::SqliteRepo;
use library_core::{LibraryError, db, logging};

#[derive(Parser)]
#[command(version, about = "Library Manager CLI")]
struct Cli {
    /// TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Database path or sqlite: URL; wins over the config file and DATABASE_URL
    #[arg(long, value_name = "URL", global = true)]
    db: Option<String>,
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Catalog: books and copies
    Book(BookCmd),
    /// Membership
    Member(MemberCmd),
    /// Circulation: issue and return
    Loan(LoanCmd),
}

#[derive(Args)]
struct BookCmd {
    #[command(subcommand)]
    sub: BookSub,
}

#[derive(Args)]
struct BookFields {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long, default_value = "")]
    isbn: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Copies owned (blank = 1)
    #[arg(long, default_value = "")]
    quantity: String,
}

impl From<BookFields> for BookForm {
    fn from(f: BookFields) -> Self {
        BookForm {
            title: f.title,
            author: f.author,
            isbn: f.isbn,
            category: f.category,
            quantity: f.quantity,
        }
    }
}

#[derive(Subcommand)]
enum BookSub {
    Add(BookFields),
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    List,
    Search {
        /// title | author | isbn | category
        #[arg(long, default_value = "title")]
        by: String,
        term: String,
    },
}

#[derive(Args)]
struct MemberCmd {
    #[command(subcommand)]
    sub: MemberSub,
}

#[derive(Args)]
struct MemberFields {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
}

impl From<MemberFields> for MemberForm {
    fn from(f: MemberFields) -> Self {
        MemberForm {
            name: f.name,
            email: f.email,
            phone: f.phone,
        }
    }
}

#[derive(Subcommand)]
enum MemberSub {
    Add(MemberFields),
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: MemberFields,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    List,
}

#[derive(Args)]
struct LoanCmd {
    #[command(subcommand)]
    sub: LoanSub,
}

#[derive(Subcommand)]
enum LoanSub {
    Issue {
        #[arg(long)]
        book: String,
        #[arg(long)]
        member: String,
        /// Loan period (blank = configured default)
        #[arg(long, default_value = "")]
        days: String,
    },
    Return {
        #[arg(long)]
        id: String,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    List,
}

struct Output {
    json: bool,
    today: NaiveDate,
}

impl Output {
    fn rows<T: Serialize>(&self, rows: &[T], line: impl Fn(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(rows)?);
        } else if rows.is_empty() {
            println!("(none)");
        } else {
            for r in rows {
                println!("{}", line(r));
            }
        }
        Ok(())
    }

    fn one<T: Serialize>(&self, row: &T, line: impl Fn(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(row)?);
        } else {
            println!("{}", line(row));
        }
        Ok(())
    }

    fn done(&self, msg: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "ok": msg }));
        } else {
            println!("{msg}");
        }
    }

    fn book(b: &Book) -> String {
        format!(
            "#{:<4} {} by {} | isbn {} | {} | {}/{} available",
            b.id,
            b.title,
            b.author,
            b.isbn.as_deref().unwrap_or("-"),
            b.category.as_deref().unwrap_or("-"),
            b.available,
            b.quantity
        )
    }

    fn member(m: &Member) -> String {
        format!(
            "#{:<4} {} | {} | {} | joined {}",
            m.id,
            m.name,
            m.email.as_deref().unwrap_or("-"),
            m.phone.as_deref().unwrap_or("-"),
            m.join_date
        )
    }

    fn loan(&self, t: &LoanTransaction) -> String {
        let id_or_dash = |v: Option<i32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        let mut line = format!(
            "#{:<4} book {} -> member {} | issued {} due {} | {}",
            t.id,
            id_or_dash(t.book_id),
            id_or_dash(t.member_id),
            t.issue_date,
            t.due_date,
            t.status
        );
        if let Some(r) = &t.return_date {
            line.push_str(&format!(" {r}"));
        }
        if t.is_overdue(self.today) {
            line.push_str(" [OVERDUE]");
        }
        line
    }
}

fn dispatch(
    cmd: Cmd,
    conn: &mut SqliteConnection,
    repo: &SqliteRepo,
    cfg: &LibraryConfig,
    out: &Output,
) -> Result<()> {
    match cmd {
        Cmd::Book(BookCmd { sub }) => match sub {
            BookSub::Add(fields) => {
                let draft = BookForm::from(fields).parse()?;
                out.one(&repo.add_book(conn, &draft)?, Output::book)
            }
            BookSub::Update { id, fields } => {
                let id = parse_id("book id", &id)?;
                let draft = BookForm::from(fields).parse()?;
                out.one(&repo.update_book(conn, id, &draft)?, Output::book)
            }
            BookSub::Delete { id } => {
                let id = parse_id("book id", &id)?;
                repo.delete_book(conn, id)?;
                out.done(&format!("book {id} deleted"));
                Ok(())
            }
            BookSub::Show { id } => {
                let id = parse_id("book id", &id)?;
                out.one(&repo.get_book(conn, id)?, Output::book)
            }
            BookSub::List => out.rows(&repo.list_books(conn)?, Output::book),
            BookSub::Search { by, term } => {
                let field: SearchField = by
                    .parse()
                    .map_err(|e: anyhow::Error| LibraryError::validation(e.to_string()))?;
                out.rows(&repo.search_books(conn, field, &term)?, Output::book)
            }
        },
        Cmd::Member(MemberCmd { sub }) => match sub {
            MemberSub::Add(fields) => {
                let draft = MemberForm::from(fields).parse()?;
                out.one(&repo.add_member(conn, &draft)?, Output::member)
            }
            MemberSub::Update { id, fields } => {
                let id = parse_id("member id", &id)?;
                let draft = MemberForm::from(fields).parse()?;
                out.one(&repo.update_member(conn, id, &draft)?, Output::member)
            }
            MemberSub::Delete { id } => {
                let id = parse_id("member id", &id)?;
                repo.delete_member(conn, id)?;
                out.done(&format!("member {id} deleted"));
                Ok(())
            }
            MemberSub::Show { id } => {
                let id = parse_id("member id", &id)?;
                out.one(&repo.get_member(conn, id)?, Output::member)
            }
            MemberSub::List => out.rows(&repo.list_members(conn)?, Output::member),
        },
        Cmd::Loan(LoanCmd { sub }) => match sub {
            LoanSub::Issue { book, member, days } => {
                let req = IssueForm {
                    book_id: book,
                    member_id: member,
                    due_days: days,
                }
                .parse(cfg.loans.default_due_days)?;
                out.one(&repo.issue_book(conn, &req)?, |t| out.loan(t))
            }
            LoanSub::Return { id } => {
                let id = parse_id("transaction id", &id)?;
                out.one(&repo.return_book(conn, id)?, |t| out.loan(t))
            }
            LoanSub::Show { id } => {
                let id = parse_id("transaction id", &id)?;
                out.one(&repo.get_transaction(conn, id)?, |t| out.loan(t))
            }
            LoanSub::List => out.rows(&repo.list_transactions(conn)?, |t| out.loan(t)),
        },
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging("warn");

    // 1) Config file + env, then the --db flag
    let mut cfg = config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.db {
        cfg.database_url = url;
    }

    // 2) Open DB and bring the schema up to date
    let mut conn = db::open(&cfg.database_url)?;

    // 3) Run the command
    let repo = SqliteRepo::new();
    let out = Output {
        json: cli.json,
        today: repo.today(),
    };
    match dispatch(cli.cmd, &mut conn, &repo, &cfg, &out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            // Anything that is not a service error is an infrastructure failure.
            let Some(lib_err) = err.downcast_ref::<LibraryError>() else {
                return Err(err);
            };
            let report = lib_err.report();
            if out.json {
                eprintln!("{}", serde_json::to_string(&report)?);
            } else {
                eprintln!("error: {}", report.message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
