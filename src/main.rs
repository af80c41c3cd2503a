//! `bodo`: browse and maintain the chart of accounts from a terminal.
//!
//! Reads ~/.bodo/config.json (see `bodo_lib::config`). Set `RUST_LOG=debug`
//! to see every request.

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use bodo_lib::api::accounts::{AccountsApi, RootQuery};
use bodo_lib::ledger::{Ledger, TransactionQuery};
use bodo_lib::tree::render::{
    account_columns, format_amount, pagination_summary, render_table, select_columns,
};
use bodo_lib::tree::{AccountTree, ExpandAction, Forest};
use bodo_lib::{AccountId, ApiClient, ApiError, Notice, SessionContext, ViewError};

#[derive(Parser)]
#[command(name = "bodo", about = "Chart-of-accounts client for the Bodo2 backend")]
struct Cli {
    /// Override the configured space
    #[arg(long, global = true)]
    space: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List root accounts, expanding the given ids
    Accounts {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        /// Expand this account (repeatable, applied in order)
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<AccountId>,
        /// Columns to show: code, name, type, balance
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Show one account with its nested children
    Account { id: AccountId },
    /// List account types
    Types,
    /// Delete accounts, then list the first page again
    Delete {
        #[arg(required = true)]
        ids: Vec<AccountId>,
    },
    /// Show the ledger of one account
    Ledger {
        id: AccountId,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match notice_for(&e) {
                Some(notice) => {
                    eprintln!("error: {}", notice.message);
                    if !notice.recovery_suggestion.is_empty() {
                        eprintln!("hint: {}", notice.recovery_suggestion);
                    }
                }
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn notice_for(err: &anyhow::Error) -> Option<Notice> {
    if let Some(view) = err.downcast_ref::<ViewError>() {
        return Some(Notice::from(view));
    }
    err.downcast_ref::<ApiError>().map(Notice::from)
}

async fn run(cli: Cli) -> Result<()> {
    let config = bodo_lib::load_config()?;
    let space = cli.space.or_else(|| config.space_id.clone());
    let client = ApiClient::new(&config, SessionContext::with_space(space))?;
    let api = AccountsApi::new(client);

    match cli.command {
        Command::Accounts {
            search,
            page,
            page_size,
            expand,
            columns,
        } => {
            let page_size = page_size.unwrap_or(config.page_size);
            let mut tree = AccountTree::new(page_size);
            tree.load(
                &api,
                RootQuery {
                    page,
                    page_size,
                    keyword: search,
                },
            )
            .await?;

            for id in &expand {
                match tree.begin_expand(id) {
                    ExpandAction::Fetch(ticket) => {
                        let result = api.list_children(&ticket.id).await;
                        // A failed row stays collapsed; report it and keep going.
                        if let Err(e) = tree.complete_expand(ticket, result) {
                            eprintln!("warning: {}", Notice::from(&e).message);
                        }
                    }
                    ExpandAction::NotFound => {
                        eprintln!("warning: account {} is not on this page", id);
                    }
                    ExpandAction::Expanded | ExpandAction::Pending => {}
                }
            }

            print_tree(&tree, &columns);
        }
        Command::Account { id } => {
            let Some(account) = api.get_account(&id).await? else {
                anyhow::bail!("account {} not found", id);
            };
            println!("{} {} ({})", account.code, account.name, account.type_name());
            if let Some(notes) = account.notes.as_deref().filter(|n| !n.is_empty()) {
                println!("  {}", notes);
            }
            match &account.children {
                Some(children) => print_children(children, 1),
                None => println!("  (children not loaded)"),
            }
        }
        Command::Types => {
            for t in api.account_types().await? {
                println!("{}: {}", t.id, t.name);
            }
        }
        Command::Delete { ids } => {
            let mut tree = AccountTree::new(config.page_size);
            let deleted = tree.delete(&api, &ids).await?;
            println!("{}", Notice::success(format!("Deleted {} account(s)", deleted)).message);
            print_tree(&tree, &[]);
        }
        Command::Ledger {
            id,
            from,
            to,
            page,
            per_page,
        } => {
            let mut query = TransactionQuery::new(id);
            query.start_date = from;
            query.end_date = to;
            query.page = page;
            query.per_page = per_page;

            let ledger = Ledger::from_page(&api.transactions(&query).await?);
            println!("Opening balance: {}", format_amount(ledger.initial_balance));
            for line in &ledger.lines {
                println!(
                    "{:<10}  {:<12}  {:>14}  {:>14}  {:>16}  {}",
                    line.date.as_deref().unwrap_or(""),
                    line.number.as_deref().unwrap_or(""),
                    format_amount(line.debit),
                    format_amount(line.credit),
                    format_amount(line.running_balance),
                    line.description,
                );
            }
            println!(
                "Page debit {}  credit {}  closing balance {}  ({} lines total)",
                format_amount(ledger.page_debit),
                format_amount(ledger.page_credit),
                format_amount(ledger.final_balance),
                ledger.total
            );
        }
    }
    Ok(())
}

fn print_tree(tree: &AccountTree, columns: &[String]) {
    let columns = select_columns(account_columns(), columns);
    print!("{}", render_table(&tree.rows(), &columns));
    println!(
        "{}",
        pagination_summary(tree.query(), tree.forest().len(), tree.total())
    );
}

fn print_children(children: &Forest, depth: usize) {
    for child in children {
        println!("{}{} {}", "  ".repeat(depth), child.code, child.name);
        if let Some(grandchildren) = &child.children {
            print_children(grandchildren, depth + 1);
        }
    }
}
