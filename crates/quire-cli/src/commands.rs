use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use quire_catalog::{Book, BookMetadata};
use quire_purchase::{MockWallet, PurchaseError};
use quire_sdk::{Access, MarketConfig, Marketplace, SdkError};
use quire_types::Price;
use serde::Serialize;

use crate::cli::*;

const DEFAULT_CONFIG_FILE: &str = "quire.toml";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let market = Marketplace::open(config).context("failed to open marketplace")?;
    let format = cli.format;
    match cli.command {
        Command::Upload(args) => cmd_upload(&market, args, format).await,
        Command::Publish(args) => cmd_publish(&market, args, format),
        Command::List(args) => cmd_list(&market, args, format),
        Command::Show(args) => cmd_show(&market, args, format),
        Command::Buy(args) => cmd_buy(&market, args, format).await,
        Command::Owned(args) => cmd_owned(&market, args, format),
        Command::Profile(args) => cmd_profile(&market, args, format),
        Command::Seed => cmd_seed(&market, format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<MarketConfig> {
    let mut config = match &cli.config {
        Some(path) => MarketConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => MarketConfig::load(DEFAULT_CONFIG_FILE)?,
        None => MarketConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn price_label(price: Price, symbol: &str) -> String {
    format!("{price} {symbol}")
}

fn print_book(market: &Marketplace, book: &Book) {
    println!(
        "{} {}  {}  {}",
        format!("#{}", book.id).yellow().bold(),
        book.title.bold(),
        price_label(book.price, &market.config().currency_symbol).green(),
        book.author.short().dimmed()
    );
}

async fn cmd_upload(market: &Marketplace, args: UploadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("file path has no file name")?,
    };
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let size = bytes.len();
    let uri = market.upload(&name, bytes).await?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "uri": uri, "bytes": size })),
        OutputFormat::Text => {
            println!("{} Stored {} bytes", "✓".green().bold(), size);
            println!("  URI: {}", uri.to_string().blue());
            Ok(())
        }
    }
}

fn cmd_publish(market: &Marketplace, args: PublishArgs, format: OutputFormat) -> anyhow::Result<()> {
    let metadata = BookMetadata::new(args.title, args.description, args.cover, args.content, args.price);
    let book = market.publish(&metadata, &args.author)?;
    match format {
        OutputFormat::Json => print_json(&book),
        OutputFormat::Text => {
            println!("{} Published", "✓".green().bold());
            print_book(market, &book);
            Ok(())
        }
    }
}

fn cmd_list(market: &Marketplace, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let books = match &args.author {
        Some(author) => market.books_by_author(author)?,
        None => market.books()?,
    };
    match format {
        OutputFormat::Json => print_json(&books),
        OutputFormat::Text => {
            if books.is_empty() {
                println!("No books published.");
            }
            for book in &books {
                print_book(market, book);
            }
            Ok(())
        }
    }
}

fn cmd_show(market: &Marketplace, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let view = market.open_reader(args.id, args.viewer.as_ref())?;
    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => {
            print_book(market, &view.book);
            println!("  By {}", view.author_display);
            println!("  {}", view.book.description);
            println!("  Cover: {}", view.book.cover_uri.blue());
            let access = match view.access {
                Access::Owner => "owner".cyan(),
                Access::Purchased => "purchased".green(),
                Access::Locked => "locked".red(),
            };
            println!("  Access: {}", access);
            match &view.content_uri {
                Some(uri) => println!("  Content: {}", uri.blue()),
                None => println!("  Content: {}", "purchase to read".dimmed()),
            }
            Ok(())
        }
    }
}

async fn cmd_buy(market: &Marketplace, args: BuyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let wallet = MockWallet::new(args.buyer);
    market.connect(&wallet).await?;
    let record = match market.purchase(args.id, &wallet).await {
        Ok(record) => record,
        Err(SdkError::Purchase(err @ PurchaseError::LedgerWrite { .. })) => {
            eprintln!("{} {}", "!".red().bold(), err);
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };
    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            println!("{} Purchased book {}", "✓".green().bold(), format!("#{}", record.book_id).yellow());
            println!("  Buyer: {}", record.buyer);
            println!("  Transaction: {}", record.transaction_proof.dimmed());
            Ok(())
        }
    }
}

fn cmd_owned(market: &Marketplace, args: OwnedArgs, format: OutputFormat) -> anyhow::Result<()> {
    market.book(args.id)?;
    let owned = market.has_purchased(args.id, &args.address)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "bookId": args.id,
            "address": args.address,
            "purchased": owned,
        })),
        OutputFormat::Text => {
            let verdict = if owned { "yes".green() } else { "no".red() };
            println!("{} owns #{}: {}", args.address.short(), args.id, verdict);
            Ok(())
        }
    }
}

fn cmd_profile(market: &Marketplace, args: ProfileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let profile = market.author_profile(&args.address)?;
    match format {
        OutputFormat::Json => print_json(&profile),
        OutputFormat::Text => {
            println!("{} ({})", profile.name.bold(), profile.address.short().dimmed());
            println!("  {}", profile.bio);
            let registered = if profile.is_registered { "registered".green() } else { "not registered".dimmed() };
            println!("  Status: {}", registered);
            for id in &profile.published_books {
                let book = market.book(*id)?;
                print!("  ");
                print_book(market, &book);
            }
            Ok(())
        }
    }
}

fn cmd_seed(market: &Marketplace, format: OutputFormat) -> anyhow::Result<()> {
    let books = market.seed_demo()?;
    match format {
        OutputFormat::Json => print_json(&books),
        OutputFormat::Text => {
            if books.is_empty() {
                println!("Catalog is not empty; nothing seeded.");
            } else {
                println!("{} Seeded {} books", "✓".green().bold(), books.len());
                for book in &books {
                    print_book(market, book);
                }
            }
            Ok(())
        }
    }
}
