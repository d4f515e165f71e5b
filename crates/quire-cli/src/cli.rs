use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quire_types::{Address, BookId, Price};

#[derive(Parser)]
#[command(
    name = "quire",
    about = "Quire: publish, browse, and buy books on a mock marketplace",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the marketplace state (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./quire.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a file in the content store and print its URI
    Upload(UploadArgs),
    /// Publish a book
    Publish(PublishArgs),
    /// List published books
    List(ListArgs),
    /// Show a book as a given viewer would see it
    Show(ShowArgs),
    /// Buy a book with a mock wallet connected as the buyer
    Buy(BuyArgs),
    /// Check whether an address owns a book
    Owned(OwnedArgs),
    /// Show an author's profile
    Profile(ProfileArgs),
    /// Publish the sample books into an empty catalog
    Seed,
}

#[derive(Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    /// Name used in the URI (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct PublishArgs {
    #[arg(long)]
    pub author: Address,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub price: Price,
    /// Cover image URI
    #[arg(long)]
    pub cover: String,
    /// Book content URI
    #[arg(long)]
    pub content: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub author: Option<Address>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: BookId,
    #[arg(long)]
    pub viewer: Option<Address>,
}

#[derive(Args)]
pub struct BuyArgs {
    pub id: BookId,
    #[arg(long)]
    pub buyer: Address,
}

#[derive(Args)]
pub struct OwnedArgs {
    pub id: BookId,
    pub address: Address,
}

#[derive(Args)]
pub struct ProfileArgs {
    pub address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_publish() {
        let cli = Cli::try_parse_from([
            "quire",
            "--data-dir",
            "/tmp/q",
            "publish",
            "--author",
            "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            "--title",
            "T",
            "--description",
            "D",
            "--price",
            "1.5",
            "--cover",
            "https://mock-ipfs.local/a/c.png",
            "--content",
            "https://mock-ipfs.local/b/b.pdf",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/q")));
        match cli.command {
            Command::Publish(args) => {
                assert_eq!(args.author.as_str(), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
                assert_eq!(args.price.to_string(), "1.5");
            }
            _ => panic!("expected publish"),
        }
    }

    #[test]
    fn rejects_bad_address_and_price() {
        assert!(Cli::try_parse_from(["quire", "profile", "0x123"]).is_err());
        assert!(Cli::try_parse_from([
            "quire",
            "buy",
            "1",
            "--buyer",
            "nope"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "quire",
            "publish",
            "--author",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "--title",
            "T",
            "--description",
            "D",
            "--price",
            "-1",
            "--cover",
            "https://a/b",
            "--content",
            "https://a/c",
        ])
        .is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quire", "list", "--format", "json", "-v"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }
}
