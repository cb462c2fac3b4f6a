use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use shoplist_core::{ItemFilter, ItemSort};

#[derive(Parser)]
#[command(name = "shoplist")]
#[command(about = "Keep an offline-first shopping list from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add an item to the list
    #[command(alias = "new")]
    Add {
        /// Item name
        #[arg(required = true)]
        name: Vec<String>,
        /// How many to buy
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(0..))]
        quantity: i64,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// List items
    #[command(alias = "ls")]
    List {
        /// Which items to show
        #[arg(long, value_enum, default_value_t = FilterArg::NotBought)]
        filter: FilterArg,
        /// Case-insensitive text to match in name or note
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order
        #[arg(long, value_enum, default_value_t = SortArg::CreatedDesc)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing item
    Edit {
        /// Item ID or unique ID prefix
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New quantity
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..))]
        quantity: Option<i64>,
        /// New note
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },
    /// Flip an item between bought and not bought
    Toggle {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Delete an item (removed from the store on the next sync)
    #[command(alias = "rm")]
    Delete {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Push pending changes to the remote
    Sync {
        /// Override the simulated failure probability (0.0 to 1.0)
        #[arg(long, value_name = "RATE")]
        failure_rate: Option<f64>,
    },
    /// Show how many changes are waiting to be synced
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FilterArg {
    All,
    Bought,
    NotBought,
}

impl From<FilterArg> for ItemFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Bought => Self::Bought,
            FilterArg::NotBought => Self::NotBought,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl From<SortArg> for ItemSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::CreatedAsc => Self::CreatedAtAsc,
            SortArg::CreatedDesc => Self::CreatedAtDesc,
            SortArg::UpdatedAsc => Self::UpdatedAtAsc,
            SortArg::UpdatedDesc => Self::UpdatedAtDesc,
        }
    }
}
