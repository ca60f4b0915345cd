use clap::{Parser, Subcommand};

/// docdex - Local full-text search for plain-text documents
#[derive(Parser, Debug)]
#[command(name = "docdex")]
#[command(about = "A local-first document search index with filesystem synchronization", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize docdex (create the base and cache directories)
    Init {
        /// Custom base directory (default: ~/.docdex)
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Scan a directory and bring the index up to date
    Sync {
        /// Path to the documents directory
        path: String,
        /// File extensions to index (repeatable; default: txt, md)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
        /// Custom base directory (default: ~/.docdex)
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Search the indexed documents
    Search {
        /// Search query
        query: String,
        /// Maximum number of results to return (default: 20)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Custom base directory (default: ~/.docdex)
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Watch a directory for changes and keep the index up to date
    Watch {
        /// Path to the documents directory
        path: String,
        /// File extensions to index (repeatable; default: txt, md)
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
        /// Seconds to sleep between change polls
        #[arg(long, default_value_t = 5)]
        interval: u64,
        /// Custom base directory (default: ~/.docdex)
        #[arg(long)]
        base_dir: Option<String>,
    },
}
