//! Command-line interface definition for Coachlog
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for history management, search, and configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coachlog - conversation history for your AI fitness coach
///
/// Inspect, search, and manage the locally stored coaching conversations.
#[derive(Parser, Debug, Clone)]
#[command(name = "coachlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Data directory override (defaults to the platform data dir)
    #[arg(short, long, env = "COACHLOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Coachlog
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Inspect and manage stored conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Search conversations by title and message text
    Search {
        /// Search query
        query: String,

        /// Maximum number of results to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Use the exact substring scan instead of the fuzzy index
        #[arg(long)]
        scan: bool,
    },

    /// Inspect and update the chat configuration
    Config {
        /// Config subcommand
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored conversations, most recent first
    List {
        /// Maximum number of conversations to list
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one conversation in full
    Show {
        /// Session id
        id: String,
    },

    /// Delete one conversation
    Delete {
        /// Session id
        id: String,
    },

    /// Delete every stored conversation
    Clear {
        /// Skip the confirmation requirement
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the current configuration
    Show,

    /// Update configuration fields
    Set {
        /// Maximum sessions shown by history list
        #[arg(long)]
        max_chats_in_drawer: Option<usize>,

        /// Hard cap on retained sessions
        #[arg(long)]
        max_chat_history: Option<usize>,

        /// Search-as-you-type debounce in milliseconds
        #[arg(long)]
        search_debounce_ms: Option<u64>,

        /// Autosave delay in milliseconds
        #[arg(long)]
        auto_save_interval_ms: Option<u64>,

        /// Whether the fuzzy search index is built
        #[arg(long)]
        enable_search_indexing: Option<bool>,
    },

    /// Restore the default configuration
    Reset,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
