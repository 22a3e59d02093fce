use clap::{Parser, Subcommand};
use std::path::PathBuf;
use txtapp::model::Bucket;

/// Returns the version string, with the git hash for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0 (dev abc1234)"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{} (dev {})", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "txt",
    bin_name = "txt",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Notes and clipboard history with temporary and permanent buckets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Folder holding the database (overrides TXT_DATA_DIR and txt.toml)
    #[arg(long, global = true, value_name = "FOLDER", help_heading = "Options")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a temporary message (reads stdin when no words are given)
    #[command(alias = "a", display_order = 1)]
    Add {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },

    /// List a bucket, newest first
    #[command(alias = "ls", display_order = 2)]
    List {
        /// temporary, permanent or alias
        #[arg(default_value = "temporary")]
        bucket: Bucket,

        /// Continue after this ID (or alias, for the alias bucket)
        #[arg(long, value_name = "CURSOR", conflicts_with = "from")]
        after: Option<String>,

        /// Start at a short index, e.g. T20
        #[arg(long, value_name = "INDEX")]
        from: Option<String>,

        /// Page size (0 uses the configured page size)
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: i64,
    },

    /// Newest temporary and permanent messages
    #[command(alias = "r", display_order = 3)]
    Recent {
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: i64,
    },

    /// Show a message in full
    #[command(alias = "v", display_order = 10)]
    View {
        /// Short index, alias or ID
        token: String,
    },

    /// Delete a message
    #[command(alias = "rm", display_order = 11)]
    Delete { token: String },

    /// Move a message between temporary and permanent
    #[command(alias = "t", display_order = 12)]
    Toggle { token: String },

    /// Set or remove the alias of a message
    #[command(display_order = 13)]
    Alias {
        token: String,

        #[arg(required_unless_present = "remove")]
        alias: Option<String>,

        /// Remove the alias instead
        #[arg(long, conflicts_with = "alias")]
        remove: bool,
    },

    /// Change the text and/or alias of a message
    #[command(alias = "e", display_order = 14)]
    Edit {
        token: String,

        /// New text
        #[arg(short, long)]
        msg: Option<String>,

        /// New alias ("" removes it)
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Case-insensitive search over message text
    #[command(alias = "s", display_order = 20)]
    Search {
        keyword: String,

        /// Buckets to search, in order (default: temporary then permanent)
        #[arg(short, long = "bucket", value_name = "BUCKET")]
        buckets: Vec<Bucket>,
    },

    /// List every alias
    #[command(display_order = 21)]
    Aliases,

    /// Number of entries in a bucket
    #[command(display_order = 22)]
    Count {
        #[arg(default_value = "temporary")]
        bucket: Bucket,
    },

    /// Show or change settings stored in the database
    #[command(display_order = 30)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },

    /// Show, renew or check the access key
    #[command(display_order = 31)]
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Change the master password
    #[command(display_order = 32)]
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current settings
    Show,

    /// Change one setting
    Set {
        /// key-max-age, msg-size-limit, temp-limit, page-limit or time-offset
        key: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Show the current key
    Show {
        #[arg(short, long)]
        password: String,
    },

    /// Replace the key with a new random one
    New {
        #[arg(short, long)]
        password: String,
    },

    /// Check whether a key is valid
    Check { key: String },
}
