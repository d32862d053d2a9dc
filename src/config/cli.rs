use crate::config::settings::{Settings, SettingsOverrides};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "searchdesk")]
#[command(about = "Admin console for a Typesense search service")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a searchdesk.toml file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub host: Option<String>,

    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "http or https")]
    pub protocol: Option<String>,

    #[arg(long, global = true, env = "TYPESENSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true)]
    pub max_file_size_mb: Option<usize>,

    #[arg(long, global = true, help = "Reject schemas with unknown field types")]
    pub strict_types: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check whether the service is healthy
    Health,
    /// Show server metrics
    Metrics,
    #[command(subcommand)]
    Collections(CollectionsCommand),
    #[command(subcommand)]
    Documents(DocumentsCommand),
    #[command(subcommand)]
    Synonyms(SynonymsCommand),
    #[command(subcommand)]
    Overrides(OverridesCommand),
    #[command(subcommand)]
    Keys(KeysCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum CollectionsCommand {
    List,
    Get {
        name: String,
    },
    /// Create a collection from a JSON schema file
    Create {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Add or drop fields; the file holds a JSON array of fields
    Update {
        name: String,
        #[arg(long)]
        fields: PathBuf,
    },
    Delete {
        name: String,
    },
    /// List the field types a schema may use
    Types,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DocumentsCommand {
    /// Validate a CSV, JSON or spreadsheet file and import it
    Import {
        collection: String,
        file: String,
        #[arg(long, help = "Validate only, do not submit")]
        dry_run: bool,
    },
    /// Create or update one document, given as JSON or @file
    Upsert {
        collection: String,
        #[arg(long)]
        document: String,
    },
    Delete {
        collection: String,
        id: String,
    },
    Search {
        collection: String,
        q: String,
        #[arg(long)]
        query_by: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SynonymArgs {
    pub collection: String,
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, help = "One-way synonym root")]
    pub root: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub synonyms: Vec<String>,
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SynonymsCommand {
    List { collection: String },
    Get { collection: String, id: String },
    Upsert(SynonymArgs),
    Delete { collection: String, id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum OverridesCommand {
    List {
        collection: String,
    },
    Get {
        collection: String,
        id: String,
    },
    /// The form is given as JSON or @file
    Upsert {
        collection: String,
        #[arg(long)]
        form: String,
    },
    Delete {
        collection: String,
        id: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum KeysCommand {
    List,
    Get {
        id: u64,
    },
    Create {
        #[arg(long)]
        description: String,
        #[arg(long, value_delimiter = ',')]
        actions: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,
        #[arg(long, help = "Expiry as Unix seconds")]
        expires_at: i64,
        #[arg(long)]
        autodelete: bool,
    },
    Delete {
        id: Option<u64>,
    },
    /// List the actions a key may be granted
    Actions,
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            host: self.host.clone(),
            port: self.port,
            protocol: self.protocol.clone(),
            api_key: self.api_key.clone(),
            timeout_seconds: self.timeout_seconds,
            max_file_size_mb: self.max_file_size_mb,
            strict_types: self.strict_types,
            verbose: self.verbose,
            json_logs: self.json_logs,
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        let path = self.config.as_ref().map(|path| path.to_string_lossy().to_string());
        Settings::load(path.as_deref(), self.overrides())
    }
}
