use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ServerSection;

const SYSTEM_TOKENS_HELP: &str = "Tokens: ssm, group:NAME, channel:LABEL, search:[FIELD:]QUERY, \
a system id or a system name.
Search fields: id, name, ip, hostname, device, vendor, driver, uuid";

const ERRATA_TOKENS_HELP: &str =
    "Tokens: search:QUERY (CVE-... asks the server) or an advisory name. No tokens selects all errata.";

/// Command shell for Spacewalk and Uyuni systems-management servers
#[derive(Parser)]
#[command(name = "spacesh")]
#[command(version, propagate_version = true)]
#[command(about = "Command shell for Spacewalk and Uyuni systems-management servers")]
pub struct Cli {
    /// Output format for command results
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Show more log output (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    /// Server to connect to
    #[arg(short, long, env = "SPACESH_SERVER", global = true)]
    pub server: Option<String>,

    /// Username to log in with
    #[arg(short, long, env = "SPACESH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password to log in with (skips any cached session)
    #[arg(short, long, env = "SPACESH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Talk plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    pub nossl: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection settings given on the command line
    pub fn overrides(&self) -> ServerSection {
        ServerSection {
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            nossl: self.nossl.then_some(true),
        }
    }

    /// Log level implied by `-q` and `-d`
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.debug {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored, human-readable output
    #[default]
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Available commands
#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
pub enum Commands {
    /// Connect to a server
    Login(LoginArgs),

    /// Disconnect from the server and clear the caches
    Logout,

    /// Invalidate the system, package and errata caches
    ClearCaches,

    /// Show cache sizes and expiry times
    CacheStatus,

    /// Print the name of the logged in user
    Whoami,

    /// Print the name of the server
    Whoamitalkingto,

    /// Print the server API version
    GetApiversion,

    /// Print the server product version
    GetServerversion,

    /// Print the current session
    GetSession,

    /// Print the id of a system
    SystemId(NameArgs),

    /// Print the name of a system
    SystemName(IdArgs),

    /// Print the ids of a package build (name-[epoch:]version-release.arch)
    PackageId(NameArgs),

    /// Print the long name of a package
    PackageName(IdArgs),

    /// Print the id of an erratum
    ErratumId(NameArgs),

    /// Print the advisory name of an erratum
    ErratumName(IdArgs),

    /// Expand system selection tokens into systems
    #[command(after_help = SYSTEM_TOKENS_HELP)]
    ExpandSystems(SystemTokens),

    /// Expand errata selection tokens into advisories
    #[command(after_help = ERRATA_TOKENS_HELP)]
    ExpandErrata(ErrataTokens),

    /// List base software channels
    ListBasechannels,

    /// List child software channels
    ListChildchannels(ChildChannelArgs),

    /// Add systems to the working set
    #[command(after_help = SYSTEM_TOKENS_HELP)]
    SsmAdd(SystemTokens),

    /// Remove systems from the working set
    #[command(after_help = SYSTEM_TOKENS_HELP)]
    SsmRemove(SystemTokens),

    /// List the working set
    SsmList,

    /// Empty the working set
    SsmClear,
}

/// Arguments for the login command
#[derive(Args)]
pub struct LoginArgs {
    /// Username (defaults to the configured or cached one)
    pub username: Option<String>,

    /// Server (defaults to the configured one)
    pub server: Option<String>,
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: i64,
}

/// System selection tokens
#[derive(Args)]
pub struct SystemTokens {
    #[arg(required = true)]
    pub tokens: Vec<String>,
}

/// Errata selection tokens
#[derive(Args)]
pub struct ErrataTokens {
    pub tokens: Vec<String>,
}

/// Arguments for the list_childchannels command
#[derive(Args)]
pub struct ChildChannelArgs {
    /// Only children of this base channel
    #[arg(long)]
    pub parent: Option<String>,
}
