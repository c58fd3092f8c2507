use clap::Parser;
use colored::{control::set_override, Colorize};
use is_terminal::IsTerminal;

use spacesh::cli::args::{Cli, Commands};
use spacesh::cli::{commands, Shell};
use spacesh::config::{Config, Paths};
use spacesh::error::ShellError;
use spacesh::session::SessionManager;

fn main() {
    // Respect NO_COLOR environment variable (https://no-color.org/)
    // Also disable colors when stdout is not a terminal (for piping)
    if std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal() {
        set_override(false);
    }

    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<(), ShellError> {
    let cli = Cli::parse();
    let format = cli.output;

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let paths = Paths::new()?;
    let config = Config::load_from(&paths)?;
    log::debug!("Loaded configuration from {}", paths.config_file.display());

    let session = SessionManager::new(paths, config, cli.overrides());
    let mut shell = Shell::new(session);

    let output = match &cli.command {
        Commands::Login(args) => commands::login(&mut shell, args, format)?,
        Commands::Logout => commands::logout(&mut shell, format)?,

        // Everything else runs against an implicit login
        command => {
            shell.ensure_login()?;

            match command {
                Commands::ClearCaches => commands::clear_caches(&mut shell, format)?,
                Commands::CacheStatus => commands::cache_status(&shell, format)?,
                Commands::Whoami => commands::whoami(&shell, format)?,
                Commands::Whoamitalkingto => commands::whoamitalkingto(&shell, format)?,
                Commands::GetApiversion => commands::get_apiversion(&shell, format)?,
                Commands::GetServerversion => commands::get_serverversion(&shell, format)?,
                Commands::GetSession => commands::get_session(&shell, format)?,
                Commands::SystemId(args) => commands::system_id(&mut shell, args, format)?,
                Commands::SystemName(args) => commands::system_name(&mut shell, args, format)?,
                Commands::PackageId(args) => commands::package_id(&mut shell, args, format)?,
                Commands::PackageName(args) => commands::package_name(&mut shell, args, format)?,
                Commands::ErratumId(args) => commands::erratum_id(&mut shell, args, format)?,
                Commands::ErratumName(args) => commands::erratum_name(&mut shell, args, format)?,
                Commands::ExpandSystems(args) => commands::expand_systems(&mut shell, args, format)?,
                Commands::ExpandErrata(args) => commands::expand_errata(&mut shell, args, format)?,
                Commands::ListBasechannels => commands::list_basechannels(&mut shell, format)?,
                Commands::ListChildchannels(args) => commands::list_childchannels(&mut shell, args, format)?,
                Commands::SsmAdd(args) => commands::ssm_add(&mut shell, args, format)?,
                Commands::SsmRemove(args) => commands::ssm_remove(&mut shell, args, format)?,
                Commands::SsmList => commands::ssm_list(&mut shell, format)?,
                Commands::SsmClear => commands::ssm_clear(&mut shell, format)?,
                Commands::Login(_) | Commands::Logout => unreachable!(), // Handled above
            }
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
