use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    inspect_container, list_mod_assets, reset_config, scan_mods, set_config_field, show_config,
    ConfigField, InspectContainerArgs, ListModAssetsArgs, ScanModsArgs,
};
use miette::Result;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config.json (defaults to the one next to the executable)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log every discovery, mount and attribution decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a mod library for assets provided by more than one mod
    Scan {
        /// Enabled mods root (defaults to ModPath from the config)
        #[arg(short, long)]
        mods_dir: Option<String>,

        /// Backup library root (defaults to BackupPath from the config)
        #[arg(short, long)]
        backup_dir: Option<String>,

        /// Also scan backed-up mods
        #[arg(short, long)]
        all: bool,

        /// Index mods in parallel
        #[arg(long)]
        parallel: bool,

        /// Write a ConflictReport_*.json into the mods root
        #[arg(long)]
        report: bool,

        /// Write the report into this directory instead
        #[arg(long)]
        report_dir: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Print the diagnostic log after the summary
        #[arg(long)]
        diagnostics: bool,
    },
    /// List the assets a single mod directory provides
    List {
        /// The mod directory
        mod_dir: String,

        /// Print the diagnostic log after the listing
        #[arg(long)]
        diagnostics: bool,
    },
    /// Mount one container and show which strategy opened it
    Inspect {
        /// The .pak or .utoc file
        file_path: String,

        /// Engine version to mount with (overrides config and environment)
        #[arg(short, long)]
        engine: Option<String>,

        /// Entries to print
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Show or change config.json
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration and what it resolves to
    Show,
    /// Set UEVersion (e.g. UE4_27, UE5_1)
    SetUeVersion { version: String },
    /// Set AesKey (64 hex characters, optional 0x prefix)
    SetAesKey { key: String },
    /// Set GameBasePath (the directory containing Content/Paks)
    SetGameBase { path: String },
    /// Set ProjectName (its Content is reported under /Game)
    SetProjectName { name: String },
    /// Set ModPath (enabled mods root)
    SetModPath { path: String },
    /// Set BackupPath (backup library root)
    SetBackupPath { path: String },
    /// Clear every setting this tool owns
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn main() -> Result<()> {
    let args = parse_args();
    utils::init_tracing(args.verbose);

    let config_path = args.config;
    match args.command {
        Commands::Scan {
            mods_dir,
            backup_dir,
            all,
            parallel,
            report,
            report_dir,
            json,
            diagnostics,
        } => scan_mods(ScanModsArgs {
            config_path,
            mods_dir,
            backup_dir,
            all,
            parallel,
            report,
            report_dir,
            json,
            diagnostics,
        }),
        Commands::List {
            mod_dir,
            diagnostics,
        } => list_mod_assets(ListModAssetsArgs {
            config_path,
            mod_dir,
            diagnostics,
        }),
        Commands::Inspect {
            file_path,
            engine,
            limit,
        } => inspect_container(InspectContainerArgs {
            config_path,
            file_path,
            engine_version: engine,
            limit,
        }),
        Commands::Config { action } => {
            let config_path = config_path.as_deref();
            match action {
                ConfigCommands::Show => show_config(config_path),
                ConfigCommands::SetUeVersion { version } => {
                    set_config_field(config_path, ConfigField::UeVersion(version))
                }
                ConfigCommands::SetAesKey { key } => {
                    set_config_field(config_path, ConfigField::AesKey(key))
                }
                ConfigCommands::SetGameBase { path } => {
                    set_config_field(config_path, ConfigField::GameBasePath(path))
                }
                ConfigCommands::SetProjectName { name } => {
                    set_config_field(config_path, ConfigField::ProjectName(name))
                }
                ConfigCommands::SetModPath { path } => {
                    set_config_field(config_path, ConfigField::ModPath(path))
                }
                ConfigCommands::SetBackupPath { path } => {
                    set_config_field(config_path, ConfigField::BackupPath(path))
                }
                ConfigCommands::Reset => reset_config(config_path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["uemm", "scan", "--all", "--verbose", "--config", "c.json"])
                .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("c.json"));
        assert!(matches!(args.command, Commands::Scan { all: true, .. }));
    }

    #[test]
    fn set_project_name_takes_one_value() {
        let args = Args::try_parse_from(["uemm", "config", "set-project-name", "Hero"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Config {
                action: ConfigCommands::SetProjectName { ref name }
            } if name == "Hero"
        ));
    }
}
