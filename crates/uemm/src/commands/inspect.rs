use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{load_config, resolve_config_path};
use camino::Utf8PathBuf;
use colored::Colorize;
use ue_conflict::discovery::resolve_cas;
use ue_conflict::{ArchiveAdapter, DiagnosticLog, ScanConfig};
use ue_container::ContainerKind;

pub struct InspectContainerArgs {
    pub config_path: Option<String>,
    pub file_path: String,
    pub engine_version: Option<String>,
    pub limit: usize,
}

/// Mount a single container through the strategy chain and show what happened.
pub fn inspect_container(args: InspectContainerArgs) -> miette::Result<()> {
    let config_path = resolve_config_path(args.config_path.as_deref())?;
    let cfg = load_config(&config_path)?;
    let mut scan_config = ScanConfig::from_app_config(&cfg);
    if let Some(tag) = &args.engine_version {
        scan_config.engine_version = tag
            .parse()
            .map_err(|_| CliError::invalid_engine_version(tag.clone()))?;
    }

    let path = Utf8PathBuf::from(&args.file_path);
    if !path.is_file() {
        return Err(CliError::file_not_found(path).into());
    }
    let kind = ContainerKind::from_path(&path)
        .ok_or_else(|| CliError::NotAContainer { path: path.clone() })?;
    let cas_path = match kind {
        ContainerKind::IoStore => resolve_cas(&path).0,
        ContainerKind::Pak => None,
    };

    println_pad!(
        "{} {} {}",
        "📦 Container:".bright_blue().bold(),
        path.as_str().bright_cyan().bold(),
        format!("({:?}, engine {})", kind, scan_config.engine_version).dimmed()
    );
    if let Some(cas) = &cas_path {
        println_pad!("{} {}", "Payload:".bright_green(), cas);
    }

    let adapter = ArchiveAdapter::default();
    let mut log = DiagnosticLog::new();
    let mounted = adapter.try_mount(
        &path,
        cas_path.as_deref(),
        scan_config.engine_version,
        scan_config.aes_key.as_ref(),
        "inspect",
        &mut log,
    );

    let mounted = match mounted {
        Ok(mounted) => mounted,
        Err(failure) => {
            println_pad!("\n{}", "✗ Every strategy failed:".bright_red().bold());
            for attempt in &failure.attempts {
                println_pad!("   {} {}", "•".bright_red(), attempt);
            }
            return Err(CliError::MountFailed { path }.into());
        }
    };

    println_pad!(
        "{} {}",
        "Strategy:".bright_green(),
        mounted.strategy().bright_white().bold()
    );
    println_pad!(
        "{} {}",
        "Backing file:".bright_green(),
        mounted.backing_file().unwrap_or("(unknown)")
    );

    match mounted.list_files() {
        Ok(files) => {
            println_pad!(
                "\n{}",
                format!("🧾 Entries ({}):", files.len()).bright_magenta().bold()
            );
            for file in files.iter().take(args.limit) {
                println_pad!("   {} {}", "•".bright_cyan(), file);
            }
            if files.len() > args.limit {
                println_pad!("   {}", format!("... {} more", files.len() - args.limit).dimmed());
            }
        }
        Err(e) => {
            println_pad!(
                "\n{} {}",
                "✗ Cannot list entries:".bright_red().bold(),
                e.to_string().bright_yellow()
            );
            if mounted.needs_key() {
                println_pad!(
                    "  {} Set the key with 'uemm config set-aes-key <hex>'",
                    "•".bright_cyan()
                );
            }
        }
    }

    Ok(())
}
