use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{load_config, resolve_config_path};
use crate::utils::short_name;
use camino::Utf8PathBuf;
use colored::Colorize;
use ue_conflict::index::IndexSource;
use ue_conflict::{
    discover, resolve_display_name, ArchiveAdapter, AssetIndexBuilder, DiagnosticLog,
    ModCandidate, ScanConfig,
};

pub struct ListModAssetsArgs {
    pub config_path: Option<String>,
    pub mod_dir: String,
    pub diagnostics: bool,
}

/// Print the asset index of one mod directory, exactly as a scan would build it.
pub fn list_mod_assets(args: ListModAssetsArgs) -> miette::Result<()> {
    let config_path = resolve_config_path(args.config_path.as_deref())?;
    let cfg = load_config(&config_path)?;
    let scan_config = ScanConfig::from_app_config(&cfg);

    let mod_dir = Utf8PathBuf::from(&args.mod_dir);
    if !mod_dir.is_dir() {
        return Err(CliError::directory_not_found(mod_dir).into());
    }
    let real_name = short_name(&mod_dir).to_string();

    let mut log = DiagnosticLog::new();
    let reference = scan_config
        .game_base_path
        .as_ref()
        .map(|base| discover(&base.join("Content").join("Paks"), "base", &mut log));

    let adapter = ArchiveAdapter::default();
    let mut builder = AssetIndexBuilder::new(&adapter, &scan_config);
    if let Some(reference) = &reference {
        builder = builder.with_reference(reference);
    }
    let index = builder.build_index(&ModCandidate::enabled(&real_name), &mod_dir, &mut log);
    let display_name = resolve_display_name(&mod_dir).unwrap_or_else(|| real_name.clone());

    println_pad!(
        "{} {}",
        "📦 Mod:".bright_blue().bold(),
        display_name.bright_cyan().bold()
    );
    let source = match index.source() {
        IndexSource::Containers => format!("{} containers", index.containers_mounted()),
        IndexSource::LooseFiles => "loose files".to_string(),
        IndexSource::Empty => "nothing readable".to_string(),
    };
    println_pad!("{} {}", "Source:".bright_green(), source.bright_white());
    let stats = index.stats();
    if index.source() == IndexSource::Containers {
        println_pad!(
            "{} {} packages, {} kept, {} foreign, {} ambiguous",
            "Attribution:".bright_green(),
            stats.packages,
            stats.kept,
            stats.foreign,
            stats.ambiguous
        );
    }

    println_pad!(
        "\n{}",
        format!("🧾 Assets ({}):", index.len()).bright_magenta().bold()
    );
    for path in index.paths() {
        println_pad!("   {} {}", "•".bright_cyan(), path);
    }

    if args.diagnostics {
        println_pad!("\n{}", "Diagnostics:".bright_magenta().bold());
        for entry in log.entries() {
            println_pad!("{}", entry);
        }
    }

    Ok(())
}
