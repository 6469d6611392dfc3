use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{load_config, resolve_config_path};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::IntoDiagnostic;
use std::sync::atomic::AtomicBool;
use ue_conflict::{
    enumerate_candidates, ConflictDetector, ConflictReport, ModConflictResult, ScanConfig,
    ScanOptions, ScanStage,
};

/// Conflicts printed before the list is cut short.
const MAX_LISTED_CONFLICTS: usize = 50;

pub struct ScanModsArgs {
    pub config_path: Option<String>,
    pub mods_dir: Option<String>,
    pub backup_dir: Option<String>,
    pub all: bool,
    pub parallel: bool,
    pub report: bool,
    pub report_dir: Option<String>,
    pub json: bool,
    pub diagnostics: bool,
}

pub fn scan_mods(args: ScanModsArgs) -> miette::Result<()> {
    let config_path = resolve_config_path(args.config_path.as_deref())?;
    let cfg = load_config(&config_path)?;
    let scan_config = ScanConfig::from_app_config(&cfg);

    let mods_root = args
        .mods_dir
        .map(Utf8PathBuf::from)
        .or_else(|| cfg.mod_path().map(|p| p.to_path_buf()))
        .ok_or(CliError::ModRootNotSet)?;
    if !mods_root.is_dir() {
        return Err(CliError::directory_not_found(mods_root).into());
    }
    let backup_root = args
        .backup_dir
        .map(Utf8PathBuf::from)
        .or_else(|| cfg.backup_path().map(|p| p.to_path_buf()));

    let enabled_only = !args.all;
    let candidates = enumerate_candidates(
        &mods_root,
        if enabled_only { None } else { backup_root.as_deref() },
    )
    .map_err(CliError::from)?;

    let engine_version = scan_config.engine_version;
    let show_progress = !args.json;
    let detector = ConflictDetector::new(scan_config)
        .with_options(ScanOptions {
            parallel: args.parallel,
        })
        .with_progress(move |progress| {
            if show_progress && progress.stage == ScanStage::IndexingMod {
                eprintln!(
                    "  {} {}",
                    format!("[{}/{}]", progress.current, progress.total).dimmed(),
                    progress.current_mod.unwrap_or_default()
                );
            }
        });

    if !args.json {
        println!(
            "{} {} mods under {} ({})",
            "Scanning".bright_cyan().bold(),
            candidates.len(),
            mods_root.as_str().bright_white(),
            engine_version.tag()
        );
    }

    let cancel = AtomicBool::new(false);
    let result = detector
        .detect_conflicts(
            &mods_root,
            backup_root.as_deref(),
            &candidates,
            enabled_only,
            &cancel,
        )
        .map_err(CliError::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        print_result(&result);
        if args.diagnostics {
            println!();
            println!("{}", "Diagnostics:".bright_magenta().bold());
            for entry in &result.diagnostics {
                println_pad!("{}", entry);
            }
        }
    }

    let report_dir = match (args.report_dir, args.report) {
        (Some(dir), _) => Some(Utf8PathBuf::from(dir)),
        (None, true) => Some(mods_root.clone()),
        (None, false) => None,
    };
    if let Some(dir) = report_dir {
        let report = ConflictReport::new(result, engine_version);
        let path = report.save_to_dir(&dir).map_err(CliError::from)?;
        if !args.json {
            println!();
            println!("{} {}", "Report written:".bright_green().bold(), path);
        }
    }

    Ok(())
}

fn print_result(result: &ModConflictResult) {
    println!();
    println_pad!(
        "{} {}   {} {}   {} {}   {} {:.1}s",
        "Mods:".bright_white(),
        result.scanned_mods,
        "Assets:".bright_white(),
        result.total_assets,
        "Conflicts:".bright_white(),
        if result.has_conflicts() {
            result.conflict_asset_count.to_string().bright_red().bold()
        } else {
            result.conflict_asset_count.to_string().bright_green().bold()
        },
        "Elapsed:".bright_white(),
        result.elapsed.as_secs_f64()
    );
    println_pad!("{}", result.mode_description.dimmed());

    if !result.has_conflicts() {
        println!();
        println!("{}", "✓ No conflicting assets".bright_green().bold());
        return;
    }

    println!();
    println!("{}", "Conflicting assets:".bright_yellow().bold());
    for conflict in result.conflicts.iter().take(MAX_LISTED_CONFLICTS) {
        println_pad!(
            "{} {} {}",
            "•".bright_cyan(),
            conflict.asset_path.bright_white(),
            format!("({})", conflict.providing_mods.join(", ")).dimmed()
        );
    }
    if result.conflicts.len() > MAX_LISTED_CONFLICTS {
        println_pad!(
            "{}",
            format!(
                "... and {} more (use --json or --report for the full list)",
                result.conflicts.len() - MAX_LISTED_CONFLICTS
            )
            .dimmed()
        );
    }

    println!();
    println!("{}", "Per mod:".bright_yellow().bold());
    for summary in result.summaries.iter().filter(|s| s.conflict_count > 0) {
        let name = if summary.display_name == summary.real_name {
            summary.real_name.bright_cyan().bold().to_string()
        } else {
            format!(
                "{} {}",
                summary.display_name.bright_cyan().bold(),
                format!("[{}]", summary.real_name).dimmed()
            )
        };
        println_pad!("{} {} conflicting", name, summary.conflict_count);
        for path in &summary.sample_conflict_paths {
            println_pad!("    {}", path.dimmed());
        }
    }
}
