use crate::errors::CliError;
use crate::utils::config::{load_config, resolve_config_path, save_config};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use ue_conflict::config::{ENV_GAME_BASE, ENV_UE_VERSION};
use ue_conflict::{AppConfig, ScanConfig};
use ue_container::{AesKey, EngineVersion};

/// Which `config.json` field a `config set-*` command writes.
#[derive(Debug, Clone)]
pub enum ConfigField {
    UeVersion(String),
    AesKey(String),
    GameBasePath(String),
    ProjectName(String),
    ModPath(String),
    BackupPath(String),
}

fn update_config(
    config_path: Option<&str>,
    apply: impl FnOnce(&mut AppConfig),
) -> Result<Utf8PathBuf> {
    let path = resolve_config_path(config_path)?;
    let mut cfg = load_config(&path)?;
    apply(&mut cfg);
    save_config(&path, &cfg)?;
    Ok(path)
}

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8Path>, validator: impl Fn(&Utf8Path) -> bool) {
    match path {
        Some(p) => {
            let status = if validator(p) {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", format!("{}:", name).bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

pub fn show_config(config_path: Option<&str>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let cfg = load_config(&path)?;
    let resolved = ScanConfig::from_app_config(&cfg);

    println!();
    println!("  {} {}", "config_file:".bright_white(), path);

    match cfg.ue_version_tag() {
        Some(tag) => println!("  {} {}", "UEVersion:".bright_white(), tag),
        None => println!(
            "  {} {}",
            "UEVersion:".bright_white(),
            "(not set)".bright_yellow()
        ),
    }
    println!(
        "  {} {}",
        "AesKey:".bright_white(),
        match (cfg.aes_key.as_deref(), cfg.aes_key()) {
            (None, _) => "(not set)".bright_yellow(),
            (Some(_), Some(_)) => "set ✓".bright_green(),
            (Some(_), None) => "invalid ✗".bright_red(),
        }
    );
    print_path_config("GameBasePath", cfg.game_base_path(), |p| {
        p.join("Content").join("Paks").is_dir()
    });
    println!(
        "  {} {}",
        "ProjectName:".bright_white(),
        match cfg.project_name() {
            Some(name) => name.normal(),
            None => "(not set, paths keep their project root)".bright_yellow(),
        }
    );
    print_path_config("ModPath", cfg.mod_path(), |p| p.is_dir());
    print_path_config("BackupPath", cfg.backup_path(), |p| p.is_dir());

    println!();
    println!(
        "  {} {} {}",
        "effective engine:".bright_white(),
        resolved.engine_version.to_string().bright_cyan(),
        format!("({} overrides UEVersion)", ENV_UE_VERSION).dimmed()
    );
    if let Some(base) = &resolved.game_base_path {
        println!(
            "  {} {} {}",
            "effective base game:".bright_white(),
            base,
            format!("({} overrides GameBasePath)", ENV_GAME_BASE).dimmed()
        );
    }
    println!();
    Ok(())
}

pub fn set_config_field(config_path: Option<&str>, field: ConfigField) -> Result<()> {
    let (name, value) = match field {
        ConfigField::UeVersion(tag) => {
            let version = EngineVersion::parse_tag(&tag)
                .ok_or_else(|| CliError::invalid_engine_version(tag.clone()))?;
            let tag = version.tag().to_string();
            update_config(config_path, |cfg| cfg.ue_version = Some(tag.clone()))?;
            ("UEVersion", tag)
        }
        ConfigField::AesKey(hex) => {
            hex.parse::<AesKey>()
                .map_err(|source| CliError::InvalidAesKey { source })?;
            update_config(config_path, |cfg| cfg.aes_key = Some(hex.trim().to_string()))?;
            ("AesKey", "(hidden)".to_string())
        }
        ConfigField::GameBasePath(path) => {
            let path = Utf8PathBuf::from(path);
            if !path.join("Content").join("Paks").is_dir() {
                eprintln!(
                    "  {}",
                    "Warning: no Content/Paks directory here; base game context will be empty"
                        .bright_yellow()
                );
            }
            update_config(config_path, |cfg| cfg.game_base_path = Some(path.clone()))?;
            ("GameBasePath", path.to_string())
        }
        ConfigField::ProjectName(name) => {
            let name = name.trim().to_string();
            update_config(config_path, |cfg| cfg.project_name = Some(name.clone()))?;
            ("ProjectName", name)
        }
        ConfigField::ModPath(path) => {
            let path = Utf8PathBuf::from(path);
            if !path.is_dir() {
                return Err(CliError::directory_not_found(path).into());
            }
            update_config(config_path, |cfg| cfg.mod_path = Some(path.clone()))?;
            ("ModPath", path.to_string())
        }
        ConfigField::BackupPath(path) => {
            let path = Utf8PathBuf::from(path);
            update_config(config_path, |cfg| cfg.backup_path = Some(path.clone()))?;
            ("BackupPath", path.to_string())
        }
    };

    println!("{}", format!("✓ {} updated", name).bright_green().bold());
    println!();
    println!("  {} {}", format!("{}:", name).bright_white().bold(), value.bright_green());
    Ok(())
}

/// Clears the fields this tool owns; keys written by other tools are kept.
pub fn reset_config(config_path: Option<&str>) -> Result<()> {
    let path = update_config(config_path, |cfg| {
        let other = std::mem::take(&mut cfg.other);
        *cfg = AppConfig {
            other,
            ..AppConfig::default()
        };
    })?;

    println!("{}", "✓ Configuration reset to defaults".bright_green().bold());
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), path);
    println!(
        "  {} {}",
        "Engine version:".bright_white().bold(),
        EngineVersion::default()
    );
    println!();
    println!(
        "  {}",
        "Run 'uemm config set-mod-path <path>' to point the scanner at your mods".bright_cyan()
    );
    Ok(())
}
