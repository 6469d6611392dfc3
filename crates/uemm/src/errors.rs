use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Could not determine the configuration file path")]
    #[diagnostic(
        code(config::path_unknown),
        help("Pass --config <path> to choose a config.json explicitly")
    )]
    ConfigPathUnknown,

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check config.json for syntax errors, or run 'uemm config reset'")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: ue_conflict::Error,
    },

    #[error("No mod directory configured")]
    #[diagnostic(
        code(config::mod_path_missing),
        help("Pass --mods-dir <path> or run 'uemm config set-mod-path <path>'")
    )]
    ModRootNotSet,

    #[error("Directory not found: {path}")]
    #[diagnostic(
        code(fs::directory_missing),
        help("Make sure the directory exists and the path is correct")
    )]
    DirectoryNotFound { path: Utf8PathBuf },

    #[error("File not found: {path}")]
    #[diagnostic(
        code(file::not_found),
        help("Make sure the file exists and the path is correct")
    )]
    FileNotFound { path: Utf8PathBuf },

    #[error("Unknown engine version: {version}")]
    #[diagnostic(
        code(config::invalid_engine_version),
        help("Use one of: UE4_25, UE4_26, UE4_27, UE5_0, UE5_1, UE5_2, UE5_3")
    )]
    InvalidEngineVersion { version: String },

    #[error("Invalid AES key")]
    #[diagnostic(
        code(config::invalid_aes_key),
        help("The key must be 64 hexadecimal characters, optionally prefixed with 0x")
    )]
    InvalidAesKey {
        #[source]
        source: ue_container::ContainerError,
    },

    #[error("Not a container: {path}")]
    #[diagnostic(
        code(container::unsupported),
        help("Only .pak and .utoc files can be inspected")
    )]
    NotAContainer { path: Utf8PathBuf },

    #[error("No strategy could mount {path}")]
    #[diagnostic(
        code(container::mount_failed),
        help("Check the engine version (UEVersion / UEMM_UE_VERSION) and the AES key")
    )]
    MountFailed { path: Utf8PathBuf },

    #[error("Conflict scan failed")]
    #[diagnostic(code(scan::failed))]
    ScanFailed {
        #[from]
        source: ue_conflict::Error,
    },
}

impl CliError {
    pub fn config_parse_error(path: Utf8PathBuf, source: ue_conflict::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn directory_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    pub fn file_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn invalid_engine_version(version: impl Into<String>) -> Self {
        Self::InvalidEngineVersion {
            version: version.into(),
        }
    }
}
