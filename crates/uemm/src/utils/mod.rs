pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Install the stderr `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "uemm=debug,ue_conflict=debug,ue_container=debug"
    } else {
        "uemm=info,ue_conflict=warn,ue_container=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// File name of `path`, or the whole path when it has none.
pub fn short_name(path: &camino::Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}
