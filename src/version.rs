/// Service version. A non-empty `APP_VERSION` at build time overrides the
/// package version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) if !version.is_empty() => version,
    _ => env!("CARGO_PKG_VERSION"),
};

/// `<package> <version>`, as printed by `--version` and logged at startup.
pub fn version_line() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), VERSION)
}
