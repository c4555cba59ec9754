const fn build_version(overridden: Option<&'static str>) -> &'static str {
    match overridden {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Release version, taken from `APP_VERSION` at build time when set.
pub const VERSION: &str = build_version(option_env!("APP_VERSION"));

/// Value sent in the `User-Agent` header of every probe request.
pub fn user_agent() -> String {
    format!("plex-remote-health/{VERSION}")
}
