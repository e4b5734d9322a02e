// Copyright (c) 2024 Mike Tsao

//! Version information for display. Uses the crate version unless the build
//! supplied a version-control description.

// https://stackoverflow.com/a/65972328/344467
/// A string that identifies this build to end users.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .or(option_env!("GIT_REV_PARSE"))
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}
