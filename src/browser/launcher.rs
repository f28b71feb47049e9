use anyhow::{bail, Result};
use std::path::PathBuf;

/// Executable names looked up on `PATH`, most specific first.
const PATH_NAMES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
];

/// Install locations that are usually not on `PATH`.
#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"];
#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[r"C:\Program Files\Google\Chrome\Application\chrome.exe"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const INSTALL_PATHS: &[&str] = &["/snap/bin/chromium"];

/// Locate Chrome: `$CHROME` first, then `PATH`, then the usual install
/// location for the platform.
pub fn find_chrome_binary() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("CHROME").map(PathBuf::from) {
        if path.is_file() {
            tracing::info!("Using Chrome from $CHROME: {}", path.display());
            return Ok(path);
        }
        tracing::warn!("$CHROME points at {}, which is not a file", path.display());
    }

    if let Some(path) = PATH_NAMES.iter().find_map(|name| which::which(name).ok()) {
        tracing::info!("Found Chrome in PATH: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = INSTALL_PATHS.iter().map(PathBuf::from).find(|p| p.is_file()) {
        tracing::info!("Found Chrome at: {}", path.display());
        return Ok(path);
    }

    bail!(
        "Could not find Chrome or Chromium. Set $CHROME, or put one of {} on PATH",
        PATH_NAMES.join(", ")
    )
}

/// Launch flags for the automation profile. The user data dir is set
/// separately through the builder.
pub fn default_chrome_args(headless: bool) -> Vec<&'static str> {
    let mut args = vec![
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-background-networking",
        "--disable-client-side-phishing-detection",
        "--disable-default-apps",
        "--disable-extensions",
        "--disable-hang-monitor",
        "--disable-popup-blocking",
        "--disable-prompt-on-repost",
        "--disable-sync",
        "--disable-translate",
        "--metrics-recording-only",
        "--safebrowsing-disable-auto-update",
    ];

    if headless {
        args.push("--headless=new");
    }

    args
}
