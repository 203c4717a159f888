//! Launch at login, started hidden in the tray.

use std::env;

use anyhow::{Context, Result};
use auto_launch::{AutoLaunch, AutoLaunchBuilder};
use log::info;

const APP_NAME: &str = "Glik";
const LAUNCH_ARGS: [&str; 1] = ["--minimized"];

fn launcher() -> Result<AutoLaunch> {
    let exe = env::current_exe().context("Cannot locate the executable")?;
    AutoLaunchBuilder::new()
        .set_app_name(APP_NAME)
        .set_app_path(&exe.to_string_lossy())
        .set_args(&LAUNCH_ARGS)
        .build()
        .context("Failed to set up the login entry")
}

/// Registers or removes the login entry. Does nothing when it already
/// matches.
pub fn set_enabled(enabled: bool) -> Result<()> {
    let launcher = launcher()?;
    if launcher.is_enabled().unwrap_or(false) == enabled {
        return Ok(());
    }
    if enabled {
        launcher.enable().context("Failed to enable autostart")?;
    } else {
        launcher.disable().context("Failed to disable autostart")?;
    }
    info!("autostart {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn is_enabled() -> bool {
    launcher()
        .and_then(|l| l.is_enabled().context("Failed to read the login entry"))
        .unwrap_or(false)
}
