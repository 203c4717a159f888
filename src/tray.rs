//! Notification area icon and its context menu.
//!
//! The Linux build of `tray-icon` needs GTK, so there the app has no tray
//! and `Tray::build` always fails.

/// What a tray interaction asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrayAction {
    Show,
    Refresh,
    Settings,
    Quit,
}

#[cfg(not(target_os = "linux"))]
pub use native::{Tray, forward_events};

#[cfg(target_os = "linux")]
pub use unsupported::Tray;

#[cfg(not(target_os = "linux"))]
mod native {
    use std::sync::mpsc::Sender;

    use anyhow::{Context, Result};
    use image::RgbaImage;
    use log::warn;
    use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder, TrayIconEvent};

    use super::TrayAction;
    use crate::worker::{AppEvent, Waker};

    const APP_TOOLTIP: &str = "Glik";

    pub struct Tray {
        icon: TrayIcon,
        menu_show: MenuItem,
        menu_refresh: MenuItem,
        menu_settings: MenuItem,
        menu_quit: MenuItem,
    }

    impl Tray {
        pub fn build(initial: RgbaImage) -> Result<Self> {
            let menu_show = MenuItem::new("Mostra", true, None);
            let menu_refresh = MenuItem::new("Aggiorna", true, None);
            let menu_settings = MenuItem::new("Impostazioni", true, None);
            let menu_quit = MenuItem::new("Esci", true, None);

            let tray_menu = Menu::new();
            tray_menu
                .append_items(&[
                    &menu_show,
                    &menu_refresh,
                    &menu_settings,
                    &PredefinedMenuItem::separator(),
                    &menu_quit,
                ])
                .context("Failed to build tray menu")?;

            let icon = TrayIconBuilder::new()
                .with_icon(to_icon(initial)?)
                .with_tooltip(APP_TOOLTIP)
                .with_menu(Box::new(tray_menu))
                .build()
                .context("Failed to build the system tray")?;

            Ok(Self {
                icon,
                menu_show,
                menu_refresh,
                menu_settings,
                menu_quit,
            })
        }

        pub fn set_image(&self, image: RgbaImage) {
            match to_icon(image) {
                Ok(icon) => {
                    if let Err(err) = self.icon.set_icon(Some(icon)) {
                        warn!("Failed to set tray icon: {err}");
                    }
                }
                Err(err) => warn!("{err:#}"),
            }
        }

        pub fn set_tooltip(&self, tooltip: &str) {
            if let Err(err) = self.icon.set_tooltip(Some(tooltip)) {
                warn!("Failed to set tooltip: {err}");
            }
        }

        /// Manual refresh is greyed out while a fetch is running.
        pub fn set_refresh_enabled(&self, enabled: bool) {
            self.menu_refresh.set_enabled(enabled);
        }

        pub fn menu_action(&self, event: &MenuEvent) -> Option<TrayAction> {
            let id = event.id();
            if id == self.menu_show.id() {
                Some(TrayAction::Show)
            } else if id == self.menu_refresh.id() {
                Some(TrayAction::Refresh)
            } else if id == self.menu_settings.id() {
                Some(TrayAction::Settings)
            } else if id == self.menu_quit.id() {
                Some(TrayAction::Quit)
            } else {
                None
            }
        }

        pub fn icon_action(&self, event: &TrayIconEvent) -> Option<TrayAction> {
            match event {
                TrayIconEvent::DoubleClick { id, .. } if id == self.icon.id() => Some(TrayAction::Show),
                _ => None,
            }
        }
    }

    fn to_icon(image: RgbaImage) -> Result<Icon> {
        let (width, height) = image.dimensions();
        Icon::from_rgba(image.into_raw(), width, height).context("Invalid tray icon bitmap")
    }

    /// Routes tray and menu events into the app channel and wakes the UI, so
    /// they are handled even while the window is hidden.
    pub fn forward_events(events: Sender<AppEvent>, waker: Waker) {
        let menu_events = events.clone();
        let menu_waker = waker.clone();
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            let _ = menu_events.send(AppEvent::Menu(event));
            menu_waker();
        }));
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            let _ = events.send(AppEvent::Tray(event));
            waker();
        }));
    }
}

#[cfg(target_os = "linux")]
mod unsupported {
    use anyhow::{Result, bail};
    use image::RgbaImage;

    pub struct Tray;

    impl Tray {
        pub fn build(_initial: RgbaImage) -> Result<Self> {
            bail!("No notification area support on this platform")
        }

        pub fn set_image(&self, _image: RgbaImage) {}

        pub fn set_tooltip(&self, _tooltip: &str) {}

        pub fn set_refresh_enabled(&self, _enabled: bool) {}
    }
}
