//! OS light/dark theme, used to pick a tray icon color that stays readable.

use image::Rgba;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Taskbar theme. Anything we cannot read is treated as dark.
    pub fn detect() -> Self {
        match system_uses_light_theme() {
            Some(true) => Theme::Light,
            _ => Theme::Dark,
        }
    }

    /// Glyph body color.
    pub fn foreground(self) -> Rgba<u8> {
        match self {
            Theme::Dark => Rgba([255, 255, 255, 255]),
            Theme::Light => Rgba([0, 0, 0, 255]),
        }
    }

    /// Glyph outline color, drawn under the body.
    pub fn outline(self) -> Rgba<u8> {
        self.foreground()
    }
}

/// Windows: `SystemUsesLightTheme` under the Personalize key.
#[cfg(windows)]
fn system_uses_light_theme() -> Option<bool> {
    use std::ffi::c_void;
    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::Registry::{HKEY_CURRENT_USER, RRF_RT_REG_DWORD, RegGetValueW};

    let subkey: Vec<u16> = r"Software\Microsoft\Windows\CurrentVersion\Themes\Personalize"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let value: Vec<u16> = "SystemUsesLightTheme"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    let mut data: u32 = 0;
    let mut size = std::mem::size_of::<u32>() as u32;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            subkey.as_ptr(),
            value.as_ptr(),
            RRF_RT_REG_DWORD,
            std::ptr::null_mut(),
            &mut data as *mut u32 as *mut c_void,
            &mut size,
        )
    };
    if status == ERROR_SUCCESS {
        Some(data != 0)
    } else {
        None
    }
}

#[cfg(not(windows))]
fn system_uses_light_theme() -> Option<bool> {
    None
}
