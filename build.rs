//! Generates the application icon (icon.ico) and embeds it in the Windows
//! executable, so the taskbar and Explorer show it.

include!("src/logo.rs");

fn main() {
    println!("cargo:rerun-if-changed=src/logo.rs");

    #[cfg(windows)]
    {
        let manifest_dir = std::path::PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
        let icon_path = manifest_dir.join("icon.ico");

        let mut icon_dir = ico::IconDir::new(ico::ResourceType::Icon);
        for &size in &[16u32, 32u32, 48u32, 256u32] {
            let image = ico::IconImage::from_rgba_data(size, size, logo_rgba(size));
            let entry = ico::IconDirEntry::encode(&image).expect("encode icon entry");
            icon_dir.add_entry(entry);
        }

        let mut file = std::fs::File::create(&icon_path).expect("create icon.ico");
        icon_dir.write(&mut file).expect("write icon.ico");

        let mut res = winres::WindowsResource::new();
        res.set_icon("icon.ico");
        res.set("FileDescription", "Glik");
        res.set("ProductName", "Glik");
        if let Err(e) = res.compile() {
            eprintln!("winres: {e} (without the Windows SDK/rc.exe the exe has no icon)");
        }
    }
}
