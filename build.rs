#[cfg(windows)]
fn main() {
    let mut res = winres::WindowsResource::new();
    if std::path::Path::new("icons/icon.ico").exists() {
        res.set_icon("icons/icon.ico");
    }
    res.set("ProductName", "Gamma Toggler");
    res.set("FileDescription", "Gamma Toggler - Hotkey Display Gamma Switch");
    res.set("LegalCopyright", "© 2026 Gamma Toggler Contributors");
    res.set("CompanyName", "Gamma Toggler");
    res.set("OriginalFilename", "gamma-toggler.exe");

    if let Err(e) = res.compile() {
        eprintln!("Failed to compile Windows resource: {}", e);
    }
}

#[cfg(not(windows))]
fn main() {
}
