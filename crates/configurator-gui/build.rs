// Build script for Windows resource file
#[cfg(windows)]
fn main() {
    use std::env;

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set("ProductName", "ONVIF Server Emulator Configurator")
        .set("FileDescription", "Configurator for the ONVIF server emulator")
        .set("FileVersion", env!("CARGO_PKG_VERSION"))
        .set("ProductVersion", env!("CARGO_PKG_VERSION"));

    if let Err(e) = res.compile() {
        println!("cargo:warning=Failed to compile resource: {}", e);
    }
}

#[cfg(not(windows))]
fn main() {
    // Do nothing on non-Windows platforms
}
