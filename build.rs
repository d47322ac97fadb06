// build.rs

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_GO2");

    // The headless build has nothing to link.
    if std::env::var_os("CARGO_FEATURE_GO2").is_none() {
        return;
    }

    // --- Link against EGL / GLESv2 and libgo2 ---
    // Try pkg-config first. Vendor BSPs for handheld boards often ship the Mali
    // blobs without .pc files, so fall back to plain linker flags.
    let libraries = ["egl", "glesv2"];

    let mut pkg_config_success = true;

    for lib in &libraries {
        if pkg_config::probe_library(lib).is_err() {
            eprintln!(
                "pkg-config failed for library '{}'. Falling back to manual linking.",
                lib
            );
            pkg_config_success = false;
            break;
        }
    }

    if !pkg_config_success {
        println!("cargo:rustc-link-lib=EGL");
        println!("cargo:rustc-link-lib=GLESv2");
        println!("cargo:rustc-link-search=/usr/lib");
        eprintln!("Manual linking flags applied. Ensure EGL and GLESv2 development libraries are installed.");
    }

    // libgo2 does not ship a pkg-config file.
    println!("cargo:rustc-link-lib=go2");
    if let Some(dir) = std::env::var_os("GO2_LIB_DIR") {
        println!("cargo:rustc-link-search={}", dir.to_string_lossy());
    }
    println!("cargo:rerun-if-env-changed=GO2_LIB_DIR");
}
