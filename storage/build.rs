//! Build script for ubiquity-storage.

use std::env;
use std::path::PathBuf;

const BRIDGE: &str = "src/sys/apple/mod.rs";

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "ios" || target_os == "macos" {
        println!("cargo:rerun-if-changed={BRIDGE}");
        println!("cargo:rerun-if-changed=src/sys/apple/ubiquity.swift");

        // The host app compiles the generated Swift together with `ubiquity.swift`.
        let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
        let pkg_name = env::var("CARGO_PKG_NAME").expect("CARGO_PKG_NAME is set by cargo");
        swift_bridge_build::parse_bridges(vec![BRIDGE]).write_all_concatenated(out_dir, &pkg_name);
    }
}
