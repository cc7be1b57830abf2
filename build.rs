use std::env;
use std::process::Command;

fn main() {
    // Recorded for `--version`, which reports the toolchain the binary was built with.
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(&rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "<unknown rustc>".to_string());

    println!("cargo:rustc-env=PUBSUBFORGE_RUSTC_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=RUSTC");
    println!("cargo:rerun-if-env-changed=PUBSUBFORGE_REVISION");
    println!("cargo:rerun-if-env-changed=PUBSUBFORGE_COMMIT");
}
