/// Build script for pidrop
/// Captures build environment for reproducibility

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=experiments/ball_drop.yaml");

    if let Ok(version) = std::env::var("CARGO_PKG_VERSION") {
        println!("cargo:rustc-env=PIDROP_VERSION={version}");
    }

    // Reported by `pidrop version` so runs can be traced to a commit
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=PIDROP_GIT_HASH={}", hash.trim());
            }
        }
    }
}
