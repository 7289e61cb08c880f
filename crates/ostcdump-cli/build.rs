use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OSTCDUMP_COMMIT");

    // CI exports the commit explicitly; local builds ask git.
    let commit = env::var("OSTCDUMP_COMMIT")
        .ok()
        .filter(|sha| !sha.trim().is_empty())
        .or_else(|| git(&["rev-parse", "HEAD"]))
        .map(|sha| sha.chars().take(10).collect::<String>())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let date = git(&["log", "-1", "--format=%cs"]).unwrap_or_else(|| UNKNOWN.to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    println!("cargo:rustc-env=OSTCDUMP_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=OSTCDUMP_BUILD_DATE={date}");
    println!("cargo:rustc-env=OSTCDUMP_BUILD_PROFILE={profile}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty())
}
