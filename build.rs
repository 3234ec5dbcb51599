use chrono::{SecondsFormat, Utc};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    // Reproducible builds pin the stamp through SOURCE_DATE_EPOCH.
    let stamp = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        stamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
}
