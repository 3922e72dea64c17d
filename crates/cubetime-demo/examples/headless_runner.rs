//! Headless runner: loads every scripted session, plays it twice on the
//! virtual clock, prints the solves and verifies determinism.
//!
//! Run with: `cargo run --package cubetime-demo --example headless_runner`

use std::path::Path;

use tracing_subscriber::EnvFilter;

use cubetime_demo::{ScriptRunner, load_manifest};
use cubetime_stats::format_time;

fn show(label: &str, ms: Option<f64>) -> String {
    format!("{label} {}", ms.map(format_time).unwrap_or_else(|| "-".into()))
}

fn main() {
    let sessions_dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/sessions"));

    let manifest = load_manifest(sessions_dir).expect("failed to load manifest");
    let config = manifest
        .load_config(sessions_dir)
        .expect("failed to load timer config");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    println!("=== {} ===\n{}\n", manifest.title, manifest.description);
    println!("Sessions: {}\n", manifest.sessions.len());

    let runner = ScriptRunner::new(config);
    for entry in &manifest.sessions {
        println!("--- {} [{}] ---", entry.title, entry.tags.join(", "));
        println!("    {}", entry.summary);

        let script = manifest
            .load_script(sessions_dir, &entry.id)
            .unwrap_or_else(|e| panic!("failed to load session '{}': {e}", entry.id));

        let first = runner
            .run(&script)
            .unwrap_or_else(|e| panic!("session '{}' failed: {e}", entry.id));

        println!(
            "    {} steps, {} commands, {} ticks, {} faults",
            script.steps.len(),
            first.commands,
            first.ticks,
            first.faults.total()
        );
        for (i, solve) in first.solves.iter().enumerate() {
            let scramble = solve
                .scramble
                .as_deref()
                .unwrap_or("(none)")
                .replace('\n', " / ");
            println!("      #{:<2} {:>8}  {scramble}", i + 1, format_time(solve.elapsed_ms));
        }
        let summary = &first.summary;
        println!(
            "    {} | {} | {} | {}",
            show("best", summary.best),
            show("mean", summary.mean),
            show("ao5", summary.ao5),
            show("ao12", summary.ao12),
        );

        let second = runner
            .run(&script)
            .unwrap_or_else(|e| panic!("session '{}' failed (run 2): {e}", entry.id));
        if first.fingerprint == second.fingerprint {
            println!("    Determinism: PASS ({:#018x})", first.fingerprint);
        } else {
            println!(
                "    Determinism: FAIL! {:#018x} != {:#018x}",
                first.fingerprint, second.fingerprint
            );
            std::process::exit(1);
        }
        println!();
    }

    println!("All {} sessions passed.", manifest.sessions.len());
}
