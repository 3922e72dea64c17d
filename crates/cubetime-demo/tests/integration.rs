use std::path::Path;

use tempfile::TempDir;

use cubetime_data::{ClockMode, SessionScript, SolveLog, Step, TimerConfig};
use cubetime_demo::{DemoError, RunReport, ScriptRunner, SessionManifest, load_manifest};

fn sessions_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/sessions"))
}

fn manifest() -> SessionManifest {
    load_manifest(sessions_dir()).unwrap()
}

fn play(id: &str) -> RunReport {
    let manifest = manifest();
    let config = manifest.load_config(sessions_dir()).unwrap();
    let script = manifest.load_script(sessions_dir(), id).unwrap();
    ScriptRunner::new(config).run(&script).unwrap()
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-3
}

// -----------------------------------------------------------------------
// Manifest sessions
// -----------------------------------------------------------------------

#[test]
fn every_session_runs_clean_and_deterministic() {
    let manifest = manifest();
    let runner = ScriptRunner::new(manifest.load_config(sessions_dir()).unwrap());
    for entry in &manifest.sessions {
        let script = manifest.load_script(sessions_dir(), &entry.id).unwrap();
        let a = runner.run(&script).unwrap();
        let b = runner.run(&script).unwrap();
        assert_eq!(a.faults.total(), 0, "faults in '{}'", entry.id);
        assert_eq!(a.fingerprint, b.fingerprint, "'{}' is not deterministic", entry.id);
        assert!(!a.solves.is_empty(), "'{}' recorded nothing", entry.id);
    }
}

#[test]
fn single_solve_times_the_run() {
    let report = play("single_solve");
    assert_eq!(report.solves.len(), 1);
    assert!(close(report.solves[0].elapsed_ms, 12_450.0));
    assert_eq!(report.solves[0].scramble.as_ref().map(|s| s.split(' ').count()), Some(25));
    // The run's own fetch is shown once the solve is acknowledged.
    assert!(report.final_scramble.is_some());
    assert_ne!(report.final_scramble, report.solves[0].scramble);
}

#[test]
fn cancelled_run_is_not_recorded() {
    let report = play("cancelled_run");
    assert_eq!(report.solves.len(), 1);
    assert!(close(report.solves[0].elapsed_ms, 9_870.0));
}

#[test]
fn average_of_five_drops_best_and_worst() {
    let report = play("average_of_five");
    assert_eq!(report.summary.count, 5);
    assert!(close(report.summary.best.unwrap(), 9_870.0));
    assert!(close(report.summary.worst.unwrap(), 15_210.0));
    assert!(close(report.summary.ao5.unwrap(), 11_620.0));
    assert_eq!(report.summary.ao12, None);

    let scrambles: Vec<_> = report.solves.iter().map(|s| s.scramble.clone()).collect();
    for pair in scrambles.windows(2) {
        assert_ne!(pair[0], pair[1], "each run shows a fresh scramble");
    }
}

#[test]
fn puzzle_switch_reaches_the_next_fetch() {
    let report = play("puzzle_switch");
    assert_eq!(report.solves.len(), 2);
    assert_eq!(report.solves[0].puzzle_id.0, 5);
    assert_eq!(report.solves[1].puzzle_id.0, 8);

    // The pyraminx run fetched the scramble shown for the second solve.
    let pyraminx = report.solves[1].scramble.as_deref().unwrap();
    assert!((11..=15).contains(&pyraminx.split(' ').count()));

    // The megaminx run fetched the one shown now, one row per line.
    let megaminx = report.final_scramble.unwrap();
    assert_eq!(megaminx.lines().count(), 7);
}

// -----------------------------------------------------------------------
// Runner options
// -----------------------------------------------------------------------

fn quick_solve(solve_ms: u64) -> SessionScript {
    SessionScript {
        name: "quick".into(),
        description: String::new(),
        steps: vec![
            Step::Down,
            Step::Wait(20),
            Step::Up,
            Step::Wait(solve_ms),
            Step::Down,
            Step::Wait(20),
            Step::Up,
        ],
    }
}

#[test]
fn solves_are_persisted_when_a_log_is_configured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs").join("solves.jsonl");
    let runner = ScriptRunner::new(TimerConfig {
        solves_path: Some(path.clone()),
        ..Default::default()
    });

    let first = runner.run(&quick_solve(5_000)).unwrap();
    let second = runner.run(&quick_solve(7_000)).unwrap();

    let stored = SolveLog::open(&path).unwrap().load().unwrap();
    assert_eq!(stored.len(), 2);
    for (stored, ran) in stored.iter().zip([&first.solves[0], &second.solves[0]]) {
        assert!(close(stored.elapsed_ms, ran.elapsed_ms));
        assert_eq!(stored.scramble, ran.scramble);
    }
}

#[test]
fn realtime_clock_uses_the_worker() {
    let runner = ScriptRunner::new(TimerConfig {
        clock: ClockMode::Realtime,
        frame_rate: 100,
        ..Default::default()
    });
    let report = runner.run(&quick_solve(200)).unwrap();
    assert_eq!(report.solves.len(), 1);
    assert!(report.solves[0].elapsed_ms >= 200.0);
    assert!(report.ticks > 0);
}

#[test]
fn missing_session_is_reported() {
    let err = manifest().load_script(sessions_dir(), "nope").unwrap_err();
    assert!(matches!(err, DemoError::SessionNotFound { ref id } if id == "nope"));
}
