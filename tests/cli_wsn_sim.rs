use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "wsn-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn event_lines(log: &str) -> Vec<&str> {
    log.lines().filter(|l| l.contains(", date : ")).collect()
}

#[test]
fn wsn_sim_writes_event_log_and_report_json() {
    let dir = unique_temp_dir("log-report");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "schema_version": 1,
    "simulation": { "name": "pair", "step_ms": 0, "base_cost": 0.5 },
    "defaults": { "radio_radius": 150, "battery": 100 },
    "devices": [
        { "label": "gw", "x": 0, "y": 0,
          "behavior": { "kind": "periodic", "interval_ms": 100, "message": "hb", "limit": 2 } },
        { "label": "n1", "x": 100, "y": 0 },
        { "label": "far", "x": 5000, "y": 0 }
    ]
}
        "#,
    );
    let log = dir.join("events.log");
    let report = dir.join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_wsn_sim"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--log",
            log.to_str().unwrap(),
            "--report-json",
            report.to_str().unwrap(),
            "--quiet",
        ])
        .output()
        .expect("run wsn_sim");
    assert!(
        output.status.success(),
        "wsn_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("done reason=Exhausted events=2 receptions=2"), "{stdout}");
    assert_eq!(
        stdout.lines().filter(|l| l.starts_with("battery ")).count(),
        3
    );

    let raw_log = fs::read_to_string(&log).expect("read log");
    assert!(raw_log.contains("Simulation name : pair"));
    let lines = event_lines(&raw_log);
    assert_eq!(lines.len(), 4, "{raw_log}");
    assert!(lines[0].ends_with("0 gw send hb, date : 100000000 + eps 0"));
    assert!(lines[1].ends_with("1 n1 receive hb, date : 100000000 + eps 0"));
    assert!(lines[3].ends_with("1 n1 receive hb, date : 200000000 + eps 0"));
    assert!(raw_log.trim_end().ends_with("End simulation"));

    let v: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert_eq!(v["name"], "pair");
    assert_eq!(v["reason"]["kind"], "exhausted");
    assert_eq!(v["events_applied"], 2);
    let devices = v["devices"].as_array().expect("devices array");
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0]["events_sent"], 2);
    assert_eq!(devices[0]["battery"], 99.0);
    assert_eq!(devices[1]["battery"], 99.0);
    assert_eq!(devices[2]["battery"], 100.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn wsn_sim_loads_script_files_relative_to_scenario() {
    let dir = unique_temp_dir("script-file");
    write_file(&dir, "node.script", "# one shot\ndelay 5\nsend ping\nstop\n");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "schema_version": 1,
    "devices": [
        { "label": "s", "x": 0, "y": 0, "radio_radius": 10,
          "behavior": { "kind": "script_file", "path": "node.script" } },
        { "label": "r", "x": 3, "y": 4 }
    ]
}
        "#,
    );
    let log = dir.join("log.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_wsn_sim"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--log",
            log.to_str().unwrap(),
            "--name",
            "scripted",
            "--quiet",
        ])
        .output()
        .expect("run wsn_sim");
    assert!(
        output.status.success(),
        "wsn_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let raw_log = fs::read_to_string(&log).expect("read log");
    assert!(raw_log.contains("Simulation name : scripted"));
    let lines = event_lines(&raw_log);
    assert_eq!(lines.len(), 2, "{raw_log}");
    assert!(lines[0].ends_with("0 s send ping, date : 5000000 + eps 0"));
    assert!(lines[1].ends_with("1 r receive ping, date : 5000000 + eps 0"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn wsn_sim_fails_on_bad_script_and_bad_metric() {
    let dir = unique_temp_dir("bad-input");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "schema_version": 1,
    "devices": [
        { "label": "bad", "x": 0, "y": 0,
          "behavior": { "kind": "script", "lines": ["teleport 1 2"] } }
    ]
}
        "#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_wsn_sim"))
        .args(["--scenario", scenario.to_str().unwrap(), "--quiet"])
        .output()
        .expect("run wsn_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown command `teleport`"), "{stderr}");

    let ok = write_file(
        &dir,
        "ok.json",
        r#"{ "schema_version": 1, "devices": [ { "x": 0, "y": 0 } ] }"#,
    );
    let output = Command::new(env!("CARGO_BIN_EXE_wsn_sim"))
        .args([
            "--scenario",
            ok.to_str().unwrap(),
            "--distance",
            "manhattan",
            "--quiet",
        ])
        .output()
        .expect("run wsn_sim");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid distance metric"));

    let _ = fs::remove_dir_all(&dir);
}
