use std::fs;
use std::path::Path;

use cfd_gradients::processors::{gradients_from_file, Diagnostic, MemorySink};
use cfd_gradients::{PipelineConfig, StationKey};
use tempfile::TempDir;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn write_station(dir: &Path, name: &str, rows: &[(f64, f64)]) {
    let mut content = String::from("$ exported line scan\n$ value, z\n");
    for (value, z) in rows {
        content.push_str(&format!("{}, {}\n", value, z));
    }
    content.push_str("END\n");
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_batch_from_selected_file() {
    let dir = TempDir::new().unwrap();
    let pictures = dir.path().join("PICTURES");
    fs::create_dir_all(&pictures).unwrap();

    // Window crossings with slopes 4 and 6.
    write_station(
        &pictures,
        "Ux_GRAD_0.700",
        &[(-0.10, 0.70), (-0.06, 0.71), (-0.02, 0.72), (0.02, 0.73), (0.06, 0.74)],
    );
    write_station(
        &pictures,
        "Ux_GRAD_0.750",
        &[(-0.09, 0.70), (-0.03, 0.71), (0.03, 0.72), (0.09, 0.73), (0.15, 0.74)],
    );
    // Door crossing, slope -2 in magnitude.
    write_station(
        &pictures,
        "Ux_GRAD_0.800",
        &[(0.04, 0.60), (0.02, 0.61), (-0.02, 0.63), (-0.04, 0.64), (-0.06, 0.65)],
    );
    // Malformed row.
    fs::write(pictures.join("Ux_GRAD_0.655"), "1.0, 0.6\nabc, 0.7\n2.0, 0.8\nEND\n").unwrap();
    // Not part of the batch.
    fs::write(pictures.join("Uy_GRAD_0.700"), "garbage\n").unwrap();

    let config = PipelineConfig::default();
    let mut sink = MemorySink::new();
    let run = gradients_from_file(&pictures.join("Ux_GRAD_0.700"), &config, &mut sink).unwrap();

    assert_eq!(run.base, "Ux_GRAD");
    assert_eq!(run.files.len(), 4);
    assert_eq!(run.report.scans_analyzed, 3);
    assert_eq!(run.report.scans_skipped, 1);

    let window: Vec<(&str, f64)> = run
        .report
        .slopes
        .region_a
        .iter()
        .map(|(k, v)| (k.label(), *v))
        .collect();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].0, "0.700");
    assert_close(window[0].1, 4.0);
    assert_eq!(window[1].0, "0.750");
    assert_close(window[1].1, 6.0);

    let door = &run.report.slopes.region_b;
    assert_eq!(door.len(), 1);
    assert_close(door.get(&StationKey::parse("0.800").unwrap()).unwrap(), 2.0);

    let skipped: Vec<&Diagnostic> = sink
        .warnings()
        .filter(|e| matches!(e, Diagnostic::ScanSkipped { .. }))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].to_string().contains("Ux_GRAD_0.655"));

    let out = dir.path().join("results");
    let written = run.export_csv(&out, &config).unwrap();
    assert!(written[0].ends_with("Ux_GRAD_results_WINDOW.csv"));
    assert!(written[1].ends_with("Ux_GRAD_results_DOOR.csv"));

    let window_csv = fs::read_to_string(&written[0]).unwrap();
    let lines: Vec<&str> = window_csv.lines().collect();
    assert_eq!(lines[0], "station,slope");
    assert_eq!(lines[1], "0.700,4.000000");
    assert_eq!(lines[2], "0.750,6.000000");
}

#[test]
fn test_no_siblings_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut sink = MemorySink::new();

    let result = gradients_from_file(
        &dir.path().join("Ux_GRAD_0.700"),
        &PipelineConfig::default(),
        &mut sink,
    );

    assert!(result.is_err());
}
