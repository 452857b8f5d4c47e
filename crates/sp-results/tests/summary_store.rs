use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sp_catalog::OutputDef;
use sp_results::*;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn sample_table() -> SummaryTable {
    let mut table = SummaryTable::new(
        strings(&["XA", "H", "ETA"]),
        strings(&["temp", "mag", "nclust"]),
    );
    table
        .push_row(SummaryRow {
            params: vec![0.5, 0.3, 0.05],
            values: vec![Some(0.0101), Some(0.51234), Some(12.0)],
        })
        .unwrap();
    table
        .push_row(SummaryRow {
            params: vec![0.25, 1.0, 0.1],
            values: vec![Some(-0.00002), None, Some(3.3333)],
        })
        .unwrap();
    table
}

#[test]
fn summary_roundtrip_within_precision() {
    let root = unique_temp_dir("sp_results_roundtrip");
    let store = SummaryStore::for_root(&root, &OutputDef::default());
    let table = sample_table();

    // The summary directory does not exist yet.
    store.write_summary(&table).expect("failed to write summary");
    let text = fs::read_to_string(store.summary_path()).unwrap();
    assert!(text.starts_with("XA,H,ETA,temp,mag,nclust\n"));
    assert!(text.contains("0.5,0.3,0.05,0.010,0.512,12.000"));
    assert!(text.contains("0.25,1,0.1,0.000,,3.333"));

    let loaded = store
        .load_summary(&strings(&["XA", "H", "ETA"]))
        .expect("failed to read summary");
    assert_eq!(loaded.param_columns, table.param_columns);
    assert_eq!(loaded.property_columns, table.property_columns);
    assert_eq!(loaded.len(), table.len());
    for (a, b) in loaded.rows.iter().zip(&table.rows) {
        assert_eq!(a.params, b.params);
        for (x, y) in a.values.iter().zip(&b.values) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() <= 1e-3),
                (None, None) => {}
                other => panic!("cell mismatch: {other:?}"),
            }
        }
    }

    // Writing again over an existing file works and leaves no staging file.
    store.write_summary(&table).unwrap();
    assert!(!store.dir().join(".status.csv.tmp").exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_summary_is_reported() {
    let root = unique_temp_dir("sp_results_missing");
    let store = SummaryStore::for_root(&root, &OutputDef::default());
    let err = store.load_summary(&strings(&["H"])).unwrap_err();
    assert!(matches!(err, ResultsError::MissingSummaryFile { .. }));
}

#[test]
fn bad_cells_and_missing_columns() {
    let root = unique_temp_dir("sp_results_bad");
    fs::create_dir_all(&root).unwrap();
    let path = root.join("status.csv");

    fs::write(&path, "H,mag\n0.2,abc\n").unwrap();
    let err = read_summary(&path, &strings(&["H"])).unwrap_err();
    assert!(matches!(err, ResultsError::Parse { row: 1, .. }));

    let err = read_summary(&path, &strings(&["ETA"])).unwrap_err();
    assert!(matches!(err, ResultsError::MissingColumn { .. }));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn manifest_failures_and_runs() {
    let root = unique_temp_dir("sp_results_manifest");
    let store = SummaryStore::for_root(&root, &OutputDef::default());
    assert!(!store.has_summary());
    assert!(matches!(
        store.load_manifest(),
        Err(ResultsError::ManifestNotFound { .. })
    ));

    let table = sample_table();
    store.write_summary(&table).unwrap();
    let manifest = SummaryManifest {
        fingerprint: "abc".to_string(),
        name: "conH".to_string(),
        timestamp: "2026-10-19T00:00:00Z".to_string(),
        tool_version: "0.1.0".to_string(),
        run_count: 3,
        success_count: 2,
        failure_count: 1,
        empty_group_count: 0,
        row_count: 2,
        param_columns: table.param_columns.clone(),
        property_columns: table.property_columns.clone(),
    };
    store.save_manifest(&manifest).unwrap();
    assert!(store.has_summary());
    assert_eq!(store.load_manifest().unwrap(), manifest);

    store
        .write_failures(
            &strings(&["H", "RP"]),
            &[FailureRecord {
                params: vec![0.3, 2.0],
                job_id: "J".to_string(),
                sim_id: "s2".to_string(),
                reason: "missing_file".to_string(),
                path: "/x/anneal".to_string(),
                detail: "no stage directories".to_string(),
            }],
        )
        .unwrap();
    let failures = fs::read_to_string(store.failures_path()).unwrap();
    assert_eq!(
        failures,
        "H,RP,job_id,sim_id,reason,path,detail\n\
         0.3,2,J,s2,missing_file,/x/anneal,no stage directories\n"
    );

    store
        .write_runs(
            &strings(&["H", "RP"]),
            &strings(&["mag"]),
            &[RunRecord {
                job_id: "J".to_string(),
                sim_id: "s1".to_string(),
                params: vec![0.3, 1.0],
                values: vec![Some(0.4)],
            }],
        )
        .unwrap();
    let runs = fs::read_to_string(store.runs_path()).unwrap();
    assert_eq!(runs, "job_id,sim_id,H,RP,mag\nJ,s1,0.3,1,0.400\n");

    store.invalidate().unwrap();
    assert!(!store.has_summary());

    let _ = fs::remove_dir_all(&root);
}
