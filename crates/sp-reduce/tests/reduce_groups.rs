use std::path::PathBuf;

use proptest::prelude::*;
use sp_catalog::RunDescriptor;
use sp_compile::{CompilationFailure, CompileOutcome, CompiledRun, FailureReason, FieldRecord};
use sp_core::ParamSet;
use sp_reduce::Reducer;

fn run(h: f64, rp: f64) -> RunDescriptor {
    let params = ParamSet::from_pairs([("H", h), ("ETA", 0.05), ("RP", rp)]).unwrap();
    RunDescriptor::new("J", format!("h{h}r{rp}"), format!("runs/{h}/{rp}"), params).unwrap()
}

fn ok(h: f64, rp: f64, fields: &[(&str, f64)]) -> CompileOutcome {
    Ok(CompiledRun {
        run: run(h, rp),
        header: fields.iter().map(|(n, _)| n.to_string()).collect(),
        result: FieldRecord::from_pairs(fields.iter().copied()),
        final_stage: None,
        stages: Vec::new(),
        skipped: Vec::new(),
    })
}

fn missing(h: f64, rp: f64) -> CompileOutcome {
    Err(CompilationFailure {
        run: run(h, rp),
        reason: FailureReason::MissingFile,
        path: PathBuf::from("runs/x"),
        detail: "gone".to_string(),
    })
}

fn replicate_reducer() -> Reducer {
    Reducer::new(Some("RP".to_string()), None)
}

#[test]
fn mean_over_successful_replicates() {
    let outcomes = vec![
        ok(0.2, 1.0, &[("temp", 0.1), ("mag", 0.3)]),
        missing(0.2, 2.0),
        ok(0.2, 3.0, &[("temp", 0.1), ("mag", 0.5)]),
    ];
    let reduction = replicate_reducer().reduce(&outcomes);
    let table = &reduction.table;

    assert_eq!(table.param_columns, ["H", "ETA"]);
    assert_eq!(table.property_columns, ["temp", "mag"]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0].params, [0.2, 0.05]);
    let mag = table.value(&table.rows[0], "mag").unwrap();
    assert!((mag - 0.4).abs() < 1e-12);
    assert!(reduction.empty_groups.is_empty());
}

#[test]
fn all_failed_group_is_dropped() {
    let outcomes = vec![
        missing(0.1, 1.0),
        ok(0.3, 1.0, &[("mag", 0.9)]),
        missing(0.1, 2.0),
    ];
    let reduction = replicate_reducer().reduce(&outcomes);
    assert_eq!(reduction.table.len(), 1);
    assert_eq!(reduction.table.rows[0].params, [0.3, 0.05]);
    assert_eq!(reduction.empty_groups.len(), 1);
    assert_eq!(reduction.empty_groups[0].get("H"), Some(0.1));
    assert_eq!(reduction.empty_groups[0].get("RP"), None);
}

#[test]
fn rows_follow_discovery_order() {
    let outcomes = vec![
        ok(0.9, 1.0, &[("mag", 1.0)]),
        ok(0.1, 1.0, &[("mag", 2.0)]),
        ok(0.9, 2.0, &[("mag", 3.0)]),
        ok(0.5, 1.0, &[("mag", 4.0)]),
    ];
    let table = replicate_reducer().reduce(&outcomes).table;
    let hs: Vec<f64> = table.rows.iter().map(|r| r.params[0]).collect();
    assert_eq!(hs, [0.9, 0.1, 0.5]);
    assert_eq!(table.rows[0].values, [Some(2.0)]);
}

#[test]
fn allow_list_and_absent_properties() {
    let outcomes = vec![
        ok(0.2, 1.0, &[("temp", 0.1), ("mag", 0.3), ("energy", -4.0)]),
        ok(0.4, 1.0, &[("temp", 0.2)]),
    ];
    let reducer = Reducer::new(
        Some("RP".to_string()),
        Some(vec!["mag".to_string(), "temp".to_string()]),
    );
    let table = reducer.reduce(&outcomes).table;
    assert_eq!(table.property_columns, ["mag", "temp"]);
    assert_eq!(table.rows[0].values, [Some(0.3), Some(0.1)]);
    assert_eq!(table.rows[1].values, [None, Some(0.2)]);
}

#[test]
fn union_of_fields_in_first_appearance_order() {
    let outcomes = vec![
        ok(0.2, 1.0, &[("temp", 0.1), ("mag", 0.3)]),
        ok(0.4, 1.0, &[("temp", 0.2), ("nclust", 7.0), ("mag", 0.1)]),
    ];
    let table = replicate_reducer().reduce(&outcomes).table;
    assert_eq!(table.property_columns, ["temp", "mag", "nclust"]);
    assert_eq!(table.rows[0].values[2], None);
}

#[test]
fn without_replicate_every_run_is_its_own_row() {
    let outcomes = vec![ok(0.2, 1.0, &[("mag", 0.3)]), ok(0.2, 2.0, &[("mag", 0.5)])];
    let table = Reducer::default().reduce(&outcomes).table;
    assert_eq!(table.param_columns, ["H", "ETA", "RP"]);
    assert_eq!(table.len(), 2);
}

#[test]
fn empty_input_gives_empty_table() {
    let reduction = replicate_reducer().reduce(&[]);
    assert!(reduction.table.is_empty());
    assert!(reduction.table.param_columns.is_empty());
}

proptest! {
    #[test]
    fn row_value_is_mean_of_successes(
        mags in prop::collection::vec(prop::option::of(-1.0_f64..1.0), 1..12)
    ) {
        let outcomes: Vec<CompileOutcome> = mags
            .iter()
            .enumerate()
            .map(|(i, m)| match m {
                Some(m) => ok(0.2, i as f64, &[("mag", *m)]),
                None => missing(0.2, i as f64),
            })
            .collect();
        let reduction = replicate_reducer().reduce(&outcomes);
        let successes: Vec<f64> = mags.iter().flatten().copied().collect();

        if successes.is_empty() {
            prop_assert!(reduction.table.is_empty());
            prop_assert_eq!(reduction.empty_groups.len(), 1);
        } else {
            let expected = successes.iter().sum::<f64>() / successes.len() as f64;
            let got = reduction.table.rows[0].values[0].unwrap();
            prop_assert!((got - expected).abs() < 1e-12);
        }
    }
}
