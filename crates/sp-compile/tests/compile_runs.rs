use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sp_catalog::{FileTemplate, RunDescriptor};
use sp_compile::*;
use sp_core::{ParamSet, StageId};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn run_at(path: &Path, rp: f64) -> RunDescriptor {
    let params = ParamSet::from_pairs([("H", 0.2), ("RP", rp)]).unwrap();
    RunDescriptor::new("J", "s1", path, params).unwrap()
}

fn annealed() -> RunCompiler {
    RunCompiler::new(ResultLayout::Annealed {
        stage_dir: "anneal".to_string(),
        file: FileTemplate::parse("{job_id}{sim_id}_anneal.csv").unwrap(),
    })
}

fn single() -> RunCompiler {
    RunCompiler::new(ResultLayout::Single {
        file: FileTemplate::parse("{sim_id}.csv").unwrap(),
    })
}

fn write_stage(run: &Path, stage: &str, content: &str) {
    let dir = run.join("anneal").join(stage);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Js1_anneal.csv"), content).unwrap();
}

#[test]
fn annealed_run_uses_last_accepted_stage() {
    let run = unique_temp_dir("sp_compile_annealed");
    write_stage(&run, "000", "id,temp,mag\n5,2.0,0.1\n");
    write_stage(&run, "001", "id,temp,mag\n5,1.0,NaN\n");
    write_stage(&run, "002", "id, temp, mag\n5,0.5,0.7\n");
    // Header-only stage is skipped.
    write_stage(&run, "003", "id,temp,mag\n");
    fs::create_dir_all(run.join("anneal").join("notes")).unwrap();

    let compiled = annealed().compile(&run_at(&run, 1.0)).unwrap();
    assert_eq!(compiled.header, ["id", "temp", "mag"]);
    assert_eq!(compiled.final_stage, StageId::new(2));
    assert_eq!(compiled.result.get("mag"), Some(0.7));
    assert_eq!(compiled.result.get("id"), Some(2.0));

    let ids: Vec<f64> = compiled
        .stages
        .iter()
        .map(|s| s.fields.get("id").unwrap())
        .collect();
    assert_eq!(ids, [0.0, 1.0, 2.0]);
    assert_eq!(compiled.stages[1].fields.get("mag"), Some(0.0));
    assert_eq!(compiled.skipped.len(), 1);
    assert_eq!(compiled.skipped[0].reason, FailureReason::ShortFile);

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn mismatched_stage_is_skipped() {
    let run = unique_temp_dir("sp_compile_mismatch");
    write_stage(&run, "000", "temp,mag\n2.0,0.1\n");
    write_stage(&run, "001", "temp,mag\n1.0,0.2,9\n");

    let compiled = annealed().compile(&run_at(&run, 1.0)).unwrap();
    assert_eq!(compiled.final_stage, StageId::new(0));
    assert_eq!(compiled.skipped[0].reason, FailureReason::HeaderMismatch);

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn annealed_run_without_stages_is_missing() {
    let run = unique_temp_dir("sp_compile_nostages");
    let failure = annealed().compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::MissingFile);

    fs::create_dir_all(run.join("anneal")).unwrap();
    let failure = annealed().compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::MissingFile);

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn lowest_stage_file_defines_the_header() {
    let run = unique_temp_dir("sp_compile_nofirst");
    fs::create_dir_all(run.join("anneal").join("000")).unwrap();
    write_stage(&run, "001", "temp,mag\n1.0,0.4\n");

    let failure = annealed().compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::MissingFile);
    assert_eq!(failure.path, run.join("anneal/000/Js1_anneal.csv"));

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn result_files_follow_the_layout() {
    let run = unique_temp_dir("sp_compile_files");
    write_stage(&run, "001", "temp,mag\n1.0,0.4\n");
    write_stage(&run, "000", "temp,mag\n2.0,0.1\n");
    fs::create_dir_all(run.join("anneal").join("notes")).unwrap();

    let files = annealed().result_files(&run_at(&run, 1.0));
    assert_eq!(
        files,
        [
            run.join("anneal/000/Js1_anneal.csv"),
            run.join("anneal/001/Js1_anneal.csv")
        ]
    );
    assert_eq!(single().result_files(&run_at(&run, 1.0)), [run.join("s1.csv")]);

    let empty = unique_temp_dir("sp_compile_files_none");
    assert!(annealed().result_files(&run_at(&empty, 1.0)).is_empty());

    let _ = fs::remove_dir_all(&run);
    let _ = fs::remove_dir_all(&empty);
}

#[test]
fn annealed_run_with_no_accepted_stage_fails() {
    let run = unique_temp_dir("sp_compile_noaccept");
    write_stage(&run, "000", "temp,mag\n1.0,oops\n");
    let failure = annealed().compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::MalformedValue);
    assert_eq!(failure.run.params().get("RP"), Some(1.0));

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn single_layout_failures() {
    let run = unique_temp_dir("sp_compile_single");
    let compiler = single();

    let failure = compiler.compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::MissingFile);

    fs::write(run.join("s1.csv"), "temp,mag\n").unwrap();
    let failure = compiler.compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::ShortFile);

    fs::write(run.join("s1.csv"), "temp,mag,nclust\n0.1,0.2\n").unwrap();
    let failure = compiler.compile(&run_at(&run, 1.0)).unwrap_err();
    assert_eq!(failure.reason, FailureReason::HeaderMismatch);

    fs::write(run.join("s1.csv"), "id,temp,mag\n4,0.1,0.2\n").unwrap();
    let compiled = compiler.compile(&run_at(&run, 1.0)).unwrap();
    assert_eq!(compiled.result.get("id"), Some(4.0));
    assert_eq!(compiled.final_stage, None);
    assert!(compiled.stages.is_empty());

    let _ = fs::remove_dir_all(&run);
}

#[test]
fn compile_all_keeps_input_order() {
    let root = unique_temp_dir("sp_compile_batch");
    let mut runs = Vec::new();
    for i in 0..12 {
        let dir = root.join(format!("r{i:02}"));
        fs::create_dir_all(&dir).unwrap();
        // Every third run is missing its file.
        if i % 3 != 0 {
            fs::write(dir.join("s1.csv"), format!("temp,mag\n0.1,{i}\n")).unwrap();
        }
        runs.push(run_at(&dir, i as f64));
    }

    let compiler = single();
    let serial = compiler.compile_all(&runs, false);
    let parallel = compiler.compile_all(&runs, true);
    assert_eq!(serial.len(), runs.len());

    for (i, (a, b)) in serial.iter().zip(&parallel).enumerate() {
        assert_eq!(outcome_run(a), &runs[i]);
        assert_eq!(outcome_run(b), &runs[i]);
        assert_eq!(a.is_ok(), i % 3 != 0);
        assert_eq!(b.is_ok(), a.is_ok());
        if let Ok(c) = b {
            assert_eq!(c.result.get("mag"), Some(i as f64));
        }
    }

    let _ = fs::remove_dir_all(&root);
}
