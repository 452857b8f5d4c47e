use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sp_catalog::*;

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

fn directory_config() -> AnalysisConfig {
    AnalysisConfig {
        version: 1,
        name: "conH squ2c32".to_string(),
        catalog: CatalogDef::Directory {
            root: PathBuf::from("runs"),
            levels: vec![
                LevelDef {
                    name: "XA".to_string(),
                    prefix: "a".to_string(),
                    width: 3,
                    scale: 100.0,
                },
                LevelDef {
                    name: "H".to_string(),
                    prefix: "h".to_string(),
                    width: 3,
                    scale: 100.0,
                },
            ],
        },
        layout: LayoutDef::Single {
            file: "result.csv".to_string(),
        },
        replicate_param: None,
        properties: None,
        output: OutputDef::default(),
    }
}

#[test]
fn yaml_roundtrip_preserves_config() {
    let dir = unique_temp_dir("sp_catalog_yaml");
    let path = dir.join(DEFAULT_CONFIG_FILE);
    let config = directory_config();

    save_yaml(&path, &config).expect("save failed");
    let loaded = load_yaml(&path).expect("load failed");
    assert_eq!(config, loaded);
}

#[test]
fn invalid_yaml_config_is_rejected_on_load() {
    let dir = unique_temp_dir("sp_catalog_yaml_invalid");
    let path = dir.join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        "version: 1\nname: x\ncatalog:\n  type: Table\n  path: p.csv\n  params: []\n",
    )
    .unwrap();

    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::EmptyList { .. })
    ));
}

#[test]
fn directory_catalog_resolves_against_base_dir() {
    let base = unique_temp_dir("sp_catalog_base");
    for path in ["runs/a100/h000", "runs/a050/h020", "runs/a050/h000"] {
        fs::create_dir_all(base.join(path)).unwrap();
    }

    let runs = load_catalog(&directory_config(), &base).expect("catalog should load");
    let tuples: Vec<(f64, f64)> = runs
        .iter()
        .map(|r| (r.params().get("XA").unwrap(), r.params().get("H").unwrap()))
        .collect();
    assert_eq!(tuples, [(0.5, 0.0), (0.5, 0.2), (1.0, 0.0)]);
    assert!(runs.iter().all(|r| r.job_id().is_empty()));
}

#[test]
fn table_catalog_through_config() {
    let base = unique_temp_dir("sp_catalog_table_cfg");
    fs::write(
        base.join("conH.csv"),
        "jobid,simid,path,XA,H,ETA,RP\nJ7,sq,runs/x,1.0,0.4,0.30,1\n",
    )
    .unwrap();

    let config = AnalysisConfig {
        catalog: CatalogDef::Table {
            path: PathBuf::from("conH.csv"),
            job_column: "jobid".to_string(),
            sim_column: "simid".to_string(),
            path_column: "path".to_string(),
            params: vec!["XA".into(), "H".into(), "ETA".into(), "RP".into()],
        },
        replicate_param: Some("RP".to_string()),
        ..directory_config()
    };
    validate_config(&config).expect("config should be valid");

    let runs = load_catalog(&config, &base).expect("catalog should load");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].path(), base.join("runs/x"));
    assert_eq!(runs[0].params().get("ETA"), Some(0.30));
}
