use clap::{Parser, Subcommand};
use sp_app::query::{self, RowSelection};
use sp_app::{
    AppResult, MeshAnalysis, PipelineOptions, PipelineProgressEvent, PipelineRequest,
    PipelineResponse, PipelineStage, PipelineTiming, pipeline,
};
use sp_core::{format_fixed, format_param};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "squarephase")]
#[command(about = "Compile and aggregate dipolar-square annealing results", long_about = None)]
struct Cli {
    /// Log debug detail (skipped stages, per-table writes)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every run and write the summary tables
    Update {
        /// Analysis directories (holding analysis.yaml) or config files
        #[arg(required = true)]
        roots: Vec<PathBuf>,
        /// Recompile even when the stored summary is up to date
        #[arg(long)]
        force: bool,
        /// Compile runs on one thread
        #[arg(long)]
        serial: bool,
        /// Also write per-run stage series under <run>/anal/
        #[arg(long)]
        run_series: bool,
    },
    /// Describe a stored summary
    Anal {
        /// Analysis directory or config file
        root: PathBuf,
    },
    /// Validate an analysis config
    Validate {
        /// Analysis directory or config file
        root: PathBuf,
    },
    /// List the runs of an analysis catalog
    Runs {
        /// Analysis directory or config file
        root: PathBuf,
    },
    /// Pivot the summary over two parameters
    Mesh {
        /// Analysis directory or config file
        root: PathBuf,
        #[arg(long)]
        x: String,
        #[arg(long)]
        y: String,
        #[arg(long)]
        value: String,
        /// Parameter filter, e.g. --where XA=0.5
        #[arg(long = "where", value_parser = parse_assignment)]
        filters: Vec<(String, f64)>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export an (x, y) series from the summary
    Series {
        /// Analysis directory or config file
        root: PathBuf,
        #[arg(long)]
        x: String,
        #[arg(long)]
        y: String,
        /// Parameter filter, e.g. --where ETA=0.05
        #[arg(long = "where", value_parser = parse_assignment)]
        filters: Vec<(String, f64)>,
        /// Property upper bound, e.g. --at-most temp=0.05
        #[arg(long = "at-most", value_parser = parse_assignment)]
        bounds: Vec<(String, f64)>,
        /// Treat x as the magnetic to thermal energy ratio and add the
        /// independent-dipole expectation of y
        #[arg(long)]
        expectation: bool,
    },
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Update {
            roots,
            force,
            serial,
            run_series,
        } => {
            let options = PipelineOptions {
                force,
                parallel: !serial,
                write_run_series: run_series,
                ..PipelineOptions::default()
            };
            return cmd_update(&roots, &options);
        }
        Commands::Anal { root } => cmd_anal(&root),
        Commands::Validate { root } => cmd_validate(&root),
        Commands::Runs { root } => cmd_runs(&root),
        Commands::Mesh {
            root,
            x,
            y,
            value,
            filters,
            output,
        } => cmd_mesh(&root, x, y, value, filters, output.as_deref()),
        Commands::Series {
            root,
            x,
            y,
            filters,
            bounds,
            expectation,
        } => cmd_series(&root, &x, &y, filters, bounds, expectation),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

/// Each root is independent: a fatal error stops that root only.
fn cmd_update(roots: &[PathBuf], options: &PipelineOptions) -> ExitCode {
    let mut failed_roots = 0;
    for root in roots {
        println!("Updating: {}", root.display());
        tracing::debug!(root = %root.display(), force = options.force, "updating root");
        match update_root(root, options) {
            Ok(response) => print_update_summary(&response),
            Err(e) => {
                clear_progress_line();
                tracing::error!(root = %root.display(), error = %e, "update failed");
                eprintln!("✗ {}: {}", root.display(), e);
                failed_roots += 1;
            }
        }
    }

    if failed_roots > 0 {
        eprintln!("{failed_roots} of {} roots failed", roots.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn update_root(root: &Path, options: &PipelineOptions) -> AppResult<PipelineResponse> {
    let request = PipelineRequest {
        root,
        options: options.clone(),
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = pipeline::ensure_summary_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();
    Ok(response)
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineProgressEvent) {
    match (&event.stage, &event.compile) {
        (PipelineStage::CompilingRuns, Some(c)) => {
            let width = 28usize;
            let filled = ((c.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  runs={}/{}  failed={}  elapsed={:.1}s",
                bar,
                c.fraction_complete * 100.0,
                c.compiled,
                c.total,
                c.failed,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_update_summary(response: &PipelineResponse) {
    let m = &response.manifest;
    if response.loaded_from_cache {
        println!("✓ Summary up to date: {}", response.summary_path.display());
    } else {
        println!("✓ Summary written: {}", response.summary_path.display());
    }
    println!(
        "  Runs: {} ({} compiled, {} failed)",
        m.run_count, m.success_count, m.failure_count
    );
    println!(
        "  Rows: {}  (empty groups: {})",
        m.row_count, m.empty_group_count
    );
    if m.failure_count > 0 {
        println!("  Failures: {}", response.failures_path.display());
    }
    if response.run_series_written > 0 {
        println!("  Run series written: {}", response.run_series_written);
    }
    print_timing_summary(&response.timing);
}

fn print_timing_summary(timing: &PipelineTiming) {
    let total = timing.total_time_s.max(1.0e-12);
    let line = |label: &str, seconds: f64| {
        println!(
            "  {:<11} {:.3}s ({:.1}%)",
            label,
            seconds,
            100.0 * seconds / total
        );
    };

    println!("\nTiming summary:");
    line("Catalog:", timing.catalog_time_s);
    if timing.load_cache_time_s > 0.0 {
        line("Cache load:", timing.load_cache_time_s);
    } else {
        line("Compile:", timing.compile_time_s);
        line("Reduce:", timing.reduce_time_s);
        line("Write:", timing.write_time_s);
        if timing.run_series_time_s > 0.0 {
            line("Series:", timing.run_series_time_s);
        }
    }
    println!("  {:<11} {:.3}s", "Total:", timing.total_time_s);
}

fn cmd_validate(root: &Path) -> AppResult<()> {
    println!("Validating analysis: {}", root.display());
    let root = sp_app::AnalysisRoot::open(root)?;
    let summary = sp_app::describe_config(&root.config);
    println!("✓ Config is valid: {}", root.config_path.display());
    println!("  Name: {}", summary.name);
    println!("  Catalog: {}  Layout: {}", summary.catalog_kind, summary.layout_kind);
    println!("  Parameters: {}", summary.params.join(", "));
    if let Some(rep) = &summary.replicate_param {
        println!("  Averaged over: {}", rep);
    }
    match summary.property_count {
        Some(n) => println!("  Tracked properties: {}", n),
        None => println!("  Tracked properties: all fields"),
    }
    Ok(())
}

fn cmd_runs(root: &Path) -> AppResult<()> {
    let runs = pipeline::list_runs(root)?;
    if runs.is_empty() {
        println!("No runs found in catalog");
        return Ok(());
    }
    println!("Runs in catalog ({}):", runs.len());
    for run in runs {
        let params: Vec<String> = run
            .params()
            .iter()
            .map(|(name, v)| format!("{}={}", name, format_param(v)))
            .collect();
        println!(
            "  {}{}  [{}]  {}",
            run.job_id(),
            run.sim_id(),
            params.join(" "),
            run.path().display()
        );
    }
    Ok(())
}

fn cmd_anal(root: &Path) -> AppResult<()> {
    let loaded = pipeline::load_summary(root)?;
    let precision = loaded.root.config.output.precision;
    let fmt = |v: Option<f64>| v.map(|v| format_fixed(v, precision)).unwrap_or_default();

    println!("Summary of '{}': {} rows", loaded.root.config.name, loaded.table.len());
    println!("  {:<12} {:>6} {:>12} {:>12} {:>12}", "column", "count", "min", "max", "mean");
    for stats in query::describe_columns(&loaded.table) {
        let marker = if stats.is_param { "*" } else { " " };
        println!(
            "{} {:<12} {:>6} {:>12} {:>12} {:>12}",
            marker,
            stats.name,
            stats.count,
            fmt(stats.min),
            fmt(stats.max),
            fmt(stats.mean)
        );
    }
    println!("(* identifying parameter)");
    Ok(())
}

fn cmd_mesh(
    root: &Path,
    x: String,
    y: String,
    value: String,
    filters: Vec<(String, f64)>,
    output: Option<&Path>,
) -> AppResult<()> {
    let loaded = pipeline::load_summary(root)?;
    let precision = loaded.root.config.output.precision;
    let analysis = MeshAnalysis {
        x,
        y,
        value,
        filters,
    };
    let result = sp_app::run_analysis(&analysis, &loaded.table, output, precision)?;

    if let Some(path) = output {
        println!("✓ Exported {} mesh cells to {}", result.rows.len(), path.display());
    } else {
        let mut csv = result.header.join(",");
        csv.push('\n');
        for row in result.render_rows(2, precision) {
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        print!("{}", csv);
    }
    Ok(())
}

fn cmd_series(
    root: &Path,
    x: &str,
    y: &str,
    filters: Vec<(String, f64)>,
    bounds: Vec<(String, f64)>,
    expectation: bool,
) -> AppResult<()> {
    let loaded = pipeline::load_summary(root)?;
    let precision = loaded.root.config.output.precision;
    let selection = RowSelection {
        equals: filters,
        at_most: bounds,
    };
    let rows = query::select_rows(&loaded.table, &selection)?;

    if expectation {
        let series = query::magnetization_vs_expectation(&loaded.table, &rows, x, y)?;
        println!("{},{},expected", x, y);
        for (ratio, measured, expected) in series {
            println!(
                "{},{},{}",
                format_param(ratio),
                format_fixed(measured, precision),
                format_fixed(expected, precision)
            );
        }
    } else {
        let series = query::column_series(&loaded.table, &rows, x, y)?;
        println!("{},{}", x, y);
        for (a, b) in series {
            println!("{},{}", format_param(a), format_fixed(b, precision));
        }
    }
    Ok(())
}
