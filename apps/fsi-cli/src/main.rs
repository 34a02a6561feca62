use clap::{Parser, Subcommand};
use fsi_config::{ConfigError, ConfigResult, FsiProperties};
use fsi_coupling::{CouplingSchemeKind, FsiProgress, FsiRecord, run_fsi_with_progress};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fsi-cli")]
#[command(about = "FSI coupling CLI - partitioned fluid-structure interaction runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a coupling properties file
    Validate {
        /// Path to the properties YAML (or .json) file
        properties_path: PathBuf,
    },
    /// List the registered flow and stress model types
    Models,
    /// Run a coupled simulation
    Run {
        /// Path to the properties YAML (or .json) file
        properties_path: PathBuf,
        /// Override the coupling scheme
        #[arg(long)]
        scheme: Option<String>,
        /// Override the time step in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Write the per-step history (and probe samples) as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ConfigResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { properties_path } => cmd_validate(&properties_path),
        Commands::Models => {
            cmd_models();
            Ok(())
        }
        Commands::Run {
            properties_path,
            scheme,
            dt,
            t_end,
            output,
        } => cmd_run(&properties_path, scheme, dt, t_end, output.as_deref()),
    }
}

fn load_properties(path: &Path) -> ConfigResult<FsiProperties> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => fsi_config::load_json(path),
        _ => fsi_config::load_yaml(path),
    }
}

fn cmd_validate(properties_path: &Path) -> ConfigResult<()> {
    println!("Validating properties: {}", properties_path.display());
    let props = load_properties(properties_path)?;
    fsi_config::validate_models(&props, &fsi_models::builtin_registry())?;
    let settings = props.to_settings()?;
    println!("✓ Properties are valid");
    println!(
        "  {}: {} coupling, flow={}, stress={}",
        props.name,
        settings.scheme.name(),
        props.flow.type_name,
        props.stress.type_name
    );
    Ok(())
}

fn cmd_models() {
    let registry = fsi_models::builtin_registry();
    println!("Flow models:");
    for name in registry.flow_types() {
        println!("  {}", name);
    }
    println!("Stress models:");
    for name in registry.stress_types() {
        println!("  {}", name);
    }
}

fn cmd_run(
    properties_path: &Path,
    scheme: Option<String>,
    dt: Option<f64>,
    t_end: Option<f64>,
    output: Option<&Path>,
) -> ConfigResult<()> {
    let mut props = load_properties(properties_path)?;
    if let Some(scheme) = scheme {
        // reject typos before they reach the properties
        scheme.parse::<CouplingSchemeKind>()?;
        props.coupling.scheme = scheme;
    }
    if let Some(dt) = dt {
        props.run.dt_s = dt;
    }
    if let Some(t_end) = t_end {
        props.run.t_end_s = t_end;
    }
    fsi_config::validate_properties(&props)?;

    let registry = fsi_models::builtin_registry();
    let mut fsi = props.build_serial_interface(&registry)?;
    let opts = props.run_options();

    println!("Running: {}", props.name);
    println!(
        "  scheme = {}, dt = {:.3e} s, t_end = {:.3} s",
        fsi.settings().scheme.name(),
        props.run.dt_s,
        props.run.t_end_s
    );

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let record = run_fsi_with_progress(
        &mut fsi,
        &opts,
        Some(&mut |p: FsiProgress| {
            let emit_now = (p.fraction_complete - last_fraction).abs() >= 0.005
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&p, started.elapsed().as_secs_f64());
                last_fraction = p.fraction_complete;
                last_emit = Instant::now();
            }
        }),
    )
    .map_err(ConfigError::from)?;
    clear_progress_line();

    print_summary(&record, started.elapsed().as_secs_f64());

    if let Some(path) = output {
        write_csv(path, &record)?;
        println!("  History written to {}", path.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(p: &FsiProgress, elapsed_s: f64) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let residual = p
        .residual_norm
        .map(|r| format!("{:.3e}", r))
        .unwrap_or_else(|| "-".to_string());
    print!(
        "\r[{}] {:>6.2}%  t={:.4}/{:.4}s  step={}  outer={}  residual={}  elapsed={:.1}s",
        bar,
        p.fraction_complete * 100.0,
        p.time,
        p.t_end,
        p.step,
        p.outer_iterations,
        residual,
        elapsed_s
    );
    let _ = io::stdout().flush();
}

fn print_summary(record: &FsiRecord, elapsed_s: f64) {
    let steps = record.steps.len();
    let unconverged = record.steps.iter().filter(|s| !s.converged).count();
    let rebuilds = record
        .steps
        .iter()
        .filter(|s| s.interpolator_rebuilt)
        .count();
    if unconverged == 0 {
        println!("✓ Run completed");
    } else {
        println!("⚠ Run completed with {} unconverged step(s)", unconverged);
    }
    println!("  Steps: {}", steps);
    println!("  Outer iterations: {}", record.total_outer_iterations());
    if steps > 0 {
        println!(
            "  Mean outer iterations per step: {:.2}",
            record.total_outer_iterations() as f64 / steps as f64
        );
    }
    println!("  Interpolator rebuilds: {}", rebuilds);
    if let Some(last) = record.probe.last() {
        let d = last.displacement;
        println!(
            "  Probe displacement at t={:.4}s: ({:.4e}, {:.4e}, {:.4e}) m",
            last.time, d.x, d.y, d.z
        );
    }
    println!("  Wall time: {:.2} s", elapsed_s);
}

fn write_csv(path: &Path, record: &FsiRecord) -> ConfigResult<()> {
    let mut out = String::new();
    out.push_str("step,time_s,outer_iterations,converged,residual_norm,max_residual_norm,relaxation_factor,interpolator_rebuilt");
    let has_probe = !record.probe.is_empty();
    if has_probe {
        out.push_str(",probe_dx_m,probe_dy_m,probe_dz_m,probe_vx_mps,probe_vy_mps,probe_vz_mps");
    }
    out.push('\n');

    let opt = |v: Option<f64>| v.map(|x| format!("{:e}", x)).unwrap_or_default();
    for (i, step) in record.steps.iter().enumerate() {
        out.push_str(&format!(
            "{},{:e},{},{},{},{},{},{}",
            step.index,
            step.time,
            step.outer_iterations,
            step.converged,
            opt(step.residual_norm),
            opt(step.max_residual_norm),
            opt(step.relaxation_factor),
            step.interpolator_rebuilt
        ));
        if let Some(sample) = record.probe.get(i) {
            let d = sample.displacement;
            out.push_str(&format!(",{:e},{:e},{:e}", d.x, d.y, d.z));
            match sample.velocity {
                Some(v) => out.push_str(&format!(",{:e},{:e},{:e}", v.x, v.y, v.z)),
                None => out.push_str(",,,"),
            }
        }
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}
