//! BoardCheck CLI - design rule checking for generated PCB designs.

use anyhow::{Context, Result};
use boardcheck::catalog::{
    calculate_power_consumption, catalog_ids, estimate_battery_life, power_breakdown,
    power_recommendations, DEFAULT_BATTERY_CAPACITY_MAH,
};
use boardcheck::export::{export_svg, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use boardcheck::{
    load_design, test_pcb_generation, validate_structure, BoardCheckCore, DrcEngine, DrcFinding,
    DrcRules, Severity, ValidationOptions, ValidationReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "boardcheck")]
#[command(about = "Design rule checking for generated PCB designs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run structural validation and DRC on a design document
    Check {
        /// Path to a design snapshot or generate_pcb_project tool call (.json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if findings exist at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,

        /// JSON file overriding DRC thresholds
        #[arg(long, value_name = "RULES.json")]
        rules: Option<PathBuf>,

        /// Run DRC even when structural validation fails
        #[arg(long)]
        lenient: bool,

        /// Comma separated check ids to run (default: all)
        #[arg(long, value_delimiter = ',')]
        checks: Vec<String>,
    },

    /// Print the structural validation report
    Structure {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Run the generation smoke test
    Smoke {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Estimate power consumption and battery life from the component catalog
    Power {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Battery capacity in mAh
        #[arg(long, default_value_t = DEFAULT_BATTERY_CAPACITY_MAH)]
        battery: f64,
    },

    /// Render the design as an SVG block schematic
    ExportSvg {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT)]
        height: u32,
    },

    /// List available DRC checks (with --verbose: descriptions and default thresholds)
    Rules,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
    /// GitLab CI format
    Gitlab,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
    Info,
}

impl From<FailOnSeverity> for Severity {
    fn from(value: FailOnSeverity) -> Self {
        match value {
            FailOnSeverity::Error => Severity::Error,
            FailOnSeverity::Warning => Severity::Warning,
            FailOnSeverity::Info => Severity::Info,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            file,
            format,
            fail_on,
            rules,
            lenient,
            checks,
        } => handle_check(&file, format, fail_on, rules.as_deref(), lenient, checks),
        Commands::Structure { file } => handle_structure(&file),
        Commands::Smoke { file } => handle_smoke(&file),
        Commands::Power { file, battery } => handle_power(&file, battery),
        Commands::ExportSvg {
            file,
            output,
            width,
            height,
        } => handle_export(&file, output.as_deref(), width, height),
        Commands::Rules => {
            handle_rules(cli.verbose);
            Ok(0)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    process::exit(exit_code);
}

fn handle_check(
    file: &Path,
    format: OutputFormat,
    fail_on: Option<FailOnSeverity>,
    rules: Option<&Path>,
    lenient: bool,
    checks: Vec<String>,
) -> Result<i32> {
    let rules = match rules {
        Some(path) => DrcRules::load_file(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
        None => DrcRules::default(),
    };
    let options = ValidationOptions {
        enforce_structure: !lenient,
        rules,
        checks,
    };

    let report = BoardCheckCore::validate_file(file, &options)
        .with_context(|| format!("failed to validate {}", file.display()))?;

    output_report(file, &report, &format)?;

    match fail_on {
        Some(threshold) if report.fails_at(threshold.into()) => Ok(1),
        _ => Ok(0),
    }
}

fn output_report(file: &Path, report: &ValidationReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => output_human(file, report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Github => output_github(file, report),
        OutputFormat::Gitlab => output_gitlab(file, report)?,
    }
    Ok(())
}

fn print_finding(finding: &DrcFinding) {
    println!("    - [{}] {}", finding.kind.as_str(), finding.message);
    if let Some(ref components) = finding.components {
        println!("      Components: {}", components.join(", "));
    }
}

fn output_human(file: &Path, report: &ValidationReport) {
    println!("\nDesign: {}", report.design.as_deref().unwrap_or("design"));
    println!("File:   {}", file.display());
    if let Some(board) = report.board {
        println!(
            "Board:  {}x{}mm, {} layers",
            board.width_mm, board.height_mm, board.layers
        );
    }
    println!("{}", "─".repeat(60));

    if !report.structure.is_valid {
        println!("\n  STRUCTURE:");
        for error in &report.structure.errors {
            println!("    - {}", error);
        }
    }
    for warning in &report.structure.warnings {
        println!("  Note: {}", warning);
    }

    if !report.drc_ran {
        println!("\n  DRC skipped (fix structural errors or pass --lenient)");
        return;
    }
    if report.total_findings() == 0 {
        println!("  No findings");
        return;
    }

    for (title, severity) in [
        ("ERRORS", Severity::Error),
        ("WARNINGS", Severity::Warning),
        ("INFO", Severity::Info),
    ] {
        let group: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect();
        if group.is_empty() {
            continue;
        }
        println!("\n  {}:", title);
        for finding in group {
            print_finding(finding);
        }
    }

    println!("\n  Summary:");
    println!("    Errors:   {}", report.stats.error);
    println!("    Warnings: {}", report.stats.warning);
    println!("    Info:     {}", report.stats.info);
}

fn severity_to_github(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn output_github(file: &Path, report: &ValidationReport) {
    for error in &report.structure.errors {
        println!("::error file={}::{}", file.display(), error.replace('\n', " "));
    }
    for finding in &report.findings {
        println!(
            "::{} file={},title={}::{}",
            severity_to_github(finding.severity),
            file.display(),
            finding.kind.as_str(),
            finding.message.replace('\n', " ")
        );
    }
}

fn severity_to_gitlab(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "blocker",
        Severity::Warning => "major",
        Severity::Info => "info",
    }
}

fn output_gitlab(file: &Path, report: &ValidationReport) -> Result<()> {
    let path = file.display().to_string();
    let mut entries: Vec<serde_json::Value> = report
        .structure
        .errors
        .iter()
        .map(|error| {
            serde_json::json!({
                "description": error,
                "check_name": "structure",
                "severity": "blocker",
                "location": { "path": path },
            })
        })
        .collect();
    entries.extend(report.findings.iter().map(|finding| {
        serde_json::json!({
            "description": finding.message,
            "check_name": finding.kind.as_str(),
            "severity": severity_to_gitlab(finding.severity),
            "location": { "path": path },
        })
    }));
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn load(file: &Path) -> Result<boardcheck::DesignSnapshot> {
    let (snapshot, _) =
        load_design(file).with_context(|| format!("failed to load {}", file.display()))?;
    Ok(snapshot)
}

fn handle_structure(file: &Path) -> Result<i32> {
    let snapshot = load(file)?;
    let report = validate_structure(&snapshot.components, &snapshot.connections);

    println!(
        "Structure: {}",
        if report.is_valid { "valid" } else { "invalid" }
    );
    for error in &report.errors {
        println!("  error:   {}", error);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    for info in &report.info {
        println!("  info:    {}", info);
    }

    Ok(if report.is_valid { 0 } else { 1 })
}

fn handle_smoke(file: &Path) -> Result<i32> {
    let snapshot = load(file)?;
    let report = test_pcb_generation(&snapshot.components, &snapshot.connections);

    for line in &report.results {
        println!("{}", line);
    }
    println!(
        "\nSmoke test {}",
        if report.passed { "passed" } else { "failed" }
    );

    Ok(if report.passed { 0 } else { 1 })
}

fn handle_power(file: &Path, battery: f64) -> Result<i32> {
    if !battery.is_finite() || battery <= 0.0 {
        anyhow::bail!("battery capacity must be a positive number of mAh");
    }
    let snapshot = load(file)?;
    let ids = catalog_ids(&snapshot.components);
    let consumption = calculate_power_consumption(ids.as_slice());
    let estimate = estimate_battery_life(&consumption, battery);

    println!(
        "Catalog parts: {} of {} components",
        ids.len(),
        snapshot.components.len()
    );
    for entry in power_breakdown(ids.as_slice()) {
        println!(
            "  - {:<24} active {:>8.2}mA  sleep {:>6.2}mA",
            entry.name, entry.active_ma, entry.sleep_ma
        );
    }
    println!("Active current: {:.2}mA", consumption.active_total);
    println!("Sleep current:  {:.2}mA", consumption.sleep_total);
    println!("Average current: {:.2}mA", estimate.average_current_ma);
    match (estimate.hours, estimate.days) {
        (Some(hours), Some(days)) => println!(
            "Battery life ({:.0}mAh): {:.1} hours ({:.1} days)",
            estimate.capacity_mah, hours, days
        ),
        _ => println!("Battery life: unlimited (no catalog current draw)"),
    }

    if let Some(declared) = snapshot.power_specs.as_ref().and_then(|p| p.active_current_ma()) {
        println!("Declared active current: {}mA", declared);
    }

    println!("\nRecommendations:");
    for recommendation in power_recommendations(&consumption, &estimate) {
        println!(
            "  [{}] {}: {}",
            recommendation.priority.as_str(),
            recommendation.title,
            recommendation.detail
        );
    }
    Ok(0)
}

fn handle_export(file: &Path, output: Option<&Path>, width: u32, height: u32) -> Result<i32> {
    let (snapshot, _) =
        load_design(file).with_context(|| format!("failed to load {}", file.display()))?;
    let name = snapshot.name.clone().unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("design")
            .to_string()
    });
    let svg = export_svg(&name, &snapshot.components, &snapshot.connections, width, height);

    match output {
        Some(path) => {
            std::fs::write(path, svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(0)
}

fn handle_rules(verbose: bool) {
    println!("Available DRC checks:\n");

    let engine = DrcEngine::with_default_checks();
    for check in engine.checks() {
        println!("  {}", check.id());
        println!("    {}", check.name());
        if verbose {
            println!("    {}", check.description());
        }
        println!();
    }

    if verbose {
        let rules = DrcRules::default();
        println!("Default thresholds:");
        println!("  min_trace_width        {}mm", rules.min_trace_width);
        println!("  min_clearance          {}mm", rules.min_clearance);
        println!("  min_via_diameter       {}mm", rules.min_via_diameter);
        println!("  max_current_per_trace  {}A", rules.max_current_per_trace);
        println!("  max_board_temp         {}°C", rules.max_board_temp);
    }
}
