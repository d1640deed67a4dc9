//! ArduinoMCP CLI - Arduino circuit design tools from the command line.

mod protocol;
mod server;

use anyhow::{Context, Result};
use arduinomcp::generate::{generate_circuit, GenerateRequest};
use arduinomcp::purchasing::{order_parts, OrderRequest};
use arduinomcp::{
    call_tool, tool_definitions, to_svg, ArduinoMcpCore, FileValidation, Settings, Severity, Vendor,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "arduinomcp")]
#[command(about = "Arduino circuit design tools and MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a circuit schema file
    Validate {
        /// Path to a circuit schema JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if warnings found at this severity or higher
        #[arg(long, value_enum)]
        fail_on: Option<FailOnSeverity>,
    },

    /// Render a circuit schema file as an SVG schematic
    Render {
        /// Path to a circuit schema JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Emit the scene graph as JSON instead of SVG
        #[arg(long)]
        scene: bool,

        /// Power badge text (defaults to the schema's power summary)
        #[arg(long)]
        power_info: Option<String>,
    },

    /// Generate a circuit schema from a description
    Generate {
        /// What the circuit should do
        #[arg(short, long)]
        description: Option<String>,

        /// Power input, for example 5V or 12V
        #[arg(long)]
        power_supply: Option<String>,

        /// Extra component to include (repeatable)
        #[arg(long = "component")]
        components: Vec<String>,

        /// Design constraint (repeatable)
        #[arg(long = "constraint")]
        constraints: Vec<String>,
    },

    /// Quote a BOM from a circuit schema file
    Order {
        /// Circuit schema JSON file (defaults to the built-in circuit)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[arg(long, value_enum)]
        vendor: Option<VendorArg>,
    },

    /// List available tools
    Tools,

    /// Call a tool by name with JSON arguments
    Call {
        #[arg(value_name = "TOOL")]
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Run the MCP server on stdin/stdout
    Serve,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, ValueEnum)]
enum VendorArg {
    Mouser,
    Digikey,
    Either,
}

impl From<VendorArg> for Vendor {
    fn from(arg: VendorArg) -> Self {
        match arg {
            VendorArg::Mouser => Vendor::Mouser,
            VendorArg::Digikey => Vendor::Digikey,
            VendorArg::Either => Vendor::Either,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    // stdout carries tool output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let settings =
        Settings::load_or_default(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Commands::Validate {
            file,
            format,
            fail_on,
        } => handle_validate(&file, format, fail_on),
        Commands::Render {
            file,
            output,
            scene,
            power_info,
        } => handle_render(&file, output.as_deref(), scene, power_info.as_deref(), &settings),
        Commands::Generate {
            description,
            power_supply,
            components,
            constraints,
        } => {
            let request = GenerateRequest {
                description,
                requirements: None,
                power_supply,
                constraints,
                components: (!components.is_empty()).then_some(components),
            };
            print_json(&generate_circuit(&request))?;
            Ok(0)
        }
        Commands::Order { file, vendor } => handle_order(file.as_deref(), vendor, &settings),
        Commands::Tools => {
            handle_tools();
            Ok(0)
        }
        Commands::Call { tool, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let result = call_tool(&tool, &arguments, &settings)?;
            print_json(&result)?;
            Ok(0)
        }
        Commands::Serve => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut server = server::McpServer::new(stdin.lock(), stdout.lock(), settings);
            server.run().context("MCP server I/O failed")?;
            Ok(0)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_validate(file: &Path, format: OutputFormat, fail_on: Option<FailOnSeverity>) -> Result<i32> {
    let validation = ArduinoMcpCore::validate_file(file)
        .with_context(|| format!("cannot validate {}", file.display()))?;

    match format {
        OutputFormat::Human => output_human(&validation),
        OutputFormat::Json => output_json(&validation)?,
    }

    if let Some(severity) = fail_on {
        if should_fail(&validation, &severity) {
            return Ok(1);
        }
    }
    Ok(0)
}

fn should_fail(validation: &FileValidation, severity: &FailOnSeverity) -> bool {
    match severity {
        FailOnSeverity::High => validation.high_count() > 0,
        FailOnSeverity::Medium => validation.high_count() + validation.medium_count() > 0,
        FailOnSeverity::Low => !validation.report.warnings.is_empty(),
    }
}

fn output_human(validation: &FileValidation) {
    let report = &validation.report;
    println!("\nFile: {}", validation.file.display());
    println!("{}", "─".repeat(60));

    if report.warnings.is_empty() {
        println!("  No warnings found");
    }

    for (severity, heading) in [
        (Severity::High, "HIGH"),
        (Severity::Medium, "MEDIUM"),
        (Severity::Low, "LOW"),
    ] {
        let warnings: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.severity == severity)
            .collect();
        if warnings.is_empty() {
            continue;
        }
        println!("\n  {}:", heading);
        for warning in warnings {
            println!("    - [{}] {}", warning.code, warning.message);
            println!("      Fix: {}", warning.fix);
        }
    }

    println!("\n  Summary:");
    println!("    High:     {}", validation.high_count());
    println!("    Medium:   {}", validation.medium_count());
    println!("    Low:      {}", validation.low_count());
    println!("    Result:   {}", if report.pass { "PASS" } else { "FAIL" });
}

fn output_json(validation: &FileValidation) -> Result<()> {
    let output = serde_json::json!({
        "file": validation.file.display().to_string(),
        "pass": validation.report.pass,
        "warnings": validation.report.warnings,
        "stats": {
            "high": validation.high_count(),
            "medium": validation.medium_count(),
            "low": validation.low_count(),
        }
    });
    print_json(&output)
}

fn handle_render(
    file: &Path,
    output: Option<&Path>,
    scene_json: bool,
    power_info: Option<&str>,
    settings: &Settings,
) -> Result<i32> {
    let scene = ArduinoMcpCore::render_file(file, power_info, settings)
        .with_context(|| format!("cannot render {}", file.display()))?;

    let text = if scene_json {
        serde_json::to_string_pretty(&scene)?
    } else {
        to_svg(&scene)
    };

    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(path = %path.display(), "schematic written");
        }
        None => println!("{}", text),
    }
    Ok(0)
}

fn handle_order(file: Option<&Path>, vendor: Option<VendorArg>, settings: &Settings) -> Result<i32> {
    let circuit_schema = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            Some(serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))?)
        }
        None => None,
    };

    let request = OrderRequest {
        bom_list: Vec::new(),
        circuit_schema,
        preferred_vendor: vendor.map(Vendor::from),
    };
    print_json(&order_parts(&request, settings)?)?;
    Ok(0)
}

fn handle_tools() {
    println!("Available tools:\n");
    for tool in tool_definitions() {
        println!("  {}", tool.name);
        println!("    {}", tool.description);
        println!();
    }
}
