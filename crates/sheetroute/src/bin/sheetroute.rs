use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetroute::report::{default_output_name, format_number, numbers_json, render_pivot};
use sheetroute::{
    AssigneeList, Assignees, Assignment, FilterMode, HeaderStyle, Pipeline, PipelineConfig,
    SheetBook, Table, extract_column_a, open_book, open_first_table, write_table,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const ENRICHED_SHEET: &str = "Enriched";
const ASSIGNED_SHEET: &str = "Assigned";

/// Deduplicate, enrich and round-robin assign spreadsheet exports
#[derive(Parser)]
#[command(name = "sheetroute", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML file overriding the default pipeline configuration
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the raw export and append the info/duplicate lookup columns
    Process(ProcessArgs),
    /// Drop resolved rows, bucket the rest and assign owners round-robin
    Assign(AssignArgs),
    /// `process` followed by `assign`
    Run(RunArgs),
    /// Print the sorted unique numbers found in column A of the first sheet
    Extract(ExtractArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Primary export (first worksheet is used)
    #[arg(long)]
    raw: PathBuf,
    /// Workbook holding the info worksheet
    #[arg(long)]
    info: PathBuf,
    /// Workbook holding the duplicate worksheet
    #[arg(long)]
    duplicate: PathBuf,
}

#[derive(Args)]
struct AssigneeArgs {
    /// CN assignees, separated by commas, semicolons or newlines
    #[arg(long)]
    cn: Option<String>,
    #[arg(long)]
    jp: Option<String>,
    #[arg(long)]
    special: Option<String>,
    #[arg(long)]
    general: Option<String>,
}

impl AssigneeArgs {
    fn to_assignees(&self) -> Assignees {
        let parse = |names: &Option<String>| {
            names
                .as_deref()
                .map(AssigneeList::parse)
                .unwrap_or_default()
        };
        Assignees {
            cn: parse(&self.cn),
            jp: parse(&self.jp),
            special: parse(&self.special),
            general: parse(&self.general),
        }
    }
}

#[derive(Args)]
struct ProcessArgs {
    #[command(flatten)]
    sources: SourceArgs,
    /// none, prioritize-flagged or only-flagged
    #[arg(long, default_value_t = FilterMode::None)]
    mode: FilterMode,
    /// Output file (.xlsx or .csv); defaults to a timestamped xlsx name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct AssignArgs {
    /// Enriched table produced by `process`
    #[arg(short, long)]
    input: PathBuf,
    #[command(flatten)]
    assignees: AssigneeArgs,
    #[arg(long, default_value_t = FilterMode::None)]
    mode: FilterMode,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the pivot as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    sources: SourceArgs,
    #[command(flatten)]
    assignees: AssigneeArgs,
    #[arg(long, default_value_t = FilterMode::None)]
    mode: FilterMode,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also save the intermediate enriched table
    #[arg(long)]
    enriched_output: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    input: PathBuf,
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
    debug!(verbose, "sheetroute started");
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let pipeline = Pipeline::new(config).context("invalid pipeline configuration")?;
    match cli.command {
        Commands::Process(args) => cmd_process(&pipeline, args),
        Commands::Assign(args) => cmd_assign(&pipeline, args),
        Commands::Run(args) => cmd_run(&pipeline, args),
        Commands::Extract(args) => cmd_extract(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: PipelineConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

struct Inputs {
    raw: Table,
    info: SheetBook,
    duplicates: SheetBook,
}

fn read_book(path: &Path) -> Result<SheetBook> {
    open_book(path).with_context(|| format!("failed to read {}", path.display()))
}

/// The three sources are independent, so decode them in parallel.
fn load_inputs(sources: &SourceArgs) -> Result<Inputs> {
    let _span = tracing::info_span!("load_inputs").entered();
    let (raw, (info, duplicates)) = rayon::join(
        || {
            open_first_table(&sources.raw)
                .with_context(|| format!("failed to read {}", sources.raw.display()))
        },
        || rayon::join(|| read_book(&sources.info), || read_book(&sources.duplicate)),
    );
    let raw = raw?;
    debug!(sheet = raw.name.as_str(), rows = raw.table.len(), "loaded raw table");
    Ok(Inputs {
        raw: raw.table,
        info: info?,
        duplicates: duplicates?,
    })
}

fn save(path: &Path, sheet: &str, table: &Table) -> Result<()> {
    write_table(path, sheet, table, Some(&HeaderStyle::default()))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

fn output_or_default(output: Option<PathBuf>, stage: &str) -> PathBuf {
    output.unwrap_or_else(|| default_output_name(stage, chrono::Local::now().naive_local()))
}

fn print_pivot(assignment: &Assignment, owner_header: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&assignment.pivot)?);
    } else {
        print!("{}", render_pivot(&assignment.pivot, owner_header));
    }
    Ok(())
}

fn effective_assignees(pipeline: &Pipeline, args: &AssigneeArgs) -> Assignees {
    pipeline
        .config()
        .assignees
        .clone()
        .overridden_by(&args.to_assignees())
}

fn cmd_process(pipeline: &Pipeline, args: ProcessArgs) -> Result<()> {
    let inputs = load_inputs(&args.sources)?;
    let enriched = pipeline.process(inputs.raw, &inputs.info, &inputs.duplicates, args.mode)?;
    let output = output_or_default(args.output, "enriched");
    save(&output, ENRICHED_SHEET, &enriched)?;
    println!("{}", output.display());
    Ok(())
}

fn cmd_assign(pipeline: &Pipeline, args: AssignArgs) -> Result<()> {
    let enriched = open_first_table(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let assignees = effective_assignees(pipeline, &args.assignees);
    let assignment = pipeline.assign(enriched.table, &assignees, args.mode)?;
    let output = output_or_default(args.output, "assigned");
    save(&output, ASSIGNED_SHEET, &assignment.table)?;
    print_pivot(&assignment, &pipeline.config().owner_header, args.json)
}

fn cmd_run(pipeline: &Pipeline, args: RunArgs) -> Result<()> {
    let inputs = load_inputs(&args.sources)?;
    let enriched = pipeline.process(inputs.raw, &inputs.info, &inputs.duplicates, args.mode)?;
    if let Some(path) = &args.enriched_output {
        save(path, ENRICHED_SHEET, &enriched)?;
    }
    let assignees = effective_assignees(pipeline, &args.assignees);
    let assignment = pipeline.assign(enriched, &assignees, args.mode)?;
    let output = output_or_default(args.output, "assigned");
    save(&output, ASSIGNED_SHEET, &assignment.table)?;
    print_pivot(&assignment, &pipeline.config().owner_header, args.json)
}

fn cmd_extract(args: ExtractArgs) -> Result<()> {
    let sheet = open_first_table(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let values = extract_column_a(&sheet.table);
    if args.json {
        println!("{}", numbers_json(&values));
    } else {
        for v in values {
            println!("{}", format_number(v));
        }
    }
    Ok(())
}
