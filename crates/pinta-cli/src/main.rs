use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pinta")]
#[command(about = "Pinta - context-sensitive points-to analysis and call graph construction")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    Analyze {
        input: PathBuf,

        #[arg(long)]
        cs: Option<String>,

        #[arg(long, value_enum)]
        heap_model: Option<HeapModel>,

        #[arg(long)]
        only_app: bool,

        #[arg(long)]
        options: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        json: bool,

        #[arg(long, conflicts_with_all = ["output", "json"])]
        compare: Option<PathBuf>,
    },

    Callgraph {
        input: PathBuf,

        #[arg(long, default_value = "cipta")]
        algorithm: String,

        #[arg(long, default_value = "ci")]
        cs: String,

        #[arg(long)]
        dot: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    Validate {
        input: PathBuf,
    },

    DumpIr {
        input: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeapModel {
    AllocSite,
    Type,
}

impl From<HeapModel> for pinta_core::analysis::HeapModelKind {
    fn from(model: HeapModel) -> Self {
        match model {
            HeapModel::AllocSite => pinta_core::analysis::HeapModelKind::AllocSite,
            HeapModel::Type => pinta_core::analysis::HeapModelKind::Type,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            input,
            cs,
            heap_model,
            only_app,
            options,
            output,
            json,
            compare,
        } => {
            let options = analysis_options(options.as_deref(), cs, heap_model, only_app)?;
            cmd_analyze(input, options, output, json, compare, cli.verbose)
        }
        Commands::Callgraph {
            input,
            algorithm,
            cs,
            dot,
            json,
        } => cmd_callgraph(input, &algorithm, &cs, dot, json, cli.verbose),
        Commands::Validate { input } => cmd_validate(input, cli.verbose),
        Commands::DumpIr { input, json } => cmd_dump_ir(input, json),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Explicit flags override the `--options` string.
fn analysis_options(
    options: Option<&str>,
    cs: Option<String>,
    heap_model: Option<HeapModel>,
    only_app: bool,
) -> Result<pinta_core::analysis::AnalysisOptions> {
    use pinta_core::analysis::{AnalysisOptions, SelectorRegistry};

    let mut parsed = match options {
        Some(text) => AnalysisOptions::parse(text)
            .with_context(|| format!("invalid analysis options {:?}", text))?,
        None => AnalysisOptions::default(),
    };
    if let Some(cs) = cs {
        parsed.cs = cs;
    }
    if let Some(model) = heap_model {
        parsed.heap_model = model.into();
    }
    if only_app {
        parsed.only_app = true;
    }
    parsed
        .validate(&SelectorRegistry::default())
        .with_context(|| format!("invalid context sensitivity {:?}", parsed.cs))?;
    Ok(parsed)
}

fn load_program(input: &Path) -> Result<pinta_core::Program> {
    pinta_parser::load(input).with_context(|| format!("failed to load {}", input.display()))
}

fn cmd_analyze(
    input: PathBuf,
    options: pinta_core::analysis::AnalysisOptions,
    output: Option<PathBuf>,
    json: bool,
    compare: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    use colored::*;
    use pinta_core::analysis::PointerAnalysis;
    use pinta_emit::{Emitter, EmitterConfig, ResultComparator, ResultDumper, ResultReport};
    use std::fs;

    if verbose {
        eprintln!("{}", " Pinta Pointer Analysis".bright_blue().bold());
        eprintln!("{}", "=".repeat(50).bright_blue());
        eprintln!(" Input: {}", input.display());
        eprintln!(" Options: {}", options);
        eprintln!();
    }

    let program = load_program(&input)?;
    let result = PointerAnalysis::new(options).analyze(&program)?;

    if verbose {
        let stats = result.statistics();
        eprintln!(" Reachable methods: {}", stats.reachable_methods);
        eprintln!(" Context-sensitive methods: {}", stats.cs_methods);
        eprintln!(" Call edges: {}", stats.call_edges);
        eprintln!(" Pointers: {}", stats.pointers);
        eprintln!(" Objects: {}", stats.objects);
        eprintln!(" Contexts: {}", stats.contexts);
        eprintln!("   Time: {:.3}s", stats.elapsed.as_secs_f64());
        eprintln!();
    }

    let dumper = ResultDumper::new(EmitterConfig::plain());
    let report = dumper.report(&result);

    if let Some(expected_path) = compare {
        let expected_text = fs::read_to_string(&expected_path)
            .with_context(|| format!("failed to read {}", expected_path.display()))?;
        let expected = if expected_path.extension().is_some_and(|ext| ext == "json") {
            ResultReport::from_json(&expected_text)?
        } else {
            ResultReport::parse(&expected_text)
        };

        let mismatches = ResultComparator::new().compare(&expected, &report);
        if mismatches.is_empty() {
            println!("{}", " MATCH".bright_green().bold());
            return Ok(());
        }
        println!("{}", " MISMATCH".bright_red().bold());
        for mismatch in &mismatches {
            println!("{}", mismatch);
        }
        bail!(
            "{} mismatch(es) against {}",
            mismatches.len(),
            expected_path.display()
        );
    }

    let text = if json {
        report.to_json()?
    } else {
        dumper.emit_to_string(&report)?
    };
    write_output(output.as_deref(), &text, verbose)
}

fn cmd_callgraph(
    input: PathBuf,
    algorithm: &str,
    cs: &str,
    dot: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    use colored::*;
    use pinta_core::analysis::{AnalysisOptions, CallGraphAlgorithm};
    use pinta_emit::{CallGraphEmitter, Emitter, EmitterConfig, OutputFormat};
    use std::fs;

    let algorithm: CallGraphAlgorithm = algorithm.parse()?;
    let program = load_program(&input)?;
    let graph = algorithm
        .builder(&AnalysisOptions::with_cs(cs))
        .build(&program)?;

    if verbose {
        eprintln!(
            " {} call graph: {} reachable methods, {} edges",
            algorithm.as_str().bright_cyan(),
            graph.number_of_methods(),
            graph.number_of_edges()
        );
    }

    if let Some(dot_path) = dot {
        let dot_text = CallGraphEmitter::new(&program, EmitterConfig::plain())
            .with_format(OutputFormat::Dot)
            .emit_to_string(&graph)?;
        fs::write(&dot_path, dot_text)
            .with_context(|| format!("failed to write {}", dot_path.display()))?;
        if verbose {
            eprintln!("   DOT graph: {}", dot_path.display());
        }
    }

    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let text = CallGraphEmitter::new(&program, EmitterConfig::plain())
        .with_format(format)
        .emit_to_string(&graph)?;
    print!("{}", text);
    Ok(())
}

fn cmd_validate(input: PathBuf, verbose: bool) -> Result<()> {
    use colored::*;

    if verbose {
        eprintln!("{}", " Validating .pir input".bright_cyan().bold());
        eprintln!(" Input: {}", input.display());
        eprintln!();
    }

    match pinta_parser::load(&input) {
        Ok(program) => {
            println!("{}", " VALID".bright_green().bold());
            if verbose {
                println!(
                    "   {} classes, {} methods, {} statements",
                    program.classes().len(),
                    program.methods().len(),
                    program.number_of_statements()
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", "Error:".bright_red());
            println!("{}", e);
            Err(anyhow::anyhow!("Validation failed"))
        }
    }
}

fn cmd_dump_ir(input: PathBuf, json: bool) -> Result<()> {
    use pinta_emit::{Emitter, EmitterConfig, IrPrinter};

    let program = load_program(&input)?;
    let text = if json {
        pinta_core::persist::program_to_json(&program)?
    } else {
        IrPrinter::new(EmitterConfig::plain()).emit_to_string(&program)?
    };
    print!("{}", text);
    Ok(())
}

fn write_output(output: Option<&Path>, text: &str, verbose: bool) -> Result<()> {
    use colored::*;

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if verbose {
                eprintln!(
                    " {} Results written to {}",
                    "SUCCESS:".bright_green().bold(),
                    path.display()
                );
            }
        }
        None => print!("{}", text),
    }
    Ok(())
}
