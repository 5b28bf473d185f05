//! pagestruct CLI - structural analysis of extracted document content

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagestruct::render::AnalysisSummary;
use pagestruct::{AnalysisOptions, Category, Document, DocumentInput, JsonFormat, StructureAnalyzer};

#[derive(Parser)]
#[command(name = "pagestruct")]
#[command(version)]
#[command(about = "Classify, order and chunk extracted document content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze extractor output into a structured document (JSON)
    Analyze {
        /// Extractor output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Analysis options (JSON)
        #[arg(short, long, value_name = "FILE", env = "PAGESTRUCT_CONFIG")]
        config: Option<PathBuf>,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Analyze and print the text chunks (JSON)
    Chunks {
        /// Extractor output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Analysis options (JSON)
        #[arg(short, long, value_name = "FILE", env = "PAGESTRUCT_CONFIG")]
        config: Option<PathBuf>,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Print the main text (body and titles) in reading order
    Text {
        /// Extractor output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Analysis options (JSON)
        #[arg(short, long, value_name = "FILE", env = "PAGESTRUCT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show document statistics and quality metrics
    Info {
        /// Extractor output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Analysis options (JSON)
        #[arg(short, long, value_name = "FILE", env = "PAGESTRUCT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the default analysis options
    Config {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze {
            input,
            output,
            compact,
            config,
            sequential,
        }) => cmd_analyze(&input, output.as_deref(), compact, config.as_deref(), sequential),
        Some(Commands::Chunks {
            input,
            output,
            compact,
            config,
            sequential,
        }) => cmd_chunks(&input, output.as_deref(), compact, config.as_deref(), sequential),
        Some(Commands::Text {
            input,
            output,
            config,
        }) => cmd_text(&input, output.as_deref(), config.as_deref()),
        Some(Commands::Info {
            input,
            json,
            config,
        }) => cmd_info(&input, json, config.as_deref()),
        Some(Commands::Config { output }) => cmd_config(output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pagestruct <COMMAND> <FILE>".yellow());
            println!("       pagestruct --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load options from a config file, or use the defaults.
fn load_options(
    config: Option<&Path>,
    sequential: bool,
) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => AnalysisOptions::load(path)?,
        None => AnalysisOptions::default(),
    };
    if sequential {
        options = options.sequential();
    }
    Ok(options)
}

/// Read the input and run the analysis behind a progress spinner.
fn run_analysis(
    input: &Path,
    options: AnalysisOptions,
) -> Result<Document, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading extractor output...");
    let source = DocumentInput::from_file(input)?;
    log::debug!("Loaded {} pages from {}", source.pages.len(), input.display());
    pb.inc(1);

    pb.set_message(format!("Analyzing {} pages...", source.pages.len()));
    let doc = StructureAnalyzer::new(options)?.analyze(&source)?;
    log::debug!(
        "{} blocks, {} matches, {} chunks",
        doc.block_count(),
        doc.matches().len(),
        doc.chunks().len()
    );
    pb.inc(1);

    pb.finish_and_clear();
    Ok(doc)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    config: Option<&Path>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config, sequential)?;
    let doc = run_analysis(input, options)?;

    let json = pagestruct::render::to_json(&doc, json_format(compact))?;
    write_output(output, &json)
}

fn cmd_chunks(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    config: Option<&Path>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config, sequential)?;
    let doc = run_analysis(input, options)?;

    let json = pagestruct::render::chunks_to_json(doc.chunks(), json_format(compact))?;
    write_output(output, &json)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config, false)?;
    let doc = run_analysis(input, options)?;

    let text = pagestruct::render::to_text(&doc);
    write_output(output, &text)
}

fn cmd_info(
    input: &Path,
    json: bool,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config, false)?;
    let doc = run_analysis(input, options)?;
    let summary = AnalysisSummary::from_document(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let metadata = &summary.metadata;
    let stats = &summary.stats;
    let report = &summary.report;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    println!("{}: {:?}", "Text source".bold(), metadata.text_source);
    println!("{}: {}", "Analyzed".bold(), metadata.analyzed_at);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for category in Category::ALL {
        println!("{}: {}", category.as_str().bold(), stats.block_count(category));
    }
    for (element_type, count) in &stats.elements {
        println!("{}: {}", element_type.as_str().bold(), count);
    }
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
    println!(
        "{}: {:.1}",
        "Words per body block".bold(),
        stats.avg_words_per_body_block
    );
    println!("{}: {}", "Chunks".bold(), stats.chunk_count);

    println!();
    println!("{}", "Captions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Matches".bold(), stats.match_count);
    for (match_type, count) in &stats.matches_by_type {
        println!("  {} {}: {}", "├─".dimmed(), match_type, count);
    }
    println!("{}: {}", "Orphan captions".bold(), stats.orphan_captions);
    println!("{}: {}", "Orphan elements".bold(), stats.orphan_elements);
    println!("{}: {}", "Recovered from body".bold(), report.recovered_captions);

    println!();
    println!("{}", "Quality".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {:.0}%", "Text coverage".bold(), report.text_coverage * 100.0);
    if let Some(quality) = report.ocr_quality {
        println!("{}: {:.2}", "OCR quality".bold(), quality);
    }
    if let Some(confidence) = stats.avg_ocr_confidence {
        println!("{}: {:.1}", "OCR confidence".bold(), confidence);
    }
    println!("{}: {}", "Repaired blocks".bold(), report.repaired_blocks);
    println!(
        "{}: {}",
        "Dropped layout regions".bold(),
        report.dropped_layout_regions
    );
    println!(
        "{}: {}",
        "Low-confidence OCR lines".bold(),
        report.low_confidence_lines
    );

    let skipped = if report.is_clean() {
        "None".green().to_string()
    } else {
        format!(
            "{} pages {:?}, {} lines",
            report.skipped_pages.len(),
            report.skipped_pages,
            report.skipped_lines
        )
        .yellow()
        .to_string()
    };
    println!("{}: {}", "Skipped".bold(), skipped);

    Ok(())
}

fn cmd_config(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = AnalysisOptions::default();
    match output {
        Some(path) => {
            options.save(path)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&options)?),
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagestruct".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structural analysis of extracted document content");
    println!();
    println!("License: MIT");
}
