//! texbook CLI - LaTeX manuscript to Quarto book converter
//!
//! Builds the book, generates the reference README and post-processes the
//! rendered HTML.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use texbook::{
    generate_readme, prepare_input, randomize_file, BookBuilder, BookConfig, BuildReport,
};
use tracing_subscriber::EnvFilter;

/// LaTeX manuscript to Quarto book conversion
#[derive(Parser)]
#[command(
    name = "texbook",
    version,
    about = "Convert a LaTeX manuscript into a Quarto book",
    long_about = "texbook - LaTeX manuscript to Quarto book converter.\n\n\
                  Converts each section with Pandoc, normalizes citations, headings,\n\
                  acronyms and images, and writes the Quarto project files.\n\n\
                  Usage:\n  \
                  texbook build --input-dir latex --output-dir book\n  \
                  texbook readme --sections-dir latex/sections --bib latex/references.bib\n  \
                  texbook authors --docs-dir docs\n\n\
                  Log output is controlled with RUST_LOG (default: info)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Quarto book from LaTeX sources
    Build {
        /// Directory containing main.tex and sections/
        #[arg(long, default_value = ".")]
        input_dir: PathBuf,

        /// Output directory for the Quarto book
        #[arg(long, default_value = "../quarto_book")]
        output_dir: PathBuf,

        /// Media directory name inside the book
        #[arg(long, default_value = "media")]
        media_dir: String,

        /// ZIP file with the LaTeX sources, extracted before the build
        #[arg(long)]
        zip_file: Option<PathBuf>,

        /// Directory the ZIP file is extracted to
        #[arg(long, default_value = "extracted_latex")]
        extract_to: PathBuf,

        /// YAML file overriding the book configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Convert the split source file as a single chapter
        #[arg(long)]
        no_split: bool,

        /// Write the build report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Generate README.md listing each section's references
    Readme {
        /// Directory containing the section .tex files
        #[arg(long, default_value = "convert_book/extracted_latex/sections")]
        sections_dir: PathBuf,

        /// BibTeX bibliography
        #[arg(long, default_value = "convert_book/extracted_latex/references.bib")]
        bib: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "README.md")]
        output: PathBuf,

        /// YAML file overriding the book configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Add author-order randomization to a rendered HTML page
    Authors {
        /// HTML file to process
        input: Option<PathBuf>,

        /// Output file path (default: overwrites input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process index.html in this directory
        #[arg(long)]
        docs_dir: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Build {
            input_dir,
            output_dir,
            media_dir,
            zip_file,
            extract_to,
            config,
            no_split,
            report,
        } => {
            let mut book_config = load_config(config.as_deref())?;
            if no_split {
                book_config = book_config.without_split();
            }

            let input_dir = prepare_input(zip_file.as_deref(), &extract_to, &input_dir);
            tracing::info!(input = %input_dir.display(), "using LaTeX sources");

            let pb = create_spinner("Building book...");
            let result = BookBuilder::new(book_config).build(&input_dir, &output_dir, &media_dir);
            pb.finish_and_clear();
            let build_report = result?;

            if let Some(path) = report {
                fs::write(&path, serde_json::to_string_pretty(&build_report)?)?;
            }
            print_build_summary(&output_dir, &build_report);
        }

        Commands::Readme {
            sections_dir,
            bib,
            output,
            config,
        } => {
            let book_config = load_config(config.as_deref())?;

            let pb = create_spinner("Scanning sections...");
            let result = generate_readme(&sections_dir, &bib, &book_config.readme);
            pb.finish_and_clear();
            let (readme, summary) = result?;

            fs::write(&output, readme)?;
            println!(
                "{} README generated: {}",
                "✓".green().bold(),
                output.display()
            );
            println!("\n{}", "Summary".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Files".bold(), summary.files);
            println!("{}: {}", "Sections".bold(), summary.sections);
            println!("{}: {}", "Citations".bold(), summary.citations);
            println!("{}: {}", "Bibliography".bold(), summary.bibliography_entries);
            if !summary.missing.is_empty() {
                println!(
                    "{} {} keys missing from bibliography: {}",
                    "!".yellow().bold(),
                    summary.missing.len(),
                    summary.missing.iter().take(10).cloned().collect::<Vec<_>>().join(", ")
                );
            }
        }

        Commands::Authors {
            input,
            output,
            docs_dir,
        } => {
            let target = match (docs_dir, input) {
                (Some(docs), _) => {
                    if !docs.is_dir() {
                        return Err(format!("directory {} does not exist", docs.display()).into());
                    }
                    docs.join("index.html")
                }
                (None, Some(input)) => input,
                (None, None) => {
                    return Err("specify either an input file or --docs-dir".into());
                }
            };

            randomize_file(&target, output.as_deref())?;
            println!(
                "{} Added author randomization: {}",
                "✓".green().bold(),
                output.as_ref().unwrap_or(&target).display()
            );
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> texbook::Result<BookConfig> {
    match path {
        Some(path) => BookConfig::from_yaml_file(path),
        None => Ok(BookConfig::default()),
    }
}

fn print_build_summary(output_dir: &Path, report: &BuildReport) {
    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    for page in &report.pages {
        println!("  {} {}", "✓".green(), page);
    }

    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Sections".bold(), report.sections_converted);
    println!("{}: {}", "Fallback pages".bold(), report.sections_fallback);
    println!("{}: {}", "PDF figures".bold(), report.pdfs_converted);
    println!("{}: {}", "Equation images".bold(), report.equation_images);
    println!("{}: {}", "Acronyms".bold(), report.acronyms);

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings".yellow().bold());
        println!("{}", "─".repeat(40));
        for warning in &report.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    println!(
        "\nTo build the book, run: cd {} && quarto render",
        output_dir.display()
    );
}

fn print_version() {
    println!("{} {}", "texbook".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("LaTeX manuscript to Quarto book converter");
    println!();
    println!("External tools: pandoc, pdftoppm or ImageMagick convert");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
