//! quizpdf CLI - exam PDF to question JSON

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use quizpdf::render::{self, JsonFormat, QUESTIONS_FILE, STRUCTURED_CONTENT_FILE};
use quizpdf::{
    BlockExtractor, ErrorMode, ExtractOptions, PageBlocks, PageSelection, ReconstructOptions,
    Reconstructor,
};

/// Default output directory for extraction artifacts.
const DEFAULT_OUTPUT_DIR: &str = "pdf_structured_output";

#[derive(Parser)]
#[command(name = "quizpdf")]
#[command(version)]
#[command(about = "Rebuild multiple-choice questions from exam PDFs", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract page blocks and images from a PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "QUIZPDF_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Fail on the first broken page instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Rebuild questions from extracted page blocks
    Reconstruct {
        /// structured_content.json produced by `extract`
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file ("-" for stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Process questions on a single thread
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract and rebuild questions in one run
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "QUIZPDF_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Fail on the first broken page instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information and question counts
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            pages,
            strict,
            compact,
        }) => cmd_extract(&input, &output, pages.as_deref(), strict, json_format(compact)),
        Some(Commands::Reconstruct {
            input,
            output,
            sequential,
            compact,
        }) => cmd_reconstruct(
            input.as_deref(),
            output.as_deref(),
            sequential,
            json_format(compact),
        ),
        Some(Commands::Convert {
            input,
            output,
            pages,
            strict,
            compact,
        }) => cmd_convert(&input, &output, pages.as_deref(), strict, json_format(compact)),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                let output = cli
                    .output
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
                cmd_convert(&input, &output, None, false, JsonFormat::Pretty)
            } else {
                println!("{}", "Usage: quizpdf <FILE> [OUTPUT]".yellow());
                println!("       quizpdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn extract_options(
    output_dir: &Path,
    pages: Option<&str>,
    strict: bool,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };
    let error_mode = if strict {
        ErrorMode::Strict
    } else {
        ErrorMode::Lenient
    };

    Ok(ExtractOptions::new()
        .with_error_mode(error_mode)
        .with_pages(page_selection)
        .with_image_dir(output_dir.join(quizpdf::parser::DEFAULT_IMAGE_PREFIX)))
}

fn progress_bar(steps: u64) -> ProgressBar {
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn extract_pages(
    input: &Path,
    options: ExtractOptions,
    pb: &ProgressBar,
) -> Result<Vec<PageBlocks>, Box<dyn std::error::Error>> {
    pb.set_message("Extracting page blocks...");
    let extractor = BlockExtractor::open_with_options(input, options)?;
    let pages = extractor.extract()?;
    pb.inc(1);
    Ok(pages)
}

fn cmd_extract(
    input: &Path,
    output_dir: &Path,
    pages: Option<&str>,
    strict: bool,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = extract_options(output_dir, pages, strict)?;

    let pb = progress_bar(2);
    let pages = extract_pages(input, options, &pb)?;

    pb.set_message("Writing JSON...");
    render::write_pages(output_dir.join(STRUCTURED_CONTENT_FILE), &pages, format)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    let images: usize = pages.iter().map(PageBlocks::image_count).sum();
    println!(
        "\n{} {} pages, {} images",
        "Extracted".green().bold(),
        pages.len(),
        images
    );
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), STRUCTURED_CONTENT_FILE);
    println!("  {} images/", "└─".dimmed());

    Ok(())
}

/// Where `reconstruct` writes when no output is given: next to the input.
fn default_questions_path(input: &Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(QUESTIONS_FILE))
        .unwrap_or_else(|| PathBuf::from(QUESTIONS_FILE))
}

fn cmd_reconstruct(
    input: Option<&Path>,
    output: Option<&Path>,
    sequential: bool,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR).join(STRUCTURED_CONTENT_FILE));

    let pages = render::read_pages(&input)?;
    let options = ReconstructOptions::new().with_parallel(!sequential);
    let questions = Reconstructor::with_options(options).reconstruct(&pages);

    match output {
        Some(path) if path == Path::new("-") => {
            println!("{}", render::questions_to_json(&questions, format)?);
        }
        _ => {
            let path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_questions_path(&input));
            render::write_questions(&path, &questions, format)?;
            println!(
                "{} {} questions to {}",
                "Saved".green(),
                questions.len(),
                path.display()
            );
        }
    }

    Ok(())
}

fn cmd_convert(
    input: &Path,
    output_dir: &Path,
    pages: Option<&str>,
    strict: bool,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = extract_options(output_dir, pages, strict)?;

    let pb = progress_bar(3);
    let pages = extract_pages(input, options, &pb)?;

    pb.set_message("Rebuilding questions...");
    let questions = Reconstructor::new().reconstruct(&pages);
    pb.inc(1);

    pb.set_message("Writing JSON...");
    render::write_pages(output_dir.join(STRUCTURED_CONTENT_FILE), &pages, format)?;
    render::write_questions(output_dir.join(QUESTIONS_FILE), &questions, format)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    let answered = questions
        .iter()
        .filter(|q| q.correct_answer.is_some())
        .count();
    println!(
        "\n{} {} questions ({} with answer key)",
        "Rebuilt".green().bold(),
        questions.len(),
        answered
    );
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), STRUCTURED_CONTENT_FILE);
    println!("  {} {}", "├─".dimmed(), QUESTIONS_FILE);
    println!("  {} images/", "└─".dimmed());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient dry run: report what can be read without writing images
    let extractor = BlockExtractor::open_with_options(input, ExtractOptions::new().lenient())?;
    let info = extractor.info();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.pdf_version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = info.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = info.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = info.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = info.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = info.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = info.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    let pages = extractor.extract()?;
    let questions = Reconstructor::new().reconstruct(&pages);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let texts: usize = pages.iter().map(PageBlocks::text_count).sum();
    let images: usize = pages.iter().map(PageBlocks::image_count).sum();
    let answered = questions
        .iter()
        .filter(|q| q.correct_answer.is_some())
        .count();

    println!("{}: {}", "Text blocks".bold(), texts);
    println!("{}: {}", "Image blocks".bold(), images);
    println!("{}: {}", "Questions".bold(), questions.len());
    println!("{}: {}", "With answer key".bold(), answered);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "quizpdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam PDF question extraction tool");
    println!();
    println!("License: MIT");
}
