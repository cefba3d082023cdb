//! pdfstruct CLI - PDF factsheet to section-tagged JSON

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfstruct::{ContextPolicy, ConvertOptions, PageSelection, PdfConverter};

#[derive(Parser)]
#[command(name = "pdfstruct")]
#[command(version)]
#[command(about = "Convert PDF fund factsheets to section-tagged JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    convert: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to JSON (same as running without a subcommand)
    Convert(ConvertArgs),

    /// Print the section anchors detected on each page
    Sections {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct ConvertArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON file (defaults to the input name with a .json extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Tag tables with the section they fall under
    #[arg(long)]
    tag_tables: bool,

    /// Tag links with the section they fall under
    #[arg(long)]
    tag_links: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    quiet: bool,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert(args)) => cmd_convert(args),
        Some(Commands::Sections { input, pages }) => cmd_sections(&input, pages.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None if cli.convert.input.is_some() => cmd_convert(cli.convert),
        None => {
            println!("{}", "Usage: pdfstruct <FILE> [OUTPUT]".yellow());
            println!("       pdfstruct --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(args: ConvertArgs) -> CliResult {
    let input = args.input.as_deref().ok_or("missing input file")?;
    let output = resolve_output(input, args.output.as_deref())?;

    let mut options = build_options(&args)?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")?
                .progress_chars("#>-"),
        );
        pb
    };

    let bar = pb.clone();
    options = options.with_progress(move |done, total| {
        bar.set_length(u64::from(total));
        bar.set_position(u64::from(done));
    });

    let converter = PdfConverter::open(input, options)?;
    log::debug!("{} has {} page(s)", converter.source_pdf(), converter.page_count());
    pb.set_message(converter.source_pdf().to_string());

    let doc = converter.convert_to_file(&output)?;
    pb.finish_and_clear();

    if !args.quiet {
        println!(
            "{} {} ({} pages, {} blocks)",
            "Saved to".green(),
            output.display(),
            doc.page_count(),
            doc.block_count()
        );
    }

    Ok(())
}

fn cmd_sections(input: &Path, pages: Option<&str>) -> CliResult {
    let selection = parse_pages(pages)?;
    let converter = PdfConverter::open(input, ConvertOptions::new().with_pages(selection.clone()))?;

    for page_number in selection.resolve(converter.page_count())? {
        let sections = converter.page_sections(page_number)?;

        println!("{}", format!("Page {}", page_number).cyan().bold());
        println!("{}", "─".repeat(40).dimmed());

        for anchor in sections.anchors() {
            println!(
                "  {:>7.1}  {} {} {}",
                anchor.position,
                anchor.context.section.as_deref().unwrap_or("-"),
                "›".dimmed(),
                anchor.context.sub_section.as_deref().unwrap_or("-")
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfstruct".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF factsheet to section-tagged JSON converter");
    println!();
    println!("License: MIT");
}

fn build_options(args: &ConvertArgs) -> Result<ConvertOptions, pdfstruct::Error> {
    let mut options = ConvertOptions::new()
        .with_pages(parse_pages(args.pages.as_deref())?)
        .with_parallel(!args.sequential)
        .with_context(ContextPolicy {
            tables: args.tag_tables,
            links: args.tag_links,
        });

    if args.compact {
        options = options.compact();
    }

    Ok(options)
}

fn parse_pages(pages: Option<&str>) -> Result<PageSelection, pdfstruct::Error> {
    pages.map_or(Ok(PageSelection::All), PageSelection::parse)
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// Output path for a conversion; never the input file itself.
fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf, String> {
    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);

    if same_file(input, &output) {
        return Err(format!(
            "output path {} is the input file; pass an OUTPUT path",
            output.display()
        ));
    }

    Ok(output)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
