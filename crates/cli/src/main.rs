//! CLI tool for finding, replacing and deleting keywords in PowerPoint files.

mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slidescrub_core::{
    Config, Container, Deck, DeckInput, DetectReport, Directive, Element, FormattingPolicy,
    Fragment, KeywordEngine, KeywordSet, Paragraph, PreviewReport, SubstitutionMode,
};
use slidescrub_pptx::{PptxDeck, PptxLoader, SlidePart};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Find, replace or delete keywords in PowerPoint files.
#[derive(Parser, Debug)]
#[command(name = "slidescrub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every text element that contains a keyword
    Detect {
        #[command(flatten)]
        target: Target,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace keywords and write modified copies
    Replace {
        #[command(flatten)]
        target: Target,

        /// Replacement text (default: from config)
        #[arg(long = "with", value_name = "TEXT")]
        replacement: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete keywords and write modified copies
    Delete {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show occurrence totals before and after a rewrite without writing
    Preview {
        #[command(flatten)]
        target: Target,

        /// Replacement text (default: from config)
        #[arg(long = "with", value_name = "TEXT", conflicts_with = "delete")]
        replacement: Option<String>,

        /// Preview deletion instead of replacement
        #[arg(long)]
        delete: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump slides, shapes, paragraphs and runs
    Inspect {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Input .pptx file(s) or directories
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Keyword to match; repeat for several (default: from config)
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Descend into directories
    #[arg(short, long)]
    recursive: bool,

    /// Substitute all keywords in one pass instead of one pass per keyword
    #[arg(long)]
    single_pass: bool,

    /// Keep run formatting by editing matches inside the runs they span
    #[arg(long)]
    preserve_formatting: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bundle several outputs into a single ZIP archive
    #[arg(long)]
    zip: bool,
}

/// Loaded inputs plus the paths they came from, keyed by report name.
struct Loaded {
    inputs: Vec<DeckInput>,
    sources: HashMap<String, PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = Config::load_or_default(&cli.config);

    match &cli.command {
        Command::Detect { target, json } => detect(target, &config, *json),
        Command::Replace {
            target,
            replacement,
            output,
        } => {
            let text = replacement
                .clone()
                .unwrap_or_else(|| config.default_replacement.clone());
            rewrite(target, &config, &Directive::replace(text), output)
        }
        Command::Delete { target, output } => {
            rewrite(target, &config, &Directive::delete(), output)
        }
        Command::Preview {
            target,
            replacement,
            delete,
            json,
        } => {
            let directive = if *delete {
                Directive::delete()
            } else {
                Directive::replace(
                    replacement
                        .clone()
                        .unwrap_or_else(|| config.default_replacement.clone()),
                )
            };
            preview(target, &config, &directive, *json)
        }
        Command::Inspect { target } => inspect(target, &config),
    }
}

fn keyword_set(target: &Target, config: &Config) -> Result<KeywordSet> {
    let keywords = if target.keywords.is_empty() {
        &config.default_keywords
    } else {
        &target.keywords
    };
    KeywordSet::new(keywords).context("Invalid keywords")
}

fn engine(target: &Target, config: &Config) -> KeywordEngine<PptxLoader> {
    let mut options = config.rewrite_options();
    if target.single_pass {
        options.substitution = SubstitutionMode::SinglePass;
    }
    if target.preserve_formatting {
        options.formatting = FormattingPolicy::Preserve;
    }
    KeywordEngine::with_config(PptxLoader::new(), config).with_options(options)
}

fn load(target: &Target, config: &Config) -> Result<Loaded> {
    let files = output::collect_files(&target.input, target.recursive, config)?;
    let mut loaded = Loaded {
        inputs: Vec::with_capacity(files.len()),
        sources: HashMap::new(),
    };

    for path in files {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = output::display_name(&path);
        if loaded.sources.contains_key(&name) {
            log::warn!("Skipping {}: another input is named {}", path.display(), name);
            continue;
        }
        log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        loaded.sources.insert(name.clone(), path);
        loaded.inputs.push(DeckInput::new(name, bytes));
    }

    Ok(loaded)
}

fn detect(target: &Target, config: &Config, json: bool) -> Result<()> {
    let keywords = keyword_set(target, config)?;
    let loaded = load(target, config)?;
    let report = engine(target, config).detect(&loaded.inputs, &keywords)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_detect(&report);
    }
    Ok(())
}

fn print_detect(report: &DetectReport) {
    for document in &report.documents {
        println!("{}", document.name);
        for record in &document.records {
            println!(
                "  {}, shape {}: {} x{}",
                record.container,
                record.element,
                record.keywords.join(", "),
                record.count
            );
            for line in record.text.lines() {
                println!("      {}", line);
            }
        }
        for warning in &document.warnings {
            println!("  warning: {}", warning);
        }
    }

    println!(
        "Found {} occurrence(s) in {} element(s) across {} document(s)",
        report.total_count, report.affected_elements, report.documents_processed
    );
}

fn rewrite(target: &Target, config: &Config, directive: &Directive, args: &OutputArgs) -> Result<()> {
    let keywords = keyword_set(target, config)?;
    let loaded = load(target, config)?;
    let rewritten = engine(target, config).replace_or_delete(&loaded.inputs, &keywords, directive)?;

    if args.zip && rewritten.len() > 1 {
        let dir = args.output.as_deref().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(output::BUNDLE_NAME);
        output::write_bundle(&path, &rewritten)?;
        println!(
            "Wrote {} ({} document(s))",
            path.display(),
            rewritten.len()
        );
        return Ok(());
    }

    for deck in &rewritten {
        let source = loaded
            .sources
            .get(&deck.source_name)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(&deck.source_name));
        let path = output::output_path(source, &deck.file_name, args.output.as_deref())?;
        output::write_file(&path, &deck.bytes)?;
        println!(
            "Wrote {} ({} element(s) modified)",
            path.display(),
            deck.modified_elements
        );
    }

    Ok(())
}

fn preview(target: &Target, config: &Config, directive: &Directive, json: bool) -> Result<()> {
    let keywords = keyword_set(target, config)?;
    let loaded = load(target, config)?;
    let report = engine(target, config).preview(&loaded.inputs, &keywords, directive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_preview(&report);
    }
    Ok(())
}

fn print_preview(report: &PreviewReport) {
    println!("Action: {}", report.action);
    println!(
        "Before: {} occurrence(s) in {} element(s)",
        report.before.count, report.before.affected_elements
    );
    println!(
        "After:  {} occurrence(s) in {} element(s)",
        report.after.count, report.after.affected_elements
    );
    println!(
        "{} element(s) would change across {} document(s)",
        report.modified_elements, report.documents_processed
    );
}

fn inspect(target: &Target, config: &Config) -> Result<()> {
    let keywords = keyword_set(target, config)?;
    let loaded = load(target, config)?;

    for input in &loaded.inputs {
        let deck = match PptxDeck::from_bytes(&input.bytes) {
            Ok(deck) => deck,
            Err(e) if loaded.inputs.len() > 1 => {
                log::warn!("Skipping {}: {}", input.name, e);
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to open {}", input.name)),
        };

        println!("{}", input.name);
        for (idx, slide) in deck.slides().iter().enumerate() {
            print_part(&format!("Slide {}", idx + 1), slide, &keywords);
        }
        match deck.master_layouts() {
            Ok(layouts) => {
                for (idx, layout) in layouts.iter().enumerate() {
                    print_part(&format!("Master {}", idx + 1), layout, &keywords);
                }
            }
            Err(e) => println!("  master layouts unavailable: {}", e),
        }
    }

    Ok(())
}

fn print_part(label: &str, part: &SlidePart, keywords: &KeywordSet) {
    println!("  {} ({})", label, part.path());

    for (idx, shape) in part.elements().iter().enumerate() {
        let marker = if shape.has_text() && keywords.is_match(&shape.text()) {
            " *match*"
        } else {
            ""
        };
        println!(
            "    [{}] {} {:?}{}",
            idx,
            shape.kind().as_str(),
            shape.name().unwrap_or(""),
            marker
        );

        for (p_idx, paragraph) in shape.paragraphs().iter().enumerate() {
            let runs: Vec<&str> = paragraph.fragments().iter().map(|r| r.text()).collect();
            println!("      p{}: {:?}", p_idx, runs);
        }
    }
}
