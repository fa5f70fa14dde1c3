use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tscat::locale::{system_locale, LocaleRegistry};
use tscat::{
    run_search, validate, Catalog, ReportFormatter, SearchQuery, SimpleFormatter, TsParser,
    TsWriter,
};

/// tscat - Inspect, check and maintain Qt translation catalogues (.ts)
#[derive(Parser, Debug)]
#[command(name = "tscat")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Diagnostic log filter (error, warn, info, debug, trace); overrides TSCAT_LOG
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find messages whose source, translation or comment contain TEXT
    Search {
        #[arg(value_name = "SEARCH_TEXT")]
        text: String,

        /// Directory (or single .ts file) to search
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Case-sensitive search
        #[arg(short, long)]
        case_sensitive: bool,

        /// Match whole words only
        #[arg(short, long)]
        word: bool,

        /// Treat SEARCH_TEXT as a regular expression
        #[arg(long)]
        regex: bool,

        /// Also match context names
        #[arg(long)]
        context: bool,

        /// Additional directory names to skip
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// One grep-style line per hit
        #[arg(long, conflicts_with = "json")]
        simple: bool,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the display string for a message
    Lookup {
        file: PathBuf,
        context: String,
        source: String,

        /// Disambiguation comment
        #[arg(long)]
        comment: Option<String>,

        /// Count for plural (numerus) messages
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: Option<i64>,
    },

    /// Show translation progress per catalogue
    Stats {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Load and validate catalogues; exits 1 on load failures or errors
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// One line per issue
        #[arg(long)]
        simple: bool,
    },

    /// Rewrite a catalogue in canonical layout
    Fmt {
        file: PathBuf,

        /// Write here instead of rewriting FILE
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only report whether FILE is already formatted
        #[arg(long, conflicts_with = "output")]
        check: bool,
    },

    /// Update a catalogue against a freshly extracted template
    Merge {
        template: PathBuf,
        file: PathBuf,

        /// Write here instead of rewriting FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the locales of a directory of catalogues
    Locales {
        dir: PathBuf,

        /// Print the locale a request resolves to
        #[arg(long, value_name = "LOCALE")]
        resolve: Option<String>,

        /// Resolve the locale from LC_ALL, LC_MESSAGES or LANG
        #[arg(long, conflicts_with = "resolve")]
        system: bool,
    },
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid --log-level '{}'", level))?,
        None => EnvFilter::try_from_env("TSCAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref()) {
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Run one subcommand; `Ok(false)` means "completed, but exit non-zero"
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Search {
            text,
            dir,
            case_sensitive,
            word,
            regex,
            context,
            exclude,
            simple,
            json,
        } => {
            if text.trim().is_empty() {
                bail!("search text cannot be empty");
            }
            let query = SearchQuery::new(text)
                .with_base_dir(dir)
                .with_case_sensitive(case_sensitive)
                .with_word_match(word)
                .with_regex(regex)
                .with_search_context(context)
                .with_exclusions(exclude);
            let matcher = query.matcher()?;
            let result = run_search(query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if simple {
                print!("{}", SimpleFormatter::new().format(&result));
            } else if result.hits.is_empty() {
                println!("No matches found for '{}'", result.query);
                print!("{}", ReportFormatter::new().format_search(&result, &matcher));
            } else {
                print!("{}", ReportFormatter::new().format_search(&result, &matcher));
            }
            Ok(true)
        }

        Command::Lookup {
            file,
            context,
            source,
            comment,
            count,
        } => {
            let catalog = load(&file)?;
            let comment = comment.as_deref();
            let text = match count {
                Some(n) => catalog.translate_plural(&context, &source, comment, n),
                None => catalog.translate(&context, &source, comment),
            };
            println!("{}", text);
            Ok(true)
        }

        Command::Stats { files, json } => {
            let formatter = ReportFormatter::new();
            let mut rows = Vec::new();
            for file in &files {
                let catalog = load(file)?;
                let stats = catalog.stats();
                if json {
                    rows.push(serde_json::json!({
                        "file": file,
                        "language": catalog.language,
                        "stats": stats,
                        "completion": stats.completion(),
                    }));
                } else {
                    print!(
                        "{}",
                        formatter.format_stats(file, catalog.language.as_deref(), &stats)
                    );
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            Ok(true)
        }

        Command::Check { files, simple } => {
            let mut ok = true;
            for file in &files {
                let catalog = match TsParser::parse_file(file) {
                    Ok(catalog) => catalog,
                    Err(e) => {
                        eprintln!("{} {}", "error:".red().bold(), e);
                        ok = false;
                        continue;
                    }
                };
                let issues = validate(&catalog);
                if tscat::validate::has_errors(&issues) {
                    ok = false;
                }
                if simple {
                    print!("{}", SimpleFormatter::new().format_issues(file, &issues));
                } else {
                    print!("{}", ReportFormatter::new().format_issues(file, &issues));
                }
            }
            Ok(ok)
        }

        Command::Fmt {
            file,
            output,
            check,
        } => {
            let catalog = load(&file)?;
            let formatted = TsWriter::new().to_string(&catalog);
            if check {
                let current = fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                if current != formatted {
                    println!("{} is not formatted", file.display());
                    return Ok(false);
                }
                return Ok(true);
            }
            let target = output.unwrap_or(file);
            fs::write(&target, formatted)
                .with_context(|| format!("failed to write {}", target.display()))?;
            Ok(true)
        }

        Command::Merge {
            template,
            file,
            output,
        } => {
            let template_catalog = load(&template)?;
            let catalog = load(&file)?;
            let (merged, report) = catalog.merge_template(&template_catalog)?;
            let target = output.unwrap_or(file);
            TsWriter::new().write_file(&merged, &target)?;
            print!("{}", ReportFormatter::new().format_merge(&target, &report));
            Ok(true)
        }

        Command::Locales {
            dir,
            resolve,
            system,
        } => {
            let registry = LocaleRegistry::new(dir);
            let requested = if system {
                Some(system_locale().context("no locale set in LC_ALL, LC_MESSAGES or LANG")?)
            } else {
                resolve
            };

            if let Some(requested) = requested {
                let catalog = registry.load(&requested)?;
                let resolved = registry
                    .resolve(&requested)?
                    .unwrap_or_else(|| requested.clone());
                println!(
                    "{} -> {} ({})",
                    requested,
                    resolved,
                    catalog.language.as_deref().unwrap_or("?")
                );
                return Ok(true);
            }

            let locales = registry.available()?;
            if locales.is_empty() {
                println!("No catalogues in {}", registry.dir().display());
            }
            for locale in locales {
                let catalog = registry.load(&locale)?;
                println!("{:<8} {:5.1}%", locale, catalog.stats().completion());
            }
            Ok(true)
        }
    }
}

fn load(path: &Path) -> Result<Catalog> {
    Ok(TsParser::parse_file(path)?)
}
