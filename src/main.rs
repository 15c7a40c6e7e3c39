use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autodoc::cli::{Output, RunOptions};

#[derive(Parser)]
#[command(name = "autodoc")]
#[command(
    version,
    about = "Generate per-package README files for a repository with an LLM"
)]
struct Cli {
    #[arg(help = "Local project directory (defaults to the current directory)")]
    dir: Option<PathBuf>,

    #[arg(short = 'g', long = "repo", help = "Repository URL, optionally with /tree/{branch}/{path}")]
    repository: Option<String>,

    #[arg(short = 'b', long, help = "Branch to document (overrides the URL branch)")]
    branch: Option<String>,

    #[arg(short = 'u', long, help = "Username for authenticated clone and push")]
    username: Option<String>,

    #[arg(short = 't', long, env = "GH_TOKEN", hide_env_values = true, help = "Access token for clone, push and pull requests")]
    token: Option<String>,

    #[arg(short = 'l', long = "rule", help = "Rule file path or rule name to use without detection")]
    rule: Option<String>,

    #[arg(short = 'p', long, help = "Only document these packages (comma-separated)")]
    packages: Option<String>,

    #[arg(short = 'w', long = "pr", help = "Commit to the _autodoc branch and open a pull request")]
    create_pr: bool,

    #[arg(short = 'c', long, help = "Skip project root marker checks (go.mod, package.json, ...)")]
    light_check: bool,

    #[arg(short = 'f', long = "files", help = "Also write per-file summaries to FILES.md")]
    with_file_summary: bool,

    #[arg(short = 'r', long, help = "Overwrite README.md instead of writing README_GENERATED.md")]
    overwrite_readme: bool,

    #[arg(short = 'd', long, help = "Regenerate and overwrite cached summaries")]
    overwrite_cache: bool,

    #[arg(short = 'e', long, help = "Index sources and summaries in a vector store")]
    embeddings: bool,

    #[arg(short = 'a', long = "cache", help = "Cache directory (defaults to .autodoc_cache)")]
    cache_path: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> RunOptions {
        RunOptions {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            username: self.username.clone(),
            token: self.token.clone(),
            selector: self.rule.clone(),
            packages: self.packages.clone(),
            create_pr: self.create_pr,
            light_check: self.light_check,
            with_file_summary: self.with_file_summary,
            overwrite_readme: self.overwrite_readme,
            overwrite_cache: self.overwrite_cache,
            embeddings: self.embeddings,
            cache_path: self.cache_path.clone(),
            dir: self.dir.clone(),
        }
    }
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mautodoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    autodoc::cli::commands::run::run(cli.options())?;
    Ok(())
}
