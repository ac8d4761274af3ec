use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fluid_tokens_build::{build, check, load_tokens, BuildConfig};
use fluid_tokens_core::InvalidTokenPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fluid-tokens")]
#[command(about = "Builds fluid CSS and per-breakpoint design-tool exports from design tokens")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render and write every artifact
    Build(BuildArgs),

    /// Load, validate and render without writing anything
    Check(BuildArgs),

    /// Print the per-breakpoint values of one token
    Sample {
        /// Token key, `category/name`
        key: String,

        #[command(flatten)]
        args: BuildArgs,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Config file [default: fluid-tokens.json if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Token source file; repeat to replace the configured sources
    #[arg(short, long = "source")]
    sources: Vec<PathBuf>,

    /// Decimal places for computed values
    #[arg(long)]
    precision: Option<u32>,

    /// Drop invalid tokens with a warning instead of failing
    #[arg(long)]
    skip_invalid: bool,
}
impl BuildArgs {
    fn into_config(self) -> Result<BuildConfig> {
        let mut config = BuildConfig::load(self.config.as_deref())?;
        if let Some(out_dir) = self.out_dir {
            config.out_dir = out_dir;
        }
        if !self.sources.is_empty() {
            config.sources = self.sources;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if self.skip_invalid {
            config.on_invalid = InvalidTokenPolicy::Skip;
        }
        config.validate(self.config.as_deref().unwrap_or("command line".as_ref()))?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build(args) => {
            let config = args.into_config()?;
            let report = build(&config).context("build failed")?;
            println!(
                "Built {} tokens into {} files under {}",
                report.tokens,
                report.written.len(),
                config.out_dir.display()
            );
            for path in report.written {
                println!("  {}", path.display());
            }
        }
        Command::Check(args) => {
            let config = args.into_config()?;
            let (tokens, artifacts) = check(&config).context("check failed")?;
            println!(
                "{} tokens OK, {} artifacts would be written",
                tokens.len(),
                artifacts.len()
            );
        }
        Command::Sample { key, args } => {
            let config = args.into_config()?;
            let tokens = load_tokens(&config).context("failed to load tokens")?;
            let token = tokens
                .lookup(&key)
                .with_context(|| format!("no token named {key}"))?;
            println!("{key} ({})", token.property);
            for (breakpoint, value) in tokens.breakpoints().iter().zip(tokens.sample(token)?.values()) {
                println!(
                    "  {:<10} {:>5}px  {value}",
                    breakpoint.name, breakpoint.viewport_width
                );
            }
        }
    }
    Ok(())
}
