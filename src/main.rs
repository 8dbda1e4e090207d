use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use filelog::config::{self, LoggerConfig};
use filelog::{FileLogger, LogLevel};

const USAGE: &str = "\
Usage: filelog [--config PATH] [--level LEVEL] [--list] [--print-config]

Appends every line read from stdin to the configured log file, rotating it
into zip archives once it grows past max_size.

  --config PATH     TOML file with a [log] table (default: platform config dir)
  --level LEVEL     severity of the records written (default: info)
  --list            print the active file and existing archives, then exit
  --print-config    print the effective configuration, then exit";

struct Args {
    config_path: PathBuf,
    level: LogLevel,
    list: bool,
    print_config: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: config::default_config_path(),
        level: LogLevel::Info,
        list: false,
        print_config: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config_path = PathBuf::from(shellexpand::tilde(&path).into_owned());
            }
            "--level" => {
                let level = iter.next().context("--level needs a value")?;
                args.level = level.parse()?;
            }
            "--list" => args.list = true,
            "--print-config" => args.print_config = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("Unknown argument '{}'\n\n{}", other, USAGE),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    // Diagnostics from the logger itself go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "filelog=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .init();

    let args = parse_args()?;
    let config = LoggerConfig::load(&args.config_path)
        .with_context(|| format!("Failed to load {}", args.config_path.display()))?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let logger = FileLogger::init(config).context("Failed to initialize file logger")?;

    if args.list {
        println!("{}", logger.path().display());
        for (_, path) in logger.archives() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    tracing::info!("Logging to: {}", logger.path().display());

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        logger.log(args.level, &line);
    }

    logger.close();
    let stats = logger.stats();
    tracing::info!(
        rotations = stats.rotations(),
        failed_rotations = stats.failed_rotations(),
        write_errors = stats.write_errors(),
        "Done"
    );

    Ok(())
}
