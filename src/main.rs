use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use incremental::logging::{self, LogFormat};
use incremental::update::{self, UpdateOptions};

#[derive(Parser)]
#[command(name = "incremental")]
#[command(version, about = "Release versions for packaged projects")]
struct Cli {
    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the version declared by PACKAGE
    Update {
        package: String,
        /// Package directory (default: ./src/<package> or ./<package>)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Set an explicit version, e.g. 1.2.3rc1
        #[arg(long)]
        newversion: Option<String>,
        #[arg(long)]
        patch: bool,
        #[arg(long)]
        rc: bool,
        #[arg(long)]
        dev: bool,
        /// Write the first version, based on today's date
        #[arg(long)]
        create: bool,
    },
    /// Print the release version declared by PROJECT
    Version {
        project: String,
        /// Directory containing the project's package directory
        #[arg(long, default_value = "src")]
        source_root: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(format).context("failed to initialise logging")?;

    match cli.command {
        Command::Update {
            package,
            path,
            newversion,
            patch,
            rc,
            dev,
            create,
        } => {
            let options = UpdateOptions {
                package,
                path,
                newversion,
                patch,
                rc,
                dev,
                create,
            };
            let cwd = std::env::current_dir().context("failed to read working directory")?;
            let today = chrono::Local::now().date_naive();

            let report = update::run(&options, today, &cwd)
                .with_context(|| format!("failed to update {}", options.package))?;
            println!("{}", report.version.version_string());
        }
        Command::Version {
            project,
            source_root,
        } => {
            let version = incremental::packaging_version(&project, &source_root)
                .with_context(|| format!("failed to discover the version of {project}"))?;
            println!("{version}");
        }
    }

    Ok(())
}
