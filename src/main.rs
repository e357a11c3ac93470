use autorst::{
    config::{Config, MirrorOptions},
    error::Result,
    mirror::{PlannedAction, TreeMirrorer},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autorst")]
#[command(about = "A CLI tool that mirrors a source package tree into reStructuredText API reference stubs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate module pages and package indexes for a source tree")]
    Run {
        #[arg(help = "Source package directory to mirror")]
        source: PathBuf,
        #[arg(help = "Directory to populate with .rst files")]
        output: PathBuf,
        #[arg(long, help = "Remove the output directory entirely before generating")]
        clean: bool,
        #[arg(long, help = "Replace existing module pages (discards manual edits)")]
        overwrite: bool,
        #[arg(long, env = "AUTORST_NAME_PREFIX", help = "Dotted prefix prepended to every qualified name, ending with '.'")]
        prefix: Option<String>,
        #[arg(long, env = "AUTORST_SOURCE_EXTENSION", help = "Recognized source file extension, without the dot")]
        extension: Option<String>,
        #[arg(long, env = "AUTORST_LIBRARY_NAME", requires = "library_heading", help = "Package name whose index gets a custom heading")]
        library_name: Option<String>,
        #[arg(long, env = "AUTORST_LIBRARY_HEADING", requires = "library_name", help = "Heading used for the library's index")]
        library_heading: Option<String>,
        #[arg(long, help = "Show the planned documents without deleting or writing anything")]
        dry_run: bool,
    },
    #[command(about = "Remove the output directory")]
    Clean {
        #[arg(help = "Directory to remove")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // .env has to be loaded before clap reads argument defaults from the environment
    let config = Config::load()?;
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()?
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Commands::Run {
            source,
            output,
            clean,
            overwrite,
            prefix,
            extension,
            library_name,
            library_heading,
            dry_run,
        } => {
            let mut config = config;
            if let Some(prefix) = prefix {
                config.name_prefix = prefix;
            }
            if let Some(extension) = extension {
                config.source_extension = extension;
            }
            if let (Some(name), Some(heading)) = (library_name, library_heading) {
                config.library_name = Some(name);
                config.library_heading = Some(heading);
            }
            config.validate()?;

            let options = MirrorOptions::from_config(&config, source, output)
                .clean(clean)
                .overwrite(overwrite);

            if dry_run {
                dry_run_command(options)
            } else {
                run_command(options)
            }
        }
        Commands::Clean { output } => clean_command(output),
    }
}

fn run_command(options: MirrorOptions) -> Result<()> {
    println!(
        "📚 Mirroring {} into {}",
        options.source_root.display(),
        options.output_root.display()
    );
    if options.clean {
        println!("🧹 Clean mode enabled - removing {} first", options.output_root.display());
    }
    if options.overwrite {
        println!("⚡ Overwrite mode enabled - existing module pages will be replaced");
    }

    let report = TreeMirrorer::new(options).mirror()?;

    println!("✅ Wrote {} module pages", report.modules_written);
    println!("✅ Wrote {} package indexes", report.indexes_written);
    if report.modules_kept > 0 {
        println!(
            "💡 Kept {} existing module pages (use --overwrite to regenerate them)",
            report.modules_kept
        );
    }

    Ok(())
}

fn dry_run_command(options: MirrorOptions) -> Result<()> {
    println!("🔍 Dry run mode - nothing will be deleted or written");
    let assume_clean = options.clean;
    if assume_clean {
        println!("🧹 Would remove {}", options.output_root.display());
    }

    let plan = TreeMirrorer::new(options).plan(assume_clean)?;
    for document in &plan {
        let action = match document.action {
            PlannedAction::Write => "write",
            PlannedAction::KeepExisting => "keep",
        };
        println!(
            "  {action:<5} {:<6} {}  ({})",
            document.kind.to_string(),
            document.path.display(),
            document.qualname
        );
    }
    println!("🔍 Dry run complete - {} documents planned", plan.len());

    Ok(())
}

fn clean_command(output: PathBuf) -> Result<()> {
    println!("🧹 Removing {}", output.display());

    let mut mirrorer = TreeMirrorer::new(MirrorOptions::new(PathBuf::new(), output));
    mirrorer.clean()?;
    println!("✅ Output directory removed");

    Ok(())
}
