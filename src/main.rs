use clap::{Parser, Subcommand};
use fieldstamp::commands;
use fieldstamp::{ExportConfig, Exporter, FieldstampError, PositionVersion, ResolverConfig};
use std::path::PathBuf;

/// Migrate, validate and resolve PDF field schemas.
#[derive(Parser, Debug)]
#[command(name = "fieldstamp", version, about)]
struct Cli {
    /// Log progress at info level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert legacy field descriptors into an export document.
    Migrate {
        /// JSON file with one descriptor or an array of descriptors.
        descriptors: PathBuf,
        /// Source PDF, used for page count and page sizes.
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Write the document here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Position version the exported document uses.
        #[arg(long, default_value = "top-edge")]
        target_version: PositionVersion,
    },
    /// Check that a schema document loads and satisfies every invariant.
    Validate {
        schema: PathBuf,
    },
    /// Print the stamp plan for a data file.
    Resolve {
        schema: PathBuf,
        data: PathBuf,
        /// Convert every stamp position to this version.
        #[arg(long)]
        target_version: Option<PositionVersion>,
        /// Font size for text without an explicit size.
        #[arg(long, default_value_t = 10.0)]
        font_size: f32,
    },
    /// Print the next unused key for a prefix.
    NewKey {
        prefix: String,
        /// Schema whose keys are already taken.
        schema: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), FieldstampError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exporter = Exporter::new(ExportConfig::new().with_pretty(cli.pretty));

    match cli.command {
        Command::Migrate {
            descriptors,
            pdf,
            output,
            target_version,
        } => {
            let outcome =
                commands::migrate(&descriptors, pdf.as_deref(), target_version, &exporter)?;
            for warning in &outcome.warnings {
                eprintln!("warning: {}", warning);
            }
            match output {
                Some(path) => fieldstamp::io::write_document(&path, &outcome.document, &exporter)?,
                None => println!("{}", exporter.to_json(&outcome.document)?),
            }
        }
        Command::Validate { schema } => {
            let count = commands::validate(&schema, &exporter)?;
            println!("{}: {} field(s), valid", schema.display(), count);
        }
        Command::Resolve {
            schema,
            data,
            target_version,
            font_size,
        } => {
            let mut config = ResolverConfig::new().with_default_font_size(font_size);
            if let Some(version) = target_version {
                config = config.with_target_version(version);
            }
            let plan = commands::resolve(&schema, &data, &exporter, config)?;
            let json = if cli.pretty {
                serde_json::to_string_pretty(&plan)?
            } else {
                serde_json::to_string(&plan)?
            };
            println!("{}", json);
        }
        Command::NewKey { prefix, schema } => {
            let key = commands::new_key(&prefix, schema.as_deref(), &exporter)?;
            println!("{}", key);
        }
    }
    Ok(())
}
