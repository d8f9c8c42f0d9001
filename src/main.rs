//! barust command-line entry point.
//!
//! Without a subcommand the interactive console starts; subcommands run one action and exit.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use barust::config::Config;
use barust::console::Console;
use barust::{BarcodeRequest, CodeType, Generator, OutputFormat, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "barust", version, about = "Generate barcodes as PNG, SVG and HTML")]
struct Cli {
    /// Output folder (overrides BARUST_OUTPUT_DIR)
    #[arg(short, long, global = true)]
    folder: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides BARUST_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive menu (default)
    Interactive,
    /// Generate one barcode file
    Generate {
        /// Text or digits to encode
        data: String,
        /// auto, code128, code39, ean13, ean8 or upc
        #[arg(short = 't', long = "type", default_value = "auto")]
        code_type: CodeType,
        /// png or svg
        #[arg(long, default_value = "png")]
        format: OutputFormat,
        /// File name without extension
        #[arg(short, long)]
        name: Option<String>,
        /// Render option as key=value, may be repeated
        #[arg(short, long = "opt")]
        opts: Vec<String>,
    },
    /// Generate PNG + HTML + base64 tag
    Clean {
        data: String,
        /// Also print the base64 <img> tag
        #[arg(long)]
        print_tag: bool,
    },
    /// List generated barcode files
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(folder) = cli.folder.clone() {
        config.output_dir = folder;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!(folder = %config.output_dir.display(), "configuration loaded");

    match run(cli.command.unwrap_or(Command::Interactive), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let generator = Generator::from_config(config);

    match command {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut console = Console::new(stdin.lock(), io::stdout(), generator);
            console.run()?;
        }
        Command::Generate {
            data,
            code_type,
            format,
            name,
            opts,
        } => {
            let mut options = RenderOptions::default();
            for pair in &opts {
                options.apply_pair(pair)?;
            }
            let mut request = BarcodeRequest::new(data)
                .code_type(code_type)
                .format(format)
                .options(options);
            request.file_name = name;
            let path = generator.generate_barcode(&request)?;
            println!("{}", path.display());
        }
        Command::Clean { data, print_tag } => {
            let clean = generator.generate_clean_barcode(&data, None)?;
            println!("{}", clean.png.display());
            println!("{}", clean.html.display());
            if print_tag {
                println!("{}", clean.base64_img);
            }
        }
        Command::List => {
            for path in generator.list_generated_files(None)? {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}
