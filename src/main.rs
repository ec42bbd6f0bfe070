use clap::{Parser, Subcommand};
use htmlnav::{config, navigation, output, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "htmlnav")]
#[command(about = "HTML writer that records per-page navigation metadata")]
#[command(long_about = "\
HTML writer that records per-page navigation metadata

Each page is written next to a .nav sidecar describing its navigation entry.
Pages set their entry with meta lines at the top of the document:

  <meta name=\"navigation.name\" content=\"Getting Started\">
  <meta name=\"navigation.order\" content=\"2\">
  <meta name=\"navigation.visible\" content=\"false\">

Images accept an attribute list after the image:

  ![diagram](img/flow.png){scale=50 align=center}

Set RUST_LOG=debug for details on skipped files and image probes.
Run 'htmlnav gen-config' to generate a documented htmlnav.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing htmlnav.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override values from htmlnav.toml.
#[derive(clap::Args, Clone)]
struct WriterArgs {
    /// Stylesheet to link; favicon.png and navigation.css are expected next to it
    #[arg(long)]
    stylesheet: Option<String>,

    /// Do not read image files to find their natural size
    #[arg(long)]
    no_introspect: bool,
}

impl WriterArgs {
    fn apply(&self, mut config: config::WriterConfig) -> Result<config::WriterConfig, config::ConfigError> {
        if let Some(stylesheet) = &self.stylesheet {
            config.stylesheet_path = stylesheet.clone();
        }
        if self.no_introspect {
            config.images.introspect = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Translate one document into an HTML page and its .nav sidecar
    Translate {
        /// Markdown or JSON document
        source: PathBuf,
        /// HTML file to write
        destination: PathBuf,
        #[command(flatten)]
        writer: WriterArgs,
    },
    /// Translate every document under a directory, mirroring its layout
    Build {
        source_dir: PathBuf,
        output_dir: PathBuf,
        #[command(flatten)]
        writer: WriterArgs,
    },
    /// Print the navigation record stored in a .nav sidecar
    Show { nav_file: PathBuf },
    /// Print a stock htmlnav.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Translate {
            source,
            destination,
            writer,
        } => {
            let config = writer.apply(config::load_config(&cli.config)?)?;
            let page = site::translate_file(&source, &destination, &config)?;
            output::print_build(&[page]);
        }
        Command::Build {
            source_dir,
            output_dir,
            writer,
        } => {
            let config = writer.apply(config::load_config(&cli.config)?)?;
            println!("==> Translating {} \u{2192} {}", source_dir.display(), output_dir.display());
            let pages = site::build_tree(&source_dir, &output_dir, &config)?;
            output::print_build(&pages);
        }
        Command::Show { nav_file } => {
            let record = navigation::read_sidecar(&nav_file)?;
            output::print_record(&record);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
