use clap::{Parser, Subcommand};
use sen::render::ThemeRenderer;
use sen::{config, output, scaffold, serve, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sen")]
#[command(about = "Simple static site generator for Markdown blogs")]
#[command(long_about = "\
Simple static site generator for Markdown blogs

Run without a command to build the site.

Project structure:

  config.toml                  # Optional (see 'sen gen-config')
  content/
  ├── about.md                 # → public/about/index.html
  └── posts/
      ├── hello-world.md       # → public/hello-world/index.html
      ├── trip.md
      └── trip/                # Copied into public/trip/
  themes/poetry/
  ├── layouts/                 # index.html, post.html, about.html
  └── assets/                  # → public/assets/

Front matter:
  title   Post title (default \"Untitled\")
  date    Display date, used for ordering (default \"Undated\")
  draft   Only `draft: false` is published (default true)")]
#[command(version)]
struct Cli {
    /// Project configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site (the default when no command is given)
    Build,
    /// Create a new draft post with pre-filled front matter
    New {
        /// Path of the post file to create
        path: PathBuf,
    },
    /// Serve the output directory locally until Ctrl+C
    #[command(alias = "server")]
    Serve,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_config(&cli.config)?;
            build(&config)?;
        }
        Command::New { path } => {
            let outcome = scaffold::create_post(&path)?;
            print_lines(output::format_scaffold_outcome(&outcome));
        }
        Command::Serve => {
            let config = config::load_config(&cli.config)?;
            serve::serve_site(&config)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build(config: &config::SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Load the theme before the output directory is touched.
    let renderer = ThemeRenderer::load(&config.build.layouts_path())?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            print_lines(output::format_build_event(&event));
        }
    });
    let result = site::build_site(config, &renderer, Some(tx));
    // The sender is dropped with build_site's assembler, which ends the loop.
    if printer.join().is_err() {
        eprintln!("output thread panicked");
    }

    let report = result?;
    print_lines(output::format_build_summary(&report));
    println!("==> Build complete: {}", config.build.output_dir.display());
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
