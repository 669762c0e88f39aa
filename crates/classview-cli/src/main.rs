//! ClassView CLI - Command-line interface for ClassView
//!
//! Compiles one C++ translation unit with clang and prints the classes
//! it declares, including members inherited from base classes.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "classview")]
#[command(author = "ClassView Contributors")]
#[command(version)]
#[command(about = "Class, member and inheritance view of a C++ translation unit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root holding .classview/config.json
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .classview/config.json
    Init {
        /// Path to clang to record in the config
        #[arg(long)]
        clang: Option<PathBuf>,
    },

    /// Compile a source file and show its classes
    Show {
        /// Path to clang (overrides the config)
        #[arg(long)]
        clang: Option<PathBuf>,

        /// Print the model as JSON
        #[arg(long)]
        json: bool,

        /// Compiler arguments, e.g. `-- -std=c++17 -Iinclude src/a.cpp`
        #[arg(last = true, required = true)]
        args: Vec<String>,
    },

    /// Show the classes of an existing `-ast-dump=json` file
    Ast {
        /// The AST dump
        file: PathBuf,

        /// Path to clang (overrides the config); its llvm-cxxfilt is
        /// used for demangling when present
        #[arg(long)]
        clang: Option<PathBuf>,

        /// Print the model as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { clang } => commands::init(&cli.root, clang.as_deref()),
        Commands::Show { clang, json, args } => {
            commands::show(&cli.root, clang.as_deref(), &args, json).await
        }
        Commands::Ast { file, clang, json } => {
            commands::ast(&cli.root, &file, clang.as_deref(), json).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
