//! CLI command implementations.

use async_trait::async_trait;
use classview_core::{
    ClangDriver, ClassModel, ClassViewConfig, Driver, Member, ModelBuilder, TranslationUnitModel,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c++", "c", "hpp", "hh", "hxx", "h"];

/// Write a default config for `root`.
pub fn init(root: &Path, clang: Option<&Path>) -> Result<()> {
    let config_path = ClassViewConfig::path_in(root);
    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let mut config = ClassViewConfig::default();
    config.clang_path = Some(config.resolve_clang(clang));
    let path = config.save(root)?;

    println!("{} Wrote {}", "✓".green(), path.display());
    if let Some(clang) = &config.clang_path {
        if !clang.exists() {
            println!(
                "  {} {} does not exist, edit {} before running {}",
                "⚠".yellow(),
                clang.display(),
                "clangPath".cyan(),
                "classview show".cyan()
            );
        }
    }

    Ok(())
}

/// Compile a translation unit and print its classes.
pub async fn show(root: &Path, clang: Option<&Path>, args: &[String], json: bool) -> Result<()> {
    let config = ClassViewConfig::load(root)?;
    let driver = ClangDriver::from_config(&config, clang)?;

    let compile_args = config.compile_args(args);
    let file_name = source_file(args).unwrap_or("<unknown>").to_string();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Compiling {}...", file_name));

    let model = ModelBuilder::new(&driver)
        .with_max_inheritance_depth(config.max_inheritance_depth)
        .build(&file_name, &compile_args)
        .await;

    spinner.finish_and_clear();
    print_model(model?, json)
}

/// Walk a saved AST dump and print its classes.
pub async fn ast(root: &Path, file: &Path, clang: Option<&Path>, json: bool) -> Result<()> {
    let config = ClassViewConfig::load(root)?;
    let text = fs::read_to_string(file)?;

    // Demangling is optional here; without LLVM tools raw names are shown.
    let driver: Box<dyn Driver> = match ClangDriver::from_config(&config, clang) {
        Ok(driver) => Box::new(driver),
        Err(e) => {
            warn!("{}, showing raw method names", e);
            Box::new(NoDemangle)
        }
    };

    let file_name = file.display().to_string();
    let model = ModelBuilder::new(driver.as_ref())
        .with_max_inheritance_depth(config.max_inheritance_depth)
        .build_from_ast_text(&file_name, &text)
        .await?;

    print_model(model, json)
}

/// Stands in for LLVM when only a saved dump is available.
struct NoDemangle;

#[async_trait]
impl Driver for NoDemangle {
    async fn compile(&self, _args: &[String]) -> Option<String> {
        None
    }

    async fn demangle(&self, _mangled: Option<&str>) -> Option<String> {
        None
    }
}

/// The source file among compiler arguments: the last one that looks
/// like C or C++.
fn source_file(args: &[String]) -> Option<&str> {
    args.iter()
        .rev()
        .map(String::as_str)
        .filter(|a| !a.starts_with('-'))
        .find(|a| {
            Path::new(a)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
}

fn print_model(mut model: TranslationUnitModel, json: bool) -> Result<()> {
    model.sort_members();

    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    println!(
        "{} {} classes in {}",
        "✓".green(),
        model.classes.len().to_string().cyan(),
        model.file_name
    );
    for class in &model.classes {
        println!();
        print_class(class);
    }

    if !model.unresolved.is_empty() {
        println!("\n{} unresolved bases:", "⚠".yellow());
        for missing in &model.unresolved {
            println!("  {} (base of {})", missing.base.red(), missing.for_class);
        }
    }

    Ok(())
}

fn print_class(class: &ClassModel) {
    let tag = class.meta.tag_used.as_deref().unwrap_or("class");
    let bases: Vec<String> = class
        .meta
        .bases
        .iter()
        .map(|b| format!("{} {}", b.access, b.qual_type()))
        .collect();

    if bases.is_empty() {
        println!("{} {}", tag.yellow(), class.full_name.cyan().bold());
    } else {
        println!(
            "{} {} : {}",
            tag.yellow(),
            class.full_name.cyan().bold(),
            bases.join(", ")
        );
    }

    for field in &class.fields {
        println!(
            "  {} {}: {}{}",
            "field".dimmed(),
            field.name,
            field.description(),
            origin(field)
        );
    }

    for method in &class.methods {
        let badge = if method.meta.pure {
            " [pure]".magenta().to_string()
        } else if method.meta.is_virtual {
            " [virtual]".magenta().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {}: {}{}{}",
            "method".dimmed(),
            method.name,
            method.description(),
            badge,
            origin(method)
        );
    }
}

fn origin<M: Member>(member: &M) -> String {
    match member.base_chain() {
        Some(chain) if !chain.is_empty() => format!(" (via {})", chain.full_names().join(" → "))
            .dimmed()
            .to_string(),
        _ => String::new(),
    }
}
