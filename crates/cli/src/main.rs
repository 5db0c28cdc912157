//! swagger2proto CLI
//!
//! Command-line interface for generating proto3 files from Swagger 2.0
//! documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use swagger2proto_generator::{ProtoGenerator, ProtoTreeGenerator};
use swagger2proto_parser::{
    convert_swagger_to_proto_file, FsDocumentLoader, GenerateOptions, SwaggerParser,
};

#[derive(Parser)]
#[command(name = "swagger2proto")]
#[command(version, about = "Generate proto3 definitions from Swagger 2.0 documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a document and display what would be generated
    #[command(after_help = "EXAMPLES:\n  \
        # Summarize a document\n  \
        swagger2proto parse --spec petstore.yaml")]
    Parse {
        /// Path to the Swagger document (JSON or YAML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Package name (derived from the document title if not specified)
        #[arg(long)]
        package: Option<String>,
    },

    /// Generate a proto file from a Swagger document
    #[command(after_help = "EXAMPLES:\n  \
        # Print to stdout\n  \
        swagger2proto generate --spec petstore.yaml\n\n  \
        # Write a file with google.api.http annotations\n  \
        swagger2proto generate --spec petstore.yaml --options --out petstore.proto\n\n  \
        # Generate the document and every local document it references\n  \
        swagger2proto generate --spec api/root.yaml --follow-refs ./protos")]
    Generate {
        /// Path to the Swagger document (JSON or YAML)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output file, `-` for stdout
        #[arg(short, long, default_value = "-", conflicts_with = "follow_refs")]
        out: PathBuf,

        /// Emit google.api.http rules and json_name options
        #[arg(long)]
        options: bool,

        /// Package name (derived from the document title if not specified)
        #[arg(long)]
        package: Option<String>,

        /// Also generate referenced documents, writing all files below this directory
        #[arg(long, value_name = "DIR")]
        follow_refs: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse { spec, package } => {
            parse_command(&spec, package, cli.verbose)?;
        }
        Commands::Generate {
            spec,
            out,
            options,
            package,
            follow_refs,
        } => {
            let options = GenerateOptions {
                custom_options: options,
                package,
                ..GenerateOptions::default()
            };
            match follow_refs {
                Some(dir) => generate_tree_command(&spec, &dir, options, cli.verbose)?,
                None => generate_command(&spec, &out, &options, cli.verbose)?,
            }
        }
    }

    Ok(())
}

/// Library events go to stderr, filtered by `RUST_LOG`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(spec_path: &Path) -> Result<SwaggerParser> {
    eprintln!("{} Parsing document: {}", "→".cyan(), spec_path.display());
    SwaggerParser::from_file(spec_path)
        .with_context(|| format!("Failed to load Swagger document {}", spec_path.display()))
}

fn parse_command(spec_path: &Path, package: Option<String>, verbose: bool) -> Result<()> {
    let parser = load(spec_path)?;
    let options = GenerateOptions {
        package,
        ..GenerateOptions::default()
    };
    let conversion = convert_swagger_to_proto_file(parser.definition(), &options)
        .context("Failed to translate document")?;
    let file = &conversion.file;

    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Proto file:".bold());
    println!("  Package: {}", file.package.yellow());
    println!("  Messages: {}", file.messages.len());
    println!("  Enums: {}", file.enums.len());
    println!(
        "  RPCs: {}",
        file.services.iter().map(|s| s.rpcs.len()).sum::<usize>()
    );
    println!("  Imports: {}", file.imports.len());

    if verbose {
        for service in &file.services {
            println!("\n{} {}", "Service".bold(), service.name.cyan());
            for rpc in &service.rpcs {
                println!("  • {}({}) → {}", rpc.name.cyan(), rpc.request, rpc.response);
            }
        }
        if !conversion.dependencies.is_empty() {
            println!("\n{}", "Dependencies:".bold());
            for dependency in &conversion.dependencies {
                println!(
                    "  • {} ({})",
                    dependency.proto_file.cyan(),
                    dependency.document
                );
            }
        }
    }

    Ok(())
}

fn generate_command(
    spec_path: &Path,
    out: &Path,
    options: &GenerateOptions,
    verbose: bool,
) -> Result<()> {
    let parser = load(spec_path)?;

    if verbose {
        eprintln!("  Custom options: {}", options.custom_options);
        if let Some(ref package) = options.package {
            eprintln!("  Package: {}", package);
        }
        eprintln!("  Output: {}", out.display());
    }

    let generator = ProtoGenerator::new().context("Failed to create generator")?;
    let generated = generator
        .generate(parser.definition(), options)
        .context("Failed to generate proto")?;

    if out == Path::new("-") {
        std::io::stdout()
            .write_all(generated.content.as_bytes())
            .context("Failed to write to stdout")?;
    } else {
        write_file(out, &generated.content)?;
        eprintln!("{} Wrote {}", "✓".green(), out.display());
    }

    if !generated.dependencies.is_empty() {
        eprintln!(
            "{} Imports {} external file(s), use --follow-refs to generate them",
            "!".yellow(),
            generated.dependencies.len()
        );
        if verbose {
            for dependency in &generated.dependencies {
                eprintln!("  • {} ({})", dependency.proto_file, dependency.document);
            }
        }
    }

    Ok(())
}

fn generate_tree_command(
    spec_path: &Path,
    dir: &Path,
    options: GenerateOptions,
    verbose: bool,
) -> Result<()> {
    let parser = load(spec_path)?;
    let root = spec_path.parent().unwrap_or_else(|| Path::new("."));
    let root_file = root_proto_file(spec_path);

    let generator = ProtoTreeGenerator::new(FsDocumentLoader::new(root), options)
        .context("Failed to create generator")?;
    let tree = generator
        .generate(parser.definition(), &root_file)
        .context("Failed to generate proto tree")?;

    for (name, content) in &tree.files {
        let path = dir.join(name);
        write_file(&path, content)?;
        if verbose {
            eprintln!("  📄 {}", path.display());
        }
    }
    for dependency in &tree.skipped {
        eprintln!(
            "{} Not fetched: {} ({})",
            "!".yellow(),
            dependency.document,
            dependency.proto_file
        );
    }

    eprintln!(
        "\n{} Generated {} file(s) in {}",
        "✓".green().bold(),
        tree.files.len(),
        dir.display()
    );
    Ok(())
}

/// `api/Pet-Store.yaml` → `pet-store.proto`
fn root_proto_file(spec_path: &Path) -> String {
    let stem = spec_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("api");
    format!("{}.proto", stem.to_lowercase())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
