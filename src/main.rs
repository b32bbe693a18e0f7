//! cfgtree CLI
//!
//! Entry point for the `cfgtree` command-line tool.

use cfgtree::logging::{init_logging, LogConfig};
use cfgtree::{
    load_document, load_tree, unflatten, CfgError, EffectiveConfig, FlatMap, NamespacePolicy,
    Value, DEFAULT_SEPARATOR,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "cfgtree")]
#[command(about = "Schema-anchored configuration trees", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration after merges and overrides
    Show {
        /// Schema document (YAML, JSON or TOML)
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Documents to merge, in order
        #[arg(long, short = 'm')]
        merge: Vec<PathBuf>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Separator for flat output
        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        sep: String,

        /// Leave leaves without an override untouched instead of requiring all
        #[arg(long)]
        partial: bool,

        /// Write the effective config report (with sources) to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Option overrides, e.g. -- --SVM.C 10 --IMG_SIZE 256 256 1
        #[arg(last = true)]
        overrides: Vec<String>,
    },

    /// List the options generated from a schema
    Options {
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print a schema as a flat single-level mapping
    Flatten {
        #[arg(long, short = 's')]
        schema: PathBuf,

        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        sep: String,
    },

    /// Rebuild a nested mapping from a flat document
    Unflatten {
        #[arg(long, short = 'i')]
        input: PathBuf,

        #[arg(long, default_value = DEFAULT_SEPARATOR)]
        sep: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Flat,
}

fn main() {
    if let Err(e) = init_logging(&LogConfig::from_env()) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show {
            schema,
            merge,
            format,
            sep,
            partial,
            report,
            overrides,
        } => run_show(
            &schema,
            &merge,
            format,
            &sep,
            partial,
            report.as_deref(),
            overrides,
        ),
        Commands::Options { schema, json } => run_options(&schema, json),
        Commands::Flatten { schema, sep } => run_flatten(&schema, &sep),
        Commands::Unflatten { input, sep } => run_unflatten(&input, &sep),
    };

    match result {
        Ok(()) => {}
        Err(CfgError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_show(
    schema: &Path,
    merges: &[PathBuf],
    format: OutputFormat,
    sep: &str,
    partial: bool,
    report_path: Option<&Path>,
    overrides: Vec<String>,
) -> Result<(), CfgError> {
    let mut report = EffectiveConfig::from_schema_file(schema)?;
    for path in merges {
        report.merge_file(path)?;
    }

    if !overrides.is_empty() {
        let policy = if partial {
            NamespacePolicy::Partial
        } else {
            NamespacePolicy::Strict
        };
        let argv = std::iter::once("cfgtree".to_string()).chain(overrides);
        report.merge_cli(argv, policy)?;
    }

    if let Some(path) = report_path {
        report.write_to_file(path)?;
    }

    match format {
        OutputFormat::Json => print_json(&report.config),
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&report.config)?);
            Ok(())
        }
        OutputFormat::Flat => print_json(&report.flattened(sep)?),
    }
}

fn run_options(schema: &Path, json_output: bool) -> Result<(), CfgError> {
    let (tree, _) = load_tree(schema)?;
    let spec = tree.parser()?;

    if json_output {
        let output: Vec<serde_json::Value> = spec
            .options()
            .iter()
            .map(|o| {
                serde_json::json!({
                    "flag": o.flag(),
                    "kind": o.kind.to_string(),
                    "default": o.default,
                })
            })
            .collect();
        return print_json(&output);
    }

    if spec.is_empty() {
        println!("No options (schema has no leaves)");
        return Ok(());
    }
    let width = spec.options().iter().map(|o| o.name.len() + 2).max().unwrap_or(0);
    for option in spec.options() {
        println!(
            "{:<width$}  {:<16}  default: {}",
            option.flag(),
            option.kind.to_string(),
            option.default,
            width = width
        );
    }
    Ok(())
}

fn run_flatten(schema: &Path, sep: &str) -> Result<(), CfgError> {
    let (tree, _) = load_tree(schema)?;
    print_json(&tree.flatten(sep)?)
}

fn run_unflatten(input: &Path, sep: &str) -> Result<(), CfgError> {
    let doc = load_document(input)?;
    let map = match doc.value.as_object() {
        Some(map) => map,
        None => {
            return Err(CfgError::Parse {
                path: input.to_path_buf(),
                detail: "expected a flat mapping".to_string(),
            })
        }
    };

    let mut flat = FlatMap::new();
    for (key, raw) in map {
        flat.insert(key.clone(), Value::from_json(raw)?);
    }
    print_json(&unflatten(&flat, sep)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CfgError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
