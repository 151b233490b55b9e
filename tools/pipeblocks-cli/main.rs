use clap::{Parser, Subcommand};
use pipeblocks::prelude::*;
use pipeblocks::workflow::{
    EMPTY_DOCUMENT_COMMENT, WORKFLOW_FILE_EXTENSION, render_block, render_document,
};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Converts between block lists and YAML workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write the result to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Spaces per indentation level in rendered YAML
    #[arg(long, global = true, default_value_t = 2)]
    indent: usize,

    /// Log every conversion step
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON block list as a workflow document
    Render {
        /// Path to the block list JSON file
        blocks_path: String,
    },
    /// Read a workflow document into a JSON block list
    Import {
        /// Path to the workflow YAML file
        workflow_path: String,
    },
    /// Load a workflow into a node store, render it again and compare
    Check {
        /// Path to the workflow YAML file
        workflow_path: String,
    },
    /// Render the configuration of a single block
    Preview {
        /// Path to the block list JSON file
        blocks_path: String,
        /// Zero-based position of the block in the list
        index: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = SerializerOptions {
        indent: cli.indent.max(1),
        ..SerializerOptions::default()
    };

    let output = match &cli.command {
        Command::Render { blocks_path } => {
            let blocks = load_blocks(blocks_path);
            render_document(&blocks, &options, EMPTY_DOCUMENT_COMMENT)
        }
        Command::Import { workflow_path } => {
            let blocks = load_workflow(workflow_path);
            serde_json::to_string_pretty(&blocks).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to encode block list: {}", e))
            }) + "\n"
        }
        Command::Check { workflow_path } => run_check(workflow_path, &options),
        Command::Preview { blocks_path, index } => {
            let blocks = load_blocks(blocks_path);
            let block = blocks.get(*index).unwrap_or_else(|| {
                exit_with_error(&format!(
                    "Block index {} is out of range ({} block(s) loaded)",
                    index,
                    blocks.len()
                ))
            });
            render_block(block, &options)
        }
    };

    match &cli.output {
        Some(path) => {
            let path = output_path(path, &cli.command);
            fs::write(&path, &output).unwrap_or_else(|e| {
                exit_with_error(&format!(
                    "Could not write to file '{}': {}",
                    path.display(),
                    e
                ))
            });
            info!("Wrote {} byte(s) to '{}'", output.len(), path.display());
        }
        None => print!("{}", output),
    }
}

/// Rendered workflows get the workflow file extension when the given path has none.
fn output_path(path: &str, command: &Command) -> PathBuf {
    let path = PathBuf::from(path);
    match command {
        Command::Render { .. } if path.extension().is_none() => {
            path.with_extension(WORKFLOW_FILE_EXTENSION)
        }
        _ => path,
    }
}

/// Rehydrates a workflow into a store, renders it back and reports whether the
/// re-rendered document matches the original.
fn run_check(workflow_path: &str, options: &SerializerOptions) -> String {
    let start = Instant::now();
    let text = read_file(workflow_path);
    let original = parse_document(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow '{}': {}", workflow_path, e)));

    let mut store = NodeStore::new();
    store.rehydrate(from_document(original.as_ref()));
    let blocks = to_blocks(&store);
    let document = assemble(&blocks);
    let rendered = document.to_yaml_with(options);

    let reparsed = parse_document(&rendered)
        .unwrap_or_else(|e| exit_with_error(&format!("Rendered document does not parse: {}", e)));
    let original = original.unwrap_or_else(ConfigValue::mapping);
    let reparsed = reparsed.unwrap_or_else(ConfigValue::mapping);

    let mut report = String::new();
    report.push_str(&format!(
        "Loaded {} trigger(s), {} job(s), {} step(s) in {:?}\n",
        store.triggers().len(),
        store.jobs().len(),
        store.steps().len(),
        start.elapsed()
    ));
    if original == reparsed {
        report.push_str("  -> Round trip OK: re-rendered document is equivalent\n");
    } else {
        report.push_str("  -> Round trip changed the document. Re-rendered form:\n\n");
        report.push_str(&rendered);
    }
    report
}

fn load_blocks(path: &str) -> Vec<Block> {
    let json = read_file(path);
    let blocks = parse_blocks(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid block list '{}': {}", path, e)));
    info!("Loaded {} block(s) from '{}'", blocks.len(), path);
    blocks
}

fn load_workflow(path: &str) -> Vec<Block> {
    let text = read_file(path);
    let doc = parse_document(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow '{}': {}", path, e)));
    from_document(doc.as_ref())
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "pipeblocks=debug" } else { "pipeblocks=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
