//! Koala box-tree CLI
//!
//! Loads a styled JSON document, builds its formatting structure and prints
//! it as an indented tree or as JSON.
//!
//! - koala page.json                 # Colored box tree
//! - koala --format json page.json   # Serialized boxes

mod tree;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use koala_boxes::{BuildOptions, DEFAULT_MAX_DEPTH, build_document, serialize, serialize_box};
use koala_common::net::ResourceFetcher;
use koala_common::warning::set_colored;
use koala_css::StyledDocument;
use serde_json::json;

/// Koala: print the box tree of a styled document
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the box tree of a document
    koala page.json

    # Build an inline document
    koala --json '{"root": {"tag": "p", "children": ["Hello"]}}'

    # Resolve relative image URLs against a base
    koala --base-url https://example.com/ page.json

    # Machine-readable output
    koala --format json page.json
"#)]
struct Cli {
    /// Path to a styled JSON document
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this JSON document instead of reading a file
    #[arg(long, value_name = "JSON", conflicts_with = "path")]
    json: Option<String>,

    /// Base URL for relative URLs, overriding the document's own
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Maximum element nesting depth
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// How the box tree is printed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Indented tree, one box per line
    Tree,
    /// `{tag, kind, text|children}` JSON
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        set_colored(false);
    }

    let document = load_document(&cli)?;
    let options = BuildOptions {
        base_url: cli.base_url.clone(),
        max_depth: cli.max_depth,
    };
    let structure = build_document(&document, &ResourceFetcher::new(), &options)
        .context("failed to build the box tree")?;

    match cli.format {
        Format::Tree => {
            print!("{}", tree::render(&serialize_box(&structure.root), !cli.no_color));
            if !structure.footnotes.is_empty() {
                println!("\n=== Footnotes ===");
                for footnote in &structure.footnotes {
                    print!("{}", tree::render(&serialize_box(footnote), !cli.no_color));
                }
            }
        }
        Format::Json => {
            let output = json!({
                "root": serialize_box(&structure.root),
                "footnotes": serialize(&structure.footnotes),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Load the document from the CLI arguments.
fn load_document(cli: &Cli) -> anyhow::Result<StyledDocument> {
    if let Some(ref json) = cli.json {
        StyledDocument::from_json(json).context("invalid --json document")
    } else if let Some(ref path) = cli.path {
        let source = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        StyledDocument::from_json(&source)
            .with_context(|| format!("invalid document {}", path.display()))
    } else {
        bail!("expected a document file or --json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["koala", "page.json"]);
        assert_eq!(cli.path, Some(PathBuf::from("page.json")));
        assert_eq!(cli.format, Format::Tree);
        assert_eq!(cli.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!cli.no_color);
    }

    #[test]
    fn inline_json_conflicts_with_a_file() {
        assert!(Cli::try_parse_from(["koala", "page.json", "--json", "{}"]).is_err());
        let cli = Cli::try_parse_from(["koala", "--json", "{}", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn missing_input_is_an_error() {
        let cli = Cli::parse_from(["koala"]);
        assert!(load_document(&cli).is_err());
    }
}
