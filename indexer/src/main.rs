use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use invindex::persist::{load_index, save_index};
use invindex::{Format, InvertedIndex, Query};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(alias = "content")]
    body: String,
}

/// Accepted shapes of a `.json` input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Docs(Vec<InputDoc>),
    Doc(InputDoc),
    Map(HashMap<String, String>),
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a positional inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from JSON/JSONL/TXT files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index file
        #[arg(long)]
        output: String,
        /// json or binary; defaults to the output file extension
        #[arg(long)]
        format: Option<Format>,
    },
    /// Run a query against a saved index
    Query {
        #[arg(long)]
        index: String,
        #[arg(long)]
        format: Option<Format>,
        #[command(subcommand)]
        kind: QueryKind,
    },
    /// Print index statistics
    Stats {
        #[arg(long)]
        index: String,
        #[arg(long)]
        format: Option<Format>,
        /// Number of most frequent terms to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print every term with its postings
    Dump {
        #[arg(long)]
        index: String,
        #[arg(long)]
        format: Option<Format>,
    },
}

#[derive(Subcommand)]
enum QueryKind {
    /// Single-term lookup (only the first term of the input is used)
    Term { term: String },
    /// Documents containing all terms
    And { terms: Vec<String> },
    /// Documents containing any term
    Or { terms: Vec<String> },
    /// Documents containing all --include terms and none of the --exclude terms
    Not {
        #[arg(long, num_args = 1..)]
        include: Vec<String>,
        #[arg(long, num_args = 1..)]
        exclude: Vec<String>,
    },
    /// Documents containing the words as a consecutive phrase
    Phrase { words: Vec<String> },
    /// Term frequency of a term in one document
    Tf { term: String, doc: String },
    /// Number of documents containing a term
    Df { term: String },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, format } => {
            let format = format.unwrap_or_else(|| Format::from_path(&output));
            build_index(&input, &output, format)
        }
        Commands::Query { index, format, kind } => {
            let index = open(&index, format)?;
            run_query(&index, kind);
            Ok(())
        }
        Commands::Stats { index, format, top } => {
            print!("{}", open(&index, format)?.stats(top));
            Ok(())
        }
        Commands::Dump { index, format } => {
            for entry in open(&index, format)?.dump() {
                print!("{entry}");
            }
            Ok(())
        }
    }
}

fn open(path: &str, format: Option<Format>) -> Result<InvertedIndex> {
    let format = format.unwrap_or_else(|| Format::from_path(path));
    load_index(path, format).with_context(|| format!("loading index from {path}"))
}

fn build_index(input: &str, output: &str, format: Format) -> Result<()> {
    let files = collect_files(Path::new(input))?;
    if files.is_empty() {
        bail!("no .json, .jsonl or .txt files found under {input}");
    }

    let mut index = InvertedIndex::new();
    for file in files {
        let docs = read_documents(&file).with_context(|| format!("reading {}", file.display()))?;
        tracing::info!(file = %file.display(), docs = docs.len(), "ingesting file");
        index.build_from_documents(docs);
    }

    save_index(output, &index, format)?;
    tracing::info!(output, num_docs = index.num_docs(), num_terms = index.num_terms(), "index build complete");
    Ok(())
}

fn collect_files(input_path: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_input_file(p) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("input path {} does not exist", input_path.display());
    }
    Ok(files)
}

fn is_input_file(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl" | "txt"))
}

fn read_documents(file: &Path) -> Result<Vec<(String, String)>> {
    match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => {
            let reader = BufReader::new(File::open(file)?);
            let mut docs = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() { continue; }
                let doc: InputDoc = serde_json::from_str(&line)?;
                docs.push((doc.id, doc.body));
            }
            Ok(docs)
        }
        Some("txt") => {
            let id = file
                .file_stem()
                .and_then(|s| s.to_str())
                .context("file name is not valid UTF-8")?
                .to_string();
            Ok(vec![(id, fs::read_to_string(file)?)])
        }
        _ => {
            let reader = BufReader::new(File::open(file)?);
            let docs = match serde_json::from_reader(reader)? {
                JsonInput::Docs(docs) => docs.into_iter().map(|d| (d.id, d.body)).collect(),
                JsonInput::Doc(doc) => vec![(doc.id, doc.body)],
                JsonInput::Map(map) => map.into_iter().collect(),
            };
            Ok(docs)
        }
    }
}

fn run_query(index: &InvertedIndex, kind: QueryKind) {
    let query = match kind {
        QueryKind::Term { term } => {
            let postings = index.search(&term);
            println!("postings for '{term}':");
            for (doc_id, positions) in &postings {
                println!("  {doc_id}: {positions:?}");
            }
            Query::Term { term }
        }
        QueryKind::And { terms } => Query::And { terms },
        QueryKind::Or { terms } => Query::Or { terms },
        QueryKind::Not { include, exclude } => Query::Not { include, exclude },
        QueryKind::Phrase { words } => Query::Phrase { phrase: words.join(" ") },
        QueryKind::Tf { term, doc } => {
            println!("{}", index.term_frequency(&term, &doc));
            return;
        }
        QueryKind::Df { term } => {
            println!("{}", index.document_frequency(&term));
            return;
        }
    };
    print_results(index, &query.execute(index));
}

fn print_results(index: &InvertedIndex, doc_ids: &HashSet<String>) {
    if doc_ids.is_empty() {
        println!("no matching documents");
        return;
    }
    println!("{} matching documents:", doc_ids.len());
    let mut sorted: Vec<&String> = doc_ids.iter().collect();
    sorted.sort();
    for doc_id in sorted {
        let content = index.document(doc_id).unwrap_or_default();
        println!("  [{doc_id}] {}", preview(content, 100));
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}
