//! `shexmap` — ShEx Map command-line interface.
//!
//! Provides three subcommands for working with Map-annotated schemas:
//!
//! - **`materialize`** — build an output graph from a schema and a bindings file.
//! - **`resolve`** — print the identifier a single action code resolves to.
//! - **`keys`** — list every identifier the schema's Map actions refer to.
//!
//! Schemas are ShExJ JSON. Bindings are a JSON object mapping identifiers to
//! terms in ShExJ form (`"http://…"`, `"_:b0"`, or `{"value": …}`). Any
//! file argument may be `-` to read from stdin.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use shexmap::render::{render_ntriples, render_turtle};
use shexmap::{binding_keys, resolve_code, BNodeCounter, Bindings, Materializer, Schema, Term};

/// shexmap — ShEx Map extension CLI
///
/// Materialize template graphs from Map-annotated ShEx schemas.
#[derive(Parser)]
#[command(name = "shexmap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Materialize an output graph from a schema and bindings.
    ///
    /// Walks the schema from its start shape, splicing bound values into
    /// constraints that carry Map actions. Identifiers missing from the
    /// bindings are reported as `# unbound:` comment lines.
    ///
    /// Examples:
    ///   shexmap materialize target.json bindings.json
    ///   shexmap materialize target.json - --root http://ex/alice --format ntriples
    Materialize {
        /// Path to a ShExJ schema, or `-` for stdin.
        schema: PathBuf,

        /// Path to a JSON bindings object, or `-` for stdin.
        bindings: PathBuf,

        /// Subject for the start shape: an IRI or `_:label`.
        /// A fresh blank node is used when absent.
        #[arg(long, env = "SHEXMAP_ROOT", value_name = "IRI")]
        root: Option<String>,

        /// Output syntax.
        #[arg(short = 'f', long, env = "SHEXMAP_FORMAT", value_enum, default_value_t = Format::Turtle)]
        format: Format,

        /// Prefix for generated blank-node labels.
        #[arg(long, env = "SHEXMAP_BNODE_PREFIX", value_name = "PREFIX", default_value = "b")]
        bnode_prefix: String,
    },

    /// Resolve a single Map action code against a schema's prefixes.
    Resolve {
        /// Path to a ShExJ schema, or `-` for stdin.
        schema: PathBuf,

        /// The action code, e.g. `ex:person.name` or `<http://ex/id>`.
        code: String,
    },

    /// List every identifier referenced by Map actions in a schema.
    Keys {
        /// Path to a ShExJ schema, or `-` for stdin.
        schema: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Ntriples,
    Turtle,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shexmap=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Materialize {
            schema,
            bindings,
            root,
            format,
            bnode_prefix,
        } => {
            if is_stdin(&schema) && is_stdin(&bindings) {
                fatal("only one of SCHEMA and BINDINGS may be read from stdin");
            }
            let schema = parse_schema(&read_input(&schema));
            let bindings = parse_bindings(&read_input(&bindings));
            let root = root.map(parse_root);

            let mut materializer =
                Materializer::with_bnodes(&schema, BNodeCounter::with_prefix(bnode_prefix));
            let graph = materializer
                .materialize(&bindings, root, None)
                .unwrap_or_else(|e| fatal(&format!("materialization failed: {e}")));

            let unbound = graph.unbound().count();
            if unbound > 0 {
                tracing::warn!("{unbound} triple(s) left unbound");
            }

            match format {
                Format::Ntriples => print!("{}", render_ntriples(&graph)),
                Format::Turtle => print!("{}", render_turtle(&graph)),
            }
        }

        Command::Resolve { schema, code } => {
            let schema = parse_schema(&read_input(&schema));
            match resolve_code(&code, &schema.prefixes) {
                Ok(id) => println!("{id}"),
                Err(e) => fatal(&e.to_string()),
            }
        }

        Command::Keys { schema } => {
            let schema = parse_schema(&read_input(&schema));
            let keys = binding_keys(&schema).unwrap_or_else(|e| fatal(&e.to_string()));
            for key in keys {
                println!("{key}");
            }
        }
    }
}

fn is_stdin(path: &PathBuf) -> bool {
    path.to_str() == Some("-")
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if is_stdin(path) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

fn parse_schema(json: &str) -> Schema {
    Schema::from_json(json)
        .unwrap_or_else(|e| fatal(&format!("failed to parse input as a ShExJ schema: {}", e)))
}

fn parse_bindings(json: &str) -> Bindings {
    serde_json::from_str(json)
        .unwrap_or_else(|e| fatal(&format!("failed to parse bindings: {}", e)))
}

fn parse_root(raw: String) -> Term {
    if raw.starts_with("_:") {
        Term::blank(raw)
    } else {
        Term::Iri(raw.trim_start_matches('<').trim_end_matches('>').to_string())
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("shexmap: {}", msg);
    process::exit(2);
}
