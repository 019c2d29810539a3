use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use einvoice::{extract_from_str, flatten, DocumentKind};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "einvoice",
    version,
    about = "Extract invoice data from e-invoice exchange envelopes"
)]
struct Args {
    /// Input XML file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Document kind, decides envelope and line tags
    #[arg(short, long, value_enum, default_value_t = KindArg::Invoice)]
    kind: KindArg,
    /// Override the envelope tag to search for
    #[arg(short, long, value_name = "TAG")]
    envelope_tag: Option<String>,
    /// Emit the flattened business record instead of the raw mapping
    #[arg(long)]
    flatten: bool,
    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Invoice,
    CreditNote,
}

impl From<KindArg> for DocumentKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Invoice => Self::Invoice,
            KindArg::CreditNote => Self::CreditNote,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let xml = read_input(args.input.as_ref())?;

    let kind = DocumentKind::from(args.kind);
    let envelope_tag = args
        .envelope_tag
        .clone()
        .unwrap_or_else(|| kind.envelope_tag().to_string());

    let mapping = extract_from_str(&xml, &envelope_tag)
        .with_context(|| format!("failed to extract envelope <{envelope_tag}>"))?;

    let json = if args.flatten {
        let flat = flatten(&mapping, kind).context("failed to flatten invoice mapping")?;
        to_json(&flat, args.pretty)?
    } else {
        to_json(&mapping, args.pretty)?
    };

    write_output(args.output.as_ref(), json.as_bytes())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => io::stdout()
            .write_all(bytes)
            .context("failed to write to stdout"),
    }
}
