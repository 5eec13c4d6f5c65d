use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fields::{FieldDispatcher, ProcessState, UNKNOWN_REDSHIFT};
use sageingest::{max_rows_from_arg, Catalog, Session, SessionConfig, DEFAULT_BLOCK_SIZE};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sage-ingest")]
#[command(about = "Decode SAGE galaxy catalogue files into typed rows")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the file header
    Info {
        #[command(flatten)]
        open: OpenArgs,
    },
    /// List the fields the reader can compute
    Fields,
    /// Write rows as tab-separated text
    Dump {
        #[command(flatten)]
        open: OpenArgs,
        /// Comma-separated subset of catalogue fields
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },
}

#[derive(Args)]
struct OpenArgs {
    /// Path to the SAGE output file
    file: PathBuf,
    /// File was written with the opposite byte order
    #[arg(long)]
    swap: bool,
    /// Number of this file within its snapshot
    #[arg(long, default_value_t = 0)]
    file_num: i32,
    /// Rows per bulk read
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    blocksize: usize,
    /// Stop after this many rows; negative reads everything
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    max_rows: i64,
    /// Dimensionless Hubble parameter
    #[arg(long, default_value_t = 0.6777)]
    hubble: f32,
    /// Snapshot redshift
    #[arg(long, default_value_t = UNKNOWN_REDSHIFT, allow_hyphen_values = true)]
    redshift: f32,
}

impl OpenArgs {
    fn config(&self) -> SessionConfig {
        let mut cfg = SessionConfig::new(&self.file);
        cfg.swap = self.swap;
        cfg.block_size = self.blocksize;
        cfg.max_rows = max_rows_from_arg(self.max_rows);
        cfg.process = ProcessState {
            file_number: self.file_num,
            hubble: self.hubble,
            redshift: self.redshift,
            ..ProcessState::default()
        };
        cfg
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Info { open } => info_cmd(&open.config()),
        Commands::Fields => fields_cmd(),
        Commands::Dump { open, fields } => dump_cmd(&open.config(), fields.as_deref()),
    }
}

fn info_cmd(config: &SessionConfig) -> Result<()> {
    let session = Session::open(config)
        .with_context(|| format!("opening {}", config.path.display()))?;
    let header = session.header();
    println!("Trees:       {}", header.tree_count);
    println!("Total rows:  {}", header.total_rows);
    println!("Rows summed: {}", header.rows_in_trees());
    println!("Rows to read: {}", session.row_limit());
    session.close();
    Ok(())
}

fn fields_cmd() -> Result<()> {
    let catalog = Catalog::sage();
    let dispatcher = FieldDispatcher::new(ProcessState::default());
    let mut out = BufWriter::new(io::stdout().lock());
    for f in catalog.fields() {
        writeln!(out, "{}\t{}", f.name, f.sql_type)?;
    }
    // Computable but outside the default table.
    for name in dispatcher.names() {
        if catalog.fields().iter().all(|f| f.name != name) {
            if let Some(d) = dispatcher.derivation(name) {
                writeln!(out, "{}\t{}\t(extra)", name, d.width())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn dump_cmd(config: &SessionConfig, names: Option<&[String]>) -> Result<()> {
    let catalog = match names {
        Some(names) => Catalog::sage().select(names)?,
        None => Catalog::sage(),
    };
    let mut session = Session::open(config)
        .with_context(|| format!("opening {}", config.path.display()))?;
    catalog.validate(session.dispatcher())?;
    let requests = catalog.requests();

    let start = Instant::now();
    let mut out = BufWriter::new(io::stdout().lock());
    let columns: Vec<&str> = catalog.fields().iter().map(|f| f.name).collect();
    writeln!(out, "{}", columns.join("\t"))?;

    let mut line = String::new();
    while session.next_row()? {
        line.clear();
        for (i, req) in requests.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            let v = session
                .extract_field(req)
                .with_context(|| format!("row {}", session.current_row()))?;
            match v.get() {
                Some(value) => line.push_str(&value.to_string()),
                None => line.push_str("\\N"),
            }
        }
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    info!(
        rows = session.current_row(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "dump finished"
    );
    session.close();
    Ok(())
}
