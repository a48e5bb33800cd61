//! hdftable - inspect how a datatype flattens into table columns.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hdftable::{Datatype, IndexMaps, TypeClass, Validator};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hdftable")]
#[command(about = "Inspect the table layout of a dataset datatype", long_about = None)]
struct Args {
    /// Datatype expression, e.g. "compound{a:i32,b:compound{x:u8,y:f32}}"
    datatype: String,

    /// Keep only these compound members (dotted paths, comma separated)
    #[arg(long, value_delimiter = ',')]
    members: Option<Vec<String>>,

    /// Column the proposed edit targets
    #[arg(long, default_value_t = 0)]
    column: usize,

    /// Validate TEXT as an edit of the chosen column
    #[arg(long, value_name = "TEXT")]
    validate: Option<String>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_path) = &args.log {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("failed to open log file {}", log_path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting hdftable");
    }

    let mut dtype: Datatype = args.datatype.parse()?;
    if let Some(members) = &args.members {
        let selected: HashSet<String> = members.iter().map(|m| m.trim().to_string()).collect();
        dtype = dtype.select_members(&selected);
    }

    let maps = IndexMaps::for_datatype(&dtype)?;
    let columns = dtype.columns();
    println!("datatype: {}", dtype);
    println!("class:    {}", TypeClass::of(&dtype).name());
    println!("columns:  {}", columns.len());
    for (col, (name, leaf)) in columns.iter().enumerate() {
        let name = if name.is_empty() { "-" } else { name.as_str() };
        println!(
            "  {:>3}  {:<20} base={:<3} group={:<3} {}",
            col,
            name,
            maps.base_index(col)?,
            maps.group_start(col)?,
            TypeClass::of(leaf).name()
        );
    }

    if let Some(text) = &args.validate {
        if args.column >= columns.len() {
            bail!("column {} out of range (0..{})", args.column, columns.len());
        }
        Validator::for_datatype(&dtype).validate(args.column, 0, Some(text))?;
        tracing::debug!(column = args.column, text = %text, "edit accepted");
        println!("ok");
    }

    Ok(())
}
