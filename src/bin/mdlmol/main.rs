use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mdlmol::{read, write, MolVersion, Molecule, WriteOptions};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mdlmol",
    about = "Inspect and convert MDL Molfile / SD files",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize every record in an SD file
    Info {
        /// Input SD/MOL file
        input: PathBuf,
    },
    /// Re-emit an SD stream, optionally forcing a connection-table version
    Convert {
        /// Input SD/MOL file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Connection table version: 2 (V2000) or 3 (V3000); omit for
        /// size-based selection
        #[arg(long, value_enum, value_name = "VERSION")]
        molfmt: Option<Molfmt>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Molfmt {
    #[value(name = "2")]
    V2000,
    #[value(name = "3")]
    V3000,
}

impl From<Molfmt> for MolVersion {
    fn from(fmt: Molfmt) -> Self {
        match fmt {
            Molfmt::V2000 => MolVersion::V2000,
            Molfmt::V3000 => MolVersion::V3000,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Info { input } => info(&input),
        Command::Convert {
            input,
            output,
            molfmt,
        } => convert(&input, &output, molfmt),
    }
}

fn read_records(path: &PathBuf) -> Result<Vec<Molecule>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    loop {
        match read(&mut reader) {
            Ok(Some(mol)) => records.push(mol),
            Ok(None) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("record {} of {} failed to parse", records.len() + 1, path.display())
                });
            }
        }
    }
    Ok(records)
}

fn info(input: &PathBuf) -> Result<()> {
    let records = read_records(input)?;
    for (n, mol) in records.iter().enumerate() {
        let title = if mol.title.is_empty() { "(untitled)" } else { &mol.title };
        println!(
            "#{:<4} {:<32} {:>6} atoms {:>6} bonds {:>4} data items",
            n + 1,
            title,
            mol.atom_count(),
            mol.bond_count(),
            mol.annotations.len()
        );
    }
    println!("{} record(s)", records.len());
    Ok(())
}

fn convert(input: &PathBuf, output: &PathBuf, molfmt: Option<Molfmt>) -> Result<()> {
    let records = read_records(input)?;
    let version = molfmt.map(MolVersion::from).unwrap_or_default();

    let file =
        File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let last = records.len().saturating_sub(1);
    for (n, mol) in records.iter().enumerate() {
        let options = WriteOptions {
            version,
            last_record: n == last,
        };
        write(&mut writer, mol, &options)
            .with_context(|| format!("record {} failed to convert", n + 1))?;
    }
    Ok(())
}
