use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pc1600::{sysex, Patch, Section};

/// Convert Peavey PC1600 patch dumps to and from editable JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a current buffer dump into a JSON document
    ToJson {
        /// Path to the PC1600 sysex dump
        sysex_file: PathBuf,

        /// Output path, stdout when omitted
        json_file: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },
    /// Encode a JSON document into a current buffer dump
    FromJson {
        /// Path to the JSON document
        json_file: PathBuf,

        /// Path of the sysex dump to write
        sysex_file: PathBuf,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },
    /// Print the records of a sysex dump
    Show {
        /// Path to the PC1600 sysex dump
        sysex_file: PathBuf,
    },
    /// Write a message asking the device to dump its current buffer
    Request {
        /// Path of the sysex message to write
        sysex_file: PathBuf,

        /// MIDI channel of the device
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
        channel: u8,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Commands::ToJson {
            sysex_file,
            json_file,
            force,
        } => {
            let patch = read_patch(&sysex_file)?;
            let json = patch.to_json()?;
            match json_file {
                Some(path) => write_output(&path, json.as_bytes(), force)?,
                None => println!("{}", json),
            }
        }
        Commands::FromJson {
            json_file,
            sysex_file,
            force,
        } => {
            let json = std::fs::read_to_string(&json_file)
                .with_context(|| format!("reading JSON file '{}'", json_file.display()))?;
            let patch = Patch::from_json(&json)
                .with_context(|| format!("converting '{}'", json_file.display()))?;
            write_output(&sysex_file, &patch.to_sysex()?, force)?;
            log::info!("wrote patch '{}' to {}", patch.name(), sysex_file.display());
        }
        Commands::Show { sysex_file } => {
            let patch = read_patch(&sysex_file)?;
            println!("Name: {}", patch.name());
            println!("Global channel: {}", patch.global_channel());
            for section in Section::ALL {
                println!("{}:", section);
                for (i, record) in patch.section(section).iter().enumerate() {
                    println!("  {:2}: {}", i + 1, record);
                }
            }
        }
        Commands::Request {
            sysex_file,
            channel,
            force,
        } => {
            let msg = sysex::dump_request(channel - 1)?;
            write_output(&sysex_file, &msg, force)?;
        }
    }

    Ok(())
}

fn read_patch(path: &Path) -> anyhow::Result<Patch> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading sysex file '{}'", path.display()))?;
    Patch::from_sysex(&bytes).with_context(|| format!("decoding '{}'", path.display()))
}

fn write_output(path: &Path, bytes: &[u8], force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "'{}' already exists, pass --force to overwrite it",
            path.display()
        );
    }
    std::fs::write(path, bytes).with_context(|| format!("writing '{}'", path.display()))
}
