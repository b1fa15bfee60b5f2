use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use nanofab_mask::{run, verify, write_mapping, MaskConfig};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate the GDS mask of asymmetric spiral MZI sweeps for the 2024 nanofabrication run"
)]
pub struct Args {
    /// A TOML file overriding the default mask and sweep configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The directory to write the GDS file to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Fail if the devices overflow the design space.
    #[arg(long)]
    strict: bool,
    /// Write the location of every placed device to this JSON file.
    #[arg(long)]
    mapping: Option<PathBuf>,
    /// Read the written GDS file back and summarize it.
    #[arg(long)]
    verify: bool,
}

fn main_inner(args: Args) -> photonics::error::Result<()> {
    let mut config = match args.config {
        Some(ref path) => MaskConfig::from_file(path)?,
        None => MaskConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    config.strict_bounds |= args.strict;

    let output = run(&config)?;
    info!("mask written to {:?}", output.path);

    if let Some(ref path) = args.mapping {
        write_mapping(path, &output.mapping)?;
        info!("placement mapping written to {:?}", path);
    }
    if args.verify {
        verify(&output.path)?;
    }
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(err) = main_inner(args) {
        error!("{err}");
        std::process::exit(1);
    }
}
