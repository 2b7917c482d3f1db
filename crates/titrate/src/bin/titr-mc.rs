use anyhow::Result;
use clap::{Args, Parser};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use titrate::cli_parsers::{init_logging, ModelInput};
use titrate::mc::MCEngine;
use titrate::model::load_model;

#[derive(Debug, Args)]
pub struct McArguments {
    #[command(flatten)]
    pub input: ModelInput,

    /// Minimum |W| for a site pair to be registered for double moves
    #[arg(long, default_value = "1.0")]
    pub limit: f64,

    /// Number of equilibration scans
    #[arg(long, default_value = "1000")]
    pub nequil: u64,

    /// Number of production scans
    #[arg(long, default_value = "200000")]
    pub nprod: u64,

    /// RNG seed
    #[arg(long, default_value = "1")]
    pub seed: u64,
}

#[derive(Debug, Parser)]
#[command(name = "titr-mc")]
#[command(author, version, about = "Metropolis Monte Carlo protonation-state sampling")]
pub struct Cli {
    #[command(flatten)]
    pub args: McArguments,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.args.input.verbose);

    let spec = load_model(&cli.args.input.model)?;
    let mut model = spec.build()?;
    let ph = cli.args.input.ph;

    let rng = titr_rng::Mt19937::new(cli.args.seed as u32);
    let mut engine = MCEngine::new(rng, cli.args.limit, cli.args.nequil, cli.args.nprod);
    engine.link_to_energy_model(&model);

    let npairs = engine.find_pairs(&mut model)?;
    info!("found {npairs} strongly-interacting site pairs (limit={})", cli.args.limit);

    let bar = ProgressBar::new(cli.args.nequil + cli.args.nprod);
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} scans").unwrap());

    engine.equilibration(&model, ph)?;
    bar.inc(cli.args.nequil);
    engine.production(&model, ph)?;
    bar.inc(cli.args.nprod);
    bar.finish_and_clear();

    let move_rate = engine.moves_accepted() as f64 / engine.moves_done().max(1) as f64;
    let flip_rate = engine.flips_accepted() as f64 / engine.flips_done().max(1) as f64;
    println!("{}", format!("pH {ph:.2}  ({} sites, {} instances)", model.nsites(), model.ninstances()).bold());
    println!("single-move acceptance: {}", format!("{:>6.2}%", move_rate * 100.0).yellow());
    println!("double-move acceptance: {}", format!("{:>6.2}%", flip_rate * 100.0).yellow());
    for instance in 0..model.ninstances() {
        println!("instance {instance:>5}  {}", format!("{:>8.5}", engine.probability(instance)).green());
    }
    Ok(())
}
