use anyhow::{anyhow, Result};
use clap::{Args, Parser};
use colored::*;
use log::info;

use titrate::cli_parsers::{init_logging, ModelInput};
use titrate::energy::ANALYTIC_STATES;
use titrate::model::load_model;

#[derive(Debug, Args)]
pub struct ExactArguments {
    #[command(flatten)]
    pub input: ModelInput,
}

#[derive(Debug, Parser)]
#[command(name = "titr-exact")]
#[command(author, version, about = "Exact-enumeration protonation probabilities")]
pub struct Cli {
    #[command(flatten)]
    pub args: ExactArguments,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.args.input.verbose);

    let spec = load_model(&cli.args.input.model)?;
    let mut model = spec.build()?;
    let ph = cli.args.input.ph;

    if model.nstates() > ANALYTIC_STATES {
        return Err(anyhow!(
            "nstates ({}) exceeds ANALYTIC_STATES ({}); use titr-mc instead",
            model.nstates(),
            ANALYTIC_STATES
        ));
    }

    info!("evaluating {} sites, {} instances, {} microstates at pH {ph}", model.nsites(), model.ninstances(), model.nstates());
    model.calculate_probabilities_analytically(ph)?;

    println!("{}", format!("pH {ph:.2}  ({} sites, {} instances)", model.nsites(), model.ninstances()).bold());
    for instance in 0..model.ninstances() {
        let p = model.probability(instance)?;
        println!("instance {instance:>5}  {}", format!("{:>8.5}", p).green());
    }
    Ok(())
}
