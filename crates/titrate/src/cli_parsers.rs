use std::io::Write;

use clap::{ArgAction, Args};
use env_logger::Builder;

/// Arguments shared by `titr-exact` and `titr-mc`: the model file, the
/// pH at which to evaluate it, and verbosity.
#[derive(Debug, Args)]
pub struct ModelInput {
    /// Titration model JSON file, or "-" for stdin
    #[arg(value_name = "MODEL", default_value = "-")]
    pub model: String,

    /// pH at which to evaluate the model
    #[arg(long, default_value = "7.0")]
    pub ph: f64,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
