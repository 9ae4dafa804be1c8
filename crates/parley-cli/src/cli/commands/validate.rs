use parley_core::config::load_config;

use crate::cli::args::ValidateArgs;
use crate::exit_codes;

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    match load_config(&args.config) {
        Ok(cfg) => {
            println!(
                "config ok: {} provider(s), {} juror(s), scores {}..={}",
                cfg.providers.len(),
                cfg.jury.len(),
                cfg.score_min,
                cfg.score_max
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("config error: {e}");
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
