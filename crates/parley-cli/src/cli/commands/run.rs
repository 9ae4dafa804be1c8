use parley_core::pipeline::Pipeline;
use parley_core::config::load_config;

use crate::cli::args::RunArgs;
use crate::exit_codes;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    // Config failures abort before any record is touched.
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let pipeline = match Pipeline::from_config(&cfg) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let summary = pipeline
        .run(&args.input_dir, &args.output_dir, args.samples)
        .await?;

    println!(
        "processed {} record(s) across {} file(s): {} rated, {} failed",
        summary.records, summary.files, summary.rated, summary.failed
    );
    Ok(exit_codes::SUCCESS)
}
