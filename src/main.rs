use clap::Parser as _;

use skyburst::config::{CliArgs, Config};
use skyburst::driver::{self, Context};
use skyburst::logging;

fn main() -> skyburst::Result<()> {
    let config = Config::from(CliArgs::parse());
    logging::setup_logging(config.log_file.as_deref())?;

    // Sound is loaded before the screen switch so a missing file is reported on the console
    let context = Context::new(config);
    let result = driver::run(&context);

    if let Err(error) = &result {
        tracing::error!("{error}");
    }
    result
}
