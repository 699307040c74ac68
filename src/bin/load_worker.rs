//! Standalone load worker: runs the goose attack headlessly with the
//! scenario set from the library. Users, hatch rate, run time, and the
//! report file come from the CLI flags the runner passes through.

use goose::prelude::*;

use bmc_harness::config::HarnessConfig;
use bmc_harness::load;

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    let cfg = HarnessConfig::load().unwrap_or_default();

    GooseAttack::initialize()?
        .register_scenario(load::bmc_scenario(&cfg.bmc)?)
        .register_scenario(load::placeholder_scenario()?)
        .register_scenario(load::weather_scenario()?)
        .execute()
        .await?;

    Ok(())
}
