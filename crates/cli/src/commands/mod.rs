//! Command implementations.

mod schema;
mod simulate;
mod sync;
mod validate;

pub use schema::run_schema;
pub use simulate::run_simulate;
pub use sync::run_sync;
pub use validate::run_validate;

use config_loader::ConfigOverrides;
use contracts::ContractError;

/// `BIKE_SYNC__*` environment overrides followed by `--set` assignments
pub(crate) fn config_overrides(assignments: &[String]) -> Result<ConfigOverrides, ContractError> {
    let mut overrides = ConfigOverrides::from_env()?;
    for assignment in assignments {
        overrides.set(assignment)?;
    }
    Ok(overrides)
}
