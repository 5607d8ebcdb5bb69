//! Scenario selection shared by every command

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use kinmen_core::Scenario;

#[derive(Args, Clone, Debug)]
pub struct ScenarioArgs {
    /// Map descriptor JSON file (built-in fallback scenario when omitted)
    #[arg(long, value_name = "FILE", requires = "units")]
    pub map: Option<PathBuf>,

    /// Unit roster JSON file
    #[arg(long, value_name = "FILE", requires = "map")]
    pub units: Option<PathBuf>,

    /// Fail on a bad scenario instead of falling back to the built-in one
    #[arg(long)]
    pub strict: bool,
}

impl ScenarioArgs {
    pub fn load(&self) -> Result<Scenario> {
        let (map, units) = match (&self.map, &self.units) {
            (Some(map), Some(units)) => (map, units),
            (None, None) => return Ok(Scenario::fallback()),
            _ => bail!("--map and --units must be given together"),
        };

        if self.strict {
            Scenario::load(map, units).with_context(|| {
                format!("Failed to load scenario: {} + {}", map.display(), units.display())
            })
        } else {
            Ok(Scenario::load_or_fallback(map, units))
        }
    }
}
