pub mod calc;
pub mod check;
pub mod store;

use anyhow::{anyhow, Context, Result};
use matrixcalc::core::registry::Registry;
use matrixcalc::core::Matrix;

/// A matrix argument: `@NAME` reads the registry, anything else is a JSON grid.
pub fn resolve_matrix(arg: &str, registry: &Registry) -> Result<Matrix> {
    if let Some(name) = arg.strip_prefix('@') {
        return registry
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("matrix {name} not found"));
    }
    serde_json::from_str(arg).with_context(|| format!("parsing matrix {arg}"))
}
