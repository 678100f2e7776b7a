//! `matrixcalc store ...` on the registry file.

use std::path::Path;

use anyhow::{Context, Result};
use matrixcalc::core::registry::Registry;
use matrixcalc::core::Matrix;

use crate::cli::StoreAction;

pub fn main(action: StoreAction, registry_path: &Path) -> Result<()> {
    let mut registry = Registry::open(registry_path)?;
    match action {
        StoreAction::List => {
            for name in registry.names() {
                let shape = registry.get(name).map(Matrix::shape).unwrap_or_default();
                println!("{name} ({}x{})", shape.0, shape.1);
            }
            return Ok(());
        }
        StoreAction::Show { name } => {
            let m = registry.get(&name).with_context(|| format!("matrix {name} not found"))?;
            println!("{m}");
            return Ok(());
        }
        StoreAction::Set { name, matrix } => {
            let m: Matrix = serde_json::from_str(&matrix).with_context(|| format!("parsing matrix {matrix}"))?;
            if registry.get(&name).is_some() {
                registry.edit(&name, m)?;
                println!("Matrix {name} updated successfully");
            } else {
                registry.create(&name, m)?;
                println!("Matrix {name} saved successfully");
            }
        }
        StoreAction::Delete { name } => {
            registry.delete(&name)?;
            println!("Matrix {name} deleted successfully");
        }
    }
    registry.save(registry_path)
}
