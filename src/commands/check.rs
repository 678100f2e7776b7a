//! `matrixcalc check <PROPERTY>`

use anyhow::Result;
use matrixcalc::core::registry::Registry;
use matrixcalc::core::{check_property, Property};

use super::resolve_matrix;

pub fn main(property: &str, a: &str, registry: &Registry) -> Result<()> {
    let property: Property = property.parse()?;
    let matrix = resolve_matrix(a, registry)?;
    let (_, message) = check_property(property, &matrix);
    println!("{message}");
    Ok(())
}
