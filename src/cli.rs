use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "matrixcalc",
    about = "matrixcalc: exact, symbolic, and floating matrix algebra",
    version,
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct MatrixCli {
    /// Global: path to config (TOML); default: ~/.matrixcalc/config.toml
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Global: registry file; default from config or ~/.matrixcalc/matrices.json
    #[arg(long = "registry", value_name = "FILE", global = true)]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one operation and print the result
    ///
    /// Examples:
    ///   matrixcalc calc determinant --a '[[1,2],[3,4]]'
    ///   matrixcalc calc power --a '[[4,0],[0,9]]' --scalar 1/2 --exact
    ///   matrixcalc calc multiply --a @A --b @B
    Calc {
        /// add, subtract, multiply, scalar_multiply, transpose, determinant,
        /// inverse, eigenvalues, characteristic, power, trace
        #[arg(value_name = "OP")]
        operation: String,

        /// First matrix as JSON, or @NAME from the registry
        #[arg(long = "a", value_name = "MATRIX")]
        a: String,

        /// Second matrix for add/subtract/multiply
        #[arg(long = "b", value_name = "MATRIX")]
        b: Option<String>,

        /// Scalar factor or exponent token
        #[arg(long = "scalar", value_name = "TOKEN", allow_hyphen_values = true)]
        scalar: Option<String>,

        /// Print exact/symbolic values instead of floating JSON
        #[arg(long = "exact", action = ArgAction::SetTrue)]
        exact: bool,

        /// Keep a matrix result in the registry under this name
        #[arg(long = "store", value_name = "NAME")]
        store: Option<String>,
    },

    /// Check a structural property
    Check {
        /// symmetric, orthogonal, invertible, diagonalizable
        #[arg(value_name = "PROPERTY")]
        property: String,

        #[arg(long = "a", value_name = "MATRIX")]
        a: String,
    },

    /// Manage named matrices
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// List stored names
    List,
    /// Print one matrix
    Show {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Create or replace a matrix
    Set {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "MATRIX")]
        matrix: String,
    },
    /// Remove a matrix
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },
}
