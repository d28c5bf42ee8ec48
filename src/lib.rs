#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod adapters;
pub mod chemistry;
pub mod dosing;
#[cfg(feature = "std")]
pub mod error;
pub mod models;
pub mod solver;

pub use crate::chemistry::catalog::{Catalog, Salt, SaltEntry};
pub use crate::chemistry::{ION_COUNT, Ion};
#[cfg(feature = "std")]
pub use crate::error::AppError;
pub use crate::dosing::calculator::{
    Component, ComponentGrams, DoseLine, DosePlan, SolvedLine, SolvedPlan, concentrate, direct_dose,
    direct_g_per_l, solve, solve_batch, stock_back_calc,
};
pub use crate::models::{
    DoseRates, HardnessProfile, IonMap, PRESETS, Preset, SALINITY_SALTS, UnitMode,
};
pub use crate::solver::matrix::DosingMatrix;
pub use crate::solver::nnls::{SolveReport, SolveStatus, SolverConfig, StepSize, nnls};
