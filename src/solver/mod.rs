//! Dosing matrix and the non-negative least-squares solver.

pub mod matrix;
pub mod nnls;
