//! The four dosing workflows: direct dosing, concentrate, stock
//! back-calculation and the free ion solver.

pub mod calculator;
