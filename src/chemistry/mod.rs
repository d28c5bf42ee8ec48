//! Chemistry module: atomic weights, tracked ions and hardness/alkalinity equivalents.
//!
//! This module provides:
//! - Standard atomic weights (g/mol) for the elements that occur in the salt catalog
//! - Molar masses of the polyatomic ions (bicarbonate, carbonate, sulfate)
//! - The fixed, ordered set of tracked ions used for every vector and matrix
//! - Equivalent weights and the "ppm as CaCO3" conversion (see [`units`])
//! - The salt catalog with per-salt ion mass fractions (see [`catalog`])
//!
//! Units conventions:
//! - Ion concentrations are mg/L unless a function says "as CaCO3"
//! - Salt doses are g/L of water (1 g/L of salt = 1000 mg/L of salt mass)
//! - Hardness and alkalinity "as CaCO3" use 50 mg CaCO3 per meq
//!
//! Design notes:
//! - Only Ca, Mg and HCO3 carry an equivalent weight; every other ion is
//!   always mass based and passes through the conversion untouched
//! - The ion order in [`Ion::ALL`] is the row order of the dosing matrix and
//!   of every target or result vector
//!
//! # Examples
//! ```rust
//! use mineral_rs::chemistry::{Ion, units::caco3_to_mg_l};
//!
//! // 50 ppm alkalinity as CaCO3 is 1 meq/L, i.e. 61.016 mg/L of bicarbonate.
//! let hco3 = caco3_to_mg_l(Ion::Hco3, 50.0);
//! assert!((hco3 - 61.016).abs() < 1e-9);
//! ```
//!
//! # Panics
//! Nothing in here panics.
//!
//! # Limitations
//! No carbonate speciation: alkalinity is treated as bicarbonate only, and
//! the carbonate released by Na2CO3/K2CO3 is reported but never solved for.

pub mod catalog;
pub mod units;

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Atomic weights (g/mol).
pub const M_CA: f64 = 40.078;
pub const M_MG: f64 = 24.305;
pub const M_NA: f64 = 22.989;
pub const M_K: f64 = 39.098_3;
pub const M_CL: f64 = 35.453;
pub const M_S: f64 = 32.065;
pub const M_O: f64 = 15.999;
pub const M_H: f64 = 1.008;
pub const M_C: f64 = 12.011;

/// Bicarbonate, HCO3-.
pub const M_HCO3: f64 = M_H + M_C + 3.0 * M_O;
/// Carbonate, CO3 2-.
pub const M_CO3: f64 = M_C + 3.0 * M_O;
/// Sulfate, SO4 2-.
pub const M_SO4: f64 = M_S + 4.0 * M_O;
/// Water of hydration.
pub const M_H2O: f64 = 2.0 * M_H + M_O;

/// Equivalent weights (g/eq) used for the CaCO3 conversion.
pub const EQW_CA: f64 = M_CA / 2.0;
pub const EQW_MG: f64 = M_MG / 2.0;
pub const EQW_HCO3: f64 = 61.016;
pub const EQW_CO3: f64 = 60.01;

/// mg per g, for converting salt doses (g/L) to ion concentrations (mg/L).
pub const MG_PER_G: f64 = 1000.0;
/// mL per L, for dose rates and dose fractions.
pub const ML_PER_L: f64 = 1000.0;

/// mg of CaCO3 per meq (equivalent weight of CaCO3).
pub const MG_PER_MEQ_AS_CACO3: f64 = 50.0;

/// Number of tracked ions; the row count of every dosing matrix.
pub const ION_COUNT: usize = 7;

/// A tracked ion. The declaration order is the fixed vector/matrix order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ion {
    Ca,
    Mg,
    Na,
    K,
    #[serde(rename = "HCO3")]
    Hco3,
    Cl,
    #[serde(rename = "SO4")]
    So4,
}

impl Ion {
    pub const ALL: [Ion; ION_COUNT] = [
        Ion::Ca,
        Ion::Mg,
        Ion::Na,
        Ion::K,
        Ion::Hco3,
        Ion::Cl,
        Ion::So4,
    ];

    /// Row index in matrices and target vectors.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Ion::Ca => "Ca",
            Ion::Mg => "Mg",
            Ion::Na => "Na",
            Ion::K => "K",
            Ion::Hco3 => "HCO3",
            Ion::Cl => "Cl",
            Ion::So4 => "SO4",
        }
    }

    /// Molar mass of the ion (g/mol).
    pub const fn molar_mass(self) -> f64 {
        match self {
            Ion::Ca => M_CA,
            Ion::Mg => M_MG,
            Ion::Na => M_NA,
            Ion::K => M_K,
            Ion::Hco3 => M_HCO3,
            Ion::Cl => M_CL,
            Ion::So4 => M_SO4,
        }
    }

    /// Signed ionic charge.
    pub const fn charge(self) -> i8 {
        match self {
            Ion::Ca | Ion::Mg => 2,
            Ion::Na | Ion::K => 1,
            Ion::Hco3 | Ion::Cl => -1,
            Ion::So4 => -2,
        }
    }

    /// Equivalent weight for ions expressed "as CaCO3"; `None` for ions that
    /// are always reported by mass.
    pub const fn equivalent_weight(self) -> Option<f64> {
        match self {
            Ion::Ca => Some(EQW_CA),
            Ion::Mg => Some(EQW_MG),
            Ion::Hco3 => Some(EQW_HCO3),
            _ => None,
        }
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownIon;

impl fmt::Display for UnknownIon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown ion symbol")
    }
}

impl FromStr for Ion {
    type Err = UnknownIon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ion::ALL
            .into_iter()
            .find(|ion| ion.symbol().eq_ignore_ascii_case(s))
            .ok_or(UnknownIon)
    }
}
