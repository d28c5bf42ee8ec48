#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::chemistry::catalog::Salt;
use crate::chemistry::{ION_COUNT, Ion};
use crate::solver::nnls::SolverConfig;

/// How Ca, Mg and HCO3 targets are expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// ppm as CaCO3 for Ca, Mg and HCO3; mg/L for the rest.
    #[default]
    Caco3,
    /// mg/L for every ion.
    Mass,
}

/// One concentration per tracked ion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonMap {
    #[serde(alias = "Ca")]
    pub ca: f64,
    #[serde(alias = "Mg")]
    pub mg: f64,
    #[serde(alias = "Na")]
    pub na: f64,
    #[serde(alias = "K")]
    pub k: f64,
    #[serde(alias = "HCO3")]
    pub hco3: f64,
    #[serde(alias = "Cl")]
    pub cl: f64,
    #[serde(alias = "SO4")]
    pub so4: f64,
}

impl IonMap {
    pub fn get(&self, ion: Ion) -> f64 {
        match ion {
            Ion::Ca => self.ca,
            Ion::Mg => self.mg,
            Ion::Na => self.na,
            Ion::K => self.k,
            Ion::Hco3 => self.hco3,
            Ion::Cl => self.cl,
            Ion::So4 => self.so4,
        }
    }

    pub fn with(mut self, ion: Ion, value: f64) -> Self {
        let slot = match ion {
            Ion::Ca => &mut self.ca,
            Ion::Mg => &mut self.mg,
            Ion::Na => &mut self.na,
            Ion::K => &mut self.k,
            Ion::Hco3 => &mut self.hco3,
            Ion::Cl => &mut self.cl,
            Ion::So4 => &mut self.so4,
        };
        *slot = value;
        self
    }

    pub fn to_array(&self) -> [f64; ION_COUNT] {
        Ion::ALL.map(|ion| self.get(ion))
    }

    pub fn from_array(values: [f64; ION_COUNT]) -> Self {
        Ion::ALL
            .into_iter()
            .fold(Self::default(), |map, ion| map.with(ion, values[ion.index()]))
    }
}

/// Hardness/alkalinity target used by the concentrate, direct and stock
/// workflows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardnessProfile {
    /// General hardness.
    #[serde(alias = "GH")]
    pub gh: f64,
    /// Alkalinity.
    #[serde(alias = "Alk")]
    pub alk: f64,
    /// Share of hardness supplied by calcium (by equivalents).
    #[serde(alias = "CaShare")]
    pub ca_share: f64,
    /// Salinity target, mg/L of `sal_salt`.
    #[serde(alias = "Sal")]
    pub sal: f64,
    /// Salt that provides the salinity. The CLI accepts
    /// [`SALINITY_SALTS`] only; the library takes any catalog salt.
    #[serde(alias = "SalSalt")]
    pub sal_salt: Salt,
}

/// Salts offered for the salinity component.
pub const SALINITY_SALTS: [Salt; 2] = [Salt::SodiumChloride, Salt::PotassiumChloride];

impl Default for HardnessProfile {
    fn default() -> Self {
        Self {
            gh: 100.0,
            alk: 40.0,
            ca_share: 0.7,
            sal: 0.0,
            sal_salt: Salt::SodiumChloride,
        }
    }
}

/// Stock dose rates, mL of stock per L of finished water.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoseRates {
    pub ca: f64,
    pub mg: f64,
    pub alk: f64,
    pub sal: f64,
}

impl Default for DoseRates {
    fn default() -> Self {
        Self {
            ca: 1.0,
            mg: 1.0,
            alk: 1.0,
            sal: 0.0,
        }
    }
}

/// A named starting point for the hardness workflows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub unit_mode: UnitMode,
    pub gh: f64,
    pub alk: f64,
    pub ca_share: f64,
    pub sal: f64,
}

pub static PRESETS: [Preset; 4] = [
    Preset {
        name: "SCA mid",
        unit_mode: UnitMode::Caco3,
        gh: 75.0,
        alk: 40.0,
        ca_share: 0.6,
        sal: 0.0,
    },
    Preset {
        name: "Rao-style brew",
        unit_mode: UnitMode::Caco3,
        gh: 50.0,
        alk: 20.0,
        ca_share: 0.3,
        sal: 0.0,
    },
    Preset {
        name: "Low TDS filter",
        unit_mode: UnitMode::Caco3,
        gh: 40.0,
        alk: 20.0,
        ca_share: 0.5,
        sal: 0.0,
    },
    Preset {
        name: "Classic espresso",
        unit_mode: UnitMode::Caco3,
        gh: 120.0,
        alk: 50.0,
        ca_share: 0.7,
        sal: 0.0,
    },
];

impl Preset {
    /// Case-insensitive lookup by name.
    pub fn find(name: &str) -> Option<&'static Preset> {
        PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Overwrites the hardness, alkalinity, calcium share and salinity of
    /// `profile`. The salinity salt is left as it is.
    pub fn apply_to_profile(&self, profile: &mut HardnessProfile) {
        profile.gh = self.gh;
        profile.alk = self.alk;
        profile.ca_share = self.ca_share;
        profile.sal = self.sal;
    }

    /// Overwrites the Ca, Mg and HCO3 targets in the preset's own units:
    /// hardness split between Ca and Mg, alkalinity on HCO3. Na, K, Cl and
    /// SO4 keep their values.
    pub fn apply_to_targets(&self, targets: &mut IonMap) {
        targets.ca = self.gh * self.ca_share;
        targets.mg = self.gh * (1.0 - self.ca_share);
        targets.hco3 = self.alk;
    }

    /// Default hardness profile with this preset applied.
    pub fn profile(&self) -> HardnessProfile {
        let mut profile = HardnessProfile::default();
        self.apply_to_profile(&mut profile);
        profile
    }

    /// Solver targets for this preset alone; every other ion is zero.
    pub fn ion_targets(&self) -> IonMap {
        let mut targets = IonMap::default();
        self.apply_to_targets(&mut targets);
        targets
    }
}

/// Input document for the free ion solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveInput {
    pub targets: IonMap,
    pub unit_mode: UnitMode,
    /// Allowed salts, in output order; `None` enables the whole catalog.
    pub salts: Option<Vec<Salt>>,
    pub batch_l: f64,
    pub solver: SolverConfig,
}

impl Default for SolveInput {
    fn default() -> Self {
        Self {
            targets: IonMap::default(),
            unit_mode: UnitMode::default(),
            salts: None,
            batch_l: 1.0,
            solver: SolverConfig::default(),
        }
    }
}

/// Input document for direct dosing into a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectInput {
    pub profile: HardnessProfile,
    pub unit_mode: UnitMode,
    pub batch_l: f64,
}

impl Default for DirectInput {
    fn default() -> Self {
        Self {
            profile: HardnessProfile::default(),
            unit_mode: UnitMode::default(),
            batch_l: 1.0,
        }
    }
}

/// Input document for building a concentrate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcentrateInput {
    pub profile: HardnessProfile,
    pub unit_mode: UnitMode,
    /// mL of concentrate per litre of water.
    pub dose_ml: f64,
    pub bottle_l: f64,
}

impl Default for ConcentrateInput {
    fn default() -> Self {
        Self {
            profile: HardnessProfile::default(),
            unit_mode: UnitMode::default(),
            dose_ml: 1.0,
            bottle_l: 1.0,
        }
    }
}

/// Input document for back-calculating stock strengths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockInput {
    pub profile: HardnessProfile,
    pub unit_mode: UnitMode,
    pub dose_rates: DoseRates,
    pub bottle_l: f64,
}

impl Default for StockInput {
    fn default() -> Self {
        Self {
            profile: HardnessProfile::default(),
            unit_mode: UnitMode::default(),
            dose_rates: DoseRates::default(),
            bottle_l: 1.0,
        }
    }
}

#[cfg(feature = "std")]
mod validation {
    use super::*;
    use crate::error::AppError;

    fn non_negative(field: &'static str, value: f64) -> Result<(), AppError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(AppError::InvalidValue { field, value })
        }
    }

    fn positive(field: &'static str, value: f64) -> Result<(), AppError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(AppError::InvalidValue { field, value })
        }
    }

    impl HardnessProfile {
        /// Rejects negative concentrations, a calcium share outside [0, 1] and
        /// a salinity salt other than NaCl or KCl.
        pub fn validate(&self) -> Result<(), AppError> {
            non_negative("gh", self.gh)?;
            non_negative("alk", self.alk)?;
            non_negative("sal", self.sal)?;
            if !(0.0..=1.0).contains(&self.ca_share) {
                return Err(AppError::CalciumShareOutOfRange(self.ca_share));
            }
            if !SALINITY_SALTS.contains(&self.sal_salt) {
                return Err(AppError::UnsupportedSalinitySalt(self.sal_salt));
            }
            Ok(())
        }
    }

    impl IonMap {
        pub fn validate(&self) -> Result<(), AppError> {
            Ion::ALL
                .into_iter()
                .try_for_each(|ion| non_negative(ion.symbol(), self.get(ion)))
        }
    }

    impl DoseRates {
        pub fn validate(&self) -> Result<(), AppError> {
            non_negative("dose_rates.ca", self.ca)?;
            non_negative("dose_rates.mg", self.mg)?;
            non_negative("dose_rates.alk", self.alk)?;
            non_negative("dose_rates.sal", self.sal)
        }
    }

    impl SolveInput {
        pub fn validate(&self) -> Result<(), AppError> {
            self.targets.validate()?;
            non_negative("batch_l", self.batch_l)
        }
    }

    impl DirectInput {
        pub fn validate(&self) -> Result<(), AppError> {
            self.profile.validate()?;
            non_negative("batch_l", self.batch_l)
        }
    }

    impl ConcentrateInput {
        pub fn validate(&self) -> Result<(), AppError> {
            self.profile.validate()?;
            positive("dose_ml", self.dose_ml)?;
            non_negative("bottle_l", self.bottle_l)
        }
    }

    impl StockInput {
        pub fn validate(&self) -> Result<(), AppError> {
            self.profile.validate()?;
            self.dose_rates.validate()?;
            non_negative("bottle_l", self.bottle_l)
        }
    }
}
