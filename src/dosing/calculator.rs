#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use serde::Serialize;

use crate::chemistry::{Ion, MG_PER_G, ML_PER_L};
use crate::chemistry::catalog::{Catalog, Salt};
use crate::chemistry::units::hardness_to_ions;
use crate::models::{DoseRates, HardnessProfile, IonMap, UnitMode};
use crate::solver::matrix::{DosingMatrix, target_vector};
use crate::solver::nnls::{SolveReport, SolverConfig, nnls};

/// Reference salt for calcium.
pub const CALCIUM_SALT: Salt = Salt::CalciumChlorideDihydrate;
/// Reference salt for magnesium.
pub const MAGNESIUM_SALT: Salt = Salt::EpsomSalt;
/// Reference salt for alkalinity.
pub const ALKALINITY_SALT: Salt = Salt::SodiumBicarbonate;

/// Floor for ion fractions used as divisors.
pub const MIN_FRACTION: f64 = 1e-12;
/// Floor for stock dose rates (mL/L) used as divisors.
pub const MIN_DOSE_RATE: f64 = 1e-9;

/// What a line of a hardness-based plan provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Calcium,
    Magnesium,
    Alkalinity,
    Salinity,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Calcium,
        Component::Magnesium,
        Component::Alkalinity,
        Component::Salinity,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Component::Calcium => "Calcium",
            Component::Magnesium => "Magnesium",
            Component::Alkalinity => "Alkalinity",
            Component::Salinity => "Salinity",
        }
    }
}

/// One salt of a hardness-based plan.
///
/// - `g_per_l`: grams of salt per litre of the liquid it is dissolved in
///   (the batch, the concentrate or the stock)
/// - `grams`: `g_per_l` times the batch or bottle volume
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DoseLine {
    pub component: Component,
    pub salt: Salt,
    pub g_per_l: f64,
    pub grams: f64,
}

/// Four lines, in [`Component::ALL`] order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DosePlan {
    pub lines: Vec<DoseLine>,
}

impl DosePlan {
    pub fn line(&self, component: Component) -> Option<&DoseLine> {
        self.lines.iter().find(|l| l.component == component)
    }

    pub fn total_grams(&self) -> f64 {
        self.lines.iter().map(|l| l.grams).sum()
    }

    fn from_g_per_l(per_l: ComponentGrams, salinity_salt: Salt, volume_l: f64) -> Self {
        let lines = Component::ALL
            .into_iter()
            .map(|component| {
                let (salt, g_per_l) = match component {
                    Component::Calcium => (CALCIUM_SALT, per_l.ca),
                    Component::Magnesium => (MAGNESIUM_SALT, per_l.mg),
                    Component::Alkalinity => (ALKALINITY_SALT, per_l.alk),
                    Component::Salinity => (salinity_salt, per_l.sal),
                };
                DoseLine {
                    component,
                    salt,
                    g_per_l,
                    grams: g_per_l * volume_l,
                }
            })
            .collect();
        Self { lines }
    }
}

/// Grams of each reference salt per litre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ComponentGrams {
    pub ca: f64,
    pub mg: f64,
    pub alk: f64,
    pub sal: f64,
}

impl ComponentGrams {
    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            ca: f(self.ca),
            mg: f(self.mg),
            alk: f(self.alk),
            sal: f(self.sal),
        }
    }
}

fn fraction(catalog: &Catalog, salt: Salt, ion: Ion) -> f64 {
    catalog.ion_fraction(salt, ion).max(MIN_FRACTION)
}

/// g/L of each reference salt that, dissolved straight into the water,
/// meets the profile. Salinity is given as mg/L of salt, so it is only
/// rescaled to g/L.
pub fn direct_g_per_l(
    catalog: &Catalog,
    profile: &HardnessProfile,
    mode: UnitMode,
) -> ComponentGrams {
    let ions = hardness_to_ions(profile, mode);
    ComponentGrams {
        ca: (ions.ca / MG_PER_G) / fraction(catalog, CALCIUM_SALT, Ion::Ca),
        mg: (ions.mg / MG_PER_G) / fraction(catalog, MAGNESIUM_SALT, Ion::Mg),
        alk: (ions.hco3 / MG_PER_G) / fraction(catalog, ALKALINITY_SALT, Ion::Hco3),
        sal: profile.sal / MG_PER_G,
    }
}

/// Salts to weigh directly into a batch of `batch_l` litres.
pub fn direct_dose(
    catalog: &Catalog,
    profile: &HardnessProfile,
    mode: UnitMode,
    batch_l: f64,
) -> DosePlan {
    let per_l = direct_g_per_l(catalog, profile, mode);
    DosePlan::from_g_per_l(per_l, profile.sal_salt, batch_l)
}

/// A single concentrate dosed at `dose_ml` mL per litre of water, mixed in a
/// `bottle_l` litre bottle. `g_per_l` is the concentrate strength.
pub fn concentrate(
    catalog: &Catalog,
    profile: &HardnessProfile,
    mode: UnitMode,
    dose_ml: f64,
    bottle_l: f64,
) -> DosePlan {
    let dose_fraction = dose_ml / ML_PER_L;
    let per_l = direct_g_per_l(catalog, profile, mode).map(|g| g / dose_fraction);
    DosePlan::from_g_per_l(per_l, profile.sal_salt, bottle_l)
}

/// Separate stocks, one per component, each dosed at its own rate (mL of
/// stock per litre of water). `g_per_l` is the required stock strength and
/// `grams` fills a `bottle_l` litre stock bottle.
pub fn stock_back_calc(
    catalog: &Catalog,
    profile: &HardnessProfile,
    mode: UnitMode,
    rates: &DoseRates,
    bottle_l: f64,
) -> DosePlan {
    let direct = direct_g_per_l(catalog, profile, mode);
    let strength = |g: f64, rate: f64| g / rate.max(MIN_DOSE_RATE) * ML_PER_L;
    let per_l = ComponentGrams {
        ca: strength(direct.ca, rates.ca),
        mg: strength(direct.mg, rates.mg),
        alk: strength(direct.alk, rates.alk),
        sal: strength(direct.sal, rates.sal),
    };
    DosePlan::from_g_per_l(per_l, profile.sal_salt, bottle_l)
}

/// Best non-negative dosing (g/L) of `salts` for arbitrary ion targets.
pub fn solve(
    catalog: &Catalog,
    targets: &IonMap,
    mode: UnitMode,
    salts: &[Salt],
    config: &SolverConfig,
) -> SolveReport {
    let a = DosingMatrix::build(catalog, salts);
    let b = target_vector(targets, mode);
    nnls(&a, &b, config)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SolvedLine {
    pub salt: Salt,
    pub g_per_l: f64,
    pub grams: f64,
}

/// Free-solver result scaled to a batch, with the solver diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolvedPlan {
    pub batch_l: f64,
    pub lines: Vec<SolvedLine>,
    pub report: SolveReport,
}

/// [`solve`] followed by scaling to a `batch_l` litre batch.
pub fn solve_batch(
    catalog: &Catalog,
    targets: &IonMap,
    mode: UnitMode,
    salts: &[Salt],
    config: &SolverConfig,
    batch_l: f64,
) -> SolvedPlan {
    let report = solve(catalog, targets, mode, salts, config);
    let lines = report
        .salts
        .iter()
        .zip(&report.x)
        .map(|(&salt, &g_per_l)| SolvedLine {
            salt,
            g_per_l,
            grams: g_per_l * batch_l,
        })
        .collect();
    SolvedPlan {
        batch_l,
        lines,
        report,
    }
}
