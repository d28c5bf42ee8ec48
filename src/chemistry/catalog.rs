//! Salt catalog: formulas, molar masses and the ion mass fractions each salt
//! releases when dissolved.
//!
//! The [`Catalog`] is the single stoichiometry table shared by the matrix
//! builder and every dosing workflow. Build it once with
//! [`Catalog::reference`] and pass it by reference.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use super::{ION_COUNT, Ion, M_C, M_CA, M_CL, M_CO3, M_H, M_H2O, M_K, M_MG, M_NA, M_O, M_S};

use Element as E;
use Released as R;

/// Elements appearing in catalog formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Ca,
    Mg,
    Na,
    K,
    Cl,
    S,
    O,
    H,
    C,
}

impl Element {
    pub const fn atomic_weight(self) -> f64 {
        match self {
            Element::Ca => M_CA,
            Element::Mg => M_MG,
            Element::Na => M_NA,
            Element::K => M_K,
            Element::Cl => M_CL,
            Element::S => M_S,
            Element::O => M_O,
            Element::H => M_H,
            Element::C => M_C,
        }
    }
}

/// Species released on dissolution. Carbonate is not a tracked ion but is
/// kept so the mass balance of carbonate salts is complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Released {
    Ion(Ion),
    Carbonate,
}

impl Released {
    const fn molar_mass(self) -> f64 {
        match self {
            Released::Ion(ion) => ion.molar_mass(),
            Released::Carbonate => M_CO3,
        }
    }
}

/// Anhydrous formula plus waters of hydration, and what one formula unit
/// releases in solution.
#[derive(Clone, Copy, Debug)]
pub struct Formula {
    pub atoms: &'static [(Element, u8)],
    pub hydrate: u8,
    pub releases: &'static [(Released, u8)],
}

impl Formula {
    /// Molar mass (g/mol) including water of hydration.
    pub fn molar_mass(&self) -> f64 {
        let anhydrous: f64 = self
            .atoms
            .iter()
            .map(|(el, n)| el.atomic_weight() * f64::from(*n))
            .sum();
        anhydrous + f64::from(self.hydrate) * M_H2O
    }
}

/// The reference salts. Keys encode the hydrate form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Salt {
    #[serde(rename = "CaCl2·2H2O", alias = "CaCl2.2H2O")]
    CalciumChlorideDihydrate,
    #[serde(rename = "CaCl2")]
    CalciumChloride,
    #[serde(rename = "CaSO4·2H2O", alias = "CaSO4.2H2O")]
    Gypsum,
    #[serde(rename = "MgSO4·7H2O", alias = "MgSO4.7H2O")]
    EpsomSalt,
    #[serde(rename = "MgCl2·6H2O", alias = "MgCl2.6H2O")]
    MagnesiumChlorideHexahydrate,
    #[serde(rename = "NaHCO3")]
    SodiumBicarbonate,
    #[serde(rename = "KHCO3")]
    PotassiumBicarbonate,
    #[serde(rename = "Na2CO3")]
    SodiumCarbonate,
    #[serde(rename = "K2CO3")]
    PotassiumCarbonate,
    #[serde(rename = "NaCl")]
    SodiumChloride,
    #[serde(rename = "KCl")]
    PotassiumChloride,
    #[serde(rename = "Na2SO4")]
    SodiumSulfate,
    #[serde(rename = "K2SO4")]
    PotassiumSulfate,
    #[serde(rename = "Na3C6H5O7·2H2O", alias = "Na3C6H5O7.2H2O")]
    SodiumCitrateDihydrate,
}

impl Salt {
    pub const ALL: [Salt; 14] = [
        Salt::CalciumChlorideDihydrate,
        Salt::CalciumChloride,
        Salt::Gypsum,
        Salt::EpsomSalt,
        Salt::MagnesiumChlorideHexahydrate,
        Salt::SodiumBicarbonate,
        Salt::PotassiumBicarbonate,
        Salt::SodiumCarbonate,
        Salt::PotassiumCarbonate,
        Salt::SodiumChloride,
        Salt::PotassiumChloride,
        Salt::SodiumSulfate,
        Salt::PotassiumSulfate,
        Salt::SodiumCitrateDihydrate,
    ];

    /// Unique catalog key, e.g. `"MgSO4·7H2O"`.
    pub const fn key(self) -> &'static str {
        match self {
            Salt::CalciumChlorideDihydrate => "CaCl2·2H2O",
            Salt::CalciumChloride => "CaCl2",
            Salt::Gypsum => "CaSO4·2H2O",
            Salt::EpsomSalt => "MgSO4·7H2O",
            Salt::MagnesiumChlorideHexahydrate => "MgCl2·6H2O",
            Salt::SodiumBicarbonate => "NaHCO3",
            Salt::PotassiumBicarbonate => "KHCO3",
            Salt::SodiumCarbonate => "Na2CO3",
            Salt::PotassiumCarbonate => "K2CO3",
            Salt::SodiumChloride => "NaCl",
            Salt::PotassiumChloride => "KCl",
            Salt::SodiumSulfate => "Na2SO4",
            Salt::PotassiumSulfate => "K2SO4",
            Salt::SodiumCitrateDihydrate => "Na3C6H5O7·2H2O",
        }
    }

    pub const fn formula(self) -> Formula {
        match self {
            Salt::CalciumChlorideDihydrate => Formula {
                atoms: &[(E::Ca, 1), (E::Cl, 2)],
                hydrate: 2,
                releases: &[(R::Ion(Ion::Ca), 1), (R::Ion(Ion::Cl), 2)],
            },
            Salt::CalciumChloride => Formula {
                atoms: &[(E::Ca, 1), (E::Cl, 2)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::Ca), 1), (R::Ion(Ion::Cl), 2)],
            },
            Salt::Gypsum => Formula {
                atoms: &[(E::Ca, 1), (E::S, 1), (E::O, 4)],
                hydrate: 2,
                releases: &[(R::Ion(Ion::Ca), 1), (R::Ion(Ion::So4), 1)],
            },
            Salt::EpsomSalt => Formula {
                atoms: &[(E::Mg, 1), (E::S, 1), (E::O, 4)],
                hydrate: 7,
                releases: &[(R::Ion(Ion::Mg), 1), (R::Ion(Ion::So4), 1)],
            },
            Salt::MagnesiumChlorideHexahydrate => Formula {
                atoms: &[(E::Mg, 1), (E::Cl, 2)],
                hydrate: 6,
                releases: &[(R::Ion(Ion::Mg), 1), (R::Ion(Ion::Cl), 2)],
            },
            Salt::SodiumBicarbonate => Formula {
                atoms: &[(E::Na, 1), (E::H, 1), (E::C, 1), (E::O, 3)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::Na), 1), (R::Ion(Ion::Hco3), 1)],
            },
            Salt::PotassiumBicarbonate => Formula {
                atoms: &[(E::K, 1), (E::H, 1), (E::C, 1), (E::O, 3)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::K), 1), (R::Ion(Ion::Hco3), 1)],
            },
            Salt::SodiumCarbonate => Formula {
                atoms: &[(E::Na, 2), (E::C, 1), (E::O, 3)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::Na), 2), (R::Carbonate, 1)],
            },
            Salt::PotassiumCarbonate => Formula {
                atoms: &[(E::K, 2), (E::C, 1), (E::O, 3)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::K), 2), (R::Carbonate, 1)],
            },
            Salt::SodiumChloride => Formula {
                atoms: &[(E::Na, 1), (E::Cl, 1)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::Na), 1), (R::Ion(Ion::Cl), 1)],
            },
            Salt::PotassiumChloride => Formula {
                atoms: &[(E::K, 1), (E::Cl, 1)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::K), 1), (R::Ion(Ion::Cl), 1)],
            },
            Salt::SodiumSulfate => Formula {
                atoms: &[(E::Na, 2), (E::S, 1), (E::O, 4)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::Na), 2), (R::Ion(Ion::So4), 1)],
            },
            Salt::PotassiumSulfate => Formula {
                atoms: &[(E::K, 2), (E::S, 1), (E::O, 4)],
                hydrate: 0,
                releases: &[(R::Ion(Ion::K), 2), (R::Ion(Ion::So4), 1)],
            },
            // Citrate is not tracked; only the sodium counts.
            Salt::SodiumCitrateDihydrate => Formula {
                atoms: &[(E::Na, 3), (E::C, 6), (E::H, 5), (E::O, 7)],
                hydrate: 2,
                releases: &[(R::Ion(Ion::Na), 3)],
            },
        }
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownSalt;

impl fmt::Display for UnknownSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown salt key")
    }
}

impl FromStr for Salt {
    type Err = UnknownSalt;

    /// Accepts the catalog key, or the same key with `.` instead of `·`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Salt::ALL
            .into_iter()
            .find(|salt| {
                salt.key()
                    .chars()
                    .map(|c| if c == '·' { '.' } else { c })
                    .eq(s.chars())
                    || salt.key() == s
            })
            .ok_or(UnknownSalt)
    }
}

/// One row of the stoichiometry table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaltEntry {
    pub salt: Salt,
    pub molar_mass: f64,
    /// Mass fraction of each tracked ion, in [`Ion::ALL`] order.
    pub fractions: [f64; ION_COUNT],
    /// Mass fraction released as carbonate (untracked).
    pub carbonate_fraction: f64,
}

impl SaltEntry {
    /// Derives molar mass and fractions from the salt's formula.
    pub fn from_formula(salt: Salt) -> Self {
        let formula = salt.formula();
        let molar_mass = formula.molar_mass();
        let mut fractions = [0.0; ION_COUNT];
        let mut carbonate_fraction = 0.0;
        for &(species, count) in formula.releases {
            let f = f64::from(count) * species.molar_mass() / molar_mass;
            match species {
                Released::Ion(ion) => fractions[ion.index()] += f,
                Released::Carbonate => carbonate_fraction += f,
            }
        }
        Self {
            salt,
            molar_mass,
            fractions,
            carbonate_fraction,
        }
    }

    pub fn fraction(&self, ion: Ion) -> f64 {
        self.fractions[ion.index()]
    }

    /// Sum of every released species' mass fraction.
    pub fn released_fraction(&self) -> f64 {
        self.fractions.iter().sum::<f64>() + self.carbonate_fraction
    }
}

/// Read-only stoichiometry table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Catalog {
    entries: Vec<SaltEntry>,
}

impl Catalog {
    /// The 14-salt reference catalog.
    pub fn reference() -> Self {
        Self::from_entries(Salt::ALL.into_iter().map(SaltEntry::from_formula).collect())
    }

    /// Builds a catalog from explicit entries; later duplicates are dropped.
    pub fn from_entries(entries: Vec<SaltEntry>) -> Self {
        let mut unique: Vec<SaltEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.iter().any(|e| e.salt == entry.salt) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    pub fn entries(&self) -> &[SaltEntry] {
        &self.entries
    }

    pub fn entry(&self, salt: Salt) -> Option<&SaltEntry> {
        self.entries.iter().find(|e| e.salt == salt)
    }

    /// Salt keys in catalog order.
    pub fn list_salts(&self) -> Vec<Salt> {
        self.entries.iter().map(|e| e.salt).collect()
    }

    /// Molar mass (g/mol), `None` for salts outside this catalog.
    pub fn molar_mass(&self, salt: Salt) -> Option<f64> {
        self.entry(salt).map(|e| e.molar_mass)
    }

    /// Mass fraction of `ion` in `salt`; 0 when the salt lacks the ion or is
    /// not in the catalog.
    pub fn ion_fraction(&self, salt: Salt, ion: Ion) -> f64 {
        self.entry(salt).map_or(0.0, |e| e.fraction(ion))
    }

    pub fn carbonate_fraction(&self, salt: Salt) -> f64 {
        self.entry(salt).map_or(0.0, |e| e.carbonate_fraction)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::reference()
    }
}
