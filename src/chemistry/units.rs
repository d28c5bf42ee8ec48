//! Conversion between "ppm as CaCO3" and mass concentration (mg/L).
//!
//! `mg/L = ppm_as_CaCO3 * EqW(ion) / 50`. Only calcium, magnesium and
//! bicarbonate are ever converted; all other ions are mass based.

use super::{ION_COUNT, Ion, MG_PER_MEQ_AS_CACO3};
use crate::models::{HardnessProfile, IonMap, UnitMode};

/// Convert a CaCO3-equivalent concentration to mg/L of `ion`.
/// Ions without an equivalent weight are returned unchanged.
pub fn caco3_to_mg_l(ion: Ion, ppm_as_caco3: f64) -> f64 {
    match ion.equivalent_weight() {
        Some(eqw) => ppm_as_caco3 * (eqw / MG_PER_MEQ_AS_CACO3),
        None => ppm_as_caco3,
    }
}

/// Inverse of [`caco3_to_mg_l`].
pub fn mg_l_to_caco3(ion: Ion, mg_l: f64) -> f64 {
    match ion.equivalent_weight() {
        Some(eqw) => mg_l * (MG_PER_MEQ_AS_CACO3 / eqw),
        None => mg_l,
    }
}

/// Calcium, magnesium and bicarbonate targets (mg/L) derived from a
/// hardness profile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HardnessIons {
    pub ca: f64,
    pub mg: f64,
    pub hco3: f64,
}

/// Split general hardness between calcium and magnesium by `ca_share` and
/// convert hardness and alkalinity to mg/L.
///
/// In [`UnitMode::Mass`] the profile values are already mg/L and no
/// equivalent-weight scaling is applied. `ca_share` is not clamped.
pub fn hardness_to_ions(profile: &HardnessProfile, mode: UnitMode) -> HardnessIons {
    let ca = profile.gh * profile.ca_share;
    let mg = profile.gh * (1.0 - profile.ca_share);
    match mode {
        UnitMode::Caco3 => HardnessIons {
            ca: caco3_to_mg_l(Ion::Ca, ca),
            mg: caco3_to_mg_l(Ion::Mg, mg),
            hco3: caco3_to_mg_l(Ion::Hco3, profile.alk),
        },
        UnitMode::Mass => HardnessIons {
            ca,
            mg,
            hco3: profile.alk,
        },
    }
}

/// Target vector (mg/L, [`Ion::ALL`] order) for a full ion map.
pub fn ion_targets_mg_l(targets: &IonMap, mode: UnitMode) -> [f64; ION_COUNT] {
    let mut out = [0.0; ION_COUNT];
    for ion in Ion::ALL {
        let v = targets.get(ion);
        out[ion.index()] = match mode {
            UnitMode::Caco3 => caco3_to_mg_l(ion, v),
            UnitMode::Mass => v,
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{EQW_CA, EQW_MG, M_HCO3};

    #[test]
    fn one_meq_of_alkalinity_is_one_meq_of_bicarbonate() {
        assert!((caco3_to_mg_l(Ion::Hco3, 50.0) - M_HCO3).abs() < 1e-9);
    }

    #[test]
    fn mass_ions_pass_through() {
        for ion in [Ion::Na, Ion::K, Ion::Cl, Ion::So4] {
            assert_eq!(caco3_to_mg_l(ion, 42.0), 42.0);
            assert_eq!(mg_l_to_caco3(ion, 42.0), 42.0);
        }
    }

    #[test]
    fn inverse_conversion() {
        for ion in Ion::ALL {
            let back = mg_l_to_caco3(ion, caco3_to_mg_l(ion, 87.5));
            assert!((back - 87.5).abs() < 1e-9);
        }
    }

    #[test]
    fn hardness_split_in_caco3_mode() {
        let p = HardnessProfile {
            gh: 100.0,
            alk: 40.0,
            ca_share: 0.7,
            ..Default::default()
        };
        let ions = hardness_to_ions(&p, UnitMode::Caco3);
        assert!((ions.ca - 70.0 * EQW_CA / 50.0).abs() < 1e-9);
        assert!((ions.mg - 30.0 * EQW_MG / 50.0).abs() < 1e-9);
        assert!((ions.hco3 - 40.0 * 61.016 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn hardness_split_in_mass_mode_is_identity() {
        let p = HardnessProfile {
            gh: 100.0,
            alk: 40.0,
            ca_share: 0.25,
            ..Default::default()
        };
        let ions = hardness_to_ions(&p, UnitMode::Mass);
        assert_eq!(ions.ca, 25.0);
        assert_eq!(ions.mg, 75.0);
        assert_eq!(ions.hco3, 40.0);
    }

    #[test]
    fn out_of_range_share_is_not_clamped() {
        let p = HardnessProfile {
            gh: 100.0,
            ca_share: 1.5,
            ..Default::default()
        };
        let ions = hardness_to_ions(&p, UnitMode::Mass);
        assert_eq!(ions.ca, 150.0);
        assert_eq!(ions.mg, -50.0);
    }

    #[test]
    fn ion_map_conversion_touches_only_ca_mg_hco3() {
        let targets = IonMap {
            ca: 50.0,
            mg: 50.0,
            na: 10.0,
            k: 5.0,
            hco3: 50.0,
            cl: 20.0,
            so4: 30.0,
        };
        let b = ion_targets_mg_l(&targets, UnitMode::Caco3);
        assert!((b[Ion::Ca.index()] - EQW_CA).abs() < 1e-9);
        assert!((b[Ion::Mg.index()] - EQW_MG).abs() < 1e-9);
        assert!((b[Ion::Hco3.index()] - 61.016).abs() < 1e-9);
        assert_eq!(b[Ion::Na.index()], 10.0);
        assert_eq!(b[Ion::So4.index()], 30.0);
        assert_eq!(ion_targets_mg_l(&targets, UnitMode::Mass), targets.to_array());
    }
}
