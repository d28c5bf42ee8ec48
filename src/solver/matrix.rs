#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::chemistry::catalog::{Catalog, Salt};
use crate::chemistry::units::ion_targets_mg_l;
use crate::chemistry::{ION_COUNT, Ion, MG_PER_G};
use crate::models::{IonMap, UnitMode};

/// Coefficients `A[ion][salt]`: mg/L of each tracked ion delivered by 1 g/L
/// of each enabled salt. Rows follow [`Ion::ALL`], columns follow the salt
/// order given to [`DosingMatrix::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct DosingMatrix {
    salts: Vec<Salt>,
    columns: Vec<[f64; ION_COUNT]>,
}

impl DosingMatrix {
    /// Builds the matrix for `salts` from the catalog. Salts missing from the
    /// catalog get an all-zero column; an empty list gives a 7 x 0 matrix.
    pub fn build(catalog: &Catalog, salts: &[Salt]) -> Self {
        let columns = salts
            .iter()
            .map(|&salt| Ion::ALL.map(|ion| MG_PER_G * catalog.ion_fraction(salt, ion)))
            .collect();
        Self {
            salts: salts.to_vec(),
            columns,
        }
    }

    pub fn salts(&self) -> &[Salt] {
        &self.salts
    }

    pub const fn rows(&self) -> usize {
        ION_COUNT
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, ion: Ion, col: usize) -> f64 {
        self.columns[col][ion.index()]
    }

    pub fn column(&self, col: usize) -> &[f64; ION_COUNT] {
        &self.columns[col]
    }

    /// `A x`: ion concentrations (mg/L) produced by dose vector `x` (g/L).
    pub fn apply(&self, x: &[f64]) -> [f64; ION_COUNT] {
        let mut out = [0.0; ION_COUNT];
        for (col, &xj) in self.columns.iter().zip(x) {
            for (o, a) in out.iter_mut().zip(col) {
                *o += a * xj;
            }
        }
        out
    }

    /// `A^T r`, one entry per salt.
    pub fn transpose_apply(&self, r: &[f64; ION_COUNT]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|col| col.iter().zip(r).map(|(a, ri)| a * ri).sum())
            .collect()
    }

    /// Infinity norm of the Gram matrix `A^T A`. Bounds its largest
    /// eigenvalue from above.
    pub fn gram_norm_inf(&self) -> f64 {
        self.columns
            .iter()
            .map(|ci| {
                self.columns
                    .iter()
                    .map(|cj| {
                        let dot: f64 = ci.iter().zip(cj).map(|(a, b)| a * b).sum();
                        if dot < 0.0 { -dot } else { dot }
                    })
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }
}

/// Target vector `b` (mg/L) in the matrix row order.
pub fn target_vector(targets: &IonMap, mode: UnitMode) -> [f64; ION_COUNT] {
    ion_targets_mg_l(targets, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::M_CA;

    #[test]
    fn empty_selection_has_no_columns() {
        let a = DosingMatrix::build(&Catalog::reference(), &[]);
        assert_eq!(a.rows(), 7);
        assert_eq!(a.cols(), 0);
        assert!(a.is_empty());
        assert_eq!(a.apply(&[]), [0.0; ION_COUNT]);
        assert!(a.transpose_apply(&[1.0; ION_COUNT]).is_empty());
        assert_eq!(a.gram_norm_inf(), 0.0);
    }

    #[test]
    fn coefficients_are_mg_per_gram() {
        let a = DosingMatrix::build(
            &Catalog::reference(),
            &[Salt::SodiumChloride, Salt::CalciumChlorideDihydrate],
        );
        assert_eq!(a.salts(), &[Salt::SodiumChloride, Salt::CalciumChlorideDihydrate]);
        let ca = a.get(Ion::Ca, 1);
        assert!((ca - 1000.0 * M_CA / 147.014).abs() < 1e-9);
        assert_eq!(a.get(Ion::Ca, 0), 0.0);
        assert_eq!(a.get(Ion::So4, 0), 0.0);
    }

    #[test]
    fn apply_and_transpose_agree() {
        let a = DosingMatrix::build(
            &Catalog::reference(),
            &[Salt::Gypsum, Salt::SodiumBicarbonate],
        );
        let x = [0.2, 0.5];
        let r = [1.0, -2.0, 0.5, 0.0, 3.0, -1.0, 2.0];
        let ax = a.apply(&x);
        let atr = a.transpose_apply(&r);
        let lhs: f64 = ax.iter().zip(&r).map(|(p, q)| p * q).sum();
        let rhs: f64 = atr.iter().zip(&x).map(|(p, q)| p * q).sum();
        assert!((lhs - rhs).abs() < 1e-9);
    }

    #[test]
    fn gram_norm_of_orthogonal_columns_is_largest_squared_norm() {
        let a = DosingMatrix::build(
            &Catalog::reference(),
            &[Salt::CalciumChlorideDihydrate, Salt::SodiumBicarbonate],
        );
        let sq = |c: &[f64; ION_COUNT]| c.iter().map(|v| v * v).sum::<f64>();
        let expected = sq(a.column(0)).max(sq(a.column(1)));
        assert!((a.gram_norm_inf() - expected).abs() < 1e-6);
    }
}
