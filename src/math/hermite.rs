//! Polynomial interpolation from values and derivatives.
//!
//! The polynomial is kept in Newton form. Each sample point contributes one
//! abscissa per known derivative order (a confluent node), and the divided
//! differences are updated incrementally, so adding a point costs O(n).

use nalgebra::SVector;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct HermiteInterpolator<const N: usize> {
    /// One entry per derivative order of every sample, in insertion order.
    abscissae: Vec<f64>,
    /// Top diagonal of the divided differences table: the Newton coefficients.
    top_diagonal: Vec<SVector<f64, N>>,
    /// Bottom diagonal, needed to extend the table with a new point.
    bottom_diagonal: Vec<SVector<f64, N>>,
}

impl<const N: usize> Default for HermiteInterpolator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HermiteInterpolator<N> {
    pub fn new() -> Self {
        HermiteInterpolator {
            abscissae: Vec::new(),
            top_diagonal: Vec::new(),
            bottom_diagonal: Vec::new(),
        }
    }

    /// Adds a sample at `x`. `derivatives[k]` is the k-th derivative at `x`,
    /// starting with the value itself.
    ///
    /// Fails if `x` coincides with a previously added abscissa.
    #[allow(clippy::float_cmp)]
    pub fn add_sample_point(&mut self, x: f64, derivatives: &[SVector<f64, N>]) -> Result<()> {
        if self.abscissae.iter().any(|&a| a == x) {
            return Err(Error::DuplicateAbscissa(x));
        }

        let mut factorial = 1.0;
        for (order, derivative) in derivatives.iter().enumerate() {
            if order > 1 {
                factorial *= order as f64;
            }
            let y = derivative / factorial;

            // Walk up the bottom diagonal, replacing each entry with the next
            // divided difference.
            let n = self.abscissae.len();
            self.bottom_diagonal.insert(n - order, y);
            let mut bottom0 = y;
            for j in order..n {
                let idx = n - (j + 1);
                let inv = 1.0 / (x - self.abscissae[idx]);
                let bottom1 = (bottom0 - self.bottom_diagonal[idx]) * inv;
                self.bottom_diagonal[idx] = bottom1;
                bottom0 = bottom1;
            }

            self.top_diagonal.push(bottom0);
            self.abscissae.push(x);
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.abscissae.is_empty()
    }

    /// Number of conditions (values plus derivatives) the polynomial honours.
    pub fn len(&self) -> usize {
        self.abscissae.len()
    }

    pub fn value(&self, x: f64) -> Result<SVector<f64, N>> {
        Ok(self.value_and_derivative(x)?.0)
    }

    /// Evaluates the polynomial and its first derivative at `x`.
    pub fn value_and_derivative(&self, x: f64) -> Result<(SVector<f64, N>, SVector<f64, N>)> {
        if self.is_empty() {
            return Err(Error::EmptySample);
        }

        let mut value = SVector::<f64, N>::zeros();
        let mut derivative = SVector::<f64, N>::zeros();
        let mut value_coeff = 1.0;
        let mut derivative_coeff = 0.0;
        for (coefficient, abscissa) in self.top_diagonal.iter().zip(&self.abscissae) {
            value += coefficient * value_coeff;
            derivative += coefficient * derivative_coeff;

            // Product rule on prod (x - a_i)
            let delta_x = x - abscissa;
            derivative_coeff = derivative_coeff * delta_x + value_coeff;
            value_coeff *= delta_x;
        }

        Ok((value, derivative))
    }
}
