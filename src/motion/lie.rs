//! Lie-group logarithm and exponential of homogeneous transforms.
//!
//! The motion engine only needs two maps: a logarithm taking a 4x4 transform
//! to a generator, and an exponential taking a generator back. They sit
//! behind the [`LieGroup`] trait so another linear-algebra backend can be
//! plugged in without touching the engine.
//!
//! [`MatrixLieGroup`] computes both as general real matrix functions. Since
//! `log(Aᵀ) = log(A)ᵀ` and `exp(Xᵀ) = exp(X)ᵀ`, it works the same whether
//! translations live in the last row or the last column.
//!
//! # References
//!
//! - Denman, E. D. & Beavers, A. N. (1976). "The matrix sign function and
//!   computations in systems." Applied Mathematics and Computation, 2(1).
//! - Higham, N. J. (2008). "Functions of Matrices: Theory and Computation."
//!   SIAM, chapter 11 (inverse scaling and squaring).

use log::debug;
use nalgebra::Matrix4;

use crate::error::{MeshError, Result};

/// Logarithm / exponential pair over 4x4 homogeneous transforms.
pub trait LieGroup {
    /// Generator `X` with `exponential(X) == transform`.
    fn logarithm(&self, transform: &Matrix4<f64>) -> Result<Matrix4<f64>>;

    /// Transform generated by `generator`.
    fn exponential(&self, generator: &Matrix4<f64>) -> Matrix4<f64>;
}

/// Square roots are taken until `‖X - I‖` drops below this.
const SERIES_RADIUS: f64 = 0.25;

/// Upper bound on the number of square roots taken by the logarithm.
const MAX_SQUARE_ROOTS: usize = 64;

/// Upper bound on the number of terms of the log(I + E) series.
const MAX_SERIES_TERMS: usize = 100;

/// Matrix logarithm and exponential for invertible affine transforms.
///
/// The logarithm uses inverse scaling and squaring: repeated
/// Denman-Beavers square roots bring the matrix close to the identity, the
/// Mercator series gives `log(I + E)` there, and the result is scaled back by
/// `2^k`. The exponential is nalgebra's Padé-based matrix exponential.
#[derive(Debug, Clone)]
pub struct MatrixLieGroup {
    /// Relative change below which a square-root iteration has converged.
    pub tolerance: f64,

    /// Iteration cap for each square root.
    pub max_iterations: usize,
}

impl Default for MatrixLieGroup {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-14,
            max_iterations: 100,
        }
    }
}

impl MatrixLieGroup {
    /// Create a backend with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Principal square root by the Denman-Beavers iteration.
    fn sqrt(&self, a: &Matrix4<f64>) -> Result<Matrix4<f64>> {
        let mut y = *a;
        let mut z = Matrix4::identity();

        for _ in 0..self.max_iterations {
            let (Some(y_inv), Some(z_inv)) = (y.try_inverse(), z.try_inverse()) else {
                return Err(MeshError::NoRealLogarithm {
                    reason: "square root iteration hit a singular matrix".to_string(),
                });
            };

            let y_next = (y + z_inv) * 0.5;
            let z_next = (z + y_inv) * 0.5;
            if y_next.iter().any(|v| !v.is_finite()) {
                return Err(MeshError::NoRealLogarithm {
                    reason: "square root iteration diverged".to_string(),
                });
            }

            let change = (y_next - y).norm();
            y = y_next;
            z = z_next;
            if change <= self.tolerance * y.norm() {
                return Ok(y);
            }
        }

        Err(MeshError::ConvergenceFailed {
            iterations: self.max_iterations,
        })
    }
}

impl LieGroup for MatrixLieGroup {
    fn logarithm(&self, transform: &Matrix4<f64>) -> Result<Matrix4<f64>> {
        let det = transform.determinant();
        if !(det > 0.0) {
            return Err(MeshError::NoRealLogarithm {
                reason: format!("determinant {} is not positive", det),
            });
        }

        let identity = Matrix4::<f64>::identity();
        let mut x = *transform;
        let mut roots = 0;
        while (x - identity).norm() > SERIES_RADIUS {
            if roots == MAX_SQUARE_ROOTS {
                return Err(MeshError::ConvergenceFailed { iterations: roots });
            }
            x = self.sqrt(&x)?;
            roots += 1;
        }

        // log(I + E) = E - E²/2 + E³/3 - ...
        let e = x - identity;
        let mut power = e;
        let mut sum = Matrix4::zeros();
        for n in 1..=MAX_SERIES_TERMS {
            let term = power / n as f64;
            if n % 2 == 1 {
                sum += term;
            } else {
                sum -= term;
            }
            if term.norm() <= f64::EPSILON * sum.norm().max(f64::MIN_POSITIVE) {
                break;
            }
            power *= e;
        }

        debug!("matrix logarithm: {} square roots", roots);
        Ok(sum * 2f64.powi(roots as i32))
    }

    fn exponential(&self, generator: &Matrix4<f64>) -> Matrix4<f64> {
        generator.exp()
    }
}
