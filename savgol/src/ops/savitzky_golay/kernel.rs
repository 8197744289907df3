//! Least-squares kernel construction for Savitzky-Golay smoothing.
//!
//! The window's sample grid defines a design matrix whose rows are the
//! polynomial terms `x^j * y^i` evaluated at each grid point (1-based
//! coordinates). It is factorized once with Givens rotations into `Q * R`.
//!
//! To get convolution weights for a reference point `p`, the least-squares
//! problem is solved with a unit impulse at `p` as the right-hand side. Because
//! the fit is linear in the samples, the fitted surface evaluated at sample `s`
//! is entry `(s, p)` of the hat matrix `A (A^T A)^-1 A^T`. That matrix is
//! symmetric, so evaluating the surface at every grid point yields the weights
//! that smooth the value at `p` from a real window of samples.

use std::ops::Index;

use crate::common::{AlignedArray, Error, Result, Vec2usize};

/// Kernel storage alignment, in elements.
pub const KERNEL_ALIGN: usize = 4;

pub type KernelWeights = AlignedArray<f32, KERNEL_ALIGN>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rotation {
    sin: f64,
    cos: f64,
}

impl Rotation {
    /// Recorded where the entry to eliminate is already zero. Keeps the
    /// replay sequence in lockstep with the factorization.
    const IDENTITY: Rotation = Rotation { sin: 0.0, cos: 1.0 };

    /// Rotation that maps `(pivot, below)` onto `(r, 0)`, together with `r`.
    /// `below` must be non-zero.
    ///
    /// Divides by the larger magnitude so `1 + t^2` never overflows.
    fn eliminating(pivot: f64, below: f64) -> (Rotation, f64) {
        if pivot == 0.0 {
            let rotation = Rotation {
                sin: 1.0f64.copysign(below),
                cos: 0.0,
            };
            return (rotation, below.abs());
        }

        if below.abs() > pivot.abs() {
            let t = pivot / below;
            let u = (1.0 + t * t).sqrt().copysign(below);
            let sin = 1.0 / u;
            (Rotation { sin, cos: sin * t }, below * u)
        } else {
            let t = below / pivot;
            let u = (1.0 + t * t).sqrt().copysign(pivot);
            let cos = 1.0 / u;
            (Rotation { sin: cos * t, cos }, pivot * u)
        }
    }

    #[inline]
    fn apply(&self, pivot: &mut f64, other: &mut f64) {
        let rotated_pivot = self.cos * *pivot + self.sin * *other;
        *other = self.cos * *other - self.sin * *pivot;
        *pivot = rotated_pivot;
    }
}

/// Number of polynomial terms for the given per-axis degrees, `None` on
/// overflow.
#[inline]
pub fn term_count(hor_degree: usize, vert_degree: usize) -> Option<usize> {
    hor_degree
        .checked_add(1)?
        .checked_mul(vert_degree.checked_add(1)?)
}

/// Checks that a window/degree pair yields a well-posed least-squares fit and
/// returns its term count.
pub(crate) fn validate_window(
    window_size: Vec2usize,
    hor_degree: usize,
    vert_degree: usize,
) -> Result<usize> {
    let terms = match (term_count(hor_degree, vert_degree), window_size.checked_area()) {
        (Some(terms), Some(samples)) if samples != 0 && terms <= samples => terms,
        (terms, _) => {
            return Err(Error::InvalidWindowSize {
                window_size,
                terms: terms.unwrap_or(usize::MAX),
            });
        }
    };

    // With fewer distinct coordinates than terms on an axis the design matrix
    // loses rank even when the total sample count is large enough.
    if hor_degree >= window_size.x || vert_degree >= window_size.y {
        return Err(Error::InvalidDegree {
            window_size,
            hor_degree,
            vert_degree,
        });
    }

    Ok(terms)
}

/// QR factorization of the design matrix for one window/degree configuration.
///
/// Immutable once built; any number of reference points can be evaluated
/// against it, from any number of threads, each with its own output buffer.
#[derive(Debug, Clone)]
pub struct Factorization {
    window_size: Vec2usize,
    hor_degree: usize,
    vert_degree: usize,
    num_terms: usize,
    num_points: usize,
    /// `num_points` rows by `num_terms` columns, row-major. After
    /// factorization the upper `num_terms` rows hold R; the rest is zero.
    r: Vec<f64>,
    /// One rotation per sub-diagonal entry, column by column, top to bottom.
    rotations: Vec<Rotation>,
}

impl Factorization {
    pub fn new(window_size: Vec2usize, hor_degree: usize, vert_degree: usize) -> Result<Self> {
        let num_terms = validate_window(window_size, hor_degree, vert_degree)?;
        let num_points = window_size.area();

        let mut factorization = Self {
            window_size,
            hor_degree,
            vert_degree,
            num_terms,
            num_points,
            r: Self::design_matrix(window_size, hor_degree, vert_degree, num_terms),
            rotations: Vec::new(),
        };
        factorization.factorize();

        tracing::debug!(
            "Factorized {}x{} window, degree {}x{}: {} terms, {} rotations",
            window_size.x,
            window_size.y,
            hor_degree,
            vert_degree,
            num_terms,
            factorization.rotations.len()
        );

        Ok(factorization)
    }

    /// Row per grid point, columns `x^j * y^i` with `j` varying fastest.
    fn design_matrix(
        window_size: Vec2usize,
        hor_degree: usize,
        vert_degree: usize,
        num_terms: usize,
    ) -> Vec<f64> {
        let mut equations = Vec::with_capacity(window_size.area() * num_terms);

        for y in 1..=window_size.y {
            for x in 1..=window_size.x {
                let mut pow_y = 1.0;
                for _ in 0..=vert_degree {
                    let mut pow = pow_y;
                    for _ in 0..=hor_degree {
                        equations.push(pow);
                        pow *= x as f64;
                    }
                    pow_y *= y as f64;
                }
            }
        }

        equations
    }

    fn factorize(&mut self) {
        let n = self.num_terms;
        let m = self.num_points;

        self.rotations.clear();
        self.rotations.reserve(n * (n - 1) / 2 + (m - n) * n);

        for j in 0..n {
            let jj = j * n + j;
            for i in (j + 1)..m {
                let ij = i * n + j;
                if self.r[ij] == 0.0 {
                    self.rotations.push(Rotation::IDENTITY);
                    continue;
                }

                let (rotation, diagonal) = Rotation::eliminating(self.r[jj], self.r[ij]);
                self.rotations.push(rotation);

                self.r[jj] = diagonal;
                self.r[ij] = 0.0;

                let (pivot_rows, lower_rows) = self.r.split_at_mut(i * n);
                let pivot_row = &mut pivot_rows[j * n + j + 1..(j + 1) * n];
                let row = &mut lower_rows[j + 1..n];
                for (pivot, other) in pivot_row.iter_mut().zip(row.iter_mut()) {
                    rotation.apply(pivot, other);
                }
            }
        }
    }

    pub fn window_size(&self) -> Vec2usize {
        self.window_size
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Convolution weights reproducing the fitted surface at `origin`.
    ///
    /// # Panics
    /// Panics if `origin` lies outside the window.
    pub fn evaluate_at(&self, origin: Vec2usize) -> KernelWeights {
        let mut rhs = vec![0.0; self.num_points];
        let mut coeffs = vec![0.0; self.num_terms];
        let mut kernel = KernelWeights::new(self.num_points);
        self.evaluate_into(origin, &mut rhs, &mut coeffs, &mut kernel);
        kernel
    }

    /// Same as [`Self::evaluate_at`] with caller-provided scratch: `rhs` of
    /// length `num_points`, `coeffs` of length `num_terms` and `kernel` of
    /// length `num_points`.
    pub fn evaluate_into(
        &self,
        origin: Vec2usize,
        rhs: &mut [f64],
        coeffs: &mut [f64],
        kernel: &mut [f32],
    ) {
        assert!(
            origin.x < self.window_size.x && origin.y < self.window_size.y,
            "origin ({}, {}) outside {}x{} window",
            origin.x,
            origin.y,
            self.window_size.x,
            self.window_size.y
        );
        assert_eq!(rhs.len(), self.num_points, "rhs length mismatch");
        assert_eq!(coeffs.len(), self.num_terms, "coefficient length mismatch");
        assert_eq!(kernel.len(), self.num_points, "kernel length mismatch");

        rhs.fill(0.0);
        rhs[origin.to_index(self.window_size.x)] = 1.0;

        self.rotate_rhs(rhs);
        self.back_substitute(rhs, coeffs);
        self.evaluate_surface(coeffs, kernel);
    }

    /// Applies Q^T to `rhs` by replaying the recorded rotations.
    fn rotate_rhs(&self, rhs: &mut [f64]) {
        let n = self.num_terms;
        let mut rotations = self.rotations.iter();

        for j in 0..n {
            let (head, tail) = rhs.split_at_mut(j + 1);
            let pivot = &mut head[j];
            for (other, rotation) in tail.iter_mut().zip(rotations.by_ref()) {
                rotation.apply(pivot, other);
            }
        }
    }

    /// Solves `R * coeffs = rhs[..num_terms]`.
    fn back_substitute(&self, rhs: &[f64], coeffs: &mut [f64]) {
        let n = self.num_terms;

        for i in (0..n).rev() {
            let row = &self.r[i * n..(i + 1) * n];
            let mut sum = rhs[i];
            for k in (i + 1)..n {
                sum -= row[k] * coeffs[k];
            }

            debug_assert!(row[i] != 0.0, "zero pivot at term {}", i);
            coeffs[i] = sum / row[i];
        }
    }

    fn evaluate_surface(&self, coeffs: &[f64], kernel: &mut [f32]) {
        let mut weights = kernel.iter_mut();

        for y in 1..=self.window_size.y {
            for x in 1..=self.window_size.x {
                let mut sum = 0.0;
                let mut pow_y = 1.0;
                let mut terms = coeffs.iter();
                for _ in 0..=self.vert_degree {
                    let mut pow = pow_y;
                    for coeff in terms.by_ref().take(self.hor_degree + 1) {
                        sum += pow * coeff;
                        pow *= x as f64;
                    }
                    pow_y *= y as f64;
                }

                if let Some(weight) = weights.next() {
                    *weight = sum as f32;
                }
            }
        }
    }
}

/// A factorization paired with the kernel for its current reference point.
///
/// Owns its scratch buffers, so re-deriving the kernel for another reference
/// point allocates nothing. Not meant to be shared while being re-targeted.
#[derive(Debug)]
pub struct KernelSolver {
    factorization: Factorization,
    origin: Vec2usize,
    rhs: Vec<f64>,
    coeffs: Vec<f64>,
    kernel: KernelWeights,
}

impl KernelSolver {
    pub fn new(
        window_size: Vec2usize,
        origin: Vec2usize,
        hor_degree: usize,
        vert_degree: usize,
    ) -> Result<Self> {
        let factorization = Factorization::new(window_size, hor_degree, vert_degree)?;
        Ok(Self::from_factorization(factorization, origin))
    }

    pub fn from_factorization(factorization: Factorization, origin: Vec2usize) -> Self {
        let mut solver = Self {
            rhs: vec![0.0; factorization.num_points()],
            coeffs: vec![0.0; factorization.num_terms()],
            kernel: KernelWeights::new(factorization.num_points()),
            factorization,
            origin,
        };
        solver.recalc_for_origin(origin);
        solver
    }

    /// Re-derives the kernel for a new reference point inside the window.
    pub fn recalc_for_origin(&mut self, origin: Vec2usize) {
        self.factorization.evaluate_into(
            origin,
            &mut self.rhs,
            &mut self.coeffs,
            &mut self.kernel,
        );
        self.origin = origin;
    }

    /// Kernel weights, row-major over the window, 16-byte aligned.
    #[inline]
    pub fn data(&self) -> &[f32] {
        self.kernel.as_slice()
    }

    #[inline]
    pub fn origin(&self) -> Vec2usize {
        self.origin
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.factorization.window_size().x
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.factorization.window_size().y
    }

    pub fn factorization(&self) -> &Factorization {
        &self.factorization
    }
}

impl Index<usize> for KernelSolver {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.kernel[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(weights: &[f32]) -> f64 {
        weights.iter().map(|&w| w as f64).sum()
    }

    #[test]
    fn rejects_more_terms_than_samples() {
        let result = Factorization::new(Vec2usize::new(2, 2), 2, 2);
        assert_eq!(
            result.err(),
            Some(Error::InvalidWindowSize {
                window_size: Vec2usize::new(2, 2),
                terms: 9
            })
        );
    }

    #[test]
    fn rejects_empty_window() {
        let result = KernelSolver::new(Vec2usize::new(0, 5), Vec2usize::ZERO, 0, 0);
        assert!(matches!(result, Err(Error::InvalidWindowSize { .. })));
    }

    #[test]
    fn rejects_rank_deficient_axis() {
        // 4 terms fit in 9 samples, but a single column can't carry a cubic.
        let result = Factorization::new(Vec2usize::new(1, 9), 3, 0);
        assert!(matches!(result, Err(Error::InvalidDegree { .. })));
    }

    #[test]
    fn term_count_overflow_is_none() {
        assert_eq!(term_count(4, 4), Some(25));
        assert_eq!(term_count(usize::MAX, 0), None);
        assert_eq!(term_count(1 << 40, 1 << 40), None);
    }

    #[test]
    fn rejects_oversized_parameters() {
        let result = Factorization::new(Vec2usize::new(7, 7), usize::MAX, 1);
        assert_eq!(
            result.err(),
            Some(Error::InvalidWindowSize {
                window_size: Vec2usize::new(7, 7),
                terms: usize::MAX
            })
        );

        let huge = Vec2usize::new(1 << 33, 1 << 33);
        let result = validate_window(huge, 0, 0);
        assert!(matches!(result, Err(Error::InvalidWindowSize { terms: 1, .. })));
    }

    #[test]
    fn rotation_count_covers_every_subdiagonal_entry() {
        let f = Factorization::new(Vec2usize::new(7, 7), 4, 4).unwrap();
        let n = f.num_terms();
        let m = f.num_points();
        assert_eq!(f.rotations.len(), n * (n - 1) / 2 + (m - n) * n);
    }

    #[test]
    fn factorization_is_upper_triangular() {
        let f = Factorization::new(Vec2usize::new(5, 3), 2, 1).unwrap();
        let n = f.num_terms();
        for i in 0..f.num_points() {
            for j in 0..n.min(i) {
                assert_eq!(f.r[i * n + j], 0.0, "entry ({}, {}) not eliminated", i, j);
            }
        }
        for i in 0..n {
            assert!(f.r[i * n + i] != 0.0);
        }
    }

    #[test]
    fn recalc_same_origin_is_bit_identical() {
        let mut solver = KernelSolver::new(Vec2usize::new(7, 7), Vec2usize::new(1, 2), 4, 4)
            .unwrap();
        let first = solver.data().to_vec();

        solver.recalc_for_origin(Vec2usize::new(6, 0));
        solver.recalc_for_origin(Vec2usize::new(1, 2));
        let second = solver.data().to_vec();

        assert_eq!(
            first.iter().map(|w| w.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|w| w.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn degree_zero_is_mean_filter() {
        let window = Vec2usize::new(5, 3);
        let mut solver = KernelSolver::new(window, Vec2usize::ZERO, 0, 0).unwrap();
        for y in 0..window.y {
            for x in 0..window.x {
                solver.recalc_for_origin(Vec2usize::new(x, y));
                assert!((sum(solver.data()) - 1.0).abs() < 1e-6);
                for &w in solver.data() {
                    assert!((w - 1.0 / 15.0).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn weights_sum_to_one_for_any_degree() {
        let window = Vec2usize::new(7, 5);
        let f = Factorization::new(window, 3, 2).unwrap();
        for y in 0..window.y {
            for x in 0..window.x {
                let kernel = f.evaluate_at(Vec2usize::new(x, y));
                assert!(
                    (sum(&kernel) - 1.0).abs() < 1e-4,
                    "origin ({}, {}) sums to {}",
                    x,
                    y,
                    sum(&kernel)
                );
            }
        }
    }

    #[test]
    fn reproduces_polynomials_within_degree() {
        // A fit of degree (2, 1) must return any such polynomial unchanged.
        let window = Vec2usize::new(5, 5);
        let f = Factorization::new(window, 2, 1).unwrap();
        let surface = |x: f64, y: f64| 3.0 - 0.5 * x + 0.25 * x * x + 2.0 * y - 0.1 * x * y;

        for origin in [Vec2usize::new(2, 2), Vec2usize::new(0, 4), Vec2usize::new(4, 1)] {
            let kernel = f.evaluate_at(origin);
            let mut smoothed = 0.0;
            for y in 0..window.y {
                for x in 0..window.x {
                    smoothed += kernel[y * window.x + x] as f64 * surface(x as f64, y as f64);
                }
            }
            let expected = surface(origin.x as f64, origin.y as f64);
            assert!(
                (smoothed - expected).abs() < 1e-3,
                "origin {:?}: {} vs {}",
                origin,
                smoothed,
                expected
            );
        }
    }

    #[test]
    fn centered_kernel_is_symmetric() {
        let solver = KernelSolver::new(Vec2usize::new(7, 1), Vec2usize::new(3, 0), 4, 0).unwrap();
        for i in 0..3 {
            assert!((solver[i] - solver[6 - i]).abs() < 1e-6);
        }
        // Classic 7-point quartic smoothing weights: (5, -30, 75, 131, 75, -30, 5) / 231.
        assert!((solver[3] - 131.0 / 231.0).abs() < 1e-5);
        assert!((solver[0] - 5.0 / 231.0).abs() < 1e-5);
    }

    #[test]
    fn separable_kernel_is_outer_product() {
        let window = Vec2usize::new(5, 7);
        let center = window.center();
        let full = KernelSolver::new(window, center, 2, 4).unwrap();
        let hor = KernelSolver::new(Vec2usize::new(5, 1), Vec2usize::new(center.x, 0), 2, 0)
            .unwrap();
        let vert = KernelSolver::new(Vec2usize::new(1, 7), Vec2usize::new(0, center.y), 0, 4)
            .unwrap();

        for y in 0..window.y {
            for x in 0..window.x {
                let product = hor[x] * vert[y];
                assert!((full[y * window.x + x] - product).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn kernel_storage_is_aligned() {
        let solver = KernelSolver::new(Vec2usize::new(3, 3), Vec2usize::ZERO, 1, 1).unwrap();
        assert_eq!(solver.data().as_ptr() as usize % 16, 0);
        assert_eq!(solver.width(), 3);
        assert_eq!(solver.height(), 3);
    }

    #[test]
    #[should_panic(expected = "outside 3x3 window")]
    fn origin_outside_window_panics() {
        let f = Factorization::new(Vec2usize::new(3, 3), 1, 1).unwrap();
        let _ = f.evaluate_at(Vec2usize::new(3, 0));
    }

    #[test]
    fn factorization_is_shareable_across_threads() {
        let f = std::sync::Arc::new(Factorization::new(Vec2usize::new(5, 5), 2, 2).unwrap());
        let expected = f.evaluate_at(Vec2usize::new(1, 3)).to_vec();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let f = std::sync::Arc::clone(&f);
                std::thread::spawn(move || f.evaluate_at(Vec2usize::new(1, 3)).to_vec())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
