//! Bounded Nelder-Mead simplex minimization.
//!
//! Every trial point is projected onto the box constraints before it is
//! evaluated, so the objective never sees an out-of-bounds parameter.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best vertex found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stops once the spread of vertex values falls below this and the
    /// simplex radius falls below it relative to the centroid's magnitude.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex edge, relative to each coordinate (absolute when the
    /// coordinate is zero).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn initial_step(mut self, step: f64) -> Self {
        self.initial_step = step.abs();
        self
    }
}

/// Box constraints as `(lower, upper)` per dimension.
type Bounds<'a> = Option<&'a [(f64, f64)]>;

fn project(mut point: Vec<f64>, bounds: Bounds<'_>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

/// Total order on objective values; NaN sorts last.
fn by_value(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// `from + t * (to - from)`
fn lerp(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect()
}

struct Simplex<'a, F> {
    objective: F,
    bounds: Bounds<'a>,
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(objective: F, initial: &[f64], bounds: Bounds<'a>, step: f64) -> Self {
        let start = project(initial.to_vec(), bounds);
        let mut vertices = vec![start.clone()];

        for i in 0..start.len() {
            let mut vertex = start.clone();
            let delta = if start[i].abs() > 1e-10 {
                step * start[i].abs()
            } else {
                step
            };
            vertex[i] += delta;
            // Step inward when the bound swallows the move
            if let Some(&(lo, hi)) = bounds.and_then(|b| b.get(i)) {
                if vertex[i] > hi {
                    vertex[i] = (start[i] - delta).max(lo);
                }
            }
            vertices.push(project(vertex, bounds));
        }

        let values = vertices.iter().map(|v| objective(v)).collect();
        Self {
            objective,
            bounds,
            vertices,
            values,
        }
    }

    fn eval(&self, point: Vec<f64>) -> (Vec<f64>, f64) {
        let point = project(point, self.bounds);
        let value = (self.objective)(&point);
        (point, value)
    }

    fn order(&mut self) {
        let mut idx: Vec<usize> = (0..self.vertices.len()).collect();
        idx.sort_by(|&a, &b| by_value(self.values[a], self.values[b]));
        self.vertices = idx.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = idx.iter().map(|&i| self.values[i]).collect();
    }

    /// Centroid of every vertex but the worst (assumes ordered).
    fn centroid(&self) -> Vec<f64> {
        let keep = &self.vertices[..self.vertices.len() - 1];
        let dim = self.vertices[0].len();
        let mut c = vec![0.0; dim];
        for v in keep {
            for (cj, vj) in c.iter_mut().zip(v) {
                *cj += vj;
            }
        }
        c.iter_mut().for_each(|cj| *cj /= keep.len() as f64);
        c
    }

    /// Largest distance from `centroid` to a vertex.
    fn radius(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| {
                v.iter()
                    .zip(centroid)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }

    /// Values and vertices have both collapsed (assumes ordered).
    fn has_converged(&self, centroid: &[f64], tolerance: f64) -> bool {
        let (best, worst) = (self.values[0], self.values[self.values.len() - 1]);
        // Equal infinite values give a NaN spread
        let flat = worst - best < tolerance || best == worst;
        let scale = 1.0 + centroid.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        flat && self.radius(centroid) < tolerance * scale
    }

    fn replace_worst(&mut self, point: Vec<f64>, value: f64) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = point;
        self.values[last] = value;
    }

    fn shrink(&mut self, sigma: f64) {
        let best = self.vertices[0].clone();
        for i in 1..self.vertices.len() {
            let (point, value) = self.eval(lerp(&best, &self.vertices[i], sigma));
            self.vertices[i] = point;
            self.values[i] = value;
        }
    }

    /// One reflect/expand/contract/shrink step (assumes ordered).
    fn step(&mut self, centroid: &[f64], config: &NelderMeadConfig) {
        let n = self.vertices.len() - 1;
        let best = self.values[0];
        let second_worst = self.values[n - 1];
        let worst = self.values[n];

        let (reflected, fr) = self.eval(lerp(centroid, &self.vertices[n], -config.alpha));

        if fr < best {
            let (expanded, fe) = self.eval(lerp(centroid, &reflected, config.gamma));
            if fe < fr {
                self.replace_worst(expanded, fe);
            } else {
                self.replace_worst(reflected, fr);
            }
            return;
        }

        if fr < second_worst {
            self.replace_worst(reflected, fr);
            return;
        }

        if fr < worst {
            let (outside, fo) = self.eval(lerp(centroid, &reflected, config.rho));
            if fo <= fr {
                self.replace_worst(outside, fo);
                return;
            }
        } else {
            let (inside, fi) = self.eval(lerp(centroid, &self.vertices[n], config.rho));
            if fi < worst {
                self.replace_worst(inside, fi);
                return;
            }
        }

        self.shrink(config.sigma);
    }
}

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// # Arguments
/// * `objective` - Function to minimize
/// * `initial` - Starting point
/// * `bounds` - Optional `(lower, upper)` box per dimension
/// * `config` - Algorithm settings
///
/// # Example
/// ```
/// use wellcurve::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] + 1.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: Vec::new(),
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.order();

        let centroid = simplex.centroid();
        if simplex.has_converged(&centroid, config.tolerance) {
            converged = true;
            break;
        }

        simplex.step(&centroid, &config);
    }

    simplex.order();
    NelderMeadResult {
        optimal_point: simplex.vertices.swap_remove(0),
        optimal_value: simplex.values[0],
        iterations,
        converged,
    }
}
