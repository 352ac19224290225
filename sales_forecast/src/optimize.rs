//! Derivative-free minimisation used to estimate model parameters

use tracing::warn;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Relative offset used to build the initial simplex around non-zero coordinates
const NONZERO_STEP: f64 = 0.05;
/// Absolute offset used for coordinates that start at zero
const ZERO_STEP: f64 = 0.00025;

/// Nelder-Mead simplex minimiser
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Iteration cap; `None` means `200 * dimension`
    max_iterations: Option<usize>,
    /// Convergence threshold on the simplex spread
    x_tolerance: f64,
    /// Convergence threshold on the spread of objective values
    f_tolerance: f64,
}

/// Outcome of a minimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether both tolerances were met before the iteration cap
    pub converged: bool,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: None,
            x_tolerance: 1e-8,
            f_tolerance: 1e-8,
        }
    }
}

impl NelderMead {
    /// Create a minimiser with default tolerances
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Minimise `objective` starting from `start`.
    ///
    /// Non-finite objective values are treated as `+inf`, so the simplex walks
    /// away from regions where the objective is undefined.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let eval = |x: &[f64]| {
            let value = objective(x);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let n = start.len();
        if n == 0 {
            return Minimum {
                point: Vec::new(),
                value: eval(start),
                iterations: 0,
                converged: true,
            };
        }

        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(start.to_vec());
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] = if vertex[i] != 0.0 {
                vertex[i] * (1.0 + NONZERO_STEP)
            } else {
                ZERO_STEP
            };
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();

        let max_iterations = self.max_iterations.unwrap_or(200 * n);
        let mut iterations = 0;
        let mut converged = false;

        loop {
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            let x_spread = simplex[1..]
                .iter()
                .flat_map(|vertex| vertex.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            let f_spread = values[1..]
                .iter()
                .map(|value| (value - values[0]).abs())
                .fold(0.0, f64::max);

            if x_spread <= self.x_tolerance && f_spread <= self.f_tolerance {
                converged = true;
                break;
            }
            if iterations >= max_iterations {
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|vertex| vertex[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].clone();
            let along = |coefficient: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&worst)
                    .map(|(c, w)| c + coefficient * (c - w))
                    .collect()
            };

            let reflected = along(REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < values[0] {
                let expanded = along(EXPANSION);
                let expanded_value = eval(&expanded);
                if expanded_value < reflected_value {
                    simplex[n] = expanded;
                    values[n] = expanded_value;
                } else {
                    simplex[n] = reflected;
                    values[n] = reflected_value;
                }
                continue;
            }

            if reflected_value < values[n - 1] {
                simplex[n] = reflected;
                values[n] = reflected_value;
                continue;
            }

            // Outside contraction accepts ties, inside contraction must improve
            let (contracted, accepted) = if reflected_value < values[n] {
                let point = along(CONTRACTION);
                let value = eval(&point);
                (point, (value <= reflected_value).then_some(value))
            } else {
                let point = along(-CONTRACTION);
                let value = eval(&point);
                (point, (value < values[n]).then_some(value))
            };

            if let Some(contracted_value) = accepted {
                simplex[n] = contracted;
                values[n] = contracted_value;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=n {
                simplex[i] = best
                    .iter()
                    .zip(&simplex[i])
                    .map(|(b, x)| b + SHRINK * (x - b))
                    .collect();
                values[i] = eval(&simplex[i]);
            }
        }

        if !converged {
            warn!(
                iterations,
                value = values[0],
                "Nelder-Mead stopped at the iteration cap before converging"
            );
        }

        Minimum {
            point: simplex[0].clone(),
            value: values[0],
            iterations,
            converged,
        }
    }
}
