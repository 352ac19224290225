//! ARIMA models for time series forecasting
//!
//! Parameters are estimated by conditional sum of squares (CSS). The AR and MA
//! coefficients are searched in an unconstrained space and mapped through the
//! partial-autocorrelation transform, so every candidate the optimiser visits
//! is stationary (AR) and invertible (MA).
//!
//! ```
//! use sales_forecast::models::arima::Arima;
//!
//! let data: Vec<f64> = (1..=40).map(|x| x as f64 + (x as f64 * 0.7).sin()).collect();
//! let model = Arima::new(1, 1, 1).unwrap();
//! let trained = model.fit(&data).unwrap();
//! let forecast = trained.forecast_values(5).unwrap();
//! assert_eq!(forecast.len(), 5);
//! ```

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::optimize::NelderMead;
use crate::utils::{difference, difference_tails, integrate};
use statrs::distribution::{Continuous, Normal};
use tracing::debug;

const MAX_ARMA_ORDER: usize = 10;
const MAX_DIFFERENCING: usize = 2;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    /// Name of the model
    name: String,
    /// Differencing order (d)
    d: usize,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Mean removed before fitting; zero when the series is differenced
    constant: f64,
    /// Observations the model was fitted on
    observations: Vec<f64>,
    /// Differenced, centred series
    differenced: Vec<f64>,
    /// Last value of each differencing level, used to integrate forecasts
    tails: Vec<f64>,
    /// CSS residuals on the differenced scale
    residuals: Vec<f64>,
    /// Residual variance
    sigma2: f64,
    /// Whether the optimiser met its tolerances
    converged: bool,
}

impl Arima {
    /// Create a new ARIMA model
    ///
    /// # Arguments
    ///
    /// * `p` - Order of autoregressive component (0-10)
    /// * `d` - Degree of differencing (0-2)
    /// * `q` - Order of moving average component (0-10)
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > MAX_ARMA_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "AR order must be <= {}, got {}",
                MAX_ARMA_ORDER, p
            )));
        }
        if d > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidParameter(format!(
                "Differencing order must be <= {}, got {}",
                MAX_DIFFERENCING, d
            )));
        }
        if q > MAX_ARMA_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "MA order must be <= {}, got {}",
                MAX_ARMA_ORDER, q
            )));
        }

        Ok(Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        })
    }

    /// Model order as `(p, d, q)`
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Fit the model to a plain series of observations
    pub fn fit(&self, data: &[f64]) -> Result<TrainedArima> {
        if data.is_empty() {
            return Err(ForecastError::DataError(
                "Empty time series data".to_string(),
            ));
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::DataError(
                "Data contains NaN or infinite values".to_string(),
            ));
        }
        if data.len() <= self.d {
            return Err(ForecastError::ModelError(format!(
                "Insufficient data for {}: need at least {} observations, got {}",
                self.name,
                self.d + 1,
                data.len()
            )));
        }

        let tails = difference_tails(data, self.d);
        let mut differenced = difference(data, self.d);

        let constant = if self.d == 0 {
            differenced.iter().sum::<f64>() / differenced.len() as f64
        } else {
            0.0
        };
        for value in differenced.iter_mut() {
            *value -= constant;
        }

        let start: Vec<f64> = unconstrain_stationary(&yule_walker(&differenced, self.p))
            .into_iter()
            .chain(std::iter::repeat(0.0).take(self.q))
            .collect();

        let p = self.p;
        let objective = |params: &[f64]| {
            let (ar, ma) = split_params(params, p);
            sum_of_squares(&css_residuals(&differenced, &ar, &ma), p)
        };
        let minimum = NelderMead::new()
            .with_max_iterations(500 * (self.p + self.q).max(1))
            .minimize(objective, &start);

        let (ar_coefficients, ma_coefficients) = split_params(&minimum.point, self.p);
        let residuals = css_residuals(&differenced, &ar_coefficients, &ma_coefficients);
        let css = sum_of_squares(&residuals, self.p);
        if !css.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "{} fit did not produce a finite sum of squares",
                self.name
            )));
        }

        let effective = differenced.len().saturating_sub(self.p);
        let sigma2 = if effective > 0 {
            css / effective as f64
        } else {
            0.0
        };

        debug!(
            model = %self.name,
            observations = data.len(),
            ar = ?ar_coefficients,
            ma = ?ma_coefficients,
            sigma2,
            iterations = minimum.iterations,
            converged = minimum.converged,
            "Fitted ARIMA model"
        );

        Ok(TrainedArima {
            name: self.name.clone(),
            d: self.d,
            ar_coefficients,
            ma_coefficients,
            constant,
            observations: data.to_vec(),
            differenced,
            tails,
            residuals,
            sigma2,
            converged: minimum.converged,
        })
    }
}

impl ForecastModel for Arima {
    type Trained = TrainedArima;

    fn train(&self, data: &DailySeries) -> Result<TrainedArima> {
        self.fit(data.values())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArima {
    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Constant removed before fitting (zero for differenced models)
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Residual variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Residuals after the conditioning window
    pub fn residuals(&self) -> &[f64] {
        let start = self.ar_coefficients.len().min(self.residuals.len());
        &self.residuals[start..]
    }

    /// Whether the optimiser met its tolerances
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Gaussian log-likelihood of the CSS residuals, when the variance is positive
    pub fn log_likelihood(&self) -> Option<f64> {
        let residuals = self.residuals();
        if residuals.is_empty() || self.sigma2 <= 0.0 {
            return None;
        }
        let normal = Normal::new(0.0, self.sigma2.sqrt()).ok()?;
        Some(residuals.iter().map(|e| normal.ln_pdf(*e)).sum())
    }

    /// Akaike information criterion
    pub fn aic(&self) -> Option<f64> {
        let parameters = self.ar_coefficients.len()
            + self.ma_coefficients.len()
            + 1
            + usize::from(self.d == 0);
        self.log_likelihood()
            .map(|ll| 2.0 * parameters as f64 - 2.0 * ll)
    }

    /// Point forecasts for the next `horizon` periods
    pub fn forecast_values(&self, horizon: usize) -> Result<Vec<f64>> {
        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut prediction = 0.0;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if t > i {
                    prediction += phi * extended[t - 1 - i];
                }
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                if t > j {
                    prediction += theta * shocks[t - 1 - j];
                }
            }
            extended.push(prediction);
            shocks.push(0.0);
        }

        let differenced: Vec<f64> = extended[n..].iter().map(|v| v + self.constant).collect();
        let values = integrate(&differenced, &self.tails);

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelError(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        Ok(values)
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        ForecastResult::new(self.forecast_values(horizon)?, horizon)
    }

    /// In-sample one-step predictions aligned with the observations after the
    /// first `d`. Differencing is linear, so the one-step error on the observed
    /// scale equals the CSS residual.
    fn fitted_values(&self) -> Vec<f64> {
        self.observations[self.d..]
            .iter()
            .zip(self.residuals.iter())
            .map(|(y, e)| y - e)
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Map unconstrained optimiser coordinates to AR and MA coefficients
fn split_params(params: &[f64], p: usize) -> (Vec<f64>, Vec<f64>) {
    let ar = constrain_stationary(&params[..p]);
    let ma = constrain_stationary(&params[p..])
        .into_iter()
        .map(|v| -v)
        .collect();
    (ar, ma)
}

/// Conditional residuals `e_t = w_t - sum(phi_i w_{t-i}) - sum(theta_j e_{t-j})`.
///
/// The first `p` residuals are the conditioning window and stay zero.
fn css_residuals(series: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; series.len()];

    for t in p..series.len() {
        let mut prediction = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * series[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                prediction += theta * residuals[t - 1 - j];
            }
        }
        residuals[t] = series[t] - prediction;
    }

    residuals
}

fn sum_of_squares(residuals: &[f64], skip: usize) -> f64 {
    residuals.iter().skip(skip).map(|e| e * e).sum()
}

/// Yule-Walker AR estimates via Levinson-Durbin, reflection coefficients clamped
/// inside the unit interval
fn yule_walker(series: &[f64], p: usize) -> Vec<f64> {
    let mut phi = vec![0.0; p];
    let n = series.len();
    if p == 0 || n < 2 {
        return phi;
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let autocovariance: Vec<f64> = (0..=p)
        .map(|lag| {
            if lag >= n {
                return 0.0;
            }
            (lag..n)
                .map(|t| (series[t] - mean) * (series[t - lag] - mean))
                .sum::<f64>()
                / n as f64
        })
        .collect();

    if autocovariance[0] <= 1e-12 {
        return phi;
    }

    let mut error = autocovariance[0];
    for k in 0..p {
        let mut accumulator = autocovariance[k + 1];
        for j in 0..k {
            accumulator -= phi[j] * autocovariance[k - j];
        }
        let reflection = (accumulator / error).clamp(-0.99, 0.99);

        let previous = phi.clone();
        phi[k] = reflection;
        for j in 0..k {
            phi[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        error *= 1.0 - reflection * reflection;
    }

    phi
}

/// Map unconstrained values to the coefficients of a stationary AR polynomial
/// (Monahan 1984, Jones 1980)
fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let n = unconstrained.len();
    if n == 0 {
        return Vec::new();
    }

    let partial: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();

    let mut y = vec![vec![0.0; n]; n];
    for k in 0..n {
        for i in 0..k {
            y[k][i] = y[k - 1][i] + partial[k] * y[k - 1][k - i - 1];
        }
        y[k][k] = partial[k];
    }

    y[n - 1].iter().map(|v| -v).collect()
}

/// Inverse of [`constrain_stationary`]
fn unconstrain_stationary(constrained: &[f64]) -> Vec<f64> {
    let n = constrained.len();
    if n == 0 {
        return Vec::new();
    }

    let mut y = vec![vec![0.0; n]; n];
    y[n - 1] = constrained.iter().map(|v| -v).collect();
    for k in (1..n).rev() {
        let pivot = y[k][k];
        for i in 0..k {
            y[k - 1][i] = (y[k][i] - pivot * y[k][k - i - 1]) / (1.0 - pivot * pivot);
        }
    }

    (0..n)
        .map(|k| {
            let r = y[k][k].clamp(-0.99, 0.99);
            r / (1.0 - r * r).sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_constrain_round_trip() {
        let unconstrained = vec![0.4, -1.3, 0.2];
        let constrained = constrain_stationary(&unconstrained);
        let restored = unconstrain_stationary(&constrained);

        for (a, b) in unconstrained.iter().zip(restored.iter()) {
            assert_approx_eq!(a, b, 1e-9);
        }
    }

    #[test]
    fn test_constrained_ar1_inside_unit_interval() {
        for x in [-50.0, -1.0, 0.0, 2.5, 80.0] {
            let phi = constrain_stationary(&[x]);
            assert!(phi[0].abs() < 1.0);
        }
    }

    #[test]
    fn test_css_residuals_ar1() {
        let series = vec![1.0, 0.5, 0.25, 0.125];
        let residuals = css_residuals(&series, &[0.5], &[]);

        assert_eq!(residuals[0], 0.0);
        for e in &residuals[1..] {
            assert_approx_eq!(*e, 0.0, 1e-12);
        }
    }

    #[test]
    fn test_css_residuals_ma1_recursion() {
        let series = vec![1.0, 2.0, 3.0];
        let residuals = css_residuals(&series, &[], &[0.5]);

        assert_approx_eq!(residuals[0], 1.0);
        assert_approx_eq!(residuals[1], 1.5);
        assert_approx_eq!(residuals[2], 2.25);
    }

    #[test]
    fn test_yule_walker_recovers_ar1() {
        let mut series = vec![0.0; 400];
        let shocks = [1.0, -0.5, 0.3, -1.2, 0.8, 0.1, -0.7, 0.4];
        for t in 1..series.len() {
            series[t] = 0.6 * series[t - 1] + shocks[t % shocks.len()];
        }

        let phi = yule_walker(&series, 1);
        assert!(phi[0] > 0.3 && phi[0] < 0.9);
    }
}
