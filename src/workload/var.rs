use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inputs of one Monte Carlo Value-at-Risk run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_simulations: usize,
    pub num_days: usize,
    pub initial_price: f64,
    pub daily_volatility: f64,
    pub confidence_level: f64,
    /// Keep every daily price of every path in memory, the footprint of a
    /// vectorised implementation, instead of only the final prices
    pub materialize_paths: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_simulations: 1_000_000,
            num_days: 252,
            initial_price: 100.0,
            daily_volatility: 0.01,
            confidence_level: 0.95,
            materialize_paths: false,
        }
    }
}

/// Simulates `num_simulations` log-normal price paths and returns the loss at
/// `confidence_level` relative to the initial price.
///
/// By default paths are reduced to their final price as they are generated,
/// so memory stays linear in the number of simulations. With
/// `materialize_paths` the whole `simulations x days` price matrix is built
/// first. Both modes draw the same numbers and give the same result.
pub fn monte_carlo_var<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> f64 {
    if params.num_simulations == 0 {
        return 0.0;
    }

    let mut final_prices = if params.materialize_paths {
        materialized_final_prices(params, rng)
    } else {
        streamed_final_prices(params, rng)
    };
    final_prices.sort_unstable_by(f64::total_cmp);

    let tail = params.num_simulations as f64 * (1.0 - params.confidence_level);
    let index = (tail as usize).min(params.num_simulations - 1);
    params.initial_price - final_prices[index]
}

fn streamed_final_prices<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Vec<f64> {
    (0..params.num_simulations)
        .map(|_| {
            let log_return: f64 = (0..params.num_days)
                .map(|_| standard_normal(rng) * params.daily_volatility)
                .sum();
            params.initial_price * log_return.exp()
        })
        .collect()
}

fn materialized_final_prices<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Vec<f64> {
    let days = params.num_days;
    if days == 0 {
        return vec![params.initial_price; params.num_simulations];
    }

    // Row-major: one row of daily returns per path, turned into prices in place.
    let mut paths: Vec<f64> = (0..params.num_simulations * days)
        .map(|_| standard_normal(rng) * params.daily_volatility)
        .collect();
    for path in paths.chunks_exact_mut(days) {
        let mut log_return = 0.0;
        for day in path.iter_mut() {
            log_return += *day;
            *day = params.initial_price * f64::exp(log_return);
        }
    }

    paths.chunks_exact(days).map(|path| path[days - 1]).collect()
}

// Box-Muller transform; `1 - u` keeps the logarithm finite.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
