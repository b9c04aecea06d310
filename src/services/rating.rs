//! Rating service — Glicko-2 updates for finished games.
//!
//! DESIGN
//! ======
//! Ratings live on the public Glicko scale (1500-centred) everywhere outside
//! this module. `update` converts to the internal µ/φ scale, runs the
//! standard rating-period procedure, solving for the new volatility by
//! bisection, and converts back. A player with no results only gets their
//! deviation widened by their volatility.
//!
//! Guests are never rated; callers decide that before getting here.

use serde::{Deserialize, Serialize};

const SCALE: f64 = 173.7178;
const CENTER: f64 = 1500.0;
const CONVERGENCE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;

pub const DEFAULT_TAU: f64 = 0.06;

// =============================================================================
// TYPES
// =============================================================================

/// A player's Glicko-2 record on the public scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Default for RatingRecord {
    fn default() -> Self {
        Self { rating: 1500.0, deviation: 350.0, volatility: 0.06 }
    }
}

/// One game result from the player's point of view. `score` is 1 for a
/// win, 0.5 for a draw and 0 for a loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameResult {
    pub opponent: RatingRecord,
    pub score: f64,
}

/// Glicko-2 calculator parameterised by the system constant τ.
#[derive(Debug, Clone, Copy)]
pub struct RatingEngine {
    tau: f64,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TAU)
    }
}

// =============================================================================
// UPDATE
// =============================================================================

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (std::f64::consts::PI * std::f64::consts::PI)).sqrt()
}

fn expected(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

impl RatingEngine {
    #[must_use]
    pub fn new(tau: f64) -> Self {
        Self { tau }
    }

    #[must_use]
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// New record for `player` after one rating period with `results`.
    #[must_use]
    pub fn update(&self, player: RatingRecord, results: &[GameResult]) -> RatingRecord {
        let mu = (player.rating - CENTER) / SCALE;
        let phi = player.deviation / SCALE;
        let sigma = player.volatility;

        if results.is_empty() {
            let phi_star = (phi * phi + sigma * sigma).sqrt();
            return RatingRecord { deviation: phi_star * SCALE, ..player };
        }

        let mut v_inv = 0.0;
        let mut improvement = 0.0;
        for r in results {
            let mu_j = (r.opponent.rating - CENTER) / SCALE;
            let phi_j = r.opponent.deviation / SCALE;
            let g_j = g(phi_j);
            let e = expected(mu, mu_j, phi_j);
            v_inv += g_j * g_j * e * (1.0 - e);
            improvement += g_j * (r.score - e);
        }
        let v = 1.0 / v_inv;
        let delta = v * improvement;

        let sigma_new = self.new_volatility(phi, sigma, v, delta);
        let phi_star = (phi * phi + sigma_new * sigma_new).sqrt();
        let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_new = mu + phi_new * phi_new * improvement;

        RatingRecord { rating: mu_new * SCALE + CENTER, deviation: phi_new * SCALE, volatility: sigma_new }
    }

    /// Both sides of one game. `score_a` is side A's result.
    #[must_use]
    pub fn update_pair(&self, a: RatingRecord, b: RatingRecord, score_a: f64) -> (RatingRecord, RatingRecord) {
        let new_a = self.update(a, &[GameResult { opponent: b, score: score_a }]);
        let new_b = self.update(b, &[GameResult { opponent: a, score: 1.0 - score_a }]);
        (new_a, new_b)
    }

    /// Solve for the new volatility by bisection on `f(x)`, `x = ln σ'²`,
    /// until the bracket is narrower than `CONVERGENCE`.
    fn new_volatility(&self, phi: f64, sigma: f64, v: f64, delta: f64) -> f64 {
        let tau = self.tau;
        let a = (sigma * sigma).ln();
        let phi2 = phi * phi;
        let delta2 = delta * delta;
        let f = |x: f64| {
            let ex = x.exp();
            let denom = phi2 + v + ex;
            ex * (delta2 - phi2 - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
        };

        // f is decreasing; bracket the root between `a` and a point on the
        // other side of it.
        let other = if delta2 > phi2 + v {
            (delta2 - phi2 - v).ln()
        } else {
            let mut x = a - tau;
            for _ in 0..MAX_ITERATIONS {
                if f(x) >= 0.0 {
                    break;
                }
                x -= tau;
            }
            x
        };

        let (mut lo, mut hi) = if other < a { (other, a) } else { (a, other) };
        let mut f_lo = f(lo);
        let mut iterations = 0;
        while hi - lo > CONVERGENCE && iterations < MAX_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            let f_mid = f(mid);
            if (f_mid > 0.0) == (f_lo > 0.0) {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
            iterations += 1;
        }
        (((lo + hi) / 2.0) / 2.0).exp()
    }
}

#[cfg(test)]
#[path = "rating_test.rs"]
mod tests;
