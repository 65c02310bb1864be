use crate::error::{Result, SimError};
use crate::types::Format;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Logistic divisor of the rating scale: a 400 point gap is 10:1 odds
pub const RATING_SCALE: f64 = 400.0;

/// Probability that A wins a single map against B
///
/// P(A) = 1 / (1 + 10^((R_B - R_A) / 400))
pub fn map_win_probability(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / RATING_SCALE))
}

/// Probability of taking a best-of-N series given map win probability `p`:
/// P(Binomial(N, p) >= N/2 + 1)
pub fn series_win_probability(p: f64, format: Format) -> f64 {
    let n = format.games();
    let q = 1.0 - p;
    (format.wins_needed()..=n)
        .map(|k| binomial(n, k) as f64 * p.powi(k as i32) * q.powi((n - k) as i32))
        .sum()
}

fn binomial(n: u32, k: u32) -> u64 {
    let k = k.min(n - k) as u64;
    let n = n as u64;
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Which side of a pairing took the series
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Stateless series resolver shared by all trials
#[derive(Clone, Debug)]
pub struct MatchModel {
    format: Format,
    /// Per-match rating noise; absent when sigma is 0
    noise: Option<Normal<f64>>,
}

impl MatchModel {
    pub fn new(format: Format, sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SimError::invalid(format!(
                "rating sigma must be a finite non-negative number, got {}",
                sigma
            )));
        }
        let noise = if sigma > 0.0 {
            Some(Normal::new(0.0, sigma).map_err(|e| SimError::invalid(e.to_string()))?)
        } else {
            None
        };
        Ok(Self { format, noise })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Series win probability for A, with fresh rating noise drawn for both
    /// sides when sigma > 0
    pub fn series_probability<R: Rng + ?Sized>(
        &self,
        rating_a: f64,
        rating_b: f64,
        rng: &mut R,
    ) -> f64 {
        let (rating_a, rating_b) = match &self.noise {
            Some(noise) => (rating_a + noise.sample(rng), rating_b + noise.sample(rng)),
            None => (rating_a, rating_b),
        };
        series_win_probability(map_win_probability(rating_a, rating_b), self.format)
    }

    /// Decide a series with a single uniform draw against the series
    /// probability
    pub fn resolve<R: Rng + ?Sized>(&self, rating_a: f64, rating_b: f64, rng: &mut R) -> Side {
        let p = self.series_probability(rating_a, rating_b, rng);
        if rng.gen::<f64>() < p {
            Side::A
        } else {
            Side::B
        }
    }
}
