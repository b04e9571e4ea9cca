//! Drawing populations whose sum approaches a target.

use rand::Rng;
use rand_chacha::ChaChaRng;
use rand_distr::{Distribution, Poisson};
use tracing::{trace, warn};

use crate::piecewise::{PiecewisePdf, SamplingMethod};

impl PiecewisePdf {
    /// Draws objects from the stochastic range into `out` until their sum
    /// reaches the stochastic share of `target`, and returns that sum.
    ///
    /// Only `target · mass_fraction_restricted()` is sampled; the caller
    /// accounts for the rest as a continuum. How the final draw is treated
    /// depends on the [`SamplingMethod`].
    pub fn draw_population(&self, target: f64, rng: &mut ChaChaRng, out: &mut Vec<f64>) -> f64 {
        let mean = self.expectation_restricted();
        if !(target > 0.0) || !(mean > 0.0) {
            return 0.0;
        }
        let goal = target * self.mass_fraction_restricted();
        let start = out.len();

        let sum = match self.sampling_method() {
            SamplingMethod::Number => {
                let n = (goal / mean).round() as usize;
                self.draw_count(n, rng, out)
            }
            SamplingMethod::Poisson => {
                let n = poisson_count(goal / mean, rng);
                self.draw_count(n, rng, out)
            }
            SamplingMethod::SortedSampling => self.draw_sorted(goal, mean, rng, out),
            method => self.draw_until(goal, method, rng, out),
        };

        trace!(target, goal, drawn = out.len() - start, sum, "population drawn");
        sum
    }

    fn draw_count(&self, n: usize, rng: &mut ChaChaRng, out: &mut Vec<f64>) -> f64 {
        let mut sum = 0.0;
        for _ in 0..n {
            let x = self.draw_restricted(rng);
            sum += x;
            out.push(x);
        }
        sum
    }

    /// Sequential draws until the running sum passes `goal`, then decide
    /// whether the draw that crossed it stays.
    fn draw_until(
        &self,
        goal: f64,
        method: SamplingMethod,
        rng: &mut ChaChaRng,
        out: &mut Vec<f64>,
    ) -> f64 {
        let mut sum = 0.0;
        loop {
            let x = self.draw_restricted(rng);
            let after = sum + x;
            if after <= goal {
                sum = after;
                out.push(x);
                continue;
            }
            let keep = match method {
                SamplingMethod::StopBefore => false,
                SamplingMethod::StopAfter => true,
                SamplingMethod::Stop50 => rng.random_bool(0.5),
                _ => after - goal <= goal - sum,
            };
            if keep {
                out.push(x);
                sum = after;
            }
            return sum;
        }
    }

    /// Draw the expected count, top up until the sum reaches `goal`, sort,
    /// then drop the largest objects while doing so moves the sum closer.
    fn draw_sorted(&self, goal: f64, mean: f64, rng: &mut ChaChaRng, out: &mut Vec<f64>) -> f64 {
        let n = (goal / mean).round() as usize;
        let mut batch = Vec::with_capacity(n + 1);
        let mut sum = 0.0;
        for _ in 0..n {
            let x = self.draw_restricted(rng);
            sum += x;
            batch.push(x);
        }
        while sum < goal {
            let x = self.draw_restricted(rng);
            sum += x;
            batch.push(x);
        }

        batch.sort_by(f64::total_cmp);
        while let Some(&largest) = batch.last() {
            let without = sum - largest;
            if (without - goal).abs() < (sum - goal).abs() {
                batch.pop();
                sum = without;
            } else {
                break;
            }
        }
        out.extend(batch);
        sum
    }
}

fn poisson_count(lambda: f64, rng: &mut ChaChaRng) -> usize {
    if !(lambda > 0.0) {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => {
            let k: f64 = dist.sample(rng);
            k as usize
        }
        Err(err) => {
            warn!(lambda, %err, "poisson mean out of range; using rounded mean");
            lambda.round() as usize
        }
    }
}
