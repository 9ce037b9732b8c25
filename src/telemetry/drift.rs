// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature drift between telemetry ticks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{PowerStatus, Temperature};

/// Source of the random direction used while the device is off.
///
/// Injected so tests can control the drift direction.
pub trait Coin {
    /// Returns `true` for an upward step, `false` for a downward one.
    fn flip(&mut self) -> bool;
}

impl<C: Coin + ?Sized> Coin for &mut C {
    fn flip(&mut self) -> bool {
        (**self).flip()
    }
}

/// Fair coin backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomCoin(StdRng);

impl RandomCoin {
    /// Creates a coin seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates a reproducible coin.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomCoin {
    fn default() -> Self {
        Self::new()
    }
}

impl Coin for RandomCoin {
    fn flip(&mut self) -> bool {
        self.0.random_bool(0.5)
    }
}

/// Computes the next simulated reading.
///
/// - `OFF`: one step up or down, direction from `coin`
/// - `AC`: one step down
/// - `HEAT`: one step up
///
/// The result is rounded to two decimals.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::telemetry::{RandomCoin, drift};
/// use smartproduct_sim::types::{PowerStatus, Temperature};
///
/// let actual = Temperature::new(71.5).unwrap();
/// let next = drift(PowerStatus::Heat, actual, 0.5, &mut RandomCoin::seeded(1));
/// assert_eq!(next.value(), 72.0);
/// ```
pub fn drift<C: Coin + ?Sized>(
    status: PowerStatus,
    actual: Temperature,
    step: f64,
    coin: &mut C,
) -> Temperature {
    match status {
        PowerStatus::Off => {
            if coin.flip() {
                actual.offset(step)
            } else {
                actual.offset(-step)
            }
        }
        PowerStatus::Ac => actual.offset(-step),
        PowerStatus::Heat => actual.offset(step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCoin(bool);

    impl Coin for FixedCoin {
        fn flip(&mut self) -> bool {
            self.0
        }
    }

    fn temp(v: f64) -> Temperature {
        Temperature::new(v).unwrap()
    }

    #[test]
    fn ac_cools_by_exactly_one_step() {
        let mut coin = FixedCoin(true);
        let mut t = temp(71.5);
        for _ in 0..20 {
            let next = drift(PowerStatus::Ac, t, 0.5, &mut coin);
            assert!(next < t);
            assert!((t.value() - next.value() - 0.5).abs() < 1e-9);
            t = next;
        }
        assert_eq!(t, temp(61.5));
    }

    #[test]
    fn heat_warms_by_exactly_one_step() {
        let mut coin = FixedCoin(false);
        let mut t = temp(71.5);
        for _ in 0..20 {
            let next = drift(PowerStatus::Heat, t, 0.3, &mut coin);
            assert!(next > t);
            assert!((next.value() - t.value() - 0.3).abs() < 1e-9);
            t = next;
        }
        assert_eq!(t, temp(77.5));
    }

    #[test]
    fn off_follows_coin() {
        let t = temp(71.5);
        assert_eq!(drift(PowerStatus::Off, t, 0.5, &mut FixedCoin(true)), temp(72.0));
        assert_eq!(drift(PowerStatus::Off, t, 0.5, &mut FixedCoin(false)), temp(71.0));
    }

    #[test]
    fn off_moves_both_ways_with_fixed_magnitude() {
        let mut coin = RandomCoin::seeded(42);
        let t = temp(71.5);
        let (mut up, mut down) = (0, 0);

        for _ in 0..200 {
            let next = drift(PowerStatus::Off, t, 0.5, &mut coin);
            assert!(((next.value() - t.value()).abs() - 0.5).abs() < 1e-9);
            if next > t {
                up += 1;
            } else {
                down += 1;
            }
        }

        assert!(up > 0, "never drifted up");
        assert!(down > 0, "never drifted down");
    }

    #[test]
    fn drift_rounds_result() {
        let t = temp(71.01);
        assert_eq!(drift(PowerStatus::Heat, t, 0.333, &mut FixedCoin(true)), temp(71.34));
    }
}
