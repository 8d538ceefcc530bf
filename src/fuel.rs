//! Fuel cost model.

use serde::{Deserialize, Serialize};

/// Currency units per liter used when no price is configured.
pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 1.5;

/// Fraction knocked off the shortest route's cost to price the eco route.
///
/// This is an approximation: the backend does not model eco-route
/// consumption, so the eco route is assumed to be a flat 15% cheaper.
pub const ECO_DISCOUNT: f64 = 0.15;

/// Converts distance and consumption into an estimated fuel cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelCostModel {
    pub price_per_liter: f64,
    /// Fraction in `[0, 1)`; see [`ECO_DISCOUNT`].
    pub eco_discount: f64,
}

impl Default for FuelCostModel {
    fn default() -> Self {
        Self {
            price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
            eco_discount: ECO_DISCOUNT,
        }
    }
}

impl FuelCostModel {
    /// Liters burnt over `distance_m` at `liters_per_100km`.
    pub fn liters(&self, distance_m: f64, liters_per_100km: f64) -> f64 {
        liters_per_100km * (distance_m / 1000.0) / 100.0
    }

    pub fn cost(&self, distance_m: f64, liters_per_100km: f64) -> f64 {
        self.liters(distance_m, liters_per_100km) * self.price_per_liter
    }

    /// Cost of the eco route derived from the shortest route's cost.
    pub fn eco_cost(&self, shortest_cost: f64) -> f64 {
        shortest_cost * (1.0 - self.eco_discount)
    }
}
