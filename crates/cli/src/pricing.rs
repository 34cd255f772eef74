// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-cost estimate printed after a successful `stop` (§2 of
//! `SPEC_FULL.md`): a rough monthly EBS gp3 cost so a user who stops
//! instead of destroys knows what they're still paying for.

/// Source of a region's monthly per-GB storage rate. A trait rather than
/// a bare function so a future provider (or a live pricing API call)
/// can replace the static table without touching call sites.
pub trait PricingProvider {
    /// Dollars per GB-month of gp3 storage in `region`, or `None` if the
    /// region isn't in the table.
    fn gb_month_rate(&self, region: &str) -> Option<f64>;

    /// Estimated monthly cost of `volume_gb` of storage in `region`.
    /// Unknown regions estimate to `0.0` rather than erroring — this is
    /// a courtesy figure, not a billing-accurate one.
    fn estimate_monthly_cost(&self, region: &str, volume_gb: u32) -> f64 {
        self.gb_month_rate(region).unwrap_or(0.0) * f64::from(volume_gb)
    }
}

/// Built-in table of approximate EBS gp3 rates, USD per GB-month.
pub struct StaticPricingTable;

impl PricingProvider for StaticPricingTable {
    fn gb_month_rate(&self, region: &str) -> Option<f64> {
        let rate = match region {
            "us-east-1" | "us-east-2" => 0.08,
            "us-west-1" | "us-west-2" => 0.08,
            "eu-west-1" | "eu-central-1" => 0.088,
            "ap-southeast-1" | "ap-southeast-2" => 0.096,
            "ap-northeast-1" => 0.096,
            _ => return None,
        };
        Some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_region_scales_by_volume_size() {
        let table = StaticPricingTable;
        let cost = table.estimate_monthly_cost("us-east-1", 100);
        assert!((cost - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_region_estimates_to_zero() {
        let table = StaticPricingTable;
        assert_eq!(table.estimate_monthly_cost("mars-1", 100), 0.0);
    }
}
