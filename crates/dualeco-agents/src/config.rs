//! Behavioral and policy parameters shared by every agent.
//!
//! The [`BehaviorConfig`] struct bundles the tunables agents read while a
//! run is in progress. It is built once from the parameter mapping at
//! population creation and never changes afterwards.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Behavioral elasticities, allocation ratios and policy rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Adaptive expectations speed for sales and reservation wages (default: 0.1).
    pub delta: f64,
    /// Wage increase intensity for firms with unfilled vacancies (default: 0.05).
    pub upsilon_f: f64,
    /// Sensitivity of reservation-wage revisions to the vacancy rate (default: 2.0).
    pub upsilon_h: f64,
    /// Loan rate markup per unit of leverage (default: 0.5).
    pub beta_l: f64,
    /// Decay of the loan acceptance probability in leverage (default: 0.5).
    pub gamma_l: f64,
    /// Propensity to consume out of disposable income (default: 0.9).
    pub alpha_y: f64,
    /// Propensity to consume out of liquid wealth (default: 0.05).
    pub alpha_w: f64,
    /// Share of liquid wealth households keep as cash (default: 0.2).
    pub theta_m: f64,
    /// Deposits formal firms keep as a share of their wage bill (default: 0.5).
    pub theta_w: f64,
    /// Inventory target as a share of expected sales (default: 0.1).
    pub theta_y: f64,
    /// Maximum new lending per step as a multiple of bank equity (default: 0.5).
    pub kappa_e: f64,
    /// Reserve requirement over deposits (default: 0.1).
    pub kappa_r: f64,
    /// Employers sampled per job search (default: 5).
    pub chi_w: u32,
    /// Suppliers sampled per goods market visit (default: 5).
    pub chi_y: u32,
    /// Tax rate on profits and household income (default: 0.1).
    pub tau: f64,
    /// Dividend payout ratio (default: 0.95).
    pub rho: f64,
    /// Price markup over unit labor cost (default: 0.2).
    pub markup: f64,
    /// Deposit rate (default: 0.01).
    pub r_d: f64,
    /// Base loan rate (default: 0.04).
    pub r_l: f64,
    /// Bond rate (default: 0.02).
    pub r_b: f64,
    /// Advance rate (default: 0.015).
    pub r_a: f64,
    /// Minimum wage, the floor of reservation wages (default: 0.4).
    pub w_min: f64,
    /// Dole as a share of the minimum wage (default: 0.5).
    pub kappa_z: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            upsilon_f: 0.05,
            upsilon_h: 2.0,
            beta_l: 0.5,
            gamma_l: 0.5,
            alpha_y: 0.9,
            alpha_w: 0.05,
            theta_m: 0.2,
            theta_w: 0.5,
            theta_y: 0.1,
            kappa_e: 0.5,
            kappa_r: 0.1,
            chi_w: 5,
            chi_y: 5,
            tau: 0.1,
            rho: 0.95,
            markup: 0.2,
            r_d: 0.01,
            r_l: 0.04,
            r_b: 0.02,
            r_a: 0.015,
            w_min: 0.4,
            kappa_z: 0.5,
        }
    }
}

impl BehaviorConfig {
    /// Dole paid to each unemployed household per step.
    pub fn dole(&self) -> f64 {
        self.kappa_z * self.w_min
    }

    /// Check that every rate and ratio is finite and in range.
    ///
    /// Shares and probabilities must lie in `[0, 1]`; intensities and
    /// rates must be non-negative.
    pub fn validate(&self) -> Result<(), AgentError> {
        let unit = [
            ("delta", self.delta),
            ("alpha_Y", self.alpha_y),
            ("alpha_W", self.alpha_w),
            ("theta_M", self.theta_m),
            ("tau", self.tau),
            ("rho", self.rho),
            ("kappa_R", self.kappa_r),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::InvalidParameter { name, value });
            }
        }
        let non_negative = [
            ("upsilon_F", self.upsilon_f),
            ("upsilon_H", self.upsilon_h),
            ("beta_L", self.beta_l),
            ("gamma_L", self.gamma_l),
            ("theta_W", self.theta_w),
            ("theta_y", self.theta_y),
            ("kappa_E", self.kappa_e),
            ("m", self.markup),
            ("r_D", self.r_d),
            ("r_L", self.r_l),
            ("r_B", self.r_b),
            ("r_A", self.r_a),
            ("w_min", self.w_min),
            ("kappa_Z", self.kappa_z),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AgentError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BehaviorConfig::default().validate().is_ok());
    }

    #[test]
    fn dole_is_share_of_minimum_wage() {
        let config = BehaviorConfig::default();
        assert!((config.dole() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let config = BehaviorConfig {
            alpha_y: 1.5,
            ..BehaviorConfig::default()
        };
        let err = config.validate().err();
        assert!(matches!(
            err,
            Some(AgentError::InvalidParameter { name: "alpha_Y", .. })
        ));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let config = BehaviorConfig {
            r_l: -0.01,
            ..BehaviorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
