//! The flat parameter mapping shared by the calibrator and the population.
//!
//! Parameters are plain string keys mapped to `f64`. Per-sector keys carry
//! the sector number as a suffix (`N_E1`, `phi2`). The calibrator reads its
//! inputs from the mapping and writes solved aggregates back into it under
//! the same naming scheme (`y1`, `W_F1`, `D_B`, `M_H`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised when reading the parameter mapping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// A required key is absent.
    #[error("missing parameter: {key}")]
    Missing {
        /// The absent key.
        key: String,
    },

    /// A value is NaN or infinite.
    #[error("parameter {key} is not finite: {value}")]
    NonFinite {
        /// The offending key.
        key: String,
        /// The stored value.
        value: f64,
    },

    /// A population count is negative, fractional or too large.
    #[error("parameter {key} is not a valid count: {value}")]
    NotACount {
        /// The offending key.
        key: String,
        /// The stored value.
        value: f64,
    },
}

/// Build the key of a per-sector parameter, e.g. `sector_key("N_E", 1)`.
pub fn sector_key(name: &str, sector: u32) -> String {
    format!("{name}{sector}")
}

/// Flat mapping from parameter names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, f64>);

impl ParamMap {
    /// Create an empty mapping.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The reference two-sector economy.
    ///
    /// Sector 1 is formal (banked, taxed, credit-eligible); sector 2 is
    /// informal and cash-only.
    pub fn baseline() -> Self {
        let entries: [(&str, f64); 41] = [
            // Structure
            ("g", 0.05),
            ("N", 2.0),
            ("N_E1", 10.0),
            ("N_W1", 90.0),
            ("phi1", 1.0),
            ("w1", 1.0),
            ("formal1", 1.0),
            ("N_E2", 20.0),
            ("N_W2", 30.0),
            ("phi2", 0.6),
            ("w2", 0.5),
            ("formal2", 0.0),
            ("N_B", 2.0),
            ("N_WG", 30.0),
            ("N_U", 10.0),
            // Prices and policy
            ("m", 0.2),
            ("tau", 0.1),
            ("rho", 0.95),
            ("w_G", 1.0),
            ("w_min", 0.4),
            ("kappa_Z", 0.5),
            // Interest rates
            ("r_D", 0.01),
            ("r_L", 0.04),
            ("r_B", 0.02),
            ("r_A", 0.015),
            // Allocation ratios
            ("theta_W", 0.5),
            ("theta_y", 0.1),
            ("theta_D", 1.0),
            ("theta_E", 0.1),
            ("kappa_E", 0.5),
            ("kappa_R", 0.1),
            // Behavior
            ("delta", 0.1),
            ("upsilon_F", 0.05),
            ("upsilon_H", 2.0),
            ("beta_L", 0.5),
            ("gamma_L", 0.5),
            ("alpha_Y", 0.9),
            ("alpha_W", 0.05),
            ("theta_M", 0.2),
            ("chi_W", 5.0),
            ("chi_Y", 5.0),
        ];
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        )
    }

    /// Read a value if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Read a required finite value.
    pub fn value(&self, key: &str) -> Result<f64, ParamError> {
        let value = self.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_owned(),
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ParamError::NonFinite {
                key: key.to_owned(),
                value,
            })
        }
    }

    /// Read a policy rate or ratio. An absent key reads as zero (no tax,
    /// no interest, no buffer).
    pub fn policy(&self, key: &str) -> Result<f64, ParamError> {
        if self.0.contains_key(key) {
            self.value(key)
        } else {
            Ok(0.0)
        }
    }

    /// Read a value, falling back to `default` when absent.
    pub fn value_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Read a required per-sector value.
    pub fn sector_value(&self, name: &str, sector: u32) -> Result<f64, ParamError> {
        self.value(&sector_key(name, sector))
    }

    /// Read a non-negative integral count.
    pub fn count(&self, key: &str) -> Result<u32, ParamError> {
        let value = self.value(key)?;
        if value < 0.0 || value.fract().abs() > 0.0 || value > f64::from(u32::MAX) {
            return Err(ParamError::NotACount {
                key: key.to_owned(),
                value,
            });
        }
        // Range and integrality were checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value as u32)
    }

    /// Read a count, treating an absent key as zero.
    pub fn count_or_zero(&self, key: &str) -> Result<u32, ParamError> {
        if self.0.contains_key(key) {
            self.count(key)
        } else {
            Ok(0)
        }
    }

    /// Read a per-sector count.
    pub fn sector_count(&self, name: &str, sector: u32) -> Result<u32, ParamError> {
        self.count(&sector_key(name, sector))
    }

    /// Number of production sectors (`N`, zero when absent).
    pub fn sectors(&self) -> Result<u32, ParamError> {
        self.count_or_zero("N")
    }

    /// Whether a sector is formal. Unless configured, sector 1 is formal
    /// when the economy has banks and every other sector is informal.
    pub fn is_formal(&self, sector: u32) -> bool {
        let banked = self.value_or("N_B", 0.0) > 0.0;
        let default = if sector == 1 && banked { 1.0 } else { 0.0 };
        self.value_or(&sector_key("formal", sector), default) > 0.5
    }

    /// Insert or overwrite a value.
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Overwrite this mapping's entries with every entry of `other`.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), *value);
        }
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl core::fmt::Display for ParamMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn baseline_has_two_sectors() {
        let params = ParamMap::baseline();
        assert_eq!(params.sectors().unwrap(), 2);
        assert!(params.is_formal(1));
        assert!(!params.is_formal(2));
        assert_eq!(params.sector_count("N_E", 1).unwrap(), 10);
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = ParamMap::new().value("tau").unwrap_err();
        assert_eq!(
            err,
            ParamError::Missing {
                key: "tau".to_owned()
            }
        );
        assert_eq!(err.to_string(), "missing parameter: tau");
    }

    #[test]
    fn counts_must_be_whole_and_non_negative() {
        let mut params = ParamMap::new();
        params.set("N_U", 2.5);
        params.set("N_B", -1.0);
        params.set("N_WG", 4.0);
        assert!(matches!(params.count("N_U"), Err(ParamError::NotACount { .. })));
        assert!(matches!(params.count("N_B"), Err(ParamError::NotACount { .. })));
        assert_eq!(params.count("N_WG").unwrap(), 4);
        assert_eq!(params.count_or_zero("N_E9").unwrap(), 0);
    }

    #[test]
    fn absent_policy_reads_as_zero() {
        let mut params = ParamMap::new();
        assert_eq!(params.policy("tau"), Ok(0.0));
        params.set("r_L", f64::NAN);
        assert!(matches!(params.policy("r_L"), Err(ParamError::NonFinite { .. })));
    }

    #[test]
    fn unbanked_economy_defaults_to_informal() {
        let mut params = ParamMap::new();
        assert!(!params.is_formal(1));
        params.set("N_B", 1.0);
        assert!(params.is_formal(1));
        assert!(!params.is_formal(2));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut params = ParamMap::new();
        params.set("m", f64::INFINITY);
        assert!(matches!(params.value("m"), Err(ParamError::NonFinite { .. })));
    }

    #[test]
    fn merge_overrides_existing_entries() {
        let mut params = ParamMap::baseline();
        let mut overrides = ParamMap::new();
        overrides.set("tau", 0.3);
        overrides.set("extra", 1.0);
        params.merge(&overrides);
        assert!((params.value("tau").unwrap() - 0.3).abs() < 1e-12);
        assert!(params.get("extra").is_some());
    }

    #[test]
    fn serializes_as_a_flat_object() {
        let mut params = ParamMap::new();
        params.set("g", 0.05);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"g":0.05}"#);
        let back: ParamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
