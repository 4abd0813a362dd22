//! Tunable tolerances for the solver.

use serde::{Deserialize, Serialize};

/// Options controlling inversion and post-solve diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative LU pivot magnitude below which `Kcc` is treated as singular.
    ///
    /// Pivots are measured on `Kcc` scaled to a unit diagonal, so the threshold
    /// is insensitive to the absolute stiffness of individual members.
    pub singularity_tolerance: f64,
    /// Compare nodal resultant forces with the force vector after every solve.
    pub check_statics: bool,
    /// Largest tolerated statics discrepancy before a warning is logged.
    pub statics_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singularity_tolerance: 1.0e-12,
            check_statics: true,
            statics_tolerance: 1.0e-6,
        }
    }
}

impl SolverConfig {
    /// Set the relative pivot tolerance used when inverting `Kcc`.
    #[must_use]
    pub fn with_singularity_tolerance(mut self, tol: f64) -> Self {
        self.singularity_tolerance = tol;
        self
    }

    /// Enable or disable the post-solve statics check.
    #[must_use]
    pub fn with_statics_check(mut self, enabled: bool) -> Self {
        self.check_statics = enabled;
        self
    }

    /// Set the tolerance of the post-solve statics check.
    #[must_use]
    pub fn with_statics_tolerance(mut self, tol: f64) -> Self {
        self.statics_tolerance = tol;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{ "statics_tolerance": 0.5 }"#).expect("valid config");
        assert_eq!(config.statics_tolerance, 0.5);
        assert_eq!(
            config.singularity_tolerance,
            SolverConfig::default().singularity_tolerance
        );
        assert!(config.check_statics);
    }

    #[test]
    fn builders_override_fields() {
        let config = SolverConfig::default()
            .with_singularity_tolerance(1.0e-8)
            .with_statics_check(false)
            .with_statics_tolerance(1.0e-3);
        assert_eq!(config.singularity_tolerance, 1.0e-8);
        assert!(!config.check_statics);
        assert_eq!(config.statics_tolerance, 1.0e-3);
    }
}
