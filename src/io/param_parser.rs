use std::fs;

use serde::Deserialize;

use crate::error::SolverError;

fn default_cfl() -> f64 {
    0.5
}
fn default_print_rate() -> usize {
    10
}
fn default_check_convergence() -> bool {
    true
}
fn default_rkorder() -> usize {
    1
}
fn default_maxiter() -> usize {
    100
}
fn default_scheme() -> String {
    "LDA".to_string()
}
fn default_physics() -> String {
    "LinearAdv2D".to_string()
}

/// User-facing solver options, read from a JSON file.
#[derive(Deserialize, Debug, Clone)]
pub struct SolverConfig {
    #[serde(default = "default_cfl")]
    pub cfl: f64,
    /// 0 disables the per-iteration summary line
    #[serde(default = "default_print_rate")]
    pub print_rate: usize,
    #[serde(default = "default_check_convergence")]
    pub check_convergence: bool,
    #[serde(default = "default_rkorder")]
    pub rkorder: usize,
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,
    #[serde(default)]
    pub residual_tolerance: Option<f64>,
    /// unsteady runs only
    #[serde(default)]
    pub time_limit: Option<f64>,
    #[serde(default)]
    pub dt: Option<f64>,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_physics")]
    pub physics: String,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        serde_json::from_str("{}").expect("defaults deserialize")
    }
}

impl SolverConfig {
    pub fn parse(file_path: &str) -> Result<SolverConfig, SolverError> {
        let file_content = fs::read_to_string(file_path)
            .map_err(|e| SolverError::SetupError(format!("cannot read '{file_path}': {e}")))?;
        let config: SolverConfig = serde_json::from_str(&file_content)
            .map_err(|e| SolverError::SetupError(format!("cannot parse '{file_path}': {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if !(1..=3).contains(&self.rkorder) {
            return Err(SolverError::SetupError(format!(
                "rkorder must be 1..=3, got {}",
                self.rkorder
            )));
        }
        if !(self.cfl > 0.0) {
            return Err(SolverError::SetupError(format!(
                "cfl must be positive, got {}",
                self.cfl
            )));
        }
        if let Some(dt) = self.dt {
            if !(dt > 0.0) {
                return Err(SolverError::SetupError(format!(
                    "dt must be positive, got {dt}"
                )));
            }
        }
        Ok(())
    }
}
