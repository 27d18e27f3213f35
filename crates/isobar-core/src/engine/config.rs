use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid parameter {parameter}: {reason}")]
    Invalid {
        parameter: &'static str,
        reason: &'static str,
    },
}

/// How a raw bisection midpoint is snapped to a volume the simulator can be
/// asked for. The default matches the integer volume-unit resolution of the
/// staged structure files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeRounding {
    /// Round to the nearest integer volume unit.
    Integer,
    /// Round to the nearest multiple of the given step.
    Step(f64),
    /// Use the midpoint as computed.
    Exact,
}

impl VolumeRounding {
    pub fn apply(&self, volume: f64) -> f64 {
        match self {
            VolumeRounding::Integer => volume.round(),
            VolumeRounding::Step(step) => (volume / step).round() * step,
            VolumeRounding::Exact => volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub target_pressure: f64,
    pub temperature: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub tolerance: f64,
    pub convergence_width: f64,
    pub max_iterations: usize,
    pub rounding: VolumeRounding,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_pressure.is_finite() {
            return Err(ConfigError::Invalid {
                parameter: "target_pressure",
                reason: "must be finite",
            });
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::Invalid {
                parameter: "temperature",
                reason: "must be finite and non-negative",
            });
        }
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return Err(ConfigError::Invalid {
                parameter: "bracket",
                reason: "bounds must be finite",
            });
        }
        if self.lower_bound > self.upper_bound {
            return Err(ConfigError::Invalid {
                parameter: "bracket",
                reason: "lower bound must not exceed upper bound",
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                parameter: "tolerance",
                reason: "must be finite and non-negative",
            });
        }
        if !self.convergence_width.is_finite() || self.convergence_width <= 0.0 {
            return Err(ConfigError::Invalid {
                parameter: "convergence_width",
                reason: "must be finite and positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                parameter: "max_iterations",
                reason: "must be at least 1",
            });
        }
        if let VolumeRounding::Step(step) = self.rounding {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::Invalid {
                    parameter: "rounding",
                    reason: "step must be finite and positive",
                });
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    target_pressure: Option<f64>,
    temperature: Option<f64>,
    bracket: Option<(f64, f64)>,
    tolerance: Option<f64>,
    convergence_width: Option<f64>,
    max_iterations: Option<usize>,
    rounding: Option<VolumeRounding>,
}

impl SearchConfigBuilder {
    pub const DEFAULT_TOLERANCE: f64 = 5.0;
    pub const DEFAULT_CONVERGENCE_WIDTH: f64 = 5.0;
    pub const DEFAULT_MAX_ITERATIONS: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_pressure(mut self, pressure: f64) -> Self {
        self.target_pressure = Some(pressure);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn bracket(mut self, lower: f64, upper: f64) -> Self {
        self.bracket = Some((lower, upper));
        self
    }

    /// Bracket expressed as an expected center volume and a half-width, the
    /// form the command line takes.
    pub fn centered_bracket(mut self, center: f64, half_width: f64) -> Self {
        self.bracket = Some((center - half_width, center + half_width));
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn convergence_width(mut self, width: f64) -> Self {
        self.convergence_width = Some(width);
        self
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn rounding(mut self, rounding: VolumeRounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let (lower_bound, upper_bound) = self
            .bracket
            .ok_or(ConfigError::MissingParameter("bracket"))?;
        let config = SearchConfig {
            target_pressure: self
                .target_pressure
                .ok_or(ConfigError::MissingParameter("target_pressure"))?,
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            lower_bound,
            upper_bound,
            tolerance: self.tolerance.unwrap_or(Self::DEFAULT_TOLERANCE),
            convergence_width: self
                .convergence_width
                .unwrap_or(Self::DEFAULT_CONVERGENCE_WIDTH),
            max_iterations: self.max_iterations.unwrap_or(Self::DEFAULT_MAX_ITERATIONS),
            rounding: self.rounding.unwrap_or(VolumeRounding::Integer),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base_builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
            .target_pressure(50.0)
            .temperature(3500.0)
            .bracket(3200.0, 3800.0)
    }

    #[test]
    fn build_applies_defaults() {
        let config = base_builder().build().unwrap();
        assert_relative_eq!(config.tolerance, 5.0);
        assert_relative_eq!(config.convergence_width, 5.0);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.rounding, VolumeRounding::Integer);
    }

    #[test]
    fn missing_required_parameters_are_named() {
        let err = SearchConfigBuilder::new()
            .bracket(0.0, 1.0)
            .temperature(300.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("target_pressure"));

        let err = SearchConfigBuilder::new()
            .target_pressure(1.0)
            .temperature(300.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("bracket"));
    }

    #[test]
    fn centered_bracket_expands_half_width() {
        let config = base_builder().centered_bracket(3500.0, 300.0).build().unwrap();
        assert_relative_eq!(config.lower_bound, 3200.0);
        assert_relative_eq!(config.upper_bound, 3800.0);
    }

    #[test]
    fn inverted_bracket_is_rejected() {
        let err = base_builder().bracket(3800.0, 3200.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { parameter: "bracket", .. }));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let err = base_builder().tolerance(-1.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { parameter: "tolerance", .. }));
    }

    #[test]
    fn zero_iteration_budget_is_rejected() {
        let err = base_builder().max_iterations(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { parameter: "max_iterations", .. }));
    }

    #[test]
    fn rounding_policies_snap_midpoints() {
        assert_relative_eq!(VolumeRounding::Integer.apply(3237.5), 3238.0);
        assert_relative_eq!(VolumeRounding::Step(10.0).apply(3237.5), 3240.0);
        assert_relative_eq!(VolumeRounding::Exact.apply(3237.5), 3237.5);
    }

    #[test]
    fn non_positive_rounding_step_is_rejected() {
        let err = base_builder()
            .rounding(VolumeRounding::Step(0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { parameter: "rounding", .. }));
    }
}
