use serde::{Deserialize, Serialize};

/// Startup configuration for a viewer session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub canvas_id: String,
    pub dataset_url: String,
    pub texture_url: String,
    /// Degrees of rotation per pixel of pointer travel.
    pub drag_sensitivity: f64,
    pub initial: InitialView,
    pub lighting: LightingConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".to_string(),
            dataset_url: "data/time_series_deaths.csv".to_string(),
            texture_url: "img/world.jpg".to_string(),
            drag_sensitivity: 0.5,
            initial: InitialView::default(),
            lighting: LightingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialView {
    pub day: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub animate: bool,
    pub velocity: String,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            day: 1,
            latitude: 0.0,
            longitude: 0.0,
            animate: false,
            velocity: "50".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub light_position: [f64; 3],
    pub light_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub brightness: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_position: [0.0, 0.0, 50.0],
            light_color: [1.0, 1.0, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            shininess: 50.0,
            ambient: 0.1,
            diffuse: 0.7,
            specular: 0.1,
            brightness: 1.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ViewerConfig {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.drag_sensitivity.is_finite() {
            return Err(ConfigError::Invalid(
                "drag_sensitivity must be finite".to_string(),
            ));
        }
        if !(1..=foundation::DAY_COUNT as i64).contains(&self.initial.day) {
            return Err(ConfigError::Invalid(format!(
                "initial.day {} is outside 1..={}",
                self.initial.day,
                foundation::DAY_COUNT
            )));
        }
        if !self.initial.latitude.is_finite() || !self.initial.longitude.is_finite() {
            return Err(ConfigError::Invalid(
                "initial latitude/longitude must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
