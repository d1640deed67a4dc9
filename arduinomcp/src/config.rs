//! Runtime settings.
//!
//! Every field has a default, so an empty JSON object (or no config file at
//! all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::ArduinoMcpError;

/// Colors used by the schematic renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchematicTheme {
    pub power_color: String,
    pub ground_color: String,
    /// Signal net colors, assigned in drawing order and wrapped
    pub palette: Vec<String>,
}

impl Default for SchematicTheme {
    fn default() -> Self {
        Self {
            power_color: "#ef4444".to_string(),
            ground_color: "#16a34a".to_string(),
            palette: ["#2563eb", "#d97706", "#7c3aed", "#0891b2", "#be185d", "#4f46e5"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl SchematicTheme {
    /// Palette color for the n-th drawn signal net.
    pub fn signal_color(&self, n: usize) -> String {
        if self.palette.is_empty() {
            return self.power_color.clone();
        }
        self.palette[n % self.palette.len()].clone()
    }
}

/// Vendor filter for generated cart links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Mouser,
    Digikey,
    #[default]
    Either,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Mouser => "mouser",
            Vendor::Digikey => "digikey",
            Vendor::Either => "either",
        }
    }

    /// Whether links for `vendor` pass this filter.
    pub fn accepts(&self, vendor: Vendor) -> bool {
        *self == Vendor::Either || *self == vendor
    }
}

impl std::str::FromStr for Vendor {
    type Err = ArduinoMcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mouser" => Ok(Vendor::Mouser),
            "digikey" => Ok(Vendor::Digikey),
            "either" => Ok(Vendor::Either),
            other => Err(ArduinoMcpError::Config(format!("unknown vendor: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schematic: SchematicTheme,
    /// Used by `order_parts` when the call does not name a vendor
    pub default_vendor: Vendor,
    /// Flat per-unit price behind order estimates
    pub price_per_unit_usd: f64,
    /// Extra datasheet JSON files, searched before the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasheet_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schematic: SchematicTheme::default(),
            default_vendor: Vendor::Either,
            price_per_unit_usd: 1.25,
            datasheet_dir: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> Result<Self, ArduinoMcpError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ArduinoMcpError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ArduinoMcpError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn datasheets(&self) -> crate::datasheets::DatasheetLibrary {
        match &self.datasheet_dir {
            Some(dir) => crate::datasheets::DatasheetLibrary::with_directory(dir),
            None => crate::datasheets::DatasheetLibrary::builtin(),
        }
    }

    fn check(&self) -> Result<(), ArduinoMcpError> {
        if self.schematic.palette.is_empty() {
            return Err(ArduinoMcpError::Config(
                "schematic.palette must list at least one color".to_string(),
            ));
        }
        if !self.price_per_unit_usd.is_finite() || self.price_per_unit_usd < 0.0 {
            return Err(ArduinoMcpError::Config(format!(
                "price_per_unit_usd must be a non-negative number, got {}",
                self.price_per_unit_usd
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let settings = Settings::from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.price_per_unit_usd, 1.25);
        assert_eq!(settings.schematic.palette.len(), 6);
    }

    #[test]
    fn test_partial_theme_override() {
        let settings =
            Settings::from_json_str(r##"{"schematic": {"palette": ["#000000"]}, "default_vendor": "digikey"}"##)
                .unwrap();
        assert_eq!(settings.schematic.power_color, "#ef4444");
        assert_eq!(settings.schematic.signal_color(3), "#000000");
        assert_eq!(settings.default_vendor, Vendor::Digikey);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let err = Settings::from_json_str(r#"{"schematic": {"palette": []}}"#).unwrap_err();
        assert!(matches!(err, ArduinoMcpError::Config(_)));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(Settings::from_json_str(r#"{"price_per_unit_usd": -1}"#).is_err());
    }

    #[test]
    fn test_vendor_filter() {
        assert!(Vendor::Either.accepts(Vendor::Mouser));
        assert!(Vendor::Digikey.accepts(Vendor::Digikey));
        assert!(!Vendor::Digikey.accepts(Vendor::Mouser));
        assert_eq!("Mouser".parse::<Vendor>().unwrap(), Vendor::Mouser);
        assert!("farnell".parse::<Vendor>().is_err());
    }
}
