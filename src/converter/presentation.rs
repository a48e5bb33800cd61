//! Per-table presentation mode.

use super::{ConversionSettings, NumberPattern};
use crate::config::TablePreferences;
use crate::datatype::Datatype;
use crate::error::Result;

/// How numeric values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberMode {
    /// Plain decimal text.
    #[default]
    Decimal,
    /// Hexadecimal at the element width.
    Hex,
    /// Binary at the element width.
    Binary,
    /// The scientific pattern from the preferences.
    Scientific,
    /// The user's custom decimal pattern.
    Custom,
}

impl NumberMode {
    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            NumberMode::Decimal => "Decimal",
            NumberMode::Hex => "Hexadecimal",
            NumberMode::Binary => "Binary",
            NumberMode::Scientific => "Scientific",
            NumberMode::Custom => "Custom",
        }
    }
}

/// Presentation state of one open table.
///
/// Hex, binary, scientific, custom and enum-name display exclude each
/// other: turning one on turns the rest off.
#[derive(Debug, Clone)]
pub struct Presentation {
    mode: NumberMode,
    convert_enum: bool,
    custom_pattern: String,
    scientific_pattern: String,
}

impl Presentation {
    /// Defaults for a table of `dtype`: bitfields and opaque data open in
    /// hex, enum-name display follows the preferences.
    pub fn for_datatype(dtype: &Datatype, preferences: &TablePreferences) -> Self {
        let mut presentation = Self {
            mode: NumberMode::Decimal,
            convert_enum: false,
            custom_pattern: preferences.custom_pattern.clone(),
            scientific_pattern: preferences.scientific_pattern.clone(),
        };
        if dtype.is_bitfield() || dtype.is_opaque() {
            presentation.set_mode(NumberMode::Hex);
        } else {
            presentation.set_convert_enum(preferences.convert_enum);
        }
        presentation
    }

    /// Current number mode.
    pub fn mode(&self) -> NumberMode {
        self.mode
    }

    /// Check if enum values are shown by name.
    pub fn convert_enum(&self) -> bool {
        self.convert_enum
    }

    /// Check if values are shown as hex.
    pub fn is_hex(&self) -> bool {
        self.mode == NumberMode::Hex
    }

    /// Check if values are shown as binary.
    pub fn is_binary(&self) -> bool {
        self.mode == NumberMode::Binary
    }

    /// Switch to `mode`, clearing enum-name display for any non-decimal mode.
    pub fn set_mode(&mut self, mode: NumberMode) {
        self.mode = mode;
        if mode != NumberMode::Decimal {
            self.convert_enum = false;
        }
    }

    /// Turn `mode` on, or back to decimal if it is already on.
    pub fn toggle(&mut self, mode: NumberMode) {
        if self.mode == mode {
            self.mode = NumberMode::Decimal;
        } else {
            self.set_mode(mode);
        }
    }

    /// Turn enum-name display on or off. Turning it on resets the number mode.
    pub fn set_convert_enum(&mut self, on: bool) {
        self.convert_enum = on;
        if on {
            self.mode = NumberMode::Decimal;
        }
    }

    /// Replace the custom decimal pattern.
    pub fn set_custom_pattern(&mut self, pattern: impl Into<String>) {
        self.custom_pattern = pattern.into();
    }

    /// The custom decimal pattern.
    pub fn custom_pattern(&self) -> &str {
        &self.custom_pattern
    }

    /// Converter settings for the current state.
    pub fn settings(&self) -> Result<ConversionSettings> {
        let pattern = match self.mode {
            NumberMode::Scientific => Some(self.scientific_pattern.parse::<NumberPattern>()?),
            NumberMode::Custom => Some(self.custom_pattern.parse::<NumberPattern>()?),
            _ => None,
        };
        Ok(ConversionSettings {
            hex: self.is_hex(),
            binary: self.is_binary(),
            pattern,
            convert_enum: self.convert_enum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [NumberMode; 4] = [
        NumberMode::Hex,
        NumberMode::Binary,
        NumberMode::Scientific,
        NumberMode::Custom,
    ];

    fn fresh() -> Presentation {
        Presentation::for_datatype(&Datatype::integer(4, true), &TablePreferences::default())
    }

    #[test]
    fn test_modes_exclude_each_other() {
        for first in MODES {
            for second in MODES {
                let mut p = fresh();
                p.set_mode(first);
                p.set_mode(second);
                assert_eq!(p.mode(), second);
                assert!(!p.convert_enum());
            }
            let mut p = fresh();
            p.set_mode(first);
            p.set_convert_enum(true);
            assert_eq!(p.mode(), NumberMode::Decimal);
            assert!(p.convert_enum());
        }
    }

    #[test]
    fn test_toggle_returns_to_decimal() {
        let mut p = fresh();
        p.toggle(NumberMode::Binary);
        assert!(p.is_binary());
        p.toggle(NumberMode::Binary);
        assert_eq!(p.mode(), NumberMode::Decimal);
    }

    #[test]
    fn test_defaults_by_datatype() {
        let prefs = TablePreferences::default();
        let bits = Presentation::for_datatype(&Datatype::Bitfield { size: 2 }, &prefs);
        assert!(bits.is_hex());
        assert!(!bits.convert_enum());
        let plain = Presentation::for_datatype(&Datatype::integer(1, false), &prefs);
        assert!(plain.convert_enum());
        let prefs = TablePreferences {
            convert_enum: false,
            ..TablePreferences::default()
        };
        assert!(!Presentation::for_datatype(&Datatype::integer(1, false), &prefs).convert_enum());
    }

    #[test]
    fn test_settings_compile_patterns() {
        let mut p = fresh();
        p.set_mode(NumberMode::Scientific);
        assert!(p.settings().unwrap().pattern.unwrap().is_scientific());
        p.set_custom_pattern("#x");
        p.set_mode(NumberMode::Custom);
        assert!(p.settings().is_err());
    }
}
