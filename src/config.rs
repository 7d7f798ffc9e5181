//! Engine configuration
//!
//! Describes the native display surface the engine renders to. The pixel
//! layout mirrors what a framebuffer device reports in its variable screen
//! info: a depth plus one bitfield (offset and length) per channel.
//!
//! ```json
//! {
//!   "display": {
//!     "width": 320,
//!     "height": 240,
//!     "format": {
//!       "bits_per_pixel": 16,
//!       "red":   { "offset": 11, "length": 5 },
//!       "green": { "offset": 5,  "length": 6 },
//!       "blue":  { "offset": 0,  "length": 5 }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, FormatError};
use crate::pixel::{Channel, ChannelSpan, FormatTable, PixelFormat};

/// Pixel layout as reported by a display device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub bits_per_pixel: u32,
    pub red: ChannelSpan,
    pub green: ChannelSpan,
    pub blue: ChannelSpan,
    /// Alpha; devices without one leave it out
    #[serde(default)]
    pub transp: ChannelSpan,
}

impl FormatSpec {
    /// Validate into a `PixelFormat`
    pub fn to_format(&self) -> Result<PixelFormat, FormatError> {
        PixelFormat::new(
            self.bits_per_pixel,
            self.red,
            self.green,
            self.blue,
            self.transp,
        )
    }
}

impl From<PixelFormat> for FormatSpec {
    fn from(format: PixelFormat) -> Self {
        Self {
            bits_per_pixel: format.bpp(),
            red: format.span(Channel::Red),
            green: format.span(Channel::Green),
            blue: format.span(Channel::Blue),
            transp: format.span(Channel::Alpha),
        }
    }
}

/// The display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub format: FormatSpec,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: PixelFormat::ARGB32.into(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub display: DisplayConfig,
}

impl EngineConfig {
    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!(
            "loaded config from {}: {}x{} display",
            path.display(),
            config.display.width,
            config.display.height
        );
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.display.format.to_format()?;
        Ok(config)
    }

    /// Native pixel format of the display
    pub fn native_format(&self) -> Result<PixelFormat, FormatError> {
        self.display.format.to_format()
    }

    /// Format table with the native slot resolved to the display format
    pub fn format_table(&self) -> Result<FormatTable, FormatError> {
        self.native_format().map(FormatTable::new)
    }
}
