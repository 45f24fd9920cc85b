use crate::geometry::{PageGeometry, resolve};
use crate::layout::{check_frame, create_grid_layout};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fully resolved document configuration.
///
/// The caller builds one snapshot per generation; the engine never mutates it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DocumentConfig {
    // Layout
    pub layout: LayoutMode,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,

    // Colors
    pub colors: ColorScheme,
    pub tone: ToneMode,

    // Decorations
    pub show_captions: bool,
    pub show_borders: bool,
    pub header: Band,
    pub footer: Band,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Single,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            colors: ColorScheme::default(),
            tone: ToneMode::Auto,
            show_captions: false,
            show_borders: true,
            header: Band::hidden(),
            footer: Band::hidden(),
        }
    }
}

impl DocumentConfig {
    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| GenerateError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GenerateError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Resolve page geometry for this configuration
    pub fn geometry(&self) -> Result<PageGeometry> {
        resolve(
            self.page_size,
            self.orientation,
            &self.margins,
            self.header.enabled,
            self.footer.enabled,
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let geometry = self.geometry()?;
        let grid = create_grid_layout(self.layout, &geometry.content)?;
        check_frame(&grid, self.show_captions)?;

        if self.colors.primary == self.colors.secondary {
            log::warn!(
                "Primary and secondary colors are both {}; images will be invisible",
                self.colors.primary
            );
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Colors travel as "#RRGGBB" strings
    impl Serialize for Rgb {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Rgb {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Rgb::from_hex(&s).map_err(serde::de::Error::custom)
        }
    }
}
