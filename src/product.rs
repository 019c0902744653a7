use std::fmt::Display;

use clap::ValueEnum;

/// Sentinel-2 processing levels the tool knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ProductFormat {
    /// Level 2A processed by ESA (Sen2Cor), JPEG2000 bands.
    #[value(name = "ESA_L2A", alias = "S2-2A-ESA")]
    EsaL2a,
    /// Level 2A processed by THEIA (MAJA), GeoTIFF bands.
    #[value(name = "THEIA_L2A", alias = "S2-2A")]
    TheiaL2a,
    /// Level 3A monthly syntheses processed by THEIA (WASP).
    #[value(name = "THEIA_L3A", alias = "S2-3A")]
    TheiaL3a,
}

/// The three inputs of the band-mode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandRole {
    Red,
    Nir,
    CloudMask,
}

impl ProductFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ProductFormat::EsaL2a => "jp2",
            ProductFormat::TheiaL2a | ProductFormat::TheiaL3a => "tif",
        }
    }

    /// File name pattern (without extension) selecting one band role.
    pub fn pattern(&self, role: BandRole) -> &'static str {
        match (self, role) {
            (ProductFormat::EsaL2a, BandRole::Red) => "*10m*B04*",
            (ProductFormat::EsaL2a, BandRole::Nir) => "*10m*B08*",
            (ProductFormat::EsaL2a, BandRole::CloudMask) => "*20m*CLD*",
            (ProductFormat::TheiaL2a, BandRole::Red) => "SENTINEL2*_FRE_B4",
            (ProductFormat::TheiaL2a, BandRole::Nir) => "SENTINEL2*_FRE_B8",
            (ProductFormat::TheiaL2a, BandRole::CloudMask) => "SENTINEL2*_CLM_R1",
            (ProductFormat::TheiaL3a, BandRole::Red) => "SENTINEL2*_FRC_B4",
            (ProductFormat::TheiaL3a, BandRole::Nir) => "SENTINEL2*_FRC_B8",
            (ProductFormat::TheiaL3a, BandRole::CloudMask) => "SENTINEL2*_FLG_R1",
        }
    }

    /// Cloud mask value marking a usable pixel.
    pub fn cloud_free_value(&self) -> i16 {
        match self {
            ProductFormat::EsaL2a | ProductFormat::TheiaL2a => 0,
            ProductFormat::TheiaL3a => 4,
        }
    }

    pub fn is_theia(&self) -> bool {
        matches!(self, ProductFormat::TheiaL2a | ProductFormat::TheiaL3a)
    }
}

impl Display for ProductFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductFormat::EsaL2a => write!(f, "ESA_L2A"),
            ProductFormat::TheiaL2a => write!(f, "THEIA_L2A"),
            ProductFormat::TheiaL3a => write!(f, "THEIA_L3A"),
        }
    }
}

impl Display for BandRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandRole::Red => write!(f, "red"),
            BandRole::Nir => write!(f, "nir"),
            BandRole::CloudMask => write!(f, "cloud mask"),
        }
    }
}
