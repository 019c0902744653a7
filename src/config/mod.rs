use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::discovery::Pairing;
use crate::raster_io::{Compression, WriteOptions};

pub mod error;
pub use error::ConfigError;

pub const DEFAULT_INPUT_DIRECTORY: &str = "./01_DATA";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "./02_RES";

/// Run settings read from an optional JSON file. Command line flags take
/// precedence over every value here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    input_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    recurse: bool,
    pairing: Pairing,
    write_options: WriteOptions,
    shapefile: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_directory: None,
            output_directory: None,
            recurse: true,
            pairing: Pairing::default(),
            write_options: WriteOptions::default(),
            shapefile: None,
        }
    }
}

// Every field is optional; compression names are checked here so a typo fails
// when the file is loaded rather than at the first GeoTIFF write.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            input_directory: Option<PathBuf>,
            output_directory: Option<PathBuf>,
            recurse: Option<bool>,
            pairing: Option<Pairing>,
            compression: Option<String>,
            bigtiff: Option<bool>,
            shapefile: Option<PathBuf>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let compression = match helper.compression {
            Some(name) => parse_compression(&name).map_err(D::Error::custom)?,
            None => Compression::default(),
        };

        Ok(Config {
            input_directory: helper.input_directory,
            output_directory: helper.output_directory,
            recurse: helper.recurse.unwrap_or(true),
            pairing: helper.pairing.unwrap_or_default(),
            write_options: WriteOptions::compressed(compression, helper.bigtiff.unwrap_or(true)),
            shapefile: helper.shapefile,
        })
    }
}

fn parse_compression(name: &str) -> Result<Compression, ConfigError> {
    match name.to_ascii_uppercase().as_str() {
        "DEFLATE" => Ok(Compression::Deflate),
        "LZW" => Ok(Compression::Lzw),
        "ZSTD" => Ok(Compression::Zstd),
        "NONE" => Ok(Compression::None),
        _ => Err(ConfigError::Compression(name.to_string())),
    }
}

/// Band numbers are 1-based, as GDAL counts them.
pub fn validate_band_index(band: usize) -> Result<usize, ConfigError> {
    if band == 0 {
        return Err(ConfigError::BandIndex(band));
    }
    Ok(band)
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// `cli`, then the configured directory, then `./01_DATA`.
    pub fn input_directory(&self, cli: Option<&Path>) -> PathBuf {
        cli.or(self.input_directory.as_deref())
            .unwrap_or(Path::new(DEFAULT_INPUT_DIRECTORY))
            .to_path_buf()
    }

    /// `cli`, then the configured directory, then `./02_RES`.
    pub fn output_directory(&self, cli: Option<&Path>) -> PathBuf {
        cli.or(self.output_directory.as_deref())
            .unwrap_or(Path::new(DEFAULT_OUTPUT_DIRECTORY))
            .to_path_buf()
    }

    pub fn shapefile<'a>(&'a self, cli: Option<&'a Path>) -> Option<&'a Path> {
        cli.or(self.shapefile.as_deref())
    }

    pub fn recurse(&self) -> bool {
        self.recurse
    }

    pub fn pairing(&self, cli: Option<Pairing>) -> Pairing {
        cli.unwrap_or(self.pairing)
    }

    pub fn write_options(&self) -> WriteOptions {
        self.write_options
    }
}
