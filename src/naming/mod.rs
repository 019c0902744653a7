//! Canonical output names derived from vendor band file names.
//!
//! ESA products keep their first two `_` tokens (`{tile}_{sensing time}`), THEIA
//! products are renamed `{tile}_{date}T{time}` from the first and fourth tokens.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{error, warn};

use crate::product::ProductFormat;

pub mod error;
pub use error::NamingError;

const ESA_LAYOUT: &str = "SCENE_PRODUCT[_...]";
const THEIA_LAYOUT: &str = "PLATFORM_DATE-TIME[-...]_LEVEL_TILE[_...]";

static ESA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<scene>[^_]*)_(?P<product>[^_]*)").expect("valid ESA name pattern")
});

static THEIA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^_]*_(?P<date>[^_-]*)-(?P<time>[^_-]*)[^_]*_[^_]*_(?P<tile>[^_]*)")
        .expect("valid THEIA name pattern")
});

/// Identity of an acquisition as encoded in a band file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneName {
    Esa {
        scene_id: String,
        product_id: String,
    },
    Theia {
        tile_id: String,
        acquisition_date: String,
        acquisition_time: String,
    },
}

impl SceneName {
    /// Tokens are taken by position, so the last captured token keeps the file
    /// extension when the name has no further `_` separator.
    pub fn parse(file_name: &str, format: ProductFormat) -> Result<Self, NamingError> {
        let malformed = |layout| NamingError::Malformed {
            name: file_name.to_string(),
            format,
            layout,
        };

        if format.is_theia() {
            let caps = THEIA_NAME
                .captures(file_name)
                .ok_or_else(|| malformed(THEIA_LAYOUT))?;
            Ok(SceneName::Theia {
                tile_id: caps["tile"].to_string(),
                acquisition_date: caps["date"].to_string(),
                acquisition_time: caps["time"].to_string(),
            })
        } else {
            let caps = ESA_NAME
                .captures(file_name)
                .ok_or_else(|| malformed(ESA_LAYOUT))?;
            Ok(SceneName::Esa {
                scene_id: caps["scene"].to_string(),
                product_id: caps["product"].to_string(),
            })
        }
    }

    pub fn stem(&self) -> String {
        match self {
            SceneName::Esa {
                scene_id,
                product_id,
            } => format!("{}_{}", scene_id, product_id),
            SceneName::Theia {
                tile_id,
                acquisition_date,
                acquisition_time,
            } => format!("{}_{}T{}", tile_id, acquisition_date, acquisition_time),
        }
    }
}

/// Optional decorations around the scene stem. Empty parts add no delimiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Affixes<'a> {
    pub prefix: &'a str,
    pub prefix2: &'a str,
    pub suffix: &'a str,
}

impl<'a> Affixes<'a> {
    pub fn prefix(prefix: &'a str) -> Self {
        Self {
            prefix,
            ..Default::default()
        }
    }

    fn decorate(&self, stem: &str, extension: &str) -> String {
        let mut name = String::new();
        for part in [self.prefix, self.prefix2] {
            if !part.is_empty() {
                name.push_str(part);
                name.push('_');
            }
        }
        name.push_str(stem);
        if !self.suffix.is_empty() {
            name.push('_');
            name.push_str(self.suffix);
        }
        name.push_str(extension);
        name
    }
}

/// Base name, its stem and its dotted extension (empty when there is none).
fn split_file_name(input: &Path) -> (String, String, String) {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| base.clone());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (base, stem, extension)
}

/// Like [`generate_output_name`] but reports why a canonical name could not be built.
pub fn try_output_name(
    input: &Path,
    format: Option<ProductFormat>,
    affixes: &Affixes,
) -> Result<String, NamingError> {
    let format = format.ok_or(NamingError::UnknownFormat)?;
    let (base, _, extension) = split_file_name(input);
    let scene = SceneName::parse(&base, format)?;
    Ok(affixes.decorate(&scene.stem(), &extension))
}

/// Never fails: an unknown format yields `{stem}.no_format{ext}` and a name that
/// does not fit the format layout yields `{stem}.error{ext}`.
pub fn generate_output_name(
    input: &Path,
    format: Option<ProductFormat>,
    affixes: &Affixes,
) -> String {
    match try_output_name(input, format, affixes) {
        Ok(name) => name,
        Err(NamingError::UnknownFormat) => {
            let (_, stem, extension) = split_file_name(input);
            let name = format!("{}.no_format{}", stem, extension);
            warn!("format not found, generated output file as {}", name);
            name
        }
        Err(e) => {
            let (_, stem, extension) = split_file_name(input);
            let name = format!("{}.error{}", stem, extension);
            error!("error while formatting output filename: {}", e);
            error!("generated output file as {}", name);
            name
        }
    }
}
