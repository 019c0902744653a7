use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::list_files;
use crate::product::{BandRole, ProductFormat};

/// Candidate files for each band role, each list sorted independently.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BandLists {
    pub red: Vec<PathBuf>,
    pub nir: Vec<PathBuf>,
    pub cloud_mask: Vec<PathBuf>,
}

/// Red, near-infrared and cloud mask files of a single scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandFileSet {
    pub format: ProductFormat,
    pub red: PathBuf,
    pub nir: PathBuf,
    pub cloud_mask: PathBuf,
}

/// How the three role listings are combined into band sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pairing {
    /// Join on the scene identifier carried by each file name.
    #[default]
    Scene,
    /// Zip the sorted listings index by index.
    Positional,
}

/// Finds the red, NIR and cloud mask files of `format` under `directory`.
/// An unrecognized format yields three empty lists.
pub fn search_band_triplet<P: AsRef<Path>>(
    directory: P,
    format: Option<ProductFormat>,
    recurse: bool,
) -> BandLists {
    let directory = directory.as_ref();
    let Some(format) = format else {
        warn!("S2 format not recognized!");
        return BandLists::default();
    };

    info!("looking for {} files in {}", format, directory.display());
    let find = |role: BandRole| {
        list_files(&[format.pattern(role)], directory, format.extension(), recurse)
    };

    let lists = BandLists {
        red: find(BandRole::Red),
        nir: find(BandRole::Nir),
        cloud_mask: find(BandRole::CloudMask),
    };
    debug!(
        "found {} red, {} nir and {} cloud mask file(s)",
        lists.red.len(),
        lists.nir.len(),
        lists.cloud_mask.len()
    );
    lists
}

// Resolution (`10m`, `R20m`) and band or mask role tokens of ESA file names.
static ESA_ROLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:R?\d+m|B\d+A?|TCI|MSK|\w*CLD\w*)$").expect("valid ESA role token pattern")
});

/// Key shared by every band file of one scene, `None` when the name is too short.
///
/// THEIA names end with two role tokens (`_FRE_B4`, `_CLM_R1`, ...) that are
/// dropped. ESA names carry resolution and role tokens anywhere in the stem
/// (`T31TCJ_20231012T105031_B04_10m`, `T31TCJ_20m_CLD`); those are removed and
/// the remaining tokens form the key.
pub fn scene_key(path: &Path, format: ProductFormat) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let tokens: Vec<&str> = stem.split('_').collect();

    if format.is_theia() {
        if tokens.len() < 3 {
            return None;
        }
        return Some(tokens[..tokens.len() - 2].join("_"));
    }

    let scene: Vec<&str> = tokens
        .into_iter()
        .filter(|token| !token.is_empty() && !ESA_ROLE_TOKEN.is_match(token))
        .collect();
    if scene.is_empty() {
        return None;
    }
    Some(scene.join("_"))
}

impl BandLists {
    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.nir.is_empty() && self.cloud_mask.is_empty()
    }

    pub fn pair(self, format: ProductFormat, pairing: Pairing) -> Vec<BandFileSet> {
        match pairing {
            Pairing::Positional => self.pair_positional(format),
            Pairing::Scene => self.pair_by_scene(format),
        }
    }

    fn pair_positional(self, format: ProductFormat) -> Vec<BandFileSet> {
        let (r, n, m) = (self.red.len(), self.nir.len(), self.cloud_mask.len());
        if r != n || n != m {
            warn!(
                "band lists differ in length (red: {}, nir: {}, cloud mask: {}), extra files are ignored",
                r, n, m
            );
        }

        self.red
            .into_iter()
            .zip(self.nir)
            .zip(self.cloud_mask)
            .map(|((red, nir), cloud_mask)| BandFileSet {
                format,
                red,
                nir,
                cloud_mask,
            })
            .collect()
    }

    fn pair_by_scene(self, format: ProductFormat) -> Vec<BandFileSet> {
        let mut nir = index_by_scene(self.nir, format, BandRole::Nir);
        let mut masks = index_by_scene(self.cloud_mask, format, BandRole::CloudMask);
        let mut sets = Vec::new();

        for red in self.red {
            let Some(key) = scene_key(&red, format) else {
                warn!("no scene identifier in {}, skipped", red.display());
                continue;
            };
            match (nir.remove(&key), masks.remove(&key)) {
                (Some(nir), Some(cloud_mask)) => sets.push(BandFileSet {
                    format,
                    red,
                    nir,
                    cloud_mask,
                }),
                (nir_match, mask_match) => {
                    warn!(
                        "incomplete band set for scene {} (nir: {}, cloud mask: {}), skipped",
                        key,
                        nir_match.is_some(),
                        mask_match.is_some()
                    );
                }
            }
        }

        for path in nir.values().chain(masks.values()) {
            warn!("no red band matches {}, skipped", path.display());
        }

        sets
    }
}

fn index_by_scene(
    paths: Vec<PathBuf>,
    format: ProductFormat,
    role: BandRole,
) -> HashMap<String, PathBuf> {
    let mut index: HashMap<String, PathBuf> = HashMap::new();
    for path in paths {
        let Some(key) = scene_key(&path, format) else {
            warn!("no scene identifier in {} file {}", role, path.display());
            continue;
        };
        if let Some(previous) = index.get(&key) {
            warn!(
                "duplicate {} file for scene {}: keeping {}, ignoring {}",
                role,
                key,
                previous.display(),
                path.display()
            );
            continue;
        }
        index.insert(key, path);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    const SCENE_A: &str = "SENTINEL2A_20231012-105856-398_L2A_T31TCJ_D_V3-1";
    const SCENE_B: &str = "SENTINEL2B_20231017-105859-123_L2A_T31TCJ_D_V3-1";

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    fn theia_scene(root: &Path, scene: &str) {
        let dir = root.join(scene);
        fs::create_dir_all(dir.join("MASKS")).unwrap();
        touch(&dir.join(format!("{scene}_FRE_B4.tif")));
        touch(&dir.join(format!("{scene}_FRE_B8.tif")));
        touch(&dir.join(format!("{scene}_SRE_B4.tif")));
        touch(&dir.join("MASKS").join(format!("{scene}_CLM_R1.tif")));
    }

    #[test]
    fn test_search_filters_roles_and_extension() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join(format!("{SCENE_A}_FRE_B4.tif")));
        touch(&dir.path().join(format!("{SCENE_A}_FRE_B8.tif")));
        touch(&dir.path().join("b.txt"));

        let lists = search_band_triplet(dir.path(), Some(ProductFormat::TheiaL2a), true);
        assert_eq!(lists.red, vec![dir.path().join(format!("{SCENE_A}_FRE_B4.tif"))]);
        assert_eq!(lists.nir, vec![dir.path().join(format!("{SCENE_A}_FRE_B8.tif"))]);
        assert!(lists.cloud_mask.is_empty());
    }

    #[test]
    fn test_search_theia_tree() {
        let dir = tempdir().unwrap();
        theia_scene(dir.path(), SCENE_A);
        theia_scene(dir.path(), SCENE_B);

        let lists = search_band_triplet(dir.path(), Some(ProductFormat::TheiaL2a), true);
        assert_eq!(lists.red.len(), 2);
        assert_eq!(lists.nir.len(), 2);
        assert_eq!(lists.cloud_mask.len(), 2);

        let flat = search_band_triplet(dir.path(), Some(ProductFormat::TheiaL2a), false);
        assert!(flat.is_empty());
    }

    #[test]
    fn test_search_unknown_format_is_empty() {
        let dir = tempdir().unwrap();
        theia_scene(dir.path(), SCENE_A);
        assert!(search_band_triplet(dir.path(), None, true).is_empty());
    }

    #[test]
    fn test_search_esa_jp2() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("T31TCJ_10m_B04.jp2"));
        touch(&dir.path().join("T31TCJ_10m_B08.jp2"));
        touch(&dir.path().join("T31TCJ_20m_CLD.jp2"));
        touch(&dir.path().join("T31TCJ_10m_B04.tif"));

        let lists = search_band_triplet(dir.path(), Some(ProductFormat::EsaL2a), true);
        assert_eq!(lists.red, vec![dir.path().join("T31TCJ_10m_B04.jp2")]);
        assert_eq!(lists.nir.len(), 1);
        assert_eq!(lists.cloud_mask.len(), 1);

        let sets = lists.pair(ProductFormat::EsaL2a, Pairing::Scene);
        assert_eq!(
            sets,
            vec![BandFileSet {
                format: ProductFormat::EsaL2a,
                red: dir.path().join("T31TCJ_10m_B04.jp2"),
                nir: dir.path().join("T31TCJ_10m_B08.jp2"),
                cloud_mask: dir.path().join("T31TCJ_20m_CLD.jp2"),
            }]
        );
    }

    #[test]
    fn test_esa_scene_pairing_keeps_every_acquisition() {
        let scenes = [
            "S2A_MSIL2A_20231012T105031_N0509_R051_T31TCJ",
            "S2B_MSIL2A_20231017T105029_N0509_R051_T31TCJ",
        ];
        let path =
            |scene: &str, suffix: &str| PathBuf::from(format!("/esa/{scene}_{suffix}.jp2"));
        let lists = BandLists {
            red: scenes.iter().map(|s| path(*s, "10m_B04")).collect(),
            nir: scenes.iter().map(|s| path(*s, "10m_B08")).collect(),
            cloud_mask: scenes.iter().map(|s| path(*s, "20m_CLDPRB")).collect(),
        };

        let sets = lists.pair(ProductFormat::EsaL2a, Pairing::Scene);
        assert_eq!(sets.len(), 2);
        for (set, scene) in sets.iter().zip(scenes) {
            assert_eq!(set.red, path(scene, "10m_B04"));
            assert_eq!(set.nir, path(scene, "10m_B08"));
            assert_eq!(set.cloud_mask, path(scene, "20m_CLDPRB"));
        }
    }

    #[test]
    fn test_scene_key() {
        let key = scene_key(
            Path::new(&format!("{SCENE_A}_CLM_R1.tif")),
            ProductFormat::TheiaL2a,
        );
        assert_eq!(key.as_deref(), Some(SCENE_A));

        let key = scene_key(
            Path::new("T31TCJ_20231012T105031_B04_10m.jp2"),
            ProductFormat::EsaL2a,
        );
        assert_eq!(key.as_deref(), Some("T31TCJ_20231012T105031"));

        for name in ["T31TCJ_10m_B08.jp2", "T31TCJ_20m_CLD.jp2", "T31TCJ_R10m_B04.jp2"] {
            assert_eq!(
                scene_key(Path::new(name), ProductFormat::EsaL2a).as_deref(),
                Some("T31TCJ"),
                "{name}"
            );
        }
        assert_eq!(scene_key(Path::new("MSK_CLDPRB_20m.jp2"), ProductFormat::EsaL2a), None);

        assert_eq!(scene_key(Path::new("B4.tif"), ProductFormat::TheiaL2a), None);
    }

    #[test]
    fn test_scene_pairing_correlates_and_drops_orphans() {
        let lists = BandLists {
            red: vec![
                PathBuf::from(format!("/a/{SCENE_A}_FRE_B4.tif")),
                PathBuf::from(format!("/b/{SCENE_B}_FRE_B4.tif")),
            ],
            // B's NIR sorts first, a positional zip would mix the scenes.
            nir: vec![
                PathBuf::from(format!("/0/{SCENE_B}_FRE_B8.tif")),
                PathBuf::from(format!("/a/{SCENE_A}_FRE_B8.tif")),
            ],
            cloud_mask: vec![PathBuf::from(format!("/a/MASKS/{SCENE_A}_CLM_R1.tif"))],
        };

        let sets = lists.pair(ProductFormat::TheiaL2a, Pairing::Scene);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].nir, PathBuf::from(format!("/a/{SCENE_A}_FRE_B8.tif")));
        assert_eq!(
            sets[0].cloud_mask,
            PathBuf::from(format!("/a/MASKS/{SCENE_A}_CLM_R1.tif"))
        );
    }

    #[test]
    fn test_positional_pairing_zips_shortest() {
        let lists = BandLists {
            red: vec![PathBuf::from("/r1"), PathBuf::from("/r2")],
            nir: vec![PathBuf::from("/n1"), PathBuf::from("/n2")],
            cloud_mask: vec![PathBuf::from("/m1")],
        };

        let sets = lists.pair(ProductFormat::EsaL2a, Pairing::Positional);
        assert_eq!(
            sets,
            vec![BandFileSet {
                format: ProductFormat::EsaL2a,
                red: PathBuf::from("/r1"),
                nir: PathBuf::from("/n1"),
                cloud_mask: PathBuf::from("/m1"),
            }]
        );
    }
}
