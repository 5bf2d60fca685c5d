//! Sticker models and the sampled item set

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::{Error, Result};

/// Reference to a fetchable asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub path: PathBuf,
}

impl AssetRef {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// A sticker shown in the carousel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: String,
    pub title: String,
    /// Pixel dimensions of the primary asset
    pub dimensions: Option<Size>,
    /// Only premium stickers animate and carry an effect
    pub premium: bool,
    pub asset: AssetRef,
    /// Secondary effect animation played around the central item
    pub effect: Option<AssetRef>,
}

/// Manifest entry as written on disk
#[derive(Debug, Clone, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default = "default_premium")]
    premium: bool,
    asset: PathBuf,
    #[serde(default)]
    effect: Option<PathBuf>,
}

fn default_premium() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    stickers: Vec<ManifestEntry>,
}

/// The pool stickers are sampled from
#[derive(Debug, Clone, Default)]
pub struct StickerCatalog {
    stickers: Vec<Sticker>,
}

impl StickerCatalog {
    pub fn new(stickers: Vec<Sticker>) -> Self {
        Self { stickers }
    }

    /// Load a JSON manifest; relative asset paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base)
    }

    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(content)?;
        if manifest.stickers.is_empty() {
            return Err(Error::Catalog("manifest lists no stickers".to_string()));
        }

        let stickers = manifest
            .stickers
            .into_iter()
            .map(|entry| {
                let dimensions = match (entry.width, entry.height) {
                    (Some(w), Some(h)) if w > 0 && h > 0 => Some(Size::new(w as f64, h as f64)),
                    _ => None,
                };
                let effect = entry
                    .effect
                    .map(|path| AssetRef::new(format!("{}:effect", entry.id), base.join(path)));
                Sticker {
                    title: entry.title.unwrap_or_else(|| entry.id.clone()),
                    dimensions,
                    premium: entry.premium,
                    asset: AssetRef::new(entry.id.clone(), base.join(entry.asset)),
                    effect,
                    id: entry.id,
                }
            })
            .collect();

        Ok(Self::new(stickers))
    }

    /// Built-in pool used when no manifest is configured
    pub fn demo() -> Self {
        const NAMES: [&str; 20] = [
            "Duck", "Cat", "Fox", "Owl", "Frog", "Panda", "Tiger", "Koala", "Otter", "Whale",
            "Bunny", "Hedgehog", "Penguin", "Sloth", "Raccoon", "Lion", "Bee", "Crab", "Snail",
            "Unicorn",
        ];
        let stickers = NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let id = name.to_lowercase();
                Sticker {
                    title: (*name).to_string(),
                    dimensions: Some(Size::new(512.0, 512.0)),
                    premium: i % 5 != 4,
                    asset: AssetRef::new(id.clone(), format!("demo/{id}.tgs")),
                    effect: (i % 5 != 4)
                        .then(|| AssetRef::new(format!("{id}:effect"), format!("demo/{id}-effect.tgs"))),
                    id,
                }
            })
            .collect();
        Self::new(stickers)
    }

    #[inline]
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }
}

/// Ordered, fixed set of carousel items
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    items: Vec<Sticker>,
}

impl ItemSet {
    /// Keep the given order
    pub fn from_items(items: Vec<Sticker>) -> Self {
        Self { items }
    }

    /// Random sample of at most `max` stickers without replacement
    pub fn sample<R: Rng + ?Sized>(pool: &[Sticker], max: usize, rng: &mut R) -> Self {
        let mut items = pool.to_vec();
        items.shuffle(rng);
        items.truncate(max);
        Self { items }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sticker> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_caps_and_is_unique() {
        let catalog = StickerCatalog::demo();
        let mut rng = StdRng::seed_from_u64(7);
        let set = ItemSet::sample(catalog.stickers(), 14, &mut rng);
        assert_eq!(set.len(), 14);
        let ids: HashSet<_> = set.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn test_sample_small_pool_keeps_all() {
        let catalog = StickerCatalog::demo();
        let mut rng = StdRng::seed_from_u64(1);
        let set = ItemSet::sample(&catalog.stickers()[..3], 14, &mut rng);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "stickers": [
                { "id": "duck", "title": "Duck", "width": 512, "height": 256,
                  "asset": "duck.tgs", "effect": "fx/duck.tgs" },
                { "id": "plain", "premium": false, "asset": "/abs/plain.webp" }
            ]
        }"#;
        let catalog = StickerCatalog::parse(json, Path::new("/packs")).unwrap();
        assert_eq!(catalog.len(), 2);

        let duck = &catalog.stickers()[0];
        assert_eq!(duck.dimensions, Some(Size::new(512.0, 256.0)));
        assert!(duck.premium);
        assert_eq!(duck.asset.path, PathBuf::from("/packs/duck.tgs"));
        assert_eq!(
            duck.effect.as_ref().map(|e| e.path.clone()),
            Some(PathBuf::from("/packs/fx/duck.tgs"))
        );

        let plain = &catalog.stickers()[1];
        assert_eq!(plain.title, "plain");
        assert!(!plain.premium);
        assert!(plain.dimensions.is_none());
        assert_eq!(plain.asset.path, PathBuf::from("/abs/plain.webp"));
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let err = StickerCatalog::parse(r#"{ "stickers": [] }"#, Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }
}
