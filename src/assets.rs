use crate::model::ItemKind;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AssetError {
    #[error("cannot read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode asset {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(img.to_rgba8()))
    }

    pub(crate) fn width(&self) -> u32 {
        self.image.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGBA at (x, y); transparent outside the image.
    pub(crate) fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel_checked(x, y).map(|p| p.0).unwrap_or([0; 4])
    }
}

/// One sprite per item kind, indexed by `ItemKind::index`.
#[derive(Clone, Debug)]
pub(crate) struct Assets {
    sprites: [Sprite; 3],
}

impl Assets {
    pub(crate) fn load(dir: &Path) -> Result<Self, AssetError> {
        let [feed, treat, toy] = ItemKind::ALL;
        let sprites = [
            Sprite::load(&dir.join(feed.asset_name()))?,
            Sprite::load(&dir.join(treat.asset_name()))?,
            Sprite::load(&dir.join(toy.asset_name()))?,
        ];
        for kind in ItemKind::ALL {
            let s = &sprites[kind.index()];
            log::info!("loaded {} ({}x{})", kind.asset_name(), s.width(), s.height());
        }
        Ok(Self { sprites })
    }

    #[cfg(test)]
    pub(crate) fn from_sprites(sprites: [Sprite; 3]) -> Self {
        Self { sprites }
    }

    pub(crate) fn sprite(&self, kind: ItemKind) -> &Sprite {
        &self.sprites[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clickpet-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_all_three_sprites() {
        let dir = scratch_dir("ok");
        for (i, kind) in ItemKind::ALL.iter().enumerate() {
            let img = RgbaImage::from_pixel(8 + i as u32, 6, Rgba([200, 10, 10, 255]));
            img.save(dir.join(kind.asset_name())).unwrap();
        }

        let assets = Assets::load(&dir).unwrap();
        assert_eq!(assets.sprite(ItemKind::Feed).width(), 8);
        assert_eq!(assets.sprite(ItemKind::Treat).width(), 9);
        assert_eq!(assets.sprite(ItemKind::Toy).width(), 10);
        assert_eq!(assets.sprite(ItemKind::Toy).texel(0, 0), [200, 10, 10, 255]);
        assert_eq!(assets.sprite(ItemKind::Toy).texel(99, 0), [0, 0, 0, 0]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = scratch_dir("missing");
        let err = Assets::load(&dir).unwrap_err();
        assert!(matches!(err, AssetError::Io { ref path, .. } if path.ends_with("apple.png")));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = scratch_dir("garbage");
        std::fs::write(dir.join("apple.png"), b"not a png").unwrap();
        let err = Assets::load(&dir).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(err.to_string().contains("apple.png"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
