use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::{
    color::WHITE,
    math::{Rect as MacroquadRect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use snake_rendering::{Rect, SpriteSheet};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Sprite sheet texture together with its grid layout.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    texture: Texture2D,
    sheet: SpriteSheet,
}

impl SpriteAtlas {
    /// Loads the sheet described by the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/sprites.toml")
    }

    /// Grid layout of the loaded sheet.
    #[must_use]
    pub(crate) fn sheet(&self) -> &SpriteSheet {
        &self.sheet
    }

    /// Copies the `source` region of the sheet into `destination`.
    pub(crate) fn draw(&self, source: Rect, destination: Rect) {
        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(destination.width, destination.height)),
            source: Some(MacroquadRect::new(
                source.x,
                source.y,
                source.width,
                source.height,
            )),
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(self.texture, destination.x, destination.y, WHITE, params);
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(&Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (image, sheet) = parse_manifest(&contents, &base)?;
        let texture = loader(&image)
            .with_context(|| format!("failed to load sprite sheet from {}", image.display()))?;
        Ok(Self { texture, sheet })
    }
}

fn default_loader(path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite sheet at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    image: String,
    columns: u32,
    cell_width: u32,
    cell_height: u32,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<(PathBuf, SpriteSheet)> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.image.trim().is_empty() {
        bail!("sprite manifest does not name an image");
    }

    let sheet = SpriteSheet::new(
        manifest.columns,
        manifest.cell_width as f32,
        manifest.cell_height as f32,
    )
    .context("sprite manifest describes an unusable grid")?;
    Ok((base_path.join(manifest.image), sheet))
}
