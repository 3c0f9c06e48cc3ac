//! GPU textures and the name-keyed image store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wgpu::util::DeviceExt;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read image directory {path}: {source}")]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl Texture {
    /// Upload tightly packed RGBA8 pixels.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (width, height),
        }
    }

    /// Decode an image file and upload it.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Ok(Self::from_rgba(device, queue, &rgba, w, h, &path.display().to_string()))
    }

    /// 1x1 opaque white, bound for untextured batches.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, &[255, 255, 255, 255], 1, 1, "White Texture")
    }
}

/// Image file stems accepted as asset names.
pub fn image_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}

/// Loaded images, each with its bind group.
#[derive(Default)]
pub struct AssetStore {
    images: HashMap<String, (Texture, wgpu::BindGroup)>,
}

impl AssetStore {
    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn bind_group(&self, name: &str) -> Option<&wgpu::BindGroup> {
        self.images.get(name).map(|(_, bg)| bg)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn insert(&mut self, name: String, texture: Texture, bind_group: wgpu::BindGroup) {
        self.images.insert(name, (texture, bind_group));
    }

    /// Image files in `dir` with their asset names, sorted.
    pub fn image_paths(dir: &Path) -> Result<Vec<(String, PathBuf)>, TextureError> {
        let entries = std::fs::read_dir(dir).map_err(|source| TextureError::Dir {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter_map(|p| image_name(&p).map(|name| (name, p)))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_files_become_assets() {
        assert_eq!(image_name(Path::new("assets/images/iron.png")).as_deref(), Some("iron"));
        assert_eq!(image_name(Path::new("a/player.JPG")).as_deref(), Some("player"));
        assert_eq!(image_name(Path::new("a/notes.txt")), None);
        assert_eq!(image_name(Path::new("a/noext")), None);
    }
}
