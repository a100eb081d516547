use std::path::Path;

use anyhow::{Context, Error, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};

/// Reads an image file into a `data:` URL, the form the dashboard stores.
pub fn image_data_url(path: &Path) -> Result<String, Error> {
    let mime = image_mime(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn image_mime(path: &Path) -> Result<&'static str, Error> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    Ok(match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => bail!("Unsupported image type: {}", path.display()),
    })
}

pub fn package_id(now: DateTime<Utc>) -> String {
    format!("PKG-{}", now.timestamp_millis())
}

/// Package ids for a run of submissions. A second id in the same millisecond
/// gets a `-<n>` suffix so no two ids of one run collide.
#[derive(Debug, Default)]
pub struct PackageIds {
    last_millis: Option<i64>,
    repeats: u32,
}

impl PackageIds {
    pub fn issue(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();

        if self.last_millis == Some(millis) {
            self.repeats += 1;
            return format!("{}-{}", package_id(now), self.repeats);
        }

        self.last_millis = Some(millis);
        self.repeats = 0;
        package_id(now)
    }
}
