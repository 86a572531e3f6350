//! Generated package manifest (package.json) for the scaffolded project.

use serde_json::{Value, json};

use crate::config::BuildConfig;
use crate::workspace::{OUTPUT_SUBDIR, artifact_extension};

use super::naming::{app_identifier, product_name, sanitize_package_name};

/// Packaging tool version pins written into the generated manifest.
const ELECTRON_VERSION: &str = "^29.0.0";
const BUILDER_VERSION: &str = "^24.0.0";

/// Platform-specific build-target section of the manifest.
fn platform_target(has_icon: bool) -> (&'static str, Value) {
    let icon = has_icon.then(|| json!("icon.ico"));
    if cfg!(windows) {
        let mut target = json!({ "target": "portable" });
        if let Some(icon) = icon {
            target["icon"] = icon;
        }
        ("win", target)
    } else if cfg!(target_os = "macos") {
        let mut target = json!({ "target": "dmg" });
        if let Some(icon) = icon {
            target["icon"] = icon;
        }
        ("mac", target)
    } else {
        let mut target = json!({ "target": "AppImage" });
        if let Some(icon) = icon {
            target["icon"] = icon;
        }
        ("linux", target)
    }
}

/// Builds the manifest for the generated project.
///
/// The artifact name pattern is `<ProductName>.<platform extension>` so
/// artifact extraction can match on the suffix alone.
#[must_use]
pub fn manifest_json(config: &BuildConfig, has_icon: bool) -> Value {
    let product = product_name(&config.name);
    let (platform_key, target) = platform_target(has_icon);

    let mut manifest = json!({
        "name": sanitize_package_name(&config.name),
        "version": "1.0.0",
        "description": format!("Packaged site: {}", config.url),
        "author": "sitewrap",
        "main": "main.js",
        "scripts": {
            "start": "electron .",
            "build": "electron-builder"
        },
        "build": {
            "appId": app_identifier(&config.name),
            "productName": product,
            "directories": { "output": OUTPUT_SUBDIR },
            "files": ["**/*"],
            "artifactName": format!("{product}.{}", artifact_extension())
        },
        "devDependencies": {
            "electron": ELECTRON_VERSION,
            "electron-builder": BUILDER_VERSION
        }
    });
    manifest["build"][platform_key] = target;
    manifest
}
