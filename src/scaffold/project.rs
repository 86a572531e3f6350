//! Assembly of the full generated project file set.

use std::collections::HashMap;

use crate::config::{BuildConfig, ButtonRole, FrameMode};
use crate::workspace::ProjectFile;

use super::entry::entry_point_source;
use super::manifest::manifest_json;
use super::shell::{PRELOAD_SOURCE, shell_page};

/// Builds every project file for `config`.
///
/// `has_icon` reflects whether icon resolution produced `icon.ico` in the
/// workspace; it controls the manifest's icon reference and the entry
/// point's window icon. The icon file itself is written by the resolver,
/// not here.
#[must_use]
pub fn generate_project(config: &BuildConfig, has_icon: bool) -> Vec<ProjectFile> {
    let manifest =
        serde_json::to_vec_pretty(&manifest_json(config, has_icon)).unwrap_or_default();

    let mut files = vec![
        ProjectFile::new("main.js", entry_point_source(config, has_icon)),
        ProjectFile::new("package.json", manifest),
    ];

    if let FrameMode::Custom(titlebar) = &config.frame {
        files.push(ProjectFile::new("preload.js", PRELOAD_SOURCE));

        // Deterministic asset names per button role; empty uploads are
        // skipped so the shell falls back to the SVG icon for that role.
        let mut custom_buttons: HashMap<ButtonRole, String> = HashMap::new();
        for (role, asset) in &titlebar.assets {
            if asset.data.is_empty() {
                continue;
            }
            let file_name = format!("btn-{}.{}", role.as_str(), asset.format.extension());
            files.push(ProjectFile::new(file_name.clone(), asset.data.clone()));
            custom_buttons.insert(*role, file_name);
        }

        files.push(ProjectFile::new(
            "index.html",
            shell_page(config, titlebar, &custom_buttons),
        ));
    }

    files
}
