// ABOUTME: Asset handling for the slidedeck compiler
// ABOUTME: Tracks theme and user supplied CSS/JavaScript to embed in or link from the output

use crate::errors::{DeckError, Result};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;
use url::Url;

const THEME_CSS: &str = include_str!("../templates/slides.css");
const THEME_JS: &str = include_str!("../templates/slides.js");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Css,
    Js,
}

/// A stylesheet or script included in the rendered deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub kind: AssetKind,
    /// Path as given by the user, empty for built-in assets
    pub path: String,
    /// `file://` URL of the asset, used when linking instead of embedding
    pub url: Option<String>,
    pub contents: String,
}

impl Asset {
    /// Read an asset from disk.
    pub fn load(path: &Path, kind: AssetKind) -> Result<Self> {
        info!("Reading user asset: {:?}", path);
        if !path.exists() {
            return Err(DeckError::PathNotFoundError(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(DeckError::FileReadError)?;
        let url = fs::canonicalize(path)
            .ok()
            .and_then(|abs| Url::from_file_path(abs).ok())
            .map(String::from);

        Ok(Self {
            kind,
            path: path.to_string_lossy().into_owned(),
            url,
            contents,
        })
    }

    fn builtin(kind: AssetKind, contents: &str) -> Self {
        Self {
            kind,
            path: String::new(),
            url: None,
            contents: contents.to_string(),
        }
    }

    /// Generate the HTML tag for the asset, either embedding or linking the content.
    ///
    /// Built-in assets have nothing to link to and are always embedded.
    /// `relative` links to the path exactly as the user gave it.
    pub fn tag(&self, embed: bool, relative: bool) -> String {
        let href = if relative {
            Some(self.path.as_str()).filter(|p| !p.is_empty())
        } else {
            self.url.as_deref()
        };

        match (self.kind, href) {
            (AssetKind::Css, Some(href)) if !embed => {
                format!(r#"<link rel="stylesheet" href="{}">"#, href)
            }
            (AssetKind::Js, Some(href)) if !embed => format!(r#"<script src="{}"></script>"#, href),
            (AssetKind::Css, _) => format!("<style>{}</style>", self.contents),
            (AssetKind::Js, _) => format!("<script>{}</script>", self.contents),
        }
    }
}

/// Theme and user assets of one deck
#[derive(Debug, Clone)]
pub struct Assets {
    pub theme_css: Vec<Asset>,
    pub theme_js: Vec<Asset>,
    pub user_css: Vec<Asset>,
    pub user_js: Vec<Asset>,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            theme_css: vec![Asset::builtin(AssetKind::Css, THEME_CSS)],
            theme_js: vec![Asset::builtin(AssetKind::Js, THEME_JS)],
            user_css: Vec::new(),
            user_js: Vec::new(),
        }
    }
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_css(&mut self, path: &Path) -> Result<()> {
        self.user_css.push(Asset::load(path, AssetKind::Css)?);
        Ok(())
    }

    pub fn add_user_js(&mut self, path: &Path) -> Result<()> {
        self.user_js.push(Asset::load(path, AssetKind::Js)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_user_assets() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("test.css");
        fs::write(&css, "* {color: red;}").unwrap();

        let mut assets = Assets::new();
        assets.add_user_css(&css).unwrap();
        assert_eq!(assets.user_css[0].contents, "* {color: red;}");
        assert_eq!(assets.user_css[0].path, css.to_string_lossy());
        assert_eq!(
            assets.user_css[0].tag(true, false),
            "<style>* {color: red;}</style>"
        );
        assert!(assets.user_css[0]
            .tag(false, false)
            .starts_with("<link rel=\"stylesheet\" href=\"file://"));
    }

    #[test]
    fn test_missing_asset_is_an_io_error() {
        let mut assets = Assets::new();
        let err = assets.add_user_js(Path::new("/no/such/file.js")).unwrap_err();
        assert!(err.is_io());
        assert!(assets.user_js.is_empty());
    }

    #[test]
    fn test_builtin_assets_are_always_embedded() {
        let assets = Assets::new();
        assert!(assets.theme_css[0].tag(false, false).starts_with("<style>"));
        assert!(assets.theme_js[0].tag(false, true).starts_with("<script>"));
    }

    #[test]
    fn test_relative_link_uses_given_path() {
        let dir = TempDir::new().unwrap();
        let js = dir.path().join("app.js");
        fs::write(&js, "init();").unwrap();

        let asset = Asset::load(&js, AssetKind::Js).unwrap();
        assert_eq!(
            asset.tag(false, true),
            format!("<script src=\"{}\"></script>", js.to_string_lossy())
        );
    }
}
