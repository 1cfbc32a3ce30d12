//! Shared test utilities.
//!
//! [`TestSite`] is a throwaway directory holding a 1200×630 template and any
//! articles a test writes into it:
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! let article = site.article("posts/hello.md", "title: Hello\nautoGenOgpImg: true");
//! let config = site.config();  // template points into the site
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::Config;

/// Template used by [`TestSite`].
pub const TEMPLATE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630" viewBox="0 0 1200 630">
  <rect width="1200" height="630" fill="#1d2330"/>
  <text x="80" y="330" font-size="64" fill="#ffffff">{{.article_title}}</text>
</svg>
"##;

pub struct TestSite {
    tmp: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let site = Self {
            tmp: TempDir::new().unwrap(),
        };
        site.write("ogp_img_template.svg", TEMPLATE_SVG);
        site
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Write `content` to `rel` inside the site, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a Markdown article with the given YAML front-matter lines.
    pub fn article(&self, rel: &str, front_matter: &str) -> PathBuf {
        self.write(rel, &format!("---\n{front_matter}\n---\n\nArticle body.\n"))
    }

    /// Default config with the template pointing at this site's template.
    pub fn config(&self) -> Config {
        Config {
            template: self.path().join("ogp_img_template.svg"),
            ..Config::default()
        }
    }
}

/// Assert that `path` is a PNG of the given size.
pub fn assert_png_size(path: &Path, width: u32, height: u32) {
    let dims = image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("{} is not a readable image: {e}", path.display()));
    assert_eq!(dims, (width, height), "unexpected size for {}", path.display());
}
