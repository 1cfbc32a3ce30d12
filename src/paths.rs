//! Output path conventions.
//!
//! | Layout | `content/posts/hello/index.md` → |
//! |---|---|
//! | `ogp-png` | `content/posts/hello/ogp.png` |
//! | `sibling` | `content/posts/hello/index.png` |
//! | `directory` | `static/images/ogp/posts/hello/index.png` |
//!
//! The directory layout mirrors the article's position below
//! `output.content_root` under `output.dir`. Inputs and the content root are
//! resolved against the working directory first, so `content/a.md`,
//! `./content/a.md` and `$PWD/content/a.md` all land on the same file.
//! Articles outside the content root keep their path relative to the working
//! directory, and articles outside the working directory keep their full
//! path below `output.dir`. `..` never climbs out of `output.dir`.

use crate::config::{OutputConfig, OutputLayout};
use std::path::{Component, Path, PathBuf};

/// File name used by the `ogp-png` layout.
pub const OGP_FILE_NAME: &str = "ogp.png";

/// Destination of the PNG for the article at `input`.
///
/// `cwd` is the directory relative inputs are resolved against. Only the
/// directory layout uses it.
pub fn output_path(input: &Path, output: &OutputConfig, cwd: &Path) -> PathBuf {
    match output.layout {
        OutputLayout::OgpPng => input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(OGP_FILE_NAME),
        OutputLayout::Sibling => input.with_extension("png"),
        OutputLayout::Directory => {
            let input = resolve(input, cwd);
            let root = resolve(&output.content_root, cwd);
            let cwd = resolve(cwd, Path::new(""));
            let relative = input
                .strip_prefix(&root)
                .or_else(|_| input.strip_prefix(&cwd))
                .unwrap_or(input.as_path());
            output.dir.join(normal_components(relative)).with_extension("png")
        }
    }
}

/// Join `path` onto `cwd` when relative, then fold `.` and `..` lexically.
fn resolve(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Only the plain names of `path`; drops roots, prefixes, `.` and `..`.
fn normal_components(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CWD: &str = "/site";

    fn config(layout: OutputLayout) -> OutputConfig {
        OutputConfig {
            layout,
            ..OutputConfig::default()
        }
    }

    fn out(input: &str, layout: OutputLayout) -> PathBuf {
        output_path(Path::new(input), &config(layout), Path::new(CWD))
    }

    #[test]
    fn ogp_png_beside_article() {
        assert_eq!(
            out("content/posts/hello/index.md", OutputLayout::OgpPng),
            PathBuf::from("content/posts/hello/ogp.png")
        );
    }

    #[test]
    fn ogp_png_for_bare_file_name() {
        assert_eq!(out("article.md", OutputLayout::OgpPng), PathBuf::from("ogp.png"));
    }

    #[test]
    fn sibling_replaces_extension() {
        assert_eq!(out("article.md", OutputLayout::Sibling), PathBuf::from("article.png"));
    }

    #[test]
    fn sibling_keeps_directory() {
        assert_eq!(
            out("blog/2024/launch.markdown", OutputLayout::Sibling),
            PathBuf::from("blog/2024/launch.png")
        );
    }

    #[test]
    fn directory_strips_content_root() {
        assert_eq!(
            out("content/posts/hello.md", OutputLayout::Directory),
            PathBuf::from("static/images/ogp/posts/hello.png")
        );
    }

    #[test]
    fn directory_ignores_leading_cur_dir() {
        assert_eq!(
            out("./content/posts/hello.md", OutputLayout::Directory),
            PathBuf::from("static/images/ogp/posts/hello.png")
        );
    }

    #[test]
    fn directory_strips_content_root_from_absolute_input() {
        assert_eq!(
            out("/site/content/posts/hello.md", OutputLayout::Directory),
            PathBuf::from("static/images/ogp/posts/hello.png")
        );
    }

    #[test]
    fn directory_keeps_relative_path_outside_root() {
        assert_eq!(
            out("drafts/idea.md", OutputLayout::Directory),
            PathBuf::from("static/images/ogp/drafts/idea.png")
        );
    }

    #[test]
    fn directory_absolute_inputs_outside_cwd_stay_distinct() {
        let a = out("/x/a/index.md", OutputLayout::Directory);
        let b = out("/x/b/index.md", OutputLayout::Directory);
        assert_eq!(a, PathBuf::from("static/images/ogp/x/a/index.png"));
        assert_eq!(b, PathBuf::from("static/images/ogp/x/b/index.png"));
    }

    #[test]
    fn directory_parent_components_stay_inside_output_dir() {
        let escaped = out("../other/a.md", OutputLayout::Directory);
        assert_eq!(escaped, PathBuf::from("static/images/ogp/other/a.png"));
        assert!(!escaped.components().any(|c| c == Component::ParentDir));

        let folded = out("content/posts/../hello.md", OutputLayout::Directory);
        assert_eq!(folded, PathBuf::from("static/images/ogp/hello.png"));
    }

    #[test]
    fn directory_with_custom_roots() {
        let cfg = OutputConfig {
            layout: OutputLayout::Directory,
            dir: PathBuf::from("public/og"),
            content_root: PathBuf::from("src/articles"),
        };
        let out = output_path(Path::new("src/articles/rust/intro.md"), &cfg, Path::new(CWD));
        assert_eq!(out, PathBuf::from("public/og/rust/intro.png"));
    }
}
