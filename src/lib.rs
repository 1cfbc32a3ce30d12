//! # ogp-img
//!
//! Generates Open Graph preview images for Markdown articles. Each article's
//! front-matter title is substituted into an SVG template, the SVG is rendered
//! in headless Chrome, and the capture is saved as a PNG next to the article
//! (or under a dedicated output directory).
//!
//! # Architecture: One Article at a Time
//!
//! ```text
//! article.md ─▶ frontmatter ─▶ gate ─▶ template ─▶ render ─▶ writer ─▶ ogp.png
//!               title, flag    opt-in   escape+fill  Chrome    .part+rename
//! ```
//!
//! Articles run through the pipeline sequentially. A failing article is
//! reported and skipped; it never aborts the batch and never leaves a partial
//! PNG behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Front-matter block extraction (YAML `---` / TOML `+++`), `title` and opt-in flag |
//! | [`template`] | SVG template loading, HTML escaping, placeholder substitution, root size |
//! | [`render`] | [`RenderBackend`](render::RenderBackend) trait and the headless Chrome backend |
//! | [`paths`] | Output path conventions (`ogp.png`, sibling `.png`, output directory) |
//! | [`writer`] | Atomic PNG write |
//! | [`pipeline`] | Batch driver: input expansion, per-article outcomes, lazy browser start |
//! | [`config`] | `ogp-img.toml` loading, merging, validation, stock config |
//! | [`output`] | CLI report formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## A Real Browser for Rasterization
//!
//! Templates are authored for browsers: web fonts, CSS inside `<style>`,
//! `foreignObject` text wrapping. Rendering them in Chrome gives the same
//! pixels the author saw while designing the card. The browser is only started
//! once an article actually needs rendering.
//!
//! ## Explicit Opt-In Gate
//!
//! Articles only get an image when their front-matter says
//! `autoGenOgpImg: true`. The gate is a config option (`[gate]`) and can be
//! turned off with `--no-gate`; it is never inferred.
//!
//! ## Escape, Then Substitute
//!
//! The title is HTML-escaped before it replaces the placeholder, so titles
//! containing `<`, `&` or quotes produce valid SVG with the literal text.

pub mod config;
pub mod frontmatter;
pub mod logging;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod template;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
