//! SVG template loading and title substitution.
//!
//! A template is an ordinary SVG document containing a literal placeholder
//! token (`{{.article_title}}` by default). Filling replaces every occurrence
//! of the token with the HTML-escaped title, so a title like
//! `<b>Bold</b> & "quotes"` can neither break the XML nor inject markup.
//!
//! The template is read once per run and never written back.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("template not found: {}: {message}", .path.display())]
    NotFound { path: PathBuf, message: String },
    #[error("template {} does not contain the placeholder `{placeholder}`", .path.display())]
    MissingPlaceholder { path: PathBuf, placeholder: String },
    #[error("cannot read template size: {0}")]
    InvalidSize(String),
}

/// An SVG template held in memory.
#[derive(Debug, Clone)]
pub struct Template {
    bytes: Vec<u8>,
    placeholder: String,
}

impl Template {
    /// Read a template from disk and check that it contains `placeholder`.
    pub fn load(path: &Path, placeholder: &str) -> Result<Self, TemplateError> {
        let bytes = std::fs::read(path).map_err(|e| TemplateError::NotFound {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let template = Self::from_bytes(bytes, placeholder);
        if !template.has_placeholder() {
            return Err(TemplateError::MissingPlaceholder {
                path: path.to_path_buf(),
                placeholder: placeholder.to_string(),
            });
        }
        Ok(template)
    }

    pub fn from_bytes(bytes: Vec<u8>, placeholder: &str) -> Self {
        Self {
            bytes,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn has_placeholder(&self) -> bool {
        let token = self.placeholder.as_bytes();
        !token.is_empty() && self.bytes.windows(token.len()).any(|w| w == token)
    }

    /// Substitute the escaped title for every placeholder occurrence.
    pub fn fill(&self, title: &str) -> Vec<u8> {
        replace_all(&self.bytes, self.placeholder.as_bytes(), escape_title(title).as_bytes())
    }

    /// Width and height declared on the template's root `<svg>` element.
    pub fn size(&self) -> Result<(u32, u32), TemplateError> {
        svg_size(&self.bytes)
    }
}

/// HTML-escape a title (`&`, `<`, `>`, `"`, `'`).
///
/// maud leaves `'` alone, which would end a single-quoted attribute.
pub fn escape_title(title: &str) -> String {
    maud::html! { (title) }.into_string().replace('\'', "&#39;")
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len() + replacement.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}

/// Read `width` and `height` from the root `<svg>` element.
///
/// Plain numbers and `px` values are accepted (fractions are rounded).
/// Percentages, other units and missing attributes are errors.
pub fn svg_size(svg: &[u8]) -> Result<(u32, u32), TemplateError> {
    let mut reader = Reader::from_reader(svg);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"svg" {
                    return Err(TemplateError::InvalidSize(
                        "root element is not <svg>".into(),
                    ));
                }
                let mut width = None;
                let mut height = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| TemplateError::InvalidSize(e.to_string()))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| TemplateError::InvalidSize(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"width" => width = Some(parse_length("width", &value)?),
                        b"height" => height = Some(parse_length("height", &value)?),
                        _ => {}
                    }
                }
                return match (width, height) {
                    (Some(w), Some(h)) => Ok((w, h)),
                    _ => Err(TemplateError::InvalidSize(
                        "<svg> needs both width and height attributes".into(),
                    )),
                };
            }
            Ok(Event::Eof) => {
                return Err(TemplateError::InvalidSize("no <svg> element found".into()));
            }
            Err(e) => return Err(TemplateError::InvalidSize(e.to_string())),
            // XML declaration, doctype, comments, whitespace
            Ok(_) => {}
        }
    }
}

fn parse_length(name: &str, raw: &str) -> Result<u32, TemplateError> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    match number.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 1.0 && v <= u32::MAX as f64 => Ok(v.round() as u32),
        _ => Err(TemplateError::InvalidSize(format!(
            "unsupported {name} value `{raw}`"
        ))),
    }
}
