//! Article front-matter extraction.
//!
//! An article opts into image generation and supplies its title through a
//! metadata block at the very top of the Markdown file:
//!
//! ```text
//! ---
//! title: "Hello, world"
//! autoGenOgpImg: true
//! ---
//!
//! # Body starts here
//! ```
//!
//! YAML blocks (`---` fences) are the common case. TOML blocks (`+++` fences,
//! as written by Hugo) are accepted too. Block detection is delegated to
//! `pulldown-cmark`'s metadata-block parsing so that a thematic break further
//! down the document is never mistaken for front-matter.
//!
//! Missing or mistyped keys are errors, never silent defaults. The one
//! exception is the opt-in flag: its *absence* is meaningful (the article has
//! not opted in) and is reported as `None`.

use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Flat key-value map parsed from a front-matter block.
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no front-matter block at the top of the document")]
    Missing,
    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("front-matter is not a key-value mapping")]
    NotAMapping,
    #[error("front-matter has no `{0}` key")]
    MissingKey(String),
    #[error("front-matter key `{key}` must be a {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The fields this tool reads from an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    /// Article title, exactly as written in the front-matter.
    pub title: String,
    /// Value of the opt-in flag, `None` when the key is absent.
    pub opt_in: Option<bool>,
}

/// Read an article and extract its title and opt-in flag.
///
/// `opt_in_key` names the boolean front-matter key (normally `autoGenOgpImg`).
pub fn read_article(path: &Path, opt_in_key: &str) -> Result<ArticleMeta, FrontmatterError> {
    let content = std::fs::read_to_string(path).map_err(|source| FrontmatterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = parse_metadata(&content)?;
    article_meta(&metadata, opt_in_key)
}

/// Pull `title` and the opt-in flag out of parsed metadata.
pub fn article_meta(metadata: &Metadata, opt_in_key: &str) -> Result<ArticleMeta, FrontmatterError> {
    let title = match metadata.get("title") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(FrontmatterError::WrongType {
                key: "title".into(),
                expected: "string",
                found: type_name(other),
            });
        }
        None => return Err(FrontmatterError::MissingKey("title".into())),
    };

    let opt_in = match metadata.get(opt_in_key) {
        Some(Value::Bool(b)) => Some(*b),
        // An explicit `key:` with no value reads as null; treat it like absent.
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(FrontmatterError::WrongType {
                key: opt_in_key.to_string(),
                expected: "boolean",
                found: type_name(other),
            });
        }
    };

    Ok(ArticleMeta { title, opt_in })
}

/// Parse the front-matter block of a Markdown document into a key-value map.
///
/// A leading UTF-8 byte order mark is ignored.
pub fn parse_metadata(content: &str) -> Result<Metadata, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (kind, raw) = extract_block(content).ok_or(FrontmatterError::Missing)?;
    let value: Value = match kind {
        MetadataBlockKind::YamlStyle => serde_yaml::from_str(&raw)?,
        MetadataBlockKind::PlusesStyle => toml::from_str(&raw)?,
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Return the raw text of the leading metadata block, if the document has one.
fn extract_block(content: &str) -> Option<(MetadataBlockKind, String)> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options.insert(Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS);

    let mut events = Parser::new_ext(content, options);
    let kind = match events.next()? {
        Event::Start(Tag::MetadataBlock(kind)) => kind,
        _ => return None,
    };

    let mut raw = String::new();
    for event in events {
        match event {
            Event::Text(text) => raw.push_str(&text),
            Event::End(TagEnd::MetadataBlock(_)) => return Some((kind, raw)),
            _ => {}
        }
    }
    None
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
