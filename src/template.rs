//! Compiled HTML page templates.
//!
//! A template is plain HTML with `{{ .Title }}` and `{{ .Body }}` placeholders. Both are
//! substituted HTML-escaped (including quotes), so nothing a page body contains can become live
//! markup. Templates are compiled once, up front; a malformed template is reported when it is
//! compiled rather than on first use.

use crate::{error::WikiError, page::Page};
use include_dir::{include_dir, Dir};
use std::{collections::BTreeMap, fs, path::Path};

static BUILTIN_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

pub const EDIT_TEMPLATE: &str = "edit";
pub const VIEW_TEMPLATE: &str = "view";
pub const INDEX_TEMPLATE: &str = "index";

/// Every template the wiki renders. Each is looked up as `<name>.html`.
pub const TEMPLATE_NAMES: [&str; 3] = [EDIT_TEMPLATE, VIEW_TEMPLATE, INDEX_TEMPLATE];

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Title,
    Body,
}

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(name: &str, source: &str) -> Result<Template, WikiError> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or_else(|| {
                WikiError::Render(format!(
                    "template '{name}': unclosed '{OPEN}' at byte {}",
                    source.len() - rest.len() + start
                ))
            })?;
            let field = after_open[..end].trim();
            segments.push(match field {
                ".Title" => Segment::Title,
                ".Body" => Segment::Body,
                other => {
                    return Err(WikiError::Render(format!(
                        "template '{name}': unknown field '{other}'"
                    )))
                }
            });
            rest = &after_open[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Template {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render_into(&self, page: &Page, output: &mut String) {
        for segment in self.segments.iter() {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Title => {
                    html_escape::encode_safe_to_string(page.title.as_str(), output);
                }
                Segment::Body => {
                    html_escape::encode_safe_to_string(page.body_text(), output);
                }
            }
        }
    }
}

/// The set of compiled templates, keyed by name.
#[derive(Debug, Clone)]
pub struct Templates {
    templates: BTreeMap<String, Template>,
}

impl Templates {
    /// Templates embedded in the binary at build time.
    pub fn builtin() -> Result<Templates, WikiError> {
        let mut templates = BTreeMap::new();
        for name in TEMPLATE_NAMES {
            let file_name = format!("{name}.html");
            let source = BUILTIN_TEMPLATES
                .get_file(&file_name)
                .and_then(|file| file.contents_utf8())
                .ok_or_else(|| {
                    WikiError::Render(format!("missing builtin template '{file_name}'"))
                })?;
            templates.insert(name.to_string(), Template::compile(name, source)?);
        }
        Ok(Templates { templates })
    }

    /// Templates read from `dir`. Any `<name>.html` the directory lacks falls back to the
    /// builtin version.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Templates, WikiError> {
        let dir = dir.as_ref();
        let mut templates = Templates::builtin()?;
        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{name}.html"));
            if !path.is_file() {
                tracing::debug!("No {:?} override, using builtin '{}' template", path, name);
                continue;
            }
            tracing::debug!("Loading template '{}' from {:?}", name, path);
            let source = fs::read_to_string(&path)?;
            templates
                .templates
                .insert(name.to_string(), Template::compile(name, &source)?);
        }
        Ok(templates)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn render(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let template = self
            .get(name)
            .ok_or_else(|| WikiError::Render(format!("no template named '{name}'")))?;
        let mut output = String::new();
        template.render_into(page, &mut output);
        Ok(output)
    }
}
