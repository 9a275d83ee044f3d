//! Templates for [`TemplateHandler`](crate::handlers::TemplateHandler).
//!
//! A template is plain text with `{{ route.<field> }}` placeholders filled
//! from the Route's serialized form. Values are HTML-escaped unless the
//! placeholder ends in `|safe`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

use crate::kinds::page;
use crate::routing::Route;

const PAGE_TEMPLATE: &str = "<!DOCTYPE html>
<html>
<head><title>{{ route.url }}</title></head>
<body>
{{ route.content|safe }}
</body>
</html>
";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template {0:?} does not exist")]
    Missing(String),

    #[error("Failed to read templates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named template sources.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, String>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates the built-in Route types rely on.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.insert(page::TEMPLATE_NAME, PAGE_TEMPLATE);
        set
    }

    pub fn shared_builtin() -> &'static TemplateSet {
        static BUILTIN: OnceLock<TemplateSet> = OnceLock::new();
        BUILTIN.get_or_init(TemplateSet::builtin)
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Add every `*.html` file in `dir`, named by file name. Existing
    /// templates with the same name are replaced.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, TemplateError> {
        let io_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut loaded = 0;
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            self.insert(name, source);
            loaded += 1;
        }
        tracing::debug!(directory = %dir.display(), loaded, "Templates loaded");
        Ok(loaded)
    }

    /// Render `name` with `route` as context.
    pub fn render(&self, name: &str, route: &Route) -> Result<String, TemplateError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::Missing(name.to_string()))?;
        let context = route_context(route);
        let rendered = placeholder().replace_all(source, |caps: &Captures<'_>| {
            let value = context.get(&caps[1]).map(display_value).unwrap_or_default();
            if caps.get(2).is_some() {
                value
            } else {
                escape_html(&value)
            }
        });
        Ok(rendered.into_owned())
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*route\.([A-Za-z_][A-Za-z0-9_]*)\s*(\|\s*safe\s*)?\}\}")
            .expect("placeholder pattern is valid")
    })
}

fn route_context(route: &Route) -> HashMap<String, Value> {
    let mut context: HashMap<String, Value> = match serde_json::to_value(route) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => HashMap::new(),
    };
    context.insert("level".into(), Value::from(route.level()));
    context
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
