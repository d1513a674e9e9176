//! Built-in page templates using the Tera template engine
//!
//! Templates and assets are embedded in the binary, so the server and the
//! static build need nothing but the content directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use super::{Links, OverviewPage, TopicPage};
use crate::progress::STORAGE_KEY;

/// Stylesheet served at `assets/style.css`
pub const STYLE_CSS: &str = include_str!("assets/style.css");

/// Client-side progress script served at `assets/progress.js`
pub const PROGRESS_JS: &str = include_str!("assets/progress.js");

/// Values shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteMeta {
    pub title: String,
    pub subtitle: String,
    pub root: String,
    pub storage_key: &'static str,
    pub stylesheet: String,
    pub script: String,
    pub generated_at: String,
}

impl SiteMeta {
    pub fn new(title: &str, subtitle: &str, links: &Links) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            root: links.root().to_string(),
            storage_key: STORAGE_KEY,
            stylesheet: links.asset("style.css"),
            script: links.asset("progress.js"),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Template renderer with the embedded pages loaded
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Paths and pre-rendered markdown go out verbatim; text is escaped
        // in the templates with the `escape` filter
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("templates/layout.html")),
            ("overview.html", include_str!("templates/overview.html")),
            ("topic.html", include_str!("templates/topic.html")),
            ("not_found.html", include_str!("templates/not_found.html")),
        ])?;

        tera.register_filter("tag_class", tag_class_filter);

        Ok(Self { tera })
    }

    /// Render the overview checklist
    pub fn overview(&self, site: &SiteMeta, page: &OverviewPage) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("page", page);
        self.render("overview.html", &context)
    }

    /// Render a topic page
    pub fn topic(&self, site: &SiteMeta, page: &TopicPage) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("page", page);
        self.render("topic.html", &context)
    }

    /// Render the not-found page for a request path
    pub fn not_found(&self, site: &SiteMeta, requested: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("requested", requested);
        self.render("not_found.html", &context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: turn a tag into a CSS-safe class suffix
fn tag_class_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("tag_class", "value", String, value);
    Ok(tera::Value::String(format!("tag-{}", slug::slugify(s))))
}
