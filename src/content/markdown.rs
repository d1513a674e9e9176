//! Markdown rendering with syntax highlighting
//!
//! Rendering is a pure transformation from markdown text to HTML. The visual
//! treatment of each node kind (headings, code blocks, tables, blockquotes,
//! links, checklist items) is looked up in a [`RenderRules`] table, so a
//! caller can swap classes without touching the event pipeline.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Node kinds that get explicit visual treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Heading(u8),
    CodeBlock,
    Table,
    Blockquote,
    Link,
    TaskItem,
}

/// Mapping from node kind to CSS class, plus link behaviour
#[derive(Debug, Clone)]
pub struct RenderRules {
    classes: HashMap<NodeKind, String>,
    /// Open `http(s)://` and `//` links in a new browsing context
    pub external_links_new_tab: bool,
}

impl RenderRules {
    /// Class for a node kind, if any
    pub fn class(&self, kind: NodeKind) -> Option<&str> {
        self.classes.get(&kind).map(String::as_str)
    }

    /// Override the class used for a node kind
    pub fn with_class(mut self, kind: NodeKind, class: &str) -> Self {
        self.classes.insert(kind, class.to_string());
        self
    }

    fn class_attr(&self, kind: NodeKind) -> String {
        match self.class(kind) {
            Some(class) => format!(r#" class="{}""#, class),
            None => String::new(),
        }
    }
}

impl Default for RenderRules {
    fn default() -> Self {
        let mut classes = HashMap::new();
        for level in 1..=6u8 {
            classes.insert(NodeKind::Heading(level), format!("md-h{}", level));
        }
        classes.insert(NodeKind::CodeBlock, "md-code".to_string());
        classes.insert(NodeKind::Table, "md-table".to_string());
        classes.insert(NodeKind::Blockquote, "md-quote".to_string());
        classes.insert(NodeKind::Link, "md-link".to_string());
        classes.insert(NodeKind::TaskItem, "md-task".to_string());

        Self {
            classes,
            external_links_new_tab: true,
        }
    }
}

/// A heading collected while rendering, used for the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Output of a render pass
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub headings: Vec<HeadingEntry>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
    rules: RenderRules,
}

struct HeadingBuf<'a> {
    level: u8,
    id: Option<String>,
    text: String,
    events: Vec<Event<'a>>,
}

struct CodeBuf {
    lang: Option<String>,
    source: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom highlight settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
            rules: RenderRules::default(),
        }
    }

    /// Replace the rendering rules
    pub fn with_rules(mut self, rules: RenderRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &RenderRules {
        &self.rules
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Rendered {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut out: Vec<Event> = Vec::new();
        let mut headings: Vec<HeadingEntry> = Vec::new();
        let mut anchors: HashMap<String, usize> = HashMap::new();
        let mut heading: Option<HeadingBuf> = None;
        let mut code: Option<CodeBuf> = None;

        for event in parser {
            // Code blocks swallow their text until the closing tag
            if let Some(block) = code.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let highlighted = self.highlight_code(&block.source, block.lang.as_deref());
                        code = None;
                        emit(&mut out, &mut heading, Event::Html(highlighted.into()));
                    }
                    Event::Text(text) => block.source.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            (!lang.is_empty()).then_some(lang)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code = Some(CodeBuf {
                        lang,
                        source: String::new(),
                    });
                }
                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some(HeadingBuf {
                        level: level as u8,
                        id: id.map(|i| i.to_string()),
                        text: String::new(),
                        events: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(h) = heading.take() {
                        let anchor = match h.id {
                            // Reserve explicit ids so a later slug cannot repeat them
                            Some(id) => {
                                *anchors.entry(id.clone()).or_insert(0) += 1;
                                id
                            }
                            None => unique_anchor(&mut anchors, &h.text),
                        };
                        out.push(Event::Html(CowStr::from(format!(
                            r#"<h{} id="{}"{}>"#,
                            h.level,
                            html_escape(&anchor),
                            self.rules.class_attr(NodeKind::Heading(h.level))
                        ))));
                        out.extend(h.events);
                        out.push(Event::Html(CowStr::from(format!("</h{}>\n", h.level))));
                        headings.push(HeadingEntry {
                            level: h.level,
                            text: h.text.trim().to_string(),
                            anchor,
                        });
                    }
                }
                Event::Start(Tag::Table(alignments)) => {
                    let open = format!("<div{}>\n", self.rules.class_attr(NodeKind::Table));
                    emit(&mut out, &mut heading, Event::Html(open.into()));
                    emit(&mut out, &mut heading, Event::Start(Tag::Table(alignments)));
                }
                Event::End(TagEnd::Table) => {
                    emit(&mut out, &mut heading, Event::End(TagEnd::Table));
                    emit(&mut out, &mut heading, Event::Html("</div>\n".into()));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    ..
                }) => {
                    let open = self.link_open(link_type, &dest_url, &title);
                    emit(&mut out, &mut heading, Event::Html(open.into()));
                }
                Event::End(TagEnd::Link) => {
                    emit(&mut out, &mut heading, Event::Html("</a>".into()));
                }
                Event::TaskListMarker(checked) => {
                    let checkbox = format!(
                        r#"<input type="checkbox"{} disabled{}> "#,
                        self.rules.class_attr(NodeKind::TaskItem),
                        if checked { " checked" } else { "" }
                    );
                    emit(&mut out, &mut heading, Event::Html(checkbox.into()));
                }
                Event::Text(text) => {
                    if let Some(h) = heading.as_mut() {
                        h.text.push_str(&text);
                    }
                    emit(&mut out, &mut heading, Event::Text(text));
                }
                Event::Code(text) => {
                    if let Some(h) = heading.as_mut() {
                        h.text.push_str(&text);
                    }
                    emit(&mut out, &mut heading, Event::Code(text));
                }
                other => emit(&mut out, &mut heading, other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, out.into_iter());

        if let Some(class) = self.rules.class(NodeKind::Blockquote) {
            html_output =
                html_output.replace("<blockquote>", &format!(r#"<blockquote class="{}">"#, class));
        }

        Rendered {
            html: html_output,
            headings,
        }
    }

    /// Opening anchor tag for a link
    fn link_open(&self, link_type: LinkType, dest: &str, title: &str) -> String {
        // Email autolinks arrive without their scheme
        let href = match link_type {
            LinkType::Email => format!("mailto:{}", dest),
            _ => dest.to_string(),
        };
        let mut tag = format!(
            r#"<a href="{}"{}"#,
            html_escape(&href),
            self.rules.class_attr(NodeKind::Link)
        );
        if !title.is_empty() {
            tag.push_str(&format!(r#" title="{}""#, html_escape(title)));
        }
        if self.rules.external_links_new_tab && is_external(dest) {
            tag.push_str(r#" target="_blank" rel="noopener noreferrer""#);
        }
        tag.push('>');
        tag
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = self.rules.class(NodeKind::CodeBlock).unwrap_or("");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted =
            theme.and_then(|t| highlighted_html_for_string(code, &self.syntax_set, syntax, t).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                self.add_line_numbers(code, &highlighted, lang, class)
            }
            Some(highlighted) => format!(
                r#"<div class="{} language-{}">{}</div>"#,
                class, lang, highlighted
            ),
            None => format!(
                r#"<pre class="{}"><code class="language-{}">{}</code></pre>"#,
                class,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Put a line-number gutter beside highlighted code
    fn add_line_numbers(&self, code: &str, highlighted: &str, lang: &str, class: &str) -> String {
        let gutter = (1..=code.lines().count().max(1))
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="{} highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            class, lang, gutter, highlighted
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Route an event into the open heading buffer, or straight to the output
fn emit<'a>(out: &mut Vec<Event<'a>>, heading: &mut Option<HeadingBuf<'a>>, event: Event<'a>) {
    match heading {
        Some(h) => h.events.push(event),
        None => out.push(event),
    }
}

/// Slug for a heading, suffixed when the same text appears twice
fn unique_anchor(seen: &mut HashMap<String, usize>, text: &str) -> String {
    let mut base = slug::slugify(text);
    if base.is_empty() {
        base = "section".to_string();
    }
    let count = seen.entry(base.clone()).or_insert(0);
    let anchor = if *count == 0 {
        base
    } else {
        format!("{}-{}", base, count)
    };
    *count += 1;
    anchor
}

/// Links that leave the site
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
