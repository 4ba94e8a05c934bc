//! Hosting edits for the application's index page.
//!
//! [`IndexTransform`] applies a fixed, ordered list of textual edits. Every
//! edit first checks whether its result is already present, so applying the
//! transform to its own output changes nothing.
//!
//! The edits work on the raw text rather than a parsed DOM: the page carries
//! an ASP.NET directive and server controls that are not valid HTML.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{MarkupConfig, PathRewrite};

/// First `<title>` element on a single line; the first closing tag wins.
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>.*?</title>").expect("title pattern is valid"));

/// Base tag emitted by the Angular CLI, which breaks routing under SharePoint.
const ROOT_BASE_TAG: &str = r#"<base href="/">"#;

const LINK_TAG: &str = "<link ";
const SCRIPT_TAG: &str = "<script";

const STYLE_CLOSE: &str = "</style>";
const BODY_OPEN: &str = "<body>";

/// Outcome of a single edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Short edit identifier (`directive`, `title`, ...)
    pub edit: &'static str,
    /// Whether the content was changed
    pub applied: bool,
    pub message: String,
}

impl EditOutcome {
    fn applied(edit: &'static str, message: impl Into<String>) -> Self {
        Self {
            edit,
            applied: true,
            message: message.into(),
        }
    }

    fn unchanged(edit: &'static str, message: impl Into<String>) -> Self {
        Self {
            edit,
            applied: false,
            message: message.into(),
        }
    }
}

/// The transformed page and what each edit did.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub content: String,
    pub edits: Vec<EditOutcome>,
}

/// The ordered edit sequence, prepared from a [`MarkupConfig`].
pub struct IndexTransform {
    directive: String,
    directive_prefix: String,
    title_block: String,
    style_block: String,
    style_marker: String,
    body_markup: String,
    body_marker: String,
    asset_base_url: String,
    rewrites: Vec<PathRewrite>,
}

impl IndexTransform {
    pub fn new(config: &MarkupConfig) -> Self {
        let mut asset_base_url = config.asset_base_url.clone();
        if !asset_base_url.ends_with('/') {
            asset_base_url.push('/');
        }

        Self {
            directive: config.directive.clone(),
            directive_prefix: config.directive_prefix.clone(),
            title_block: title_block(&config.title, &config.base_href),
            style_block: config.style_block.clone(),
            style_marker: config.style_marker.clone(),
            body_markup: config.body_markup.clone(),
            body_marker: config.body_marker.clone(),
            asset_base_url,
            rewrites: config.rewrites.clone(),
        }
    }

    /// Apply every edit in order.
    pub fn apply(&self, content: &str) -> Transformed {
        let mut content = content.to_string();
        let edits = vec![
            self.insert_directive(&mut content),
            self.replace_title(&mut content),
            break_before(&mut content, LINK_TAG, "links", "<link>"),
            break_before(&mut content, SCRIPT_TAG, "scripts", "<script>"),
            self.inject_styles(&mut content),
            self.inject_body_markup(&mut content),
            self.rewrite_paths(&mut content),
        ];

        Transformed { content, edits }
    }

    fn insert_directive(&self, content: &mut String) -> EditOutcome {
        if content.starts_with(&self.directive_prefix) {
            return EditOutcome::unchanged("directive", "Page directive already exists");
        }

        content.insert(0, '\n');
        content.insert_str(0, &self.directive);
        EditOutcome::applied("directive", "Inserted page directive as first line")
    }

    fn replace_title(&self, content: &mut String) -> EditOutcome {
        if content.contains(&self.title_block) {
            return EditOutcome::unchanged("title", "Title and base href already set");
        }

        let removed = content.matches(ROOT_BASE_TAG).count();
        if removed > 0 {
            *content = content.replace(ROOT_BASE_TAG, "");
        }

        let Some(range) = TITLE_RE.find(content).map(|m| m.range()) else {
            return EditOutcome::unchanged("title", "No <title> tag found");
        };
        content.replace_range(range, &self.title_block);

        EditOutcome::applied(
            "title",
            format!(
                "Removed {removed} base href=\"/\" tag(s) and replaced <title> with new title and base href"
            ),
        )
    }

    fn inject_styles(&self, content: &mut String) -> EditOutcome {
        let Some(last_close) = content.rfind(STYLE_CLOSE) else {
            return EditOutcome::unchanged("styles", "No </style> tag found to insert styles after");
        };
        if content.contains(&self.style_marker) {
            return EditOutcome::unchanged("styles", "Override styles already exist");
        }

        let insert_at = last_close + STYLE_CLOSE.len();
        content.insert_str(insert_at, &format!("\n{}", self.style_block));
        EditOutcome::applied("styles", "Inserted override styles after last </style> tag")
    }

    fn inject_body_markup(&self, content: &mut String) -> EditOutcome {
        if content.contains(&self.body_marker) {
            return EditOutcome::unchanged("body", "Body control already exists");
        }
        let Some(body) = content.find(BODY_OPEN) else {
            return EditOutcome::unchanged("body", "No <body> tag found");
        };

        let insert_at = body + BODY_OPEN.len();
        content.insert_str(insert_at, &format!("\n{}", self.body_markup));
        EditOutcome::applied("body", "Inserted control markup after <body>")
    }

    fn rewrite_paths(&self, content: &mut String) -> EditOutcome {
        let mut total = 0;
        let mut per_prefix = Vec::with_capacity(self.rewrites.len());

        for rewrite in &self.rewrites {
            let relative = format!("{}=\"{}", rewrite.attribute, rewrite.prefix);
            let count = content.matches(relative.as_str()).count();
            if count > 0 {
                let absolute = format!(
                    "{}=\"{}{}",
                    rewrite.attribute, self.asset_base_url, rewrite.prefix
                );
                *content = content.replace(&relative, &absolute);
            }
            total += count;
            per_prefix.push(format!("{}: {count}", rewrite.prefix));
        }

        if total == 0 {
            return EditOutcome::unchanged("paths", "No relative paths found to replace");
        }
        EditOutcome::applied(
            "paths",
            format!(
                "Replaced {total} relative path(s) with absolute URLs ({})",
                per_prefix.join(", ")
            ),
        )
    }
}

/// The `<title>` and `<base>` lines that replace the original title.
pub fn title_block(title: &str, base_href: &str) -> String {
    format!("  <title>{title}</title>\n  <base href=\"{base_href}\">")
}

/// Whether `fragment` has a `<link ` or `<script` tag that does not start a
/// line.
///
/// Inserted fragments are placed at the start of a line but after the
/// line-break edits have run, so such a tag would only be split off on the
/// next run.
pub fn has_inline_tag(fragment: &str) -> bool {
    [LINK_TAG, SCRIPT_TAG].iter().any(|tag| {
        fragment
            .match_indices(tag)
            .any(|(idx, _)| idx > 0 && !fragment[..idx].ends_with('\n'))
    })
}

/// Put every `needle` on its own line.
///
/// A newline is only inserted where the occurrence does not already start a
/// line, so repeated runs leave the text alone.
fn break_before(
    content: &mut String,
    needle: &str,
    edit: &'static str,
    label: &str,
) -> EditOutcome {
    let mut out = String::with_capacity(content.len() + 64);
    let mut total = 0;
    let mut inserted = 0;
    let mut last = 0;

    for (idx, _) in content.match_indices(needle) {
        total += 1;
        out.push_str(&content[last..idx]);
        if idx > 0 && !content[..idx].ends_with('\n') {
            out.push('\n');
            inserted += 1;
        }
        last = idx;
    }
    out.push_str(&content[last..]);

    if total == 0 {
        return EditOutcome::unchanged(edit, format!("No {label} tags found"));
    }
    if inserted == 0 {
        return EditOutcome::unchanged(
            edit,
            format!("All {total} {label} tag(s) already on separate lines"),
        );
    }

    *content = out;
    EditOutcome::applied(
        edit,
        format!("Formatted {inserted} of {total} {label} tag(s) to appear on separate lines"),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn transform() -> IndexTransform {
        IndexTransform::new(&MarkupConfig::default())
    }

    fn outcome<'a>(result: &'a Transformed, edit: &str) -> &'a EditOutcome {
        result.edits.iter().find(|e| e.edit == edit).unwrap()
    }

    const ANGULAR_INDEX: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>ErmSharepoint</title>
  <base href="/">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>html{color:#000}</style><link rel="stylesheet" href="styles-5INURTSO.css"></head>
<body>
  <app-root></app-root>
<link rel="modulepreload" href="chunk-4FZ.js"><script src="polyfills-FFHMD2TL.js" type="module"></script><script src="main-TWT.js" type="module"></script></body>
</html>
"#;

    #[test]
    fn test_simple_page() {
        let result = transform().apply("<html><head><title>Old</title></head></html>");

        assert_eq!(
            result.content,
            "<%@ Page Language=\"C#\" Inherits=\"Microsoft.SharePoint.WebControls.LayoutsPageBase\" %>\n\
             <html><head>  <title>GRC Portal</title>\n  <base href=\"/grc/SitePages/app.aspx/\"></head></html>"
        );
        assert!(outcome(&result, "directive").applied);
        assert!(outcome(&result, "title").applied);
        assert!(!outcome(&result, "styles").applied);
        assert!(!outcome(&result, "body").applied);

        let again = transform().apply(&result.content);
        assert_eq!(again.content, result.content);
    }

    #[test]
    fn test_angular_index_is_idempotent() {
        let first = transform().apply(ANGULAR_INDEX);
        assert!(first.edits.iter().all(|e| e.applied));

        let second = transform().apply(&first.content);
        assert_eq!(second.content, first.content);
        assert!(second.edits.iter().all(|e| !e.applied));

        let third = transform().apply(&second.content);
        assert_eq!(third.content, first.content);
    }

    #[test]
    fn test_angular_index_content() {
        let result = transform().apply(ANGULAR_INDEX);
        let content = &result.content;

        assert!(content.starts_with("<%@ Page Language=\"C#\""));
        assert!(!content.contains("<base href=\"/\">"));
        assert_eq!(content.matches("<base href=").count(), 1);
        assert!(content.contains(
            "  <title>GRC Portal</title>\n  <base href=\"/grc/SitePages/app.aspx/\">"
        ));
        assert!(content.contains("</style>\n  <style>\n"));
        assert!(content.contains("<body>\n<SharePoint:FormDigest runat=\"server\" />\n  <app-root>"));
        assert!(content.contains(
            "\n<link rel=\"stylesheet\" href=\"https://collab.napma.nato.int/grc/SiteAssets/app/styles-5INURTSO.css\">"
        ));
        assert!(content.contains(
            "\n<script src=\"https://collab.napma.nato.int/grc/SiteAssets/app/main-TWT.js\""
        ));
        // Not one of the rewritten prefixes
        assert!(content.contains("src=\"polyfills-FFHMD2TL.js\""));

        assert_eq!(
            outcome(&result, "paths").message,
            "Replaced 3 relative path(s) with absolute URLs (styles: 1, chunk: 1, main: 1)"
        );
    }

    #[test]
    fn test_existing_directive_is_kept() {
        let page = "<%@ Page Language=\"VB\" %>\n<html></html>";
        let result = transform().apply(page);

        assert!(!outcome(&result, "directive").applied);
        assert!(result.content.starts_with("<%@ Page Language=\"VB\" %>\n<html>"));
    }

    #[test]
    fn test_title_without_closing_tag_on_same_line() {
        let page = "<title>\nSplit\n</title>";
        let result = transform().apply(page);

        assert!(!outcome(&result, "title").applied);
        assert!(result.content.ends_with("<title>\nSplit\n</title>"));
    }

    #[test]
    fn test_only_first_title_is_replaced() {
        let page = "<title>A</title><title>B</title>";
        let result = transform().apply(page);

        assert!(result.content.contains("<title>GRC Portal</title>"));
        assert!(result.content.contains("<title>B</title>"));
    }

    #[test]
    fn test_root_base_tag_removed_even_without_title() {
        let result = transform().apply("<head><base href=\"/\"></head>");

        assert!(!outcome(&result, "title").applied);
        assert!(result.content.ends_with("<head></head>"));
    }

    #[test]
    fn test_break_before_skips_tags_already_on_own_line() {
        let mut content = "<head>\n<link a><link b>".to_string();
        let outcome = break_before(&mut content, "<link ", "links", "<link>");

        assert_eq!(content, "<head>\n<link a>\n<link b>");
        assert_eq!(
            outcome.message,
            "Formatted 1 of 2 <link> tag(s) to appear on separate lines"
        );

        let again = break_before(&mut content, "<link ", "links", "<link>");
        assert!(!again.applied);
        assert_eq!(content, "<head>\n<link a>\n<link b>");
    }

    #[test]
    fn test_break_before_leaves_start_of_text_alone() {
        let mut content = "<script></script>".to_string();
        let outcome = break_before(&mut content, "<script", "scripts", "<script>");

        assert!(!outcome.applied);
        assert_eq!(content, "<script></script>");
    }

    #[test]
    fn test_link_needle_requires_trailing_space() {
        let mut content = "<p><linkage></p>".to_string();
        let outcome = break_before(&mut content, "<link ", "links", "<link>");

        assert_eq!(outcome.message, "No <link> tags found");
        assert_eq!(content, "<p><linkage></p>");
    }

    #[test]
    fn test_styles_inserted_after_last_style_close() {
        let page = "<style>a{}</style><style>b{}</style><p>";
        let result = transform().apply(page);

        let block_at = result.content.find("/* CRITICAL").unwrap();
        let last_original = result.content.find("b{}</style>").unwrap();
        assert!(block_at > last_original);
        assert!(result.content.contains("b{}</style>\n  <style>"));
    }

    #[test]
    fn test_body_with_attributes_is_not_matched() {
        let result = transform().apply("<body class=\"app\"></body>");

        assert_eq!(outcome(&result, "body").message, "No <body> tag found");
    }

    #[test]
    fn test_inline_tag_detection() {
        assert!(!has_inline_tag("<script>init()</script>"));
        assert!(!has_inline_tag("<div></div>\n<link rel=\"icon\" href=\"x.ico\">"));
        assert!(has_inline_tag("<div><script>init()</script></div>"));
        assert!(has_inline_tag("  <style></style><link href=\"styles-x.css\">"));
        assert!(has_inline_tag(&title_block("<script>x</script>", "/")));
        assert!(!has_inline_tag(&title_block("GRC Portal", "/grc/")));
    }

    #[test]
    fn test_injected_tags_on_own_lines_stay_stable() {
        let config = MarkupConfig {
            style_block: format!(
                "{}\n<link href=\"styles-extra.css\">",
                MarkupConfig::default().style_block
            ),
            body_markup: "<div id=\"x\"></div>\n<script>init()</script>\n<SharePoint:FormDigest runat=\"server\" />"
                .to_string(),
            ..MarkupConfig::default()
        };
        assert!(!has_inline_tag(&config.style_block));
        assert!(!has_inline_tag(&config.body_markup));

        let transform = IndexTransform::new(&config);
        let first = transform.apply(ANGULAR_INDEX);
        let second = transform.apply(&first.content);

        assert_eq!(second.content, first.content);
        assert!(first.content.contains("<script>init()</script>"));
    }

    #[test]
    fn test_asset_base_url_gets_trailing_slash() {
        let config = MarkupConfig {
            asset_base_url: "https://cdn.example.com/app".to_string(),
            ..MarkupConfig::default()
        };
        let result = IndexTransform::new(&config).apply("<script src=\"main.js\"></script>");

        assert!(result.content.contains("src=\"https://cdn.example.com/app/main.js\""));
    }
}
