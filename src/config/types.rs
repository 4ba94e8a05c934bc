//! Configuration type definitions.
//!
//! This module contains all the data structures used in distprep configuration
//! files. These types are pure data - no I/O or complex logic.
//!
//! Every section has defaults matching the GRC portal deployment, so a minimal
//! config only needs `source` and `target`:
//!
//! ```yaml
//! source: ../erm-sharepoint/dist/erm-sharepoint/browser
//! target: ../erm-sharepoint-dist
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Absolute URL of the asset library on the SharePoint site.
const DEFAULT_ASSET_BASE_URL: &str = "https://collab.napma.nato.int/grc/SiteAssets/app/";

// =============================================================================
// Top-level configuration
// =============================================================================

/// The full configuration of a distprep project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Build output directory files are copied from
    pub source: PathBuf,
    /// Distribution directory that is cleaned, filled and rewritten
    pub target: PathBuf,
    #[serde(default)]
    pub clean: CleanConfig,
    #[serde(default)]
    pub copy: CopyConfig,
    #[serde(default)]
    pub replace: ReplaceConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub duplicate: DuplicateConfig,
    /// Where to pull the published distribution from (`distprep pull`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("dist/app/browser"),
            target: PathBuf::from("deploy"),
            clean: CleanConfig::default(),
            copy: CopyConfig::default(),
            replace: ReplaceConfig::default(),
            markup: MarkupConfig::default(),
            duplicate: DuplicateConfig::default(),
            pull: None,
        }
    }
}

// =============================================================================
// Stage sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Top-level names in the target that are never deleted
    #[serde(default = "default_preserve")]
    pub preserve: Vec<String>,
}

fn default_preserve() -> Vec<String> {
    vec![
        ".git".to_string(),
        "images".to_string(),
        "_fileProcessor.js".to_string(),
    ]
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            preserve: default_preserve(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// File extensions copied from the source, with or without the leading dot
    #[serde(default = "default_copy_extensions")]
    pub extensions: Vec<String>,
}

fn default_copy_extensions() -> Vec<String> {
    vec![".js".to_string(), ".html".to_string(), ".css".to_string()]
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            extensions: default_copy_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Case-insensitive substring a file name must contain to be rewritten
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// Literal text to search for (case-sensitive)
    #[serde(default = "default_search")]
    pub search: String,
    /// Literal text every match is replaced with
    #[serde(default = "default_replacement")]
    pub replacement: String,
}

fn default_file_pattern() -> String {
    "main".to_string()
}

fn default_search() -> String {
    "url(/images/banner.jpeg".to_string()
}

fn default_replacement() -> String {
    format!("url({DEFAULT_ASSET_BASE_URL}images/banner.jpeg")
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            file_pattern: default_file_pattern(),
            search: default_search(),
            replacement: default_replacement(),
        }
    }
}

/// Settings for the edits applied to the index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Name of the HTML file in the target that gets transformed
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// One-line page directive prepended to the document
    #[serde(default = "default_directive")]
    pub directive: String,
    /// Prefix that identifies an already present directive
    #[serde(default = "default_directive_prefix")]
    pub directive_prefix: String,
    /// Replacement `<title>` text
    #[serde(default = "default_title")]
    pub title: String,
    /// Value of the `<base href>` inserted below the title
    #[serde(default = "default_base_href")]
    pub base_href: String,
    /// Style element inserted after the last `</style>`
    #[serde(default = "default_style_block")]
    pub style_block: String,
    /// Text inside `style_block` that marks it as already inserted
    #[serde(default = "default_style_marker")]
    pub style_marker: String,
    /// Control markup inserted right after `<body>`
    #[serde(default = "default_body_markup")]
    pub body_markup: String,
    /// Text inside `body_markup` that marks it as already inserted
    #[serde(default = "default_body_marker")]
    pub body_marker: String,
    /// Absolute URL relative asset references are rewritten against
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,
    /// Attribute prefixes that get qualified with `asset_base_url`
    #[serde(default = "default_rewrites")]
    pub rewrites: Vec<PathRewrite>,
}

/// A relative asset reference such as `href="styles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewrite {
    pub attribute: String,
    pub prefix: String,
}

impl PathRewrite {
    pub fn new(attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            prefix: prefix.into(),
        }
    }
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_directive() -> String {
    r#"<%@ Page Language="C#" Inherits="Microsoft.SharePoint.WebControls.LayoutsPageBase" %>"#
        .to_string()
}

fn default_directive_prefix() -> String {
    "<%@ Page".to_string()
}

fn default_title() -> String {
    "GRC Portal".to_string()
}

fn default_base_href() -> String {
    "/grc/SitePages/app.aspx/".to_string()
}

fn default_style_block() -> String {
    r#"  <style>

    html, body { height:100%; }

    /* CRITICAL: Full page bleed - hide SharePoint chrome */
    #s4-workspace { margin: 0 !important; }
    #s4-ribbonrow,
    #suiteBar,
    #titleAreaBox,
    .ms-breadcrumb-box,
    #sideNavBox,
    #contentBox,
    body #s4-titlerow,
    .ms-cui-topBar2,
    #sideNavBox {
      display: none !important;
    }

    body { overflow: auto !important; }
  </style>"#
        .to_string()
}

fn default_style_marker() -> String {
    "/* CRITICAL: Full page bleed - hide SharePoint chrome */".to_string()
}

fn default_body_markup() -> String {
    r#"<SharePoint:FormDigest runat="server" />"#.to_string()
}

fn default_body_marker() -> String {
    "<SharePoint:FormDigest".to_string()
}

fn default_asset_base_url() -> String {
    DEFAULT_ASSET_BASE_URL.to_string()
}

fn default_rewrites() -> Vec<PathRewrite> {
    vec![
        PathRewrite::new("href", "styles"),
        PathRewrite::new("href", "chunk"),
        PathRewrite::new("src", "main"),
    ]
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            directive: default_directive(),
            directive_prefix: default_directive_prefix(),
            title: default_title(),
            base_href: default_base_href(),
            style_block: default_style_block(),
            style_marker: default_style_marker(),
            body_markup: default_body_markup(),
            body_marker: default_body_marker(),
            asset_base_url: default_asset_base_url(),
            rewrites: default_rewrites(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// Sibling file the transformed index file is copied to
    #[serde(default = "default_duplicate_name")]
    pub file_name: String,
}

fn default_duplicate_name() -> String {
    "app.aspx".to_string()
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            file_name: default_duplicate_name(),
        }
    }
}

// =============================================================================
// Pull configuration
// =============================================================================

/// The published distribution repository and what to take from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullConfig {
    /// Git URL (or local path) of the distribution repository
    pub repository: String,
    /// Branch, tag, or commit (defaults to the default branch)
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Directory the files are pulled into; wiped before every pull
    pub output: PathBuf,
    #[serde(default = "default_pull_extensions")]
    pub extensions: Vec<String>,
    /// File names never pulled
    #[serde(default = "default_pull_exclude")]
    pub exclude: Vec<String>,
    /// Seconds to wait before each fetch attempt; one attempt per entry
    #[serde(default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,
}

fn default_pull_extensions() -> Vec<String> {
    vec![".js".to_string(), ".css".to_string(), ".aspx".to_string()]
}

fn default_pull_exclude() -> Vec<String> {
    vec!["_fileProcessor.js".to_string()]
}

fn default_retry_delays() -> Vec<u64> {
    vec![0, 10, 30]
}
