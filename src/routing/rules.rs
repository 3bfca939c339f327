//! Ordered route rule table.
//!
//! # Responsibilities
//! - Compile the fixed rule patterns once at startup
//! - Match a request path against the rules in priority order
//! - Extract raw captures (dimensions, colors, SKU fragments, paths)
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - First match wins; no match means origin passthrough
//! - Captures stay raw strings here; typing happens in the normalizer
//!   (except the product image index, whose digits-only capture cannot fail)
//! - Width/height runs longer than four digits are a non-match by
//!   construction of the anchored patterns, falling to a later rule

use regex::Regex;

use crate::config::schema::RouteOptions;

/// Which handler a matched rule dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Info,
    Resize,
    Pad,
    PadColor,
    RawDirective,
    Product,
}

/// One compiled rule: a path pattern and the handler it selects.
#[derive(Debug)]
struct RouteRule {
    pattern: Regex,
    kind: RouteKind,
}

/// Outcome of matching a request path, with captures already pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// `/info/<path>` — metadata request.
    Info { path: String },
    /// `/<W>x<H>/<path>` or `/<W>x<H>-max/<path>` — bounding-box resize.
    Resize {
        width: String,
        height: String,
        path: String,
    },
    /// `/<W>x<H>-pad[-<hex>]/<path>` — pad resize; `color` is `None` for
    /// the default-color form.
    Pad {
        width: String,
        height: String,
        color: Option<String>,
        path: String,
    },
    /// `/small_light(<directive>)/<path>` — raw backend directive.
    RawDirective { directive: String, path: String },
    /// `/product/<sku>_<index><ext>` — SKU rewrite. Captures are loose;
    /// the SKU resolver enforces charset and length.
    Product {
        code: String,
        index: u32,
        extension: String,
    },
    /// No rule matched: fetch the original from the origin.
    Passthrough { path: String },
}

/// Immutable, ordered rule table. Built once at startup and shared
/// read-only across all requests.
#[derive(Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Compile the rule table, including only the variant rules the
    /// deployment enables.
    pub fn new(options: &RouteOptions) -> Self {
        let mut specs: Vec<(&str, RouteKind)> = vec![
            (r"^/info/(.+)$", RouteKind::Info),
            (
                r"^/([0-9]{1,4})x([0-9]{1,4})(?:-max)?/(.+)$",
                RouteKind::Resize,
            ),
            (r"^/([0-9]{1,4})x([0-9]{1,4})-pad/(.+)$", RouteKind::Pad),
            (
                r"^/([0-9]{1,4})x([0-9]{1,4})-pad-([0-9a-fA-F]{3,8})/(.+)$",
                RouteKind::PadColor,
            ),
        ];
        if options.raw_directive {
            specs.push((r"^/small_light\(([^)]*)\)/(.+)$", RouteKind::RawDirective));
        }
        if options.product_rewrite {
            specs.push((
                r"^/product/([^/_]+)_([0-9]{1,9})(\.[A-Za-z0-9]+)$",
                RouteKind::Product,
            ));
        }

        let rules = specs
            .into_iter()
            .map(|(pattern, kind)| RouteRule {
                // Patterns are fixed literals; compilation cannot fail.
                pattern: Regex::new(pattern).expect("invalid built-in route pattern"),
                kind,
            })
            .collect();

        Self { rules }
    }

    /// Match a request path against the rules in order. Always produces a
    /// result; paths no rule claims are origin passthrough.
    pub fn match_path(&self, path: &str) -> RouteMatch {
        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(path) else {
                continue;
            };
            let group = |i: usize| caps[i].to_string();
            return match rule.kind {
                RouteKind::Info => RouteMatch::Info { path: group(1) },
                RouteKind::Resize => RouteMatch::Resize {
                    width: group(1),
                    height: group(2),
                    path: group(3),
                },
                RouteKind::Pad => RouteMatch::Pad {
                    width: group(1),
                    height: group(2),
                    color: None,
                    path: group(3),
                },
                RouteKind::PadColor => RouteMatch::Pad {
                    width: group(1),
                    height: group(2),
                    color: Some(group(3)),
                    path: group(4),
                },
                RouteKind::RawDirective => RouteMatch::RawDirective {
                    directive: group(1),
                    path: group(2),
                },
                RouteKind::Product => RouteMatch::Product {
                    code: group(1),
                    // Capture is 1-9 ASCII digits, always a valid u32.
                    index: caps[2].parse().expect("digits-only capture"),
                    extension: group(3),
                },
            };
        }

        RouteMatch::Passthrough {
            path: path.to_string(),
        }
    }

    /// Short label for the rule a match came from, used in logs and
    /// metric labels.
    pub fn label(matched: &RouteMatch) -> &'static str {
        match matched {
            RouteMatch::Info { .. } => "info",
            RouteMatch::Resize { .. } => "resize",
            RouteMatch::Pad { color: None, .. } => "pad",
            RouteMatch::Pad { color: Some(_), .. } => "pad_color",
            RouteMatch::RawDirective { .. } => "raw_directive",
            RouteMatch::Product { .. } => "product",
            RouteMatch::Passthrough { .. } => "passthrough",
        }
    }
}
