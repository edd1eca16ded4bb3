//! Reads the archive's per-month HTML directory index.

use std::{collections::HashSet, sync::OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use reqwest::Url;
use tracing::debug;

use crate::cache::{file_name::is_grid_file, FileName, Revision};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A daily file published by the archive.
pub struct RemoteFileDescriptor {
    pub date: NaiveDate,
    pub revision: Revision,
    pub href: String,
    pub url: Url,
}

impl RemoteFileDescriptor {
    /// Name the file takes in the month cache.
    pub fn file_name(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or(&self.href)
    }
}

/// Extracts every grid-file anchor from a directory index page, resolving
/// each `href` against the index URL. Repeated anchors are listed once.
pub fn parse_listing(html: &str, base: &Url) -> Vec<RemoteFileDescriptor> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for caps in href_pattern().captures_iter(html) {
        let href = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .map(|m| m.as_str())
            .unwrap_or_default();

        if !is_grid_file(href) || !seen.insert(href.to_string()) {
            continue;
        }

        let name = href.rsplit('/').next().unwrap_or(href);
        let Some(parsed) = FileName::parse(name) else {
            debug!(href, "skipping grid file with unrecognised name");
            continue;
        };
        let Ok(url) = base.join(href) else {
            debug!(href, "skipping unresolvable link");
            continue;
        };

        files.push(RemoteFileDescriptor {
            date: parsed.date,
            revision: parsed.revision,
            href: href.to_string(),
            url,
        });
    }

    files
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)href\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
            .expect("href pattern is valid")
    })
}

// -- Tests -------------------------------------------------------------------
