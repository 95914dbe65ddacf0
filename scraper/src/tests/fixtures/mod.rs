use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScrapeError};
use crate::http::PageSource;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/tests/fixtures")
}

/// Load test HTML fixture by name
pub fn load_html_fixture(fixture_name: &str) -> String {
    let path = fixtures_dir().join(format!("{}.html", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}

/// Load a real failure case for regression testing
pub fn load_failure_html(failure_name: &str) -> Option<String> {
    let path = fixtures_dir()
        .join("failures")
        .join(format!("{}.html", failure_name));
    fs::read_to_string(path).ok()
}

pub fn failures_dir() -> PathBuf {
    fixtures_dir().join("failures")
}

/// Serves canned pages by URL and records what was asked for.
#[derive(Default)]
pub struct FixtureSource {
    pages: HashMap<String, String>,
    pub requested: Vec<String>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, fixture_name: &str) -> Self {
        self.pages
            .insert(url.to_string(), load_html_fixture(fixture_name));
        self
    }

    pub fn html(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

impl PageSource for FixtureSource {
    fn fetch(&mut self, url: &str) -> Result<String> {
        self.requested.push(url.to_string());
        self.pages.get(url).cloned().ok_or(ScrapeError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
