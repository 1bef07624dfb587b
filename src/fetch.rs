//! Page acquisition: plain HTTP, headless-browser rendering, or a
//! local HTML file for offline runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use ureq::ResponseExt;

use crate::error::{GarimpoError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Headless render budget, matching the page-load timeout the render
/// script enforces internally.
const RENDER_TIMEOUT_MS: u64 = 30_000;

static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
        .build()
        .into()
});

/// Playwright driver script. Scrolls the page in steps so lazy-loaded
/// gallery images enter the DOM before the HTML is captured.
const RENDER_SCRIPT: &str = r#"
const { chromium } = require("playwright");

const url = process.argv[2];
const timeout = parseInt(process.argv[3] || "30000", 10);

(async () => {
  const browser = await chromium.launch({ headless: true });
  try {
    const page = await browser.newPage();
    await page.goto(url, { waitUntil: "domcontentloaded", timeout });
    await page.waitForLoadState("networkidle", { timeout: 5000 }).catch(() => {});
    await page.evaluate(async () => {
      await new Promise((resolve) => {
        let total = 0;
        const step = 300;
        const timer = setInterval(() => {
          window.scrollBy(0, step);
          total += step;
          if (total >= document.body.scrollHeight) {
            clearInterval(timer);
            resolve();
          }
        }, 100);
      });
    });
    const html = await page.content();
    process.stdout.write(JSON.stringify({ url: page.url(), html }));
  } finally {
    await browser.close();
  }
})().catch((err) => {
  process.stderr.write(String(err));
  process.exit(1);
});
"#;

/// Where a product page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    Url(String),
    LocalFile(PathBuf),
}

impl PageSource {
    pub fn is_offline(&self) -> bool {
        matches!(self, PageSource::LocalFile(_))
    }
}

/// Fetch engine for online sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    #[default]
    Http,
    Browser,
}

/// A fetched page: final URL (after redirects) and its HTML.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: String,
    pub html: String,
}

#[derive(Deserialize)]
struct RenderOutput {
    url: String,
    html: String,
}

/// Acquire page HTML from the given source.
///
/// With [`Engine::Browser`] a render failure falls back to plain HTTP
/// so a missing Node/Playwright install degrades instead of aborting;
/// the page may then lack lazy-loaded content.
pub fn acquire(source: &PageSource, engine: Engine, verbose: bool) -> Result<PageContent> {
    match source {
        PageSource::LocalFile(path) => read_local(path),
        PageSource::Url(url) => match engine {
            Engine::Http => fetch_http(url),
            Engine::Browser => match fetch_browser(url) {
                Ok(page) => Ok(page),
                Err(err) => {
                    crate::output::warn(&format!(
                        "Browser render failed ({err}), falling back to plain HTTP"
                    ));
                    crate::output::verbose("Lazy-loaded gallery content may be missing", verbose);
                    fetch_http(url)
                }
            },
        },
    }
}

pub fn fetch_http(url: &str) -> Result<PageContent> {
    let response = HTTP_AGENT
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept-Language", "pt-BR,pt;q=0.9,en;q=0.8")
        .call()?;
    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;
    Ok(PageContent {
        url: final_url,
        html,
    })
}

pub fn fetch_browser(url: &str) -> Result<PageContent> {
    let script_path = std::env::temp_dir().join("garimpo_render.cjs");
    fs::write(&script_path, RENDER_SCRIPT)?;

    let output = Command::new("node")
        .arg(&script_path)
        .arg(url)
        .arg(RENDER_TIMEOUT_MS.to_string())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GarimpoError::RenderError("node executable not found".to_string())
            } else {
                GarimpoError::IoError(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GarimpoError::RenderError(stderr.trim().to_string()));
    }

    let rendered: RenderOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| GarimpoError::RenderError(format!("bad render output: {e}")))?;
    Ok(PageContent {
        url: rendered.url,
        html: rendered.html,
    })
}

fn read_local(path: &Path) -> Result<PageContent> {
    if !path.exists() {
        return Err(GarimpoError::InputInvalid(format!(
            "local HTML file not found: {}",
            path.display()
        )));
    }
    let html = fs::read_to_string(path)?;
    Ok(PageContent {
        url: format!("file://{}", path.display()),
        html,
    })
}

/// Download a binary resource, returning its bytes and content type.
pub fn download_bytes(url: &str) -> Result<(Vec<u8>, Option<String>)> {
    let response = HTTP_AGENT
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()?;
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().read_to_vec()?;
    Ok((bytes, content_type))
}
