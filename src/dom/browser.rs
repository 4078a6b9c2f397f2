//! Browser process plumbing for the live backend.
//!
//! * Finding a usable Chromium-family executable (Brave → Chrome → Chromium,
//!   cross-platform).
//! * Launching a headful browser for a supervised sweep.
//! * Resolving the devtools websocket endpoint of an already-running browser
//!   from its debugging port, then attaching over CDP.
//!
//! The sweep itself never navigates: it operates on whatever document the
//! user already has open. Launching is a convenience that opens the target
//! list and hands control back to the user until they are ready to start.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan — finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Ok(p) = std::env::var("CHROME_EXECUTABLE") {
        if Path::new(&p).exists() {
            return Some(p);
        }
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "brave-browser",
            "brave",
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/brave-browser",
            "/usr/bin/brave",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

fn spawn_handler_task(
    mut handler: chromiumoxide::handler::Handler,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                error!("CDP handler error: {}", e);
            }
        }
    })
}

/// A live browser connection and its CDP event-pump task.
pub struct BrowserSession {
    pub browser: Browser,
    pub handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Tear down the connection. Closes the browser only when we launched it.
    pub async fn shutdown(mut self, launched: bool) {
        if launched {
            self.browser.close().await.ok();
            self.browser.wait().await.ok();
        }
        self.handler_task.abort();
    }
}

/// Attach to an already-running browser through its devtools websocket URL.
pub async fn attach_ws(ws_url: &str) -> Result<BrowserSession> {
    info!("attaching to CDP endpoint: {}", ws_url);
    let (browser, handler) = Browser::connect(ws_url.to_string())
        .await
        .map_err(|e| anyhow!("Browser connect failed: {}", e))?;
    Ok(BrowserSession {
        browser,
        handler_task: spawn_handler_task(handler),
    })
}

/// Attach to an already-running browser by debugging port.
///
/// Discovers the websocket endpoint via the `/json/version` JSON API and
/// retries briefly, since a freshly started browser may not have the port
/// open yet.
pub async fn attach_port(debugging_port: u16) -> Result<BrowserSession> {
    let json_url = format!("http://127.0.0.1:{}/json/version", debugging_port);
    let mut last_error = None;

    for attempt in 1..=5 {
        let ws_url_result: Result<String> = async {
            let response = reqwest::get(&json_url)
                .await
                .map_err(|e| anyhow!("HTTP request failed: {}", e))?;
            let json: serde_json::Value = response
                .json()
                .await
                .map_err(|e| anyhow!("JSON parse failed: {}", e))?;
            json["webSocketDebuggerUrl"]
                .as_str()
                .ok_or_else(|| anyhow!("No webSocketDebuggerUrl in response"))
                .map(|s| s.to_string())
        }
        .await;

        match ws_url_result {
            Ok(ws_url) => match attach_ws(&ws_url).await {
                Ok(session) => return Ok(session),
                Err(e) => last_error = Some(e),
            },
            Err(e) => last_error = Some(e),
        }

        if attempt < 5 {
            info!("CDP connection attempt {} failed, retrying...", attempt);
            tokio::time::sleep(Duration::from_millis(2000)).await;
        }
    }

    Err(anyhow!(
        "Failed to connect to browser on port {} after 5 attempts. Last error: {:?}",
        debugging_port,
        last_error
    ))
}

/// Launch a headful browser and open `url` in a fresh tab.
///
/// Headful on purpose: the user has to be logged in and looking at their own
/// following list, and they keep the ability to intervene at any moment.
pub async fn launch_headful(url: &str) -> Result<(BrowserSession, Page)> {
    let exe = find_chrome_executable()
        .ok_or_else(|| anyhow!("No browser found. Install Brave, Chrome, or Chromium."))?;

    info!("launching browser: {}", exe);
    let config = BrowserConfig::builder()
        .chrome_executable(&exe)
        .with_head()
        .window_size(1280, 900)
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .build()
        .map_err(|e| anyhow!("browser config: {}", e))?;

    let (browser, handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe, e))?;
    let handler_task = spawn_handler_task(handler);

    let session = BrowserSession {
        browser,
        handler_task,
    };
    let page = session
        .browser
        .new_page(url)
        .await
        .map_err(|e| anyhow!("Failed to open page: {}", e))?;

    Ok((session, page))
}

/// Pick the page the sweep should drive.
///
/// With a filter, the first page whose URL contains the substring wins.
/// Without one, the first http(s) page wins.
pub async fn select_page(browser: &Browser, url_filter: Option<&str>) -> Result<Page> {
    let pages = browser
        .pages()
        .await
        .map_err(|e| anyhow!("Failed to list pages: {}", e))?;

    for page in pages {
        let Ok(Some(url)) = page.url().await else {
            continue;
        };
        let keep = match url_filter {
            Some(f) => url.contains(f),
            None => url.starts_with("http://") || url.starts_with("https://"),
        };
        if keep {
            info!("driving page: {}", url);
            return Ok(page);
        }
    }

    Err(anyhow!(
        "No matching page found{}",
        url_filter
            .map(|f| format!(" (filter: {})", f))
            .unwrap_or_default()
    ))
}
