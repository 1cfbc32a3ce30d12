//! Headless Chrome rendering backend.
//!
//! One browser process is started per run; every render gets its own tab:
//!
//! ```text
//! new tab → about:blank → Page.setDocumentContent(svg)
//!         → wait for load + fonts + two animation frames
//!         → Page.captureScreenshot(png, clip, scale 1, from surface)
//!         → close tab
//! ```
//!
//! The tab is held by a `TabGuard` so it is closed on every exit path,
//! including errors half-way through. The browser process exits when the
//! [`ChromeBackend`] is dropped.

use super::backend::{Clip, RenderBackend, RenderError};
use crate::config::BrowserConfig;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves once the document has loaded, web fonts are ready and two frames
/// have been painted.
const WAIT_STABLE_JS: &str = r#"new Promise((resolve) => {
    const settle = () => requestAnimationFrame(() => requestAnimationFrame(() => resolve(true)));
    const fonts = document.fonts ? document.fonts.ready : Promise.resolve();
    if (document.readyState === "complete") {
        fonts.then(settle);
    } else {
        window.addEventListener("load", () => fonts.then(settle), { once: true });
    }
})"#;

/// Rendering backend driving a headless Chrome/Chromium.
pub struct ChromeBackend {
    browser: Browser,
    timeout: Duration,
}

impl ChromeBackend {
    /// Start a headless browser whose window fits `clip`.
    pub fn launch(config: &BrowserConfig, clip: Clip) -> Result<Self, RenderError> {
        let (width, height) = clip.viewport();
        let timeout = Duration::from_secs(config.timeout_secs);
        debug!(width, height, sandbox = config.sandbox, "launching headless browser");

        let browser = Browser::new(LaunchOptions {
            headless: true,
            sandbox: config.sandbox,
            window_size: Some((width, height)),
            path: config.chrome_path.clone(),
            // The browser idles between files while the next article is parsed.
            idle_browser_timeout: timeout.max(Duration::from_secs(60)),
            ..Default::default()
        })
        .map_err(|e| RenderError::Launch(e.to_string()))?;

        Ok(Self { browser, timeout })
    }

    fn open_tab(&self) -> Result<TabGuard, RenderError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| RenderError::Page(e.to_string()))?;
        tab.set_default_timeout(self.timeout);
        Ok(TabGuard(tab))
    }
}

impl RenderBackend for ChromeBackend {
    fn render(&self, svg: &[u8], clip: Clip) -> Result<Vec<u8>, RenderError> {
        let guard = self.open_tab()?;
        let tab = guard.tab();

        load_document(tab, svg)?;

        tab.evaluate(WAIT_STABLE_JS, true)
            .map_err(|e| RenderError::Unstable(e.to_string()))?;

        let png = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(Page::Viewport {
                    x: clip.x,
                    y: clip.y,
                    width: clip.width as f64,
                    height: clip.height as f64,
                    scale: 1.0,
                }),
                true,
            )
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        debug!(bytes = png.len(), "captured screenshot");
        Ok(png)
    }
}

/// Replace the blank page's document with the SVG markup.
fn load_document(tab: &Tab, svg: &[u8]) -> Result<(), RenderError> {
    let html = String::from_utf8_lossy(svg).into_owned();

    tab.navigate_to("about:blank")
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| RenderError::Page(e.to_string()))?;

    let frame_id = tab
        .call_method(Page::GetFrameTree(None))
        .map_err(|e| RenderError::Page(e.to_string()))?
        .frame_tree
        .frame
        .id;

    tab.call_method(Page::SetDocumentContent { frame_id, html })
        .map_err(|e| RenderError::Page(e.to_string()))?;
    Ok(())
}

/// Closes its tab when dropped.
struct TabGuard(Arc<Tab>);

impl TabGuard {
    fn tab(&self) -> &Tab {
        &self.0
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(false) {
            warn!(error = %e, "failed to close browser tab");
        }
    }
}
