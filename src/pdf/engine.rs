use super::margin::PageOptions;
use anyhow::{anyhow, Context, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::Path;
use std::time::Duration;

/// Turns a self-contained HTML page into PDF bytes.
pub trait PrintEngine {
    fn print(&self, executable: &Path, html: &str, options: &PageOptions) -> Result<Vec<u8>>;
}

/// Prints through a headless Chrome/Chromium process.
#[derive(Debug, Clone, Default)]
pub struct ChromeEngine {
    pub sandbox: bool,
    pub timeout: Option<Duration>,
}

/// Start a headless browser. Dropping the returned [`Browser`] kills the
/// process, so it lives exactly as long as the caller's binding.
fn launch(executable: &Path, sandbox: bool) -> Result<Browser> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(sandbox)
        .path(Some(executable.to_path_buf()))
        .build()
        .map_err(|e| anyhow!("Failed to build browser launch options: {e}"))?;
    let browser = Browser::new(options)
        .with_context(|| format!("Failed to launch browser {}", executable.display()))?;
    log::debug!("launched browser {}", executable.display());
    Ok(browser)
}

/// Resolves once the document has loaded and its web fonts are ready.
const PAGE_READY: &str = "new Promise(resolve => document.readyState === 'complete' \
    ? resolve() : window.addEventListener('load', () => resolve(), { once: true })) \
    .then(() => document.fonts.ready).then(() => true)";

/// Replace the main frame's document with `html`.
///
/// The markup goes over the DevTools connection as-is; page size is not limited
/// by URL length.
fn document_content(frame_id: Page::FrameId, html: &str) -> Page::SetDocumentContent {
    Page::SetDocumentContent {
        frame_id,
        html: html.to_string(),
    }
}

fn load_page(tab: &Tab, html: &str) -> Result<()> {
    tab.navigate_to("about:blank")
        .with_context(|| "Failed to open a blank page")?
        .wait_until_navigated()
        .with_context(|| "Failed waiting for blank page")?;
    let frame_id = tab
        .call_method(Page::GetFrameTree(None))
        .with_context(|| "Failed to look up the page frame")?
        .frame_tree
        .frame
        .id;
    tab.call_method(document_content(frame_id, html))
        .with_context(|| "Failed to load page")?;
    tab.evaluate(PAGE_READY, true)
        .with_context(|| "Failed waiting for page and fonts to load")?;
    Ok(())
}

fn print_options(options: &PageOptions) -> Result<PrintToPdfOptions> {
    let margins = options
        .margin
        .as_ref()
        .map(|margin| margin.to_inches())
        .transpose()?
        .unwrap_or_default();

    Ok(PrintToPdfOptions {
        display_header_footer: Some(options.display_header_footer),
        print_background: Some(options.print_background),
        paper_width: Some(options.paper_width),
        paper_height: Some(options.paper_height),
        margin_top: margins.top,
        margin_bottom: margins.bottom,
        margin_left: margins.left,
        margin_right: margins.right,
        ..Default::default()
    })
}

impl PrintEngine for ChromeEngine {
    fn print(&self, executable: &Path, html: &str, options: &PageOptions) -> Result<Vec<u8>> {
        let pdf_options = print_options(options)?;
        let browser = launch(executable, self.sandbox)?;

        let tab = browser
            .new_tab()
            .with_context(|| "Failed to open browser tab")?;
        if let Some(timeout) = self.timeout {
            tab.set_default_timeout(timeout);
        }

        load_page(&tab, html)?;

        let bytes = tab
            .print_to_pdf(Some(pdf_options))
            .with_context(|| "Failed to print page to PDF")?;
        Ok(bytes)
    }
}
