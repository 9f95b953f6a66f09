//! Chromium driver over the Chrome DevTools Protocol.
//!
//! The public surface is blocking: the driver owns a private tokio runtime
//! and blocks on it for every call. Elements live in a per-document
//! registry (`window.__pagecheck`) whose token is the navigation generation
//! it was created in; a handle whose token no longer matches is stale.

use crate::config::HarnessConfig;
use crate::driver::{Driver, ElementHandle, Screenshot};
use crate::locator::By;
use crate::result::{PagecheckError, PagecheckResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Launch settings for [`ChromiumDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromiumOptions {
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Chromium executable (auto-detected when unset)
    pub chromium_path: Option<PathBuf>,
    /// Page-load timeout
    pub navigation_timeout: Duration,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self::from(&HarnessConfig::default())
    }
}

impl From<&HarnessConfig> for ChromiumOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chromium_path: config.chromium_path.clone(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        }
    }
}

const LOCATE_JS: &str = r"(() => {
  let r = window.__pagecheck;
  if (!r) r = window.__pagecheck = { token: __NEXT__, nodes: [] };
  let root = document;
  const scope = __SCOPE__;
  if (scope !== null) {
    if (r.token !== scope.generation) return { stale: true };
    root = r.nodes[scope.node];
    if (!root || !root.isConnected) return { stale: true };
  }
  const kind = __KIND__, query = __QUERY__;
  let found = [];
  if (kind === 'css') {
    found = Array.from(root.querySelectorAll(query));
  } else {
    const snap = document.evaluate(query, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    for (let i = 0; i < snap.snapshotLength; i++) found.push(snap.snapshotItem(i));
  }
  const ids = found.map((el) => { r.nodes.push(el); return r.nodes.length - 1; });
  return { stale: false, token: r.token, ids };
})()";

const ELEMENT_JS: &str = r"(() => {
  const r = window.__pagecheck;
  if (!r || r.token !== __GENERATION__) return { stale: true };
  const el = r.nodes[__NODE__];
  if (!el || !el.isConnected) return { stale: true };
  const visible = (e) => !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length)
    && getComputedStyle(e).visibility !== 'hidden';
  const arg = __ARG__;
  const fire = (name) => el.dispatchEvent(new Event(name, { bubbles: true }));
  try {
    return { value: (() => { __BODY__ })() };
  } catch (err) {
    return { error: String((err && err.message) || err) };
  }
})()";

const TEXT_JS: &str = r"return (el.tagName === 'OPTION' || visible(el))
  ? (el.innerText || el.textContent || '').replace(/\s+/g, ' ').trim() : '';";
const ATTRIBUTE_JS: &str = "return el.getAttribute(arg);";
const PROPERTY_JS: &str =
    "const v = el[arg]; return (v === undefined || v === null) ? null : String(v);";
const DISPLAYED_JS: &str = "return visible(el);";
const SELECTED_JS: &str = "return !!(el.checked || el.selected);";
const CLICK_JS: &str = r"if (!visible(el)) throw new Error('element is not displayed');
  el.scrollIntoView({ block: 'center' }); el.click(); return null;";
const SEND_KEYS_JS: &str = r"if (!('value' in el) || el.tagName === 'SELECT') throw new Error('element does not accept text');
  if (!visible(el)) throw new Error('element is not displayed');
  el.focus(); el.value = el.value + arg; fire('input'); fire('change'); return null;";
const CLEAR_JS: &str = r"if (!('value' in el) || el.tagName === 'SELECT') throw new Error('element does not accept text');
  el.value = ''; fire('input'); fire('change'); return null;";
const SELECT_JS: &str = r"if (el.tagName !== 'SELECT') throw new Error('element is not a <select>');
  const opt = Array.from(el.options).find((o) => o.text.trim() === arg);
  if (!opt) throw new Error('no option with text ' + JSON.stringify(arg));
  el.value = opt.value; opt.selected = true; fire('input'); fire('change'); return null;";
const TOKEN_JS: &str = "window.__pagecheck ? window.__pagecheck.token : null";

#[derive(Debug, Deserialize)]
struct LocateReply {
    #[serde(default)]
    stale: bool,
    #[serde(default)]
    token: u64,
    #[serde(default)]
    ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct ElementReply {
    #[serde(default)]
    stale: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

fn js<T: serde::Serialize + ?Sized>(value: &T) -> PagecheckResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Real Chromium driven over CDP
pub struct ChromiumDriver {
    options: ChromiumOptions,
    runtime: Option<Runtime>,
    browser: Option<CdpBrowser>,
    page: Option<CdpPage>,
    handler: Option<JoinHandle<()>>,
    generation: u64,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("options", &self.options)
            .field("active", &self.page.is_some())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Create a stopped driver
    #[must_use]
    pub fn new(options: ChromiumOptions) -> Self {
        Self {
            options,
            runtime: None,
            browser: None,
            page: None,
            handler: None,
            generation: 0,
        }
    }

    /// Create a stopped driver from harness configuration
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(ChromiumOptions::from(config))
    }

    fn page(&self) -> PagecheckResult<&CdpPage> {
        self.page.as_ref().ok_or(PagecheckError::SessionUnavailable)
    }

    fn block_on<F: Future>(&self, future: F) -> PagecheckResult<F::Output> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or(PagecheckError::SessionUnavailable)?;
        Ok(runtime.block_on(future))
    }

    fn eval<T: DeserializeOwned>(&self, script: String) -> PagecheckResult<T> {
        let page = self.page()?;
        let result = self.block_on(page.evaluate(script))?.map_err(|e| {
            let message = e.to_string();
            // the document was swapped out mid-call
            if message.contains("context was destroyed")
                || message.contains("Cannot find context")
            {
                PagecheckError::StaleElement {
                    handle: "document".to_string(),
                }
            } else {
                PagecheckError::driver(message)
            }
        })?;
        result
            .into_value()
            .map_err(|e| PagecheckError::driver(e.to_string()))
    }

    fn on_element(
        &self,
        element: ElementHandle,
        body: &str,
        arg: &str,
    ) -> PagecheckResult<serde_json::Value> {
        let script = ELEMENT_JS
            .replace("__GENERATION__", &element.generation.to_string())
            .replace("__NODE__", &element.node.to_string())
            .replace("__ARG__", &js(arg)?)
            .replace("__BODY__", body);
        let reply: ElementReply = self.eval(script)?;
        if reply.stale {
            return Err(PagecheckError::StaleElement {
                handle: element.to_string(),
            });
        }
        if let Some(message) = reply.error {
            return Err(PagecheckError::interaction(format!("{element}: {message}")));
        }
        Ok(reply.value)
    }

    fn string_reply(value: serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Bump the generation if the document was replaced since the last lookup
    fn sync_generation(&mut self) -> PagecheckResult<()> {
        let token = self.eval::<Option<u64>>(TOKEN_JS.to_string());
        let next = next_generation(self.generation, token)?;
        if next != self.generation {
            self.generation = next;
            tracing::trace!(generation = self.generation, "document replaced");
        }
        Ok(())
    }
}

/// Generation after an action, given the registry token read back from the page.
///
/// A missing or foreign token means a new document. So does a context torn
/// down under the read, which is how a click that starts a navigation looks.
fn next_generation(current: u64, token: PagecheckResult<Option<u64>>) -> PagecheckResult<u64> {
    match token {
        Ok(Some(token)) if token == current => Ok(current),
        Ok(_) | Err(PagecheckError::StaleElement { .. }) => Ok(current + 1),
        Err(err) => Err(err),
    }
}

impl Driver for ChromiumDriver {
    fn start(&mut self) -> PagecheckResult<()> {
        if self.page.is_some() {
            return Ok(());
        }
        if self.runtime.is_none() {
            self.runtime = Some(
                tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()?,
            );
        }

        let mut builder = CdpConfig::builder()
            .window_size(self.options.viewport_width, self.options.viewport_height);
        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(PagecheckError::driver)?;

        let (browser, mut handler) = self
            .block_on(CdpBrowser::launch(cdp_config))?
            .map_err(|e| PagecheckError::driver(format!("browser launch failed: {e}")))?;
        let runtime = self
            .runtime
            .as_ref()
            .ok_or(PagecheckError::SessionUnavailable)?;
        let handle = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| PagecheckError::driver(e.to_string()))?;

        tracing::info!(headless = self.options.headless, "chromium started");
        self.browser = Some(browser);
        self.page = Some(page);
        self.handler = Some(handle);
        self.generation += 1;
        Ok(())
    }

    fn quit(&mut self) -> PagecheckResult<()> {
        let _ = self.page.take();
        if let Some(mut browser) = self.browser.take() {
            let closed = self.block_on(async move { browser.close().await.map(|_| ()) })?;
            if let Err(e) = closed {
                tracing::warn!(error = %e, "chromium did not close cleanly");
            }
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
        self.generation += 1;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.page.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn navigate(&mut self, url: &str) -> PagecheckResult<()> {
        let page = self.page()?;
        let timeout = self.options.navigation_timeout;
        let navigation_error = |message: String| PagecheckError::Navigation {
            url: url.to_string(),
            message,
        };
        self.block_on(tokio::time::timeout(timeout, page.goto(url)))?
            .map_err(|_| navigation_error(format!("no load within {}ms", timeout.as_millis())))?
            .map_err(|e| navigation_error(e.to_string()))?;
        self.generation += 1;
        Ok(())
    }

    fn current_url(&self) -> PagecheckResult<String> {
        let page = self.page()?;
        let url = self
            .block_on(page.url())?
            .map_err(|e| PagecheckError::driver(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    fn title(&self) -> PagecheckResult<String> {
        let page = self.page()?;
        let title = self
            .block_on(page.get_title())?
            .map_err(|e| PagecheckError::driver(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    fn find_elements(
        &mut self,
        by: &By,
        scope: Option<ElementHandle>,
    ) -> PagecheckResult<Vec<ElementHandle>> {
        let (kind, query) = match by.to_css() {
            Some(css) => ("css", css),
            None => (
                "xpath",
                by.to_xpath().ok_or_else(|| PagecheckError::InvalidSelector {
                    selector: by.to_string(),
                    message: "no CSS or XPath form".to_string(),
                })?,
            ),
        };
        let scope_js = match scope {
            Some(handle) => js(&handle)?,
            None => "null".to_string(),
        };
        let script = LOCATE_JS
            .replace("__NEXT__", &(self.generation + 1).to_string())
            .replace("__SCOPE__", &scope_js)
            .replace("__KIND__", &js(kind)?)
            .replace("__QUERY__", &js(&query)?);
        let reply: LocateReply = self.eval(script).map_err(|e| match e {
            PagecheckError::Driver { message } => PagecheckError::InvalidSelector {
                selector: query.clone(),
                message,
            },
            other => other,
        })?;
        if reply.stale {
            return Err(PagecheckError::StaleElement {
                handle: scope.map(|h| h.to_string()).unwrap_or_default(),
            });
        }
        self.generation = reply.token;
        Ok(reply
            .ids
            .into_iter()
            .map(|node| ElementHandle::new(node, reply.token))
            .collect())
    }

    fn text(&self, element: ElementHandle) -> PagecheckResult<String> {
        Ok(Self::string_reply(self.on_element(element, TEXT_JS, "")?).unwrap_or_default())
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        Ok(Self::string_reply(self.on_element(element, ATTRIBUTE_JS, name)?))
    }

    fn property(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        Ok(Self::string_reply(self.on_element(element, PROPERTY_JS, name)?))
    }

    fn is_displayed(&self, element: ElementHandle) -> PagecheckResult<bool> {
        Ok(self.on_element(element, DISPLAYED_JS, "")?.as_bool().unwrap_or(false))
    }

    fn is_selected(&self, element: ElementHandle) -> PagecheckResult<bool> {
        Ok(self.on_element(element, SELECTED_JS, "")?.as_bool().unwrap_or(false))
    }

    fn click(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        let _ = self.on_element(element, CLICK_JS, "")?;
        self.sync_generation()
    }

    fn send_keys(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        self.on_element(element, SEND_KEYS_JS, text).map(|_| ())
    }

    fn clear(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        self.on_element(element, CLEAR_JS, "").map(|_| ())
    }

    fn select_by_text(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        self.on_element(element, SELECT_JS, text).map(|_| ())
    }

    fn screenshot(&self) -> PagecheckResult<Screenshot> {
        use base64::Engine;

        let page = self.page()?;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .block_on(page.execute(params))?
            .map_err(|e| PagecheckError::Screenshot {
                message: e.to_string(),
            })?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| PagecheckError::Screenshot {
                message: e.to_string(),
            })?;

        let decoder = png::Decoder::new(std::io::Cursor::new(&data));
        let (width, height) = decoder
            .read_info()
            .map(|reader| (reader.info().width, reader.info().height))
            .map_err(|e| PagecheckError::Screenshot {
                message: e.to_string(),
            })?;
        Ok(Screenshot::new(data, width, height))
    }
}
