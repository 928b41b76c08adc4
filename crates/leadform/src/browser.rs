//! Real browser control over CDP (chromiumoxide)
//!
//! Locators are resolved in the page by a small script that interprets
//! [`Locator::to_spec`]. Queries return through one JSON reply shape; clicks
//! and typing go through chromiumoxide's element API so the site sees real
//! input events. Each session is a separate browser context.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::target::{
    BrowserContextId, CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport as CdpViewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SuiteConfig;
use crate::driver::{BrowserDriver, SessionFactory, SharedDriver};
use crate::locator::Locator;
use crate::result::{LeadformError, LeadformResult};

const TARGET_ATTRIBUTE: &str = "data-leadform-target";

const RESOLVER: &str = r#"(spec, op) => {
  const norm = s => (s || '').replace(/\s+/g, ' ').trim();
  const re = p => new RegExp(p.source, p.flags);
  const visible = el => {
    if (!el.isConnected) return false;
    const style = getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const r = el.getBoundingClientRect();
    return r.width > 0 && r.height > 0;
  };
  const role = el => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'img') return 'img';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'textarea') return 'textbox';
    if (tag === 'input') {
      const type = (el.getAttribute('type') || 'text').toLowerCase();
      if (type === 'checkbox' || type === 'radio') return type;
      if (['button', 'submit', 'reset'].includes(type)) return 'button';
      if (['text', 'email', 'tel', 'search', 'url', 'number'].includes(type)) return 'textbox';
    }
    return null;
  };
  const name = el => {
    const aria = el.getAttribute('aria-label');
    if (aria) return norm(aria);
    const by = el.getAttribute('aria-labelledby');
    if (by) return norm(by.split(/\s+/).map(id => document.getElementById(id)?.textContent).join(' '));
    if (el.labels && el.labels.length) return norm(Array.from(el.labels).map(l => l.textContent).join(' '));
    const tag = el.tagName.toLowerCase();
    if (tag === 'input' && ['button', 'submit', 'reset'].includes(el.type)) return norm(el.value);
    if (tag === 'input' || tag === 'textarea') return norm(el.getAttribute('placeholder') || el.getAttribute('title'));
    if (tag === 'img') return norm(el.getAttribute('alt'));
    return norm(el.textContent);
  };
  const sel = spec.selector;
  const roots = spec.scope ? Array.from(document.querySelectorAll(spec.scope)) : [document];
  const seen = new Set();
  for (const root of roots) {
    for (const el of root.querySelectorAll(sel.kind === 'css' ? sel.css : '*')) seen.add(el);
  }
  let found = Array.from(seen);
  if (sel.kind === 'role') {
    const n = re(sel.name);
    found = found.filter(el => role(el) === sel.role && visible(el) && n.test(name(el)));
  } else if (sel.kind === 'text') {
    const t = re(sel.text);
    found = found.filter(el => t.test(norm(el.textContent))
      && !Array.from(el.children).some(c => t.test(norm(c.textContent))));
  }
  if (spec.hasText) {
    const h = re(spec.hasText);
    found = found.filter(el => h.test(norm(el.textContent)));
  }
  found.sort((a, b) => a === b ? 0 : (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1));
  if (spec.nth !== null && spec.nth !== undefined) found = found[spec.nth] ? [found[spec.nth]] : [];
  if (op.kind === 'count') return { ok: found.length };
  if (found.length > 1 && op.strict) return { error: 'strict', count: found.length };
  if (op.kind === 'visible') return { ok: found.length > 0 && visible(found[0]) };
  if (found.length === 0) return { error: 'not-found' };
  const el = found[0];
  const control = el.tagName === 'LABEL' && el.control ? el.control : el;
  switch (op.kind) {
    case 'enabled': return { ok: !control.disabled && control.getAttribute('aria-disabled') !== 'true' };
    case 'checked': return { ok: !!control.checked };
    case 'value': return { ok: control.value ?? '' };
    case 'text': return { ok: norm(el.textContent) };
    case 'attribute': return { ok: el.getAttribute(op.name) };
    case 'style': return { ok: getComputedStyle(el).getPropertyValue(op.name) };
    case 'mark':
      document.querySelectorAll('[' + op.attribute + ']').forEach(m => m.removeAttribute(op.attribute));
      el.setAttribute(op.attribute, op.token);
      return { ok: true };
    case 'setValue': {
      const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(control), 'value')?.set;
      if (setter) setter.call(control, op.value); else control.value = op.value;
      for (const type of ['input', 'change', 'blur']) control.dispatchEvent(new Event(type, { bubbles: true }));
      return { ok: true };
    }
  }
  return { error: 'unknown operation ' + op.kind };
}"#;

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    ok: Value,
    error: Option<String>,
    count: Option<usize>,
}

/// Build the evaluation expression for one locator operation
fn script(locator: &Locator, op: &Value) -> String {
    format!("({RESOLVER})({}, {op})", locator.to_spec())
}

fn cdp_error(e: impl fmt::Display) -> LeadformError {
    LeadformError::driver(e.to_string())
}

/// One CDP page in its own browser context
pub struct ChromiumDriver {
    page: Page,
    browser: Arc<Mutex<Browser>>,
    context: Option<BrowserContextId>,
    tokens: AtomicU64,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    async fn query<T: DeserializeOwned>(&self, locator: &Locator, mut op: Value) -> LeadformResult<T> {
        op["strict"] = Value::Bool(locator.is_strict());
        let params = EvaluateParams::builder()
            .expression(script(locator, &op))
            .return_by_value(true)
            .build()
            .map_err(LeadformError::driver)?;
        let reply: Reply = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(cdp_error)?
            .into_value()
            .map_err(cdp_error)?;
        match (reply.error.as_deref(), reply.count) {
            (None, _) => Ok(serde_json::from_value(reply.ok)?),
            (Some("not-found"), _) => Err(LeadformError::ElementNotFound {
                locator: locator.to_string(),
            }),
            (Some("strict"), Some(n)) => Err(LeadformError::driver(format!(
                "strict mode violation: {locator} resolved to {n} elements"
            ))),
            (Some(other), _) => Err(LeadformError::driver(format!("{locator}: {other}"))),
        }
    }

    /// Tag the resolved element so chromiumoxide can find it by CSS
    async fn element(&self, locator: &Locator) -> LeadformResult<chromiumoxide::element::Element> {
        let token = self.tokens.fetch_add(1, Ordering::Relaxed).to_string();
        self.query::<bool>(
            locator,
            json!({ "kind": "mark", "attribute": TARGET_ATTRIBUTE, "token": token }),
        )
        .await?;
        self.page
            .find_element(format!("[{TARGET_ATTRIBUTE}=\"{token}\"]"))
            .await
            .map_err(cdp_error)
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> LeadformResult<()> {
        debug!(url, "goto");
        self.page
            .goto(url)
            .await
            .map_err(|e| LeadformError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> LeadformResult<String> {
        Ok(self.page.url().await.map_err(cdp_error)?.unwrap_or_default())
    }

    async fn count(&self, locator: &Locator) -> LeadformResult<usize> {
        self.query(locator, json!({ "kind": "count" })).await
    }

    async fn is_visible(&self, locator: &Locator) -> LeadformResult<bool> {
        self.query(locator, json!({ "kind": "visible" })).await
    }

    async fn is_enabled(&self, locator: &Locator) -> LeadformResult<bool> {
        self.query(locator, json!({ "kind": "enabled" })).await
    }

    async fn is_checked(&self, locator: &Locator) -> LeadformResult<bool> {
        self.query(locator, json!({ "kind": "checked" })).await
    }

    async fn input_value(&self, locator: &Locator) -> LeadformResult<String> {
        self.query(locator, json!({ "kind": "value" })).await
    }

    async fn text_content(&self, locator: &Locator) -> LeadformResult<String> {
        self.query(locator, json!({ "kind": "text" })).await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> LeadformResult<Option<String>> {
        self.query(locator, json!({ "kind": "attribute", "name": name })).await
    }

    async fn computed_style(&self, locator: &Locator, property: &str) -> LeadformResult<String> {
        self.query(locator, json!({ "kind": "style", "name": property })).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> LeadformResult<()> {
        debug!(%locator, value, "fill");
        self.query::<bool>(locator, json!({ "kind": "setValue", "value": "" }))
            .await?;
        if value.is_empty() {
            return Ok(());
        }
        let element = self.element(locator).await?;
        element.click().await.map_err(cdp_error)?;
        element.type_str(value).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> LeadformResult<()> {
        debug!(%locator, "click");
        let element = self.element(locator).await?;
        element.scroll_into_view().await.map_err(cdp_error)?;
        element.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> LeadformResult<()> {
        if self.is_checked(locator).await? {
            return Ok(());
        }
        self.click(locator).await?;
        if self.is_checked(locator).await? {
            Ok(())
        } else {
            Err(LeadformError::driver(format!("clicking {locator} did not check it")))
        }
    }

    async fn set_value_with_events(&self, locator: &Locator, value: &str) -> LeadformResult<()> {
        debug!(%locator, value, "set value");
        self.query::<bool>(locator, json!({ "kind": "setValue", "value": value }))
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> LeadformResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page.screenshot(params).await.map_err(cdp_error)
    }

    async fn close(&self) -> LeadformResult<()> {
        self.page.clone().close().await.map_err(cdp_error)?;
        if let Some(context) = self.context.clone() {
            self.browser
                .lock()
                .await
                .dispose_browser_context(context)
                .await
                .map_err(cdp_error)?;
        }
        Ok(())
    }
}

/// Shared chromium process handing out one context per session
pub struct ChromiumSessionFactory {
    browser: Arc<Mutex<Browser>>,
    handler: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for ChromiumSessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumSessionFactory").finish_non_exhaustive()
    }
}

impl ChromiumSessionFactory {
    /// Launch chromium as configured
    pub async fn launch(config: &SuiteConfig) -> LeadformResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport.width, config.viewport.height)
            .viewport(CdpViewport {
                width: config.viewport.width,
                height: config.viewport.height,
                ..CdpViewport::default()
            });
        if !config.headless {
            builder = builder.with_head();
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| LeadformError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            Browser::launch(cdp_config)
                .await
                .map_err(|e| LeadformError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        info!(headless = config.headless, "chromium launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler: std::sync::Mutex::new(Some(handle)),
        })
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> LeadformResult<SharedDriver> {
        let (page, context) = {
            let mut browser = self.browser.lock().await;
            let context = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(cdp_error)?;
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context.clone())
                .build()
                .map_err(LeadformError::driver)?;
            let page = browser.new_page(target).await.map_err(cdp_error)?;
            (page, context)
        };
        Ok(Arc::new(ChromiumDriver {
            page,
            browser: Arc::clone(&self.browser),
            context: Some(context),
            tokens: AtomicU64::new(0),
        }))
    }

    async fn shutdown(&self) -> LeadformResult<()> {
        {
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(cdp_error)?;
            // close() only asks; wait() reaps the process
            browser.wait().await?;
        }
        let handle = self
            .handler
            .lock()
            .map_err(|_| LeadformError::driver("handler lock poisoned"))?
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        Ok(())
    }
}
