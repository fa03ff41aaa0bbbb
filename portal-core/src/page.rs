//! Page-side rendering of the network list.
//!
//! On page load the `networks` list is fetched once and rendered as a run of
//! `<option value="..." />` elements into the `ssids` element. A failed fetch
//! leaves the page untouched.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::client::{FetchError, JsonClient};
use crate::traits::{Document, NetworkRecord};
use crate::{Error, Result};

/// Path fetched on page load, relative to the page's base URL.
pub const NETWORKS_PATH: &str = "networks";

/// Id of the element that receives the option list.
pub const SSIDS_ELEMENT_ID: &str = "ssids";

/// How an `ssid` is placed into the `value` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    /// Inserted as received. An `ssid` containing `"` breaks out of the attribute.
    #[default]
    Verbatim,
    /// `& < > " '` are replaced by character references.
    Escaped,
}

#[derive(Debug)]
pub enum PopulateOutcome {
    /// The element was rewritten with this many options.
    Rendered { options: usize },
    /// The fetch failed and the element was left as it was.
    Skipped(FetchError),
}

/// Render one `<option />` per record, in order.
pub fn render_options(records: &[NetworkRecord], mode: MarkupMode) -> String {
    records.iter().fold(String::new(), |mut out, record| {
        let value = match mode {
            MarkupMode::Verbatim => Cow::Borrowed(record.ssid.as_str()),
            MarkupMode::Escaped => escape_attribute(&record.ssid),
        };
        // 写入 String 不会失败
        let _ = write!(out, r#"<option value="{value}" />"#);
        out
    })
}

pub fn escape_attribute(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Fetch the network list and render it into the `ssids` element.
///
/// Fetch failures are logged and swallowed. A missing `ssids` element is an
/// error because the page is not the one this routine was written for.
pub async fn populate_options<D>(
    client: &JsonClient,
    document: &D,
    mode: MarkupMode,
) -> Result<PopulateOutcome>
where
    D: Document + ?Sized,
{
    let records = match client.get_json::<Vec<NetworkRecord>>(NETWORKS_PATH).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Network list unavailable, leaving #{} as is: {}", SSIDS_ELEMENT_ID, e);
            return Ok(PopulateOutcome::Skipped(e));
        }
    };

    let markup = render_options(&records, mode);
    document.set_inner_markup(SSIDS_ELEMENT_ID, markup)?;
    tracing::info!("Rendered {} networks into #{}", records.len(), SSIDS_ELEMENT_ID);

    Ok(PopulateOutcome::Rendered {
        options: records.len(),
    })
}

/// Page-load trigger: starts `populate_options` and returns at once.
/// The document is written later, from the spawned task.
pub fn on_page_load(
    client: JsonClient,
    document: Arc<dyn Document>,
    mode: MarkupMode,
) -> JoinHandle<Result<PopulateOutcome>> {
    tokio::spawn(async move { populate_options(&client, document.as_ref(), mode).await })
}

/// A page held in memory as a map of element id to inner markup.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Mutex<HashMap<String, String>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: impl Into<String>, markup: impl Into<String>) -> Self {
        self.lock().insert(id.into(), markup.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for MemoryDocument {
    fn inner_markup(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    fn set_inner_markup(&self, id: &str, markup: String) -> Result<()> {
        match self.lock().get_mut(id) {
            Some(slot) => {
                *slot = markup;
                Ok(())
            }
            None => Err(Error::ElementNotFound(id.to_string())),
        }
    }
}
