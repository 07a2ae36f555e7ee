//! Browser automation capability.
//!
//! The crawler only ever talks to the page through [`Automation`]. A session
//! is constructed once per run and handed by reference to the tree
//! initializer and the walker; at most two browsing contexts (the results
//! page and one detail view) exist at any time.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "webdriver")]
mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Settle;

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverSession;

/// Capability set the crawler needs from a rendering engine.
///
/// All lookups take XPath expressions. Relative lookups through
/// [`Automation::find_in`] start with `./`.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Handle to a located element.
    type Element: Send + Sync;

    /// Navigate the current context to a URL.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Whether at least one element matches.
    async fn exists(&self, xpath: &str) -> Result<bool>;

    /// Locate exactly one element; missing elements are an error.
    async fn find(&self, xpath: &str) -> Result<Self::Element>;

    /// Locate every matching element, in document order.
    async fn find_all(&self, xpath: &str) -> Result<Vec<Self::Element>>;

    /// Locate one element relative to another.
    async fn find_in(&self, parent: &Self::Element, xpath: &str) -> Result<Self::Element>;

    /// Read an attribute; `None` when the element does not carry it.
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Rendered text of an element.
    async fn text(&self, element: &Self::Element) -> Result<String>;

    /// Serialized markup of an element, including itself.
    async fn outer_html(&self, element: &Self::Element) -> Result<String>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Focus the most recently opened browsing context.
    async fn switch_to_newest(&self) -> Result<()>;

    /// Close the focused browsing context.
    async fn close_context(&self) -> Result<()>;

    /// Focus the first browsing context.
    async fn switch_to_main(&self) -> Result<()>;

    async fn wait(&self, duration: Duration) -> Result<()>;

    /// End the session.
    async fn quit(&self) -> Result<()>;
}

/// Pause for one draw of a settle delay.
pub async fn settle<A: Automation + ?Sized>(session: &A, settle: &Settle) -> Result<()> {
    let duration = settle.sample()?;
    if duration.is_zero() {
        return Ok(());
    }
    log::debug!("Waiting {:.2}s for the page to settle", duration.as_secs_f64());
    session.wait(duration).await
}
