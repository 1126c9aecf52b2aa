//! Lazy, re-evaluated element handles.
//!
//! A [`Locator`] is a page plus a [`Query`]. Building one touches nothing;
//! every operation resolves the query against the live DOM at the moment it
//! runs, so the same locator can be read before and after the page changes.
//!
//! Reads over all matches (`count`, `all_text_contents`) return whatever is
//! attached right now. Single-element operations are strict: they wait up to
//! the locator timeout for a match to attach and fail if more than one
//! element matches.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use crate::query::{Nth, Query, Selector};
use crate::wait::{poll_value, Polled, WaitConfig};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const VISIBLE_JS: &str = "const visible = (el) => { \
    const r = el.getBoundingClientRect(); \
    const st = window.getComputedStyle(el); \
    return r.width > 0 && r.height > 0 && st.visibility !== 'hidden'; };";

/// State of a single element, checked before acting on it.
#[derive(Debug, Clone, Deserialize)]
struct ElementState {
    count: usize,
    visible: bool,
    enabled: bool,
}

/// Deferred handle to zero or more elements of a page.
#[derive(Clone)]
pub struct Locator {
    page: Page,
    query: Query,
    timeout: Duration,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("query", &self.query.to_string())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

impl Locator {
    pub(crate) fn new(page: Page, query: Query, timeout: Duration) -> Self {
        Self {
            page,
            query,
            timeout,
        }
    }

    /// The underlying query.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The page this locator reads from.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// How long single-element operations wait for their element.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns a copy that waits `timeout` instead.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// The first match.
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// The last match.
    #[must_use]
    pub fn last(&self) -> Self {
        self.nth_from_end(0)
    }

    /// The match at `index`, 0-based.
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.narrow(Nth::Start(index))
    }

    /// The match `index` places before the last one; `0` is the last.
    #[must_use]
    pub fn nth_from_end(&self, index: usize) -> Self {
        self.narrow(Nth::End(index))
    }

    fn narrow(&self, nth: Nth) -> Self {
        Self::new(self.page.clone(), self.query.nth(nth), self.timeout)
    }

    /// Elements matching `css` inside this locator's matches.
    #[must_use]
    pub fn locator(&self, css: &str) -> Self {
        Self::new(
            self.page.clone(),
            self.query.descend(Selector::Css(css.to_string())),
            self.timeout,
        )
    }

    async fn run<T>(&self, body: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let script = self
            .query
            .script(body)
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
        self.page.evaluate(script).await
    }

    /// Number of elements currently matching.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot run in the page.
    pub async fn count(&self) -> Result<usize> {
        self.run("return els.length;").await
    }

    /// `textContent` of every current match, in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot run in the page.
    pub async fn all_text_contents(&self) -> Result<Vec<String>> {
        self.run("return els.map((el) => el.textContent || '');")
            .await
    }

    /// Whether the single match is visible. Absent elements are not
    /// visible; this never waits.
    ///
    /// # Errors
    ///
    /// Returns `StrictModeViolation` if several elements match.
    pub async fn is_visible(&self) -> Result<bool> {
        let state = self.inspect().await?;
        self.ensure_strict(state.count)?;
        Ok(state.count == 1 && state.visible)
    }

    /// Whether the single match is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if nothing attaches within the timeout and
    /// `StrictModeViolation` if several elements match.
    pub async fn is_enabled(&self) -> Result<bool> {
        let state = self.wait_for(|p| p.count > 0, "attached").await?;
        Ok(state.enabled)
    }

    /// `textContent` of the single match.
    ///
    /// # Errors
    ///
    /// Same as [`Locator::is_enabled`].
    pub async fn text_content(&self) -> Result<Option<String>> {
        self.wait_for(|p| p.count > 0, "attached").await?;
        self.run("return els[0] ? els[0].textContent : null;")
            .await
    }

    /// Attribute `name` of the single match, `None` when unset.
    ///
    /// # Errors
    ///
    /// Same as [`Locator::is_enabled`].
    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.wait_for(|p| p.count > 0, "attached").await?;
        let name = encode(name)?;
        self.run(&format!(
            "return els[0] ? els[0].getAttribute({name}) : null;"
        ))
        .await
    }

    /// Clicks the single match once it is visible and enabled.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element never becomes actionable,
    /// `StrictModeViolation` if several elements match.
    pub async fn click(&self) -> Result<()> {
        self.wait_for(|p| p.count > 0 && p.visible && p.enabled, "visible and enabled")
            .await?;
        debug!(locator = %self, "click");
        self.run::<bool>(
            "const el = els[0]; if (!el) return false; \
             el.scrollIntoView({ block: 'center', inline: 'center' }); \
             el.click(); return true;",
        )
        .await?;
        Ok(())
    }

    /// Replaces the value of the single input match with `text` and fires
    /// `input` and `change`, the way typing would for framework-controlled
    /// inputs.
    ///
    /// # Errors
    ///
    /// Same as [`Locator::click`].
    pub async fn fill(&self, text: &str) -> Result<()> {
        self.wait_for(|p| p.count > 0 && p.visible && p.enabled, "visible and enabled")
            .await?;
        debug!(locator = %self, text, "fill");
        let value = encode(text)?;
        let outcome: String = self
            .run(&format!(
                "const el = els[0]; if (!el) return 'detached'; \
                 const proto = el instanceof HTMLTextAreaElement \
                   ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 const setter = Object.getOwnPropertyDescriptor(proto, 'value'); \
                 if (!setter || !(el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement)) \
                   return 'not an input'; \
                 el.focus(); \
                 setter.set.call(el, {value}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return 'ok';"
            ))
            .await?;
        self.check_outcome("fill", outcome, text)
    }

    /// Selects the option of the single `<select>` match whose value or
    /// label equals `value`.
    ///
    /// # Errors
    ///
    /// Returns `NoMatchingOption` if no option matches once the element is
    /// actionable, plus the errors of [`Locator::click`].
    pub async fn select_option(&self, value: &str) -> Result<()> {
        self.wait_for(|p| p.count > 0 && p.visible && p.enabled, "visible and enabled")
            .await?;
        debug!(locator = %self, value, "select option");
        let wanted = encode(value)?;
        let outcome: String = self
            .run(&format!(
                "const el = els[0]; if (!el) return 'detached'; \
                 if (!(el instanceof HTMLSelectElement)) return 'not a select'; \
                 const wanted = {wanted}; \
                 const option = Array.from(el.options).find((o) => \
                   o.value === wanted || o.label.trim() === wanted || o.textContent.trim() === wanted); \
                 if (!option) return 'no option'; \
                 const setter = Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value'); \
                 setter.set.call(el, option.value); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return 'ok';"
            ))
            .await?;
        self.check_outcome("select option on", outcome, value)
    }

    fn check_outcome(&self, action: &'static str, outcome: String, value: &str) -> Result<()> {
        match outcome.as_str() {
            "ok" => Ok(()),
            "no option" => Err(BrowserError::NoMatchingOption {
                selector: self.to_string(),
                value: value.to_string(),
            }),
            _ => Err(BrowserError::ActionFailed {
                action,
                selector: self.to_string(),
                reason: outcome,
            }),
        }
    }

    async fn inspect(&self) -> Result<ElementState> {
        self.run(&format!(
            "{VISIBLE_JS} const el = els[0]; \
             return {{ count: els.length, \
               visible: !!el && visible(el), \
               enabled: !!el && !el.matches(':disabled') && el.getAttribute('aria-disabled') !== 'true' }};"
        ))
        .await
    }

    fn ensure_strict(&self, count: usize) -> Result<()> {
        if count > 1 {
            return Err(BrowserError::StrictModeViolation {
                selector: self.to_string(),
                count,
            });
        }
        Ok(())
    }

    /// Polls until the element state satisfies `ready`, enforcing strictness on
    /// every observation.
    async fn wait_for<P>(&self, ready: P, condition: &str) -> Result<ElementState>
    where
        P: Fn(&ElementState) -> bool,
    {
        let outcome = poll_value(
            move || self.inspect(),
            |p: &ElementState| p.count > 1 || ready(p),
            WaitConfig::with_timeout(self.timeout),
        )
        .await;

        match outcome {
            Polled::Accepted(state) => {
                self.ensure_strict(state.count)?;
                Ok(state)
            }
            Polled::Failed(err) => Err(err),
            Polled::Expired {
                last: Some(state), ..
            } if state.count > 0 => Err(BrowserError::ExpectationFailed {
                assertion: format!("{self} to be {condition}"),
                timeout: self.timeout,
                last_observed: format!("{state:?}"),
            }),
            Polled::Expired { .. } => Err(BrowserError::ElementNotFound {
                selector: self.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

fn encode(text: &str) -> Result<String> {
    serde_json::to_string(text).map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_quotes_and_escapes() {
        assert_eq!(encode("book").unwrap(), r#""book""#);
        assert_eq!(encode(r#"a"b"#).unwrap(), r#""a\"b""#);
        assert_eq!(encode("#$%").unwrap(), r##""#$%""##);
    }

    #[test]
    fn element_state_deserializes_from_page_shape() {
        let state: ElementState =
            serde_json::from_str(r#"{"count":1,"visible":true,"enabled":false}"#).unwrap();
        assert_eq!(state.count, 1);
        assert!(state.visible);
        assert!(!state.enabled);
    }
}
