//! Serializable element queries and the in-page resolver that evaluates them.
//!
//! A [`Query`] is plain data: a chain of [`Step`]s, each a [`Selector`] with
//! an optional [`Nth`] index. It is serialized to JSON and handed to a small
//! JavaScript resolver, so selector text and user input are never spliced
//! into script source directly.

use serde::Serialize;
use std::fmt;

/// ARIA roles the resolver knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// `<button>`, button-like inputs, `[role=button]`
    Button,
    /// `<select>`, `[role=combobox]`
    Combobox,
    /// `<a href>`, `[role=link]`
    Link,
    /// Text inputs, `<textarea>`, `[role=textbox]`
    Textbox,
}

impl Role {
    /// CSS matching every element that carries this role implicitly or
    /// explicitly.
    #[must_use]
    pub fn candidates(self) -> &'static str {
        match self {
            Role::Button => {
                "button, input[type=button], input[type=submit], input[type=reset], [role=button]"
            }
            Role::Combobox => "select, [role=combobox]",
            Role::Link => "a[href], [role=link]",
            Role::Textbox => {
                "input:not([type]), input[type=text], input[type=search], textarea, [role=textbox]"
            }
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Role::Button => "button",
            Role::Combobox => "combobox",
            Role::Link => "link",
            Role::Textbox => "textbox",
        }
    }
}

/// One way of picking elements inside a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Plain CSS selector.
    Css(String),
    /// Role plus optional accessible-name substring (case-insensitive).
    Role {
        /// The ARIA role
        role: Role,
        /// Accessible name to look for
        name: Option<String>,
    },
    /// Placeholder substring (case-insensitive).
    Placeholder(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "{css}"),
            Selector::Role { role, name: None } => write!(f, "role={}", role.as_str()),
            Selector::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={name:?}]", role.as_str()),
            Selector::Placeholder(text) => write!(f, "placeholder={text:?}"),
        }
    }
}

/// Wire form of a selector, as read by the resolver script.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireSelector<'a> {
    Css {
        css: &'a str,
    },
    Role {
        css: &'static str,
        name: Option<&'a str>,
    },
    Placeholder {
        text: &'a str,
    },
}

impl<'a> From<&'a Selector> for WireSelector<'a> {
    fn from(selector: &'a Selector) -> Self {
        match selector {
            Selector::Css(css) => WireSelector::Css { css },
            Selector::Role { role, name } => WireSelector::Role {
                css: role.candidates(),
                name: name.as_deref(),
            },
            Selector::Placeholder(text) => WireSelector::Placeholder { text },
        }
    }
}

/// Position of one match among a step's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "from", content = "index", rename_all = "snake_case")]
pub enum Nth {
    /// 0-based from the first match
    Start(usize),
    /// 0-based from the last match
    End(usize),
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nth::Start(i) => write!(f, "nth={i}"),
            Nth::End(0) => f.write_str("last"),
            Nth::End(i) => write!(f, "nth=last-{i}"),
        }
    }
}

/// A selector narrowed to one match by index, or left as all matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// What to match within the current scope
    pub selector: Selector,
    /// Which match to keep; `None` keeps all of them
    pub nth: Option<Nth>,
}

/// A chain of steps; each step searches inside the matches of the previous
/// one, starting from `document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    steps: Vec<Step>,
}

#[derive(Serialize)]
struct WireStep<'a> {
    selector: WireSelector<'a>,
    nth: Option<Nth>,
}

#[derive(Serialize)]
struct WireQuery<'a> {
    steps: Vec<WireStep<'a>>,
}

impl Query {
    /// Starts a query at the document root.
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            steps: vec![Step {
                selector,
                nth: None,
            }],
        }
    }

    /// Returns a query that searches inside this one's matches.
    #[must_use]
    pub fn descend(&self, selector: Selector) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            selector,
            nth: None,
        });
        Self { steps }
    }

    /// Returns a query narrowed to one match of the last step.
    #[must_use]
    pub fn nth(&self, nth: Nth) -> Self {
        let mut steps = self.steps.clone();
        if let Some(last) = steps.last_mut() {
            last.nth = Some(nth);
        }
        Self { steps }
    }

    /// The steps of this query, root first.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Serializes the query for the resolver script.
    ///
    /// # Errors
    ///
    /// Fails only if `serde_json` cannot encode a string, which does not
    /// happen for valid UTF-8.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let wire = WireQuery {
            steps: self
                .steps
                .iter()
                .map(|s| WireStep {
                    selector: WireSelector::from(&s.selector),
                    nth: s.nth,
                })
                .collect(),
        };
        serde_json::to_string(&wire)
    }

    /// Builds a self-contained expression that resolves this query into
    /// `els` (an array of elements) and then runs `body`, which must
    /// `return` a JSON-serializable value.
    ///
    /// # Errors
    ///
    /// See [`Query::to_json`].
    pub fn script(&self, body: &str) -> serde_json::Result<String> {
        let query = self.to_json()?;
        Ok(format!(
            "(() => {{ const els = ({RESOLVER})({query}); {body} }})()"
        ))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{}", step.selector)?;
            if let Some(n) = step.nth {
                write!(f, " >> {n}")?;
            }
        }
        Ok(())
    }
}

/// Resolver evaluated in the page. Takes a wire query, returns the matched
/// elements in document order without duplicates.
pub(crate) const RESOLVER: &str = r"(query) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
  const accessibleName = (el) => {
    const label = el.getAttribute('aria-label');
    if (label) return label;
    const by = el.getAttribute('aria-labelledby');
    if (by) {
      return by.split(/\s+/).map((id) => {
        const target = document.getElementById(id);
        return target ? target.textContent : '';
      }).join(' ');
    }
    if (el.labels && el.labels.length) {
      return Array.from(el.labels).map((l) => l.textContent).join(' ');
    }
    if (el.tagName === 'INPUT') return el.value || el.getAttribute('title') || '';
    return el.textContent || el.getAttribute('title') || '';
  };
  const hiddenFromTree = (el) =>
    el.closest('[aria-hidden=true]') !== null
    || el.getClientRects().length === 0
    || window.getComputedStyle(el).visibility === 'hidden';
  const matchIn = (root, sel) => {
    switch (sel.kind) {
      case 'css':
        return Array.from(root.querySelectorAll(sel.css));
      case 'role':
        return Array.from(root.querySelectorAll(sel.css))
          .filter((el) => !hiddenFromTree(el))
          .filter((el) => sel.name == null || norm(accessibleName(el)).includes(norm(sel.name)));
      case 'placeholder':
        return Array.from(root.querySelectorAll('[placeholder]'))
          .filter((el) => norm(el.getAttribute('placeholder')).includes(norm(sel.text)));
      default:
        return [];
    }
  };
  let scope = [document];
  for (const step of query.steps) {
    const found = [];
    for (const root of scope) {
      for (const el of matchIn(root, step.selector)) {
        if (!found.includes(el)) found.push(el);
      }
    }
    if (scope.length > 1) {
      found.sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1));
    }
    if (step.nth == null) {
      scope = found;
    } else {
      const i = step.nth.from === 'end' ? found.length - 1 - step.nth.index : step.nth.index;
      scope = found[i] ? [found[i]] : [];
    }
  }
  return scope;
}";
