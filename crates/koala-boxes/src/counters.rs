//! Counter and quote state threaded through the builder.
//!
//! [§ 4 Automatic Numbering With Counters](https://www.w3.org/TR/css-lists-3/#auto-numbering)
//!
//! "Counters have a name and a creator, which identify the counter, and an
//! integer value. They're created and manipulated with the counter
//! properties 'counter-increment', 'counter-set' and 'counter-reset'".

use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};

use koala_common::warning::warn_once;
use koala_css::{ComputedStyle, CounterIncrement};

/// Counter values by name: one value per nested counter instance, the
/// innermost last.
pub type CounterTable = HashMap<String, Vec<i32>>;

/// The innermost value of a counter, 0 when it is not in scope.
#[must_use]
pub fn innermost(counters: &CounterTable, name: &str) -> i32 {
    counters
        .get(name)
        .and_then(|values| values.last())
        .copied()
        .unwrap_or(0)
}

/// Mutable state shared by a whole build: the quote depth, the counters in
/// scope and the names each open sibling group has instantiated.
///
/// One state per build. Scopes are opened with [`PageState::scope`] and
/// closed when the returned guard drops.
#[derive(Debug, Clone)]
pub struct PageState {
    /// [§ 3.2 Inserting quotes](https://www.w3.org/TR/css-content-3/#quotes-insert)
    ///
    /// "the depth of nesting of quotes"
    pub quote_depth: usize,
    /// Counters currently in scope.
    pub counter_values: CounterTable,
    scopes: Vec<HashSet<String>>,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    /// The state at the start of a document.
    ///
    /// [§ 2.5 Footnote counters](https://www.w3.org/TR/css-gcpm-3/#footnote-counters)
    ///
    /// The `footnote` counter is page-level: it lives in the outermost scope
    /// and is never popped.
    #[must_use]
    pub fn new() -> Self {
        let footnote = "footnote".to_string();
        Self {
            quote_depth: 0,
            counter_values: HashMap::from([(footnote.clone(), vec![0])]),
            scopes: vec![HashSet::from([footnote])],
        }
    }

    /// Number of open scopes, the document scope included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open the scope of an element's children.
    ///
    /// Counters instantiated by the children live until the guard drops,
    /// then go out of scope for the following siblings of the element.
    #[must_use]
    pub fn scope(&mut self) -> ScopeGuard<'_> {
        self.scopes.push(HashSet::new());
        ScopeGuard { state: self }
    }

    fn pop_scope(&mut self) {
        let Some(names) = self.scopes.pop() else {
            return;
        };
        for name in names {
            if let Some(values) = self.counter_values.get_mut(&name) {
                let _ = values.pop();
                if values.is_empty() {
                    let _ = self.counter_values.remove(&name);
                }
            }
        }
    }

    /// Instantiate a counter in the current sibling scope, replacing the
    /// instance a previous sibling created.
    fn reset_counter(&mut self, name: &str, value: i32) {
        let Some(siblings) = self.scopes.last_mut() else {
            return;
        };
        let values = self.counter_values.entry(name.to_string()).or_default();
        if siblings.contains(name) {
            let _ = values.pop();
        } else {
            let _ = siblings.insert(name.to_string());
        }
        values.push(value);
    }

    /// The innermost instance of a counter, created with value 0 when no
    /// counter of that name is in scope.
    ///
    /// [§ 4.4 Counters without counter-reset](https://www.w3.org/TR/css-lists-3/#creating-a-counter)
    ///
    /// "If there is not currently a counter of the given name on the element,
    /// the element instantiates a new counter of the given name with a
    /// starting value of 0 before setting or incrementing its value."
    fn innermost_mut(&mut self, name: &str) -> Option<&mut i32> {
        let values = self.counter_values.entry(name.to_string()).or_default();
        if values.is_empty() {
            let siblings = self.scopes.last_mut()?;
            if !siblings.insert(name.to_string()) {
                warn_once("BOXES", &format!("counter {name} is already scoped in this sibling group"));
            }
            values.push(0);
        }
        values.last_mut()
    }

    /// [§ 4.2 Manipulating Counter Values](https://www.w3.org/TR/css-lists-3/#counter-properties)
    ///
    /// Apply `counter-reset`, then `counter-set`, then `counter-increment`.
    ///
    /// "Inheriting counters must be done before resetting counters, which
    /// must be done before setting counters, which must be done before
    /// incrementing counters".
    pub fn update_counters(&mut self, style: &ComputedStyle) {
        // STEP 1: counter-reset instantiates new counters.
        for (name, value) in style.counter_reset().0 {
            self.reset_counter(&name, value);
        }

        // STEP 2: counter-set overwrites the innermost value.
        for (name, value) in style.counter_set().0 {
            if let Some(current) = self.innermost_mut(&name) {
                *current = value;
            }
        }

        // STEP 3: counter-increment.
        // [§ 4.5 The Implicit list-item Counter](https://www.w3.org/TR/css-lists-3/#list-item-counter)
        //
        // "list items automatically increment the special list-item counter"
        // unless 'counter-increment' was declared.
        let increments = match style.counter_increment() {
            CounterIncrement::List(list) => list.0,
            CounterIncrement::Auto if style.display().is_list_item() => {
                vec![("list-item".to_string(), 1)]
            }
            CounterIncrement::Auto => Vec::new(),
        };
        for (name, value) in increments {
            if let Some(current) = self.innermost_mut(&name) {
                *current = current.saturating_add(value);
            }
        }
    }
}

/// An open counter scope. Dropping it closes the scope.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    state: &'a mut PageState,
}

impl Deref for ScopeGuard<'_> {
    type Target = PageState;

    fn deref(&self) -> &PageState {
        self.state
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut PageState {
        self.state
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.state.pop_scope();
    }
}
