//! Cross references: `target-counter()`, `target-counters()` and
//! `target-text()`.
//!
//! [§ 5 Cross references](https://www.w3.org/TR/css-gcpm-3/#cross-references)
//!
//! "Cross-references are specified with the target-counter(),
//! target-counters() and target-text() functions."
//!
//! A reference can point forward in the document. Content that needs a
//! target whose box is not built yet is abandoned and recorded as a
//! [`ReplayRecord`]; once the first pass is over the builder evaluates
//! every record again.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use koala_common::warning::warn_once;
use koala_css::{Anchor, AnchorRef, ContentToken, Quotes, StyleLookup};
use koala_dom::DomTree;

use crate::counters::CounterTable;
use crate::layout_box::{BoxId, LayoutBox};

/// Which content list of a box a deferred evaluation fills.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReplayKey {
    /// The box's children, from `content`.
    Content,
    /// One named string of `string-set`.
    StringSet(String),
    /// `bookmark-label`.
    BookmarkLabel,
}

impl fmt::Display for ReplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => f.write_str("content"),
            Self::StringSet(name) => write!(f, "string-set::{name}"),
            Self::BookmarkLabel => f.write_str("bookmark-label"),
        }
    }
}

/// Everything needed to evaluate a content list again: the box it fills,
/// the tokens and the quote state it started with. Counter values come
/// from the box's `cached_counter_values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRecord {
    /// The box whose content is evaluated.
    pub site: BoxId,
    /// What the evaluation fills.
    pub key: ReplayKey,
    /// The content list.
    pub tokens: Vec<ContentToken>,
    /// `quotes` of the generating style; `None` ignores quote tokens.
    pub quotes: Option<Quotes>,
    /// Quote depth before the first evaluation.
    pub quote_depth: usize,
}

/// [§ 5 Cross references](https://www.w3.org/TR/css-gcpm-3/#cross-references)
///
/// How far a target has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// The anchor exists but its box has not been built yet.
    Pending,
    /// The anchor's box and counter values are known.
    UpToDate,
    /// No element defines the anchor.
    Undefined,
}

/// A target anchor and the evaluations waiting for it.
#[derive(Debug, Clone)]
pub struct TargetLookupItem {
    /// Resolution state.
    pub state: TargetState,
    /// The box of the anchor element.
    pub target_box: Option<BoxId>,
    /// Counter values at the anchor element.
    pub counter_values: CounterTable,
    /// Page-based counter values at the anchor, fed back by pagination.
    pub cached_page_counter_values: CounterTable,
    /// Index of the page the anchor was laid out on.
    pub page_maker_index: Option<usize>,
    replays: Vec<ReplayRecord>,
}

impl TargetLookupItem {
    fn new(state: TargetState) -> Self {
        Self {
            state,
            target_box: None,
            counter_values: CounterTable::new(),
            cached_page_counter_values: CounterTable::new(),
            page_maker_index: None,
            replays: Vec::new(),
        }
    }

    fn register(&mut self, record: &ReplayRecord) {
        let known = self
            .replays
            .iter()
            .any(|known| known.site == record.site && known.key == record.key);
        if !known {
            self.replays.push(record.clone());
        }
    }
}

/// The outcome of [`TargetCollector::lookup_target`].
#[derive(Debug, Clone, PartialEq)]
pub enum TargetLookup {
    /// The anchor is not defined anywhere.
    Undefined,
    /// The anchor's box is not built yet; the evaluation was recorded.
    Pending,
    /// The anchor is resolved.
    UpToDate {
        /// The anchor's box.
        target: BoxId,
        /// Counter values at the anchor.
        counter_values: CounterTable,
        /// Page-based counter values at the anchor.
        page_counter_values: CounterTable,
    },
}

/// A content evaluation that used counters the builder could not know:
/// page-based ones, or counters of a target.
#[derive(Debug, Clone)]
pub struct CounterLookupItem {
    /// How to evaluate it again.
    pub record: ReplayRecord,
    /// Counters not in scope at the box.
    pub missing_counters: BTreeSet<String>,
    /// Counters not in scope at a target, by anchor name.
    pub missing_target_counters: BTreeMap<String, BTreeSet<String>>,
    /// Page-based counter values at the box, fed back by pagination.
    pub cached_page_counter_values: CounterTable,
    /// Index of the page the box was laid out on.
    pub page_maker_index: Option<usize>,
    /// The page has to be laid out again.
    pub pending: bool,
}

/// An evaluation to run again because page counters changed.
#[derive(Debug, Clone)]
pub struct PageReplay {
    /// The page whose content changed.
    pub page_maker_index: usize,
    /// The evaluation.
    pub record: ReplayRecord,
    /// Page-based counters mixed under the box's own values.
    pub page_counter_values: CounterTable,
}

/// Collector of the anchors used by `target-*()` functions and of the
/// evaluations that wait for them.
///
/// While collecting (the first build pass), content that references a
/// pending anchor is recorded. [`TargetCollector::pending_replays`] hands
/// those records back once every anchor box exists.
#[derive(Debug, Clone)]
pub struct TargetCollector {
    items: BTreeMap<String, TargetLookupItem>,
    counter_items: BTreeMap<(BoxId, ReplayKey), CounterLookupItem>,
    collecting: bool,
    had_pending_targets: bool,
}

impl Default for TargetCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetCollector {
    /// An empty collector, collecting.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            counter_items: BTreeMap::new(),
            collecting: true,
            had_pending_targets: false,
        }
    }

    /// Whether the first pass is still running.
    #[must_use]
    pub const fn is_collecting(&self) -> bool {
        self.collecting
    }

    /// Declare an anchor. Names are unique; a second declaration is
    /// ignored.
    pub fn collect_anchor(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        if self.items.contains_key(name) {
            warn_once("TARGET", &format!("Anchor defined twice: \"{name}\""));
        } else {
            let _ = self
                .items
                .insert(name.to_string(), TargetLookupItem::new(TargetState::Pending));
        }
    }

    /// Declare the anchors of every element of `dom`, in tree order.
    pub fn collect_anchors(&mut self, dom: &DomTree, styles: &dyn StyleLookup) {
        for node in dom.descendants(dom.root()) {
            if dom.as_element(node).is_none() {
                continue;
            }
            if let Some(style) = styles.get(node, None)
                && let Anchor::Name(name) = style.anchor()
            {
                self.collect_anchor(&name);
            }
        }
    }

    /// The state of an anchor.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&TargetLookupItem> {
        self.items.get(name)
    }

    /// Look up the target of `anchor` for the evaluation in `record`.
    ///
    /// A pending target records the evaluation so it runs again later.
    pub fn lookup_target(&mut self, anchor: &AnchorRef, record: &ReplayRecord) -> TargetLookup {
        let name = anchor.anchor_name().unwrap_or_default();
        let Some(item) = self.items.get_mut(name) else {
            warn_once(
                "TARGET",
                &format!("Content discarded: target points to undefined anchor \"{name}\""),
            );
            return TargetLookup::Undefined;
        };
        match item.state {
            TargetState::Pending => {
                self.had_pending_targets = true;
                item.register(record);
                TargetLookup::Pending
            }
            TargetState::UpToDate => match item.target_box {
                Some(target) => TargetLookup::UpToDate {
                    target,
                    counter_values: item.counter_values.clone(),
                    page_counter_values: item.cached_page_counter_values.clone(),
                },
                None => TargetLookup::Pending,
            },
            TargetState::Undefined => TargetLookup::Undefined,
        }
    }

    /// Record `record` against a resolved `anchor` whose box cannot be read
    /// yet, so it runs again after the first pass.
    pub(crate) fn defer(&mut self, anchor: &AnchorRef, record: &ReplayRecord) {
        if let Some(item) = anchor.anchor_name().and_then(|name| self.items.get_mut(name)) {
            self.had_pending_targets = true;
            item.register(record);
        }
    }

    /// The box of a collected anchor has been built.
    ///
    /// Only pending anchors are updated. The counter values are also cached
    /// on the box, the way content evaluation does.
    pub fn store_target(&mut self, name: &str, counter_values: &CounterTable, target: &mut LayoutBox) {
        let Some(item) = self.items.get_mut(name) else {
            return;
        };
        if item.state != TargetState::Pending {
            return;
        }
        item.state = TargetState::UpToDate;
        item.target_box = Some(target.id);
        let cached = target
            .cached_counter_values
            .get_or_insert_with(|| counter_values.clone());
        item.counter_values = cached.clone();
    }

    /// Remember an evaluation that used counters missing at its box or at
    /// a target. Only done while collecting.
    ///
    /// The box gets a `missing_link` to itself so paginated copies can
    /// find their origin.
    pub fn collect_missing_counters(
        &mut self,
        site: &mut LayoutBox,
        record: &ReplayRecord,
        missing_counters: BTreeSet<String>,
        missing_target_counters: BTreeMap<String, BTreeSet<String>>,
    ) {
        if !self.collecting || (missing_counters.is_empty() && missing_target_counters.is_empty()) {
            return;
        }
        if site.missing_link.is_none() {
            site.missing_link = Some(site.id);
        }
        let _ = self
            .counter_items
            .entry((record.site, record.key.clone()))
            .or_insert_with(|| CounterLookupItem {
                record: record.clone(),
                missing_counters,
                missing_target_counters,
                cached_page_counter_values: CounterTable::new(),
                page_maker_index: None,
                pending: false,
            });
    }

    /// The page-counter item of an evaluation.
    pub fn counter_lookup_item_mut(
        &mut self,
        site: BoxId,
        key: &ReplayKey,
    ) -> Option<&mut CounterLookupItem> {
        self.counter_items.get_mut(&(site, key.clone()))
    }

    /// Every page-counter item.
    pub fn counter_lookup_items(&self) -> impl Iterator<Item = &CounterLookupItem> {
        self.counter_items.values()
    }

    /// The evaluations to run again, when some target was pending during
    /// the first pass.
    #[must_use]
    pub fn pending_replays(&self) -> Vec<ReplayRecord> {
        if !self.had_pending_targets {
            return Vec::new();
        }
        self.items
            .values()
            .flat_map(|item| item.replays.iter().cloned())
            .collect()
    }

    /// End of the first pass: ready for pagination.
    pub const fn finish_collecting(&mut self) {
        self.had_pending_targets = false;
        self.collecting = false;
    }

    /// Store the page and the page-based counter values of an anchor laid
    /// out by a paginator.
    ///
    /// Returns the `content` evaluations that depend on those counters and
    /// must run again. Evaluations whose page is not known yet are marked
    /// pending instead.
    pub fn cache_target_page_counters(
        &mut self,
        name: &str,
        page_counter_values: &CounterTable,
        page_maker_index: usize,
        page_count: usize,
    ) -> Vec<PageReplay> {
        if self.collecting {
            return Vec::new();
        }

        if let Some(item) = self.items.get_mut(name)
            && item.state == TargetState::UpToDate
        {
            item.page_maker_index = Some(page_maker_index);
            if item.cached_page_counter_values != *page_counter_values {
                item.cached_page_counter_values.clone_from(page_counter_values);
            }
        }

        let mut replays = Vec::new();
        for ((_, key), item) in &mut self.counter_items {
            if *key != ReplayKey::Content {
                continue;
            }
            let Some(missing) = item.missing_target_counters.get(name) else {
                continue;
            };
            let page = match item.page_maker_index {
                Some(page) if page < page_count => page,
                _ => {
                    item.pending = true;
                    continue;
                }
            };
            if missing.iter().any(|counter| page_counter_values.contains_key(counter)) {
                replays.push(PageReplay {
                    page_maker_index: page,
                    record: item.record.clone(),
                    page_counter_values: item.cached_page_counter_values.clone(),
                });
            }
        }
        replays
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use koala_common::warning::take_warnings;
    use koala_css::ComputedStyle;
    use koala_dom::NodeId;

    use super::*;
    use crate::box_kind::BoxKind;

    fn site() -> LayoutBox {
        LayoutBox::new(
            BoxKind::Inline,
            Rc::new(ComputedStyle::default()),
            Some((NodeId(1), "a")),
            None,
            Vec::new(),
        )
    }

    fn record(site: &LayoutBox) -> ReplayRecord {
        ReplayRecord {
            site: site.id,
            key: ReplayKey::Content,
            tokens: Vec::new(),
            quotes: None,
            quote_depth: 0,
        }
    }

    fn anchor(name: &str) -> AnchorRef {
        AnchorRef::Url(format!("#{name}"))
    }

    #[test]
    fn replay_keys_name_their_property() {
        assert_eq!(ReplayKey::Content.to_string(), "content");
        assert_eq!(ReplayKey::StringSet("title".to_string()).to_string(), "string-set::title");
        assert_eq!(ReplayKey::BookmarkLabel.to_string(), "bookmark-label");
    }

    #[test]
    fn forward_reference_is_replayed_once() {
        let mut targets = TargetCollector::new();
        targets.collect_anchor("later");
        let source = site();
        let record = record(&source);

        assert_eq!(targets.lookup_target(&anchor("later"), &record), TargetLookup::Pending);
        assert_eq!(targets.lookup_target(&anchor("later"), &record), TargetLookup::Pending);

        let mut target = site();
        let counters = CounterTable::from([("h".to_string(), vec![3])]);
        targets.store_target("later", &counters, &mut target);
        assert_eq!(target.cached_counter_values, Some(counters.clone()));

        assert_eq!(targets.pending_replays(), vec![record.clone()]);
        targets.finish_collecting();
        assert!(!targets.is_collecting());
        assert!(targets.pending_replays().is_empty());
        assert_eq!(
            targets.lookup_target(&anchor("later"), &record),
            TargetLookup::UpToDate {
                target: target.id,
                counter_values: counters,
                page_counter_values: CounterTable::new(),
            }
        );
    }

    #[test]
    fn undefined_and_duplicate_anchors_warn() {
        let _ = take_warnings();
        let mut targets = TargetCollector::new();
        targets.collect_anchor("a");
        targets.collect_anchor("a");
        let source = site();
        assert_eq!(
            targets.lookup_target(&anchor("nowhere"), &record(&source)),
            TargetLookup::Undefined
        );
        let warnings = take_warnings();
        assert!(warnings.iter().any(|w| w.contains("Anchor defined twice: \"a\"")));
        assert!(
            warnings
                .iter()
                .any(|w| w.contains("target points to undefined anchor \"nowhere\""))
        );
    }

    #[test]
    fn missing_counters_link_the_box_to_itself() {
        let mut targets = TargetCollector::new();
        let mut source = site();
        let record = record(&source);
        targets.collect_missing_counters(&mut source, &record, BTreeSet::new(), BTreeMap::new());
        assert_eq!(source.missing_link, None);

        targets.collect_missing_counters(
            &mut source,
            &record,
            BTreeSet::from(["page".to_string()]),
            BTreeMap::new(),
        );
        assert_eq!(source.missing_link, Some(source.id));
        assert_eq!(targets.counter_lookup_items().count(), 1);
    }

    #[test]
    fn page_counters_trigger_content_replays() {
        let mut targets = TargetCollector::new();
        targets.collect_anchor("fig");
        let mut target = site();
        targets.store_target("fig", &CounterTable::new(), &mut target);
        let mut source = site();
        let record = record(&source);
        targets.collect_missing_counters(
            &mut source,
            &record,
            BTreeSet::new(),
            BTreeMap::from([("fig".to_string(), BTreeSet::from(["page".to_string()]))]),
        );
        targets.finish_collecting();

        let pages = CounterTable::from([("page".to_string(), vec![4])]);
        assert!(targets.cache_target_page_counters("fig", &pages, 3, 5).is_empty());
        assert!(targets.counter_lookup_items().all(|item| item.pending));

        targets
            .counter_lookup_item_mut(source.id, &ReplayKey::Content)
            .unwrap()
            .page_maker_index = Some(1);
        let replays = targets.cache_target_page_counters("fig", &pages, 3, 5);
        assert_eq!(replays.len(), 1);
        assert_eq!(replays[0].page_maker_index, 1);
        assert_eq!(targets.item("fig").unwrap().cached_page_counter_values, pages);
    }
}
