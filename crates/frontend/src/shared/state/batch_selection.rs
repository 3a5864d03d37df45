//! Row selection for bulk operations on list views (e.g. converting a batch
//! of backorder lines at once).
//!
//! [`BatchSelection`] is the plain data structure; [`use_batch_selection`]
//! wraps it in a signal for a single list component.

use contracts::domain::a001_backorder::BackorderLine;
use leptos::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// Record that can be picked into a batch.
pub trait BatchSelectable {
    fn selection_id(&self) -> &str;
    fn order_id(&self) -> &str;
    fn product_variant_id(&self) -> &str;
    fn store_id(&self) -> Option<&str>;
    fn quantity(&self) -> i64;
}

impl BatchSelectable for BackorderLine {
    fn selection_id(&self) -> &str {
        &self.line_id
    }

    fn order_id(&self) -> &str {
        &self.order_id
    }

    fn product_variant_id(&self) -> &str {
        &self.product_variant_id
    }

    fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Ordered selection with an id index rebuilt after every change.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchSelection<T> {
    items: Vec<T>,
    ids: HashSet<String>,
}

impl<T> Default for BatchSelection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }
}

impl<T: BatchSelectable + Clone> BatchSelection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_index(&mut self) {
        self.ids = self
            .items
            .iter()
            .map(|item| item.selection_id().to_string())
            .collect();
    }

    pub fn select_item(&mut self, item: T) {
        if self.is_item_selected(item.selection_id()) {
            return;
        }
        self.items.push(item);
        self.rebuild_index();
    }

    pub fn deselect_item(&mut self, id: &str) {
        if !self.is_item_selected(id) {
            return;
        }
        self.items.retain(|item| item.selection_id() != id);
        self.rebuild_index();
    }

    pub fn toggle_item(&mut self, item: T) {
        if self.is_item_selected(item.selection_id()) {
            let id = item.selection_id().to_string();
            self.deselect_item(&id);
        } else {
            self.select_item(item);
        }
    }

    /// Replaces the selection with `items` (first occurrence wins on
    /// duplicate ids).
    pub fn select_all(&mut self, items: &[T]) {
        self.items.clear();
        self.ids.clear();
        self.merge_matching(items, |_| true);
    }

    pub fn deselect_all(&mut self) {
        self.items.clear();
        self.rebuild_index();
    }

    pub fn clear_selection(&mut self) {
        self.deselect_all();
    }

    /// Clears the selection when it holds exactly the candidates, otherwise
    /// selects exactly the candidates.
    pub fn toggle_all(&mut self, items: &[T]) {
        let candidate_ids: HashSet<&str> = items.iter().map(BatchSelectable::selection_id).collect();
        let same_set = self.ids.len() == candidate_ids.len()
            && candidate_ids.iter().all(|id| self.ids.contains(*id));
        if same_set {
            self.deselect_all();
        } else {
            self.select_all(items);
        }
    }

    pub fn is_item_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn select_by_order(&mut self, items: &[T], order_id: &str) {
        self.merge_matching(items, |item| item.order_id() == order_id);
    }

    pub fn select_by_product_variant(&mut self, items: &[T], variant_id: &str) {
        self.merge_matching(items, |item| item.product_variant_id() == variant_id);
    }

    pub fn select_by_store(&mut self, items: &[T], store_id: &str) {
        self.merge_matching(items, |item| item.store_id() == Some(store_id));
    }

    /// Appends matching candidates that are not selected yet.
    fn merge_matching(&mut self, items: &[T], predicate: impl Fn(&T) -> bool) {
        let mut seen = self.ids.clone();
        let added: Vec<T> = items
            .iter()
            .filter(|item| predicate(*item))
            .filter(|item| seen.insert(item.selection_id().to_string()))
            .cloned()
            .collect();
        if added.is_empty() {
            return;
        }
        self.items.extend(added);
        self.rebuild_index();
    }

    pub fn total_selected_quantity(&self) -> i64 {
        self.items.iter().map(BatchSelectable::quantity).sum()
    }

    pub fn selected_items(&self) -> &[T] {
        &self.items
    }

    pub fn selected_count(&self) -> usize {
        self.items.len()
    }

    /// Selected items grouped by order id, in selection order within a group.
    pub fn selected_by_order(&self) -> BTreeMap<String, Vec<&T>> {
        let mut groups: BTreeMap<String, Vec<&T>> = BTreeMap::new();
        for item in &self.items {
            groups
                .entry(item.order_id().to_string())
                .or_default()
                .push(item);
        }
        groups
    }

    /// `candidate_count` is the length of the list the selection is drawn
    /// from, `None` when the view supplied no list.
    pub fn is_all_selected(&self, candidate_count: Option<usize>) -> bool {
        match candidate_count {
            Some(count) => count > 0 && self.items.len() == count,
            None => false,
        }
    }

    pub fn is_partial_selected(&self, candidate_count: Option<usize>) -> bool {
        !self.items.is_empty() && candidate_count.map_or(true, |count| self.items.len() < count)
    }
}

/// Reactive batch selection owned by one list component.
pub struct BatchSelectionHandle<T: Send + Sync + 'static> {
    selection: RwSignal<BatchSelection<T>>,
    candidates: Option<Signal<Vec<T>>>,
}

impl<T: Send + Sync + 'static> Clone for BatchSelectionHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for BatchSelectionHandle<T> {}

/// Creates a selection for the calling component. `candidates` is the list
/// currently shown, used for the all/partial checkbox state.
pub fn use_batch_selection<T>(candidates: Option<Signal<Vec<T>>>) -> BatchSelectionHandle<T>
where
    T: BatchSelectable + Clone + Send + Sync + 'static,
{
    BatchSelectionHandle {
        selection: RwSignal::new(BatchSelection::new()),
        candidates,
    }
}

impl<T> BatchSelectionHandle<T>
where
    T: BatchSelectable + Clone + Send + Sync + 'static,
{
    fn candidate_count(&self) -> Option<usize> {
        self.candidates.map(|c| c.with(Vec::len))
    }

    pub fn selected_items(&self) -> Vec<T> {
        self.selection.with(|s| s.selected_items().to_vec())
    }

    pub fn selected_count(&self) -> usize {
        self.selection.with(BatchSelection::selected_count)
    }

    pub fn select_item(&self, item: T) {
        self.selection.update(|s| s.select_item(item));
    }

    pub fn deselect_item(&self, id: &str) {
        self.selection.update(|s| s.deselect_item(id));
    }

    pub fn toggle_item(&self, item: T) {
        self.selection.update(|s| s.toggle_item(item));
    }

    pub fn select_all(&self, items: &[T]) {
        self.selection.update(|s| s.select_all(items));
    }

    pub fn deselect_all(&self) {
        self.selection.update(BatchSelection::deselect_all);
    }

    pub fn toggle_all(&self, items: &[T]) {
        self.selection.update(|s| s.toggle_all(items));
    }

    pub fn clear_selection(&self) {
        self.selection.update(BatchSelection::clear_selection);
    }

    pub fn is_item_selected(&self, id: &str) -> bool {
        self.selection.with(|s| s.is_item_selected(id))
    }

    pub fn select_by_order(&self, items: &[T], order_id: &str) {
        self.selection.update(|s| s.select_by_order(items, order_id));
    }

    pub fn select_by_product_variant(&self, items: &[T], variant_id: &str) {
        self.selection
            .update(|s| s.select_by_product_variant(items, variant_id));
    }

    pub fn select_by_store(&self, items: &[T], store_id: &str) {
        self.selection.update(|s| s.select_by_store(items, store_id));
    }

    pub fn total_selected_quantity(&self) -> i64 {
        self.selection.with(BatchSelection::total_selected_quantity)
    }

    pub fn is_all_selected(&self) -> bool {
        let count = self.candidate_count();
        self.selection.with(|s| s.is_all_selected(count))
    }

    pub fn is_partial_selected(&self) -> bool {
        let count = self.candidate_count();
        self.selection.with(|s| s.is_partial_selected(count))
    }
}
