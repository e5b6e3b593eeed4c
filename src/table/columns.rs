//! Column visibility and display order

use std::collections::HashSet;

use crate::error::ViewError;

/// Which columns are shown, and in what order
///
/// `order` is always a permutation of the table's columns and `visible` a
/// subset of them. Neither touches row data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    columns: Vec<String>,
    visible: HashSet<String>,
    order: Vec<String>,
}

impl ColumnView {
    pub fn new(columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            visible: columns.iter().cloned().collect(),
            order: columns.to_vec(),
        }
    }

    /// Show a hidden column or hide a shown one; returns the new visibility
    pub fn toggle_visibility(&mut self, column: &str) -> Result<bool, ViewError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(ViewError::UnknownColumn(column.to_string()));
        }
        if self.visible.remove(column) {
            Ok(false)
        } else {
            self.visible.insert(column.to_string());
            Ok(true)
        }
    }

    /// Replace the display order
    ///
    /// `new_order` must contain every column exactly once; otherwise the
    /// current order is kept.
    pub fn reorder(&mut self, new_order: Vec<String>) -> Result<(), ViewError> {
        if !is_permutation(&new_order, &self.columns) {
            return Err(ViewError::NotAPermutation);
        }
        self.order = new_order;
        Ok(())
    }

    /// Put `first` at the front, the remaining columns after it in their
    /// current order
    pub fn move_to_front(&mut self, first: &[String]) -> Result<(), ViewError> {
        let mut seen = HashSet::new();
        let mut new_order = Vec::with_capacity(self.order.len());
        for column in first {
            if !self.columns.contains(column) {
                return Err(ViewError::UnknownColumn(column.clone()));
            }
            if seen.insert(column.as_str()) {
                new_order.push(column.clone());
            }
        }
        new_order.extend(
            self.order
                .iter()
                .filter(|c| !seen.contains(c.as_str()))
                .cloned(),
        );
        self.reorder(new_order)
    }

    pub fn reset(&mut self) {
        self.visible = self.columns.iter().cloned().collect();
        self.order = self.columns.clone();
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible.contains(column)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Columns to render: `order` restricted to visible ones
    pub fn displayed(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|c| self.visible.contains(*c))
            .map(String::as_str)
            .collect()
    }
}

fn is_permutation(candidate: &[String], columns: &[String]) -> bool {
    if candidate.len() != columns.len() {
        return false;
    }
    let wanted: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let mut seen = HashSet::with_capacity(candidate.len());
    candidate
        .iter()
        .all(|c| wanted.contains(c.as_str()) && seen.insert(c.as_str()))
}
