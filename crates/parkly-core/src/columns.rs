// ── Column visibility ──
//
// Ordered key → visible map over a fixed column set. The key set never
// changes after construction: unknown keys are ignored, not inserted.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::resource::{ColumnDef, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    columns: &'static [ColumnDef],
    visible: IndexMap<&'static str, bool>,
}

impl ColumnVisibility {
    /// Initialize from each column's default.
    pub fn new(columns: &'static [ColumnDef]) -> Self {
        Self {
            columns,
            visible: columns
                .iter()
                .map(|c| (c.key, c.default_visible))
                .collect(),
        }
    }

    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::new(kind.columns())
    }

    /// Flip one column. Returns `false` if the key is unknown.
    pub fn toggle(&mut self, key: &str) -> bool {
        match self.visible.get_mut(key) {
            Some(v) => {
                *v = !*v;
                true
            }
            None => false,
        }
    }

    /// Set one column. Returns `false` if the key is unknown.
    pub fn set(&mut self, key: &str, visible: bool) -> bool {
        match self.visible.get_mut(key) {
            Some(v) => {
                *v = visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle_all(&mut self, checked: bool) {
        for v in self.visible.values_mut() {
            *v = checked;
        }
    }

    pub fn is_all_selected(&self) -> bool {
        self.visible.values().all(|v| *v)
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.get(key).copied().unwrap_or(false)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.columns);
    }

    /// Visible columns in declaration order.
    pub fn visible(&self) -> impl Iterator<Item = &'static ColumnDef> + '_ {
        self.columns.iter().filter(|c| self.is_visible(c.key))
    }

    pub fn visible_keys(&self) -> Vec<&'static str> {
        self.visible().map(|c| c.key).collect()
    }

    /// Every column with its current state, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static ColumnDef, bool)> + '_ {
        self.columns.iter().map(|c| (c, self.is_visible(c.key)))
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Apply saved overrides; keys no longer in the column set are ignored.
    pub fn apply_overrides<'a>(&mut self, overrides: impl IntoIterator<Item = (&'a str, bool)>) {
        for (key, visible) in overrides {
            self.set(key, visible);
        }
    }

    /// Columns whose state differs from the default.
    pub fn overrides(&self) -> BTreeMap<String, bool> {
        self.columns
            .iter()
            .filter(|c| self.is_visible(c.key) != c.default_visible)
            .map(|c| (c.key.to_owned(), self.is_visible(c.key)))
            .collect()
    }
}
