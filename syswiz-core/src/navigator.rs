//! Menu navigation over the catalog's category tree.
//!
//! `NavigationState` is an immutable value: every transition returns a
//! fresh state and the interface layer replaces its copy wholesale. The
//! current level is always recomputed by replaying the breadcrumbs from
//! the catalog root, never by caching parent pointers.

use indexmap::IndexMap;

use crate::catalog::{Catalog, CatalogNode, OperationDefinition};
use crate::errors::{WizError, WizResult};

const TRAIL_ROOT: &str = "Home";
const TRAIL_SEPARATOR: &str = " > ";

/// What a menu row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Category,
    Operation { risky: bool },
}

/// One selectable row at the current level, in catalog insertion order.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub key: String,
    pub label: String,
    pub kind: EntryKind,
}

/// Breadcrumb position within the catalog. Cheap to clone, trivially
/// replayable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    breadcrumbs: Vec<String>,
}

impl NavigationState {
    pub fn at_root() -> Self {
        Self::default()
    }

    pub fn is_at_root(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// The current category level, replayed from the root.
    ///
    /// # Errors
    ///
    /// Fails only if the breadcrumbs no longer resolve, which would mean
    /// a transition was produced against a different catalog.
    pub fn current_level<'a>(
        &self,
        catalog: &'a Catalog,
    ) -> WizResult<&'a IndexMap<String, CatalogNode>> {
        catalog.resolve(&self.breadcrumbs).ok_or_else(|| {
            WizError::Navigation(format!(
                "breadcrumbs do not resolve: {:?}",
                self.breadcrumbs
            ))
        })
    }

    /// Descend into a sub-category of the current level.
    pub fn enter(&self, catalog: &Catalog, category_key: &str) -> WizResult<Self> {
        let level = self.current_level(catalog)?;
        match level.get(category_key) {
            Some(CatalogNode::Category(_)) => {
                let mut breadcrumbs = self.breadcrumbs.clone();
                breadcrumbs.push(category_key.to_string());
                Ok(Self { breadcrumbs })
            }
            Some(CatalogNode::Operation(_)) => Err(WizError::Navigation(format!(
                "`{category_key}` is an operation, not a category"
            ))),
            None => Err(WizError::Navigation(format!(
                "no such category at this level: `{category_key}`"
            ))),
        }
    }

    /// Pop one breadcrumb. Invalid at the root.
    pub fn go_back(&self, catalog: &Catalog) -> WizResult<Self> {
        if self.breadcrumbs.is_empty() {
            return Err(WizError::Navigation("cannot go back from the root".into()));
        }
        let mut breadcrumbs = self.breadcrumbs.clone();
        breadcrumbs.pop();
        let popped = Self { breadcrumbs };
        // Replay to prove the remaining path still resolves.
        popped.current_level(catalog)?;
        Ok(popped)
    }

    /// Look up an operation at the current level. Navigation state is
    /// unchanged; the caller dispatches the definition.
    pub fn select<'a>(
        &self,
        catalog: &'a Catalog,
        operation_key: &str,
    ) -> WizResult<&'a OperationDefinition> {
        let level = self.current_level(catalog)?;
        match level.get(operation_key) {
            Some(CatalogNode::Operation(def)) => Ok(def),
            Some(CatalogNode::Category(_)) => Err(WizError::Navigation(format!(
                "`{operation_key}` is a category, not an operation"
            ))),
            None => Err(WizError::Navigation(format!(
                "no such operation at this level: `{operation_key}`"
            ))),
        }
    }

    /// "Home > Category > ..." breadcrumb trail for the title bar.
    pub fn trail(&self) -> String {
        let mut parts = vec![TRAIL_ROOT.to_string()];
        parts.extend(self.breadcrumbs.iter().cloned());
        parts.join(TRAIL_SEPARATOR)
    }

    /// Selectable rows at the current level, in insertion order.
    pub fn entries(&self, catalog: &Catalog) -> WizResult<Vec<MenuEntry>> {
        let level = self.current_level(catalog)?;
        Ok(level
            .iter()
            .map(|(key, node)| match node {
                CatalogNode::Category(_) => MenuEntry {
                    key: key.clone(),
                    label: key.clone(),
                    kind: EntryKind::Category,
                },
                CatalogNode::Operation(def) => MenuEntry {
                    key: key.clone(),
                    label: def.title.clone(),
                    kind: EntryKind::Operation {
                        risky: def.is_risky,
                    },
                },
            })
            .collect())
    }
}
