//! The command catalog: a static, read-only registry of DNF operations
//! grouped into categories.
//!
//! The catalog is built once at process start and validated up front:
//! an operation that wants input must carry exactly one `{}` placeholder
//! in its argv template, and one that does not must carry none. A
//! violation is a build error, not something the runtime has to handle.

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

use crate::errors::{WizError, WizResult};

/// The single substitution marker allowed in a command template.
pub const PLACEHOLDER: &str = "{}";

/// One selectable action: what it is called, what it does, and the argv
/// it expands to.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub title: String,
    pub description: String,
    /// Ordered argv. At most one element is the `{}` placeholder.
    pub command_template: Vec<String>,
    /// Destructive or hard to reverse (removal, rollback, cache purge).
    pub is_risky: bool,
    pub needs_input: bool,
    /// Shown when `needs_input` is true.
    pub input_prompt: Option<String>,
}

impl OperationDefinition {
    pub fn new(title: &str, description: &str, template: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            command_template: template.iter().map(|s| (*s).to_string()).collect(),
            is_risky: false,
            needs_input: false,
            input_prompt: None,
        }
    }

    #[must_use]
    pub fn risky(mut self) -> Self {
        self.is_risky = true;
        self
    }

    #[must_use]
    pub fn with_input(mut self, prompt: &str) -> Self {
        self.needs_input = true;
        self.input_prompt = Some(prompt.to_string());
        self
    }

    fn placeholder_count(&self) -> usize {
        self.command_template
            .iter()
            .filter(|arg| arg.as_str() == PLACEHOLDER)
            .count()
    }

    /// Check the placeholder invariant for this definition alone.
    fn validate(&self) -> WizResult<()> {
        let integrity = |problem: String| WizError::CatalogIntegrity {
            title: self.title.clone(),
            problem,
        };

        if self.command_template.is_empty() {
            return Err(integrity("command template is empty".to_string()));
        }

        // A `{}` buried inside a longer argument would splice operator
        // input into surrounding text; only a standalone element counts.
        if let Some(arg) = self
            .command_template
            .iter()
            .find(|arg| arg.contains(PLACEHOLDER) && arg.as_str() != PLACEHOLDER)
        {
            return Err(integrity(format!(
                "placeholder embedded in argument `{arg}`; it must be a standalone argv element"
            )));
        }

        match (self.needs_input, self.placeholder_count()) {
            (true, 1) | (false, 0) => Ok(()),
            (true, n) => Err(integrity(format!(
                "needs input but template has {n} placeholders (expected exactly 1)"
            ))),
            (false, n) => Err(integrity(format!(
                "takes no input but template has {n} placeholders"
            ))),
        }
    }
}

impl Display for OperationDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} ({})", self.title, self.description)
    }
}

/// A node in the category tree. Explicitly tagged so traversal is
/// exhaustive instead of inferred from runtime type.
#[derive(Debug, Clone)]
pub enum CatalogNode {
    Category(IndexMap<String, CatalogNode>),
    Operation(OperationDefinition),
}

/// The full category tree. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: IndexMap<String, CatalogNode>,
}

impl Catalog {
    /// Build a catalog, failing fast on any placeholder violation.
    pub fn new(root: IndexMap<String, CatalogNode>) -> WizResult<Self> {
        validate_level(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &IndexMap<String, CatalogNode> {
        &self.root
    }

    /// Replay a breadcrumb path from the root down to a category level.
    /// Returns `None` if any key is missing or names an operation.
    pub fn resolve<'a>(&'a self, path: &[String]) -> Option<&'a IndexMap<String, CatalogNode>> {
        let mut level = &self.root;
        for key in path {
            match level.get(key) {
                Some(CatalogNode::Category(children)) => level = children,
                _ => return None,
            }
        }
        Some(level)
    }

    /// The stock DNF operation set.
    pub fn stock() -> WizResult<Self> {
        let mut root = IndexMap::new();

        root.insert(
            "System Health".to_string(),
            category(vec![
                (
                    "update",
                    OperationDefinition::new(
                        "Update System",
                        "Downloads and installs updates for all packages. Safe standard procedure.",
                        &["dnf", "upgrade", "--refresh"],
                    ),
                ),
                (
                    "clean_packages",
                    OperationDefinition::new(
                        "Clean Cached Packages",
                        "Removes downloaded package files to free disk space.",
                        &["dnf", "clean", "packages"],
                    ),
                ),
                (
                    "broken",
                    OperationDefinition::new(
                        "Check Broken Dependencies",
                        "Scans for packages with missing requirements.",
                        &["dnf", "repoquery", "--unsatisfied"],
                    ),
                ),
                (
                    "orphans",
                    OperationDefinition::new(
                        "List Orphaned Packages",
                        "Lists packages installed as dependencies that are no longer needed.",
                        &["dnf", "autoremove", "--assumeno"],
                    ),
                ),
            ]),
        );

        root.insert(
            "Install / Remove".to_string(),
            category(vec![
                (
                    "search",
                    OperationDefinition::new(
                        "Search Packages",
                        "Search repositories for a package by keyword.",
                        &["dnf", "search", PLACEHOLDER],
                    )
                    .with_input("Enter keyword to search:"),
                ),
                (
                    "install",
                    OperationDefinition::new(
                        "Install Package",
                        "Installs a specific package.",
                        &["dnf", "install", PLACEHOLDER],
                    )
                    .with_input("Enter package name:"),
                ),
                (
                    "remove",
                    OperationDefinition::new(
                        "Remove Package",
                        "Removes a package. WARNING: Check dependencies before confirming.",
                        &["dnf", "remove", PLACEHOLDER],
                    )
                    .risky()
                    .with_input("Enter package name to remove:"),
                ),
                (
                    "reinstall",
                    OperationDefinition::new(
                        "Reinstall Package",
                        "Re-downloads and installs the current version of a package.",
                        &["dnf", "reinstall", PLACEHOLDER],
                    )
                    .with_input("Enter package name:"),
                ),
            ]),
        );

        root.insert(
            "Discovery".to_string(),
            category(vec![
                (
                    "list_installed",
                    OperationDefinition::new(
                        "Show Installed Packages",
                        "Lists all currently installed RPMs.",
                        &["dnf", "list", "installed"],
                    ),
                ),
                (
                    "info",
                    OperationDefinition::new(
                        "Package Information",
                        "Show details about a specific package.",
                        &["dnf", "info", PLACEHOLDER],
                    )
                    .with_input("Enter package name:"),
                ),
            ]),
        );

        root.insert(
            "Repositories".to_string(),
            category(vec![(
                "list_repos",
                OperationDefinition::new(
                    "List Enabled Repos",
                    "Shows which software sources are currently active.",
                    &["dnf", "repolist"],
                ),
            )]),
        );

        root.insert(
            "Power / Risky".to_string(),
            category(vec![
                (
                    "distro_sync",
                    OperationDefinition::new(
                        "Distro Sync",
                        "Synchronizes installed packages to the latest available versions. Can downgrade packages.",
                        &["dnf", "distro-sync"],
                    )
                    .risky(),
                ),
                (
                    "history_rollback",
                    OperationDefinition::new(
                        "Rollback (Last Transaction)",
                        "Undoes the very last DNF action. Use with extreme caution.",
                        &["dnf", "history", "undo", "last"],
                    )
                    .risky(),
                ),
                (
                    "clean_all",
                    OperationDefinition::new(
                        "Clean All Caches",
                        "Removes all cached metadata and packages. Forces full redownload next time.",
                        &["dnf", "clean", "all"],
                    )
                    .risky(),
                ),
            ]),
        );

        Self::new(root)
    }
}

fn category(operations: Vec<(&str, OperationDefinition)>) -> CatalogNode {
    CatalogNode::Category(
        operations
            .into_iter()
            .map(|(key, def)| (key.to_string(), CatalogNode::Operation(def)))
            .collect(),
    )
}

fn validate_level(level: &IndexMap<String, CatalogNode>) -> WizResult<()> {
    for node in level.values() {
        match node {
            CatalogNode::Category(children) => validate_level(children)?,
            CatalogNode::Operation(def) => def.validate()?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn singleton(key: &str, def: OperationDefinition) -> IndexMap<String, CatalogNode> {
        let mut root = IndexMap::new();
        root.insert(key.to_string(), category(vec![("op", def)]));
        root
    }

    #[test]
    fn test_stock_catalog_builds() {
        let catalog = Catalog::stock().expect("stock catalog must be valid");
        assert!(catalog.root().contains_key("System Health"));
        assert!(catalog.root().contains_key("Power / Risky"));
    }

    #[test]
    fn test_stock_catalog_placeholder_invariant() {
        let catalog = Catalog::stock().unwrap();

        fn check(level: &IndexMap<String, CatalogNode>) {
            for node in level.values() {
                match node {
                    CatalogNode::Category(children) => check(children),
                    CatalogNode::Operation(def) => {
                        let placeholders = def
                            .command_template
                            .iter()
                            .filter(|a| a.as_str() == PLACEHOLDER)
                            .count();
                        if def.needs_input {
                            assert_eq!(placeholders, 1, "{}", def.title);
                            assert!(def.input_prompt.is_some(), "{}", def.title);
                        } else {
                            assert_eq!(placeholders, 0, "{}", def.title);
                        }
                    }
                }
            }
        }
        check(catalog.root());
    }

    #[test]
    fn test_input_without_placeholder_is_rejected() {
        let def = OperationDefinition::new("Broken", "no placeholder", &["dnf", "install"])
            .with_input("Enter package name:");
        let result = Catalog::new(singleton("Cat", def));
        assert!(matches!(
            result,
            Err(WizError::CatalogIntegrity { .. })
        ));
    }

    #[test]
    fn test_placeholder_without_input_is_rejected() {
        let def = OperationDefinition::new("Broken", "stray placeholder", &["dnf", "info", "{}"]);
        let result = Catalog::new(singleton("Cat", def));
        assert!(matches!(
            result,
            Err(WizError::CatalogIntegrity { .. })
        ));
    }

    #[test]
    fn test_embedded_placeholder_is_rejected() {
        let def =
            OperationDefinition::new("Broken", "embedded", &["dnf", "install", "pkg-{}"])
                .with_input("Enter package name:");
        let result = Catalog::new(singleton("Cat", def));
        assert!(matches!(
            result,
            Err(WizError::CatalogIntegrity { .. })
        ));
    }

    #[test]
    fn test_resolve_replays_paths() {
        let catalog = Catalog::stock().unwrap();
        assert!(catalog.resolve(&[]).is_some());

        let level = catalog
            .resolve(&["Discovery".to_string()])
            .expect("Discovery is a category");
        assert!(level.contains_key("info"));

        assert!(catalog.resolve(&["No Such Category".to_string()]).is_none());
        // An operation key is not a level.
        assert!(catalog
            .resolve(&["Discovery".to_string(), "info".to_string()])
            .is_none());
    }
}
