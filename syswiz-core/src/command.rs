//! Rendering a concrete command from a definition plus the operator's
//! parameter.
//!
//! The safety property lives here: operator input only ever becomes a
//! single argv element. It is never joined into a shell string, so
//! embedded whitespace, quotes and metacharacters cannot turn into
//! additional shell syntax.

use crate::catalog::{OperationDefinition, PLACEHOLDER};
use crate::errors::{WizError, WizResult};

/// A fully substituted, ready-to-execute command plus the metadata the
/// confirmation screen shows. Immutable once produced.
#[derive(Debug, Clone)]
pub struct RenderedCommand {
    pub title: String,
    pub description: String,
    pub is_risky: bool,
    argv: Vec<String>,
}

impl RenderedCommand {
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The argv actually handed to the OS, with the `sudo` prefix when
    /// the session needs elevation.
    pub fn launch_argv(&self, elevate: bool) -> Vec<String> {
        if elevate {
            let mut argv = Vec::with_capacity(self.argv.len() + 1);
            argv.push("sudo".to_string());
            argv.extend(self.argv.iter().cloned());
            argv
        } else {
            self.argv.clone()
        }
    }

    /// Shell-quoted preview of exactly what will run. Quoting mirrors
    /// the argv, so what the operator reads is what executes.
    pub fn command_line(&self, elevate: bool) -> String {
        self.launch_argv(elevate)
            .iter()
            .map(|arg| {
                shlex::try_quote(arg)
                    .map(|quoted| quoted.into_owned())
                    .unwrap_or_else(|_| format!("{arg:?}"))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Validate one line of collected input: non-empty after trimming, or
/// `None` meaning "re-prompt". The accepted value is returned unmodified;
/// quoting is the renderer's job, not the collector's.
pub fn validate_submission(raw: &str) -> Option<&str> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Pure function from `(definition, optional input)` to a rendered
/// command. Never executes anything.
///
/// # Errors
///
/// An input-requiring definition dispatched without input (or vice
/// versa) is a caller bug; the placeholder invariants themselves are
/// enforced when the catalog is built.
pub fn render(def: &OperationDefinition, input: Option<&str>) -> WizResult<RenderedCommand> {
    let argv = match (def.needs_input, input) {
        (false, None) => def.command_template.clone(),
        (true, Some(value)) => def
            .command_template
            .iter()
            .map(|arg| {
                if arg.as_str() == PLACEHOLDER {
                    value.to_string()
                } else {
                    arg.clone()
                }
            })
            .collect(),
        (true, None) => {
            return Err(WizError::Navigation(format!(
                "`{}` requires input but none was collected",
                def.title
            )))
        }
        (false, Some(_)) => {
            return Err(WizError::Navigation(format!(
                "`{}` takes no input but a value was supplied",
                def.title
            )))
        }
    };

    Ok(RenderedCommand {
        title: def.title.clone(),
        description: def.description.clone(),
        is_risky: def.is_risky,
        argv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_op() -> OperationDefinition {
        OperationDefinition::new(
            "Search Packages",
            "Search repositories for a package by keyword.",
            &["dnf", "search", PLACEHOLDER],
        )
        .with_input("Enter keyword to search:")
    }

    fn update_op() -> OperationDefinition {
        OperationDefinition::new(
            "Update System",
            "Downloads and installs updates for all packages.",
            &["dnf", "upgrade", "--refresh"],
        )
    }

    #[test]
    fn test_hostile_input_stays_one_argument() {
        let rendered = render(&search_op(), Some("my package; rm -rf /")).unwrap();
        assert_eq!(
            rendered.argv(),
            ["dnf", "search", "my package; rm -rf /"]
        );
        // The preview quotes the whole thing as one token too.
        let line = rendered.command_line(false);
        assert_eq!(line, "dnf search 'my package; rm -rf /'");
    }

    #[test]
    fn test_quotes_and_metacharacters_are_literal() {
        for hostile in ["$(reboot)", "`reboot`", "a\"b'c", "foo && bar", "|;&<>"] {
            let rendered = render(&search_op(), Some(hostile)).unwrap();
            assert_eq!(rendered.argv()[2], hostile);
            assert_eq!(rendered.argv().len(), 3);
        }
    }

    #[test]
    fn test_no_input_template_is_verbatim() {
        let rendered = render(&update_op(), None).unwrap();
        assert_eq!(rendered.argv(), ["dnf", "upgrade", "--refresh"]);
        assert_eq!(rendered.command_line(false), "dnf upgrade --refresh");
    }

    #[test]
    fn test_elevation_prefixes_sudo() {
        let rendered = render(&update_op(), None).unwrap();
        assert_eq!(
            rendered.launch_argv(true),
            ["sudo", "dnf", "upgrade", "--refresh"]
        );
        assert_eq!(rendered.command_line(true), "sudo dnf upgrade --refresh");
        // Without elevation the argv is untouched.
        assert_eq!(rendered.launch_argv(false), rendered.argv());
    }

    #[test]
    fn test_missing_input_is_a_caller_error() {
        assert!(matches!(
            render(&search_op(), None),
            Err(WizError::Navigation(_))
        ));
        assert!(matches!(
            render(&update_op(), Some("stray")),
            Err(WizError::Navigation(_))
        ));
    }

    #[test]
    fn test_submission_validation() {
        assert_eq!(validate_submission("vim"), Some("vim"));
        // Raw value is handed over unmodified, surrounding spaces included.
        assert_eq!(validate_submission("  vim  "), Some("  vim  "));
        assert_eq!(validate_submission(""), None);
        assert_eq!(validate_submission("   \t "), None);
    }
}
