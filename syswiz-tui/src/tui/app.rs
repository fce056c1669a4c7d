//! Application state machine for the wizard.
//!
//! One screen at a time, keyboard-driven. Navigation state is an
//! immutable value from the core; every transition replaces it
//! wholesale. Only ever offers valid choices, so a navigation error
//! surfacing here is a bug in this file.

use crossterm::event::{KeyCode, KeyEvent};
use log::error;

use syswiz_core::catalog::{Catalog, OperationDefinition};
use syswiz_core::command::{self, RenderedCommand};
use syswiz_core::exec::ExecutionResult;
use syswiz_core::navigator::{EntryKind, MenuEntry, NavigationState};

use super::input::InputField;
use crate::preflight::SystemInfo;

/// Screens of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Menu,
    Input,
    Execution,
}

/// Where the execution screen is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecPhase {
    /// Command preview shown, waiting for Proceed or Cancel.
    Confirm,
    /// Worker running; no controls until the terminal result arrives.
    Running,
    /// Terminal result shown; only "back to menu" remains.
    Done,
}

/// What the event loop should do after a key press.
pub enum InputResult {
    Continue,
    Quit,
    StartExecution(RenderedCommand),
}

/// One visible menu row.
pub enum MenuRow {
    Back,
    Entry(MenuEntry),
}

pub struct App {
    pub catalog: Catalog,
    pub nav: NavigationState,
    pub screen: Screen,
    pub system_info: SystemInfo,
    pub dry_run: bool,
    /// Prefix launches with sudo (process not already root).
    pub elevate: bool,

    // Menu screen.
    entries: Vec<MenuEntry>,
    pub selected: usize,

    // Input screen.
    pub input: InputField,
    pub input_error: Option<String>,
    pending: Option<OperationDefinition>,

    // Execution screen.
    pub rendered: Option<RenderedCommand>,
    pub exec_phase: ExecPhase,
    pub log: Vec<String>,
    pub result: Option<ExecutionResult>,
    pub exec_note: Option<String>,
}

impl App {
    pub fn new(catalog: Catalog, system_info: SystemInfo, dry_run: bool, elevate: bool) -> Self {
        let nav = NavigationState::at_root();
        let entries = nav.entries(&catalog).unwrap_or_default();
        Self {
            catalog,
            nav,
            screen: Screen::Splash,
            system_info,
            dry_run,
            elevate,
            entries,
            selected: 0,
            input: InputField::new(),
            input_error: None,
            pending: None,
            rendered: None,
            exec_phase: ExecPhase::Confirm,
            log: Vec::new(),
            result: None,
            exec_note: None,
        }
    }

    /// Rows at the current level: a back row when deep, then the
    /// catalog entries in insertion order.
    pub fn menu_rows(&self) -> Vec<MenuRow> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        if !self.nav.is_at_root() {
            rows.push(MenuRow::Back);
        }
        rows.extend(self.entries.iter().cloned().map(MenuRow::Entry));
        rows
    }

    /// Prompt text for the input screen.
    pub fn input_prompt(&self) -> String {
        self.pending
            .as_ref()
            .and_then(|def| def.input_prompt.clone())
            .unwrap_or_else(|| "Enter a value:".to_string())
    }

    /// Title of the operation awaiting input, if any.
    pub fn pending_title(&self) -> Option<&str> {
        self.pending.as_ref().map(|def| def.title.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.screen == Screen::Execution && self.exec_phase == ExecPhase::Running
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> InputResult {
        match self.screen {
            Screen::Splash => self.handle_splash(key),
            Screen::Menu => self.handle_menu(key),
            Screen::Input => self.handle_param_input(key),
            Screen::Execution => self.handle_execution(key),
        }
    }

    fn handle_splash(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Enter => {
                self.screen = Screen::Menu;
                InputResult::Continue
            }
            KeyCode::Esc | KeyCode::Char('q') => InputResult::Quit,
            _ => InputResult::Continue,
        }
    }

    fn handle_menu(&mut self, key: KeyEvent) -> InputResult {
        let row_count = self.menu_rows().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                InputResult::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < row_count {
                    self.selected += 1;
                }
                InputResult::Continue
            }
            KeyCode::Enter => {
                self.activate_selected_row();
                InputResult::Continue
            }
            KeyCode::Esc => {
                if self.nav.is_at_root() {
                    InputResult::Quit
                } else {
                    self.go_back();
                    InputResult::Continue
                }
            }
            KeyCode::Char('q') => InputResult::Quit,
            _ => InputResult::Continue,
        }
    }

    fn activate_selected_row(&mut self) {
        let rows = self.menu_rows();
        let (entry_key, kind) = match rows.get(self.selected) {
            Some(MenuRow::Back) => {
                self.go_back();
                return;
            }
            Some(MenuRow::Entry(entry)) => (entry.key.clone(), entry.kind),
            None => return,
        };

        match kind {
            EntryKind::Category => match self.nav.enter(&self.catalog, &entry_key) {
                Ok(next) => self.replace_nav(next),
                Err(err) => {
                    debug_assert!(false, "menu offered invalid category: {err}");
                    error!("menu offered invalid category: {err}");
                }
            },
            EntryKind::Operation { .. } => {
                let def = match self.nav.select(&self.catalog, &entry_key) {
                    Ok(def) => def.clone(),
                    Err(err) => {
                        debug_assert!(false, "menu offered invalid operation: {err}");
                        error!("menu offered invalid operation: {err}");
                        return;
                    }
                };
                self.dispatch_operation(def);
            }
        }
    }

    /// Hand a selected definition to the input or confirmation flow.
    fn dispatch_operation(&mut self, def: OperationDefinition) {
        if def.needs_input {
            self.input.clear();
            self.input_error = None;
            self.pending = Some(def);
            self.screen = Screen::Input;
        } else {
            match command::render(&def, None) {
                Ok(rendered) => self.show_confirmation(rendered),
                Err(err) => {
                    debug_assert!(false, "render failed for no-input op: {err}");
                    error!("render failed for `{}`: {err}", def.title);
                }
            }
        }
    }

    fn handle_param_input(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => {
                // Cancellation: back to the menu, no side effect.
                self.pending = None;
                self.input_error = None;
                self.screen = Screen::Menu;
                InputResult::Continue
            }
            KeyCode::Enter => {
                let raw = self.input.value().to_string();
                match command::validate_submission(&raw) {
                    None => {
                        // Re-prompt, not an error.
                        self.input_error = Some("Input cannot be empty.".to_string());
                    }
                    Some(value) => {
                        let Some(def) = self.pending.take() else {
                            debug_assert!(false, "input screen without a pending operation");
                            self.screen = Screen::Menu;
                            return InputResult::Continue;
                        };
                        match command::render(&def, Some(value)) {
                            Ok(rendered) => self.show_confirmation(rendered),
                            Err(err) => {
                                debug_assert!(false, "render failed: {err}");
                                error!("render failed for `{}`: {err}", def.title);
                                self.screen = Screen::Menu;
                            }
                        }
                    }
                }
                InputResult::Continue
            }
            _ => {
                if self.input.handle_key(key) {
                    self.input_error = None;
                }
                InputResult::Continue
            }
        }
    }

    fn show_confirmation(&mut self, rendered: RenderedCommand) {
        self.rendered = Some(rendered);
        self.exec_phase = ExecPhase::Confirm;
        self.log.clear();
        self.result = None;
        self.exec_note = None;
        self.screen = Screen::Execution;
    }

    fn handle_execution(&mut self, key: KeyEvent) -> InputResult {
        match self.exec_phase {
            ExecPhase::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('p') => {
                    if self.dry_run {
                        self.exec_note =
                            Some("Dry-run mode: execution is disabled.".to_string());
                        InputResult::Continue
                    } else if let Some(rendered) = self.rendered.clone() {
                        InputResult::StartExecution(rendered)
                    } else {
                        InputResult::Continue
                    }
                }
                KeyCode::Esc | KeyCode::Char('c') => {
                    // Pure navigation pop; nothing has run yet.
                    self.leave_execution();
                    InputResult::Continue
                }
                _ => InputResult::Continue,
            },
            // No controls mid-run: no kill switch exists by design.
            ExecPhase::Running => InputResult::Continue,
            ExecPhase::Done => match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    self.leave_execution();
                    InputResult::Continue
                }
                _ => InputResult::Continue,
            },
        }
    }

    fn leave_execution(&mut self) {
        self.rendered = None;
        self.exec_phase = ExecPhase::Confirm;
        self.log.clear();
        self.result = None;
        self.exec_note = None;
        self.screen = Screen::Menu;
    }

    /// Called by the event loop right before spawning the worker.
    pub fn begin_run(&mut self) {
        self.exec_phase = ExecPhase::Running;
        self.exec_note = None;
        self.log.clear();
    }

    pub fn push_line(&mut self, line: String) {
        self.log.push(line);
    }

    pub fn finish_run(&mut self, result: ExecutionResult) {
        self.result = Some(result);
        self.exec_phase = ExecPhase::Done;
    }

    fn go_back(&mut self) {
        match self.nav.go_back(&self.catalog) {
            Ok(next) => self.replace_nav(next),
            Err(err) => {
                debug_assert!(false, "back offered at root: {err}");
                error!("back offered at root: {err}");
            }
        }
    }

    fn replace_nav(&mut self, next: NavigationState) {
        match next.entries(&self.catalog) {
            Ok(entries) => {
                self.nav = next;
                self.entries = entries;
                self.selected = 0;
            }
            Err(err) => {
                debug_assert!(false, "navigation state does not resolve: {err}");
                error!("navigation state does not resolve: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syswiz_core::exec::ExecOutcome;

    fn test_app() -> App {
        let info = SystemInfo {
            os: "Fedora Linux".to_string(),
            os_version: "41".to_string(),
            dnf_version: "4.21.0".to_string(),
        };
        App::new(Catalog::stock().unwrap(), info, false, false)
    }

    fn press(app: &mut App, code: KeyCode) -> InputResult {
        app.handle_input(KeyEvent::from(code))
    }

    fn select_row_labeled(app: &mut App, label: &str) {
        let index = app
            .menu_rows()
            .iter()
            .position(|row| match row {
                MenuRow::Back => label == "..",
                MenuRow::Entry(entry) => entry.label == label,
            })
            .expect("row present");
        app.selected = index;
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_splash_enters_menu() {
        let mut app = test_app();
        assert_eq!(app.screen, Screen::Splash);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.nav.is_at_root());
    }

    #[test]
    fn test_menu_descend_and_back_row() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        select_row_labeled(&mut app, "Discovery");
        assert_eq!(app.nav.trail(), "Home > Discovery");
        assert!(matches!(app.menu_rows()[0], MenuRow::Back));

        select_row_labeled(&mut app, "..");
        assert!(app.nav.is_at_root());
    }

    #[test]
    fn test_no_input_operation_goes_straight_to_confirmation() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");

        assert_eq!(app.screen, Screen::Execution);
        assert_eq!(app.exec_phase, ExecPhase::Confirm);
        let rendered = app.rendered.as_ref().unwrap();
        assert_eq!(rendered.argv(), ["dnf", "upgrade", "--refresh"]);
    }

    #[test]
    fn test_input_operation_collects_then_confirms() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        select_row_labeled(&mut app, "Install / Remove");
        select_row_labeled(&mut app, "Search Packages");
        assert_eq!(app.screen, Screen::Input);

        for c in "ripgrep".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Execution);
        let rendered = app.rendered.as_ref().unwrap();
        assert_eq!(rendered.argv(), ["dnf", "search", "ripgrep"]);
    }

    #[test]
    fn test_empty_input_reprompts() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "Install / Remove");
        select_row_labeled(&mut app, "Search Packages");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Input);
        assert!(app.input_error.is_some());

        for c in "   ".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Input);
        assert!(app.input_error.is_some());
    }

    #[test]
    fn test_input_cancel_returns_to_menu() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "Install / Remove");
        select_row_labeled(&mut app, "Install Package");
        assert_eq!(app.screen, Screen::Input);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.nav.trail(), "Home > Install / Remove");
    }

    #[test]
    fn test_proceed_starts_execution() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");

        match press(&mut app, KeyCode::Enter) {
            InputResult::StartExecution(rendered) => {
                assert_eq!(rendered.argv(), ["dnf", "upgrade", "--refresh"]);
            }
            _ => panic!("expected StartExecution"),
        }
    }

    #[test]
    fn test_cancel_before_launch_is_a_navigation_pop() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.rendered.is_none());
    }

    #[test]
    fn test_keys_are_ignored_while_running() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");
        press(&mut app, KeyCode::Enter);
        app.begin_run();

        assert!(app.is_running());
        for code in [KeyCode::Esc, KeyCode::Enter, KeyCode::Char('q')] {
            assert!(matches!(press(&mut app, code), InputResult::Continue));
            assert_eq!(app.exec_phase, ExecPhase::Running);
        }
    }

    #[test]
    fn test_terminal_result_reenables_back_only() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");
        press(&mut app, KeyCode::Enter);
        app.begin_run();

        app.push_line("Last metadata expiration check".to_string());
        app.finish_run(ExecutionResult {
            outcome: ExecOutcome::Exited(1),
            lines: vec!["Last metadata expiration check".to_string()],
        });
        assert_eq!(app.exec_phase, ExecPhase::Done);
        // Failure leaves the wizard able to return to the menu.
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Menu);
    }

    #[test]
    fn test_dry_run_refuses_to_launch() {
        let info = SystemInfo {
            os: "Fedora Linux".to_string(),
            os_version: "41".to_string(),
            dnf_version: "4.21.0".to_string(),
        };
        let mut app = App::new(Catalog::stock().unwrap(), info, true, false);
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "System Health");
        select_row_labeled(&mut app, "Update System");

        assert!(matches!(
            press(&mut app, KeyCode::Enter),
            InputResult::Continue
        ));
        assert!(app.exec_note.is_some());
        assert_eq!(app.exec_phase, ExecPhase::Confirm);
    }

    #[test]
    fn test_risky_entries_are_flagged() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        select_row_labeled(&mut app, "Power / Risky");

        let risky = app
            .menu_rows()
            .iter()
            .filter(|row| {
                matches!(
                    row,
                    MenuRow::Entry(MenuEntry {
                        kind: EntryKind::Operation { risky: true },
                        ..
                    })
                )
            })
            .count();
        assert_eq!(risky, 3);
    }
}
