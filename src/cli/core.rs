//! Dispatch, error reporting, and shared ledger helpers for the shell.

use std::io;

use stockbook_config::ConfigError;
use stockbook_core::{CoreError, KindReport, LedgerSource, OpenedLedger};
use stockbook_domain::{LedgerKey, LedgerKind};

pub use crate::cli::shell_context::{CliMode, OpenLedger, ShellContext};
pub use crate::errors::CliError;
use crate::errors::StockbookError;

use super::help;
use super::io as cli_io;
use super::output;
use super::table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();

        self.dispatch(&command, raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.suggest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn print_command_help(&self, name: &str) {
        match self.registry.get(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => self.suggest_command(name),
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let prompt = match &self.current {
            Some(open) if open.dirty => "Exit with unsaved changes?",
            _ => "Exit shell?",
        };
        cli_io::confirm_action(&self.theme, prompt, false).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::LedgerNotOpen => {
                cli_io::print_error("No ledger is open.");
                cli_io::print_hint("Try `open today` to get started.");
                Ok(())
            }
            CommandError::Core(err) if err.is_partial_sync() => {
                cli_io::print_warning(err);
                cli_io::print_hint(
                    "The linked ledger was saved; run `save` again to store this one.",
                );
                Ok(())
            }
            other => {
                cli_io::print_error(other);
                Ok(())
            }
        }
    }

    pub(crate) fn open_ledger_ref(&self) -> Result<&OpenLedger, CommandError> {
        self.current.as_ref().ok_or(CommandError::LedgerNotOpen)
    }

    pub(crate) fn open_ledger_mut(&mut self) -> Result<&mut OpenLedger, CommandError> {
        self.current.as_mut().ok_or(CommandError::LedgerNotOpen)
    }

    /// Asks before unsaved edits are dropped. Script mode warns and proceeds.
    pub(crate) fn confirm_discard(&self) -> Result<bool, CommandError> {
        let Some(open) = self.current.as_ref().filter(|open| open.dirty) else {
            return Ok(true);
        };
        let message = format!("Unsaved changes to {} will be discarded.", open.record.key);
        if self.mode == CliMode::Script {
            cli_io::print_warning(message);
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, &format!("{} Continue?", message), false)
    }

    /// Opens `key` through the load, carry-forward, catalog chain and shows it.
    pub(crate) fn open_key(&mut self, key: LedgerKey) -> CommandResult {
        if !self.confirm_discard()? {
            cli_io::print_info("Kept the current ledger.");
            return Ok(());
        }
        let OpenedLedger {
            record,
            source,
            carry_forward,
        } = self.engine.open_ledger(&key)?;

        match source {
            LedgerSource::Stored => cli_io::print_info(format!("Loaded saved ledger {}.", key)),
            LedgerSource::CarriedForward => {
                cli_io::print_info(format!(
                    "Beginnings carried forward from {}.",
                    key.previous_day().map(|prior| prior.date.to_string()).unwrap_or_default()
                ));
                let has_prep = self.engine.catalog().has_prep(key.department);
                report_carry_forward(&carry_forward, has_prep);
            }
            LedgerSource::Catalog => cli_io::print_info(format!(
                "No saved or prior-day ledger; {} starts from catalog defaults.",
                key
            )),
        }

        self.current = Some(OpenLedger {
            record,
            source,
            dirty: false,
        });
        self.show_current()
    }

    pub(crate) fn show_current(&self) -> CommandResult {
        let open = self.open_ledger_ref()?;
        let record = &open.record;
        output::section(format!(
            "{} ledger, {}, {}",
            record.key.department, record.key.branch, record.key.date
        ));
        output::plain(table::ledger_table(&record.main, LedgerKind::Main).render());
        if !record.prep.is_empty() || self.engine.catalog().has_prep(record.key.department) {
            output::section("Prep");
            output::plain(table::ledger_table(&record.prep, LedgerKind::Prep).render());
        }
        Ok(())
    }
}

fn report_carry_forward(reports: &[KindReport], has_prep: bool) {
    for report in reports {
        if report.kind == LedgerKind::Prep && !has_prep {
            continue;
        }
        if !report.source_found {
            cli_io::print_info(format!(
                "No {} rows yesterday; {} beginnings start at 0.",
                report.kind, report.kind
            ));
        } else if !report.missed.is_empty() {
            let ids: Vec<String> = report.missed.iter().map(ToString::to_string).collect();
            cli_io::print_warning(format!(
                "{} {} item(s) had no match yesterday and start at 0: {}",
                report.missed.len(),
                report.kind,
                ids.join(", ")
            ));
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No ledger is open. Use `open <date>` first.")]
    LedgerNotOpen,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] StockbookError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(StockbookError::from(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(StockbookError::from(err))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::InvalidArguments(message) => CliError::Input(message),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    context: &mut ShellContext,
    lines: &[&str],
) -> Result<(), CliError> {
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use stockbook_config::ConfigManager;
    use stockbook_core::{storage::LedgerStore, time::FixedClock};
    use stockbook_domain::{Branch, Department};
    use tempfile::TempDir;

    use super::*;

    fn context(temp: &TempDir) -> ShellContext {
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = manager.load().unwrap();
        config.data_root = Some(temp.path().join("data"));
        config.branches = vec!["Main Branch".into(), "Cebu".into()];
        config.ui_color_enabled = false;
        manager.save(&config).unwrap();
        ShellContext::with_config_manager(CliMode::Script, manager)
            .unwrap()
            .with_clock(Box::new(FixedClock(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )))
    }

    fn key(day: u32, department: Department) -> LedgerKey {
        LedgerKey::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            Branch::new("Main Branch").unwrap(),
            department,
        )
    }

    #[test]
    fn cashier_save_updates_bakery_from_the_shell() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp);
        process_script(
            &mut ctx,
            &["open today Cashier", "set 1 delivery 7", "save", "exit"],
        )
        .unwrap();

        let bakery = ctx
            .store
            .load(&key(1, Department::Bakery))
            .unwrap()
            .expect("bakery synthesized");
        assert_eq!(bakery.main[0].cashier_out, 7.0);
        assert_eq!(bakery.main[0].production, 7.0);
        assert!(!ctx.current.as_ref().unwrap().dirty);
    }

    #[test]
    fn next_day_carries_endings_forward() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp);
        process_script(
            &mut ctx,
            &[
                "open 2024-02-29 Bar",
                "set 2 production 12",
                "set 2 used 5",
                "save",
                "next",
            ],
        )
        .unwrap();

        let open = ctx.current.as_ref().unwrap();
        assert_eq!(open.record.key, key(1, Department::Bar));
        assert_eq!(open.source, LedgerSource::CarriedForward);
        assert_eq!(open.record.main[1].beginning, 7.0);
        assert_eq!(open.record.main[1].ending, 7.0);
    }

    #[test]
    fn reset_removes_the_saved_record() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp);
        process_script(
            &mut ctx,
            &["open today Commissary", "set 1 used 2", "save", "reset"],
        )
        .unwrap();

        assert!(ctx.store.load(&key(1, Department::Commissary)).unwrap().is_none());
        let open = ctx.current.as_ref().unwrap();
        assert_eq!(open.source, LedgerSource::Catalog);
        assert_eq!(open.record.main[0].used, 0.0);
    }

    #[test]
    fn bad_input_is_reported_without_stopping_the_script() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp);
        process_script(
            &mut ctx,
            &[
                "save",
                "open someday",
                "open today Davao",
                "open today Cebu Bakery",
                "set 1 flavour 3",
                "set 999 used 3",
            ],
        )
        .unwrap();

        let open = ctx.current.as_ref().unwrap();
        assert_eq!(open.record.key.branch.as_str(), "Cebu");
        assert_eq!(open.record.key.department, Department::Bakery);
        assert!(!open.dirty);
    }
}
