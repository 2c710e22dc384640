use chrono::{Days, NaiveDate};
use stockbook_core::{
    public_api::{api_aggregate_totals, api_delete_ledger, api_save_ledger},
    LedgerEngine, LedgerSource,
};
use stockbook_domain::{Branch, Department, Field, LedgerKey, LedgerKind};

use crate::cli::core::{CliMode, CommandError, CommandResult, OpenLedger, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::format_quantity;

const OPEN_USAGE: &str = "open <YYYY-MM-DD|today|yesterday|tomorrow> [branch] [department]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "open",
            "Open a day's ledger (saved, carried forward, or from the catalog)",
            OPEN_USAGE,
            cmd_open,
        ),
        CommandEntry::new("next", "Open the next day's ledger", "next", cmd_next),
        CommandEntry::new("prev", "Open the previous day's ledger", "prev", cmd_prev),
        CommandEntry::new("show", "Show the open ledger", "show", cmd_show),
        CommandEntry::new(
            "save",
            "Save the open ledger (Cashier saves also update Bakery)",
            "save",
            cmd_save,
        ),
        CommandEntry::new(
            "reset",
            "Delete the saved ledger for the open day and reopen it",
            "reset",
            cmd_reset,
        ),
        CommandEntry::new("totals", "Show column totals", "totals", cmd_totals),
        CommandEntry::new(
            "dates",
            "List saved days for the branch and department",
            "dates",
            cmd_dates,
        ),
        CommandEntry::new("branches", "List configured branches", "branches", cmd_branches),
        CommandEntry::new("departments", "List departments", "departments", cmd_departments),
        CommandEntry::new(
            "backups",
            "List overwrite backups of the open ledger",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Restore a backup listed by `backups`",
            "restore <number>",
            cmd_restore,
        ),
    ]
}

fn cmd_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = parse_open_args(context, args)?;
    context.open_key(key)
}

fn cmd_next(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    step(context, 1)
}

fn cmd_prev(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    step(context, -1)
}

fn step(context: &mut ShellContext, days: i64) -> CommandResult {
    let key = LedgerEngine::step_day(&context.open_ledger_ref()?.record.key, days)?;
    context.open_key(key)
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.show_current()
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let open = context.open_ledger_ref()?;
    let summary = api_save_ledger(&context.engine, &open.record)?;
    io::print_success(&summary.message);
    context.current = Some(OpenLedger {
        record: summary.record,
        source: LedgerSource::Stored,
        dirty: false,
    });
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let key = context.open_ledger_ref()?.record.key.clone();
    if context.mode == CliMode::Interactive
        && !io::confirm_action(
            &context.theme,
            &format!("Delete the saved ledger {} and discard edits?", key),
            false,
        )?
    {
        io::print_info("Reset cancelled.");
        return Ok(());
    }

    if api_delete_ledger(&context.engine, &key)?.deleted {
        io::print_success(format!("Deleted saved ledger {}.", key));
    } else {
        io::print_info(format!("Nothing was saved for {}.", key));
    }
    context.open_ledger_mut()?.dirty = false;
    context.open_key(key)
}

fn cmd_totals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let record = &context.open_ledger_ref()?.record;
    for kind in LedgerKind::BOTH {
        let items = record.items(kind);
        if kind == LedgerKind::Prep && items.is_empty() {
            continue;
        }
        let totals = api_aggregate_totals(items, kind);
        output_section(format!("{} totals, {} item(s)", kind, totals.item_count));
        for field in Field::ALL {
            io::print_info(format!(
                "  {:<14} {:>10}",
                field.key(),
                format_quantity(totals.get(field))
            ));
        }
        io::print_info(format!("  {:<14} {:>10}", "ending", format_quantity(totals.ending)));
    }
    Ok(())
}

fn cmd_dates(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let (branch, department) = active_partition(context)?;
    let dates = context.engine.store().list_dates(&branch, department)?;
    if dates.is_empty() {
        io::print_info(format!("No saved ledgers for {} / {}.", branch, department));
        return Ok(());
    }
    output_section(format!("Saved days, {} / {}", branch, department));
    for date in dates {
        io::print_info(format!("  {}", date));
    }
    Ok(())
}

fn cmd_branches(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let default = context.config.resolve_branch(None).ok();
    output_section("Branches");
    for name in &context.config.branches {
        let marker = match &default {
            Some(branch) if branch.matches(name) => " (default)",
            _ => "",
        };
        io::print_info(format!("  {}{}", name, marker));
    }
    Ok(())
}

fn cmd_departments(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Departments");
    let catalog = context.engine.catalog();
    for department in Department::ALL {
        let mut line = format!(
            "  {:<14} {} item(s)",
            department.label(),
            catalog.items(department, LedgerKind::Main).len()
        );
        if catalog.has_prep(department) {
            line.push_str(&format!(
                ", {} prep item(s)",
                catalog.items(department, LedgerKind::Prep).len()
            ));
        }
        if department == context.config.default_department {
            line.push_str(" (default)");
        }
        io::print_info(line);
    }
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let key = &context.open_ledger_ref()?.record.key;
    let backups = context.store.list_backups(key)?;
    if backups.is_empty() {
        io::print_info(format!("No backups for {}.", key));
        return Ok(());
    }
    output_section(format!("Backups of {}", key));
    for (idx, backup) in backups.iter().enumerate() {
        let taken = backup
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown time".into());
        io::print_info(format!("  {:>2}. {}  {}", idx + 1, taken, backup.id));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.open_ledger_ref()?.record.key.clone();
    let number = args
        .first()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|number| *number > 0)
        .ok_or_else(|| CommandError::InvalidArguments("usage: restore <number>".into()))?;
    let backups = context.store.list_backups(&key)?;
    let backup = backups.get(number - 1).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "backup {} does not exist; `backups` lists {}",
            number,
            backups.len()
        ))
    })?;
    if !context.confirm_discard()? {
        return Ok(());
    }

    context.store.restore_backup(&key, backup)?;
    io::print_success(format!("Restored {} from {}.", key, backup.id));
    context.open_ledger_mut()?.dirty = false;
    context.open_key(key)
}

/// Branch and department of the open ledger, else the configured defaults.
fn active_partition(context: &ShellContext) -> Result<(Branch, Department), CommandError> {
    match &context.current {
        Some(open) => Ok((open.record.key.branch.clone(), open.record.key.department)),
        None => Ok((
            context.config.resolve_branch(None)?,
            context.config.default_department,
        )),
    }
}

fn parse_day(context: &ShellContext, raw: &str) -> Result<NaiveDate, CommandError> {
    let today = context.clock.today();
    let parsed = match raw.trim().to_ascii_lowercase().as_str() {
        "today" => Some(today),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    };
    parsed.ok_or_else(|| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", raw))
    })
}

/// Date first, then a branch and/or department in either order.
///
/// Omitted parts come from the open ledger, else from the configuration.
fn parse_open_args(context: &ShellContext, args: &[&str]) -> Result<LedgerKey, CommandError> {
    let (raw_date, rest) = args
        .split_first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", OPEN_USAGE)))?;
    let date = parse_day(context, raw_date)?;

    let mut branch = None;
    let mut department = None;
    for arg in rest {
        let is_branch = context
            .config
            .branches
            .iter()
            .any(|name| name.trim().eq_ignore_ascii_case(arg.trim()));
        if is_branch && branch.is_none() {
            branch = Some(context.config.resolve_branch(Some(arg))?);
            continue;
        }
        match arg.parse::<Department>() {
            Ok(parsed) if department.is_none() => department = Some(parsed),
            _ => {
                return Err(CommandError::InvalidArguments(format!(
                    "`{}` is neither a configured branch nor a department",
                    arg
                )))
            }
        }
    }

    let (default_branch, default_department) = active_partition(context)?;
    Ok(LedgerKey::new(
        date,
        branch.unwrap_or(default_branch),
        department.unwrap_or(default_department),
    ))
}
