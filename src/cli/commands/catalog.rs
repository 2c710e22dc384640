use stockbook_config::save_catalog;
use stockbook_domain::{Department, LedgerKind, LineItem};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const PREP_FLAG: &str = "--prep";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "catalog",
            "List catalog items for a department",
            "catalog [department]",
            cmd_catalog,
        ),
        CommandEntry::new(
            "catalog-add",
            "Add an item to a department's catalog",
            "catalog-add <department> <name...> [--prep]",
            cmd_catalog_add,
        ),
    ]
}

fn cmd_catalog(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let department = match args.first() {
        Some(raw) => parse_department(raw)?,
        None => context
            .current
            .as_ref()
            .map(|open| open.record.key.department)
            .unwrap_or(context.config.default_department),
    };

    let catalog = context.engine.catalog();
    for kind in LedgerKind::BOTH {
        let items = catalog.items(department, kind);
        if kind == LedgerKind::Prep && items.is_empty() {
            continue;
        }
        output_section(format!("{} catalog ({})", department, kind));
        if items.is_empty() {
            io::print_info("  (no items)");
        }
        for item in items {
            io::print_info(format!("  {:>5}  {}", item.id, item.name));
        }
    }
    Ok(())
}

fn cmd_catalog_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = if args.contains(&PREP_FLAG) {
        LedgerKind::Prep
    } else {
        LedgerKind::Main
    };
    let words: Vec<&str> = args.iter().copied().filter(|arg| *arg != PREP_FLAG).collect();
    let Some((raw_department, name_words)) = words.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: catalog-add <department> <name...> [--prep]".into(),
        ));
    };
    let department = parse_department(raw_department)?;
    let name = name_words.join(" ");

    let (catalog, id) = context
        .engine
        .catalog()
        .with_item(department, kind, name.as_str())
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    save_catalog(&context.config, &catalog)?;
    context.engine.set_catalog(catalog);
    io::print_success(format!(
        "Added {} item {} `{}` to {}.",
        kind,
        id,
        name.trim(),
        department
    ));

    if let Some(open) = context
        .current
        .as_mut()
        .filter(|open| open.record.key.department == department)
    {
        open.record
            .items_mut(kind)
            .push(LineItem::new(id, name.trim()));
        open.dirty = true;
        io::print_hint("The open ledger gained the new row; `save` to keep it.");
    }
    Ok(())
}

fn parse_department(raw: &str) -> Result<Department, CommandError> {
    raw.parse::<Department>().map_err(|err| {
        let known: Vec<&str> = Department::ALL.iter().map(|dept| dept.label()).collect();
        CommandError::InvalidArguments(format!("{}; expected one of: {}", err, known.join(", ")))
    })
}
