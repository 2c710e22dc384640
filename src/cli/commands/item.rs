use stockbook_domain::{coerce_quantity, quantity, Field, ItemId, LedgerKind, PREP_ID_BASE};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::table::format_quantity;

const SET_USAGE: &str = "set <item-id> <field> <value> [--prep]";
const PREP_FLAG: &str = "--prep";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "set",
        "Set one movement field of a row; the ending is recomputed",
        SET_USAGE,
        cmd_set,
    )]
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let prep_requested = args.contains(&PREP_FLAG);
    let args: Vec<&str> = args.iter().copied().filter(|arg| *arg != PREP_FLAG).collect();
    let [raw_id, raw_field, raw_value] = args.as_slice() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", SET_USAGE)));
    };
    let id: ItemId = raw_id.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("item id `{}` must be a whole number", raw_id))
    })?;
    let field: Field = raw_field.parse().map_err(|err| {
        let known: Vec<&str> = Field::ALL.iter().map(|field| field.key()).collect();
        CommandError::InvalidArguments(format!("{}; expected one of: {}", err, known.join(", ")))
    })?;
    let value = match raw_value.trim().parse::<f64>() {
        Ok(parsed) => quantity(parsed),
        Err(_) => {
            io::print_warning(format!("`{}` is not a number; using 0.", raw_value));
            coerce_quantity(raw_value)
        }
    };

    let kind = LedgerKind::of_id(id);
    if prep_requested && kind != LedgerKind::Prep {
        return Err(CommandError::InvalidArguments(format!(
            "item {} is not a prep item; prep ids start at {}",
            id, PREP_ID_BASE
        )));
    }
    let open = context.open_ledger_mut()?;
    let key = open.record.key.clone();
    let item = open.record.item_mut(kind, id).ok_or_else(|| {
        CommandError::InvalidArguments(format!("no {} item with id {} in {}", kind, id, key))
    })?;
    item.set(field, value);
    let ending = item.refresh_ending(kind.formula());
    let name = item.name.clone();
    open.dirty = true;

    io::print_info(format!(
        "{} {} = {}; ending now {}.",
        name,
        field.key(),
        format_quantity(value),
        format_quantity(ending)
    ));
    Ok(())
}
