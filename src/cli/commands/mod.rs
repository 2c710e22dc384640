pub mod catalog;
pub mod item;
pub mod ledger;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(ledger::definitions())
        .chain(item::definitions())
        .chain(catalog::definitions())
    {
        registry.register(entry);
    }
    registry.alias("quit", "exit");
}
