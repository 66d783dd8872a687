use std::{collections::HashMap, sync::Arc};

use crate::commands::{CommandDefinition, CommandHandler};

/// Command name → handler. New commands are added by registering, never by
/// editing the dispatcher.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the handler's own definition name; a later registration
    /// with the same name replaces the earlier one.
    pub fn register<C: CommandHandler + 'static>(&mut self, command: C) {
        let name = command.definition().name;
        self.handlers.insert(name, Arc::new(command));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Definitions sorted by name, so registration payloads are stable.
    pub fn definitions(&self) -> Vec<CommandDefinition> {
        let mut defs = self
            .handlers
            .values()
            .map(|h| h.definition())
            .collect::<Vec<_>>();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}
