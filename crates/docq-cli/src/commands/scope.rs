//! /select command - restrict answers to chosen knowledge entries

use super::CommandResult;

pub struct ScopeCommand;

impl ScopeCommand {
    /// Execute /select command
    /// - No args: open the knowledge selector (TUI) or show current scope (CLI)
    /// - "all"/"none"/"clear": answer from the whole knowledge base again
    /// - With ids: restrict answers to those entries
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenScopeSelector;
        }

        if matches!(args, "all" | "none" | "clear") {
            return CommandResult::SetScope(Vec::new());
        }

        let mut ids = Vec::new();
        for token in args
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match token.parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    return CommandResult::Message(format!(
                        "Invalid entry id '{token}'. Use /select 3,7 or /select all."
                    ));
                }
            }
        }
        CommandResult::SetScope(ids)
    }
}
