//! /graphrag command - graph index operations

use super::CommandResult;

/// A graph index operation requested from the command line or a slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphragOp {
    /// Show index status
    Status,
    /// Build the index; `rebuild` discards existing artifacts first
    Build { rebuild: bool },
    /// Delete the index
    Delete,
}

impl GraphragOp {
    /// Parse an operation name as accepted by `--graphrag` and `/graphrag`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "status" | "s" => Some(GraphragOp::Status),
            "build" | "b" => Some(GraphragOp::Build { rebuild: false }),
            "rebuild" => Some(GraphragOp::Build { rebuild: true }),
            "delete" | "d" => Some(GraphragOp::Delete),
            _ => None,
        }
    }
}

pub struct GraphragCommand;

impl GraphragCommand {
    /// Execute /graphrag command
    pub fn execute(args: &str) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message(usage());
        }

        match GraphragOp::parse(&args.to_lowercase()) {
            Some(op) => CommandResult::Graphrag(op),
            None => CommandResult::Message(format!("Unknown graph operation '{args}'.\n{}", usage())),
        }
    }
}

fn usage() -> String {
    r#"Usage: /graphrag <operation>
  status    Show whether a graph index exists and how fresh it is
  build     Build the index from the knowledge base (no-op if one exists)
  rebuild   Discard the index and build it again
  delete    Delete the index"#
        .to_string()
}
