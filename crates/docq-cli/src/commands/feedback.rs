//! /feedback command - rate a stored answer

use super::CommandResult;
use docq_api::FeedbackRequest;

pub struct FeedbackCommand;

impl FeedbackCommand {
    /// Execute /feedback command
    ///
    /// Expects `<answer-id> <up|down> [comment]`, where the id comes from a
    /// /history listing and anything after the verdict is a free-form comment.
    pub fn execute(args: &str) -> CommandResult {
        let mut parts = args.splitn(3, ' ');
        let id = parts.next().unwrap_or("");
        let verdict = parts.next().unwrap_or("");
        let comment = parts.next().map(str::trim).filter(|c| !c.is_empty());

        let Ok(qa_id) = id.parse::<i64>() else {
            return CommandResult::Message(usage());
        };

        let is_helpful = match verdict.to_lowercase().as_str() {
            "up" | "helpful" | "yes" => true,
            "down" | "unhelpful" | "no" => false,
            _ => return CommandResult::Message(usage()),
        };

        CommandResult::SendFeedback(FeedbackRequest {
            qa_id,
            is_helpful,
            feedback: comment.map(str::to_string),
        })
    }
}

fn usage() -> String {
    "Usage: /feedback <answer-id> <up|down> [comment]  (ids come from /history)".to_string()
}
