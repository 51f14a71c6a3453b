//! Yes/no and free-text questions put to the cashier mid-command.
//!
//! Commands take `&mut dyn Prompt` so tests can script the answers.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub trait Prompt {
    /// `true` only for an explicit yes.
    fn confirm(&mut self, question: &str) -> bool;

    /// One line of input, trimmed. Empty when nothing was typed.
    fn ask(&mut self, question: &str) -> String;
}

/// Reads answers from the terminal.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        let answer = self.ask(&format!("{} [y/N]", question));
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }

    fn ask(&mut self, question: &str) -> String {
        let mut stdout = std::io::stdout();
        // A failed flush only delays the question text.
        let _ = write!(stdout, "{} ", question);
        let _ = stdout.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => line.trim().to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Canned answers, consumed in order. Runs out as "no" / "".
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        let answer = self.ask(question);
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }

    fn ask(&mut self, question: &str) -> String {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_run_out_as_no() {
        let mut prompt = ScriptedPrompt::new(["yes", "4321"]);
        assert!(prompt.confirm("Paid?"));
        assert_eq!(prompt.ask("OTP?"), "4321");
        assert!(!prompt.confirm("Again?"));
        assert_eq!(prompt.asked.len(), 3);
    }
}
