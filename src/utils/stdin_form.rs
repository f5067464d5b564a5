//! Terminal ledger form

use std::io::{BufRead, Write};

use crate::traits::*;
use crate::types::*;

/// Prompt shown before reading the ledger
pub const LEDGER_PROMPT: &str = "Enter the copy-pasted ledger (make sure the names match the ones on the poker tab!)\n\
Finish with end-of-file (Ctrl-D); submit nothing to cancel.";

/// Reads the pasted ledger from a text stream until end of input.
///
/// Blank input counts as cancelling.
pub struct StdinForm<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> StdinForm<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }
}

impl<R: BufRead, W: Write> LedgerForm for StdinForm<R, W> {
    fn read_ledger(&mut self) -> TabResult<FormSubmission> {
        writeln!(self.prompt_out, "{}", LEDGER_PROMPT)?;
        self.prompt_out.flush()?;

        let mut text = String::new();
        for line in self.input.by_ref().lines() {
            text.push_str(&line?);
            text.push('\n');
        }

        if text.trim().is_empty() {
            Ok(FormSubmission::Cancelled)
        } else {
            Ok(FormSubmission::Submitted(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_until_end_of_input() {
        let mut prompt = Vec::new();
        let mut form = StdinForm::new(Cursor::new("Alice @ x\n1 2 3 4\n"), &mut prompt);

        let submission = form.read_ledger().unwrap();

        assert_eq!(
            submission,
            FormSubmission::Submitted("Alice @ x\n1 2 3 4\n".to_string())
        );
        assert!(String::from_utf8(prompt).unwrap().starts_with("Enter the copy-pasted ledger"));
    }

    #[test]
    fn test_blank_input_cancels() {
        let mut form = StdinForm::new(Cursor::new("\n   \n"), Vec::new());
        assert_eq!(form.read_ledger().unwrap(), FormSubmission::Cancelled);
    }
}
