use super::{is_quit, Prompter};
use crate::duration;
use crate::error::{PimError, PimResult};
use crate::filter::split_csv;

/// One (role, target) line of the activation confirmation.
#[derive(Debug, Clone)]
pub struct PlannedActivation {
    pub role_name: String,
    pub target_display: String,
}

impl<'c> Prompter<'c> {
    /// Ask a yes/no question; blank answers take `default`.
    pub fn yes_no(&mut self, question: &str, default: bool) -> PimResult<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {}: ", question, hint))?;
            let answer = answer.trim().to_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                a if is_quit(a) => return Err(PimError::Cancelled),
                _ => self.say("❌ Please answer 'y' or 'n'."),
            }
        }
    }

    /// Ask until a non-empty justification is given.
    pub fn justification(&mut self) -> PimResult<String> {
        loop {
            let answer = self.ask("Justification: ")?;
            let answer = answer.trim();
            if is_quit(answer) {
                return Err(PimError::Cancelled);
            }
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            self.say("❌ Justification cannot be empty.");
        }
    }

    /// Ask for an activation window; blank keeps `default_minutes`.
    pub fn duration(&mut self, default_minutes: u32) -> PimResult<u32> {
        loop {
            let answer = self.ask(&format!(
                "Duration (e.g. 1h, 90m, 1h30m) [default {}]: ",
                duration::format_minutes(default_minutes)
            ))?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default_minutes);
            }
            if is_quit(answer) {
                return Err(PimError::Cancelled);
            }
            match duration::parse_duration(answer).and_then(duration::validate_minutes) {
                Ok(minutes) => return Ok(minutes),
                Err(e) => self.say(&format!("❌ {}", e)),
            }
        }
    }

    /// Ask for a comma-separated list; blank means none.
    pub fn csv(&mut self, label: &str) -> PimResult<Vec<String>> {
        let answer = self.ask(&format!("{} (comma-separated, blank to skip): ", label))?;
        if is_quit(answer.trim()) {
            return Err(PimError::Cancelled);
        }
        Ok(split_csv(&answer))
    }

    /// Show the whole batch and require one affirmative answer for it.
    /// Declining is a cancellation.
    pub fn confirm_activation(
        &mut self,
        planned: &[PlannedActivation],
        minutes: u32,
        justification: &str,
    ) -> PimResult<()> {
        self.say("\nAbout to activate:");
        for (i, item) in planned.iter().enumerate() {
            self.say(&format!("  {:2}) {} @ {}", i + 1, item.role_name, item.target_display));
        }
        self.say(&format!("  Duration      : {}", duration::format_minutes(minutes)));
        self.say(&format!("  Justification : {}", justification));

        if self.yes_no("Proceed?", false)? {
            Ok(())
        } else {
            Err(PimError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;
    use crate::prompt::LineConsole;
    use std::io::Cursor;

    fn run<T>(script: &str, f: impl FnOnce(&mut Prompter) -> T) -> (T, String) {
        let mut console = LineConsole::new(Cursor::new(script.to_string()), Vec::new());
        let out = {
            let mut prompter = Prompter::new(&mut console, PromptConfig::default());
            f(&mut prompter)
        };
        (out, console.transcript())
    }

    #[test]
    fn test_yes_no_defaults_and_retries() {
        let (answer, _) = run("\n", |p| p.yes_no("Add filters?", false));
        assert!(!answer.unwrap());

        let (answer, transcript) = run("maybe\nYes\n", |p| p.yes_no("Add filters?", false));
        assert!(answer.unwrap());
        assert!(transcript.contains("Add filters? [y/N]: "));
        assert!(transcript.contains("❌ Please answer 'y' or 'n'."));
    }

    #[test]
    fn test_justification_rejects_blank() {
        let (answer, transcript) = run("  \nPatch prod\n", |p| p.justification());
        assert_eq!(answer.unwrap(), "Patch prod");
        assert!(transcript.contains("❌ Justification cannot be empty."));
    }

    #[test]
    fn test_duration_is_strict_for_operator_input() {
        let (answer, transcript) = run("45m\n1h30m\n", |p| p.duration(60));
        assert_eq!(answer.unwrap(), 90);
        assert!(transcript.contains("multiple of 30"));

        let (answer, _) = run("\n", |p| p.duration(120));
        assert_eq!(answer.unwrap(), 120);
    }

    #[test]
    fn test_csv_splits_and_trims() {
        let (answer, _) = run(" platform , ,core\n", |p| p.csv("Subscription filter(s)"));
        assert_eq!(answer.unwrap(), vec!["platform", "core"]);
    }

    #[test]
    fn test_declined_confirmation_is_cancelled() {
        let planned = vec![PlannedActivation {
            role_name: "Owner".to_string(),
            target_display: "Platform".to_string(),
        }];
        let (answer, transcript) = run("n\n", |p| p.confirm_activation(&planned, 90, "fix"));
        assert!(matches!(answer, Err(PimError::Cancelled)));
        assert!(transcript.contains("   1) Owner @ Platform"));
        assert!(transcript.contains("1 hour(s) 30 minute(s)"));
        assert!(transcript.contains("Proceed? [y/N]: "));
    }
}
