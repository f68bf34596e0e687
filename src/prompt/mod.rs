//! Line-oriented operator prompts.
//!
//! Everything interactive goes through a [`Prompter`], which wraps a
//! [`Console`] so the same flows can be driven by a terminal or by a
//! scripted buffer.

pub mod console;
pub mod inputs;
pub mod search;
pub mod selection;

pub use console::{Console, LineConsole};
pub use selection::{parse_selection, SelectionParse};

use crate::config::PromptConfig;
use crate::error::{PimError, PimResult};

/// Interactive selection and input over a console.
pub struct Prompter<'c> {
    console: &'c mut (dyn Console + Send),
    limits: PromptConfig,
}

impl<'c> Prompter<'c> {
    pub fn new(console: &'c mut (dyn Console + Send), limits: PromptConfig) -> Self {
        Self { console, limits }
    }

    pub fn say(&mut self, line: &str) {
        self.console.say(line);
    }

    pub fn ask(&mut self, message: &str) -> PimResult<String> {
        self.console.prompt(message)
    }

    /// Pick one entry of a short fixed menu by number.
    pub fn select_option<T, D>(&mut self, items: &[T], prompt: &str, render: D) -> PimResult<usize>
    where
        D: Fn(usize, &T) -> String,
    {
        if items.is_empty() {
            return Err(PimError::NoItems);
        }
        for (i, item) in items.iter().enumerate() {
            self.say(&render(i + 1, item));
        }

        loop {
            let answer = self.ask(&format!("\n{} (1-{} or 'q' to quit): ", prompt, items.len()))?;
            let answer = answer.trim();
            if is_quit(answer) {
                return Err(PimError::Cancelled);
            }
            match answer.parse::<i64>() {
                Ok(n) if n >= 1 && n as u64 <= items.len() as u64 => return Ok(n as usize - 1),
                Ok(_) => self.say(&format!("❌ Selection must be between 1 and {}.", items.len())),
                Err(_) => self.say("❌ Invalid input. Please enter a number or 'q' to quit."),
            }
        }
    }

    /// Choose one or more items by index, narrowing the list by search text
    /// as often as needed. Returns the chosen items in the order entered.
    pub fn select_many<T, D, K>(
        &mut self,
        items: &[T],
        prompt: &str,
        render: D,
        key: K,
    ) -> PimResult<Vec<T>>
    where
        T: Clone,
        D: Fn(usize, &T) -> String,
        K: Fn(&T) -> String,
    {
        if items.is_empty() {
            return Err(PimError::NoItems);
        }

        let keys: Vec<String> = items.iter().map(|item| key(item).to_lowercase()).collect();
        let original: Vec<usize> = (0..items.len()).collect();
        let mut current = original.clone();

        self.show(items, &current, &render);
        loop {
            let answer = self.ask(&format!(
                "\n{} (comma-separated numbers, search text, 'all', or 'q' to quit): ",
                prompt
            ))?;
            let answer = answer.trim();
            if answer.is_empty() {
                self.show(items, &current, &render);
                continue;
            }

            let lower = answer.to_lowercase();
            if is_quit(&lower) {
                return Err(PimError::Cancelled);
            }
            if lower == "all" || lower == "*" {
                current = original.clone();
                self.say(&format!("\nShowing all results ({}):", current.len()));
                self.show(items, &current, &render);
                continue;
            }

            match parse_selection(answer, current.len()) {
                SelectionParse::Indices(picked) => {
                    return Ok(picked.iter().map(|n| items[current[n - 1]].clone()).collect());
                }
                SelectionParse::Invalid(reason) => {
                    self.say(&format!("❌ {}", reason));
                    continue;
                }
                SelectionParse::NotIndices => {}
            }

            // Searches always run against the full list.
            let matches = search::substring_matches(&keys, &lower);
            if !matches.is_empty() {
                let total = matches.len();
                current = matches.into_iter().take(self.limits.search_limit).collect();
                if total > current.len() {
                    self.say(&format!(
                        "\n{} match(es) for {:?}, showing the first {}:",
                        total,
                        answer,
                        current.len()
                    ));
                } else {
                    self.say(&format!("\n{} match(es) for {:?}:", total, answer));
                }
                self.show(items, &current, &render);
                continue;
            }

            let ranked = search::fuzzy_rank(&keys, &lower);
            if ranked.is_empty() {
                self.say(&format!("No matches for {:?}. Try another search or type 'all'.", answer));
                continue;
            }
            current = ranked.into_iter().take(self.limits.search_limit).collect();
            self.say(&format!("\nTop {} fuzzy match(es) for {:?}:", current.len(), answer));
            self.show(items, &current, &render);
        }
    }

    /// Like [`Prompter::select_many`] but insists on exactly one item.
    pub fn select_one<T, D, K>(&mut self, items: &[T], prompt: &str, render: D, key: K) -> PimResult<T>
    where
        T: Clone,
        D: Fn(usize, &T) -> String,
        K: Fn(&T) -> String,
    {
        loop {
            let mut chosen = self.select_many(items, prompt, &render, &key)?;
            if chosen.len() == 1 {
                return Ok(chosen.remove(0));
            }
            self.say("❌ Please select exactly one entry.");
        }
    }

    fn show<T, D>(&mut self, items: &[T], view: &[usize], render: &D)
    where
        D: Fn(usize, &T) -> String,
    {
        if view.is_empty() {
            self.say("(no results)");
            return;
        }
        let shown = view.len().min(self.limits.max_display);
        for (pos, &idx) in view.iter().take(shown).enumerate() {
            self.say(&render(pos + 1, &items[idx]));
        }
        if view.len() > shown {
            self.say(&format!(
                "  ...and {} more. Narrow further or search.",
                view.len() - shown
            ));
        }
    }
}

pub(crate) fn is_quit(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit")
}
