//! Terminal-backed [`Decider`].

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;

use crossterm::style::Stylize;
use tokio::runtime::RuntimeFlavor;
use emthree_core::{Confirm, Decider, VersionDecision};

/// Asks on stdout and reads answers from stdin.
///
/// Questions can arrive from several resolution pipelines at once; the lock
/// keeps each question and its answer together.
#[derive(Debug, Default)]
pub struct Prompt {
    lock: Mutex<()>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    fn ask(&self, question: &str, default: bool) -> bool {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        blocking(|| {
            let stdin = io::stdin();
            ask_with(&mut stdin.lock(), &mut io::stdout(), question, default)
        })
    }
}

/// Run a blocking read without stalling the runtime's other tasks.
///
/// Questions are asked from inside resolution pipelines, so on a multi-thread
/// runtime the worker hands its queue off for the duration of the read.
fn blocking<T>(read: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

/// Ask until the answer is recognisable. An empty answer picks `default`;
/// end of input or a read error counts as "no".
pub fn ask_with(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
    default: bool,
) -> bool {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    loop {
        let _ = write!(output, "{question} {hint}: ");
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        match parse_answer(&line) {
            Some(answer) => return answer,
            None if line.trim().is_empty() => return default,
            None => {}
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl Decider for Prompt {
    fn confirm_continue(&self, ctx: &Confirm<'_>) -> bool {
        match ctx {
            Confirm::UnsupportedPlatform {
                package,
                decision,
                platform_version,
            } => {
                let found = decision
                    .chosen
                    .as_ref()
                    .map(|v| v.version_number.as_str())
                    .unwrap_or("?");
                self.ask(
                    &format!(
                        "{} has no version for {}, the newest is {}. Install it anyway?",
                        package.cyan(),
                        platform_version,
                        found
                    ),
                    false,
                )
            }
            Confirm::AddPackages { names } => self.ask(
                &format!("Add {} to the manifest?", names.join(", ").cyan()),
                true,
            ),
            Confirm::Download { count, destination } => self.ask(
                &format!(
                    "Download {} mod{} into {}?",
                    count,
                    if *count == 1 { "" } else { "s" },
                    destination.display()
                ),
                true,
            ),
        }
    }

    fn choose_alternate(&self, package: &str, decision: &VersionDecision) -> bool {
        let (Some(release), Some(alternate)) = (&decision.chosen, &decision.alternate) else {
            return false;
        };
        self.ask(
            &format!(
                "{} has a newer {} {} than release {}. Install the {}?",
                package.cyan(),
                alternate.version_type,
                alternate.version_number,
                release.version_number,
                alternate.version_type
            ),
            false,
        )
    }

    fn confirm_overwrite(&self, path: &Path) -> bool {
        self.ask(
            &format!(
                "A manifest already exists at {}. Re-resolve and overwrite it?",
                path.display()
            ),
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, default: bool) -> (bool, String) {
        let mut reader = io::Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let answer = ask_with(&mut reader, &mut out, "Continue?", default);
        (answer, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_yes_and_no() {
        assert!(run("y\n", false).0);
        assert!(run("YES\n", false).0);
        assert!(!run("n\n", true).0);
        assert!(!run("No\n", true).0);
    }

    #[test]
    fn test_empty_takes_default() {
        assert!(run("\n", true).0);
        assert!(!run("\n", false).0);
    }

    #[test]
    fn test_reasks_on_garbage() {
        let (answer, out) = run("maybe\nsure\ny\n", false);
        assert!(answer);
        assert_eq!(out.matches("Continue? (y/N): ").count(), 3);
    }

    #[test]
    fn test_eof_is_no() {
        assert!(!run("", true).0);
        assert!(!run("maybe\n", true).0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_blocking_read_keeps_runtime_moving() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sender = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            tx.send(true).unwrap();
        });
        // With one worker, this read would starve the sender if it blocked
        // the worker outright.
        let reader = tokio::spawn(async move { blocking(move || rx.recv().unwrap()) });

        let answer = tokio::time::timeout(std::time::Duration::from_secs(5), reader)
            .await
            .expect("blocking read stalled the runtime")
            .unwrap();
        assert!(answer);
        sender.await.unwrap();
    }

    #[tokio::test]
    async fn test_blocking_on_current_thread_runs_inline() {
        assert_eq!(blocking(|| 42), 42);
    }
}
