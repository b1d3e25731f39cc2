// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

/// How episodes that are not on disk yet get picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Ask before every download
    Interactive,
    /// Download everything that is missing without asking
    All,
}

/// A reply to the download prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Quit,
}

impl Answer {
    /// Interpret a line typed by the user
    ///
    /// Only "n" and "q" are special. Anything else, including an empty
    /// line, counts as yes.
    pub fn from_reply(reply: &str) -> Self {
        match reply.trim() {
            "n" => Answer::No,
            "q" => Answer::Quit,
            _ => Answer::Yes,
        }
    }
}

/// What to do with a single episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A file with the derived name is already present
    AlreadyExists,
    /// Fetch the enclosure
    Download,
    /// The user declined this episode
    SkippedByUser,
    /// Stop processing the feed
    Quit,
}

/// Source of answers for the download prompt
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask whether `filename` should be downloaded
    ///
    /// Returns `None` once no more answers can be read.
    async fn ask(&self, filename: &str) -> io::Result<Option<String>>;
}

/// Prompter reading answers line by line from standard input
pub struct StdinPrompter {
    reader: Mutex<BufReader<Stdin>>,
}

impl StdinPrompter {
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for StdinPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&self, filename: &str) -> io::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("Do you want to download '{filename}'? (y/n/q) ").as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Decide what happens to the episode that would be saved at `path`
///
/// Existing files are never overwritten. A path that cannot be checked
/// counts as missing, so creating the file reports the problem for this
/// episode only. In interactive mode the end of input is treated like "q".
///
/// Errors only come from reading the answer.
pub async fn decide(
    path: &Path,
    filename: &str,
    mode: DownloadMode,
    prompter: &dyn Prompter,
) -> io::Result<Decision> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => return Ok(Decision::AlreadyExists),
        Ok(false) => {}
        Err(e) => debug!(path = %path.display(), error = %e, "Cannot check for existing file"),
    }

    if mode == DownloadMode::All {
        return Ok(Decision::Download);
    }

    let decision = match prompter.ask(filename).await? {
        None => Decision::Quit,
        Some(reply) => match Answer::from_reply(&reply) {
            Answer::Yes => Decision::Download,
            Answer::No => Decision::SkippedByUser,
            Answer::Quit => Decision::Quit,
        },
    };
    Ok(decision)
}

/// Prompter that plays back a fixed list of answers, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: std::sync::Mutex<std::collections::VecDeque<String>>,
    asked: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new(answers: &[&str]) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Filenames that were asked about, in order
    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, filename: &str) -> io::Result<Option<String>> {
        self.asked.lock().unwrap().push(filename.to_string());
        Ok(self.answers.lock().unwrap().pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NAME: &str = "20240101-Episode.mp3";

    #[test]
    fn only_n_and_q_are_special() {
        assert_eq!(Answer::from_reply("n"), Answer::No);
        assert_eq!(Answer::from_reply("q\n"), Answer::Quit);
        assert_eq!(Answer::from_reply("  n  "), Answer::No);
        assert_eq!(Answer::from_reply("y"), Answer::Yes);
        assert_eq!(Answer::from_reply(""), Answer::Yes);
        assert_eq!(Answer::from_reply("\n"), Answer::Yes);
        assert_eq!(Answer::from_reply("no"), Answer::Yes);
        assert_eq!(Answer::from_reply("N"), Answer::Yes);
        assert_eq!(Answer::from_reply("quit"), Answer::Yes);
    }

    #[tokio::test]
    async fn existing_file_is_skipped_without_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NAME);
        std::fs::write(&path, b"already here").unwrap();

        let prompter = ScriptedPrompter::new(&["y"]);
        let decision = decide(&path, NAME, DownloadMode::Interactive, &prompter)
            .await
            .unwrap();

        assert_eq!(decision, Decision::AlreadyExists);
        assert!(prompter.asked().is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn all_mode_never_prompts() {
        let dir = tempdir().unwrap();
        let prompter = ScriptedPrompter::new(&["n"]);

        let decision = decide(&dir.path().join(NAME), NAME, DownloadMode::All, &prompter)
            .await
            .unwrap();

        assert_eq!(decision, Decision::Download);
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn interactive_answers_map_to_decisions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NAME);
        let prompter = ScriptedPrompter::new(&["n\n", "q\n", "\n", "whatever\n"]);

        let mut decisions = Vec::new();
        for _ in 0..4 {
            decisions.push(
                decide(&path, NAME, DownloadMode::Interactive, &prompter)
                    .await
                    .unwrap(),
            );
        }

        assert_eq!(
            decisions,
            vec![
                Decision::SkippedByUser,
                Decision::Quit,
                Decision::Download,
                Decision::Download
            ]
        );
        assert_eq!(prompter.asked(), vec![NAME; 4]);
    }

    #[tokio::test]
    async fn unreadable_path_counts_as_missing() {
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("plain-file");
        std::fs::write(&not_a_dir, b"").unwrap();

        let prompter = ScriptedPrompter::new(&["y"]);
        let decision = decide(
            &not_a_dir.join(NAME),
            NAME,
            DownloadMode::Interactive,
            &prompter,
        )
        .await
        .unwrap();

        assert_eq!(decision, Decision::Download);
        assert_eq!(prompter.asked(), vec![NAME]);
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        let dir = tempdir().unwrap();
        let prompter = ScriptedPrompter::new(&[]);

        let decision = decide(
            &dir.path().join(NAME),
            NAME,
            DownloadMode::Interactive,
            &prompter,
        )
        .await
        .unwrap();

        assert_eq!(decision, Decision::Quit);
    }
}
