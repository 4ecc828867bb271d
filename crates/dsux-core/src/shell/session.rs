//! Command dispatch against a [`Store`].
//!
//! A [`Session`] owns the store handle, the working directory and the
//! navigation history. [`Session::run_line`] parses and executes one line
//! of input and always produces printable output: failures become error
//! lines and never end the session.

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Config;
use crate::digest::ContentDigest;
use crate::dups::{find_duplicates, DuplicateMap, DuplicateReport, ScanError};
use crate::error::CoreError;
use crate::nav::history::History;
use crate::path::DsuPath;
use crate::store::Store;

use super::catalog::CommandCatalog;
use super::command::{parse, Command, ParseError};

/// Number of alternatives offered for an unknown command.
const MAX_SUGGESTIONS: usize = 3;

/// Errors raised while executing a command.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] CoreError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The duplicate scan exceeded the configured limit.
    #[error("duplicate scan of {path} timed out after {}s", .after.as_secs_f64())]
    Timeout { path: DsuPath, after: Duration },
}

/// Result of executing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and prompt again.
    Continue(Vec<String>),
    /// Print these lines and stop.
    Exit(Vec<String>),
}

impl Outcome {
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Continue(lines) | Self::Exit(lines) => lines,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit(_))
    }
}

/// An interactive session over one store.
pub struct Session {
    store: Arc<dyn Store>,
    catalog: CommandCatalog,
    cwd: DsuPath,
    history: History,
    prompt_suffix: String,
    scan_timeout: Option<Duration>,
    show_singletons: bool,
}

impl Session {
    /// Opens a session at `/` using the shell and scan settings of `config`.
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            catalog: CommandCatalog::new(),
            cwd: DsuPath::root(),
            history: History::with_limit(config.shell.history_limit),
            prompt_suffix: config.shell.prompt_suffix.clone(),
            scan_timeout: config.scan.timeout(),
            show_singletons: config.scan.show_singletons,
        }
    }

    /// Overrides the duplicate scan limit.
    pub fn with_scan_timeout(self, limit: Option<Duration>) -> Self {
        Self {
            scan_timeout: limit,
            ..self
        }
    }

    pub fn cwd(&self) -> &DsuPath {
        &self.cwd
    }

    /// The prompt, e.g. `[/docs] Enter a command: `.
    pub fn prompt(&self) -> String {
        format!("[{}] {}", self.cwd, self.prompt_suffix)
    }

    /// Describes the store this session is attached to.
    pub fn store_label(&self) -> String {
        self.store.label()
    }

    /// Parses and executes `line`, turning any failure into output.
    pub async fn run_line(&mut self, line: &str) -> Outcome {
        let command = match parse(&self.catalog, line) {
            Ok(Some(command)) => command,
            Ok(None) => return Outcome::Continue(Vec::new()),
            Err(ParseError::Unknown(name)) => {
                let mut lines = vec![ParseError::Unknown(name.clone()).to_string()];
                let suggestions = self.catalog.suggestions(&name, MAX_SUGGESTIONS);
                if !suggestions.is_empty() {
                    lines.push(format!("Did you mean: {}?", suggestions.join(", ")));
                }
                return Outcome::Continue(lines);
            }
            Err(err) => return Outcome::Continue(vec![err.to_string()]),
        };

        match self.execute(command).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!("command failed: {err:?}");
                Outcome::Continue(vec![format!("Error: {err}")])
            }
        }
    }

    /// Executes a parsed command.
    ///
    /// # Errors
    ///
    /// Store failures, scan failures and scan timeouts. The session state is
    /// unchanged when an error is returned.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome, SessionError> {
        tracing::debug!("executing {command:?} in {}", self.cwd);
        let lines = match command {
            Command::List { path, recursive } => self.list(path.as_deref(), recursive).await?,
            Command::Touch(path) => {
                let target = self.resolve(&path)?;
                self.store.write_file(&target, b"").await?;
                vec![format!("Created file {target}")]
            }
            Command::MakeDir(path) => {
                let target = self.resolve(&path)?;
                self.store.create_folder(&target).await?;
                vec![format!("Created directory {target}")]
            }
            Command::Remove(path) => self.remove(&path).await?,
            Command::ChangeDir(path) => self.change_dir(path.as_deref()).await?,
            Command::Back => match self.history.go_back(&self.cwd) {
                Some((history, target)) => self.enter(history, target).await?,
                None => vec!["No previous directory.".to_string()],
            },
            Command::Forward => match self.history.go_forward(&self.cwd) {
                Some((history, target)) => self.enter(history, target).await?,
                None => vec!["No next directory.".to_string()],
            },
            Command::Pwd => vec![self.cwd.to_string()],
            Command::Cat(path) => {
                let target = self.resolve(&path)?;
                let content = self.store.read_file(&target).await?;
                String::from_utf8_lossy(&content)
                    .lines()
                    .map(str::to_string)
                    .collect()
            }
            Command::Write { path, content } => {
                let target = self.resolve(&path)?;
                self.store.write_file(&target, content.as_bytes()).await?;
                vec![format!("Wrote {} byte(s) to {target}", content.len())]
            }
            Command::Hash(path) => {
                let target = self.resolve(&path)?;
                let content = self.store.read_file(&target).await?;
                vec![format!("{}  {target}", ContentDigest::of(&content))]
            }
            Command::Dups { path, json, all } => {
                self.dups(path.as_deref(), json, all || self.show_singletons)
                    .await?
            }
            Command::Help => self.help(),
            Command::Exit => return Ok(Outcome::Exit(vec!["Exiting program...".to_string()])),
        };
        Ok(Outcome::Continue(lines))
    }

    fn resolve(&self, input: &str) -> Result<DsuPath, SessionError> {
        Ok(self.cwd.resolve(input)?)
    }

    async fn list(
        &self,
        path: Option<&str>,
        recursive: bool,
    ) -> Result<Vec<String>, SessionError> {
        let target = self.resolve(path.unwrap_or("."))?;
        let entries = self.store.list_entries(&target, recursive).await?;
        Ok(entries
            .iter()
            .map(|entry| {
                let shown = if recursive {
                    entry.path().as_str()
                } else {
                    entry.name()
                };
                if entry.is_dir() {
                    format!("{shown}/")
                } else {
                    shown.to_string()
                }
            })
            .collect())
    }

    async fn remove(&mut self, path: &str) -> Result<Vec<String>, SessionError> {
        let target = self.resolve(path)?;
        if self.cwd.starts_with(&target) {
            return Ok(vec!["Cannot delete current directory".to_string()]);
        }
        self.store.delete(&target).await?;
        self.history = self.history.forget(&target);
        Ok(vec![format!("Successfully deleted {target}")])
    }

    async fn change_dir(&mut self, path: Option<&str>) -> Result<Vec<String>, SessionError> {
        let Some(path) = path else {
            let history = self.history.push(self.cwd.clone());
            return self.enter(history, DsuPath::root()).await;
        };
        if self.cwd.is_root() && path.trim_end_matches('/') == ".." {
            return Ok(vec!["Already in root directory.".to_string()]);
        }
        let target = self.resolve(path)?;
        let history = if target == self.cwd {
            self.history.clone()
        } else {
            self.history.push(self.cwd.clone())
        };
        self.enter(history, target).await
    }

    /// Switches to `target` (which must be a directory) and adopts `history`.
    async fn enter(
        &mut self,
        history: History,
        target: DsuPath,
    ) -> Result<Vec<String>, SessionError> {
        let entry = self.store.stat(&target).await?;
        if !entry.is_dir() {
            return Err(CoreError::NotADirectory(target.to_string()).into());
        }
        self.history = history;
        self.cwd = target;
        Ok(vec![format!("Changing directory to {}...", self.cwd)])
    }

    async fn dups(
        &self,
        path: Option<&str>,
        json: bool,
        all: bool,
    ) -> Result<Vec<String>, SessionError> {
        let root = self.resolve(path.unwrap_or("."))?;
        let map = self.scan(&root).await?;

        if json {
            let report = DuplicateReport::from_map(root, &map);
            return Ok(report.to_json()?.lines().map(str::to_string).collect());
        }

        let mut lines = Vec::new();
        let groups: Vec<_> = if all {
            map.groups().collect()
        } else {
            map.duplicates().collect()
        };
        for (digest, paths) in groups {
            lines.push(format!(
                "{}  ({} file(s), {} byte(s) each)",
                digest.short(),
                paths.len(),
                map.size_of(digest).unwrap_or(0)
            ));
            lines.extend(paths.iter().map(|p| format!("  {p}")));
        }
        lines.push(format!(
            "{} duplicate group(s), {} redundant file(s)",
            map.duplicate_count(),
            map.redundant_files()
        ));
        Ok(lines)
    }

    async fn scan(&self, root: &DsuPath) -> Result<DuplicateMap, SessionError> {
        let scan = find_duplicates(self.store.as_ref(), root);
        let map = match self.scan_timeout {
            Some(limit) => tokio::time::timeout(limit, scan)
                .await
                .map_err(|_| SessionError::Timeout {
                    path: root.clone(),
                    after: limit,
                })??,
            None => scan.await?,
        };
        Ok(map)
    }

    fn help(&self) -> Vec<String> {
        let mut lines = vec!["Available commands:".to_string()];
        lines.extend(
            self.catalog
                .all()
                .iter()
                .map(|d| format!("  {:<30} {}", d.usage, d.description)),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreResult;
    use crate::store::{Entry, MemoryStore};
    use async_trait::async_trait;

    fn session_with(files: &[(&str, &str)]) -> Session {
        let store =
            MemoryStore::from_files(files.iter().map(|(path, text)| (*path, text.as_bytes())))
                .unwrap();
        Session::new(Arc::new(store), &Config::default())
    }

    fn empty_session() -> Session {
        session_with(&[])
    }

    async fn run(session: &mut Session, line: &str) -> Vec<String> {
        session.run_line(line).await.lines().to_vec()
    }

    #[tokio::test]
    async fn prompt_shows_cwd() {
        let mut session = empty_session();
        assert_eq!(session.prompt(), "[/] Enter a command: ");
        run(&mut session, "mkdir docs").await;
        run(&mut session, "cd docs").await;
        assert_eq!(session.prompt(), "[/docs] Enter a command: ");
    }

    #[tokio::test]
    async fn blank_line_prints_nothing() {
        let mut session = empty_session();
        assert_eq!(
            session.run_line("   ").await,
            Outcome::Continue(Vec::new())
        );
    }

    #[tokio::test]
    async fn touch_and_mkdir_report_absolute_paths() {
        let mut session = empty_session();
        assert_eq!(
            run(&mut session, "mkdir a/b").await,
            vec!["Created directory /a/b"]
        );
        run(&mut session, "cd a").await;
        assert_eq!(
            run(&mut session, "touch note.txt").await,
            vec!["Created file /a/note.txt"]
        );
        assert_eq!(run(&mut session, "ls").await, vec!["b/", "note.txt"]);
    }

    #[tokio::test]
    async fn ls_recursive_prints_full_paths() {
        let mut session = session_with(&[("/a/x", "1"), ("/b", "2")]);
        assert_eq!(run(&mut session, "ls").await, vec!["a/", "b"]);
        assert_eq!(run(&mut session, "tree").await, vec!["/a/", "/a/x", "/b"]);
        assert_eq!(run(&mut session, "ls / -r").await, run(&mut session, "tree /").await);
    }

    #[tokio::test]
    async fn ls_missing_path_is_error_line() {
        let mut session = empty_session();
        let lines = run(&mut session, "ls nowhere").await;
        assert_eq!(lines, vec!["Error: path not found: /nowhere"]);
    }

    #[tokio::test]
    async fn cd_rules() {
        let mut session = session_with(&[("/docs/readme", "hi")]);

        assert_eq!(
            run(&mut session, "cd ..").await,
            vec!["Already in root directory."]
        );
        assert_eq!(
            run(&mut session, "cd docs").await,
            vec!["Changing directory to /docs..."]
        );
        assert_eq!(
            run(&mut session, "cd readme").await,
            vec!["Error: not a directory: /docs/readme"]
        );
        assert_eq!(session.cwd().as_str(), "/docs");
        assert_eq!(run(&mut session, "cd").await, vec!["Changing directory to /..."]);
        assert!(session.cwd().is_root());
    }

    #[tokio::test]
    async fn back_and_forward() {
        let mut session = session_with(&[("/a/b/f", "x")]);
        run(&mut session, "cd a").await;
        run(&mut session, "cd b").await;

        assert_eq!(
            run(&mut session, "back").await,
            vec!["Changing directory to /a..."]
        );
        assert_eq!(
            run(&mut session, "back").await,
            vec!["Changing directory to /..."]
        );
        assert_eq!(run(&mut session, "back").await, vec!["No previous directory."]);
        assert_eq!(
            run(&mut session, "forward").await,
            vec!["Changing directory to /a..."]
        );
        assert_eq!(run(&mut session, "pwd").await, vec!["/a"]);
    }

    #[tokio::test]
    async fn rm_refuses_cwd_and_ancestors() {
        let mut session = session_with(&[("/a/b/f", "x")]);
        run(&mut session, "cd a/b").await;

        for target in [".", "..", "/a", "/"] {
            assert_eq!(
                run(&mut session, &format!("rm {target}")).await,
                vec!["Cannot delete current directory"]
            );
        }
        assert_eq!(
            run(&mut session, "rm f").await,
            vec!["Successfully deleted /a/b/f"]
        );
    }

    #[tokio::test]
    async fn rm_forgets_history_of_deleted_directory() {
        let mut session = session_with(&[("/gone/f", "x"), ("/kept/f", "y")]);
        run(&mut session, "cd gone").await;
        run(&mut session, "cd /kept").await;
        run(&mut session, "rm /gone").await;

        assert_eq!(
            run(&mut session, "back").await,
            vec!["Changing directory to /..."]
        );
    }

    #[tokio::test]
    async fn rm_missing_is_error() {
        let mut session = empty_session();
        assert_eq!(
            run(&mut session, "rm ghost").await,
            vec!["Error: path not found: /ghost"]
        );
    }

    #[tokio::test]
    async fn write_cat_and_hash() {
        let mut session = empty_session();
        assert_eq!(
            run(&mut session, "write /n.txt hello world").await,
            vec!["Wrote 11 byte(s) to /n.txt"]
        );
        assert_eq!(run(&mut session, "cat n.txt").await, vec!["hello world"]);
        assert_eq!(
            run(&mut session, "hash n.txt").await,
            vec![format!(
                "{}  /n.txt",
                ContentDigest::of(b"hello world")
            )]
        );
    }

    #[tokio::test]
    async fn cat_directory_is_error() {
        let mut session = session_with(&[("/d/f", "x")]);
        assert_eq!(
            run(&mut session, "cat d").await,
            vec!["Error: is a directory: /d"]
        );
    }

    #[tokio::test]
    async fn dups_reports_groups_and_summary() {
        let mut session =
            session_with(&[("/a", "hello"), ("/b", "hello"), ("/c", "world")]);
        let hello = ContentDigest::of(b"hello");

        let lines = run(&mut session, "dups").await;

        assert_eq!(
            lines,
            vec![
                format!("{}  (2 file(s), 5 byte(s) each)", hello.short()),
                "  /a".to_string(),
                "  /b".to_string(),
                "1 duplicate group(s), 1 redundant file(s)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn dups_all_includes_singletons() {
        let mut session = session_with(&[("/a", "hello"), ("/c", "world")]);
        let lines = run(&mut session, "dups --all").await;
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines.last().unwrap(),
            "0 duplicate group(s), 0 redundant file(s)"
        );
    }

    #[tokio::test]
    async fn dups_json_is_parseable_report() {
        let mut session = session_with(&[("/x/a", "same"), ("/x/b", "same"), ("/y", "same")]);

        let json = run(&mut session, "dups /x --json").await.join("\n");

        let report: DuplicateReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.root.as_str(), "/x");
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.groups.len(), 1);
    }

    #[tokio::test]
    async fn dups_on_missing_directory_is_error() {
        let mut session = empty_session();
        let lines = run(&mut session, "dups /nope").await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error: failed to enumerate /nope"));
    }

    #[tokio::test]
    async fn unknown_command_suggests_alternatives() {
        let mut session = empty_session();
        let lines = run(&mut session, "mkdr x").await;
        assert_eq!(lines[0], "Invalid command: mkdr");
        assert!(lines[1].starts_with("Did you mean: mkdir"));
    }

    #[tokio::test]
    async fn usage_errors_keep_session_alive() {
        let mut session = empty_session();
        let outcome = session.run_line("touch").await;
        assert!(!outcome.is_exit());
        assert_eq!(outcome.lines(), ["Usage: touch <path>"]);
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let mut session = empty_session();
        let lines = run(&mut session, "help").await;
        assert_eq!(lines.len(), 1 + CommandCatalog::new().all().len());
        assert!(lines.iter().any(|l| l.contains("dups [path] [--json] [--all]")));
    }

    #[tokio::test]
    async fn exit_and_quit_stop_the_session() {
        let mut session = empty_session();
        for line in ["exit", "quit"] {
            let outcome = session.run_line(line).await;
            assert!(outcome.is_exit());
            assert_eq!(outcome.lines(), ["Exiting program..."]);
        }
    }

    /// Sleeps before every read.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl Store for SlowStore {
        async fn list_entries(&self, path: &DsuPath, recursive: bool) -> CoreResult<Vec<Entry>> {
            self.inner.list_entries(path, recursive).await
        }

        async fn read_file(&self, path: &DsuPath) -> CoreResult<Vec<u8>> {
            tokio::time::sleep(self.delay).await;
            self.inner.read_file(path).await
        }

        async fn write_file(&self, path: &DsuPath, content: &[u8]) -> CoreResult<()> {
            self.inner.write_file(path, content).await
        }

        async fn create_folder(&self, path: &DsuPath) -> CoreResult<()> {
            self.inner.create_folder(path).await
        }

        async fn delete(&self, path: &DsuPath) -> CoreResult<()> {
            self.inner.delete(path).await
        }

        async fn stat(&self, path: &DsuPath) -> CoreResult<Entry> {
            self.inner.stat(path).await
        }

        fn label(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn dups_timeout_is_reported() {
        let inner = MemoryStore::from_files([("/a", &b"1"[..]), ("/b", &b"1"[..])]).unwrap();
        let store = SlowStore {
            inner,
            delay: Duration::from_millis(200),
        };
        let mut session = Session::new(Arc::new(store), &Config::default())
            .with_scan_timeout(Some(Duration::from_millis(20)));

        let lines = run(&mut session, "dups").await;

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("timed out"), "{lines:?}");
        assert_eq!(run(&mut session, "pwd").await, vec!["/"]);
    }

    #[tokio::test]
    async fn store_label_is_exposed() {
        let session = empty_session();
        assert_eq!(session.store_label(), "memory (ephemeral)");
    }
}
