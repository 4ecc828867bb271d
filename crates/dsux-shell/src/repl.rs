//! Line-based driver loops around a [`Session`].

use std::io::Write;

use dsux_core::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Prompts, reads a line, runs it, prints the result; until `exit` or EOF.
pub async fn run_interactive<R, W>(session: &mut Session, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{}", session.prompt())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            tracing::debug!("stdin closed");
            return Ok(());
        };

        let outcome = session.run_line(&line).await;
        for text in outcome.lines() {
            writeln!(out, "{text}")?;
        }
        if outcome.is_exit() {
            return Ok(());
        }
    }
}

/// Runs `commands` in order without prompting. Stops early on `exit`.
pub async fn run_script<W: Write>(
    session: &mut Session,
    commands: &[String],
    out: &mut W,
) -> std::io::Result<()> {
    for command in commands {
        let outcome = session.run_line(command).await;
        for text in outcome.lines() {
            writeln!(out, "{text}")?;
        }
        if outcome.is_exit() {
            break;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsux_core::{Config, MemoryStore};
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()), &Config::default())
    }

    #[tokio::test]
    async fn interactive_prompts_and_stops_on_exit() {
        let mut session = session();
        let mut out = Vec::new();

        run_interactive(&mut session, &b"mkdir docs\ncd docs\nexit\npwd\n"[..], &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[/] Enter a command: Created directory /docs\n\
             [/] Enter a command: Changing directory to /docs...\n\
             [/docs] Enter a command: Exiting program...\n"
        );
    }

    #[tokio::test]
    async fn interactive_survives_errors_and_ends_at_eof() {
        let mut session = session();
        let mut out = Vec::new();

        run_interactive(&mut session, &b"bogus\ncat missing\npwd"[..], &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid command: bogus"));
        assert!(text.contains("Error: path not found: /missing"));
        assert!(text.ends_with("/\n[/] Enter a command: \n"));
    }

    #[tokio::test]
    async fn script_runs_commands_in_order() {
        let mut session = session();
        let mut out = Vec::new();
        let commands = vec![
            "write /a same".to_string(),
            "write /b same".to_string(),
            "dups".to_string(),
            "exit".to_string(),
            "touch /never".to_string(),
        ];

        run_script(&mut session, &commands, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 duplicate group(s), 1 redundant file(s)\n"));
        assert!(text.ends_with("Exiting program...\n"));
        assert!(!text.contains("/never"));
    }
}
