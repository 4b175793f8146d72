use crate::app::quote_app::QuoteApp;
use crate::core::sync::SyncOutcome;
use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "\
Commands:
  next                      show a random quote from the selected category
  random                    show a random quote from all categories
  add <text> | <category>   add a new quote
  filter <category|all>     select a category
  categories                list categories
  export [dir]              write quotes.json to a directory (default: .)
  import <file>             append quotes from a JSON file
  sync                      sync with the server now
  status                    show collection status
  help                      show this help
  quit                      exit";

/// 互動模式的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Next,
    Random,
    Add { text: String, category: String },
    Filter(String),
    Categories,
    Export(PathBuf),
    Import(PathBuf),
    Sync,
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Self::Next),
            "random" => Ok(Self::Random),
            "add" => {
                let (text, category) = rest
                    .rsplit_once('|')
                    .ok_or_else(|| "Usage: add <text> | <category>".to_string())?;
                Ok(Self::Add {
                    text: text.trim().to_string(),
                    category: category.trim().to_string(),
                })
            }
            "filter" => Ok(Self::Filter(rest.to_string())),
            "categories" => Ok(Self::Categories),
            "export" => {
                let dir = if rest.is_empty() { "." } else { rest };
                Ok(Self::Export(PathBuf::from(dir)))
            }
            "import" if !rest.is_empty() => Ok(Self::Import(PathBuf::from(rest))),
            "import" => Err("Usage: import <file>".to_string()),
            "sync" => Ok(Self::Sync),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
        }
    }
}

/// 逐行讀取指令直到 `quit` 或輸入結束；單一指令失敗不會結束互動
pub async fn run_session<S, V, R, W>(app: &mut QuoteApp<S, V>, input: R, out: &mut W) -> Result<()>
where
    S: KeyValueStore + Clone + 'static,
    V: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match SessionCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "❌ {}", message)?;
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }

        if let Err(e) = execute(app, command, out).await {
            tracing::debug!("Command failed: {}", e);
            writeln!(out, "❌ {}", e.user_friendly_message())?;
        }
    }

    Ok(())
}

async fn execute<S, V, W>(app: &mut QuoteApp<S, V>, command: SessionCommand, out: &mut W) -> Result<()>
where
    S: KeyValueStore + Clone + 'static,
    V: KeyValueStore,
    W: Write,
{
    match command {
        SessionCommand::Next => {
            app.next().await?;
        }
        SessionCommand::Random => {
            app.show_random().await?;
        }
        SessionCommand::Add { text, category } => {
            app.add(&text, &category).await?;
        }
        SessionCommand::Filter(category) => {
            app.select_category(&category).await?;
        }
        SessionCommand::Categories => {
            let categories = app.categories().await;
            writeln!(out, "Categories: all, {}", categories.join(", "))?;
        }
        SessionCommand::Export(dir) => {
            let path = app.export(&dir).await?;
            writeln!(out, "📁 Quotes exported to {}", path.display())?;
        }
        SessionCommand::Import(path) => {
            app.import(&path).await?;
        }
        SessionCommand::Sync => match app.sync_now().await? {
            SyncOutcome::Skipped => writeln!(out, "⏳ A sync is already running")?,
            SyncOutcome::Completed(report) => writeln!(
                out,
                "🔄 Synced: {} fetched, {} added, {} conflicts, {} overwritten",
                report.fetched, report.added, report.conflicts, report.overwritten
            )?,
        },
        SessionCommand::Status => {
            let store = app.store().lock().await;
            let last_sync = store
                .last_sync_at()
                .await?
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            writeln!(
                out,
                "{} quotes (version {}), category: {}, last sync: {}",
                store.len(),
                store.version(),
                app.selection(),
                last_sync
            )?;
        }
        SessionCommand::Help => writeln!(out, "{}", HELP)?,
        SessionCommand::Quit => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::core::display::tests::RecordingRenderer;
    use crate::core::display::QuoteDisplay;
    use crate::core::store::QuoteStore;
    use crate::core::sync::SyncEngine;
    use crate::domain::model::Quote;
    use crate::domain::ports::RemoteQuoteSource;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct EmptySource;

    #[async_trait]
    impl RemoteQuoteSource for EmptySource {
        async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
            Ok(Vec::new())
        }

        async fn publish(&self, _quote: &Quote) -> Result<()> {
            Ok(())
        }
    }

    async fn app() -> QuoteApp<MemoryStore, MemoryStore> {
        let renderer = Arc::new(RecordingRenderer::default());
        let store = QuoteStore::load(MemoryStore::new()).await.unwrap().into_shared();
        let sync = Arc::new(SyncEngine::new(store.clone(), Arc::new(EmptySource), renderer.clone()));
        QuoteApp::new(store, QuoteDisplay::new(renderer, MemoryStore::new()), sync).await
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("next"), Ok(SessionCommand::Next));
        assert_eq!(
            SessionCommand::parse("add Stay curious | Life"),
            Ok(SessionCommand::Add {
                text: "Stay curious".to_string(),
                category: "Life".to_string(),
            })
        );
        assert_eq!(
            SessionCommand::parse("filter all"),
            Ok(SessionCommand::Filter("all".to_string()))
        );
        assert_eq!(
            SessionCommand::parse("export"),
            Ok(SessionCommand::Export(PathBuf::from(".")))
        );
        assert!(SessionCommand::parse("add no separator").is_err());
        assert!(SessionCommand::parse("import").is_err());
        assert!(SessionCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_session_runs_until_quit() {
        let mut app = app().await;
        let input: &[u8] = b"add Keep going | Grit\n\ncategories\nquit\nadd ignored | After\n";
        let mut out = Vec::new();

        run_session(&mut app, input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Grit"));
        assert!(!app.categories().await.contains(&"After".to_string()));
    }

    #[tokio::test]
    async fn test_session_reports_errors_and_continues() {
        let mut app = app().await;
        let input: &[u8] = b"add  | Grit\ndance\nstatus\n";
        let mut out = Vec::new();

        run_session(&mut app, input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Please enter both the quote text and category."));
        assert!(output.contains("Unknown command 'dance'"));
        assert!(output.contains("3 quotes (version 0), category: all, last sync: never"));
    }

    #[tokio::test]
    async fn test_session_export_and_import() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app().await;
        let dir = temp_dir.path().display().to_string();
        let script = format!("export {}\nimport {}/quotes.json\nstatus\n", dir, dir);
        let mut out = Vec::new();

        run_session(&mut app, script.as_bytes(), &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Quotes exported to"));
        assert!(output.contains("6 quotes (version 1)"));
    }
}
