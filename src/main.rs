use clap::Parser;
use quote_sync::app::session::{run_session, HELP};
use quote_sync::config::Command;
use quote_sync::domain::conflict::policy_from_name;
use quote_sync::domain::ports::Renderer;
use quote_sync::utils::{logger, validation::Validate};
use quote_sync::{
    AppConfig, CliConfig, ConfirmWith, ConflictPolicy, ConsoleRenderer, HttpQuoteSource,
    JsonFileStore, MemoryStore, Quote, QuoteApp, QuoteDisplay, QuoteStore, SyncEngine,
    SyncOutcome,
};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 載入設定並套用命令列覆蓋
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    cli.apply_overrides(&mut config);

    logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());

    tracing::info!("Starting quote-sync");
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: CliConfig, config: AppConfig) -> quote_sync::Result<()> {
    let command = cli.command.unwrap_or(Command::Run { no_sync: false });

    let renderer: Arc<dyn Renderer> = Arc::new(ConsoleRenderer);
    let durable = JsonFileStore::new(&config.storage.data_dir);
    let store = QuoteStore::load(durable).await?.into_shared();

    let source = HttpQuoteSource::new(&config.sync.endpoint, &config.sync.category)
        .with_timeout(config.fetch_timeout())?
        .with_max_items(config.sync.max_items);

    let policy: Arc<dyn ConflictPolicy> = match command {
        Command::Sync { confirm: true } => Arc::new(ConfirmWith::new(prompt_overwrite)),
        _ => Arc::from(policy_from_name(&config.sync.conflict_policy)?),
    };

    let sync = Arc::new(
        SyncEngine::new(store.clone(), Arc::new(source), renderer.clone())
            .with_policy(policy)
            .with_timeout(config.fetch_timeout()),
    );

    // 一次執行 = 一個 session
    let display = QuoteDisplay::new(renderer, MemoryStore::new());
    let mut app = QuoteApp::new(store, display, sync)
        .await
        .with_publishing(config.sync.publish_new_quotes);

    match command {
        Command::Run { no_sync } => {
            println!("{}\n", HELP);
            app.start().await?;

            let handle = (!no_sync).then(|| app.start_sync(config.sync_interval()));

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let result = run_session(&mut app, stdin, &mut std::io::stdout()).await;

            if let Some(handle) = handle {
                handle.stop().await;
            }
            app.finish_publishing().await;
            result?;
        }
        Command::Show { category } => {
            match category {
                Some(category) => app.show_in(&category).await?,
                None => app.start().await?,
            };
        }
        Command::Add { text, category } => {
            let quote = app.add(&text, &category).await?;
            println!("✅ Added {}", quote);
        }
        Command::Categories => {
            for category in app.categories().await {
                println!("{}", category);
            }
        }
        Command::Filter { category } => {
            app.select_category(&category).await?;
        }
        Command::Export { dir } => {
            let path = app.export(&dir).await?;
            println!("📁 Quotes exported to {}", path.display());
        }
        Command::Import { file } => {
            let count = app.import(&file).await?;
            tracing::info!("Imported {} quotes from {}", count, file.display());
        }
        Command::Sync { .. } => match app.sync_now().await? {
            SyncOutcome::Skipped => println!("⏳ A sync is already running"),
            SyncOutcome::Completed(report) => println!(
                "🔄 Synced: {} fetched, {} added, {} conflicts, {} overwritten",
                report.fetched, report.added, report.conflicts, report.overwritten
            ),
        },
    }

    app.finish_publishing().await;
    Ok(())
}

/// `sync --confirm` 的互動確認
fn prompt_overwrite(local: &Quote, remote: &Quote) -> bool {
    tokio::task::block_in_place(|| {
        print!(
            "Conflict for \"{}\": local category '{}', server category '{}'. Use server version? [y/N] ",
            local.text, local.category, remote.category
        );
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    })
}
