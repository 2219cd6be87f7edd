//! CLI smoke entry point.
//!
//! # Responsibility
//! - Run the widget scenario (save, find, find_all, delete, find) end to end.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `plainorm_cli [DB_PATH]`. Without a path an in-memory database is
//! used. `PLAINORM_LOG_DIR` enables file logging.

use plainorm_core::{
    init_logging, BasicEntityManager, ConnectionProvider, DbConfig, EntityManager, LoggingConfig,
    OrmResult, SharedConnection,
};
use std::process::ExitCode;

plainorm_core::entity! {
    #[table = "widgets"]
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Widget {
        #[id]
        id: Option<i64>,
        name: String,
        price: i64,
    }
}

const WIDGETS_DDL: &str = "CREATE TABLE IF NOT EXISTS widgets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price INTEGER NOT NULL
);";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("PLAINORM_LOG_DIR") {
        let config = LoggingConfig {
            log_dir: log_dir.into(),
            ..LoggingConfig::default()
        };
        if let Err(err) = init_logging(&config) {
            eprintln!("plainorm logging disabled: {err}");
        }
    }

    let config = match std::env::args().nth(1) {
        Some(path) => DbConfig::file(path),
        None => DbConfig::in_memory(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("plainorm error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DbConfig) -> OrmResult<()> {
    println!("plainorm_core version={}", plainorm_core::core_version());

    // One shared connection keeps an in-memory database alive across calls.
    let provider = SharedConnection::open(config)?;
    provider.acquire()?.execute_batch(WIDGETS_DDL)?;
    let manager = BasicEntityManager::builder(provider)
        .register::<Widget>()
        .build()?;

    let mut bolt = Widget {
        id: None,
        name: "bolt".to_string(),
        price: 5,
    };
    manager.save(&mut bolt)?;
    println!("saved {bolt:?}");

    let found: Option<Widget> = manager.find(bolt.id)?;
    println!("find({:?}) -> {found:?}", bolt.id);

    let all: Vec<Widget> = manager.find_all()?;
    println!("find_all -> {} row(s)", all.len());

    println!("delete -> {:?}", manager.delete(&bolt)?);

    let after: Option<Widget> = manager.find(bolt.id)?;
    println!("find({:?}) after delete -> {after:?}", bolt.id);
    Ok(())
}
