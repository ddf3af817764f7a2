use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialogmgr::{config, theme};

use crate::app::App;

mod app;
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = cli::Args::parse();
    if args.list_themes {
        for info in theme::available_themes() {
            println!("{info}");
        }
        return Ok(());
    }

    let _guard = initialize_logging()?;
    info!("Starting dialogmgr");

    let mut config = config::load(args.config.as_deref())?;
    args.apply(&mut config);
    let theme = theme::theme_from_name(&config.theme.name);

    let mut app = App::new(config, theme).mouse(!args.no_mouse);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("dialogmgr").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "dialogmgr.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
