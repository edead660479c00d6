use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use sqlx::postgres::PgPoolOptions;

mod models;
mod repositories;
mod router;
pub mod services;
pub mod settings;
mod streak;
mod timelock;
pub mod utils;

#[derive(Parser)]
#[command(name = "streak-coach", about = "Daily accountability coach over WhatsApp")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
}

fn init_logging() -> Result<(), anyhow::Error> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging().expect("Could not initialise logging.");

    let config = settings::Settings::new(&args.config).expect("Could not load config file.");
    utils::time::parse_hhmm(&config.reminders.default_morning_time)
        .expect("reminders.default_morning_time must be HH:MM");
    utils::time::parse_hhmm(&config.reminders.default_evening_time)
        .expect("reminders.default_evening_time must be HH:MM");

    let conn = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await
        .expect("Could not connect to database.");

    sqlx::migrate!()
        .run(&conn)
        .await
        .expect("Could not run database migrations.");

    println!("[*] Starting services.");
    services::start_services(conn, config)
        .await
        .expect("Could not start services.");
}
