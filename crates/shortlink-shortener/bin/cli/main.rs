mod cli;

use crate::cli::{Command, GeneratorArg, LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use shortlink_generator::{Generator, GrowthPolicy, RandomGenerator, SeqGenerator};
use shortlink_shortener::{ShortLink, Shortener, ShortenerService, ShortenerSettings};
use shortlink_storage::{SqliteRepository, SqliteSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct CreatedLink<'a> {
    #[serde(flatten)]
    link: &'a ShortLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    short_url: Option<String>,
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        database = %config.database.display(),
        generator = %config.generator,
        delete_policy = %config.delete_policy,
        "opening short link store"
    );

    let repository = SqliteRepository::connect(
        SqliteSettings::builder()
            .path(config.database.clone())
            .delete_policy(config.delete_policy.into())
            .build(),
    )
    .await
    .context("failed to open the short link database")?;

    match config.generator {
        GeneratorArg::Random => {
            let generator = match config.grow_every {
                Some(step) => RandomGenerator::builder()
                    .length(config.code_length)
                    .growth(GrowthPolicy::builder().collisions_per_step(step).build())
                    .build(),
                None => RandomGenerator::builder()
                    .length(config.code_length)
                    .build(),
            };
            run(&config, repository, generator).await
        }
        GeneratorArg::Seq => {
            let generator = SeqGenerator::with_offset(config.seq_offset).width(config.code_length);
            run(&config, repository, generator).await
        }
    }
}

async fn run<G: Generator>(
    config: &CLI,
    repository: SqliteRepository,
    generator: G,
) -> anyhow::Result<()> {
    let settings = ShortenerSettings::builder()
        .max_attempts(config.max_attempts)
        .build();
    let service = ShortenerService::with_settings(repository, generator, settings);

    match &config.command {
        Command::Create { url } => {
            let link = service.create(url).await?;
            let created = CreatedLink {
                short_url: config.base_url.as_deref().map(|base| link.code.to_url(base)),
                link: &link,
            };
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Command::Resolve { code } => {
            println!("{}", service.resolve(code).await?);
        }
        Command::Delete { code } => {
            service.delete(code).await?;
        }
    }

    Ok(())
}
