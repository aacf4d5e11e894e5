// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use laoshi::client::EndpointSession;
use laoshi::config;
use laoshi::course::CourseLevel;
use laoshi::repository::{CourseRepository, InMemoryCourseRepository};
use laoshi::stream::CourseEvent;

#[derive(Parser)]
#[command(name = "laoshi", about = "Streaming Chinese course generator")]
struct Cli {
    /// Path to the laoshi.yaml config file
    #[arg(long, default_value = "laoshi.yaml", env = "LAOSHI_CONFIG")]
    config: String,

    /// Endpoint name (defaults to the config's default_endpoint)
    #[arg(long, env = "LAOSHI_ENDPOINT")]
    endpoint: Option<String>,

    /// Course topic
    #[arg(long)]
    topic: String,

    /// Course level: beginner, intermediate, or advanced
    #[arg(long)]
    level: Option<String>,

    /// Number of sentences to generate
    #[arg(long)]
    sentences: Option<u32>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let level = match cli.level.as_deref() {
        Some(s) => match CourseLevel::parse(s) {
            Some(level) => Some(level),
            None => {
                tracing::error!("unknown level \"{s}\", expected beginner, intermediate, or advanced");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let source = config::FileSource::new(&cli.config);
    let config = match config::load_config(&source) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let session = match EndpointSession::from_config(&config, cli.endpoint.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let request = session.resolve_request(&cli.topic, level, cli.sentences);
    let mut run = session.start_generation(&request).await;

    let repository = InMemoryCourseRepository::new();
    let mut failed = false;

    while let Some(event) = run.next_event().await {
        match event {
            CourseEvent::Thinking { progress, .. } => {
                eprintln!("[{progress:>3}%] thinking...");
            }
            CourseEvent::Title { text, progress } => {
                println!("[{progress:>3}%] title: {text}");
            }
            CourseEvent::Description { text, progress } => {
                println!("[{progress:>3}%] description: {text}");
            }
            CourseEvent::Sentence { record, progress } => {
                println!(
                    "[{progress:>3}%] {} | {} | {}",
                    record.source_text, record.phonetic, record.target_text
                );
            }
            CourseEvent::Complete { course, progress } => {
                println!("[{progress:>3}%] complete: {} sentences", course.sentences.len());
                match repository.create_course(&course).await {
                    Ok(saved) => {
                        println!(
                            "saved course {} with {} lessons",
                            saved.id,
                            saved.lesson_ids.len()
                        );
                    }
                    Err(e) => {
                        tracing::error!("failed to save course: {e}");
                        failed = true;
                    }
                }
            }
            CourseEvent::Error { message, progress } => {
                tracing::error!(progress, "generation failed: {message}");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
