use anyhow::Context;
use aws_lambda_events::event::s3::S3Event;
use image_processor::{handler, AwsServiceProvider, Config, Dispatcher};
use lambda_runtime::{run, service_fn, LambdaEvent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        mode = ?config.processing.mode,
        "Starting image processor"
    );

    let processing = config.processing.clone();
    let dispatcher = Arc::new(Dispatcher::new(AwsServiceProvider::new(config), processing));

    let func = service_fn(move |event: LambdaEvent<S3Event>| {
        let dispatcher = dispatcher.clone();

        async move { handler(&*dispatcher, event).await }
    });

    run(func).await
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // CloudWatch adds its own timestamps
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_target(false).without_time())
        .init();
}
