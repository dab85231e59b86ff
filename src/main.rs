mod config;
mod error;
mod handlers;
mod models;
mod onnx;
mod page;
mod pipeline;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::pipeline::Pipeline;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::default();

    let pipeline = Pipeline::load(&settings.pipeline_path).with_context(|| {
        format!(
            "failed to load model pipeline from {}",
            settings.pipeline_path.display()
        )
    })?;
    let pipeline = web::Data::new(pipeline);

    info!(addr = %settings.addr, "server running at http://{}", settings.addr);

    HttpServer::new(move || {
        App::new()
            .app_data(pipeline.clone())
            .configure(handlers::routes)
    })
    .bind(&settings.addr)
    .with_context(|| format!("failed to bind {}", settings.addr))?
    .run()
    .await?;

    Ok(())
}
