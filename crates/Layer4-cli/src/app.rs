//! Component wiring and command implementations

use anyhow::{bail, Context};
use deck_backend::DeckApiClient;
use deck_foundation::{create_cache, Cache, CacheWarmer, DeckConfig};
use deck_server::DeckServer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The assembled application
pub struct DeckApp {
    config: DeckConfig,
}

impl DeckApp {
    pub fn new(config: DeckConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> Arc<DeckApiClient> {
        Arc::new(DeckApiClient::new(self.config.clone()))
    }

    /// Build the cache; the in-memory store starts its own expiry sweeper
    fn build_cache(&self) -> Arc<dyn Cache> {
        create_cache(self.config.cache_enabled, self.config.cache_ttl)
    }

    fn build_server(&self, client: Arc<DeckApiClient>, cache: Arc<dyn Cache>) -> DeckServer {
        let mut server = DeckServer::new(self.config.clone(), client, cache);
        server.register_default_tools();
        server
    }

    /// Run the MCP server until stdin closes or a shutdown signal arrives
    pub async fn start(&self) -> anyhow::Result<()> {
        let client = self.build_client();
        let cache = self.build_cache();

        // Best-effort prefetch; failures are logged inside and never fatal
        if self.config.cache_enabled {
            CacheWarmer::new(Arc::clone(&cache))
                .warm_up(client.as_ref())
                .await;
        }

        let server = Arc::new(self.build_server(client, cache));

        tokio::select! {
            result = Arc::clone(&server).start() => {
                result.context("server terminated with an error")
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, stopping server");
                Ok(())
            }
        }
    }

    /// Print the full health report; non-zero exit on error status
    pub async fn health(&self) -> anyhow::Result<()> {
        let client = self.build_client();
        let cache = self.build_cache();
        let server = self.build_server(client, cache);

        let health = server.health_check().await;
        println!("{}", serde_json::to_string_pretty(&health)?);

        if !matches!(health.status, deck_foundation::HealthState::Ok) {
            bail!("health check failed: {}", health.api.message);
        }
        Ok(())
    }

    /// Print version, resolved configuration, and call statistics
    pub async fn status(&self, json: bool) -> anyhow::Result<()> {
        let client = self.build_client();
        let cache = self.build_cache();
        let server = self.build_server(client, cache);
        let stats = server.stats();

        if json {
            let report = serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "config": {
                    "serverUrl": self.config.server_url,
                    "timeout": self.config.timeout,
                    "retryCount": self.config.retry_count,
                    "cacheEnabled": self.config.cache_enabled,
                    "logLevel": self.config.log_level,
                    "maxConcurrentRequests": self.config.max_concurrent_requests,
                },
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("QueryDeck MCP Server");
            println!("--------------------------------------------------");
            println!("Version:             {}", env!("CARGO_PKG_VERSION"));
            println!("Server URL:          {}", self.config.server_url);
            println!("Timeout:             {}ms", self.config.timeout);
            println!("Retries:             {}", self.config.retry_count);
            println!(
                "Cache:               {}",
                if self.config.cache_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("Log level:           {}", self.config.log_level);
            println!("Registered tools:    {}", server.registry().len());
            println!("Total requests:      {}", stats.total_requests);
            println!("Success rate:        {}%", stats.success_rate);

            if !stats.top_tools.is_empty() {
                println!("\nTop tools:");
                for (index, tool) in stats.top_tools.iter().enumerate() {
                    println!("{}. {}: {} calls", index + 1, tool.name, tool.count);
                }
            }
        }
        Ok(())
    }

    /// Write the statistics snapshot to a file as JSON
    pub async fn export_stats(&self, output: &Path) -> anyhow::Result<()> {
        let client = self.build_client();
        let cache = self.build_cache();
        let server = self.build_server(client, cache);

        let stats = server.stats();
        let body = serde_json::to_string_pretty(&stats)?;
        std::fs::write(output, body)
            .with_context(|| format!("failed to write {}", output.display()))?;

        println!("Statistics written to {}", output.display());
        Ok(())
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
