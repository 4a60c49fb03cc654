//! Service startup and shutdown logging

use crate::Settings;
use std::env;
use tracing::info;

/// Logs service, platform and configuration summary at startup
pub fn log_service_info(settings: &Settings) {
	let service_name = "ttv-aggregator";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== TTV Aggregator Service Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} / {}", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}
	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}
	if let Ok(config_path) = env::var("CONFIG_PATH") {
		info!("📋 Config Path: {}", config_path);
	}

	info!("🌍 Profile: {:?}", settings.environment.profile);
	info!(
		"⛓️ Chains: {}",
		settings
			.chains
			.iter()
			.map(|c| format!("{} ({})", c.name, c.chain_id))
			.collect::<Vec<_>>()
			.join(", ")
	);
	for provider in settings.enabled_providers() {
		let key = provider
			.api_key
			.as_ref()
			.map(|k| k.description())
			.unwrap_or_else(|| "no api key".to_string());
		info!(
			"🔌 Provider: {} via {} ({})",
			provider.provider_id, provider.adapter_id, key
		);
	}
	info!(
		"⏱️ Quote TTL: {}s, provider timeout: {}ms, pipeline timeout: {}ms",
		settings.quote.ttl_secs, settings.timeouts.per_provider_ms, settings.timeouts.global_ms
	);
	if settings.corridor.enabled && !settings.corridor.tokens.is_empty() {
		info!(
			"🇰🇷 Corridor on chain {}: [{}] via {}",
			settings.corridor.chain_id,
			settings.corridor.tokens.join(", "),
			settings.corridor.hub_token
		);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

pub fn log_service_shutdown() {
	info!("🛑 TTV Aggregator Service Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

pub fn log_startup_complete(bind_address: &str) {
	info!("✅ TTV Aggregator Service Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept requests");
}
