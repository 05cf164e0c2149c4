//! WebOffice callback service binary.
//!
//! Starts the HTTP server, or computes WPS-2 authorization headers with the
//! `sign` subcommand.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weboffice_callback::{
    config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat},
    create_router, MemoryStore, RouterConfig, SignatureVerifier,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Sign(config) => run_sign(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("WebOffice callback service v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if let Some(ref app_id) = config.app_id {
        info!("  App id: {}", app_id);
    }
    if config.verify_signatures {
        info!(
            "  Signature verification: enabled (strict Content-MD5: {})",
            config.strict_content_md5
        );
    } else {
        warn!("  Signature verification: DISABLED - all callbacks are accepted unchecked");
        warn!("    Enable for production: --verify-signatures=true --app-id=... --app-secret=...");
    }
    info!("  Download URL prefix: {}", config.download_url_prefix);
    info!("  Upload URL prefix: {}", config.upload_url_prefix);

    let store = MemoryStore::new(&config.download_url_prefix, &config.upload_url_prefix);
    let router = create_router(store, build_router_config(&config));

    let addr = config.bind_address();
    info!("Server listening on http://{}", addr);
    info!("  Health check: curl http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "weboffice_callback=debug,tower_http=debug"
    } else {
        "weboffice_callback=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = if config.verify_signatures {
        RouterConfig::new(
            config.app_id.as_deref().unwrap_or(""),
            config.app_secret.as_deref().unwrap_or(""),
        )
    } else {
        RouterConfig::without_verification()
    };

    router_config = router_config.with_strict_content_md5(config.strict_content_md5);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Sign Command
// =============================================================================

fn run_sign(config: SignConfig) -> ExitCode {
    let verifier = SignatureVerifier::new(&config.app_id, &config.app_secret);

    // Mirror the verifier's checksum derivation: explicit Content-MD5 first,
    // then MD5-of-URI for bodyless reads, then empty.
    let method = config.method.to_uppercase();
    let checksum = match config.content_md5 {
        Some(ref checksum) => checksum.clone(),
        None if method == "GET" || method == "HEAD" => SignatureVerifier::uri_checksum(&config.uri),
        None => String::new(),
    };

    let authorization = verifier.authorization_header(&checksum, &config.content_type, &config.date);

    match config.format {
        SignOutputFormat::Header => {
            println!("{}", authorization);
        }
        SignOutputFormat::Json => {
            let json = serde_json::json!({
                "authorization": authorization,
                "method": method,
                "uri": config.uri,
                "date": config.date,
                "content_type": config.content_type,
                "checksum": checksum,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(pretty) => println!("{}", pretty),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
