//! Configuration management for the callback service.
//!
//! Supports command-line arguments via clap and environment variables with a
//! `WPS_` prefix, with sensible defaults for everything optional.
//!
//! # Environment Variables
//!
//! - `WPS_HOST` - Server bind address (default: 0.0.0.0)
//! - `WPS_PORT` - Server port (default: 3001)
//! - `WPS_APP_ID` - Application identifier from the WebOffice console
//! - `WPS_APP_SECRET` - Application secret from the WebOffice console
//! - `WPS_VERIFY_SIGNATURES` - Enable WPS-2 verification (default: true)
//! - `WPS_STRICT_CONTENT_MD5` - Reject unchecksummed bodies (default: false)
//! - `WPS_DOWNLOAD_URL_PREFIX` - Prefix for generated download URLs
//! - `WPS_UPLOAD_URL_PREFIX` - Prefix for generated upload URLs
//! - `WPS_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use clap::{Parser, Subcommand, ValueEnum};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default prefix for generated download URLs.
pub const DEFAULT_DOWNLOAD_URL_PREFIX: &str = "https://example.com/files";

/// Default prefix for generated upload URLs.
pub const DEFAULT_UPLOAD_URL_PREFIX: &str = "https://example.com/uploads";

// =============================================================================
// CLI
// =============================================================================

/// WebOffice callback service.
///
/// Answers the document-editing platform's server-to-server callbacks for
/// file and user data, verifying WPS-2 request signatures first.
#[derive(Parser, Debug, Clone)]
#[command(name = "weboffice-callback")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run; a bare invocation serves.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the callback HTTP server (the default).
    Serve(ServeConfig),

    /// Compute a WPS-2 `Authorization` header for a request (debug aid).
    Sign(SignConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

/// Configuration for the `serve` command.
#[derive(Parser, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "WPS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "WPS_PORT")]
    pub port: u16,

    // =========================================================================
    // Credential Configuration
    // =========================================================================
    /// Application identifier, provisioned in the WebOffice console.
    #[arg(long, env = "WPS_APP_ID")]
    pub app_id: Option<String>,

    /// Application secret, provisioned in the WebOffice console.
    ///
    /// Never logged; required when signature verification is enabled.
    #[arg(long, env = "WPS_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    // =========================================================================
    // Verification Configuration
    // =========================================================================
    /// Verify WPS-2 signatures on every callback request.
    ///
    /// WARNING: Only disable verification in development/testing.
    #[arg(
        long,
        default_value_t = true,
        env = "WPS_VERIFY_SIGNATURES",
        action = clap::ArgAction::Set
    )]
    pub verify_signatures: bool,

    /// Reject body-bearing requests that omit a Content-MD5 header.
    ///
    /// The platform's reference behavior signs such requests with an empty
    /// checksum; strict mode trades compatibility for integrity.
    #[arg(long, default_value_t = false, env = "WPS_STRICT_CONTENT_MD5")]
    pub strict_content_md5: bool,

    // =========================================================================
    // File Service Configuration
    // =========================================================================
    /// Prefix for download URLs embedded in callback responses.
    #[arg(long, default_value = DEFAULT_DOWNLOAD_URL_PREFIX, env = "WPS_DOWNLOAD_URL_PREFIX")]
    pub download_url_prefix: String,

    /// Prefix for upload URLs handed out by the save flow.
    #[arg(long, default_value = DEFAULT_UPLOAD_URL_PREFIX, env = "WPS_UPLOAD_URL_PREFIX")]
    pub upload_url_prefix: String,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated). Unset allows any origin.
    #[arg(long, env = "WPS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.verify_signatures {
            if self.app_id.as_deref().unwrap_or("").is_empty() {
                return Err(
                    "Signature verification is enabled but no app id provided. \
                     Set --app-id or WPS_APP_ID, or disable with --verify-signatures=false"
                        .to_string(),
                );
            }
            if self.app_secret.as_deref().unwrap_or("").is_empty() {
                return Err(
                    "Signature verification is enabled but no app secret provided. \
                     Set --app-secret or WPS_APP_SECRET, or disable with --verify-signatures=false"
                        .to_string(),
                );
            }
        }

        if self.download_url_prefix.is_empty() {
            return Err("download_url_prefix must not be empty".to_string());
        }
        if self.upload_url_prefix.is_empty() {
            return Err("upload_url_prefix must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Sign Configuration
// =============================================================================

/// Output format for the `sign` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutputFormat {
    /// Print the `Authorization` header value only.
    Header,

    /// Print a JSON object with all signing components.
    Json,
}

/// Configuration for the `sign` command.
#[derive(Parser, Debug, Clone)]
pub struct SignConfig {
    /// Application identifier.
    #[arg(long, env = "WPS_APP_ID")]
    pub app_id: String,

    /// Application secret.
    #[arg(long, env = "WPS_APP_SECRET", hide_env_values = true)]
    pub app_secret: String,

    /// HTTP method of the request to sign.
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request target: path plus query string, exactly as it will be sent.
    #[arg(long)]
    pub uri: String,

    /// Value of the request's Date header.
    #[arg(long)]
    pub date: String,

    /// Value of the request's Content-Type header, if any.
    #[arg(long, default_value = "")]
    pub content_type: String,

    /// Value of the request's Content-MD5 header, if any.
    #[arg(long)]
    pub content_md5: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SignOutputFormat::Header)]
    pub format: SignOutputFormat,
}

// =============================================================================
// Tests
// =============================================================================
