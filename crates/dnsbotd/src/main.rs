// # dnsbotd - DNS Bot Daemon
//
// Thin integration layer. All DNS, access and command logic lives in
// dnsbot-core; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Registers providers and registry stores
// 4. Seeds the registry and starts the bot engine on the console transport
//
// ## Configuration
//
// ### Cloudflare
// - `DNSBOT_CLOUDFLARE_API_TOKEN`: API token (preferred)
// - `DNSBOT_CLOUDFLARE_API_KEY` + `DNSBOT_CLOUDFLARE_EMAIL`: legacy global key
// - `DNSBOT_CLOUDFLARE_BASE_URL`: API base URL override (optional)
// - `DNSBOT_HTTP_TIMEOUT_SECS`: Per-request timeout (default 30)
//
// ### Registry
// - `DNSBOT_REGISTRY_TYPE`: Registry store type (file, memory)
// - `DNSBOT_REGISTRY_PATH`: Path to the registry file (for file store)
// - `DNSBOT_DOMAINS`: Comma-separated `domain=zone_id` pairs to register
// - `DNSBOT_AUTHORIZED_USERS`: Comma-separated usernames to authorize
//
// ### Access & transport
// - `DNSBOT_ALLOWED_CHAT_ID`: Only this group chat (and private chats) may use the bot
// - `DNSBOT_CONSOLE_USER`: Username the console speaks as (default admin)
// - `DNSBOT_CONSOLE_USER_ID`: Chat id the console speaks as (default 1)
//
// ### Logging
// - `DNSBOT_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DNSBOT_CLOUDFLARE_API_TOKEN=your_token
// export DNSBOT_REGISTRY_PATH=/var/lib/dnsbot/registry.json
// export DNSBOT_DOMAINS=example.com=023e105f4ecef8ad9ca31a8372d0c353
// export DNSBOT_AUTHORIZED_USERS=admin
//
// echo "/listdns example.com" | dnsbotd
// ```

mod console;

use anyhow::{Context, Result};
use dnsbot_core::config::{
    AccessConfig, BotConfig, DEFAULT_HTTP_TIMEOUT_SECS, EngineConfig, ProviderConfig, RegistryConfig,
};
use dnsbot_core::traits::{AuthorizedUser, DomainRegistration, RegistryStore};
use dnsbot_core::{BotEngine, ProviderRegistry};
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::sync::oneshot;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use console::{ConsoleMessageSource, StdoutReplySink};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BotExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<BotExitCode> for ExitCode {
    fn from(code: BotExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    cloudflare_api_token: Option<String>,
    cloudflare_api_key: Option<String>,
    cloudflare_email: Option<String>,
    cloudflare_base_url: Option<String>,
    http_timeout_secs: Option<u64>,
    registry_type: String,
    registry_path: Option<String>,
    domains: Vec<(String, String)>,
    authorized_users: Vec<String>,
    allowed_chat_id: Option<i64>,
    console_user: String,
    console_user_id: i64,
    log_level: String,
}

/// Optional variable; empty counts as unset
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Optional variable parsed as `T`
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_opt(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value: {}", name, raw))
        })
        .transpose()
}

/// Comma-separated list, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `domain=zone_id` pairs
fn parse_domains(raw: &str) -> Result<Vec<(String, String)>> {
    split_list(raw)
        .into_iter()
        .map(|entry| {
            let (domain, zone_id) = entry
                .split_once('=')
                .with_context(|| format!("DNSBOT_DOMAINS entry '{}' must be domain=zone_id", entry))?;
            Ok((domain.trim().to_lowercase(), zone_id.trim().to_string()))
        })
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            cloudflare_api_token: env_opt("DNSBOT_CLOUDFLARE_API_TOKEN"),
            cloudflare_api_key: env_opt("DNSBOT_CLOUDFLARE_API_KEY"),
            cloudflare_email: env_opt("DNSBOT_CLOUDFLARE_EMAIL"),
            cloudflare_base_url: env_opt("DNSBOT_CLOUDFLARE_BASE_URL"),
            http_timeout_secs: env_parse("DNSBOT_HTTP_TIMEOUT_SECS")?,
            registry_type: env_opt("DNSBOT_REGISTRY_TYPE").unwrap_or_else(|| "file".to_string()),
            registry_path: env_opt("DNSBOT_REGISTRY_PATH"),
            domains: parse_domains(&env_opt("DNSBOT_DOMAINS").unwrap_or_default())?,
            authorized_users: split_list(&env_opt("DNSBOT_AUTHORIZED_USERS").unwrap_or_default()),
            allowed_chat_id: env_parse("DNSBOT_ALLOWED_CHAT_ID")?,
            console_user: env_opt("DNSBOT_CONSOLE_USER").unwrap_or_else(|| "admin".to_string()),
            console_user_id: env_parse("DNSBOT_CONSOLE_USER_ID")?.unwrap_or(1),
            log_level: env_opt("DNSBOT_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks credential presence, enum values, numeric ranges and domain
    /// name syntax.
    fn validate(&self) -> Result<()> {
        let has_key_pair = self.cloudflare_api_key.is_some() && self.cloudflare_email.is_some();

        match &self.cloudflare_api_token {
            Some(token) => {
                // Cloudflare API tokens are 40 characters
                if token.len() < 20 {
                    anyhow::bail!(
                        "DNSBOT_CLOUDFLARE_API_TOKEN appears too short ({} chars). \
                        Verify your token is correct.",
                        token.len()
                    );
                }

                let token_lower = token.to_lowercase();
                if token_lower.contains("your_token") || token_lower.contains("replace_me") {
                    anyhow::bail!(
                        "DNSBOT_CLOUDFLARE_API_TOKEN appears to be a placeholder. \
                        Use an actual API token from Cloudflare."
                    );
                }
            }
            None if has_key_pair => {}
            None => anyhow::bail!(
                "DNSBOT_CLOUDFLARE_API_TOKEN is required \
                (or DNSBOT_CLOUDFLARE_API_KEY together with DNSBOT_CLOUDFLARE_EMAIL)"
            ),
        }

        if let Some(ref url) = self.cloudflare_base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!(
                "DNSBOT_CLOUDFLARE_BASE_URL must use HTTP or HTTPS scheme. Got: {}",
                url
            );
        }

        if let Some(timeout) = self.http_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "DNSBOT_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        match self.registry_type.as_str() {
            "file" => match &self.registry_path {
                Some(path) => {
                    if let Some(parent) = std::path::Path::new(path).parent()
                        && !parent.as_os_str().is_empty()
                        && !parent.exists()
                    {
                        anyhow::bail!(
                            "DNSBOT_REGISTRY_PATH parent directory does not exist: {}. \
                            Create it first: sudo mkdir -p {}",
                            parent.display(),
                            parent.display()
                        );
                    }
                }
                None => anyhow::bail!(
                    "DNSBOT_REGISTRY_PATH is required when DNSBOT_REGISTRY_TYPE=file. \
                    Set it via: export DNSBOT_REGISTRY_PATH=/var/lib/dnsbot/registry.json"
                ),
            },
            "memory" => {}
            other => anyhow::bail!(
                "DNSBOT_REGISTRY_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        }

        for (domain, zone_id) in &self.domains {
            validate_domain_name(domain)?;
            if zone_id.is_empty() {
                anyhow::bail!("DNSBOT_DOMAINS entry for {} has an empty zone id", domain);
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSBOT_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Core configuration built from the environment
    fn bot_config(&self) -> BotConfig {
        let provider = ProviderConfig::Cloudflare {
            api_token: self.cloudflare_api_token.clone(),
            api_key: self.cloudflare_api_key.clone(),
            email: self.cloudflare_email.clone(),
            base_url: self.cloudflare_base_url.clone(),
            http_timeout_secs: self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let registry = match (self.registry_type.as_str(), &self.registry_path) {
            ("file", Some(path)) => RegistryConfig::File { path: path.clone() },
            _ => RegistryConfig::Memory,
        };

        BotConfig {
            provider,
            registry,
            access: AccessConfig {
                allowed_chat_id: self.allowed_chat_id,
            },
            engine: EngineConfig::default(),
        }
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; catches common typos, not every invalid name.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return BotExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return BotExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Replies go to stdout, logs to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BotExitCode::ConfigError.into();
    }

    info!("Starting dnsbotd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BotExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => BotExitCode::CleanShutdown,
            Err(DaemonError::Startup(e)) => {
                error!("Startup error: {:#}", e);
                BotExitCode::ConfigError
            }
            Err(DaemonError::Runtime(e)) => {
                error!("Daemon error: {:#}", e);
                BotExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Which exit code a failure maps to
enum DaemonError {
    Startup(anyhow::Error),
    Runtime(anyhow::Error),
}

/// Run the daemon
async fn run_daemon(config: Config) -> std::result::Result<(), DaemonError> {
    let bot_config = config.bot_config();

    let registry = ProviderRegistry::with_builtin_stores();

    #[cfg(feature = "cloudflare")]
    {
        info!("Registering Cloudflare provider");
        dnsbot_provider_cloudflare::register(&registry);
    }

    // Missing credentials fail here, before any message is read
    let provider = registry
        .create_provider(&bot_config.provider)
        .context("Failed to create DNS provider")
        .map_err(DaemonError::Startup)?;
    let store = registry
        .create_store(&bot_config.registry)
        .await
        .context("Failed to open registry store")
        .map_err(DaemonError::Startup)?;

    seed_registry(store.as_ref(), &config)
        .await
        .map_err(DaemonError::Startup)?;

    let shutdown_rx = install_shutdown_signal().map_err(DaemonError::Startup)?;

    info!("Provider: {}", provider.provider_name());
    info!("Registry store: {}", bot_config.registry.type_name());

    let (engine, mut events) = BotEngine::new(
        Box::new(ConsoleMessageSource::new(
            config.console_user_id,
            config.console_user.clone(),
        )),
        Box::new(StdoutReplySink),
        provider,
        store,
        bot_config,
    )
    .context("Failed to create bot engine")
    .map_err(DaemonError::Startup)?;

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let result = engine.run_with_shutdown(Some(shutdown_rx)).await;

    // Closes the event channel so the logger drains and exits
    drop(engine);
    let _ = event_logger.await;

    result
        .context("Bot engine failed")
        .map_err(DaemonError::Runtime)
}

/// Insert configured domains and users that are not yet registered
async fn seed_registry(store: &dyn RegistryStore, config: &Config) -> Result<()> {
    for (domain, zone_id) in &config.domains {
        if store.find_domain(domain).await?.is_none() {
            store
                .insert_domain(DomainRegistration::new(domain, zone_id.clone()))
                .await?;
            info!("Registered domain {} (zone {})", domain, zone_id);
        }
    }

    for username in &config.authorized_users {
        if store.find_active_user_by_username(username).await?.is_none() {
            store.upsert_user(AuthorizedUser::new(username)).await?;
            info!("Authorized user {}", username);
        }
    }

    Ok(())
}

/// Resolve the returned receiver on SIGTERM or SIGINT
#[cfg(unix)]
fn install_shutdown_signal() -> Result<oneshot::Receiver<()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        let _ = tx.send(());
    });

    Ok(rx)
}

/// Resolve the returned receiver on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn install_shutdown_signal() -> Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal: SIGINT");
            let _ = tx.send(());
        }
    });
    Ok(rx)
}
