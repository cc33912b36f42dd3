//! Hot-reloadable configuration support
//!
//! Provides SIGHUP signal handling for runtime configuration reload
//! without restart. Each reload publishes a new immutable snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use application::ApplicationError;
use arc_swap::ArcSwap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::AppConfig;

/// A wrapper around `AppConfig` that supports atomic reload
#[derive(Debug, Clone)]
pub struct ReloadableConfig {
    inner: Arc<ArcSwap<AppConfig>>,
    /// File re-read on reload (`None` means the default `config.*`)
    path: Option<PathBuf>,
    /// Notifier for config change events
    notify: Arc<watch::Sender<u64>>,
}

impl ReloadableConfig {
    /// Create a new reloadable configuration
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path: None,
            notify: Arc::new(notify),
        }
    }

    /// Re-read `path` instead of the default file on reload
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Get the current configuration
    #[must_use]
    pub fn load(&self) -> Arc<AppConfig> {
        self.inner.load_full()
    }

    /// Current snapshot version (0 until the first reload)
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.notify.borrow()
    }

    /// Reload configuration from disk
    ///
    /// An invalid or unreadable file keeps the previous snapshot.
    pub fn reload(&self) -> Result<u64, ApplicationError> {
        match AppConfig::load_validated(self.path.as_deref()) {
            Ok(config) => Ok(self.publish(config)),
            Err(e) => {
                error!(error = %e, "Failed to reload configuration");
                Err(e)
            },
        }
    }

    /// Validate and swap in a given snapshot, then notify subscribers
    ///
    /// Returns the new version. An invalid snapshot is rejected and the
    /// current one stays published.
    pub fn replace(&self, config: AppConfig) -> Result<u64, ApplicationError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Rejected invalid configuration snapshot");
            return Err(e);
        }
        Ok(self.publish(config))
    }

    fn publish(&self, config: AppConfig) -> u64 {
        let old = self.inner.swap(Arc::new(config));
        let mut version = 0;
        self.notify.send_modify(|v| {
            *v += 1;
            version = *v;
        });
        info!(
            version,
            old_providers = old.providers.len(),
            new_providers = self.inner.load().providers.len(),
            "Configuration reloaded successfully"
        );
        version
    }

    /// Subscribe to configuration change notifications
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }
}

/// Spawn a background task that listens for SIGHUP and reloads configuration
///
/// The task ends when `shutdown` is cancelled.
#[cfg(unix)]
pub fn spawn_config_reload_handler(
    config: ReloadableConfig,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler");
                return;
            },
        };

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                received = sighup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!("Received SIGHUP, reloading configuration");
                    if config.reload().is_err() {
                        warn!("Configuration reload failed, keeping previous config");
                    }
                },
            }
        }
    })
}

/// No-op on non-Unix systems
#[cfg(not(unix))]
pub fn spawn_config_reload_handler(
    _config: ReloadableConfig,
    _shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    warn!("SIGHUP config reload not supported on this platform");
    tokio::spawn(async {})
}
