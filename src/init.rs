use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::layer::InterceptLayer;
use crate::logger::Logger;
use crate::record::LogRequest;

/// Which process-wide hooks [`install_global_handlers`] sets up.
///
/// **Fields**
/// - `capture_events`: install an [`InterceptLayer`] as the global default
///   `tracing` subscriber, so WARN/ERROR events from anywhere in the
///   process land in the logger.
/// - `capture_panics`: install a panic hook that routes unrecovered panics
///   into the logger as EXCEPTION records before the previous hook runs.
#[derive(Clone, Debug)]
pub struct InterceptConfig {
    pub capture_events: bool,
    pub capture_panics: bool,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            capture_events: true,
            capture_panics: true,
        }
    }
}

/// Error returned when the global hooks cannot be installed.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("a global tracing subscriber is already set")]
    SubscriberAlreadySet,
}

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the process-wide interception hooks for `logger`, with both
/// capture mechanisms enabled.
///
/// This is a deliberate process-wide side effect — it replaces the global
/// `tracing` subscriber and chains onto the panic hook, affecting the
/// entire process, not just callers of this crate. It is therefore an
/// explicit call the host makes once at startup, never an implicit part
/// of logger construction.
pub fn install_global_handlers(logger: &'static Logger) -> Result<(), InstallError> {
    install_global_handlers_with_config(logger, InterceptConfig::default())
}

/// Install the process-wide interception hooks selected by `config`.
///
/// **Returns**
/// - `Ok(())` when all requested hooks are in place.
/// - `Err(InstallError::SubscriberAlreadySet)` when event capture was
///   requested but another global subscriber is already installed.
///
/// The panic hook is installed at most once per process; repeated calls
/// are no-ops for it.
pub fn install_global_handlers_with_config(
    logger: &'static Logger,
    config: InterceptConfig,
) -> Result<(), InstallError> {
    if config.capture_events {
        let layer = InterceptLayer::new(logger);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|_| InstallError::SubscriberAlreadySet)?;
    }

    if config.capture_panics {
        install_panic_hook_once(logger);
    }

    Ok(())
}

fn install_panic_hook_once(logger: &'static Logger) {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        logger.exception(LogRequest::from_panic(panic_info));
        previous_hook(panic_info);
    }));
}
