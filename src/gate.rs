//! One-time process initialization
//!
//! `init` is the only writer. It runs under a mutex, and publishes the hook
//! into a `OnceCell` only after every step has succeeded, so readers see
//! either no hook or a fully installed one and never need the lock.

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::error::{Result, SdkError};
use crate::flavour::ACTIVE;
use crate::game::{Hook, HookFactory};
use crate::{config, logging, version};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GateState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
}

impl GateState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Initializing,
            2 => Self::Ready,
            _ => Self::Uninitialized,
        }
    }
}

/// Steps run before the hook is built
pub type Bootstrap = fn() -> Result<()>;

pub struct Gate {
    lock: Mutex<()>,
    state: AtomicU8,
    hook: OnceCell<Box<dyn Hook>>,
    bootstrap: Bootstrap,
}

static GLOBAL: Gate = Gate::new();

/// The process-wide gate
#[inline]
pub fn global() -> &'static Gate {
    &GLOBAL
}

/// Load config, start logging and log the banner
pub fn bootstrap_environment() -> Result<()> {
    let config = config::load()?;
    logging::init(config, &config::base_dir());

    let banner = version::version_string();
    info!("{banner}");
    info!("{}", "=".repeat(banner.len()));
    Ok(())
}

impl Gate {
    pub const fn new() -> Self {
        Self::with_bootstrap(bootstrap_environment)
    }

    /// Gate running `bootstrap` in place of the config and logging steps
    pub const fn with_bootstrap(bootstrap: Bootstrap) -> Self {
        Self {
            lock: Mutex::new(()),
            state: AtomicU8::new(GateState::Uninitialized as u8),
            hook: OnceCell::new(),
            bootstrap,
        }
    }

    /// Bind the hook produced by `factory`
    ///
    /// Returns `Ok(false)` without touching anything if a hook is already
    /// bound. On error the gate is left uninitialized.
    pub fn init(&self, factory: &dyn HookFactory) -> Result<bool> {
        let _guard = self.lock.lock();
        if self.hook.get().is_some() {
            return Ok(false);
        }

        self.set_state(GateState::Initializing);
        let hook = match self.build(factory) {
            Ok(hook) => hook,
            Err(e) => {
                self.set_state(GateState::Uninitialized);
                error!(error = %e, "unrealsdk initialization failed");
                return Err(e);
            }
        };

        // Cannot already be set: checked above under the same lock
        let _ = self.hook.set(hook);
        self.set_state(GateState::Ready);

        if let Some(hook) = self.hook.get() {
            hook.post_init();
        }
        Ok(true)
    }

    fn build(&self, factory: &dyn HookFactory) -> Result<Box<dyn Hook>> {
        (self.bootstrap)()?;
        factory.init_substrate()?;

        let mut hook = factory.create();
        let flavour = hook.flavour();
        if flavour != ACTIVE {
            return Err(SdkError::LayoutMismatch {
                hook: flavour,
                build: ACTIVE,
            });
        }

        hook.hook()?;
        info!(flavour = %flavour, "hook installed");
        Ok(hook)
    }

    pub fn state(&self) -> GateState {
        GateState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: GateState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state() == GateState::Ready
    }

    /// The bound hook
    pub fn hook(&self) -> Result<&dyn Hook> {
        self.hook
            .get()
            .map(|hook| hook.as_ref())
            .ok_or(SdkError::NotInitialized)
    }

    pub fn is_console_ready(&self) -> bool {
        self.hook.get().is_some_and(|hook| hook.is_console_ready())
    }

    /// Silently does nothing before the hook is bound
    pub fn uconsole_output_text(&self, text: &[u16]) {
        if let Some(hook) = self.hook.get() {
            hook.uconsole_output_text(text);
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_console_ready() -> bool {
    GLOBAL.is_console_ready()
}

pub(crate) fn uconsole_output_text(text: &[u16]) {
    GLOBAL.uconsole_output_text(text);
}
