//! Drives registered in scopes and the provider contract consulted when
//! a scope holding them goes away.

use crate::scope::ScopeId;
use rshell_core::CaseInsensitiveMap;
use std::fmt;

/// A drive mounted in a scope, owned by a named provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfo {
    pub name: String,
    pub provider: String,
    pub root: String,
    pub description: Option<String>,
}

impl DriveInfo {
    pub fn new(name: impl Into<String>, provider: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            root: root.into(),
            description: None,
        }
    }
}

/// A cooperative cancellation request raised from inside a provider.
///
/// These are never swallowed: they abort whatever operation invoked the
/// provider and travel to the enclosing execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopSignal {
    /// `break`/`continue`/`exit` unwinding through the provider.
    FlowControl,
    /// The pipeline the operation runs in has been stopped.
    PipelineStopped,
    /// An error hit an `ErrorAction Stop` preference.
    ActionPreferenceStop,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::FlowControl => write!(f, "flow control"),
            StopSignal::PipelineStopped => write!(f, "pipeline stopped"),
            StopSignal::ActionPreferenceStop => write!(f, "action preference stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// An ordinary provider failure.
    Failed(String),
    /// A stop request that must propagate.
    Stop(StopSignal),
}

impl From<StopSignal> for ProviderError {
    fn from(signal: StopSignal) -> Self {
        ProviderError::Stop(signal)
    }
}

/// Context handed to provider callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ProviderContext {
    /// The scope the drive is registered in.
    pub scope: ScopeId,
    pub force: bool,
}

/// A drive provider, as seen by the scope chain.
pub trait DriveProvider {
    /// The provider's registered name.
    fn name(&self) -> &str;

    /// Called for each drive of a scope that is being removed. The result
    /// is advisory: the drive is detached either way.
    fn can_remove_drive(&self, drive: &DriveInfo, context: &ProviderContext) -> Result<bool, ProviderError>;
}

/// The providers known to a session, keyed by provider name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: CaseInsensitiveMap<Box<dyn DriveProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider with the same name.
    pub fn register(&mut self, provider: Box<dyn DriveProvider>) {
        let name = provider.name().to_string();
        self.providers.insert(&name, provider);
    }

    pub fn get(&self, name: &str) -> Option<&dyn DriveProvider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
