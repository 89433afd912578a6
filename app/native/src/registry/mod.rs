//! Capability registry.
//!
//! A write-many/read-many directory that maps a capability identifier to the
//! ordered providers registered for it, plus the injection helper that fills
//! a provider's dependency slots before it is exported.
//!
//! - [`capabilities`] - The capabilities known to the application

pub mod capabilities;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

pub use capabilities::{CAPTURE, CONFIGURATION, DESTINATION, LAUNCHER, RPC_ENDPOINT};

/// Errors raised while resolving capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No provider is registered for a required capability.
    #[error("no provider registered for capability '{capability}'")]
    Unresolved { capability: &'static str },
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// A typed capability key.
///
/// Pairs a stable string identifier with the provider type stored under it,
/// usually a trait object such as `dyn Destination`.
pub struct Capability<T: ?Sized + 'static> {
    id: &'static str,
    marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + 'static> Capability<T> {
    /// Creates a capability key with the given identifier.
    #[must_use]
    pub const fn new(id: &'static str) -> Self { Self { id, marker: PhantomData } }

    /// Returns the capability identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str { self.id }
}

impl<T: ?Sized + 'static> Clone for Capability<T> {
    fn clone(&self) -> Self { *self }
}

impl<T: ?Sized + 'static> Copy for Capability<T> {}

impl<T: ?Sized + 'static> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.id).finish()
    }
}

impl<T: ?Sized + 'static> fmt::Display for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.id) }
}

/// Type-erased provider. The concrete value is always an `Arc<T>`.
type ErasedProvider = Arc<dyn Any + Send + Sync>;

/// Maps capabilities to their providers, in export order.
///
/// Storage is sharded, so an export only blocks readers of the same shard,
/// and a resolve never observes a half-applied export.
#[derive(Default)]
pub struct CapabilityRegistry {
    providers: DashMap<&'static str, Vec<ErasedProvider>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Appends `instance` to the providers of `capability`.
    ///
    /// There is no uniqueness check; exporting the same provider twice makes
    /// it appear twice.
    pub fn export<T>(&self, capability: Capability<T>, instance: Arc<T>)
    where T: ?Sized + Send + Sync + 'static {
        let erased: ErasedProvider = Arc::new(instance);
        let mut providers = self.providers.entry(capability.id()).or_default();
        providers.push(erased);

        tracing::debug!(
            capability = capability.id(),
            providers = providers.len(),
            "exported provider"
        );
    }

    /// Returns every provider of `capability`, in export order.
    ///
    /// An unknown capability yields an empty vector.
    #[must_use]
    pub fn resolve<T>(&self, capability: Capability<T>) -> Vec<Arc<T>>
    where T: ?Sized + Send + Sync + 'static {
        let Some(providers) = self.providers.get(capability.id()) else {
            return Vec::new();
        };

        providers
            .iter()
            .filter_map(|provider| {
                let typed = (**provider).downcast_ref::<Arc<T>>().cloned();
                if typed.is_none() {
                    tracing::warn!(
                        capability = capability.id(),
                        "provider registered with a different type; ignoring"
                    );
                }
                typed
            })
            .collect()
    }

    /// Returns the first provider of `capability` in export order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] when no provider is registered.
    pub fn resolve_one<T>(&self, capability: Capability<T>) -> RegistryResult<Arc<T>>
    where T: ?Sized + Send + Sync + 'static {
        self.resolve(capability)
            .into_iter()
            .next()
            .ok_or(RegistryError::Unresolved { capability: capability.id() })
    }

    /// Fills every dependency slot declared by `instance`.
    ///
    /// Must complete before the instance is exported or used.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] naming the first capability that
    /// has no provider. No slot is assigned in that case.
    pub fn fill_imports<I>(&self, instance: &mut I) -> RegistryResult<()>
    where I: Injectable + ?Sized {
        instance.inject(self).inspect_err(|err| {
            tracing::warn!(error = %err, "failed to fill imports");
        })
    }

    /// Returns the number of providers registered for `capability`.
    #[must_use]
    pub fn len<T: ?Sized + 'static>(&self, capability: Capability<T>) -> usize {
        self.providers.get(capability.id()).map_or(0, |providers| providers.len())
    }

    /// Returns the identifiers of all capabilities with at least one provider, sorted.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self
            .providers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for id in self.capabilities() {
            let count = self.providers.get(id).map_or(0, |providers| providers.len());
            map.entry(&id, &count);
        }
        map.finish()
    }
}

/// A dependency slot on a provider.
///
/// The slot is empty until [`CapabilityRegistry::fill_imports`] runs. Reading
/// an empty slot reports the capability it is waiting for instead of panicking.
pub struct Import<T: ?Sized + 'static> {
    capability: Capability<T>,
    slot: Option<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Import<T> {
    /// Creates an empty slot for `capability`.
    #[must_use]
    pub const fn new(capability: Capability<T>) -> Self { Self { capability, slot: None } }

    /// Looks up the provider for this slot without assigning it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] when no provider is registered.
    pub fn resolve(&self, registry: &CapabilityRegistry) -> RegistryResult<Arc<T>> {
        registry.resolve_one(self.capability)
    }

    /// Assigns the slot.
    pub fn fill(&mut self, provider: Arc<T>) { self.slot = Some(provider); }

    /// Returns the injected provider.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] when the slot was never filled.
    pub fn get(&self) -> RegistryResult<&Arc<T>> {
        self.slot.as_ref().ok_or(RegistryError::Unresolved { capability: self.capability.id() })
    }

    /// Returns `true` once the slot has been filled.
    #[must_use]
    pub const fn is_filled(&self) -> bool { self.slot.is_some() }

    /// Returns the capability this slot imports.
    #[must_use]
    pub const fn capability(&self) -> Capability<T> { self.capability }
}

impl<T: ?Sized + 'static> fmt::Debug for Import<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Import")
            .field("capability", &self.capability.id())
            .field("filled", &self.slot.is_some())
            .finish()
    }
}

/// Implemented by providers that declare dependency slots.
///
/// Implementations resolve every slot first and assign them only once all
/// lookups succeeded, so a failed injection leaves the instance untouched.
///
/// # Example
///
/// ```ignore
/// impl Injectable for OfficeDestination {
///     fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
///         let launcher = self.launcher.resolve(registry)?;
///         self.launcher.fill(launcher);
///         Ok(())
///     }
/// }
/// ```
pub trait Injectable {
    /// Resolves and assigns every dependency slot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unresolved`] for the first missing capability.
    fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()>;
}
