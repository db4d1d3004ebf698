//! Process-wide registration state: key managers, catalogues, and wrappers.
//!
//! A [`Registry`] is explicit shared state with no hidden global. Create one
//! at startup, register primitive families into it, and pass `&Registry`
//! (or an `Arc<Registry>`) to everything that resolves keys. Lookups take a
//! read lock and run concurrently; registration takes a short write lock.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::catalogue::Catalogue;
use crate::config::ConfigEntry;
use crate::error::{KeyloomError, Result};
use crate::key_manager::{KeyManager, KeyManagerHandle};
use crate::keyset::{KeyData, KeyTemplate};
use crate::primitive_set::{PrimitiveSet, PrimitiveWrapper};

/// Type-erased view of a registered key manager.
///
/// Keeps the operations that need no primitive type reachable without `P`,
/// and recovers the typed handle through `as_any`.
trait ErasedManager: Send + Sync {
    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData>;
    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData>;
    fn as_any(&self) -> &dyn Any;
}

struct ManagerSlot<P> {
    handle: KeyManagerHandle<P>,
}

impl<P: 'static> ErasedManager for ManagerSlot<P> {
    fn new_key(&self, serialized_format: &[u8]) -> Result<KeyData> {
        self.handle.manager().new_key(serialized_format)
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        self.handle.manager().public_key_data(serialized_private_key)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ManagerCell {
    primitive_type: TypeId,
    impl_type: TypeId,
    impl_name: &'static str,
    version: u32,
    new_key_allowed: bool,
    erased: Arc<dyn ErasedManager>,
}

/// Type-erased view of an installed catalogue.
trait ErasedCatalogue: Send + Sync {
    /// Resolve the entry through the typed catalogue and register the
    /// resulting manager.
    fn apply_entry(&self, registry: &Registry, entry: &ConfigEntry) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

struct CatalogueSlot<P> {
    catalogue: Arc<dyn Catalogue<P>>,
}

impl<P: 'static> ErasedCatalogue for CatalogueSlot<P> {
    fn apply_entry(&self, registry: &Registry, entry: &ConfigEntry) -> Result<()> {
        let handle = self.catalogue.key_manager(
            &entry.type_url,
            &entry.primitive_name,
            entry.key_manager_version,
        )?;
        registry.register_key_manager_handle(&entry.type_url, handle, entry.new_key_allowed)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct CatalogueCell {
    impl_type: TypeId,
    impl_name: &'static str,
    erased: Arc<dyn ErasedCatalogue>,
}

trait ErasedWrapper: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

struct WrapperSlot<P> {
    wrapper: Arc<dyn PrimitiveWrapper<P>>,
}

impl<P: 'static> ErasedWrapper for WrapperSlot<P> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct WrapperCell {
    impl_type: TypeId,
    impl_name: &'static str,
    erased: Arc<dyn ErasedWrapper>,
}

/// Shared registration state mapping type URLs to key managers, names to
/// catalogues, and primitive kinds to wrappers.
pub struct Registry {
    managers: RwLock<HashMap<String, ManagerCell>>,
    catalogues: RwLock<HashMap<String, CatalogueCell>>,
    wrappers: RwLock<HashMap<TypeId, WrapperCell>>,
}

impl Registry {
    /// An empty registry with nothing registered.
    pub fn new() -> Self {
        Self {
            managers: RwLock::new(HashMap::new()),
            catalogues: RwLock::new(HashMap::new()),
            wrappers: RwLock::new(HashMap::new()),
        }
    }

    /// Register `manager` for `type_url`.
    ///
    /// Re-registering the same concrete manager type is an idempotent
    /// success, provided the version does not go backwards and
    /// `new_key_allowed` is not narrowed from an earlier `true`. A different
    /// concrete type under the same URL is a conflict.
    pub fn register_key_manager<P, M>(
        &self,
        type_url: &str,
        manager: M,
        new_key_allowed: bool,
    ) -> Result<()>
    where
        P: 'static,
        M: KeyManager<P>,
    {
        self.register_key_manager_handle(type_url, KeyManagerHandle::new(manager), new_key_allowed)
    }

    /// [`register_key_manager`](Self::register_key_manager) for an
    /// already-wrapped handle, e.g. one resolved through a catalogue.
    pub fn register_key_manager_handle<P: 'static>(
        &self,
        type_url: &str,
        handle: KeyManagerHandle<P>,
        new_key_allowed: bool,
    ) -> Result<()> {
        if !handle.manager().does_support(type_url) {
            return Err(KeyloomError::InvalidRegistration(format!(
                "manager {} does not support type URL {type_url}",
                handle.impl_name()
            )));
        }
        let version = handle.manager().version();

        let mut managers = self.managers.write().unwrap_or_else(PoisonError::into_inner);
        match managers.get_mut(type_url) {
            None => {
                debug!(
                    "registering key manager {} for {type_url} (new_key_allowed: {new_key_allowed})",
                    handle.impl_name()
                );
                managers.insert(
                    type_url.to_string(),
                    ManagerCell {
                        primitive_type: TypeId::of::<P>(),
                        impl_type: handle.impl_type(),
                        impl_name: handle.impl_name(),
                        version,
                        new_key_allowed,
                        erased: Arc::new(ManagerSlot { handle }),
                    },
                );
                Ok(())
            }
            Some(cell) => {
                if cell.primitive_type != TypeId::of::<P>()
                    || cell.impl_type != handle.impl_type()
                {
                    return Err(KeyloomError::ManagerConflict {
                        type_url: type_url.to_string(),
                        existing: cell.impl_name,
                    });
                }
                if version < cell.version {
                    return Err(KeyloomError::InvalidRegistration(format!(
                        "manager for {type_url} cannot downgrade from version {} to {version}",
                        cell.version
                    )));
                }
                if cell.new_key_allowed && !new_key_allowed {
                    return Err(KeyloomError::InvalidRegistration(format!(
                        "cannot disable key generation for already-registered {type_url}"
                    )));
                }
                if version > cell.version {
                    cell.version = version;
                    cell.erased = Arc::new(ManagerSlot { handle });
                }
                if new_key_allowed {
                    cell.new_key_allowed = true;
                }
                Ok(())
            }
        }
    }

    /// The key manager registered for `type_url`, producing primitives of
    /// kind `P`.
    ///
    /// Absent registrations and registrations for a different primitive kind
    /// both report not-found.
    pub fn get_key_manager<P: 'static>(&self, type_url: &str) -> Result<KeyManagerHandle<P>> {
        let managers = self.managers.read().unwrap_or_else(PoisonError::into_inner);
        let cell = managers
            .get(type_url)
            .ok_or_else(|| KeyloomError::ManagerNotFound(type_url.to_string()))?;
        let slot = cell
            .erased
            .as_any()
            .downcast_ref::<ManagerSlot<P>>()
            .ok_or_else(|| KeyloomError::ManagerNotFound(type_url.to_string()))?;
        Ok(slot.handle.clone())
    }

    /// Generate fresh key material for `template`.
    ///
    /// Fails when the registration for the template's type URL was made with
    /// `new_key_allowed` false.
    pub fn new_key_data(&self, template: &KeyTemplate) -> Result<KeyData> {
        let erased = {
            let managers = self.managers.read().unwrap_or_else(PoisonError::into_inner);
            let cell = managers
                .get(&template.type_url)
                .ok_or_else(|| KeyloomError::ManagerNotFound(template.type_url.clone()))?;
            if !cell.new_key_allowed {
                return Err(KeyloomError::NewKeyDisallowed(template.type_url.clone()));
            }
            Arc::clone(&cell.erased)
        };
        // Key generation runs outside the lock
        erased.new_key(&template.value)
    }

    /// Derive public key data from serialized private key material.
    pub fn public_key_data(&self, type_url: &str, serialized_private_key: &[u8]) -> Result<KeyData> {
        let erased = {
            let managers = self.managers.read().unwrap_or_else(PoisonError::into_inner);
            let cell = managers
                .get(type_url)
                .ok_or_else(|| KeyloomError::ManagerNotFound(type_url.to_string()))?;
            Arc::clone(&cell.erased)
        };
        erased.public_key_data(serialized_private_key)
    }

    /// Install `catalogue` under `name`.
    ///
    /// Re-adding the same concrete catalogue type is an idempotent success;
    /// a different implementation under a taken name is a conflict.
    pub fn add_catalogue<P, C>(&self, name: &str, catalogue: C) -> Result<()>
    where
        P: 'static,
        C: Catalogue<P>,
    {
        let mut catalogues = self.catalogues.write().unwrap_or_else(PoisonError::into_inner);
        match catalogues.get(name) {
            None => {
                debug!("installing catalogue {} under {name}", std::any::type_name::<C>());
                catalogues.insert(
                    name.to_string(),
                    CatalogueCell {
                        impl_type: TypeId::of::<C>(),
                        impl_name: std::any::type_name::<C>(),
                        erased: Arc::new(CatalogueSlot {
                            catalogue: Arc::new(catalogue) as Arc<dyn Catalogue<P>>,
                        }),
                    },
                );
                Ok(())
            }
            Some(cell) if cell.impl_type == TypeId::of::<C>() => Ok(()),
            Some(cell) => Err(KeyloomError::CatalogueConflict {
                name: name.to_string(),
                existing: cell.impl_name,
            }),
        }
    }

    /// The catalogue installed under `name`, serving primitives of kind `P`.
    pub fn get_catalogue<P: 'static>(&self, name: &str) -> Result<Arc<dyn Catalogue<P>>> {
        let catalogues = self.catalogues.read().unwrap_or_else(PoisonError::into_inner);
        let cell = catalogues
            .get(name)
            .ok_or_else(|| KeyloomError::CatalogueNotFound(name.to_string()))?;
        let slot = cell
            .erased
            .as_any()
            .downcast_ref::<CatalogueSlot<P>>()
            .ok_or_else(|| KeyloomError::CatalogueNotFound(name.to_string()))?;
        Ok(Arc::clone(&slot.catalogue))
    }

    /// Resolve `entry` through its named catalogue and register the manager.
    pub(crate) fn apply_config_entry(&self, entry: &ConfigEntry) -> Result<()> {
        let erased = {
            let catalogues = self.catalogues.read().unwrap_or_else(PoisonError::into_inner);
            let cell = catalogues
                .get(&entry.catalogue_name)
                .ok_or_else(|| KeyloomError::CatalogueNotFound(entry.catalogue_name.clone()))?;
            Arc::clone(&cell.erased)
        };
        erased.apply_entry(self, entry)
    }

    /// Register the wrapper that folds primitive sets of kind `P`.
    pub fn register_primitive_wrapper<P, W>(&self, wrapper: W) -> Result<()>
    where
        P: 'static,
        W: PrimitiveWrapper<P>,
    {
        let mut wrappers = self.wrappers.write().unwrap_or_else(PoisonError::into_inner);
        match wrappers.get(&TypeId::of::<P>()) {
            None => {
                debug!(
                    "registering wrapper {} for {}",
                    std::any::type_name::<W>(),
                    std::any::type_name::<P>()
                );
                wrappers.insert(
                    TypeId::of::<P>(),
                    WrapperCell {
                        impl_type: TypeId::of::<W>(),
                        impl_name: std::any::type_name::<W>(),
                        erased: Arc::new(WrapperSlot {
                            wrapper: Arc::new(wrapper) as Arc<dyn PrimitiveWrapper<P>>,
                        }),
                    },
                );
                Ok(())
            }
            Some(cell) if cell.impl_type == TypeId::of::<W>() => Ok(()),
            Some(cell) => Err(KeyloomError::WrapperConflict {
                primitive: std::any::type_name::<P>(),
                existing: cell.impl_name,
            }),
        }
    }

    /// Fold `primitives` into one composite primitive through the wrapper
    /// registered for `P`.
    pub fn wrap<P: 'static>(&self, primitives: PrimitiveSet<P>) -> Result<P> {
        let wrapper = {
            let wrappers = self.wrappers.read().unwrap_or_else(PoisonError::into_inner);
            let cell = wrappers
                .get(&TypeId::of::<P>())
                .ok_or_else(|| KeyloomError::WrapperNotFound(std::any::type_name::<P>()))?;
            let slot = cell
                .erased
                .as_any()
                .downcast_ref::<WrapperSlot<P>>()
                .ok_or_else(|| KeyloomError::WrapperNotFound(std::any::type_name::<P>()))?;
            Arc::clone(&slot.wrapper)
        };
        wrapper.wrap(primitives)
    }

    /// Clear every registration.
    ///
    /// Intended for test setup. Not safe to call while other threads are
    /// using the registry.
    pub fn reset(&self) {
        self.managers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.catalogues
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.wrappers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("registry reset");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
