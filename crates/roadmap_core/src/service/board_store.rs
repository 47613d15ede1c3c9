//! Board state store.
//!
//! # Responsibility
//! - Own the in-memory `AppData` that UI shells render.
//! - Mirror every mutation to the whole-board slot and the affected
//!   product's cache slot.
//! - Reconcile with a `ProductRemote` on startup, on selection, and on
//!   explicit pull/push.
//!
//! # Invariants
//! - A failed operation leaves in-memory data and the whole-board slot
//!   unchanged. Startup reconciliation is the exception: it substitutes an
//!   empty product for one that could not be pulled.
//! - Remote wins over local on a product-name conflict.
//! - Product names stay unique; pulled snapshots never rename a selected
//!   product.

use crate::board::session::PositionCommit;
use crate::model::initiative::{
    next_initiative_id, Initiative, InitiativeDraft, InitiativeId, ValidationError,
};
use crate::model::product::{AppData, Product};
use crate::repo::kv_store::{KeyValueStore, KvError};
use crate::sync::error::RemoteError;
use crate::sync::naming::{local_product_key, LOCAL_DATA_KEY};
use crate::sync::remote::{ProductRemote, PushReceipt, PushRequest};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Board store failure.
#[derive(Debug)]
pub enum StoreError {
    Kv(KvError),
    Validation(ValidationError),
    InvalidProductName(String),
    DuplicateProduct(String),
    ProductNotFound(String),
    InitiativeNotFound {
        product: String,
        initiative_id: InitiativeId,
    },
    Remote(RemoteError),
    /// Local slot content could not be serialized.
    Serialize(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidProductName(name) => write!(f, "invalid product name `{name}`"),
            Self::DuplicateProduct(name) => write!(f, "product `{name}` already exists"),
            Self::ProductNotFound(name) => write!(f, "product not found: {name}"),
            Self::InitiativeNotFound {
                product,
                initiative_id,
            } => write!(f, "initiative {initiative_id} not found in product `{product}`"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::Serialize(message) => write!(f, "failed to serialize board data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RemoteError> for StoreError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Result of startup reconciliation.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Product names pulled successfully, in listing order.
    pub pulled: Vec<String>,
    /// Listed products replaced by an empty snapshot, with the pull error.
    pub degraded: Vec<(String, RemoteError)>,
}

/// Where the selected product's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectSource {
    Remote,
    LocalCache,
    /// Neither remote nor cache was usable; memory was left as is.
    InMemory,
}

#[derive(Debug)]
pub struct SelectOutcome {
    pub source: SelectSource,
    /// Remote failure that triggered a fallback.
    pub remote_error: Option<RemoteError>,
}

/// In-memory board mirrored into a key-value store.
pub struct BoardStore<S: KeyValueStore> {
    store: S,
    data: AppData,
}

impl<S: KeyValueStore> BoardStore<S> {
    /// Loads the whole-board slot from `store`.
    ///
    /// A missing slot yields an empty board. A malformed slot is logged and
    /// ignored rather than failing startup.
    ///
    /// # Errors
    /// - `Kv` when the store itself cannot be read.
    pub fn load(store: S) -> StoreResult<Self> {
        let data = match store.get(LOCAL_DATA_KEY)? {
            Some(text) => match serde_json::from_str::<AppData>(&text) {
                Ok(data) => data,
                Err(err) => {
                    error!(
                        "event=board_load module=store status=error error_code=malformed_local_data error={err}"
                    );
                    AppData::default()
                }
            },
            None => AppData::default(),
        };
        info!(
            "event=board_load module=store status=ok products={}",
            data.products.len()
        );
        Ok(Self { store, data })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn products(&self) -> &[Product] {
        &self.data.products
    }

    pub fn product(&self, name: &str) -> Option<&Product> {
        self.data.product(name)
    }

    pub fn product_names(&self) -> Vec<String> {
        self.data
            .products
            .iter()
            .map(|product| product.name.clone())
            .collect()
    }

    /// Borrow the underlying key-value store.
    pub fn kv_store(&self) -> &S {
        &self.store
    }

    /// Adds an empty product; the trimmed name must be non-empty and unused.
    pub fn add_product(&mut self, name: &str) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidProductName(name.to_string()));
        }
        if self.data.contains(name) {
            return Err(StoreError::DuplicateProduct(name.to_string()));
        }

        let mut next = self.data.clone();
        next.products.push(Product::new(name));
        self.commit(next, Some(name))
    }

    /// Deletes a product and all of its initiatives.
    pub fn delete_product(&mut self, name: &str) -> StoreResult<Product> {
        let mut next = self.data.clone();
        let index = next
            .products
            .iter()
            .position(|product| product.name == name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        let removed = next.products.remove(index);

        self.commit(next, None)?;
        if let Err(err) = self.store.remove(&local_product_key(name)) {
            warn!(
                "event=board_persist module=store status=degraded slot=product error_code=cache_remove_failed error={err}"
            );
        }
        Ok(removed)
    }

    /// Creates an initiative from a validated draft; returns its new id.
    pub fn add_initiative(
        &mut self,
        product_name: &str,
        draft: &InitiativeDraft,
    ) -> StoreResult<InitiativeId> {
        draft.validate()?;
        let mut next = self.data.clone();
        let product = find_product(&mut next, product_name)?;
        let id = next_initiative_id(&product.initiatives);
        product
            .initiatives
            .push(Initiative::from_draft(id.clone(), draft));

        self.commit(next, Some(product_name))?;
        Ok(id)
    }

    /// Replaces form fields of one initiative, keeping its layout.
    pub fn update_initiative(
        &mut self,
        product_name: &str,
        initiative_id: &str,
        draft: &InitiativeDraft,
    ) -> StoreResult<()> {
        draft.validate()?;
        let mut next = self.data.clone();
        find_initiative(&mut next, product_name, initiative_id)?.apply_draft(draft);
        self.commit(next, Some(product_name))
    }

    pub fn delete_initiative(
        &mut self,
        product_name: &str,
        initiative_id: &str,
    ) -> StoreResult<Initiative> {
        let mut next = self.data.clone();
        let removed = find_product(&mut next, product_name)?
            .remove_initiative(initiative_id)
            .ok_or_else(|| StoreError::InitiativeNotFound {
                product: product_name.to_string(),
                initiative_id: initiative_id.to_string(),
            })?;
        self.commit(next, Some(product_name))?;
        Ok(removed)
    }

    /// Writes the result of a drag or resize back to its initiative.
    pub fn apply_commit(&mut self, product_name: &str, commit: &PositionCommit) -> StoreResult<()> {
        let mut next = self.data.clone();
        let initiative = find_initiative(&mut next, product_name, &commit.initiative_id)?;
        initiative.x = commit.x;
        initiative.score = commit.score;
        initiative.width = commit.width;
        self.commit(next, Some(product_name))
    }

    /// Startup reconciliation: pulls every listed remote product and merges.
    ///
    /// Per-product pull failures degrade to an empty product and are
    /// reported, not returned.
    ///
    /// # Errors
    /// - `Remote` when the product listing itself fails; data is unchanged.
    /// - `Kv` when the merged board cannot be persisted; data is unchanged.
    pub async fn sync_from_remote<R>(&mut self, remote: &R) -> StoreResult<SyncReport>
    where
        R: ProductRemote + ?Sized,
    {
        let names = match remote.list_products().await {
            Ok(names) => names,
            Err(err) => {
                warn!(
                    "event=board_sync module=store status=error stage=list error_code={}",
                    err.code()
                );
                return Err(err.into());
            }
        };

        let mut report = SyncReport::default();
        if names.is_empty() {
            info!("event=board_sync module=store status=ok remote_products=0");
            return Ok(report);
        }

        let mut remote_products = Vec::with_capacity(names.len());
        for name in names {
            match remote.pull_product(&name).await {
                Ok(product) => {
                    report.pulled.push(product.name.clone());
                    remote_products.push(product);
                }
                Err(err) => {
                    warn!(
                        "event=board_sync module=store status=degraded stage=pull error_code={}",
                        err.code()
                    );
                    remote_products.push(Product::new(name.clone()));
                    report.degraded.push((name, err));
                }
            }
        }

        let merged = self.data.merged_with_remote(remote_products);
        self.persist_all(&merged)?;
        self.data = merged;
        info!(
            "event=board_sync module=store status=ok pulled={} degraded={} products={}",
            report.pulled.len(),
            report.degraded.len(),
            self.data.products.len()
        );
        Ok(report)
    }

    /// Refreshes one product when the user opens it.
    ///
    /// Tries the remote first, then the product's local cache slot, and
    /// otherwise keeps what is in memory.
    ///
    /// # Errors
    /// - `ProductNotFound` when `name` is not on the board.
    /// - `Kv` when the refreshed product cannot be persisted.
    pub async fn select_product<R>(&mut self, name: &str, remote: &R) -> StoreResult<SelectOutcome>
    where
        R: ProductRemote + ?Sized,
    {
        if !self.data.contains(name) {
            return Err(StoreError::ProductNotFound(name.to_string()));
        }

        let remote_error = match remote.pull_product(name).await {
            Ok(pulled) => {
                self.replace_product(name, pulled)?;
                return Ok(SelectOutcome {
                    source: SelectSource::Remote,
                    remote_error: None,
                });
            }
            Err(err) => err,
        };
        warn!(
            "event=board_select module=store status=degraded error_code={} fallback=local_cache",
            remote_error.code()
        );

        let cached = match self.store.get(&local_product_key(name)) {
            Ok(cached) => cached,
            Err(err) => {
                error!(
                    "event=board_select module=store status=error error_code=cache_read_failed error={err}"
                );
                None
            }
        };
        let source = match cached.map(|text| serde_json::from_str::<Product>(&text)) {
            Some(Ok(product)) => {
                self.replace_product(name, product)?;
                SelectSource::LocalCache
            }
            Some(Err(err)) => {
                error!(
                    "event=board_select module=store status=error error_code=malformed_cache error={err}"
                );
                SelectSource::InMemory
            }
            None => SelectSource::InMemory,
        };

        Ok(SelectOutcome {
            source,
            remote_error: Some(remote_error),
        })
    }

    /// Explicit pull: overwrites the local product with the remote snapshot.
    ///
    /// # Errors
    /// - `ProductNotFound` when `name` is not on the board.
    /// - `Remote` for any pull failure; nothing falls back.
    pub async fn pull_product<R>(&mut self, name: &str, remote: &R) -> StoreResult<&Product>
    where
        R: ProductRemote + ?Sized,
    {
        if !self.data.contains(name) {
            return Err(StoreError::ProductNotFound(name.to_string()));
        }
        let pulled = remote.pull_product(name).await?;
        self.replace_product(name, pulled)?;
        self.data
            .product(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))
    }

    /// Explicit push: overwrites the remote snapshot with the local product.
    pub async fn push_product<R>(
        &self,
        name: &str,
        request: &PushRequest,
        remote: &R,
    ) -> StoreResult<PushReceipt>
    where
        R: ProductRemote + ?Sized,
    {
        let product = self
            .data
            .product(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        Ok(remote.push_product(product, request).await?)
    }

    fn replace_product(&mut self, name: &str, mut product: Product) -> StoreResult<()> {
        product.name = name.to_string();
        let mut next = self.data.clone();
        next.replace_product(product);
        self.commit(next, Some(name))
    }

    /// Persists `next`, then makes it current.
    ///
    /// The whole-board slot is written last; if that write fails, the
    /// affected product slot is put back to its previous text.
    fn commit(&mut self, next: AppData, affected: Option<&str>) -> StoreResult<()> {
        let data_text = to_json(&next)?;
        let product_slot = match affected.and_then(|name| next.product(name)) {
            Some(product) => Some((local_product_key(&product.name), to_json(product)?)),
            None => None,
        };

        let previous = match &product_slot {
            Some((key, _)) => self.store.get(key)?,
            None => None,
        };
        if let Some((key, text)) = &product_slot {
            self.write_slot(key, text, "product")?;
        }
        if let Err(err) = self.write_slot(LOCAL_DATA_KEY, &data_text, "data") {
            if let Some((key, _)) = &product_slot {
                self.restore_slot(key, previous.as_deref());
            }
            return Err(err);
        }

        self.data = next;
        Ok(())
    }

    /// Writes every product slot, then the whole-board slot.
    fn persist_all(&self, data: &AppData) -> StoreResult<()> {
        let data_text = to_json(data)?;
        for product in &data.products {
            self.write_slot(&local_product_key(&product.name), &to_json(product)?, "product")?;
        }
        self.write_slot(LOCAL_DATA_KEY, &data_text, "data")
    }

    fn write_slot(&self, key: &str, text: &str, slot: &str) -> StoreResult<()> {
        self.store.set(key, text).map_err(|err| {
            error!(
                "event=board_persist module=store status=error slot={slot} error_code=kv_write_failed error={err}"
            );
            StoreError::from(err)
        })
    }

    fn restore_slot(&self, key: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(text) => self.store.set(key, text),
            None => self.store.remove(key),
        };
        if let Err(err) = restored {
            error!(
                "event=board_persist module=store status=error slot=product error_code=rollback_failed error={err}"
            );
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|err| StoreError::Serialize(err.to_string()))
}

fn find_product<'a>(data: &'a mut AppData, name: &str) -> StoreResult<&'a mut Product> {
    data.product_mut(name)
        .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))
}

fn find_initiative<'a>(
    data: &'a mut AppData,
    product_name: &str,
    initiative_id: &str,
) -> StoreResult<&'a mut Initiative> {
    find_product(data, product_name)?
        .initiative_mut(initiative_id)
        .ok_or_else(|| StoreError::InitiativeNotFound {
            product: product_name.to_string(),
            initiative_id: initiative_id.to_string(),
        })
}
