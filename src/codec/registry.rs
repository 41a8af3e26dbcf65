// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The process-wide codec cache.
//!
//! A record type's codec is built the first time the type is seen and
//! shared from then on; every caller gets the same `Arc`. Reads go
//! through an `RwLock` so concurrent encodes never contend, and builds
//! are serialized behind a separate mutex so a type is built exactly
//! once even when many threads race to it.
//!
//! Construction is two-phase to cope with recursive record types: the
//! builder registers an unfilled codec shell before walking a type's
//! fields, so a field referring back to a type under construction gets
//! the shell instead of recursing forever. Shells reach the shared
//! cache only after the whole connected group has been built, so a
//! failed build leaves no trace.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use tracing::{debug, warn};

use crate::core::{CodecError, Result};
use crate::schema::{Message, MessageType};

use super::message::build_vtable;
use super::Codec;

fn cache() -> &'static RwLock<HashMap<TypeId, Arc<Codec>>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<Codec>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

fn build_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn cached(id: TypeId) -> Result<Option<Arc<Codec>>> {
    let cache = cache()
        .read()
        .map_err(|e| CodecError::Other(format!("codec cache lock poisoned: {e}")))?;
    Ok(cache.get(&id).cloned())
}

/// Fetch or build the codec for `M`.
pub fn codec_for<M: Message>() -> Result<Arc<Codec>> {
    codec_for_type(&MessageType::of::<M>())
}

/// Fetch or build the codec for a type-erased record type.
pub fn codec_for_type(mt: &MessageType) -> Result<Arc<Codec>> {
    if let Some(codec) = cached(mt.id())? {
        return Ok(codec);
    }
    let _build = build_lock()
        .lock()
        .map_err(|e| CodecError::Other(format!("codec build lock poisoned: {e}")))?;
    // another thread may have won the race while we waited
    if let Some(codec) = cached(mt.id())? {
        return Ok(codec);
    }
    let mut builder = CodecBuilder::new();
    let codec = builder.resolve(mt).map_err(|e| {
        warn!(type_name = mt.name(), error = %e, "codec build failed");
        e
    })?;
    let mut cache = cache()
        .write()
        .map_err(|e| CodecError::Other(format!("codec cache lock poisoned: {e}")))?;
    for (id, built) in builder.pending {
        debug!(type_name = built.type_name(), "codec built");
        cache.insert(id, built);
    }
    Ok(codec)
}

/// Tracks the codecs of one build, shells included, until the whole
/// group is ready to publish.
pub(crate) struct CodecBuilder {
    pending: HashMap<TypeId, Arc<Codec>>,
}

impl CodecBuilder {
    fn new() -> Self {
        CodecBuilder {
            pending: HashMap::new(),
        }
    }

    /// Resolve a record type to its codec, building it if this group
    /// hasn't seen it yet. A type currently under construction resolves
    /// to its shell.
    pub(crate) fn resolve(&mut self, mt: &MessageType) -> Result<Arc<Codec>> {
        if let Some(codec) = cached(mt.id())? {
            return Ok(codec);
        }
        if let Some(codec) = self.pending.get(&mt.id()) {
            return Ok(codec.clone());
        }
        let shell = Arc::new(Codec::shell(mt));
        self.pending.insert(mt.id(), shell.clone());
        let vtable = build_vtable(mt, self)?;
        shell.fill(vtable)?;
        Ok(shell)
    }
}
