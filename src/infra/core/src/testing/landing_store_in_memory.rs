// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bytes::Bytes;
use internal_error::InternalError;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keeps landed artifacts in a process-local map
pub struct LandingStoreInMemory {
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl LandingStoreInMemory {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl LandingStore for LandingStoreInMemory {
    fn url(&self) -> String {
        "memory://".to_string()
    }

    async fn contains(&self, key: &str) -> Result<bool, InternalError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn size_of(&self, key: &str) -> Result<u64, GetError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| {
                ArtifactNotFoundError {
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn get(&self, key: &str) -> Result<Bytes, GetError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| {
                ArtifactNotFoundError {
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<u64, WriteError> {
        let size = data.len() as u64;
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(size)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, InternalError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
