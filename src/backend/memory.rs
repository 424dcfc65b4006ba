use async_trait::async_trait;
use std::sync::RwLock;

use super::AllowlistStore;
use crate::allowlist::Allowlist;
use crate::error::{AppError, AppResult};

/// Process-local allow-list store used for development and tests
#[derive(Debug, Default)]
pub struct MemoryAllowlistStore {
    allowlist: RwLock<Allowlist>,
}

impl MemoryAllowlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowlist(allowlist: Allowlist) -> Self {
        Self {
            allowlist: RwLock::new(allowlist),
        }
    }
}

#[async_trait]
impl AllowlistStore for MemoryAllowlistStore {
    async fn get(&self) -> AppResult<Allowlist> {
        self.allowlist
            .read()
            .map(|allowlist| allowlist.clone())
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn set(&self, allowlist: &Allowlist) -> AppResult<()> {
        let mut current = self
            .allowlist
            .write()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        *current = allowlist.clone();
        Ok(())
    }
}
