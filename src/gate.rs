//! Registration gate
//!
//! Called by the host's registration flow before an account is created. An
//! empty candidate is passed through so that "email required" stays the
//! host's decision; anything else must be on the stored allow-list.

use std::sync::Arc;

use crate::allowlist::AllowlistNormalizer;
use crate::backend::AllowlistStore;
use crate::config::{CandidateComparison, GateConfig};
use crate::error::{AppError, AppResult, ForbiddenEmail};

pub struct RegistrationGate {
    store: Arc<dyn AllowlistStore>,
    normalizer: Arc<AllowlistNormalizer>,
    comparison: CandidateComparison,
    message: String,
}

impl RegistrationGate {
    pub fn new(
        store: Arc<dyn AllowlistStore>,
        normalizer: Arc<AllowlistNormalizer>,
        config: &GateConfig,
    ) -> Self {
        Self {
            store,
            normalizer,
            comparison: config.comparison,
            message: config.message.clone(),
        }
    }

    /// Gate with the default normalizer and configuration
    pub fn with_store(store: Arc<dyn AllowlistStore>) -> Self {
        Self::new(
            store,
            Arc::new(AllowlistNormalizer::default()),
            &GateConfig::default(),
        )
    }

    pub fn with_comparison(mut self, comparison: CandidateComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn comparison(&self) -> CandidateComparison {
        self.comparison
    }

    /// Accept or reject a registration candidate.
    ///
    /// Returns the candidate unchanged when it may register. The allow-list
    /// is read from the store on every call.
    pub async fn check_email(&self, candidate: &str) -> AppResult<String> {
        if candidate.is_empty() {
            return Ok(String::new());
        }

        let allowlist = self.store.get().await?;

        let allowed = match self.comparison {
            CandidateComparison::Exact => allowlist.contains(candidate),
            CandidateComparison::Canonical => self
                .lookup_key(candidate)
                .is_some_and(|key| allowlist.contains(&key)),
        };

        if !allowed {
            return Err(AppError::ForbiddenEmail(ForbiddenEmail::new(
                self.message.clone(),
            )));
        }

        Ok(candidate.to_string())
    }

    /// Canonical form of a candidate, if it is a valid email whose only
    /// difference from that form is letter case. A candidate that loses
    /// characters to canonicalization has no lookup key.
    fn lookup_key(&self, candidate: &str) -> Option<String> {
        let trimmed = candidate.trim();
        let canonical = self.normalizer.normalize_entry(trimmed)?;

        (canonical == trimmed.to_lowercase()).then_some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::{Allowlist, AllowlistNormalizer};
    use crate::backend::MemoryAllowlistStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_with(raw: &str) -> Arc<dyn AllowlistStore> {
        let allowlist = AllowlistNormalizer::default().normalize(raw);
        Arc::new(MemoryAllowlistStore::with_allowlist(allowlist))
    }

    /// Counts reads and fails them, to prove the store was or was not consulted
    #[derive(Default)]
    struct CountingStore {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl AllowlistStore for CountingStore {
        async fn get(&self) -> AppResult<Allowlist> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Database("store offline".to_string()))
        }

        async fn set(&self, _allowlist: &Allowlist) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_skips_store() {
        let store = Arc::new(CountingStore::default());
        let gate = RegistrationGate::with_store(store.clone());

        assert_eq!(gate.check_email("").await.unwrap(), "");
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(CountingStore::default());
        let gate = RegistrationGate::with_store(store.clone());

        let err = gate.check_email("a@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_member_is_returned_unchanged() {
        for comparison in [CandidateComparison::Exact, CandidateComparison::Canonical] {
            let gate = RegistrationGate::with_store(store_with("a@example.com"))
                .with_comparison(comparison);
            assert_eq!(
                gate.check_email("a@example.com").await.unwrap(),
                "a@example.com"
            );
        }
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        for comparison in [CandidateComparison::Exact, CandidateComparison::Canonical] {
            let gate = RegistrationGate::with_store(store_with("a@example.com"))
                .with_comparison(comparison);
            let err = gate.check_email("b@example.com").await.unwrap_err();

            match err {
                AppError::ForbiddenEmail(forbidden) => {
                    assert_eq!(forbidden.code(), "forbidden_user_email");
                    assert_eq!(forbidden.message, "Sorry, that email address is not allowed!");
                }
                other => panic!("expected ForbiddenEmail, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_allowlist_rejects_everyone() {
        let gate = RegistrationGate::with_store(Arc::new(MemoryAllowlistStore::new()));
        for candidate in ["a@example.com", "admin@example.org", " ", "not-an-email"] {
            let err = gate.check_email(candidate).await.unwrap_err();
            assert!(err.is_forbidden_email(), "{} was not rejected", candidate);
        }
    }

    #[tokio::test]
    async fn test_exact_comparison_rejects_different_case() {
        let gate = RegistrationGate::with_store(store_with("a@example.com"))
            .with_comparison(CandidateComparison::Exact);

        let err = gate.check_email("A@Example.com").await.unwrap_err();
        assert!(err.is_forbidden_email());
    }

    #[tokio::test]
    async fn test_canonical_comparison_accepts_different_case() {
        let gate = RegistrationGate::with_store(store_with("a@example.com"))
            .with_comparison(CandidateComparison::Canonical);

        assert_eq!(
            gate.check_email(" A@Example.com").await.unwrap(),
            " A@Example.com"
        );
    }

    #[tokio::test]
    async fn test_canonical_comparison_rejects_invalid_candidates() {
        let gate = RegistrationGate::with_store(store_with("ab@example.com,a@example.com"));
        assert_eq!(gate.comparison(), CandidateComparison::Canonical);

        for candidate in [
            "a<b>@example.com",
            "a b@example.com",
            "a(b)@example.com",
            "ab@exa_mple.com",
            "a@exam ple.com",
            "a@example..com",
        ] {
            let err = gate.check_email(candidate).await.unwrap_err();
            assert!(err.is_forbidden_email(), "{} was accepted", candidate);
        }
    }

    #[tokio::test]
    async fn test_canonical_comparison_rejects_lossy_candidates() {
        let gate = RegistrationGate::with_store(store_with("ab@example.com,a@example.com"));

        // these may pass syntax checks but canonicalize to a different mailbox
        for candidate in ["aä@example.com", "\"a\"@example.com", "\"a b\"@example.com"] {
            let err = gate.check_email(candidate).await.unwrap_err();
            assert!(err.is_forbidden_email(), "{} was accepted", candidate);
        }

        assert!(gate.check_email("AB@example.COM").await.is_ok());
    }

    #[tokio::test]
    async fn test_reads_fresh_allowlist_each_call() {
        let store = Arc::new(MemoryAllowlistStore::new());
        let gate = RegistrationGate::with_store(store.clone());

        assert!(gate.check_email("a@example.com").await.is_err());

        store
            .set(&AllowlistNormalizer::default().normalize("a@example.com"))
            .await
            .unwrap();
        assert!(gate.check_email("a@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_configured_message() {
        let config = GateConfig {
            comparison: CandidateComparison::Exact,
            message: "Invite only.".to_string(),
        };
        let gate = RegistrationGate::new(
            Arc::new(MemoryAllowlistStore::new()),
            Arc::new(AllowlistNormalizer::default()),
            &config,
        );

        match gate.check_email("a@example.com").await {
            Err(AppError::ForbiddenEmail(forbidden)) => assert_eq!(forbidden.message, "Invite only."),
            other => panic!("expected ForbiddenEmail, got {:?}", other),
        }
        assert_eq!(gate.comparison(), CandidateComparison::Exact);
    }
}
