use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{OneTimeCode, UserId, VerificationFlag};

/// A freshly issued one-time code
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_in_seconds: i64,
}

/// Manages the simulated one-time-code verification flow
pub struct VerificationManager {
    /// Outstanding codes (user_id -> code)
    codes: DashMap<UserId, OneTimeCode>,

    /// Verified users (user_id -> flag)
    verified: DashMap<UserId, VerificationFlag>,

    /// How long a code stays valid
    code_ttl: Duration,
}

impl VerificationManager {
    pub fn new(code_ttl: Duration) -> Self {
        Self {
            codes: DashMap::new(),
            verified: DashMap::new(),
            code_ttl,
        }
    }

    /// Issue a new code for a user, replacing any earlier one
    pub fn request_code(&self, user_id: UserId) -> IssuedCode {
        self.request_code_at(user_id, Utc::now())
    }

    fn request_code_at(&self, user_id: UserId, now: DateTime<Utc>) -> IssuedCode {
        let code = generate_code();
        self.codes.insert(
            user_id,
            OneTimeCode {
                code: code.clone(),
                expires_at: now
                    .checked_add_signed(self.code_ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
        info!(user_id, "Issued verification code");

        IssuedCode {
            code,
            expires_in_seconds: self.code_ttl.num_seconds(),
        }
    }

    /// Check a submitted code and mark the user verified on a match
    pub fn confirm_code(&self, user_id: UserId, submitted: &str) -> Result<VerificationFlag> {
        self.confirm_code_at(user_id, submitted, Utc::now())
    }

    fn confirm_code_at(
        &self,
        user_id: UserId,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<VerificationFlag> {
        let entry = self
            .codes
            .get(&user_id)
            .map(|r| r.clone())
            .ok_or(AppError::NoCodeRequested)?;

        if entry.is_expired_at(now) {
            self.codes.remove(&user_id);
            debug!(user_id, "Rejected expired verification code");
            return Err(AppError::CodeExpired);
        }

        if submitted != entry.code {
            debug!(user_id, "Rejected wrong verification code");
            return Err(AppError::InvalidCode);
        }

        self.codes.remove(&user_id);
        let flag = VerificationFlag { verified_at: now };
        self.verified.insert(user_id, flag);
        info!(user_id, "User verified");
        Ok(flag)
    }

    /// Verification timestamp for a user, if verified
    pub fn status(&self, user_id: UserId) -> Option<VerificationFlag> {
        self.verified.get(&user_id).map(|r| *r)
    }

    pub fn is_verified(&self, user_id: UserId) -> bool {
        self.verified.contains_key(&user_id)
    }

    #[cfg(test)]
    pub fn has_pending_code(&self, user_id: UserId) -> bool {
        self.codes.contains_key(&user_id)
    }

    /// Drop codes that have passed their expiry
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.codes.len();
        self.codes.retain(|_, c| !c.is_expired_at(now));
        before.saturating_sub(self.codes.len())
    }
}

/// Six decimal digits, 100000..=999999
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Shared verification manager type
pub type SharedVerificationManager = Arc<VerificationManager>;

pub fn create_shared_verification_manager(code_ttl: Duration) -> SharedVerificationManager {
    Arc::new(VerificationManager::new(code_ttl))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> VerificationManager {
        VerificationManager::new(Duration::seconds(300))
    }

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn test_confirm_without_request() {
        let vm = manager();
        assert!(matches!(
            vm.confirm_code(1, "123456"),
            Err(AppError::NoCodeRequested)
        ));
        assert!(!vm.is_verified(1));
    }

    #[test]
    fn test_confirm_success() {
        let vm = manager();
        let issued = vm.request_code(1);
        assert_eq!(issued.expires_in_seconds, 300);

        let flag = vm.confirm_code(1, &issued.code).unwrap();
        assert!(vm.is_verified(1));
        assert_eq!(vm.status(1), Some(flag));
        assert!(!vm.has_pending_code(1));
    }

    #[test]
    fn test_wrong_code_keeps_pending() {
        let vm = manager();
        let issued = vm.request_code(1);
        let wrong = if issued.code == "111111" { "222222" } else { "111111" };

        assert!(matches!(vm.confirm_code(1, wrong), Err(AppError::InvalidCode)));
        assert!(vm.has_pending_code(1));
        assert!(vm.confirm_code(1, &issued.code).is_ok());
    }

    #[test]
    fn test_code_must_match_exactly() {
        let vm = manager();
        let issued = vm.request_code(1);

        for near_miss in [
            format!(" {} ", issued.code),
            format!("{}\n", issued.code),
            format!("0{}", issued.code),
        ] {
            assert!(matches!(
                vm.confirm_code(1, &near_miss),
                Err(AppError::InvalidCode)
            ));
        }
        assert!(!vm.is_verified(1));
        assert!(vm.confirm_code(1, &issued.code).is_ok());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let vm = VerificationManager::new(Duration::seconds(1_000_000_000_000_000));
        let issued = vm.request_code(1);

        assert_eq!(issued.expires_in_seconds, 1_000_000_000_000_000);
        assert!(vm.confirm_code(1, &issued.code).is_ok());
    }

    #[test]
    fn test_expired_code_never_verifies() {
        let vm = manager();
        let now = Utc::now();
        let issued = vm.request_code_at(1, now);

        let later = now + Duration::seconds(301);
        assert!(matches!(
            vm.confirm_code_at(1, &issued.code, later),
            Err(AppError::CodeExpired)
        ));
        assert!(!vm.is_verified(1));
        assert!(!vm.has_pending_code(1));
    }

    #[test]
    fn test_new_request_replaces_code() {
        let vm = manager();
        let now = Utc::now();
        vm.request_code_at(1, now);
        let second = vm.request_code_at(1, now + Duration::seconds(290));

        // Second code is still valid after the first would have expired
        let check_at = now + Duration::seconds(350);
        assert!(vm.confirm_code_at(1, &second.code, check_at).is_ok());
    }

    #[test]
    fn test_codes_are_per_user() {
        let vm = manager();
        let issued = vm.request_code(1);
        assert!(matches!(
            vm.confirm_code(2, &issued.code),
            Err(AppError::NoCodeRequested)
        ));
    }

    #[test]
    fn test_cleanup_expired() {
        let vm = manager();
        let now = Utc::now();
        vm.request_code_at(1, now - Duration::seconds(600));
        vm.request_code_at(2, now);

        assert_eq!(vm.cleanup_expired_at(now), 1);
        assert!(!vm.has_pending_code(1));
        assert!(vm.has_pending_code(2));
    }
}
