/// Reentrancy protection for controller operations.
/// A controller enters the guard before its first external call and leaves it
/// only after its state has been updated, so a nested call into the same
/// controller during that window is rejected.
use std::cell::Cell;

use launchpad_types::{LaunchpadError, LaunchpadResult, Pubkey};

// ============================================================================
// Reentrancy Status Types
// ============================================================================

/// Reentrancy guard status flags
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReentrancyStatus {
    /// Ready for operations
    #[default]
    Unlocked = 0,
    /// An operation is in flight
    Locked = 1,
}

// ============================================================================
// Reentrancy Guard Manager
// ============================================================================

/// Reentrancy guard manager
pub struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Acquire lock for an operation on `account`
    pub fn acquire(status: &Cell<ReentrancyStatus>, account: &Pubkey) -> LaunchpadResult<()> {
        match status.get() {
            ReentrancyStatus::Unlocked => {
                status.set(ReentrancyStatus::Locked);
                Ok(())
            }
            ReentrancyStatus::Locked => Err(LaunchpadError::ReentrancyDetected { account: *account }),
        }
    }

    /// Release lock after operation completes
    pub fn release(status: &Cell<ReentrancyStatus>) {
        if status.get() == ReentrancyStatus::Unlocked {
            log::warn!("Releasing an already unlocked reentrancy guard");
        }
        status.set(ReentrancyStatus::Unlocked);
    }

    pub fn is_locked(status: &Cell<ReentrancyStatus>) -> bool {
        status.get() != ReentrancyStatus::Unlocked
    }
}

/// RAII-style guard that automatically releases on drop
pub struct ScopedGuard<'a> {
    status: &'a Cell<ReentrancyStatus>,
}

impl<'a> ScopedGuard<'a> {
    /// Create a new scoped guard that acquires the lock
    pub fn enter(status: &'a Cell<ReentrancyStatus>, account: &Pubkey) -> LaunchpadResult<Self> {
        ReentrancyGuard::acquire(status, account)?;
        Ok(Self { status })
    }
}

impl<'a> Drop for ScopedGuard<'a> {
    fn drop(&mut self) {
        ReentrancyGuard::release(self.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentrancy_guard_lifecycle() {
        let status = Cell::new(ReentrancyStatus::Unlocked);
        let account = Pubkey::new_unique();

        assert!(ReentrancyGuard::acquire(&status, &account).is_ok());
        assert!(ReentrancyGuard::is_locked(&status));

        assert_eq!(
            ReentrancyGuard::acquire(&status, &account),
            Err(LaunchpadError::ReentrancyDetected { account })
        );

        ReentrancyGuard::release(&status);
        assert_eq!(status.get(), ReentrancyStatus::Unlocked);
    }

    #[test]
    fn test_scoped_guard_rejects_nested_entry() {
        let status = Cell::new(ReentrancyStatus::Unlocked);
        let account = Pubkey::new_unique();

        {
            let _outer = ScopedGuard::enter(&status, &account).unwrap();
            assert_eq!(status.get(), ReentrancyStatus::Locked);
            assert!(ScopedGuard::enter(&status, &account).is_err());
            // The failed entry must not unlock the outer scope
            assert_eq!(status.get(), ReentrancyStatus::Locked);
        }

        assert_eq!(status.get(), ReentrancyStatus::Unlocked);
    }
}
