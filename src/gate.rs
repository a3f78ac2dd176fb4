// src/gate.rs
use log::{info, warn};

/// Password lock for a single tool tab.
#[derive(Debug, Clone)]
pub struct AccessGate {
    password: String,
    unlocked: bool,
    failed_attempts: u32,
}

impl AccessGate {
    pub fn new(password: &str) -> Self {
        let password = password.trim().to_owned();
        Self {
            unlocked: password.is_empty(),
            password,
            failed_attempts: 0,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// True when a password is configured at all.
    pub fn is_protected(&self) -> bool {
        !self.password.is_empty()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn try_unlock(&mut self, attempt: &str) -> bool {
        if self.unlocked {
            return true;
        }
        if attempt.trim() == self.password {
            self.unlocked = true;
            info!("locked tab opened after {} failed attempt(s)", self.failed_attempts);
            self.failed_attempts = 0;
        } else {
            self.failed_attempts += 1;
            warn!("wrong password for locked tab (attempt {})", self.failed_attempts);
        }
        self.unlocked
    }

    /// No-op when no password is configured.
    pub fn lock(&mut self) {
        if self.is_protected() {
            self.unlocked = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn unlocks_with_trimmed_password() {
        let mut gate = AccessGate::new("secret");
        assert!(!gate.is_unlocked());
        assert!(!gate.try_unlock("Secret"));
        assert!(!gate.try_unlock(""));
        assert_eq!(gate.failed_attempts(), 2);
        assert!(gate.try_unlock("  secret\n"));
        assert!(gate.is_unlocked());
        assert_eq!(gate.failed_attempts(), 0);
        gate.lock();
        assert!(!gate.is_unlocked());
    }
    #[test]
    fn empty_password_is_always_open() {
        let mut gate = AccessGate::new("   ");
        assert!(gate.is_unlocked());
        assert!(!gate.is_protected());
        gate.lock();
        assert!(gate.is_unlocked());
    }
}
