//! Shared-secret role authentication.

use crate::user::domain::Role;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Maps a presented shared secret to a role.
///
/// Only SHA-256 digests of the configured secrets are kept in memory.
#[derive(Clone)]
pub struct SharedSecretAuthenticator {
    admin_digest: [u8; 32],
    worker_digest: [u8; 32],
}

impl std::fmt::Debug for SharedSecretAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuthenticator")
            .finish_non_exhaustive()
    }
}

impl SharedSecretAuthenticator {
    /// Creates an authenticator for the admin and worker secrets.
    #[must_use]
    pub fn new(admin_secret: &str, worker_secret: &str) -> Self {
        Self {
            admin_digest: digest(admin_secret),
            worker_digest: digest(worker_secret),
        }
    }

    /// Returns the role unlocked by `secret`, or `None` when it matches
    /// neither configured secret.
    #[must_use]
    pub fn authenticate(&self, secret: &str) -> Option<Role> {
        let presented = digest(secret);
        if presented == self.admin_digest {
            info!(role = %Role::Admin, "shared secret accepted");
            Some(Role::Admin)
        } else if presented == self.worker_digest {
            info!(role = %Role::Worker, "shared secret accepted");
            Some(Role::Worker)
        } else {
            warn!("shared secret rejected");
            None
        }
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}
