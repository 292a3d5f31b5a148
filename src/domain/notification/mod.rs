//! Notification collaborator contract
//!
//! The core only needs a fire-and-forget signal that a pending invitation was
//! recorded; mail transport (SMTP, Sparkpost) lives outside this crate. A
//! notifier failure is logged by the caller and never rolls back the
//! invitation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::team::Team;
use crate::domain::DomainError;

/// Outbound notice that an email address was invited to a team
#[async_trait]
pub trait InviteNotifier: Send + Sync + Debug {
    async fn notify_invited(&self, email: &str, team: &Team) -> Result<(), DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every notification; optionally fails each call
    #[derive(Debug, Default)]
    pub struct RecordingInviteNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingInviteNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        /// (email, team name) pairs seen so far
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InviteNotifier for RecordingInviteNotifier {
        async fn notify_invited(&self, email: &str, team: &Team) -> Result<(), DomainError> {
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), team.name().to_string()));

            if self.fail {
                return Err(DomainError::notification("mail relay unreachable"));
            }

            Ok(())
        }
    }
}
