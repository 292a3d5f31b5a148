//! Notification implementations

use async_trait::async_trait;
use tracing::info;

use crate::domain::notification::InviteNotifier;
use crate::domain::team::Team;
use crate::domain::DomainError;

/// Notifier that only logs the invitation
///
/// Mail delivery (SMTP/Sparkpost) is wired up by the surrounding service;
/// this stands in wherever no mailer is configured.
#[derive(Debug, Default)]
pub struct TracingInviteNotifier;

impl TracingInviteNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InviteNotifier for TracingInviteNotifier {
    async fn notify_invited(&self, email: &str, team: &Team) -> Result<(), DomainError> {
        info!(email = %email, team = %team.id(), "invitation notice queued");
        Ok(())
    }
}
