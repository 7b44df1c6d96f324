use crate::config::Target;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::types::{PushPayload, ZERO_SHA};

/// Resolves how many commits each push carried. Push events no longer embed
/// their commit list, so every push costs one range comparison.
pub struct CommitCounter<'a> {
    client: &'a GitHubClient,
    target: &'a Target,
    /// Default-branch head, looked up at most once per run.
    default_base: Option<Option<String>>,
}

impl<'a> CommitCounter<'a> {
    pub fn new(client: &'a GitHubClient, target: &'a Target) -> Self {
        Self {
            client,
            target,
            default_base: None,
        }
    }

    pub async fn count_pushes(&mut self, pushes: &[&PushPayload]) -> Result<u64> {
        let mut total = 0;
        for push in pushes {
            total += self.count_push(push).await?;
        }
        Ok(total)
    }

    pub async fn count_push(&mut self, push: &PushPayload) -> Result<u64> {
        let Some(head) = push.head.as_deref() else {
            tracing::warn!("Push {:?} has no head SHA, counting it as one commit", push.push_id);
            return Ok(1);
        };

        let base = match push.before.as_deref() {
            Some(before) if before != ZERO_SHA => Some(before.to_string()),
            _ => self.default_base().await?,
        };

        match base {
            Some(base) => {
                self.client
                    .compare_commit_count(&self.target.owner, &self.target.repo, &base, head)
                    .await
            }
            None => {
                tracing::warn!(
                    "No usable base for new-branch push {:?}, counting it as one commit",
                    push.push_id
                );
                Ok(1)
            }
        }
    }

    async fn default_base(&mut self) -> Result<Option<String>> {
        if let Some(cached) = &self.default_base {
            return Ok(cached.clone());
        }

        let resolved = match self.lookup_default_head().await {
            Ok(head) => head,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                tracing::warn!("Default branch lookup failed: {}", err);
                None
            }
        };
        self.default_base = Some(resolved.clone());
        Ok(resolved)
    }

    async fn lookup_default_head(&self) -> Result<Option<String>> {
        let (owner, repo) = (&self.target.owner, &self.target.repo);
        let branch = self.client.default_branch(owner, repo).await?;
        self.client.branch_head(owner, repo, &branch).await
    }
}
