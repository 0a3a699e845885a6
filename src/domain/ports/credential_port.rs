//! Request-credential port definition.

use async_trait::async_trait;

/// Port for the request-authorization collaborator.
///
/// Session handling lives outside this crate; the client only asks for the
/// current bearer token right before attaching it to a request.
#[async_trait]
pub trait CredentialProviderPort: Send + Sync {
    /// Current bearer token, or `None` when no session is established.
    async fn bearer_token(&self) -> Option<String>;
}

/// Static credential provider for tokens supplied via config or environment.
pub struct StaticCredentialProvider {
    token: Option<String>,
}

impl StaticCredentialProvider {
    /// Creates a provider serving a fixed token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProviderPort for StaticCredentialProvider {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
