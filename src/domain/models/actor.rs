use std::fmt;

/// Identity of the caller of a catalog operation.
///
/// An actor with an empty login is anonymous. The external token is only
/// checked for presence here; obtaining and validating it is the job of the
/// session layer that builds the actor. Actors are never persisted, so the
/// type is not serializable and its `Debug` output redacts the token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Actor {
    uid: String,
    login: String,
    external_token: Option<String>,
}

impl Actor {
    pub fn new(uid: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            login: login.into(),
            external_token: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_external_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.external_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn external_token(&self) -> Option<&str> {
        self.external_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.login.is_empty()
    }

    /// True when the external authorization provider can be asked on this
    /// actor's behalf.
    pub fn can_query_provider(&self) -> bool {
        self.is_authenticated() && self.external_token.is_some()
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("uid", &self.uid)
            .field("login", &self.login)
            .field("external_token", &self.external_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
