/// Auth trait
pub trait Auth {
    /// create `Authorization` header value
    fn create_header(&self) -> String;
}

/// Bearer auth
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    /// create new bearer auth
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    /// `None` when the token is empty or whitespace
    pub fn non_empty(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self::new(token))
        }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"***").finish()
    }
}

impl Auth for BearerAuth {
    fn create_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
