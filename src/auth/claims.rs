use serde::{Deserialize, Serialize};

/// Session token payload. The email is the only identity the server trusts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,  // account email
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}
