use serde::Serialize;

/// Body of `POST /access/ticket`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    /// Full user id including the realm, e.g. `root@pam`.
    pub username: &'a str,
    pub password: &'a str,
}
