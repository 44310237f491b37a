//! Identity and permission objects under `access/`: users, groups, roles,
//! ACL entries and API tokens.
//!
//! Reads are returned as the API reports them. Writes validate their
//! parameters before anything is sent.

use crate::{
    core::domain::{
        error::{ProxmoxResult, ValidationError},
        value_object::{Secret, validate_identifier},
    },
    session::{ClusterSession, Resource},
};
use serde_json::{Map, Value, json};
use tracing::info;

/// Optional user attributes shared by create and update.
#[derive(Debug, Clone, Default)]
pub struct UserAttributes {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// Comma-separated group list.
    pub groups: Option<String>,
    /// `None` leaves the flag untouched.
    pub enable: Option<bool>,
    /// Expiry as a Unix epoch.
    pub expire: Option<u64>,
    pub comment: Option<String>,
}

impl UserAttributes {
    fn write_into(&self, params: &mut Map<String, Value>) {
        let text = [
            ("email", &self.email),
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("groups", &self.groups),
            ("comment", &self.comment),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.insert(key.into(), json!(value));
            }
        }
        if let Some(enable) = self.enable {
            params.insert("enable".into(), json!(u8::from(enable)));
        }
        if let Some(expire) = self.expire.filter(|e| *e > 0) {
            params.insert("expire".into(), json!(expire));
        }
    }
}

/// Options for creating or updating an API token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenOptions {
    /// Privilege separation; `None` leaves the server default.
    pub privsep: Option<bool>,
    pub expire: Option<u64>,
    pub comment: Option<String>,
}

impl TokenOptions {
    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(privsep) = self.privsep {
            params.insert("privsep".into(), json!(u8::from(privsep)));
        }
        if let Some(expire) = self.expire.filter(|e| *e > 0) {
            params.insert("expire".into(), json!(expire));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            params.insert("comment".into(), json!(comment));
        }
        params
    }
}

/// One ACL grant: `roles` on `path` for a set of subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclEntry {
    pub path: String,
    /// Comma-separated role list.
    pub roles: String,
    pub users: Option<String>,
    pub groups: Option<String>,
    pub tokens: Option<String>,
    pub propagate: bool,
}

impl AclEntry {
    fn to_params(&self, delete: bool) -> Result<Value, ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::field(
                "path",
                format!("ACL path '{}' must start with '/'", self.path),
            ));
        }
        if self.roles.trim().is_empty() {
            return Err(ValidationError::field("roles", "At least one role is required"));
        }

        let subjects = [
            ("users", &self.users),
            ("groups", &self.groups),
            ("tokens", &self.tokens),
        ];
        let mut params = Map::new();
        params.insert("path".into(), json!(self.path));
        params.insert("roles".into(), json!(self.roles));
        for (key, value) in subjects {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.insert(key.into(), json!(value));
            }
        }
        if !subjects.iter().any(|(key, _)| params.contains_key(*key)) {
            return Err(ValidationError::ConstraintViolation(
                "At least one of users, groups, or tokens must be specified".to_string(),
            ));
        }

        if delete {
            params.insert("delete".into(), json!(1));
        } else {
            params.insert("propagate".into(), json!(u8::from(self.propagate)));
        }
        Ok(Value::Object(params))
    }
}

fn no_update_fields() -> ValidationError {
    ValidationError::ConstraintViolation("No update parameters provided".to_string())
}

/// Operations on `access/`.
#[derive(Debug, Clone, Copy)]
pub struct AccessOperations<'a> {
    session: &'a ClusterSession,
}

impl<'a> AccessOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    // Users

    pub async fn list_users(&self) -> ProxmoxResult<Value> {
        self.session.access().child("users").get().await
    }

    pub async fn show_user(&self, userid: &str) -> ProxmoxResult<Value> {
        self.user(userid)?.get().await
    }

    pub async fn create_user(
        &self,
        userid: &str,
        password: Option<&Secret>,
        attributes: &UserAttributes,
    ) -> ProxmoxResult<()> {
        validate_identifier("userid", userid)?;
        let mut params = Map::new();
        params.insert("userid".into(), json!(userid));
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            params.insert("password".into(), json!(password.expose()));
        }
        // A new user is enabled unless told otherwise.
        let attributes = UserAttributes {
            enable: attributes.enable.filter(|enabled| !enabled),
            ..attributes.clone()
        };
        attributes.write_into(&mut params);

        self.session
            .access()
            .child("users")
            .post(Value::Object(params))
            .await?;
        info!(%userid, "user created");
        Ok(())
    }

    pub async fn update_user(&self, userid: &str, attributes: &UserAttributes) -> ProxmoxResult<()> {
        let mut params = Map::new();
        attributes.write_into(&mut params);
        if params.is_empty() {
            return Err(no_update_fields().into());
        }
        self.user(userid)?.put(Value::Object(params)).await?;
        Ok(())
    }

    pub async fn delete_user(&self, userid: &str) -> ProxmoxResult<()> {
        self.user(userid)?.delete().await?;
        info!(%userid, "user deleted");
        Ok(())
    }

    pub async fn set_password(&self, userid: &str, password: &Secret) -> ProxmoxResult<()> {
        validate_identifier("userid", userid)?;
        if password.is_empty() {
            return Err(ValidationError::field("password", "Password cannot be empty").into());
        }
        self.session
            .access()
            .child("password")
            .put(json!({ "userid": userid, "password": password.expose() }))
            .await?;
        Ok(())
    }

    // Groups

    pub async fn list_groups(&self) -> ProxmoxResult<Value> {
        self.session.access().child("groups").get().await
    }

    pub async fn show_group(&self, groupid: &str) -> ProxmoxResult<Value> {
        self.named("groups", "groupid", groupid)?.get().await
    }

    pub async fn create_group(&self, groupid: &str, comment: Option<&str>) -> ProxmoxResult<()> {
        self.create_named("groups", "groupid", groupid, "comment", comment)
            .await
    }

    pub async fn update_group(&self, groupid: &str, comment: Option<&str>) -> ProxmoxResult<()> {
        let comment = comment.filter(|c| !c.is_empty()).ok_or_else(no_update_fields)?;
        self.named("groups", "groupid", groupid)?
            .put(json!({ "comment": comment }))
            .await?;
        Ok(())
    }

    pub async fn delete_group(&self, groupid: &str) -> ProxmoxResult<()> {
        self.named("groups", "groupid", groupid)?.delete().await?;
        Ok(())
    }

    // Roles

    pub async fn list_roles(&self) -> ProxmoxResult<Value> {
        self.session.access().child("roles").get().await
    }

    pub async fn show_role(&self, roleid: &str) -> ProxmoxResult<Value> {
        self.named("roles", "roleid", roleid)?.get().await
    }

    pub async fn create_role(&self, roleid: &str, privs: Option<&str>) -> ProxmoxResult<()> {
        self.create_named("roles", "roleid", roleid, "privs", privs)
            .await
    }

    /// Replaces the role's privileges, or adds to them with `append`.
    pub async fn update_role(&self, roleid: &str, privs: &str, append: bool) -> ProxmoxResult<()> {
        if privs.trim().is_empty() {
            return Err(no_update_fields().into());
        }
        let mut params = json!({ "privs": privs });
        if append {
            params["append"] = json!(1);
        }
        self.named("roles", "roleid", roleid)?.put(params).await?;
        Ok(())
    }

    pub async fn delete_role(&self, roleid: &str) -> ProxmoxResult<()> {
        self.named("roles", "roleid", roleid)?.delete().await?;
        Ok(())
    }

    // ACL

    pub async fn list_acl(&self) -> ProxmoxResult<Value> {
        self.session.access().child("acl").get().await
    }

    pub async fn add_acl(&self, entry: &AclEntry) -> ProxmoxResult<()> {
        self.session
            .access()
            .child("acl")
            .put(entry.to_params(false)?)
            .await?;
        info!(path = %entry.path, roles = %entry.roles, "ACL entry added");
        Ok(())
    }

    pub async fn remove_acl(&self, entry: &AclEntry) -> ProxmoxResult<()> {
        self.session
            .access()
            .child("acl")
            .put(entry.to_params(true)?)
            .await?;
        info!(path = %entry.path, roles = %entry.roles, "ACL entry removed");
        Ok(())
    }

    // Tokens

    pub async fn list_tokens(&self, userid: &str) -> ProxmoxResult<Value> {
        self.user(userid)?.child("token").get().await
    }

    pub async fn show_token(&self, userid: &str, tokenid: &str) -> ProxmoxResult<Value> {
        self.token(userid, tokenid)?.get().await
    }

    /// Creates a token. The response carries the secret `value`, which the
    /// server reports only once.
    pub async fn create_token(
        &self,
        userid: &str,
        tokenid: &str,
        options: &TokenOptions,
    ) -> ProxmoxResult<Value> {
        let response = self
            .token(userid, tokenid)?
            .post(Value::Object(options.to_params()))
            .await?;
        info!(%userid, %tokenid, "API token created");
        Ok(response)
    }

    pub async fn update_token(
        &self,
        userid: &str,
        tokenid: &str,
        options: &TokenOptions,
    ) -> ProxmoxResult<()> {
        let params = options.to_params();
        if params.is_empty() {
            return Err(no_update_fields().into());
        }
        self.token(userid, tokenid)?
            .put(Value::Object(params))
            .await?;
        Ok(())
    }

    pub async fn delete_token(&self, userid: &str, tokenid: &str) -> ProxmoxResult<()> {
        self.token(userid, tokenid)?.delete().await?;
        Ok(())
    }

    async fn create_named(
        &self,
        collection: &str,
        id_key: &str,
        id: &str,
        extra_key: &str,
        extra: Option<&str>,
    ) -> ProxmoxResult<()> {
        validate_identifier(id_key, id)?;
        let mut params = json!({ id_key: id });
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            params[extra_key] = json!(extra);
        }
        self.session.access().child(collection).post(params).await?;
        info!(%collection, %id, "access object created");
        Ok(())
    }

    fn named(&self, collection: &str, id_key: &str, id: &str) -> ProxmoxResult<Resource<'a>> {
        validate_identifier(id_key, id)?;
        Ok(self.session.access().child(collection).child(id))
    }

    fn user(&self, userid: &str) -> ProxmoxResult<Resource<'a>> {
        self.named("users", "userid", userid)
    }

    fn token(&self, userid: &str, tokenid: &str) -> ProxmoxResult<Resource<'a>> {
        validate_identifier("tokenid", tokenid)?;
        Ok(self.user(userid)?.child("token").child(tokenid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::error::ProxmoxError;
    use crate::core::infrastructure::api_client::MockApiTransport;
    use std::sync::Arc;

    fn entry() -> AclEntry {
        AclEntry {
            path: "/vms/100".to_string(),
            roles: "PVEVMUser".to_string(),
            users: Some("alice@pve".to_string()),
            propagate: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_acl_add_and_remove_params() {
        assert_eq!(
            entry().to_params(false).unwrap(),
            json!({
                "path": "/vms/100",
                "roles": "PVEVMUser",
                "users": "alice@pve",
                "propagate": 1
            })
        );
        assert_eq!(entry().to_params(true).unwrap()["delete"], 1);
    }

    #[test]
    fn test_acl_requires_a_subject() {
        let entry = AclEntry {
            users: Some(String::new()),
            ..entry()
        };
        assert!(matches!(
            entry.to_params(false),
            Err(ValidationError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_user_attributes() {
        let attributes = UserAttributes {
            email: Some("alice@example.com".to_string()),
            enable: Some(false),
            expire: Some(0),
            ..Default::default()
        };
        let mut params = Map::new();
        attributes.write_into(&mut params);
        assert_eq!(
            Value::Object(params),
            json!({ "email": "alice@example.com", "enable": 0 })
        );
    }

    #[tokio::test]
    async fn test_empty_updates_send_nothing() {
        let mut transport = MockApiTransport::new();
        transport.expect_request().never();
        let session = ClusterSession::with_transport(Arc::new(transport));
        let access = AccessOperations::new(&session);

        let user = access
            .update_user("alice@pve", &UserAttributes::default())
            .await;
        let group = access.update_group("admins", None).await;
        let token = access
            .update_token("alice@pve", "ci", &TokenOptions::default())
            .await;

        for result in [user, group, token] {
            assert!(matches!(result, Err(ProxmoxError::Validation(_))));
        }
    }
}
