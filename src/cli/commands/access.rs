//! Executors for the `access/` object groups.

use crate::{
    cli::{
        args::{
            AclArgs, AclCommands, GroupCommands, RoleCommands, TokenCommands, TokenFields,
            UserCommands, UserFields,
        },
        output::{Outcome, RenderContext},
    },
    core::domain::{error::ProxmoxResult, value_object::Secret},
    operations::{AccessOperations, AclEntry, TokenOptions, UserAttributes},
    session::ClusterSession,
};
use serde_json::Value;
use std::io::Write;

impl From<&UserFields> for UserAttributes {
    fn from(fields: &UserFields) -> Self {
        let enable = match (fields.enable, fields.disable) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Self {
            email: fields.email.clone(),
            firstname: fields.firstname.clone(),
            lastname: fields.lastname.clone(),
            groups: fields.groups.clone(),
            enable,
            expire: fields.expire,
            comment: fields.comment.clone(),
        }
    }
}

impl From<&TokenFields> for TokenOptions {
    fn from(fields: &TokenFields) -> Self {
        let privsep = match (fields.privsep, fields.no_privsep) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Self {
            privsep,
            expire: fields.expire,
            comment: fields.comment.clone(),
        }
    }
}

impl AclArgs {
    fn entry(&self, propagate: bool) -> AclEntry {
        AclEntry {
            path: self.path.clone(),
            roles: self.roles.clone(),
            users: self.users.clone(),
            groups: self.groups.clone(),
            tokens: self.tokens.clone(),
            propagate,
        }
    }
}

pub struct UserCommand<'a> {
    access: AccessOperations<'a>,
}

impl<'a> UserCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self {
            access: AccessOperations::new(session),
        }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &UserCommands,
    ) -> ProxmoxResult<()> {
        let (userid, message) = match command {
            UserCommands::List => {
                let users = self.access.list_users().await?;
                return render.write(writer, &users, Some("Users"));
            }
            UserCommands::Show { userid } => {
                let user = self.access.show_user(userid).await?;
                return render.write(writer, &user, Some(&format!("User: {userid}")));
            }
            UserCommands::Create {
                userid,
                user_password,
                fields,
            } => {
                let password = user_password.clone().map(Secret::new);
                self.access
                    .create_user(userid, password.as_ref(), &fields.into())
                    .await?;
                (userid, format!("User '{userid}' created"))
            }
            UserCommands::Update { userid, fields } => {
                self.access.update_user(userid, &fields.into()).await?;
                (userid, format!("User '{userid}' updated"))
            }
            UserCommands::Delete { userid } => {
                self.access.delete_user(userid).await?;
                (userid, format!("User '{userid}' deleted"))
            }
            UserCommands::SetPassword {
                userid,
                new_password,
            } => {
                self.access
                    .set_password(userid, &Secret::new(new_password.as_str()))
                    .await?;
                (userid, format!("Password changed for user '{userid}'"))
            }
        };
        let outcome = Outcome::success(message).with("userid", userid);
        render.write_outcome(writer, &outcome)
    }
}

pub struct GroupCommand<'a> {
    access: AccessOperations<'a>,
}

impl<'a> GroupCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self {
            access: AccessOperations::new(session),
        }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &GroupCommands,
    ) -> ProxmoxResult<()> {
        let (groupid, message) = match command {
            GroupCommands::List => {
                let groups = self.access.list_groups().await?;
                return render.write(writer, &groups, Some("Groups"));
            }
            GroupCommands::Show { groupid } => {
                let group = self.access.show_group(groupid).await?;
                return render.write(writer, &group, Some(&format!("Group: {groupid}")));
            }
            GroupCommands::Create { groupid, comment } => {
                self.access.create_group(groupid, comment.as_deref()).await?;
                (groupid, "created")
            }
            GroupCommands::Update { groupid, comment } => {
                self.access.update_group(groupid, comment.as_deref()).await?;
                (groupid, "updated")
            }
            GroupCommands::Delete { groupid } => {
                self.access.delete_group(groupid).await?;
                (groupid, "deleted")
            }
        };
        let outcome =
            Outcome::success(format!("Group '{groupid}' {message}")).with("groupid", groupid);
        render.write_outcome(writer, &outcome)
    }
}

pub struct RoleCommand<'a> {
    access: AccessOperations<'a>,
}

impl<'a> RoleCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self {
            access: AccessOperations::new(session),
        }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &RoleCommands,
    ) -> ProxmoxResult<()> {
        let (roleid, message) = match command {
            RoleCommands::List => {
                let roles = self.access.list_roles().await?;
                return render.write(writer, &roles, Some("Roles"));
            }
            RoleCommands::Show { roleid } => {
                let role = self.access.show_role(roleid).await?;
                return render.write(writer, &role, Some(&format!("Role: {roleid}")));
            }
            RoleCommands::Create { roleid, privs } => {
                self.access.create_role(roleid, privs.as_deref()).await?;
                (roleid, "created")
            }
            RoleCommands::Update {
                roleid,
                privs,
                append,
            } => {
                self.access.update_role(roleid, privs, *append).await?;
                (roleid, "updated")
            }
            RoleCommands::Delete { roleid } => {
                self.access.delete_role(roleid).await?;
                (roleid, "deleted")
            }
        };
        let outcome =
            Outcome::success(format!("Role '{roleid}' {message}")).with("roleid", roleid);
        render.write_outcome(writer, &outcome)
    }
}

pub struct AclCommand<'a> {
    access: AccessOperations<'a>,
}

impl<'a> AclCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self {
            access: AccessOperations::new(session),
        }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &AclCommands,
    ) -> ProxmoxResult<()> {
        let (entry, message) = match command {
            AclCommands::List => {
                let acl = self.access.list_acl().await?;
                return render.write(writer, &acl, Some("Access Control Lists"));
            }
            AclCommands::Add {
                entry,
                no_propagate,
            } => {
                let entry = entry.entry(!no_propagate);
                self.access.add_acl(&entry).await?;
                (entry, "added")
            }
            AclCommands::Remove { entry } => {
                let entry = entry.entry(false);
                self.access.remove_acl(&entry).await?;
                (entry, "removed")
            }
        };
        let outcome = Outcome::success(format!("ACL entry {message} for path '{}'", entry.path))
            .with("path", &entry.path)
            .with("roles", &entry.roles);
        render.write_outcome(writer, &outcome)
    }
}

pub struct TokenCommand<'a> {
    access: AccessOperations<'a>,
}

impl<'a> TokenCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self {
            access: AccessOperations::new(session),
        }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &TokenCommands,
    ) -> ProxmoxResult<()> {
        match command {
            TokenCommands::List { userid } => {
                let tokens = self.access.list_tokens(userid).await?;
                render.write(writer, &tokens, Some(&format!("API Tokens for {userid}")))
            }
            TokenCommands::Show { userid, tokenid } => {
                let token = self.access.show_token(userid, tokenid).await?;
                render.write(writer, &token, Some(&format!("Token: {userid}!{tokenid}")))
            }
            TokenCommands::Create {
                userid,
                tokenid,
                fields,
            } => {
                let created = self
                    .access
                    .create_token(userid, tokenid, &fields.into())
                    .await?;
                let mut outcome =
                    Outcome::success(format!("Token '{tokenid}' created for user '{userid}'"))
                        .with("userid", userid)
                        .with("tokenid", tokenid);
                if let Value::Object(body) = created {
                    if let Some(secret) = body.get("value").and_then(Value::as_str) {
                        outcome = outcome.note(format!("Token value (shown only once): {secret}"));
                    }
                    outcome.details.extend(body);
                }
                render.write_outcome(writer, &outcome)
            }
            TokenCommands::Update {
                userid,
                tokenid,
                fields,
            } => {
                self.access
                    .update_token(userid, tokenid, &fields.into())
                    .await?;
                let outcome =
                    Outcome::success(format!("Token '{tokenid}' updated for user '{userid}'"))
                        .with("userid", userid)
                        .with("tokenid", tokenid);
                render.write_outcome(writer, &outcome)
            }
            TokenCommands::Delete { userid, tokenid } => {
                self.access.delete_token(userid, tokenid).await?;
                let outcome =
                    Outcome::success(format!("Token '{tokenid}' deleted for user '{userid}'"))
                        .with("userid", userid)
                        .with("tokenid", tokenid);
                render.write_outcome(writer, &outcome)
            }
        }
    }
}
