use crate::core::domain::value_object::{
    ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUsername, Secret,
};
use reqwest::header::{
    AUTHORIZATION, COOKIE, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue,
};

const CSRF_HEADER: HeaderName = HeaderName::from_static("csrfpreventiontoken");

/// Authentication state of an open session.
#[derive(Debug, Clone)]
pub enum ProxmoxAuth {
    /// Ticket obtained through a password login.
    Ticket {
        ticket: ProxmoxTicket,
        csrf_token: ProxmoxCSRFToken,
    },
    /// API token sent as an `Authorization` header.
    ApiToken { header: Secret },
}

impl ProxmoxAuth {
    pub fn ticket(ticket: ProxmoxTicket, csrf_token: ProxmoxCSRFToken) -> Self {
        ProxmoxAuth::Ticket { ticket, csrf_token }
    }

    /// Builds the `PVEAPIToken={user}!{name}={secret}` authorization value.
    pub fn api_token(user: &ProxmoxUsername, name: &str, secret: &Secret) -> Self {
        ProxmoxAuth::ApiToken {
            header: Secret::new(format!("PVEAPIToken={}!{}={}", user, name, secret.expose())),
        }
    }

    /// Headers to attach to a request. The CSRF token is only required on
    /// mutating calls.
    pub fn headers(&self, mutating: bool) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        match self {
            ProxmoxAuth::Ticket { ticket, csrf_token } => {
                headers.insert(COOKIE, HeaderValue::from_str(&ticket.as_cookie_header())?);
                if mutating {
                    headers.insert(CSRF_HEADER, HeaderValue::from_str(csrf_token.as_str())?);
                }
            }
            ProxmoxAuth::ApiToken { header } => {
                let mut value = HeaderValue::from_str(header.expose())?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_headers() {
        let auth = ProxmoxAuth::ticket(
            ProxmoxTicket::new_unchecked("PVE:root@pam:4EEC61E2::sig".to_string()),
            ProxmoxCSRFToken::new_unchecked("4EEC61E2:token".to_string()),
        );

        let read = auth.headers(false).unwrap();
        assert_eq!(read[COOKIE], "PVEAuthCookie=PVE:root@pam:4EEC61E2::sig");
        assert!(read.get(CSRF_HEADER).is_none());

        let write = auth.headers(true).unwrap();
        assert_eq!(write[CSRF_HEADER], "4EEC61E2:token");
    }

    #[test]
    fn test_api_token_header() {
        let user = ProxmoxUsername::new("automation@pve").unwrap();
        let auth = ProxmoxAuth::api_token(&user, "ci", &Secret::new("1234-abcd"));
        let headers = auth.headers(true).unwrap();
        assert_eq!(
            headers[AUTHORIZATION],
            "PVEAPIToken=automation@pve!ci=1234-abcd"
        );
        assert!(headers.get(COOKIE).is_none());
    }
}
