//! Cross-application session handoff.
//!
//! Each front end is deployed separately; a signed-in user moving between
//! them carries a one-time token embedded in the URL. The bridge runs
//! exactly once at startup: it probes the location for that token,
//! validates it against the backend profile endpoint, seeds the session,
//! and scrubs the token from the visible URL so it never survives in
//! history or bookmarks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::client::ApiClient;
use crate::config::Service;
use crate::request::RequestSpec;
use crate::response::normalize_as;
use crate::session::{Role, Session, UserProfile};

/// Host-side window/location capability.
///
/// The core never touches a browser or window directly; the hosting app
/// adapts whatever location API it has to this port.
pub trait LocationPort: Send + Sync {
    /// The full URL the application was opened with.
    fn current_url(&self) -> String;
    /// Replace the visible URL without navigating (history rewrite).
    fn replace_url(&self, url: &str);
    /// Navigate away to another location.
    fn redirect(&self, url: &str);
}

/// Landing locations per role for one deployed front end.
#[derive(Debug, Clone)]
pub struct LandingTable {
    pub admin: String,
    pub reviewer: String,
    pub user: String,
}

impl LandingTable {
    /// Default deployment of the errand app.
    pub fn errand() -> Self {
        Self::for_origin("http://localhost:5173")
    }

    /// Default deployment of the lost-and-found app.
    pub fn lostfound() -> Self {
        Self::for_origin("http://localhost:5174")
    }

    /// Dashboard routes under an arbitrary origin.
    pub fn for_origin(origin: &str) -> Self {
        Self {
            admin: format!("{}/#/pages/admin/dashboard", origin),
            reviewer: format!("{}/#/pages/reviewer/dashboard", origin),
            user: format!("{}/#/pages/user/dashboard", origin),
        }
    }

    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::Reviewer => &self.reviewer,
            Role::User => &self.user,
        }
    }
}

/// Bridge configuration for one front end.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Which backend validates the handed-off token.
    pub service: Service,
    /// Where to land after a successful handoff, by role.
    pub landing: LandingTable,
    /// Pause before the landing redirect, giving the host a moment to
    /// render its signed-in state.
    pub redirect_delay_ms: u64,
}

impl BridgeConfig {
    pub fn new(service: Service, landing: LandingTable) -> Self {
        Self {
            service,
            landing,
            redirect_delay_ms: 2_000,
        }
    }

    pub fn redirect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.redirect_delay_ms = delay_ms;
        self
    }
}

/// What the bridge did on this start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// No token was embedded in the URL; normal start.
    NoToken,
    /// Token validated; a session is established and a redirect issued.
    Established(Role),
    /// Token present but rejected; the user stays a guest.
    Rejected,
}

/// One-shot startup handoff.
pub struct SessionBridge {
    config: BridgeConfig,
    location: Arc<dyn LocationPort>,
}

impl SessionBridge {
    pub fn new(config: BridgeConfig, location: Arc<dyn LocationPort>) -> Self {
        Self { config, location }
    }

    /// Run the handoff. Call before any other traffic; the profile fetch
    /// completes fully before the redirect timer starts.
    ///
    /// A rejected or unreachable validation leaves the caller a guest and
    /// is silent beyond logging; the token is scrubbed from the URL in
    /// every case.
    pub async fn run(&self, client: &ApiClient) -> BridgeOutcome {
        let raw_url = self.location.current_url();
        let Some(token) = extract_bridge_token(&raw_url) else {
            debug!("No bridge token in URL");
            return BridgeOutcome::NoToken;
        };

        info!("Bridge token found, validating");
        let validated = self.validate(client, &token).await;

        // The token must not remain visible whether or not it validated.
        let scrubbed = scrub_token(&raw_url);
        self.location.replace_url(&scrubbed);

        let user = match validated {
            Ok(user) => user,
            Err(e) => {
                warn!("Bridge token rejected: {}", e);
                return BridgeOutcome::Rejected;
            }
        };

        let role = user.role;
        let session = Session { token, user };
        if let Err(e) = client.session().login(session).await {
            warn!("Failed to persist bridged session: {}", e);
            return BridgeOutcome::Rejected;
        }

        tokio::time::sleep(Duration::from_millis(self.config.redirect_delay_ms)).await;
        let landing = self.config.landing.for_role(role);
        info!(?role, %landing, "Bridge handoff complete, redirecting");
        self.location.redirect(landing);

        BridgeOutcome::Established(role)
    }

    /// Exchange the token for a profile.
    ///
    /// Deliberately bypasses the client's auth-expired funnel: a rejected
    /// bridge token must not trigger the signed-out notice on a user who
    /// was never signed in.
    async fn validate(&self, client: &ApiClient, token: &str) -> crate::error::Result<UserProfile> {
        let path = match self.config.service {
            Service::Errand => "/user/info",
            Service::LostFound => "/users/profile",
        };
        let spec = RequestSpec::get(self.config.service, path)
            .header("Authorization", format!("Bearer {}", token));
        let outcome = client.executor().execute(&spec).await?;
        normalize_as(outcome)
    }
}

/// Locate a bridge token in a URL.
///
/// Probe order: the standard query string, then a query-like suffix after
/// `?` inside the hash fragment, then a `token=` pair anywhere in the
/// fragment. First non-empty match wins, percent-decoded.
pub fn extract_bridge_token(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;

    // (a) standard query string
    if let Some(token) = url
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
    {
        return Some(token);
    }

    let fragment = url.fragment()?;

    // (b) query-like suffix inside the fragment: "#/?token=abc"
    if let Some(hash_query) = fragment.split_once('?').map(|(_, q)| q) {
        if let Some(token) = url::form_urlencoded::parse(hash_query.as_bytes())
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
        {
            return Some(token);
        }
    }

    // (c) "token=" pair anywhere in the fragment
    let (_, _, value) = find_token_pair(fragment)?;
    if value.is_empty() {
        return None;
    }
    match urlencoding::decode(value) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(value.to_string()),
    }
}

/// Remove every `token` parameter from the URL's query and fragment.
pub fn scrub_token(raw_url: &str) -> String {
    let Ok(mut url) = Url::parse(raw_url) else {
        return raw_url.to_string();
    };

    if url.query().is_some_and(|q| q.contains("token=")) {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "token")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
        }
    }

    if let Some(fragment) = url.fragment().map(str::to_string) {
        if fragment.contains("token=") {
            let stripped = strip_token_pairs(&fragment);
            url.set_fragment(if stripped.is_empty() {
                None
            } else {
                Some(&stripped)
            });
        }
    }

    url.to_string()
}

/// Find a `token=` pair whose key starts a parameter (not a suffix of a
/// longer key like `csrftoken`). Returns (key start, pair end, value).
fn find_token_pair(s: &str) -> Option<(usize, usize, &str)> {
    let mut from = 0;
    while let Some(pos) = s[from..].find("token=") {
        let start = from + pos;
        let at_param_start =
            start == 0 || matches!(s.as_bytes()[start - 1], b'?' | b'&' | b'#' | b'/');
        if at_param_start {
            let value_start = start + "token=".len();
            let end = s[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(s.len());
            return Some((start, end, &s[value_start..end]));
        }
        from = start + "token=".len();
    }
    None
}

/// Remove every `token=value` pair from a fragment string, keeping the
/// surrounding parameters intact.
fn strip_token_pairs(s: &str) -> String {
    let mut out = s.to_string();
    while let Some((start, end, _)) = find_token_pair(&out) {
        let lead_delimiter =
            start > 0 && matches!(out.as_bytes()[start - 1], b'?' | b'&');
        let next = if end < out.len() {
            // Another parameter follows; splice it onto the prefix.
            format!("{}{}", &out[..start], &out[end + 1..])
        } else if lead_delimiter {
            out[..start - 1].to_string()
        } else {
            out[..start].to_string()
        };
        out = next;
    }
    out
}
