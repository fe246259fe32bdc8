//! Login handshake against the directory site
//!
//! The site guards its login form with a hidden `_csrf` token. A successful
//! login redirects to the site root; a rejected one redirects back to
//! `/login`.

use crate::crawler::fetcher::Fetcher;
use crate::{AuthError, HarvestError};
use scraper::{Html, Selector};
use std::fmt;

const LOGIN_PATH: &str = "/login";
const CSRF_SELECTOR: &str = r#"input[type="hidden"][name="_csrf"]"#;

/// Account credentials for the directory site
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Logs in, leaving the session cookies in the fetcher's cookie store
///
/// # Errors
///
/// Any [`AuthError`] is fatal for the run. Transport errors are returned
/// unchanged.
pub async fn login(fetcher: &Fetcher, credentials: &Credentials) -> Result<(), HarvestError> {
    let login_url = fetcher.resolve(LOGIN_PATH)?;

    let login_page = fetcher.get(&login_url).await?;
    let csrf = extract_csrf_token(&login_page.body).ok_or(AuthError::MissingCsrfToken)?;
    tracing::debug!("Obtained login form token");

    let form = [
        ("_csrf", csrf.as_str()),
        ("Login[username]", credentials.username.as_str()),
        ("Login[password]", credentials.password.as_str()),
    ];
    let landing = fetcher.post_form(&login_url, &form).await?;

    if landing.final_url.path().trim_end_matches('/').ends_with(LOGIN_PATH) {
        return Err(AuthError::InvalidCredentials.into());
    }

    if landing.status_code != 200 {
        return Err(AuthError::UnexpectedStatus(landing.status_code).into());
    }

    let root = fetcher.base_url();
    if landing.final_url.origin() != root.origin() || landing.final_url.path() != "/" {
        return Err(AuthError::UnexpectedLanding(landing.final_url.to_string()).into());
    }

    tracing::info!("Logged in as {}", credentials.username);
    Ok(())
}

/// Returns the value of the login form's hidden `_csrf` input
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CSRF_SELECTOR).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("value"))
        .map(str::to_string)
}
