/// Substring identifying the anti-forgery cookie set by the login page.
/// Matching is by containment so that prefixed variants
/// (e.g. `__Host-next-auth.csrf-token`) are picked up as well.
pub const CSRF_COOKIE_NAME: &str = "next-auth.csrf-token";

/// Percent-encoded `|` separating the token from its hash in the cookie value.
const TOKEN_SEPARATOR: &str = "%7C";

/// Extract the CSRF token from a list of raw `name=value` cookie strings, as
/// they appear on `Set-Cookie` lines.
///
/// Parsing contract: take the first string containing
/// [`CSRF_COOKIE_NAME`], split it at the first `=`, and truncate the
/// remainder at the first `%7C`. A missing cookie or a matching string
/// without an `=` yields `None`.
pub fn extract_csrf_token<'a, I>(cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let cookie = cookies.into_iter().find(|c| c.contains(CSRF_COOKIE_NAME))?;
    let (_, value) = cookie.split_once('=')?;
    let token = match value.find(TOKEN_SEPARATOR) {
        Some(end) => &value[..end],
        None => value,
    };
    Some(token.to_string())
}
