/// Redact the password portion of a database URL for safe display.
///
/// URLs that do not parse or carry no password (e.g. `sqlite::memory:`) are
/// returned unchanged.
pub(crate) fn redact_url_password(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
