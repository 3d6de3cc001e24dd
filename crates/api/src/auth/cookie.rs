pub fn build_auth_cookie(
    name: &str,
    token: &str,
    max_age_secs: u64,
    cookie_domain: &Option<String>,
    secure: bool,
) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    let same_site = if secure { "Strict" } else { "Lax" };

    let mut cookie = format!(
        "{}={}; HttpOnly{}; SameSite={}; Path=/; Max-Age={}",
        name, token, secure_flag, same_site, max_age_secs
    );

    if let Some(domain) = cookie_domain {
        cookie.push_str(&format!("; Domain={}", domain));
    }

    cookie
}

pub fn build_clear_cookie(name: &str, cookie_domain: &Option<String>, secure: bool) -> String {
    build_auth_cookie(name, "", 0, cookie_domain, secure)
}

pub fn extract_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        let value = value.trim();
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}
