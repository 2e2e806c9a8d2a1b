use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE_NAME: &str = "token";

fn same_site(production: bool) -> SameSite {
    // the web client is served from another origin in production
    if production {
        SameSite::None
    } else {
        SameSite::Strict
    }
}

pub fn session_cookie(token: String, production: bool, ttl_days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(time::Duration::days(ttl_days))
        .path("/")
        .build()
}

pub fn logout_cookie(production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(time::Duration::seconds(0))
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_cookie_is_cross_site_and_secure() {
        let cookie = session_cookie("abc".into(), true, 365);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(365)));
    }

    #[test]
    fn development_cookie_is_strict() {
        let cookie = session_cookie("abc".into(), false, 1);
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = logout_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
