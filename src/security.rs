//! Request authentication and route authorization.
//!
//! Identity comes from the session cookie (signed token issued at login),
//! an `Authorization: Bearer` header, or HTTP Basic credentials verified
//! against the account store. Authorization is a single ordered rule
//! table evaluated top-down; the first rule whose method set and path
//! pattern match decides, and a final catch-all requires authentication.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;

use crate::{
    error::ErrorResponse,
    models::user::SessionClaims,
    AppState,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "bookhive_session";

/// Access requirement a route rule imposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Method set a rule applies to. `Any` matches every method.
#[derive(Debug, Clone, Copy)]
pub enum Methods {
    Any,
    Only(&'static [&'static str]),
}

impl Methods {
    fn matches(&self, method: &Method) -> bool {
        match self {
            Methods::Any => true,
            Methods::Only(list) => list.contains(&method.as_str()),
        }
    }
}

pub struct Rule {
    pub methods: Methods,
    pub pattern: &'static str,
    pub access: Access,
}

const fn rule(methods: Methods, pattern: &'static str, access: Access) -> Rule {
    Rule {
        methods,
        pattern,
        access,
    }
}

const GET: Methods = Methods::Only(&["GET"]);
const POST: Methods = Methods::Only(&["POST"]);
const WRITES: Methods = Methods::Only(&["POST", "PUT", "PATCH", "DELETE"]);

/// The authorization table. Declaration order is priority: the first
/// matching rule wins, so specific overrides sit above broad ones.
pub static RULES: &[Rule] = &[
    // Static and public pages
    rule(Methods::Any, "/static/**", Access::Public),
    rule(Methods::Any, "/uploads/**", Access::Public),
    rule(Methods::Any, "/favicon.ico", Access::Public),
    rule(Methods::Any, "/", Access::Public),
    rule(Methods::Any, "/register", Access::Public),
    rule(Methods::Any, "/login", Access::Public),
    rule(Methods::Any, "/logout", Access::Public),
    rule(GET, "/books/**", Access::Public),
    // Health and docs
    rule(GET, "/api/v1/health", Access::Public),
    rule(GET, "/api/v1/ready", Access::Public),
    rule(Methods::Any, "/swagger-ui/**", Access::Admin),
    rule(Methods::Any, "/api-docs/**", Access::Admin),
    // Open API endpoints
    rule(POST, "/api/v1/auth/login", Access::Public),
    rule(POST, "/api/v1/auth/register", Access::Public),
    rule(POST, "/api/v1/users/register", Access::Public),
    // Adding a review only needs a session; must sit above the admin
    // write rule on /api/v1/books/**.
    rule(POST, "/api/v1/books/*/reviews", Access::Authenticated),
    rule(GET, "/api/v1/books/**", Access::Public),
    rule(GET, "/api/v1/authors/**", Access::Public),
    rule(WRITES, "/api/v1/books/**", Access::Admin),
    rule(WRITES, "/api/v1/authors/**", Access::Admin),
    // Admin surfaces
    rule(Methods::Any, "/api/v1/admin/**", Access::Admin),
    rule(Methods::Any, "/admin/**", Access::Admin),
    rule(Methods::Only(&["DELETE"]), "/api/v1/users/*", Access::Admin),
    rule(
        Methods::Only(&["PATCH"]),
        "/api/v1/users/*/toggle-block",
        Access::Admin,
    ),
    // Everything else needs a session
    rule(Methods::Any, "/**", Access::Authenticated),
];

/// Segment-wise pattern match. `*` matches exactly one segment, a
/// trailing `**` matches any suffix including the empty one.
pub fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern_segs: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut pi = 0;
    for (i, seg) in pattern_segs.iter().enumerate() {
        if *seg == "**" {
            // Must be the last pattern segment
            return i == pattern_segs.len() - 1;
        }
        match path_segs.get(pi) {
            Some(actual) if *seg == "*" || seg == actual => pi += 1,
            _ => return false,
        }
    }
    pi == path_segs.len()
}

/// Resolve the access requirement for a request
pub fn required_access(method: &Method, path: &str) -> Access {
    for rule in RULES {
        if rule.methods.matches(method) && path_matches(rule.pattern, path) {
            return rule.access;
        }
    }
    // The catch-all makes this unreachable, but stay safe
    Access::Authenticated
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Extract the caller's identity from the request, if any. Order: session
/// cookie, Bearer token, HTTP Basic.
pub async fn resolve_identity(headers: &HeaderMap, state: &AppState) -> Option<SessionClaims> {
    let secret = &state.config.security.session_secret;

    if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
        if let Ok(claims) = SessionClaims::from_token(&token, secret) {
            return Some(claims);
        }
    }

    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if let Ok(claims) = SessionClaims::from_token(token.trim(), secret) {
                return Some(claims);
            }
        }
        if state.config.security.basic_auth_enabled {
            if let Some((username, password)) = decode_basic(auth) {
                if let Ok((_, user)) = state.services.users.authenticate(&username, &password).await
                {
                    let now = chrono::Utc::now().timestamp();
                    return Some(SessionClaims {
                        sub: user.username,
                        user_id: user.id,
                        role: user.role,
                        iat: now,
                        exp: now + 60,
                    });
                }
            }
        }
    }

    None
}

fn is_api_request(path: &str) -> bool {
    path.starts_with("/api/")
}

fn deny(path: &str, status: StatusCode, message: &str) -> Response {
    if is_api_request(path) {
        let error = if status == StatusCode::UNAUTHORIZED {
            "Unauthorized"
        } else {
            "Forbidden"
        };
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message: message.to_string(),
            }),
        )
            .into_response()
    } else if status == StatusCode::UNAUTHORIZED {
        Redirect::to("/login").into_response()
    } else {
        (status, "Forbidden").into_response()
    }
}

/// Guard middleware applied to the whole router. On success the resolved
/// claims (if any) are stored in request extensions for extractors.
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let access = required_access(&method, &path);
    let identity = resolve_identity(request.headers(), &state).await;

    match (access, &identity) {
        (Access::Public, _) => {}
        (Access::Authenticated, Some(_)) => {}
        (Access::Admin, Some(claims)) if claims.is_admin() => {}
        (Access::Admin, Some(_)) => {
            return deny(&path, StatusCode::FORBIDDEN, "Admin role required");
        }
        (_, None) => {
            return deny(&path, StatusCode::UNAUTHORIZED, "Authentication required");
        }
    }

    if let Some(claims) = identity {
        request.extensions_mut().insert(claims);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_star_matches_exactly_one_segment() {
        assert!(path_matches("/api/v1/books/*/reviews", "/api/v1/books/7/reviews"));
        assert!(!path_matches("/api/v1/books/*/reviews", "/api/v1/books/reviews"));
        assert!(!path_matches(
            "/api/v1/books/*/reviews",
            "/api/v1/books/7/8/reviews"
        ));
    }

    #[test]
    fn double_star_matches_any_suffix_including_empty() {
        assert!(path_matches("/books/**", "/books"));
        assert!(path_matches("/books/**", "/books/42"));
        assert!(path_matches("/books/**", "/books/42/stats"));
        assert!(!path_matches("/books/**", "/authors/1"));
    }

    #[test]
    fn literal_patterns_need_exact_paths() {
        assert!(path_matches("/login", "/login"));
        assert!(!path_matches("/login", "/login/extra"));
        assert!(path_matches("/", "/"));
    }

    #[test]
    fn rule_table_resolves_the_representative_matrix() {
        let cases: &[(&str, &str, Access)] = &[
            ("GET", "/", Access::Public),
            ("GET", "/books/5", Access::Public),
            ("POST", "/login", Access::Public),
            ("POST", "/api/v1/auth/login", Access::Public),
            ("POST", "/api/v1/users/register", Access::Public),
            ("GET", "/api/v1/books", Access::Public),
            ("GET", "/api/v1/books/3/stats", Access::Public),
            ("GET", "/api/v1/books/3/reviews", Access::Public),
            ("POST", "/api/v1/books/3/reviews", Access::Authenticated),
            ("POST", "/api/v1/books", Access::Admin),
            ("PUT", "/api/v1/books/3", Access::Admin),
            ("DELETE", "/api/v1/books/3", Access::Admin),
            ("GET", "/api/v1/authors", Access::Public),
            ("POST", "/api/v1/authors", Access::Admin),
            ("DELETE", "/api/v1/authors/2", Access::Admin),
            ("GET", "/admin/books", Access::Admin),
            ("GET", "/api/v1/admin/users", Access::Admin),
            ("DELETE", "/api/v1/users/9", Access::Admin),
            ("PATCH", "/api/v1/users/9/toggle-block", Access::Admin),
            ("GET", "/profile", Access::Authenticated),
            ("PATCH", "/api/v1/users/profile", Access::Authenticated),
            ("GET", "/api/v1/shelves", Access::Authenticated),
            ("GET", "/uploads/x.png", Access::Public),
            ("GET", "/api/v1/health", Access::Public),
            ("GET", "/swagger-ui/index.html", Access::Admin),
        ];

        for (method, path, expected) in cases {
            let method: Method = method.parse().unwrap();
            assert_eq!(
                required_access(&method, path),
                *expected,
                "unexpected access for {} {}",
                method,
                path
            );
        }
    }

    #[test]
    fn basic_header_decodes_username_and_password() {
        let value = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("alice:s3cret")
        );
        assert_eq!(
            decode_basic(&value),
            Some(("alice".to_string(), "s3cret".to_string()))
        );
        assert!(decode_basic("Bearer abc").is_none());
    }
}
