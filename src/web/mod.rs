//! Server-rendered HTML surface.
//!
//! Pages are maud templates sharing the services with the REST API. An
//! optional identity (resolved by the guard middleware) drives the
//! navigation bar; business failures bounce back to the source page with
//! an `error` query parameter.

pub mod admin;
pub mod profile;
pub mod public;

use maud::{html, Markup, DOCTYPE};

use crate::models::user::SessionClaims;

/// Percent-encode a query parameter value. Unreserved characters pass
/// through, everything else is UTF-8 percent-encoded.
pub fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Redirect target carrying an error message for the target page
pub fn with_error(path: &str, message: &str) -> String {
    format!("{}?error={}", path, encode_query(message))
}

/// Redirect target carrying a success message for the target page
pub fn with_notice(path: &str, message: &str) -> String {
    format!("{}?notice={}", path, encode_query(message))
}

/// Common page shell: head, navigation, content, footer
pub fn layout(title: &str, identity: Option<&SessionClaims>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pl" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " – Bookhive" }
                link rel="stylesheet" href="/static/style.css";
            }
            body {
                nav .navbar {
                    a .brand href="/" { "Bookhive" }
                    a href="/books" { "Książki" }
                    @if let Some(claims) = identity {
                        a href="/profile" { "Profil" }
                        @if claims.is_admin() {
                            a href="/admin" { "Administracja" }
                        }
                        a href="/logout" { "Wyloguj (" (claims.sub) ")" }
                    } @else {
                        a href="/login" { "Zaloguj" }
                        a href="/register" { "Rejestracja" }
                    }
                }
                main .content {
                    (content)
                }
                footer {
                    p { "Bookhive – społeczność miłośników książek" }
                }
            }
        }
    }
}

/// Red banner shown when the page was reached with `?error=...`
pub fn error_banner(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            div .error-banner { (message) }
        }
    }
}

/// Green banner shown when the page was reached with `?notice=...`
pub fn notice_banner(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            div .info-banner { (message) }
        }
    }
}

/// Star-free rating display used on listings and detail pages
pub fn rating_badge(average: f64) -> Markup {
    html! {
        @if average > 0.0 {
            span .rating { (format!("{:.1}", average)) " / 10" }
        } @else {
            span .rating .rating-none { "brak ocen" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(encode_query("abc-123"), "abc-123");
        assert_eq!(encode_query("a b"), "a%20b");
        assert_eq!(encode_query("Chcę"), "Chc%C4%99");
        assert_eq!(
            with_error("/profile", "Shelf exists"),
            "/profile?error=Shelf%20exists"
        );
        assert_eq!(
            with_notice("/profile", "Import done"),
            "/profile?notice=Import%20done"
        );
    }

    #[test]
    fn notices_render_in_their_own_banner() {
        let markup = notice_banner(Some("Import zakończony")).into_string();
        assert!(markup.contains("info-banner"));
        assert!(!markup.contains("error-banner"));
        assert_eq!(notice_banner(None).into_string(), "");
    }
}
