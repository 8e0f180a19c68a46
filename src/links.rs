//! Deep-link and URI builders.
//!
//! All user text is percent-encoded with [`urlencoding::encode`], which keeps
//! only RFC 3986 unreserved characters, so decoding a query value always
//! yields the original text.

use urlencoding::encode;

pub const INSTAGRAM_STORIES_URL: &str = "instagram-stories://share";

/// Strips everything but ASCII digits from a phone number.
pub fn digits_only(phone_number: &str) -> String {
    phone_number.chars().filter(char::is_ascii_digit).collect()
}

/// `https://api.whatsapp.com/send?phone=<digits>[&text=<text>]`
pub fn whatsapp_chat_url(phone_number: &str, text: Option<&str>) -> String {
    let mut url = format!(
        "https://api.whatsapp.com/send?phone={}",
        digits_only(phone_number)
    );
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        url.push_str("&text=");
        url.push_str(&encode(text));
    }
    url
}

pub fn twitter_app_url(text: &str) -> String {
    format!("twitter://post?message={}", encode(text))
}

pub fn twitter_web_url(text: &str) -> String {
    format!("https://twitter.com/intent/tweet?text={}", encode(text))
}

/// A `mailto:` URI for hosts without a modal mail composer. Addresses are
/// encoded too, keeping `@`, so `#` or `?` cannot cut the recipient short.
pub fn mailto_url(recipients: &[String], subject: Option<&str>, body: Option<&str>) -> String {
    let to = recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| encode(r).replace("%40", "@"))
        .collect::<Vec<_>>()
        .join(",");
    let query = [("subject", subject), ("body", body)]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", encode(v)))
        })
        .collect::<Vec<_>>();
    if query.is_empty() {
        format!("mailto:{to}")
    } else {
        format!("mailto:{to}?{}", query.join("&"))
    }
}

/// An `sms:` URI for hosts without a modal message composer.
pub fn sms_url(phone_number: Option<&str>, body: Option<&str>) -> String {
    let mut url = String::from("sms:");
    if let Some(number) = phone_number {
        url.push_str(&encode(number.trim()));
    }
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        url.push_str("?body=");
        url.push_str(&encode(body));
    }
    url
}
