//! Success view rendered once a token has been stored.

use axum::response::Html;
use domain::TokenRecord;
use html_escape::encode_text;

/// Embedded at compile time so rendering never touches the filesystem
const OAUTH_CALLBACK_TEMPLATE: &str = include_str!("../../templates/oauth_callback.html");

const PLACE_ID_PLACEHOLDER: &str = "{{PLACE_ID}}";
const USER_ID_PLACEHOLDER: &str = "{{USER_ID}}";

/// Render the success page for a stored record. Never includes the token.
pub(crate) fn render(record: &TokenRecord) -> Html<String> {
    Html(fill(
        OAUTH_CALLBACK_TEMPLATE,
        &[
            (PLACE_ID_PLACEHOLDER, &*encode_text(&record.place_id)),
            (USER_ID_PLACEHOLDER, &*encode_text(&record.user_id)),
        ],
    ))
}

/// Substitute placeholders in one pass over the template, so substituted
/// values are never scanned for further placeholders.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                rendered.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                rendered.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}
