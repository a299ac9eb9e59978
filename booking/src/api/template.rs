//! URL template resolution.
//!
//! Templates contain `{name}` placeholders, filled first from call
//! parameters and then from the widget configuration. Values are
//! percent-encoded.

use crate::config::WidgetConfig;
use crate::error::ApiError;

/// Fill every `{name}` placeholder in `template`.
///
/// # Errors
///
/// Returns [`ApiError::Template`] for an unknown placeholder or an unclosed
/// brace.
pub fn resolve(
    template: &str,
    params: &[(&str, &str)],
    config: &WidgetConfig,
) -> Result<String, ApiError> {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        resolved.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| ApiError::Template(format!("unclosed placeholder in `{template}`")))?;
        let name = &after[..close];

        let value = lookup(name, params, config).ok_or_else(|| {
            ApiError::Template(format!("no value for `{{{name}}}` in `{template}`"))
        })?;
        resolved.push_str(&urlencoding::encode(&value));

        rest = &after[close + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}

fn lookup(name: &str, params: &[(&str, &str)], config: &WidgetConfig) -> Option<String> {
    if let Some((_, value)) = params.iter().find(|(key, _)| *key == name) {
        return Some((*value).to_string());
    }

    match name {
        "locationId" | "location_id" => config.location_id.clone(),
        "businessType" | "business_type" => Some(config.business_type.clone()),
        _ => None,
    }
}

/// Join an endpoint path to a base URL; absolute URLs are returned as-is
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
