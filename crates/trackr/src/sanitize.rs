//! Markup neutralization for caller-supplied strings.
//!
//! Every string that ends up in a stored issue, and the project name used as
//! a collection name, passes through [`in_html_data`] first. The transform is
//! for the HTML data context: replacing `<` is enough to stop a value from
//! opening a tag or script block when rendered between elements.

use std::borrow::Cow;

/// Neutralize markup in a value destined for an HTML data context.
///
/// Every `<` becomes `&lt;`. Input without `<` is returned borrowed.
pub fn in_html_data(input: &str) -> Cow<'_, str> {
    if input.contains('<') {
        Cow::Owned(input.replace('<', "&lt;"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Sanitize a single field value.
///
/// Returns `None` when the sanitized value is the literal `"undefined"`,
/// which clients emit for unset form fields; such a field counts as absent.
pub fn sanitize_field(input: &str) -> Option<String> {
    let sanitized = in_html_data(input);
    if sanitized == "undefined" {
        None
    } else {
        Some(sanitized.into_owned())
    }
}

/// Sanitize a project name for use as a collection name.
pub fn project_name(project: &str) -> String {
    in_html_data(project).into_owned()
}
