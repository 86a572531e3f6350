//! Name sanitization for the generated package manifest.

/// Fallback when the user-supplied display name is empty.
const DEFAULT_NAME: &str = "WebApp";

/// Display name of the produced application.
#[must_use]
pub fn product_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lowercased manifest package name; anything outside `[a-z0-9-]`
/// becomes a hyphen.
#[must_use]
pub fn sanitize_package_name(name: &str) -> String {
    let sanitized: String = product_name(name)
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.chars().all(|c| c == '-') {
        "webapp".to_string()
    } else {
        sanitized
    }
}

/// Reverse-domain application identifier; non-alphanumerics are stripped
/// entirely (identifier segments allow no hyphens).
#[must_use]
pub fn app_identifier(name: &str) -> String {
    let stripped: String = product_name(name)
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let segment = if stripped.is_empty() {
        "webapp".to_string()
    } else {
        stripped
    };
    format!("com.generated.{segment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_name_falls_back_when_blank() {
        assert_eq!(product_name("  "), "WebApp");
        assert_eq!(product_name("Demo"), "Demo");
    }

    #[test]
    fn package_name_lowercases_and_hyphenates() {
        assert_eq!(sanitize_package_name("My Cool App!"), "my-cool-app-");
        assert_eq!(sanitize_package_name("Demo"), "demo");
        assert_eq!(sanitize_package_name("App-2"), "app-2");
    }

    #[test]
    fn package_name_never_degenerates_to_hyphens_only() {
        assert_eq!(sanitize_package_name("!!!"), "webapp");
        assert_eq!(sanitize_package_name(""), "webapp");
    }

    #[test]
    fn app_identifier_strips_non_alphanumerics() {
        assert_eq!(app_identifier("My Cool App!"), "com.generated.mycoolapp");
        assert_eq!(app_identifier("###"), "com.generated.webapp");
    }
}
