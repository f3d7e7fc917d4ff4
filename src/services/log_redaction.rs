use std::sync::LazyLock;

use regex::Regex;

static SECRET_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:api_?key|key|access_token|token|client_id|client_secret)=)[^&\s\x22']+")
        .expect("valid secret param regex")
});

/// Replace credential query parameters in a URL or log line with `[REDACTED]`.
pub fn redact_secrets(text: &str) -> String {
    SECRET_PARAM_RE
        .replace_all(text, "${1}[REDACTED]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_key_parameters() {
        let url = "http://api.weatherapi.com/v1/forecast.json?key=abc123&q=10.7,106.6&days=3";
        assert_eq!(
            redact_secrets(url),
            "http://api.weatherapi.com/v1/forecast.json?key=[REDACTED]&q=10.7,106.6&days=3"
        );
    }

    #[test]
    fn test_redacts_every_credential_kind() {
        let line = "client_id=u1 access_token=t2 API_KEY=k3 other=keep";
        let out = redact_secrets(line);
        assert!(!out.contains("u1"));
        assert!(!out.contains("t2"));
        assert!(!out.contains("k3"));
        assert!(out.contains("other=keep"));
    }

    #[test]
    fn test_leaves_clean_text_alone() {
        assert_eq!(redact_secrets("no secrets here"), "no secrets here");
        assert_eq!(redact_secrets("monkey business"), "monkey business");
    }
}
