use super::*;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn settings(provider: &str) -> ProviderSettings {
    ProviderSettings {
        provider: provider.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_unknown_provider() {
    let result = settings("mystery").resolve(&env(&[]));
    assert!(matches!(result, Err(ProviderError::UnsupportedProvider(id)) if id == "mystery"));
}

#[test]
fn test_defaults_without_overrides() {
    let resolved = settings("openai").resolve(&env(&[])).unwrap();
    assert_eq!(resolved.base_url.as_deref(), Some("https://api.openai.com/v1"));
    assert_eq!(resolved.model, "gpt-4o-mini");
    assert!(resolved.api_key.is_none());
    assert!(!resolved.is_usable());
}

#[test]
fn test_env_fallback() {
    let vars = env(&[("ANTHROPIC_API_KEY", "sk-env"), ("ANTHROPIC_MODEL", "claude-env")]);
    let resolved = settings("anthropic").resolve(&vars).unwrap();
    assert_eq!(resolved.api_key.as_deref(), Some("sk-env"));
    assert_eq!(resolved.model, "claude-env");
    assert!(resolved.is_usable());
}

#[test]
fn test_second_env_var_used() {
    let vars = env(&[("GOOGLE_API_KEY", "g-env")]);
    let resolved = settings("gemini").resolve(&vars).unwrap();
    assert_eq!(resolved.api_key.as_deref(), Some("g-env"));
}

#[test]
fn test_global_override_beats_env() {
    let mut s = settings("openai");
    s.api_key = Some("sk-global".to_string());
    let resolved = s.resolve(&env(&[("OPENAI_API_KEY", "sk-env")])).unwrap();
    assert_eq!(resolved.api_key.as_deref(), Some("sk-global"));
}

#[test]
fn test_provider_section_beats_global() {
    let mut s = settings("openai");
    s.api_key = Some("sk-global".to_string());
    s.model = Some("global-model".to_string());
    s.providers.insert(
        "openai".to_string(),
        ProviderConfig {
            api_key: Some("sk-section".to_string()),
            base_url: Some("https://proxy.local/v1".to_string()),
            default_model: Some("section-model".to_string()),
        },
    );
    let resolved = s.resolve(&env(&[("OPENAI_API_KEY", "sk-env")])).unwrap();
    assert_eq!(resolved.api_key.as_deref(), Some("sk-section"));
    assert_eq!(resolved.base_url.as_deref(), Some("https://proxy.local/v1"));
    assert_eq!(resolved.model, "section-model");
}

#[test]
fn test_empty_strings_are_absent() {
    let mut s = settings("openai");
    s.api_key = Some("   ".to_string());
    let resolved = s.resolve(&env(&[("OPENAI_API_KEY", "")])).unwrap();
    assert!(resolved.api_key.is_none());
}

#[test]
fn test_request_fails_without_key() {
    let resolved = settings("openai").resolve(&env(&[])).unwrap();
    let result = resolved.request("prompt");
    assert!(matches!(result, Err(ProviderError::NoApiKey(id)) if id == "openai"));
}

#[test]
fn test_custom_requires_base_url() {
    let resolved = settings("custom").resolve(&env(&[])).unwrap();
    assert!(!resolved.is_usable());
    let result = resolved.request("prompt");
    assert!(matches!(result, Err(ProviderError::MissingBaseUrl(_))));
}

#[test]
fn test_custom_requires_key() {
    let vars = env(&[("CUSTOM_LLM_BASE_URL", "http://localhost:11434/v1")]);
    let resolved = settings("custom").resolve(&vars).unwrap();
    assert!(!resolved.is_usable());
    let result = resolved.request("prompt");
    assert!(matches!(result, Err(ProviderError::NoApiKey(id)) if id == "custom"));
}

#[test]
fn test_custom_with_env_key() {
    let vars = env(&[
        ("CUSTOM_LLM_BASE_URL", "http://localhost:11434/v1"),
        ("CUSTOM_LLM_API_KEY", "local-key"),
    ]);
    let resolved = settings("custom").resolve(&vars).unwrap();
    assert!(resolved.is_usable());
    let request = resolved.request("prompt").unwrap();
    assert_eq!(request.url, "http://localhost:11434/v1/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer local-key"));
}

#[test]
fn test_request_built_with_resolved_values() {
    let mut s = settings("zai");
    s.api_key = Some("zk".to_string());
    let request = s.resolve(&env(&[])).unwrap().request("hello").unwrap();
    assert_eq!(request.url, "https://api.z.ai/api/paas/v4/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer zk"));
    assert_eq!(request.body["model"], "glm-4.5-flash");
}

#[test]
fn test_env_key_present() {
    let vars = env(&[("OPENAI_API_KEY", "sk"), ("GEMINI_API_KEY", " ")]);
    assert!(env_key_present("openai", &vars));
    assert!(!env_key_present("gemini", &vars));
    assert!(!env_key_present("anthropic", &vars));
    assert!(!env_key_present("mystery", &vars));
}
