/// Utilitários de string para logs e mensagens de erro

/// Trunca uma string sem cortar um caractere UTF-8 no meio
///
/// # Exemplo
/// ```
/// use oauth_flow_middleware::utils::truncate_safe;
///
/// assert_eq!(truncate_safe("Olá, mundo!", 3), "Ol");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Trunca e adiciona "..." quando houve corte
pub fn truncate_with_ellipsis(s: &str, max_bytes: usize) -> String {
    let truncated = truncate_safe(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{}...", truncated)
    } else {
        truncated.to_string()
    }
}

/// Mascara um valor sensível para log, mantendo apenas os primeiros caracteres
///
/// Valores curtos são mascarados por completo.
pub fn mask_value(value: &str, visible: usize) -> String {
    if value.chars().count() <= visible * 2 {
        return "***".to_string();
    }

    format!("{}***", truncate_safe(value, visible))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_safe_utf8() {
        let text = "Olá, mundo!";
        assert_eq!(truncate_safe(text, 3), "Ol");
        assert_eq!(truncate_safe(text, 4), "Olá");
        assert_eq!(truncate_safe(text, 100), text);
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("authorization-code", 4), "auth...");
        assert_eq!(truncate_with_ellipsis("abc", 4), "abc");
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("abc", 4), "***");
        assert_eq!(mask_value("gho_1234567890abcdef", 4), "gho_***");
    }
}
