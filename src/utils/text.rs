/// 截断外部服务返回的响应体，用于错误信息和日志
pub fn excerpt(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates() {
        let body = "x".repeat(400);
        assert_eq!(excerpt(&body).len(), 303);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_excerpt_counts_chars() {
        let body = "课".repeat(301);
        assert_eq!(excerpt(&body).chars().count(), 303);
    }
}
