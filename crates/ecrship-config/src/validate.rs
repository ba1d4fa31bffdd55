//! publish 設定の値チェック

use crate::error::{ConfigError, Result};

/// AWSリージョン名: `ap-southeast-1`, `us-gov-west-1`, ...
pub fn validate_region(region: &str) -> Result<()> {
    let parts: Vec<&str> = region.split('-').collect();
    let valid = parts.len() >= 3
        && parts[0].len() == 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        && parts
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRegion(region.to_string()))
    }
}

/// ECRリポジトリ名
///
/// スラッシュ区切りの各要素は小文字英数字で、要素内は単一の `.` `_` `-`
/// で連結する。2〜256文字。
pub fn validate_app_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidAppName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.len() < 2 || name.len() > 256 {
        return Err(invalid("must be 2 to 256 characters"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid("empty path component"));
        }

        let mut prev_separator = true;
        for c in component.chars() {
            match c {
                'a'..='z' | '0'..='9' => prev_separator = false,
                '.' | '_' | '-' => {
                    if prev_separator {
                        return Err(invalid("separators must sit between alphanumerics"));
                    }
                    prev_separator = true;
                }
                _ => {
                    return Err(invalid(&format!("invalid character '{}'", c)));
                }
            }
        }
        if prev_separator {
            return Err(invalid("separators must sit between alphanumerics"));
        }
    }

    Ok(())
}

/// Docker タグの制約
///
/// - 128文字以下
/// - 英数字, `.`, `-`, `_`
/// - `.` や `-` で始まらない
pub fn validate_tag(tag: &str) -> Result<()> {
    let invalid = |reason: String| ConfigError::InvalidTag {
        tag: tag.to_string(),
        reason,
    };

    if tag.is_empty() {
        return Err(invalid("empty".to_string()));
    }

    if tag.len() > 128 {
        return Err(invalid(format!(
            "too long ({} characters, max 128)",
            tag.len()
        )));
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(invalid("must not start with '.' or '-'".to_string()));
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(invalid(format!("invalid character '{}'", c)));
    }

    Ok(())
}

pub fn validate_account_id(account_id: &str) -> Result<()> {
    if account_id.len() == 12 && account_id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAccountId(account_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions() {
        assert!(validate_region("ap-southeast-1").is_ok());
        assert!(validate_region("us-gov-west-1").is_ok());
        assert!(validate_region("eu-central-2").is_ok());

        assert!(validate_region("").is_err());
        assert!(validate_region("ap-southeast").is_err());
        assert!(validate_region("AP-SOUTHEAST-1").is_err());
        assert!(validate_region("ap--1").is_err());
        assert!(validate_region("ap southeast 1").is_err());
    }

    #[test]
    fn test_app_names() {
        assert!(validate_app_name("next-bedrock-app").is_ok());
        assert!(validate_app_name("team/web.frontend_v2").is_ok());

        assert!(validate_app_name("a").is_err());
        assert!(validate_app_name("Next-App").is_err());
        assert!(validate_app_name("-app").is_err());
        assert!(validate_app_name("app-").is_err());
        assert!(validate_app_name("app--web").is_err());
        assert!(validate_app_name("team//app").is_err());
        assert!(validate_app_name("app:latest").is_err());
    }

    #[test]
    fn test_tags() {
        assert!(validate_tag("latest").is_ok());
        assert!(validate_tag("v1.2.3_rc-1").is_ok());

        assert!(validate_tag("").is_err());
        assert!(validate_tag(".hidden").is_err());
        assert!(validate_tag("-dash").is_err());
        assert!(validate_tag("with space").is_err());
        assert!(validate_tag(&"a".repeat(129)).is_err());
        assert!(validate_tag(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_account_ids() {
        assert!(validate_account_id("123456789012").is_ok());
        assert!(validate_account_id("12345").is_err());
        assert!(validate_account_id("12345678901a").is_err());
        assert!(validate_account_id("").is_err());
    }
}
