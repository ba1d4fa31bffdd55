//! ECRレジストリのアドレス

use std::fmt;

/// アカウントとリージョンごとのプライベートECRレジストリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcrRegistry {
    account_id: String,
    region: String,
}

impl EcrRegistry {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// `{account}.dkr.ecr.{region}.amazonaws.com`
    pub fn host(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account_id, self.region)
    }

    /// `{host}/{repository}:{tag}`
    pub fn image_uri(&self, repository: &str, tag: &str) -> String {
        format!("{}/{}:{}", self.host(), repository, tag)
    }
}

impl fmt::Display for EcrRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host() {
        let registry = EcrRegistry::new("123456789012", "ap-southeast-1");
        assert_eq!(
            registry.host(),
            "123456789012.dkr.ecr.ap-southeast-1.amazonaws.com"
        );
        assert_eq!(registry.to_string(), registry.host());
    }

    #[test]
    fn test_image_uri_for_any_account() {
        for account in ["123456789012", "000000000001", "987654321098"] {
            let registry = EcrRegistry::new(account, "ap-southeast-1");
            assert_eq!(
                registry.image_uri("next-bedrock-app", "latest"),
                format!(
                    "{}.dkr.ecr.ap-southeast-1.amazonaws.com/next-bedrock-app:latest",
                    account
                )
            );
        }
    }

    #[test]
    fn test_image_uri_is_stable() {
        let first = EcrRegistry::new("123456789012", "ap-southeast-1");
        let second = EcrRegistry::new("123456789012", "ap-southeast-1");
        assert_eq!(
            first.image_uri("next-bedrock-app", "latest"),
            second.image_uri("next-bedrock-app", "latest")
        );
    }
}
