use crate::domain::model::Quote;
use crate::utils::error::{QuoteError, Result};

/// 同文字、不同分類時的衝突解決策略 (local, remote) -> resolved
pub trait ConflictPolicy: Send + Sync {
    fn resolve(&self, local: &Quote, remote: &Quote) -> Quote;

    fn name(&self) -> &'static str;
}

/// 伺服器資料覆蓋本地資料，不詢問
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWins;

impl ConflictPolicy for RemoteWins {
    fn resolve(&self, _local: &Quote, remote: &Quote) -> Quote {
        remote.clone()
    }

    fn name(&self) -> &'static str {
        "remote-wins"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeepLocal;

impl ConflictPolicy for KeepLocal {
    fn resolve(&self, local: &Quote, _remote: &Quote) -> Quote {
        local.clone()
    }

    fn name(&self) -> &'static str {
        "keep-local"
    }
}

/// 每個衝突都問一次，回傳 true 表示採用伺服器版本
pub struct ConfirmWith<F>
where
    F: Fn(&Quote, &Quote) -> bool + Send + Sync,
{
    confirm: F,
}

impl<F> ConfirmWith<F>
where
    F: Fn(&Quote, &Quote) -> bool + Send + Sync,
{
    pub fn new(confirm: F) -> Self {
        Self { confirm }
    }
}

impl<F> ConflictPolicy for ConfirmWith<F>
where
    F: Fn(&Quote, &Quote) -> bool + Send + Sync,
{
    fn resolve(&self, local: &Quote, remote: &Quote) -> Quote {
        if (self.confirm)(local, remote) {
            remote.clone()
        } else {
            local.clone()
        }
    }

    fn name(&self) -> &'static str {
        "confirm"
    }
}

pub const POLICY_NAMES: [&str; 2] = ["remote-wins", "keep-local"];

/// 由設定檔名稱建立策略 (`confirm` 需要互動，不在此列)
pub fn policy_from_name(name: &str) -> Result<Box<dyn ConflictPolicy>> {
    match name {
        "remote-wins" => Ok(Box::new(RemoteWins)),
        "keep-local" => Ok(Box::new(KeepLocal)),
        other => Err(QuoteError::InvalidConfigValueError {
            field: "sync.conflict_policy".to_string(),
            value: other.to_string(),
            reason: format!("Allowed values: {}", POLICY_NAMES.join(", ")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Quote, Quote) {
        (Quote::trusted("A", "c1"), Quote::trusted("A", "c2"))
    }

    #[test]
    fn test_remote_wins() {
        let (local, remote) = pair();
        assert_eq!(RemoteWins.resolve(&local, &remote), remote);
    }

    #[test]
    fn test_keep_local() {
        let (local, remote) = pair();
        assert_eq!(KeepLocal.resolve(&local, &remote), local);
    }

    #[test]
    fn test_confirm_with_callback() {
        let (local, remote) = pair();
        let accept = ConfirmWith::new(|_, _| true);
        let reject = ConfirmWith::new(|_, _| false);
        assert_eq!(accept.resolve(&local, &remote), remote);
        assert_eq!(reject.resolve(&local, &remote), local);
    }

    #[test]
    fn test_policy_from_name() {
        assert_eq!(policy_from_name("remote-wins").unwrap().name(), "remote-wins");
        assert_eq!(policy_from_name("keep-local").unwrap().name(), "keep-local");
        assert!(policy_from_name("newest").is_err());
    }
}
