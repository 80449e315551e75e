use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrl {
    pub id: i64,
    pub slug: String,
    pub long_url: String,
    pub title: Option<String>,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub disabled: bool,
    pub creator_id: Option<String>,
}

impl ShortUrl {
    /// Whether the URL is past its expiry at `now` (Unix seconds).
    ///
    /// A deadline exactly equal to `now` has not expired yet; only strictly
    /// later instants count.
    pub fn expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub long_url: Option<String>,
    pub title: Option<String>,
    pub custom_slug: Option<String>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlRequest {
    pub disabled: Option<bool>,
    pub expires_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_expiring_at(expires_at: Option<i64>) -> ShortUrl {
        ShortUrl {
            id: 1,
            slug: "abc123".to_string(),
            long_url: "https://example.com".to_string(),
            title: None,
            created_at: 1_700_000_000,
            expires_at,
            disabled: false,
            creator_id: None,
        }
    }

    #[test]
    fn expiry_comparison_is_strictly_greater_than() {
        let url = url_expiring_at(Some(1_700_000_100));

        assert!(!url.expired_at(1_700_000_099));
        assert!(
            !url.expired_at(1_700_000_100),
            "deadline == now is not expired"
        );
        assert!(url.expired_at(1_700_000_101));
    }

    #[test]
    fn url_without_expiry_never_expires() {
        let url = url_expiring_at(None);
        assert!(!url.expired_at(i64::MAX));
    }
}
