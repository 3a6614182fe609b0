use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{bb8::Pool, RedisConnectionManager};

/// Keyed string cache for computed statistics. Strictly best-effort: callers
/// must treat every error as a miss and carry on against the store.
#[async_trait]
pub trait StatisticsCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;
}

pub struct RedisCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder()
            .max_size(15)
            .connection_timeout(Duration::from_secs(2))
            .build(manager)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StatisticsCache for RedisCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut *conn)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.pool.get().await?;
        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl.as_secs())
            .arg(value)
            .query_async::<_, ()>(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Selected at wiring time when no cache is configured; every read misses.
pub struct NoopCache;

#[async_trait]
impl StatisticsCache for NoopCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}
