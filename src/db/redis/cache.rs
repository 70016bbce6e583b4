use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ProviderId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Results of one provider for a (query, location) pair
    RestaurantSearch {
        provider: ProviderId,
        query: String,
        location: String,
    },
    /// Image URLs found for a restaurant in a city
    RestaurantImages { name: String, city: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::RestaurantSearch {
                provider,
                query,
                location,
            } => write!(
                f,
                "search:{}:{}:{}",
                provider,
                normalize_key_part(query),
                normalize_key_part(location)
            ),
            CacheKey::RestaurantImages { name, city } => write!(
                f,
                "images:{}:{}",
                normalize_key_part(name),
                normalize_key_part(city)
            ),
        }
    }
}

/// Lower-cases and collapses whitespace so equivalent inputs share a key
fn normalize_key_part(part: &str) -> String {
    part.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper bound on a single Redis round trip, connection included
const CACHE_OP_TIMEOUT: Duration = Duration::from_secs(1);

/// Creates a Redis client for caching
///
/// Opening the client does not connect; connections are made lazily per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Signals the writer task and waits until every write queued so far has
    /// been attempted.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed during shutdown");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// This spawns a background task that processes cache writes asynchronously,
    /// preventing cache operations from blocking API responses.
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        let handle = CacheWriterHandle { shutdown_tx, task };

        (cache, handle)
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown, drains whatever is already queued and exits without
    /// waiting for senders that are still alive.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                msg = write_rx.recv() => {
                    let Some(msg) = msg else {
                        tracing::info!("All cache handles dropped, writer stopping");
                        break;
                    };
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = &mut shutdown_rx => {
                    let mut flushed = 0usize;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        with_op_timeout("write", async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
            Ok::<_, AppError>(())
        })
        .await
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent. Connection, timeout and
    /// deserialization failures are returned as errors; the `cached!` macro
    /// treats them as misses.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached: Option<String> = with_op_timeout("read", async {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let cached: Option<String> = conn.get(key.to_string()).await?;
            Ok::<_, AppError>(cached)
        })
        .await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized here and handed to the writer task; the actual
    /// Redis write happens later and its failure is only logged.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

/// Fails a Redis operation that takes longer than `CACHE_OP_TIMEOUT`
async fn with_op_timeout<T>(
    operation: &str,
    fut: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(CACHE_OP_TIMEOUT, fut)
        .await
        .map_err(|_| {
            AppError::Internal(format!(
                "Cache {} timed out after {}ms",
                operation,
                CACHE_OP_TIMEOUT.as_millis()
            ))
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on this port, so every Redis operation fails fast.
    const UNREACHABLE_REDIS: &str = "redis://127.0.0.1:1";

    /// Redis URL of a listener that accepts connections and never replies
    async fn silent_redis_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("redis://{}", addr)
    }

    #[test]
    fn test_cache_key_display_restaurant_search() {
        let key = CacheKey::RestaurantSearch {
            provider: ProviderId::Gemini,
            query: "Sushi  Bars".to_string(),
            location: "DUBAI".to_string(),
        };
        assert_eq!(format!("{}", key), "search:gemini:sushi bars:dubai");
    }

    #[test]
    fn test_cache_key_search_separates_providers() {
        let openai = CacheKey::RestaurantSearch {
            provider: ProviderId::OpenAi,
            query: "nobu".to_string(),
            location: "dubai".to_string(),
        };
        let gemini = CacheKey::RestaurantSearch {
            provider: ProviderId::Gemini,
            query: "nobu".to_string(),
            location: "dubai".to_string(),
        };
        assert_ne!(openai.to_string(), gemini.to_string());
    }

    #[test]
    fn test_cache_key_display_restaurant_images() {
        let key = CacheKey::RestaurantImages {
            name: "Bla Bla".to_string(),
            city: " Dubai ".to_string(),
        };
        assert_eq!(format!("{}", key), "images:bla bla:dubai");
    }

    #[tokio::test]
    async fn test_get_from_unreachable_redis_is_error() {
        let client = create_redis_client(UNREACHABLE_REDIS).unwrap();
        let (cache, _handle) = Cache::new(client).await;

        let key = CacheKey::RestaurantImages {
            name: "Zuma".to_string(),
            city: "Dubai".to_string(),
        };
        let result: AppResult<Option<Vec<String>>> = cache.get_from_cache(&key).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_completes_with_pending_writes() {
        let client = create_redis_client(UNREACHABLE_REDIS).unwrap();
        let (cache, handle) = Cache::new(client).await;

        let key = CacheKey::RestaurantImages {
            name: "Zuma".to_string(),
            city: "Dubai".to_string(),
        };
        cache.set_in_background(&key, &vec!["https://zuma.com/a.jpg"], 60);

        // The cache clone is still alive; shutdown must not wait on it.
        tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
            .await
            .expect("cache writer should stop after draining");
    }

    #[tokio::test]
    async fn test_get_from_silent_redis_times_out() {
        let client = create_redis_client(&silent_redis_url().await).unwrap();
        let (cache, _handle) = Cache::new(client).await;

        let key = CacheKey::RestaurantSearch {
            provider: ProviderId::Gemini,
            query: "sushi".to_string(),
            location: "Dubai".to_string(),
        };
        let result: AppResult<Option<Vec<String>>> = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            cache.get_from_cache(&key),
        )
        .await
        .expect("cache read should give up on a silent server");

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_shutdown_with_silent_redis_completes() {
        let client = create_redis_client(&silent_redis_url().await).unwrap();
        let (cache, handle) = Cache::new(client).await;

        let key = CacheKey::RestaurantImages {
            name: "Nobu".to_string(),
            city: "Dubai".to_string(),
        };
        cache.set_in_background(&key, &vec!["https://nobu.com/a.jpg"], 60);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
            .await
            .expect("cache writer should not hang on a silent server");
    }
}
