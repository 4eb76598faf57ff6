//! 定期清理过期 Refresh Token
//!
//! 读取时的惰性删除只覆盖被再次访问的记录，其余的由这里批量清掉。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::TokenService;

pub struct ExpiredTokenCleanup {
    tokens: Arc<TokenService>,
    interval: Duration,
}

impl ExpiredTokenCleanup {
    pub fn new(tokens: Arc<TokenService>, interval: Duration) -> Self {
        Self { tokens, interval }
    }

    /// 启动后台任务，收到 `shutdown` 后退出
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if self.interval.is_zero() {
                info!("Expired token cleanup disabled");
                return;
            }

            info!(interval_secs = self.interval.as_secs(), "Expired token cleanup started");
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_once().await,
                    _ = shutdown.cancelled() => {
                        info!("Expired token cleanup received shutdown signal");
                        break;
                    }
                }
            }
            info!("Expired token cleanup stopped");
        })
    }

    async fn run_once(&self) {
        match self.tokens.purge_expired_refresh_tokens().await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Purged expired refresh tokens"),
            Err(e) => error!(error = %e, "Failed to purge expired refresh tokens"),
        }
    }
}
