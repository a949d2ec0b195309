use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::delay::SimulatedDelay;
use crate::archive::{MediaItem, MediaKind, PlatformSnapshot, Post, Profile};
use crate::backup::config::BackupConfig;
use crate::constants::{DAY_MILLIS, SYNTHETIC_POST_COUNT};
use crate::error::VaultError;
use crate::platform::Platform;
use crate::traits::clock::Clock;
use crate::traits::source::PlatformSource;

/// Fabricates a plausible snapshot for any supported platform: one post per
/// day going back from now, an image on every fifth post and a video on every
/// tenth.
pub struct SyntheticSource<'a> {
    clock: &'a dyn Clock,
    delay: SimulatedDelay,
}

impl<'a> SyntheticSource<'a> {
    pub fn new(clock: &'a dyn Clock, delay: SimulatedDelay) -> Self {
        Self { clock, delay }
    }
}

#[async_trait(?Send)]
impl PlatformSource for SyntheticSource<'_> {
    async fn fetch(&self, config: &BackupConfig) -> Result<PlatformSnapshot, VaultError> {
        let platform: Platform = config
            .platform
            .parse()
            .map_err(|e: VaultError| VaultError::Fetch(e.to_string()))?;

        self.delay.wait(0).await;
        let now = self.clock.now_millis()?;

        let mut rng = rand::thread_rng();
        let mut posts = Vec::with_capacity(SYNTHETIC_POST_COUNT);
        let mut media = Vec::new();
        for i in 0..SYNTHETIC_POST_COUNT {
            let id = format!("post_{i}");
            if i % 5 == 0 {
                media.push(MediaItem {
                    id: format!("img_{i}"),
                    kind: MediaKind::Image,
                    url: format!("https://media.{}.example/img_{i}.jpg", platform.id()),
                    post_id: id.clone(),
                });
            }
            if i % 10 == 0 {
                media.push(MediaItem {
                    id: format!("vid_{i}"),
                    kind: MediaKind::Video,
                    url: format!("https://media.{}.example/vid_{i}.mp4", platform.id()),
                    post_id: id.clone(),
                });
            }
            posts.push(Post {
                id,
                content: format!("Sample post content {i}"),
                timestamp: now.saturating_sub(i as u64 * DAY_MILLIS),
                likes: rng.gen_range(0..100),
            });
        }

        debug!("Fabricated {} posts for {}", posts.len(), platform);
        Ok(PlatformSnapshot {
            platform: platform.id().to_string(),
            posts,
            profile: Profile {
                username: "user123".to_string(),
                followers: 1234,
                following: 567,
            },
            media,
        })
    }
}
