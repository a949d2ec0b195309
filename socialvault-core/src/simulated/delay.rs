use std::time::Duration;

use rand::Rng;

/// How long a simulated call waits before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedDelay {
    None,
    Fixed(Duration),
    /// Uniformly drawn from `min..=max`.
    Between(Duration, Duration),
    /// One millisecond per `bytes_per_ms` bytes of payload, capped at `cap`.
    SizeProportional { bytes_per_ms: u64, cap: Duration },
}

impl SimulatedDelay {
    /// 1–3 s, as for a JSON document upload.
    pub fn reference_upload() -> Self {
        SimulatedDelay::Between(Duration::from_millis(1000), Duration::from_millis(3000))
    }

    /// 0.5–1.5 s, as for a retrieval.
    pub fn reference_retrieve() -> Self {
        SimulatedDelay::Between(Duration::from_millis(500), Duration::from_millis(1500))
    }

    /// size/1000 ms capped at 3 s, as for a raw file upload.
    pub fn reference_file_upload() -> Self {
        SimulatedDelay::SizeProportional {
            bytes_per_ms: 1000,
            cap: Duration::from_millis(3000),
        }
    }

    pub fn duration_for(&self, payload_len: usize) -> Duration {
        match *self {
            SimulatedDelay::None => Duration::ZERO,
            SimulatedDelay::Fixed(d) => d,
            SimulatedDelay::Between(min, max) => {
                if max <= min {
                    return min;
                }
                let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
                Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
            }
            SimulatedDelay::SizeProportional { bytes_per_ms, cap } => {
                let ms = payload_len as u64 / bytes_per_ms.max(1);
                Duration::from_millis(ms).min(cap)
            }
        }
    }

    pub async fn wait(&self, payload_len: usize) {
        let d = self.duration_for(payload_len);
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}
