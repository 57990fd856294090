//! One polling cycle across every target.
//!
//! Fan-out: one spawned task per target, each a single GET with the request
//! timeout in force. Fan-in: every handle is awaited before the snapshot is
//! built, so a cycle always reports all targets at once. Any failure (connect,
//! timeout, status, body) is isolated to its target and becomes
//! [`TargetStatus::Unreachable`].

use std::time::Duration;

use serde::Deserialize;

use serverinfo_core::RateUnit;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A target's throughput normalised to B/s. `None` when the server omitted
/// the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRates {
    pub incoming: Option<f64>,
    pub outgoing: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetStatus {
    Online(TargetRates),
    Unreachable,
}

/// Results of one cycle, in target registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(String, TargetStatus)>,
}

impl Snapshot {
    pub fn entries(&self) -> &[(String, TargetStatus)] {
        &self.entries
    }

    pub fn online_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, TargetStatus::Online(_)))
            .count()
    }
}

impl FromIterator<(String, TargetStatus)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, TargetStatus)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Body of a `/speed*` response.
#[derive(Debug, Deserialize)]
struct SpeedPayload {
    incoming: Option<f64>,
    outgoing: Option<f64>,
    #[serde(default)]
    unit: RateUnit,
}

impl SpeedPayload {
    /// Values come back in whatever unit the server reports; scale them to
    /// B/s exactly once here.
    fn into_rates(self) -> TargetRates {
        TargetRates {
            incoming: self.incoming.map(|v| self.unit.to_bytes_per_sec(v)),
            outgoing: self.outgoing.map(|v| self.unit.to_bytes_per_sec(v)),
        }
    }
}

/// Speed endpoint for `base` in `unit`.
pub fn speed_url(base: &str, unit: RateUnit) -> String {
    format!("{}{}", base.trim_end_matches('/'), unit.path())
}

/// Issues the per-target speed requests for a cycle.
#[derive(Debug, Clone)]
pub struct Poller {
    client: reqwest::Client,
    unit: RateUnit,
}

impl Poller {
    pub fn new(unit: RateUnit) -> reqwest::Result<Self> {
        Self::with_timeout(unit, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(unit: RateUnit, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, unit })
    }

    pub fn unit(&self) -> RateUnit {
        self.unit
    }

    /// Query every target concurrently and wait for all of them.
    pub async fn poll_cycle(&self, targets: &[String]) -> Snapshot {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| {
                let client = self.client.clone();
                let url = speed_url(target, self.unit);
                tokio::spawn(async move { fetch_speed(&client, &url).await })
            })
            .collect();

        let mut entries = Vec::with_capacity(targets.len());
        for (target, handle) in targets.iter().zip(handles) {
            let status = match handle.await {
                Ok(Ok(rates)) => TargetStatus::Online(rates),
                Ok(Err(e)) => {
                    log::debug!("{target}: {e}");
                    TargetStatus::Unreachable
                }
                Err(e) => {
                    log::debug!("{target}: fetch task failed: {e}");
                    TargetStatus::Unreachable
                }
            };
            entries.push((target.clone(), status));
        }
        Snapshot { entries }
    }
}

async fn fetch_speed(client: &reqwest::Client, url: &str) -> reqwest::Result<TargetRates> {
    let payload: SpeedPayload = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(payload.into_rates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    use axum::{Router, http::StatusCode, routing::get};
    use serverinfo_core::{CounterError, CounterSource, NetCounters, RateEstimator};
    use tokio::net::TcpListener;

    struct Growing(AtomicU64);

    impl CounterSource for Growing {
        fn read(&self) -> Result<NetCounters, CounterError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(NetCounters {
                bytes_sent: n * 4096,
                bytes_received: n * 8192,
            })
        }
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn speed_server() -> String {
        serve(serverinfo_server::build_router(RateEstimator::new(Growing(
            AtomicU64::new(0),
        ))))
        .await
    }

    /// Accepts connections and never answers.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("http://{addr}")
    }

    async fn refused_target() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn status<'a>(snap: &'a Snapshot, target: &str) -> Option<&'a TargetStatus> {
        snap.entries()
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, s)| s)
    }

    fn fast_poller() -> Poller {
        Poller::with_timeout(RateUnit::BytesPerSec, Duration::from_millis(300)).unwrap()
    }

    // -----------------------------------------------------------------------
    // URL + payload handling
    // -----------------------------------------------------------------------

    #[test]
    fn speed_url_joins_path() {
        assert_eq!(
            speed_url("http://h:8765", RateUnit::BytesPerSec),
            "http://h:8765/speed"
        );
        assert_eq!(
            speed_url("http://h:8765/", RateUnit::KiloBytesPerSec),
            "http://h:8765/speed/kb"
        );
        assert_eq!(
            speed_url("http://h", RateUnit::MegaBytesPerSec),
            "http://h/speed/mb"
        );
    }

    #[test]
    fn payload_in_kb_normalised_to_bytes() {
        let p: SpeedPayload =
            serde_json::from_str(r#"{"incoming":2.0,"outgoing":0.5,"unit":"KB/s"}"#).unwrap();
        let r = p.into_rates();
        assert_eq!(r.incoming, Some(2048.0));
        assert_eq!(r.outgoing, Some(512.0));
    }

    #[test]
    fn payload_missing_fields_stay_missing() {
        let p: SpeedPayload = serde_json::from_str(r#"{"outgoing":10}"#).unwrap();
        let r = p.into_rates();
        assert_eq!(r.incoming, None);
        assert_eq!(r.outgoing, Some(10.0));
    }

    #[test]
    fn snapshot_counts_online() {
        let online = TargetStatus::Online(TargetRates {
            incoming: Some(1.0),
            outgoing: Some(1.0),
        });
        let snap: Snapshot = [
            ("a".to_string(), online),
            ("b".to_string(), TargetStatus::Unreachable),
        ]
        .into_iter()
        .collect();
        assert_eq!(snap.entries().len(), 2);
        assert_eq!(snap.online_count(), 1);
        assert_eq!(status(&snap, "b"), Some(&TargetStatus::Unreachable));
        assert_eq!(status(&snap, "zzz"), None);
    }

    // -----------------------------------------------------------------------
    // Live cycles
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_target_list_gives_empty_snapshot() {
        let snap = fast_poller().poll_cycle(&[]).await;
        assert!(snap.entries().is_empty());
    }

    #[tokio::test]
    async fn one_silent_target_among_three() {
        let targets = vec![speed_server().await, silent_server().await, speed_server().await];
        let poller = fast_poller();

        let started = Instant::now();
        let snap = poller.poll_cycle(&targets).await;
        let elapsed = started.elapsed();

        assert_eq!(snap.entries().len(), 3);
        let unreachable: Vec<usize> = snap
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, (_, s))| matches!(s, TargetStatus::Unreachable))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(unreachable, vec![1]);
        assert_eq!(snap.online_count(), 2);
        // Order follows the target list.
        let order: Vec<&str> = snap.entries().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, targets.iter().map(String::as_str).collect::<Vec<_>>());
        // Requests run concurrently: bounded by one timeout, not three.
        assert!(elapsed < Duration::from_millis(300) + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn first_reading_from_fresh_server_is_zero() {
        let target = speed_server().await;
        let snap = fast_poller().poll_cycle(&[target.clone()]).await;
        assert_eq!(
            status(&snap, &target),
            Some(&TargetStatus::Online(TargetRates {
                incoming: Some(0.0),
                outgoing: Some(0.0),
            }))
        );
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let target = refused_target().await;
        let snap = fast_poller().poll_cycle(&[target.clone()]).await;
        assert_eq!(status(&snap, &target), Some(&TargetStatus::Unreachable));
    }

    #[tokio::test]
    async fn error_status_is_unreachable() {
        let app = Router::new().route("/speed", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let target = serve(app).await;
        let snap = fast_poller().poll_cycle(&[target.clone()]).await;
        assert_eq!(status(&snap, &target), Some(&TargetStatus::Unreachable));
    }

    #[tokio::test]
    async fn malformed_body_is_unreachable() {
        let app = Router::new().route("/speed", get(|| async { "fast, probably" }));
        let target = serve(app).await;
        let snap = fast_poller().poll_cycle(&[target.clone()]).await;
        assert_eq!(status(&snap, &target), Some(&TargetStatus::Unreachable));
    }

    #[tokio::test]
    async fn scaled_unit_is_normalised_to_bytes() {
        let target = speed_server().await;
        let poller =
            Poller::with_timeout(RateUnit::KiloBytesPerSec, Duration::from_millis(500)).unwrap();
        poller.poll_cycle(&[target.clone()]).await;
        let snap = poller.poll_cycle(&[target.clone()]).await;
        let Some(TargetStatus::Online(rates)) = status(&snap, &target) else {
            panic!("target should be online");
        };
        // 8 KiB received per read; the KB/s reading is scaled back up.
        let incoming = rates.incoming.unwrap();
        assert!(incoming > 0.0);
        assert!(incoming <= 8192.0 / 0.1 + 10.0);
    }
}
