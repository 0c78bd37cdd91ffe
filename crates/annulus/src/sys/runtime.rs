use super::status::StatusBoard;
use crate::events::AppEvent;
use almanac::Instant;
use almanac::time::MINUTE_MS;
use async_channel::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

const SECOND_MS: i64 = 1000;

/// Time left until the next wall-clock second, or minute when ambient.
fn until_next_tick(now: Instant, ambient: bool) -> Duration {
    let period = if ambient { MINUTE_MS } else { SECOND_MS };
    let wait = period - now.millis().rem_euclid(period);
    Duration::from_millis(wait as u64)
}

/// Entering or leaving ambient mode restarts the wait with the new period.
async fn run_ticker(tx: Sender<AppEvent>, status: Arc<StatusBoard>) {
    loop {
        let wait = until_next_tick(Instant::now(), status.read().ambient);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = status.ambient_changed() => continue,
        }
        if tx.send(AppEvent::Tick).await.is_err() {
            break;
        }
    }
}

/// Starts the ticker, control socket and config watcher. The returned
/// runtime also hosts data fetches and must outlive the main loop.
pub fn start_background_services(
    tx: Sender<AppEvent>,
    status: Arc<StatusBoard>,
) -> std::io::Result<Runtime> {
    let rt = Builder::new_multi_thread()
        .enable_all()
        .thread_name("annulus-bg")
        .build()?;

    {
        let tx = tx.clone();
        let status = Arc::clone(&status);
        rt.spawn(async move {
            run_ticker(tx, status).await;
        });
    }

    {
        let tx = tx.clone();
        rt.spawn(async move {
            crate::sys::server::run_server(tx, status).await;
        });
    }

    rt.spawn(async move {
        crate::config::run_async_watcher(tx).await;
    });

    Ok(rt)
}
