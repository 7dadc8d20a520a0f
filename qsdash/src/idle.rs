//! Inactivity detection for the dashboard.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    /// No activity for the configured timeout. Sent once per idle period.
    Idle,
    /// First activity after an `Idle`.
    Active,
}

/// Single timer reset by activity events. The background task stops when this is dropped.
pub struct IdleTimer {
    activity: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl IdleTimer {
    pub fn spawn(timeout: Duration) -> (Self, mpsc::UnboundedReceiver<IdleEvent>) {
        let (activity, mut activity_rx) = mpsc::unbounded_channel::<()>();
        let (events, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut idle = false;
            loop {
                let deadline = tokio::time::sleep(timeout);
                tokio::select! {
                    msg = activity_rx.recv() => match msg {
                        Some(()) => {
                            if idle {
                                idle = false;
                                if events.send(IdleEvent::Active).is_err() {
                                    break;
                                }
                            }
                        }
                        None => break,
                    },
                    _ = deadline, if !idle => {
                        idle = true;
                        tracing::debug!("idle after {:?}", timeout);
                        if events.send(IdleEvent::Idle).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { activity, task }, events_rx)
    }

    /// Record user activity; restarts the countdown.
    pub fn touch(&self) {
        let _ = self.activity.send(());
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Which screen the idle panel is shown over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleContext {
    Dashboard,
    Assets,
    Agents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Offer,
    Update,
    Alert,
}

#[derive(Debug, Clone, Copy)]
pub struct IdleNotice {
    pub title: &'static str,
    pub message: &'static str,
    pub kind: NoticeKind,
}

pub const IDLE_TITLE: &str = "System Idle";
pub const IDLE_BLURB: &str = "QStellar paused your dashboard due to inactivity. \
While you're here, explore new advisories and system updates.";

const DASHBOARD: &[IdleNotice] = &[
    IdleNotice {
        title: "QStellar Premium Trial",
        message: "Unlock advanced analytics and priority scanning, free for 14 days.",
        kind: NoticeKind::Offer,
    },
    IdleNotice {
        title: "New Security Advisory",
        message: "Critical vulnerability (CVE-2025-1038) detected in Windows RPC layer.",
        kind: NoticeKind::Alert,
    },
    IdleNotice {
        title: "AI Assistant Update",
        message: "Sentinel can now summarize advisories and generate patch reports.",
        kind: NoticeKind::Update,
    },
];

const ASSETS: &[IdleNotice] = &[
    IdleNotice {
        title: "New Asset Sync Available",
        message: "Scan your endpoints again to ensure inventory accuracy.",
        kind: NoticeKind::Update,
    },
    IdleNotice {
        title: "Try Smart Asset Correlation",
        message: "Get deep insight into connected endpoints and risk mapping.",
        kind: NoticeKind::Offer,
    },
];

const AGENTS: &[IdleNotice] = &[
    IdleNotice {
        title: "New CVE Alert",
        message: "CVE-2025-1079 detected in Apache HTTP Server 2.4.59.",
        kind: NoticeKind::Alert,
    },
    IdleNotice {
        title: "Risk Reduction Insights",
        message: "Sentinel AI recommends patch prioritization by exposure score.",
        kind: NoticeKind::Update,
    },
];

impl IdleContext {
    pub fn notices(self) -> &'static [IdleNotice] {
        match self {
            IdleContext::Dashboard => DASHBOARD,
            IdleContext::Assets => ASSETS,
            IdleContext::Agents => AGENTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn fires_once_then_rearms_on_activity() {
        let (timer, mut rx) = IdleTimer::spawn(Duration::from_secs(4));

        assert_eq!(rx.recv().await, Some(IdleEvent::Idle));
        // still idle; no second Idle
        sleep(Duration::from_secs(20)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        timer.touch();
        assert_eq!(rx.recv().await, Some(IdleEvent::Active));
        assert_eq!(rx.recv().await, Some(IdleEvent::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn activity_postpones_idle() {
        let (timer, mut rx) = IdleTimer::spawn(Duration::from_secs(4));
        sleep(Duration::from_secs(3)).await;
        timer.touch();
        sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv(), Ok(IdleEvent::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_task() {
        let (timer, mut rx) = IdleTimer::spawn(Duration::from_secs(1));
        drop(timer);
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn every_context_has_notices() {
        for ctx in [IdleContext::Dashboard, IdleContext::Assets, IdleContext::Agents] {
            assert!(!ctx.notices().is_empty());
        }
    }
}
