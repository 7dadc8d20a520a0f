//! Shared demo state: records, agent installers and single-use download tokens.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::seed;
use crate::types::{AgentRow, AssetRow};

/// OS name in `/get_link/{os}` -> installer file name.
pub const ALLOWED_DOWNLOADS: [(&str, &str); 3] = [
    ("windows", "QS-Setup.exe"),
    ("ubuntu", "qs-agent_1.0.0_all.deb"),
    ("mac", "mac_agent"),
];

/// How long an unredeemed download link stays valid.
pub const TOKEN_TTL: Duration = Duration::from_secs(10 * 60);
/// Outstanding tokens kept at most; the oldest is evicted beyond this.
pub const MAX_TOKENS: usize = 1024;

pub fn file_for_os(os: &str) -> Option<&'static str> {
    ALLOWED_DOWNLOADS
        .iter()
        .find(|(name, _)| *name == os)
        .map(|(_, file)| *file)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub struct DemoState {
    pub agents: Vec<AgentRow>,
    pub assets: Vec<AssetRow>,
    /// file name -> contents
    pub files: HashMap<String, Vec<u8>>,
    /// Artificial latency per page number, for exercising out-of-order replies.
    pub page_delays: HashMap<u32, Duration>,
    tokens: Mutex<HashMap<String, IssuedToken>>,
    token_seq: AtomicU64,
}

pub type SharedState = Arc<DemoState>;

struct IssuedToken {
    file: String,
    issued: Instant,
}

impl DemoState {
    pub fn new(agents: Vec<AgentRow>, assets: Vec<AssetRow>) -> Self {
        Self {
            agents,
            assets,
            files: HashMap::new(),
            page_delays: HashMap::new(),
            tokens: Mutex::new(HashMap::new()),
            token_seq: AtomicU64::new(0),
        }
    }

    /// The data set `qsdash --demo` shows: 137 agents, 230 assets, and installers for
    /// Linux and macOS only (Windows answers 404).
    pub fn demo() -> Self {
        Self::new(seed::agents(137), seed::assets(230))
            .with_file("qs-agent_1.0.0_all.deb", b"!<arch>\ndemo qs-agent package\n".to_vec())
            .with_file("mac_agent", b"#!/bin/sh\necho 'QStellar demo agent'\n".to_vec())
    }

    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), bytes);
        self
    }

    pub fn with_page_delay(mut self, page: u32, delay: Duration) -> Self {
        self.page_delays.insert(page, delay);
        self
    }

    /// Issue a token good for one download of `file`.
    pub fn issue_token(&self, file: &str) -> String {
        let seq = self.token_seq.fetch_add(1, Ordering::Relaxed);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let token = sha256_hex(format!("{seq}:{nanos}:{file}").as_bytes())[..16].to_string();
        if let Ok(mut tokens) = self.tokens.lock() {
            let now = Instant::now();
            // every /get_link call issues one, and most are never redeemed
            tokens.retain(|_, t| now.duration_since(t.issued) < TOKEN_TTL);
            if tokens.len() >= MAX_TOKENS {
                let oldest = tokens
                    .iter()
                    .min_by_key(|(_, t)| t.issued)
                    .map(|(k, _)| k.clone());
                if let Some(k) = oldest {
                    tokens.remove(&k);
                }
            }
            tokens.insert(
                token.clone(),
                IssuedToken {
                    file: file.to_string(),
                    issued: now,
                },
            );
        }
        token
    }

    pub fn outstanding_tokens(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Consume `token` if it was issued for `file`.
    pub fn redeem_token(&self, token: &str, file: &str) -> bool {
        let Ok(mut tokens) = self.tokens.lock() else {
            return false;
        };
        match tokens.get(token) {
            Some(t) if t.issued.elapsed() >= TOKEN_TTL => {
                tokens.remove(token);
                false
            }
            Some(t) if t.file == file => {
                tokens.remove(token);
                true
            }
            _ => false,
        }
    }
}
