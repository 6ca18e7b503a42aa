//! Robots.txt policy gate
//!
//! The gate is built once per crawl session from the seed domain's robots.txt
//! and consulted in-memory by the queue manager for every candidate address.
//! A missing or unreadable robots.txt falls back to allow-all; absence of a
//! policy is not an error.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Access-policy gate answering "may this user agent fetch this address?"
#[derive(Debug, Clone)]
pub struct RobotsGate {
    robots: ParsedRobots,
    user_agent: String,
}

impl RobotsGate {
    /// Creates a gate from already-parsed robots.txt data
    pub fn new(robots: ParsedRobots, user_agent: &str) -> Self {
        Self {
            robots,
            user_agent: user_agent.to_string(),
        }
    }

    /// Creates a permissive gate that allows everything
    pub fn allow_all(user_agent: &str) -> Self {
        Self::new(ParsedRobots::allow_all(), user_agent)
    }

    /// Checks whether the configured user agent may fetch this address
    pub fn permitted(&self, url: &Url) -> bool {
        self.robots.is_allowed(url.as_str(), &self.user_agent)
    }
}

/// Fetches and parses robots.txt for the seed's origin
///
/// Requests `<scheme>://<host>/robots.txt` once at startup. Any failure along
/// the way (request error, non-success status, unreadable body) falls back to
/// an allow-all gate and is logged, never fatal.
pub async fn fetch_robots_gate(client: &Client, seed: &Url, user_agent: &str) -> RobotsGate {
    let robots_url = match seed.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Could not derive robots.txt URL from seed: {}", e);
            return RobotsGate::allow_all(user_agent);
        }
    };

    tracing::debug!("Fetching robots policy from {}", robots_url);

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => {
                tracing::info!("Loaded robots.txt ({} bytes)", body.len());
                RobotsGate::new(ParsedRobots::from_content(&body), user_agent)
            }
            Err(e) => {
                tracing::warn!("Failed to read robots.txt body: {}", e);
                RobotsGate::allow_all(user_agent)
            }
        },
        Ok(response) => {
            tracing::info!(
                "No robots.txt at {} (HTTP {}), allowing all",
                robots_url,
                response.status()
            );
            RobotsGate::allow_all(user_agent)
        }
        Err(e) => {
            tracing::warn!("robots.txt fetch failed ({}), allowing all", e);
            RobotsGate::allow_all(user_agent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_gate() {
        let gate = RobotsGate::allow_all("TestBot/1.0");
        assert!(gate.permitted(&Url::parse("https://x.test/private/p").unwrap()));
    }

    #[test]
    fn test_gate_honors_disallow() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private/");
        let gate = RobotsGate::new(robots, "TestBot/1.0");

        assert!(!gate.permitted(&Url::parse("https://x.test/private/p").unwrap()));
        assert!(gate.permitted(&Url::parse("https://x.test/public/p").unwrap()));
    }
}
