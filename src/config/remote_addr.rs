// ABOUTME: Remote address parsing for the command line.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@[::1]:port".

use std::fmt;
use std::str::FromStr;

/// Where the remote half runs. User and port override the configured ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
}

impl RemoteAddr {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("remote address cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user, rest) = match s.rfind('@') {
            Some(at_pos) => {
                let user = &s[..at_pos];
                if user.is_empty() {
                    return Err("user cannot be empty".to_string());
                }
                (Some(user), &s[at_pos + 1..])
            }
            None => (None, s),
        };

        let (host, port_str) = if let Some(bracketed) = rest.strip_prefix('[') {
            let close = bracketed
                .find(']')
                .ok_or_else(|| format!("unterminated '[' in {}", s))?;
            let after = &bracketed[close + 1..];
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => return Err(format!("unexpected characters after ']': {}", after)),
            };
            (&bracketed[..close], port)
        } else if rest.matches(':').count() > 1 {
            // Bare IPv6 literal, no port
            (rest, None)
        } else {
            match rest.rfind(':') {
                Some(colon_pos) => (&rest[..colon_pos], Some(&rest[colon_pos + 1..])),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        let port = port_str
            .map(|p| {
                p.parse::<u16>()
                    .ok()
                    .filter(|port| *port != 0)
                    .ok_or_else(|| format!("invalid port: {}", p))
            })
            .transpose()?;

        Ok(RemoteAddr {
            host: host.to_string(),
            port,
            user: user.map(|u| u.to_string()),
        })
    }
}

impl FromStr for RemoteAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{}@", user)?;
        }
        match (self.host.contains(':'), self.port) {
            (true, Some(port)) => write!(f, "[{}]:{}", self.host, port),
            (false, Some(port)) => write!(f, "{}:{}", self.host, port),
            (_, None) => write!(f, "{}", self.host),
        }
    }
}
