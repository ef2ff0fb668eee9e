//! Host descriptors and host-string validation.
//!
//! A host string is `address[:port]` with IPv6 literals in brackets and the
//! port defaulting to 443 when omitted. URL-style input such as
//! `https://secure.example.com:9443` is accepted and reduced to its host and
//! port.

use std::fmt;

use url::Url;

/// Port assumed when the host string does not carry one.
pub const DEFAULT_PORT: u16 = 443;

/// A validated `(hostname-or-IP, port)` pair ready for dialing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    /// Hostname or literal IP address, without brackets.
    pub address: String,
    /// TCP port, 1-65535.
    pub port: u16,
}

impl HostDescriptor {
    /// Parses and validates a single host string.
    pub fn parse(input: &str) -> Result<Self, HostParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(HostParseError::new(input, "host cannot be empty"));
        }
        if trimmed.contains("://") {
            return Self::from_url(input, trimmed);
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(HostParseError::new(input, "host cannot contain whitespace"));
        }
        if let Some(rest) = trimmed.strip_prefix('[') {
            return Self::from_bracketed(input, rest);
        }
        match trimmed.matches(':').count() {
            0 => Ok(HostDescriptor {
                address: trimmed.to_string(),
                port: DEFAULT_PORT,
            }),
            1 => {
                let (address, port) = trimmed.split_once(':').unwrap_or((trimmed, ""));
                if address.is_empty() {
                    return Err(HostParseError::new(input, "hostname cannot be empty"));
                }
                Ok(HostDescriptor {
                    address: address.to_string(),
                    port: parse_port(input, port)?,
                })
            }
            // more than one colon and no brackets: a bare IPv6 literal
            _ => Ok(HostDescriptor {
                address: trimmed.to_string(),
                port: DEFAULT_PORT,
            }),
        }
    }

    fn from_bracketed(input: &str, rest: &str) -> Result<Self, HostParseError> {
        let end = rest
            .find(']')
            .ok_or_else(|| HostParseError::new(input, "missing closing bracket in IPv6 address"))?;
        let address = &rest[..end];
        if address.is_empty() {
            return Err(HostParseError::new(input, "IPv6 address cannot be empty"));
        }
        let port = match &rest[end + 1..] {
            "" => DEFAULT_PORT,
            tail => match tail.strip_prefix(':') {
                Some(port) => parse_port(input, port)?,
                None => {
                    return Err(HostParseError::new(
                        input,
                        "unexpected characters after closing bracket",
                    ))
                }
            },
        };
        Ok(HostDescriptor {
            address: address.to_string(),
            port,
        })
    }

    fn from_url(input: &str, trimmed: &str) -> Result<Self, HostParseError> {
        let url = Url::parse(trimmed)
            .map_err(|e| HostParseError::new(input, &format!("invalid URL: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| HostParseError::new(input, "URL does not contain a host"))?;
        // Url keeps IPv6 hosts bracketed
        let address = host.trim_start_matches('[').trim_end_matches(']');
        Ok(HostDescriptor {
            address: address.to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
        })
    }

    /// True when the address is a literal IP rather than a DNS name.
    pub fn is_ip_literal(&self) -> bool {
        self.address.parse::<std::net::IpAddr>().is_ok()
    }
}

/// Renders the dialable `address:port` form, re-bracketing IPv6 literals.
impl fmt::Display for HostDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

fn parse_port(input: &str, port: &str) -> Result<u16, HostParseError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(HostParseError::new(
            input,
            "port must be a number between 1 and 65535",
        )),
        Ok(port) => Ok(port),
    }
}

/// A host string that could not be turned into a [`HostDescriptor`].
#[derive(Debug)]
pub struct HostParseError {
    input: String,
    reason: String,
}

impl HostParseError {
    fn new(input: &str, reason: &str) -> Self {
        HostParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for HostParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid host {:?}: {}", self.input, self.reason)
    }
}

impl std::error::Error for HostParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> HostDescriptor {
        HostDescriptor::parse(input).unwrap()
    }

    #[test]
    fn test_hostname_gets_default_port() {
        assert_eq!(
            parsed("example.com"),
            HostDescriptor {
                address: "example.com".to_string(),
                port: DEFAULT_PORT
            }
        );
    }

    #[test]
    fn test_hostname_with_port() {
        assert_eq!(parsed("example.com:8443").port, 8443);
        assert_eq!(parsed("example.com:65535").port, 65535);
    }

    #[test]
    fn test_subdomain() {
        assert_eq!(parsed("www.example.com").address, "www.example.com");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(parsed("  example.com  ").address, "example.com");
    }

    #[test]
    fn test_bracketed_ipv6() {
        let host = parsed("[::1]:8080");
        assert_eq!(host.address, "::1");
        assert_eq!(host.port, 8080);
        assert_eq!(host.to_string(), "[::1]:8080");

        let host = parsed("[::1]");
        assert_eq!(host.address, "::1");
        assert_eq!(host.port, DEFAULT_PORT);
    }

    #[test]
    fn test_bare_ipv6() {
        let host = parsed("2001:db8::1");
        assert_eq!(host.address, "2001:db8::1");
        assert_eq!(host.port, DEFAULT_PORT);
        assert!(host.is_ip_literal());
        assert_eq!(host.to_string(), "[2001:db8::1]:443");
    }

    #[test]
    fn test_ipv4_literal() {
        let host = parsed("192.0.2.10:443");
        assert!(host.is_ip_literal());
        assert_eq!(host.to_string(), "192.0.2.10:443");
    }

    #[test]
    fn test_url_input() {
        let host = parsed("https://secure.example.com:9443");
        assert_eq!(host.address, "secure.example.com");
        assert_eq!(host.port, 9443);

        let host = parsed("https://secure.example.com");
        assert_eq!(host.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_hosts() {
        for input in [
            "",
            "   ",
            "exam ple.com",
            ":443",
            "example.com:abc",
            "example.com:0",
            "example.com:65536",
            "[::1:8080",
            "[]",
            "[::1]invalid",
        ] {
            assert!(
                HostDescriptor::parse(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_error_mentions_input_and_reason() {
        let err = HostDescriptor::parse("example.com:99999").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("example.com:99999"));
        assert!(message.contains("between 1 and 65535"));
    }
}
