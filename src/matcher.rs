//! URL pattern matching for capture rules.
//!
//! Patterns take the form `scheme://host[:port][/path]`:
//!
//! - scheme is `http`, `https` or `*` (either)
//! - host is `*`, `*.example.com` (the domain and any subdomain) or a literal
//! - path may contain `*` wildcards and is matched against path plus query
//!
//! When the pattern has no path and `path_required` is false, any path matches.

use url::Url;

use crate::error::MatchError;

/// Decides whether a request URL falls under a capture pattern.
pub trait PatternMatcher: Send + Sync {
    fn matches(&self, pattern: &str, url: &str, path_required: bool) -> Result<bool, MatchError>;
}

/// Default wildcard matcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct WildcardMatcher;

#[derive(Debug, PartialEq, Eq)]
enum SchemePattern {
    Any,
    Exact(String),
}

#[derive(Debug, PartialEq, Eq)]
enum HostPattern {
    Any,
    Subdomains(String),
    Exact(String),
}

#[derive(Debug, PartialEq, Eq)]
enum PortPattern {
    Default,
    Any,
    Exact(u16),
}

#[derive(Debug)]
struct ParsedPattern<'a> {
    scheme: SchemePattern,
    host: HostPattern,
    port: PortPattern,
    path: Option<&'a str>,
}

fn parse_pattern(pattern: &str, path_required: bool) -> Result<ParsedPattern<'_>, MatchError> {
    let (scheme, rest) = pattern
        .split_once("://")
        .ok_or_else(|| MatchError::new(pattern, "missing '://' separator"))?;

    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "*" => SchemePattern::Any,
        s @ ("http" | "https") => SchemePattern::Exact(s.to_string()),
        other => {
            return Err(MatchError::new(
                pattern,
                format!("unsupported scheme '{}'", other),
            ))
        }
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], Some(&rest[idx..])),
        None => (rest, None),
    };

    if path.is_none() && path_required {
        return Err(MatchError::new(pattern, "path is required"));
    }

    let (host, port) = split_authority(pattern, authority)?;
    let port = match port {
        None => PortPattern::Default,
        Some("*") => PortPattern::Any,
        Some(port) => PortPattern::Exact(
            port.parse::<u16>()
                .map_err(|_| MatchError::new(pattern, format!("invalid port '{}'", port)))?,
        ),
    };

    if host.is_empty() {
        return Err(MatchError::new(pattern, "missing host"));
    }

    let host = host.to_ascii_lowercase();
    let host = if host == "*" {
        HostPattern::Any
    } else if let Some(domain) = host.strip_prefix("*.") {
        if domain.is_empty() || domain.contains('*') {
            return Err(MatchError::new(pattern, "invalid host wildcard"));
        }
        HostPattern::Subdomains(domain.to_string())
    } else if host.contains('*') {
        return Err(MatchError::new(
            pattern,
            "host wildcard must be '*' or a leading '*.'",
        ));
    } else {
        HostPattern::Exact(host)
    };

    Ok(ParsedPattern {
        scheme,
        host,
        port,
        path,
    })
}

/// Split `host[:port]`. IPv6 literals keep their brackets, matching `Url::host_str`.
fn split_authority<'a>(
    pattern: &str,
    authority: &'a str,
) -> Result<(&'a str, Option<&'a str>), MatchError> {
    if authority.starts_with('[') {
        let end = authority
            .find(']')
            .ok_or_else(|| MatchError::new(pattern, "unclosed '[' in host"))?;
        let (host, rest) = authority.split_at(end + 1);
        return match rest {
            "" => Ok((host, None)),
            _ => match rest.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(MatchError::new(pattern, "unexpected text after IPv6 host")),
            },
        };
    }
    Ok(match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    })
}

impl PatternMatcher for WildcardMatcher {
    fn matches(&self, pattern: &str, url: &str, path_required: bool) -> Result<bool, MatchError> {
        let parsed = parse_pattern(pattern, path_required)?;

        let Ok(url) = Url::parse(url) else {
            return Ok(false);
        };

        let scheme_ok = match &parsed.scheme {
            SchemePattern::Any => matches!(url.scheme(), "http" | "https"),
            SchemePattern::Exact(s) => url.scheme() == s,
        };
        if !scheme_ok {
            return Ok(false);
        }

        let host = url.host_str().unwrap_or("");
        let host_ok = match &parsed.host {
            HostPattern::Any => true,
            HostPattern::Exact(h) => host == h,
            HostPattern::Subdomains(domain) => {
                host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .map_or(false, |prefix| prefix.ends_with('.'))
            }
        };
        if !host_ok {
            return Ok(false);
        }

        let port_ok = match parsed.port {
            PortPattern::Any => true,
            PortPattern::Default => url.port().is_none(),
            PortPattern::Exact(p) => url.port_or_known_default() == Some(p),
        };
        if !port_ok {
            return Ok(false);
        }

        let Some(path_pattern) = parsed.path else {
            return Ok(true);
        };

        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        Ok(wildcard_match(path_pattern, &target))
    }
}

/// Greedy `*` matching with single-point backtracking.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == b'*')
}
