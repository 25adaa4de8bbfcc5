//! Crawler identity enumeration
//!
//! Every configured crawl factor (guest/role, WebP, mobile, each cookie)
//! multiplies the set of simulated client identities. Profiles are never
//! persisted: they are recomputed from configuration on every listing, and
//! the enumeration order is deterministic so the stored "current crawler"
//! index stays meaningful between invocations with an unchanged
//! configuration.

use crate::config::CrawlerConfig;
use crate::site::UserDirectory;

/// One value a crawl factor can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorValue {
    /// The value carried by probes (uid, 0/1 toggle, cookie value)
    pub value: String,

    /// Human-readable label; empty labels are omitted from profile titles
    pub label: String,
}

impl FactorValue {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// An ordered crawl factor: its key and candidate values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    /// Factor key: `uid`, `webp`, `mobile`, or `cookie:<name>`
    pub key: String,

    pub values: Vec<FactorValue>,
}

/// A simulated client identity: one value assignment per factor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerProfile {
    /// Display title, non-empty value labels joined with " - "
    pub title: String,

    factors: Vec<(String, String)>,
}

impl CrawlerProfile {
    /// Value assigned for a factor key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.factors
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Simulated user id; 0 is the anonymous guest
    pub fn uid(&self) -> u64 {
        self.get("uid").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn webp(&self) -> bool {
        self.get("webp") == Some("1")
    }

    pub fn mobile(&self) -> bool {
        self.get("mobile") == Some("1")
    }

    /// Cookie factor assignments, in factor order
    pub fn cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.factors.iter().filter_map(|(k, v)| {
            k.strip_prefix("cookie:").map(|name| (name, v.as_str()))
        })
    }

    /// Cookie header value carrying this profile's identity
    ///
    /// The role uid rides in the configured role cookie; cookie factors
    /// follow in factor order. Guest profiles without cookie factors carry
    /// no Cookie header at all.
    pub fn cookie_header(&self, role_cookie: &str) -> Option<String> {
        let mut pairs = Vec::new();

        let uid = self.uid();
        if uid > 0 {
            pairs.push(format!("{}={}", role_cookie, uid));
        }

        for (name, value) in self.cookies() {
            pairs.push(format!("{}={}", name, value));
        }

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Builds the ordered factor list from configuration
///
/// Order is fixed: `uid` first (guest, then each resolvable role in config
/// order), then `webp` and `mobile` when enabled, then one factor per
/// configured cookie. Roles whose title cannot be resolved are skipped
/// silently.
pub fn build_factors(config: &CrawlerConfig, users: &dyn UserDirectory) -> Vec<Factor> {
    let mut factors = Vec::new();

    let mut uid_values = vec![FactorValue::new("0", "Guest")];
    for role in &config.roles {
        match users.role_title(role.uid) {
            Some(title) => uid_values.push(FactorValue::new(role.uid.to_string(), title)),
            None => tracing::debug!("Skipping role uid {}: no resolvable role", role.uid),
        }
    }
    factors.push(Factor {
        key: "uid".to_string(),
        values: uid_values,
    });

    if config.webp {
        factors.push(Factor {
            key: "webp".to_string(),
            values: vec![FactorValue::new("0", ""), FactorValue::new("1", "WebP")],
        });
    }

    if config.mobile {
        factors.push(Factor {
            key: "mobile".to_string(),
            values: vec![FactorValue::new("0", ""), FactorValue::new("1", "Mobile")],
        });
    }

    for cookie in &config.cookies {
        if cookie.name.is_empty() {
            continue;
        }
        factors.push(Factor {
            key: format!("cookie:{}", cookie.name),
            values: cookie
                .values
                .iter()
                .map(|v| FactorValue::new(v.clone(), format!("{}={}", cookie.name, v)))
                .collect(),
        });
    }

    factors
}

/// Expands the factor list into the flat profile list
///
/// The first factor iterates outermost, so all of a role's variants are
/// enumerated before the next role begins. The list length is the product
/// of each factor's value count.
pub fn list_profiles(factors: &[Factor]) -> Vec<CrawlerProfile> {
    let mut profiles = Vec::new();
    let mut assigned = Vec::new();
    expand(factors, 0, &mut assigned, "", &mut profiles);
    profiles
}

fn expand(
    factors: &[Factor],
    depth: usize,
    assigned: &mut Vec<(String, String)>,
    title: &str,
    out: &mut Vec<CrawlerProfile>,
) {
    if depth == factors.len() {
        out.push(CrawlerProfile {
            title: title.to_string(),
            factors: assigned.clone(),
        });
        return;
    }

    let factor = &factors[depth];
    for value in &factor.values {
        assigned.push((factor.key.clone(), value.value.clone()));

        let child_title = if value.label.is_empty() {
            title.to_string()
        } else if title.is_empty() {
            value.label.clone()
        } else {
            format!("{} - {}", title, value.label)
        };

        expand(factors, depth + 1, assigned, &child_title, out);
        assigned.pop();
    }
}
