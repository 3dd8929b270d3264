use sha2::{Digest, Sha256};

/// The three independently invalidatable artifact categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    /// Ordered talk stubs discovered from a source URL.
    Listing,
    /// Per-talk transcript or description.
    Detail,
    /// Generated summary text.
    Summary,
}

impl CacheDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheDomain::Listing => "listing",
            CacheDomain::Detail => "detail",
            CacheDomain::Summary => "summary",
        }
    }
}

/// A deterministic cache fingerprint composed of a domain, a primary
/// identifier (typically a URL), and any parameters that change the
/// meaning of the cached artifact.
///
/// Summary keys carry the backend name, model, target length, and a
/// content hash, so switching models or lengths invalidates only the
/// summaries that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    domain: CacheDomain,
    identifier: String,
    params: Vec<String>,
}

impl CacheKey {
    pub fn new(domain: CacheDomain, identifier: impl Into<String>) -> Self {
        CacheKey {
            domain,
            identifier: identifier.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, value: impl ToString) -> Self {
        self.params.push(value.to_string());
        self
    }

    pub fn domain(&self) -> CacheDomain {
        self.domain
    }

    /// Filesystem-safe entry name: a readable slug from the identifier
    /// plus a hash over the full identifier and parameter tuple.
    pub fn entry_name(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.identifier.as_bytes());
        for param in &self.params {
            hasher.update([0u8]);
            hasher.update(param.as_bytes());
        }
        let digest = hex_prefix(&hasher.finalize(), 16);

        let slug: String = self
            .identifier
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .take(64)
            .collect();

        format!("{slug}-{digest}")
    }
}

/// Short stable fingerprint of a text payload, used as the content-hash
/// component of summary cache keys.
pub fn content_fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex_prefix(&digest, 16)
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    for byte in bytes {
        if out.len() >= len {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_is_deterministic() {
        let a = CacheKey::new(CacheDomain::Listing, "https://example.com/playlist?list=x");
        let b = CacheKey::new(CacheDomain::Listing, "https://example.com/playlist?list=x");
        assert_eq!(a.entry_name(), b.entry_name());
    }

    #[test]
    fn params_change_the_entry_name() {
        let base = CacheKey::new(CacheDomain::Summary, "https://example.com/talk");
        let with_model = base.clone().param("anthropic").param("claude-3-5-haiku");
        let other_model = base.clone().param("anthropic").param("claude-3-opus");
        assert_ne!(base.entry_name(), with_model.entry_name());
        assert_ne!(with_model.entry_name(), other_model.entry_name());
    }

    #[test]
    fn entry_name_is_filesystem_safe() {
        let key = CacheKey::new(CacheDomain::Detail, "https://ex.com/a?b=c&d=e f");
        let name = key.entry_name();
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
    }

    #[test]
    fn content_fingerprint_differs_per_text() {
        assert_ne!(content_fingerprint("hello"), content_fingerprint("world"));
        assert_eq!(content_fingerprint("hello"), content_fingerprint("hello"));
    }
}
