//! `embed flush` – bulk eviction, by tag or everything

use anyhow::Result;
use colored::Colorize;
use embed_core::ContentService;
use std::io::Write;

/// High-level outcome of [`execute`]. Useful for assertions in tests.
#[derive(Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Entries carrying the tag were evicted.
    Tagged { tag: String, removed: usize },
    /// The whole cache was cleared.
    Everything,
}

/// Evict entries tagged with `tag`, or everything when `tag` is `None`.
///
/// # Errors
///
/// Returns an error if the persistent store cannot be flushed or writing fails.
pub fn execute<W: Write>(
    service: &ContentService,
    tag: Option<&str>,
    mut writer: W,
) -> Result<FlushOutcome> {
    if let Some(tag) = tag {
        let removed = service.flush_tag(tag)?;
        if removed == 0 {
            writeln!(writer, "{} No cached entries tagged {tag}", "ℹ".blue())?;
        } else {
            writeln!(
                writer,
                "{} Evicted {removed} cached entr{} tagged {tag}",
                "✓".green(),
                if removed == 1 { "y" } else { "ies" }
            )?;
        }
        return Ok(FlushOutcome::Tagged {
            tag: tag.to_string(),
            removed,
        });
    }

    service.flush()?;
    writeln!(writer, "{} Cache cleared", "✓".green())?;
    Ok(FlushOutcome::Everything)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embed_core::cache::{CacheKey, MemoryBackend, TwoTierCache};
    use embed_core::{CacheBackend, Config, ContentCache};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn setup() -> (ContentService, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let cache = TwoTierCache::new(backend.clone());
        cache.set(
            &CacheKey::derive("t", "a"),
            "a",
            &BTreeSet::from(["site:one.test".to_string()]),
        );
        cache.set(
            &CacheKey::derive("t", "b"),
            "b",
            &BTreeSet::from(["site:two.test".to_string()]),
        );
        let service = ContentService::builder(Config::default())
            .cache(Arc::new(cache))
            .build()
            .unwrap();
        (service, backend)
    }

    #[test]
    fn test_flush_by_tag() {
        let (service, backend) = setup();
        let mut out = Vec::new();

        let outcome = execute(&service, Some("site:one.test"), &mut out).unwrap();
        assert_eq!(
            outcome,
            FlushOutcome::Tagged {
                tag: "site:one.test".to_string(),
                removed: 1
            }
        );
        assert_eq!(backend.len(), 1);
        assert!(backend.get(&CacheKey::derive("t", "b")).unwrap().is_some());
    }

    #[test]
    fn test_flush_unknown_tag_reports_nothing_removed() {
        let (service, backend) = setup();
        let mut out = Vec::new();

        execute(&service, Some("site:none.test"), &mut out).unwrap();
        assert_eq!(backend.len(), 2);
        assert!(String::from_utf8(out).unwrap().contains("No cached entries"));
    }

    #[test]
    fn test_flush_everything() {
        let (service, backend) = setup();
        let outcome = execute(&service, None, std::io::sink()).unwrap();
        assert_eq!(outcome, FlushOutcome::Everything);
        assert!(backend.is_empty());
    }
}
