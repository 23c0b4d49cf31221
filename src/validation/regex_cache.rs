use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

const CACHE_CAPACITY: usize = 64;

static PATTERN_CACHE: OnceLock<Mutex<LruCache<String, Regex>>> = OnceLock::new();

fn cache() -> &'static Mutex<LruCache<String, Regex>> {
    PATTERN_CACHE.get_or_init(|| {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY)
            .expect("64 is a valid non-zero capacity for the pattern cache");
        Mutex::new(LruCache::new(capacity))
    })
}

/// Compile `pattern` once and reuse it across form fields.
pub fn cached_regex(pattern: &str) -> Result<Regex, regex::Error> {
    if let Ok(mut cache) = cache().try_lock()
        && let Some(regex) = cache.get(pattern)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern)?;

    // Contended lock: skip caching, the compiled regex is still returned.
    if let Ok(mut cache) = cache().try_lock() {
        cache.put(pattern.to_string(), regex.clone());
    }

    Ok(regex)
}
