use rust_stemmers::{Algorithm, Stemmer};
use std::cell::RefCell;
use std::num::NonZeroUsize;

const STEM_CACHE_SIZE: usize = 4096;

// Alignment asks for the same stems O(|a|·|b|) times per comparison, so roots
// are memoised per thread.
thread_local! {
    static STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static STEM_CACHE: RefCell<lru::LruCache<String, String>> = RefCell::new(
        lru::LruCache::new(NonZeroUsize::new(STEM_CACHE_SIZE).unwrap())
    );
}

/// Morphological root of `word`, case-insensitive ("Ports" -> "port").
pub fn stem(word: &str) -> String {
    let cached = STEM_CACHE.with(|cache| cache.borrow_mut().get(word).cloned());
    if let Some(root) = cached {
        return root;
    }
    let lowered = word.to_lowercase();
    let root = STEMMER.with(|s| s.stem(&lowered).into_owned());
    STEM_CACHE.with(|cache| {
        cache.borrow_mut().put(word.to_string(), root.clone());
    });
    root
}

pub fn same_root(a: &str, b: &str) -> bool {
    stem(a) == stem(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_and_singular_share_a_root() {
        assert!(same_root("Ports", "Port"));
        assert!(same_root("connections", "connection"));
        assert!(same_root("failed", "failing"));
    }

    #[test]
    fn distinct_words_differ() {
        assert!(!same_root("port", "host"));
    }

    #[test]
    fn cached_result_is_stable() {
        let first = stem("Retrying");
        let second = stem("Retrying");
        assert_eq!(first, second);
        assert_eq!(first, stem("retry"));
    }
}
