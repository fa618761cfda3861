use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::client::Lookup;
use crate::record::SuccessRecord;
use crate::stats::{ReconcileOutcome, ReconcileStats};
use crate::utils::format_seconds;

/// Domains that need a fresh lookup, deduplicated, in extraction order.
///
/// Blank domains are never looked up. Anything without a reusable cached
/// record is retried, including earlier "no filing" answers.
pub fn pending(domains: &[String], cache: &CacheStore) -> Vec<String> {
    let mut seen = HashSet::new();
    domains
        .iter()
        .filter(|domain| !domain.is_empty())
        .filter(|domain| seen.insert(*domain))
        .filter(|domain| !cache.get(domain).is_some_and(|r| r.is_reusable()))
        .cloned()
        .collect()
}

/// Every reusable record in the cache, in cache order.
pub fn success_list(cache: &CacheStore) -> Vec<SuccessRecord> {
    cache.records().filter_map(SuccessRecord::from_record).collect()
}

pub struct Reconciler<L> {
    lookup: L,
    delay: Duration,
}

impl<L: Lookup> Reconciler<L> {
    pub fn new(lookup: L, delay: Duration) -> Self {
        Self { lookup, delay }
    }

    pub fn into_lookup(self) -> L {
        self.lookup
    }

    /// Brings `cache` up to date for `domains` and derives the success list.
    pub fn reconcile(&mut self, domains: &[String], cache: &mut CacheStore) -> ReconcileOutcome {
        let start_time = Instant::now();
        let total_calls = pending(domains, cache).len();
        info!(
            action = "start",
            component = "reconciler",
            rows = domains.len(),
            pending = total_calls,
            "Reconciling domains against cache"
        );

        let mut stats = ReconcileStats {
            rows: domains.len(),
            ..ReconcileStats::default()
        };
        let mut decided: HashSet<&str> = HashSet::new();

        for domain in domains {
            if domain.is_empty() || !decided.insert(domain.as_str()) {
                continue;
            }

            if cache.get(domain).is_some_and(|r| r.is_reusable()) {
                debug!(action = "hit", component = "reconciler", domain = %domain, "Reusing cached filing");
                stats.cache_hits += 1;
                continue;
            }

            let record = self.lookup.fetch(domain);
            stats.api_calls += 1;
            if !record.transport_ok {
                stats.failed_calls += 1;
            }
            cache.put(record);

            let elapsed = start_time.elapsed().as_secs_f64();
            let remaining =
                elapsed / stats.api_calls as f64 * total_calls.saturating_sub(stats.api_calls) as f64;
            info!(
                action = "progress",
                component = "reconciler",
                current = stats.api_calls,
                total = total_calls,
                elapsed = %format_seconds(elapsed),
                remaining = %format_seconds(remaining),
                "Lookup progress"
            );

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        stats.unique_domains = decided.len();
        let success = success_list(cache);
        stats.successes = success.len();

        info!(
            action = "complete",
            component = "reconciler",
            unique_domains = stats.unique_domains,
            cache_hits = stats.cache_hits,
            api_calls = stats.api_calls,
            failed_calls = stats.failed_calls,
            successes = stats.successes,
            duration_ms = start_time.elapsed().as_millis(),
            "Reconciliation completed"
        );

        ReconcileOutcome { stats, success }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DomainRecord;
    use std::collections::HashMap;

    fn filed(name: &str, num: &str) -> String {
        format!(r#"{{"code":1,"data":{{"icp_name":"{name}","icp_num":"{num}"}}}}"#)
    }

    /// Answers from a fixed table and records every call.
    #[derive(Default)]
    struct FakeLookup {
        answers: HashMap<String, (i32, String)>,
        calls: Vec<String>,
    }

    impl FakeLookup {
        fn answer(mut self, domain: &str, status: i32, body: &str) -> Self {
            self.answers.insert(domain.to_string(), (status, body.to_string()));
            self
        }
    }

    impl Lookup for FakeLookup {
        fn fetch(&mut self, domain: &str) -> DomainRecord {
            self.calls.push(domain.to_string());
            match self.answers.get(domain) {
                Some((status, body)) => DomainRecord::new(domain, *status, "", body.clone()),
                None => DomainRecord::transport_failure(domain, "ConnectError", "refused".into()),
            }
        }
    }

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_cached_success_makes_no_call() {
        let mut cache = CacheStore::new();
        cache.put(DomainRecord::new("a.com", 200, "", filed("Acme", "X123")));

        let mut reconciler = Reconciler::new(FakeLookup::default(), Duration::ZERO);
        let outcome = reconciler.reconcile(&domains(&["a.com"]), &mut cache);

        assert!(reconciler.into_lookup().calls.is_empty());
        assert_eq!(outcome.stats.cache_hits, 1);
        assert_eq!(outcome.success.len(), 1);
        let hit = &outcome.success[0];
        assert_eq!(
            (hit.domain.as_str(), hit.registrant_name.as_str(), hit.filing_number.as_str()),
            ("a.com", "Acme", "X123")
        );
    }

    #[test]
    fn test_cached_failure_is_refetched() {
        let mut cache = CacheStore::new();
        cache.put(DomainRecord::new("b.com", 403, "Unauthorized", ""));

        let lookup = FakeLookup::default().answer("b.com", 200, &filed("Beta", "B1"));
        let mut reconciler = Reconciler::new(lookup, Duration::ZERO);
        let outcome = reconciler.reconcile(&domains(&["b.com"]), &mut cache);

        assert_eq!(reconciler.into_lookup().calls, vec!["b.com"]);
        assert!(cache.get("b.com").unwrap().is_reusable());
        assert_eq!(outcome.stats.api_calls, 1);
        assert_eq!(outcome.success[0].registrant_name, "Beta");
    }

    #[test]
    fn test_no_filing_answer_is_cached_and_retried_next_run() {
        let mut cache = CacheStore::new();
        let lookup = FakeLookup::default().answer("c.com", 200, r#"{"code":0,"msg":"none"}"#);
        let mut reconciler = Reconciler::new(lookup, Duration::ZERO);

        let first = reconciler.reconcile(&domains(&["c.com"]), &mut cache);
        assert!(first.success.is_empty());
        assert_eq!(first.stats.failed_calls, 0);
        assert!(cache.get("c.com").unwrap().transport_ok);

        reconciler.reconcile(&domains(&["c.com"]), &mut cache);
        assert_eq!(reconciler.into_lookup().calls, vec!["c.com", "c.com"]);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut cache = CacheStore::new();
        let lookup = FakeLookup::default()
            .answer("a.com", 200, &filed("Acme", "X123"))
            .answer("b.com", 200, &filed("Beta", "B1"));
        let list = domains(&["a.com", "b.com"]);

        let mut first = Reconciler::new(lookup, Duration::ZERO);
        first.reconcile(&list, &mut cache);
        let after_first: Vec<DomainRecord> = cache.records().cloned().collect();

        let mut second = Reconciler::new(FakeLookup::default(), Duration::ZERO);
        let outcome = second.reconcile(&list, &mut cache);

        assert!(second.into_lookup().calls.is_empty());
        assert_eq!(outcome.stats.cache_hits, 2);
        assert_eq!(cache.records().cloned().collect::<Vec<_>>(), after_first);
    }

    #[test]
    fn test_duplicates_and_blanks() {
        let mut cache = CacheStore::new();
        let lookup = FakeLookup::default().answer("a.com", 500, "upstream error");
        let mut reconciler = Reconciler::new(lookup, Duration::ZERO);

        let outcome = reconciler.reconcile(&domains(&["a.com", "", "N/A", "a.com"]), &mut cache);

        assert_eq!(reconciler.into_lookup().calls, vec!["a.com", "N/A"]);
        assert_eq!(outcome.stats.rows, 4);
        assert_eq!(outcome.stats.unique_domains, 2);
        assert_eq!(outcome.stats.failed_calls, 2);
        assert!(cache.get("").is_none());
        assert_eq!(cache.get("N/A").unwrap().status_code, -1);
    }

    #[test]
    fn test_success_list_includes_records_outside_this_run() {
        let mut cache = CacheStore::new();
        cache.put(DomainRecord::new("old.com", 200, "", filed("Old", "O1")));
        let lookup = FakeLookup::default().answer("new.com", 200, &filed("New", "N1"));

        let outcome =
            Reconciler::new(lookup, Duration::ZERO).reconcile(&domains(&["new.com"]), &mut cache);

        let names: Vec<&str> = outcome.success.iter().map(|s| s.domain.as_str()).collect();
        assert_eq!(names, vec!["old.com", "new.com"]);
    }

    #[test]
    fn test_pending() {
        let mut cache = CacheStore::new();
        cache.put(DomainRecord::new("a.com", 200, "", filed("Acme", "X123")));
        cache.put(DomainRecord::new("b.com", 403, "", ""));

        let list = domains(&["a.com", "b.com", "", "c.com", "b.com"]);
        assert_eq!(pending(&list, &cache), vec!["b.com", "c.com"]);
    }
}
