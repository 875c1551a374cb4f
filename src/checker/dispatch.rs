// src/checker/dispatch.rs
// =============================================================================
// This module fans a list of links out into concurrent classification tasks
// and fans the results back in through a single channel.
//
// How it works:
// 1. One tokio task is spawned per link
// 2. A semaphore caps how many of them may probe at the same time
// 3. Every task sends exactly one ClassifiedLink into a bounded mpsc channel
// 4. A completion counter starts at the number of links; each task
//    decrements it when it ends (even if it panics - the decrement lives in
//    a Drop guard)
// 5. A monitor task waits for the counter to hit zero, then closes the
//    channel. The receiver sees `None` only after every result is queued.
//
// Who closes the channel?
// - Only the monitor. Workers get a *weak* sender, which can't keep the
//   channel open and can't close it. The monitor holds the one strong
//   sender and drops it exactly once.
//
// Cancellation:
// - A CancellationToken is shared with every task. Once cancelled, tasks
//   that are still waiting for a permit or probing give up immediately and
//   report their link as unreachable, so the report stays complete.
// =============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt; // catch_unwind() on futures
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::classify::{ClassifiedLink, Classifier};
use crate::page::BaseOrigin;

/// Default number of probes allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Capacity of the result channel. Workers wait when the consumer lags.
const RESULT_BUFFER: usize = 64;

const CANCELLED: &str = "probe cancelled";
const PANICKED: &str = "probe task panicked";

/// Spawns classification work and hands back the result stream.
pub struct Dispatcher {
    classifier: Arc<dyn Classifier>,
    limit: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl Dispatcher {
    // Creates a dispatcher
    //
    // Parameters:
    //   classifier: what to run for every link (HttpClassifier in production)
    //   concurrency: max probes in flight; 0 is treated as 1
    //   cancel: token that stops all outstanding work when cancelled
    pub fn new(classifier: Arc<dyn Classifier>, concurrency: usize, cancel: CancellationToken) -> Self {
        Self {
            classifier,
            limit: Arc::new(Semaphore::new(concurrency.max(1))),
            cancel,
        }
    }

    // Starts classifying every link and returns the receiving end of the
    // result stream
    //
    // Must be called from inside a tokio runtime. The receiver yields one
    // ClassifiedLink per input link, in completion order, then None.
    pub fn dispatch(&self, links: Vec<String>, origin: &BaseOrigin) -> mpsc::Receiver<ClassifiedLink> {
        let (results, receiver) = mpsc::channel(RESULT_BUFFER);

        if links.is_empty() {
            debug!("no links to classify, closing result stream");
            return receiver;
        }

        info!(links = links.len(), "dispatching link probes");

        let completion = Arc::new(Completion::new(links.len()));
        let origin = Arc::new(origin.clone());

        for link in links {
            let worker = Worker {
                done: CompletionGuard(Arc::clone(&completion)),
                link,
                origin: Arc::clone(&origin),
                classifier: Arc::clone(&self.classifier),
                limit: Arc::clone(&self.limit),
                cancel: self.cancel.clone(),
                results: results.downgrade(),
            };
            tokio::spawn(worker.run());
        }

        tokio::spawn(monitor(completion, results));

        receiver
    }
}

// Waits for every worker, then drops the last strong sender
async fn monitor(completion: Arc<Completion>, results: mpsc::Sender<ClassifiedLink>) {
    completion.wait().await;
    debug!("all link tasks finished, closing result stream");
    drop(results);
}

// Everything one task needs to classify one link
struct Worker {
    done: CompletionGuard,
    link: String,
    origin: Arc<BaseOrigin>,
    classifier: Arc<dyn Classifier>,
    limit: Arc<Semaphore>,
    cancel: CancellationToken,
    results: mpsc::WeakSender<ClassifiedLink>,
}

impl Worker {
    async fn run(self) {
        let Worker {
            done,
            link,
            origin,
            classifier,
            limit,
            cancel,
            results,
        } = self;
        // Declared first so it drops last: the sender below is gone before
        // the counter moves
        let _done = done;

        let classified = tokio::select! {
            biased;
            _ = cancel.cancelled() => ClassifiedLink::unprobed(&link, &origin, CANCELLED),
            classified = classify_with_permit(&*classifier, &limit, &link, &origin) => classified,
        };

        // The monitor can't have dropped the strong sender yet: our guard is
        // still holding the counter above zero
        let Some(sender) = results.upgrade() else {
            warn!(link = %link, "result stream closed before task finished");
            return;
        };

        if sender.send(classified).await.is_err() {
            debug!(link = %link, "result receiver dropped, discarding result");
        }
    }
}

async fn classify_with_permit(
    classifier: &dyn Classifier,
    limit: &Semaphore,
    link: &str,
    origin: &BaseOrigin,
) -> ClassifiedLink {
    // The permit is released when this function returns, before the send
    let _permit = match limit.acquire().await {
        Ok(permit) => permit,
        Err(_) => return ClassifiedLink::unprobed(link, origin, CANCELLED),
    };

    match AssertUnwindSafe(classifier.classify(link, origin)).catch_unwind().await {
        Ok(classified) => classified,
        Err(_) => {
            warn!(link, "classifier panicked, recording link as unreachable");
            ClassifiedLink::unprobed(link, origin, PANICKED)
        }
    }
}

// Countdown of unfinished tasks plus a wake-up for the monitor
struct Completion {
    remaining: AtomicUsize,
    finished: Notify,
}

impl Completion {
    fn new(tasks: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(tasks),
            finished: Notify::new(),
        }
    }

    fn finish_one(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            // notify_one stores a permit if the monitor isn't waiting yet
            self.finished.notify_one();
        }
    }

    async fn wait(&self) {
        while self.remaining.load(Ordering::Acquire) > 0 {
            self.finished.notified().await;
        }
    }
}

// Decrements the counter when a task ends, however it ends
struct CompletionGuard(Arc<Completion>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a weak sender?
//    - An mpsc channel closes when the last Sender is dropped
//    - If every worker held a normal Sender, "the last one to finish" would
//      close the channel - whichever that happens to be
//    - WeakSender doesn't count towards keeping the channel open, so the
//      monitor's single Sender decides when it closes
//
// 2. What is a Drop guard?
//    - A small struct whose Drop impl does some cleanup
//    - Drop runs when the value goes out of scope, including during a panic
//    - That's how the completion counter always reaches zero
//
// 3. What does tokio::select! with `biased;` do?
//    - Polls the branches top to bottom instead of in random order
//    - Here it means "check for cancellation before doing more work"
//
// 4. Why AssertUnwindSafe?
//    - catch_unwind wants proof that nothing observes broken state after a
//      panic. Our classifier future owns nothing we read afterwards, so we
//      assert it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::classify::{is_login_candidate, placement};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;
    use url::Url;

    fn origin() -> BaseOrigin {
        BaseOrigin::from_page_url(&Url::parse("http://site.test/").unwrap()).unwrap()
    }

    fn links(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/page/{}", i)).collect()
    }

    async fn drain(mut receiver: mpsc::Receiver<ClassifiedLink>) -> Vec<ClassifiedLink> {
        let collect = async {
            let mut all = Vec::new();
            while let Some(link) = receiver.recv().await {
                all.push(link);
            }
            all
        };
        tokio::time::timeout(Duration::from_secs(10), collect)
            .await
            .expect("result stream never closed")
    }

    fn dispatcher(classifier: impl Classifier + 'static, concurrency: usize) -> Dispatcher {
        Dispatcher::new(Arc::new(classifier), concurrency, CancellationToken::new())
    }

    // Classifies without networking; links listed in `down` are unreachable.
    // Each call sleeps a little, longer for lower indices, so completion
    // order differs from input order.
    struct FakeClassifier {
        down: HashSet<String>,
    }

    #[async_trait]
    impl Classifier for FakeClassifier {
        async fn classify(&self, link: &str, origin: &BaseOrigin) -> ClassifiedLink {
            let index: u64 = link.rsplit('/').next().and_then(|n| n.parse().ok()).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50u64.saturating_sub(index))).await;
            ClassifiedLink {
                url: link.to_string(),
                kind: placement(link, origin),
                reachable: !self.down.contains(link),
                is_login_candidate: is_login_candidate(link),
                detail: None,
            }
        }
    }

    struct CountingClassifier {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for Arc<CountingClassifier> {
        async fn classify(&self, link: &str, origin: &BaseOrigin) -> ClassifiedLink {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ClassifiedLink::unprobed(link, origin, "counted")
        }
    }

    struct PanickingClassifier;

    #[async_trait]
    impl Classifier for PanickingClassifier {
        async fn classify(&self, link: &str, origin: &BaseOrigin) -> ClassifiedLink {
            if link.ends_with("/3") {
                panic!("boom");
            }
            ClassifiedLink {
                url: link.to_string(),
                kind: placement(link, origin),
                reachable: true,
                is_login_candidate: false,
                detail: None,
            }
        }
    }

    struct HangingClassifier;

    #[async_trait]
    impl Classifier for HangingClassifier {
        async fn classify(&self, _link: &str, _origin: &BaseOrigin) -> ClassifiedLink {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_empty_input_closes_immediately() {
        let receiver = dispatcher(FakeClassifier { down: HashSet::new() }, 4).dispatch(Vec::new(), &origin());
        assert!(drain(receiver).await.is_empty());
    }

    #[tokio::test]
    async fn test_every_link_classified_exactly_once() {
        let input = links(40);
        let down: HashSet<String> = input.iter().step_by(3).cloned().collect();
        let expected_down = down.len();

        let receiver = dispatcher(FakeClassifier { down }, 8).dispatch(input.clone(), &origin());
        let results = drain(receiver).await;

        assert_eq!(results.len(), input.len());
        let seen: HashSet<&str> = results.iter().map(|l| l.url.as_str()).collect();
        let wanted: HashSet<&str> = input.iter().map(String::as_str).collect();
        assert_eq!(seen, wanted);
        assert_eq!(results.iter().filter(|l| !l.reachable).count(), expected_down);
    }

    #[tokio::test]
    async fn test_all_probes_failing_still_completes() {
        let input = links(12);
        let down: HashSet<String> = input.iter().cloned().collect();

        let receiver = dispatcher(FakeClassifier { down }, 50).dispatch(input, &origin());
        let results = drain(receiver).await;

        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|l| !l.reachable));
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let classifier = Arc::new(CountingClassifier {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let receiver = dispatcher(Arc::clone(&classifier), 3).dispatch(links(20), &origin());
        assert_eq!(drain(receiver).await.len(), 20);

        let peak = classifier.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency was {}", peak);
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn test_panicking_task_still_reports_its_link() {
        let receiver = dispatcher(PanickingClassifier, 4).dispatch(links(6), &origin());
        let results = drain(receiver).await;

        assert_eq!(results.len(), 6);
        let crashed = results.iter().find(|l| l.url == "/page/3").unwrap();
        assert!(!crashed.reachable);
        assert_eq!(crashed.detail.as_deref(), Some(PANICKED));
        assert_eq!(results.iter().filter(|l| l.reachable).count(), 5);
    }

    #[tokio::test]
    async fn test_cancellation_stops_outstanding_probes() {
        let cancel = CancellationToken::new();
        let dispatcher = Dispatcher::new(Arc::new(HangingClassifier), 2, cancel.clone());
        let receiver = dispatcher.dispatch(links(5), &origin());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let results = drain(receiver).await;
        assert_eq!(results.len(), 5);
        assert!(results
            .iter()
            .all(|l| !l.reachable && l.detail.as_deref() == Some(CANCELLED)));
    }

    #[test]
    fn test_completion_guard_counts_down() {
        let completion = Arc::new(Completion::new(2));
        drop(CompletionGuard(Arc::clone(&completion)));
        assert_eq!(completion.remaining.load(Ordering::SeqCst), 1);
        drop(CompletionGuard(Arc::clone(&completion)));
        assert_eq!(completion.remaining.load(Ordering::SeqCst), 0);
    }
}
