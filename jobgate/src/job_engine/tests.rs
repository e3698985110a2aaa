use crate::config::{Config, ExecutionMode};
use crate::job_engine::closure_job::{ClosureJob, FutureJob};
use crate::job_engine::dispatcher::Dispatcher;
use crate::job_engine::job::Job;

use async_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(10);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Simple shared log of job names
fn shared_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn logging_job(name: &str, log: &Arc<Mutex<Vec<String>>>) -> ClosureJob {
    let log = log.clone();
    let name = name.to_string();
    ClosureJob::new(name.clone(), move || log.lock().unwrap().push(name.clone()))
}

/// Lets a test keep a job running until it decides otherwise.
struct Hold {
    started_rx: Receiver<()>,
    release_tx: Sender<()>,
}

impl Hold {
    fn wait_started(&self) {
        self.started_rx.recv_blocking().expect("held job never started");
    }

    fn release(&self) {
        let _ = self.release_tx.send_blocking(());
    }
}

fn held_job(name: &str, log: &Arc<Mutex<Vec<String>>>) -> (ClosureJob, Hold) {
    let (started_tx, started_rx) = async_channel::bounded(1);
    let (release_tx, release_rx) = async_channel::bounded(1);
    let log = log.clone();
    let name = name.to_string();
    let job = ClosureJob::new(name.clone(), move || {
        let _ = started_tx.send_blocking(());
        let _ = release_rx.recv_blocking();
        log.lock().unwrap().push(name.clone());
    });
    (
        job,
        Hold {
            started_rx,
            release_tx,
        },
    )
}

//
// 1. Ordering
//
#[test]
fn test_single_slot_runs_in_submission_order() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(1);
    let log = shared_log();

    for i in 0..10 {
        dispatcher.submit(logging_job(&format!("job-{i}"), &log));
    }

    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(
        *log.lock().unwrap(),
        (0..10).map(|i| format!("job-{i}")).collect::<Vec<_>>()
    );
}

#[test]
fn test_ids_are_strictly_increasing() {
    let dispatcher = Dispatcher::with_max_concurrency(2);
    let ids: Vec<_> = (0..20)
        .map(|_| dispatcher.submit(ClosureJob::new("noop", || {})))
        .collect();

    assert_eq!(ids[0].get(), 1);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    dispatcher.wait_all();
}

//
// 2. Concurrency bound
//
#[test]
fn test_never_more_than_max_bodies_at_once() {
    init_logger();
    for mode in [ExecutionMode::Workers, ExecutionMode::Inline] {
        let dispatcher: Arc<Dispatcher<ClosureJob>> =
            Arc::new(Dispatcher::new(Config::new(2).with_mode(mode)));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let submitters: Vec<_> = (0..4)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                let active = active.clone();
                let peak = peak.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        let active = active.clone();
                        let peak = peak.clone();
                        dispatcher.submit(ClosureJob::new("measure", move || {
                            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(2));
                            active.fetch_sub(1, Ordering::SeqCst);
                        }));
                    }
                })
            })
            .collect();
        for submitter in submitters {
            submitter.join().unwrap();
        }

        assert!(dispatcher.wait_all_timeout(TIMEOUT));
        assert!(peak.load(Ordering::SeqCst) <= 2, "mode {mode:?}");
        assert_eq!(dispatcher.stats().completed, 20);
    }
}

//
// 3. FIFO with skip
//
#[test]
fn test_next_pick_skips_the_running_job() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(1);
    let log = shared_log();

    let (a, hold_a) = held_job("A", &log);
    let id_a = dispatcher.submit(a);
    hold_a.wait_started();

    let id_b = dispatcher.submit(logging_job("B", &log));
    let id_c = dispatcher.submit(logging_job("C", &log));

    assert_ne!(dispatcher.next_eligible(), Some(id_a));
    assert_eq!(dispatcher.next_eligible(), Some(id_b));
    assert_eq!(dispatcher.running_count(), 1);
    assert_eq!(dispatcher.pending_count(), 3);
    assert_eq!(dispatcher.queued_count(), 2);

    hold_a.release();
    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
    assert!(id_b < id_c);
}

//
// 4. Cancellation
//
#[test]
fn test_cancel_queued_job_returns_payload() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(1);
    let log = shared_log();

    let (a, hold_a) = held_job("A", &log);
    let id_a = dispatcher.submit(a);
    hold_a.wait_started();
    let id_b = dispatcher.submit(logging_job("B", &log));
    assert_eq!(dispatcher.pending_count(), 2);

    let cancelled = dispatcher.cancel(id_b).expect("B is queued");
    assert_eq!(cancelled.desc(), "B");
    assert_eq!(dispatcher.pending_count(), 1);

    assert!(dispatcher.cancel(id_b).is_none(), "already removed");
    assert!(dispatcher.cancel(id_a).is_none(), "running jobs stay");

    hold_a.release();
    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*log.lock().unwrap(), vec!["A"]);
    assert!(dispatcher.cancel(id_a).is_none(), "finished");

    let stats = dispatcher.stats();
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.completed, 1);
}

//
// 5. Join
//
#[test]
fn test_wait_all_without_jobs_returns_immediately() {
    let dispatcher: Dispatcher<ClosureJob> = Dispatcher::with_max_concurrency(3);
    let started = Instant::now();
    dispatcher.wait_all();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_wait_all_leaves_nothing_pending_or_running() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(3);
    for _ in 0..30 {
        dispatcher.submit(ClosureJob::new("sleep", || {
            thread::sleep(Duration::from_millis(1))
        }));
    }

    dispatcher.wait_all();
    assert_eq!(dispatcher.pending_count(), 0);
    assert_eq!(dispatcher.running_count(), 0);
    assert!(dispatcher.stats().is_idle());

    // a second wave on the same dispatcher
    for _ in 0..5 {
        dispatcher.submit(ClosureJob::new("noop", || {}));
    }
    dispatcher.wait_all();
    assert_eq!(dispatcher.stats().completed, 35);
}

#[test]
fn test_running_count_is_zero_after_every_wait_all() {
    for mode in [ExecutionMode::Workers, ExecutionMode::Inline] {
        let dispatcher = Dispatcher::new(Config::new(2).with_mode(mode));
        assert_eq!(dispatcher.mode(), mode);

        for round in 0..2_000 {
            for _ in 0..4 {
                dispatcher.submit(ClosureJob::new("noop", || {}));
            }
            dispatcher.wait_all();
            assert_eq!(dispatcher.pending_count(), 0, "round {round}, mode {mode:?}");
            assert_eq!(dispatcher.running_count(), 0, "round {round}, mode {mode:?}");
            assert_eq!(dispatcher.stats().running, 0, "round {round}, mode {mode:?}");
        }
        assert_eq!(dispatcher.stats().completed, 8_000);
    }
}

#[test]
fn test_running_count_tracks_executing_bodies() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(2);
    let log = shared_log();
    let (a, hold_a) = held_job("A", &log);
    let (b, hold_b) = held_job("B", &log);

    dispatcher.submit(a);
    dispatcher.submit(b);
    hold_a.wait_started();
    hold_b.wait_started();
    dispatcher.submit(logging_job("C", &log));

    assert_eq!(dispatcher.running_count(), 2);
    assert_eq!(dispatcher.queued_count(), 1);
    let stats = dispatcher.stats();
    assert_eq!((stats.pending, stats.queued, stats.running), (3, 1, 2));

    hold_a.release();
    hold_b.release();
    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(dispatcher.running_count(), 0);
}

//
// 6. Inline execution
//
#[test]
fn test_inline_submit_runs_before_returning() {
    init_logger();
    let dispatcher = Dispatcher::new(Config::new(1).with_mode(ExecutionMode::Inline));
    let log = shared_log();

    dispatcher.submit(logging_job("A", &log));
    assert_eq!(*log.lock().unwrap(), vec!["A"]);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_inline_cascade_runs_on_the_slot_holder() {
    init_logger();
    let dispatcher: Arc<Dispatcher<ClosureJob>> = Arc::new(Dispatcher::new(
        Config::new(1).with_mode(ExecutionMode::Inline),
    ));
    let log = shared_log();
    let (a, hold_a) = held_job("A", &log);

    let holder = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || {
            dispatcher.submit(a);
            thread::current().id()
        })
    };
    hold_a.wait_started();

    // no slot free: returns at once, B stays queued
    let b_thread = Arc::new(Mutex::new(None));
    let b = {
        let b_thread = b_thread.clone();
        ClosureJob::new("B", move || {
            *b_thread.lock().unwrap() = Some(thread::current().id())
        })
    };
    let id_b = dispatcher.submit(b);
    assert_eq!(dispatcher.queued_count(), 1);
    assert!(!dispatcher.run_now(id_b), "no slot is free");

    hold_a.release();
    let holder_thread = holder.join().unwrap();
    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*b_thread.lock().unwrap(), Some(holder_thread));
}

#[test]
fn test_run_now_ignores_unknown_ids() {
    let dispatcher = Dispatcher::new(Config::new(1).with_mode(ExecutionMode::Inline));
    let id = dispatcher.submit(ClosureJob::new("done", || {}));
    assert!(!dispatcher.run_now(id), "already finished");
}

//
// 7. Failure handling
//
#[test]
fn test_job_panic_does_not_stop_the_dispatcher() {
    init_logger();
    let dispatcher: Dispatcher<Box<dyn Job>> = Dispatcher::with_max_concurrency(1);
    let log = shared_log();

    dispatcher.submit(Box::new(ClosureJob::new("boom", || {
        panic!("intentional test panic")
    })));
    dispatcher.submit(Box::new(logging_job("after", &log)));

    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*log.lock().unwrap(), vec!["after"]);
    let stats = dispatcher.stats();
    assert_eq!(stats.panicked, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.running, 0);
}

//
// 8. Shutdown
//
#[test]
fn test_drop_discards_queued_jobs() {
    init_logger();
    let dispatcher = Dispatcher::with_max_concurrency(1);
    let log = shared_log();
    let (a, hold_a) = held_job("A", &log);

    dispatcher.submit(a);
    hold_a.wait_started();
    let marker = Arc::new(());
    let queued = {
        let marker = marker.clone();
        let log = log.clone();
        ClosureJob::new("queued", move || {
            let _marker = &marker;
            log.lock().unwrap().push("queued".into());
        })
    };
    dispatcher.submit(queued);

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        hold_a.release();
    });
    drop(dispatcher);
    releaser.join().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["A"]);
    assert_eq!(Arc::strong_count(&marker), 1, "queued payload was dropped");
}

#[test]
fn test_shutdown_waits_for_admitted_jobs() {
    let dispatcher = Dispatcher::with_max_concurrency(2);
    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let count = count.clone();
        dispatcher.submit(ClosureJob::new("count", move || {
            count.fetch_add(1, Ordering::SeqCst);
        }));
    }
    dispatcher.shutdown();
    assert_eq!(count.load(Ordering::SeqCst), 50);
}

#[test]
fn test_job_may_drop_the_last_dispatcher_handle() {
    init_logger();
    let dispatcher: Arc<Dispatcher<ClosureJob>> = Arc::new(Dispatcher::with_max_concurrency(2));
    let owner: Arc<Mutex<Option<Arc<Dispatcher<ClosureJob>>>>> =
        Arc::new(Mutex::new(Some(dispatcher.clone())));
    let (go_tx, go_rx) = async_channel::bounded::<()>(1);
    let (done_tx, done_rx) = async_channel::bounded(1);

    let job_owner = owner.clone();
    dispatcher.submit(ClosureJob::new("last owner", move || {
        let _ = go_rx.recv_blocking();
        // runs Drop on a worker thread, which must not join itself
        drop(job_owner.lock().unwrap().take());
        let _ = done_tx.send_blocking(thread::current().name().map(str::to_string));
    }));

    drop(dispatcher);
    go_tx.send_blocking(()).unwrap();

    let worker = done_rx.recv_blocking().expect("job body returned");
    assert!(worker.is_some_and(|name| name.starts_with("jobgate-worker-")));
    assert!(owner.lock().unwrap().is_none());
}

//
// 9. Mixed and nested jobs
//
#[test]
fn test_boxed_dispatcher_accepts_mixed_jobs() {
    let dispatcher: Dispatcher<Box<dyn Job>> = Dispatcher::with_max_concurrency(1);
    let log = shared_log();

    dispatcher.submit(Box::new(logging_job("closure", &log)));
    let async_log = log.clone();
    dispatcher.submit(Box::new(FutureJob::new("future", move || {
        let log = async_log.clone();
        async move {
            log.lock().unwrap().push("future".into());
        }
    })));

    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*log.lock().unwrap(), vec!["closure", "future"]);
}

#[test]
fn test_job_may_submit_more_jobs() {
    init_logger();
    let dispatcher: Arc<Dispatcher<ClosureJob>> = Arc::new(Dispatcher::with_max_concurrency(1));
    let log = shared_log();

    let inner_log = log.clone();
    let inner_dispatcher = dispatcher.clone();
    dispatcher.submit(ClosureJob::new("outer", move || {
        inner_log.lock().unwrap().push("outer".into());
        inner_dispatcher.submit(logging_job("inner", &inner_log));
    }));

    assert!(dispatcher.wait_all_timeout(TIMEOUT));
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
}

#[test]
fn test_stats_serialize_to_json() {
    let dispatcher = Dispatcher::with_max_concurrency(4);
    dispatcher.submit(ClosureJob::new("noop", || {}));
    dispatcher.wait_all();

    let json = serde_json::to_value(dispatcher.stats()).unwrap();
    assert_eq!(json["max_concurrency"], 4);
    assert_eq!(json["submitted"], 1);
    assert_eq!(json["completed"], 1);
    assert_eq!(json["pending"], 0);
}
