use super::*;
use std::sync::mpsc as std_mpsc;
use std::time::Instant;

use tokio::sync::oneshot;

#[test]
fn test_context_kind_display() {
    assert_eq!(ContextKind::Work.to_string(), "work");
    assert_eq!(ContextKind::Meta.to_string(), "meta");
}

#[test]
fn test_current_outside_runtime() {
    let result = Scheduler::current();
    assert!(matches!(result, Err(CoordinatorError::NoRuntime(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_current_kinds() {
    let scheduler = Scheduler::current().unwrap();
    assert_eq!(scheduler.work().kind(), ContextKind::Work);
    assert_eq!(scheduler.meta().kind(), ContextKind::Meta);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_work_returns_value() {
    let scheduler = Scheduler::current().unwrap();
    let value = scheduler.run_on_work_context(|| 21 * 2).await.unwrap();
    assert_eq!(value, 42);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocked_work_does_not_stall_meta() {
    let scheduler = Scheduler::current().unwrap();
    let (release_tx, release_rx) = std_mpsc::channel::<()>();

    // Blocks a work thread until the meta callback releases it.
    let work = scheduler.run_on_work_context(move || {
        release_rx
            .recv_timeout(Duration::from_secs(5))
            .is_ok()
    });

    let meta = scheduler.run_on_meta_context(move || {
        release_tx.send(()).unwrap();
    });

    meta.await.unwrap();
    assert!(work.await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_after_waits_for_delay() {
    let scheduler = Scheduler::current().unwrap();
    let (tx, rx) = oneshot::channel();
    let start = Instant::now();

    scheduler.run_on_meta_context_after(Duration::from_millis(80), move || {
        let _ = tx.send(Instant::now());
    });

    let fired_at = rx.await.unwrap();
    assert!(fired_at.duration_since(start) >= Duration::from_millis(80));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timers_do_not_block_each_other() {
    let scheduler = Scheduler::current().unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let slow_tx = tx.clone();
    scheduler.run_on_meta_context_after(Duration::from_millis(400), move || {
        let _ = slow_tx.send("slow");
    });
    scheduler.run_on_meta_context_after(Duration::from_millis(20), move || {
        let _ = tx.send("fast");
    });

    assert_eq!(rx.recv().await, Some("fast"));
    assert_eq!(rx.recv().await, Some("slow"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_work_run_after() {
    let scheduler = Scheduler::current().unwrap();
    let (tx, rx) = oneshot::channel();
    let start = Instant::now();

    scheduler
        .work()
        .run_after(Duration::from_millis(30), move || {
            let _ = tx.send(std::thread::current().name().map(str::to_string));
        })
        .await
        .unwrap();

    assert!(rx.await.is_ok());
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_scheduler_runtime_block_on() {
    let runtime = SchedulerRuntime::build(&RunLoopConfig::default()).unwrap();
    let scheduler = runtime.scheduler();

    let value = runtime.block_on(async move {
        let doubled = scheduler.run_on_work_context(|| 2 * 8).await.unwrap();
        scheduler
            .run_on_meta_context(move || doubled + 1)
            .await
            .unwrap()
    });

    assert_eq!(value, 17);
    runtime.shutdown();
}

#[test]
fn test_scheduler_runtime_rejects_zero_threads() {
    let config = RunLoopConfig {
        meta_threads: 0,
        ..Default::default()
    };
    assert!(matches!(
        SchedulerRuntime::build(&config),
        Err(CoordinatorError::ConfigError(_))
    ));
}
