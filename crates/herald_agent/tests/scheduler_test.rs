//! Control loop behavior across cycles.

mod support;

use herald_agent::{
    CycleOutcome, OverflowPolicy, Phase, QualityConfig, QualityGate, ReactiveSource,
    ScheduleConfig, Scheduler,
};
use herald_core::{AccountPostBuilder, PostId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use support::{
    Fallback, LIVELY, RecordingPublisher, RecordingSleeper, ScriptedBackend, StaticReader,
    generator,
};
use tokio_util::sync::CancellationToken;

fn timing() -> ScheduleConfig {
    ScheduleConfig {
        min_sleep_secs: 7200,
        max_sleep_secs: 14400,
        rejection_pause_secs: 10,
        error_pause_secs: 300,
    }
}

#[tokio::test]
async fn test_successful_cycle_publishes_then_sleeps_in_window() {
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_gate(QualityGate::new(QualityConfig::banter()))
    .with_timing(timing())
    .with_seed(42);

    let outcome = scheduler.run_cycle().await;

    let CycleOutcome::Published { receipt, next_delay } = &outcome else {
        panic!("expected Published, got {outcome:?}");
    };
    assert_eq!(receipt.platform, "recording");
    assert!((7200..=14400).contains(&next_delay.as_secs()));
    assert_eq!(sleeper.sleeps(), vec![*next_delay]);
    assert_eq!(publisher.posts().len(), 1);
    assert!(publisher.posts()[0].0.starts_with(LIVELY));
    assert_eq!(scheduler.phase(), Phase::Idle);
    assert!(scheduler.state().next_action_at().is_some());
    assert_eq!(scheduler.stats().published(), 1);
}

#[tokio::test]
async fn test_fatal_backend_five_cycles_five_error_pauses() {
    let backend = ScriptedBackend::always(Fallback::Fatal);
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let mut scheduler = Scheduler::new(
        generator(backend.clone(), sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_timing(timing())
    .with_seed(1);

    for _ in 0..5 {
        let outcome = scheduler.run_cycle().await;
        assert!(
            matches!(outcome, CycleOutcome::ErrorPause { pause, .. } if pause == Duration::from_secs(300)),
            "unexpected outcome {outcome:?}"
        );
    }

    assert_eq!(backend.calls(), 5);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(300); 5]);
    assert!(publisher.posts().is_empty());
    assert_eq!(scheduler.stats().error_pauses(), 5);
}

#[tokio::test]
async fn test_exhausted_generation_pauses_after_backoff() {
    let backend = ScriptedBackend::always(Fallback::RateLimited);
    let sleeper = RecordingSleeper::new();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 3, OverflowPolicy::Resample),
        RecordingPublisher::new(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_timing(timing());

    let outcome = scheduler.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::ErrorPause { .. }));
    let expected: Vec<Duration> = [60, 120, 300].into_iter().map(Duration::from_secs).collect();
    assert_eq!(sleeper.sleeps(), expected);
}

#[tokio::test]
async fn test_rejected_post_pauses_briefly_without_publishing() {
    let flat = "This sentence has plenty of words but nothing lively in it at all";
    let backend = ScriptedBackend::always(Fallback::Text(flat.to_string()));
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_gate(QualityGate::new(QualityConfig::banter()))
    .with_timing(timing());

    let outcome = scheduler.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Rejected { pause, .. } if pause == Duration::from_secs(10)));
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(10)]);
    assert!(publisher.posts().is_empty());
    assert_eq!(scheduler.stats().rejections(), 1);
}

#[tokio::test]
async fn test_publish_failure_still_sleeps_normally() {
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::failing();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_timing(timing())
    .with_seed(3);

    let outcome = scheduler.run_cycle().await;

    let CycleOutcome::PublishFailed { next_delay } = &outcome else {
        panic!("expected PublishFailed, got {outcome:?}");
    };
    assert!((7200..=14400).contains(&next_delay.as_secs()));
    assert_eq!(publisher.posts().len(), 1);
    assert_eq!(scheduler.stats().publish_failures(), 1);
}

#[tokio::test]
async fn test_run_stops_when_shutdown_interrupts_sleep() {
    let token = CancellationToken::new();
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::cancelling_after(3, token.clone());
    let publisher = RecordingPublisher::new();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        token,
    )
    .with_timing(timing())
    .with_seed(8);

    scheduler.run().await;

    assert_eq!(scheduler.phase(), Phase::Stopped);
    assert_eq!(publisher.posts().len(), 3);
    assert_eq!(sleeper.sleeps().len(), 3);
}

#[tokio::test]
async fn test_cancelled_before_cycle_does_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let mut scheduler = Scheduler::new(
        generator(backend.clone(), sleeper.clone(), 5, OverflowPolicy::Resample),
        RecordingPublisher::new(),
        sleeper.clone(),
        token,
    );

    assert!(scheduler.run_cycle().await.is_stopped());
    assert_eq!(backend.calls(), 0);
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(scheduler.phase(), Phase::Stopped);
}

#[test]
fn test_next_delay_stays_in_window() {
    let timing = timing();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..1000 {
        let delay = timing.next_delay(&mut rng).as_secs();
        assert!((7200..=14400).contains(&delay), "delay {delay} out of range");
    }
}

#[tokio::test]
async fn test_execute_cycle_does_not_wait() {
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let mut scheduler = Scheduler::new(
        generator(backend, sleeper.clone(), 5, OverflowPolicy::Resample),
        RecordingPublisher::new(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_timing(timing());

    let outcome = scheduler.execute_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Published { .. }));
    assert!(outcome.wait().is_some());
    assert!(sleeper.sleeps().is_empty());
}

fn watched_posts() -> Vec<herald_core::AccountPost> {
    let at = |h: u32| {
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap()
    };
    vec![
        AccountPostBuilder::default()
            .id(PostId("10".to_string()))
            .text("Funding flipped negative while price held")
            .created_at(at(14))
            .like_count(50u64)
            .build()
            .unwrap(),
        AccountPostBuilder::default()
            .id(PostId("11".to_string()))
            .text("gm")
            .created_at(at(9))
            .like_count(2u64)
            .build()
            .unwrap(),
    ]
}

#[tokio::test]
async fn test_reactive_context_reaches_prompt_and_reply_target() {
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let reader = StaticReader::new(watched_posts());
    let mut scheduler = Scheduler::new(
        generator(backend.clone(), sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_reactive(ReactiveSource::new(
        reader.clone(),
        vec!["whale_watcher".to_string()],
        10,
        3,
        true,
    ))
    .with_timing(timing());

    scheduler.run_cycle().await;

    assert_eq!(reader.reads(), 1);
    let prompt = backend.requests()[0].messages[1].content.clone();
    assert!(prompt.contains("@whale_watcher"));
    assert!(prompt.contains("Funding flipped negative"));
    assert_eq!(publisher.posts()[0].1, Some(PostId("10".to_string())));
}

#[tokio::test]
async fn test_reactive_read_failure_is_not_fatal() {
    let backend = ScriptedBackend::always(Fallback::Text(LIVELY.to_string()));
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let mut scheduler = Scheduler::new(
        generator(backend.clone(), sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_reactive(ReactiveSource::new(
        StaticReader::failing(),
        vec!["whale_watcher".to_string()],
        10,
        3,
        true,
    ))
    .with_timing(timing());

    let outcome = scheduler.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Published { .. }));
    assert_eq!(publisher.posts()[0].1, None);
    assert!(!backend.requests()[0].messages[1].content.contains("Context from"));
}

#[tokio::test]
async fn test_rejection_retries_reuse_the_watched_account_read() {
    let flat = "This sentence has plenty of words but nothing lively in it at all";
    let backend = ScriptedBackend::new(
        vec![Ok(flat.to_string()), Ok(flat.to_string())],
        Fallback::Text(LIVELY.to_string()),
    );
    let sleeper = RecordingSleeper::new();
    let publisher = RecordingPublisher::new();
    let reader = StaticReader::new(watched_posts());
    let mut scheduler = Scheduler::new(
        generator(backend.clone(), sleeper.clone(), 5, OverflowPolicy::Resample),
        publisher.clone(),
        sleeper.clone(),
        CancellationToken::new(),
    )
    .with_gate(QualityGate::new(QualityConfig::banter()))
    .with_reactive(ReactiveSource::new(
        reader.clone(),
        vec!["whale_watcher".to_string()],
        10,
        3,
        true,
    ))
    .with_timing(timing());

    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Rejected { .. }));
    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Rejected { .. }));
    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Published { .. }));
    assert_eq!(reader.reads(), 1);
    for request in backend.requests() {
        assert!(request.messages[1].content.contains("@whale_watcher"));
    }
    assert_eq!(publisher.posts()[0].1, Some(PostId("10".to_string())));

    scheduler.run_cycle().await;
    assert_eq!(reader.reads(), 2);
}
