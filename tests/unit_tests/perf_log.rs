use femasm::perf_log::{EventStats, PerfLog, PerfLogError};
use std::time::Duration;

#[test]
fn nested_events_are_counted() {
    let mut log = PerfLog::new("nested");
    for _ in 0..3 {
        log.start_event("outer").unwrap();
        log.measure("inner", || ()).unwrap();
        log.measure("inner", || ()).unwrap();
        log.stop_event("outer").unwrap();
    }
    assert!(log.is_balanced());
    assert_eq!(log.n_calls("outer"), 3);
    assert_eq!(log.n_calls("inner"), 6);
    assert_eq!(log.n_calls("unknown"), 0);

    let outer = *log.event("outer").unwrap();
    let inner = *log.event("inner").unwrap();
    assert!(inner.total <= outer.total);
    // Only the outermost events contribute to the active time
    assert_eq!(log.active_time(), outer.total);

    let report = log.finish().unwrap();
    assert_eq!(report.label(), "nested");
    let names: Vec<&str> = report.events().iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
    assert_eq!(report.event("outer"), Some(&outer));
    assert!(report.active_time() <= report.alive_time());
}

#[test]
fn misuse_is_reported() {
    let mut log = PerfLog::new("misuse");
    assert_eq!(log.stop_event("a"), Err(PerfLogError::NotActive("a".to_string())));

    log.start_event("a").unwrap();
    assert_eq!(log.start_event("a"), Err(PerfLogError::AlreadyActive("a".to_string())));

    log.start_event("b").unwrap();
    assert_eq!(
        log.stop_event("a"),
        Err(PerfLogError::OutOfOrder {
            stopped: "a".to_string(),
            innermost: "b".to_string()
        })
    );
    assert_eq!(log.stop_event("c"), Err(PerfLogError::NotActive("c".to_string())));
    assert!(!log.is_balanced());
    assert_eq!(log.n_calls("a"), 0);

    assert_eq!(
        log.finish(),
        Err(PerfLogError::Unfinished(vec!["a".to_string(), "b".to_string()]))
    );
}

#[test]
fn measure_returns_the_closure_result() {
    let mut log = PerfLog::new("measure");
    let result: Result<u32, String> = log.measure("fails", || Err("failure".to_string())).unwrap();
    assert_eq!(result, Err("failure".to_string()));
    assert!(log.is_balanced());
    assert_eq!(log.n_calls("fails"), 1);

    // A nested measurement of an already active event fails before running the closure
    log.start_event("busy").unwrap();
    let mut ran = false;
    assert!(log.measure("busy", || ran = true).is_err());
    assert!(!ran);
    log.stop_event("busy").unwrap();
}

#[test]
fn merged_logs_are_combined() {
    let mut main = PerfLog::new("main");
    main.measure("a", || ()).unwrap();

    let mut worker = PerfLog::new("worker");
    worker.measure("a", || ()).unwrap();
    worker.measure("b", || ()).unwrap();
    let worker_active = worker.active_time();
    let main_active = main.active_time();

    main.merge(worker);
    assert_eq!(main.n_calls("a"), 2);
    assert_eq!(main.n_calls("b"), 1);
    assert_eq!(main.active_time(), main_active + worker_active);
}

#[test]
fn disabled_log_records_nothing() {
    let mut log = PerfLog::disabled();
    assert!(!log.is_enabled());
    log.start_event("a").unwrap();
    log.start_event("a").unwrap();
    log.stop_event("b").unwrap();
    assert_eq!(log.measure("c", || 42), Ok(42));
    assert!(log.is_balanced());
    assert_eq!(log.n_calls("c"), 0);

    let mut enabled = PerfLog::new("enabled");
    enabled.measure("a", || ()).unwrap();
    log.merge(enabled);
    assert_eq!(log.n_calls("a"), 0);
    assert!(log.finish().unwrap().events().is_empty());
}

#[test]
fn report_is_formatted_as_a_table() {
    let mut log = PerfLog::new("Matrix Assembly");
    log.measure("Ke", || ()).unwrap();
    log.measure("Fe", || ()).unwrap();
    log.measure("Fe", || ()).unwrap();
    let table = log.finish().unwrap().to_string();
    assert!(table.contains("| Matrix Assembly Performance: Alive time="));
    assert!(table.contains("Active time="));
    assert!(table.contains("nCalls"));
    assert!(table.contains("Totals:"));
    let fe_row = table.lines().find(|line| line.starts_with("| Fe ")).unwrap();
    assert!(fe_row.split_whitespace().any(|column| column == "2"));
}

#[test]
fn average_handles_call_counts_beyond_u32() {
    let stats = EventStats {
        calls: 1 << 32,
        total: Duration::from_secs(1 << 32),
    };
    assert_eq!(stats.average(), Duration::from_secs(1));
    assert_eq!(EventStats::default().average(), Duration::ZERO);
}
