//! Task grouping and repair-time arithmetic.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn record(id: &str, author: &str, message: &str, created_at: DateTime<Utc>) -> MtrRecord {
    MtrRecord {
        commit_id: id.to_owned(),
        author: author.to_owned(),
        author_id: None,
        repository: "acme/widgets".to_owned(),
        created_at,
        commit_message: message.to_owned(),
    }
}

#[fixture]
fn two_commit_task() -> Vec<MtrRecord> {
    vec![
        record("a1", "jdoe", "TASK-1/fix a", at(10, 0)),
        record("a2", "jdoe", "TASK-1/fix b", at(12, 0)),
    ]
}

#[rstest]
#[case("TASK-1/fix a", Some("TASK-1"))]
#[case("  TASK-2 /tidy", Some("TASK-2"))]
#[case("TASK-3/sub/path", Some("TASK-3"))]
#[case("quick fix", None)]
#[case("/leading slash", None)]
fn task_key_is_text_before_first_slash(#[case] message: &str, #[case] expected: Option<&str>) {
    assert_eq!(task_key(message), expected);
}

#[rstest]
fn two_hours_between_task_commits(two_commit_task: Vec<MtrRecord>) {
    let summary = summarize(&two_commit_task);

    let author = summary.authors.first().expect("one author");
    let task = author.tasks.first().expect("one task");
    assert_eq!(task.task, "TASK-1");
    assert_eq!(task.repair_time, Some(RepairTime::from_millis(7_200_000)));
    assert_eq!(task.newest_commit_id, "a2");
    assert_eq!(
        summary.mean_repair_time,
        MeanRepairTime::Measured(RepairTime::from_millis(7_200_000))
    );
    assert_eq!(summary.mean_repair_hours, Some(2.0));
}

#[rstest]
fn wrong_message_counts_without_timing(mut two_commit_task: Vec<MtrRecord>) {
    two_commit_task.push(record("a3", "jdoe", "quick fix", at(15, 0)));

    let summary = summarize(&two_commit_task);

    assert_eq!(summary.wrong_commit_messages, 1);
    assert_eq!(summary.mean_repair_hours, Some(2.0));
}

#[rstest]
fn deltas_sum_across_adjacent_pairs() {
    let records = vec![
        record("b1", "jdoe", "T/one", at(9, 0)),
        record("b3", "jdoe", "T/three", at(12, 30)),
        record("b2", "jdoe", "T/two", at(10, 0)),
    ];

    let summary = summarize(&records);

    let task = summary
        .authors
        .first()
        .and_then(|author| author.tasks.first())
        .expect("task");
    assert_eq!(task.repair_time, Some(RepairTime::from_millis(12_600_000)));
    assert_eq!(task.commit_count, 3);
    assert_eq!(task.newest_commit_id, "b3");
}

#[rstest]
fn single_commit_tasks_are_excluded_from_the_mean() {
    let records = vec![record("c1", "jdoe", "TASK-9/only", at(8, 0))];

    let summary = summarize(&records);

    let author = summary.authors.first().expect("author");
    assert_eq!(author.tasks.len(), 1);
    assert_eq!(author.tasks.first().and_then(|task| task.repair_time), None);
    assert_eq!(author.mean_repair_time, MeanRepairTime::NoTimesFound);
    assert_eq!(summary.mean_repair_time, MeanRepairTime::NoTimesFound);
}

#[rstest]
fn global_mean_spans_authors(two_commit_task: Vec<MtrRecord>) {
    let mut records = two_commit_task;
    records.push(record("d1", "asmith", "OPS-4/start", at(9, 0)));
    records.push(record("d2", "asmith", "OPS-4/done", at(13, 0)));

    let summary = summarize(&records);

    let authors: Vec<&str> = summary.authors.iter().map(|a| a.author.as_str()).collect();
    assert_eq!(authors, ["asmith", "jdoe"]);
    assert_eq!(summary.mean_repair_hours, Some(3.0));
}

#[rstest]
fn sentinel_serialises_as_text() {
    let summary = summarize(&[]);
    let value = serde_json::to_value(&summary).expect("serialise summary");
    assert_eq!(value["mean_repair_time"], NO_MTR_TIMES_FOUND);
    assert!(value["mean_repair_hours"].is_null());
}

#[rstest]
#[case(7_200_000, "2:00:00")]
#[case(5_400_000, "1:30:00")]
#[case(500, "0:00:01")]
#[case(499, "0:00:00")]
#[case(108_900_000, "30:15:00")]
#[case(-5_000, "0:00:00")]
fn formats_millis_as_hms(#[case] millis: i64, #[case] expected: &str) {
    assert_eq!(format_hms(millis), expected);
}

#[rstest]
fn mean_truncates_to_whole_milliseconds() {
    let values = [RepairTime::from_millis(1), RepairTime::from_millis(2)];
    assert_eq!(RepairTime::mean(&values), Some(RepairTime::from_millis(1)));
    assert_eq!(RepairTime::mean(&[]), None);
}

#[rstest]
fn task_repair_time_serialises_as_hms(two_commit_task: Vec<MtrRecord>) {
    let summary = summarize(&two_commit_task);
    let value = serde_json::to_value(&summary).expect("serialise summary");
    assert_eq!(value["authors"][0]["tasks"][0]["repair_time"], "2:00:00");
    assert_eq!(value["mean_repair_time"], "2:00:00");
}
