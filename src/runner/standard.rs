//! Pre-built batches covering the book's standard SQL sweeps, so a freshly
//! simulated schema can be exercised end to end without typing out every
//! chapter/listing/version combination.

use super::RunRequest;

/// Chapter 2: the churn rate listings.
pub fn churn_rate_requests(schema: &str) -> Vec<RunRequest> {
    vec![RunRequest::new(schema, 2, (1..=5).collect())]
}

/// Chapter 3: event QA and per-event counts.
pub fn metric_qa_requests(schema: &str) -> Vec<RunRequest> {
    vec![
        RunRequest::new(schema, 3, vec![1, 2]),
        RunRequest::new(schema, 3, vec![11]),
        RunRequest::new(schema, 3, vec![9, 10]).versions((1..=8).collect()),
    ]
}

/// Chapters 3 and 7: the metric insert listings, including the chapter-7
/// insert variants.
pub fn metric_insert_requests(schema: &str) -> Vec<RunRequest> {
    vec![
        // standard metric names
        RunRequest::new(schema, 3, vec![4]).versions((1..=11).collect()),
        // account tenure metric
        RunRequest::new(schema, 3, vec![13]),
        // standard metrics and their QA
        RunRequest::new(schema, 3, vec![3, 6, 7]).versions((1..=8).collect()),
        // metric coverage
        RunRequest::new(schema, 3, vec![8]),
        // chapter-7 inserts: total, change, scaled
        RunRequest::new(schema, 7, vec![3, 4, 6, 7]).insert(),
        RunRequest::new(schema, 7, vec![8]).versions((1..=2).collect()).insert(),
        // ratio metrics
        RunRequest::new(schema, 7, vec![1]).versions((1..=7).collect()).insert(),
    ]
}

/// Chapter 4: active periods and observation dates for the dataset.
pub fn dataset_requests(schema: &str) -> Vec<RunRequest> {
    vec![RunRequest::new(schema, 4, vec![1, 2, 4, 5])]
}

/// All of the above, in book order.
pub fn standard_requests(schema: &str) -> Vec<RunRequest> {
    let mut requests = churn_rate_requests(schema);
    requests.extend(metric_qa_requests(schema));
    requests.extend(metric_insert_requests(schema));
    requests.extend(dataset_requests(schema));
    requests
}
