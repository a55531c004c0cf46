use std::fs::File;
use std::path::Path;

use tempfile::tempdir;

use bucket_batch::collection::{FileCollection, SourceKind};
use bucket_batch::error::BatchError;
use bucket_batch::transfer::MockObjectStore;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn remote_wildcards_are_spliced_in_listing_order() {
    let mut store = MockObjectStore::new();
    store
        .expect_list()
        .withf(|pattern| pattern == "gs://bucket/raw/*.nc")
        .return_once(|_| {
            Ok(strings(&[
                "gs://bucket/raw/a.nc",
                "gs://bucket/raw/b.nc",
            ]))
        });

    let patterns = strings(&[
        "gs://bucket/first.nc",
        "gs://bucket/raw/*.nc",
        "gs://bucket/last.nc",
    ]);
    let collection = FileCollection::expand(&patterns, None, SourceKind::Remote, &store)
        .await
        .expect("expansion should succeed");

    assert_eq!(
        collection.paths(),
        strings(&[
            "gs://bucket/first.nc",
            "gs://bucket/raw/a.nc",
            "gs://bucket/raw/b.nc",
            "gs://bucket/last.nc",
        ])
        .as_slice()
    );
}

#[tokio::test]
async fn remote_listing_failure_propagates() {
    let mut store = MockObjectStore::new();
    store
        .expect_list()
        .return_once(|_| Err(BatchError::tool("gsutil ls", "exited with code 1")));

    let patterns = strings(&["gs://bucket/raw/*.nc"]);
    let err = FileCollection::expand(&patterns, None, SourceKind::Remote, &store)
        .await
        .unwrap_err();

    match err {
        BatchError::Listing { pattern, .. } => assert_eq!(pattern, "gs://bucket/raw/*.nc"),
        other => panic!("expected a listing error, got {other:?}"),
    }
}

#[tokio::test]
async fn local_wildcards_expand_via_the_filesystem() {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    File::create(base.join("a.txt")).expect("create");
    File::create(base.join("b.txt")).expect("create");
    File::create(base.join("c.csv")).expect("create");

    let store = MockObjectStore::new();
    let patterns = vec![
        "/data/literal.nc".to_string(),
        format!("{}/*.txt", base.display()),
    ];
    let collection = FileCollection::expand(&patterns, None, SourceKind::Local, &store)
        .await
        .expect("expansion should succeed");

    assert_eq!(collection.len(), 3);
    assert_eq!(collection.paths()[0], "/data/literal.nc");
    assert!(collection.paths()[1].ends_with("a.txt"));
    assert!(collection.paths()[2].ends_with("b.txt"));
}

#[tokio::test]
async fn invalid_local_pattern_is_a_listing_error() {
    let store = MockObjectStore::new();
    let patterns = strings(&["[*"]);
    let err = FileCollection::expand(&patterns, None, SourceKind::Local, &store)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Listing { .. }));
}

#[tokio::test]
async fn file_dir_is_joined_before_expansion() {
    let store = MockObjectStore::new();
    let patterns = strings(&["x.nc", "y.nc"]);
    let collection = FileCollection::expand(
        &patterns,
        Some(Path::new("/data/run1")),
        SourceKind::Local,
        &store,
    )
    .await
    .expect("expansion should succeed");

    assert_eq!(
        collection.paths(),
        strings(&["/data/run1/x.nc", "/data/run1/y.nc"]).as_slice()
    );
}

#[tokio::test]
async fn verify_reports_local_existence_per_path() {
    let dir = tempdir().expect("tempdir");
    let present = dir.path().join("present.nc");
    File::create(&present).expect("create");
    let missing = dir.path().join("missing.nc");

    let collection = FileCollection::new(
        vec![
            present.display().to_string(),
            missing.display().to_string(),
        ],
        SourceKind::Local,
    );
    let store = MockObjectStore::new();
    let checked = collection.verify(&store).await.expect("verify");
    assert_eq!(checked, vec![true, false]);
}

#[tokio::test]
async fn verify_consults_remote_stat() {
    let mut store = MockObjectStore::new();
    store
        .expect_stat()
        .withf(|path| path == "gs://bucket/a.nc")
        .return_once(|_| Ok(true));
    store
        .expect_stat()
        .withf(|path| path == "gs://bucket/b.nc")
        .return_once(|_| Ok(false));

    let collection = FileCollection::new(
        strings(&["gs://bucket/a.nc", "gs://bucket/b.nc"]),
        SourceKind::Remote,
    );
    let checked = collection.verify(&store).await.expect("verify");
    assert_eq!(checked, vec![true, false]);
}
