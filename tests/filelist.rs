use bucket_batch::collection::{FileCollection, SourceKind};
use bucket_batch::filelist;
use bucket_batch::transfer::MockObjectStore;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn cartesian_product_cycles_later_components_fastest() {
    let components = vec![strings(&["a", "b"]), strings(&["1", "2", "3"])];
    let names = filelist::from_components(&components, "nc", "_");
    assert_eq!(
        names,
        strings(&["a_1.nc", "a_2.nc", "a_3.nc", "b_1.nc", "b_2.nc", "b_3.nc"])
    );
}

#[test]
fn join_string_is_honoured() {
    let components = vec![strings(&["sst", "sss"]), strings(&["2021", "2022"])];
    let names = filelist::from_components(&components, "nc", "-");
    assert_eq!(
        names,
        strings(&["sst-2021.nc", "sst-2022.nc", "sss-2021.nc", "sss-2022.nc"])
    );
}

#[test]
fn empty_extension_appends_nothing() {
    let components = vec![strings(&["a"]), strings(&["1"])];
    let names = filelist::from_components(&components, "", "_");
    assert_eq!(names, strings(&["a_1"]));
}

#[test]
fn single_component_passes_through() {
    let components = vec![strings(&["x", "y", "z"])];
    let names = filelist::from_components(&components, "nc", "_");
    assert_eq!(names, strings(&["x.nc", "y.nc", "z.nc"]));
}

#[test]
fn three_components_nest_consistently() {
    let components = vec![
        strings(&["a", "b"]),
        strings(&["1", "2"]),
        strings(&["A"]),
    ];
    let names = filelist::from_components(&components, "nc", "_");
    assert_eq!(
        names,
        strings(&["a_1_A.nc", "a_2_A.nc", "b_1_A.nc", "b_2_A.nc"])
    );
}

#[test]
fn empty_inputs_yield_empty_lists() {
    assert!(filelist::from_components(&[], "nc", "_").is_empty());
    // An empty axis has no products.
    let components = vec![strings(&["a", "b"]), Vec::new()];
    assert!(filelist::from_components(&components, "nc", "_").is_empty());
}

#[tokio::test]
async fn built_names_round_trip_through_literal_expansion() {
    let components = vec![strings(&["a", "b"]), strings(&["1", "2", "3"])];
    let names = filelist::from_components(&components, "nc", "_");

    // No wildcards, so the listing seam must never be consulted.
    let store = MockObjectStore::new();
    let collection = FileCollection::expand(&names, None, SourceKind::Remote, &store)
        .await
        .expect("literal expansion should succeed");

    assert_eq!(collection.paths(), names.as_slice());
}
