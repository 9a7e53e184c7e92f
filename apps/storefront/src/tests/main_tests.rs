use super::*;

#[test]
fn missing_resource_points_at_api_url() {
    let err = FetchError::status(404, "no such path");
    let message = describe_failure("failed to list products", &err);
    assert!(message.starts_with("failed to list products: catalog responded 404"));
    assert!(message.contains("--api-url"), "{message}");
}

#[test]
fn transport_failure_asks_whether_catalog_is_up() {
    let err = FetchError::Transport("connection refused".into());
    assert_eq!(failure_hint(&err), "is the catalog service running?");
}

#[test]
fn bad_request_points_at_listing_flags() {
    let err = FetchError::status(400, "size must be positive");
    assert!(describe_failure("failed to load page 2", &err).contains("--page-size"));
}

#[test]
fn keyword_route_wins_over_category() {
    let args = Args::parse_from(["storefront", "--keyword", "rust"]);
    assert_eq!(route_params(&args), ParamSnapshot::search("rust"));
}
