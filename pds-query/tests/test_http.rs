mod common;

use mockito::{Matcher, Server};
use pds_query::{EntityCategory, QueryError, RegistryClient, RegistryConfig, TransportError};

const SORT: &str = "ops:Harvest_Info.ops:harvest_date_time";

fn config(server: &Server, page_size: usize) -> RegistryConfig {
    RegistryConfig {
        base_url: format!("{}/api/search/1", server.url()),
        page_size,
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn record(n: usize) -> String {
    format!(
        r#"{{"id":"urn:nasa:pds:orex.ocams:data_calibrated:img_{n}::1.0","type":"Product_Observational","properties":{{"lid":["urn:nasa:pds:orex.ocams:data_calibrated:img_{n}"],"{SORT}":["2021-01-0{n}T00:00:00Z"]}}}}"#
    )
}

fn body(records: &[usize]) -> String {
    let data: Vec<String> = records.iter().map(|n| record(*n)).collect();
    format!(
        r#"{{"summary":{{"hits":3}},"data":[{}]}}"#,
        data.join(",")
    )
}

#[test]
fn test_pages_are_continued_with_search_after() {
    common::init_logger();
    let mut server = Server::new();

    let first = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("sort".into(), SORT.into()),
            Matcher::UrlEncoded(
                "q".into(),
                r#"((ref_lid_investigation eq "urn:nasa:pds:context:investigation:mission.orex"))"#
                    .into(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body(&[1, 2]))
        .expect(1)
        .create();
    let second = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::UrlEncoded(
            "search-after".into(),
            "2021-01-02T00:00:00Z".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body(&[3]))
        .expect(1)
        .create();

    let client = RegistryClient::connect(&config(&server, 2)).unwrap();
    let records: Vec<_> = client
        .orex_products()
        .cursor()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[2].lid(), "urn:nasa:pds:orex.ocams:data_calibrated:img_3");
    first.assert();
    second.assert();
}

#[test]
fn test_server_capped_page_is_continued() {
    common::init_logger();
    let mut server = Server::new();
    let capped = |records: &[usize]| {
        let data: Vec<String> = records.iter().map(|n| record(*n)).collect();
        format!(
            r#"{{"summary":{{"hits":3,"limit":2}},"data":[{}]}}"#,
            data.join(",")
        )
    };

    let first = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(capped(&[1, 2]))
        .expect(1)
        .create();
    let second = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::UrlEncoded(
            "search-after".into(),
            "2021-01-02T00:00:00Z".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(capped(&[3]))
        .expect(1)
        .create();

    let client = RegistryClient::connect(&config(&server, 10)).unwrap();
    let records: Vec<_> = client
        .products()
        .cursor()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 3);
    first.assert();
    second.assert();
}

#[test]
fn test_fields_include_sort_property() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::UrlEncoded(
            "fields".into(),
            format!("lid,title,{}", SORT),
        ))
        .with_status(200)
        .with_body(body(&[1]))
        .create();

    let client = RegistryClient::connect(&config(&server, 10)).unwrap();
    let frame = client
        .products()
        .fields(["lid", "title"])
        .as_dataframe(None)
        .unwrap()
        .unwrap();
    assert_eq!(frame.len(), 1);
    mock.assert();
}

#[test]
fn test_http_error_is_passed_through() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body("Bad query: unexpected token")
        .create();

    let client = RegistryClient::connect(&config(&server, 10)).unwrap();
    let err = client
        .products()
        .filter("title lik \"x\"")
        .cursor()
        .next()
        .unwrap()
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::Backend(TransportError::Http {
            status: 400,
            message: "Bad query: unexpected token".to_string()
        })
    );
}

#[test]
fn test_malformed_body_is_decode_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let client = RegistryClient::connect(&config(&server, 10)).unwrap();
    let err = client.products().cursor().next().unwrap().unwrap_err();
    assert!(matches!(err, QueryError::Backend(TransportError::Decode(_))));
}

#[test]
fn test_targets_are_listed_from_context_products() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/search/1/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "q".into(),
                r#"((lid like "urn:nasa:pds:context:target:*") and (product_class eq "Product_Context"))"#
                    .into(),
            ),
            Matcher::UrlEncoded(
                "fields".into(),
                format!(
                    "lid,pds:Target.pds:name,pds:Target.pds:type,pds:Target.pds:description,{}",
                    SORT
                ),
            ),
        ]))
        .with_status(200)
        .with_body(
            r#"{"data":[
                {"id":"urn:nasa:pds:context:target:asteroid.101955_bennu::1.1","type":"Product_Context",
                 "properties":{"lid":["urn:nasa:pds:context:target:asteroid.101955_bennu"],
                               "pds:Target.pds:name":["(101955) Bennu"],"pds:Target.pds:type":["Asteroid"]}},
                {"id":"urn:nasa:pds:context:target:planet.mars::1.0","type":"Product_Context",
                 "properties":{"lid":"urn:nasa:pds:context:target:planet.mars",
                               "pds:Target.pds:name":"Mars","pds:Target.pds:type":"Planet"}}
            ]}"#,
        )
        .expect(1)
        .create();

    let client = RegistryClient::connect(&config(&server, 100)).unwrap();
    let targets = client.targets().unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(
        targets.by_code("MARS").unwrap().identifier,
        "urn:nasa:pds:context:target:planet.mars"
    );

    let bennu = client.products().has_target("Benu").unwrap();
    assert!(bennu
        .compile()
        .unwrap()
        .contains("urn:nasa:pds:context:target:asteroid.101955_bennu"));
    assert_eq!(targets.category(), EntityCategory::Target);
    mock.assert();
}

#[test]
fn test_base_url_trailing_slash() {
    let server = Server::new();
    let mut config = config(&server, 10);
    config.base_url.push('/');
    let transport = pds_query::HttpTransport::new(&config).unwrap();
    assert!(!transport.base_url().ends_with('/'));
}
