//! Verify request rendering and method conversion against JSON test vectors
//! stored in `test-vectors/`.

use pooled_http::{HttpError, HttpMethod, HttpRequest};

/// Build an `HttpRequest` from a vector's `request` object.
fn request_from(value: &serde_json::Value) -> HttpRequest {
    let method: HttpMethod = value["method"].as_str().unwrap().parse().unwrap();
    let mut req = HttpRequest::new(method, value["url"].as_str().unwrap());
    for header in value["headers"].as_array().unwrap() {
        let pair = header.as_array().unwrap();
        req.headers
            .set(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
    }
    req.with_body(value["body"].as_str().unwrap())
}

#[test]
fn debug_string_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let req = request_from(&case["request"]);
        assert_eq!(
            req.debug_string(),
            case["expected_debug"].as_str().unwrap(),
            "{name}"
        );
    }
}

#[test]
fn method_name_vectors() {
    let raw = include_str!("../../test-vectors/methods.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["names"].as_array().unwrap() {
        let input = case["input"].as_str().unwrap();
        match (input.parse::<HttpMethod>(), case["expected"].as_str()) {
            (Ok(method), Some(expected)) => assert_eq!(method.as_str(), expected, "{input:?}"),
            (Err(HttpError::InvalidMethod(got)), None) => assert_eq!(got, input),
            (result, expected) => panic!("{input:?}: got {result:?}, expected {expected:?}"),
        }
    }
}

#[test]
fn method_code_vectors() {
    let raw = include_str!("../../test-vectors/methods.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["codes"].as_array().unwrap() {
        let input = case["input"].as_i64().unwrap() as i32;
        match (HttpMethod::try_from(input), case["expected"].as_str()) {
            (Ok(method), Some(expected)) => assert_eq!(method.as_str(), expected, "{input}"),
            (Err(HttpError::InvalidMethod(_)), None) => {}
            (result, expected) => panic!("{input}: got {result:?}, expected {expected:?}"),
        }
    }
}
