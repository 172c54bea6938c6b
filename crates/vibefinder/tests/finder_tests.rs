
use std::sync::Arc;
use std::time::Duration;

use mock_gateway::{sample_restaurants, single_restaurant, MockGateway, SlowPosition};
use vibefinder::config::ApiEndpoint;
use vibefinder::gateway::SearchError;
use vibefinder::location::{
  Coordinates, FixedPosition, GeolocationError, LocationResolver, NoGeolocation,
};
use vibefinder::{Finder, SearchSessionState, Transition, ValidationError};

fn finder_with(gateway: Arc<MockGateway>) -> Finder {
  Finder::new(gateway, LocationResolver::new(Box::new(NoGeolocation)), 10)
}

fn near_finder(gateway: Arc<MockGateway>, coords: Coordinates) -> Finder {
  Finder::new(gateway, LocationResolver::new(Box::new(FixedPosition::new(coords))), 10)
}

fn boston() -> Coordinates {
  Coordinates::new(42.3601, -71.0589).unwrap()
}

#[tokio::test]
async fn test_starts_idle() {
  let finder = finder_with(Arc::new(MockGateway::new()));
  assert_eq!(finder.current_state(), SearchSessionState::Idle);
  assert!(finder.user_location().is_none());
}

#[tokio::test]
async fn test_text_search_success() {
  let gateway = Arc::new(MockGateway::new().respond("Pizza Boston", sample_restaurants()));
  let finder = finder_with(gateway.clone());

  let transition = finder.search("Pizza Boston", None).await.unwrap();

  assert_eq!(transition, Transition::Applied);
  assert_eq!(finder.current_state(), SearchSessionState::Success(sample_restaurants()));

  let calls = gateway.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].location_text, "Pizza Boston");
  assert_eq!(calls[0].max_results, 10);
  assert!(calls[0].user_coordinates.is_none());
  assert_eq!(calls[0].query_string(), "location=Pizza%20Boston&max_results=10");
}

#[tokio::test]
async fn test_search_input_is_trimmed_before_sending() {
  let gateway = Arc::new(MockGateway::new().respond("Sushi NYC", sample_restaurants()));
  let finder = finder_with(gateway.clone());

  finder.search("   Sushi NYC  ", None).await.unwrap();

  assert_eq!(gateway.calls()[0].location_text, "Sushi NYC");
}

#[tokio::test]
async fn test_empty_input_issues_no_request() {
  let gateway = Arc::new(MockGateway::new());
  let finder = finder_with(gateway.clone());

  for input in ["", "   ", "\n\t"] {
    assert_eq!(finder.search(input, None).await, Err(ValidationError::EmptyInput));
  }

  assert_eq!(gateway.call_count(), 0);
  assert_eq!(finder.current_state(), SearchSessionState::Idle);
}

#[tokio::test]
async fn test_empty_input_keeps_previous_results() {
  let gateway = Arc::new(MockGateway::new().respond("Boston", sample_restaurants()));
  let finder = finder_with(gateway.clone());

  finder.search("Boston", None).await.unwrap();
  assert!(finder.search(" ", None).await.is_err());

  assert_eq!(finder.current_state().results().len(), 4);
  assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn test_zero_results_is_empty_not_success() {
  let gateway = Arc::new(MockGateway::new().respond("Nowhere", Vec::new()));
  let finder = finder_with(gateway);

  finder.search("Nowhere", None).await.unwrap();

  assert_eq!(finder.current_state(), SearchSessionState::Empty);
}

#[tokio::test]
async fn test_backend_500_names_configured_base_url() {
  let endpoint = ApiEndpoint::parse("https://vibes.example.com").unwrap();
  let gateway = Arc::new(
    MockGateway::new().with_endpoint(endpoint).fail("Boston", SearchError::BadResponse(500)),
  );
  let finder = finder_with(gateway);

  finder.search("Boston", None).await.unwrap();

  let state = finder.current_state();
  let message = state.error().expect("session should be in Error");
  assert!(message.contains("https://vibes.example.com"), "{message}");
  assert!(!message.contains("500"), "raw status should not reach the user: {message}");
}

#[tokio::test]
async fn test_default_endpoint_is_called_out_in_error() {
  let gateway = Arc::new(MockGateway::new().fail("Boston", SearchError::transport("refused")));
  let finder = finder_with(gateway);

  finder.search("Boston", None).await.unwrap();

  let state = finder.current_state();
  let message = state.error().unwrap();
  assert!(message.contains("http://localhost:8000"));
  assert!(message.contains("default"));
}

#[tokio::test]
async fn test_every_failure_kind_collapses_to_one_message() {
  let errors = [
    SearchError::transport("connection refused"),
    SearchError::BadResponse(502),
    SearchError::decode_failure("expected array"),
  ];

  let mut messages = Vec::new();
  for error in errors {
    let finder = finder_with(Arc::new(MockGateway::new().fail("Boston", error)));
    finder.search("Boston", None).await.unwrap();
    messages.push(finder.current_state().error().unwrap().to_string());
  }

  assert!(messages.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_near_me_builds_coordinate_request() {
  let gateway = Arc::new(MockGateway::new().respond("42.3601,-71.0589", sample_restaurants()));
  let finder = near_finder(gateway.clone(), boston());

  let transition = finder.near_me().await;

  assert_eq!(transition, Transition::Applied);
  assert_eq!(finder.current_state().results().len(), 4);
  assert_eq!(finder.user_location(), Some(boston()));
  assert_eq!(boston().near_me_label(), "Near me (42.3601, -71.0589)");

  let calls = gateway.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].user_coordinates, Some(boston()));
  assert!(calls[0].query_string().ends_with("&user_lat=42.3601&user_lng=-71.0589"));
}

#[tokio::test]
async fn test_near_me_without_capability_reports_error() {
  let gateway = Arc::new(MockGateway::new());
  let finder = finder_with(gateway.clone());

  finder.near_me().await;

  let state = finder.current_state();
  assert!(state.error().unwrap().contains("not supported"));
  assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_user_location_persists_across_searches() {
  let gateway = Arc::new(
    MockGateway::new()
      .respond("Pizza", sample_restaurants())
      .fail("Tacos", SearchError::BadResponse(503)),
  );
  let finder = finder_with(gateway.clone());

  finder.search("Pizza", Some(boston())).await.unwrap();
  finder.search("Tacos", None).await.unwrap();

  assert_eq!(finder.user_location(), Some(boston()));
  assert!(gateway.calls()[1].user_coordinates.is_none());

  let nyc = Coordinates::new(40.7128, -74.006).unwrap();
  finder.search("Pizza", Some(nyc)).await.unwrap();
  assert_eq!(finder.user_location(), Some(nyc));
}

#[tokio::test]
async fn test_error_then_success_recovers() {
  let gateway = Arc::new(
    MockGateway::new()
      .fail("Broken", SearchError::decode_failure("bad json"))
      .respond("Boston", sample_restaurants()),
  );
  let finder = finder_with(gateway);

  finder.search("Broken", None).await.unwrap();
  assert!(finder.current_state().error().is_some());

  finder.search("Boston", None).await.unwrap();
  assert_eq!(finder.current_state().results().len(), 4);
  assert!(finder.current_state().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_older_search_cannot_overwrite_newer() {
  let gateway = Arc::new(
    MockGateway::new()
      .respond_after("Slow", Duration::from_millis(500), single_restaurant("Old Result"))
      .respond_after("Fast", Duration::from_millis(10), single_restaurant("New Result")),
  );
  let finder = finder_with(gateway);

  let (first, second) = tokio::join!(finder.search("Slow", None), async {
    tokio::time::sleep(Duration::from_millis(1)).await;
    finder.search("Fast", None).await
  });

  assert!(matches!(first.unwrap(), Transition::Discarded { .. }));
  assert_eq!(second.unwrap(), Transition::Applied);
  assert_eq!(finder.current_state(), SearchSessionState::Success(single_restaurant("New Result")));
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_cannot_overwrite_newer_empty() {
  let gateway = Arc::new(
    MockGateway::new()
      .fail_after("Slow", Duration::from_millis(300), SearchError::BadResponse(500))
      .respond_after("Fast", Duration::from_millis(5), Vec::new()),
  );
  let finder = finder_with(gateway);

  let _ = tokio::join!(finder.search("Slow", None), async {
    tokio::time::sleep(Duration::from_millis(1)).await;
    finder.search("Fast", None).await
  });

  assert_eq!(finder.current_state(), SearchSessionState::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_state_is_searching_while_in_flight() {
  let gateway = Arc::new(MockGateway::new().respond_after(
    "Boston",
    Duration::from_millis(100),
    sample_restaurants(),
  ));
  let finder = finder_with(gateway);

  let (_, observed) = tokio::join!(finder.search("Boston", None), async {
    tokio::time::sleep(Duration::from_millis(50)).await;
    finder.current_state()
  });

  assert_eq!(observed, SearchSessionState::Searching);
  assert_eq!(finder.current_state().results().len(), 4);
}

fn slow_near_finder(
  gateway: Arc<MockGateway>,
  result: Result<Coordinates, GeolocationError>,
) -> Finder {
  let provider = SlowPosition::new(Duration::from_millis(500), result);
  Finder::new(gateway, LocationResolver::new(Box::new(provider)), 10)
}

#[tokio::test(start_paused = true)]
async fn test_denied_near_me_cannot_overwrite_newer_text_search() {
  let gateway = Arc::new(MockGateway::new().respond("Boston", sample_restaurants()));
  let finder = slow_near_finder(gateway.clone(), Err(GeolocationError::denied("user declined")));

  let (near_me, text) = tokio::join!(finder.near_me(), async {
    tokio::time::sleep(Duration::from_millis(10)).await;
    finder.search("Boston", None).await
  });

  assert!(matches!(near_me, Transition::Discarded { .. }));
  assert_eq!(text.unwrap(), Transition::Applied);
  assert_eq!(finder.current_state().results().len(), 4);
  assert!(finder.current_state().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_granted_near_me_cannot_overwrite_newer_text_search() {
  let gateway = Arc::new(
    MockGateway::new()
      .respond("Boston", sample_restaurants())
      .respond("42.3601,-71.0589", Vec::new()),
  );
  let finder = slow_near_finder(gateway.clone(), Ok(boston()));

  let (near_me, _) = tokio::join!(finder.near_me(), async {
    tokio::time::sleep(Duration::from_millis(10)).await;
    finder.search("Boston", None).await
  });

  assert!(matches!(near_me, Transition::Discarded { .. }));
  assert_eq!(finder.current_state().results().len(), 4);
  assert!(finder.user_location().is_none());
  // The superseded near-me never reaches the backend
  assert_eq!(gateway.call_count(), 1);
  assert_eq!(gateway.calls()[0].location_text, "Boston");
}

#[tokio::test(start_paused = true)]
async fn test_near_me_is_searching_while_locating() {
  let gateway = Arc::new(MockGateway::new().respond("42.3601,-71.0589", sample_restaurants()));
  let finder = slow_near_finder(gateway, Ok(boston()));

  let (_, observed) = tokio::join!(finder.near_me(), async {
    tokio::time::sleep(Duration::from_millis(100)).await;
    finder.current_state()
  });

  assert_eq!(observed, SearchSessionState::Searching);
  assert_eq!(finder.current_state().results().len(), 4);
  assert_eq!(finder.user_location(), Some(boston()));
}

#[tokio::test(start_paused = true)]
async fn test_newer_near_me_supersedes_older_text_search() {
  let gateway = Arc::new(
    MockGateway::new()
      .respond_after("Boston", Duration::from_secs(2), single_restaurant("Old Result"))
      .respond("42.3601,-71.0589", single_restaurant("Nearby")),
  );
  let finder = slow_near_finder(gateway, Ok(boston()));

  let (text, near_me) = tokio::join!(finder.search("Boston", None), async {
    tokio::time::sleep(Duration::from_millis(10)).await;
    finder.near_me().await
  });

  assert!(matches!(text.unwrap(), Transition::Discarded { .. }));
  assert_eq!(near_me, Transition::Applied);
  assert_eq!(finder.current_state(), SearchSessionState::Success(single_restaurant("Nearby")));
}

#[tokio::test]
async fn test_search_records_start_time() {
  let finder = finder_with(Arc::new(MockGateway::new()));
  assert!(finder.last_started_at().is_none());

  finder.search("Boston", None).await.unwrap();

  assert!(finder.last_started_at().is_some());
}
