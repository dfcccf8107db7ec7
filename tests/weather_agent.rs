//! End-to-end runs of the agent against mocked chat and weather endpoints.

use std::sync::Arc;

use serde_json::json;
use weather_agent::{
    weather_toolkit, Agent, GroqClient, QueryDispatcher, Role, StubModel, WeatherConfig,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_paris_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"lat": 48.85, "lon": 2.35}])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 18.2, "humidity": 60},
            "weather": [{"description": "clear sky"}]
        })))
        .mount(server)
        .await;
}

fn chat_reply(message: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}]
    }))
}

fn weather_config(server: &MockServer) -> WeatherConfig {
    WeatherConfig::default()
        .with_api_key("weather-key")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn groq_agent_calls_weather_tool_and_answers() {
    let weather = MockServer::start().await;
    mount_paris_weather(&weather).await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer groq-key"))
        .respond_with(chat_reply(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "Weather", "arguments": "{\"location\":\"Paris\"}"}
            }]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Current weather in Paris: clear sky"))
        .respond_with(chat_reply(json!({
            "role": "assistant",
            "content": "It is 18.2°C and clear in Paris."
        })))
        .mount(&llm)
        .await;

    let model = Arc::new(
        GroqClient::new("groq-key")
            .unwrap()
            .with_base_url(llm.uri()),
    );
    let agent = Agent::new(model).with_tools(weather_toolkit(&weather_config(&weather)).unwrap());

    let run = agent.run("What's the weather in Paris?").await.unwrap();
    assert_eq!(run.output, "It is 18.2°C and clear in Paris.");

    let tool_turn = run
        .transcript
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(
        tool_turn.content,
        "Current weather in Paris: clear sky, temperature is 18.2°C with 60% humidity"
    );
}

#[tokio::test]
async fn rejected_llm_key_is_rendered_by_dispatcher() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&llm)
        .await;

    let model = Arc::new(GroqClient::new("").unwrap().with_base_url(llm.uri()));
    let dispatcher = QueryDispatcher::new(Arc::new(Agent::new(model)));

    let text = dispatcher.process_query("What's the weather in Paris?").await;
    assert!(text.starts_with("Error processing query:"), "{text}");
    assert!(text.contains("401"));
}

#[tokio::test]
async fn unknown_city_result_reaches_the_model() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&weather)
        .await;

    let model = StubModel::new(vec![
        r#"{"action":"call_tool","name":"Weather","arguments":{"location":"Atlantis"}}"#.into(),
        r#"{"action":"respond","content":"I could not find Atlantis."}"#.into(),
    ]);
    let agent = Agent::new(model).with_tools(weather_toolkit(&weather_config(&weather)).unwrap());

    let run = agent.run("Weather in Atlantis?").await.unwrap();
    let tool_turn = run
        .transcript
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(tool_turn.content, "Could not find location: Atlantis");
    assert_eq!(run.output, "I could not find Atlantis.");
}

#[tokio::test]
async fn upstream_outage_is_text_not_an_agent_failure() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&weather)
        .await;

    let model = StubModel::new(vec![
        r#"{"action":"call_tool","name":"Weather","arguments":"Paris"}"#.into(),
        r#"{"action":"respond","content":"The weather service is down."}"#.into(),
    ]);
    let dispatcher = QueryDispatcher::new(Arc::new(
        Agent::new(model).with_tools(weather_toolkit(&weather_config(&weather)).unwrap()),
    ));

    assert_eq!(
        dispatcher.process_query("Weather in Paris?").await,
        "The weather service is down."
    );
}

#[tokio::test]
async fn identical_queries_give_identical_answers() {
    let weather = MockServer::start().await;
    mount_paris_weather(&weather).await;

    let call = r#"{"action":"call_tool","name":"Weather","arguments":{"location":"Paris"}}"#;
    let model = StubModel::new(vec![
        call.into(),
        r#"{"action":"respond","content":"Clear and mild."}"#.into(),
        call.into(),
        r#"{"action":"respond","content":"Clear and mild."}"#.into(),
    ]);
    let agent = Agent::new(model).with_tools(weather_toolkit(&weather_config(&weather)).unwrap());

    let first = agent.run("Paris weather?").await.unwrap();
    let second = agent.run("Paris weather?").await.unwrap();

    assert_eq!(first.output, second.output);
    assert_eq!(first.transcript.iter().count(), second.transcript.iter().count());
    let tool_text = |run: &weather_agent::AgentRun| {
        run.transcript
            .iter()
            .find(|m| m.role == Role::Tool)
            .map(|m| m.content.clone())
    };
    assert_eq!(tool_text(&first), tool_text(&second));
}

#[tokio::test]
async fn malformed_tool_input_is_reported_back_to_the_model() {
    let weather = MockServer::start().await;
    mount_paris_weather(&weather).await;

    let model = StubModel::new(vec![
        r#"{"action":"call_tool","name":"Weather","arguments":{"city":"Paris"}}"#.into(),
        r#"{"action":"call_tool","name":"Weather","arguments":{"location":"Paris"}}"#.into(),
        r#"{"action":"respond","content":"Clear sky, 18.2°C."}"#.into(),
    ]);
    let agent = Agent::new(model).with_tools(weather_toolkit(&weather_config(&weather)).unwrap());

    let run = agent.run("Weather in Paris?").await.unwrap();
    let tool_turns: Vec<&str> = run
        .transcript
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(tool_turns.len(), 2);
    assert!(tool_turns[0].starts_with("Error getting weather:"), "{}", tool_turns[0]);
    assert_eq!(
        tool_turns[1],
        "Current weather in Paris: clear sky, temperature is 18.2°C with 60% humidity"
    );

    let dispatcher = QueryDispatcher::new(Arc::new(
        Agent::new(StubModel::new(vec![
            r#"{"action":"call_tool","name":"Weather","arguments":{"city":"Paris"}}"#.into(),
            r#"{"action":"respond","content":"Which city did you mean?"}"#.into(),
        ]))
        .with_tools(weather_toolkit(&weather_config(&weather)).unwrap()),
    ));
    assert_eq!(
        dispatcher.process_query("Weather?").await,
        "Which city did you mean?"
    );
}
