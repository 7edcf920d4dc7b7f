use std::time::Duration;

use serde_json::json;
use tournament_harness::gateway::openrouter::OpenRouterAdapter;
use tournament_harness::gateway::{GatewayConfig, ProviderGateway};
use tournament_harness::{
    run_tournament, ComparisonTask, JudgmentOracle, LlmJudge, Outcome, TournamentConfig,
    TournamentError,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, thiserror::Error)]
#[error("judge failed")]
struct JudgeFailed;

/// Always prefers the named competitor when it is in the pair, otherwise the
/// first item.
struct Favorite(&'static str);

#[async_trait::async_trait]
impl JudgmentOracle for Favorite {
    type Error = JudgeFailed;

    async fn judge(&self, task: &ComparisonTask) -> Result<Outcome, JudgeFailed> {
        let (w, l) = if task.item_b == self.0 {
            (&task.item_b, &task.item_a)
        } else {
            (&task.item_a, &task.item_b)
        };
        Ok(Outcome::new(w.clone(), l.clone(), task.attribute.clone(), "favorite"))
    }
}

struct AlwaysFails;

#[async_trait::async_trait]
impl JudgmentOracle for AlwaysFails {
    type Error = JudgeFailed;

    async fn judge(&self, _task: &ComparisonTask) -> Result<Outcome, JudgeFailed> {
        Err(JudgeFailed)
    }
}

#[tokio::test]
async fn two_competitors_one_attribute() {
    let config = TournamentConfig::new(["A", "B"], ["quality"], "things");
    let result = run_tournament(&Favorite("A"), &config, None, None)
        .await
        .unwrap();

    assert_eq!(result.matrix.rows(), vec![vec![0, 2], vec![0, 0]]);
    assert_eq!(result.report.completed, 2);

    let a = result.fit.strength_of("A").unwrap();
    let b = result.fit.strength_of("B").unwrap();
    assert!((a / b).is_finite());
    assert!(a / b > 1.0);
    assert_eq!(result.strengths[0].competitor, "A");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["matrix"]["competitors"], json!(["A", "B"]));
    assert_eq!(json["matrix"]["counts"], json!([[0, 2], [0, 0]]));
    assert_eq!(json["report"]["completed"], 2);
}

#[tokio::test]
async fn no_surviving_outcomes_means_no_comparisons() {
    let config = TournamentConfig::new(["A", "B", "C"], ["quality"], "things");
    let err = run_tournament(&AlwaysFails, &config, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NoComparisons));
}

#[tokio::test]
async fn invalid_config_is_rejected_before_any_judgment() {
    let config = TournamentConfig::new(["solo"], ["quality"], "things");
    let err = run_tournament(&AlwaysFails, &config, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidInput(_)));
}

/// Chat endpoint that answers by a fixed ranking, reading the two items out
/// of the user prompt.
struct RankedJudge {
    ranking: &'static [&'static str],
}

impl RankedJudge {
    fn items(prompt: &str) -> Option<(String, String)> {
        let rest = prompt.split_once("two fruits: ")?.1;
        let (pair, _) = rest.split_once(". Which")?;
        let (a, b) = pair.split_once(" and ")?;
        Some((a.to_string(), b.to_string()))
    }

    fn rank(&self, item: &str) -> usize {
        self.ranking
            .iter()
            .position(|r| *r == item)
            .unwrap_or(usize::MAX)
    }
}

impl Respond for RankedJudge {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = request.body_json().unwrap();
        let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
        let Some((a, b)) = Self::items(prompt) else {
            return ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "message": "unexpected prompt" } }));
        };
        let preferred = if self.rank(&a) < self.rank(&b) { 1 } else { 2 };
        let content = json!({ "reason": "ranked", "preferred": preferred }).to_string();
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 12 }
        }))
    }
}

#[tokio::test]
async fn llm_judged_tournament_recovers_ranking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(RankedJudge {
            ranking: &["cherry", "apple", "banana"],
        })
        .expect(6)
        .mount(&server)
        .await;

    let adapter =
        OpenRouterAdapter::with_config("sk-test", server.uri(), Duration::from_secs(5)).unwrap();
    let gateway = ProviderGateway::with_config(
        adapter,
        GatewayConfig {
            max_retries: 0,
            retry_base_delay: Duration::from_millis(0),
        },
    );
    let judge = LlmJudge::new(gateway, "fruits");

    let config = TournamentConfig::new(["apple", "banana", "cherry"], ["taste"], "fruits")
        .with_concurrency(3);
    let result = run_tournament(&judge, &config, None, None).await.unwrap();

    assert_eq!(result.report.completed, 6);
    assert_eq!(result.report.failed, 0);
    let order: Vec<&str> = result
        .strengths
        .iter()
        .map(|e| e.competitor.as_str())
        .collect();
    assert_eq!(order, ["cherry", "apple", "banana"]);
    assert!(result.strengths.iter().all(|e| e.strength.is_finite()));
}
