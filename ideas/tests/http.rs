use std::convert::Infallible;
use std::sync::Arc;

use ideas::{AnalysisError, AnalysisState, Analyzer, HttpIdeaSource, Language};
use tokio::sync::{broadcast, mpsc};
use warp::hyper::Body;
use warp::Filter;

/// Serve `chunks` as a chunked response body on POST /analyze.
async fn spawn_stream_server(chunks: Vec<String>) -> (String, mpsc::Sender<()>) {
    let route = warp::post().and(warp::path("analyze")).map(move || {
        let body = Body::wrap_stream(futures_util::stream::iter(
            chunks.clone().into_iter().map(Ok::<_, Infallible>),
        ));
        warp::reply::Response::new(body)
    });
    let (tx, mut rx) = mpsc::channel::<()>(1);
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
            rx.recv().await;
        });
    tokio::spawn(server);
    (format!("http://{}/analyze", addr), tx)
}

/// Answer POST /analyze with a fixed status and body.
async fn spawn_error_server(status: u16, body: &'static str) -> (String, mpsc::Sender<()>) {
    let route = warp::post().and(warp::path("analyze")).map(move || {
        warp::reply::with_status(body, warp::http::StatusCode::from_u16(status).unwrap())
    });
    let (tx, mut rx) = mpsc::channel::<()>(1);
    let (addr, server) =
        warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
            rx.recv().await;
        });
    tokio::spawn(server);
    (format!("http://{}/analyze", addr), tx)
}

async fn terminal_state(analyzer: &Analyzer) -> AnalysisState {
    let session = analyzer.start("u1", "https://img.example/p.jpg", Language::En);
    let mut rx = session.subscribe();
    loop {
        match rx.recv().await {
            Ok(state) if state.is_terminal() => return state,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("channel closed early"),
        }
    }
}

const FULL_BATCH: &str = concat!(
    r#"{"ideas":["#,
    r#"{"source":"s1","strategy":"t1","marketing":"m1","market_potential":"p1","target_audience":"a1"},"#,
    r#"{"source":"s2","strategy":"t2","marketing":"m2","market_potential":"p2","target_audience":"a2"},"#,
    r#"{"source":"s3","strategy":"t3","marketing":"m3","market_potential":"p3","target_audience":"a3"},"#,
    r#"{"source":"s4","strategy":"t4","marketing":"m4","market_potential":"p4","target_audience":"a4"},"#,
    r#"{"source":"s5","strategy":"t5","marketing":"m5","market_potential":"p5","target_audience":"a5"}"#,
    "]}"
);

#[tokio::test]
async fn single_document_response_completes_with_five_ideas() {
    let (url, shutdown) = spawn_stream_server(vec![FULL_BATCH.to_string()]).await;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&url)));

    match terminal_state(&analyzer).await {
        AnalysisState::Completed(batch) => {
            assert_eq!(batch.len(), 5);
            assert_eq!(batch.get(4).unwrap().marketing, "m5");
        }
        other => panic!("unexpected state: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn newline_streamed_response_grows_the_batch() {
    let line1 = r#"{"ideas":[{"source":"s1","strategy":"t1","marketing":"m1","market_potential":"p1","target_audience":"a1"}]}"#;
    let line2 = r#"{"ideas":[{"source":"s1","strategy":"t1","marketing":"m1","market_potential":"p1","target_audience":"a1"},{"source":"s2","strategy":"t2","marketing":"m2","market_potential":"p2","target_audience":"a2"}]}"#;
    let (url, shutdown) =
        spawn_stream_server(vec![format!("{line1}\n"), format!("{line2}\n")]).await;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&url)));

    match terminal_state(&analyzer).await {
        AnalysisState::Completed(batch) => {
            assert_eq!(batch.len(), 2);
            assert_eq!(batch.get(0).unwrap().source, "s1");
            assert_eq!(batch.get(1).unwrap().source, "s2");
        }
        other => panic!("unexpected state: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn http_429_surfaces_as_rate_limited() {
    let (url, shutdown) = spawn_error_server(429, r#"{"error":"quota exhausted"}"#).await;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&url)));

    match terminal_state(&analyzer).await {
        AnalysisState::Failed { error, batch } => {
            assert_eq!(error, AnalysisError::RateLimited);
            assert!(batch.is_empty());
        }
        other => panic!("unexpected state: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn server_error_message_is_extracted_from_json_body() {
    let (url, shutdown) = spawn_error_server(500, r#"{"error":"model exploded"}"#).await;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&url)));

    match terminal_state(&analyzer).await {
        AnalysisState::Failed { error, .. } => {
            assert_eq!(
                error,
                AnalysisError::Request {
                    status: 500,
                    message: "model exploded".into()
                }
            );
        }
        other => panic!("unexpected state: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn message_field_is_accepted_too() {
    let (url, shutdown) = spawn_error_server(503, r#"{"message":"warming up"}"#).await;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&url)));

    match terminal_state(&analyzer).await {
        AnalysisState::Failed { error, .. } => {
            assert_eq!(
                error,
                AnalysisError::Request {
                    status: 503,
                    message: "warming up".into()
                }
            );
        }
        other => panic!("unexpected state: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Nothing listens on this port.
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new("http://127.0.0.1:9/analyze")));

    match terminal_state(&analyzer).await {
        AnalysisState::Failed { error, .. } => {
            assert!(matches!(error, AnalysisError::Network(_)));
        }
        other => panic!("unexpected state: {:?}", other),
    }
}
