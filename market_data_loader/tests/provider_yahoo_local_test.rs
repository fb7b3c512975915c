use market_data_loader::{
    HistoryRequest,
    providers::{
        DataProvider, ProviderError,
        yahoo_rest::{YahooConfig, YahooProvider},
    },
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

mod common;

const TWO_BARS: &str = r#"{"chart":{"result":[{
    "meta":{"gmtoffset":-18000},
    "timestamp":[1672756200,1672842600],
    "indicators":{"quote":[{
        "open":[118.47,109.11],
        "high":[118.80,114.59],
        "low":[104.64,107.52],
        "close":[108.10,113.64],
        "volume":[231402800,180389000]
    }]}
}],"error":null}}"#;

const NOT_FOUND: &str =
    r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"delisted"}}}"#;

const NO_TIMESTAMPS: &str = r#"{"chart":{"result":[{
    "meta":{"gmtoffset":-18000},
    "indicators":{"quote":[{}]}
}],"error":null}}"#;

/// Serves every connection with the same canned response and returns the base url.
async fn serve(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            while read < buf.len() {
                let n = stream.read(&mut buf[read..]).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                read += n;
                if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{addr}/v8/finance/chart")
}

async fn fetch(status: &'static str, body: &'static str) -> Result<usize, ProviderError> {
    let provider = YahooProvider::new(YahooConfig {
        base_url: serve(status, body).await,
        ..YahooConfig::default()
    })
    .unwrap();
    let request = HistoryRequest::new(common::date(2023, 1, 1), common::date(2023, 1, 31));
    provider
        .fetch_daily_history(&request)
        .await
        .map(|points| points.len())
}

#[tokio::test]
async fn chart_with_bars_is_decoded() {
    assert_eq!(fetch("200 OK", TWO_BARS).await.unwrap(), 2);
}

#[tokio::test]
async fn error_status_carries_the_envelope_description() {
    let err = fetch("404 Not Found", NOT_FOUND).await.unwrap_err();
    match err {
        ProviderError::Api { message, .. } => {
            assert!(message.contains("404"), "{message}");
            assert!(message.contains("delisted"), "{message}");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_payload_with_ok_status_is_an_api_error() {
    let err = fetch("200 OK", NOT_FOUND).await.unwrap_err();
    assert!(matches!(err, ProviderError::Api { .. }), "{err:?}");
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let err = fetch("200 OK", "<html>rate limited</html>").await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn result_without_timestamps_is_empty_history() {
    let err = fetch("200 OK", NO_TIMESTAMPS).await.unwrap_err();
    match err {
        ProviderError::EmptyHistory { ticker, start, end, .. } => {
            assert_eq!(ticker, "TSLA");
            assert_eq!(start, common::date(2023, 1, 1));
            assert_eq!(end, common::date(2023, 1, 31));
        }
        other => panic!("expected EmptyHistory, got {other:?}"),
    }
}
