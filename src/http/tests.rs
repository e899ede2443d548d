use super::*;
use crate::args::HttpMethod;
use crate::error::{AppError, AppResult, TransportError, ValidationError};
use crate::target::{AddressSet, Endpoint};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(2);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn header(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

fn render(synthesizer: &PlainSynthesizer, endpoint: &Endpoint) -> AppResult<String> {
    let bytes = synthesizer.synthesize(endpoint, &AddressSet::default());
    String::from_utf8(bytes)
        .map_err(|err| AppError::validation(format!("Request is not UTF-8: {}", err)))
}

/// Serves one connection: reads the request head, answers with `response`,
/// and hands back what the client sent.
async fn serve_once(response: Vec<u8>) -> AppResult<(SocketAddr, tokio::task::JoinHandle<Vec<u8>>)> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    let task = tokio::spawn(async move {
        let mut received = Vec::new();
        let Ok((mut socket, _)) = listener.accept().await else {
            return received;
        };
        let mut buf = [0_u8; 1024];
        while !received.windows(4).any(|window| window == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(read) => received.extend_from_slice(buf.get(..read).unwrap_or_default()),
            }
        }
        drop(socket.write_all(&response).await);
        drop(socket.shutdown().await);
        received
    });
    Ok((addr, task))
}

fn plain_transport() -> AppResult<StreamTransport> {
    Ok(StreamTransport::new(CONNECT_TIMEOUT, build_tls_connector(false)?))
}

#[test]
fn synthesizer_writes_default_headers() -> AppResult<()> {
    let endpoint = Endpoint::parse("http://example.com:8080/health?check=1", None)?;
    let synthesizer = PlainSynthesizer::new(HttpMethod::Get, Some("sustain-test/1"), &[], "")?;
    let request = render(&synthesizer, &endpoint)?;

    let expected = "GET /health?check=1 HTTP/1.1\r\n\
Host: example.com:8080\r\n\
User-Agent: sustain-test/1\r\n\
Accept: */*\r\n\
Connection: close\r\n\r\n";
    if request != expected {
        return Err(AppError::validation(format!("Unexpected request: {:?}", request)));
    }
    Ok(())
}

#[test]
fn synthesizer_uses_host_override_and_body() -> AppResult<()> {
    let endpoint = Endpoint::parse("http://10.0.0.5/submit", Some("origin.example.com"))?;
    let synthesizer = PlainSynthesizer::new(
        HttpMethod::Post,
        None,
        &[header("Content-Type", "application/json")],
        "{\"ok\":true}",
    )?;
    let request = render(&synthesizer, &endpoint)?;

    let checks = [
        (request.starts_with("POST /submit HTTP/1.1\r\n"), "request line"),
        (request.contains("\r\nHost: origin.example.com\r\n"), "Host override"),
        (!request.contains("User-Agent:"), "no User-Agent"),
        (request.contains("\r\nContent-Type: application/json\r\n"), "user header"),
        (request.contains("\r\nContent-Length: 11\r\n"), "Content-Length"),
        (request.ends_with("\r\n\r\n{\"ok\":true}"), "body"),
    ];
    for (ok, what) in checks {
        if !ok {
            return Err(AppError::validation(format!(
                "Missing {} in {:?}",
                what, request
            )));
        }
    }
    Ok(())
}

#[test]
fn synthesizer_respects_user_supplied_headers() -> AppResult<()> {
    let endpoint = Endpoint::parse("https://example.com/", None)?;
    let synthesizer = PlainSynthesizer::new(
        HttpMethod::Get,
        Some("sustain-test/1"),
        &[
            header("User-Agent", "custom/2"),
            header("Accept", "text/plain"),
            header("Connection", "keep-alive"),
            header("Content-Length", "99"),
        ],
        "",
    )?;
    let request = render(&synthesizer, &endpoint)?;

    if request.contains("sustain-test/1")
        || request.matches("User-Agent:").count() != 1
        || request.contains("*/*")
        || request.contains("keep-alive")
        || request.contains("Content-Length")
        || !request.contains("\r\nConnection: close\r\n")
    {
        return Err(AppError::validation(format!("Unexpected request: {:?}", request)));
    }
    Ok(())
}

#[test]
fn synthesizer_rejects_invalid_headers() -> AppResult<()> {
    match PlainSynthesizer::new(HttpMethod::Get, None, &[header("Bad Name", "x")], "") {
        Err(AppError::Validation(ValidationError::InvalidHeaderName { .. })) => {}
        Err(other) => {
            return Err(AppError::validation(format!(
                "Expected InvalidHeaderName, got {}",
                other
            )));
        }
        Ok(_) => return Err(AppError::validation("Expected InvalidHeaderName, got a synthesizer")),
    }
    match PlainSynthesizer::new(HttpMethod::Get, None, &[header("X-Ok", "line\nbreak")], "") {
        Err(AppError::Validation(ValidationError::InvalidHeaderValue { .. })) => Ok(()),
        Err(other) => Err(AppError::validation(format!(
            "Expected InvalidHeaderValue, got {}",
            other
        ))),
        Ok(_) => Err(AppError::validation("Expected InvalidHeaderValue, got a synthesizer")),
    }
}

#[test]
fn dial_target_sets_server_name_for_tls_only() -> AppResult<()> {
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    let secure = DialTarget::for_endpoint(&Endpoint::parse("https://example.com/", None)?, ip);
    let plain = DialTarget::for_endpoint(&Endpoint::parse("http://example.com:8080/", None)?, ip);

    if secure.addr != SocketAddr::new(ip, 443) || secure.server_name.as_deref() != Some("example.com") {
        return Err(AppError::validation(format!("Unexpected TLS target: {:?}", secure)));
    }
    if plain.addr != SocketAddr::new(ip, 8080) || plain.server_name.is_some() {
        return Err(AppError::validation(format!("Unexpected plain target: {:?}", plain)));
    }
    Ok(())
}

#[test]
fn tls_connector_builds_in_both_modes() -> AppResult<()> {
    build_tls_connector(false)?;
    build_tls_connector(true)?;
    Ok(())
}

#[test]
fn transport_reads_at_most_read_limit() -> AppResult<()> {
    run_async_test(async {
        let mut response = b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\n".to_vec();
        response.extend(std::iter::repeat_n(b'x', 4096));
        let (addr, server) = serve_once(response).await?;

        let endpoint = Endpoint::parse(&format!("http://{}/ping", addr), None)?;
        let synthesizer = PlainSynthesizer::new(HttpMethod::Get, Some("sustain-test/1"), &[], "")?;
        let request = synthesizer.synthesize(&endpoint, &AddressSet::default());
        let target = DialTarget::for_endpoint(&endpoint, addr.ip());

        let read = tokio::time::timeout(EXCHANGE_TIMEOUT, plain_transport()?.exchange(&target, &request, 64))
            .await
            .map_err(|err| AppError::validation(format!("Exchange timed out: {}", err)))?
            .map_err(|err| AppError::validation(format!("Exchange failed: {}", err)))?;
        if read != 64 {
            return Err(AppError::validation(format!("Read {} bytes, expected 64", read)));
        }

        let received = server.await?;
        if !received.starts_with(b"GET /ping HTTP/1.1\r\n") {
            return Err(AppError::validation(format!(
                "Server saw unexpected request: {:?}",
                String::from_utf8_lossy(&received)
            )));
        }
        Ok(())
    })
}

#[test]
fn transport_returns_short_response_in_full() -> AppResult<()> {
    run_async_test(async {
        let response = b"HTTP/1.1 204 No Content\r\n\r\n".to_vec();
        let expected = response.len();
        let (addr, server) = serve_once(response).await?;

        let target = DialTarget {
            addr,
            server_name: None,
        };
        let read = plain_transport()?
            .exchange(&target, b"GET / HTTP/1.1\r\nHost: local\r\n\r\n", 1024)
            .await
            .map_err(|err| AppError::validation(format!("Exchange failed: {}", err)))?;
        if read != expected {
            return Err(AppError::validation(format!(
                "Read {} bytes, expected {}",
                read, expected
            )));
        }
        server.await?;
        Ok(())
    })
}

#[test]
fn transport_drains_large_read_limit_without_allocating_it() -> AppResult<()> {
    run_async_test(async {
        let mut response = b"HTTP/1.1 200 OK\r\nContent-Length: 2048\r\n\r\n".to_vec();
        response.extend(std::iter::repeat_n(b'y', 2048));
        let expected = response.len();
        let (addr, server) = serve_once(response).await?;

        let target = DialTarget {
            addr,
            server_name: None,
        };
        let read = tokio::time::timeout(
            EXCHANGE_TIMEOUT,
            plain_transport()?.exchange(&target, b"GET / HTTP/1.1\r\nHost: local\r\n\r\n", usize::MAX),
        )
        .await
        .map_err(|err| AppError::validation(format!("Exchange timed out: {}", err)))?
        .map_err(|err| AppError::validation(format!("Exchange failed: {}", err)))?;
        if read != expected {
            return Err(AppError::validation(format!(
                "Read {} bytes, expected {}",
                read, expected
            )));
        }
        server.await?;
        Ok(())
    })
}

#[test]
fn transport_reports_refused_connection() -> AppResult<()> {
    run_async_test(async {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let target = DialTarget {
            addr,
            server_name: None,
        };
        match plain_transport()?.exchange(&target, b"GET / HTTP/1.1\r\n\r\n", 16).await {
            Err(TransportError::Connect { addr: failed, .. }) if failed == addr => Ok(()),
            Err(other) => Err(AppError::validation(format!(
                "Expected connect error, got {}",
                other
            ))),
            Ok(read) => Err(AppError::validation(format!(
                "Expected connect error, read {} bytes",
                read
            ))),
        }
    })
}
