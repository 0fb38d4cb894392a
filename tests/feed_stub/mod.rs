use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use paper_digest::models::{Config, FeedProtocol};
use paper_digest::services::FeedClient;
use paper_digest::utils::RetryPolicy;

/// One request as the stub saw it.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    /// Path and query, e.g. `/oai?verb=ListRecords&...`
    pub url: String,
    pub body: String,
}

#[allow(dead_code)]
impl StubRequest {
    /// Decoded query parameter.
    pub fn param(&self, key: &str) -> Option<String> {
        let parsed = url::Url::parse(&format!("http://stub{}", self.url)).ok()?;
        parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

/// Status and body to answer with.
pub type StubResponse = (u16, String);

/// Local HTTP server answering every request with a handler.
pub struct FeedStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl FeedStub {
    pub fn spawn<H>(handler: H) -> Self
    where
        H: Fn(&StubRequest) -> StubResponse + Send + 'static,
    {
        Self::spawn_delayed(move |req| (Duration::ZERO, handler(req)))
    }

    /// Like `spawn`, but each response is held back for the returned delay.
    /// Delayed responses are sent from their own thread so later requests
    /// are still served.
    pub fn spawn_delayed<H>(handler: H) -> Self
    where
        H: Fn(&StubRequest) -> (Duration, StubResponse) + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start feed stub server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let stub_request = StubRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                };

                let (delay, (status, body)) = handler(&stub_request);
                seen.lock().unwrap().push(stub_request);

                let response = tiny_http::Response::from_string(body).with_status_code(status);
                if delay.is_zero() {
                    let _ = request.respond(response);
                } else {
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = request.respond(response);
                    });
                }
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Config pointing the feed at this stub with no pauses.
    pub fn config(&self, protocol: FeedProtocol, path: &str, categories: &[&str]) -> Config {
        let mut config = Config::default();
        config.feed.protocol = protocol;
        config.feed.base_url = format!("{}{}", self.base_url, path);
        config.feed.categories = categories.iter().map(|c| c.to_string()).collect();
        config.crawler.request_delay_ms = 0;
        config.crawler.retry_delay_ms = 10;
        config.summarizer.delay_ms = 0;
        config
    }
}

impl Drop for FeedStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A reqwest client that talks to localhost even when proxies are configured.
#[allow(dead_code)]
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .no_proxy()
        .build()
        .expect("build local client")
}

#[allow(dead_code)]
pub fn local_feed_client() -> FeedClient {
    FeedClient::with_client(local_client(), RetryPolicy::new(3, Duration::from_millis(10)))
}

/// A URL on a port nothing listens on.
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/oai")
}

/// An OAI-PMH `ListRecords` page with one record per id.
#[allow(dead_code)]
pub fn oai_page(ids: &[&str], token: Option<&str>) -> String {
    let mut records = String::new();
    for id in ids {
        records.push_str(&format!(
            r#"<record>
      <header><identifier>oai:arXiv.org:{id}</identifier><datestamp>2024-04-30</datestamp></header>
      <metadata><arXiv xmlns="http://arxiv.org/OAI/arXiv/">
        <id>{id}</id>
        <created>2024-04-29</created>
        <authors><author><keyname>Hopper</keyname><forenames>Grace</forenames></author></authors>
        <title>Paper {id}</title>
        <abstract>Abstract of {id}.</abstract>
      </arXiv></metadata>
    </record>
"#
        ));
    }
    let token = token
        .map(|t| format!(r#"<resumptionToken cursor="0">{t}</resumptionToken>"#))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-05-01T02:00:05Z</responseDate>
  <ListRecords>
    {records}
    {token}
  </ListRecords>
</OAI-PMH>"#
    )
}

#[allow(dead_code)]
pub fn oai_no_records() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-05-01T02:00:05Z</responseDate>
  <error code="noRecordsMatch">No records match</error>
</OAI-PMH>"#
        .to_string()
}

/// An Atom query-API page with one entry per id.
#[allow(dead_code)]
pub fn atom_page(ids: &[&str]) -> String {
    let entries: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<entry>
    <id>http://arxiv.org/abs/{id}v1</id>
    <published>2024-04-30T12:00:00Z</published>
    <title>Paper {id}</title>
    <summary>Abstract of {id}.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/stub</id>
  {entries}
</feed>"#
    )
}
