use std::env;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Method, Uri};
use http_body_util::Full;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use charset_filter::body::FormBody;
use charset_filter::config::Config;
use charset_filter::core::Request;
use charset_filter::filter::EncodingFilter;
use charset_filter::{logging, ParameterMap};

const USAGE: &str = "usage: charset_filter METHOD TARGET [CONTENT_TYPE]";

/// Result document printed to stdout.
#[derive(Serialize)]
struct Report<'a> {
    method: &'a str,
    target: &'a str,
    encoded_target: &'a str,
    character_encoding: &'a str,
    servlet_path: Option<&'a str>,
    parse_failed: bool,
    parameters: &'a ParameterMap,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    logging::init(&config.logging)?;
    config.log_summary();

    let mut args = env::args().skip(1);
    let (Some(method), Some(target)) = (args.next(), args.next()) else {
        return Err(USAGE.into());
    };
    let content_type = args.next();

    // Single-threaded runtime; the only async work is reading stdin
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config, method, target, content_type))
}

async fn run(
    config: Config,
    method: String,
    target: String,
    content_type: Option<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EncodingFilter::new(config.encoding);

    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
    let encoded_target = filter.encode_url(&target);
    let uri: Uri = encoded_target.parse()?;

    let mut builder = Request::builder(method.clone(), uri);
    if let Some(ref content_type) = content_type {
        builder = builder.header(CONTENT_TYPE.as_str(), content_type);
    }
    let mut request = builder.build();

    if filter.should_read_body(&method, request.headers()) {
        let mut raw = Vec::new();
        tokio::io::stdin().read_to_end(&mut raw).await?;
        debug!(bytes = raw.len(), "read body from stdin");

        let mut headers = request.headers().clone();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(raw.len()));
        let body = filter.read_body(&headers, Full::new(Bytes::from(raw))).await;
        request.set_form_body(body);
    } else {
        request.set_form_body(FormBody::Empty);
    }

    let mut wrapped = filter.wrap(request);
    let parse_failed = wrapped.parse_failed();
    let character_encoding = wrapped.character_encoding().to_string();
    let servlet_path = wrapped.servlet_path().map(str::to_owned);

    let report = Report {
        method: method.as_str(),
        target: &target,
        encoded_target: &encoded_target,
        character_encoding: &character_encoding,
        servlet_path: servlet_path.as_deref(),
        parse_failed,
        parameters: wrapped.parameter_map(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(parse_failed, "request processed");
    Ok(())
}
