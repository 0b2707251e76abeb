use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{code}: {message}")]
    Server { code: String, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Parser, Debug)]
#[command(name = "songnation", about = "SONGNATION market-research API CLI")]
struct Cli {
    #[arg(long, env = "SONGNATION_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server is up.
    Ping,
    /// List genres with icon and record count.
    Genres,
    /// List compositions, optionally filtered.
    List {
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    /// Show one composition and its license quote.
    Show { slug: String },
    /// Generate a lyric snippet.
    Lyrics {
        #[arg(long)]
        genre: String,
        #[arg(long)]
        style: String,
    },
    /// Suggest SEO keywords for a song.
    Seo {
        #[arg(long)]
        title: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        description: String,
    },
    /// Submit a survey response.
    Survey {
        #[arg(value_enum)]
        audience: Audience,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        /// Repeat for several genres.
        #[arg(long = "genre", required = true)]
        genres: Vec<String>,
        #[arg(long)]
        interest: u8,
        #[arg(long)]
        price_band: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Audience {
    Creator,
    Buyer,
}

impl Audience {
    fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Buyer => "buyer",
        }
    }
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    client: reqwest::Client,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, client: reqwest::Client::new() };

    if let Err(e) = run(&ctx, cli.command).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Ping => run_ping(ctx).await,
        Command::Genres => print_json(&get(ctx, &["api", "genres"], &[]).await?),
        Command::List { genre, query } => {
            let mut params = Vec::new();
            if let Some(genre) = genre {
                params.push(("genre", genre));
            }
            if let Some(query) = query {
                params.push(("q", query));
            }
            print_json(&get(ctx, &["api", "compositions"], &params).await?)
        }
        Command::Show { slug } => {
            let composition = get(ctx, &["api", "compositions", &slug], &[]).await?;
            let license = get(ctx, &["api", "compositions", &slug, "license"], &[]).await?;
            print_json(&json!({ "composition": composition, "license": license }))
        }
        Command::Lyrics { genre, style } => {
            let body = json!({ "genre": genre, "style": style });
            print_json(&post(ctx, &["api", "ai", "lyric-snippet"], &body).await?)
        }
        Command::Seo { title, genre, description } => {
            let body = json!({ "title": title, "genre": genre, "description": description });
            print_json(&post(ctx, &["api", "ai", "seo-keywords"], &body).await?)
        }
        Command::Survey { audience, email, name, genres, interest, price_band, comments } => {
            let body = survey_body(email, name, genres, interest, price_band, comments);
            print_json(&post(ctx, &["api", "surveys", audience.as_str()], &body).await?)
        }
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let response = ctx.client.get(url(ctx, &["healthz"])?).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Server {
            code: format!("HTTP {}", status.as_u16()),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

fn survey_body(
    email: String,
    name: Option<String>,
    genres: Vec<String>,
    interest: u8,
    price_band: Option<String>,
    comments: Option<String>,
) -> Value {
    let mut body = Map::new();
    body.insert("email".to_owned(), Value::String(email));
    body.insert("genres".to_owned(), json!(genres));
    body.insert("interest".to_owned(), json!(interest));
    if let Some(name) = name {
        body.insert("name".to_owned(), Value::String(name));
    }
    if let Some(price_band) = price_band {
        body.insert("price_band".to_owned(), Value::String(price_band));
    }
    if let Some(comments) = comments {
        body.insert("comments".to_owned(), Value::String(comments));
    }
    Value::Object(body)
}

// =============================================================================
// HTTP
// =============================================================================

/// Base URL with `segments` appended, each percent-encoded as one segment.
fn url(ctx: &CliContext, segments: &[&str]) -> Result<reqwest::Url, CliError> {
    let mut url =
        reqwest::Url::parse(&ctx.base_url).map_err(|e| CliError::InvalidBaseUrl(format!("{}: {e}", ctx.base_url)))?;
    url.path_segments_mut()
        .map_err(|()| CliError::InvalidBaseUrl(ctx.base_url.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn get(ctx: &CliContext, segments: &[&str], params: &[(&str, String)]) -> Result<Value, CliError> {
    let response = ctx.client.get(url(ctx, segments)?).query(params).send().await?;
    read_response(response).await
}

async fn post(ctx: &CliContext, segments: &[&str], body: &Value) -> Result<Value, CliError> {
    let response = ctx.client.post(url(ctx, segments)?).json(body).send().await?;
    read_response(response).await
}

async fn read_response(response: reqwest::Response) -> Result<Value, CliError> {
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    if !status.is_success() {
        return Err(server_error(status.as_u16(), &value));
    }
    Ok(value)
}

/// Turn the server's `{"error": {...}}` envelope into a `code: message` error,
/// listing field messages for validation failures.
fn server_error(status: u16, body: &Value) -> CliError {
    let error = &body["error"];
    let code = error["code"].as_str().map_or_else(|| format!("HTTP {status}"), str::to_owned);
    let mut message = error["message"].as_str().unwrap_or("request failed").to_owned();
    if let Some(fields) = error["fields"].as_array() {
        for field in fields {
            let name = field["field"].as_str().unwrap_or("?");
            let text = field["message"].as_str().unwrap_or("");
            message.push_str(&format!("\n  {name}: {text}"));
        }
    }
    CliError::Server { code, message }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_uses_envelope_code_and_fields() {
        let body = json!({
            "error": {
                "code": "E_VALIDATION",
                "message": "validation failed",
                "retryable": false,
                "fields": [{ "field": "style", "message": "Style must be at least 3 characters." }],
            }
        });
        let err = server_error(422, &body);
        assert_eq!(
            err.to_string(),
            "E_VALIDATION: validation failed\n  style: Style must be at least 3 characters."
        );
    }

    #[test]
    fn server_error_without_envelope_falls_back_to_status() {
        let err = server_error(502, &Value::Null);
        assert_eq!(err.to_string(), "HTTP 502: request failed");
    }

    #[test]
    fn survey_body_skips_unset_optionals() {
        let body = survey_body("a@b.co".into(), None, vec!["Funk".into()], 3, None, Some("ok".into()));
        assert_eq!(body, json!({ "email": "a@b.co", "genres": ["Funk"], "interest": 3, "comments": "ok" }));
    }

    fn ctx(base_url: &str) -> CliContext {
        CliContext { base_url: base_url.into(), client: reqwest::Client::new() }
    }

    #[test]
    fn url_trims_trailing_slash() {
        let url = url(&ctx("http://localhost:3000/"), &["api", "slugs"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/slugs");
    }

    #[test]
    fn url_encodes_each_segment() {
        let url = url(&ctx("http://localhost:3000/base"), &["api", "compositions", "a/b?c d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/base/api/compositions/a%2Fb%3Fc%20d");
    }

    #[test]
    fn url_rejects_unusable_base() {
        assert!(matches!(url(&ctx("not a url"), &["healthz"]), Err(CliError::InvalidBaseUrl(_))));
        assert!(matches!(url(&ctx("mailto:a@b.co"), &["healthz"]), Err(CliError::InvalidBaseUrl(_))));
    }

    #[test]
    fn cli_parses_repeated_genres() {
        let cli = Cli::try_parse_from([
            "songnation", "survey", "buyer", "--email", "a@b.co", "--genre", "Trap", "--genre", "Funk", "--interest", "4",
        ])
        .unwrap();
        match cli.command {
            Command::Survey { audience, genres, interest, .. } => {
                assert_eq!(audience.as_str(), "buyer");
                assert_eq!(genres, vec!["Trap", "Funk"]);
                assert_eq!(interest, 4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
