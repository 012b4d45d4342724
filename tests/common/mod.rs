use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const TEST_SESSION_SECRET: &str = "integration-test-secret";
pub const SESSION_COOKIE: &str = "campus_session";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Every test binary gets its own port so suites can run in parallel
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Runs the compiled debug binary directly rather than going through
        // cargo, so startup stays fast across test binaries
        let mut cmd = Command::new("target/debug/campus-api");
        cmd.env("CAMPUS_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SESSION_SECRET", TEST_SESSION_SECRET)
            .env("SESSION_COOKIE_NAME", SESSION_COOKIE)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    if resp.status() == StatusCode::OK {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    // One shared server per test binary; spawn failures abort the whole run
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    // Startup includes an argon2 hash for the seeded development admin
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

/// Client that surfaces redirects instead of following them, since the
/// redirect targets are what these tests assert on.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

/// Extract the `name=value` pair from a `Set-Cookie` response header.
pub fn session_cookie_pair(res: &reqwest::Response) -> Option<String> {
    let raw = res.headers().get(reqwest::header::SET_COOKIE)?.to_str().ok()?;
    let pair = raw.split(';').next()?.trim();
    if pair.starts_with(SESSION_COOKIE) {
        Some(pair.to_string())
    } else {
        None
    }
}

/// Register an account and sign in, returning (cookie pair, bearer token).
pub async fn signed_in_account(
    server: &TestServer,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<(String, String)> {
    let http = client();

    let res = http
        .post(format!("{}/api/register", server.base_url))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration failed with {}",
        res.status()
    );

    let res = http
        .post(format!("{}/api/auth/signin", server.base_url))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "sign-in failed with {}", res.status());

    let cookie = session_cookie_pair(&res).context("sign-in response missing session cookie")?;
    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("sign-in response missing token")?
        .to_string();

    Ok((cookie, token))
}
