//! HTTP wrappers around the Taskboard JSON API.
//!
//! [`CardApi`] is the seam the board page talks through; [`HttpCardApi`] is the
//! reqwest implementation carrying the bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use taskboard_core::{BoardError, Card, CardUpdate, NewCard};
use thiserror::Error;

/// Errors that can occur while talking to the API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with an error status.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Not logged in")]
    MissingToken,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Card {0} is not on the board")]
    CardNotOnBoard(i32),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Card operations offered by the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardApi: Send + Sync {
    /// Fetches every card visible to the logged in user.
    async fn list_cards(&self) -> Result<Vec<Card>, ClientError>;
    async fn create_card(&self, card: &NewCard) -> Result<Card, ClientError>;
    /// Sends a full update of the card's updatable fields.
    async fn update_card(&self, id: i32, update: &CardUpdate) -> Result<Card, ClientError>;
    async fn delete_card(&self, id: i32) -> Result<(), ClientError>;
}

/// Fields of the registration form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: UserInfo,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest backed [`CardApi`].
#[derive(Debug, Clone)]
pub struct HttpCardApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCardApi {
    /// Creates a client for the API rooted at `base_url`, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Registers a new account. The password confirmation is checked locally.
    #[tracing::instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<UserInfo, ClientError> {
        if form.password != form.confirm_password {
            return Err(ClientError::PasswordMismatch);
        }
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(form)
            .send()
            .await?;
        read_json(response).await
    }

    /// Logs in and keeps the returned token for later requests.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserInfo, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let login: LoginResponse = read_json(response).await?;
        self.token = Some(login.token);
        Ok(login.user)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }
}

#[async_trait]
impl CardApi for HttpCardApi {
    #[tracing::instrument(skip(self))]
    async fn list_cards(&self) -> Result<Vec<Card>, ClientError> {
        let response = self
            .authorized(self.client.get(self.url("/cards")))?
            .send()
            .await?;
        read_json(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_card(&self, card: &NewCard) -> Result<Card, ClientError> {
        let response = self
            .authorized(self.client.post(self.url("/cards")))?
            .json(card)
            .send()
            .await?;
        read_json(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_card(&self, id: i32, update: &CardUpdate) -> Result<Card, ClientError> {
        let response = self
            .authorized(self.client.put(self.url(&format!("/cards/{}", id))))?
            .json(update)
            .send()
            .await?;
        read_json(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_card(&self, id: i32) -> Result<(), ClientError> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("/cards/{}", id))))?
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`ClientError::Api`] using the server's message.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    tracing::warn!("API responded with {}: {}", status, message);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}
