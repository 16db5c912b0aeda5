use std::time::Duration;
use rocket::{State, get, post, http::Status, serde::json::{Error as JsonError, Json, Value, json}};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use shared::{
    validate_create_request, validate_vote_request, CreatePollRequest, CreatePollResponse, PollResults,
    VoteRequest, VoteResponse,
};
use crate::{context::Context, error::ApiError, service::PollService};

pub struct AppState {
    pub service: PollService,
    pub shutdown: CancellationToken,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: PollService, shutdown: CancellationToken, request_timeout: Duration) -> Self {
        Self { service, shutdown, request_timeout }
    }

    /// Every request is cancelled when the server shuts down or when it
    /// outlives the request timeout, whichever comes first.
    pub fn context(&self) -> Context {
        Context::from_token(self.shutdown.child_token()).with_timeout(self.request_timeout)
    }
}

fn body<T>(data: Result<Json<T>, JsonError<'_>>) -> Result<T, ApiError> {
    data.map(Json::into_inner).map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::InvalidRequest("Invalid request body".into())
    })
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::NoContent
}

#[get("/health")]
pub async fn health() -> Value {
    json!({ "status": "ok" })
}

#[instrument(skip(state, request))]
#[post("/polls", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Result<Json<CreatePollRequest>, JsonError<'_>>,
) -> Result<(Status, Json<CreatePollResponse>), ApiError> {
    let request = body(request)?;
    validate_create_request(&request, state.service.settings().max_ttl.as_secs())?;

    let ttl = request.ttl_seconds.map(Duration::from_secs);
    let ctx = state.context();
    let created = state.service
        .create_poll(&ctx, request.title, request.options, ttl)
        .await
        .map_err(|e| ApiError::from_poll(e, "Failed to create poll"))?;

    Ok((Status::Created, Json(created)))
}

#[instrument(skip(state, request), fields(poll_id = %id))]
#[post("/polls/<id>/vote", data = "<request>")]
pub async fn vote(
    state: &State<AppState>,
    id: &str,
    request: Result<Json<VoteRequest>, JsonError<'_>>,
) -> Result<Json<VoteResponse>, ApiError> {
    let request = body(request)?;
    validate_vote_request(&request)?;

    let ctx = state.context();
    state.service
        .vote(&ctx, id, &request.option_indices)
        .await
        .map_err(|e| ApiError::from_poll(e, "Failed to record vote"))?;

    Ok(Json(VoteResponse {
        success: true,
        message: Some("Vote recorded successfully".into()),
    }))
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/polls/<id>/results")]
pub async fn get_results(state: &State<AppState>, id: &str) -> Result<Json<PollResults>, ApiError> {
    let ctx = state.context();
    state.service
        .get_results(&ctx, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_poll(e, "Failed to get results"))
}
