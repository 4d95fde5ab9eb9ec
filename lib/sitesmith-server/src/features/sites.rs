use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sites::{Approval, NameCheck, SiteRecord};

use crate::errors::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SiteNameRequest {
    pub site_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub site_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub site_name: String,
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct DomainRequest {
    pub site_name: String,
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Reply<T> {
    fn new(status: &'static str, message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status,
            message: message.into(),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CheckReply {
    pub status: &'static str,
    #[serde(flatten)]
    pub check: NameCheck,
}

#[derive(Debug, Serialize)]
pub struct DeployUrl {
    pub deploy_url: String,
}

#[derive(Debug, Serialize)]
pub struct Sites {
    pub sites: BTreeMap<String, SiteRecord>,
}

#[derive(Debug, Serialize)]
pub struct Nothing {}

pub(crate) fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/api/check_site_name", post(check_site_name))
        .route("/api/prompt", post(prompt))
        .route("/api/approve", post(approve))
        .route("/api/sites", get(list_sites))
        .route("/api/status/{name}", get(status))
        .route("/api/add_domain", post(add_domain))
        .route("/api/reset_site_content", post(reset_site_content))
}

async fn check_site_name(
    State(state): State<AppState>,
    payload: Result<Json<SiteNameRequest>, JsonRejection>,
) -> ApiResult<Json<CheckReply>> {
    let Json(request) = payload?;
    let check = state.sites.check_name(&request.site_name).await?;
    Ok(Json(CheckReply { status: "ok", check }))
}

async fn prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult<Json<Reply<DeployUrl>>> {
    let Json(request) = payload?;
    let site_name = request
        .site_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("site name is required".to_string()))?;

    let site = state
        .sites
        .submit_instruction(&site_name, &request.prompt)
        .await?;

    Ok(Reply::new(
        "ok",
        "The site was created or updated.",
        DeployUrl {
            deploy_url: site.deploy_url,
        },
    ))
}

async fn approve(
    State(state): State<AppState>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> ApiResult<Json<Reply<Option<DeployUrl>>>> {
    let Json(request) = payload?;
    let reply = match state
        .sites
        .approve(&request.site_name, request.approve)
        .await?
    {
        Approval::Approved { deploy_url, .. } => Reply::new(
            "approved",
            "The site setup is complete and the site is live.",
            Some(DeployUrl { deploy_url }),
        ),
        Approval::Continue => Reply::new("continue", "You can keep editing the site.", None),
    };

    Ok(reply)
}

async fn list_sites(State(state): State<AppState>) -> ApiResult<Json<Reply<Sites>>> {
    let sites = state.sites.list_sites().await?;
    Ok(Reply::new(
        "ok",
        format!("{} site(s)", sites.len()),
        Sites { sites },
    ))
}

async fn status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Reply<sites::SiteStatus>>> {
    let status = state.sites.status(&name).await?;
    Ok(Reply::new("ok", "site found", status))
}

async fn add_domain(
    State(state): State<AppState>,
    payload: Result<Json<DomainRequest>, JsonRejection>,
) -> ApiResult<Json<Reply<Nothing>>> {
    let Json(request) = payload?;
    let domain = state
        .sites
        .add_domain(&request.site_name, &request.domain)
        .await?;

    Ok(Reply::new(
        "ok",
        format!("{domain} was added and set as the primary domain."),
        Nothing {},
    ))
}

async fn reset_site_content(
    State(state): State<AppState>,
    payload: Result<Json<SiteNameRequest>, JsonRejection>,
) -> ApiResult<Json<Reply<DeployUrl>>> {
    let Json(request) = payload?;
    let site = state.sites.reset_content(&request.site_name).await?;

    Ok(Reply::new(
        "ok",
        "The site content was reset and its instruction history cleared.",
        DeployUrl {
            deploy_url: site.deploy_url,
        },
    ))
}
